use gem_crush::core::{Board, BoardConfig, GameConfig, StageTimings};
use gem_crush::engine::{Game, InputOutcome, SelectOutcome, Selection, SelectionMachine};
use gem_crush::types::{Coord, GameEvent, WorldPos};

fn board() -> Board {
    Board::new(&BoardConfig {
        width: 4,
        height: 4,
        ..BoardConfig::default()
    })
    .unwrap()
}

#[test]
fn select_deselect_then_move() {
    let board = board();
    let mut sm = SelectionMachine::new(false);
    let (c11, c21) = (Coord::new(1, 1), Coord::new(2, 1));

    assert_eq!(sm.on_input(c11, &board), SelectOutcome::Selected(c11));
    assert_eq!(sm.state(), Selection::Selected(c11));

    assert_eq!(sm.on_input(c11, &board), SelectOutcome::Deselected(c11));
    assert_eq!(sm.state(), Selection::Unselected);

    sm.on_input(c11, &board);
    assert_eq!(
        sm.on_input(c21, &board),
        SelectOutcome::Move { from: c11, to: c21 }
    );
}

#[test]
fn invalid_cells_are_ignored() {
    let board = board();
    let mut sm = SelectionMachine::new(false);
    assert_eq!(sm.on_input(Coord::new(-1, 0), &board), SelectOutcome::Ignored);
    assert_eq!(sm.on_input(Coord::new(0, 4), &board), SelectOutcome::Ignored);
    assert_eq!(sm.state(), Selection::Unselected);

    let empty = Board::empty(&BoardConfig::default()).unwrap();
    assert_eq!(sm.on_input(Coord::new(0, 0), &empty), SelectOutcome::Ignored);
}

#[test]
fn adjacency_rule_moves_the_selection() {
    let board = board();
    let mut sm = SelectionMachine::new(true);
    sm.on_input(Coord::new(0, 0), &board);
    assert_eq!(
        sm.on_input(Coord::new(2, 2), &board),
        SelectOutcome::Reselected {
            from: Coord::new(0, 0),
            to: Coord::new(2, 2)
        }
    );
    assert_eq!(sm.state(), Selection::Selected(Coord::new(2, 2)));
}

#[test]
fn game_returns_to_unselected_after_the_turn() {
    let config = GameConfig {
        timings: StageTimings::instant(),
        ..GameConfig::default()
    };
    let mut game = Game::new(config).unwrap();

    game.select(Coord::new(1, 1));
    assert_eq!(game.selection(), Selection::Selected(Coord::new(1, 1)));
    assert_eq!(
        game.select(Coord::new(2, 1)),
        InputOutcome::MoveStarted {
            from: Coord::new(1, 1),
            to: Coord::new(2, 1)
        }
    );
    assert_eq!(game.selection(), Selection::Unselected);
    assert_eq!(
        game.take_events().first(),
        Some(&GameEvent::Selected { at: Coord::new(1, 1) })
    );
}

#[test]
fn world_taps_resolve_through_the_grid() {
    let mut config = GameConfig::default();
    config.board.cell_size = 0.5;
    config.board.origin = WorldPos::new(10.0, -2.0);
    let mut game = Game::new(config).unwrap();

    let center = game.board().grid_to_world_center(Coord::new(3, 5));
    assert_eq!(game.tap_world(center), InputOutcome::Selected(Coord::new(3, 5)));
    assert_eq!(
        game.tap_world(WorldPos::new(0.0, 0.0)),
        InputOutcome::Ignored
    );
}

#[test]
fn nan_taps_are_ignored() {
    let mut game = Game::new(GameConfig::default()).unwrap();
    assert_eq!(
        game.tap_world(WorldPos::new(f32::NAN, f32::NAN)),
        InputOutcome::Ignored
    );
    assert_eq!(game.tap_world(WorldPos::new(0.5, f32::NAN)), InputOutcome::Ignored);
    assert_eq!(game.selection(), Selection::Unselected);
}
