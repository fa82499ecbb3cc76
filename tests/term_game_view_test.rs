use gem_crush::core::{BoardConfig, GameConfig};
use gem_crush::engine::Game;
use gem_crush::term::{gem_color, AdapterStatusView, AnchorY, GameView, Viewport};
use gem_crush::types::Coord;

fn text(fb: &gem_crush::term::FrameBuffer) -> String {
    let mut all = String::new();
    for y in 0..fb.height() {
        for x in 0..fb.width() {
            all.push(fb.get(x, y).unwrap().ch);
        }
        all.push('\n');
    }
    all
}

#[test]
fn term_view_renders_border_corners() {
    let game = Game::new(GameConfig::default()).unwrap();
    let snap = game.snapshot();
    let view = GameView::default();

    // 8 cells * 3 columns + border = 26 wide, 8 rows + border = 10 high.
    let fb = view.render(&snap, None, Viewport::new(26, 10));

    assert_eq!(fb.get(0, 0).unwrap().ch, '┌');
    assert_eq!(fb.get(25, 0).unwrap().ch, '┐');
    assert_eq!(fb.get(0, 9).unwrap().ch, '└');
    assert_eq!(fb.get(25, 9).unwrap().ch, '┘');
}

#[test]
fn term_view_colors_gems_by_kind() {
    let game = Game::new(GameConfig::default()).unwrap();
    let snap = game.snapshot();
    let view = GameView::default();
    let fb = view.render(&snap, None, Viewport::new(26, 10));

    // Bottom-left board cell sits on the last inner row, middle column.
    let cell = fb.get(2, 8).unwrap();
    let kind = snap.kind_at(0, 0).unwrap();
    assert_eq!(cell.ch, '●');
    assert_eq!(cell.style.fg, gem_color(kind));
}

#[test]
fn term_view_draws_side_panel_when_wide_enough() {
    let game = Game::new(GameConfig::default()).unwrap();
    let snap = game.snapshot();
    let view = GameView::default();
    let adapter = AdapterStatusView {
        port: 7878,
        commands: 3,
    };

    let mut fb = view.render(&snap, None, Viewport::new(60, 24));
    view.render_into_with_adapter(&snap, None, Some(&adapter), Viewport::new(60, 24), &mut fb);

    let all = text(&fb);
    assert!(all.contains("MOVES"));
    assert!(all.contains("CASCADES"));
    assert!(all.contains("7878"));
}

#[test]
fn mouse_cells_map_back_to_board_cells() {
    let mut config = GameConfig::default();
    config.board = BoardConfig {
        width: 5,
        height: 4,
        cell_size: 2.0,
        ..BoardConfig::default()
    };
    let mut game = Game::new(config).unwrap();
    let snap = game.snapshot();
    let view = GameView::default().with_anchor_y(AnchorY::Top);
    let vp = Viewport::new(40, 12);

    let left = (40 - (5 * 3 + 2)) / 2;
    for y in 0..4 {
        for x in 0..5 {
            let column = left + 1 + x as u16 * 3 + 1;
            let row = 1 + (3 - y) as u16;
            assert_eq!(
                view.screen_to_cell(&snap, vp, column, row),
                Some(Coord::new(x, y))
            );
            let pos = view
                .screen_to_world(&snap, &game.config().board, vp, column, row)
                .unwrap();
            assert_eq!(game.board().world_to_grid(pos), Coord::new(x, y));
        }
    }

    // The border is not a cell.
    assert_eq!(view.screen_to_cell(&snap, vp, left, 1), None);

    let pos = view
        .screen_to_world(&snap, &game.config().board, vp, left + 2, 4)
        .unwrap();
    assert!(matches!(
        game.tap_world(pos),
        gem_crush::engine::InputOutcome::Selected(c) if c == Coord::new(0, 0)
    ));
}
