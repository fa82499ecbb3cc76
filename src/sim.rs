//! Headless play: a seeded player making random adjacent swaps.

use crate::core::SimpleRng;
use crate::engine::{Game, InputOutcome, Selection, TurnSummary};
use crate::types::Coord;

/// One finished turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnReport {
    pub turn: u32,
    pub from: Coord,
    pub to: Coord,
    pub summary: TurnSummary,
}

pub struct RandomPlayer {
    rng: SimpleRng,
}

impl RandomPlayer {
    pub fn new(seed: u32) -> Self {
        Self {
            rng: SimpleRng::new(seed),
        }
    }

    /// A random cell and one of its in-bounds orthogonal neighbours
    ///
    /// `None` only for boards with a single cell.
    pub fn pick_move(&mut self, width: i32, height: i32) -> Option<(Coord, Coord)> {
        if width <= 0 || height <= 0 || width * height < 2 {
            return None;
        }
        let from = Coord::new(
            self.rng.next_range(width as u32) as i32,
            self.rng.next_range(height as u32) as i32,
        );

        let mut options = [Coord::new(0, 0); 4];
        let mut n = 0usize;
        for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
            let to = from.offset(dx, dy);
            if (0..width).contains(&to.x) && (0..height).contains(&to.y) {
                options[n] = to;
                n += 1;
            }
        }
        let to = options[self.rng.next_range(n as u32) as usize];
        Some((from, to))
    }
}

/// Play one move and run it to completion
///
/// Returns `None` when the game would not start a move.
pub fn play_turn(game: &mut Game, player: &mut RandomPlayer) -> Option<TurnReport> {
    game.finish_turn();

    let (from, to) = player.pick_move(game.board().width(), game.board().height())?;
    if let Selection::Selected(c) = game.selection() {
        game.select(c);
    }
    game.select(from);
    if !matches!(game.select(to), InputOutcome::MoveStarted { .. }) {
        return None;
    }

    let summary = game.finish_turn().or_else(|| game.last_turn())?;
    Some(TurnReport {
        turn: game.stats().moves,
        from,
        to,
        summary,
    })
}
