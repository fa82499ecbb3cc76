//! Keyboard cursor over the board.

use crate::types::{Coord, GameAction};

/// Cell highlighted for keyboard play, always inside the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardCursor {
    x: i32,
    y: i32,
    width: i32,
    height: i32,
}

impl BoardCursor {
    /// Cursor on a `width` x `height` board, starting at the bottom-left cell
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            x: 0,
            y: 0,
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn coord(&self) -> Coord {
        Coord::new(self.x, self.y)
    }

    /// Move by `(dx, dy)`, clamped to the board; true when the cursor moved
    pub fn shift(&mut self, dx: i32, dy: i32) -> bool {
        let nx = (self.x + dx).clamp(0, self.width - 1);
        let ny = (self.y + dy).clamp(0, self.height - 1);
        let moved = (nx, ny) != (self.x, self.y);
        self.x = nx;
        self.y = ny;
        moved
    }

    /// Apply a cursor action; other actions are not handled here
    ///
    /// Up moves towards larger `y` (the board's top).
    pub fn apply(&mut self, action: GameAction) -> bool {
        match action {
            GameAction::CursorLeft => self.shift(-1, 0),
            GameAction::CursorRight => self.shift(1, 0),
            GameAction::CursorUp => self.shift(0, 1),
            GameAction::CursorDown => self.shift(0, -1),
            GameAction::Select | GameAction::Restart => false,
        }
    }

    /// Jump to `c` (mouse taps), clamped to the board
    pub fn move_to(&mut self, c: Coord) {
        self.x = c.x.clamp(0, self.width - 1);
        self.y = c.y.clamp(0, self.height - 1);
    }
}
