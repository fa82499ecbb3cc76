//! Owned, serializable view of a game for renderers and network clients.

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::types::{Coord, GemKind, Stage, Stats};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub width: i32,
    pub height: i32,
    /// Kinds per cell, row-major (`y * width + x`), row 0 at the bottom
    pub cells: Vec<Option<GemKind>>,
    pub selected: Option<Coord>,
    pub stage: Stage,
    pub busy: bool,
    pub stats: Stats,
    pub seed: u32,
}

impl BoardSnapshot {
    /// Copy the board part of the snapshot, keeping the allocation
    pub fn fill_from(&mut self, board: &Board) {
        self.width = board.width();
        self.height = board.height();
        self.seed = board.seed();
        board.write_kinds(&mut self.cells);
    }

    pub fn kind_at(&self, x: i32, y: i32) -> Option<GemKind> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        self.cells
            .get((y * self.width + x) as usize)
            .copied()
            .flatten()
    }

    /// One line per row, top row first, `.` for empty cells
    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity(((self.width + 1) * self.height) as usize);
        for y in (0..self.height).rev() {
            for x in 0..self.width {
                out.push(self.kind_at(x, y).map(|k| k.letter()).unwrap_or('.'));
            }
            out.push('\n');
        }
        out
    }

    pub fn playable(&self) -> bool {
        !self.busy
    }
}

impl Default for BoardSnapshot {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            cells: Vec::new(),
            selected: None,
            stage: Stage::Idle,
            busy: false,
            stats: Stats::default(),
            seed: 0,
        }
    }
}
