//! Selection state machine - which cell (if any) the player picked.

use crate::core::Board;
use crate::types::Coord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Unselected,
    Selected(Coord),
}

impl Selection {
    pub fn coord(&self) -> Option<Coord> {
        match self {
            Selection::Unselected => None,
            Selection::Selected(c) => Some(*c),
        }
    }
}

/// Result of feeding one coordinate into the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// Out of bounds or empty cell
    Ignored,
    Selected(Coord),
    Deselected(Coord),
    /// A second, different cell was picked: start a turn
    Move { from: Coord, to: Coord },
    /// Non-adjacent pick while adjacency is required: selection jumps to `to`
    Reselected { from: Coord, to: Coord },
}

#[derive(Debug, Clone)]
pub struct SelectionMachine {
    state: Selection,
    require_adjacent: bool,
}

impl SelectionMachine {
    pub fn new(require_adjacent: bool) -> Self {
        Self {
            state: Selection::Unselected,
            require_adjacent,
        }
    }

    pub fn state(&self) -> Selection {
        self.state
    }

    /// Feed a tapped coordinate
    ///
    /// On [`SelectOutcome::Move`] the machine stays on the first cell; the owner
    /// calls [`reset`](Self::reset) once the turn has been played out.
    pub fn on_input(&mut self, c: Coord, board: &Board) -> SelectOutcome {
        if !board.is_selectable(c) {
            return SelectOutcome::Ignored;
        }

        match self.state {
            Selection::Unselected => {
                self.state = Selection::Selected(c);
                SelectOutcome::Selected(c)
            }
            Selection::Selected(current) if current == c => {
                self.state = Selection::Unselected;
                SelectOutcome::Deselected(c)
            }
            Selection::Selected(current) => {
                if self.require_adjacent && !current.is_adjacent(c) {
                    self.state = Selection::Selected(c);
                    return SelectOutcome::Reselected { from: current, to: c };
                }
                SelectOutcome::Move { from: current, to: c }
            }
        }
    }

    pub fn reset(&mut self) {
        self.state = Selection::Unselected;
    }
}
