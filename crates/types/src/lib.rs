//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! Everything here is plain data, usable from the grid core, the turn engine,
//! the terminal view and the network adapter alike.
//!
//! # Coordinates
//!
//! Grid coordinates are `(x, y)` with `x` growing to the right and `y` growing
//! upward: `y = 0` is the bottom row, which is where gems fall towards.
//!
//! # Timing Constants
//!
//! The turn engine reports how long each stage should be shown before the next
//! one runs. Values are in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Fixed timestep interval (~60 FPS) |
//! | `SWAP_MS` | 500 | Swap (and swap-back) transition |
//! | `EXPLODE_STEP_MS` | 100 | Per matched gem removal |
//! | `FALL_STEP_MS` | 100 | Per gem moved by gravity |
//! | `REFILL_STEP_MS` | 100 | Per gem spawned during refill |
//!
//! # Examples
//!
//! ```
//! use gem_crush_types::{Coord, GemKind, GameAction};
//!
//! let kind = GemKind::from_str("Blue").unwrap();
//! assert_eq!(kind.as_str(), "blue");
//!
//! assert!(Coord::new(1, 1).is_adjacent(Coord::new(2, 1)));
//! assert!(!Coord::new(1, 1).is_adjacent(Coord::new(2, 2)));
//!
//! assert_eq!(GameAction::from_str("select"), Some(GameAction::Select));
//! ```

use serde::{Deserialize, Serialize};

/// Default board width in cells
pub const DEFAULT_BOARD_WIDTH: i32 = 8;

/// Default board height in cells
pub const DEFAULT_BOARD_HEIGHT: i32 = 8;

/// Default world-space size of one cell
pub const DEFAULT_CELL_SIZE: f32 = 1.0;

/// Shortest run of same-kind gems that counts as a match
pub const MIN_RUN: i32 = 3;

/// Fixed timestep interval in milliseconds (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Swap transition duration
pub const SWAP_MS: u32 = 500;

/// Pause after each exploded gem
pub const EXPLODE_STEP_MS: u32 = 100;

/// Pause after each gem moved by gravity
pub const FALL_STEP_MS: u32 = 100;

/// Pause after each refilled slot
pub const REFILL_STEP_MS: u32 = 100;

/// Upper bound on chained cascade rounds within one move.
///
/// A single-kind palette refills straight into new matches, so chaining needs a cap.
pub const DEFAULT_MAX_CASCADES: u32 = 32;


/// Integer grid coordinate.
///
/// Ordering is lexicographic on `(x, y)`, which is the removal order used by the
/// turn engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Coordinate shifted by `(dx, dy)`
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// True when `other` shares an edge with `self`
    pub fn is_adjacent(self, other: Coord) -> bool {
        (self.x - other.x).abs() + (self.y - other.y).abs() == 1
    }
}

impl From<(i32, i32)> for Coord {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// Continuous world-space position (the plane the board is drawn on).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPos {
    pub x: f32,
    pub y: f32,
}

impl WorldPos {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Gem categories
///
/// Two gems match when their kinds are equal. A board draws from a configured
/// subset (the palette) of these kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GemKind {
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
}

impl GemKind {
    /// Every kind, in palette order
    pub const ALL: [GemKind; 6] = [
        GemKind::Red,
        GemKind::Orange,
        GemKind::Yellow,
        GemKind::Green,
        GemKind::Blue,
        GemKind::Purple,
    ];

    /// Parse gem kind from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use gem_crush_types::GemKind;
    ///
    /// assert_eq!(GemKind::from_str("red"), Some(GemKind::Red));
    /// assert_eq!(GemKind::from_str("PURPLE"), Some(GemKind::Purple));
    /// assert_eq!(GemKind::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "red" => Some(GemKind::Red),
            "orange" => Some(GemKind::Orange),
            "yellow" => Some(GemKind::Yellow),
            "green" => Some(GemKind::Green),
            "blue" => Some(GemKind::Blue),
            "purple" => Some(GemKind::Purple),
            _ => None,
        }
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            GemKind::Red => "red",
            GemKind::Orange => "orange",
            GemKind::Yellow => "yellow",
            GemKind::Green => "green",
            GemKind::Blue => "blue",
            GemKind::Purple => "purple",
        }
    }

    /// Single-letter code used by text dumps of the board
    pub fn letter(&self) -> char {
        match self {
            GemKind::Red => 'R',
            GemKind::Orange => 'O',
            GemKind::Yellow => 'Y',
            GemKind::Green => 'G',
            GemKind::Blue => 'B',
            GemKind::Purple => 'P',
        }
    }
}

/// A gem placed on the board.
///
/// `id` is unique per board and lets a presentation layer follow one gem through
/// swaps and falls. Matching only looks at `kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Gem {
    pub id: u32,
    pub kind: GemKind,
}

/// A board slot: `None` is empty.
pub type Cell = Option<Gem>;

/// Stages of one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Idle,
    Swapping,
    Matching,
    Exploding,
    Falling,
    Refilling,
    Reverting,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Idle => "idle",
            Stage::Swapping => "swapping",
            Stage::Matching => "matching",
            Stage::Exploding => "exploding",
            Stage::Falling => "falling",
            Stage::Refilling => "refilling",
            Stage::Reverting => "reverting",
        }
    }
}

/// Player actions produced by the keyboard front end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    /// Move the board cursor one cell left
    CursorLeft,
    /// Move the board cursor one cell right
    CursorRight,
    /// Move the board cursor one cell up
    CursorUp,
    /// Move the board cursor one cell down
    CursorDown,
    /// Select (or deselect) the cell under the cursor
    Select,
    /// Rebuild the board from a fresh seed
    Restart,
}

impl GameAction {
    /// Parse action from string
    ///
    /// # Examples
    ///
    /// ```
    /// use gem_crush_types::GameAction;
    ///
    /// assert_eq!(GameAction::from_str("cursorLeft"), Some(GameAction::CursorLeft));
    /// assert_eq!(GameAction::from_str("restart"), Some(GameAction::Restart));
    /// assert_eq!(GameAction::from_str("jump"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cursorleft" => Some(GameAction::CursorLeft),
            "cursorright" => Some(GameAction::CursorRight),
            "cursorup" => Some(GameAction::CursorUp),
            "cursordown" => Some(GameAction::CursorDown),
            "select" => Some(GameAction::Select),
            "restart" => Some(GameAction::Restart),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::CursorLeft => "cursorLeft",
            GameAction::CursorRight => "cursorRight",
            GameAction::CursorUp => "cursorUp",
            GameAction::CursorDown => "cursorDown",
            GameAction::Select => "select",
            GameAction::Restart => "restart",
        }
    }
}

/// Events emitted while the player interacts and a turn plays out.
///
/// Presentation uses the per-stage variants to drive animation, feedback (audio,
/// effects) listens for the discrete ones. Order of emission is the order things
/// happened on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    Selected { at: Coord },
    Deselected { at: Coord },
    SwapStarted { a: Coord, b: Coord },
    SwapFinished { a: Coord, b: Coord },
    MatchFound { count: u32, cascade: u32 },
    NoMatch,
    /// One pop per exploding stage, before the per-gem removals
    Pop,
    Exploded { at: Coord, gem: Gem },
    Fell { gem: Gem, from: Coord, to: Coord },
    Refilled { at: Coord, gem: Gem },
    SwapReverted { a: Coord, b: Coord },
    TurnFinished { matched: bool, cascades: u32 },
}

/// Running counters for the current game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stats {
    /// Turns played (every swap consumes one)
    pub moves: u32,
    /// Matching passes that found at least one run
    pub matches: u32,
    /// Gems removed by matches
    pub gems_cleared: u32,
    /// Matching passes after the first one within a turn that found runs
    pub cascades: u32,
}
