//! Core game logic - pure, deterministic, and testable
//!
//! Everything a match-3 board needs, with no dependency on terminals, sockets or
//! timing:
//!
//! - [`grid`]: generic fixed-size 2D container with world-space conversion and
//!   change observers
//! - [`matcher`]: horizontal/vertical run detection
//! - [`board`]: the gem grid with swap, explode, gravity and refill operations
//! - [`rng`]: seeded gem generation
//! - [`config`]: layered game configuration and validation
//! - [`snapshot`]: owned view of a game for renderers and network clients
//!
//! # Example
//!
//! ```
//! use gem_crush_core::{Board, BoardConfig};
//! use gem_crush_types::Coord;
//!
//! let mut board = Board::new(&BoardConfig::default()).unwrap();
//! board.swap(Coord::new(0, 0), Coord::new(1, 0));
//!
//! let matched = board.find_matches();
//! board.explode(matched.iter().copied());
//! board.collapse();
//! board.refill();
//! assert!(board.is_full());
//! ```

pub mod board;
pub mod config;
pub mod grid;
pub mod matcher;
pub mod rng;
pub mod snapshot;

pub use gem_crush_types as types;

pub use board::{Board, Fall};
pub use config::{BoardConfig, ConfigError, GameConfig, StageTimings, TurnPolicy};
pub use grid::{CoordinateConverter, Grid, ObserverId, VerticalConverter};
pub use matcher::{find_matches, find_matches_by};
pub use rng::{GemSource, SimpleRng};
pub use snapshot::BoardSnapshot;
