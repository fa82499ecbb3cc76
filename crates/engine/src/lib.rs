//! Gem Crush engine - selection and turn sequencing on top of the core board
//!
//! ```
//! use gem_crush_engine::{Game, InputOutcome};
//! use gem_crush_engine::core::{GameConfig, StageTimings};
//! use gem_crush_engine::types::Coord;
//!
//! let mut config = GameConfig::default();
//! config.timings = StageTimings::instant();
//! let mut game = Game::new(config).unwrap();
//!
//! assert_eq!(game.select(Coord::new(0, 0)), InputOutcome::Selected(Coord::new(0, 0)));
//! game.select(Coord::new(1, 0));
//! assert!(!game.is_busy());
//! assert_eq!(game.stats().moves, 1);
//! ```

pub use gem_crush_core as core;
pub use gem_crush_types as types;

pub mod game;
pub mod pipeline;
pub mod selection;

pub use game::{Game, InputOutcome};
pub use pipeline::{MovePipeline, StepResult, TurnSummary};
pub use selection::{SelectOutcome, Selection, SelectionMachine};
