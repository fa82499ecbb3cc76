//! Gem Crush (workspace facade crate).
//!
//! Re-exports the crates under `crates/` as `gem_crush::{core,engine,input,term,adapter,types}`
//! and holds the small amount of code shared by the two binaries: argument
//! parsing and config layering ([`cli`]) and the headless player ([`sim`]).

pub mod cli;
pub mod sim;

pub use gem_crush_adapter as adapter;
pub use gem_crush_core as core;
pub use gem_crush_engine as engine;
pub use gem_crush_input as input;
pub use gem_crush_term as term;
pub use gem_crush_types as types;
