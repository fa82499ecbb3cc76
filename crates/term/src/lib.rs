//! Terminal rendering for the board.
//!
//! A small game-oriented layer instead of a widget toolkit: [`GameView`] draws a
//! [`BoardSnapshot`](crate::core::BoardSnapshot) into a [`FrameBuffer`], and
//! [`TerminalRenderer`] flushes framebuffers to the terminal as row diffs.
//! The view also answers the reverse question (which board cell sits under a
//! terminal cell) so mouse input can be routed back to the game.

pub mod fb;
pub mod game_view;
pub mod renderer;

pub use gem_crush_core as core;
pub use gem_crush_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{gem_color, AdapterStatusView, AnchorY, GameView, Viewport};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
