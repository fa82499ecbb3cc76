//! Terminal input module (engine-facing).
//!
//! Maps `crossterm` key and mouse events into [`InputCommand`]s and keeps the
//! keyboard [`BoardCursor`]. No UI framework involved.

pub mod cursor;
pub mod map;

pub use gem_crush_types as types;

use arrayvec::ArrayVec;
use crossterm::event::Event;

pub use cursor::BoardCursor;
pub use map::{handle_key_event, handle_mouse_event, should_quit, translate_event, InputCommand, Tap};

/// Commands decoded in one frame
pub type InputBatch = ArrayVec<InputCommand, 32>;

/// Decode a frame's worth of events, keeping the first 32 commands
pub fn collect_commands<I>(events: I) -> InputBatch
where
    I: IntoIterator<Item = Event>,
{
    let mut batch = InputBatch::new();
    for event in events {
        if let Some(cmd) = translate_event(&event) {
            if batch.try_push(cmd).is_err() {
                break;
            }
        }
    }
    batch
}
