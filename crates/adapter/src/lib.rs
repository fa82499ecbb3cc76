//! Adapter module - remote play over TCP with a line-delimited JSON protocol
//!
//! External agents (bots, test harnesses, other front ends) drive the game
//! through a TCP socket.
//!
//! # Protocol Overview
//!
//! 1. **Connection**: client connects (default `127.0.0.1:7878`)
//! 2. **Handshake**: client sends `hello`, server answers `welcome` with the
//!    assigned role. The first client to say hello becomes the controller; later
//!    ones observe. When the controller leaves, the oldest remaining client is
//!    promoted.
//! 3. **Commands**: `select {x,y}`, `tap {wx,wy}` and `restart {seed?}` are
//!    controller-only and answered with `ack {result}` or `error {code,message}`.
//!    `observe` is open to everyone and answered with
//!    `observation {snapshot, events}`.
//!
//! Every client message carries a `seq` that must strictly increase per
//! connection; replies echo it.
//!
//! # Environment Variables
//!
//! - `GEM_CRUSH_AI_HOST`: bind address (default `127.0.0.1`)
//! - `GEM_CRUSH_AI_PORT`: port (default `7878`)
//! - `GEM_CRUSH_AI_MAX_PENDING`: bounded command queue length (default 16)
//! - `GEM_CRUSH_AI_DISABLED`: `1`/`true` disables the adapter
//!
//! # Example
//!
//! ```text
//! -> {"type":"hello","seq":1,"client":{"name":"bot","version":"0.1"},"protocol_version":"1.0.0"}
//! <- {"type":"welcome","seq":1,"protocol_version":"1.0.0","client_id":1,"role":"controller"}
//! -> {"type":"select","seq":2,"x":3,"y":4}
//! <- {"type":"ack","seq":2,"result":"selected"}
//! -> {"type":"observe","seq":3}
//! <- {"type":"observation","seq":3,"snapshot":{...},"events":[{"event":"selected","at":{"x":3,"y":4}}]}
//! ```

pub mod dispatch;
pub mod protocol;
pub mod runtime;
pub mod server;

pub use gem_crush_core as core;
pub use gem_crush_engine as engine;
pub use gem_crush_types as types;

pub use dispatch::Dispatcher;
pub use protocol::*;
pub use runtime::{Adapter, ClientCommand, InboundCommand, OutboundMessage};
pub use server::{run_server, ServerConfig, ServerState};
