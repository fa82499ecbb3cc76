//! Adapter runtime integration.
//!
//! Bridges the synchronous game loop with the async TCP server: the server
//! pushes [`InboundCommand`]s into a bounded channel, the game loop drains it
//! once per frame and sends replies back as [`OutboundMessage`]s.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use arrayvec::ArrayVec;
use log::{error, info};
use tokio::runtime::Runtime;
use tokio::sync::{mpsc, oneshot};

use crate::dispatch::Dispatcher;
use crate::engine::Game;
use crate::protocol::ServerMessage;
use crate::server::{run_server, ServerConfig};
use crate::types::{Coord, WorldPos};

/// Most commands applied per frame; the rest wait in the channel
pub const MAX_COMMANDS_PER_FRAME: usize = 32;

/// Command delivered to the game loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InboundCommand {
    pub client_id: usize,
    pub seq: u64,
    pub command: ClientCommand,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClientCommand {
    Select(Coord),
    Tap(WorldPos),
    Restart(Option<u32>),
    Observe,
}

/// Reply to be delivered by the server.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    pub client_id: usize,
    pub msg: ServerMessage,
}

/// Running adapter instance.
pub struct Adapter {
    _rt: Runtime,
    cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
    local_addr: SocketAddr,
    dispatcher: Dispatcher,
}

impl Adapter {
    /// Start the adapter from `GEM_CRUSH_AI_*` environment variables.
    ///
    /// Returns `Ok(None)` if `GEM_CRUSH_AI_DISABLED` is set.
    pub fn start_from_env() -> Result<Option<Self>> {
        let config = ServerConfig::from_env();
        if config.disabled {
            info!("[Adapter] AI control disabled (GEM_CRUSH_AI_DISABLED)");
            return Ok(None);
        }
        Self::start(config).map(Some)
    }

    /// Start the server on its own runtime and wait until it is listening
    pub fn start(config: ServerConfig) -> Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(config.max_pending_commands.max(1));
        let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
        let (ready_tx, ready_rx) = oneshot::channel();

        let rt = Runtime::new().context("failed to create tokio runtime")?;
        rt.spawn(async move {
            if let Err(e) = run_server(config, cmd_tx, out_rx, Some(ready_tx)).await {
                error!("[Adapter] server stopped: {:#}", e);
            }
        });

        let local_addr = rt
            .block_on(ready_rx)
            .context("adapter server failed to start")?;

        Ok(Self {
            _rt: rt,
            cmd_rx,
            out_tx,
            local_addr,
            dispatcher: Dispatcher::default(),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn try_recv(&mut self) -> Option<InboundCommand> {
        self.cmd_rx.try_recv().ok()
    }

    /// Pending commands, up to one frame's worth
    pub fn drain(&mut self) -> ArrayVec<InboundCommand, MAX_COMMANDS_PER_FRAME> {
        let mut out = ArrayVec::new();
        while !out.is_full() {
            let Some(cmd) = self.try_recv() else {
                break;
            };
            out.push(cmd);
        }
        out
    }

    pub fn send(&self, msg: OutboundMessage) {
        let _ = self.out_tx.send(msg);
    }

    /// Apply pending commands to `game` and reply to their senders
    ///
    /// Also moves the game's events into the observation backlog, so call it
    /// every frame. Returns the number of commands applied.
    pub fn serve(&mut self, game: &mut Game) -> usize {
        let batch = self.drain();
        for cmd in &batch {
            let msg = self.dispatcher.apply(game, cmd);
            self.send(OutboundMessage {
                client_id: cmd.client_id,
                msg,
            });
        }
        self.dispatcher.collect(game);
        batch.len()
    }

    /// Commands applied since start
    pub fn commands_applied(&self) -> u32 {
        self.dispatcher.applied()
    }
}
