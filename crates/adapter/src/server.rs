//! TCP server for the adapter
//!
//! One task per connection reads lines and validates them (handshake, strictly
//! increasing `seq`, controller-only mutations); accepted commands go to the
//! game loop through a bounded channel. Replies produced by the game loop come
//! back through the outbound channel and are routed to the right connection.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use log::{info, warn};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot, RwLock};

use crate::protocol::{
    create_error, create_welcome, is_supported_version, parse_message, ClientMessage, ErrorCode,
    ParsedMessage, Role, ServerMessage,
};
use crate::runtime::{ClientCommand, InboundCommand, OutboundMessage};
use crate::types::{Coord, WorldPos};

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_pending_commands: usize,
    pub disabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            max_pending_commands: 16,
            disabled: false,
        }
    }
}

impl ServerConfig {
    /// Read `GEM_CRUSH_AI_HOST`, `GEM_CRUSH_AI_PORT`, `GEM_CRUSH_AI_MAX_PENDING`
    /// and `GEM_CRUSH_AI_DISABLED` from the environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary lookup
    ///
    /// Unparseable values fall back to the default with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = lookup("GEM_CRUSH_AI_HOST")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.host);
        let port = parse_or("GEM_CRUSH_AI_PORT", lookup("GEM_CRUSH_AI_PORT"), defaults.port);
        let max_pending_commands = parse_or(
            "GEM_CRUSH_AI_MAX_PENDING",
            lookup("GEM_CRUSH_AI_MAX_PENDING"),
            defaults.max_pending_commands,
        );
        let disabled = lookup("GEM_CRUSH_AI_DISABLED")
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Self {
            host,
            port,
            max_pending_commands,
            disabled,
        }
    }
}

fn parse_or<T: std::str::FromStr + Copy>(key: &str, value: Option<String>, default: T) -> T {
    match value {
        None => default,
        Some(v) => v.trim().parse().unwrap_or_else(|_| {
            warn!("[Adapter] ignoring invalid {}={:?}", key, v);
            default
        }),
    }
}

/// Handle to a connected client
#[derive(Debug)]
struct ClientHandle {
    id: usize,
    addr: SocketAddr,
    handshaken: bool,
    last_seq: Option<u64>,
    tx: mpsc::UnboundedSender<ServerMessage>,
}

impl ClientHandle {
    /// Record `seq`; false if it does not increase
    fn advance_seq(&mut self, seq: u64) -> bool {
        match self.last_seq {
            Some(prev) if seq <= prev => false,
            _ => {
                self.last_seq = Some(seq);
                true
            }
        }
    }
}

#[derive(Debug, Default)]
struct Clients {
    list: Vec<ClientHandle>,
    controller: Option<usize>,
}

impl Clients {
    fn get_mut(&mut self, id: usize) -> Option<&mut ClientHandle> {
        self.list.iter_mut().find(|c| c.id == id)
    }

    fn send(&self, id: usize, msg: ServerMessage) {
        if let Some(c) = self.list.iter().find(|c| c.id == id) {
            let _ = c.tx.send(msg);
        }
    }

    /// Drop a client, handing control to the oldest handshaken one if needed
    fn remove(&mut self, id: usize) {
        self.list.retain(|c| c.id != id);
        if self.controller != Some(id) {
            return;
        }
        self.controller = self
            .list
            .iter()
            .filter(|c| c.handshaken)
            .map(|c| c.id)
            .min();
        match self.controller {
            Some(next) => info!("[Adapter] client {} promoted to controller", next),
            None => info!("[Adapter] controller {} released", id),
        }
    }
}

/// Shared server state
#[derive(Debug, Default)]
pub struct ServerState {
    clients: RwLock<Clients>,
}

/// Run the server until the listener fails
///
/// `ready_tx` receives the bound address once the socket is listening (port 0
/// picks a free port).
pub async fn run_server(
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?;
    let bound = listener.local_addr()?;
    info!("[Adapter] TCP server listening on {}", bound);
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(ServerState::default());

    // Replies from the game loop.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(out) = out_rx.recv().await {
                state.clients.read().await.send(out.client_id, out.msg);
            }
        });
    }

    let mut next_id = 0usize;
    loop {
        let (socket, addr) = listener.accept().await?;
        next_id += 1;
        let client_id = next_id;
        info!("[Adapter] client {} connected from {}", client_id, addr);

        let state = Arc::clone(&state);
        let command_tx = command_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, addr, client_id, &state, command_tx).await {
                warn!("[Adapter] client {} error: {:#}", client_id, e);
            }
            state.clients.write().await.remove(client_id);
            info!("[Adapter] client {} disconnected", client_id);
        });
    }
}

async fn handle_client(
    socket: TcpStream,
    addr: SocketAddr,
    client_id: usize,
    state: &ServerState,
    command_tx: mpsc::Sender<InboundCommand>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = socket.into_split();
    let mut lines = BufReader::new(reader).lines();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    state.clients.write().await.list.push(ClientHandle {
        id: client_id,
        addr,
        handshaken: false,
        last_seq: None,
        tx: tx.clone(),
    });

    let write_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let line = match msg.to_line() {
                Ok(line) => line,
                Err(e) => {
                    warn!("[Adapter] failed to encode reply: {}", e);
                    continue;
                }
            };
            if writer.write_all(line.as_bytes()).await.is_err() {
                break;
            }
        }
    });

    while let Some(line) = lines.next_line().await? {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let reply = match parse_message(trimmed) {
            Ok(ParsedMessage::Known(msg)) => handle_message(state, client_id, msg, &command_tx).await,
            Ok(ParsedMessage::Unknown { seq }) => Some(create_error(
                seq,
                ErrorCode::InvalidCommand,
                "unknown message type",
            )),
            Err(e) => Some(create_error(
                seq_best_effort(trimmed),
                ErrorCode::InvalidCommand,
                &format!("JSON parse error: {}", e),
            )),
        };

        if let Some(reply) = reply {
            let fatal = matches!(
                reply,
                ServerMessage::Error {
                    code: ErrorCode::ProtocolMismatch,
                    ..
                }
            );
            let _ = tx.send(reply);
            if fatal {
                break;
            }
        }
    }

    drop(tx);
    state.clients.write().await.remove(client_id);
    let _ = write_task.await;
    Ok(())
}

/// Validate one message; returns an immediate reply, or `None` when the
/// command was queued for the game loop (which replies itself).
async fn handle_message(
    state: &ServerState,
    client_id: usize,
    msg: ClientMessage,
    command_tx: &mpsc::Sender<InboundCommand>,
) -> Option<ServerMessage> {
    let seq = msg.seq();
    let mut clients = state.clients.write().await;
    let controller = clients.controller;
    let client = clients.get_mut(client_id)?;

    if let ClientMessage::Hello {
        client: who,
        protocol_version,
        ..
    } = &msg
    {
        if client.handshaken && !client.advance_seq(seq) {
            return Some(create_error(seq, ErrorCode::InvalidCommand, "seq must be strictly increasing"));
        }
        if !is_supported_version(protocol_version) {
            return Some(create_error(
                seq,
                ErrorCode::ProtocolMismatch,
                &format!("protocol version {} not supported", protocol_version),
            ));
        }
        client.handshaken = true;
        client.last_seq = Some(seq);
        let addr = client.addr;

        let role = match controller {
            None => {
                clients.controller = Some(client_id);
                Role::Controller
            }
            Some(id) if id == client_id => Role::Controller,
            Some(_) => Role::Observer,
        };
        info!(
            "[Adapter] client {} ({} {} from {}) joined as {:?}",
            client_id, who.name, who.version, addr, role
        );
        return Some(create_welcome(seq, client_id as u64, role));
    }

    if !client.handshaken {
        return Some(create_error(seq, ErrorCode::HandshakeRequired, "send hello first"));
    }
    if !client.advance_seq(seq) {
        return Some(create_error(seq, ErrorCode::InvalidCommand, "seq must be strictly increasing"));
    }
    if msg.is_mutating() && controller != Some(client_id) {
        return Some(create_error(
            seq,
            ErrorCode::NotController,
            "only the controller may change the game",
        ));
    }
    drop(clients);

    let command = to_command(&msg)?;
    match command_tx.try_send(InboundCommand {
        client_id,
        seq,
        command,
    }) {
        Ok(()) => None,
        Err(TrySendError::Full(_)) => Some(create_error(seq, ErrorCode::Backpressure, "command queue is full")),
        Err(TrySendError::Closed(_)) => {
            warn!("[Adapter] game loop is gone, dropping seq {}", seq);
            Some(create_error(seq, ErrorCode::Busy, "game loop stopped"))
        }
    }
}

fn to_command(msg: &ClientMessage) -> Option<ClientCommand> {
    match *msg {
        ClientMessage::Hello { .. } => None,
        ClientMessage::Select { x, y, .. } => Some(ClientCommand::Select(Coord::new(x, y))),
        ClientMessage::Tap { wx, wy, .. } => Some(ClientCommand::Tap(WorldPos::new(wx, wy))),
        ClientMessage::Restart { seed, .. } => Some(ClientCommand::Restart(seed)),
        ClientMessage::Observe { .. } => Some(ClientCommand::Observe),
    }
}

fn seq_best_effort(line: &str) -> u64 {
    serde_json::from_str::<serde_json::Value>(line)
        .ok()
        .and_then(|v| v.get("seq").and_then(|s| s.as_u64()))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_config_from_lookup() {
        let env: HashMap<&str, &str> = [
            ("GEM_CRUSH_AI_HOST", "0.0.0.0"),
            ("GEM_CRUSH_AI_PORT", "9000"),
            ("GEM_CRUSH_AI_MAX_PENDING", "lots"),
            ("GEM_CRUSH_AI_DISABLED", "TRUE"),
        ]
        .into_iter()
        .collect();
        let cfg = ServerConfig::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.max_pending_commands, 16);
        assert!(cfg.disabled);
    }

    #[test]
    fn test_seq_must_increase() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut c = ClientHandle {
            id: 1,
            addr: "127.0.0.1:1".parse().unwrap(),
            handshaken: true,
            last_seq: None,
            tx,
        };
        assert!(c.advance_seq(5));
        assert!(!c.advance_seq(5));
        assert!(!c.advance_seq(2));
        assert!(c.advance_seq(6));
    }

    #[test]
    fn test_controller_promotion_skips_unhandshaken() {
        let mut clients = Clients::default();
        for (id, handshaken) in [(1, true), (2, false), (3, true)] {
            let (tx, _rx) = mpsc::unbounded_channel();
            clients.list.push(ClientHandle {
                id,
                addr: "127.0.0.1:1".parse().unwrap(),
                handshaken,
                last_seq: None,
                tx,
            });
        }
        clients.controller = Some(1);
        clients.remove(1);
        assert_eq!(clients.controller, Some(3));
        clients.remove(3);
        assert_eq!(clients.controller, None);
    }

    #[test]
    fn test_seq_best_effort() {
        assert_eq!(seq_best_effort(r#"{"seq":12,"type":5}"#), 12);
        assert_eq!(seq_best_effort("garbage"), 0);
    }
}
