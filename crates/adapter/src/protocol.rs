//! Protocol module - line-delimited JSON messages
//!
//! Every message is one JSON object on one line with a `type` tag and a client
//! chosen `seq`. Server replies echo the `seq` of the request they answer.

use serde::{Deserialize, Serialize};

use crate::core::BoardSnapshot;
use crate::types::GameEvent;

pub const PROTOCOL_VERSION: &str = "1.0.0";

/// Major version prefix a client must speak
const PROTOCOL_MAJOR: &str = "1.";

// ============== Client -> Game Messages ==============

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    #[serde(default)]
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Hello {
        seq: u64,
        client: ClientInfo,
        protocol_version: String,
    },
    /// Tap a grid cell
    Select { seq: u64, x: i32, y: i32 },
    /// Tap a world position
    Tap { seq: u64, wx: f32, wy: f32 },
    Restart {
        seq: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        seed: Option<u32>,
    },
    /// Ask for a snapshot plus the events since the last observation
    Observe { seq: u64 },
}

impl ClientMessage {
    pub fn seq(&self) -> u64 {
        match self {
            ClientMessage::Hello { seq, .. }
            | ClientMessage::Select { seq, .. }
            | ClientMessage::Tap { seq, .. }
            | ClientMessage::Restart { seq, .. }
            | ClientMessage::Observe { seq } => *seq,
        }
    }

    /// Commands that change the game; only the controller may send them
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            ClientMessage::Select { .. } | ClientMessage::Tap { .. } | ClientMessage::Restart { .. }
        )
    }
}

/// Parsed incoming line
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedMessage {
    Known(ClientMessage),
    /// Valid JSON with an unrecognized `type`
    Unknown { seq: u64 },
}

/// Parse one line
///
/// An unrecognized `type` is not a parse error: the server answers it with an
/// `invalid_command` error carrying the line's `seq`.
pub fn parse_message(line: &str) -> Result<ParsedMessage, serde_json::Error> {
    match serde_json::from_str::<ClientMessage>(line) {
        Ok(msg) => Ok(ParsedMessage::Known(msg)),
        Err(e) => {
            #[derive(Deserialize)]
            struct Envelope {
                #[serde(rename = "type")]
                msg_type: Option<String>,
                seq: Option<u64>,
            }
            let env = serde_json::from_str::<Envelope>(line)?;
            let known = matches!(
                env.msg_type.as_deref(),
                Some("hello" | "select" | "tap" | "restart" | "observe")
            );
            if known {
                return Err(e);
            }
            Ok(ParsedMessage::Unknown {
                seq: env.seq.unwrap_or(0),
            })
        }
    }
}

pub fn is_supported_version(version: &str) -> bool {
    version.starts_with(PROTOCOL_MAJOR)
}

// ============== Game -> Client Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Controller,
    Observer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    HandshakeRequired,
    ProtocolMismatch,
    NotController,
    InvalidCommand,
    /// A turn is playing out
    Busy,
    /// Command queue is full
    Backpressure,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::HandshakeRequired => "handshake_required",
            ErrorCode::ProtocolMismatch => "protocol_mismatch",
            ErrorCode::NotController => "not_controller",
            ErrorCode::InvalidCommand => "invalid_command",
            ErrorCode::Busy => "busy",
            ErrorCode::Backpressure => "backpressure",
        }
    }
}

/// What an acknowledged command did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AckResult {
    Ignored,
    Selected,
    Deselected,
    MoveStarted,
    Restarted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome {
        seq: u64,
        protocol_version: String,
        client_id: u64,
        role: Role,
    },
    Ack {
        seq: u64,
        result: AckResult,
    },
    Error {
        seq: u64,
        code: ErrorCode,
        message: String,
    },
    Observation {
        seq: u64,
        snapshot: BoardSnapshot,
        events: Vec<GameEvent>,
    },
}

impl ServerMessage {
    pub fn seq(&self) -> u64 {
        match self {
            ServerMessage::Welcome { seq, .. }
            | ServerMessage::Ack { seq, .. }
            | ServerMessage::Error { seq, .. }
            | ServerMessage::Observation { seq, .. } => *seq,
        }
    }

    /// Serialize as one protocol line (with the trailing newline)
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

pub fn create_welcome(seq: u64, client_id: u64, role: Role) -> ServerMessage {
    ServerMessage::Welcome {
        seq,
        protocol_version: PROTOCOL_VERSION.to_string(),
        client_id,
        role,
    }
}

pub fn create_ack(seq: u64, result: AckResult) -> ServerMessage {
    ServerMessage::Ack { seq, result }
}

pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ServerMessage {
    ServerMessage::Error {
        seq,
        code,
        message: message.to_string(),
    }
}
