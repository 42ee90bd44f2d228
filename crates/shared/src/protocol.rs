//! Room channel wire protocol
//!
//! Messages exchanged between a game client and the room relay. The JSON
//! shape follows the socket.io convention of an event name plus an optional
//! payload:
//!
//! ```text
//! {"event":"join-room","data":"AB12CD"}
//! {"event":"move","data":{"roomCode":"AB12CD","move":{"from":"e2","to":"e4"}}}
//! {"event":"opponent-move","data":{"from":"e2","to":"e4"}}
//! {"event":"start-game"}
//! ```
//!
//! Squares travel as plain algebraic strings. Clients must still validate
//! every received move against their own rules engine.

use serde::{Deserialize, Serialize};

/// A move as it travels over the wire
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct WireMove {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<String>,
}

impl WireMove {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            promotion: None,
        }
    }
}

/// Room-level messages
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum RoomMessage {
    // Client → Relay
    JoinRoom(String),
    Move {
        #[serde(rename = "roomCode")]
        room_code: String,
        #[serde(rename = "move")]
        mv: WireMove,
    },
    LeaveRoom(String),

    // Relay → Client
    StartGame,
    OpponentMove(WireMove),
    OpponentLeft,
    Error { message: String },
}

impl RoomMessage {
    /// Whether a client is allowed to send this message to the relay
    pub fn is_client_message(&self) -> bool {
        matches!(
            self,
            RoomMessage::JoinRoom(_) | RoomMessage::Move { .. } | RoomMessage::LeaveRoom(_)
        )
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}
