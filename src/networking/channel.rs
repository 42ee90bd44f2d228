//! Room channel abstraction and the in-process relay
//!
//! A room pairs exactly two clients by a short code. The relay forwards each
//! client's moves to the other member and never looks at chess rules; every
//! client validates what it receives against its own engine.
//!
//! Frames travel as JSON text (see [`shared::protocol`]) even in-process, so
//! [`LocalRoomHub`] exercises the same encoding a socket transport would.

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::Rng;
use serde::{Deserialize, Serialize};
use shared::{RoomMessage, WireMove};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const ROOM_CODE_LEN: usize = 6;
pub const MAX_ROOM_MEMBERS: usize = 2;
const ROOM_CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    #[error("invalid room code '{0}'")]
    InvalidRoomCode(String),

    #[error("room {0} is full")]
    RoomFull(RoomCode),

    #[error("not a member of room {0}")]
    NotJoined(RoomCode),

    #[error("protocol error: {0}")]
    Protocol(String),
}

pub type ChannelResult<T> = Result<T, ChannelError>;

/// Six uppercase alphanumeric characters, e.g. `AB12CD`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomCode(String);

impl RoomCode {
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let code = (0..ROOM_CODE_LEN)
            .map(|_| ROOM_CODE_CHARSET[rng.random_range(0..ROOM_CODE_CHARSET.len())] as char)
            .collect();
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RoomCode {
    type Err = ChannelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        if code.len() == ROOM_CODE_LEN && code.bytes().all(|b| b.is_ascii_alphanumeric()) {
            Ok(Self(code))
        } else {
            Err(ChannelError::InvalidRoomCode(s.to_string()))
        }
    }
}

impl TryFrom<String> for RoomCode {
    type Error = ChannelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RoomCode> for String {
    fn from(code: RoomCode) -> Self {
        code.0
    }
}

/// Identifies one client connection inside a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemberId(Uuid);

impl MemberId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MemberId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Incoming side of a joined room
///
/// Yields `None` once the relay drops the connection.
pub struct RoomSubscription {
    pub room: RoomCode,
    pub member: MemberId,
    frames: mpsc::UnboundedReceiver<String>,
}

impl RoomSubscription {
    pub fn new(room: RoomCode, member: MemberId, frames: mpsc::UnboundedReceiver<String>) -> Self {
        Self {
            room,
            member,
            frames,
        }
    }

    /// Next decodable message; undecodable frames are logged and skipped
    pub async fn recv(&mut self) -> Option<RoomMessage> {
        loop {
            let frame = self.frames.recv().await?;
            match RoomMessage::from_json(&frame) {
                Ok(message) => return Some(message),
                Err(e) => warn!("[ROOM] Dropping malformed frame in {}: {}", self.room, e),
            }
        }
    }
}

#[async_trait]
pub trait RoomChannel: Send + Sync {
    async fn join(&self, room: &RoomCode) -> ChannelResult<RoomSubscription>;

    fn publish(&self, room: &RoomCode, member: MemberId, mv: WireMove) -> ChannelResult<()>;

    fn leave(&self, room: &RoomCode, member: MemberId);
}

struct Member {
    id: MemberId,
    outbox: mpsc::UnboundedSender<String>,
}

#[derive(Default)]
struct HubRoom {
    members: Vec<Member>,
    in_game: bool,
}

impl HubRoom {
    fn send_to(&self, target: MemberId, message: &RoomMessage) {
        let Some(member) = self.members.iter().find(|m| m.id == target) else {
            return;
        };
        match message.to_json() {
            Ok(frame) => {
                let _ = member.outbox.send(frame);
            }
            Err(e) => warn!("[ROOM] Failed to encode {:?}: {}", message, e),
        }
    }

    fn send_to_others(&self, sender: MemberId, message: &RoomMessage) {
        for member in self.members.iter().filter(|m| m.id != sender) {
            self.send_to(member.id, message);
        }
    }

    fn contains(&self, member: MemberId) -> bool {
        self.members.iter().any(|m| m.id == member)
    }
}

/// In-process relay pairing clients by room code
///
/// Cloning shares the same set of rooms.
#[derive(Clone, Default)]
pub struct LocalRoomHub {
    rooms: Arc<Mutex<HashMap<RoomCode, HubRoom>>>,
}

impl LocalRoomHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn member_count(&self, room: &RoomCode) -> usize {
        self.rooms
            .lock()
            .get(room)
            .map(|r| r.members.len())
            .unwrap_or(0)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.lock().len()
    }

    /// Drop every connection to `room`, as a relay restart would
    pub fn close_room(&self, room: &RoomCode) {
        if self.rooms.lock().remove(room).is_some() {
            info!("[ROOM] Closed room {}", room);
        }
    }

    /// Deliver a raw text frame to every member of `room`
    pub fn broadcast_frame(&self, room: &RoomCode, frame: &str) {
        if let Some(hub_room) = self.rooms.lock().get(room) {
            for member in &hub_room.members {
                let _ = member.outbox.send(frame.to_string());
            }
        }
    }

    /// Relay-side handling of a client frame
    pub fn handle_client_frame(&self, member: MemberId, frame: &str) -> ChannelResult<()> {
        let message =
            RoomMessage::from_json(frame).map_err(|e| ChannelError::Protocol(e.to_string()))?;
        if !message.is_client_message() {
            return Err(ChannelError::Protocol(format!(
                "clients may not send {message:?}"
            )));
        }

        match message {
            RoomMessage::Move { room_code, mv } => {
                let code: RoomCode = room_code.parse()?;
                let rooms = self.rooms.lock();
                let hub_room = rooms
                    .get(&code)
                    .filter(|r| r.contains(member))
                    .ok_or_else(|| ChannelError::NotJoined(code.clone()))?;
                debug!("[ROOM] {} relays {}-{} in {}", member, mv.from, mv.to, code);
                hub_room.send_to_others(member, &RoomMessage::OpponentMove(mv));
                Ok(())
            }
            RoomMessage::LeaveRoom(room_code) => {
                let code: RoomCode = room_code.parse()?;
                self.remove_member(&code, member);
                Ok(())
            }
            RoomMessage::JoinRoom(room_code) => Err(ChannelError::Protocol(format!(
                "join for {room_code} must go through RoomChannel::join"
            ))),
            other => Err(ChannelError::Protocol(format!("unexpected {other:?}"))),
        }
    }

    fn remove_member(&self, room: &RoomCode, member: MemberId) {
        let mut rooms = self.rooms.lock();
        let Some(hub_room) = rooms.get_mut(room) else {
            return;
        };
        if !hub_room.contains(member) {
            return;
        }
        hub_room.members.retain(|m| m.id != member);
        info!("[ROOM] {} left room {}", member, room);

        if hub_room.members.is_empty() {
            rooms.remove(room);
            debug!("[ROOM] Room {} removed", room);
        } else {
            hub_room.send_to_others(member, &RoomMessage::OpponentLeft);
        }
    }
}

#[async_trait]
impl RoomChannel for LocalRoomHub {
    async fn join(&self, room: &RoomCode) -> ChannelResult<RoomSubscription> {
        let (outbox, frames) = mpsc::unbounded_channel();
        let member = MemberId::new();

        let mut rooms = self.rooms.lock();
        let hub_room = rooms.entry(room.clone()).or_default();
        if hub_room.members.len() >= MAX_ROOM_MEMBERS {
            return Err(ChannelError::RoomFull(room.clone()));
        }
        hub_room.members.push(Member { id: member, outbox });
        info!(
            "[ROOM] {} joined room {} ({}/{})",
            member,
            room,
            hub_room.members.len(),
            MAX_ROOM_MEMBERS
        );

        if hub_room.members.len() == MAX_ROOM_MEMBERS && !hub_room.in_game {
            hub_room.in_game = true;
            info!("[ROOM] Starting game in room {}", room);
            for target in hub_room.members.iter().map(|m| m.id) {
                hub_room.send_to(target, &RoomMessage::StartGame);
            }
        }

        Ok(RoomSubscription::new(room.clone(), member, frames))
    }

    fn publish(&self, room: &RoomCode, member: MemberId, mv: WireMove) -> ChannelResult<()> {
        let frame = RoomMessage::Move {
            room_code: room.to_string(),
            mv,
        }
        .to_json()
        .map_err(|e| ChannelError::Protocol(e.to_string()))?;
        self.handle_client_frame(member, &frame)
    }

    fn leave(&self, room: &RoomCode, member: MemberId) {
        self.remove_member(room, member);
    }
}
