//! Online adapter
//!
//! Bridges a [`RoomChannel`] to the game session. Local moves are published
//! after the engine accepts them and before the turn flips; opponent moves go
//! through the same validated path as local input. Local input is refused
//! until the relay reports that the second player has joined.
//!
//! There is no reconnect. When the channel drops, the session keeps playing
//! but the remote side never moves again.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use shared::{RoomMessage, WireMove};

use super::channel::{ChannelResult, MemberId, RoomChannel, RoomCode};
use crate::game::controller::SessionEvent;
use crate::game::error::{GameError, GameResult};
use crate::game::rules::RulesEngine;
use crate::game::session::{GameSession, MoveOutcome};
use crate::game::types::{ChessMove, PieceColor};

/// What the room subscription delivers to the controller
#[derive(Debug, Clone, PartialEq)]
pub enum RoomEvent {
    Message(RoomMessage),
    /// The relay closed the connection
    Disconnected,
}

pub struct OnlineAdapter {
    channel: Arc<dyn RoomChannel>,
    room: RoomCode,
    local: PieceColor,
    member: Option<MemberId>,
    forward: Option<JoinHandle<()>>,
    opponent_present: bool,
    connected: bool,
}

impl OnlineAdapter {
    pub fn new(channel: Arc<dyn RoomChannel>, room: RoomCode, local: PieceColor) -> Self {
        Self {
            channel,
            room,
            local,
            member: None,
            forward: None,
            opponent_present: false,
            connected: false,
        }
    }

    pub fn room(&self) -> &RoomCode {
        &self.room
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn opponent_present(&self) -> bool {
        self.opponent_present
    }

    /// Refuse local input until the room has both players
    pub fn ensure_opponent(&self) -> GameResult<()> {
        if self.opponent_present {
            Ok(())
        } else {
            Err(GameError::WaitingForOpponent {
                room: self.room.to_string(),
            })
        }
    }

    /// Join the room and start forwarding its messages into `events`
    pub async fn mount(&mut self, events: &mpsc::UnboundedSender<SessionEvent>) -> ChannelResult<()> {
        let mut subscription = self.channel.join(&self.room).await?;
        self.member = Some(subscription.member);
        self.connected = true;
        info!(
            "[ONLINE] Joined room {} as {} ({})",
            self.room, self.local, subscription.member
        );

        let events = events.clone();
        self.forward = Some(tokio::spawn(async move {
            while let Some(message) = subscription.recv().await {
                if events
                    .send(SessionEvent::Room(RoomEvent::Message(message)))
                    .is_err()
                {
                    return;
                }
            }
            let _ = events.send(SessionEvent::Room(RoomEvent::Disconnected));
        }));
        Ok(())
    }

    /// Apply a move made on this device and publish it to the room
    pub fn play_local<R: RulesEngine>(
        &self,
        session: &mut GameSession<R>,
        mv: &ChessMove,
    ) -> MoveOutcome {
        session.apply_move_observed(mv, |accepted| self.publish(accepted))
    }

    fn publish(&self, mv: &ChessMove) {
        let Some(member) = self.member else {
            warn!("[ONLINE] Not joined, {} stays local", mv);
            return;
        };
        if let Err(e) = self.channel.publish(&self.room, member, WireMove::from(mv)) {
            warn!("[ONLINE] Failed to publish {}: {}", mv, e);
        }
    }

    pub fn handle_event<R: RulesEngine>(
        &mut self,
        session: &mut GameSession<R>,
        event: RoomEvent,
    ) -> Option<MoveOutcome> {
        match event {
            RoomEvent::Message(RoomMessage::StartGame) => {
                self.opponent_present = true;
                info!("[ONLINE] Opponent joined room {}", self.room);
                None
            }
            RoomEvent::Message(RoomMessage::OpponentMove(wire)) => {
                self.apply_remote(session, &wire)
            }
            RoomEvent::Message(RoomMessage::OpponentLeft) => {
                self.opponent_present = false;
                info!("[ONLINE] Opponent left room {}", self.room);
                None
            }
            RoomEvent::Message(RoomMessage::Error { message }) => {
                warn!("[ONLINE] Relay error: {}", message);
                None
            }
            RoomEvent::Message(other) => {
                debug!("[ONLINE] Ignoring {:?}", other);
                None
            }
            RoomEvent::Disconnected => {
                self.connected = false;
                self.forward = None;
                warn!(
                    "[ONLINE] Lost connection to room {}, opponent is frozen",
                    self.room
                );
                None
            }
        }
    }

    fn apply_remote<R: RulesEngine>(
        &self,
        session: &mut GameSession<R>,
        wire: &WireMove,
    ) -> Option<MoveOutcome> {
        let mv = match ChessMove::try_from(wire) {
            Ok(mv) => mv,
            Err(e) => {
                warn!("[ONLINE] Malformed opponent move {:?}: {}", wire, e);
                return None;
            }
        };
        if session.turn() == self.local {
            warn!("[ONLINE] Opponent sent {} out of turn", mv);
            return None;
        }

        let outcome = session.apply_move(&mv);
        if !outcome.accepted {
            warn!("[ONLINE] Rejected illegal opponent move {}", mv);
        }
        Some(outcome)
    }

    /// Stop forwarding and leave the room
    pub fn unmount(&mut self) {
        if let Some(task) = self.forward.take() {
            task.abort();
        }
        if let Some(member) = self.member.take() {
            self.channel.leave(&self.room, member);
            debug!("[ONLINE] Left room {}", self.room);
        }
        self.connected = false;
    }
}

impl Drop for OnlineAdapter {
    fn drop(&mut self) {
        self.unmount();
    }
}
