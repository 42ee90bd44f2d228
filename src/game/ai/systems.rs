//! Robot adapter
//!
//! Requests a move from the [`BotService`] whenever it becomes the bot's turn
//! and applies the reply through [`GameSession::apply_move`], the same path
//! human moves take.
//!
//! # Request lifecycle
//!
//! ```text
//! bot's turn ─► maybe_request ─► spawn(service call ∥ thinking delay) ─► SessionEvent::Bot
//!                    │                                                        │
//!                    └─ ticket = (generation, ply)           accept_reply ◄───┘
//!                                                               │
//!                                    ticket still current? ─────┴─► apply_move
//! ```
//!
//! A ticket is issued at most once, so a failed request is not retried for
//! the same position. Undo, resignation and new game all bump the session
//! generation, which turns any reply still in flight into a stale one.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::client::{BotError, BotRequest, BotResult, BotService, DEFAULT_BOT_TIMEOUT};
use super::resource::Difficulty;
use crate::game::controller::SessionEvent;
use crate::game::resources::SessionGeneration;
use crate::game::rules::RulesEngine;
use crate::game::session::{GameSession, MoveOutcome};
use crate::game::types::{ChessMove, PieceColor};

/// Identifies the position a bot request was made for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BotTicket {
    pub generation: SessionGeneration,
    pub ply: usize,
}

impl BotTicket {
    pub fn for_session<R: RulesEngine>(session: &GameSession<R>) -> Self {
        Self {
            generation: session.generation(),
            ply: session.history().len(),
        }
    }
}

#[derive(Debug)]
pub struct BotReply {
    pub ticket: BotTicket,
    pub result: BotResult<ChessMove>,
}

pub struct RobotAdapter {
    service: Arc<dyn BotService>,
    difficulty: Difficulty,
    bot_color: PieceColor,
    timeout: Duration,
    issued: Option<BotTicket>,
    task: Option<JoinHandle<()>>,
    requests_sent: u64,
}

impl RobotAdapter {
    pub fn new(service: Arc<dyn BotService>, difficulty: Difficulty, bot_color: PieceColor) -> Self {
        Self {
            service,
            difficulty,
            bot_color,
            timeout: DEFAULT_BOT_TIMEOUT,
            issued: None,
            task: None,
            requests_sent: 0,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn bot_color(&self) -> PieceColor {
        self.bot_color
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// True while a request is outstanding
    pub fn is_thinking(&self) -> bool {
        self.task.is_some()
    }

    pub fn requests_sent(&self) -> u64 {
        self.requests_sent
    }

    /// Ask the bot for a move if it is its turn and none was asked for yet
    ///
    /// Returns whether a request was sent.
    pub fn maybe_request<R: RulesEngine>(
        &mut self,
        session: &GameSession<R>,
        events: &mpsc::UnboundedSender<SessionEvent>,
    ) -> bool {
        if !session.status().is_playing() || session.turn() != self.bot_color {
            return false;
        }
        let ticket = BotTicket::for_session(session);
        if self.issued == Some(ticket) {
            return false;
        }
        self.cancel();

        let request = BotRequest::new(session.position(), self.difficulty);
        let delay = self.difficulty.profile().thinking_delay;
        let timeout = self.timeout;
        let service = Arc::clone(&self.service);
        let events = events.clone();

        info!(
            "[BOT] Requesting {} move (ply {}, {})",
            self.bot_color, ticket.ply, self.difficulty
        );
        self.task = Some(tokio::spawn(async move {
            let call = async {
                tokio::time::timeout(timeout, service.best_move(request))
                    .await
                    .unwrap_or(Err(BotError::Timeout(timeout)))
            };
            let (result, ()) = tokio::join!(call, tokio::time::sleep(delay));
            let _ = events.send(SessionEvent::Bot(BotReply { ticket, result }));
        }));
        self.issued = Some(ticket);
        self.requests_sent += 1;
        true
    }

    /// Apply a reply if it still matches the session
    ///
    /// Returns the outcome when a move was attempted.
    pub fn accept_reply<R: RulesEngine>(
        &mut self,
        session: &mut GameSession<R>,
        reply: BotReply,
    ) -> Option<MoveOutcome> {
        if self.issued != Some(reply.ticket) {
            debug!("[BOT] Dropping reply for cancelled request {:?}", reply.ticket);
            return None;
        }
        self.task = None;

        if BotTicket::for_session(session) != reply.ticket
            || !session.status().is_playing()
            || session.turn() != self.bot_color
        {
            debug!("[BOT] Discarding stale reply {:?}", reply.ticket);
            return None;
        }

        match reply.result {
            Ok(mv) => {
                let outcome = session.apply_move(&mv);
                if !outcome.accepted {
                    warn!("[BOT] Service suggested illegal move {}", mv);
                }
                Some(outcome)
            }
            Err(e) => {
                warn!("[BOT] No move from bot service: {}", e);
                None
            }
        }
    }

    /// Half-moves an undo must take back so the human is to move again
    pub fn undo_plies<R: RulesEngine>(&self, session: &GameSession<R>) -> usize {
        let played = session.history().len();
        if session.turn() == self.bot_color {
            // the bot has not answered the human's last move yet
            played.min(1)
        } else if played >= 2 {
            2
        } else {
            // only the bot's opening move is on the board
            0
        }
    }

    /// Abort any outstanding request
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("[BOT] Cancelled outstanding request");
        }
        self.issued = None;
    }
}

impl Drop for RobotAdapter {
    fn drop(&mut self) {
        self.cancel();
    }
}
