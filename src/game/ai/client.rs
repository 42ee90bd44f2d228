//! Bot service client
//!
//! The bot is an external HTTP service. We send it the current position and
//! the difficulty profile, and it answers with a 4 or 5 character coordinate
//! move:
//!
//! ```text
//! POST /move  {"position": "<fen>", "difficulty": "casual", "skillLevel": 5, "depth": 4}
//! 200         {"bestMove": "e7e5"}
//! ```
//!
//! The reply is only a suggestion. It goes through the rules engine like any
//! other move.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::resource::Difficulty;
use crate::game::types::ChessMove;

pub const DEFAULT_BOT_ENDPOINT: &str = "http://127.0.0.1:5000/move";
pub const DEFAULT_BOT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error("bot service request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("bot service answered with status {0}")]
    Status(reqwest::StatusCode),

    #[error("bot service returned malformed move '{0}'")]
    MalformedMove(String),

    #[error("bot service did not answer within {0:?}")]
    Timeout(Duration),

    #[error("bot service unavailable: {0}")]
    Unavailable(String),
}

pub type BotResult<T> = Result<T, BotError>;

/// Body of a move request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotRequest {
    pub position: String,
    pub difficulty: Difficulty,
    pub skill_level: u8,
    pub depth: u8,
}

impl BotRequest {
    pub fn new(position: impl Into<String>, difficulty: Difficulty) -> Self {
        let profile = difficulty.profile();
        Self {
            position: position.into(),
            difficulty,
            skill_level: profile.skill_level,
            depth: profile.search_depth,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BotReply {
    best_move: String,
}

#[async_trait]
pub trait BotService: Send + Sync {
    async fn best_move(&self, request: BotRequest) -> BotResult<ChessMove>;
}

/// [`BotService`] backed by an HTTP endpoint
#[derive(Debug, Clone)]
pub struct HttpBotService {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpBotService {
    pub fn new(endpoint: Url, timeout: Duration) -> BotResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl BotService for HttpBotService {
    async fn best_move(&self, request: BotRequest) -> BotResult<ChessMove> {
        debug!(
            "[BOT] POST {} ({}, depth {})",
            self.endpoint, request.difficulty, request.depth
        );
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BotError::Status(status));
        }

        let reply: BotReply = response.json().await?;
        ChessMove::from_coordinates(reply.best_move.trim())
            .map_err(|_| BotError::MalformedMove(reply.best_move))
    }
}
