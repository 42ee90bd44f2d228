//! Bot opponent
//!
//! Move selection is delegated to an external service. This module only
//! decides when to ask, what to send, and whether the answer still applies.
//!
//! # Architecture
//!
//! - `resource` - [`Difficulty`] and the [`BotProfile`] it selects
//! - `client` - [`BotService`] trait and the HTTP implementation
//! - `systems` - [`RobotAdapter`], which ties requests to session generations

pub mod client;
pub mod resource;
pub mod systems;

pub use client::{
    BotError, BotRequest, BotResult, BotService, HttpBotService, DEFAULT_BOT_ENDPOINT,
    DEFAULT_BOT_TIMEOUT,
};
pub use resource::{BotProfile, Difficulty};
pub use systems::{BotReply, BotTicket, RobotAdapter};
