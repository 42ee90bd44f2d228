//! Error types for game module
//!
//! Provides custom error types for input parsing and session operations
//! such as undo and resignation.
//!
//! Illegal moves are not errors: the session reports them through
//! `MoveOutcome::accepted` and leaves its state untouched.

use crate::game::types::PieceColor;

/// Errors that can occur in game logic
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GameError {
    /// Malformed square, move, or color text
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// Operation attempted after the game reached a terminal status
    #[error("Game is over: {status}")]
    GameOver { status: String },

    /// Side tried to act while it was not their turn
    #[error("It is {color}'s turn, which this device does not control")]
    NotYourTurn { color: PieceColor },

    /// Action is not offered in the current game mode
    #[error("{action} is not available in {mode} mode")]
    NotAvailable { action: &'static str, mode: String },

    /// Online move attempted before the second player joined the room
    #[error("Waiting for an opponent to join room {room}")]
    WaitingForOpponent { room: String },

    /// Resignation confirmed without a pending request
    #[error("No resignation is pending")]
    NoPendingResignation,

    /// Mode needs a bot service or room channel that was not provided
    #[error("No {service} configured for {mode} mode")]
    ServiceUnavailable {
        mode: String,
        service: &'static str,
    },
}

/// Result type alias for game operations
pub type GameResult<T> = Result<T, GameError>;
