//! Error types for core module
//!
//! Provides custom error types for settings persistence and route parsing.

use thiserror::Error;

use crate::game::error::GameError;
use crate::networking::ChannelError;

/// Errors that can occur in the core module
#[derive(Error, Debug)]
pub enum CoreError {
    /// Settings file I/O error
    #[error("Settings I/O error: {0}")]
    SettingsIo(#[from] std::io::Error),

    /// Settings serialization/deserialization error
    #[error("Settings serialization error: {0}")]
    SettingsSerialization(#[from] serde_json::Error),

    /// Configured endpoint is not a valid URL
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Game route query could not be understood
    #[error("Invalid game route: {message}")]
    Route { message: String },

    #[error(transparent)]
    Game(#[from] GameError),

    #[error(transparent)]
    Channel(#[from] ChannelError),
}

/// Result type alias for core operations
pub type CoreResult<T> = Result<T, CoreError>;
