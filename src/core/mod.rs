//! Core module - application infrastructure
//!
//! Everything around a game that is not the game itself.
//!
//! - [`config`] - [`GameRoute`] parsed from `/game?mode=..` and [`BoardTheme`]
//! - [`settings_persistence`] - [`AppSettings`] stored as JSON in the config dir
//! - [`error_handling`] - `tracing` subscriber setup and the panic hook
//! - [`error`] - [`CoreError`]

pub mod config;
pub mod error;
pub mod error_handling;
pub mod settings_persistence;

pub use config::{BoardTheme, ColorChoice, GameRoute};
pub use error::{CoreError, CoreResult};
pub use settings_persistence::AppSettings;
