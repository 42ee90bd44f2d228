//! Chess game logic module
//!
//! One game on screen is one [`session::GameSession`], driven by one
//! [`controller::GameController`]. Legality, check and mate detection are
//! delegated to a [`rules::RulesEngine`]; the session only keeps turn, clock,
//! history and highlights consistent with it.
//!
//! # Module Organization
//!
//! - `types` - Squares, colors and moves shared by everything else
//! - `rules` - Rules engine trait and the `shakmaty` implementation
//! - `resources` - Per-session state (turn, clock, history, highlights, status)
//! - `session` - The state machine that applies moves and runs the clock
//! - `modes` - Robot, local and online play
//! - `ai` - Bot service client and the robot adapter
//! - `controller` - Async event loop owning a session
//! - `view` - Read-only projection published to front ends
//!
//! # Flow
//!
//! 1. Input arrives as a [`controller::Command`] or an async event
//! 2. The session validates it through the rules engine
//! 3. On acceptance history, clock, turn and highlights update together
//! 4. The controller republishes a [`view::SessionView`]

pub mod ai;
pub mod controller;
pub mod error;
pub mod modes;
pub mod resources;
pub mod rules;
pub mod session;
pub mod types;
pub mod view;

pub use controller::{Command, ControllerHandle, GameController, Services};
pub use error::{GameError, GameResult};
pub use modes::GameMode;
pub use session::{GameSession, MoveOutcome, TickOutcome};
pub use view::{AdapterStatus, SessionView};
