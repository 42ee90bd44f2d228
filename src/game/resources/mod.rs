//! Per-session game state
//!
//! Plain data owned by a single [`crate::game::session::GameSession`]. None of
//! these types know about rules, networking or timers; the session wires them
//! together.
//!
//! - [`CurrentTurn`] and [`SessionGeneration`] in `turn`
//! - [`HighlightState`] in `selection`
//! - [`MoveHistory`] in `history`
//! - [`GameClock`] and [`TimeControl`] in `timer`
//! - [`GameStatus`] in `game_over`

pub mod game_over;
pub mod history;
pub mod selection;
pub mod timer;
pub mod turn;

pub use game_over::*;
pub use history::*;
pub use selection::*;
pub use timer::*;
pub use turn::*;
