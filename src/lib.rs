pub mod core;
pub mod game;
pub mod networking;

pub use game::{Command, ControllerHandle, GameController, GameMode, Services, SessionView};
