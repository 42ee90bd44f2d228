//! Game modes
//!
//! Decides which sides local input may move and how the board is oriented.
//! The adapters that drive the remote side live in [`crate::game::ai`] and
//! [`crate::networking`].

use std::fmt;

use crate::game::ai::Difficulty;
use crate::game::types::PieceColor;
use crate::networking::RoomCode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameMode {
    /// Human against the bot service
    Robot {
        difficulty: Difficulty,
        human: PieceColor,
    },
    /// Pass-and-play on one device
    Local,
    /// Two devices sharing a room
    Online { room: RoomCode, local: PieceColor },
}

impl GameMode {
    /// Whether local input may move `side`
    pub fn controls(&self, side: PieceColor) -> bool {
        match self {
            GameMode::Robot { human, .. } => *human == side,
            GameMode::Local => true,
            GameMode::Online { local, .. } => *local == side,
        }
    }

    /// Side drawn at the bottom of the board
    pub fn orientation(&self, turn: PieceColor) -> PieceColor {
        self.local_side(turn)
    }

    /// Side this device acts for; in local play, whoever is to move
    pub fn local_side(&self, turn: PieceColor) -> PieceColor {
        match self {
            GameMode::Robot { human, .. } => *human,
            GameMode::Local => turn,
            GameMode::Online { local, .. } => *local,
        }
    }

    /// Color the bot plays, if any
    pub fn bot_color(&self) -> Option<PieceColor> {
        match self {
            GameMode::Robot { human, .. } => Some(human.opposite()),
            _ => None,
        }
    }

    /// Undo is only meaningful when both sides are driven from this device
    pub fn allows_undo(&self) -> bool {
        !matches!(self, GameMode::Online { .. })
    }

    pub fn title(&self) -> String {
        match self {
            GameMode::Robot { difficulty, .. } => format!("vs {} AI", difficulty.label()),
            GameMode::Local => "Local Match".to_string(),
            GameMode::Online { room, .. } => format!("Online Match ({room})"),
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameMode::Robot { .. } => f.write_str("robot"),
            GameMode::Local => f.write_str("local"),
            GameMode::Online { .. } => f.write_str("online"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn robot() -> GameMode {
        GameMode::Robot {
            difficulty: Difficulty::Beginner,
            human: PieceColor::Black,
        }
    }

    #[test]
    fn test_robot_controls_only_human_side() {
        let mode = robot();
        assert!(mode.controls(PieceColor::Black));
        assert!(!mode.controls(PieceColor::White));
        assert_eq!(mode.bot_color(), Some(PieceColor::White));
        assert_eq!(mode.orientation(PieceColor::White), PieceColor::Black);
    }

    #[test]
    fn test_local_flips_orientation() {
        let mode = GameMode::Local;
        assert!(mode.controls(PieceColor::White));
        assert!(mode.controls(PieceColor::Black));
        assert_eq!(mode.orientation(PieceColor::Black), PieceColor::Black);
        assert_eq!(mode.orientation(PieceColor::White), PieceColor::White);
        assert_eq!(mode.bot_color(), None);
    }

    #[test]
    fn test_online_has_no_undo() {
        let mode = GameMode::Online {
            room: "AB12CD".parse().unwrap(),
            local: PieceColor::White,
        };
        assert!(!mode.allows_undo());
        assert!(!mode.controls(PieceColor::Black));
        assert!(GameMode::Local.allows_undo());
    }

    #[test]
    fn test_titles() {
        assert_eq!(robot().title(), "vs Beginner AI");
        assert_eq!(GameMode::Local.title(), "Local Match");
        let online = GameMode::Online {
            room: "AB12CD".parse().unwrap(),
            local: PieceColor::Black,
        };
        assert_eq!(online.title(), "Online Match (AB12CD)");
    }
}
