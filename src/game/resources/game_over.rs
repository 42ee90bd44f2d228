//! Game status tracking
//!
//! Tracks end-game conditions (checkmate, draw, resignation, time forfeit) and
//! provides the status banner text.
//!
//! # State Transitions
//!
//! ```text
//! Playing → Checkmate / Draw / Resigned / TimeForfeit
//! ```
//!
//! All non-Playing states are terminal: the clock freezes and no further
//! moves are accepted.

use serde::Serialize;
use std::fmt;

use crate::game::rules::{DrawReason, RulesOutcome};
use crate::game::types::PieceColor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameStatus {
    #[default]
    Playing,
    Checkmate {
        winner: PieceColor,
    },
    Draw {
        reason: DrawReason,
    },
    Resigned {
        loser: PieceColor,
    },
    /// The flag fell for `loser`
    TimeForfeit {
        loser: PieceColor,
    },
}

/// Coarse status without payload, as shown in the status panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatusKind {
    Playing,
    Checkmate,
    Draw,
    Resigned,
    TimeForfeit,
}

impl GameStatus {
    pub fn is_playing(&self) -> bool {
        matches!(self, GameStatus::Playing)
    }

    pub fn is_game_over(&self) -> bool {
        !self.is_playing()
    }

    pub fn kind(&self) -> StatusKind {
        match self {
            GameStatus::Playing => StatusKind::Playing,
            GameStatus::Checkmate { .. } => StatusKind::Checkmate,
            GameStatus::Draw { .. } => StatusKind::Draw,
            GameStatus::Resigned { .. } => StatusKind::Resigned,
            GameStatus::TimeForfeit { .. } => StatusKind::TimeForfeit,
        }
    }

    pub fn winner(&self) -> Option<PieceColor> {
        match self {
            GameStatus::Checkmate { winner } => Some(*winner),
            GameStatus::Resigned { loser } | GameStatus::TimeForfeit { loser } => {
                Some(loser.opposite())
            }
            GameStatus::Playing | GameStatus::Draw { .. } => None,
        }
    }

    /// Human-readable banner text
    pub fn message(&self) -> String {
        match self {
            GameStatus::Playing => "Game in progress".to_string(),
            GameStatus::Checkmate { winner } => format!("{} wins by checkmate!", title(*winner)),
            GameStatus::Draw { reason } => format!("Draw by {}", reason.describe()),
            GameStatus::Resigned { loser } => {
                format!("{} resigned. {} wins!", title(*loser), title(loser.opposite()))
            }
            GameStatus::TimeForfeit { loser } => {
                format!("{} wins on time!", title(loser.opposite()))
            }
        }
    }
}

impl From<RulesOutcome> for GameStatus {
    fn from(outcome: RulesOutcome) -> Self {
        match outcome {
            RulesOutcome::Checkmate { winner } => GameStatus::Checkmate { winner },
            RulesOutcome::Draw(reason) => GameStatus::Draw { reason },
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

fn title(color: PieceColor) -> &'static str {
    match color {
        PieceColor::White => "White",
        PieceColor::Black => "Black",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_playing() {
        let status = GameStatus::default();
        assert!(status.is_playing());
        assert!(!status.is_game_over());
        assert_eq!(status.winner(), None);
    }

    #[test]
    fn test_terminal_states_are_game_over() {
        let terminal = [
            GameStatus::Checkmate {
                winner: PieceColor::White,
            },
            GameStatus::Draw {
                reason: DrawReason::Stalemate,
            },
            GameStatus::Resigned {
                loser: PieceColor::White,
            },
            GameStatus::TimeForfeit {
                loser: PieceColor::Black,
            },
        ];
        for status in terminal {
            assert!(status.is_game_over(), "{status:?} should be terminal");
        }
    }

    #[test]
    fn test_winner() {
        assert_eq!(
            GameStatus::Resigned {
                loser: PieceColor::Black
            }
            .winner(),
            Some(PieceColor::White)
        );
        assert_eq!(
            GameStatus::TimeForfeit {
                loser: PieceColor::White
            }
            .winner(),
            Some(PieceColor::Black)
        );
        assert_eq!(
            GameStatus::Draw {
                reason: DrawReason::InsufficientMaterial
            }
            .winner(),
            None
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            GameStatus::Checkmate {
                winner: PieceColor::Black
            }
            .message(),
            "Black wins by checkmate!"
        );
        assert_eq!(
            GameStatus::Draw {
                reason: DrawReason::Stalemate
            }
            .message(),
            "Draw by stalemate"
        );
        assert_eq!(
            GameStatus::TimeForfeit {
                loser: PieceColor::Black
            }
            .message(),
            "White wins on time!"
        );
    }

    #[test]
    fn test_from_rules_outcome() {
        let status: GameStatus = RulesOutcome::Checkmate {
            winner: PieceColor::White,
        }
        .into();
        assert_eq!(status.kind(), StatusKind::Checkmate);
    }
}
