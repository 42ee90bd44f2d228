//! Rules engine boundary
//!
//! The session never decides legality on its own. Everything that depends on
//! chess rules (board position, legal destinations, check and mate detection,
//! undo) goes through the [`RulesEngine`] trait.
//!
//! # Implementations
//!
//! - [`ShakmatyRules`] - backed by the `shakmaty` crate
//!
//! # Position strings
//!
//! [`RulesEngine::position`] returns a FEN string. The session re-derives the
//! side to move from it after an undo (see [`side_to_move_from_position`])
//! rather than counting half-moves, so the turn can never drift away from the
//! authoritative board.

pub mod shakmaty_engine;

pub use shakmaty_engine::ShakmatyRules;

use crate::game::types::{ChessMove, PieceColor, Square};

/// A move the engine accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMove {
    pub from: Square,
    pub to: Square,
    /// Standard algebraic notation, e.g. `Nf3` or `exd8=Q+`
    pub san: String,
}

/// Check status of the side to move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CheckInfo {
    pub in_check: bool,
    /// King square of the side to move
    pub king_square: Option<Square>,
}

impl CheckInfo {
    /// Square to highlight, only while in check
    pub fn highlight(&self) -> Option<Square> {
        if self.in_check {
            self.king_square
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawReason {
    Stalemate,
    InsufficientMaterial,
    FiftyMoveRule,
    ThreefoldRepetition,
}

impl DrawReason {
    pub fn describe(self) -> &'static str {
        match self {
            DrawReason::Stalemate => "stalemate",
            DrawReason::InsufficientMaterial => "insufficient material",
            DrawReason::FiftyMoveRule => "fifty-move rule",
            DrawReason::ThreefoldRepetition => "threefold repetition",
        }
    }
}

/// Terminal verdict reported by the engine for the current position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RulesOutcome {
    Checkmate { winner: PieceColor },
    Draw(DrawReason),
}

/// Contract the session relies on
pub trait RulesEngine {
    /// Play `mv` if it is legal for the side to move.
    ///
    /// Returns `None` and leaves the position unchanged otherwise. A pawn
    /// reaching the last rank without an explicit promotion becomes a queen.
    fn apply_move(&mut self, mv: &ChessMove) -> Option<AppliedMove>;

    /// Serialized position (FEN)
    fn position(&self) -> String;

    fn side_to_move(&self) -> PieceColor;

    /// Destinations reachable from `from` by the side to move
    fn legal_destinations(&self, from: Square) -> Vec<Square>;

    fn check_info(&self) -> CheckInfo;

    /// Take back the last half-move. Returns `false` at the initial position.
    fn undo_last_move(&mut self) -> bool;

    /// SAN of every half-move played so far
    fn history(&self) -> Vec<String>;

    /// `Some` once the position is checkmate or a draw
    fn outcome(&self) -> Option<RulesOutcome>;

    /// Back to the initial position with an empty history
    fn reset(&mut self);
}

/// Read the side to move out of a FEN string
///
/// The second field of a FEN is `w` or `b`.
pub fn side_to_move_from_position(position: &str) -> Option<PieceColor> {
    match position.split_whitespace().nth(1)? {
        "w" => Some(PieceColor::White),
        "b" => Some(PieceColor::Black),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_to_move_from_start_position() {
        let fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
        assert_eq!(side_to_move_from_position(fen), Some(PieceColor::White));
    }

    #[test]
    fn test_side_to_move_black() {
        let fen = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";
        assert_eq!(side_to_move_from_position(fen), Some(PieceColor::Black));
    }

    #[test]
    fn test_side_to_move_malformed() {
        assert_eq!(side_to_move_from_position(""), None);
        assert_eq!(side_to_move_from_position("8/8/8/8/8/8/8/8"), None);
        assert_eq!(side_to_move_from_position("8/8/8/8/8/8/8/8 x - - 0 1"), None);
    }

    #[test]
    fn test_check_info_highlight_only_in_check() {
        let king: Square = "e1".parse().unwrap();
        let quiet = CheckInfo {
            in_check: false,
            king_square: Some(king),
        };
        assert_eq!(quiet.highlight(), None);

        let check = CheckInfo {
            in_check: true,
            king_square: Some(king),
        };
        assert_eq!(check.highlight(), Some(king));
    }
}
