//! [`RulesEngine`] backed by `shakmaty`
//!
//! `shakmaty` positions are immutable values without an undo operation, so
//! the engine keeps a stack of the positions that preceded each half-move
//! together with the SAN of the move that left them. Undo pops the stack.
//! The same stack answers threefold-repetition queries.

use shakmaty::fen::Fen;
use shakmaty::san::San;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, Position, Role};
use tracing::trace;

use super::{AppliedMove, CheckInfo, DrawReason, RulesEngine, RulesOutcome};
use crate::game::types::{ChessMove, PieceColor, Promotion, Square};

#[derive(Debug, Clone)]
struct PlayedMove {
    before: Chess,
    san: String,
}

#[derive(Debug, Clone, Default)]
pub struct ShakmatyRules {
    position: Chess,
    played: Vec<PlayedMove>,
}

impl ShakmatyRules {
    pub fn new() -> Self {
        Self::default()
    }

    fn to_shakmaty_square(square: Square) -> shakmaty::Square {
        shakmaty::Square::new(u32::from(square.index()))
    }

    fn from_shakmaty_square(square: shakmaty::Square) -> Option<Square> {
        Square::from_index(square as u8)
    }

    fn role(promotion: Promotion) -> Role {
        match promotion {
            Promotion::Queen => Role::Queen,
            Promotion::Rook => Role::Rook,
            Promotion::Bishop => Role::Bishop,
            Promotion::Knight => Role::Knight,
        }
    }

    fn color(color: Color) -> PieceColor {
        match color {
            Color::White => PieceColor::White,
            Color::Black => PieceColor::Black,
        }
    }

    fn find_legal(&self, mv: &ChessMove) -> Option<shakmaty::Move> {
        let uci = UciMove::Normal {
            from: Self::to_shakmaty_square(mv.from),
            to: Self::to_shakmaty_square(mv.to),
            promotion: mv.promotion.map(Self::role),
        };
        if let Ok(found) = uci.to_move(&self.position) {
            return Some(found);
        }
        if mv.promotion.is_some() {
            return None;
        }
        // Pawn pushes onto the last rank need a promotion piece
        let queening = UciMove::Normal {
            from: Self::to_shakmaty_square(mv.from),
            to: Self::to_shakmaty_square(mv.to),
            promotion: Some(Role::Queen),
        };
        queening.to_move(&self.position).ok()
    }

    /// FEN without the move counters, used for repetition detection
    fn repetition_key(position: &Chess) -> String {
        let fen = Fen::from_position(position.clone(), EnPassantMode::Legal).to_string();
        fen.split_whitespace().take(4).collect::<Vec<_>>().join(" ")
    }

    fn is_threefold_repetition(&self) -> bool {
        let current = Self::repetition_key(&self.position);
        let earlier = self
            .played
            .iter()
            .filter(|played| Self::repetition_key(&played.before) == current)
            .count();
        earlier + 1 >= 3
    }
}

impl RulesEngine for ShakmatyRules {
    fn apply_move(&mut self, mv: &ChessMove) -> Option<AppliedMove> {
        let Some(legal) = self.find_legal(mv) else {
            trace!("[RULES] Rejected {}", mv);
            return None;
        };

        let san = San::from_move(&self.position, &legal).to_string();
        let before = self.position.clone();
        self.position.play_unchecked(&legal);
        self.played.push(PlayedMove {
            before,
            san: san.clone(),
        });

        Some(AppliedMove {
            from: mv.from,
            to: mv.to,
            san,
        })
    }

    fn position(&self) -> String {
        Fen::from_position(self.position.clone(), EnPassantMode::Legal).to_string()
    }

    fn side_to_move(&self) -> PieceColor {
        Self::color(self.position.turn())
    }

    fn legal_destinations(&self, from: Square) -> Vec<Square> {
        let from = Self::to_shakmaty_square(from);
        let mut destinations: Vec<Square> = Vec::new();
        for legal in self.position.legal_moves().iter() {
            // Castling is reported king-to-destination, not king-takes-rook
            if let UciMove::Normal {
                from: origin, to, ..
            } = legal.to_uci(CastlingMode::Standard)
            {
                if origin != from {
                    continue;
                }
                if let Some(to) = Self::from_shakmaty_square(to) {
                    if !destinations.contains(&to) {
                        destinations.push(to);
                    }
                }
            }
        }
        destinations.sort();
        destinations
    }

    fn check_info(&self) -> CheckInfo {
        let king_square = self
            .position
            .board()
            .king_of(self.position.turn())
            .and_then(Self::from_shakmaty_square);
        CheckInfo {
            in_check: self.position.is_check(),
            king_square,
        }
    }

    fn undo_last_move(&mut self) -> bool {
        match self.played.pop() {
            Some(played) => {
                self.position = played.before;
                true
            }
            None => false,
        }
    }

    fn history(&self) -> Vec<String> {
        self.played.iter().map(|played| played.san.clone()).collect()
    }

    fn outcome(&self) -> Option<RulesOutcome> {
        if self.position.is_checkmate() {
            let winner = Self::color(self.position.turn()).opposite();
            return Some(RulesOutcome::Checkmate { winner });
        }
        if self.position.is_stalemate() {
            return Some(RulesOutcome::Draw(DrawReason::Stalemate));
        }
        if self.position.is_insufficient_material() {
            return Some(RulesOutcome::Draw(DrawReason::InsufficientMaterial));
        }
        if self.position.halfmoves() >= 100 {
            return Some(RulesOutcome::Draw(DrawReason::FiftyMoveRule));
        }
        if self.is_threefold_repetition() {
            return Some(RulesOutcome::Draw(DrawReason::ThreefoldRepetition));
        }
        None
    }

    fn reset(&mut self) {
        self.position = Chess::default();
        self.played.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::rules::side_to_move_from_position;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    fn mv(text: &str) -> ChessMove {
        ChessMove::from_coordinates(text).unwrap()
    }

    fn play_all(rules: &mut ShakmatyRules, moves: &[&str]) {
        for m in moves {
            assert!(rules.apply_move(&mv(m)).is_some(), "{m} should be legal");
        }
    }

    #[test]
    fn test_initial_position() {
        let rules = ShakmatyRules::new();
        assert_eq!(
            rules.position(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
        );
        assert_eq!(rules.side_to_move(), PieceColor::White);
        assert!(rules.history().is_empty());
        assert_eq!(rules.outcome(), None);
    }

    #[test]
    fn test_apply_legal_move() {
        let mut rules = ShakmatyRules::new();
        let applied = rules.apply_move(&mv("e2e4")).expect("e2e4 is legal");
        assert_eq!(applied.san, "e4");
        assert_eq!(rules.side_to_move(), PieceColor::Black);
        assert_eq!(
            side_to_move_from_position(&rules.position()),
            Some(PieceColor::Black)
        );
        assert_eq!(rules.history(), vec!["e4".to_string()]);
    }

    #[test]
    fn test_reject_illegal_move_leaves_position() {
        let mut rules = ShakmatyRules::new();
        let before = rules.position();
        assert!(rules.apply_move(&mv("e2e5")).is_none());
        assert!(rules.apply_move(&mv("e7e5")).is_none(), "black cannot move first");
        assert_eq!(rules.position(), before);
        assert!(rules.history().is_empty());
    }

    #[test]
    fn test_legal_destinations_from_knight() {
        let rules = ShakmatyRules::new();
        assert_eq!(rules.legal_destinations(sq("g1")), vec![sq("f3"), sq("h3")]);
        assert!(rules.legal_destinations(sq("e1")).is_empty());
        assert!(rules.legal_destinations(sq("e7")).is_empty(), "not black's turn");
    }

    #[test]
    fn test_castling_destination_is_king_target() {
        let mut rules = ShakmatyRules::new();
        play_all(&mut rules, &["e2e4", "e7e5", "g1f3", "b8c6", "f1c4", "g8f6"]);
        let destinations = rules.legal_destinations(sq("e1"));
        assert!(destinations.contains(&sq("g1")));
        assert!(!destinations.contains(&sq("h1")));

        let applied = rules.apply_move(&mv("e1g1")).expect("castling is legal");
        assert_eq!(applied.san, "O-O");
    }

    #[test]
    fn test_undo_restores_previous_position() {
        let mut rules = ShakmatyRules::new();
        let start = rules.position();
        play_all(&mut rules, &["d2d4", "d7d5"]);
        assert!(rules.undo_last_move());
        assert_eq!(rules.side_to_move(), PieceColor::Black);
        assert!(rules.undo_last_move());
        assert_eq!(rules.position(), start);
        assert!(!rules.undo_last_move(), "nothing left to undo");
    }

    #[test]
    fn test_fools_mate_is_checkmate() {
        let mut rules = ShakmatyRules::new();
        play_all(&mut rules, &["f2f3", "e7e5", "g2g4", "d8h4"]);
        let check = rules.check_info();
        assert!(check.in_check);
        assert_eq!(check.king_square, Some(sq("e1")));
        assert_eq!(
            rules.outcome(),
            Some(RulesOutcome::Checkmate {
                winner: PieceColor::Black
            })
        );
    }

    const PROMOTION_LINE: [&str; 8] = [
        "a2a4", "b7b5", "a4b5", "a7a6", "b5a6", "c8b7", "a6a7", "e7e6",
    ];

    #[test]
    fn test_promotion_defaults_to_queen() {
        let mut rules = ShakmatyRules::new();
        play_all(&mut rules, &PROMOTION_LINE);
        let applied = rules.apply_move(&mv("a7b8")).expect("capture-promotion is legal");
        assert!(applied.san.contains("=Q"), "got {}", applied.san);
    }

    #[test]
    fn test_explicit_underpromotion() {
        let mut rules = ShakmatyRules::new();
        play_all(&mut rules, &PROMOTION_LINE);
        let knight = mv("a7b8").with_promotion(Promotion::Knight);
        let applied = rules.apply_move(&knight).expect("underpromotion is legal");
        assert!(applied.san.contains("=N"), "got {}", applied.san);
    }

    #[test]
    fn test_threefold_repetition_is_draw() {
        let mut rules = ShakmatyRules::new();
        play_all(
            &mut rules,
            &["g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1", "f6g8"],
        );
        assert_eq!(
            rules.outcome(),
            Some(RulesOutcome::Draw(DrawReason::ThreefoldRepetition))
        );
    }

    #[test]
    fn test_reset_returns_to_start() {
        let mut rules = ShakmatyRules::new();
        play_all(&mut rules, &["e2e4"]);
        rules.reset();
        assert_eq!(rules.side_to_move(), PieceColor::White);
        assert!(rules.history().is_empty());
        assert!(!rules.undo_last_move());
    }
}
