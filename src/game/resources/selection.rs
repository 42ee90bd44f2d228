//! Board highlight state
//!
//! Derived and ephemeral: recomputed after every accepted move or selection
//! event and never persisted.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::game::types::Square;

/// How a square should be drawn
///
/// When one square qualifies for several kinds, the later variant wins:
/// check over legal destination over last move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HighlightKind {
    LastMoveFrom,
    LastMoveTo,
    LegalMove,
    Check,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightState {
    pub last_move: Option<(Square, Square)>,
    pub check_square: Option<Square>,
    pub selected: Option<Square>,
    pub legal_moves: Vec<Square>,
}

impl HighlightState {
    /// Drop the click-to-move selection
    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.legal_moves.clear();
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_selected(&self) -> bool {
        self.selected.is_some()
    }

    /// Resolve every highlighted square to the kind it is drawn with
    pub fn square_highlights(&self) -> BTreeMap<Square, HighlightKind> {
        let mut styles = BTreeMap::new();
        if let Some((from, to)) = self.last_move {
            styles.insert(from, HighlightKind::LastMoveFrom);
            styles.insert(to, HighlightKind::LastMoveTo);
        }
        for square in &self.legal_moves {
            styles.insert(*square, HighlightKind::LegalMove);
        }
        if let Some(square) = self.check_square {
            styles.insert(square, HighlightKind::Check);
        }
        styles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn test_default_has_no_highlights() {
        let state = HighlightState::default();
        assert!(state.square_highlights().is_empty());
        assert!(!state.is_selected());
    }

    #[test]
    fn test_precedence_check_over_legal_over_last_move() {
        let state = HighlightState {
            last_move: Some((sq("d8"), sq("h4"))),
            check_square: Some(sq("e1")),
            selected: Some(sq("f1")),
            legal_moves: vec![sq("e1"), sq("h4")],
        };
        let styles = state.square_highlights();

        assert_eq!(styles[&sq("d8")], HighlightKind::LastMoveFrom);
        assert_eq!(styles[&sq("h4")], HighlightKind::LegalMove);
        assert_eq!(styles[&sq("e1")], HighlightKind::Check);
        assert_eq!(styles.len(), 3);
    }

    #[test]
    fn test_clear_selection_keeps_move_and_check() {
        let mut state = HighlightState {
            last_move: Some((sq("e2"), sq("e4"))),
            check_square: Some(sq("e8")),
            selected: Some(sq("g1")),
            legal_moves: vec![sq("f3"), sq("h3")],
        };
        state.clear_selection();
        assert_eq!(state.selected, None);
        assert!(state.legal_moves.is_empty());
        assert_eq!(state.last_move, Some((sq("e2"), sq("e4"))));
        assert_eq!(state.check_square, Some(sq("e8")));
    }
}
