//! Turn tracking
//!
//! [`CurrentTurn`] says who moves next and which full move that is.
//! [`SessionGeneration`] lets async work notice that the game moved on.
//!
//! After an accepted move the session calls [`CurrentTurn::advance`] once.
//! Undo does not walk the counter back; it calls [`CurrentTurn::resync`]
//! with the side read off the engine position.

use crate::game::types::PieceColor;

/// Side to move plus the full-move number shown in the move list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentTurn {
    pub color: PieceColor,
    pub move_number: u32,
}

impl Default for CurrentTurn {
    fn default() -> Self {
        Self::resynced(PieceColor::White, 0)
    }
}

impl CurrentTurn {
    fn resynced(color: PieceColor, plies: usize) -> Self {
        Self {
            color,
            move_number: (plies / 2) as u32 + 1,
        }
    }

    /// Hand the move to the other side; the number grows after black
    pub fn advance(&mut self) {
        if self.color == PieceColor::Black {
            self.move_number += 1;
        }
        self.color = self.color.opposite();
    }

    /// Rebuild from an authoritative side to move and half-move count
    pub fn resync(&mut self, color: PieceColor, plies: usize) {
        *self = Self::resynced(color, plies);
    }
}

/// Monotonic token identifying one stretch of uninterrupted play
///
/// Bumped on new game, undo and resignation. Async work captures the
/// generation it was started under and is dropped if the session has moved
/// on by the time it completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct SessionGeneration(u64);

impl SessionGeneration {
    pub fn bump(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_game_is_white_move_one() {
        assert_eq!(
            CurrentTurn::default(),
            CurrentTurn {
                color: PieceColor::White,
                move_number: 1
            }
        );
    }

    #[test]
    fn test_move_number_grows_after_black() {
        //! Three half-moves: W1, B1, W2
        let mut turn = CurrentTurn::default();
        let mut seen = Vec::new();
        for _ in 0..3 {
            turn.advance();
            seen.push((turn.color, turn.move_number));
        }
        assert_eq!(
            seen,
            vec![
                (PieceColor::Black, 1),
                (PieceColor::White, 2),
                (PieceColor::Black, 2),
            ]
        );
    }

    #[test]
    fn test_resync_after_undo() {
        let mut turn = CurrentTurn::default();
        (0..5).for_each(|_| turn.advance());

        turn.resync(PieceColor::Black, 3);
        assert_eq!(turn.color, PieceColor::Black);
        assert_eq!(turn.move_number, 2);

        turn.resync(PieceColor::White, 0);
        assert_eq!(turn, CurrentTurn::default());
    }

    #[test]
    fn test_generation_only_moves_forward() {
        let mut generation = SessionGeneration::default();
        let start = generation;
        generation.bump();
        generation.bump();
        assert!(generation > start);
        assert_eq!(generation.value(), start.value() + 2);
    }
}
