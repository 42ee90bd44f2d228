//! Move history tracking
//!
//! Maintains the chronological list of half-moves shown in the move list.
//! Entries are coordinate pairs such as `e2-e4`. The list only grows during
//! play; undo truncates it to the length the rules engine reports.
//!
//! # Side to move
//!
//! Because White always moves first, the parity of the entry count tells whose
//! turn it is: an even count means White to move.

use serde::{Deserialize, Serialize};

use crate::game::types::PieceColor;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveHistory {
    moves: Vec<String>,
}

impl MoveHistory {
    pub fn push(&mut self, entry: impl Into<String>) {
        self.moves.push(entry.into());
    }

    pub fn last_move(&self) -> Option<&str> {
        self.moves.last().map(String::as_str)
    }

    /// Number of half-moves (ply) played
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Drop everything past the first `len` entries
    pub fn truncate(&mut self, len: usize) {
        self.moves.truncate(len);
    }

    pub fn clear(&mut self) {
        self.moves.clear();
    }

    pub fn entries(&self) -> &[String] {
        &self.moves
    }

    /// Side to move implied by the entry count
    pub fn side_to_move(&self) -> PieceColor {
        if self.moves.len() % 2 == 0 {
            PieceColor::White
        } else {
            PieceColor::Black
        }
    }

    /// Move-list lines: `1. e2-e4`, `1. e7-e5`, `2. g1-f3`, ...
    ///
    /// Every half-move gets its own line prefixed with the full-move number.
    pub fn numbered(&self) -> Vec<String> {
        self.moves
            .iter()
            .enumerate()
            .map(|(index, entry)| format!("{}. {}", index / 2 + 1, entry))
            .collect()
    }
}
