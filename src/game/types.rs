//! Type definitions and utilities for chess game logic
//!
//! Provides newtype patterns for board coordinates and moves so that the
//! session never passes raw strings around once input has been parsed.
//!
//! Squares use algebraic notation (`a1`..`h8`) on the wire and in history
//! entries; internally they are an index with `a1 = 0` and `h8 = 63`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::game::error::GameError;

/// Side of the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PieceColor {
    #[default]
    White,
    Black,
}

impl PieceColor {
    pub const fn opposite(self) -> Self {
        match self {
            PieceColor::White => PieceColor::Black,
            PieceColor::Black => PieceColor::White,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PieceColor::White => "white",
            PieceColor::Black => "black",
        }
    }
}

impl fmt::Display for PieceColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PieceColor {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "white" | "w" => Ok(PieceColor::White),
            "black" | "b" => Ok(PieceColor::Black),
            other => Err(GameError::Parse {
                message: format!("unknown color '{other}'"),
            }),
        }
    }
}

/// One of the 64 board squares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Square(u8);

impl Square {
    /// Build a square from zero-based file (a = 0) and rank (1 = 0)
    pub fn new(file: u8, rank: u8) -> Option<Self> {
        (file < 8 && rank < 8).then(|| Square(rank * 8 + file))
    }

    /// Build a square from its index (`a1 = 0`, `h8 = 63`)
    pub fn from_index(index: u8) -> Option<Self> {
        (index < 64).then_some(Square(index))
    }

    pub fn index(self) -> u8 {
        self.0
    }

    pub fn file(self) -> u8 {
        self.0 % 8
    }

    pub fn rank(self) -> u8 {
        self.0 / 8
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            (b'a' + self.file()) as char,
            (b'1' + self.rank()) as char
        )
    }
}

impl FromStr for Square {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(GameError::Parse {
                message: format!("square '{s}' must be two characters"),
            });
        }
        let file = bytes[0].to_ascii_lowercase();
        let rank = bytes[1];
        if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
            return Err(GameError::Parse {
                message: format!("square '{s}' is off the board"),
            });
        }
        Ok(Square((rank - b'1') * 8 + (file - b'a')))
    }
}

impl TryFrom<String> for Square {
    type Error = GameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Square> for String {
    fn from(square: Square) -> Self {
        square.to_string()
    }
}

/// Piece a pawn turns into on the last rank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Promotion {
    #[default]
    Queen,
    Rook,
    Bishop,
    Knight,
}

impl Promotion {
    pub fn to_char(self) -> char {
        match self {
            Promotion::Queen => 'q',
            Promotion::Rook => 'r',
            Promotion::Bishop => 'b',
            Promotion::Knight => 'n',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'q' => Some(Promotion::Queen),
            'r' => Some(Promotion::Rook),
            'b' => Some(Promotion::Bishop),
            'n' => Some(Promotion::Knight),
            _ => None,
        }
    }
}

/// A proposed move: source and destination plus an optional promotion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChessMove {
    pub from: Square,
    pub to: Square,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<Promotion>,
}

impl ChessMove {
    pub fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }

    pub fn with_promotion(mut self, promotion: Promotion) -> Self {
        self.promotion = Some(promotion);
        self
    }

    /// Parse coordinate notation such as `e2e4` or `e7e8q`
    ///
    /// This is also the format of the bot service's `bestMove` field.
    pub fn from_coordinates(text: &str) -> Result<Self, GameError> {
        let text = text.trim();
        if !text.is_ascii() || !(4..=5).contains(&text.len()) {
            return Err(GameError::Parse {
                message: format!("move '{text}' must be 4 or 5 characters"),
            });
        }
        let from: Square = text[0..2].parse()?;
        let to: Square = text[2..4].parse()?;
        let promotion = match text.chars().nth(4) {
            Some(c) => Some(Promotion::from_char(c).ok_or_else(|| GameError::Parse {
                message: format!("unknown promotion piece '{c}'"),
            })?),
            None => None,
        };
        Ok(Self {
            from,
            to,
            promotion,
        })
    }

    /// Coordinate notation (`e2e4`, `e7e8q`)
    pub fn to_coordinates(&self) -> String {
        match self.promotion {
            Some(p) => format!("{}{}{}", self.from, self.to, p.to_char()),
            None => format!("{}{}", self.from, self.to),
        }
    }

    /// Text stored in the move history (`e2-e4`)
    pub fn history_text(&self) -> String {
        format!("{}-{}", self.from, self.to)
    }
}

impl fmt::Display for ChessMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_coordinates())
    }
}

impl TryFrom<&shared::WireMove> for ChessMove {
    type Error = GameError;

    fn try_from(wire: &shared::WireMove) -> Result<Self, Self::Error> {
        let promotion = match wire.promotion.as_deref() {
            Some(p) => Some(
                p.chars()
                    .next()
                    .and_then(Promotion::from_char)
                    .ok_or_else(|| GameError::Parse {
                        message: format!("unknown promotion piece '{p}'"),
                    })?,
            ),
            None => None,
        };
        Ok(Self {
            from: wire.from.parse()?,
            to: wire.to.parse()?,
            promotion,
        })
    }
}

impl From<&ChessMove> for shared::WireMove {
    fn from(mv: &ChessMove) -> Self {
        shared::WireMove {
            from: mv.from.to_string(),
            to: mv.to.to_string(),
            promotion: mv.promotion.map(|p| p.to_char().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn test_square_corners() {
        assert_eq!(sq("a1").index(), 0);
        assert_eq!(sq("h1").index(), 7);
        assert_eq!(sq("a8").index(), 56);
        assert_eq!(sq("h8").index(), 63);
        assert_eq!(Square::new(4, 3).unwrap().to_string(), "e4");
    }

    #[test]
    fn test_square_rejects_off_board() {
        assert!("i1".parse::<Square>().is_err());
        assert!("a9".parse::<Square>().is_err());
        assert!("a".parse::<Square>().is_err());
        assert!("a10".parse::<Square>().is_err());
        assert!(Square::new(8, 0).is_none());
        assert!(Square::from_index(64).is_none());
    }

    #[test]
    fn test_square_serializes_as_string() {
        let json = serde_json::to_string(&sq("e4")).unwrap();
        assert_eq!(json, "\"e4\"");
        let back: Square = serde_json::from_str("\"g7\"").unwrap();
        assert_eq!(back, sq("g7"));
        assert!(serde_json::from_str::<Square>("\"z9\"").is_err());
    }

    #[test]
    fn test_color_opposite_and_parse() {
        assert_eq!(PieceColor::White.opposite(), PieceColor::Black);
        assert_eq!(PieceColor::Black.opposite(), PieceColor::White);
        assert_eq!("Black".parse::<PieceColor>().unwrap(), PieceColor::Black);
        assert!("random".parse::<PieceColor>().is_err());
    }

    #[test]
    fn test_move_from_coordinates() {
        let mv = ChessMove::from_coordinates("e2e4").unwrap();
        assert_eq!(mv.from, sq("e2"));
        assert_eq!(mv.to, sq("e4"));
        assert_eq!(mv.promotion, None);
        assert_eq!(mv.history_text(), "e2-e4");

        let promo = ChessMove::from_coordinates("e7e8n").unwrap();
        assert_eq!(promo.promotion, Some(Promotion::Knight));
        assert_eq!(promo.to_coordinates(), "e7e8n");
    }

    #[test]
    fn test_move_from_bad_coordinates() {
        assert!(ChessMove::from_coordinates("e2").is_err());
        assert!(ChessMove::from_coordinates("e2e4e5").is_err());
        assert!(ChessMove::from_coordinates("e7e8k").is_err());
        assert!(ChessMove::from_coordinates("(none)").is_err());
    }

    #[test]
    fn test_wire_move_conversion() {
        let wire = shared::WireMove::new("g1", "f3");
        let mv = ChessMove::try_from(&wire).unwrap();
        assert_eq!(mv, ChessMove::new(sq("g1"), sq("f3")));
        assert_eq!(shared::WireMove::from(&mv), wire);

        let bad = shared::WireMove::new("g1", "x3");
        assert!(ChessMove::try_from(&bad).is_err());
    }
}
