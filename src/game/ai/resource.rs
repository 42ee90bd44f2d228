//! Bot difficulty settings
//!
//! Each difficulty maps to a [`BotProfile`]: the engine skill level and
//! search depth forwarded to the bot service, plus a cosmetic thinking delay.
//!
//! | Difficulty  | Skill | Depth | Thinking delay |
//! |-------------|-------|-------|----------------|
//! | Beginner    | 0     | 1     | 600 ms         |
//! | Casual      | 5     | 4     | 900 ms         |
//! | Sharp       | 12    | 8     | 1200 ms        |
//! | Grandmaster | 20    | 15    | 1500 ms        |
//!
//! The delay only drives the "thinking" indicator. It is not a search budget
//! and it is unrelated to how long the service actually takes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::game::error::GameError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Casual,
    Sharp,
    Grandmaster,
}

/// Parameters sent with every bot request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BotProfile {
    pub skill_level: u8,
    pub search_depth: u8,
    pub thinking_delay: Duration,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Beginner,
        Difficulty::Casual,
        Difficulty::Sharp,
        Difficulty::Grandmaster,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Casual => "casual",
            Difficulty::Sharp => "sharp",
            Difficulty::Grandmaster => "grandmaster",
        }
    }

    /// Display name used in titles ("vs Beginner AI")
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Casual => "Casual",
            Difficulty::Sharp => "Sharp",
            Difficulty::Grandmaster => "Grandmaster",
        }
    }

    pub fn profile(self) -> BotProfile {
        let (skill_level, search_depth, delay_ms) = match self {
            Difficulty::Beginner => (0, 1, 600),
            Difficulty::Casual => (5, 4, 900),
            Difficulty::Sharp => (12, 8, 1200),
            Difficulty::Grandmaster => (20, 15, 1500),
        };
        BotProfile {
            skill_level,
            search_depth,
            thinking_delay: Duration::from_millis(delay_ms),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| GameError::Parse {
                message: format!("unknown difficulty '{s}'"),
            })
    }
}
