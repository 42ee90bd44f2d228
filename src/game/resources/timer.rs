//! Game clock with Fischer increment support
//!
//! Manages time control for chess games using the Fischer (incremental) time
//! system. Each player starts with a base time and receives an increment after
//! each move they complete.
//!
//! # Fischer Time Control
//!
//! Time controls are written `"<seconds>+<increment>"`, so `"600+5"` means ten
//! minutes per side with five seconds added after every move. `"0+0"` means
//! no limit: the clock never ticks and nobody can lose on time.
//!
//! # Time Management
//!
//! - The clock is driven by a one-second tick from the session
//! - Only the side to move is decremented, floored at zero
//! - The increment goes to the player who just moved, never the opponent
//!
//! # Reference
//!
//! See: https://en.wikipedia.org/wiki/Time_control#Increment_and_delay_methods

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::game::error::GameError;
use crate::game::types::PieceColor;

/// Base time and per-move bonus, both in whole seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeControl {
    pub initial: u32,
    pub increment: u32,
}

impl Default for TimeControl {
    /// 10+0, the default of every game-setup screen
    fn default() -> Self {
        Self {
            initial: 600,
            increment: 0,
        }
    }
}

impl TimeControl {
    pub const UNLIMITED: TimeControl = TimeControl {
        initial: 0,
        increment: 0,
    };

    pub fn new(initial: u32, increment: u32) -> Self {
        Self { initial, increment }
    }

    /// A zero base time disables the clock entirely
    pub fn is_unlimited(&self) -> bool {
        self.initial == 0
    }

    /// Lenient parse: a missing or malformed part counts as zero
    ///
    /// Matches how the game-setup screens treat `"600"` (no increment) or a
    /// garbled increment. Use [`FromStr`] when strictness is wanted.
    pub fn parse_lenient(text: &str) -> Self {
        let mut parts = text.splitn(2, '+');
        let initial = parts
            .next()
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(0);
        let increment = parts
            .next()
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(0);
        Self { initial, increment }
    }
}

impl FromStr for TimeControl {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (initial, increment) = s.split_once('+').ok_or_else(|| GameError::Parse {
            message: format!("time control '{s}' must look like <seconds>+<increment>"),
        })?;
        let parse = |part: &str| {
            part.trim().parse::<u32>().map_err(|_| GameError::Parse {
                message: format!("time control '{s}' has a non-numeric part '{part}'"),
            })
        };
        Ok(Self {
            initial: parse(initial)?,
            increment: parse(increment)?,
        })
    }
}

impl fmt::Display for TimeControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.initial, self.increment)
    }
}

/// Remaining time for both players
///
/// # Fields
///
/// - `white` / `black`: remaining seconds
/// - `control`: the time control the clock was started with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameClock {
    pub white: u32,
    pub black: u32,
    control: TimeControl,
}

impl Default for GameClock {
    fn default() -> Self {
        Self::new(TimeControl::default())
    }
}

impl GameClock {
    pub fn new(control: TimeControl) -> Self {
        Self {
            white: control.initial,
            black: control.initial,
            control,
        }
    }

    pub fn control(&self) -> TimeControl {
        self.control
    }

    pub fn is_unlimited(&self) -> bool {
        self.control.is_unlimited()
    }

    pub fn remaining(&self, color: PieceColor) -> u32 {
        match color {
            PieceColor::White => self.white,
            PieceColor::Black => self.black,
        }
    }

    fn remaining_mut(&mut self, color: PieceColor) -> &mut u32 {
        match color {
            PieceColor::White => &mut self.white,
            PieceColor::Black => &mut self.black,
        }
    }

    /// Take one second from `active`
    ///
    /// Returns `true` when `active` has no time left after the tick. Never
    /// goes below zero. Unlimited clocks are left alone and never expire.
    pub fn tick(&mut self, active: PieceColor) -> bool {
        if self.is_unlimited() {
            return false;
        }
        let left = self.remaining_mut(active);
        *left = left.saturating_sub(1);
        *left == 0
    }

    /// Apply Fischer increment to the player who just moved
    pub fn apply_increment(&mut self, mover: PieceColor) {
        if self.is_unlimited() || self.control.increment == 0 {
            return;
        }
        let increment = self.control.increment;
        let left = self.remaining_mut(mover);
        *left = left.saturating_add(increment);
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.control);
    }
}

/// Render seconds as `m:ss`
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
