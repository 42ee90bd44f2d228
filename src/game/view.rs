//! Read-only projection of a session for display
//!
//! [`SessionView`] is rebuilt after every state change and published by the
//! controller. It carries everything a front end needs and nothing it could
//! mutate.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::game::modes::GameMode;
use crate::game::resources::{format_clock, HighlightKind, StatusKind};
use crate::game::rules::RulesEngine;
use crate::game::session::GameSession;
use crate::game::types::{PieceColor, Square};

/// What the active mode adapter reports alongside the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterStatus {
    /// A bot request is in flight
    pub thinking: bool,
    /// The room relay is still reachable
    pub connected: bool,
    /// Both seats of the room are taken
    pub opponent_present: bool,
}

impl Default for AdapterStatus {
    fn default() -> Self {
        Self {
            thinking: false,
            connected: true,
            opponent_present: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub title: String,
    pub mode: String,
    pub position: String,
    pub orientation: PieceColor,
    pub turn: PieceColor,
    pub move_number: u32,
    pub white_clock: String,
    pub black_clock: String,
    pub moves: Vec<String>,
    pub status: StatusKind,
    pub banner: String,
    pub highlights: BTreeMap<Square, HighlightKind>,
    pub selected: Option<Square>,
    pub thinking: bool,
    pub connected: bool,
    pub waiting_for_opponent: bool,
    pub pending_resignation: Option<PieceColor>,
}

impl SessionView {
    pub fn project<R: RulesEngine>(
        session: &GameSession<R>,
        mode: &GameMode,
        adapter: AdapterStatus,
    ) -> Self {
        let status = session.status();
        let turn = session.turn();
        let banner = if !status.is_playing() {
            status.message()
        } else if let Some(side) = session.pending_resignation() {
            format!("{} wants to resign. Confirm?", capitalized(side))
        } else if !adapter.opponent_present {
            "Waiting for opponent...".to_string()
        } else if !adapter.connected {
            format!("Connection lost. {} to move", capitalized(turn))
        } else if adapter.thinking {
            format!("{} is thinking...", capitalized(turn))
        } else {
            format!("{} to move", capitalized(turn))
        };

        Self {
            title: mode.title(),
            mode: mode.to_string(),
            position: session.position(),
            orientation: mode.orientation(turn),
            turn,
            move_number: session.current_turn().move_number,
            white_clock: format_clock(session.clock().white),
            black_clock: format_clock(session.clock().black),
            moves: session.history().numbered(),
            status: status.kind(),
            banner,
            highlights: session.highlights().square_highlights(),
            selected: session.highlights().selected,
            thinking: adapter.thinking,
            connected: adapter.connected,
            waiting_for_opponent: !adapter.opponent_present,
            pending_resignation: session.pending_resignation(),
        }
    }

    /// Plain-text board, drawn from the orientation side
    pub fn render_text(&self) -> String {
        let placement = self.position.split(' ').next().unwrap_or_default();
        let mut grid = [['.'; 8]; 8];
        for (row, rank_text) in placement.split('/').take(8).enumerate() {
            let mut file = 0usize;
            for c in rank_text.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as usize;
                } else if file < 8 {
                    grid[7 - row][file] = c;
                    file += 1;
                }
            }
        }

        let ranks: Vec<usize> = match self.orientation {
            PieceColor::White => (0..8).rev().collect(),
            PieceColor::Black => (0..8).collect(),
        };
        let files: Vec<usize> = match self.orientation {
            PieceColor::White => (0..8).collect(),
            PieceColor::Black => (0..8).rev().collect(),
        };

        let mut out = String::new();
        let _ = writeln!(out, "{}", self.title);
        let _ = writeln!(out, "Black {}  White {}", self.black_clock, self.white_clock);
        for &rank in &ranks {
            let _ = write!(out, "{} ", rank + 1);
            for &file in &files {
                let marker = Square::new(file as u8, rank as u8)
                    .and_then(|sq| self.highlights.get(&sq))
                    .map(|kind| match kind {
                        HighlightKind::Check => '!',
                        HighlightKind::LegalMove => '*',
                        HighlightKind::LastMoveFrom | HighlightKind::LastMoveTo => '\'',
                    })
                    .unwrap_or(' ');
                let _ = write!(out, "{}{}", grid[rank][file], marker);
            }
            out.push('\n');
        }
        out.push_str("  ");
        for &file in &files {
            let _ = write!(out, "{} ", (b'a' + file as u8) as char);
        }
        out.push('\n');
        if !self.moves.is_empty() {
            let _ = writeln!(out, "{}", self.moves.join("  "));
        }
        let _ = writeln!(out, "{}", self.banner);
        out
    }
}

fn capitalized(color: PieceColor) -> &'static str {
    match color {
        PieceColor::White => "White",
        PieceColor::Black => "Black",
    }
}
