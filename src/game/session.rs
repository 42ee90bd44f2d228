//! Game session state machine
//!
//! One [`GameSession`] exists per game on screen. It owns the rules engine and
//! every piece of per-game state (turn, clock, history, status, highlights),
//! and it is the only place that mutates them. Every game mode feeds moves
//! through the same [`GameSession::apply_move`] path:
//!
//! ```text
//! human input ─┐
//! bot reply ───┼─► apply_move ─► RulesEngine::apply_move ─► history / clock / turn / highlights
//! room event ──┘                      │
//!                                     └─ None ─► rejected, nothing changes
//! ```
//!
//! # Invariants
//!
//! - An accepted move appends exactly one history entry and flips the turn
//!   exactly once. A rejected move changes nothing.
//! - The clock only runs while the status is `Playing`.
//! - Once the status leaves `Playing` it never returns (until `new_game`).

use tracing::{debug, info, warn};

use crate::game::error::{GameError, GameResult};
use crate::game::resources::{
    CurrentTurn, GameClock, GameStatus, HighlightState, MoveHistory, SessionGeneration,
    TimeControl,
};
use crate::game::rules::{side_to_move_from_position, RulesEngine};
use crate::game::types::{ChessMove, PieceColor, Square};

/// Result of [`GameSession::apply_move`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    pub accepted: bool,
    pub status: GameStatus,
}

/// Result of a one-second clock tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Clock is frozen or unlimited
    Idle,
    Ticked { side: PieceColor, remaining: u32 },
    /// `loser` ran out of time; the game is over
    Expired { loser: PieceColor },
}

pub struct GameSession<R: RulesEngine> {
    rules: R,
    clock: GameClock,
    history: MoveHistory,
    turn: CurrentTurn,
    status: GameStatus,
    highlights: HighlightState,
    generation: SessionGeneration,
    pending_resignation: Option<PieceColor>,
}

impl<R: RulesEngine> GameSession<R> {
    /// Start a fresh game. The engine is reset to the initial position.
    pub fn new(mut rules: R, control: TimeControl) -> Self {
        rules.reset();
        Self {
            rules,
            clock: GameClock::new(control),
            history: MoveHistory::default(),
            turn: CurrentTurn::default(),
            status: GameStatus::Playing,
            highlights: HighlightState::default(),
            generation: SessionGeneration::default(),
            pending_resignation: None,
        }
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    pub fn position(&self) -> String {
        self.rules.position()
    }

    /// Side to move
    pub fn turn(&self) -> PieceColor {
        self.turn.color
    }

    pub fn current_turn(&self) -> CurrentTurn {
        self.turn
    }

    pub fn clock(&self) -> &GameClock {
        &self.clock
    }

    pub fn history(&self) -> &MoveHistory {
        &self.history
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn highlights(&self) -> &HighlightState {
        &self.highlights
    }

    pub fn generation(&self) -> SessionGeneration {
        self.generation
    }

    pub fn pending_resignation(&self) -> Option<PieceColor> {
        self.pending_resignation
    }

    fn rejected(&self) -> MoveOutcome {
        MoveOutcome {
            accepted: false,
            status: self.status,
        }
    }

    pub fn apply_move(&mut self, mv: &ChessMove) -> MoveOutcome {
        self.apply_move_observed(mv, |_| {})
    }

    /// Apply `mv`, calling `before_turn_flip` once the engine has accepted it
    ///
    /// The hook runs after validation and before history, clock and turn are
    /// updated. Online play uses it to publish the move to the room.
    pub fn apply_move_observed<F>(&mut self, mv: &ChessMove, before_turn_flip: F) -> MoveOutcome
    where
        F: FnOnce(&ChessMove),
    {
        if !self.status.is_playing() {
            debug!("[SESSION] Ignoring {} - {}", mv, self.status);
            return self.rejected();
        }
        if self.rules.side_to_move() != self.turn.color {
            warn!(
                "[SESSION] Turn out of sync with engine ({} vs {}), rejecting {}",
                self.turn.color,
                self.rules.side_to_move(),
                mv
            );
            return self.rejected();
        }

        let mover = self.turn.color;
        let Some(applied) = self.rules.apply_move(mv) else {
            debug!("[SESSION] Illegal move {} for {}", mv, mover);
            return self.rejected();
        };

        before_turn_flip(mv);

        self.history.push(mv.history_text());
        self.clock.apply_increment(mover);
        self.turn.advance();

        self.highlights.clear_selection();
        self.highlights.last_move = Some((applied.from, applied.to));
        self.highlights.check_square = self.rules.check_info().highlight();

        if let Some(outcome) = self.rules.outcome() {
            self.finish(outcome.into());
        }

        info!(
            "[SESSION] {} played {} ({}), {} to move",
            mover, applied.san, mv, self.turn.color
        );

        MoveOutcome {
            accepted: true,
            status: self.status,
        }
    }

    /// Click-to-move selection
    ///
    /// Stores the legal destinations from `square` as the highlighted
    /// candidates. Selecting the same square again, or a square with no legal
    /// moves, clears the selection. Returns the current candidates.
    pub fn select_square(&mut self, square: Square) -> &[Square] {
        if !self.status.is_playing() || self.highlights.selected == Some(square) {
            self.highlights.clear_selection();
            return &self.highlights.legal_moves;
        }

        let destinations = self.rules.legal_destinations(square);
        if destinations.is_empty() {
            self.highlights.clear_selection();
        } else {
            self.highlights.selected = Some(square);
            self.highlights.legal_moves = destinations;
        }
        &self.highlights.legal_moves
    }

    pub fn clear_selection(&mut self) {
        self.highlights.clear_selection();
    }

    /// One second elapsed for the side to move
    pub fn tick(&mut self) -> TickOutcome {
        if !self.status.is_playing() || self.clock.is_unlimited() {
            return TickOutcome::Idle;
        }
        let side = self.turn.color;
        if self.clock.tick(side) {
            info!("[SESSION] {} ran out of time", side);
            self.finish(GameStatus::TimeForfeit { loser: side });
            return TickOutcome::Expired { loser: side };
        }
        TickOutcome::Ticked {
            side,
            remaining: self.clock.remaining(side),
        }
    }

    /// Take back the last two half-moves (one per side)
    pub fn undo(&mut self) -> GameResult<usize> {
        self.undo_plies(2)
    }

    /// Take back up to `plies` half-moves
    ///
    /// Fewer are reverted when fewer have been played. The turn is read back
    /// from the engine's position string, and the history is cut to the
    /// engine's length. Returns the number of half-moves reverted.
    pub fn undo_plies(&mut self, plies: usize) -> GameResult<usize> {
        if !self.status.is_playing() {
            return Err(GameError::GameOver {
                status: self.status.message(),
            });
        }

        let mut reverted = 0;
        for _ in 0..plies {
            if self.rules.undo_last_move() {
                reverted += 1;
            }
        }
        if reverted == 0 {
            return Ok(0);
        }

        let position = self.rules.position();
        let side = side_to_move_from_position(&position).unwrap_or_else(|| {
            warn!("[SESSION] Could not read side to move from '{}'", position);
            self.rules.side_to_move()
        });
        let plies = self.rules.history().len();
        self.history.truncate(plies);
        self.turn.resync(side, plies);

        self.highlights.clear();
        self.highlights.check_square = self.rules.check_info().highlight();
        self.pending_resignation = None;
        self.generation.bump();

        info!(
            "[SESSION] Undid {} half-move(s), {} to move",
            reverted, self.turn.color
        );
        Ok(reverted)
    }

    /// First step of the resign flow; nothing changes until confirmed
    pub fn request_resignation(&mut self, side: PieceColor) -> GameResult<()> {
        if !self.status.is_playing() {
            return Err(GameError::GameOver {
                status: self.status.message(),
            });
        }
        self.pending_resignation = Some(side);
        Ok(())
    }

    pub fn cancel_resignation(&mut self) {
        self.pending_resignation = None;
    }

    pub fn confirm_resignation(&mut self) -> GameResult<GameStatus> {
        if !self.status.is_playing() {
            return Err(GameError::GameOver {
                status: self.status.message(),
            });
        }
        let loser = self
            .pending_resignation
            .take()
            .ok_or(GameError::NoPendingResignation)?;
        info!("[SESSION] {} resigned", loser);
        self.finish(GameStatus::Resigned { loser });
        Ok(self.status)
    }

    /// Reset to the initial position with the same time control
    pub fn new_game(&mut self) {
        self.rules.reset();
        self.clock.reset();
        self.history.clear();
        self.turn = CurrentTurn::default();
        self.status = GameStatus::Playing;
        self.highlights.clear();
        self.pending_resignation = None;
        self.generation.bump();
        info!("[SESSION] New game ({})", self.clock.control());
    }

    fn finish(&mut self, status: GameStatus) {
        debug_assert!(self.status.is_playing());
        self.status = status;
        self.pending_resignation = None;
        self.highlights.clear_selection();
        self.generation.bump();
        info!("[SESSION] Game over: {}", status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::resources::StatusKind;
    use crate::game::rules::ShakmatyRules;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    fn mv(text: &str) -> ChessMove {
        ChessMove::from_coordinates(text).unwrap()
    }

    fn session(control: &str) -> GameSession<ShakmatyRules> {
        GameSession::new(ShakmatyRules::new(), control.parse().unwrap())
    }

    #[test]
    fn test_new_session_state() {
        let s = session("600+0");
        assert_eq!(s.turn(), PieceColor::White);
        assert!(s.history().is_empty());
        assert!(s.status().is_playing());
        assert_eq!(s.clock().white, 600);
    }

    #[test]
    fn test_accepted_move_updates_everything_once() {
        let mut s = session("600+5");
        let outcome = s.apply_move(&mv("e2e4"));

        assert!(outcome.accepted);
        assert_eq!(outcome.status, GameStatus::Playing);
        assert_eq!(s.history().entries(), ["e2-e4".to_string()]);
        assert_eq!(s.turn(), PieceColor::Black);
        assert_eq!(s.clock().white, 605, "increment goes to the mover");
        assert_eq!(s.clock().black, 600);
        assert_eq!(s.highlights().last_move, Some((sq("e2"), sq("e4"))));
    }

    #[test]
    fn test_rejected_move_changes_nothing() {
        let mut s = session("600+5");
        s.apply_move(&mv("e2e4"));
        s.select_square(sq("g8"));
        let highlights = s.highlights().clone();
        let clock = *s.clock();
        let generation = s.generation();

        let outcome = s.apply_move(&mv("e7e4"));

        assert!(!outcome.accepted);
        assert_eq!(s.history().len(), 1);
        assert_eq!(s.turn(), PieceColor::Black);
        assert_eq!(*s.clock(), clock);
        assert_eq!(*s.highlights(), highlights);
        assert_eq!(s.generation(), generation);
    }

    #[test]
    fn test_wrong_side_is_rejected() {
        let mut s = session("600+0");
        assert!(!s.apply_move(&mv("e7e5")).accepted);
        assert!(s.history().is_empty());
    }

    #[test]
    fn test_select_square_and_clear_on_move() {
        let mut s = session("600+0");
        assert_eq!(s.select_square(sq("g1")).to_vec(), vec![sq("f3"), sq("h3")]);
        assert_eq!(s.highlights().selected, Some(sq("g1")));

        s.apply_move(&mv("g1f3"));
        assert!(s.highlights().legal_moves.is_empty());
        assert_eq!(s.highlights().selected, None);
    }

    #[test]
    fn test_select_same_square_toggles_off() {
        let mut s = session("600+0");
        s.select_square(sq("b1"));
        assert!(s.select_square(sq("b1")).is_empty());
        assert!(!s.highlights().is_selected());
    }

    #[test]
    fn test_select_empty_square_clears() {
        let mut s = session("600+0");
        s.select_square(sq("b1"));
        assert!(s.select_square(sq("e5")).is_empty());
        assert!(!s.highlights().is_selected());
    }

    #[test]
    fn test_check_highlight() {
        let mut s = session("600+0");
        for m in ["e2e4", "f7f6", "d2d4", "g7g5"] {
            assert!(s.apply_move(&mv(m)).accepted);
        }
        assert_eq!(s.highlights().check_square, None);
        let outcome = s.apply_move(&mv("d1h5"));
        assert_eq!(s.highlights().check_square, Some(sq("e8")));
        assert_eq!(
            outcome.status,
            GameStatus::Checkmate {
                winner: PieceColor::White
            }
        );
    }

    #[test]
    fn test_no_moves_after_checkmate() {
        let mut s = session("600+0");
        for m in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            s.apply_move(&mv(m));
        }
        assert_eq!(s.status().kind(), StatusKind::Checkmate);
        assert!(!s.apply_move(&mv("a2a3")).accepted);
        assert_eq!(s.tick(), TickOutcome::Idle, "clock is frozen");
        assert!(s.undo().is_err());
    }

    #[test]
    fn test_tick_decrements_side_to_move() {
        let mut s = session("600+0");
        assert_eq!(
            s.tick(),
            TickOutcome::Ticked {
                side: PieceColor::White,
                remaining: 599
            }
        );
        s.apply_move(&mv("e2e4"));
        s.tick();
        assert_eq!(s.clock().white, 599);
        assert_eq!(s.clock().black, 599);
    }

    #[test]
    fn test_flag_fall_is_time_forfeit() {
        let mut s = session("2+0");
        s.tick();
        assert_eq!(
            s.tick(),
            TickOutcome::Expired {
                loser: PieceColor::White
            }
        );
        assert_eq!(
            s.status(),
            GameStatus::TimeForfeit {
                loser: PieceColor::White
            }
        );
        assert_eq!(s.tick(), TickOutcome::Idle);
        assert_eq!(s.clock().white, 0);
    }

    #[test]
    fn test_unlimited_never_ticks() {
        let mut s = session("0+0");
        assert_eq!(s.tick(), TickOutcome::Idle);
        s.apply_move(&mv("e2e4"));
        assert_eq!(s.clock().white, 0);
        assert!(s.status().is_playing());
    }

    #[test]
    fn test_undo_reverts_two_half_moves() {
        let mut s = session("600+0");
        for m in ["e2e4", "e7e5", "g1f3"] {
            s.apply_move(&mv(m));
        }
        let generation = s.generation();

        assert_eq!(s.undo(), Ok(2));

        assert_eq!(s.history().entries(), ["e2-e4".to_string()]);
        assert_eq!(s.turn(), PieceColor::Black);
        assert_eq!(
            side_to_move_from_position(&s.position()),
            Some(PieceColor::Black)
        );
        assert_ne!(s.generation(), generation);
        assert_eq!(s.highlights().last_move, None);
    }

    #[test]
    fn test_undo_single_half_move() {
        let mut s = session("600+0");
        for m in ["e2e4", "e7e5", "g1f3"] {
            s.apply_move(&mv(m));
        }

        assert_eq!(s.undo_plies(1), Ok(1));

        assert_eq!(s.history().len(), 2);
        assert_eq!(s.turn(), PieceColor::White);
        assert_eq!(s.current_turn().move_number, 2);
        assert_eq!(s.undo_plies(0), Ok(0));
        assert_eq!(s.history().len(), 2);
    }

    #[test]
    fn test_undo_with_single_move() {
        let mut s = session("600+0");
        s.apply_move(&mv("e2e4"));
        assert_eq!(s.undo(), Ok(1));
        assert_eq!(s.turn(), PieceColor::White);
        assert!(s.history().is_empty());
        assert_eq!(s.undo(), Ok(0));
    }

    #[test]
    fn test_resignation_requires_confirmation() {
        let mut s = session("600+0");
        assert_eq!(
            s.confirm_resignation(),
            Err(GameError::NoPendingResignation)
        );

        s.request_resignation(PieceColor::White).unwrap();
        assert!(s.status().is_playing(), "request alone changes nothing");
        s.cancel_resignation();
        assert_eq!(
            s.confirm_resignation(),
            Err(GameError::NoPendingResignation)
        );

        s.request_resignation(PieceColor::White).unwrap();
        let status = s.confirm_resignation().unwrap();
        assert_eq!(
            status,
            GameStatus::Resigned {
                loser: PieceColor::White
            }
        );
        assert!(!s.apply_move(&mv("e2e4")).accepted);
        assert!(s.request_resignation(PieceColor::Black).is_err());
    }

    #[test]
    fn test_observer_runs_only_for_accepted_moves() {
        let mut s = session("600+0");
        let mut published = Vec::new();

        s.apply_move_observed(&mv("e2e5"), |m| published.push(*m));
        s.apply_move_observed(&mv("e2e4"), |m| published.push(*m));

        assert_eq!(published, vec![mv("e2e4")]);
    }

    #[test]
    fn test_new_game_resets() {
        let mut s = session("60+1");
        s.apply_move(&mv("e2e4"));
        s.tick();
        s.request_resignation(PieceColor::Black).unwrap();
        s.confirm_resignation().unwrap();
        let generation = s.generation();

        s.new_game();

        assert!(s.status().is_playing());
        assert!(s.history().is_empty());
        assert_eq!(s.turn(), PieceColor::White);
        assert_eq!(s.clock().white, 60);
        assert_eq!(s.clock().black, 60);
        assert_ne!(s.generation(), generation);
        assert!(s.apply_move(&mv("e2e4")).accepted);
    }
}
