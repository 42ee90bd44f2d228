//! Session controller
//!
//! Runs one game on a single task. The task owns the [`GameSession`] and is
//! the only thing that mutates it; every other actor talks to it through
//! channels:
//!
//! ```text
//! ControllerHandle ──Command──┐
//! ClockTicker ──────Tick──────┤
//! RobotAdapter task ──Bot─────┼─► select! loop ─► GameSession ─► watch<SessionView>
//! OnlineAdapter task ──Room───┘
//! ```
//!
//! Stopping the loop (shutdown command, or dropping the handle) aborts the
//! ticker, any bot request in flight, and the room subscription.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::game::ai::{BotReply, BotService, RobotAdapter};
use crate::game::error::{GameError, GameResult};
use crate::game::modes::GameMode;
use crate::game::resources::TimeControl;
use crate::game::rules::RulesEngine;
use crate::game::session::{GameSession, TickOutcome};
use crate::game::types::{ChessMove, Square};
use crate::game::view::{AdapterStatus, SessionView};
use crate::networking::{OnlineAdapter, RoomChannel, RoomEvent};

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Input from the local player
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Move(ChessMove),
    Select(Square),
    Undo,
    RequestResign,
    ConfirmResign,
    CancelResign,
    NewGame,
    Shutdown,
}

/// Asynchronous results delivered back to the controller task
#[derive(Debug)]
pub enum SessionEvent {
    Tick,
    Bot(BotReply),
    Room(RoomEvent),
}

/// Periodic one-second tick
///
/// `start` replaces any running ticker, so calling it twice never produces
/// two ticks per second.
#[derive(Default)]
pub struct ClockTicker {
    task: Option<JoinHandle<()>>,
}

impl ClockTicker {
    pub fn start(&mut self, events: &mpsc::UnboundedSender<SessionEvent>) {
        self.stop();
        let events = events.clone();
        self.task = Some(tokio::spawn(async move {
            let start = tokio::time::Instant::now() + TICK_INTERVAL;
            let mut interval = tokio::time::interval_at(start, TICK_INTERVAL);
            loop {
                interval.tick().await;
                if events.send(SessionEvent::Tick).is_err() {
                    break;
                }
            }
        }));
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }
}

impl Drop for ClockTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

/// External collaborators a mode may need
#[derive(Clone, Default)]
pub struct Services {
    pub bot: Option<Arc<dyn BotService>>,
    pub rooms: Option<Arc<dyn RoomChannel>>,
}

enum ModeAdapter {
    Robot(RobotAdapter),
    Local,
    Online(OnlineAdapter),
}

pub struct GameController<R: RulesEngine> {
    session: GameSession<R>,
    mode: GameMode,
    adapter: ModeAdapter,
    ticker: ClockTicker,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    events_rx: mpsc::UnboundedReceiver<SessionEvent>,
    view_tx: watch::Sender<SessionView>,
}

impl<R: RulesEngine + Send + 'static> GameController<R> {
    pub fn new(
        rules: R,
        control: TimeControl,
        mode: GameMode,
        services: &Services,
    ) -> GameResult<Self> {
        let adapter = match &mode {
            GameMode::Robot { difficulty, human } => {
                let bot = services
                    .bot
                    .clone()
                    .ok_or_else(|| missing_service(&mode, "bot service"))?;
                ModeAdapter::Robot(RobotAdapter::new(bot, *difficulty, human.opposite()))
            }
            GameMode::Local => ModeAdapter::Local,
            GameMode::Online { room, local } => {
                let rooms = services
                    .rooms
                    .clone()
                    .ok_or_else(|| missing_service(&mode, "room channel"))?;
                ModeAdapter::Online(OnlineAdapter::new(rooms, room.clone(), *local))
            }
        };

        let session = GameSession::new(rules, control);
        let initial = SessionView::project(&session, &mode, adapter_status(&adapter));
        let (view_tx, _) = watch::channel(initial);
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        Ok(Self {
            session,
            mode,
            adapter,
            ticker: ClockTicker::default(),
            events_tx,
            events_rx,
            view_tx,
        })
    }

    pub fn session(&self) -> &GameSession<R> {
        &self.session
    }

    /// Run the loop on its own task
    pub fn spawn(self) -> ControllerHandle {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let view = self.view_tx.subscribe();
        let task = tokio::spawn(self.run(commands_rx));
        ControllerHandle {
            commands: commands_tx,
            view,
            task: Some(task),
        }
    }

    pub async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        self.mount().await;
        self.after_change();

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => {
                        if let Err(e) = self.handle_command(command) {
                            warn!("[CONTROLLER] {}", e);
                        }
                    }
                },
                Some(event) = self.events_rx.recv() => self.handle_event(event),
            }
            self.after_change();
        }

        self.unmount();
    }

    async fn mount(&mut self) {
        info!("[CONTROLLER] Starting {}", self.mode.title());
        if let ModeAdapter::Online(online) = &mut self.adapter {
            if let Err(e) = online.mount(&self.events_tx).await {
                warn!("[CONTROLLER] Could not join room {}: {}", online.room(), e);
            }
        }
    }

    fn unmount(&mut self) {
        self.ticker.stop();
        match &mut self.adapter {
            ModeAdapter::Robot(robot) => robot.cancel(),
            ModeAdapter::Online(online) => online.unmount(),
            ModeAdapter::Local => {}
        }
        info!("[CONTROLLER] Stopped {}", self.mode.title());
    }

    fn handle_command(&mut self, command: Command) -> GameResult<()> {
        debug!("[CONTROLLER] {:?}", command);
        let turn = self.session.turn();
        match command {
            Command::Move(mv) => {
                if !self.mode.controls(turn) {
                    return Err(GameError::NotYourTurn { color: turn });
                }
                match &self.adapter {
                    ModeAdapter::Online(online) => {
                        online.ensure_opponent()?;
                        online.play_local(&mut self.session, &mv)
                    }
                    _ => self.session.apply_move(&mv),
                };
            }
            Command::Select(square) => {
                if !self.mode.controls(turn) {
                    return Err(GameError::NotYourTurn { color: turn });
                }
                if let ModeAdapter::Online(online) = &self.adapter {
                    online.ensure_opponent()?;
                }
                self.session.select_square(square);
            }
            Command::Undo => {
                if !self.mode.allows_undo() {
                    return Err(GameError::NotAvailable {
                        action: "Undo",
                        mode: self.mode.to_string(),
                    });
                }
                let plies = match &self.adapter {
                    ModeAdapter::Robot(robot) => robot.undo_plies(&self.session),
                    _ => 2,
                };
                if plies == 0 {
                    debug!("[CONTROLLER] Nothing to undo");
                    return Ok(());
                }
                self.cancel_bot();
                self.session.undo_plies(plies)?;
            }
            Command::RequestResign => {
                self.session
                    .request_resignation(self.mode.local_side(turn))?;
            }
            Command::ConfirmResign => {
                self.session.confirm_resignation()?;
            }
            Command::CancelResign => self.session.cancel_resignation(),
            Command::NewGame => {
                if matches!(self.mode, GameMode::Online { .. }) {
                    return Err(GameError::NotAvailable {
                        action: "New game",
                        mode: self.mode.to_string(),
                    });
                }
                self.cancel_bot();
                self.session.new_game();
                self.ticker.stop();
            }
            Command::Shutdown => {}
        }
        Ok(())
    }

    fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Tick => match self.session.tick() {
                TickOutcome::Ticked { .. } => {}
                TickOutcome::Expired { loser } => {
                    info!("[CONTROLLER] Flag fell for {}", loser);
                }
                TickOutcome::Idle => self.ticker.stop(),
            },
            SessionEvent::Bot(reply) => {
                if let ModeAdapter::Robot(robot) = &mut self.adapter {
                    robot.accept_reply(&mut self.session, reply);
                }
            }
            SessionEvent::Room(event) => {
                if let ModeAdapter::Online(online) = &mut self.adapter {
                    online.handle_event(&mut self.session, event);
                }
            }
        }
    }

    fn cancel_bot(&mut self) {
        if let ModeAdapter::Robot(robot) = &mut self.adapter {
            robot.cancel();
        }
    }

    /// Keep timers and bot requests in line with the session, then publish
    fn after_change(&mut self) {
        let adapter = adapter_status(&self.adapter);
        if self.session.status().is_playing() {
            if !adapter.opponent_present {
                self.ticker.stop();
            } else if !self.session.clock().is_unlimited() && !self.ticker.is_running() {
                self.ticker.start(&self.events_tx);
            }
            if let ModeAdapter::Robot(robot) = &mut self.adapter {
                robot.maybe_request(&self.session, &self.events_tx);
            }
        } else {
            self.ticker.stop();
            self.cancel_bot();
        }

        // a request may have been issued above
        let adapter = adapter_status(&self.adapter);
        self.view_tx
            .send_replace(SessionView::project(&self.session, &self.mode, adapter));
    }
}

fn adapter_status(adapter: &ModeAdapter) -> AdapterStatus {
    match adapter {
        ModeAdapter::Robot(robot) => AdapterStatus {
            thinking: robot.is_thinking(),
            ..AdapterStatus::default()
        },
        ModeAdapter::Local => AdapterStatus::default(),
        ModeAdapter::Online(online) => AdapterStatus {
            thinking: false,
            connected: online.is_connected(),
            opponent_present: online.opponent_present(),
        },
    }
}

fn missing_service(mode: &GameMode, service: &'static str) -> GameError {
    GameError::ServiceUnavailable {
        mode: mode.to_string(),
        service,
    }
}

/// Handle to a running controller
///
/// Dropping the handle stops the controller.
pub struct ControllerHandle {
    commands: mpsc::UnboundedSender<Command>,
    view: watch::Receiver<SessionView>,
    task: Option<JoinHandle<()>>,
}

impl ControllerHandle {
    /// Queue a command; false once the controller has stopped
    pub fn send(&self, command: Command) -> bool {
        self.commands.send(command).is_ok()
    }

    /// Latest published view
    pub fn view(&self) -> SessionView {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.view.clone()
    }

    /// Wait until a published view satisfies `predicate`
    ///
    /// Returns `None` if the controller stops first.
    pub async fn wait_for<F>(&mut self, predicate: F) -> Option<SessionView>
    where
        F: FnMut(&SessionView) -> bool,
    {
        self.view.wait_for(predicate).await.ok().map(|view| view.clone())
    }

    /// Stop the controller and wait for it to release its resources
    pub async fn shutdown(mut self) {
        let _ = self.commands.send(Command::Shutdown);
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for ControllerHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
