//! Logging and crash reporting setup
//!
//! The binary calls [`init_tracing`] once at startup, then
//! [`install_panic_hook`] so a crash report names the game that was running.

use parking_lot::Mutex;
use std::panic;
use std::sync::OnceLock;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Title of the game in progress, for panic reports
static ACTIVE_GAME: OnceLock<Mutex<Option<String>>> = OnceLock::new();

fn active_game() -> &'static Mutex<Option<String>> {
    ACTIVE_GAME.get_or_init(|| Mutex::new(None))
}

/// Filter used when `RUST_LOG` is unset
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "retro_chess=debug,info"
    } else {
        "retro_chess=info,warn"
    }
}

/// Install the global `tracing` subscriber
///
/// `RUST_LOG` wins over `verbose`. Calling this twice is harmless; the second
/// call does nothing.
pub fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

pub fn record_active_game(title: impl Into<String>) {
    *active_game().lock() = Some(title.into());
}

pub fn clear_active_game() {
    *active_game().lock() = None;
}

pub fn current_game() -> Option<String> {
    active_game().lock().clone()
}

/// Log panics through `tracing` before the default hook runs
pub fn install_panic_hook() {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let game = active_game()
            .try_lock()
            .and_then(|g| g.clone())
            .unwrap_or_else(|| "no game".to_string());
        error!("[PANIC] {} (during {})", info, game);
        default_hook(info);
    }));
}
