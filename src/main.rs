use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use url::Url;

use retro_chess::core::error_handling::{
    clear_active_game, init_tracing, install_panic_hook, record_active_game,
};
use retro_chess::core::settings_persistence::{load_settings, save_settings, settings_path};
use retro_chess::core::{AppSettings, GameRoute};
use retro_chess::game::ai::HttpBotService;
use retro_chess::game::rules::ShakmatyRules;
use retro_chess::game::types::{ChessMove, Square};
use retro_chess::game::{Command, GameController, GameError, GameMode, Services, SessionView};

#[derive(Parser)]
#[command(name = "retro-chess", version, about = "Retro chess in the terminal")]
struct Cli {
    /// Log at debug level (RUST_LOG overrides this)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Play a game read from stdin
    Play {
        /// Game route, e.g. "/game?mode=robot&difficulty=casual&color=black&time=300+2"
        #[arg(long, default_value = "/game?mode=local")]
        route: String,

        /// Bot service endpoint, overriding the saved settings
        #[arg(long)]
        bot_endpoint: Option<Url>,
    },
    /// Show the saved settings
    Settings {
        /// Restore and save the defaults first
        #[arg(long)]
        reset: bool,
    },
}

/// One line of terminal input
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Command(Command),
    Help,
    Quit,
}

fn parse_input(line: &str) -> Result<Input, GameError> {
    let line = line.trim().to_ascii_lowercase();
    let mut words = line.split_whitespace();
    let first = words.next().unwrap_or_default();
    Ok(match first {
        "quit" | "exit" => Input::Quit,
        "help" | "?" => Input::Help,
        "undo" => Input::Command(Command::Undo),
        "resign" => Input::Command(Command::RequestResign),
        "confirm" | "yes" => Input::Command(Command::ConfirmResign),
        "cancel" | "no" => Input::Command(Command::CancelResign),
        "new" => Input::Command(Command::NewGame),
        "select" => {
            let square: Square = words.next().unwrap_or_default().parse()?;
            Input::Command(Command::Select(square))
        }
        text => Input::Command(Command::Move(ChessMove::from_coordinates(text)?)),
    })
}

const HELP: &str = "\
Moves:    e2e4, e7e8q (promotion)
Select:   select e2
Actions:  undo, resign, confirm, cancel, new, quit";

/// Whether anything but the clocks changed
fn worth_redrawing(previous: &SessionView, next: &SessionView) -> bool {
    previous.moves != next.moves
        || previous.banner != next.banner
        || previous.highlights != next.highlights
        || previous.status != next.status
}

async fn play(route: &str, bot_endpoint: Option<Url>, settings: &AppSettings) -> anyhow::Result<()> {
    let route = GameRoute::parse_with(route, settings, &mut rand::rng())?;
    info!(
        "[MAIN] {} ({}, theme {})",
        route.mode.title(),
        route.time,
        route.theme
    );

    let mut services = Services::default();
    match &route.mode {
        GameMode::Robot { .. } => {
            let endpoint = match bot_endpoint {
                Some(url) => url,
                None => settings.bot_endpoint_url()?,
            };
            let bot = HttpBotService::new(endpoint, settings.bot_timeout())
                .context("failed to build bot client")?;
            services.bot = Some(Arc::new(bot));
        }
        GameMode::Local => {}
        GameMode::Online { room, .. } => {
            bail!("online play in room {room} needs a room relay, which the terminal client does not have");
        }
    }

    let controller = GameController::new(ShakmatyRules::new(), route.time, route.mode.clone(), &services)?;
    record_active_game(route.mode.title());
    let handle = controller.spawn();
    let mut views = handle.subscribe();
    let mut shown = handle.view();
    println!("{}\n{}", shown.render_text(), HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = views.borrow_and_update().clone();
                if worth_redrawing(&shown, &view) {
                    println!("{}", view.render_text());
                }
                shown = view;
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_input(&line) {
                    Ok(Input::Quit) => break,
                    Ok(Input::Help) => println!("{HELP}"),
                    Ok(Input::Command(command)) => {
                        if !handle.send(command) {
                            break;
                        }
                    }
                    Err(e) => println!("{e}"),
                }
            }
        }
    }

    handle.shutdown().await;
    clear_active_game();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    install_panic_hook();

    match cli.command {
        CliCommand::Play {
            route,
            bot_endpoint,
        } => {
            let settings = load_settings();
            play(&route, bot_endpoint, &settings).await
        }
        CliCommand::Settings { reset } => {
            let settings = if reset {
                let defaults = AppSettings::default();
                if let Err(e) = save_settings(&defaults) {
                    warn!("[MAIN] Could not save settings: {}", e);
                }
                defaults
            } else {
                load_settings()
            };
            println!("{}", settings_path().display());
            println!("{}", serde_json::to_string_pretty(&settings)?);
            Ok(())
        }
    }
}
