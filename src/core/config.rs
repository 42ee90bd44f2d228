//! Game route configuration
//!
//! A game is started from a route such as
//!
//! ```text
//! /game?mode=robot&difficulty=casual&color=black&theme=vintage&time=300+3
//! /game?mode=online&room=AB12CD&color=white
//! /game?mode=local&time=0+0
//! ```
//!
//! Missing parameters fall back to white and to the theme and time control in
//! [`AppSettings`] (classic, `600+0` out of the box).
//! `color=random` is resolved once, when the route is parsed.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

use super::error::{CoreError, CoreResult};
use super::settings_persistence::AppSettings;
use crate::game::ai::Difficulty;
use crate::game::modes::GameMode;
use crate::game::resources::TimeControl;
use crate::game::types::PieceColor;
use crate::networking::RoomCode;

/// Board square colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardTheme {
    #[default]
    Classic,
    Vintage,
    Minimal,
}

impl BoardTheme {
    pub fn as_str(self) -> &'static str {
        match self {
            BoardTheme::Classic => "classic",
            BoardTheme::Vintage => "vintage",
            BoardTheme::Minimal => "minimal",
        }
    }

    pub fn light_square(self) -> &'static str {
        match self {
            BoardTheme::Classic => "#eeeed2",
            BoardTheme::Vintage => "#f9e4b7",
            BoardTheme::Minimal => "#f0f0f0",
        }
    }

    pub fn dark_square(self) -> &'static str {
        match self {
            BoardTheme::Classic => "#769656",
            BoardTheme::Vintage => "#b67f4c",
            BoardTheme::Minimal => "#333333",
        }
    }
}

impl fmt::Display for BoardTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BoardTheme {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "classic" => Ok(BoardTheme::Classic),
            "vintage" => Ok(BoardTheme::Vintage),
            "minimal" => Ok(BoardTheme::Minimal),
            other => Err(CoreError::Route {
                message: format!("unknown theme '{other}'"),
            }),
        }
    }
}

/// Side requested in the route, before `random` is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    #[default]
    White,
    Black,
    Random,
}

impl ColorChoice {
    pub fn resolve<G: Rng + ?Sized>(self, rng: &mut G) -> PieceColor {
        match self {
            ColorChoice::White => PieceColor::White,
            ColorChoice::Black => PieceColor::Black,
            ColorChoice::Random => {
                if rng.random_bool(0.5) {
                    PieceColor::White
                } else {
                    PieceColor::Black
                }
            }
        }
    }
}

impl FromStr for ColorChoice {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("random") {
            return Ok(ColorChoice::Random);
        }
        match s.parse::<PieceColor>()? {
            PieceColor::White => Ok(ColorChoice::White),
            PieceColor::Black => Ok(ColorChoice::Black),
        }
    }
}

/// Everything needed to start one game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRoute {
    pub mode: GameMode,
    pub theme: BoardTheme,
    pub time: TimeControl,
}

impl GameRoute {
    /// Parse a `/game?...` route or a bare query string
    pub fn parse(route: &str) -> CoreResult<Self> {
        Self::parse_with(route, &AppSettings::default(), &mut rand::rng())
    }

    /// Parse with theme and time defaults taken from `settings`
    pub fn parse_with<G: Rng + ?Sized>(
        route: &str,
        settings: &AppSettings,
        rng: &mut G,
    ) -> CoreResult<Self> {
        let query = match route.split_once('?') {
            Some((_, query)) => query,
            None if route.contains('=') => route,
            None => "",
        };

        let mut mode = None;
        let mut difficulty = None;
        let mut color = ColorChoice::default();
        let mut theme = settings.board_style;
        let mut time = settings.default_time;
        let mut room = None;

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "mode" => mode = Some(value.to_ascii_lowercase()),
                "difficulty" => difficulty = Some(value.parse::<Difficulty>()?),
                "color" => color = value.parse()?,
                "theme" => theme = value.parse()?,
                // an unescaped `+` arrives as a space
                "time" => time = TimeControl::parse_lenient(&value.replace(' ', "+")),
                "room" => room = Some(value.parse::<RoomCode>()?),
                other => warn!("[CONFIG] Ignoring unknown route parameter '{}'", other),
            }
        }

        let mode = match mode.as_deref() {
            Some("robot") => GameMode::Robot {
                difficulty: difficulty.unwrap_or_else(|| {
                    warn!("[CONFIG] No difficulty given, using beginner");
                    Difficulty::Beginner
                }),
                human: color.resolve(rng),
            },
            Some("local") => GameMode::Local,
            Some("online") => GameMode::Online {
                room: room.unwrap_or_else(|| {
                    let code = RoomCode::generate();
                    info!("[CONFIG] No room given, created {}", code);
                    code
                }),
                local: color.resolve(rng),
            },
            Some(other) => {
                return Err(CoreError::Route {
                    message: format!("unknown mode '{other}'"),
                })
            }
            None => {
                return Err(CoreError::Route {
                    message: "missing 'mode' parameter".to_string(),
                })
            }
        };

        Ok(Self { mode, theme, time })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_parse_robot_route() {
        let route =
            GameRoute::parse("/game?mode=robot&difficulty=sharp&color=black&theme=vintage&time=300+2")
                .unwrap();
        assert_eq!(
            route.mode,
            GameMode::Robot {
                difficulty: Difficulty::Sharp,
                human: PieceColor::Black,
            }
        );
        assert_eq!(route.theme, BoardTheme::Vintage);
        assert_eq!(route.time, TimeControl::new(300, 2));
    }

    #[test]
    fn test_form_encoded_plus_in_time() {
        //! Escaped and raw `+` both separate the increment
        let escaped = GameRoute::parse("mode=local&time=180%2B2").unwrap();
        assert_eq!(escaped.time, TimeControl::new(180, 2));
        let raw = GameRoute::parse("mode=local&time=180+2").unwrap();
        assert_eq!(raw.time, TimeControl::new(180, 2));
    }

    #[test]
    fn test_defaults() {
        let route = GameRoute::parse("/game?mode=online&room=ab12cd").unwrap();
        assert_eq!(
            route.mode,
            GameMode::Online {
                room: "AB12CD".parse().unwrap(),
                local: PieceColor::White,
            }
        );
        assert_eq!(route.theme, BoardTheme::Classic);
        assert_eq!(route.time, TimeControl::new(600, 0));
    }

    #[test]
    fn test_random_color_is_resolved() {
        let mut rng = StdRng::seed_from_u64(7);
        let settings = AppSettings::default();
        let route = GameRoute::parse_with("mode=robot&color=random", &settings, &mut rng).unwrap();
        assert!(matches!(route.mode, GameMode::Robot { .. }));
    }

    #[test]
    fn test_online_without_room_generates_one() {
        let route = GameRoute::parse("mode=online").unwrap();
        match route.mode {
            GameMode::Online { room, .. } => assert_eq!(room.as_str().len(), 6),
            other => panic!("expected online mode, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_routes() {
        assert!(GameRoute::parse("/game").is_err());
        assert!(GameRoute::parse("mode=blitz").is_err());
        assert!(GameRoute::parse("mode=robot&difficulty=godlike").is_err());
        assert!(GameRoute::parse("mode=local&theme=neon").is_err());
        assert!(GameRoute::parse("mode=online&room=X").is_err());
    }

    #[test]
    fn test_settings_supply_defaults() {
        let settings = AppSettings {
            board_style: BoardTheme::Minimal,
            default_time: TimeControl::new(60, 1),
            ..AppSettings::default()
        };
        let route = GameRoute::parse_with("mode=local", &settings, &mut rand::rng()).unwrap();
        assert_eq!(route.theme, BoardTheme::Minimal);
        assert_eq!(route.time, TimeControl::new(60, 1));

        let explicit =
            GameRoute::parse_with("mode=local&time=0+0", &settings, &mut rand::rng()).unwrap();
        assert!(explicit.time.is_unlimited());
    }

    #[test]
    fn test_theme_colors() {
        assert_eq!(BoardTheme::Classic.light_square(), "#eeeed2");
        assert_eq!(BoardTheme::Minimal.dark_square(), "#333333");
    }
}
