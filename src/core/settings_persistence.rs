//! Settings persistence
//!
//! Saves and loads [`AppSettings`] to/from a JSON file in the user's
//! configuration directory.
//!
//! # Error Handling
//!
//! - Load failures fall back to default settings
//! - Save failures are returned to the caller, which logs them
//!
//! The `*_from` / `*_to` variants take an explicit path and are what tests use.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

use super::config::BoardTheme;
use super::error::CoreResult;
use crate::game::ai::{DEFAULT_BOT_ENDPOINT, DEFAULT_BOT_TIMEOUT};
use crate::game::resources::TimeControl;

/// Settings filename
const SETTINGS_FILENAME: &str = "settings.json";

/// User preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppSettings {
    pub sound_effects: bool,
    pub music: bool,
    pub animations: bool,
    pub notifications: bool,
    pub board_style: BoardTheme,
    pub default_time: TimeControl,
    pub bot_endpoint: String,
    pub bot_timeout_secs: u64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            sound_effects: true,
            music: false,
            animations: true,
            notifications: true,
            board_style: BoardTheme::Classic,
            default_time: TimeControl::default(),
            bot_endpoint: DEFAULT_BOT_ENDPOINT.to_string(),
            bot_timeout_secs: DEFAULT_BOT_TIMEOUT.as_secs(),
        }
    }
}

impl AppSettings {
    pub fn bot_endpoint_url(&self) -> CoreResult<Url> {
        Ok(Url::parse(&self.bot_endpoint)?)
    }

    pub fn bot_timeout(&self) -> Duration {
        Duration::from_secs(self.bot_timeout_secs.max(1))
    }
}

/// Resolve the settings file path
///
/// Returns `settings.json` in the user's configuration directory, or in the
/// current directory if no config dir can be determined.
pub fn settings_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("com", "retro-chess", "RetroChess") {
        proj_dirs.config_dir().join(SETTINGS_FILENAME)
    } else {
        PathBuf::from(SETTINGS_FILENAME)
    }
}

pub fn load_settings() -> AppSettings {
    load_settings_from(&settings_path())
}

/// Load settings from `path`, using defaults if it is missing or invalid
pub fn load_settings_from(path: &Path) -> AppSettings {
    if !path.exists() {
        info!("[SETTINGS] No settings file found at {:?}. Using defaults.", path);
        return AppSettings::default();
    }

    match fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str::<AppSettings>(&contents) {
            Ok(settings) => {
                info!("[SETTINGS] Loaded settings from {:?}", path);
                settings
            }
            Err(e) => {
                warn!(
                    "[SETTINGS] Failed to parse settings file at {:?}: {}. Using defaults.",
                    path, e
                );
                AppSettings::default()
            }
        },
        Err(e) => {
            warn!(
                "[SETTINGS] Failed to read settings file at {:?}: {}. Using defaults.",
                path, e
            );
            AppSettings::default()
        }
    }
}

pub fn save_settings(settings: &AppSettings) -> CoreResult<()> {
    save_settings_to(settings, &settings_path())
}

/// Write settings to `path`, creating parent directories as needed
pub fn save_settings_to(settings: &AppSettings, path: &Path) -> CoreResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;
    info!("[SETTINGS] Saved settings to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("retro-chess-{}-{}", name, uuid::Uuid::new_v4()))
            .join(SETTINGS_FILENAME)
    }

    #[test]
    fn test_defaults_match_settings_screen() {
        let settings = AppSettings::default();
        assert!(settings.sound_effects);
        assert!(!settings.music);
        assert_eq!(settings.board_style, BoardTheme::Classic);
        assert_eq!(settings.default_time, TimeControl::new(600, 0));
        assert_eq!(settings.bot_endpoint_url().unwrap().as_str(), DEFAULT_BOT_ENDPOINT);
    }

    #[test]
    fn test_bad_endpoint_is_an_error() {
        let settings = AppSettings {
            bot_endpoint: "not a url".to_string(),
            ..AppSettings::default()
        };
        assert!(settings.bot_endpoint_url().is_err());
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_path("save");
        let settings = AppSettings {
            music: true,
            board_style: BoardTheme::Minimal,
            default_time: TimeControl::new(180, 2),
            ..AppSettings::default()
        };

        save_settings_to(&settings, &path).unwrap();
        assert_eq!(load_settings_from(&path), settings);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let path = temp_path("missing");
        assert_eq!(load_settings_from(&path), AppSettings::default());
    }

    #[test]
    fn test_corrupt_file_uses_defaults() {
        let path = temp_path("corrupt");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();

        assert_eq!(load_settings_from(&path), AppSettings::default());

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let path = temp_path("partial");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, r#"{"boardStyle":"vintage"}"#).unwrap();

        let settings = load_settings_from(&path);
        assert_eq!(settings.board_style, BoardTheme::Vintage);
        assert!(settings.sound_effects);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_timeout_never_zero() {
        let settings = AppSettings {
            bot_timeout_secs: 0,
            ..AppSettings::default()
        };
        assert_eq!(settings.bot_timeout(), Duration::from_secs(1));
    }
}
