use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::env;
use crate::process::ProcessLauncher;

const CONFIG_FILE: &str = "launcher.json";
const DEFAULT_REMOTE_URL: &str = "http://localhost:8080";
const DEFAULT_DATA_DIRECTORY: &str = "home-launcher-game";
const DEFAULT_LAUNCHER_COMMAND: &str = "game-launcher";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLink {
    pub label: String,
    pub url: String,
}

/// Launcher-wide settings read from `launcher.json` in the app directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL serving the news feed and the instance list.
    pub remote_url: String,
    /// Folder name of the game root under the platform app-data directory.
    pub data_directory: String,
    /// External launcher program plus arguments, split on whitespace.
    pub launcher_command: String,
    /// Locale token such as `es_ES`; the system locale is used when absent.
    pub language: Option<String>,
    pub socials: Vec<SocialLink>,
    /// Background track played from the first interaction with the window.
    pub music: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            remote_url: DEFAULT_REMOTE_URL.into(),
            data_directory: DEFAULT_DATA_DIRECTORY.into(),
            launcher_command: DEFAULT_LAUNCHER_COMMAND.into(),
            language: None,
            socials: Vec::new(),
            music: None,
        }
    }
}

impl AppConfig {
    pub fn default_path() -> PathBuf {
        env::default_app_dir().join(CONFIG_FILE)
    }

    /// Load the config file, falling back to defaults when missing or unreadable.
    pub fn load(path: &Path) -> Self {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) => {
                if err.kind() != std::io::ErrorKind::NotFound {
                    warn!("config: unable to read {}: {err}", path.display());
                }
                return Self::default();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(config) => {
                info!("config: loaded {}", path.display());
                config
            }
            Err(err) => {
                warn!("config: ignoring invalid {}: {err}", path.display());
                Self::default()
            }
        }
    }

    pub fn game_root(&self) -> PathBuf {
        env::game_root_dir(&self.data_directory)
    }

    /// External launcher process; a blank command falls back to the default program.
    pub fn launcher(&self) -> ProcessLauncher {
        ProcessLauncher::from_command_line(&self.launcher_command).unwrap_or_else(|| {
            warn!("config: empty launcher command, using {DEFAULT_LAUNCHER_COMMAND}");
            ProcessLauncher::new(DEFAULT_LAUNCHER_COMMAND, Vec::new())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let parsed: AppConfig = serde_json::from_str(
            r#"{ "remote_url": "https://example.org", "socials": [{ "label": "Discord", "url": "https://discord.gg/x" }] }"#,
        )
        .unwrap();
        assert_eq!(parsed.remote_url, "https://example.org");
        assert_eq!(parsed.data_directory, DEFAULT_DATA_DIRECTORY);
        assert_eq!(parsed.launcher_command, DEFAULT_LAUNCHER_COMMAND);
        assert_eq!(parsed.socials.len(), 1);
        assert_eq!(parsed.music, None);
    }

    #[test]
    fn music_track_is_read_as_path() {
        let parsed: AppConfig =
            serde_json::from_str(r#"{ "music": "/srv/launcher/theme.ogg" }"#).unwrap();
        assert_eq!(parsed.music, Some(PathBuf::from("/srv/launcher/theme.ogg")));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let path = std::env::temp_dir().join("home-launcher-does-not-exist.json");
        assert_eq!(AppConfig::load(&path), AppConfig::default());
    }
}
