//! Daemon configuration.
//!
//! Settings come from command-line flags layered over defaults derived from
//! the user's home and data directories.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sound::find_preset;
use crate::types::Theme;

/// Environment variable overriding the default socket path.
pub const SOCKET_ENV: &str = "RAIN_POMODORO_SOCKET";

/// Socket path relative to the home directory
const DEFAULT_SOCKET_PATH: &str = ".rain-pomodoro/rain-pomodoro.sock";

/// Sounds directory relative to the data directory
const DEFAULT_SOUNDS_DIR: &str = "rain-pomodoro/sounds";

/// Errors in the daemon configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Neither the environment nor the home directory gives a socket path.
    #[error("Cannot determine the socket path: home directory not found")]
    HomeDirectoryNotFound,

    /// A path setting is empty.
    #[error("The {0} path must not be empty")]
    EmptyPath(&'static str),

    /// The initial preset is not in the catalog.
    #[error("Unknown sound preset '{0}'")]
    UnknownPreset(String),
}

impl ConfigError {
    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::HomeDirectoryNotFound => "Pass --socket or set RAIN_POMODORO_SOCKET",
            Self::EmptyPath(_) => "Provide a non-empty path",
            Self::UnknownPreset(_) => "Use one of: off, drizzle, pour, storm",
        }
    }
}

/// Everything the daemon needs to start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaemonConfig {
    /// Unix socket the daemon listens on
    pub socket_path: PathBuf,
    /// Directory holding the ambient tracks
    pub sounds_dir: PathBuf,
    /// Play the completion alert
    pub alert_enabled: bool,
    /// File replacing the synthesized chime
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_sound: Option<PathBuf>,
    /// Allow desktop notifications when asked
    pub notifications_enabled: bool,
    /// Preset selected at startup
    pub initial_preset: String,
    /// Theme at startup
    pub initial_theme: Theme,
}

impl DaemonConfig {
    /// Creates a configuration listening on `socket_path` with defaults for
    /// everything else.
    pub fn with_socket_path(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
            sounds_dir: default_sounds_dir(),
            alert_enabled: true,
            alert_sound: None,
            notifications_enabled: true,
            initial_preset: "off".to_string(),
            initial_theme: Theme::default(),
        }
    }

    /// Checks the configuration for values the daemon cannot run with.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.socket_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPath("socket"));
        }
        if self.sounds_dir.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPath("sounds directory"));
        }
        if self
            .alert_sound
            .as_ref()
            .is_some_and(|path| path.as_os_str().is_empty())
        {
            return Err(ConfigError::EmptyPath("alert sound"));
        }
        if find_preset(&self.initial_preset).is_none() {
            return Err(ConfigError::UnknownPreset(self.initial_preset.clone()));
        }
        Ok(())
    }
}

/// Resolves the socket path: `explicit`, then `RAIN_POMODORO_SOCKET`, then
/// `~/.rain-pomodoro/rain-pomodoro.sock`.
///
/// # Errors
///
/// Returns `HomeDirectoryNotFound` when nothing else applies and the home
/// directory is unknown.
pub fn resolve_socket_path(explicit: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    if let Some(path) = std::env::var_os(SOCKET_ENV).filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    default_socket_path()
}

/// Returns `~/.rain-pomodoro/rain-pomodoro.sock`.
///
/// # Errors
///
/// Returns `HomeDirectoryNotFound` if the home directory is unknown.
pub fn default_socket_path() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join(DEFAULT_SOCKET_PATH))
        .ok_or(ConfigError::HomeDirectoryNotFound)
}

/// Returns `<data dir>/rain-pomodoro/sounds`, or `./sounds` when the platform
/// has no data directory.
pub fn default_sounds_dir() -> PathBuf {
    dirs::data_dir()
        .map(|data| data.join(DEFAULT_SOUNDS_DIR))
        .unwrap_or_else(|| PathBuf::from("sounds"))
}
