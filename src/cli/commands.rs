//! Command definitions for the rain Pomodoro CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{default_sounds_dir, DaemonConfig};
use crate::sound::find_preset;
use crate::types::{SessionMode, Theme};

// ============================================================================
// CLI Structure
// ============================================================================

/// Rain Pomodoro - a focus timer with ambient rain
#[derive(Parser, Debug)]
#[command(
    name = "rain-pomodoro",
    version,
    about = "Pomodoro timer with ambient rain sounds",
    long_about = "A Pomodoro timer with ambient rain sounds.\n\
                  Run 'rain-pomodoro daemon' once, then control it from any terminal.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Daemon socket path (defaults to $RAIN_POMODORO_SOCKET or ~/.rain-pomodoro/rain-pomodoro.sock)
    #[arg(long, global = true, value_name = "PATH")]
    pub socket: Option<PathBuf>,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start or resume the countdown
    Start,

    /// Pause the countdown
    Pause,

    /// Resume a paused countdown
    Resume,

    /// Pause when running, start otherwise
    Toggle,

    /// Rewind the current session to its full duration
    Reset,

    /// Switch to another session mode
    Mode {
        /// Target mode: work, short-break or long-break
        target: SessionMode,
    },

    /// Cycle to the next rain sound (off, drizzle, pour, storm)
    Sound,

    /// Set the theme, or toggle it when no theme is given
    Theme {
        /// light or dark
        theme: Option<Theme>,
    },

    /// Show current timer status
    Status,

    /// Show a live dashboard with the rain animation
    Watch(WatchArgs),

    /// Run the daemon in the foreground
    Daemon(DaemonArgs),

    /// Stop the daemon
    #[command(alias = "quit")]
    Shutdown,

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Watch Arguments
// ============================================================================

/// Arguments for the watch command
#[derive(Args, Debug, Clone)]
pub struct WatchArgs {
    /// Redraw interval in milliseconds (50-5000)
    #[arg(
        short,
        long,
        default_value = "200",
        value_parser = clap::value_parser!(u64).range(50..=5000)
    )]
    pub interval: u64,
}

impl Default for WatchArgs {
    fn default() -> Self {
        Self { interval: 200 }
    }
}

// ============================================================================
// Daemon Arguments
// ============================================================================

/// Arguments for the daemon command
#[derive(Args, Debug, Clone, Default)]
pub struct DaemonArgs {
    /// Directory holding the rain tracks
    #[arg(long, value_name = "DIR")]
    pub sounds_dir: Option<PathBuf>,

    /// Do not play the completion alert
    #[arg(long)]
    pub no_alert: bool,

    /// Play this file instead of the synthesized chime
    #[arg(long, value_name = "FILE", conflicts_with = "no_alert")]
    pub alert_sound: Option<PathBuf>,

    /// Never show desktop notifications
    #[arg(long)]
    pub no_notify: bool,

    /// Rain sound selected at startup
    #[arg(long, value_name = "PRESET", value_parser = validate_preset)]
    pub preset: Option<String>,

    /// Theme at startup
    #[arg(long)]
    pub theme: Option<Theme>,
}

impl DaemonArgs {
    /// Builds the daemon configuration for `socket_path`.
    pub fn into_config(self, socket_path: PathBuf) -> DaemonConfig {
        DaemonConfig {
            socket_path,
            sounds_dir: self.sounds_dir.unwrap_or_else(default_sounds_dir),
            alert_enabled: !self.no_alert,
            alert_sound: self.alert_sound,
            notifications_enabled: !self.no_notify,
            initial_preset: self.preset.unwrap_or_else(|| "off".to_string()),
            initial_theme: self.theme.unwrap_or_default(),
        }
    }
}

// ============================================================================
// Validation Functions
// ============================================================================

/// Validates a preset id against the catalog.
fn validate_preset(s: &str) -> Result<String, String> {
    find_preset(s)
        .map(|preset| preset.id.to_string())
        .ok_or_else(|| format!("unknown preset '{s}' (expected off, drizzle, pour or storm)"))
}

// ============================================================================
// Tests
// ============================================================================
