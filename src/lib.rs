//! Rain Pomodoro Library
//!
//! This library provides the core functionality for the rain Pomodoro timer.
//! It includes:
//! - Session timer state machine and its one-second tick driver
//! - IPC server/client for daemon-CLI communication
//! - Ambient rain sound player with a fixed preset catalog
//! - Completion chime and desktop notifications
//! - Deterministic rain animation layout
//! - Presentation view model and CLI rendering

pub mod cli;
pub mod config;
pub mod daemon;
pub mod notification;
pub mod rain;
pub mod sound;
pub mod types;
pub mod view;

// Re-export commonly used types for convenience
pub use types::{IpcRequest, IpcResponse, ResponseData, SessionMode, Theme, TimerState};

pub use config::{ConfigError, DaemonConfig};

pub use daemon::{run_daemon, TimerEngine, TimerEvent};

// Re-export notification types
pub use notification::{
    DesktopNotifier, MockNotifier, NotificationContent, NotificationError,
    NotificationPermission, Notifier,
};

// Re-export sound types
pub use sound::{
    AmbientPlayer, MockAudioBackend, MockSoundPlayer, RodioSoundPlayer, SoundError, SoundPlayer,
    SoundPreset, SoundSource, PRESETS,
};

pub use rain::{RainActivity, RainDrop, RainLayer};
