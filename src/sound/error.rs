//! Sound system error types.
//!
//! All of these are best-effort failures: callers log them and carry on
//! in silence.

use thiserror::Error;

/// Errors that can occur in the sound playback system.
#[derive(Debug, Error)]
pub enum SoundError {
    /// Audio device is not available (e.g., no speakers connected).
    #[error("audio device not available: {0}")]
    DeviceNotAvailable(String),

    /// Sound file was not found at the specified path.
    #[error("sound file not found: {0}")]
    FileNotFound(String),

    /// Failed to decode the audio file.
    #[error("failed to decode sound file: {0}")]
    DecodeError(String),

    /// Failed to create an audio sink on the output stream.
    #[error("failed to create audio stream: {0}")]
    StreamError(String),

    /// Seeking within the current track failed.
    #[error("failed to seek: {0}")]
    SeekError(String),

    /// Generic sound playback error.
    #[error("sound playback error: {0}")]
    PlaybackError(String),
}

impl SoundError {
    /// Returns true if this error is related to device availability.
    #[must_use]
    pub fn is_device_error(&self) -> bool {
        matches!(self, Self::DeviceNotAvailable(_) | Self::StreamError(_))
    }

    /// Returns true if this error is related to the audio file.
    #[must_use]
    pub fn is_file_error(&self) -> bool {
        matches!(self, Self::FileNotFound(_) | Self::DecodeError(_))
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::DeviceNotAvailable(_) => "connect an audio output device",
            Self::FileNotFound(_) => "check the --sounds-dir option",
            Self::DecodeError(_) => "the sound file may be corrupted or in an unsupported format",
            Self::StreamError(_) => "check the system audio settings",
            Self::SeekError(_) => "the track will play from its current position",
            Self::PlaybackError(_) => "restart the daemon",
        }
    }
}
