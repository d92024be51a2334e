//! Sound player implementation using rodio.
//!
//! This module provides the shared `AudioOutput` device and the
//! `RodioSoundPlayer` used for one-shot alerts.

use std::fs::File;
use std::io::BufReader;
use std::sync::atomic::{AtomicBool, Ordering};

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use tracing::{debug, warn};

use super::error::SoundError;
use super::source::SoundSource;
use super::tone::ChimeTone;

/// The opened default audio output device.
///
/// The stream must stay alive for as long as anything plays through its
/// handle, so the daemon keeps this value for its whole lifetime.
pub struct AudioOutput {
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

impl AudioOutput {
    /// Opens the default output device.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::DeviceNotAvailable` if no audio output device
    /// is available.
    pub fn open_default() -> Result<Self, SoundError> {
        let (stream, handle) = OutputStream::try_default()
            .map_err(|e| SoundError::DeviceNotAvailable(e.to_string()))?;

        debug!("Audio output stream initialized");

        Ok(Self {
            _stream: stream,
            handle,
        })
    }

    /// Opens the default output device, returning None if audio is unavailable.
    #[must_use]
    pub fn try_open_default() -> Option<Self> {
        match Self::open_default() {
            Ok(output) => Some(output),
            Err(e) => {
                warn!("Audio not available, playing silently: {}", e);
                None
            }
        }
    }

    /// Returns a handle for creating sinks on this device.
    #[must_use]
    pub fn handle(&self) -> OutputStreamHandle {
        self.handle.clone()
    }
}

impl std::fmt::Debug for AudioOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioOutput").finish_non_exhaustive()
    }
}

/// A sound player that uses rodio for one-shot playback.
///
/// Playback is non-blocking; sounds continue playing in the background.
pub struct RodioSoundPlayer {
    /// Handle to the output stream, None when no device could be opened.
    stream_handle: Option<OutputStreamHandle>,
    /// Whether sound playback is disabled.
    disabled: AtomicBool,
}

impl RodioSoundPlayer {
    /// Creates a new sound player on the given output.
    ///
    /// # Arguments
    ///
    /// * `output` - The audio output, or None to fail every play with
    ///   `SoundError::DeviceNotAvailable`.
    /// * `disabled` - If true, all sound playback will be silently skipped.
    #[must_use]
    pub fn new(output: Option<&AudioOutput>, disabled: bool) -> Self {
        Self {
            stream_handle: output.map(AudioOutput::handle),
            disabled: AtomicBool::new(disabled),
        }
    }

    /// Plays a sound from the given source.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No audio device is available
    /// - The sound file cannot be opened or decoded
    /// - A sink cannot be created
    pub fn play(&self, source: &SoundSource) -> Result<(), SoundError> {
        if self.disabled.load(Ordering::Relaxed) {
            debug!("Sound playback disabled, skipping");
            return Ok(());
        }

        match source {
            SoundSource::Tone { name, spec } => {
                debug!("Playing tone: {}", name);
                self.play_source(ChimeTone::new(*spec))
            }
            SoundSource::File { name, path } => {
                debug!("Playing sound file: {}", name);
                let file = File::open(path)
                    .map_err(|e| SoundError::FileNotFound(format!("{}: {}", path.display(), e)))?;
                let decoder = Decoder::new(BufReader::new(file))
                    .map_err(|e| SoundError::DecodeError(e.to_string()))?;
                self.play_source(decoder)
            }
        }
    }

    /// Plays any rodio source on a detached sink.
    fn play_source<S>(&self, source: S) -> Result<(), SoundError>
    where
        S: Source + Send + 'static,
        S::Item: rodio::Sample + Send,
        f32: rodio::cpal::FromSample<S::Item>,
    {
        let handle = self.stream_handle.as_ref().ok_or_else(|| {
            SoundError::DeviceNotAvailable("no output device was opened".to_string())
        })?;

        let sink = Sink::try_new(handle).map_err(|e| SoundError::StreamError(e.to_string()))?;

        sink.append(source);
        sink.detach(); // Non-blocking: sound continues after function returns

        debug!("Sound playback started (detached)");
        Ok(())
    }

    /// Returns true if sound playback is currently disabled.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::Relaxed)
    }

    /// Enables sound playback.
    pub fn enable(&self) {
        self.disabled.store(false, Ordering::Relaxed);
        debug!("Sound playback enabled");
    }

    /// Disables sound playback.
    pub fn disable(&self) {
        self.disabled.store(true, Ordering::Relaxed);
        debug!("Sound playback disabled");
    }

    /// Returns true if an output device backs this player.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.stream_handle.is_some()
    }
}

impl std::fmt::Debug for RodioSoundPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioSoundPlayer")
            .field("available", &self.is_available())
            .field("disabled", &self.disabled.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_without_device_reports_unavailable() {
        let player = RodioSoundPlayer::new(None, false);
        assert!(!player.is_available());

        let result = player.play(&SoundSource::chime());
        assert!(matches!(result, Err(SoundError::DeviceNotAvailable(_))));
    }

    #[test]
    fn test_disabled_player_skips_playback() {
        let player = RodioSoundPlayer::new(None, true);
        assert!(player.is_disabled());
        assert!(player.play(&SoundSource::chime()).is_ok());
    }

    #[test]
    fn test_enable_disable() {
        let player = RodioSoundPlayer::new(None, true);

        player.enable();
        assert!(!player.is_disabled());

        player.disable();
        assert!(player.is_disabled());
    }

    #[test]
    fn test_missing_file_is_reported() {
        let player = RodioSoundPlayer::new(None, false);
        let result = player.play(&SoundSource::file("/nonexistent/path/to/bell.wav"));
        assert!(matches!(result, Err(SoundError::FileNotFound(_))));
    }

    #[test]
    fn test_debug_impl() {
        let player = RodioSoundPlayer::new(None, false);
        let debug_str = format!("{:?}", player);
        assert!(debug_str.contains("RodioSoundPlayer"));
    }

    #[test]
    fn test_try_open_default_does_not_panic() {
        // May be None in containers without audio hardware
        let _ = AudioOutput::try_open_default();
    }
}
