//! Audio handle abstraction for ambient playback.
//!
//! An [`AudioBackend`] opens [`AudioHandle`]s: long-lived, seekable,
//! pausable tracks. The rodio implementation is used by the daemon; the
//! mock records every call so the ambient player can be tested without an
//! audio device.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rodio::{Decoder, OutputStreamHandle, Sink, Source};
use tracing::debug;

use super::error::SoundError;
use super::player::AudioOutput;

/// How a track is configured when it is loaded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackSettings {
    /// Restart from the beginning when the end is reached
    pub looping: bool,
    /// Output volume (1.0 = unchanged)
    pub volume: f32,
}

impl TrackSettings {
    /// Continuous loop at half volume.
    pub const AMBIENT: TrackSettings = TrackSettings {
        looping: true,
        volume: 0.5,
    };
}

/// Media metadata, available once the track has been inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackMetadata {
    /// Track length, None when the container does not report it
    pub duration: Option<Duration>,
}

/// A single loaded track.
pub trait AudioHandle {
    /// Path of the loaded track.
    fn source(&self) -> &Path;

    /// Stops the current track and loads another one, paused.
    fn set_source(&mut self, path: &Path) -> Result<(), SoundError>;

    /// Starts or resumes playback.
    fn play(&mut self) -> Result<(), SoundError>;

    /// Pauses playback, keeping the position.
    fn pause(&mut self);

    /// Returns true while playback is paused.
    fn is_paused(&self) -> bool;

    /// Current playback position.
    fn position(&self) -> Duration;

    /// Moves the playback position.
    fn seek(&mut self, position: Duration) -> Result<(), SoundError>;

    /// Returns the metadata once it is known.
    fn metadata(&self) -> Option<TrackMetadata>;
}

/// Factory for audio handles.
pub trait AudioBackend {
    type Handle: AudioHandle;

    /// Loads `path` with `settings`, paused.
    fn open(&self, path: &Path, settings: TrackSettings) -> Result<Self::Handle, SoundError>;
}

// ============================================================================
// Rodio
// ============================================================================

/// Backend creating rodio sinks on the shared output device.
#[derive(Clone)]
pub struct RodioBackend {
    stream_handle: Option<OutputStreamHandle>,
}

impl RodioBackend {
    /// Creates a backend on `output`; without one every `open` fails.
    #[must_use]
    pub fn new(output: Option<&AudioOutput>) -> Self {
        Self {
            stream_handle: output.map(AudioOutput::handle),
        }
    }
}

impl std::fmt::Debug for RodioBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioBackend")
            .field("available", &self.stream_handle.is_some())
            .finish()
    }
}

impl AudioBackend for RodioBackend {
    type Handle = RodioHandle;

    fn open(&self, path: &Path, settings: TrackSettings) -> Result<RodioHandle, SoundError> {
        let stream_handle = self.stream_handle.clone().ok_or_else(|| {
            SoundError::DeviceNotAvailable("no output device was opened".to_string())
        })?;

        let (sink, metadata) = load_track(&stream_handle, path, settings)?;

        Ok(RodioHandle {
            stream_handle,
            sink,
            source: path.to_path_buf(),
            settings,
            metadata,
        })
    }
}

/// A rodio sink playing one track.
pub struct RodioHandle {
    stream_handle: OutputStreamHandle,
    sink: Sink,
    source: PathBuf,
    settings: TrackSettings,
    metadata: TrackMetadata,
}

fn open_file(path: &Path) -> Result<BufReader<File>, SoundError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| SoundError::FileNotFound(format!("{}: {}", path.display(), e)))
}

/// Creates a paused sink holding `path`.
fn load_track(
    stream_handle: &OutputStreamHandle,
    path: &Path,
    settings: TrackSettings,
) -> Result<(Sink, TrackMetadata), SoundError> {
    let duration = Decoder::new(open_file(path)?)
        .map_err(|e| SoundError::DecodeError(format!("{}: {}", path.display(), e)))?
        .total_duration();

    let sink = Sink::try_new(stream_handle).map_err(|e| SoundError::StreamError(e.to_string()))?;
    sink.pause();
    sink.set_volume(settings.volume);

    if settings.looping {
        let decoder = Decoder::new_looped(open_file(path)?)
            .map_err(|e| SoundError::DecodeError(format!("{}: {}", path.display(), e)))?;
        sink.append(decoder);
    } else {
        let decoder = Decoder::new(open_file(path)?)
            .map_err(|e| SoundError::DecodeError(format!("{}: {}", path.display(), e)))?;
        sink.append(decoder);
    }

    debug!("Loaded track {} (duration {:?})", path.display(), duration);
    Ok((sink, TrackMetadata { duration }))
}

impl AudioHandle for RodioHandle {
    fn source(&self) -> &Path {
        &self.source
    }

    fn set_source(&mut self, path: &Path) -> Result<(), SoundError> {
        self.sink.stop();
        let (sink, metadata) = load_track(&self.stream_handle, path, self.settings)?;
        // Dropping the previous sink releases it from the mixer.
        self.sink = sink;
        self.source = path.to_path_buf();
        self.metadata = metadata;
        Ok(())
    }

    fn play(&mut self) -> Result<(), SoundError> {
        self.sink.play();
        Ok(())
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn is_paused(&self) -> bool {
        self.sink.is_paused()
    }

    fn position(&self) -> Duration {
        self.sink.get_pos()
    }

    fn seek(&mut self, position: Duration) -> Result<(), SoundError> {
        self.sink
            .try_seek(position)
            .map_err(|e| SoundError::SeekError(e.to_string()))
    }

    fn metadata(&self) -> Option<TrackMetadata> {
        Some(self.metadata)
    }
}

// ============================================================================
// Mock
// ============================================================================

#[derive(Debug, Default)]
struct MockAudioState {
    opened: Vec<PathBuf>,
    plays: Vec<PathBuf>,
    pauses: usize,
    seeks: Vec<Duration>,
    source: Option<PathBuf>,
    paused: bool,
    position: Duration,
    settings: Option<TrackSettings>,
    durations: HashMap<PathBuf, Option<Duration>>,
    fail_open: bool,
    fail_play: bool,
    open_attempts: usize,
    play_attempts: usize,
}

/// Mock backend for testing.
///
/// Clones share state, so a test can keep one clone while the player owns
/// another. Metadata for a path is unknown until `set_metadata` is called.
#[derive(Debug, Default, Clone)]
pub struct MockAudioBackend {
    state: Arc<Mutex<MockAudioState>>,
}

impl MockAudioBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the metadata of `path` available with the given duration.
    pub fn set_metadata(&self, path: impl Into<PathBuf>, duration: Option<Duration>) {
        self.state
            .lock()
            .unwrap()
            .durations
            .insert(path.into(), duration);
    }

    pub fn set_should_fail_open(&self, should_fail: bool) {
        self.state.lock().unwrap().fail_open = should_fail;
    }

    pub fn set_should_fail_play(&self, should_fail: bool) {
        self.state.lock().unwrap().fail_play = should_fail;
    }

    /// Simulates playback time passing.
    pub fn advance(&self, elapsed: Duration) {
        let mut state = self.state.lock().unwrap();
        if !state.paused && state.source.is_some() {
            state.position += elapsed;
        }
    }

    #[must_use]
    pub fn open_count(&self) -> usize {
        self.state.lock().unwrap().opened.len()
    }

    /// Counts every `open`, including failed ones.
    #[must_use]
    pub fn open_attempt_count(&self) -> usize {
        self.state.lock().unwrap().open_attempts
    }

    /// Counts every `play`, including failed ones.
    #[must_use]
    pub fn play_attempt_count(&self) -> usize {
        self.state.lock().unwrap().play_attempts
    }

    #[must_use]
    pub fn play_count(&self) -> usize {
        self.state.lock().unwrap().plays.len()
    }

    #[must_use]
    pub fn get_play_calls(&self) -> Vec<PathBuf> {
        self.state.lock().unwrap().plays.clone()
    }

    #[must_use]
    pub fn pause_count(&self) -> usize {
        self.state.lock().unwrap().pauses
    }

    #[must_use]
    pub fn get_seek_calls(&self) -> Vec<Duration> {
        self.state.lock().unwrap().seeks.clone()
    }

    #[must_use]
    pub fn current_source(&self) -> Option<PathBuf> {
        self.state.lock().unwrap().source.clone()
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        let state = self.state.lock().unwrap();
        state.source.is_some() && !state.paused
    }

    #[must_use]
    pub fn position(&self) -> Duration {
        self.state.lock().unwrap().position
    }

    #[must_use]
    pub fn settings(&self) -> Option<TrackSettings> {
        self.state.lock().unwrap().settings
    }
}

impl AudioBackend for MockAudioBackend {
    type Handle = MockAudioHandle;

    fn open(&self, path: &Path, settings: TrackSettings) -> Result<MockAudioHandle, SoundError> {
        let mut state = self.state.lock().unwrap();
        state.open_attempts += 1;
        if state.fail_open {
            return Err(SoundError::FileNotFound(path.display().to_string()));
        }
        state.opened.push(path.to_path_buf());
        state.source = Some(path.to_path_buf());
        state.paused = true;
        state.position = Duration::ZERO;
        state.settings = Some(settings);

        Ok(MockAudioHandle {
            state: Arc::clone(&self.state),
            source: path.to_path_buf(),
        })
    }
}

/// Handle produced by [`MockAudioBackend`].
#[derive(Debug)]
pub struct MockAudioHandle {
    state: Arc<Mutex<MockAudioState>>,
    source: PathBuf,
}

impl AudioHandle for MockAudioHandle {
    fn source(&self) -> &Path {
        &self.source
    }

    fn set_source(&mut self, path: &Path) -> Result<(), SoundError> {
        let mut state = self.state.lock().unwrap();
        state.opened.push(path.to_path_buf());
        state.source = Some(path.to_path_buf());
        state.paused = true;
        state.position = Duration::ZERO;
        self.source = path.to_path_buf();
        Ok(())
    }

    fn play(&mut self) -> Result<(), SoundError> {
        let mut state = self.state.lock().unwrap();
        state.play_attempts += 1;
        if state.fail_play {
            return Err(SoundError::PlaybackError("Mock failure".to_string()));
        }
        state.plays.push(self.source.clone());
        state.paused = false;
        Ok(())
    }

    fn pause(&mut self) {
        let mut state = self.state.lock().unwrap();
        state.pauses += 1;
        state.paused = true;
    }

    fn is_paused(&self) -> bool {
        self.state.lock().unwrap().paused
    }

    fn position(&self) -> Duration {
        self.state.lock().unwrap().position
    }

    fn seek(&mut self, position: Duration) -> Result<(), SoundError> {
        let mut state = self.state.lock().unwrap();
        state.seeks.push(position);
        state.position = position;
        Ok(())
    }

    fn metadata(&self) -> Option<TrackMetadata> {
        let state = self.state.lock().unwrap();
        state
            .durations
            .get(&self.source)
            .map(|&duration| TrackMetadata { duration })
    }
}
