//! Ambient rain playback.
//!
//! [`AmbientPlayer`] owns at most one audio handle and reconciles it with
//! the desired state on every call to [`AmbientPlayer::sync`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, warn};

use super::backend::{AudioBackend, AudioHandle, TrackSettings};
use super::catalog::{SoundPreset, StartOffset};

/// Snapshot of what the ambient player is doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackState {
    /// Preset of the last started track, None when stopped
    pub active_preset: Option<&'static str>,
    /// True while the handle is producing sound
    pub is_playing: bool,
    /// Current position inside the track
    pub position: Duration,
}

/// Offset waiting for the track's metadata.
#[derive(Debug, Clone)]
struct PendingOffset {
    source: PathBuf,
    policy: StartOffset,
}

/// Single-owner ambient sound player.
///
/// Dropping the player stops playback.
pub struct AmbientPlayer<B: AudioBackend> {
    backend: B,
    sounds_dir: PathBuf,
    handle: Option<B::Handle>,
    active_preset: Option<&'static str>,
    pending_offset: Option<PendingOffset>,
    /// Track that last failed to load or play; not retried until the
    /// target changes or playback is stopped
    failed: Option<PathBuf>,
    rng: StdRng,
}

impl<B: AudioBackend> AmbientPlayer<B> {
    /// Creates a player resolving preset files against `sounds_dir`.
    pub fn new(backend: B, sounds_dir: impl Into<PathBuf>) -> Self {
        Self::with_rng(backend, sounds_dir, StdRng::from_entropy())
    }

    /// Creates a player with a deterministic random source.
    pub fn with_rng(backend: B, sounds_dir: impl Into<PathBuf>, rng: StdRng) -> Self {
        Self {
            backend,
            sounds_dir: sounds_dir.into(),
            handle: None,
            active_preset: None,
            pending_offset: None,
            failed: None,
            rng,
        }
    }

    /// Returns the directory preset files are resolved against.
    pub fn sounds_dir(&self) -> &Path {
        &self.sounds_dir
    }

    /// Brings playback in line with `should_play` and `preset`.
    ///
    /// Failures are logged once and leave the player silent. The failed
    /// track is not retried until `should_play` or the preset changes.
    pub fn sync(&mut self, should_play: bool, preset: &SoundPreset) {
        let target = if should_play {
            preset.resolve_path(&self.sounds_dir)
        } else {
            None
        };

        let Some(path) = target else {
            self.stop();
            return;
        };

        if self.failed.as_deref() == Some(path.as_path()) {
            return;
        }
        self.failed = None;

        match self.handle.as_mut() {
            None => {
                let mut handle = match self.backend.open(&path, TrackSettings::AMBIENT) {
                    Ok(handle) => handle,
                    Err(e) => {
                        warn!("Failed to load ambient track {}: {}", path.display(), e);
                        self.failed = Some(path);
                        return;
                    }
                };
                debug!("Starting ambient preset {}", preset.id);
                if let Err(e) = handle.play() {
                    warn!("Failed to play ambient track {}: {}", path.display(), e);
                    self.failed = Some(path.clone());
                }
                self.handle = Some(handle);
                self.schedule_offset(path, preset.start_offset);
            }
            Some(handle) if handle.source() != path => {
                debug!("Switching ambient preset to {}", preset.id);
                // The previous track goes silent before the new one loads.
                handle.pause();
                if let Err(e) = handle.set_source(&path) {
                    warn!("Failed to load ambient track {}: {}", path.display(), e);
                    self.active_preset = None;
                    self.pending_offset = None;
                    self.failed = Some(path);
                    return;
                }
                if let Err(e) = handle.play() {
                    warn!("Failed to play ambient track {}: {}", path.display(), e);
                    self.failed = Some(path.clone());
                }
                self.schedule_offset(path, preset.start_offset);
            }
            Some(handle) if handle.is_paused() => {
                debug!("Resuming ambient preset {}", preset.id);
                if let Err(e) = handle.play() {
                    warn!("Failed to resume ambient track {}: {}", path.display(), e);
                    self.failed = Some(path);
                }
            }
            Some(_) => {}
        }

        self.active_preset = Some(preset.id);
        self.apply_pending_offset();
    }

    /// Pauses playback and rewinds to the start. No-op when already silent.
    pub fn stop(&mut self) {
        self.pending_offset = None;
        self.failed = None;
        self.active_preset = None;

        let Some(handle) = self.handle.as_mut() else {
            return;
        };
        if handle.is_paused() {
            return;
        }

        debug!("Stopping ambient playback");
        handle.pause();
        if let Err(e) = handle.seek(Duration::ZERO) {
            warn!("Failed to rewind ambient track: {}", e);
        }
    }

    /// Returns the current playback state.
    pub fn playback_state(&self) -> PlaybackState {
        match self.handle.as_ref() {
            Some(handle) => PlaybackState {
                active_preset: self.active_preset,
                is_playing: !handle.is_paused(),
                position: handle.position(),
            },
            None => PlaybackState {
                active_preset: None,
                is_playing: false,
                position: Duration::ZERO,
            },
        }
    }

    /// Returns true while a track is audible.
    pub fn is_playing(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_paused())
    }

    fn schedule_offset(&mut self, source: PathBuf, policy: StartOffset) {
        self.pending_offset = Some(PendingOffset { source, policy });
    }

    /// Seeks to the pending offset once the track's duration is known.
    ///
    /// An offset computed for a source the handle no longer references is
    /// discarded.
    fn apply_pending_offset(&mut self) {
        let Some(handle) = self.handle.as_mut() else {
            return;
        };
        let Some(pending) = self.pending_offset.as_ref() else {
            return;
        };

        if handle.source() != pending.source {
            debug!("Discarding start offset for {}", pending.source.display());
            self.pending_offset = None;
            return;
        }

        let Some(metadata) = handle.metadata() else {
            return;
        };

        let offset = pending.policy.resolve(metadata.duration, &mut self.rng);
        self.pending_offset = None;

        if offset.is_zero() {
            return;
        }
        debug!("Applying start offset {:?}", offset);
        if let Err(e) = handle.seek(offset) {
            warn!("Failed to apply start offset: {}", e);
        }
    }
}

impl<B: AudioBackend> Drop for AmbientPlayer<B> {
    fn drop(&mut self) {
        self.stop();
    }
}

impl<B: AudioBackend> std::fmt::Debug for AmbientPlayer<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AmbientPlayer")
            .field("sounds_dir", &self.sounds_dir)
            .field("active_preset", &self.active_preset)
            .field("has_handle", &self.handle.is_some())
            .finish_non_exhaustive()
    }
}
