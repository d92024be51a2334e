//! Ambient sound preset catalog.
//!
//! The catalog is static: four presets in a fixed order, starting with the
//! silent `off` preset. Files are looked up relative to the configured
//! sounds directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;

/// Where playback starts inside a preset's track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOffset {
    /// Start at the beginning.
    None,
    /// Always start at this second.
    Fixed(u32),
    /// Start at one of these seconds, picked uniformly per play.
    RandomChoice(&'static [u32]),
}

impl StartOffset {
    /// Resolves the offset for one play/switch event.
    ///
    /// With a known `duration`, fixed offsets are clamped to it and random
    /// choices only consider candidates that start before the end of the
    /// track. When no candidate fits, the smallest one is used, clamped.
    pub fn resolve<R: Rng + ?Sized>(&self, duration: Option<Duration>, rng: &mut R) -> Duration {
        let clamp = |secs: u32| {
            let offset = Duration::from_secs(u64::from(secs));
            match duration {
                Some(limit) => offset.min(limit),
                None => offset,
            }
        };

        match *self {
            StartOffset::None => Duration::ZERO,
            StartOffset::Fixed(secs) => clamp(secs),
            StartOffset::RandomChoice(candidates) => {
                let eligible: Vec<u32> = match duration {
                    Some(limit) => candidates
                        .iter()
                        .copied()
                        .filter(|&secs| Duration::from_secs(u64::from(secs)) < limit)
                        .collect(),
                    None => candidates.to_vec(),
                };

                match eligible.choose(rng) {
                    Some(&secs) => clamp(secs),
                    None => candidates
                        .iter()
                        .copied()
                        .min()
                        .map_or(Duration::ZERO, clamp),
                }
            }
        }
    }
}

/// A named ambient-sound configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoundPreset {
    /// Stable identifier used on the wire
    pub id: &'static str,
    /// Display label
    pub label: &'static str,
    /// Track file name relative to the sounds directory
    pub file: Option<&'static str>,
    /// Start offset policy
    pub start_offset: StartOffset,
}

impl SoundPreset {
    /// Returns true if this preset produces sound.
    pub fn is_audible(&self) -> bool {
        self.file.is_some()
    }

    /// Resolves the track path against `sounds_dir`.
    pub fn resolve_path(&self, sounds_dir: &Path) -> Option<PathBuf> {
        self.file.map(|file| sounds_dir.join(file))
    }
}

/// The fixed catalog, in cycling order.
pub const PRESETS: [SoundPreset; 4] = [
    SoundPreset {
        id: "off",
        label: "OFF",
        file: None,
        start_offset: StartOffset::None,
    },
    SoundPreset {
        id: "drizzle",
        label: "DRIZZLE",
        file: Some("soft-rain-loop.ogg"),
        start_offset: StartOffset::Fixed(0),
    },
    SoundPreset {
        id: "pour",
        label: "POUR",
        file: Some("ambiance-heavy-rain-loop.wav"),
        start_offset: StartOffset::Fixed(0),
    },
    SoundPreset {
        id: "storm",
        label: "STORM",
        file: Some("thunderstorm-with-rain-and-traffic-loop.wav"),
        start_offset: StartOffset::RandomChoice(&[6, 21, 58, 63, 114, 273]),
    },
];

/// Looks up a preset by id.
pub fn find_preset(id: &str) -> Option<&'static SoundPreset> {
    PRESETS.iter().find(|preset| preset.id.eq_ignore_ascii_case(id))
}

/// Round-robin cursor over the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PresetCycle {
    index: usize,
}

impl PresetCycle {
    /// Creates a cursor on the preset with `id`, or on `off` if unknown.
    pub fn starting_at(id: &str) -> Self {
        let index = PRESETS
            .iter()
            .position(|preset| preset.id.eq_ignore_ascii_case(id))
            .unwrap_or(0);
        Self { index }
    }

    /// Returns the catalog index of the selected preset.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the selected preset.
    pub fn current(&self) -> &'static SoundPreset {
        &PRESETS[self.index]
    }

    /// Advances to the next preset, wrapping from last to first.
    pub fn advance(&mut self) -> &'static SoundPreset {
        self.index = (self.index + 1) % PRESETS.len();
        self.current()
    }
}
