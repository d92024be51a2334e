//! Sound sources for one-shot alerts.

use std::path::PathBuf;

use super::tone::ToneSpec;

/// Represents the source of a one-shot sound.
#[derive(Debug, Clone, PartialEq)]
pub enum SoundSource {
    /// A synthesized tone.
    Tone {
        /// The name of the tone (e.g., "chime").
        name: String,
        /// Tone parameters.
        spec: ToneSpec,
    },
    /// A sound file on disk.
    File {
        /// The name of the sound (usually the file stem).
        name: String,
        /// The full path to the sound file.
        path: PathBuf,
    },
}

impl SoundSource {
    /// The default completion chime.
    #[must_use]
    pub fn chime() -> Self {
        Self::Tone {
            name: "chime".to_string(),
            spec: ToneSpec::CHIME,
        }
    }

    /// Creates a file sound source named after the file stem.
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "custom".to_string());
        Self::File { name, path }
    }

    /// Returns the sound used for completion alerts: the file override if
    /// one is configured, otherwise the synthesized chime.
    #[must_use]
    pub fn completion_alert(override_path: Option<&PathBuf>) -> Self {
        match override_path {
            Some(path) => Self::file(path.clone()),
            None => Self::chime(),
        }
    }

    /// Returns the name of the sound source.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Tone { name, .. } | Self::File { name, .. } => name,
        }
    }

    /// Returns true if this is a synthesized tone.
    #[must_use]
    pub fn is_tone(&self) -> bool {
        matches!(self, Self::Tone { .. })
    }

    /// Returns the file path if this is a file sound.
    #[must_use]
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::File { path, .. } => Some(path),
            Self::Tone { .. } => None,
        }
    }
}
