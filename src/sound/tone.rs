//! Synthesized completion chime.
//!
//! A short sine tone whose amplitude decays exponentially, generated sample
//! by sample so no asset needs to ship with the binary.

use std::f32::consts::TAU;
use std::time::Duration;

use rodio::Source;

const SAMPLE_RATE: u32 = 44_100;

/// Parameters of a decaying sine tone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneSpec {
    /// Frequency in Hz
    pub frequency: f32,
    /// Amplitude at the start of the tone
    pub start_gain: f32,
    /// Amplitude reached at the end of the tone
    pub end_gain: f32,
    /// Tone length
    pub duration: Duration,
}

impl ToneSpec {
    /// 800 Hz, 0.3 → 0.01 over half a second.
    pub const CHIME: ToneSpec = ToneSpec {
        frequency: 800.0,
        start_gain: 0.3,
        end_gain: 0.01,
        duration: Duration::from_millis(500),
    };

    /// Returns the envelope gain `t` seconds into the tone.
    pub fn gain_at(&self, t: f32) -> f32 {
        let length = self.duration.as_secs_f32();
        if length <= 0.0 {
            return 0.0;
        }
        let progress = (t / length).clamp(0.0, 1.0);
        self.start_gain * (self.end_gain / self.start_gain).powf(progress)
    }

    /// Returns the total number of mono samples in the tone.
    pub fn sample_count(&self) -> usize {
        (self.duration.as_secs_f64() * f64::from(SAMPLE_RATE)).round() as usize
    }
}

/// Iterator/`Source` producing the samples of a [`ToneSpec`].
#[derive(Debug, Clone)]
pub struct ChimeTone {
    spec: ToneSpec,
    position: usize,
    total: usize,
}

impl ChimeTone {
    pub fn new(spec: ToneSpec) -> Self {
        Self {
            spec,
            position: 0,
            total: spec.sample_count(),
        }
    }
}

impl Iterator for ChimeTone {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.position >= self.total {
            return None;
        }
        let t = self.position as f32 / SAMPLE_RATE as f32;
        self.position += 1;
        Some((TAU * self.spec.frequency * t).sin() * self.spec.gain_at(t))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.total - self.position;
        (left, Some(left))
    }
}

impl Source for ChimeTone {
    fn current_frame_len(&self) -> Option<usize> {
        Some(self.total - self.position)
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(self.spec.duration)
    }
}
