//! Decorative rain animation.
//!
//! Drop parameters are a pure function of the layer and the drop index, so
//! the layout is identical across runs without any random state. Each layer's
//! drops are computed once and shared for the process lifetime.

use std::sync::LazyLock;
use std::time::Duration;

/// One animated rain drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RainDrop {
    /// Index within its layer
    pub index: usize,
    /// Horizontal position, percent of the layer width
    pub left_percent: u32,
    /// Time for one fall, milliseconds
    pub duration_ms: u32,
    /// Animation delay, milliseconds (never positive: drops start mid-fall)
    pub delay_ms: i32,
    /// Opacity in percent, background drops only
    pub opacity_percent: Option<u32>,
    /// Streak length in pixels, background drops only
    pub height_px: Option<u32>,
}

impl RainDrop {
    /// Fraction of the current fall completed `elapsed` after the animation
    /// started, in `[0, 1)`.
    pub fn phase_at(&self, elapsed: Duration) -> f64 {
        let period = i64::from(self.duration_ms);
        let t = elapsed.as_millis() as i64 - i64::from(self.delay_ms);
        t.rem_euclid(period) as f64 / period as f64
    }
}

/// The two independent rain layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RainLayer {
    /// Fast, thin drops behind everything
    Background,
    /// Slow, large drops sliding down the timer window
    Window,
}

impl RainLayer {
    /// Number of drops in the layer.
    pub const fn drop_count(self) -> usize {
        match self {
            RainLayer::Background => 50,
            RainLayer::Window => 10,
        }
    }

    /// Computes the drop at `index`. Indices wrap modulo the layer size.
    pub const fn drop_at(self, index: usize) -> RainDrop {
        let i = (index % self.drop_count()) as u32;
        match self {
            RainLayer::Background => RainDrop {
                index: i as usize,
                left_percent: ((i * 37 + 13) % 97) + 1,
                duration_ms: 500 + ((i * 13 + 7) % 50) * 10,
                delay_ms: -(((i * 17 + 3) % 200) as i32) * 10,
                opacity_percent: Some(15 + (i * 7 + 11) % 25),
                height_px: Some(12 + (i * 11 + 5) % 18),
            },
            RainLayer::Window => RainDrop {
                index: i as usize,
                left_percent: ((i * 29 + 11) % 85) + 5,
                duration_ms: 3000 + ((i * 17 + 7) % 50) * 100,
                delay_ms: -(((i * 23 + 3) % 80) as i32) * 100,
                opacity_percent: None,
                height_px: None,
            },
        }
    }

    /// All drops of the layer.
    pub fn drops(self) -> &'static [RainDrop] {
        match self {
            RainLayer::Background => &BACKGROUND_DROPS,
            RainLayer::Window => &WINDOW_DROPS,
        }
    }
}

static BACKGROUND_DROPS: LazyLock<Vec<RainDrop>> = LazyLock::new(|| generate(RainLayer::Background));
static WINDOW_DROPS: LazyLock<Vec<RainDrop>> = LazyLock::new(|| generate(RainLayer::Window));

fn generate(layer: RainLayer) -> Vec<RainDrop> {
    (0..layer.drop_count()).map(|i| layer.drop_at(i)).collect()
}

/// Which layers are animating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RainActivity {
    pub background: bool,
    pub window: bool,
}

impl RainActivity {
    /// Background rain follows the focus countdown; window drops also need
    /// an audible preset.
    pub fn new(rain_should_show: bool, preset_audible: bool) -> Self {
        Self {
            background: rain_should_show,
            window: rain_should_show && preset_audible,
        }
    }

    /// Returns true if `layer` is active.
    pub fn is_active(&self, layer: RainLayer) -> bool {
        match layer {
            RainLayer::Background => self.background,
            RainLayer::Window => self.window,
        }
    }
}
