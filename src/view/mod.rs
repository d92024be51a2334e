//! Presentation layer.
//!
//! Pure functions turning a daemon snapshot into text: labels, the MM:SS
//! countdown, the progress bar and the rain canvas. The daemon also keeps
//! the presentation-only state here (selected sound preset and theme).

use std::time::Duration;

use crate::rain::{RainActivity, RainLayer};
use crate::sound::{find_preset, PresetCycle, SoundPreset};
use crate::types::{ResponseData, SessionMode, Theme, TimerState};

/// Width of the progress bar in cells.
pub const PROGRESS_WIDTH: usize = 30;

// ============================================================================
// Labels
// ============================================================================

/// Formats seconds as zero-padded `MM:SS`.
pub fn format_time(total_seconds: u32) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Label shown above the countdown.
pub fn mode_label(mode: SessionMode) -> &'static str {
    match mode {
        SessionMode::Work => "WORK",
        SessionMode::ShortBreak => "SHORT BREAK",
        SessionMode::LongBreak => "LONG BREAK",
    }
}

/// Label of the mode selector control.
pub fn selector_label(mode: SessionMode) -> &'static str {
    match mode {
        SessionMode::Work => "Focus",
        SessionMode::ShortBreak => "Short Break",
        SessionMode::LongBreak => "Long Break",
    }
}

/// Label of the primary control.
pub fn primary_label(state: &TimerState) -> &'static str {
    if state.is_running {
        "Pause"
    } else if state.has_started {
        "Resume"
    } else {
        "Start"
    }
}

/// The session counter line.
pub fn sessions_line(completed: u32) -> String {
    format!("Sessions completed: {}", completed)
}

/// Renders `progress` (0.0 to 1.0) as a bar of `width` cells.
pub fn progress_bar(progress: f64, width: usize) -> String {
    let filled = (progress.clamp(0.0, 1.0) * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

// ============================================================================
// Derived state
// ============================================================================

/// Ambient rain plays (and rain shows) only during a running focus session.
pub fn should_play_ambient(state: &TimerState) -> bool {
    state.is_running && state.mode == SessionMode::Work
}

/// Rain layers active for `state` with `preset` selected.
pub fn rain_activity(state: &TimerState, preset: &SoundPreset) -> RainActivity {
    RainActivity::new(should_play_ambient(state), preset.is_audible())
}

/// Presentation-only state owned by the daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PresentationState {
    cycle: PresetCycle,
    theme: Theme,
}

impl PresentationState {
    /// Creates the state with an initial preset (falling back to `off`).
    pub fn new(preset_id: &str, theme: Theme) -> Self {
        Self {
            cycle: PresetCycle::starting_at(preset_id),
            theme,
        }
    }

    /// The selected ambient preset.
    pub fn preset(&self) -> &'static SoundPreset {
        self.cycle.current()
    }

    /// Advances to the next preset in catalog order.
    pub fn cycle_sound(&mut self) -> &'static SoundPreset {
        self.cycle.advance()
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    /// Combines this state with the timer state into a client snapshot.
    pub fn snapshot(&self, timer: TimerState) -> ResponseData {
        ResponseData {
            timer,
            sound_preset: self.preset().id.to_string(),
            theme: self.theme,
        }
    }
}

// ============================================================================
// Dashboard
// ============================================================================

/// Everything the dashboard shows, derived from one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub mode_label: &'static str,
    pub time: String,
    pub progress: f64,
    pub primary_label: &'static str,
    pub sessions: String,
    pub selected_mode: SessionMode,
    pub theme: Theme,
    pub preset_label: &'static str,
    pub sound_playing: bool,
    pub rain: RainActivity,
}

impl DashboardView {
    /// Builds the view for a daemon snapshot.
    pub fn from_snapshot(data: &ResponseData) -> Self {
        let preset = find_preset(&data.sound_preset).unwrap_or_else(|| PresetCycle::default().current());
        let timer = &data.timer;
        let playing = should_play_ambient(timer);

        Self {
            mode_label: mode_label(timer.mode),
            time: format_time(timer.remaining_seconds),
            progress: timer.progress(),
            primary_label: primary_label(timer),
            sessions: sessions_line(timer.completed_work_sessions),
            selected_mode: timer.mode,
            theme: data.theme,
            preset_label: preset.label,
            sound_playing: playing && preset.is_audible(),
            rain: rain_activity(timer, preset),
        }
    }

    /// Mode selector with the active mode bracketed.
    pub fn selector_line(&self) -> String {
        SessionMode::ALL
            .iter()
            .map(|&mode| {
                if mode == self.selected_mode {
                    format!("[{}]", selector_label(mode))
                } else {
                    format!(" {} ", selector_label(mode))
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Sound indicator text.
    pub fn sound_line(&self) -> String {
        let state = if self.sound_playing { "playing" } else { "silent" };
        format!("Rain: {} ({})", self.preset_label, state)
    }

    /// Renders the text lines of the dashboard, without the rain canvas.
    pub fn render_lines(&self) -> Vec<String> {
        vec![
            self.selector_line(),
            String::new(),
            self.mode_label.to_string(),
            self.time.clone(),
            progress_bar(self.progress, PROGRESS_WIDTH),
            String::new(),
            format!("[{}]  [Reset]", self.primary_label),
            self.sessions.clone(),
            format!("{}   Theme: {}", self.sound_line(), self.theme.as_str()),
        ]
    }
}

// ============================================================================
// Rain canvas
// ============================================================================

/// Renders the active rain layers into a `width` x `height` character grid.
///
/// Each drop sits in the column given by its horizontal position and in the
/// row given by its animation phase `elapsed` after the animation started.
pub fn render_rain(
    activity: RainActivity,
    width: usize,
    height: usize,
    elapsed: Duration,
) -> Vec<String> {
    if width == 0 || height == 0 {
        return Vec::new();
    }
    let mut grid = vec![vec![' '; width]; height];

    let layers = [(RainLayer::Background, '|'), (RainLayer::Window, 'o')];
    for (layer, glyph) in layers {
        if !activity.is_active(layer) {
            continue;
        }
        for drop in layer.drops() {
            let column = (drop.left_percent as usize * (width - 1)) / 100;
            let row = ((drop.phase_at(elapsed) * height as f64) as usize).min(height - 1);
            let glyph = match drop.opacity_percent {
                Some(opacity) if opacity < 25 => '\'',
                _ => glyph,
            };
            grid[row][column] = glyph;
        }
    }

    grid.into_iter().map(|row| row.into_iter().collect()).collect()
}
