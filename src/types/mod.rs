//! Core data types for the rain Pomodoro timer.
//!
//! This module defines the data structures used for:
//! - Session modes and their fixed durations
//! - Timer state and its transitions
//! - Presentation theme
//! - IPC request/response serialization

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Work sessions completed before a long break is due.
pub const SESSIONS_PER_LONG_BREAK: u32 = 4;

// ============================================================================
// SessionMode
// ============================================================================

/// The active countdown kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    /// Focused work (25 minutes)
    #[default]
    Work,
    /// Short break (5 minutes)
    ShortBreak,
    /// Long break after every fourth work session (15 minutes)
    LongBreak,
}

impl SessionMode {
    /// All modes in selector order.
    pub const ALL: [SessionMode; 3] = [
        SessionMode::Work,
        SessionMode::ShortBreak,
        SessionMode::LongBreak,
    ];

    /// Returns the nominal duration of this mode in seconds.
    pub const fn duration_seconds(self) -> u32 {
        match self {
            SessionMode::Work => 25 * 60,
            SessionMode::ShortBreak => 5 * 60,
            SessionMode::LongBreak => 15 * 60,
        }
    }

    /// Returns the string representation used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionMode::Work => "work",
            SessionMode::ShortBreak => "short_break",
            SessionMode::LongBreak => "long_break",
        }
    }

    /// Returns true for either break mode.
    pub fn is_break(&self) -> bool {
        !matches!(self, SessionMode::Work)
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "work" | "focus" => Ok(SessionMode::Work),
            "short_break" | "short" => Ok(SessionMode::ShortBreak),
            "long_break" | "long" => Ok(SessionMode::LongBreak),
            other => Err(format!(
                "unknown mode '{other}' (expected work, short-break or long-break)"
            )),
        }
    }
}

// ============================================================================
// Theme
// ============================================================================

/// Light/dark presentation theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn is_dark(&self) -> bool {
        matches!(self, Theme::Dark)
    }

    /// The other theme.
    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme '{other}' (expected light or dark)")),
        }
    }
}

// ============================================================================
// TimerState
// ============================================================================

/// Represents the current state of the session timer.
///
/// `remaining_seconds` never exceeds the nominal duration of `mode`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    /// Active session mode
    pub mode: SessionMode,
    /// Remaining seconds in the current countdown
    pub remaining_seconds: u32,
    /// Whether the countdown is running
    pub is_running: bool,
    /// Whether the current countdown has been started at least once
    pub has_started: bool,
    /// Number of completed work sessions
    pub completed_work_sessions: u32,
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerState {
    /// Creates the initial state: an idle, full-length work session.
    pub fn new() -> Self {
        Self {
            mode: SessionMode::Work,
            remaining_seconds: SessionMode::Work.duration_seconds(),
            is_running: false,
            has_started: false,
            completed_work_sessions: 0,
        }
    }

    /// Returns the nominal duration of the current mode.
    pub fn nominal_seconds(&self) -> u32 {
        self.mode.duration_seconds()
    }

    /// Starts or resumes the countdown.
    ///
    /// Returns false (and changes nothing) if already running.
    pub fn start(&mut self) -> bool {
        if self.is_running {
            return false;
        }
        self.has_started = true;
        self.is_running = true;
        true
    }

    /// Pauses the countdown, keeping the remaining time.
    ///
    /// Returns false (and changes nothing) if not running.
    pub fn pause(&mut self) -> bool {
        if !self.is_running {
            return false;
        }
        self.is_running = false;
        true
    }

    /// Stops the countdown and rewinds it to the full duration of the current mode.
    pub fn reset(&mut self) {
        self.is_running = false;
        self.has_started = false;
        self.remaining_seconds = self.nominal_seconds();
    }

    /// Stops the countdown and loads a full countdown of `target`.
    pub fn switch_mode(&mut self, target: SessionMode) {
        self.is_running = false;
        self.mode = target;
        self.remaining_seconds = target.duration_seconds();
        self.has_started = false;
    }

    /// Decrements the countdown by one second.
    ///
    /// Does nothing unless running. Returns true when the running countdown
    /// is at zero and completion is due.
    pub fn tick(&mut self) -> bool {
        if !self.is_running {
            return false;
        }
        if self.remaining_seconds > 0 {
            self.remaining_seconds -= 1;
        }
        self.remaining_seconds == 0
    }

    /// Returns the mode that follows the current one on completion.
    ///
    /// For work sessions this accounts for the session that is about to be
    /// counted.
    pub fn next_mode(&self) -> SessionMode {
        match self.mode {
            SessionMode::Work => {
                let completed = self.completed_work_sessions + 1;
                if completed % SESSIONS_PER_LONG_BREAK == 0 {
                    SessionMode::LongBreak
                } else {
                    SessionMode::ShortBreak
                }
            }
            SessionMode::ShortBreak | SessionMode::LongBreak => SessionMode::Work,
        }
    }

    /// Completes the current countdown and moves to the next mode.
    ///
    /// The new countdown is loaded but not started. Returns the new mode.
    pub fn complete(&mut self) -> SessionMode {
        self.is_running = false;
        let next = self.next_mode();
        if self.mode == SessionMode::Work {
            self.completed_work_sessions += 1;
        }
        self.switch_mode(next);
        next
    }

    /// Returns the fraction of the countdown still remaining (1.0 = full).
    pub fn progress(&self) -> f64 {
        let nominal = self.nominal_seconds();
        if nominal == 0 {
            return 0.0;
        }
        f64::from(self.remaining_seconds) / f64::from(nominal)
    }
}

// ============================================================================
// IPC Types
// ============================================================================

/// IPC request from client to daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum IpcRequest {
    /// Start (or resume) the countdown
    Start,
    /// Pause the countdown
    Pause,
    /// Resume a paused countdown
    Resume,
    /// Pause when running, start otherwise
    Toggle,
    /// Rewind the current mode
    Reset,
    /// Switch to another session mode
    Mode {
        /// Target mode
        target: SessionMode,
    },
    /// Advance to the next ambient sound preset
    Sound,
    /// Select the presentation theme, or toggle it when none is given
    Theme {
        /// Requested theme
        #[serde(default, skip_serializing_if = "Option::is_none")]
        theme: Option<Theme>,
    },
    /// Query the current status
    Status,
    /// Stop the daemon
    Shutdown,
}

/// Snapshot of everything the presentation layer renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseData {
    /// Timer state
    #[serde(flatten)]
    pub timer: TimerState,
    /// Selected ambient preset id
    #[serde(rename = "soundPreset")]
    pub sound_preset: String,
    /// Presentation theme
    pub theme: Theme,
}

/// IPC response from daemon to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpcResponse {
    /// Response status ("success" or "error")
    pub status: String,
    /// Human-readable message
    pub message: String,
    /// Optional response data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

impl IpcResponse {
    /// Creates a success response.
    pub fn success(message: impl Into<String>, data: Option<ResponseData>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data,
        }
    }

    /// Creates an error response.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            data: None,
        }
    }

    /// Returns true if the daemon reported success.
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------------
    // SessionMode Tests
    // ------------------------------------------------------------------------

    mod session_mode_tests {
        use super::*;

        #[test]
        fn test_durations() {
            assert_eq!(SessionMode::Work.duration_seconds(), 1500);
            assert_eq!(SessionMode::ShortBreak.duration_seconds(), 300);
            assert_eq!(SessionMode::LongBreak.duration_seconds(), 900);
        }

        #[test]
        fn test_default_is_work() {
            assert_eq!(SessionMode::default(), SessionMode::Work);
        }

        #[test]
        fn test_serialize() {
            let json = serde_json::to_string(&SessionMode::ShortBreak).unwrap();
            assert_eq!(json, "\"short_break\"");
        }

        #[test]
        fn test_from_str_accepts_aliases() {
            assert_eq!("focus".parse::<SessionMode>().unwrap(), SessionMode::Work);
            assert_eq!(
                "short-break".parse::<SessionMode>().unwrap(),
                SessionMode::ShortBreak
            );
            assert_eq!("LONG".parse::<SessionMode>().unwrap(), SessionMode::LongBreak);
            assert!("nap".parse::<SessionMode>().is_err());
        }

        #[test]
        fn test_is_break() {
            assert!(!SessionMode::Work.is_break());
            assert!(SessionMode::ShortBreak.is_break());
            assert!(SessionMode::LongBreak.is_break());
        }

        #[test]
        fn test_theme_toggled() {
            assert_eq!(Theme::default(), Theme::Light);
            assert_eq!(Theme::Light.toggled(), Theme::Dark);
            assert_eq!(Theme::Dark.toggled(), Theme::Light);
            assert_eq!(" Dark ".parse::<Theme>().unwrap(), Theme::Dark);
        }
    }

    // ------------------------------------------------------------------------
    // TimerState Tests
    // ------------------------------------------------------------------------

    mod timer_state_tests {
        use super::*;

        #[test]
        fn test_new_state() {
            let state = TimerState::new();
            assert_eq!(state.mode, SessionMode::Work);
            assert_eq!(state.remaining_seconds, 1500);
            assert!(!state.is_running);
            assert!(!state.has_started);
            assert_eq!(state.completed_work_sessions, 0);
        }

        #[test]
        fn test_start_sets_flags() {
            let mut state = TimerState::new();
            assert!(state.start());
            assert!(state.is_running);
            assert!(state.has_started);
        }

        #[test]
        fn test_start_when_running_is_noop() {
            let mut state = TimerState::new();
            state.start();
            state.remaining_seconds = 1000;
            let before = state.clone();

            assert!(!state.start());
            assert_eq!(state, before);
        }

        #[test]
        fn test_pause_keeps_remaining_and_started() {
            let mut state = TimerState::new();
            state.start();
            state.remaining_seconds = 777;

            assert!(state.pause());
            assert!(!state.is_running);
            assert!(state.has_started);
            assert_eq!(state.remaining_seconds, 777);
        }

        #[test]
        fn test_pause_when_paused_is_noop() {
            let mut state = TimerState::new();
            state.start();
            state.pause();
            let before = state.clone();

            assert!(!state.pause());
            assert_eq!(state, before);
        }

        #[test]
        fn test_reset_restores_nominal_duration() {
            for mode in SessionMode::ALL {
                let mut state = TimerState::new();
                state.switch_mode(mode);
                state.start();
                state.remaining_seconds = 12;
                state.completed_work_sessions = 3;

                state.reset();

                assert_eq!(state.remaining_seconds, mode.duration_seconds());
                assert_eq!(state.mode, mode);
                assert!(!state.is_running);
                assert!(!state.has_started);
                assert_eq!(state.completed_work_sessions, 3);
            }
        }

        #[test]
        fn test_switch_mode_loads_target_duration() {
            for mode in SessionMode::ALL {
                let mut state = TimerState::new();
                state.start();
                state.completed_work_sessions = 2;

                state.switch_mode(mode);

                assert_eq!(state.mode, mode);
                assert_eq!(state.remaining_seconds, mode.duration_seconds());
                assert!(!state.is_running);
                assert!(!state.has_started);
                assert_eq!(state.completed_work_sessions, 2);
            }
        }

        #[test]
        fn test_tick_only_when_running() {
            let mut state = TimerState::new();
            assert!(!state.tick());
            assert_eq!(state.remaining_seconds, 1500);
        }

        #[test]
        fn test_tick_decrements_by_one() {
            let mut state = TimerState::new();
            state.start();

            for expected in (1490..1500).rev() {
                assert!(!state.tick());
                assert_eq!(state.remaining_seconds, expected);
            }
        }

        #[test]
        fn test_tick_reports_zero() {
            let mut state = TimerState::new();
            state.start();
            state.remaining_seconds = 1;

            assert!(state.tick());
            assert_eq!(state.remaining_seconds, 0);
        }

        #[test]
        fn test_complete_work_routes_to_short_break() {
            let mut state = TimerState::new();
            state.start();
            state.remaining_seconds = 0;

            let next = state.complete();

            assert_eq!(next, SessionMode::ShortBreak);
            assert_eq!(state.mode, SessionMode::ShortBreak);
            assert_eq!(state.remaining_seconds, 300);
            assert_eq!(state.completed_work_sessions, 1);
            assert!(!state.is_running);
            assert!(!state.has_started);
        }

        #[test]
        fn test_complete_fourth_work_routes_to_long_break() {
            let mut state = TimerState::new();
            state.completed_work_sessions = 3;

            assert_eq!(state.complete(), SessionMode::LongBreak);
            assert_eq!(state.remaining_seconds, 900);
            assert_eq!(state.completed_work_sessions, 4);
        }

        #[test]
        fn test_complete_break_routes_to_work() {
            for mode in [SessionMode::ShortBreak, SessionMode::LongBreak] {
                let mut state = TimerState::new();
                state.switch_mode(mode);
                state.completed_work_sessions = 4;

                assert_eq!(state.complete(), SessionMode::Work);
                assert_eq!(state.remaining_seconds, 1500);
                assert_eq!(state.completed_work_sessions, 4);
            }
        }

        #[test]
        fn test_progress() {
            let mut state = TimerState::new();
            assert!((state.progress() - 1.0).abs() < f64::EPSILON);

            state.remaining_seconds = 750;
            assert!((state.progress() - 0.5).abs() < f64::EPSILON);
        }

        #[test]
        fn test_serialize_camel_case() {
            let json = serde_json::to_string(&TimerState::new()).unwrap();
            assert!(json.contains("\"remainingSeconds\":1500"));
            assert!(json.contains("\"hasStarted\":false"));
            assert!(json.contains("\"completedWorkSessions\":0"));
        }
    }

    // ------------------------------------------------------------------------
    // IPC Types Tests
    // ------------------------------------------------------------------------

    mod ipc_tests {
        use super::*;

        #[test]
        fn test_ipc_request_unit_serialize() {
            let json = serde_json::to_string(&IpcRequest::Toggle).unwrap();
            assert_eq!(json, r#"{"command":"toggle"}"#);
        }

        #[test]
        fn test_ipc_request_mode_roundtrip() {
            let json = r#"{"command":"mode","target":"long_break"}"#;
            let request: IpcRequest = serde_json::from_str(json).unwrap();
            assert_eq!(
                request,
                IpcRequest::Mode {
                    target: SessionMode::LongBreak
                }
            );
        }

        #[test]
        fn test_ipc_request_theme_deserialize() {
            let json = r#"{"command":"theme","theme":"dark"}"#;
            let request: IpcRequest = serde_json::from_str(json).unwrap();
            assert_eq!(
                request,
                IpcRequest::Theme {
                    theme: Some(Theme::Dark)
                }
            );
        }

        #[test]
        fn test_ipc_request_theme_without_value_toggles() {
            let request: IpcRequest = serde_json::from_str(r#"{"command":"theme"}"#).unwrap();
            assert_eq!(request, IpcRequest::Theme { theme: None });

            let json = serde_json::to_string(&IpcRequest::Theme { theme: None }).unwrap();
            assert_eq!(json, r#"{"command":"theme"}"#);
        }

        #[test]
        fn test_response_data_flattens_timer() {
            let data = ResponseData {
                timer: TimerState::new(),
                sound_preset: "storm".to_string(),
                theme: Theme::Dark,
            };

            let json = serde_json::to_string(&data).unwrap();
            assert!(json.contains("\"mode\":\"work\""));
            assert!(json.contains("\"soundPreset\":\"storm\""));
            assert!(json.contains("\"theme\":\"dark\""));

            let back: ResponseData = serde_json::from_str(&json).unwrap();
            assert_eq!(back, data);
        }

        #[test]
        fn test_ipc_response_error() {
            let response = IpcResponse::error("boom");
            assert!(!response.is_success());
            assert!(response.data.is_none());

            let json = serde_json::to_string(&response).unwrap();
            assert!(!json.contains("data"));
        }
    }
}
