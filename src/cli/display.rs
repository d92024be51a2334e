//! Display utilities for the rain Pomodoro CLI.
//!
//! This module provides formatted output for:
//! - Command results
//! - Error messages
//! - Status display

use crate::types::{IpcResponse, ResponseData};
use crate::view::DashboardView;

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows the outcome of a timer or presentation command.
    pub fn show_command_result(response: &IpcResponse) {
        for line in Self::command_result_lines(response) {
            println!("{}", line);
        }
    }

    /// Shows the current status as a static dashboard.
    pub fn show_status(response: &IpcResponse) {
        match &response.data {
            Some(data) => {
                for line in Self::status_lines(data) {
                    println!("{}", line);
                }
            }
            None => println!("The daemon sent no status"),
        }
    }

    /// Shows the acknowledgement of a shutdown request.
    pub fn show_shutdown(response: &IpcResponse) {
        println!("* {}", response.message);
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("Error: {}", message);
    }

    /// Lines printed after a command: the daemon's message, then a one-line
    /// summary of the timer.
    pub fn command_result_lines(response: &IpcResponse) -> Vec<String> {
        let mut lines = Vec::new();

        if !response.message.is_empty() {
            lines.push(format!("* {}", response.message));
        }
        if let Some(data) = &response.data {
            lines.push(format!("  {}", Self::summary_line(data)));
        }

        lines
    }

    /// One-line summary, e.g. `WORK 24:59 (Pause) | Rain: STORM (playing)`.
    pub fn summary_line(data: &ResponseData) -> String {
        let view = DashboardView::from_snapshot(data);
        format!(
            "{} {} ({}) | {}",
            view.mode_label,
            view.time,
            view.primary_label,
            view.sound_line()
        )
    }

    /// The dashboard as printed by `status`.
    pub fn status_lines(data: &ResponseData) -> Vec<String> {
        let mut lines = vec![
            "Rain Pomodoro".to_string(),
            "─────────────────────────────".to_string(),
        ];
        lines.extend(DashboardView::from_snapshot(data).render_lines());
        lines
    }
}

// ============================================================================
// Tests
// ============================================================================
