//! Notification content construction.
//!
//! This module provides a builder for creating notification content
//! with a fluent API, plus the fixed completion messages.

use crate::types::SessionMode;

/// Application name shown by the notification daemon.
pub const APP_NAME: &str = "rain-pomodoro";

/// Maximum length for titles and bodies in notifications.
const MAX_TEXT_LENGTH: usize = 200;

/// The text of a desktop notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContent {
    /// Summary line
    pub title: String,
    /// Body text
    pub body: String,
}

/// Builder for constructing notification content.
#[derive(Debug, Default)]
pub struct NotificationContentBuilder {
    title: String,
    body: String,
}

impl NotificationContentBuilder {
    /// Creates a new notification content builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the notification title.
    #[must_use]
    pub fn title(mut self, title: &str) -> Self {
        self.title = sanitize(title);
        self
    }

    /// Sets the notification body text.
    #[must_use]
    pub fn body(mut self, body: &str) -> Self {
        self.body = sanitize(body);
        self
    }

    /// Builds and returns the notification content.
    #[must_use]
    pub fn build(self) -> NotificationContent {
        NotificationContent {
            title: self.title,
            body: self.body,
        }
    }
}

/// Truncates and strips control characters.
fn sanitize(text: &str) -> String {
    text.chars()
        .take(MAX_TEXT_LENGTH)
        .filter(|c| !c.is_control())
        .collect()
}

/// Creates notification content for work session completion.
#[must_use]
pub fn create_work_complete_content() -> NotificationContent {
    NotificationContentBuilder::new()
        .title("Work session complete!")
        .body("Time for a break!")
        .build()
}

/// Creates notification content for break completion (short or long).
#[must_use]
pub fn create_break_complete_content() -> NotificationContent {
    NotificationContentBuilder::new()
        .title("Break complete!")
        .body("Ready to get back to work?")
        .build()
}

/// Returns the content announcing that `completed` has finished.
#[must_use]
pub fn completion_content(completed: SessionMode) -> NotificationContent {
    if completed.is_break() {
        create_break_complete_content()
    } else {
        create_work_complete_content()
    }
}
