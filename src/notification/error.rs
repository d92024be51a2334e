//! Notification system error types.
//!
//! Notifications are best-effort, so these errors are logged by the caller
//! rather than shown to the user.

use thiserror::Error;

/// Errors that can occur in the notification system.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// Notification permission was denied.
    #[error("Notification permission denied")]
    PermissionDenied,

    /// Notification permission has not been decided yet.
    #[error("Notification permission not yet requested")]
    PermissionNotRequested,

    /// Failed to send a notification.
    #[error("Failed to send notification: {0}")]
    SendFailed(String),

    /// No notification service is reachable.
    #[error("Notification service not available")]
    NotAvailable,
}

impl NotificationError {
    /// Returns true if this error is related to permissions.
    #[must_use]
    pub fn is_permission_error(&self) -> bool {
        matches!(self, Self::PermissionDenied | Self::PermissionNotRequested)
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "Restart the daemon without --no-notify",
            Self::PermissionNotRequested => "Start a session to enable notifications",
            Self::SendFailed(_) | Self::NotAvailable => {
                "Check that a desktop notification service is running"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NotificationError::PermissionDenied;
        assert_eq!(err.to_string(), "Notification permission denied");

        let err = NotificationError::SendFailed("dbus".to_string());
        assert!(err.to_string().contains("dbus"));
    }

    #[test]
    fn test_is_permission_error() {
        assert!(NotificationError::PermissionDenied.is_permission_error());
        assert!(NotificationError::PermissionNotRequested.is_permission_error());
        assert!(!NotificationError::NotAvailable.is_permission_error());
    }

    #[test]
    fn test_suggestion() {
        assert!(NotificationError::PermissionDenied
            .suggestion()
            .contains("--no-notify"));
    }
}
