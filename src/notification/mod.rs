//! Desktop notifications.
//!
//! This module provides best-effort completion notifications using
//! `notify-rust`. It includes:
//!
//! - A permission state that is decided lazily, on the first start
//! - Fire-and-forget delivery that never blocks the timer
//! - A mock notifier for tests
//!
//! # Example
//!
//! ```rust,no_run
//! use rain_pomodoro::notification::{DesktopNotifier, Notifier, completion_content};
//! use rain_pomodoro::types::SessionMode;
//!
//! let notifier = DesktopNotifier::new(true);
//! notifier.request_permission();
//! notifier.notify(&completion_content(SessionMode::Work)).ok();
//! ```

mod content;
pub mod error;

use std::sync::atomic::{AtomicU8, Ordering};

use notify_rust::Notification;
use tracing::{debug, warn};

pub use self::content::{
    completion_content, create_break_complete_content, create_work_complete_content,
    NotificationContent, NotificationContentBuilder, APP_NAME,
};
pub use self::error::NotificationError;

/// Whether notifications may be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationPermission {
    /// Not decided yet
    #[default]
    Default,
    /// Notifications are shown
    Granted,
    /// Notifications are never shown
    Denied,
}

impl NotificationPermission {
    fn to_u8(self) -> u8 {
        match self {
            Self::Default => 0,
            Self::Granted => 1,
            Self::Denied => 2,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Granted,
            2 => Self::Denied,
            _ => Self::Default,
        }
    }
}

/// Trait for notification implementations.
pub trait Notifier: Send + Sync {
    /// Returns the current permission state.
    fn permission(&self) -> NotificationPermission;

    /// Decides the permission if it is still undecided.
    ///
    /// Returns the resulting permission. Never blocks.
    fn request_permission(&self) -> NotificationPermission;

    /// Shows a notification.
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied`/`PermissionNotRequested` unless permission
    /// has been granted, or `SendFailed` if delivery could not be started.
    fn notify(&self, content: &NotificationContent) -> Result<(), NotificationError>;
}

/// Checks that `permission` allows showing a notification.
fn ensure_granted(permission: NotificationPermission) -> Result<(), NotificationError> {
    match permission {
        NotificationPermission::Granted => Ok(()),
        NotificationPermission::Denied => Err(NotificationError::PermissionDenied),
        NotificationPermission::Default => Err(NotificationError::PermissionNotRequested),
    }
}

/// Notifier backed by the platform notification service.
#[derive(Debug)]
pub struct DesktopNotifier {
    /// Whether the user allows notifications at all
    enabled: bool,
    permission: AtomicU8,
}

impl DesktopNotifier {
    /// Creates a notifier with an undecided permission.
    ///
    /// When `enabled` is false the permission request resolves to `Denied`.
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            permission: AtomicU8::new(NotificationPermission::Default.to_u8()),
        }
    }
}

impl Notifier for DesktopNotifier {
    fn permission(&self) -> NotificationPermission {
        NotificationPermission::from_u8(self.permission.load(Ordering::SeqCst))
    }

    fn request_permission(&self) -> NotificationPermission {
        let decided = if self.enabled {
            NotificationPermission::Granted
        } else {
            NotificationPermission::Denied
        };

        match self.permission.compare_exchange(
            NotificationPermission::Default.to_u8(),
            decided.to_u8(),
            Ordering::SeqCst,
            Ordering::SeqCst,
        ) {
            Ok(_) => {
                debug!("Notification permission decided: {:?}", decided);
                decided
            }
            Err(current) => NotificationPermission::from_u8(current),
        }
    }

    fn notify(&self, content: &NotificationContent) -> Result<(), NotificationError> {
        ensure_granted(self.permission())?;

        let mut notification = Notification::new();
        notification
            .appname(APP_NAME)
            .summary(&content.title)
            .body(&content.body);

        let show = move || {
            if let Err(e) = notification.show() {
                warn!("Failed to show notification: {}", e);
            }
        };

        // Delivery can block on the notification service, keep it off the
        // timer's thread.
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn_blocking(show);
            }
            Err(_) => {
                std::thread::Builder::new()
                    .name("notify".to_string())
                    .spawn(show)
                    .map_err(|e| NotificationError::SendFailed(e.to_string()))?;
            }
        }

        Ok(())
    }
}

/// Mock notifier for testing.
#[derive(Debug, Default)]
pub struct MockNotifier {
    notifications: std::sync::Mutex<Vec<NotificationContent>>,
    permission: std::sync::Mutex<NotificationPermission>,
    grant_on_request: std::sync::atomic::AtomicBool,
    request_count: std::sync::atomic::AtomicUsize,
    should_fail: std::sync::atomic::AtomicBool,
}

impl MockNotifier {
    /// Creates a mock that grants permission when asked.
    #[must_use]
    pub fn new() -> Self {
        Self {
            notifications: std::sync::Mutex::new(Vec::new()),
            permission: std::sync::Mutex::new(NotificationPermission::Default),
            grant_on_request: std::sync::atomic::AtomicBool::new(true),
            request_count: std::sync::atomic::AtomicUsize::new(0),
            should_fail: std::sync::atomic::AtomicBool::new(false),
        }
    }

    /// Creates a mock that denies permission when asked.
    #[must_use]
    pub fn denying() -> Self {
        let mock = Self::new();
        mock.grant_on_request
            .store(false, std::sync::atomic::Ordering::SeqCst);
        mock
    }

    pub fn set_permission(&self, permission: NotificationPermission) {
        *self.permission.lock().unwrap() = permission;
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail
            .store(should_fail, std::sync::atomic::Ordering::SeqCst);
    }

    #[must_use]
    pub fn get_notifications(&self) -> Vec<NotificationContent> {
        self.notifications.lock().unwrap().clone()
    }

    #[must_use]
    pub fn notification_count(&self) -> usize {
        self.notifications.lock().unwrap().len()
    }

    /// Number of times a decision was actually made.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.request_count.load(std::sync::atomic::Ordering::SeqCst)
    }

    pub fn clear_recorded(&self) {
        self.notifications.lock().unwrap().clear();
    }
}

impl Notifier for MockNotifier {
    fn permission(&self) -> NotificationPermission {
        *self.permission.lock().unwrap()
    }

    fn request_permission(&self) -> NotificationPermission {
        let mut permission = self.permission.lock().unwrap();
        if *permission == NotificationPermission::Default {
            self.request_count
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            *permission = if self.grant_on_request.load(std::sync::atomic::Ordering::SeqCst) {
                NotificationPermission::Granted
            } else {
                NotificationPermission::Denied
            };
        }
        *permission
    }

    fn notify(&self, content: &NotificationContent) -> Result<(), NotificationError> {
        ensure_granted(self.permission())?;
        if self.should_fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(NotificationError::SendFailed("Mock failure".to_string()));
        }
        self.notifications.lock().unwrap().push(content.clone());
        Ok(())
    }
}
