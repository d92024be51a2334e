//! Side effects of timer events.
//!
//! The completion chime and the desktop notification are best-effort: their
//! failures are logged and never reach the timer.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::notification::{completion_content, NotificationPermission, Notifier};
use crate::sound::{SoundPlayer, SoundSource};

use super::timer::TimerEvent;

/// Runs the side effects of [`TimerEvent`]s.
pub struct EffectDispatcher {
    sound: Arc<dyn SoundPlayer>,
    notifier: Arc<dyn Notifier>,
    alert: SoundSource,
}

impl EffectDispatcher {
    /// Creates a dispatcher playing `alert` on completion.
    pub fn new(sound: Arc<dyn SoundPlayer>, notifier: Arc<dyn Notifier>, alert: SoundSource) -> Self {
        Self {
            sound,
            notifier,
            alert,
        }
    }

    /// Runs the side effects of `event`.
    pub fn handle(&self, event: &TimerEvent) {
        match event {
            TimerEvent::Started { .. } => {
                if self.notifier.permission() == NotificationPermission::Default {
                    let permission = self.notifier.request_permission();
                    debug!("Notification permission: {:?}", permission);
                }
            }
            TimerEvent::SessionCompleted { completed, .. } => {
                if let Err(e) = self.sound.play(&self.alert) {
                    warn!("Completion alert failed: {}", e);
                }

                if self.notifier.permission() != NotificationPermission::Granted {
                    debug!("Notification skipped: permission not granted");
                    return;
                }
                if let Err(e) = self.notifier.notify(&completion_content(*completed)) {
                    warn!("Notification failed: {}", e);
                }
            }
            _ => {}
        }
    }
}

impl std::fmt::Debug for EffectDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectDispatcher")
            .field("alert", &self.alert.name())
            .finish_non_exhaustive()
    }
}
