//! One-second tick driver.
//!
//! A spawned task that calls [`TimerEngine::tick`] while the engine is
//! running. It follows the engine's [`TickSchedule`]: idle while stopped,
//! and restarting its interval after every transition so a resumed
//! countdown waits a full period before its first tick.

use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use super::timer::{TickSchedule, TimerEngine};

/// Cadence of the countdown.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Handle to the tick task. Dropping it cancels the task.
#[derive(Debug)]
pub struct TickerHandle {
    handle: JoinHandle<()>,
}

impl TickerHandle {
    /// Cancels the tick task.
    pub fn stop(&self) {
        self.handle.abort();
    }

    /// Returns true once the task has ended.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Spawns the tick driver for `engine`.
///
/// `schedule` must come from the same engine's
/// [`TimerEngine::subscribe_schedule`].
pub fn spawn_ticker(
    engine: Arc<Mutex<TimerEngine>>,
    schedule: watch::Receiver<TickSchedule>,
    period: Duration,
) -> TickerHandle {
    TickerHandle {
        handle: tokio::spawn(run(engine, schedule, period)),
    }
}

async fn run(
    engine: Arc<Mutex<TimerEngine>>,
    mut schedule: watch::Receiver<TickSchedule>,
    period: Duration,
) {
    loop {
        let current = *schedule.borrow_and_update();

        if !current.running {
            if schedule.changed().await.is_err() {
                debug!("Timer engine gone, stopping ticker");
                return;
            }
            continue;
        }

        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let mut engine = engine.lock().await;
                    if let Err(e) = engine.tick() {
                        warn!("Stopping ticker: {}", e);
                        return;
                    }
                }
                changed = schedule.changed() => {
                    if changed.is_err() {
                        debug!("Timer engine gone, stopping ticker");
                        return;
                    }
                    break;
                }
            }
        }
    }
}
