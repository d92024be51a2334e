//! Timer engine for the rain Pomodoro timer.
//!
//! This module provides the core timer functionality:
//! - User intents (start, pause, toggle, reset, switch mode)
//! - One-second ticks and session completion
//! - Event firing for the completion chime and notifications
//! - State and tick-schedule publication for observers

use anyhow::{Context, Result};
use tokio::sync::{mpsc, watch};
use tracing::debug;

use crate::types::{SessionMode, TimerState};

// ============================================================================
// TimerEvent
// ============================================================================

/// Timer events for side effects and external integrations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    /// Countdown started or resumed
    Started {
        /// Mode of the countdown
        mode: SessionMode,
        /// True when continuing a paused countdown
        resumed: bool,
    },
    /// Countdown paused
    Paused {
        /// Remaining seconds at the pause
        remaining_seconds: u32,
    },
    /// Countdown rewound to the full duration
    Reset {
        /// Mode of the countdown
        mode: SessionMode,
    },
    /// Mode switched by the user
    ModeSwitched {
        /// New mode
        mode: SessionMode,
    },
    /// One second elapsed
    Tick {
        /// Remaining seconds
        remaining_seconds: u32,
    },
    /// A countdown reached zero
    SessionCompleted {
        /// Mode that finished
        completed: SessionMode,
        /// Mode loaded next (not started)
        next: SessionMode,
        /// Work sessions completed so far
        completed_work_sessions: u32,
    },
}

// ============================================================================
// TickSchedule
// ============================================================================

/// Tells the tick driver whether to run and when to restart its cadence.
///
/// `epoch` changes on every transition that must restart the one-second
/// interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickSchedule {
    /// Ticks are due
    pub running: bool,
    /// Transition counter
    pub epoch: u64,
}

// ============================================================================
// TimerEngine
// ============================================================================

/// Timer engine that owns the session state and emits events.
///
/// Transitions that do not apply (starting while running, pausing while
/// idle) are accepted as no-ops and return `Ok(false)`.
pub struct TimerEngine {
    /// Current timer state
    state: TimerState,
    /// Event sender channel
    event_tx: mpsc::UnboundedSender<TimerEvent>,
    /// Latest state for observers
    state_tx: watch::Sender<TimerState>,
    /// Tick driver control
    schedule_tx: watch::Sender<TickSchedule>,
}

impl TimerEngine {
    /// Creates an engine in the initial state.
    pub fn new(event_tx: mpsc::UnboundedSender<TimerEvent>) -> Self {
        Self::with_state(TimerState::new(), event_tx)
    }

    /// Creates an engine starting from `state`.
    pub fn with_state(state: TimerState, event_tx: mpsc::UnboundedSender<TimerEvent>) -> Self {
        let schedule = TickSchedule {
            running: state.is_running,
            epoch: 0,
        };
        let (state_tx, _) = watch::channel(state.clone());
        let (schedule_tx, _) = watch::channel(schedule);

        Self {
            state,
            event_tx,
            state_tx,
            schedule_tx,
        }
    }

    /// Starts or resumes the countdown.
    ///
    /// Returns `Ok(false)` if already running.
    ///
    /// # Errors
    ///
    /// Returns an error if the event channel is closed.
    pub fn start(&mut self) -> Result<bool> {
        let resumed = self.state.has_started;
        if !self.state.start() {
            debug!("Start ignored: already running");
            return Ok(false);
        }

        debug!("Countdown started ({}, resumed: {})", self.state.mode, resumed);
        self.event_tx
            .send(TimerEvent::Started {
                mode: self.state.mode,
                resumed,
            })
            .context("Failed to send started event")?;

        self.publish(true);
        Ok(true)
    }

    /// Pauses the countdown.
    ///
    /// Returns `Ok(false)` if not running.
    ///
    /// # Errors
    ///
    /// Returns an error if the event channel is closed.
    pub fn pause(&mut self) -> Result<bool> {
        if !self.state.pause() {
            debug!("Pause ignored: not running");
            return Ok(false);
        }

        self.event_tx
            .send(TimerEvent::Paused {
                remaining_seconds: self.state.remaining_seconds,
            })
            .context("Failed to send paused event")?;

        self.publish(true);
        Ok(true)
    }

    /// Pauses when running, starts or resumes otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the event channel is closed.
    pub fn toggle(&mut self) -> Result<bool> {
        if self.state.is_running {
            self.pause()
        } else {
            self.start()
        }
    }

    /// Stops and rewinds the current mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the event channel is closed.
    pub fn reset(&mut self) -> Result<()> {
        self.state.reset();

        self.event_tx
            .send(TimerEvent::Reset {
                mode: self.state.mode,
            })
            .context("Failed to send reset event")?;

        self.publish(true);
        Ok(())
    }

    /// Stops and loads a full countdown of `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if the event channel is closed.
    pub fn switch_mode(&mut self, target: SessionMode) -> Result<()> {
        self.state.switch_mode(target);

        self.event_tx
            .send(TimerEvent::ModeSwitched { mode: target })
            .context("Failed to send mode switched event")?;

        self.publish(true);
        Ok(())
    }

    /// Advances the countdown by one second, completing it at zero.
    ///
    /// Returns `Ok(false)` when not running.
    ///
    /// # Errors
    ///
    /// Returns an error if the event channel is closed.
    pub fn tick(&mut self) -> Result<bool> {
        if !self.state.is_running {
            return Ok(false);
        }

        let completion_due = self.state.tick();

        self.event_tx
            .send(TimerEvent::Tick {
                remaining_seconds: self.state.remaining_seconds,
            })
            .context("Failed to send tick event")?;

        if completion_due {
            self.handle_completion()?;
        } else {
            self.publish(false);
        }

        Ok(true)
    }

    /// Handles a countdown reaching zero.
    fn handle_completion(&mut self) -> Result<()> {
        let completed = self.state.mode;
        let next = self.state.complete();

        debug!(
            "{} session completed, next: {} (work sessions: {})",
            completed, next, self.state.completed_work_sessions
        );

        self.event_tx
            .send(TimerEvent::SessionCompleted {
                completed,
                next,
                completed_work_sessions: self.state.completed_work_sessions,
            })
            .context("Failed to send session completed event")?;

        self.publish(true);
        Ok(())
    }

    /// Publishes the state, restarting the tick cadence when `reschedule`.
    fn publish(&mut self, reschedule: bool) {
        self.state_tx.send_replace(self.state.clone());

        if reschedule {
            let running = self.state.is_running;
            self.schedule_tx.send_modify(|schedule| {
                schedule.running = running;
                schedule.epoch = schedule.epoch.wrapping_add(1);
            });
        }
    }

    /// Returns a reference to the current timer state.
    pub fn get_state(&self) -> &TimerState {
        &self.state
    }

    /// Returns a receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<TimerState> {
        self.state_tx.subscribe()
    }

    /// Returns a receiver for the tick driver.
    pub fn subscribe_schedule(&self) -> watch::Receiver<TickSchedule> {
        self.schedule_tx.subscribe()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn create_engine() -> (TimerEngine, mpsc::UnboundedReceiver<TimerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (TimerEngine::new(tx), rx)
    }

    fn create_engine_with_state(
        state: TimerState,
    ) -> (TimerEngine, mpsc::UnboundedReceiver<TimerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (TimerEngine::with_state(state, tx), rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<TimerEvent>) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn run_to_completion(engine: &mut TimerEngine) {
        engine.start().unwrap();
        while engine.get_state().is_running {
            engine.tick().unwrap();
        }
    }

    // ------------------------------------------------------------------------
    // Intent Tests
    // ------------------------------------------------------------------------

    mod intent_tests {
        use super::*;

        #[test]
        fn test_new_engine() {
            let (engine, _rx) = create_engine();
            let state = engine.get_state();

            assert_eq!(state.mode, SessionMode::Work);
            assert_eq!(state.remaining_seconds, 1500);
            assert!(!state.is_running);
            assert!(!state.has_started);
        }

        #[test]
        fn test_start() {
            let (mut engine, mut rx) = create_engine();

            assert!(engine.start().unwrap());

            let state = engine.get_state();
            assert!(state.is_running);
            assert!(state.has_started);
            assert_eq!(
                drain(&mut rx),
                vec![TimerEvent::Started {
                    mode: SessionMode::Work,
                    resumed: false
                }]
            );
        }

        #[test]
        fn test_start_while_running_is_noop() {
            let (mut engine, mut rx) = create_engine();
            engine.start().unwrap();
            drain(&mut rx);
            let before = engine.get_state().clone();

            assert!(!engine.start().unwrap());

            assert_eq!(engine.get_state(), &before);
            assert!(drain(&mut rx).is_empty());
        }

        #[test]
        fn test_pause_and_resume() {
            let (mut engine, mut rx) = create_engine();
            engine.start().unwrap();
            engine.tick().unwrap();

            assert!(engine.pause().unwrap());
            assert!(!engine.get_state().is_running);
            assert!(engine.get_state().has_started);
            assert_eq!(engine.get_state().remaining_seconds, 1499);

            assert!(engine.start().unwrap());
            let events = drain(&mut rx);
            assert_eq!(
                events.last(),
                Some(&TimerEvent::Started {
                    mode: SessionMode::Work,
                    resumed: true
                })
            );
        }

        #[test]
        fn test_pause_while_idle_is_noop() {
            let (mut engine, mut rx) = create_engine();
            let before = engine.get_state().clone();

            assert!(!engine.pause().unwrap());
            assert!(!engine.pause().unwrap());

            assert_eq!(engine.get_state(), &before);
            assert!(drain(&mut rx).is_empty());
        }

        #[test]
        fn test_toggle() {
            let (mut engine, _rx) = create_engine();

            engine.toggle().unwrap();
            assert!(engine.get_state().is_running);

            engine.toggle().unwrap();
            assert!(!engine.get_state().is_running);
            assert!(engine.get_state().has_started);
        }

        #[test]
        fn test_reset_keeps_mode_and_sessions() {
            let mut state = TimerState::new();
            state.switch_mode(SessionMode::ShortBreak);
            state.completed_work_sessions = 2;
            state.start();
            state.remaining_seconds = 42;
            let (mut engine, _rx) = create_engine_with_state(state);

            engine.reset().unwrap();

            let state = engine.get_state();
            assert_eq!(state.mode, SessionMode::ShortBreak);
            assert_eq!(state.remaining_seconds, 300);
            assert_eq!(state.completed_work_sessions, 2);
            assert!(!state.is_running);
            assert!(!state.has_started);
        }

        #[test]
        fn test_switch_mode_nominal_durations() {
            let (mut engine, _rx) = create_engine();
            engine.start().unwrap();

            for mode in SessionMode::ALL {
                engine.switch_mode(mode).unwrap();
                let state = engine.get_state();
                assert_eq!(state.mode, mode);
                assert_eq!(state.remaining_seconds, mode.duration_seconds());
                assert!(!state.is_running);
                assert!(!state.has_started);
            }
        }

        #[test]
        fn test_closed_event_channel_is_error() {
            let (mut engine, rx) = create_engine();
            drop(rx);
            assert!(engine.start().is_err());
        }
    }

    // ------------------------------------------------------------------------
    // Tick Tests
    // ------------------------------------------------------------------------

    mod tick_tests {
        use super::*;

        #[test]
        fn test_tick_while_idle_is_noop() {
            let (mut engine, mut rx) = create_engine();
            assert!(!engine.tick().unwrap());
            assert_eq!(engine.get_state().remaining_seconds, 1500);
            assert!(drain(&mut rx).is_empty());
        }

        #[test]
        fn test_monotonic_countdown() {
            let (mut engine, _rx) = create_engine();
            engine.start().unwrap();

            for expected in (1490..1500).rev() {
                engine.tick().unwrap();
                assert_eq!(engine.get_state().remaining_seconds, expected);
            }
        }

        #[test]
        fn test_last_tick_completes_work() {
            let mut state = TimerState::new();
            state.start();
            state.remaining_seconds = 1;
            let (mut engine, mut rx) = create_engine_with_state(state);

            engine.tick().unwrap();

            let state = engine.get_state();
            assert_eq!(state.completed_work_sessions, 1);
            assert_eq!(state.mode, SessionMode::ShortBreak);
            assert_eq!(state.remaining_seconds, 300);
            assert!(!state.is_running);
            assert!(!state.has_started);

            assert_eq!(
                drain(&mut rx),
                vec![
                    TimerEvent::Tick {
                        remaining_seconds: 0
                    },
                    TimerEvent::SessionCompleted {
                        completed: SessionMode::Work,
                        next: SessionMode::ShortBreak,
                        completed_work_sessions: 1,
                    },
                ]
            );
        }

        #[test]
        fn test_completion_fires_once() {
            let mut state = TimerState::new();
            state.start();
            state.remaining_seconds = 1;
            let (mut engine, mut rx) = create_engine_with_state(state);

            engine.tick().unwrap();
            engine.tick().unwrap();
            engine.tick().unwrap();

            let completions = drain(&mut rx)
                .into_iter()
                .filter(|e| matches!(e, TimerEvent::SessionCompleted { .. }))
                .count();
            assert_eq!(completions, 1);
        }

        #[test]
        fn test_break_completion_returns_to_work() {
            let mut state = TimerState::new();
            state.switch_mode(SessionMode::LongBreak);
            state.completed_work_sessions = 4;
            let (mut engine, _rx) = create_engine_with_state(state);

            run_to_completion(&mut engine);

            let state = engine.get_state();
            assert_eq!(state.mode, SessionMode::Work);
            assert_eq!(state.remaining_seconds, 1500);
            assert_eq!(state.completed_work_sessions, 4);
        }

        #[test]
        fn test_four_cycle_routing() {
            let (mut engine, _rx) = create_engine();
            let mut breaks = Vec::new();

            for _ in 0..4 {
                run_to_completion(&mut engine);
                breaks.push(engine.get_state().mode);
                run_to_completion(&mut engine);
                assert_eq!(engine.get_state().mode, SessionMode::Work);
            }

            assert_eq!(
                breaks,
                vec![
                    SessionMode::ShortBreak,
                    SessionMode::ShortBreak,
                    SessionMode::ShortBreak,
                    SessionMode::LongBreak,
                ]
            );
            assert_eq!(engine.get_state().completed_work_sessions, 4);
        }
    }

    // ------------------------------------------------------------------------
    // Observation Tests
    // ------------------------------------------------------------------------

    mod observation_tests {
        use super::*;

        #[test]
        fn test_subscribe_sees_transitions() {
            let (mut engine, _rx) = create_engine();
            let mut state_rx = engine.subscribe();

            engine.start().unwrap();
            assert!(state_rx.has_changed().unwrap());
            assert!(state_rx.borrow_and_update().is_running);

            engine.tick().unwrap();
            assert_eq!(state_rx.borrow_and_update().remaining_seconds, 1499);
        }

        #[test]
        fn test_schedule_tracks_running_flag() {
            let (mut engine, _rx) = create_engine();
            let schedule_rx = engine.subscribe_schedule();
            assert!(!schedule_rx.borrow().running);

            engine.start().unwrap();
            let started = *schedule_rx.borrow();
            assert!(started.running);

            engine.tick().unwrap();
            assert_eq!(*schedule_rx.borrow(), started);

            engine.pause().unwrap();
            let paused = *schedule_rx.borrow();
            assert!(!paused.running);
            assert_ne!(paused.epoch, started.epoch);
        }

        #[test]
        fn test_noop_does_not_reschedule() {
            let (mut engine, _rx) = create_engine();
            let schedule_rx = engine.subscribe_schedule();
            let before = *schedule_rx.borrow();

            engine.pause().unwrap();

            assert_eq!(*schedule_rx.borrow(), before);
        }
    }
}
