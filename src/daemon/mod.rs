//! Daemon module for the rain Pomodoro timer.
//!
//! This module contains the core daemon functionality:
//! - `timer`: Timer engine with state transitions and countdown logic
//! - `ticker`: One-second tick driver
//! - `effects`: Completion chime and desktop notification
//! - `ipc`: Unix socket server and request handler
//! - `runner`: The event loop tying them together

pub mod effects;
pub mod ipc;
pub mod runner;
pub mod ticker;
pub mod timer;

pub use effects::EffectDispatcher;
pub use ipc::{IpcError, IpcServer, RequestHandler};
pub use runner::{run_daemon, Daemon};
pub use ticker::{spawn_ticker, TickerHandle, TICK_PERIOD};
pub use timer::{TickSchedule, TimerEngine, TimerEvent};
