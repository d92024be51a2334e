//! CLI module for the rain Pomodoro timer.
//!
//! This module provides the command-line interface:
//! - `commands`: Command definitions using clap derive
//! - `client`: IPC client for daemon communication
//! - `display`: Output formatting and display logic
//! - `watch`: Live terminal dashboard

pub mod client;
pub mod commands;
pub mod display;
pub mod watch;

pub use client::IpcClient;
pub use commands::{Cli, Commands, DaemonArgs, WatchArgs};
pub use display::Display;
pub use watch::run_watch;
