//! IPC Server for the rain Pomodoro timer.
//!
//! This module provides Unix Domain Socket IPC functionality:
//! - Server that listens on a Unix socket
//! - Request/response handling for timer and presentation commands
//! - Integration with TimerEngine for command execution

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Mutex;
use tokio::time::{timeout, Duration};

use crate::types::{IpcRequest, IpcResponse, SessionMode, Theme};
use crate::view::{mode_label, PresentationState};

use super::timer::TimerEngine;

// ============================================================================
// Constants
// ============================================================================

/// Maximum request size in bytes (4KB)
const MAX_REQUEST_SIZE: usize = 4096;

/// Read timeout in seconds
const READ_TIMEOUT_SECS: u64 = 5;

// ============================================================================
// IpcError
// ============================================================================

/// IPC-specific error types.
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    /// Read error
    #[error("Failed to read request: {0}")]
    ReadError(String),

    /// Timeout error
    #[error("Operation timed out")]
    Timeout,

    /// Request too large
    #[error("Request too large (max {MAX_REQUEST_SIZE} bytes)")]
    RequestTooLarge,

    /// The client closed the connection without sending anything
    #[error("Connection closed by client")]
    ConnectionClosed,
}

impl IpcError {
    /// Returns true if the client gave up or vanished.
    #[must_use]
    pub fn is_disconnect(&self) -> bool {
        matches!(self, Self::ConnectionClosed | Self::Timeout)
    }
}

// ============================================================================
// IpcServer
// ============================================================================

/// Unix Domain Socket IPC server.
pub struct IpcServer {
    /// Unix socket listener
    listener: UnixListener,
    /// Socket path (for cleanup)
    socket_path: PathBuf,
}

impl IpcServer {
    /// Creates a new IPC server bound to the specified socket path.
    ///
    /// If the socket file already exists, it will be removed before binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket cannot be bound.
    pub fn new(socket_path: &Path) -> Result<Self> {
        // Remove existing socket file if present
        if socket_path.exists() {
            std::fs::remove_file(socket_path)
                .with_context(|| format!("Failed to remove existing socket: {:?}", socket_path))?;
        }

        // Ensure parent directory exists
        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create socket directory: {:?}", parent))?;
        }

        let listener = UnixListener::bind(socket_path)
            .with_context(|| format!("Failed to bind Unix socket: {:?}", socket_path))?;

        Ok(Self {
            listener,
            socket_path: socket_path.to_path_buf(),
        })
    }

    /// Accepts an incoming client connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be accepted.
    pub async fn accept(&self) -> Result<UnixStream> {
        let (stream, _addr) = self
            .listener
            .accept()
            .await
            .context("Failed to accept connection")?;
        Ok(stream)
    }

    /// Receives and deserializes an IPC request from the stream.
    ///
    /// Applies a read timeout to prevent blocking indefinitely.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or deserialization fails.
    pub async fn receive_request(stream: &mut UnixStream) -> Result<IpcRequest> {
        let mut buffer = vec![0u8; MAX_REQUEST_SIZE + 1];

        let read_result = timeout(
            Duration::from_secs(READ_TIMEOUT_SECS),
            stream.read(&mut buffer),
        )
        .await;

        let n = match read_result {
            Ok(Ok(n)) => n,
            Ok(Err(e)) => return Err(IpcError::ReadError(e.to_string()).into()),
            Err(_) => return Err(IpcError::Timeout.into()),
        };

        if n == 0 {
            return Err(IpcError::ConnectionClosed.into());
        }
        if n > MAX_REQUEST_SIZE {
            return Err(IpcError::RequestTooLarge.into());
        }

        let request: IpcRequest = serde_json::from_slice(&buffer[..n])
            .with_context(|| "Failed to deserialize IPC request")?;

        Ok(request)
    }

    /// Serializes and sends an IPC response to the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub async fn send_response(stream: &mut UnixStream, response: &IpcResponse) -> Result<()> {
        let json = serde_json::to_vec(response).context("Failed to serialize IPC response")?;

        stream
            .write_all(&json)
            .await
            .context("Failed to write response")?;
        stream.flush().await.context("Failed to flush response")?;

        Ok(())
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        // Clean up socket file on drop
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

// ============================================================================
// RequestHandler
// ============================================================================

/// Handles IPC requests by dispatching to the TimerEngine and the
/// presentation state.
#[derive(Clone)]
pub struct RequestHandler {
    /// Shared reference to the timer engine
    engine: Arc<Mutex<TimerEngine>>,
    /// Selected sound preset and theme
    presentation: Arc<Mutex<PresentationState>>,
}

impl RequestHandler {
    /// Creates a new request handler.
    pub fn new(
        engine: Arc<Mutex<TimerEngine>>,
        presentation: Arc<Mutex<PresentationState>>,
    ) -> Self {
        Self {
            engine,
            presentation,
        }
    }

    /// Handles an IPC request and returns the appropriate response.
    pub async fn handle(&self, request: IpcRequest) -> IpcResponse {
        match request {
            IpcRequest::Start | IpcRequest::Resume => self.handle_start().await,
            IpcRequest::Pause => self.handle_pause().await,
            IpcRequest::Toggle => self.handle_toggle().await,
            IpcRequest::Reset => self.handle_reset().await,
            IpcRequest::Mode { target } => self.handle_mode(target).await,
            IpcRequest::Sound => self.handle_sound().await,
            IpcRequest::Theme { theme } => self.handle_theme(theme).await,
            IpcRequest::Status => self.respond("").await,
            IpcRequest::Shutdown => self.respond("Daemon shutting down").await,
        }
    }

    /// Handles the start and resume commands.
    async fn handle_start(&self) -> IpcResponse {
        let result = {
            let mut engine = self.engine.lock().await;
            let resuming = engine.get_state().has_started;
            engine.start().map(|changed| (changed, resuming))
        };

        match result {
            Ok((true, false)) => self.respond("Timer started").await,
            Ok((true, true)) => self.respond("Timer resumed").await,
            Ok((false, _)) => self.respond("Timer is already running").await,
            Err(e) => IpcResponse::error(e.to_string()),
        }
    }

    /// Handles the pause command.
    async fn handle_pause(&self) -> IpcResponse {
        let result = self.engine.lock().await.pause();

        match result {
            Ok(true) => self.respond("Timer paused").await,
            Ok(false) => self.respond("Timer is not running").await,
            Err(e) => IpcResponse::error(e.to_string()),
        }
    }

    /// Handles the toggle command (the primary control).
    ///
    /// The state is read and changed under one lock, so a tick cannot land
    /// between the decision and the transition.
    async fn handle_toggle(&self) -> IpcResponse {
        let result = {
            let mut engine = self.engine.lock().await;
            let state = engine.get_state();
            let (was_running, resuming) = (state.is_running, state.has_started);
            engine.toggle().map(|_| (was_running, resuming))
        };

        match result {
            Ok((true, _)) => self.respond("Timer paused").await,
            Ok((false, false)) => self.respond("Timer started").await,
            Ok((false, true)) => self.respond("Timer resumed").await,
            Err(e) => IpcResponse::error(e.to_string()),
        }
    }

    /// Handles the reset command.
    async fn handle_reset(&self) -> IpcResponse {
        let result = self.engine.lock().await.reset();

        match result {
            Ok(()) => self.respond("Timer reset").await,
            Err(e) => IpcResponse::error(e.to_string()),
        }
    }

    /// Handles the mode command.
    async fn handle_mode(&self, target: SessionMode) -> IpcResponse {
        let result = self.engine.lock().await.switch_mode(target);

        match result {
            Ok(()) => {
                self.respond(&format!("Switched to {}", mode_label(target)))
                    .await
            }
            Err(e) => IpcResponse::error(e.to_string()),
        }
    }

    /// Handles the sound command.
    async fn handle_sound(&self) -> IpcResponse {
        let preset = self.presentation.lock().await.cycle_sound();
        self.respond(&format!("Sound: {}", preset.label)).await
    }

    /// Handles the theme command. Without a theme the current one flips.
    async fn handle_theme(&self, theme: Option<Theme>) -> IpcResponse {
        let theme = {
            let mut presentation = self.presentation.lock().await;
            let theme = theme.unwrap_or_else(|| presentation.theme().toggled());
            presentation.set_theme(theme);
            theme
        };
        self.respond(&format!("Theme: {}", theme.as_str())).await
    }

    /// Builds a success response carrying the current snapshot.
    async fn respond(&self, message: &str) -> IpcResponse {
        let timer = self.engine.lock().await.get_state().clone();
        let data = self.presentation.lock().await.snapshot(timer);
        IpcResponse::success(message, Some(data))
    }
}

// ============================================================================
// Tests
// ============================================================================
