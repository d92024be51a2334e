//! IPC Client for communicating with the rain Pomodoro daemon.
//!
//! This module provides:
//! - Unix Domain Socket client
//! - Request/response handling
//! - Connection retry logic
//! - Timeout handling

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::time::timeout;

use crate::config::resolve_socket_path;
use crate::types::{IpcRequest, IpcResponse, SessionMode, Theme};

// ============================================================================
// Constants
// ============================================================================

/// Connection timeout in seconds
const CONNECTION_TIMEOUT_SECS: u64 = 5;

/// Read/write timeout in seconds
const IO_TIMEOUT_SECS: u64 = 5;

/// Maximum response size in bytes (64KB)
const MAX_RESPONSE_SIZE: u64 = 65536;

/// Maximum retry attempts
const MAX_RETRIES: u32 = 3;

/// Retry delay in milliseconds (base delay, multiplied by attempt number)
const RETRY_DELAY_MS: u64 = 500;

// ============================================================================
// IpcClient
// ============================================================================

/// IPC client for daemon communication.
#[derive(Debug, Clone)]
pub struct IpcClient {
    /// Socket path
    socket_path: PathBuf,
    /// Connection timeout
    timeout: Duration,
}

impl IpcClient {
    /// Creates a new IPC client on `socket_path`, or on the default socket
    /// when None.
    ///
    /// # Errors
    ///
    /// Returns an error if no socket path can be determined.
    pub fn new(socket_path: Option<PathBuf>) -> Result<Self> {
        let socket_path = resolve_socket_path(socket_path)
            .map_err(|e| anyhow::anyhow!("{}. {}", e, e.suggestion()))?;
        Ok(Self::with_socket_path(socket_path))
    }

    /// Creates a new IPC client with a custom socket path.
    pub fn with_socket_path(socket_path: PathBuf) -> Self {
        Self {
            socket_path,
            timeout: Duration::from_secs(CONNECTION_TIMEOUT_SECS),
        }
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &PathBuf {
        &self.socket_path
    }

    /// Sends a start command to the daemon.
    pub async fn start(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Start).await
    }

    /// Sends a pause command to the daemon.
    pub async fn pause(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Pause).await
    }

    /// Sends a resume command to the daemon.
    pub async fn resume(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Resume).await
    }

    /// Sends a toggle command (the primary control) to the daemon.
    pub async fn toggle(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Toggle).await
    }

    /// Sends a reset command to the daemon.
    pub async fn reset(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Reset).await
    }

    /// Asks the daemon to switch to `target`.
    pub async fn switch_mode(&self, target: SessionMode) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Mode { target })
            .await
    }

    /// Asks the daemon to select the next sound preset.
    pub async fn cycle_sound(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Sound).await
    }

    /// Asks the daemon to use `theme`.
    pub async fn set_theme(&self, theme: Theme) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Theme { theme: Some(theme) })
            .await
    }

    /// Asks the daemon to flip its theme.
    pub async fn toggle_theme(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Theme { theme: None })
            .await
    }

    /// Sends a status query to the daemon.
    pub async fn status(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Status).await
    }

    /// Asks the daemon to exit.
    pub async fn shutdown(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Shutdown).await
    }

    /// Sends `request` once, without retrying.
    ///
    /// # Errors
    ///
    /// Returns an error if the daemon cannot be reached or answers with an
    /// error response.
    pub async fn request(&self, request: &IpcRequest) -> Result<IpcResponse> {
        let response = self.send_request(request).await?;
        Self::check_response(response)
    }

    /// Sends a request to the daemon with retry logic.
    ///
    /// Only transport failures are retried; an error response from the
    /// daemon is final.
    async fn send_request_with_retry(&self, request: &IpcRequest) -> Result<IpcResponse> {
        let mut attempt = 1;

        let response = loop {
            match self.send_request(request).await {
                Ok(response) => break response,
                Err(e) if attempt < MAX_RETRIES => {
                    tracing::warn!("Request failed (attempt {}/{}): {}", attempt, MAX_RETRIES, e);
                    let delay = Duration::from_millis(RETRY_DELAY_MS * u64::from(attempt));
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        };

        Self::check_response(response)
    }

    /// Turns an error response into an error.
    fn check_response(response: IpcResponse) -> Result<IpcResponse> {
        if !response.is_success() {
            anyhow::bail!("{}", response.message);
        }
        Ok(response)
    }

    /// Sends a single request to the daemon.
    async fn send_request(&self, request: &IpcRequest) -> Result<IpcResponse> {
        // Connect with timeout
        let mut stream = timeout(self.timeout, UnixStream::connect(&self.socket_path))
            .await
            .context("Connection timed out")?
            .context("Cannot connect to the daemon. Start it with 'rain-pomodoro daemon'")?;

        // Serialize request
        let request_json = serde_json::to_string(request).context("Failed to serialize request")?;

        // Send request with timeout
        timeout(
            Duration::from_secs(IO_TIMEOUT_SECS),
            stream.write_all(request_json.as_bytes()),
        )
        .await
        .context("Write timed out")?
        .context("Failed to send request")?;

        timeout(Duration::from_secs(IO_TIMEOUT_SECS), stream.flush())
            .await
            .context("Flush timed out")?
            .context("Failed to flush request")?;

        // Shutdown write side to signal end of request
        stream
            .shutdown()
            .await
            .context("Failed to shut down the write side")?;

        // The daemon closes the connection after answering
        let mut buffer = Vec::new();
        timeout(
            Duration::from_secs(IO_TIMEOUT_SECS),
            (&mut stream)
                .take(MAX_RESPONSE_SIZE)
                .read_to_end(&mut buffer),
        )
        .await
        .context("Read timed out")?
        .context("Failed to receive response")?;

        if buffer.is_empty() {
            anyhow::bail!("No response from the daemon");
        }

        let response: IpcResponse =
            serde_json::from_slice(&buffer).context("Failed to parse response")?;

        Ok(response)
    }
}

// ============================================================================
// Tests
// ============================================================================
