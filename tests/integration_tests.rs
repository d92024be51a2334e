//! Integration tests for Daemon-CLI IPC communication.
//!
//! These tests verify end-to-end communication between the CLI client
//! and the daemon's IPC server and request handler:
//! - Timer control (start, pause, resume, toggle, reset, mode)
//! - Presentation control (sound preset, theme)
//! - Status queries
//! - Connection error handling

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::time::{timeout, Duration};

use rain_pomodoro::cli::client::IpcClient;
use rain_pomodoro::daemon::ipc::{IpcServer, RequestHandler};
use rain_pomodoro::daemon::timer::{TimerEngine, TimerEvent};
use rain_pomodoro::types::{IpcRequest, SessionMode, Theme};
use rain_pomodoro::view::PresentationState;

// ============================================================================
// Test Helpers
// ============================================================================

/// Creates a temporary socket path for testing.
fn create_temp_socket_path() -> PathBuf {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("integration_test.sock");
    // Keep the directory so it's not deleted
    std::mem::forget(dir);
    path
}

/// Creates a request handler over a fresh engine.
fn create_handler() -> (
    Arc<RequestHandler>,
    Arc<Mutex<TimerEngine>>,
    mpsc::UnboundedReceiver<TimerEvent>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    let engine = Arc::new(Mutex::new(TimerEngine::new(tx)));
    let presentation = Arc::new(Mutex::new(PresentationState::default()));
    let handler = Arc::new(RequestHandler::new(Arc::clone(&engine), presentation));
    (handler, engine, rx)
}

/// Serves `count` request-response cycles in the background.
fn spawn_server(
    socket_path: &PathBuf,
    handler: Arc<RequestHandler>,
    count: usize,
) -> tokio::task::JoinHandle<()> {
    let server = IpcServer::new(socket_path).unwrap();
    tokio::spawn(async move {
        for _ in 0..count {
            let mut stream = server.accept().await.unwrap();
            let request = IpcServer::receive_request(&mut stream).await.unwrap();
            let response = handler.handle(request).await;
            IpcServer::send_response(&mut stream, &response).await.unwrap();
        }
    })
}

// ============================================================================
// Timer control
// ============================================================================

#[tokio::test]
async fn test_timer_start_via_ipc() {
    let socket_path = create_temp_socket_path();
    let (handler, engine, mut rx) = create_handler();
    let server_handle = spawn_server(&socket_path, handler, 1);

    tokio::time::sleep(Duration::from_millis(50)).await;

    let client = IpcClient::with_socket_path(socket_path);
    let response = client.start().await;

    assert!(response.is_ok(), "Expected successful response, got: {:?}", response);
    let response = response.unwrap();
    assert_eq!(response.status, "success");
    assert_eq!(response.message, "Timer started");

    let data = response.data.expect("Response should contain data");
    assert!(data.timer.is_running);
    assert!(data.timer.has_started);
    assert_eq!(data.timer.remaining_seconds, 25 * 60);

    assert!(engine.lock().await.get_state().is_running);
    assert!(matches!(
        rx.try_recv(),
        Ok(TimerEvent::Started {
            mode: SessionMode::Work,
            resumed: false
        })
    ));

    let _ = server_handle.await;
}

#[tokio::test]
async fn test_timer_pause_and_resume_via_ipc() {
    let socket_path = create_temp_socket_path();
    let (handler, engine, _rx) = create_handler();

    // Pre-condition: a running countdown with some time elapsed
    {
        let mut eng = engine.lock().await;
        eng.start().unwrap();
        eng.tick().unwrap();
        eng.tick().unwrap();
    }

    let server_handle = spawn_server(&socket_path, handler, 2);
    tokio::time::sleep(Duration::from_millis(50)).await;

    let client = IpcClient::with_socket_path(socket_path);

    let response = client.pause().await.unwrap();
    assert_eq!(response.message, "Timer paused");
    let data = response.data.unwrap();
    assert!(!data.timer.is_running);
    assert_eq!(data.timer.remaining_seconds, 1498);

    let response = client.resume().await.unwrap();
    assert_eq!(response.message, "Timer resumed");
    let data = response.data.unwrap();
    assert!(data.timer.is_running);
    assert_eq!(data.timer.remaining_seconds, 1498);

    let _ = server_handle.await;
}

#[tokio::test]
async fn test_pause_when_not_running_is_noop() {
    let socket_path = create_temp_socket_path();
    let (handler, _engine, mut rx) = create_handler();
    let server_handle = spawn_server(&socket_path, handler, 1);

    tokio::time::sleep(Duration::from_millis(50)).await;

    let client = IpcClient::with_socket_path(socket_path);
    let response = client.pause().await.unwrap();

    assert!(response.is_success());
    assert_eq!(response.message, "Timer is not running");
    assert!(rx.try_recv().is_err(), "A no-op must not emit events");

    let _ = server_handle.await;
}

#[tokio::test]
async fn test_mode_switch_and_reset_via_ipc() {
    let socket_path = create_temp_socket_path();
    let (handler, engine, _rx) = create_handler();
    let server_handle = spawn_server(&socket_path, handler, 3);

    tokio::time::sleep(Duration::from_millis(50)).await;

    let client = IpcClient::with_socket_path(socket_path);

    let response = client.switch_mode(SessionMode::LongBreak).await.unwrap();
    assert_eq!(response.message, "Switched to LONG BREAK");
    assert_eq!(response.data.unwrap().timer.remaining_seconds, 900);

    client.start().await.unwrap();
    engine.lock().await.tick().unwrap();

    let response = client.reset().await.unwrap();
    let data = response.data.unwrap();
    assert_eq!(data.timer.mode, SessionMode::LongBreak);
    assert_eq!(data.timer.remaining_seconds, 900);
    assert!(!data.timer.is_running);
    assert!(!data.timer.has_started);

    let _ = server_handle.await;
}

#[tokio::test]
async fn test_toggle_via_ipc() {
    let socket_path = create_temp_socket_path();
    let (handler, _engine, _rx) = create_handler();
    let server_handle = spawn_server(&socket_path, handler, 3);

    tokio::time::sleep(Duration::from_millis(50)).await;

    let client = IpcClient::with_socket_path(socket_path);

    assert_eq!(client.toggle().await.unwrap().message, "Timer started");
    assert_eq!(client.toggle().await.unwrap().message, "Timer paused");
    assert_eq!(client.toggle().await.unwrap().message, "Timer resumed");

    let _ = server_handle.await;
}

// ============================================================================
// Presentation control
// ============================================================================

#[tokio::test]
async fn test_sound_cycle_via_ipc() {
    let socket_path = create_temp_socket_path();
    let (handler, _engine, _rx) = create_handler();
    let server_handle = spawn_server(&socket_path, handler, 4);

    tokio::time::sleep(Duration::from_millis(50)).await;

    let client = IpcClient::with_socket_path(socket_path);
    let mut messages = Vec::new();
    for _ in 0..4 {
        messages.push(client.cycle_sound().await.unwrap().message);
    }

    assert_eq!(
        messages,
        ["Sound: DRIZZLE", "Sound: POUR", "Sound: STORM", "Sound: OFF"]
    );

    let _ = server_handle.await;
}

#[tokio::test]
async fn test_theme_via_ipc() {
    let socket_path = create_temp_socket_path();
    let (handler, _engine, _rx) = create_handler();
    let server_handle = spawn_server(&socket_path, handler, 2);

    tokio::time::sleep(Duration::from_millis(50)).await;

    let client = IpcClient::with_socket_path(socket_path);
    client.set_theme(Theme::Dark).await.unwrap();
    let response = client.status().await.unwrap();

    assert_eq!(response.message, "");
    assert_eq!(response.data.unwrap().theme, Theme::Dark);

    let _ = server_handle.await;
}

#[tokio::test]
async fn test_theme_toggle_happens_in_daemon() {
    let socket_path = create_temp_socket_path();
    let (handler, _engine, _rx) = create_handler();
    let server_handle = spawn_server(&socket_path, handler, 2);

    tokio::time::sleep(Duration::from_millis(50)).await;

    // Two clients toggling in turn never cancel each other out
    let first = IpcClient::with_socket_path(socket_path.clone());
    let second = IpcClient::with_socket_path(socket_path);
    assert_eq!(first.toggle_theme().await.unwrap().message, "Theme: dark");
    let response = second.toggle_theme().await.unwrap();
    assert_eq!(response.message, "Theme: light");
    assert_eq!(response.data.unwrap().theme, Theme::Light);

    let _ = server_handle.await;
}

// ============================================================================
// Connection error handling
// ============================================================================

#[tokio::test]
async fn test_connection_error_when_daemon_missing() {
    let socket_path = create_temp_socket_path();
    let client = IpcClient::with_socket_path(socket_path);

    // Retries take 500ms + 1000ms
    let result = timeout(Duration::from_secs(10), client.status())
        .await
        .expect("Client should give up before the timeout");

    assert!(result.is_err());
    let error_msg = format!("{:#}", result.unwrap_err());
    assert!(
        error_msg.contains("Cannot connect to the daemon"),
        "Expected a connection error, got: {}",
        error_msg
    );
}

#[tokio::test]
async fn test_invalid_json_request_rejected() {
    use tokio::io::AsyncWriteExt;
    use tokio::net::UnixStream;

    let socket_path = create_temp_socket_path();
    let server = IpcServer::new(&socket_path).unwrap();

    let client_path = socket_path.clone();
    let client_handle = tokio::spawn(async move {
        let mut stream = UnixStream::connect(&client_path).await.unwrap();
        stream.write_all(br#"{"command":"start","#).await.unwrap();
        stream.shutdown().await.unwrap();
    });

    let mut stream = server.accept().await.unwrap();
    let result = IpcServer::receive_request(&mut stream).await;

    assert!(result.is_err());
    client_handle.await.unwrap();
}

// ============================================================================
// Workflows
// ============================================================================

#[tokio::test]
async fn test_full_workflow_integration() {
    let socket_path = create_temp_socket_path();
    let (handler, engine, _rx) = create_handler();
    let server_handle = spawn_server(&socket_path, handler, 4);

    tokio::time::sleep(Duration::from_millis(50)).await;

    let client = IpcClient::with_socket_path(socket_path);

    client.start().await.unwrap();

    // Run the work session to completion
    {
        let mut eng = engine.lock().await;
        for _ in 0..1500 {
            eng.tick().unwrap();
        }
    }

    let data = client.status().await.unwrap().data.unwrap();
    assert_eq!(data.timer.mode, SessionMode::ShortBreak);
    assert_eq!(data.timer.remaining_seconds, 300);
    assert_eq!(data.timer.completed_work_sessions, 1);
    assert!(!data.timer.is_running, "A new countdown never auto-starts");

    let response = client.start().await.unwrap();
    assert_eq!(response.message, "Timer started");

    let response = client
        .request(&IpcRequest::Mode {
            target: SessionMode::Work,
        })
        .await
        .unwrap();
    let data = response.data.unwrap();
    assert_eq!(data.timer.mode, SessionMode::Work);
    assert_eq!(data.timer.completed_work_sessions, 1);

    let _ = server_handle.await;
}

#[tokio::test]
async fn test_concurrent_clients_sequential() {
    let socket_path = create_temp_socket_path();
    let (handler, _engine, _rx) = create_handler();
    let server_handle = spawn_server(&socket_path, handler, 5);

    tokio::time::sleep(Duration::from_millis(50)).await;

    for _ in 0..5 {
        let client = IpcClient::with_socket_path(socket_path.clone());
        let response = client.status().await.unwrap();
        assert!(response.is_success());
    }

    let _ = server_handle.await;
}
