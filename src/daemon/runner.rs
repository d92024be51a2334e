//! The daemon event loop.
//!
//! One task serializes everything that mutates state: IPC requests, timer
//! events and the shutdown signal. The tick driver runs as a separate task
//! but goes through the same engine lock. After every loop iteration the
//! ambient player is re-evaluated against the latest timer and preset.

use std::future::Future;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use tokio::net::UnixStream;
use tokio::sync::{mpsc, Mutex};
use tokio::time::Duration;
use tracing::{debug, info, warn};

use crate::config::DaemonConfig;
use crate::notification::{DesktopNotifier, Notifier};
use crate::sound::{
    AmbientPlayer, AudioBackend, AudioOutput, RodioBackend, RodioSoundPlayer, SoundPlayer,
    SoundSource,
};
use crate::types::{IpcRequest, IpcResponse};
use crate::view::{should_play_ambient, PresentationState};

use super::effects::EffectDispatcher;
use super::ipc::{IpcError, IpcServer, RequestHandler};
use super::ticker::{spawn_ticker, TICK_PERIOD};
use super::timer::{TimerEngine, TimerEvent};

/// Runs the daemon in the foreground until a `shutdown` request or Ctrl-C.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the socket cannot be
/// bound.
pub async fn run_daemon(config: DaemonConfig) -> Result<()> {
    config
        .validate()
        .map_err(|e| anyhow!("{}. {}", e, e.suggestion()))?;

    // Kept alive for the whole run; every sink plays through it.
    let output = AudioOutput::try_open_default();

    let sound: Arc<dyn SoundPlayer> = Arc::new(RodioSoundPlayer::new(
        output.as_ref(),
        !config.alert_enabled,
    ));
    let notifier: Arc<dyn Notifier> = Arc::new(DesktopNotifier::new(config.notifications_enabled));
    let alert = SoundSource::completion_alert(config.alert_sound.as_ref());
    let effects = EffectDispatcher::new(sound, notifier, alert);

    let ambient = AmbientPlayer::new(RodioBackend::new(output.as_ref()), &config.sounds_dir);
    let presentation = PresentationState::new(&config.initial_preset, config.initial_theme);

    let server = IpcServer::new(&config.socket_path)?;
    info!(
        "Daemon listening on {:?} (sounds: {:?})",
        server.socket_path(),
        config.sounds_dir
    );

    Daemon::new(presentation, effects, ambient)
        .run(server, interrupted())
        .await
}

/// Resolves on Ctrl-C. Never resolves if the signal cannot be watched.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Interrupted");
}

/// The daemon's state and collaborators.
pub struct Daemon<B: AudioBackend> {
    engine: Arc<Mutex<TimerEngine>>,
    presentation: Arc<Mutex<PresentationState>>,
    handler: RequestHandler,
    events: mpsc::UnboundedReceiver<TimerEvent>,
    effects: EffectDispatcher,
    ambient: AmbientPlayer<B>,
    tick_period: Duration,
}

impl<B: AudioBackend> Daemon<B> {
    /// Creates a daemon with a fresh timer.
    pub fn new(
        presentation: PresentationState,
        effects: EffectDispatcher,
        ambient: AmbientPlayer<B>,
    ) -> Self {
        let (event_tx, events) = mpsc::unbounded_channel();
        let engine = Arc::new(Mutex::new(TimerEngine::new(event_tx)));
        let presentation = Arc::new(Mutex::new(presentation));
        let handler = RequestHandler::new(Arc::clone(&engine), Arc::clone(&presentation));

        Self {
            engine,
            presentation,
            handler,
            events,
            effects,
            ambient,
            tick_period: TICK_PERIOD,
        }
    }

    /// Overrides the countdown cadence.
    #[must_use]
    pub fn with_tick_period(mut self, period: Duration) -> Self {
        self.tick_period = period;
        self
    }

    /// Serves `server` until a `shutdown` request arrives or `shutdown`
    /// resolves. Ambient audio is silenced and the tick driver stopped on
    /// the way out.
    ///
    /// # Errors
    ///
    /// Currently always returns `Ok`; connection failures are logged.
    pub async fn run(mut self, server: IpcServer, shutdown: impl Future<Output = ()>) -> Result<()> {
        let schedule = self.engine.lock().await.subscribe_schedule();
        let ticker = spawn_ticker(Arc::clone(&self.engine), schedule, self.tick_period);
        tokio::pin!(shutdown);

        loop {
            // Effects of earlier transitions run before the next request is
            // read.
            tokio::select! {
                biased;

                _ = &mut shutdown => break,
                Some(event) = self.events.recv() => {
                    self.effects.handle(&event);
                }
                accepted = server.accept() => {
                    match accepted {
                        Ok(mut stream) => {
                            if self.serve(&mut stream).await {
                                info!("Shutdown requested");
                                break;
                            }
                        }
                        Err(e) => warn!("{:#}", e),
                    }
                }
            }

            self.sync_ambient().await;
        }

        ticker.stop();
        self.ambient.stop();
        info!("Daemon stopped");
        Ok(())
    }

    /// Answers one connection. Returns true if the daemon should stop.
    async fn serve(&self, stream: &mut UnixStream) -> bool {
        let request = match IpcServer::receive_request(stream).await {
            Ok(request) => request,
            Err(e) => {
                if e.downcast_ref::<IpcError>().is_some_and(IpcError::is_disconnect) {
                    debug!("Client went away: {}", e);
                    return false;
                }
                warn!("Rejected request: {:#}", e);
                let response = IpcResponse::error(format!("Invalid request: {}", e));
                if let Err(e) = IpcServer::send_response(stream, &response).await {
                    debug!("Failed to send error response: {:#}", e);
                }
                return false;
            }
        };

        debug!("Request: {:?}", request);
        let shutdown = request == IpcRequest::Shutdown;
        let response = self.handler.handle(request).await;

        if let Err(e) = IpcServer::send_response(stream, &response).await {
            warn!("Failed to send response: {:#}", e);
        }

        shutdown
    }

    /// Brings the ambient player in line with the timer and the preset.
    async fn sync_ambient(&mut self) {
        let should_play = should_play_ambient(self.engine.lock().await.get_state());
        let preset = self.presentation.lock().await.preset();
        self.ambient.sync(should_play, preset);
    }
}

impl<B: AudioBackend> std::fmt::Debug for Daemon<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Daemon")
            .field("tick_period", &self.tick_period)
            .finish_non_exhaustive()
    }
}
