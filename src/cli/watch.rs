//! Live dashboard.
//!
//! Polls the daemon's status on a fixed interval and redraws the dashboard
//! and the rain canvas. Keys send intents to the daemon.

use std::io::{self, Stdout, Write};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};

use crate::cli::client::IpcClient;
use crate::cli::commands::WatchArgs;
use crate::types::{IpcRequest, ResponseData, SessionMode, Theme};
use crate::view::{render_rain, DashboardView};

/// Key bindings shown under the dashboard.
const HELP_LINE: &str = "space start/pause  r reset  1/2/3 mode  s sound  t theme  q quit";

/// What a key press asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchAction {
    /// Send a request to the daemon
    Send(IpcRequest),
    /// Leave the dashboard
    Quit,
}

/// Maps a key press to an action.
pub fn key_action(key: &KeyEvent) -> Option<WatchAction> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return matches!(key.code, KeyCode::Char('c')).then_some(WatchAction::Quit);
    }

    let action = match key.code {
        KeyCode::Char(' ') | KeyCode::Enter => WatchAction::Send(IpcRequest::Toggle),
        KeyCode::Char('r') => WatchAction::Send(IpcRequest::Reset),
        KeyCode::Char('1') => WatchAction::Send(IpcRequest::Mode {
            target: SessionMode::Work,
        }),
        KeyCode::Char('2') => WatchAction::Send(IpcRequest::Mode {
            target: SessionMode::ShortBreak,
        }),
        KeyCode::Char('3') => WatchAction::Send(IpcRequest::Mode {
            target: SessionMode::LongBreak,
        }),
        KeyCode::Char('s') => WatchAction::Send(IpcRequest::Sound),
        KeyCode::Char('t') => WatchAction::Send(IpcRequest::Theme { theme: None }),
        KeyCode::Char('q') | KeyCode::Esc => WatchAction::Quit,
        _ => return None,
    };
    Some(action)
}

/// Puts the terminal into dashboard mode and restores it on drop.
struct TerminalGuard {
    stdout: Stdout,
}

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, Hide)
            .context("Failed to enter alternate screen")?;
        Ok(Self { stdout })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.stdout, ResetColor, Show, LeaveAlternateScreen);
    }
}

/// Runs the dashboard until the user quits.
///
/// # Errors
///
/// Returns an error if the terminal cannot be controlled or the daemon
/// stops answering.
pub async fn run_watch(client: &IpcClient, args: &WatchArgs) -> Result<()> {
    // Fail before touching the terminal if the daemon is not there
    let mut snapshot = fetch(client, &IpcRequest::Status).await?;

    let mut guard = TerminalGuard::enter()?;
    let interval = Duration::from_millis(args.interval);
    let started = Instant::now();

    loop {
        draw(&mut guard.stdout, &snapshot, started.elapsed())?;
        tokio::time::sleep(interval).await;

        while event::poll(Duration::ZERO).context("Failed to poll terminal events")? {
            let Event::Key(key) = event::read().context("Failed to read terminal event")? else {
                continue;
            };
            match key_action(&key) {
                Some(WatchAction::Quit) => return Ok(()),
                Some(WatchAction::Send(request)) => {
                    snapshot = fetch(client, &request).await?;
                }
                None => {}
            }
        }

        snapshot = fetch(client, &IpcRequest::Status).await?;
    }
}

/// Sends `request` and returns the snapshot in the answer.
///
/// An error response fails with the daemon's message.
async fn fetch(client: &IpcClient, request: &IpcRequest) -> Result<ResponseData> {
    client
        .request(request)
        .await?
        .data
        .context("The daemon sent no status")
}

/// Draws one frame.
fn draw(stdout: &mut Stdout, snapshot: &ResponseData, elapsed: Duration) -> Result<()> {
    let view = DashboardView::from_snapshot(snapshot);
    let (width, height) = terminal::size().context("Failed to read terminal size")?;

    let (foreground, background) = match snapshot.theme {
        Theme::Light => (Color::Black, Color::White),
        Theme::Dark => (Color::Grey, Color::Black),
    };
    queue!(
        stdout,
        SetForegroundColor(foreground),
        SetBackgroundColor(background),
        Clear(ClearType::All)
    )?;

    let mut lines = view.render_lines();
    lines.push(String::new());
    lines.push(HELP_LINE.to_string());

    let canvas_height = usize::from(height).saturating_sub(lines.len() + 1);
    let rain = render_rain(view.rain, usize::from(width), canvas_height, elapsed);

    let mut row = 0u16;
    for line in lines.iter().chain(rain.iter()) {
        if row >= height {
            break;
        }
        queue!(stdout, MoveTo(0, row), Print(line))?;
        row += 1;
    }

    stdout.flush().context("Failed to draw the dashboard")?;
    Ok(())
}
