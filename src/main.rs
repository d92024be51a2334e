//! Rain Pomodoro - a focus timer with ambient rain
//!
//! This tool helps you stay focused using the Pomodoro Technique:
//! - 25 minutes of focused work, with optional rain in the background
//! - 5 minutes of short break
//! - 15 minutes of long break after every 4 work sessions

use anyhow::Result;
use clap::{CommandFactory, Parser};

use rain_pomodoro::cli::{run_watch, Cli, Commands, Display, IpcClient};
use rain_pomodoro::config::resolve_socket_path;
use rain_pomodoro::daemon::run_daemon;

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
///
/// `RUST_LOG` wins; otherwise `warn`, or `debug` with `--verbose`.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    let Some(command) = cli.command else {
        // No command provided, show help
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Daemon(args) => {
            let socket_path = resolve_socket_path(cli.socket)
                .map_err(|e| anyhow::anyhow!("{}. {}", e, e.suggestion()))?;
            run_daemon(args.into_config(socket_path)).await?;
        }
        Commands::Completions { shell } => {
            generate_completions(shell);
        }
        Commands::Start => {
            let response = IpcClient::new(cli.socket)?.start().await?;
            Display::show_command_result(&response);
        }
        Commands::Pause => {
            let response = IpcClient::new(cli.socket)?.pause().await?;
            Display::show_command_result(&response);
        }
        Commands::Resume => {
            let response = IpcClient::new(cli.socket)?.resume().await?;
            Display::show_command_result(&response);
        }
        Commands::Toggle => {
            let response = IpcClient::new(cli.socket)?.toggle().await?;
            Display::show_command_result(&response);
        }
        Commands::Reset => {
            let response = IpcClient::new(cli.socket)?.reset().await?;
            Display::show_command_result(&response);
        }
        Commands::Mode { target } => {
            let response = IpcClient::new(cli.socket)?.switch_mode(target).await?;
            Display::show_command_result(&response);
        }
        Commands::Sound => {
            let response = IpcClient::new(cli.socket)?.cycle_sound().await?;
            Display::show_command_result(&response);
        }
        Commands::Theme { theme } => {
            let client = IpcClient::new(cli.socket)?;
            let response = match theme {
                Some(theme) => client.set_theme(theme).await?,
                None => client.toggle_theme().await?,
            };
            Display::show_command_result(&response);
        }
        Commands::Status => {
            let response = IpcClient::new(cli.socket)?.status().await?;
            Display::show_status(&response);
        }
        Commands::Watch(args) => {
            let client = IpcClient::new(cli.socket)?;
            run_watch(&client, &args).await?;
        }
        Commands::Shutdown => {
            let response = IpcClient::new(cli.socket)?.shutdown().await?;
            Display::show_shutdown(&response);
        }
    }

    Ok(())
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================
