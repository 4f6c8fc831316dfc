//! Retreat Roster - a terminal front end for the retreat sign-up sheet.
//!
//! Browse who is interested in or committed to the retreat, see roughly
//! where they are coming from, and register or update your own entry.

mod app;
mod dump;
mod ui;

use std::io;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use retreat_roster_core::config::Config;

use app::{App, AppState};
use dump::DumpFormat;
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file written inside the cache directory while the TUI owns the terminal
const LOG_FILE_NAME: &str = "retreat-roster.log";

#[derive(Parser, Debug)]
#[command(name = "retreat-roster")]
#[command(version, about = "Browse the retreat roster and register your interest")]
struct Cli {
    /// Endpoint URL, overriding RETREAT_ROSTER_ENDPOINT and the config file
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Skip the network and use the built-in demo roster
    #[arg(long, global = true)]
    demo: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the roster once and print it grouped by status
    Dump {
        /// Year tag to filter by, or "all"
        #[arg(long, default_value = "all")]
        year: String,

        /// Output format
        #[arg(long, value_enum, default_value_t = DumpFormat::Text)]
        format: DumpFormat,
    },
}

/// Log to stderr; used when the terminal is not in raw mode
fn init_stderr_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

/// Log to a file in the cache directory so output never lands on the TUI.
/// The returned guard must live until shutdown to flush the writer.
fn init_file_tracing() -> Option<WorkerGuard> {
    let log_dir = match Config::default().cache_dir() {
        Ok(dir) => dir,
        Err(_) => return None,
    };
    if std::fs::create_dir_all(&log_dir).is_err() {
        return None;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    Some(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Some(Command::Dump { year, format }) = cli.command {
        init_stderr_tracing();
        return dump::run(cli.endpoint, cli.demo, &year, format).await;
    }

    let _log_guard = init_file_tracing();
    info!("Retreat roster TUI starting");

    let mut app = App::new(cli.endpoint, cli.demo)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    app.start();

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("Retreat roster TUI shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key)? {
                    return Ok(());
                }
            }
        }

        // Apply results from spawned network tasks
        app.check_background_tasks();

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }

        // Let spawned tasks make progress between frames
        tokio::task::yield_now().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_dump_options() {
        let cli = Cli::parse_from(["retreat-roster", "--demo", "dump", "--year", "2019", "--format", "html"]);
        assert!(cli.demo);
        match cli.command {
            Some(Command::Dump { year, format }) => {
                assert_eq!(year, "2019");
                assert_eq!(format, DumpFormat::Html);
            }
            None => panic!("expected dump subcommand"),
        }
    }

    #[test]
    fn test_cli_defaults_to_tui() {
        let cli = Cli::parse_from(["retreat-roster", "--endpoint", "https://example.com/exec"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.endpoint.as_deref(), Some("https://example.com/exec"));
        assert!(!cli.demo);
    }
}
