//! livefeed: a paginated, live-updating feed in the terminal.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌──────────────┐  Inbound  ┌─────────────────┐ FeedEvent ┌──────────┐ draw() ┌────────┐
//! │ RssSource +  │ ────────► │ FeedCoordinator │ ────────► │  app.rs  │ ─────► │ ui.rs  │
//! │ poller tasks │  (inbox)  │   (library)     │           │(presenter)│       │(render)│
//! └──────────────┘           └─────────────────┘           └──────────┘        └────────┘
//!                                     ▲ refresh() / load_more()
//!                                     │
//!                               ┌──────────┐
//!                               │ input.rs │
//!                               └──────────┘
//! ```
//!
//! * **`app`**: the presenter (loading indicator, counts, toasts, selection).
//! * **`ui`**: pure rendering of `App` plus the coordinator's snapshot.
//! * **`input`**: maps key events to `App` mutations and coordinator commands.
//! * **`main`**: parses args, sets up logging and the terminal, runs the loop.

mod app;
mod input;
mod ui;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use livefeed::config::{Config, Overrides};
use livefeed::event::LogPresenter;
use livefeed::logging::{self, LogBuffer, Mode};
use livefeed::{FeedCoordinator, FeedSource, LoadingState, RssSource, Session};

use app::App;
use input::Command;

/// Command-line flags. Anything omitted falls back to env, file, defaults.
#[derive(Parser, Debug)]
#[command(name = "livefeed", version, about = "A paginated, live-updating feed reader")]
struct Cli {
    /// Feed URL
    url: Option<String>,

    /// Label shown next to each item
    #[arg(long)]
    label: Option<String>,

    /// Items per page
    #[arg(long)]
    page_size: Option<usize>,

    /// Seconds between background polls
    #[arg(long)]
    poll_secs: Option<u64>,

    /// Print the first page to stdout and exit instead of opening the TUI
    #[arg(long)]
    headless: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            url: self.url.clone(),
            label: self.label.clone(),
            page_size: self.page_size,
            poll_secs: self.poll_secs,
        }
    }
}

// ---------------------------------------------------------------------------
// RAII terminal guard
// ---------------------------------------------------------------------------

/// Enters raw mode + alternate screen on construction and restores the
/// terminal on [`Drop`], including during unwinding.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Restore the terminal before the panic message is printed.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?.apply(cli.overrides())?;

    let logs = LogBuffer::new();
    let mode = if cli.headless { Mode::Headless } else { Mode::Tui };
    let _log_guard = logging::init(&config.logging, mode, &logs)?;
    tracing::info!(url = %config.url, page_size = config.page_size, "livefeed starting");

    let session = Session::new(config.request_timeout)?;
    let source: Arc<dyn FeedSource> = Arc::new(RssSource::new(
        session.clone(),
        config.url.clone(),
        config.label.clone(),
        config.page_size,
        config.poll_interval,
    ));

    if cli.headless {
        run_headless(session, source, &config).await
    } else {
        run_tui(session, source, &config, logs)
    }
}

/// Load the first page, print it, exit.
async fn run_headless(session: Session, source: Arc<dyn FeedSource>, config: &Config) -> Result<()> {
    let mut coordinator = FeedCoordinator::new(session, source, LogPresenter::default(), config.debounce_delay);
    coordinator.start();

    let deadline = config.request_timeout + Duration::from_secs(5);
    tokio::time::timeout(deadline, async {
        while coordinator.state() != LoadingState::Loaded {
            coordinator.process_next().await;
        }
    })
    .await
    .context("timed out waiting for the first page")?;

    for item in coordinator.snapshot() {
        let date = item
            .published
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "no date".into());
        println!("{date:<18} {}", item.title);
    }
    coordinator.stop();
    Ok(())
}

/// Interactive loop at ~10 fps. Each iteration:
///   1. Drain the coordinator's inbox.
///   2. Render.
///   3. Poll for keyboard input (up to one tick).
fn run_tui(session: Session, source: Arc<dyn FeedSource>, config: &Config, logs: LogBuffer) -> Result<()> {
    install_panic_hook();

    let title = source.name().to_string();
    let mut coordinator = FeedCoordinator::new(session, source, App::new(logs), config.debounce_delay);
    let mut guard = TerminalGuard::new()?;
    coordinator.start();

    let tick_rate = Duration::from_millis(100);

    loop {
        coordinator.pump();

        let (app, items) = coordinator.view_mut();
        app.tick();
        guard.terminal.draw(|f| ui::draw(app, items, &title, f))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                match input::handle_key_event(coordinator.presenter_mut(), key) {
                    Some(Command::Refresh) => coordinator.refresh(),
                    Some(Command::LoadMore) => coordinator.load_more(),
                    None => {}
                }
            }
        }

        if coordinator.presenter().quit {
            break;
        }
    }

    coordinator.stop();
    // `guard` is dropped here, restoring the terminal.
    Ok(())
}
