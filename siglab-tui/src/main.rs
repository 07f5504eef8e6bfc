//! Siglab TUI entry point.
//!
//! Usage: `siglab-tui [config.toml]`. Without an argument, `SIGLAB_CONFIG`
//! and then `<config dir>/siglab/config.toml` are tried before defaults.
//! Logs go to `<data dir>/siglab/logs/siglab.log`; the terminal is ours.

use std::io::{self, stdout};
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use siglab_runner::{init_file_tracing, SiglabConfig};
use siglab_tui::worker::{self, WorkerCommand};
use siglab_tui::{input, ui, AppState, Theme};

fn config_path() -> Option<PathBuf> {
    if let Some(arg) = std::env::args_os().nth(1) {
        return Some(PathBuf::from(arg));
    }
    if let Some(env) = std::env::var_os("SIGLAB_CONFIG") {
        return Some(PathBuf::from(env));
    }
    dirs::config_dir()
        .map(|d| d.join("siglab").join("config.toml"))
        .filter(|p| p.exists())
}

fn main() -> Result<()> {
    let log_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("siglab")
        .join("logs");
    let log_path = init_file_tracing(&log_dir).context("failed to open log file")?;

    let path = config_path();
    let config = SiglabConfig::load(path.as_deref()).with_context(|| match &path {
        Some(p) => format!("failed to load config {}", p.display()),
        None => "invalid default config".to_string(),
    })?;
    tracing::info!(symbol = %config.data.symbol, log = %log_path.display(), "dashboard starting");

    // Restore the terminal before printing a panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        default_hook(info);
    }));

    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();
    let worker_handle = worker::spawn_worker(cmd_rx, resp_tx).context("failed to spawn worker thread")?;

    let mut app = AppState::new(config, cmd_tx.clone(), resp_rx);
    app.request_reload();

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app, &Theme::default());

    let _ = cmd_tx.send(WorkerCommand::Shutdown);
    let _ = worker_handle.join();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    tracing::info!("dashboard closed");
    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut AppState, theme: &Theme) -> Result<()> {
    while app.running {
        terminal.draw(|f| ui::draw(f, app, theme))?;

        app.poll_worker();

        // 50ms timeout, ~20 FPS tick.
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                input::handle_key(app, key);
            }
        }
    }
    Ok(())
}
