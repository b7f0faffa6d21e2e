// main.rs

mod api;
mod app;
mod config;
mod daemon;
mod error;
mod logging;
mod todo;
mod tui;

use crate::api::HttpTodoApi;
use crate::app::App;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Base URL of the todo service, e.g. http://localhost:3000
    #[arg(long, env = "TODO_API_BASE")]
    api_base: Option<String>,

    /// Config file to use instead of the per-user one
    #[arg(long)]
    config: Option<PathBuf>,

    /// Show desktop reminders for today's open todos
    #[arg(long)]
    reminders: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Err(e) = logging::init(&config::log_path()) {
        eprintln!("Logging disabled: {}", e);
    }

    let config_path = cli.config.unwrap_or_else(config::config_path);
    let mut cfg = config::load_or_init(&config_path)?;
    if let Some(base) = cli.api_base {
        cfg.api_base = base;
    }
    cfg.reminders |= cli.reminders;
    log::info!("using todo service at {}", cfg.api_base);

    let api = Arc::new(HttpTodoApi::new(&cfg.api_base, cfg.timeout())?);

    if cfg.reminders {
        let api = api.clone();
        std::thread::spawn(move || daemon::start_daemon(api));
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(api);

    // Blocks until the user quits
    let res = tui::run_app(&mut terminal, &mut app);

    // Restore terminal state
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        log::error!("event loop failed: {}", err);
        eprintln!("Application error: {}", err);
    }

    Ok(())
}
