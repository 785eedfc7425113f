//! finscope — terminal dashboard for the FinScope personal-finance backend.

mod app;
mod net;
mod theme;
mod ui;

use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use api_client::{ApiClient, ApiClientConfig};
use app::App;
use session::SessionStore;

#[derive(Parser, Debug)]
#[command(name = "finscope", about = "Panel financiero personal con insights de IA.")]
struct Args {
    /// Path to the settings file (default: finscope.json in the current directory)
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Backend base URL override
    #[arg(long)]
    base_url: Option<String>,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut settings = settings_loader::load_settings_with_fallback(args.settings.as_ref());
    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
    }

    init_logging(&settings)?;
    tracing::info!(base_url = %settings.base_url, "starting finscope");

    let data_dir = match settings.data_dir.clone() {
        Some(dir) => dir,
        None => SessionStore::default_dir()?,
    };
    let store = SessionStore::new(data_dir);

    let api = Arc::new(
        ApiClient::new(ApiClientConfig::from_settings(&settings))
            .context("Building backend client")?,
    );
    let mut app = App::new(api, store);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut app);

    // Always hand the terminal back, even when the loop errored.
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|frame| ui::draw(frame, app))?;

        app.drain_fetch_events();

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        app.process_refresh_flags();

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Logging goes to a file when configured: the terminal belongs to the UI.
fn init_logging(settings: &models::Settings) -> Result<()> {
    let Some(path) = &settings.log_file else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("Creating log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "finscope=info,api_client=info,ai_client=info".into()),
        )
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
