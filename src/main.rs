use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

use stress_digest::app::{self, App};
use stress_digest::config::Config;
use stress_digest::db::Repository;
use stress_digest::error::Result;
use stress_digest::feed::FeedFetcher;
use stress_digest::report::{self, DatePattern, KeywordSet, Page, QualificationCriteria};
use stress_digest::scheduler;
use stress_digest::tui::{draw, handle_key_event};

const MAX_POLL: Duration = Duration::from_millis(100);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first so the log file location is known
    let config = Config::load()?;

    // Initialize logging (only show warnings and errors by default)
    // Also write to the configured log file, which stays readable while the TUI is up
    use std::fs::OpenOptions;
    use std::io::Write;
    use tracing_subscriber::fmt::MakeWriter;

    let log_file = match OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)
    {
        Ok(file) => Some(std::sync::Arc::new(std::sync::Mutex::new(file))),
        Err(err) => {
            eprintln!(
                "Warning: unable to open {}: {err}",
                config.log_path.display()
            );
            None
        }
    };

    struct DualWriter {
        file: Option<std::sync::Arc<std::sync::Mutex<std::fs::File>>>,
    }

    impl Write for DualWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if let Some(file) = &self.file {
                if let Ok(mut file) = file.lock() {
                    let _ = file.write_all(buf);
                }
            }
            std::io::stderr().write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            if let Some(file) = &self.file {
                if let Ok(mut file) = file.lock() {
                    let _ = file.flush();
                }
            }
            std::io::stderr().flush()
        }
    }

    impl<'a> MakeWriter<'a> for DualWriter {
        type Writer = DualWriter;

        fn make_writer(&'a self) -> Self::Writer {
            DualWriter {
                file: self.file.clone(),
            }
        }
    }

    let dual_writer = DualWriter { file: log_file };

    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());
    if let Ok(directive) = "html5ever=error".parse() {
        env_filter = env_filter.add_directive(directive);
    }

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(dual_writer)
        .init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();
    let flag = args.get(1).map(String::as_str);
    let target = args.get(2).map(PathBuf::from);

    match (flag, target) {
        (Some("--html"), Some(target)) => {
            let page = generate_page(&config).await?;
            write_output(&target, &report::html::render_page(&page))?;
            return Ok(());
        }
        (Some("--json"), Some(target)) => {
            let page = generate_page(&config).await?;
            write_output(&target, &serde_json::to_string_pretty(&page)?)?;
            return Ok(());
        }
        (Some("--refresh"), _) => {
            let repo = Repository::new(config.db_path.to_string_lossy().as_ref()).await?;
            let fetcher = FeedFetcher::new(&config)?;
            let items = scheduler::check_for_updates(&fetcher, &repo).await?;
            println!("Found {} issues", items.len());
            return Ok(());
        }
        (Some("--watch"), _) => {
            let repo = Arc::new(Repository::new(config.db_path.to_string_lossy().as_ref()).await?);
            let fetcher = Arc::new(FeedFetcher::new(&config)?);
            let handle =
                scheduler::spawn_periodic(fetcher, repo, config.refresh_interval(), true, None);
            tokio::select! {
                _ = handle => {}
                _ = tokio::signal::ctrl_c() => {}
            }
            return Ok(());
        }
        (Some(other), _) => {
            eprintln!("Unknown or incomplete option: {other}");
            eprintln!("Usage: stress-digest [--html <path|->] [--json <path|->] [--refresh] [--watch]");
            std::process::exit(2);
        }
        (None, _) => {}
    }

    // Initialize app
    let mut app = App::new(&config).await?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
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

    Ok(())
}

/// One-shot generation for the headless outputs. Load failures become the
/// failure page rather than an exit error.
async fn generate_page(config: &Config) -> Result<Page> {
    let repo = Repository::new(config.db_path.to_string_lossy().as_ref()).await?;
    let keywords = KeywordSet::parse(&repo.get_keywords().await?);
    let pattern = DatePattern::compile(&config.path)?;
    let fetcher = FeedFetcher::new(config)?;

    let items = match fetcher.fetch_items().await {
        Ok(items) => items,
        Err(e) if e.is_feed_failure() => {
            tracing::error!("Error fetching data: {}", e);
            return Ok(Page::LoadFailed {
                message: e.to_string(),
            });
        }
        Err(e) => return Err(e),
    };

    let criteria = QualificationCriteria::for_day(
        &config.allowed_authors,
        &config.required_phrases,
        &Local::now(),
    );
    Ok(report::page_for(&items, &criteria, &pattern, &keywords))
}

fn write_output(target: &Path, content: &str) -> Result<()> {
    if target == Path::new("-") {
        println!("{content}");
        Ok(())
    } else {
        app::write_export(target, content)
    }
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|frame| draw(frame, app))?;

        // Advance spinner animation
        app.tick_spinner();

        // Poll for the explicit load started by `r` or at startup
        app.poll_load_result().await?;

        // Poll for snapshots from the periodic trigger
        app.poll_refresh_result().await?;

        // Regenerate once keyword typing has settled
        app.poll_debounce().await?;

        // Wake up in time for a pending debounce
        let timeout = app
            .debounce_remaining()
            .map_or(MAX_POLL, |remaining| remaining.min(MAX_POLL));

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if let Some(action) = handle_key_event(key, app.keyword_editing, app.show_help) {
                    let should_quit = app.handle_action(action).await?;
                    if should_quit {
                        return Ok(());
                    }
                }
            }
        }
    }
}
