use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use chrono::Local;
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver};
use tokio::sync::oneshot;

use crate::config::Config;
use crate::db::Repository;
use crate::debounce::Debouncer;
use crate::error::Result;
use crate::feed::FeedFetcher;
use crate::models::{FeedItem, RefreshRecord};
use crate::report::{self, DatePattern, KeywordSet, Page, QualificationCriteria};
use crate::scheduler;
use crate::tui::AppAction;

const SPINNER_FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

pub struct App {
    pub allowed_authors: Vec<String>,
    pub required_phrases: Vec<String>,
    pub pattern: DatePattern,
    repo: Arc<Repository>,
    fetcher: Arc<FeedFetcher>,

    /// Latest feed snapshot; `None` until a load succeeds.
    pub items: Option<Vec<FeedItem>>,
    /// `None` while the first load is in flight.
    pub page: Option<Page>,
    pub keyword_text: String,
    pub filter_visible: bool,
    pub keyword_editing: bool,
    pub show_help: bool,
    pub scroll: u16,
    pub last_refresh: Option<RefreshRecord>,
    pub status_message: Option<String>,
    pub spinner_frame: usize,

    export_path: std::path::PathBuf,
    debouncer: Debouncer,
    load_rx: Option<oneshot::Receiver<Result<Vec<FeedItem>>>>,
    snapshot_rx: UnboundedReceiver<Vec<FeedItem>>,
}

impl App {
    pub async fn new(config: &Config) -> Result<Self> {
        let repo = Arc::new(Repository::new(config.db_path.to_string_lossy().as_ref()).await?);
        let fetcher = Arc::new(FeedFetcher::new(config)?);

        let keyword_text = repo.get_keywords().await?;
        let filter_visible = repo.get_filter_visible().await?;
        let last_refresh = repo.last_refresh().await?;

        // The UI does its own initial load, so the schedule starts one interval out
        let (snapshot_tx, snapshot_rx) = mpsc::unbounded_channel();
        scheduler::spawn_periodic(
            fetcher.clone(),
            repo.clone(),
            config.refresh_interval(),
            false,
            Some(snapshot_tx),
        );

        let mut app = Self {
            allowed_authors: config.allowed_authors.clone(),
            required_phrases: config.required_phrases.clone(),
            pattern: DatePattern::compile(&config.path)?,
            repo,
            fetcher,
            items: None,
            page: None,
            keyword_text,
            filter_visible,
            keyword_editing: false,
            show_help: false,
            scroll: 0,
            last_refresh,
            status_message: None,
            spinner_frame: 0,
            export_path: config.export_path.clone(),
            debouncer: Debouncer::new(config.debounce()),
            load_rx: None,
            snapshot_rx,
        };
        app.start_load();

        Ok(app)
    }

    pub fn is_loading(&self) -> bool {
        self.load_rx.is_some()
    }

    pub fn spinner(&self) -> char {
        SPINNER_FRAMES[self.spinner_frame % SPINNER_FRAMES.len()]
    }

    pub fn tick_spinner(&mut self) {
        if self.is_loading() {
            self.spinner_frame = self.spinner_frame.wrapping_add(1);
        }
    }

    /// Kicks off an explicit feed load in the background. A successful load
    /// records refresh telemetry like a periodic check does.
    pub fn start_load(&mut self) {
        if self.is_loading() {
            return;
        }
        let (tx, rx) = oneshot::channel();
        let fetcher = self.fetcher.clone();
        let repo = self.repo.clone();
        tokio::spawn(async move {
            let _ = tx.send(scheduler::check_for_updates(fetcher.as_ref(), &repo).await);
        });
        self.load_rx = Some(rx);
    }

    pub async fn poll_load_result(&mut self) -> Result<()> {
        let Some(rx) = self.load_rx.as_mut() else {
            return Ok(());
        };

        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(oneshot::error::TryRecvError::Empty) => return Ok(()),
            Err(oneshot::error::TryRecvError::Closed) => {
                self.load_rx = None;
                tracing::error!("Feed load task ended without a result");
                return Ok(());
            }
        };
        self.load_rx = None;

        match result {
            Ok(items) => {
                self.items = Some(items);
                self.last_refresh = self.repo.last_refresh().await?;
                self.regenerate();
            }
            Err(e) => {
                tracing::error!("Error fetching data: {}", e);
                self.items = None;
                self.page = Some(Page::LoadFailed {
                    message: e.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Applies snapshots delivered by the periodic trigger.
    pub async fn poll_refresh_result(&mut self) -> Result<()> {
        let mut latest = None;
        loop {
            match self.snapshot_rx.try_recv() {
                Ok(items) => latest = Some(items),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    tracing::warn!("Periodic refresh task stopped");
                    break;
                }
            }
        }

        if let Some(items) = latest {
            self.items = Some(items);
            self.last_refresh = self.repo.last_refresh().await?;
            self.regenerate();
        }
        Ok(())
    }

    /// Runs the debounced regeneration once keyword input has settled.
    pub async fn poll_debounce(&mut self) -> Result<()> {
        if self.debouncer.poll(Instant::now()).is_some() {
            self.repo.set_keywords(&self.keyword_text).await?;
            self.regenerate();
        }
        Ok(())
    }

    pub fn debounce_remaining(&self) -> Option<std::time::Duration> {
        self.debouncer.remaining(Instant::now())
    }

    /// Rebuilds the page from the current snapshot and keyword text.
    pub fn regenerate(&mut self) {
        let Some(items) = &self.items else {
            return;
        };
        let criteria = QualificationCriteria::for_day(
            &self.allowed_authors,
            &self.required_phrases,
            &Local::now(),
        );
        let keywords = KeywordSet::parse(&self.keyword_text);
        self.page = Some(report::page_for(items, &criteria, &self.pattern, &keywords));
    }

    pub fn html(&self) -> Option<String> {
        self.page.as_ref().map(report::html::render_page)
    }

    fn keywords_changed(&mut self) {
        self.debouncer.trigger(Instant::now());
    }

    fn export_html(&mut self) -> Result<()> {
        let Some(html) = self.html() else {
            self.status_message = Some("Nothing to export yet".to_string());
            return Ok(());
        };
        write_export(&self.export_path, &html)?;
        if let Err(e) = open::that(&self.export_path) {
            tracing::warn!("Failed to open {:?}: {}", self.export_path, e);
        }
        self.status_message = Some(format!("Exported to {}", self.export_path.display()));
        Ok(())
    }

    pub async fn handle_action(&mut self, action: AppAction) -> Result<bool> {
        match action {
            AppAction::Quit => return Ok(true),
            AppAction::ScrollUp => self.scroll = self.scroll.saturating_sub(1),
            AppAction::ScrollDown => self.scroll = self.scroll.saturating_add(1),
            AppAction::PageUp => self.scroll = self.scroll.saturating_sub(10),
            AppAction::PageDown => self.scroll = self.scroll.saturating_add(10),
            AppAction::ScrollToTop => self.scroll = 0,
            AppAction::RefreshFeed => {
                self.status_message = None;
                self.start_load();
            }
            AppAction::ToggleFilter => {
                self.filter_visible = !self.filter_visible;
                if !self.filter_visible {
                    self.keyword_editing = false;
                }
                self.repo.set_filter_visible(self.filter_visible).await?;
            }
            AppAction::EditKeywords => {
                if !self.filter_visible {
                    self.filter_visible = true;
                    self.repo.set_filter_visible(true).await?;
                }
                self.keyword_editing = true;
            }
            AppAction::KeywordChar(c) => {
                self.keyword_text.push(c);
                self.keywords_changed();
            }
            AppAction::KeywordNewline => {
                self.keyword_text.push('\n');
                self.keywords_changed();
            }
            AppAction::KeywordBackspace => {
                if self.keyword_text.pop().is_some() {
                    self.keywords_changed();
                }
            }
            AppAction::KeywordDone => self.keyword_editing = false,
            AppAction::ExportHtml => self.export_html()?,
            AppAction::ShowHelp => self.show_help = true,
            AppAction::HideHelp => self.show_help = false,
        }
        Ok(false)
    }
}

pub fn write_export(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Comment;
    use chrono::Utc;
    use tempfile::TempDir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio_test::assert_ok;

    const ONE_ISSUE_FEED: &str = "<rss><channel><item><title>[DEMO-1] Hang</title><link>https://jira.example.com/browse/DEMO-1</link></item></channel></rss>";

    /// Answers one request with [`ONE_ISSUE_FEED`] and returns the feed URL.
    async fn serve_feed_once() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let mut request = Vec::new();
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{ONE_ISSUE_FEED}",
                ONE_ISSUE_FEED.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        format!("http://{addr}/search.xml")
    }

    /// An app whose feed URL points at a closed port.
    async fn offline_app() -> (App, TempDir) {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        app_for(format!("http://{addr}/search.xml")).await
    }

    /// Builds an app for `feed_url` and waits for its startup load to finish.
    async fn app_for(feed_url: String) -> (App, TempDir) {
        let tmpdir = tempfile::tempdir().unwrap();
        let config = Config {
            feed_url,
            system_proxy: false,
            debounce_ms: 0,
            db_path: tmpdir.path().join("app.db"),
            export_path: tmpdir.path().join("out").join("report.html"),
            ..Config::default()
        };
        let mut app = App::new(&config).await.unwrap();

        for _ in 0..250 {
            assert_ok!(app.poll_load_result().await);
            if !app.is_loading() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        (app, tmpdir)
    }

    fn reported_issue() -> FeedItem {
        FeedItem {
            title: Some("[DEMO-1] Playback hangs".into()),
            link: "https://jira.example.com/browse/DEMO-1".into(),
            assignee: None,
            comments: vec![Comment {
                author: "JIRAUSER50632".into(),
                created_at: Utc::now(),
                text: r"urgent ticket \172.22.48.92\nightrun_log\Demo_stress_Test_log\2024\20240615 請協助查看".into(),
            }],
        }
    }

    fn displayed(app: &App) -> usize {
        match &app.page {
            Some(Page::Report(report)) => report.details.len(),
            other => panic!("unexpected page {other:?}"),
        }
    }

    #[tokio::test]
    async fn failed_load_shows_failure_panel() {
        let (app, _tmpdir) = offline_app().await;

        assert!(matches!(app.page, Some(Page::LoadFailed { .. })));
        let html = app.html().unwrap();
        assert!(html.contains("VPN"));
        assert!(html.contains("如需協助"));
    }

    #[tokio::test]
    async fn startup_load_records_refresh_telemetry() {
        let url = serve_feed_once().await;
        let (app, _tmpdir) = app_for(url).await;

        assert_eq!(app.items.as_ref().map(Vec::len), Some(1));
        let record = app.last_refresh.as_ref().unwrap();
        assert_eq!(record.items_count, 1);
        assert_eq!(app.repo.last_refresh().await.unwrap().unwrap().items_count, 1);
    }

    #[tokio::test]
    async fn failed_load_records_no_telemetry() {
        let (app, _tmpdir) = offline_app().await;

        assert!(app.last_refresh.is_none());
        assert!(app.repo.last_refresh().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn keyword_edits_apply_after_debounce_and_persist() {
        let (mut app, _tmpdir) = offline_app().await;
        app.items = Some(vec![reported_issue()]);
        app.regenerate();
        assert_eq!(displayed(&app), 1);

        for c in "other".chars() {
            assert_ok!(app.handle_action(AppAction::KeywordChar(c)).await);
        }
        assert_eq!(displayed(&app), 1, "nothing changes before the debounce fires");

        assert_ok!(app.poll_debounce().await);
        assert_eq!(displayed(&app), 0);
        assert_eq!(app.repo.get_keywords().await.unwrap(), "other");

        assert_ok!(app.handle_action(AppAction::KeywordNewline).await);
        for c in "URGENT".chars() {
            assert_ok!(app.handle_action(AppAction::KeywordChar(c)).await);
        }
        assert_ok!(app.poll_debounce().await);
        assert_eq!(displayed(&app), 1);
    }

    #[tokio::test]
    async fn filter_panel_visibility_is_persisted() {
        let (mut app, _tmpdir) = offline_app().await;
        assert!(!app.filter_visible);

        assert_ok!(app.handle_action(AppAction::EditKeywords).await);
        assert!(app.filter_visible && app.keyword_editing);
        assert!(app.repo.get_filter_visible().await.unwrap());

        assert_ok!(app.handle_action(AppAction::ToggleFilter).await);
        assert!(!app.filter_visible && !app.keyword_editing);
        assert!(!app.repo.get_filter_visible().await.unwrap());
    }

    #[tokio::test]
    async fn empty_snapshot_shows_no_issues() {
        let (mut app, _tmpdir) = offline_app().await;
        app.items = Some(vec![]);
        app.regenerate();
        assert_eq!(app.page, Some(Page::NoIssues));
    }

    #[tokio::test]
    async fn quit_action_ends_the_loop() {
        let (mut app, _tmpdir) = offline_app().await;
        assert!(app.handle_action(AppAction::Quit).await.unwrap());
        assert!(!app.handle_action(AppAction::ScrollDown).await.unwrap());
        assert_eq!(app.scroll, 1);
    }

    #[test]
    fn export_creates_parent_directories() {
        let tmpdir = tempfile::tempdir().unwrap();
        let path = tmpdir.path().join("nested").join("report.html");

        write_export(&path, "<div>report</div>").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<div>report</div>");
    }
}
