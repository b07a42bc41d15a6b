use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::{AppError, Result};
use crate::report::PathPattern;

const DEFAULT_FEED_URL: &str = "https://jira.realtek.com/sr/jira.issueviews:searchrequest-xml/59583/SearchRequest-59583.xml?tempMax=1000";
const COOKIE_ENV: &str = "STRESS_DIGEST_COOKIE";
const TOKEN_ENV: &str = "STRESS_DIGEST_TOKEN";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub feed_url: String,
    pub allowed_authors: Vec<String>,
    pub required_phrases: Vec<String>,
    pub path: PathPattern,
    /// Raw `Cookie` header for the tracker session.
    pub session_cookie: Option<String>,
    pub api_token: Option<String>,
    pub debounce_ms: u64,
    pub refresh_interval_minutes: u64,
    pub request_timeout_secs: u64,
    /// Honour `HTTP_PROXY`/`HTTPS_PROXY` from the environment.
    pub system_proxy: bool,
    pub db_path: PathBuf,
    pub export_path: PathBuf,
    pub log_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = data_dir();
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            allowed_authors: vec!["JIRAUSER50632".to_string(), "JIRAUSER51966".to_string()],
            required_phrases: vec!["請協助查看".to_string(), "也有同样问题".to_string()],
            path: PathPattern::default(),
            session_cookie: None,
            api_token: None,
            debounce_ms: 300,
            refresh_interval_minutes: 60,
            request_timeout_secs: 30,
            system_proxy: true,
            db_path: data_dir.join("stress-digest.db"),
            export_path: data_dir.join("report.html"),
            log_path: std::env::temp_dir().join("stress-digest.log"),
        }
    }
}

impl Config {
    /// Reads `<config_dir>/stress-digest/config.toml`, or defaults if it doesn't exist.
    pub fn load() -> Result<Self> {
        let path = config_path();
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            Self::from_toml(&content)?
        } else {
            Self::default()
        };

        if let Ok(cookie) = std::env::var(COOKIE_ENV) {
            config.session_cookie = Some(cookie);
        }
        if let Ok(token) = std::env::var(TOKEN_ENV) {
            config.api_token = Some(token);
        }

        if let Some(parent) = config.db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        Url::parse(&self.feed_url)
            .map_err(|e| AppError::Config(format!("feed_url {:?}: {}", self.feed_url, e)))?;
        if self.allowed_authors.is_empty() {
            return Err(AppError::Config("allowed_authors must not be empty".into()));
        }
        if self.path.marker.is_empty() {
            return Err(AppError::Config("path.marker must not be empty".into()));
        }
        if self.refresh_interval_minutes == 0 {
            return Err(AppError::Config(
                "refresh_interval_minutes must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_minutes * 60)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("stress-digest")
        .join("config.toml")
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("stress-digest")
}
