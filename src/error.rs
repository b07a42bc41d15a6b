use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] tokio_rusqlite::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("無法連接到 JIRA。請確認：\n1. 是否已連接 VPN\n2. 是否已登入 JIRA")]
    FeedUnavailable,

    #[error("HTTP error! status: {status}")]
    FeedRejected { status: u16 },

    #[error("Feed parsing failed: {0}")]
    FeedParse(#[from] quick_xml::DeError),

    #[error("Invalid path pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Whether the error came from loading the feed, as opposed to local state.
    pub fn is_feed_failure(&self) -> bool {
        matches!(
            self,
            AppError::FeedUnavailable
                | AppError::FeedRejected { .. }
                | AppError::FeedParse(_)
                | AppError::Http(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
