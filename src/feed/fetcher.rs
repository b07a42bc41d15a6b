use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CACHE_CONTROL, COOKIE, PRAGMA};
use reqwest::Client;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::FeedItem;

use super::parser::parse_feed;

pub struct FeedFetcher {
    client: Client,
    url: String,
    api_token: Option<String>,
}

impl FeedFetcher {
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/xml"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
        if let Some(cookie) = &config.session_cookie {
            let value = HeaderValue::from_str(cookie)
                .map_err(|e| AppError::Config(format!("session_cookie: {}", e)))?;
            headers.insert(COOKIE, value);
        }

        let mut builder = Client::builder();
        if !config.system_proxy {
            builder = builder.no_proxy();
        }

        let client = builder
            .timeout(config.request_timeout())
            .connect_timeout(std::time::Duration::from_secs(10))
            .user_agent("stress-digest/0.1")
            .default_headers(headers)
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            url: config.feed_url.clone(),
            api_token: config.api_token.clone(),
        })
    }

    pub async fn fetch_items(&self) -> Result<Vec<FeedItem>> {
        let mut request = self.client.get(&self.url);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::FeedRejected {
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(classify)?;
        let items = parse_feed(&body)?;
        tracing::debug!("Fetched {} issues from {}", items.len(), self.url);

        Ok(items)
    }
}

/// Connectivity problems usually mean the VPN is down; everything else is
/// reported as-is.
fn classify(err: reqwest::Error) -> AppError {
    if err.is_connect() || err.is_timeout() {
        AppError::FeedUnavailable
    } else {
        AppError::Http(err)
    }
}
