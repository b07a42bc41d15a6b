mod fetcher;
mod parser;

use std::future::Future;

use crate::error::Result;
use crate::models::FeedItem;

pub use fetcher::FeedFetcher;
pub use parser::parse_feed;

/// Anything that can produce a fresh snapshot of the issue feed.
pub trait FeedSource: Send + Sync {
    fn fetch_items(&self) -> impl Future<Output = Result<Vec<FeedItem>>> + Send;
}

impl FeedSource for FeedFetcher {
    fn fetch_items(&self) -> impl Future<Output = Result<Vec<FeedItem>>> + Send {
        FeedFetcher::fetch_items(self)
    }
}
