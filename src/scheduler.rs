use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::db::Repository;
use crate::error::Result;
use crate::feed::FeedSource;
use crate::models::{FeedItem, RefreshRecord};

/// Fetches the feed once and records how many issues it held.
pub async fn check_for_updates<S: FeedSource>(source: &S, repo: &Repository) -> Result<Vec<FeedItem>> {
    let items = source.fetch_items().await?;
    repo.record_refresh(RefreshRecord {
        last_update: Utc::now(),
        items_count: items.len(),
    })
    .await?;
    tracing::info!("Periodic check found {} issues", items.len());
    Ok(items)
}

/// Runs [`check_for_updates`] every `interval` until `snapshots` is closed.
///
/// Failures are logged and never stop the schedule. With `immediate` the
/// first check runs right away, as on startup.
pub fn spawn_periodic<S: FeedSource + 'static>(
    source: Arc<S>,
    repo: Arc<Repository>,
    interval: Duration,
    immediate: bool,
    snapshots: Option<UnboundedSender<Vec<FeedItem>>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let start = if immediate {
            Instant::now()
        } else {
            Instant::now() + interval
        };
        let mut ticker = time::interval_at(start, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            match check_for_updates(source.as_ref(), &repo).await {
                Ok(items) => {
                    if let Some(tx) = &snapshots {
                        if tx.send(items).is_err() {
                            tracing::debug!("Snapshot receiver closed, stopping periodic checks");
                            return;
                        }
                    }
                }
                Err(e) if e.is_feed_failure() => {
                    tracing::warn!("Periodic check could not load the feed: {}", e);
                }
                Err(e) => {
                    tracing::error!("Periodic check failed: {}", e);
                }
            }
        }
    })
}
