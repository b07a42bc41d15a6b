use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Telemetry written by the periodic trigger after each successful check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshRecord {
    pub last_update: DateTime<Utc>,
    pub items_count: usize,
}
