use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One issue from the tracker feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    pub title: Option<String>,
    pub link: String,
    pub assignee: Option<String>,
    /// Document order, oldest first.
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub text: String,
}

impl FeedItem {
    /// Comments from the most recent to the oldest.
    pub fn comments_newest_first(&self) -> impl Iterator<Item = &Comment> {
        self.comments.iter().rev()
    }

    pub fn assignee_or_unassigned(&self) -> &str {
        self.assignee
            .as_deref()
            .filter(|a| !a.is_empty())
            .unwrap_or("Unassigned")
    }
}
