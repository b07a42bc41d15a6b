use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::Result;
use crate::models::{Comment, FeedItem};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<RawItem>,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    title: Option<String>,
    link: Option<String>,
    assignee: Option<Text>,
    comments: Option<RawComments>,
}

#[derive(Debug, Deserialize)]
struct Text {
    #[serde(rename = "$text", default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct RawComments {
    #[serde(rename = "comment", default)]
    comments: Vec<RawComment>,
}

#[derive(Debug, Deserialize)]
struct RawComment {
    #[serde(rename = "@author", default)]
    author: String,
    #[serde(rename = "@created", default)]
    created: String,
    #[serde(rename = "$text", default)]
    text: String,
}

/// Parses a tracker search-request XML document into feed items, in document order.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedItem>> {
    let rss: Rss = quick_xml::de::from_str(xml)?;

    let items = rss
        .channel
        .items
        .into_iter()
        .map(|item| FeedItem {
            title: item.title,
            link: item.link.unwrap_or_default(),
            assignee: item.assignee.map(|a| a.value),
            comments: item
                .comments
                .map(|c| c.comments)
                .unwrap_or_default()
                .into_iter()
                .filter_map(into_comment)
                .collect(),
        })
        .collect();

    Ok(items)
}

fn into_comment(raw: RawComment) -> Option<Comment> {
    let Some(created_at) = parse_created(&raw.created) else {
        tracing::debug!("Dropping comment by {} with unreadable date {:?}", raw.author, raw.created);
        return None;
    };

    Some(Comment {
        author: raw.author,
        created_at,
        text: raw.text,
    })
}

fn parse_created(s: &str) -> Option<DateTime<Utc>> {
    // The tracker uses RFC 2822 (e.g., "Sat, 15 Jun 2024 10:23:45 +0800")
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    None
}
