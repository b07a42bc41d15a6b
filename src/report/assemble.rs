use serde::Serialize;

use crate::models::{Comment, FeedItem};

use super::criteria::{KeywordSet, QualificationCriteria};
use super::extract::{format_date, strip_title_tags, DatePattern};
use super::keywords::match_keywords;
use super::qualify::qualify;

/// What labels an issue in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DisplayText {
    /// Keywords found in the bracket text, shown highlighted.
    Matched(Vec<String>),
    /// No keyword matched (or none were set); the bracket text itself.
    Bracket(String),
}

impl DisplayText {
    fn new(matched: Vec<String>, bracket: &str) -> Self {
        if matched.is_empty() {
            DisplayText::Bracket(bracket.to_string())
        } else {
            DisplayText::Matched(matched)
        }
    }

    pub fn plain(&self) -> String {
        match self {
            DisplayText::Matched(keywords) => keywords.join(", "),
            DisplayText::Bracket(text) => text.clone(),
        }
    }
}

/// Two summary lines: "<display>: <title>" and "<link> - <assignee>".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryEntry {
    pub display: DisplayText,
    /// Title with `[...]` tags removed.
    pub title: String,
    pub link: String,
    pub assignee: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailBlock {
    pub display: DisplayText,
    pub title: String,
    pub assignee: String,
    pub link: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    /// `YYYY/MM/DD` of the night run being reported.
    pub date: String,
    pub summary: Vec<SummaryEntry>,
    pub details: Vec<DetailBlock>,
}

/// Everything the report region can show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "page", rename_all = "snake_case")]
pub enum Page {
    Report(Report),
    /// The feed loaded but had no items, usually because the session expired.
    NoIssues,
    LoadFailed { message: String },
}

/// An item that made it through qualification, marker lookup and keywords.
struct Visible<'a> {
    item: &'a FeedItem,
    comment: &'a Comment,
    display: DisplayText,
}

fn visible<'a>(
    item: &'a FeedItem,
    criteria: &QualificationCriteria,
    pattern: &DatePattern,
    keywords: &KeywordSet,
) -> Option<Visible<'a>> {
    let comment = qualify(item, criteria)?;
    let Some(bracket) = pattern.bracket_text(&comment.text) else {
        tracing::debug!("Qualifying comment on {} has no path marker", item.link);
        return None;
    };

    let matched = match_keywords(keywords.as_slice(), bracket);
    if !keywords.is_empty() && matched.is_empty() {
        return None;
    }

    Some(Visible {
        item,
        comment,
        display: DisplayText::new(matched, bracket),
    })
}

/// First date token found, walking items in feed order and each item's
/// qualifying comments newest first.
pub fn discover_date(
    items: &[FeedItem],
    criteria: &QualificationCriteria,
    pattern: &DatePattern,
) -> Option<String> {
    items.iter().find_map(|item| {
        item.comments_newest_first()
            .filter(|comment| criteria.accepts(comment))
            .find_map(|comment| pattern.extract_date(&comment.text))
    })
}

pub fn assemble(
    items: &[FeedItem],
    criteria: &QualificationCriteria,
    pattern: &DatePattern,
    keywords: &KeywordSet,
) -> Report {
    let date = discover_date(items, criteria, pattern).unwrap_or_else(|| format_date(criteria.today));

    let summary: Vec<SummaryEntry> = items
        .iter()
        .filter_map(|item| visible(item, criteria, pattern, keywords))
        .map(|v| SummaryEntry {
            title: strip_title_tags(v.item.title.as_deref().unwrap_or_default()),
            link: v.item.link.clone(),
            assignee: v.item.assignee_or_unassigned().to_string(),
            display: v.display,
        })
        .collect();

    let details: Vec<DetailBlock> = items
        .iter()
        .filter_map(|item| visible(item, criteria, pattern, keywords))
        .map(|v| DetailBlock {
            title: v
                .item
                .title
                .clone()
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "No title".to_string()),
            assignee: v.item.assignee_or_unassigned().to_string(),
            link: v.item.link.clone(),
            body: pattern.processed_body(&v.comment.text).unwrap_or_default(),
            display: v.display,
        })
        .collect();

    tracing::debug!(
        "Assembled report for {} with {} of {} issues",
        date,
        details.len(),
        items.len()
    );

    Report {
        date,
        summary,
        details,
    }
}

/// The page for a freshly loaded snapshot.
pub fn page_for(
    items: &[FeedItem],
    criteria: &QualificationCriteria,
    pattern: &DatePattern,
    keywords: &KeywordSet,
) -> Page {
    if items.is_empty() {
        Page::NoIssues
    } else {
        Page::Report(assemble(items, criteria, pattern, keywords))
    }
}
