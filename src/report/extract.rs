use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Deserialize;

use crate::error::Result;

static TITLE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]").expect("title tag pattern is valid"));

/// Where night-run logs live on the share, as it appears inside comment text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PathPattern {
    /// Literal start of the embedded share path.
    pub marker: String,
    pub log_root: String,
    pub year_folder: String,
}

impl Default for PathPattern {
    fn default() -> Self {
        Self {
            marker: r"\172.22.48.92\".to_string(),
            log_root: "Demo_stress_Test_log".to_string(),
            year_folder: "2024".to_string(),
        }
    }
}

/// A compiled [`PathPattern`].
#[derive(Debug, Clone)]
pub struct DatePattern {
    marker: String,
    date_token: Regex,
}

impl DatePattern {
    pub fn compile(pattern: &PathPattern) -> Result<Self> {
        let date_token = Regex::new(&format!(
            r"{}\\{}\\([0-9]{{8}})",
            regex::escape(&pattern.log_root),
            regex::escape(&pattern.year_folder),
        ))?;

        Ok(Self {
            marker: pattern.marker.clone(),
            date_token,
        })
    }

    pub fn find_marker(&self, text: &str) -> Option<usize> {
        text.find(&self.marker)
    }

    /// `YYYY/MM/DD` from the first `<log_root>\<year>\YYYYMMDD` after the marker.
    pub fn extract_date(&self, text: &str) -> Option<String> {
        let start = self.find_marker(text)?;
        let captures = self.date_token.captures(&text[start..])?;
        let digits = captures.get(1)?.as_str();

        Some(format!(
            "{}/{}/{}",
            &digits[0..4],
            &digits[4..6],
            &digits[6..8]
        ))
    }

    /// Text before the marker, trimmed. `None` when the marker is missing.
    pub fn bracket_text<'a>(&self, text: &'a str) -> Option<&'a str> {
        self.find_marker(text).map(|start| text[..start].trim())
    }

    /// Comment body from the marker on: trimmed non-blank lines, cut before
    /// the first line mentioning an image.
    pub fn processed_body(&self, text: &str) -> Option<String> {
        let start = self.find_marker(text)?;
        let lines: Vec<&str> = text[start..]
            .split('\n')
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let end = lines
            .iter()
            .position(|line| line.to_lowercase().contains("image"))
            .unwrap_or(lines.len());

        Some(lines[..end].join("\n"))
    }
}

/// Removes every `[...]` segment, e.g. issue keys and component tags.
pub fn strip_title_tags(title: &str) -> String {
    TITLE_TAG.replace_all(title, "").trim().to_string()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y/%m/%d").to_string()
}
