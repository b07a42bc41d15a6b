//! Markup for the report region.
//!
//! Text from the tracker is inserted as-is; comment bodies are already markup.

use super::assemble::{DetailBlock, DisplayText, Page, Report, SummaryEntry};

const FONT_FAMILY: &str = "'Times New Roman', Times, serif";
const INDENT: &str = r#"<span style="font-size: 10pt;">&nbsp;&nbsp;&nbsp;&nbsp;</span>"#;

pub const NO_ISSUES_MESSAGE: &str = "No issues found. Please make sure you are logged into Jira.";
const SUPPORT_CONTACT: &str = "HelpDesk (#17885)";
const LOGIN_URL: &str = "https://jira.realtek.com";

pub fn render_page(page: &Page) -> String {
    match page {
        Page::Report(report) => render_report(report),
        Page::NoIssues => NO_ISSUES_MESSAGE.to_string(),
        Page::LoadFailed { message } => failure_panel(message),
    }
}

pub fn render_report(report: &Report) -> String {
    let mut html = header(&report.date, &summary_text(&report.summary));
    for block in &report.details {
        html.push_str(&issue_block(block));
    }
    html.push_str(&footer());
    html
}

fn display_markup(display: &DisplayText) -> String {
    match display {
        DisplayText::Matched(keywords) => {
            format!(r#"<span style="color: red;">{}</span>"#, keywords.join(", "))
        }
        DisplayText::Bracket(text) => text.clone(),
    }
}

fn summary_text(entries: &[SummaryEntry]) -> String {
    entries
        .iter()
        .map(|entry| {
            format!(
                r#"{}: {}<br><a href="{link}" target="_blank">{link}</a> - {}<br><br>"#,
                display_markup(&entry.display),
                entry.title,
                entry.assignee,
                link = entry.link,
            )
        })
        .collect()
}

fn header(date: &str, summary_text: &str) -> String {
    let indented = summary_text
        .split("<br>")
        .map(|line| format!("{INDENT}{line}"))
        .collect::<Vec<_>>()
        .join("<br>");

    format!(
        r#"
      <div style="margin-bottom: 20px; font-family: {FONT_FAMILY}; font-size: 10pt;">Hi all，<br>公版 {date} stability night run results:<br><br></div>
      <div style="margin-bottom: 20px; font-family: {FONT_FAMILY}; font-size: 15pt;">[壓測結果回報]</div>
      <div style="margin-bottom: 20px; font-family: {FONT_FAMILY}; font-size: 12pt;">
        {indented}<br>
      </div>
      <div style="margin-bottom: 20px; font-family: {FONT_FAMILY}; font-size: 15pt;">[壓測詳細分析log]</div>
    "#
    )
}

fn issue_block(block: &DetailBlock) -> String {
    let comment_row = if block.body.is_empty() {
        String::new()
    } else {
        format!(r#"<tr><td class="comment">{}</td></tr>"#, block.body)
    };

    format!(
        r#"<div class="issue">
      <div class="bracket-text">{INDENT}{display}的jira題目</div>
      <div class="title">{INDENT}{title} - {assignee}</div>
      <div>{INDENT}<span class="link"><a href="{link}" target="_blank">{link}</a></span></div>
      <table class="comment-table" style="display: inline-block;">
        {comment_row}
      </table>
      <br>
    </div>"#,
        display = display_markup(&block.display),
        title = block.title,
        assignee = block.assignee,
        link = block.link,
    )
}

/// Static closing section: where the logs live and how to reach them.
pub fn footer() -> String {
    format!(
        r#"<div>
      <div style="margin-bottom: 20px; font-family: {FONT_FAMILY}; font-size: 15pt;">[壓測計畫-總表]</div>
      <div style="margin-bottom: 20px; color: red; font-family: {FONT_FAMILY}; font-size: 12pt;">
        Note: 下表反灰項目為keep set.<br><br><br>
      </div>
      <div style="margin-bottom: 20px; font-family: {FONT_FAMILY}; font-size: 12pt;">
        Log 存放位置：\172.22.48.92\nightrun_log\Demo_stress_Test_log\2024<br>
        172.22.48.92 這台是linux sever<br>
        可以用帳號: rtk001 密碼: 123456<br>
        也可以用window 連線
      </div>
    </div>"#
    )
}

/// Shown instead of the report whenever the feed could not be loaded.
pub fn failure_panel(message: &str) -> String {
    format!(
        r#"
      <div style="color: red; padding: 10px;">
        Error: {message}<br><br>
        如需協助，請聯繫：<br>
        - {SUPPORT_CONTACT}<br>
        - <a href="{LOGIN_URL}" target="_blank">登入 JIRA</a>
      </div>
    "#
    )
}
