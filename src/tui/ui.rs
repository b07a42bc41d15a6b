use chrono::Local;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::report::{html, DetailBlock, DisplayText, Page, Report};

const KEYWORD_PANEL_HEIGHT: u16 = 8;
const INDENT: &str = "    ";

pub fn draw(frame: &mut Frame, app: &App) {
    let mut constraints = vec![Constraint::Min(5)];
    if app.filter_visible {
        constraints.push(Constraint::Length(KEYWORD_PANEL_HEIGHT));
    }
    constraints.push(Constraint::Length(1));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(frame.area());

    draw_report(frame, app, chunks[0]);
    if app.filter_visible {
        draw_keywords(frame, app, chunks[1]);
    }
    draw_status(frame, app, chunks[chunks.len() - 1]);

    if app.show_help {
        draw_help(frame);
    }
}

fn draw_report(frame: &mut Frame, app: &App, area: Rect) {
    let width = area.width.saturating_sub(2).max(20) as usize;
    let lines = match &app.page {
        None => vec![Line::from(format!("{} Loading issues...", app.spinner()))],
        Some(page) => page_lines(page, width),
    };

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Stress Digest "),
        )
        .wrap(Wrap { trim: false })
        .scroll((app.scroll, 0));
    frame.render_widget(paragraph, area);
}

/// Plain-text rendition of a page for the terminal.
pub fn page_lines(page: &Page, width: usize) -> Vec<Line<'static>> {
    match page {
        Page::Report(report) => report_lines(report, width),
        Page::NoIssues => vec![Line::from(html::NO_ISSUES_MESSAGE)],
        Page::LoadFailed { message } => markup_lines(&html::failure_panel(message), width)
            .into_iter()
            .map(|line| Line::styled(line, Style::default().fg(Color::Red)))
            .collect(),
    }
}

fn report_lines(report: &Report, width: usize) -> Vec<Line<'static>> {
    let heading = Style::default().add_modifier(Modifier::BOLD);
    let mut lines = vec![
        Line::from("Hi all，"),
        Line::from(format!("公版 {} stability night run results:", report.date)),
        Line::default(),
        Line::styled("[壓測結果回報]", heading),
    ];

    for entry in &report.summary {
        let mut first = vec![Span::raw(INDENT)];
        first.extend(display_spans(&entry.display));
        first.push(Span::raw(format!(": {}", entry.title)));
        lines.push(Line::from(first));
        lines.push(Line::from(vec![
            Span::raw(INDENT),
            Span::styled(entry.link.clone(), Style::default().fg(Color::Cyan)),
            Span::raw(format!(" - {}", entry.assignee)),
        ]));
        lines.push(Line::default());
    }

    lines.push(Line::styled("[壓測詳細分析log]", heading));
    for block in &report.details {
        lines.extend(detail_lines(block, width));
    }

    lines.extend(markup_lines(&html::footer(), width).into_iter().map(Line::from));
    lines
}

fn detail_lines(block: &DetailBlock, width: usize) -> Vec<Line<'static>> {
    let mut title = vec![Span::raw(INDENT)];
    title.extend(display_spans(&block.display));
    title.push(Span::raw("的jira題目"));

    let mut lines = vec![
        Line::from(title),
        Line::from(format!("{INDENT}{} - {}", block.title, block.assignee)),
        Line::from(vec![
            Span::raw(INDENT),
            Span::styled(block.link.clone(), Style::default().fg(Color::Cyan)),
        ]),
    ];

    // Bodies are tracker markup; keep their line structure through the conversion
    let body = block.body.replace('\n', "<br>");
    let options = textwrap::Options::new(width.saturating_sub(INDENT.len() * 2).max(10))
        .initial_indent(INDENT)
        .subsequent_indent(INDENT);
    for line in markup_lines(&body, width) {
        for wrapped in textwrap::wrap(&line, &options) {
            lines.push(Line::styled(
                wrapped.into_owned(),
                Style::default().fg(Color::Gray),
            ));
        }
    }

    lines.push(Line::default());
    lines
}

fn display_spans(display: &DisplayText) -> Vec<Span<'static>> {
    match display {
        DisplayText::Matched(_) => vec![Span::styled(
            display.plain(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )],
        DisplayText::Bracket(text) => vec![Span::raw(text.clone())],
    }
}

/// Converts markup to plain text lines, falling back to the raw text.
fn markup_lines(markup: &str, width: usize) -> Vec<String> {
    let text = html2text::from_read(markup.as_bytes(), width.max(20))
        .unwrap_or_else(|_| markup.to_string());
    text.lines().map(str::to_string).collect()
}

fn draw_keywords(frame: &mut Frame, app: &App, area: Rect) {
    let title = if app.keyword_editing {
        " Keywords, one per line (Esc to finish) "
    } else {
        " Keywords, one per line (e to edit) "
    };
    let border_style = if app.keyword_editing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let paragraph = Paragraph::new(app.keyword_text.clone()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title),
    );
    frame.render_widget(paragraph, area);

    if app.keyword_editing {
        let text_lines: Vec<&str> = app.keyword_text.split('\n').collect();
        let row = (text_lines.len() as u16).saturating_sub(1);
        let col = text_lines
            .last()
            .map(|line| Line::from(*line).width() as u16)
            .unwrap_or(0);
        let max_x = area.x + area.width.saturating_sub(2);
        let max_y = area.y + area.height.saturating_sub(2);
        frame.set_cursor_position(((area.x + 1 + col).min(max_x), (area.y + 1 + row).min(max_y)));
    }
}

fn draw_status(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = Vec::new();
    if app.is_loading() {
        spans.push(Span::styled(
            format!("{} Loading ", app.spinner()),
            Style::default().fg(Color::Yellow),
        ));
    }
    if let Some(message) = &app.status_message {
        spans.push(Span::styled(
            format!("{message} "),
            Style::default().fg(Color::Green),
        ));
    }
    if let Some(record) = &app.last_refresh {
        spans.push(Span::raw(format!(
            "Last check {} ({} issues) ",
            record.last_update.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            record.items_count
        )));
    }
    spans.push(Span::styled(
        "? help",
        Style::default().fg(Color::DarkGray),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_help(frame: &mut Frame) {
    let area = centered_rect(50, 60, frame.area());
    let help = vec![
        Line::styled("Keys", Style::default().add_modifier(Modifier::BOLD)),
        Line::default(),
        Line::from("j / k, arrows   scroll"),
        Line::from("PgUp / PgDn     page"),
        Line::from("<               top"),
        Line::from("r               reload feed"),
        Line::from("f               show/hide keyword panel"),
        Line::from("e               edit keywords"),
        Line::from("w               export HTML and open it"),
        Line::from("q / Ctrl-C      quit"),
    ];

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(help).block(Block::default().borders(Borders::ALL).title(" Help ")),
        area,
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
