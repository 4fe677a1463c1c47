//! Terminal UI rendering.
//!
//! Pure drawing: reads [`App`] and the coordinator's read-only snapshot and
//! lays out widgets. No state changes here besides the list's scroll state.
//!
//! ## For contributors
//!
//! * Layout: list on top, optional log pane, one-line status bar at the
//!   bottom. The toast is drawn last, over everything else.
//! * Colours are inline; extract a theme struct if the palette grows.

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};
use tracing::Level;

use livefeed::{FeedItem, LoadingState};

use crate::app::{App, Toast};

const SPINNER: [&str; 4] = ["⠋", "⠙", "⠹", "⠸"];
const LOG_PANE_HEIGHT: u16 = 8;

/// Draw one frame.
pub fn draw(app: &mut App, items: &[FeedItem], title: &str, frame: &mut Frame) {
    let log_height = if app.show_logs { LOG_PANE_HEIGHT } else { 0 };
    let [list_area, log_area, status_area] = Layout::vertical([
        Constraint::Min(1),
        Constraint::Length(log_height),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_feed_list(app, items, title, frame, list_area);
    if app.show_logs {
        draw_log_pane(app, frame, log_area);
    }
    draw_status_bar(app, items.len(), frame, status_area);

    if let Some(toast) = &app.toast {
        draw_toast(toast, frame, list_area);
    }
}

fn draw_feed_list(app: &mut App, items: &[FeedItem], title: &str, frame: &mut Frame, area: Rect) {
    let mut rows: Vec<ListItem> = items
        .iter()
        .map(|item| {
            let date_str = item
                .published
                .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "no date".into());

            ListItem::new(Line::from(vec![
                Span::styled(format!("{date_str:<18}"), Style::default().fg(Color::DarkGray)),
                Span::raw(" "),
                Span::styled(item.title.as_str(), Style::default().fg(Color::White)),
                Span::raw("  "),
                Span::styled(format!("[{}]", item.source_name), Style::default().fg(Color::Cyan)),
            ]))
        })
        .collect();

    if app.reached_end && !items.is_empty() {
        rows.push(ListItem::new(Line::styled(
            "— end of feed —",
            Style::default().fg(Color::DarkGray),
        )));
    } else if app.loading == LoadingState::Loading && !items.is_empty() {
        rows.push(ListItem::new(Line::styled(
            format!("{} loading", spinner(app)),
            Style::default().fg(Color::Yellow),
        )));
    }

    let list = List::new(rows)
        .block(Block::default().title(format!(" {title} ")).borders(Borders::ALL))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn draw_log_pane(app: &App, frame: &mut Frame, area: Rect) {
    let visible = area.height.saturating_sub(2) as usize;
    let lines: Vec<Line> = app
        .logs
        .tail(visible)
        .into_iter()
        .map(|entry| {
            let colour = match entry.level {
                Level::ERROR => Color::Red,
                Level::WARN => Color::Yellow,
                Level::INFO => Color::Green,
                _ => Color::DarkGray,
            };
            Line::from(vec![
                Span::styled(
                    entry.timestamp.format("%H:%M:%S ").to_string(),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(format!("{:<5} ", entry.level), Style::default().fg(colour)),
                Span::raw(entry.message),
            ])
        })
        .collect();

    let pane = Paragraph::new(lines).block(Block::default().title(" Log ").borders(Borders::ALL));
    frame.render_widget(pane, area);
}

fn draw_status_bar(app: &App, count: usize, frame: &mut Frame, area: Rect) {
    let indicator = match app.loading {
        LoadingState::Loading => format!("{} ", spinner(app)),
        _ => String::new(),
    };
    let status = Paragraph::new(Line::from(vec![
        Span::raw(" "),
        Span::styled(format!("{indicator}{}", app.status), Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(format!("{count} items"), Style::default().fg(Color::Green)),
        Span::raw("  q: quit  ↑/↓: scroll  r: refresh  x: dismiss  l: log"),
    ]));
    frame.render_widget(status, area);
}

/// Bottom-right overlay, cleared underneath so it sits on top.
fn draw_toast(toast: &Toast, frame: &mut Frame, area: Rect) {
    let width = (toast.message.chars().count() as u16 + 4).min(area.width.saturating_sub(4));
    let height = 3;
    let x = area.right().saturating_sub(width + 2);
    let y = area.bottom().saturating_sub(height + 1);
    let toast_area = Rect::new(x, y, width, height).intersection(area);

    let text = Paragraph::new(toast.message.as_str())
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::White))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Red)));

    frame.render_widget(Clear, toast_area);
    frame.render_widget(text, toast_area);
}

fn spinner(app: &App) -> &'static str {
    SPINNER[app.frame % SPINNER.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use livefeed::logging::LogBuffer;
    use livefeed::{FailureKind, FeedEvent, Presenter};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn sample_items() -> Vec<FeedItem> {
        vec![
            FeedItem::new("1", "First", "test").with_published(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()),
            FeedItem::new("2", "Second", "test"),
        ]
    }

    fn render(app: &mut App, items: &[FeedItem]) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        terminal.draw(|f| draw(app, items, "Test", f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol().chars().next().unwrap_or(' '))
            .collect()
    }

    #[test]
    fn draws_empty_feed() {
        let mut app = App::new(LogBuffer::new());
        let text = render(&mut app, &[]);
        assert!(text.contains("0 items"));
    }

    #[test]
    fn draws_items_and_count() {
        let items = sample_items();
        let mut app = App::new(LogBuffer::new());
        app.present(FeedEvent::DataUpdated(items.len()));
        app.select_first();

        let text = render(&mut app, &items);
        assert!(text.contains("First"));
        assert!(text.contains("2 items"));
    }

    #[test]
    fn draws_end_marker_and_toast() {
        let items = sample_items();
        let mut app = App::new(LogBuffer::new());
        app.present(FeedEvent::DataUpdated(items.len()));
        app.present(FeedEvent::DidGetMorePosts { has_new_items: false });
        app.present(FeedEvent::OperationFailed(FailureKind::Unknown));

        let text = render(&mut app, &items);
        assert!(text.contains("end of feed"));
        assert!(text.contains("Something went wrong."));
    }

    #[test]
    fn log_pane_shows_recent_entries() {
        let logs = LogBuffer::new();
        logs.push(livefeed::logging::LogEntry {
            timestamp: Utc::now(),
            level: Level::WARN,
            message: "feed request failed".into(),
        });
        let mut app = App::new(logs);
        app.toggle_logs();

        let text = render(&mut app, &[]);
        assert!(text.contains("feed request failed"));
    }
}
