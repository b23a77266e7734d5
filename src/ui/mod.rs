// UI module for rendering the TUI.
// Contains widgets for breadcrumbs, views, the location prompt, and the help overlay.

mod breadcrumb;
mod list;
mod modal;
pub mod relative;

use chrono::{TimeDelta, Utc};
use ratatui::{prelude::*, widgets::*};

use crate::app::{App, ScreenState};
use crate::state::{NoticeLevel, View};

pub use list::item_details;
pub use relative::relative_time;

/// How long a notice stays in the status bar.
const NOTICE_SECS: i64 = 8;

/// Main draw function that renders the entire UI.
pub fn draw(frame: &mut Frame, app: &mut App, screen: &ScreenState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Breadcrumb
            Constraint::Min(1),    // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    let location = app.location();
    breadcrumb::draw_controls(
        frame,
        screen.controls.as_ref(),
        &location.to_string(),
        screen.rendered_at,
        chunks[0],
    );

    let now = app.now();
    list::draw_view(frame, &screen.view, &mut app.list_state, app.scroll, now, chunks[1]);

    draw_status_bar(frame, screen, chunks[2]);

    // Overlays are rendered last, on top of everything
    if app.show_help {
        draw_help_overlay(frame);
    }
    if let Some(input) = &app.location_input {
        modal::draw_location_modal(frame, input);
    }
}

/// Draw the status bar: the latest notice while it is fresh, keybinding hints otherwise.
fn draw_status_bar(frame: &mut Frame, screen: &ScreenState, area: Rect) {
    let recent = screen
        .notices
        .last()
        .filter(|notice| Utc::now() - notice.timestamp < TimeDelta::seconds(NOTICE_SECS));

    if let Some(notice) = recent {
        let color = match notice.level {
            NoticeLevel::Info => Color::Cyan,
            NoticeLevel::Warn => Color::Yellow,
        };
        let line = Line::from(Span::styled(format!(" {}", notice.message), Style::default().fg(color)));
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let mut hints = vec![
        Span::raw(" ↑↓ "),
        Span::styled("Navigate", Style::default().fg(Color::DarkGray)),
        Span::raw("  ↵ "),
        Span::styled("Open", Style::default().fg(Color::DarkGray)),
        Span::raw("  Esc "),
        Span::styled("Back", Style::default().fg(Color::DarkGray)),
    ];
    let controls = screen.controls.as_ref();
    if controls.is_some_and(|c| c.read_button) {
        hints.push(Span::raw("  m "));
        hints.push(Span::styled("Mark read", Style::default().fg(Color::DarkGray)));
    }
    if controls.is_some_and(|c| c.open_button.is_some()) {
        hints.push(Span::raw("  o "));
        hints.push(Span::styled("Link", Style::default().fg(Color::DarkGray)));
    }
    hints.extend([
        Span::raw("  r "),
        Span::styled("Refresh", Style::default().fg(Color::DarkGray)),
        Span::raw("  g "),
        Span::styled("Go to", Style::default().fg(Color::DarkGray)),
        Span::raw("  ? "),
        Span::styled("Help", Style::default().fg(Color::DarkGray)),
        Span::raw("  q "),
        Span::styled("Quit", Style::default().fg(Color::DarkGray)),
    ]);

    if screen.view == View::Loading {
        hints.push(Span::styled("  loading…", Style::default().fg(Color::Yellow)));
    }

    frame.render_widget(Paragraph::new(Line::from(hints)), area);
}

/// Draw the help overlay.
fn draw_help_overlay(frame: &mut Frame) {
    let area = frame.area();

    // Create a centered popup
    let popup_width = 50;
    let popup_height = 17;
    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height).intersection(area);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let key = |keys: &'static str, action: &'static str| {
        Line::from(vec![
            Span::styled(keys, Style::default().fg(Color::Cyan)),
            Span::raw(action),
        ])
    };

    let help_text = vec![
        Line::from(vec![Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        key("  ↑/↓ or j/k    ", "Move selection / scroll item"),
        key("  PgUp/PgDn     ", "Scroll item"),
        key("  Enter or l    ", "Open feed or item"),
        key("  Esc or h      ", "Go back"),
        key("  m             ", "Mark all as read"),
        key("  o             ", "Show item link"),
        key("  r             ", "Reload without cache"),
        key("  g             ", "Go to location (#token:...)"),
        key("  ?             ", "Show/hide this help"),
        key("  q             ", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("Press ", Style::default().fg(Color::DarkGray)),
            Span::styled("Esc", Style::default().fg(Color::Yellow)),
            Span::styled(" or ", Style::default().fg(Color::DarkGray)),
            Span::styled("?", Style::default().fg(Color::Yellow)),
            Span::styled(" to close", Style::default().fg(Color::DarkGray)),
        ]),
    ];

    let help_paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Help ")
                .title_style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
        )
        .alignment(Alignment::Left);

    frame.render_widget(help_paragraph, popup_area);
}
