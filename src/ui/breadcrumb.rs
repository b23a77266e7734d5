// Breadcrumb rendering for the controls row.
// Shows the trail to the current view, the location, and when it was last refreshed.

use chrono::{DateTime, Utc};
use ratatui::{prelude::*, widgets::*};

use crate::state::Controls;

/// Format timestamp for display as local wall-clock time.
fn format_timestamp(dt: &DateTime<Utc>) -> String {
    let local: DateTime<chrono::Local> = dt.with_timezone(&chrono::Local);
    local.format("%H:%M:%S").to_string()
}

/// Render the controls row. `None` hides the trail.
pub fn draw_controls(
    frame: &mut Frame,
    controls: Option<&Controls>,
    location: &str,
    rendered_at: DateTime<Utc>,
    area: Rect,
) {
    let mut spans = vec![Span::raw(" ")];

    let trail = controls
        .and_then(|c| c.breadcrumbs.as_ref())
        .map(|b| b.trail())
        .unwrap_or_default();

    for (i, node) in trail.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" > ", Style::default().fg(Color::DarkGray)));
        }

        let style = if i == trail.len() - 1 {
            // Current level is highlighted
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };

        spans.push(Span::styled(node.label.clone(), style));
    }

    if controls.is_some_and(|c| c.read_button) {
        spans.push(Span::styled("  [m] mark read", Style::default().fg(Color::DarkGray)));
    }
    if controls.is_some_and(|c| c.open_button.is_some()) {
        spans.push(Span::styled("  [o] link", Style::default().fg(Color::DarkGray)));
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(Color::DarkGray));

    let paragraph = Paragraph::new(Line::from(spans))
        .block(block)
        .alignment(Alignment::Left);
    frame.render_widget(paragraph, area);

    // Location and refresh time on the right
    let right = Line::from(vec![
        Span::styled(location.to_string(), Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("  {} ", format_timestamp(&rendered_at)),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(
        Paragraph::new(right).alignment(Alignment::Right),
        Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height: 1,
        },
    );
}
