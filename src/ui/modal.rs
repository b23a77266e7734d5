// Modal UI components.
// Prompt for typing a location to jump to.

use ratatui::{prelude::*, widgets::*};

/// Draw the location prompt on top of the current view.
pub fn draw_location_modal(frame: &mut Frame, input: &str) {
    let area = frame.area();

    // Create centered modal
    let modal_width = 60;
    let modal_height = 5;
    let modal_x = (area.width.saturating_sub(modal_width)) / 2;
    let modal_y = (area.height.saturating_sub(modal_height)) / 2;

    let modal_area = Rect::new(modal_x, modal_y, modal_width, modal_height).intersection(area);

    // Clear the area behind the modal
    frame.render_widget(Clear, modal_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title and input
            Constraint::Length(2), // Instructions
        ])
        .split(modal_area);

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Go to ");

    let input_line = Line::from(vec![
        Span::styled("Location: ", Style::default().fg(Color::DarkGray)),
        Span::raw(input),
        Span::styled("█", Style::default().fg(Color::Yellow)),
    ]);

    let input_widget = Paragraph::new(input_line)
        .block(input_block)
        .style(Style::default());
    frame.render_widget(input_widget, chunks[0]);

    let instructions = Line::from(vec![
        Span::styled(" Enter", Style::default().fg(Color::Yellow)),
        Span::styled(" = Go  ", Style::default().fg(Color::DarkGray)),
        Span::styled("#token:...", Style::default().fg(Color::Yellow)),
        Span::styled(" = Login  ", Style::default().fg(Color::DarkGray)),
        Span::styled("Esc", Style::default().fg(Color::Yellow)),
        Span::styled(" = Cancel ", Style::default().fg(Color::DarkGray)),
    ]);

    let instructions_widget = Paragraph::new(instructions)
        .alignment(Alignment::Center)
        .style(Style::default().bg(Color::Black));
    frame.render_widget(instructions_widget, chunks[1]);
}
