// View rendering for the content area.
// Provides the feed list, item summaries, item detail, and dashboard, plus loading and error states.

use ratatui::{prelude::*, widgets::*};

use crate::api::{Feed, Item};
use crate::state::View;

use super::relative::relative_time;

/// Authors longer than this are cut off.
const MAX_AUTHORS: usize = 32;

/// Render a loading indicator.
pub fn render_loading(frame: &mut Frame, area: Rect, message: &str) {
    let text = Paragraph::new(format!("⏳ {}...", message))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Yellow));
    frame.render_widget(text, area);
}

/// Render an error message.
pub fn render_error(frame: &mut Frame, area: Rect, error: &str) {
    let text = Paragraph::new(format!("❌ {}", error))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Red))
        .wrap(Wrap { trim: true });
    frame.render_widget(text, area);
}

/// Render an empty state message.
pub fn render_empty(frame: &mut Frame, area: Rect, message: &str) {
    let text = Paragraph::new(message)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(text, area);
}

/// "Blog · by Jane Doe · 3 hours ago"
pub fn item_details(item: &Item, now: i64) -> String {
    let mut details = vec![item.feed_name.clone()];
    if !item.authors.is_empty() {
        let authors = if item.authors.chars().count() > MAX_AUTHORS {
            let cut: String = item.authors.chars().take(MAX_AUTHORS).collect();
            format!("{cut}...")
        } else {
            item.authors.clone()
        };
        details.push(format!("by {authors}"));
    }
    details.push(relative_time(item.timestamp, now));
    details.join(" · ")
}

/// Strip markup from item content for terminal display.
pub fn plain_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut tag = String::new();
    let mut in_tag = false;

    for c in html.chars() {
        match (in_tag, c) {
            (false, '<') => {
                in_tag = true;
                tag.clear();
            }
            (true, '>') => {
                in_tag = false;
                let name = tag
                    .trim_start_matches('/')
                    .split(|c: char| c.is_whitespace() || c == '/')
                    .next()
                    .unwrap_or("")
                    .to_ascii_lowercase();
                if matches!(name.as_str(), "p" | "br" | "div" | "li" | "h1" | "h2" | "h3" | "h4" | "tr")
                    && !out.ends_with('\n')
                {
                    out.push('\n');
                }
            }
            (true, c) => tag.push(c),
            (false, c) => out.push(c),
        }
    }

    out.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}

fn selectable_list<'a>(items: Vec<ListItem<'a>>, title: String) -> List<'a> {
    List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ")
}

/// Render whatever the router last produced.
pub fn draw_view(
    frame: &mut Frame,
    view: &View,
    list_state: &mut ListState,
    scroll: u16,
    now: i64,
    area: Rect,
) {
    match view {
        View::Loading => render_loading(frame, area, "Loading"),
        View::Error(message) => render_error(frame, area, message),
        View::FeedList { feeds, status_link } => {
            render_feed_list(frame, feeds, *status_link, list_state, area)
        }
        View::Feed(feed) => render_item_summaries(frame, feed, list_state, now, area),
        View::Item(item) => render_item(frame, item, scroll, now, area),
        #[cfg(feature = "status-dashboard")]
        View::Dashboard(rows) => render_dashboard(frame, rows, list_state, now, area),
    }
}

fn render_feed_list(
    frame: &mut Frame,
    feeds: &[Feed],
    status_link: bool,
    list_state: &mut ListState,
    area: Rect,
) {
    if feeds.is_empty() && !status_link {
        render_empty(frame, area, "No feeds");
        return;
    }

    let mut items: Vec<ListItem> = feeds
        .iter()
        .map(|feed| {
            let unread = feed.unread_count();
            if unread == 0 {
                // Fully read feeds are dimmed
                ListItem::new(Span::styled(
                    feed.name.clone(),
                    Style::default().fg(Color::DarkGray),
                ))
            } else {
                ListItem::new(Line::from(vec![
                    Span::styled(feed.name.clone(), Style::default().fg(Color::White)),
                    Span::styled(format!("  {}", unread), Style::default().fg(Color::Cyan)),
                ]))
            }
        })
        .collect();

    if status_link {
        items.push(ListItem::new(Span::styled(
            "Status",
            Style::default().fg(Color::Magenta),
        )));
    }

    let list = selectable_list(items, format!(" Feeds ({}) ", feeds.len()));
    frame.render_stateful_widget(list, area, list_state);
}

fn render_item_summaries(
    frame: &mut Frame,
    feed: &Feed,
    list_state: &mut ListState,
    now: i64,
    area: Rect,
) {
    let title = format!(" {} ", feed.name);
    if feed.items.is_empty() {
        let block = Block::default().borders(Borders::ALL).title(title);
        let text = Paragraph::new("No items")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(text, area);
        return;
    }

    let items: Vec<ListItem> = feed
        .items
        .iter()
        .map(|item| {
            let title_style = if item.read {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(vec![
                Line::from(Span::styled(item.title.clone(), title_style)),
                Line::from(Span::styled(
                    format!("  {}", item_details(item, now)),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    frame.render_stateful_widget(selectable_list(items, title), area, list_state);
}

fn render_item(frame: &mut Frame, item: &Item, scroll: u16, now: i64, area: Rect) {
    let mut lines = vec![
        Line::from(Span::styled(
            item.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            item_details(item, now),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
    ];
    lines.extend(plain_text(&item.content).lines().map(|line| Line::from(line.to_string())));

    let text = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(text, area);
}

#[cfg(feature = "status-dashboard")]
fn render_dashboard(
    frame: &mut Frame,
    rows: &[crate::state::FeedHealth],
    list_state: &mut ListState,
    now: i64,
    area: Rect,
) {
    use crate::state::Health;

    if rows.is_empty() {
        render_empty(frame, area, "No feeds");
        return;
    }

    let label = |text: &'static str| Span::styled(format!("    {:<12}", text), Style::default().fg(Color::DarkGray));

    let items: Vec<ListItem> = rows
        .iter()
        .map(|row| {
            let feed = &row.feed;
            let color = match row.health {
                Health::Red => Color::Red,
                Health::Yellow => Color::Yellow,
                Health::Green => Color::Green,
            };

            let mut lines = vec![
                Line::from(vec![
                    Span::styled(format!("{} ", row.health.symbol()), Style::default().fg(color)),
                    Span::styled(feed.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
                    Span::styled(format!("  {}", row.health.label()), Style::default().fg(color)),
                ]),
                Line::from(vec![label("URL"), Span::raw(feed.url.clone())]),
                Line::from(vec![
                    label("Items"),
                    Span::raw(format!(
                        "{} total, {} unread",
                        feed.item_count,
                        feed.unread_count()
                    )),
                ]),
            ];
            if feed.last_updated != 0 {
                lines.push(Line::from(vec![
                    label("Last update"),
                    Span::raw(relative_time(feed.last_updated, now)),
                ]));
            }
            if feed.last_item != 0 {
                lines.push(Line::from(vec![
                    label("Last item"),
                    Span::raw(relative_time(feed.last_item, now)),
                ]));
            }
            if !feed.last_error.is_empty() {
                lines.push(Line::from(vec![
                    label("Error"),
                    Span::styled(feed.last_error.clone(), Style::default().fg(Color::Red)),
                ]));
            }
            ListItem::new(lines)
        })
        .collect();

    frame.render_stateful_widget(selectable_list(items, " Status ".to_string()), area, list_state);
}
