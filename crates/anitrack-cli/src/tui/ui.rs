//! UI rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use anitrack_core::{SessionState, WatchlistPhase};

use super::app::{ActivePane, App, CatalogView};

/// Main UI rendering function
pub fn draw(frame: &mut Frame, app: &App) {
    // Header, panes, status bar
    let outer_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let pane_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(outer_chunks[1]);

    draw_header(frame, app, outer_chunks[0]);
    draw_catalog_pane(frame, app, pane_chunks[0]);
    draw_watchlist_pane(frame, app, pane_chunks[1]);
    draw_status_bar(frame, app, outer_chunks[2]);

    if app.show_help {
        draw_help_overlay(frame);
    }

    if let Some(message) = &app.modal {
        draw_modal(frame, message);
    }
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let session_style = match app.watchlist.session {
        SessionState::LoggedIn => Style::default().fg(Color::Green),
        SessionState::LoggingIn | SessionState::LoggingOut => Style::default().fg(Color::Yellow),
        SessionState::LoggedOut => Style::default().add_modifier(Modifier::DIM),
    };

    let line = Line::from(vec![
        Span::styled("AniTrack", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(app.session_label(), session_style),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

fn pane_block(title: String, is_active: bool) -> Block<'static> {
    let border_style = if is_active {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style)
}

fn highlight_style(is_active: bool) -> Style {
    if is_active {
        Style::default()
            .add_modifier(Modifier::BOLD)
            .add_modifier(Modifier::REVERSED)
    } else {
        Style::default().add_modifier(Modifier::REVERSED)
    }
}

fn placeholder(frame: &mut Frame, block: Block<'static>, area: Rect, text: &str) {
    let paragraph = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            text.to_string(),
            Style::default().add_modifier(Modifier::DIM),
        )),
    ])
    .block(block)
    .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

/// Draw the top anime pane (left)
fn draw_catalog_pane(frame: &mut Frame, app: &App, area: Rect) {
    let is_active = app.active_pane == ActivePane::Catalog;

    let items = match &app.catalog {
        CatalogView::Loading => {
            let block = pane_block(" Top Anime ".to_string(), is_active);
            placeholder(frame, block, area, "Loading...");
            return;
        }
        CatalogView::Failed => {
            let block = pane_block(" Top Anime ".to_string(), is_active);
            placeholder(frame, block, area, "Failed to load anime list");
            return;
        }
        CatalogView::Loaded(items) => items,
    };

    let max_len = area.width.saturating_sub(16) as usize;
    let rows: Vec<ListItem> = items
        .iter()
        .enumerate()
        .map(|(pos, item)| {
            let rank = item.rank.unwrap_or(pos as u32 + 1);
            let score = item
                .score
                .map(|s| format!("{:.2}", s))
                .unwrap_or_default();

            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:>3}. ", rank),
                    Style::default().add_modifier(Modifier::DIM),
                ),
                Span::raw(clip(&item.title, max_len)),
                Span::styled(format!("  {}", score), Style::default().fg(Color::Yellow)),
            ]))
        })
        .collect();

    let title = if app.refreshing {
        format!(" Top Anime ({}) ↻ ", items.len())
    } else {
        format!(" Top Anime ({}) ", items.len())
    };

    let list = List::new(rows)
        .block(pane_block(title, is_active))
        .highlight_style(highlight_style(is_active));

    let mut state = ListState::default();
    if !items.is_empty() {
        state.select(Some(app.catalog_index));
    }

    frame.render_stateful_widget(list, area, &mut state);
}

/// Draw the watchlist pane (right)
fn draw_watchlist_pane(frame: &mut Frame, app: &App, area: Rect) {
    let is_active = app.active_pane == ActivePane::Watchlist;
    let entries = &app.watchlist.entries;

    if !app.is_signed_in() {
        let block = pane_block(" My Watchlist ".to_string(), is_active);
        placeholder(frame, block, area, "Press L to log in and track anime");
        return;
    }

    if entries.is_empty() {
        let block = pane_block(" My Watchlist ".to_string(), is_active);
        let text = match (&app.watchlist.last_error, app.watchlist.phase) {
            (Some(error), _) => error.as_str(),
            (None, WatchlistPhase::Loading) => "Loading...",
            (None, _) => "Your watchlist is empty. Press a on an anime to add it.",
        };
        placeholder(frame, block, area, text);
        return;
    }

    let max_len = area.width.saturating_sub(4) as usize;
    let rows: Vec<ListItem> = entries
        .iter()
        .map(|entry| {
            let title = Line::from(Span::raw(clip(&entry.title, max_len)));
            let meta = Line::from(Span::styled(
                format!("mal {}", entry.mal_id),
                Style::default().add_modifier(Modifier::DIM),
            ));
            ListItem::new(vec![title, meta])
        })
        .collect();

    let title = if app.watchlist_loading() {
        format!(" My Watchlist ({}) ↻ ", entries.len())
    } else {
        format!(" My Watchlist ({}) ", entries.len())
    };

    let list = List::new(rows)
        .block(pane_block(title, is_active))
        .highlight_style(highlight_style(is_active));

    let mut state = ListState::default();
    state.select(Some(app.watchlist_index));

    frame.render_stateful_widget(list, area, &mut state);
}

/// Draw the status bar at the bottom
fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let content = match &app.status_message {
        Some(msg) => msg.clone(),
        None => "a:add  d:remove  L:login  O:logout  r:refresh  o:open  ?:help  q:quit".to_string(),
    };

    let paragraph = Paragraph::new(content).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(4));
    let x = (area.width.saturating_sub(width)) / 2;
    let y = (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Draw a blocking message
fn draw_modal(frame: &mut Frame, message: &str) {
    let popup_area = centered(frame.area(), 44, 7);
    frame.render_widget(Clear, popup_area);

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            message.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key to continue",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];

    let block = Block::default()
        .title(" Notice ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(ratatui::layout::Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, popup_area);
}

/// Draw help overlay
fn draw_help_overlay(frame: &mut Frame) {
    let popup_area = centered(frame.area(), 46, 18);
    frame.render_widget(Clear, popup_area);

    let help_text = vec![
        Line::from(vec![Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from("Navigation:"),
        Line::from("  j/k, ↑/↓    Move up/down"),
        Line::from("  Tab         Switch pane"),
        Line::from(""),
        Line::from("Watchlist:"),
        Line::from("  a           Add selected anime"),
        Line::from("  d           Remove selected entry"),
        Line::from("  L / O       Log in / Log out"),
        Line::from(""),
        Line::from("  r           Refresh top anime"),
        Line::from("  o           Open page in browser"),
        Line::from("  q           Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().add_modifier(Modifier::BOLD));

    let paragraph = Paragraph::new(help_text).block(block);
    frame.render_widget(paragraph, popup_area);
}

/// Clip to `max` characters with an ellipsis
fn clip(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anitrack_core::{CatalogItem, Identity, Notification, WatchlistEntry, WatchlistState};
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    fn render(app: &App) -> String {
        let backend = TestBackend::new(80, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();

        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_clip() {
        assert_eq!(clip("Naruto", 10), "Naruto");
        assert_eq!(clip("Fullmetal Alchemist", 6), "Fullm…");
    }

    #[test]
    fn test_logged_out_view() {
        let app = App::new(WatchlistState::new().snapshot());
        let screen = render(&app);

        assert!(screen.contains("Not signed in"));
        assert!(screen.contains("Press L to log in"));
        assert!(screen.contains("Loading..."));
    }

    #[test]
    fn test_catalog_and_watchlist_rendered() {
        let mut state = WatchlistState::new();
        state.set_identity(Some(Identity::new("U1", "Alice")));
        state.replace_entries(vec![WatchlistEntry {
            id: "doc1".to_string(),
            mal_id: 269,
            title: "Bleach".to_string(),
            image_url: String::new(),
        }]);

        let mut app = App::new(state.snapshot());
        app.set_catalog(Ok(Arc::new(vec![CatalogItem::new(20, "Naruto", "")])));
        let screen = render(&app);

        assert!(screen.contains("Signed in as Alice"));
        assert!(screen.contains("Naruto"));
        assert!(screen.contains("Bleach"));
    }

    #[test]
    fn test_catalog_failure_message() {
        let mut app = App::new(WatchlistState::new().snapshot());
        app.set_catalog(Err(anitrack_core::CatalogError::Status(500)));

        assert!(render(&app).contains("Failed to load anime list"));
    }

    #[test]
    fn test_modal_rendered() {
        let mut app = App::new(WatchlistState::new().snapshot());
        app.show_notification(Notification::blocking("Please log in to track anime"));

        assert!(render(&app).contains("Please log in to track anime"));
    }
}
