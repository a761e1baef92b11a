//! UI rendering for the TUI.

use ratatui::{
    prelude::*,
    widgets::Paragraph,
};

use super::app::{App, InputMode, SelectedTab};
use super::components::{decks, detail, input, map, outline, sources, tabs};

/// Render the entire UI.
pub fn render(app: &App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: tabs, content, input, status
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Tab bar
            Constraint::Min(10),    // Main content
            Constraint::Length(3),  // Input
            Constraint::Length(1),  // Status bar
        ])
        .split(area);

    tabs::render(app, frame, chunks[0]);
    render_main_content(app, frame, chunks[1]);
    input::render(app, frame, chunks[2]);
    render_status_bar(app, frame, chunks[3]);
}

/// Render the outline and the selected view side by side.
fn render_main_content(app: &App, frame: &mut Frame, area: Rect) {
    if app.on_landing() && !app.graph.is_busy() {
        decks::render(app, frame, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(35),  // Outline
            Constraint::Percentage(65),  // Detail
        ])
        .split(area);

    outline::render(app, frame, chunks[0]);

    match app.selected_tab {
        SelectedTab::Answer => detail::render(app, frame, chunks[1]),
        SelectedTab::Sources => sources::render(app, frame, chunks[1]),
        SelectedTab::Map => map::render(app, frame, chunks[1]),
    }
}

/// Render the status bar.
fn render_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let mode_str = match app.input_mode {
        InputMode::Normal => "[/] Search  [Enter] Expand  [x] Cancel  [Tab] View  [f] Mode  [q] Quit",
        InputMode::Editing => "[Enter] Search  [Esc] Cancel",
    };

    let mut status = mode_str.to_string();
    if app.selected_is_loading() {
        status.push_str("  |  [x] cancels this answer");
    }
    if let Some(ref message) = app.status_message {
        status.push_str(&format!("  |  {}", message));
    }

    let status_bar = Paragraph::new(status)
        .style(Style::default().fg(Color::DarkGray));

    frame.render_widget(status_bar, area);
}
