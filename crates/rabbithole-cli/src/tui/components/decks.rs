//! Starter decks shown before the first search.

use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
};

use crate::tui::app::App;

/// Render one card per deck, the highlighted deck in yellow.
pub fn render(app: &App, frame: &mut Frame, area: Rect) {
    let outer = Block::default()
        .title(" Choose a path ")
        .title_bottom(Line::from(" [↑/↓] choose  [Tab] take question ").centered())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    if app.starters.is_empty() {
        return;
    }

    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .margin(1)
        .constraints(vec![Constraint::Ratio(1, app.starters.len() as u32); app.starters.len()])
        .split(inner);

    for (i, (deck, card)) in app.starters.iter().zip(cards.iter()).enumerate() {
        let selected = i == app.starter_selected;
        let border = if selected {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let question = Paragraph::new(vec![
            Line::from(""),
            Line::styled(
                deck.question(),
                Style::default()
                    .fg(if selected { Color::White } else { Color::Gray })
                    .add_modifier(Modifier::ITALIC),
            ),
        ])
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(format!(" {} ", deck.title))
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(border),
        );
        frame.render_widget(question, *card);
    }
}
