//! Search box.

use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::tui::app::{App, InputMode};

/// Render the search box; long queries scroll so the cursor stays visible.
pub fn render(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;

    let title = match app.graph.concept() {
        Some(concept) => format!(" Ask · about {concept} "),
        None => " Ask ".to_string(),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(if editing { Color::Yellow } else { Color::DarkGray }));
    let inner = block.inner(area);

    let line = if !app.input_buffer.is_empty() {
        let (visible, cursor) = visible_tail(&app.input_buffer, inner.width.saturating_sub(1));
        if editing {
            frame.set_cursor_position(Position::new(inner.x + cursor, inner.y));
        }
        Line::styled(
            visible,
            Style::default().fg(if editing { Color::White } else { Color::DarkGray }),
        )
    } else {
        if editing {
            frame.set_cursor_position(Position::new(inner.x, inner.y));
        }
        placeholder(app)
    };

    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn placeholder(app: &App) -> Line<'static> {
    let hint = Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC);
    match (app.input_mode, app.on_landing()) {
        (InputMode::Editing, true) => {
            let question = app
                .starters
                .get(app.starter_selected)
                .map(|deck| deck.question())
                .unwrap_or_default();
            Line::from(vec![
                Span::styled("[Tab] ", Style::default().fg(Color::Cyan)),
                Span::styled(question, hint),
            ])
        }
        (InputMode::Editing, false) => Line::styled("Ask your question...", hint),
        (InputMode::Normal, _) => Line::styled("Press '/' to start a new rabbit hole", hint),
    }
}

/// The last `width` characters of `text` and the cursor column after them.
fn visible_tail(text: &str, width: u16) -> (String, u16) {
    let count = text.chars().count();
    let width = usize::from(width);
    let skip = count.saturating_sub(width);
    let visible: String = text.chars().skip(skip).collect();
    let cursor = u16::try_from(count - skip).unwrap_or(u16::MAX);
    (visible, cursor)
}
