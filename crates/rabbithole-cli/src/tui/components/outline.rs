//! Outline of the exploration graph.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, BorderType, List, ListItem, ListState},
};

use rabbithole_core::explore::{NodeKind, NodeState};

use crate::tui::app::App;

/// Render the node outline.
pub fn render(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .title(format!(" Rabbit hole ({}) ", app.graph.nodes().len()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::DarkGray));

    let items: Vec<ListItem> = app
        .outline()
        .into_iter()
        .map(|(depth, node)| {
            let (icon, icon_style, label_style) = match (node.kind, node.state) {
                (_, NodeState::Loading) => (
                    app.spinner(),
                    Style::default().fg(Color::Yellow),
                    Style::default().fg(Color::Yellow),
                ),
                (NodeKind::Answer, _) => (
                    "●",
                    Style::default().fg(Color::Green),
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                ),
                (NodeKind::Question, _) => (
                    "○",
                    Style::default().fg(Color::DarkGray),
                    Style::default().fg(Color::Gray),
                ),
            };

            let line = Line::from(vec![
                Span::raw("  ".repeat(depth)),
                Span::styled(format!("{} ", icon), icon_style),
                Span::styled(node.label.clone(), label_style),
            ]);

            ListItem::new(line)
        })
        .collect();

    if items.is_empty() {
        let empty = List::new(vec![ListItem::new(Span::styled(
            " Nothing here yet",
            Style::default().fg(Color::DarkGray),
        ))])
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::Rgb(40, 40, 40)))
        .highlight_symbol("▌");

    let mut state = ListState::default().with_selected(Some(app.selected));
    frame.render_stateful_widget(list, area, &mut state);
}
