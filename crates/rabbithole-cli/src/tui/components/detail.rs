//! Answer view of the selected node.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, BorderType, Paragraph, Wrap},
};

use rabbithole_core::explore::{GraphNode, NodeKind, NodeState};
use rabbithole_core::query::strip_item_tags;

use crate::tui::app::App;

/// Render the answer body.
pub fn render(app: &App, frame: &mut Frame, area: Rect) {
    let node = app.selected_node();
    let title = node.map_or_else(|| " Answer ".to_string(), |n| format!(" {} ", n.label));

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::DarkGray));

    let lines = match node {
        Some(node) => body_lines(app, node),
        None => vec![Line::styled(
            "Start a search to open a rabbit hole.",
            Style::default().fg(Color::DarkGray),
        )],
    };

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.detail_scroll, 0));

    frame.render_widget(paragraph, area);
}

fn body_lines<'a>(app: &App, node: &'a GraphNode) -> Vec<Line<'a>> {
    match (node.kind, node.state) {
        (_, NodeState::Loading) => vec![Line::styled(
            format!("{} {}", app.spinner(), node.body),
            Style::default().fg(Color::Yellow),
        )],
        (NodeKind::Question, _) => vec![
            Line::styled(node.label.clone(), Style::default().fg(Color::White)),
            Line::raw(""),
            Line::styled(
                "Press [Enter] to dig into this question.",
                Style::default().fg(Color::DarkGray),
            ),
        ],
        (NodeKind::Answer, _) => node.body.lines().map(markdown_line).collect(),
    }
}

/// Light markdown styling: headers bold, term tags dropped.
fn markdown_line(line: &str) -> Line<'static> {
    let text = strip_item_tags(line);
    let trimmed = text.trim_start();

    if let Some(header) = trimmed.strip_prefix('#') {
        let header = header.trim_start_matches('#').trim().to_string();
        return Line::styled(
            header,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        );
    }

    if let Some(item) = trimmed.strip_prefix("- ").or_else(|| trimmed.strip_prefix("* ")) {
        return Line::from(vec![
            Span::styled("  • ", Style::default().fg(Color::DarkGray)),
            Span::raw(item.to_string()),
        ]);
    }

    Line::raw(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_line_styled() {
        let line = markdown_line("#### :item[Tides] overview");
        assert_eq!(line.spans.len(), 1);
        assert_eq!(line.spans[0].content, "Tides overview");
    }

    #[test]
    fn test_bullet_line() {
        let line = markdown_line("- the :item[Moon]");
        assert_eq!(line.spans[1].content, "the Moon");
    }
}
