//! Sources and images of the selected answer.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, BorderType, List, ListItem},
};

use crate::tui::app::App;

/// Render citations and image links.
pub fn render(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .title(" Sources ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::DarkGray));

    let Some(node) = app.selected_node() else {
        frame.render_widget(block, area);
        return;
    };

    let mut items: Vec<ListItem> = node
        .sources
        .iter()
        .enumerate()
        .map(|(i, source)| {
            let title = if source.title.is_empty() {
                source.url.as_str()
            } else {
                source.title.as_str()
            };
            let mut lines = vec![Line::from(vec![
                Span::styled(format!("[{}] ", i + 1), Style::default().fg(Color::Cyan)),
                Span::styled(title.to_string(), Style::default().fg(Color::White)),
            ])];
            if !source.author.is_empty() {
                lines.push(Line::styled(
                    format!("    by {}", source.author),
                    Style::default().fg(Color::Gray),
                ));
            }
            lines.push(Line::styled(
                format!("    {}", source.url),
                Style::default().fg(Color::DarkGray),
            ));
            ListItem::new(lines)
        })
        .collect();

    if !node.images.is_empty() {
        items.push(ListItem::new(Line::raw("")));
        items.push(ListItem::new(Line::styled(
            "Images",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )));
        for image in &node.images {
            let mut lines = vec![Line::styled(
                format!("  {}", image.url),
                Style::default().fg(Color::DarkGray),
            )];
            if !image.description.is_empty() {
                lines.insert(
                    0,
                    Line::styled(format!("  {}", image.description), Style::default().fg(Color::Gray)),
                );
            }
            items.push(ListItem::new(lines));
        }
    }

    if items.is_empty() {
        items.push(ListItem::new(Line::styled(
            "No sources for this node.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    frame.render_widget(List::new(items).block(block), area);
}
