//! Minimap of the laid-out graph.

use ratatui::{
    prelude::*,
    symbols::Marker,
    widgets::{
        canvas::{Canvas, Line as CanvasLine, Rectangle},
        Block, Borders, BorderType,
    },
};

use rabbithole_core::explore::{GraphNode, NodeKind, NodeState};

use crate::tui::app::App;

/// Render node boxes and edges at their layout positions.
pub fn render(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .title(" Map ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::DarkGray));

    let nodes = app.graph.nodes();
    let selected = app.selected_node().map(|n| n.id.clone());
    let ([min_x, max_x], [min_y, max_y]) = bounds(nodes);

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds([min_x, max_x])
        .y_bounds([min_y, max_y])
        .paint(|ctx| {
            // Canvas y grows upwards; layout y grows downwards
            for edge in app.graph.edges() {
                let (Some(source), Some(target)) = (app.graph.node(&edge.source), app.graph.node(&edge.target)) else {
                    continue;
                };
                let (sw, sh) = source.size();
                let (_, th) = target.size();
                ctx.draw(&CanvasLine {
                    x1: source.position.x + sw,
                    y1: -(source.position.y + sh / 2.0),
                    x2: target.position.x,
                    y2: -(target.position.y + th / 2.0),
                    color: Color::DarkGray,
                });
            }

            for node in nodes {
                let (width, height) = node.size();
                let color = if selected.as_deref() == Some(node.id.as_str()) {
                    Color::Yellow
                } else {
                    node_color(node)
                };
                ctx.draw(&Rectangle {
                    x: node.position.x,
                    y: -(node.position.y + height),
                    width,
                    height,
                    color,
                });
            }
        });

    frame.render_widget(canvas, area);
}

fn node_color(node: &GraphNode) -> Color {
    match (node.kind, node.state) {
        (_, NodeState::Loading) => Color::Cyan,
        (NodeKind::Answer, _) => Color::Green,
        (NodeKind::Question, _) => Color::Gray,
    }
}

/// Canvas bounds covering every node, in flipped-y coordinates.
fn bounds(nodes: &[GraphNode]) -> ([f64; 2], [f64; 2]) {
    if nodes.is_empty() {
        return ([0.0, 1.0], [-1.0, 0.0]);
    }

    let mut min_x = f64::MAX;
    let mut max_x = f64::MIN;
    let mut min_y = f64::MAX;
    let mut max_y = f64::MIN;
    for node in nodes {
        let (width, height) = node.size();
        min_x = min_x.min(node.position.x);
        max_x = max_x.max(node.position.x + width);
        min_y = min_y.min(-(node.position.y + height));
        max_y = max_y.max(-node.position.y);
    }
    ([min_x, max_x], [min_y, max_y])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_cover_nodes() {
        let mut a = GraphNode::question("question-0", "a");
        a.position.x = 10.0;
        a.position.y = 20.0;
        let (x, y) = bounds(&[a]);
        assert_eq!(x, [10.0, 310.0]);
        assert_eq!(y, [-120.0, -20.0]);
    }

    #[test]
    fn test_empty_bounds_are_valid() {
        let (x, y) = bounds(&[]);
        assert!(x[0] < x[1]);
        assert!(y[0] < y[1]);
    }
}
