//! View switcher and session summary.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Tabs},
};

use rabbithole_core::explore::NodeState;
use rabbithole_core::query::FollowUpMode;

use crate::tui::app::App;

/// Render the view tabs with the follow-up mode and graph size on the right.
pub fn render(app: &App, frame: &mut Frame, area: Rect) {
    let sources = app.selected_node().map_or(0, |n| n.sources.len());
    let titles = tab_titles(sources, app.graph.nodes().len());

    let answers = app
        .graph
        .nodes()
        .iter()
        .filter(|n| n.state == NodeState::Loaded)
        .count();
    let pending = app.graph.nodes().iter().filter(|n| n.is_expandable()).count();
    let spinner = app.graph.is_busy().then(|| app.spinner());
    let summary = session_summary(app.graph.mode(), spinner, answers, pending);

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .title(" rabbithole ")
                .title_top(Line::from(summary).right_aligned())
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .select(app.selected_tab.index())
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .divider(" · ");

    frame.render_widget(tabs, area);
}

fn tab_titles(sources: usize, nodes: usize) -> Vec<String> {
    let count = |label: &str, n: usize| {
        if n == 0 {
            label.to_string()
        } else {
            format!("{label} ({n})")
        }
    };
    vec!["Answer".to_string(), count("Sources", sources), count("Map", nodes)]
}

fn session_summary(mode: FollowUpMode, spinner: Option<&str>, answers: usize, pending: usize) -> String {
    let mode = match mode {
        FollowUpMode::Expansive => "expansive",
        FollowUpMode::Focused => "focused",
    };
    let mut summary = format!(" {mode} · {answers} answered · {pending} open ");
    if let Some(spinner) = spinner {
        summary.push_str(&format!("{spinner} digging "));
    }
    summary
}
