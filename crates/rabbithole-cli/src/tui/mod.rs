//! Terminal explorer.
//!
//! Shows the exploration graph as an outline plus a detail pane:
//! - Outline of answers and pending follow-up questions
//! - Answer, Sources and Map views of the selected node
//! - Search input and status bar

mod app;
mod components;
mod event;
mod starters;
mod ui;

use std::sync::Arc;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io::stdout;

use app::App;
use rabbithole_core::explore::QueryClient;
use rabbithole_core::query::FollowUpMode;

/// Options for one explorer session.
pub struct ExploreOptions {
    pub mode: FollowUpMode,
    pub concept: Option<String>,
    /// Search to start right away.
    pub initial_query: Option<String>,
}

/// Run the TUI application.
pub async fn run(client: Arc<dyn QueryClient>, options: ExploreOptions) -> color_eyre::Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(client, options);

    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}
