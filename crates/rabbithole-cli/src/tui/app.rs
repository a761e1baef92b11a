//! Application state and main event loop.

use std::io::Stdout;
use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use tokio::sync::mpsc;

use rabbithole_core::explore::{
    Completion, Expansion, ExplorationGraph, ExploreError, GraphNode, NodeState, QueryClient,
    ROOT_NODE_ID,
};
use rabbithole_core::query::FollowUpMode;

use super::event::{Event, EventHandler};
use super::starters::{self, StarterDeck};
use super::ui;
use super::ExploreOptions;

/// The view shown for the selected node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectedTab {
    #[default]
    Answer,
    Sources,
    Map,
}

impl SelectedTab {
    pub fn next(self) -> Self {
        match self {
            Self::Answer => Self::Sources,
            Self::Sources => Self::Map,
            Self::Map => Self::Answer,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Self::Answer => Self::Map,
            Self::Sources => Self::Answer,
            Self::Map => Self::Sources,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Self::Answer => 0,
            Self::Sources => 1,
            Self::Map => 2,
        }
    }
}

/// Input mode for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Editing,
}

const SPINNER: [&str; 4] = ["◐", "◓", "◑", "◒"];

/// Main application state.
pub struct App {
    /// Nodes, edges and conversation history
    pub graph: ExplorationGraph,
    /// Where queries are sent
    client: Arc<dyn QueryClient>,
    /// View shown in the detail pane
    pub selected_tab: SelectedTab,
    /// Current input mode
    pub input_mode: InputMode,
    /// Input buffer for the search box
    pub input_buffer: String,
    /// Index into the outline
    pub selected: usize,
    /// Scroll offset of the detail pane
    pub detail_scroll: u16,
    /// Whether the app should quit
    pub should_quit: bool,
    /// Status message
    pub status_message: Option<String>,
    /// Tick counter for the spinner
    pub tick: usize,
    /// Search to start once the event loop is up
    pending_query: Option<String>,
    /// Starter questions shown while the graph is empty
    pub starters: Vec<StarterDeck>,
    /// Highlighted starter deck
    pub starter_selected: usize,
}

impl App {
    /// Create a new app instance.
    pub fn new(client: Arc<dyn QueryClient>, options: ExploreOptions) -> Self {
        let mut graph = ExplorationGraph::new();
        graph.set_mode(options.mode);
        graph.set_concept(options.concept);

        Self {
            graph,
            client,
            selected_tab: SelectedTab::Answer,
            input_mode: if options.initial_query.is_some() {
                InputMode::Normal
            } else {
                InputMode::Editing
            },
            input_buffer: String::new(),
            selected: 0,
            detail_scroll: 0,
            should_quit: false,
            status_message: Some("Type a topic, or pick a starter with [↑/↓] and [Tab]".to_string()),
            tick: 0,
            pending_query: options.initial_query,
            starters: starters::decks(starter_seed()),
            starter_selected: 0,
        }
    }

    /// No search has produced a graph yet (or the last one was cleared).
    pub fn on_landing(&self) -> bool {
        self.graph.is_empty()
    }

    /// Run the main event loop.
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    ) -> color_eyre::Result<()> {
        let mut events = EventHandler::new();

        if let Some(query) = self.pending_query.take() {
            self.start_search(&query, events.sender());
        }

        loop {
            terminal.draw(|frame| ui::render(self, frame))?;

            if let Some(event) = events.next().await {
                match event {
                    Event::Key(key) => self.handle_key_event(key, events.sender()),
                    Event::Tick => {
                        self.tick = self.tick.wrapping_add(1);
                    }
                    Event::ExpansionDone(result) => {
                        let error = result.outcome.as_ref().err().map(|e| e.to_string());
                        let completion = self.graph.complete(result);
                        self.handle_completion(completion, error);
                    }
                }
            }

            if self.should_quit {
                self.graph.cancel_all();
                break;
            }
        }

        Ok(())
    }

    /// Nodes in display order: depth-first from the root.
    pub fn outline(&self) -> Vec<(usize, &GraphNode)> {
        let mut entries = Vec::with_capacity(self.graph.nodes().len());
        if let Some(root) = self.graph.node(ROOT_NODE_ID) {
            self.walk(root, 0, &mut entries);
        }
        entries
    }

    fn walk<'a>(&'a self, node: &'a GraphNode, depth: usize, out: &mut Vec<(usize, &'a GraphNode)>) {
        out.push((depth, node));
        for child in self.graph.children_of(&node.id) {
            self.walk(child, depth + 1, out);
        }
    }

    pub fn selected_node(&self) -> Option<&GraphNode> {
        self.outline().get(self.selected).map(|(_, node)| *node)
    }

    pub fn spinner(&self) -> &'static str {
        SPINNER[self.tick % SPINNER.len()]
    }

    /// Handle a key event.
    pub fn handle_key_event(&mut self, key: KeyEvent, event_tx: mpsc::UnboundedSender<Event>) {
        match self.input_mode {
            InputMode::Normal => self.handle_normal_mode_key(key, event_tx),
            InputMode::Editing => self.handle_editing_mode_key(key, event_tx),
        }
    }

    /// Handle key in normal mode.
    fn handle_normal_mode_key(&mut self, key: KeyEvent, event_tx: mpsc::UnboundedSender<Event>) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Tab => self.selected_tab = self.selected_tab.next(),
            KeyCode::BackTab => self.selected_tab = self.selected_tab.previous(),
            KeyCode::Char('i') | KeyCode::Char('/') => {
                self.input_mode = InputMode::Editing;
            }
            KeyCode::Char('j') | KeyCode::Down if self.on_landing() => self.cycle_starter(1),
            KeyCode::Char('k') | KeyCode::Up if self.on_landing() => self.cycle_starter(-1),
            KeyCode::Enter | KeyCode::Char(' ') if self.on_landing() => {
                self.pick_starter();
                self.input_mode = InputMode::Editing;
            }
            KeyCode::Char('j') | KeyCode::Down => self.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.select_previous(),
            KeyCode::Char('J') | KeyCode::PageDown => {
                self.detail_scroll = self.detail_scroll.saturating_add(5);
            }
            KeyCode::Char('K') | KeyCode::PageUp => {
                self.detail_scroll = self.detail_scroll.saturating_sub(5);
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.expand_selected(event_tx),
            KeyCode::Char('x') | KeyCode::Esc => self.cancel_selected(),
            KeyCode::Char('f') => self.toggle_mode(),
            _ => {}
        }
    }

    /// Handle key in editing mode.
    fn handle_editing_mode_key(&mut self, key: KeyEvent, event_tx: mpsc::UnboundedSender<Event>) {
        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Enter => {
                let query = std::mem::take(&mut self.input_buffer);
                if !query.trim().is_empty() {
                    self.start_search(&query, event_tx);
                    self.input_mode = InputMode::Normal;
                }
            }
            KeyCode::Char(c) => {
                self.input_buffer.push(c);
            }
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }
            KeyCode::Down if self.on_landing() => self.cycle_starter(1),
            KeyCode::Up if self.on_landing() => self.cycle_starter(-1),
            KeyCode::Tab if self.on_landing() => self.pick_starter(),
            _ => {}
        }
    }

    /// Start a new root search; replaces the current graph.
    fn start_search(&mut self, query: &str, event_tx: mpsc::UnboundedSender<Event>) {
        match self.graph.begin_search(query) {
            Ok(expansion) => {
                self.selected = 0;
                self.detail_scroll = 0;
                self.selected_tab = SelectedTab::Answer;
                self.status_message = Some(format!("Searching: {}", query.trim()));
                self.spawn(expansion, event_tx);
            }
            Err(e) => self.status_message = Some(e.to_string()),
        }
    }

    fn expand_selected(&mut self, event_tx: mpsc::UnboundedSender<Event>) {
        let Some(id) = self.selected_node().map(|n| n.id.clone()) else {
            return;
        };

        match self.graph.begin_expand(&id) {
            Ok(expansion) => {
                self.detail_scroll = 0;
                self.status_message = Some(format!("Digging into: {}", expansion.request.query));
                self.spawn(expansion, event_tx);
            }
            Err(ExploreError::Busy) => {
                self.status_message =
                    Some("Still loading the previous answer ([x] to cancel)".to_string());
            }
            Err(ExploreError::NotExpandable(_)) => {}
            Err(e) => self.status_message = Some(e.to_string()),
        }
    }

    fn cancel_selected(&mut self) {
        let selected = self.selected_node().map(|n| n.id.clone());
        let cancelled = match selected {
            Some(id) if self.graph.is_loading(&id) => self.graph.cancel(&id),
            _ if self.graph.is_busy() => {
                self.graph.cancel_all();
                true
            }
            _ => false,
        };
        if cancelled {
            self.status_message = Some("Cancelled".to_string());
            self.clamp_selection();
            // A cancelled root search leaves nothing to browse
            if self.on_landing() {
                self.input_mode = InputMode::Editing;
            }
        }
    }

    fn cycle_starter(&mut self, step: isize) {
        let len = self.starters.len() as isize;
        if len > 0 {
            self.starter_selected = (self.starter_selected as isize + step).rem_euclid(len) as usize;
        }
    }

    /// Copies the highlighted deck's question into the search box.
    fn pick_starter(&mut self) {
        if let Some(deck) = self.starters.get_mut(self.starter_selected) {
            self.input_buffer = deck.draw().to_string();
        }
    }

    fn toggle_mode(&mut self) {
        let mode = match self.graph.mode() {
            FollowUpMode::Expansive => FollowUpMode::Focused,
            FollowUpMode::Focused => FollowUpMode::Expansive,
        };
        self.graph.set_mode(mode);
        self.status_message = Some(format!("Follow-up mode: {}", mode.describe()));
    }

    fn spawn(&self, expansion: Expansion, event_tx: mpsc::UnboundedSender<Event>) {
        let client = self.client.clone();
        tokio::spawn(async move {
            let result = expansion.run(client.as_ref()).await;
            let _ = event_tx.send(Event::ExpansionDone(result));
        });
    }

    /// Update the status line after a request finished.
    pub fn handle_completion(&mut self, completion: Completion, error: Option<String>) {
        match completion {
            Completion::Loaded { children } => {
                self.status_message = Some(match children.len() {
                    0 => "Answer loaded, no follow-up questions".to_string(),
                    n => format!("Answer loaded, {} follow-up questions", n),
                });
            }
            Completion::Reverted => {
                self.status_message = error.map(|e| format!("Request failed: {}", e));
            }
            Completion::Cleared => {
                self.status_message = Some(format!(
                    "Search failed: {}",
                    error.unwrap_or_else(|| "unknown error".to_string())
                ));
                self.input_mode = InputMode::Editing;
            }
            Completion::Discarded => {}
        }
        self.clamp_selection();
    }

    fn select_next(&mut self) {
        let len = self.outline().len();
        if self.selected + 1 < len {
            self.selected += 1;
            self.detail_scroll = 0;
        }
    }

    fn select_previous(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.detail_scroll = 0;
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.outline().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    /// Whether the selected node is loading.
    pub fn selected_is_loading(&self) -> bool {
        self.selected_node()
            .map(|n| n.state == NodeState::Loading)
            .unwrap_or(false)
    }
}

/// Varies which starter questions are face up from run to run.
fn starter_seed() -> usize {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos() as usize)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crossterm::event::KeyEventKind;
    use rabbithole_core::explore::{ClientError, ExpansionResult};
    use rabbithole_core::query::{QueryResponse, SearchRequest};

    struct Unused;

    #[async_trait]
    impl QueryClient for Unused {
        async fn query(&self, _request: &SearchRequest) -> Result<QueryResponse, ClientError> {
            futures::future::pending().await
        }
    }

    fn app() -> App {
        App::new(
            Arc::new(Unused),
            ExploreOptions {
                mode: FollowUpMode::Expansive,
                concept: None,
                initial_query: None,
            },
        )
    }

    fn key(code: KeyCode) -> KeyEvent {
        let mut event = KeyEvent::new(code, KeyModifiers::NONE);
        event.kind = KeyEventKind::Press;
        event
    }

    fn load_root(app: &mut App, follow_ups: &[&str]) {
        let expansion = app.graph.begin_search("tides").unwrap();
        let result = ExpansionResult {
            node_id: expansion.node_id,
            token: expansion.token,
            outcome: Ok(QueryResponse {
                response: "The Moon.".to_string(),
                follow_up_questions: follow_ups.iter().map(|q| q.to_string()).collect(),
                contextual_query: "tides".to_string(),
                ..QueryResponse::default()
            }),
        };
        let completion = app.graph.complete(result);
        app.handle_completion(completion, None);
    }

    #[test]
    fn test_outline_is_depth_first() {
        let mut app = app();
        load_root(&mut app, &["Why two?", "And the Sun?"]);

        let outline: Vec<(usize, &str)> = app
            .outline()
            .into_iter()
            .map(|(depth, node)| (depth, node.label.as_str()))
            .collect();
        assert_eq!(outline, vec![(0, "tides"), (1, "Why two?"), (1, "And the Sun?")]);
        assert_eq!(
            app.status_message.as_deref(),
            Some("Answer loaded, 2 follow-up questions")
        );
    }

    #[test]
    fn test_selection_stays_in_bounds() {
        let mut app = app();
        load_root(&mut app, &["Why two?"]);
        app.input_mode = InputMode::Normal;
        let (tx, _rx) = mpsc::unbounded_channel();

        for _ in 0..5 {
            app.handle_key_event(key(KeyCode::Down), tx.clone());
        }
        assert_eq!(app.selected, 1);
        app.handle_key_event(key(KeyCode::Up), tx.clone());
        app.handle_key_event(key(KeyCode::Up), tx);
        assert_eq!(app.selected, 0);
    }

    #[tokio::test]
    async fn test_expand_then_cancel() {
        let mut app = app();
        load_root(&mut app, &["Why two?"]);
        app.input_mode = InputMode::Normal;
        let (tx, _rx) = mpsc::unbounded_channel();

        app.handle_key_event(key(KeyCode::Down), tx.clone());
        app.handle_key_event(key(KeyCode::Enter), tx.clone());
        assert!(app.selected_is_loading());
        assert!(app.graph.is_busy());

        app.handle_key_event(key(KeyCode::Char('x')), tx);
        assert!(!app.graph.is_busy());
        assert!(!app.selected_node().unwrap().expanded());
        assert_eq!(app.status_message.as_deref(), Some("Cancelled"));
    }

    #[test]
    fn test_editing_submit_ignores_blank() {
        let mut app = app();
        let (tx, _rx) = mpsc::unbounded_channel();
        app.handle_key_event(key(KeyCode::Char(' ')), tx.clone());
        app.handle_key_event(key(KeyCode::Enter), tx);
        assert_eq!(app.input_mode, InputMode::Editing);
        assert!(app.graph.is_empty());
    }

    #[tokio::test]
    async fn test_starter_fills_and_starts_search() {
        let mut app = app();
        app.starters = starters::decks(0);
        let (tx, _rx) = mpsc::unbounded_channel();

        app.handle_key_event(key(KeyCode::Down), tx.clone());
        assert_eq!(app.starter_selected, 1);
        let expected = app.starters[1].question();

        app.handle_key_event(key(KeyCode::Tab), tx.clone());
        assert_eq!(app.input_buffer, expected);
        assert_ne!(app.starters[1].question(), expected);

        app.handle_key_event(key(KeyCode::Enter), tx);
        assert!(!app.on_landing());
        assert_eq!(app.graph.node(ROOT_NODE_ID).unwrap().label, expected);
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_starter_from_normal_mode() {
        let mut app = app();
        app.starters = starters::decks(0);
        app.input_mode = InputMode::Normal;
        let (tx, _rx) = mpsc::unbounded_channel();

        app.handle_key_event(key(KeyCode::Up), tx.clone());
        assert_eq!(app.starter_selected, 2);
        let expected = app.starters[2].question();

        app.handle_key_event(key(KeyCode::Enter), tx);
        assert_eq!(app.input_buffer, expected);
        assert_eq!(app.input_mode, InputMode::Editing);
        assert!(app.on_landing());
    }

    #[tokio::test]
    async fn test_cancelled_root_returns_to_input() {
        let mut app = app();
        let (tx, _rx) = mpsc::unbounded_channel();
        app.input_buffer = "tides".to_string();
        app.handle_key_event(key(KeyCode::Enter), tx.clone());
        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(app.graph.is_busy());

        app.handle_key_event(key(KeyCode::Char('x')), tx);
        assert!(app.on_landing());
        assert!(!app.graph.is_busy());
        assert_eq!(app.input_mode, InputMode::Editing);
    }

    #[test]
    fn test_mode_toggle() {
        let mut app = app();
        app.input_mode = InputMode::Normal;
        let (tx, _rx) = mpsc::unbounded_channel();
        app.handle_key_event(key(KeyCode::Char('f')), tx);
        assert_eq!(app.graph.mode(), FollowUpMode::Focused);
    }
}
