use std::collections::HashMap;

use futures::future::{AbortHandle, AbortRegistration, Abortable};
use thiserror::Error;

use crate::config::LOADING_PLACEHOLDER;
use crate::query::{ConversationTurn, FollowUpMode, QueryResponse, SearchRequest};

use super::client::{ClientError, QueryClient};
use super::layout::{ForceLayout, Layout, LayoutHints};
use super::node::{GraphEdge, GraphNode, NodeId, NodeKind, NodeState, ROOT_NODE_ID};

/// Errors returned when an expansion cannot start.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExploreError {
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("Node {0} is not a pending question")]
    NotExpandable(NodeId),

    #[error("Another expansion is in flight")]
    Busy,

    #[error("Query must not be empty")]
    EmptyQuery,
}

/// Identity of one issued request; only the latest token for a node counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestToken(u64);

struct ActiveRequest {
    token: RequestToken,
    handle: AbortHandle,
}

/// A started expansion, ready to be awaited off the graph.
pub struct Expansion {
    pub node_id: NodeId,
    pub token: RequestToken,
    pub request: SearchRequest,
    registration: AbortRegistration,
}

impl Expansion {
    /// Sends the request; an abort resolves to [`ClientError::Cancelled`].
    pub async fn run<C: QueryClient + ?Sized>(self, client: &C) -> ExpansionResult {
        let Expansion {
            node_id,
            token,
            request,
            registration,
        } = self;

        let outcome = match Abortable::new(client.query(&request), registration).await {
            Ok(result) => result,
            Err(_aborted) => Err(ClientError::Cancelled),
        };

        ExpansionResult {
            node_id,
            token,
            outcome,
        }
    }
}

/// Outcome of [`Expansion::run`], to be handed back to [`ExplorationGraph::complete`].
#[derive(Debug)]
pub struct ExpansionResult {
    pub node_id: NodeId,
    pub token: RequestToken,
    pub outcome: Result<QueryResponse, ClientError>,
}

/// What [`ExplorationGraph::complete`] did with a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// Node promoted; these follow-up nodes were added.
    Loaded { children: Vec<NodeId> },
    /// Node went back to a pending question.
    Reverted,
    /// The root search failed and the graph was emptied.
    Cleared,
    /// Superseded result; nothing changed.
    Discarded,
}

/// Client-side state of one exploration session.
///
/// Owns nodes, edges and the conversation history. At most one request
/// is in flight at a time; new expansions are rejected, not queued.
pub struct ExplorationGraph {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    history: Vec<ConversationTurn>,
    active: HashMap<NodeId, ActiveRequest>,
    layout: Box<dyn Layout>,
    concept: Option<String>,
    mode: FollowUpMode,
    next_question: u64,
    next_token: u64,
}

impl Default for ExplorationGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl ExplorationGraph {
    pub fn new() -> Self {
        Self::with_layout(ForceLayout)
    }

    pub fn with_layout(layout: impl Layout + 'static) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            history: Vec::new(),
            active: HashMap::new(),
            layout: Box::new(layout),
            concept: None,
            mode: FollowUpMode::default(),
            next_question: 0,
            next_token: 0,
        }
    }

    pub fn set_concept(&mut self, concept: Option<String>) {
        self.concept = concept.filter(|c| !c.trim().is_empty());
    }

    pub fn set_mode(&mut self, mode: FollowUpMode) {
        self.mode = mode;
    }

    pub fn mode(&self) -> FollowUpMode {
        self.mode
    }

    pub fn concept(&self) -> Option<&str> {
        self.concept.as_deref()
    }

    /// Starts a new root search, superseding anything in flight.
    ///
    /// The graph is reset to a single loading root node; the conversation
    /// history is kept.
    pub fn begin_search(&mut self, query: &str) -> Result<Expansion, ExploreError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ExploreError::EmptyQuery);
        }

        self.abort_all();
        self.nodes = vec![GraphNode::loading_answer(ROOT_NODE_ID, query, LOADING_PLACEHOLDER)];
        self.edges.clear();
        self.relayout();

        tracing::info!(query = %query, "starting root search");
        Ok(self.register(ROOT_NODE_ID.to_string(), query.to_string()))
    }

    /// Starts expanding a pending question node.
    pub fn begin_expand(&mut self, node_id: &str) -> Result<Expansion, ExploreError> {
        let node = self
            .nodes
            .iter()
            .find(|n| n.id == node_id)
            .ok_or_else(|| ExploreError::UnknownNode(node_id.to_string()))?;

        if !node.is_expandable() {
            return Err(ExploreError::NotExpandable(node_id.to_string()));
        }
        if self.is_busy() {
            tracing::debug!(node = %node_id, "expansion rejected, another request in flight");
            return Err(ExploreError::Busy);
        }

        let label = node.label.clone();
        if let Some(stale) = self.active.remove(node_id) {
            stale.handle.abort();
        }

        if let Some(node) = self.node_mut(node_id) {
            node.kind = NodeKind::Answer;
            node.state = NodeState::Loading;
            node.body = LOADING_PLACEHOLDER.to_string();
        }
        self.relayout();

        tracing::info!(node = %node_id, question = %label, "expanding node");
        Ok(self.register(node_id.to_string(), label))
    }

    fn register(&mut self, node_id: NodeId, query: String) -> Expansion {
        let (handle, registration) = AbortHandle::new_pair();
        let token = RequestToken(self.next_token);
        self.next_token += 1;
        self.active.insert(node_id.clone(), ActiveRequest { token, handle });

        let mut request = SearchRequest::new(query)
            .with_history(self.history.clone())
            .with_mode(self.mode);
        request.concept = self.concept.clone();

        Expansion {
            node_id,
            token,
            request,
            registration,
        }
    }

    /// Applies a finished request to the graph.
    pub fn complete(&mut self, result: ExpansionResult) -> Completion {
        let ExpansionResult {
            node_id,
            token,
            outcome,
        } = result;

        match self.active.get(&node_id) {
            Some(active) if active.token == token => {
                self.active.remove(&node_id);
            }
            _ => {
                tracing::debug!(node = %node_id, "discarding superseded result");
                return Completion::Discarded;
            }
        }

        match outcome {
            Ok(response) => self.promote(&node_id, response),
            Err(err) => {
                if !err.is_cancelled() {
                    tracing::error!(node = %node_id, error = %err, "expansion failed");
                }
                self.revert(&node_id)
            }
        }
    }

    fn promote(&mut self, node_id: &str, response: QueryResponse) -> Completion {
        let Some(node) = self.node_mut(node_id) else {
            return Completion::Discarded;
        };

        if !response.contextual_query.trim().is_empty() {
            node.label = response.contextual_query;
        }
        node.kind = NodeKind::Answer;
        node.state = NodeState::Loaded;
        node.body = response.response;
        node.images = response.images;
        node.sources = response.sources;

        let turn = ConversationTurn::new(node.label.clone(), node.body.clone());
        self.history.push(turn);

        let mut children = Vec::with_capacity(response.follow_up_questions.len());
        for question in response.follow_up_questions {
            let id = format!("question-{}", self.next_question);
            self.next_question += 1;
            self.nodes.push(GraphNode::question(id.clone(), question));
            self.edges.push(GraphEdge::new(node_id, id.clone()));
            children.push(id);
        }

        self.relayout();
        tracing::info!(node = %node_id, children = children.len(), "node loaded");
        Completion::Loaded { children }
    }

    fn revert(&mut self, node_id: &str) -> Completion {
        if node_id == ROOT_NODE_ID {
            self.nodes.clear();
            self.edges.clear();
            return Completion::Cleared;
        }
        if let Some(node) = self.node_mut(node_id) {
            node.revert();
        }
        self.relayout();
        Completion::Reverted
    }

    /// Aborts the request for `node_id` and reverts the node right away.
    ///
    /// Returns false when nothing was in flight for that node.
    pub fn cancel(&mut self, node_id: &str) -> bool {
        let Some(active) = self.active.remove(node_id) else {
            return false;
        };
        active.handle.abort();
        tracing::debug!(node = %node_id, "expansion cancelled");
        self.revert(node_id);
        true
    }

    /// Cancels every in-flight request.
    pub fn cancel_all(&mut self) {
        let ids: Vec<NodeId> = self.active.keys().cloned().collect();
        for id in ids {
            self.cancel(&id);
        }
    }

    fn abort_all(&mut self) {
        for (_, active) in self.active.drain() {
            active.handle.abort();
        }
    }

    /// Recomputes every node position.
    pub fn relayout(&mut self) {
        let any_expanded = self.nodes.iter().any(GraphNode::expanded);
        let hints = LayoutHints::for_graph(any_expanded);
        let positions = self.layout.layout(&self.nodes, &self.edges, &hints);
        for node in &mut self.nodes {
            if let Some(position) = positions.get(&node.id) {
                node.position = *position;
            }
        }
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    fn node_mut(&mut self, id: &str) -> Option<&mut GraphNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn history(&self) -> &[ConversationTurn] {
        &self.history
    }

    pub fn is_busy(&self) -> bool {
        !self.active.is_empty()
    }

    /// Whether a request for `id` is in flight.
    pub fn is_loading(&self, id: &str) -> bool {
        self.active.contains_key(id)
    }

    pub fn children_of(&self, id: &str) -> Vec<&GraphNode> {
        self.edges
            .iter()
            .filter(|e| e.source == id)
            .filter_map(|e| self.node(&e.target))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
