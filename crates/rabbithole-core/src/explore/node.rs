use serde::{Deserialize, Serialize};

use crate::config::{ANSWER_NODE_HEIGHT, ANSWER_NODE_WIDTH, QUESTION_NODE_HEIGHT, QUESTION_NODE_WIDTH};
use crate::query::{ImageReference, SourceCitation};

use super::layout::Position;

/// Node identifier; `"main"` for the root, `question-<n>` for follow-ups.
pub type NodeId = String;

/// Id of the synthetic root node created by a new search.
pub const ROOT_NODE_ID: &str = "main";

/// Visual variant of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Small clickable card holding a follow-up question.
    Question,
    /// Large card holding an answer (or its loading placeholder).
    Answer,
}

/// Lifecycle of a node. Failure and cancellation lead back to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeState {
    Pending,
    Loading,
    Loaded,
}

/// A node in the exploration graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: NodeId,
    pub label: String,
    pub kind: NodeKind,
    pub state: NodeState,
    /// Markdown answer; empty for questions.
    pub body: String,
    pub images: Vec<ImageReference>,
    pub sources: Vec<SourceCitation>,
    /// Top-left corner from the last layout pass.
    pub position: Position,
}

impl GraphNode {
    /// A pending follow-up question.
    pub fn question(id: impl Into<NodeId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind: NodeKind::Question,
            state: NodeState::Pending,
            body: String::new(),
            images: Vec::new(),
            sources: Vec::new(),
            position: Position::default(),
        }
    }

    /// An answer card showing `body` while it loads.
    pub fn loading_answer(id: impl Into<NodeId>, label: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Answer,
            state: NodeState::Loading,
            body: body.into(),
            ..Self::question(id, label)
        }
    }

    pub fn expanded(&self) -> bool {
        self.kind == NodeKind::Answer
    }

    pub fn is_expandable(&self) -> bool {
        self.kind == NodeKind::Question && self.state == NodeState::Pending
    }

    /// Width and height hint for the layout.
    pub fn size(&self) -> (f64, f64) {
        match self.kind {
            NodeKind::Answer => (ANSWER_NODE_WIDTH, ANSWER_NODE_HEIGHT),
            NodeKind::Question => (QUESTION_NODE_WIDTH, QUESTION_NODE_HEIGHT),
        }
    }

    /// Back to question appearance, keeping the label.
    pub(crate) fn revert(&mut self) {
        self.kind = NodeKind::Question;
        self.state = NodeState::Pending;
        self.body.clear();
        self.images.clear();
        self.sources.clear();
    }
}

/// Directed edge from an answer to one of its follow-up questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: String,
    pub source: NodeId,
    pub target: NodeId,
}

impl GraphEdge {
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        let target = target.into();
        Self {
            id: format!("edge-{target}"),
            source: source.into(),
            target,
        }
    }
}
