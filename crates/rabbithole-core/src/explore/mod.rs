//! Client-side exploration graph.
//!
//! A session starts with one root answer node; each answer spawns pending
//! question nodes that can be expanded into answers in place. The graph is
//! a plain state holder: callers run [`Expansion`]s on their own executor
//! and feed the results back through [`ExplorationGraph::complete`].

mod client;
mod graph;
mod layout;
mod node;

pub use client::{ClientError, HttpQueryClient, QueryClient};
pub use graph::{
    Completion, Expansion, ExpansionResult, ExplorationGraph, ExploreError, RequestToken,
};
pub use layout::{ForceLayout, Layout, LayoutHints, Position, RankDir};
pub use node::{GraphEdge, GraphNode, NodeId, NodeKind, NodeState, ROOT_NODE_ID};
