//! Node placement for the exploration graph.
//!
//! The graph only supplies size hints and a rank direction; placement is
//! delegated to a [`Layout`]. [`ForceLayout`] settles nodes with a
//! `force_graph` simulation and pins each one to the column of its rank.

use std::collections::{HashMap, VecDeque};

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use serde::{Deserialize, Serialize};

use crate::config::NODE_SEPARATION;

use super::node::{GraphEdge, GraphNode, NodeId};

/// Top-left corner of a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Direction in which ranks advance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RankDir {
    #[default]
    LeftRight,
    TopBottom,
}

/// Spacing parameters handed to a layout.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutHints {
    pub rank_dir: RankDir,
    /// Gap between nodes in the same rank.
    pub node_sep: f64,
    /// Gap between ranks.
    pub rank_sep: f64,
    pub margin_x: f64,
    pub margin_y: f64,
}

impl LayoutHints {
    /// Hints for the current graph; spacing widens once any answer is shown.
    pub fn for_graph(any_expanded: bool) -> Self {
        Self {
            rank_dir: RankDir::LeftRight,
            node_sep: NODE_SEPARATION,
            rank_sep: if any_expanded { 200.0 } else { 100.0 },
            margin_x: 200.0,
            margin_y: if any_expanded { 200.0 } else { 100.0 },
        }
    }
}

/// Computes positions for every node.
///
/// Nodes missing from the returned map keep their previous position.
pub trait Layout: Send + Sync {
    fn layout(
        &self,
        nodes: &[GraphNode],
        edges: &[GraphEdge],
        hints: &LayoutHints,
    ) -> HashMap<NodeId, Position>;
}

/// Rank-pinned force-directed layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForceLayout;

const SIMULATION_STEPS: usize = 300;
const STEP_SECONDS: f32 = 0.016;

fn simulation_parameters() -> SimulationParameters {
    SimulationParameters {
        force_charge: 150.0,
        force_spring: 0.05,
        force_max: 100.0,
        node_speed: 3000.0,
        damping_factor: 0.9,
    }
}

/// Size projected onto the rank axis ("depth") and the cross axis ("breadth").
#[derive(Clone, Copy)]
struct Extent {
    depth: f64,
    breadth: f64,
}

impl Extent {
    fn of(node: &GraphNode, dir: RankDir) -> Self {
        let (width, height) = node.size();
        match dir {
            RankDir::LeftRight => Extent { depth: width, breadth: height },
            RankDir::TopBottom => Extent { depth: height, breadth: width },
        }
    }
}

/// Rank 0 for nodes nothing points at, parent rank + 1 below them.
///
/// Nodes only reachable through a cycle start a rank-0 walk of their own.
fn assign_ranks<'a>(nodes: &'a [GraphNode], edges: &'a [GraphEdge]) -> HashMap<&'a str, usize> {
    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut has_parent: HashMap<&str, bool> = nodes.iter().map(|n| (n.id.as_str(), false)).collect();
    for edge in edges {
        if has_parent.contains_key(edge.source.as_str()) && has_parent.contains_key(edge.target.as_str()) {
            children.entry(edge.source.as_str()).or_default().push(edge.target.as_str());
            has_parent.insert(edge.target.as_str(), true);
        }
    }

    let mut ranks = HashMap::with_capacity(nodes.len());
    let roots = nodes.iter().filter(|n| !has_parent[n.id.as_str()]);
    let leftovers = nodes.iter();
    for start in roots.chain(leftovers) {
        if ranks.contains_key(start.id.as_str()) {
            continue;
        }
        let mut queue = VecDeque::from([(start.id.as_str(), 0usize)]);
        ranks.insert(start.id.as_str(), 0);
        while let Some((id, rank)) = queue.pop_front() {
            for &child in children.get(id).into_iter().flatten() {
                if !ranks.contains_key(child) {
                    ranks.insert(child, rank + 1);
                    queue.push_back((child, rank + 1));
                }
            }
        }
    }
    ranks
}

impl Layout for ForceLayout {
    fn layout(
        &self,
        nodes: &[GraphNode],
        edges: &[GraphEdge],
        hints: &LayoutHints,
    ) -> HashMap<NodeId, Position> {
        if nodes.is_empty() {
            return HashMap::new();
        }

        let ranks = assign_ranks(nodes, edges);
        let rank_of = |id: &str| ranks.get(id).copied().unwrap_or_default();
        let rank_count = ranks.values().max().map_or(1, |max| max + 1);

        let (along_margin, across_margin) = match hints.rank_dir {
            RankDir::LeftRight => (hints.margin_x, hints.margin_y),
            RankDir::TopBottom => (hints.margin_y, hints.margin_x),
        };

        // Column start and depth of every rank
        let mut depths = vec![0.0_f64; rank_count];
        for node in nodes {
            let rank = rank_of(&node.id);
            depths[rank] = depths[rank].max(Extent::of(node, hints.rank_dir).depth);
        }
        let mut columns = Vec::with_capacity(rank_count);
        let mut offset = along_margin;
        for depth in depths {
            columns.push((offset, depth));
            offset += depth + hints.rank_sep;
        }

        // Seed every rank as a stacked column; the first root stays put
        let mut sim: ForceGraph<NodeId, ()> = ForceGraph::new(simulation_parameters());
        let mut indices: HashMap<&str, DefaultNodeIdx> = HashMap::with_capacity(nodes.len());
        let mut seeds: HashMap<&str, f64> = HashMap::with_capacity(nodes.len());
        let mut filled = vec![0.0_f64; rank_count];
        for (i, node) in nodes.iter().enumerate() {
            let rank = rank_of(&node.id);
            let extent = Extent::of(node, hints.rank_dir);
            let (start, depth) = columns[rank];
            let across = filled[rank] + extent.breadth / 2.0;
            filled[rank] += extent.breadth + hints.node_sep;

            let idx = sim.add_node(NodeData {
                x: (start + depth / 2.0) as f32,
                y: across as f32,
                mass: 10.0,
                is_anchor: i == 0,
                user_data: node.id.clone(),
            });
            indices.insert(node.id.as_str(), idx);
            seeds.insert(node.id.as_str(), across);
        }
        for edge in edges {
            if let (Some(&source), Some(&target)) =
                (indices.get(edge.source.as_str()), indices.get(edge.target.as_str()))
            {
                sim.add_edge(source, target, EdgeData::default());
            }
        }

        for _ in 0..SIMULATION_STEPS {
            sim.update(STEP_SECONDS);
        }

        let mut settled: HashMap<NodeId, f64> = HashMap::with_capacity(nodes.len());
        sim.visit_nodes(|node| {
            settled.insert(node.data.user_data.clone(), node.y() as f64);
        });

        // Keep the simulated order within each column, then push apart overlaps
        let mut by_rank: Vec<Vec<(&GraphNode, f64)>> = vec![Vec::new(); rank_count];
        for node in nodes {
            let center = settled
                .get(&node.id)
                .copied()
                .filter(|y| y.is_finite())
                .or_else(|| seeds.get(node.id.as_str()).copied())
                .unwrap_or_default();
            by_rank[rank_of(&node.id)].push((node, center));
        }

        let mut placed: Vec<(&GraphNode, usize, f64)> = Vec::with_capacity(nodes.len());
        for (rank, mut column) in by_rank.into_iter().enumerate() {
            column.sort_by(|a, b| a.1.total_cmp(&b.1));
            let mut floor = f64::NEG_INFINITY;
            for (node, center) in column {
                let breadth = Extent::of(node, hints.rank_dir).breadth;
                let top = (center - breadth / 2.0).max(floor);
                floor = top + breadth + hints.node_sep;
                placed.push((node, rank, top));
            }
        }

        let lowest = placed.iter().map(|(_, _, top)| *top).fold(f64::INFINITY, f64::min);
        let shift = across_margin - lowest;

        placed
            .into_iter()
            .map(|(node, rank, top)| {
                let (start, depth) = columns[rank];
                let along = start + (depth - Extent::of(node, hints.rank_dir).depth) / 2.0;
                let across = top + shift;
                let position = match hints.rank_dir {
                    RankDir::LeftRight => Position { x: along, y: across },
                    RankDir::TopBottom => Position { x: across, y: along },
                };
                (node.id.clone(), position)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explore::node::ROOT_NODE_ID;

    const EPSILON: f64 = 1e-6;

    fn sample() -> (Vec<GraphNode>, Vec<GraphEdge>) {
        let mut root = GraphNode::loading_answer(ROOT_NODE_ID, "root", "body");
        root.state = crate::explore::NodeState::Loaded;
        let nodes = vec![
            root,
            GraphNode::question("question-0", "a"),
            GraphNode::question("question-1", "b"),
            GraphNode::question("question-2", "c"),
        ];
        let edges = vec![
            GraphEdge::new(ROOT_NODE_ID, "question-0"),
            GraphEdge::new(ROOT_NODE_ID, "question-1"),
            GraphEdge::new(ROOT_NODE_ID, "question-2"),
        ];
        (nodes, edges)
    }

    #[test]
    fn test_hints_depend_on_expansion() {
        assert_eq!(LayoutHints::for_graph(true).rank_sep, 200.0);
        assert_eq!(LayoutHints::for_graph(false).rank_sep, 100.0);
        assert_eq!(LayoutHints::for_graph(false).margin_x, 200.0);
    }

    #[test]
    fn test_ranks_follow_edges() {
        let (mut nodes, mut edges) = sample();
        nodes.push(GraphNode::question("question-3", "d"));
        edges.push(GraphEdge::new("question-0", "question-3"));
        let ranks = assign_ranks(&nodes, &edges);
        assert_eq!(ranks[ROOT_NODE_ID], 0);
        assert_eq!(ranks["question-1"], 1);
        assert_eq!(ranks["question-3"], 2);
    }

    #[test]
    fn test_cycle_still_ranked() {
        let nodes = vec![GraphNode::question("a", "a"), GraphNode::question("b", "b")];
        let edges = vec![GraphEdge::new("a", "b"), GraphEdge::new("b", "a")];
        let ranks = assign_ranks(&nodes, &edges);
        assert_eq!(ranks["a"], 0);
        assert_eq!(ranks["b"], 1);
    }

    #[test]
    fn test_children_pinned_right_of_parent() {
        let (nodes, edges) = sample();
        let hints = LayoutHints::for_graph(true);
        let positions = ForceLayout.layout(&nodes, &edges, &hints);

        assert_eq!(positions[ROOT_NODE_ID].x, 200.0);
        for id in ["question-0", "question-1", "question-2"] {
            // root width 600 + ranksep 200
            assert_eq!(positions[id].x, 200.0 + 600.0 + 200.0);
        }
    }

    #[test]
    fn test_column_members_do_not_overlap() {
        let (nodes, edges) = sample();
        let positions = ForceLayout.layout(&nodes, &edges, &LayoutHints::for_graph(true));
        let mut ys: Vec<f64> = ["question-0", "question-1", "question-2"]
            .iter()
            .map(|id| positions[*id].y)
            .collect();
        ys.sort_by(f64::total_cmp);
        // question height 100 + nodesep 100
        assert!(ys[1] - ys[0] >= 200.0 - EPSILON);
        assert!(ys[2] - ys[1] >= 200.0 - EPSILON);
    }

    #[test]
    fn test_cross_axis_starts_at_margin() {
        let (nodes, edges) = sample();
        let positions = ForceLayout.layout(&nodes, &edges, &LayoutHints::for_graph(true));
        let lowest = positions.values().map(|p| p.y).fold(f64::INFINITY, f64::min);
        assert!((lowest - 200.0).abs() < EPSILON);
        assert!(positions.values().all(|p| p.x.is_finite() && p.y.is_finite()));
    }

    #[test]
    fn test_top_bottom_swaps_axes() {
        let (nodes, edges) = sample();
        let hints = LayoutHints {
            rank_dir: RankDir::TopBottom,
            ..LayoutHints::for_graph(true)
        };
        let positions = ForceLayout.layout(&nodes, &edges, &hints);
        assert_eq!(positions[ROOT_NODE_ID].y, 200.0);
        // root height 500 + ranksep 200
        assert_eq!(positions["question-0"].y, 200.0 + 500.0 + 200.0);
    }

    #[test]
    fn test_every_node_positioned() {
        let (mut nodes, edges) = sample();
        nodes.push(GraphNode::question("orphan", "z"));
        let positions = ForceLayout.layout(&nodes, &edges, &LayoutHints::for_graph(false));
        assert_eq!(positions.len(), nodes.len());
        // centred in the root's 600-wide column
        assert_eq!(positions["orphan"].x, 200.0 + (600.0 - 300.0) / 2.0);
    }

    #[test]
    fn test_empty_graph() {
        assert!(ForceLayout.layout(&[], &[], &LayoutHints::for_graph(false)).is_empty());
    }
}
