//! Derived canvas projection of the plan graph.
//!
//! This module turns the authoritative node/edge collections into the
//! positioned, visibility-filtered, style-annotated set the canvas renders.
//! The projection is derived and non-authoritative: it is recomputed from
//! scratch after every commit and must never drive plan state. Positions
//! are the one piece of carried-over state - a node that already had a
//! position keeps it, so recomputation does not clobber user-arranged
//! layout.

use crate::core::edge::{Edge, EdgeStyle, EdgeType};
use crate::core::node::{Node, NodeKind, NodeStatus};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A 2-D canvas position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A renderable node: position plus the display-relevant node fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowNode {
    pub id: Uuid,
    pub kind: NodeKind,
    pub position: Position,
    pub title: String,
    pub status: NodeStatus,
    pub collapsed: bool,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    /// Number of direct children in the full graph (collapsed or not).
    pub child_count: usize,
}

/// A renderable edge with its resolved style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowEdge {
    /// Render ID; hierarchy edges use a synthetic `hierarchy-<child>` ID,
    /// dependency edges reuse the stored edge's ID.
    pub id: String,
    pub source: Uuid,
    pub target: Uuid,
    pub style: EdgeStyle,
    #[serde(default)]
    pub label: Option<String>,
}

/// The full derived visual layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Projection {
    pub flow_nodes: Vec<FlowNode>,
    pub flow_edges: Vec<FlowEdge>,
}

impl Projection {
    /// Looks up a flow node by ID.
    #[must_use]
    pub fn flow_node(&self, id: Uuid) -> Option<&FlowNode> {
        self.flow_nodes.iter().find(|n| n.id == id)
    }
}

/// Derives the projection for the given graph, carrying positions forward
/// from the previous projection where node IDs match.
///
/// A node is visible iff it is a root (no parent, or its parent is not in
/// the node set), or its parent is itself visible and not collapsed. The
/// parent-chain evaluation is memoized so deeper collapse states cascade
/// correctly regardless of iteration order.
///
/// Output ordering: nodes follow the input collection order filtered by
/// visibility; hierarchy edges come before dependency edges.
#[must_use]
pub fn derive(nodes: &[Node], edges: &[Edge], previous: &Projection) -> Projection {
    let by_id: HashMap<Uuid, &Node> = nodes.iter().map(|n| (n.id, n)).collect();

    let mut visible: HashMap<Uuid, bool> = HashMap::with_capacity(nodes.len());
    for node in nodes {
        is_visible(node.id, &by_id, &mut visible);
    }

    let mut child_counts: HashMap<Uuid, usize> = HashMap::new();
    for node in nodes {
        if let Some(parent_id) = node.parent_id {
            *child_counts.entry(parent_id).or_insert(0) += 1;
        }
    }

    let prior_positions: HashMap<Uuid, Position> = previous
        .flow_nodes
        .iter()
        .map(|n| (n.id, n.position))
        .collect();

    let flow_nodes: Vec<FlowNode> = nodes
        .iter()
        .filter(|n| visible.get(&n.id).copied().unwrap_or(false))
        .map(|n| FlowNode {
            id: n.id,
            kind: n.kind,
            position: prior_positions.get(&n.id).copied().unwrap_or_default(),
            title: n.title.clone(),
            status: n.status,
            collapsed: n.collapsed,
            parent_id: n.parent_id,
            child_count: child_counts.get(&n.id).copied().unwrap_or(0),
        })
        .collect();

    let mut flow_edges = Vec::new();

    // Hierarchy connectors, synthesized from parent references.
    for node in nodes {
        let Some(parent_id) = node.parent_id else {
            continue;
        };
        let node_visible = visible.get(&node.id).copied().unwrap_or(false);
        let parent_visible = visible.get(&parent_id).copied().unwrap_or(false);
        if node_visible && parent_visible {
            flow_edges.push(FlowEdge {
                id: format!("hierarchy-{}", node.id),
                source: parent_id,
                target: node.id,
                style: EdgeType::Hierarchy.style(),
                label: None,
            });
        }
    }

    // Stored dependency edges; stale edges whose endpoints are gone or
    // hidden are filtered here rather than pruned at delete time.
    for edge in edges {
        let source_visible = visible.get(&edge.source).copied().unwrap_or(false);
        let target_visible = visible.get(&edge.target).copied().unwrap_or(false);
        if source_visible && target_visible {
            flow_edges.push(FlowEdge {
                id: edge.id.to_string(),
                source: edge.source,
                target: edge.target,
                style: edge.edge_type.style(),
                label: edge
                    .label
                    .clone()
                    .or_else(|| Some(edge.edge_type.default_label().to_string())),
            });
        }
    }

    Projection {
        flow_nodes,
        flow_edges,
    }
}

fn is_visible(id: Uuid, by_id: &HashMap<Uuid, &Node>, memo: &mut HashMap<Uuid, bool>) -> bool {
    if let Some(&v) = memo.get(&id) {
        return v;
    }
    // Seed false before recursing so a malformed parent cycle terminates
    // (hidden) instead of overflowing the stack.
    memo.insert(id, false);

    let Some(node) = by_id.get(&id) else {
        memo.insert(id, false);
        return false;
    };
    let v = match node.parent_id {
        None => true,
        Some(parent_id) => match by_id.get(&parent_id) {
            // Dangling parent reference: treat as a root.
            None => true,
            Some(parent) => !parent.collapsed && is_visible(parent_id, by_id, memo),
        },
    };
    memo.insert(id, v);
    v
}
