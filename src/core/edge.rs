//! Typed dependency edges between plan nodes.
//!
//! These are the semantic relations layered on top of the `parent_id`
//! hierarchy (blocks, depends-on, informs, ...). The implicit hierarchy
//! connectors drawn on the canvas are synthesized by the projection and
//! never stored as [`Edge`] values.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The semantic type of a dependency edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    /// Parent/child connector (only ever synthesized, never stored).
    Hierarchy,
    /// Source blocks target from proceeding.
    Blocks,
    /// Source depends on target.
    DependsOn,
    /// Source informs target's design.
    Informs,
    /// Source defines target (spec → feature).
    Defines,
    /// Source implements target (task → spec).
    Implements,
    /// Source references target.
    References,
    /// Source supersedes target.
    Supersedes,
}

impl EdgeType {
    /// Human label used when an edge carries no explicit one.
    #[must_use]
    pub fn default_label(self) -> &'static str {
        match self {
            Self::Hierarchy => "contains",
            Self::Blocks => "blocks",
            Self::DependsOn => "depends on",
            Self::Informs => "informs",
            Self::Defines => "defines",
            Self::Implements => "implements",
            Self::References => "references",
            Self::Supersedes => "supersedes",
        }
    }

    /// Visual style for edges of this type.
    #[must_use]
    pub fn style(self) -> EdgeStyle {
        match self {
            Self::Hierarchy => EdgeStyle::new(true, "#94a3b8", false),
            Self::Blocks => EdgeStyle::new(false, "#ef4444", true),
            Self::DependsOn => EdgeStyle::new(true, "#f97316", true),
            Self::Informs => EdgeStyle::new(true, "#3b82f6", false),
            Self::Defines => EdgeStyle::new(false, "#8b5cf6", false),
            Self::Implements => EdgeStyle::new(false, "#22c55e", false),
            Self::References => EdgeStyle::new(true, "#6b7280", false),
            Self::Supersedes => EdgeStyle::new(false, "#0f172a", false),
        }
    }
}

impl std::fmt::Display for EdgeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Hierarchy => "hierarchy",
            Self::Blocks => "blocks",
            Self::DependsOn => "depends_on",
            Self::Informs => "informs",
            Self::Defines => "defines",
            Self::Implements => "implements",
            Self::References => "references",
            Self::Supersedes => "supersedes",
        };
        write!(f, "{s}")
    }
}

/// Visual style descriptor derived purely from [`EdgeType`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeStyle {
    /// Dashed vs solid stroke.
    pub dashed: bool,
    /// Stroke color (CSS hex).
    pub color: String,
    /// Whether the edge animates flow direction.
    pub animated: bool,
}

impl EdgeStyle {
    #[must_use]
    pub fn new(dashed: bool, color: &str, animated: bool) -> Self {
        Self {
            dashed,
            color: color.to_string(),
            animated,
        }
    }
}

/// A stored dependency edge between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Unique edge ID.
    pub id: Uuid,
    /// Source node.
    pub source: Uuid,
    /// Target node.
    pub target: Uuid,
    /// Relation type.
    pub edge_type: EdgeType,
    /// Display label.
    #[serde(default)]
    pub label: Option<String>,
}

impl Edge {
    /// Creates a new edge; when no label is supplied the type's default
    /// label is assigned.
    #[must_use]
    pub fn new(source: Uuid, target: Uuid, edge_type: EdgeType, label: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            target,
            edge_type,
            label: label.or_else(|| Some(edge_type.default_label().to_string())),
        }
    }

    /// Returns true when the other endpoints describe the same relation.
    #[must_use]
    pub fn matches(&self, source: Uuid, target: Uuid, edge_type: EdgeType) -> bool {
        self.source == source && self.target == target && self.edge_type == edge_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_label_fills_in() {
        let edge = Edge::new(Uuid::new_v4(), Uuid::new_v4(), EdgeType::Blocks, None);
        assert_eq!(edge.label.as_deref(), Some("blocks"));
    }

    #[test]
    fn explicit_label_wins() {
        let edge = Edge::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            EdgeType::DependsOn,
            Some("needs".to_string()),
        );
        assert_eq!(edge.label.as_deref(), Some("needs"));
    }

    #[test]
    fn blocking_edges_animate() {
        let style = EdgeType::Blocks.style();
        assert!(style.animated);
        assert!(!style.dashed);
    }

    #[test]
    fn hierarchy_style_is_neutral_dashed() {
        let style = EdgeType::Hierarchy.style();
        assert!(style.dashed);
        assert!(!style.animated);
    }

    #[test]
    fn edge_type_serializes_snake_case() {
        let json = serde_json::to_string(&EdgeType::DependsOn).expect("serialize");
        assert_eq!(json, "\"depends_on\"");
    }
}
