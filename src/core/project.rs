//! The project aggregate: plan graph, sprints, team, and saved versions.
//!
//! [`Project`] is the sole unit of undo/redo and versioning; no sub-entity
//! is snapshotted independently. Between commits a `Project` value is
//! treated as immutable - every mutation clones it into a next value, so
//! history entries can hold the previous values directly.

use crate::core::edge::Edge;
use crate::core::node::Node;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Project lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProjectPhase {
    /// The plan is being shaped.
    #[default]
    Planning,
    /// Execution has begun.
    Active,
}

/// Sprint lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SprintStatus {
    #[default]
    Planning,
    Active,
    Completed,
}

/// A sprint grouping plan nodes over a time window.
///
/// `node_ids` is denormalized from each member node's `sprint_id`; the
/// sprint-assignment mutation keeps the two in step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprint {
    pub id: Uuid,
    pub name: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[serde(default)]
    pub status: SprintStatus,
    /// Member nodes, mirrored from `Node::sprint_id`.
    #[serde(default)]
    pub node_ids: Vec<Uuid>,
}

impl Sprint {
    /// Creates a new sprint in planning state with no members.
    #[must_use]
    pub fn new(name: impl Into<String>, starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            starts_at,
            ends_at,
            status: SprintStatus::default(),
            node_ids: Vec::new(),
        }
    }
}

/// A member of the project team, referenced by node assignees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
}

impl TeamMember {
    #[must_use]
    pub fn new(name: impl Into<String>, role: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            role,
        }
    }
}

/// The graph state captured by a saved version.
///
/// Snapshots are immutable once created: saving and restoring both deep-copy,
/// so live edits can never reach back into a stored snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSnapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A named, addressable version of the plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectVersion {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    /// Version this one was saved on top of, for lineage.
    #[serde(default)]
    pub parent_version_id: Option<Uuid>,
    pub snapshot: PlanSnapshot,
}

/// The root aggregate owning the whole plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Unique project ID.
    pub id: Uuid,
    /// Owning user.
    #[serde(default)]
    pub owner_id: Option<Uuid>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub phase: ProjectPhase,
    /// Flat node collection; order is the canvas stacking order.
    #[serde(default)]
    pub nodes: Vec<Node>,
    /// Flat typed-edge collection.
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub sprints: Vec<Sprint>,
    #[serde(default)]
    pub versions: Vec<ProjectVersion>,
    #[serde(default)]
    pub members: Vec<TeamMember>,
    /// Version the live plan currently tracks, when any.
    #[serde(default)]
    pub current_version_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Creates an empty project in planning phase.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id: None,
            title: title.into(),
            description: None,
            phase: ProjectPhase::default(),
            nodes: Vec::new(),
            edges: Vec::new(),
            sprints: Vec::new(),
            versions: Vec::new(),
            members: Vec::new(),
            current_version_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the owning user.
    #[must_use]
    pub fn with_owner(mut self, owner_id: Uuid) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    /// Looks up a node by ID.
    #[must_use]
    pub fn node(&self, id: Uuid) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Looks up a node by ID, mutably.
    pub fn node_mut(&mut self, id: Uuid) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// Looks up a sprint by ID.
    #[must_use]
    pub fn sprint(&self, id: Uuid) -> Option<&Sprint> {
        self.sprints.iter().find(|s| s.id == id)
    }

    /// Looks up a sprint by ID, mutably.
    pub fn sprint_mut(&mut self, id: Uuid) -> Option<&mut Sprint> {
        self.sprints.iter_mut().find(|s| s.id == id)
    }

    /// Looks up a saved version by ID.
    #[must_use]
    pub fn version(&self, id: Uuid) -> Option<&ProjectVersion> {
        self.versions.iter().find(|v| v.id == id)
    }

    /// Direct children of a node, in collection order.
    #[must_use]
    pub fn children_of(&self, id: Uuid) -> Vec<&Node> {
        self.nodes
            .iter()
            .filter(|n| n.parent_id == Some(id))
            .collect()
    }

    /// All transitive descendants of a node, parents before children.
    ///
    /// The returned order guarantees that any descendant's parent appears
    /// earlier in the list (or is the root itself), which duplication
    /// relies on when building its ID remap top-down.
    #[must_use]
    pub fn descendants_of(&self, id: Uuid) -> Vec<Uuid> {
        let mut result = Vec::new();
        let mut frontier = vec![id];
        while let Some(current) = frontier.pop() {
            for node in &self.nodes {
                if node.parent_id == Some(current) {
                    result.push(node.id);
                    frontier.push(node.id);
                }
            }
        }
        result
    }

    /// Returns true when `candidate` is `node` itself or one of its
    /// ancestors by the parent chain.
    ///
    /// The walk is bounded by the node count so a malformed parent cycle
    /// cannot loop forever.
    #[must_use]
    pub fn is_self_or_ancestor(&self, candidate: Uuid, node: Uuid) -> bool {
        let mut current = Some(node);
        let mut steps = 0;
        while let Some(id) = current {
            if id == candidate {
                return true;
            }
            steps += 1;
            if steps > self.nodes.len() {
                return false;
            }
            current = self.node(id).and_then(|n| n.parent_id);
        }
        false
    }

    /// Deep-copies the versioned portion of the plan.
    #[must_use]
    pub fn snapshot(&self) -> PlanSnapshot {
        PlanSnapshot {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
        }
    }

    /// Removes the given node IDs from every sprint's member list.
    pub(crate) fn prune_sprint_members(&mut self, removed: &HashSet<Uuid>) {
        for sprint in &mut self.sprints {
            sprint.node_ids.retain(|id| !removed.contains(id));
        }
    }

    /// Rebuilds every sprint's denormalized `node_ids` from the nodes'
    /// `sprint_id` fields, clearing node references to sprints that do not
    /// exist. Used after wholesale node replacement (plan ingest, version
    /// restore), where the incoming nodes are the source of truth.
    pub(crate) fn rebuild_sprint_members(&mut self) {
        let sprint_ids: HashSet<Uuid> = self.sprints.iter().map(|s| s.id).collect();
        for node in &mut self.nodes {
            if node.sprint_id.is_some_and(|sid| !sprint_ids.contains(&sid)) {
                node.sprint_id = None;
            }
        }

        let mut members: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for node in &self.nodes {
            if let Some(sid) = node.sprint_id {
                members.entry(sid).or_default().push(node.id);
            }
        }
        for sprint in &mut self.sprints {
            sprint.node_ids = members.remove(&sprint.id).unwrap_or_default();
        }
    }

    /// Bumps the modification timestamp.
    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::node::NodeKind;

    fn tree_project() -> (Project, Uuid, Uuid, Uuid) {
        let mut project = Project::new("test");
        let root = Node::new(NodeKind::Goal, "root");
        let root_id = root.id;
        let mid = Node::new(NodeKind::Subgoal, "mid").with_parent(root_id);
        let mid_id = mid.id;
        let leaf = Node::new(NodeKind::Feature, "leaf").with_parent(mid_id);
        let leaf_id = leaf.id;
        project.nodes = vec![root, mid, leaf];
        (project, root_id, mid_id, leaf_id)
    }

    #[test]
    fn descendants_are_transitive_and_ordered() {
        let (project, root_id, mid_id, leaf_id) = tree_project();
        let descendants = project.descendants_of(root_id);
        assert_eq!(descendants, vec![mid_id, leaf_id]);
    }

    #[test]
    fn descendants_of_leaf_is_empty() {
        let (project, _, _, leaf_id) = tree_project();
        assert!(project.descendants_of(leaf_id).is_empty());
    }

    #[test]
    fn ancestor_walk() {
        let (project, root_id, mid_id, leaf_id) = tree_project();
        assert!(project.is_self_or_ancestor(root_id, leaf_id));
        assert!(project.is_self_or_ancestor(mid_id, leaf_id));
        assert!(project.is_self_or_ancestor(leaf_id, leaf_id));
        assert!(!project.is_self_or_ancestor(leaf_id, root_id));
    }

    #[test]
    fn snapshot_is_isolated_from_live_edits() {
        let (mut project, root_id, _, _) = tree_project();
        let snapshot = project.snapshot();

        project.node_mut(root_id).unwrap().title = "renamed".to_string();
        project.nodes.pop();

        assert_eq!(snapshot.nodes.len(), 3);
        assert_eq!(snapshot.nodes[0].title, "root");
    }

    #[test]
    fn rebuild_sprint_members_mirrors_node_fields() {
        let (mut project, root_id, mid_id, _) = tree_project();
        let mut sprint = Sprint::new("Sprint 1", Utc::now(), Utc::now());
        // Stale entry from a node set that has since been replaced.
        sprint.node_ids = vec![Uuid::new_v4()];
        let sprint_id = sprint.id;
        project.sprints.push(sprint);

        project.node_mut(root_id).unwrap().sprint_id = Some(sprint_id);
        project.node_mut(mid_id).unwrap().sprint_id = Some(Uuid::new_v4());

        project.rebuild_sprint_members();

        assert_eq!(project.sprint(sprint_id).unwrap().node_ids, vec![root_id]);
        // The reference to a nonexistent sprint was cleared.
        assert!(project.node(mid_id).unwrap().sprint_id.is_none());
    }

    #[test]
    fn project_serialization_roundtrip() {
        let (project, _, _, _) = tree_project();
        let json = serde_json::to_string(&project).expect("serialize");
        let restored: Project = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(project, restored);
    }
}
