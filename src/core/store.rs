//! `PlanStore` - the mutation engine owning the current plan state.
//!
//! The store holds the current [`Project`], the derived canvas
//! [`Projection`], and the undo/redo [`EditHistory`], and exposes one
//! method per distinct edit intent. Every operation follows the same
//! shape: resolve the referenced entities against the *current* project,
//! bail out as a silent no-op when anything is missing or an invariant
//! would break, otherwise clone the project into a next value, edit that
//! value, and commit it. Callers learn about failure only from the return
//! value; there is no error path.
//!
//! Two commit paths exist. The undoable path records the pre-mutation
//! project for undo and clears redo; the view-only path (collapse
//! toggling) replaces the current project without touching history, so
//! presentation clicks never flood the edit history. Both recompute the
//! projection, carrying node positions forward.

use crate::core::edge::{Edge, EdgeType};
use crate::core::history::{EditHistory, DEFAULT_UNDO_CAPACITY};
use crate::core::node::{
    Comment, DocBlock, Node, NodeKind, NodeStatus, PrdSection, Priority, PromptEntry, Question,
};
use crate::core::project::{
    Project, ProjectPhase, ProjectVersion, Sprint, SprintStatus, TeamMember,
};
use crate::core::projection::{self, FlowEdge, FlowNode, Position, Projection};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use uuid::Uuid;

/// A multi-field update to one node.
///
/// `None` leaves a field untouched. For fields that are themselves
/// optional on [`Node`], `Some(None)` clears the field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodePatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<NodeStatus>,
    pub assignee_id: Option<Option<Uuid>>,
    pub priority: Option<Option<Priority>>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub estimate_hours: Option<Option<f64>>,
    pub tags: Option<Vec<String>>,
    pub content: Option<Option<String>>,
    pub image_urls: Option<Vec<String>>,
    pub prd_sections: Option<Vec<PrdSection>>,
    pub prompt_entries: Option<Vec<PromptEntry>>,
    pub acceptance_criteria: Option<Vec<String>>,
    pub version_label: Option<Option<String>>,
    pub subtype: Option<Option<String>>,
    pub url: Option<Option<String>>,
    pub blocks: Option<Vec<DocBlock>>,
}

impl NodePatch {
    fn apply(&self, node: &mut Node) {
        if let Some(title) = &self.title {
            node.title = title.clone();
        }
        if let Some(description) = &self.description {
            node.description = description.clone();
        }
        if let Some(status) = self.status {
            node.status = status;
        }
        if let Some(assignee_id) = self.assignee_id {
            node.assignee_id = assignee_id;
        }
        if let Some(priority) = self.priority {
            node.priority = priority;
        }
        if let Some(due_date) = self.due_date {
            node.due_date = due_date;
        }
        if let Some(estimate_hours) = self.estimate_hours {
            node.estimate_hours = estimate_hours;
        }
        if let Some(tags) = &self.tags {
            node.tags = tags.clone();
        }
        if let Some(content) = &self.content {
            node.content = content.clone();
        }
        if let Some(image_urls) = &self.image_urls {
            node.image_urls = image_urls.clone();
        }
        if let Some(prd_sections) = &self.prd_sections {
            node.prd_sections = prd_sections.clone();
        }
        if let Some(prompt_entries) = &self.prompt_entries {
            node.prompt_entries = prompt_entries.clone();
        }
        if let Some(acceptance_criteria) = &self.acceptance_criteria {
            node.acceptance_criteria = acceptance_criteria.clone();
        }
        if let Some(version_label) = &self.version_label {
            node.version_label = version_label.clone();
        }
        if let Some(subtype) = &self.subtype {
            node.subtype = subtype.clone();
        }
        if let Some(url) = &self.url {
            node.url = url.clone();
        }
        if let Some(blocks) = &self.blocks {
            node.blocks = blocks.clone();
        }
    }
}

/// The state engine: current project, derived projection, edit history.
///
/// One store per open plan; opening another plan means loading a new
/// project, which resets history. The store is single-threaded and
/// synchronous - async callers (AI suggestion handlers) simply invoke
/// operations when their results arrive, and the no-op failure semantics
/// make races against local deletions resolve as last-write-wins.
#[derive(Debug)]
pub struct PlanStore {
    project: Project,
    projection: Projection,
    history: EditHistory,
}

impl PlanStore {
    /// Creates a store around the given project with default undo capacity.
    #[must_use]
    pub fn new(project: Project) -> Self {
        Self::with_capacity(project, DEFAULT_UNDO_CAPACITY)
    }

    /// Creates a store with an explicit undo capacity.
    #[must_use]
    pub fn with_capacity(project: Project, capacity: usize) -> Self {
        let projection = projection::derive(&project.nodes, &project.edges, &Projection::default());
        Self {
            project,
            projection,
            history: EditHistory::new(capacity),
        }
    }

    /// The current authoritative project.
    #[must_use]
    pub fn project(&self) -> &Project {
        &self.project
    }

    /// The current derived projection.
    #[must_use]
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Renderable nodes of the current projection.
    #[must_use]
    pub fn flow_nodes(&self) -> &[FlowNode] {
        &self.projection.flow_nodes
    }

    /// Renderable edges of the current projection.
    #[must_use]
    pub fn flow_edges(&self) -> &[FlowEdge] {
        &self.projection.flow_edges
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ---- Commit paths ----------------------------------------------------

    fn commit(&mut self, next: Project) {
        let previous = std::mem::replace(&mut self.project, next);
        self.history.record(previous);
        self.reproject();
    }

    fn commit_view_only(&mut self, next: Project) {
        self.project = next;
        self.reproject();
    }

    fn reproject(&mut self) {
        self.projection =
            projection::derive(&self.project.nodes, &self.project.edges, &self.projection);
    }

    // ---- Undo / redo -----------------------------------------------------

    /// Reverts the last undoable mutation. Returns false when there is
    /// nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.history.undo(self.project.clone()) else {
            return false;
        };
        self.project = previous;
        self.reproject();
        true
    }

    /// Re-applies the last undone mutation. Returns false when there is
    /// nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.history.redo(self.project.clone()) else {
            return false;
        };
        self.project = next;
        self.reproject();
        true
    }

    /// Replaces the current project wholesale (opening a different plan).
    /// History does not span across plans, so both stacks reset and the
    /// projection starts fresh with no carried positions.
    pub fn load_project(&mut self, project: Project) {
        self.history.clear();
        self.projection =
            projection::derive(&project.nodes, &project.edges, &Projection::default());
        self.project = project;
    }

    // ---- Structural mutations -------------------------------------------

    /// Adds a free-standing node of the given kind. Always succeeds.
    pub fn add_free_node(&mut self, kind: NodeKind, title: impl Into<String>) -> Uuid {
        let node = Node::new(kind, title);
        let id = node.id;
        let mut next = self.project.clone();
        next.nodes.push(node);
        next.touch();
        self.commit(next);
        id
    }

    /// Adds a child under `parent_id` with the kind the parent's kind maps
    /// to. No-op when the parent is missing or its kind permits no child.
    pub fn add_child_node(&mut self, parent_id: Uuid, title: impl Into<String>) -> Option<Uuid> {
        let parent = self.project.node(parent_id)?;
        let kind = parent.kind.child_kind()?;
        let node = Node::new(kind, title).with_parent(parent_id);
        let id = node.id;
        let mut next = self.project.clone();
        next.nodes.push(node);
        next.touch();
        self.commit(next);
        Some(id)
    }

    /// Deletes a node and every transitive descendant in one pass.
    ///
    /// Dependency edges touching removed nodes are left in place; the
    /// projection filters edges by live endpoints, so they can never be
    /// rendered. Sprint member lists are pruned so they keep mirroring the
    /// surviving nodes' `sprint_id`s. No-op when the ID is unknown.
    pub fn delete_node(&mut self, id: Uuid) -> bool {
        if self.project.node(id).is_none() {
            return false;
        }
        let mut doomed: HashSet<Uuid> = self.project.descendants_of(id).into_iter().collect();
        doomed.insert(id);

        let mut next = self.project.clone();
        next.nodes.retain(|n| !doomed.contains(&n.id));
        next.prune_sprint_members(&doomed);
        next.touch();
        self.commit(next);
        true
    }

    /// Deep-clones a node, optionally with its whole subtree.
    ///
    /// The clone's title gets a "(Copy)" suffix, every clone gets a fresh
    /// ID, and descendant clones have their `parent_id` rewritten through
    /// an ID remap built top-down, so each clone parents another clone
    /// from the same call, never an original. Clones drop sprint
    /// membership so sprint member lists stay consistent. Returns the
    /// cloned root's ID, or `None` when the target does not exist.
    pub fn duplicate_node(&mut self, id: Uuid, with_children: bool) -> Option<Uuid> {
        let original = self.project.node(id)?.clone();

        let mut remap = std::collections::HashMap::new();
        let mut root = original.clone();
        root.id = Uuid::new_v4();
        root.title = format!("{} (Copy)", original.title);
        root.sprint_id = None;
        remap.insert(id, root.id);
        let root_id = root.id;

        let mut clones = vec![root];
        if with_children {
            // descendants_of yields parents before children, so the remap
            // always resolves a clone's parent by the time it is needed.
            for descendant_id in self.project.descendants_of(id) {
                let Some(descendant) = self.project.node(descendant_id) else {
                    continue;
                };
                let mut clone = descendant.clone();
                clone.id = Uuid::new_v4();
                clone.sprint_id = None;
                remap.insert(descendant_id, clone.id);
                clone.parent_id = descendant.parent_id.and_then(|p| remap.get(&p).copied());
                clones.push(clone);
            }
        }

        let mut next = self.project.clone();
        next.nodes.extend(clones);
        next.touch();
        self.commit(next);
        Some(root_id)
    }

    /// Reparents `child` under `new_parent` (drag-to-connect).
    ///
    /// No-op when either node is missing, when the child is already under
    /// that exact parent, or when the move would create a cycle (the new
    /// parent sits in the child's own subtree).
    pub fn set_node_parent(&mut self, child: Uuid, new_parent: Uuid) -> bool {
        if self.project.node(new_parent).is_none() {
            return false;
        }
        let Some(node) = self.project.node(child) else {
            return false;
        };
        if node.parent_id == Some(new_parent) {
            return false;
        }
        if self.project.is_self_or_ancestor(child, new_parent) {
            return false;
        }

        let mut next = self.project.clone();
        if let Some(n) = next.node_mut(child) {
            n.parent_id = Some(new_parent);
        }
        next.touch();
        self.commit(next);
        true
    }

    /// Replaces the whole plan graph (AI plan generation). Undoable like
    /// any other structural edit. Sprint member lists are rebuilt from the
    /// incoming nodes' `sprint_id`s so they never reference replaced nodes.
    pub fn ingest_plan(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) {
        let mut next = self.project.clone();
        next.nodes = nodes;
        next.edges = edges;
        next.rebuild_sprint_members();
        next.touch();
        self.commit(next);
    }

    // ---- Field-level mutations ------------------------------------------

    /// Applies a multi-field patch to one node. No-op when the node is
    /// missing or the patch changes nothing (avoids vacuous undo entries).
    pub fn update_node(&mut self, id: Uuid, patch: &NodePatch) -> bool {
        let Some(original) = self.project.node(id) else {
            return false;
        };
        let mut patched = original.clone();
        patch.apply(&mut patched);
        if patched == *original {
            return false;
        }

        let mut next = self.project.clone();
        if let Some(n) = next.node_mut(id) {
            *n = patched;
        }
        next.touch();
        self.commit(next);
        true
    }

    /// Reassigns a node's kind. Existing children are deliberately not
    /// revalidated against the new kind's child mapping.
    pub fn change_node_kind(&mut self, id: Uuid, kind: NodeKind) -> bool {
        let Some(node) = self.project.node(id) else {
            return false;
        };
        if node.kind == kind {
            return false;
        }
        let mut next = self.project.clone();
        if let Some(n) = next.node_mut(id) {
            n.kind = kind;
        }
        next.touch();
        self.commit(next);
        true
    }

    /// Toggles whether a node's children are hidden. View-only: affects
    /// presentation, not plan semantics, so it never enters the undo
    /// history.
    pub fn toggle_node_collapse(&mut self, id: Uuid) -> bool {
        if self.project.node(id).is_none() {
            return false;
        }
        let mut next = self.project.clone();
        if let Some(n) = next.node_mut(id) {
            n.collapsed = !n.collapsed;
        }
        self.commit_view_only(next);
        true
    }

    // ---- Questions and comments -----------------------------------------

    /// Adds an AI-proposed question to a node. Idempotent by prompt text:
    /// a question whose text already exists on the node is dropped, so
    /// repeated suggestion passes do not duplicate. Returns the new
    /// question's ID.
    pub fn add_question(
        &mut self,
        node_id: Uuid,
        prompt: impl Into<String>,
        options: Option<Vec<String>>,
    ) -> Option<Uuid> {
        self.push_question(node_id, Question::new(prompt, options))
    }

    /// Adds a user-authored question, with the same text-idempotence as
    /// [`add_question`](Self::add_question).
    pub fn add_custom_question(&mut self, node_id: Uuid, prompt: impl Into<String>) -> Option<Uuid> {
        self.push_question(node_id, Question::custom(prompt))
    }

    fn push_question(&mut self, node_id: Uuid, question: Question) -> Option<Uuid> {
        let node = self.project.node(node_id)?;
        if node.has_question(&question.prompt) {
            return None;
        }
        let id = question.id;
        let mut next = self.project.clone();
        if let Some(n) = next.node_mut(node_id) {
            n.questions.push(question);
        }
        next.touch();
        self.commit(next);
        Some(id)
    }

    /// Records an answer to a node's question. No-op when either ID is
    /// unknown.
    pub fn answer_question(
        &mut self,
        node_id: Uuid,
        question_id: Uuid,
        answer: impl Into<String>,
    ) -> bool {
        let Some(node) = self.project.node(node_id) else {
            return false;
        };
        if !node.questions.iter().any(|q| q.id == question_id) {
            return false;
        }
        let mut next = self.project.clone();
        if let Some(n) = next.node_mut(node_id) {
            if let Some(q) = n.questions.iter_mut().find(|q| q.id == question_id) {
                q.answer = Some(answer.into());
            }
        }
        next.touch();
        self.commit(next);
        true
    }

    /// Adds a comment to a node. No-op when the node or author is unknown.
    pub fn add_comment(
        &mut self,
        node_id: Uuid,
        author_id: Uuid,
        text: impl Into<String>,
    ) -> Option<Uuid> {
        self.project.node(node_id)?;
        self.project.members.iter().find(|m| m.id == author_id)?;

        let comment = Comment {
            id: Uuid::new_v4(),
            author_id,
            text: text.into(),
            created_at: Utc::now(),
        };
        let id = comment.id;
        let mut next = self.project.clone();
        if let Some(n) = next.node_mut(node_id) {
            n.comments.push(comment);
        }
        next.touch();
        self.commit(next);
        Some(id)
    }

    // ---- Dependency edges ------------------------------------------------

    /// Adds a typed dependency edge. No-op when either endpoint is missing
    /// or an edge with the same (source, target, type) already exists.
    /// When no label is given the type's default label is assigned.
    pub fn add_dependency_edge(
        &mut self,
        source: Uuid,
        target: Uuid,
        edge_type: EdgeType,
        label: Option<String>,
    ) -> Option<Uuid> {
        self.project.node(source)?;
        self.project.node(target)?;
        if self
            .project
            .edges
            .iter()
            .any(|e| e.matches(source, target, edge_type))
        {
            return None;
        }

        let edge = Edge::new(source, target, edge_type, label);
        let id = edge.id;
        let mut next = self.project.clone();
        next.edges.push(edge);
        next.touch();
        self.commit(next);
        Some(id)
    }

    /// Removes a dependency edge by ID. No-op when unknown.
    pub fn remove_edge(&mut self, id: Uuid) -> bool {
        if !self.project.edges.iter().any(|e| e.id == id) {
            return false;
        }
        let mut next = self.project.clone();
        next.edges.retain(|e| e.id != id);
        next.touch();
        self.commit(next);
        true
    }

    // ---- Sprints ---------------------------------------------------------

    /// Creates a sprint in planning state.
    pub fn create_sprint(
        &mut self,
        name: impl Into<String>,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    ) -> Uuid {
        let sprint = Sprint::new(name, starts_at, ends_at);
        let id = sprint.id;
        let mut next = self.project.clone();
        next.sprints.push(sprint);
        next.touch();
        self.commit(next);
        id
    }

    /// Moves a sprint through its lifecycle. No-op when unknown or
    /// unchanged.
    pub fn set_sprint_status(&mut self, id: Uuid, status: SprintStatus) -> bool {
        let Some(sprint) = self.project.sprint(id) else {
            return false;
        };
        if sprint.status == status {
            return false;
        }
        let mut next = self.project.clone();
        if let Some(s) = next.sprint_mut(id) {
            s.status = status;
        }
        next.touch();
        self.commit(next);
        true
    }

    /// Deletes a sprint, unassigning every member node.
    pub fn delete_sprint(&mut self, id: Uuid) -> bool {
        if self.project.sprint(id).is_none() {
            return false;
        }
        let mut next = self.project.clone();
        next.sprints.retain(|s| s.id != id);
        for node in &mut next.nodes {
            if node.sprint_id == Some(id) {
                node.sprint_id = None;
            }
        }
        next.touch();
        self.commit(next);
        true
    }

    /// Assigns a node to a sprint (or to none), updating the old and new
    /// sprint's member lists in the same commit so the denormalized lists
    /// never drift from the per-node field. No-op when the node or target
    /// sprint is missing, or when nothing would change.
    pub fn assign_node_to_sprint(&mut self, node_id: Uuid, sprint_id: Option<Uuid>) -> bool {
        let Some(node) = self.project.node(node_id) else {
            return false;
        };
        if let Some(sid) = sprint_id {
            if self.project.sprint(sid).is_none() {
                return false;
            }
        }
        if node.sprint_id == sprint_id {
            return false;
        }
        let old_sprint = node.sprint_id;

        let mut next = self.project.clone();
        if let Some(old) = old_sprint.and_then(|sid| next.sprint_mut(sid)) {
            old.node_ids.retain(|id| *id != node_id);
        }
        if let Some(new) = sprint_id.and_then(|sid| next.sprint_mut(sid)) {
            new.node_ids.push(node_id);
        }
        if let Some(n) = next.node_mut(node_id) {
            n.sprint_id = sprint_id;
        }
        next.touch();
        self.commit(next);
        true
    }

    // ---- Project-level ---------------------------------------------------

    /// Updates the project's title and/or description. `Some(None)` clears
    /// the description, mirroring [`NodePatch`]'s clearing convention.
    /// No-op when both arguments are `None`.
    pub fn update_project_info(
        &mut self,
        title: Option<String>,
        description: Option<Option<String>>,
    ) -> bool {
        if title.is_none() && description.is_none() {
            return false;
        }
        let mut next = self.project.clone();
        if let Some(title) = title {
            next.title = title;
        }
        if let Some(description) = description {
            next.description = description;
        }
        next.touch();
        self.commit(next);
        true
    }

    /// Moves the project between planning and active phases.
    pub fn set_phase(&mut self, phase: ProjectPhase) -> bool {
        if self.project.phase == phase {
            return false;
        }
        let mut next = self.project.clone();
        next.phase = phase;
        next.touch();
        self.commit(next);
        true
    }

    /// Adds a team member.
    pub fn add_member(&mut self, name: impl Into<String>, role: Option<String>) -> Uuid {
        let member = TeamMember::new(name, role);
        let id = member.id;
        let mut next = self.project.clone();
        next.members.push(member);
        next.touch();
        self.commit(next);
        id
    }

    /// Removes a team member, clearing any node assignments pointing at
    /// them. No-op when unknown.
    pub fn remove_member(&mut self, id: Uuid) -> bool {
        if !self.project.members.iter().any(|m| m.id == id) {
            return false;
        }
        let mut next = self.project.clone();
        next.members.retain(|m| m.id != id);
        for node in &mut next.nodes {
            if node.assignee_id == Some(id) {
                node.assignee_id = None;
            }
        }
        next.touch();
        self.commit(next);
        true
    }

    // ---- Versions --------------------------------------------------------

    /// Saves a named version: a deep copy of the current nodes, edges,
    /// title, and description. The new version becomes the project's
    /// current version and records its predecessor for lineage.
    pub fn save_version(&mut self, name: impl Into<String>) -> Uuid {
        let mut next = self.project.clone();
        let version = ProjectVersion {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at: Utc::now(),
            parent_version_id: next.current_version_id,
            snapshot: next.snapshot(),
        };
        let id = version.id;
        next.versions.push(version);
        next.current_version_id = Some(id);
        next.touch();
        self.commit(next);
        id
    }

    /// Restores a saved version onto the live project. The snapshot is
    /// deep-copied again, never aliased, so later live edits cannot reach
    /// back into the stored version. Goes through the undoable commit
    /// path, so the restore itself can be undone. Sprint member lists are
    /// rebuilt from the restored nodes' save-time `sprint_id`s. No-op when
    /// unknown.
    pub fn restore_version(&mut self, id: Uuid) -> bool {
        let Some(version) = self.project.version(id) else {
            return false;
        };
        let snapshot = version.snapshot.clone();

        let mut next = self.project.clone();
        next.nodes = snapshot.nodes;
        next.edges = snapshot.edges;
        next.title = snapshot.title;
        next.description = snapshot.description;
        next.rebuild_sprint_members();
        next.current_version_id = Some(id);
        next.touch();
        self.commit(next);
        true
    }

    /// Deletes a saved version, clearing the current-version pointer when
    /// it referenced the deleted one. No-op when unknown.
    pub fn delete_version(&mut self, id: Uuid) -> bool {
        if self.project.version(id).is_none() {
            return false;
        }
        let mut next = self.project.clone();
        next.versions.retain(|v| v.id != id);
        if next.current_version_id == Some(id) {
            next.current_version_id = None;
        }
        next.touch();
        self.commit(next);
        true
    }

    // ---- Layout feedback -------------------------------------------------

    /// Overwrites projection positions after the external layout ran.
    /// View-only: touches neither the project nor history, and the
    /// carry-forward rule preserves these positions across later commits.
    pub fn apply_layout_positions(&mut self, positions: &[(Uuid, Position)]) {
        for (id, position) in positions {
            if let Some(flow_node) = self
                .projection
                .flow_nodes
                .iter_mut()
                .find(|n| n.id == *id)
            {
                flow_node.position = *position;
            }
        }
    }
}
