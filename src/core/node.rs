//! Plan nodes - the items of the hierarchical plan.
//!
//! A [`Node`] is one entry in a project's plan: a goal, a feature, a task,
//! a document, and so on. Hierarchy is expressed through `parent_id`
//! back-references; which kinds may parent which is a closed mapping on
//! [`NodeKind`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of a plan node.
///
/// Kinds fall into a planning ladder (goal → subgoal → feature → task) and
/// a set of document-ish kinds that never parent anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Top-level objective.
    Goal,
    /// Intermediate objective under a goal.
    Subgoal,
    /// Shippable unit of work under a subgoal.
    Feature,
    /// Concrete work item under a feature.
    Task,
    /// Image collection for visual direction.
    Moodboard,
    /// Free-form rich-text notes.
    Notes,
    /// Visual connector with no plan semantics.
    Connector,
    /// Technical specification document.
    Spec,
    /// Product requirements document.
    Prd,
    /// Data schema document.
    Schema,
    /// Prompt collection for AI workflows.
    Prompt,
    /// External reference (link, citation).
    Reference,
}

impl NodeKind {
    /// Returns the kind a child created under this kind receives, or `None`
    /// when this kind may not parent anything.
    #[must_use]
    pub fn child_kind(self) -> Option<Self> {
        match self {
            Self::Goal => Some(Self::Subgoal),
            Self::Subgoal => Some(Self::Feature),
            Self::Feature => Some(Self::Task),
            Self::Task
            | Self::Moodboard
            | Self::Notes
            | Self::Connector
            | Self::Spec
            | Self::Prd
            | Self::Schema
            | Self::Prompt
            | Self::Reference => None,
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Goal => "goal",
            Self::Subgoal => "subgoal",
            Self::Feature => "feature",
            Self::Task => "task",
            Self::Moodboard => "moodboard",
            Self::Notes => "notes",
            Self::Connector => "connector",
            Self::Spec => "spec",
            Self::Prd => "prd",
            Self::Schema => "schema",
            Self::Prompt => "prompt",
            Self::Reference => "reference",
        };
        write!(f, "{s}")
    }
}

/// Completion status of a plan node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    /// Work has not begun.
    #[default]
    NotStarted,
    /// Work is underway.
    InProgress,
    /// Work is blocked on something else.
    Blocked,
    /// Work is done.
    Completed,
}

/// Priority of a plan node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

/// A clarifying question attached to a node, typically AI-proposed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Unique question ID (unique per node).
    pub id: Uuid,
    /// The question text.
    pub prompt: String,
    /// Multiple-choice options, when the question offers them.
    #[serde(default)]
    pub options: Option<Vec<String>>,
    /// Free-text or selected answer, once given.
    #[serde(default)]
    pub answer: Option<String>,
    /// Whether the user added this question themselves.
    #[serde(default)]
    pub is_custom: bool,
}

impl Question {
    /// Creates a new unanswered question.
    #[must_use]
    pub fn new(prompt: impl Into<String>, options: Option<Vec<String>>) -> Self {
        Self {
            id: Uuid::new_v4(),
            prompt: prompt.into(),
            options,
            answer: None,
            is_custom: false,
        }
    }

    /// Creates a user-authored question.
    #[must_use]
    pub fn custom(prompt: impl Into<String>) -> Self {
        Self {
            is_custom: true,
            ..Self::new(prompt, None)
        }
    }
}

/// A comment left on a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    /// Team member who wrote the comment.
    pub author_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// One section of a PRD node's document payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrdSection {
    pub title: String,
    pub content: String,
}

/// One entry of a prompt node's payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptEntry {
    pub label: String,
    pub text: String,
}

/// One block of a block-structured document payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocBlock {
    pub id: Uuid,
    /// Block type tag (paragraph, heading, list item, ...).
    pub kind: String,
    pub text: String,
}

/// A plan item: one node of the plan graph.
///
/// Kind-specific payloads and cross-cutting fields are all optional;
/// which ones a given node uses depends on its `kind` and on what the
/// user has filled in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique node ID.
    pub id: Uuid,
    /// Node kind.
    pub kind: NodeKind,
    /// Display title.
    pub title: String,
    /// Longer description.
    #[serde(default)]
    pub description: Option<String>,
    /// Completion status.
    #[serde(default)]
    pub status: NodeStatus,
    /// Parent node, when this node sits inside the hierarchy.
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    /// Whether this node's children are hidden on the canvas.
    #[serde(default)]
    pub collapsed: bool,
    /// Clarifying questions, ordered.
    #[serde(default)]
    pub questions: Vec<Question>,

    // Kind-specific payloads.
    /// Rich-text content (notes, spec, schema nodes).
    #[serde(default)]
    pub content: Option<String>,
    /// Image URLs (moodboard nodes).
    #[serde(default)]
    pub image_urls: Vec<String>,
    /// PRD sections (prd nodes).
    #[serde(default)]
    pub prd_sections: Vec<PrdSection>,
    /// Prompt entries (prompt nodes).
    #[serde(default)]
    pub prompt_entries: Vec<PromptEntry>,
    /// Acceptance criteria (feature/task nodes).
    #[serde(default)]
    pub acceptance_criteria: Vec<String>,
    /// Version label (spec/prd/schema nodes).
    #[serde(default)]
    pub version_label: Option<String>,
    /// Sub-type tag (schema/prompt/reference nodes).
    #[serde(default)]
    pub subtype: Option<String>,
    /// External URL (reference nodes).
    #[serde(default)]
    pub url: Option<String>,
    /// Block-structured document body.
    #[serde(default)]
    pub blocks: Vec<DocBlock>,

    // Cross-cutting optional fields.
    /// Assigned team member.
    #[serde(default)]
    pub assignee_id: Option<Uuid>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub estimate_hours: Option<f64>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Sprint this node belongs to; a node is in at most one sprint.
    #[serde(default)]
    pub sprint_id: Option<Uuid>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Node {
    /// Creates a new node with default status and no parent.
    #[must_use]
    pub fn new(kind: NodeKind, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            title: title.into(),
            description: None,
            status: NodeStatus::default(),
            parent_id: None,
            collapsed: false,
            questions: Vec::new(),
            content: None,
            image_urls: Vec::new(),
            prd_sections: Vec::new(),
            prompt_entries: Vec::new(),
            acceptance_criteria: Vec::new(),
            version_label: None,
            subtype: None,
            url: None,
            blocks: Vec::new(),
            assignee_id: None,
            priority: None,
            due_date: None,
            estimate_hours: None,
            tags: Vec::new(),
            sprint_id: None,
            comments: Vec::new(),
        }
    }

    /// Sets the parent.
    #[must_use]
    pub fn with_parent(mut self, parent_id: Uuid) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the status.
    #[must_use]
    pub fn with_status(mut self, status: NodeStatus) -> Self {
        self.status = status;
        self
    }

    /// Returns true when the node already carries a question with this
    /// exact prompt text.
    #[must_use]
    pub fn has_question(&self, prompt: &str) -> bool {
        self.questions.iter().any(|q| q.prompt == prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_kind_ladder() {
        assert_eq!(NodeKind::Goal.child_kind(), Some(NodeKind::Subgoal));
        assert_eq!(NodeKind::Subgoal.child_kind(), Some(NodeKind::Feature));
        assert_eq!(NodeKind::Feature.child_kind(), Some(NodeKind::Task));
        assert_eq!(NodeKind::Task.child_kind(), None);
        assert_eq!(NodeKind::Moodboard.child_kind(), None);
        assert_eq!(NodeKind::Reference.child_kind(), None);
    }

    #[test]
    fn new_node_defaults() {
        let node = Node::new(NodeKind::Goal, "Launch");
        assert_eq!(node.kind, NodeKind::Goal);
        assert_eq!(node.status, NodeStatus::NotStarted);
        assert!(node.parent_id.is_none());
        assert!(!node.collapsed);
        assert!(node.questions.is_empty());
    }

    #[test]
    fn custom_question_is_marked() {
        let q = Question::custom("Which database?");
        assert!(q.is_custom);
        assert!(q.answer.is_none());
    }

    #[test]
    fn node_serialization_roundtrip() {
        let node = Node::new(NodeKind::Feature, "Auth")
            .with_description("Login and signup")
            .with_status(NodeStatus::InProgress);

        let json = serde_json::to_string(&node).expect("serialize");
        let restored: Node = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(node, restored);
    }

    #[test]
    fn kind_serializes_snake_case() {
        let json = serde_json::to_string(&NodeKind::Prd).expect("serialize");
        assert_eq!(json, "\"prd\"");
        let json = serde_json::to_string(&NodeStatus::NotStarted).expect("serialize");
        assert_eq!(json, "\"not_started\"");
    }
}
