//! Core domain types: the plan graph, its mutations, history, and the
//! derived canvas projection.
//!
//! # Architecture
//!
//! ```text
//! mutation → next Project (value) → history records previous → projection re-derived
//! ```
//!
//! The authoritative state is a [`Project`](project::Project): a flat node
//! collection related by `parent_id` back-references (the hierarchy) plus
//! typed dependency [`Edge`](edge::Edge)s layered on top. Every edit goes
//! through [`PlanStore`](store::PlanStore), which produces a fresh project
//! value per commit; the previous value lands on the undo stack unchanged.
//! The canvas never reads the project directly - it renders the derived
//! [`Projection`](projection::Projection), recomputed after every commit
//! with node positions carried forward.
//!
//! Operations never raise: a mutation referencing a missing entity, or one
//! that would break an invariant (duplicate dependency edge, illegal child
//! kind, reparent cycle), silently does nothing and signals failure through
//! its return value alone. This makes the store safe to call from async AI
//! callbacks that may race with local deletions.
//!
//! # Modules
//!
//! - [`node`] - plan nodes, kinds, statuses, questions, payloads
//! - [`edge`] - typed dependency edges and their visual styles
//! - [`project`] - the `Project` aggregate, sprints, team, versions
//! - [`projection`] - derived `FlowNode`/`FlowEdge` canvas layer
//! - [`history`] - bounded undo/redo of whole-project snapshots
//! - [`store`] - `PlanStore`: the mutation engine and commit paths

pub mod edge;
pub mod history;
pub mod node;
pub mod project;
pub mod projection;
pub mod store;
