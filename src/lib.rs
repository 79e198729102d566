//! Planweave - the state engine behind an AI-assisted project planning canvas.
//!
//! This crate owns the authoritative plan graph (a tree of plan nodes plus
//! typed dependency edges) and everything required to edit it safely:
//! structural mutations, undo/redo, named version snapshots, and the derived
//! visual projection consumed by the canvas.

pub mod core;
