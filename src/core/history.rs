//! Bounded undo/redo history of whole-project snapshots.
//!
//! The history stores complete pre-mutation [`Project`] values. Because
//! every mutation produces a fresh project value instead of editing the
//! previous one in place, entries can be held directly without defensive
//! copying.

use crate::core::project::Project;
use std::collections::VecDeque;

/// Default number of undo steps retained.
pub const DEFAULT_UNDO_CAPACITY: usize = 50;

/// Bounded undo stack plus redo stack.
#[derive(Debug)]
pub struct EditHistory {
    undo: VecDeque<Project>,
    redo: Vec<Project>,
    capacity: usize,
}

impl EditHistory {
    /// Creates an empty history with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Records a pre-mutation project and clears the redo stack.
    ///
    /// When the stack is full the oldest entry is dropped first.
    pub fn record(&mut self, previous: Project) {
        if self.undo.len() == self.capacity {
            self.undo.pop_front();
        }
        self.undo.push_back(previous);
        self.redo.clear();
    }

    /// Pops the most recent undo entry, stashing `current` for redo.
    /// Returns `None` when there is nothing to undo.
    pub fn undo(&mut self, current: Project) -> Option<Project> {
        let previous = self.undo.pop_back()?;
        self.redo.push(current);
        Some(previous)
    }

    /// Pops the most recent redo entry, stashing `current` for undo.
    /// Returns `None` when there is nothing to redo.
    pub fn redo(&mut self, current: Project) -> Option<Project> {
        let next = self.redo.pop()?;
        if self.undo.len() == self.capacity {
            self.undo.pop_front();
        }
        self.undo.push_back(current);
        Some(next)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Number of undo steps currently held.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    /// Drops all history, used when a different project is loaded.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

impl Default for EditHistory {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_CAPACITY)
    }
}
