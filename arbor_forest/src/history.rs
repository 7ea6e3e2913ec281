// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Undo/redo snapshot stacks.

use crate::forest::Forest;
use crate::overlay::Overlay;

/// A deep copy of the document state: forest plus overlay.
///
/// Snapshots restore wholesale, so every handle that was live when the
/// snapshot was taken is live again after it is restored.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub(crate) forest: Forest,
    pub(crate) overlay: Overlay,
}

/// The undo and redo stacks.
///
/// Recording a new snapshot clears the redo stack; undo and redo themselves
/// only move snapshots between the two stacks.
#[derive(Clone, Debug, Default)]
pub struct History {
    undo: Vec<Snapshot>,
    redo: Vec<Snapshot>,
}

impl History {
    /// Create empty stacks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a pre-mutation snapshot onto the undo stack and clear redo.
    pub(crate) fn record(&mut self, snapshot: Snapshot) {
        self.undo.push(snapshot);
        self.redo.clear();
    }

    /// Pop the undo stack, parking `current` on the redo stack.
    ///
    /// Returns the snapshot to restore, or `None` when there is nothing to
    /// undo (in which case neither stack moves and `current` is discarded).
    pub(crate) fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        match self.undo.pop() {
            Some(snapshot) => {
                self.redo.push(current);
                Some(snapshot)
            }
            None => None,
        }
    }

    /// Pop the redo stack, parking `current` on the undo stack.
    pub(crate) fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        match self.redo.pop() {
            Some(snapshot) => {
                self.undo.push(current);
                Some(snapshot)
            }
            None => None,
        }
    }

    /// Whether an undo is available.
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Whether a redo is available.
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Number of snapshots on the undo stack.
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    /// Number of snapshots on the redo stack.
    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }
}
