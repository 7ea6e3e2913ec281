// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The document: forest, overlay, and history behind a single mutation
//! surface.
//!
//! Mutating operations here do **not** take snapshots themselves; callers
//! invoke [`Document::push_undo`] immediately before mutating, once per
//! user-visible operation. This keeps composite gestures (a drag that moves
//! and reparents, a delete that cascades overlay cleanup) atomic under a
//! single undo step. The two exceptions are [`Document::undo`] and
//! [`Document::redo`], which manage the stacks directly.

use kurbo::Point;
use tracing::debug;

use crate::forest::{Forest, NodeInfo};
use crate::history::{History, Snapshot};
use crate::overlay::{LinkError, Overlay};
use crate::types::{NodeId, Uid};

/// A forest of annotated nodes plus its extra-edge overlay and edit history.
#[derive(Clone, Debug)]
pub struct Document {
    forest: Forest,
    overlay: Overlay,
    history: History,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// A fresh document: one default root, no overlay edges, empty history.
    pub fn new() -> Self {
        Self {
            forest: Forest::with_default_root(),
            overlay: Overlay::new(),
            history: History::new(),
        }
    }

    /// Assemble a document from loaded parts. History starts empty.
    pub(crate) fn from_parts(forest: Forest, overlay: Overlay) -> Self {
        Self {
            forest,
            overlay,
            history: History::new(),
        }
    }

    /// The ownership forest.
    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    /// The extra-edge overlay.
    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    /// The undo/redo stacks (read-only).
    pub fn history(&self) -> &History {
        &self.history
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            forest: self.forest.clone(),
            overlay: self.overlay.clone(),
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.forest = snapshot.forest;
        self.overlay = snapshot.overlay;
    }

    /// Snapshot the current state onto the undo stack and clear redo.
    ///
    /// Call immediately before any mutation, once per user-visible
    /// operation.
    pub fn push_undo(&mut self) {
        let snapshot = self.snapshot();
        self.history.record(snapshot);
    }

    /// Restore the most recent snapshot. Returns `false` when there is
    /// nothing to undo; the caller reports that to the user.
    pub fn undo(&mut self) -> bool {
        if !self.history.can_undo() {
            return false;
        }
        let current = self.snapshot();
        if let Some(snapshot) = self.history.undo(current) {
            self.restore(snapshot);
            debug!(undo_depth = self.history.undo_depth(), "undo applied");
            return true;
        }
        false
    }

    /// Re-apply the most recently undone state. Returns `false` when there
    /// is nothing to redo.
    pub fn redo(&mut self) -> bool {
        if !self.history.can_redo() {
            return false;
        }
        let current = self.snapshot();
        if let Some(snapshot) = self.history.redo(current) {
            self.restore(snapshot);
            debug!(redo_depth = self.history.redo_depth(), "redo applied");
            return true;
        }
        false
    }

    /// Append a new root node with a fresh uid, empty memo, no position.
    pub fn add_root(&mut self, name: &str) -> NodeId {
        let uid = self.forest.allocate_uid();
        self.forest.insert_root(NodeInfo::named(uid, name))
    }

    /// Append a new child with a fresh uid under `parent`.
    ///
    /// `None` when `parent` is stale.
    pub fn add_child(&mut self, parent: NodeId, name: &str) -> Option<NodeId> {
        let uid = self.forest.allocate_uid();
        self.forest.insert_child(parent, NodeInfo::named(uid, name))
    }

    /// Rename a node.
    pub fn rename(&mut self, id: NodeId, name: &str) -> bool {
        self.forest.set_name(id, name)
    }

    /// Replace a node's memo text.
    pub fn set_memo(&mut self, id: NodeId, memo: &str) -> bool {
        self.forest.set_memo(id, memo)
    }

    /// Store a node's position.
    pub fn set_position(&mut self, id: NodeId, position: Point) -> bool {
        self.forest.set_position(id, position)
    }

    /// Delete a node and its subtree, dropping every overlay edge that
    /// referenced any deleted uid.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        let removed = self.forest.remove(id);
        if removed.is_empty() {
            return false;
        }
        let dropped = self.overlay.remove_touching(&removed);
        debug!(
            nodes = removed.len(),
            edges = dropped,
            "node removed with overlay cascade"
        );
        true
    }

    /// Whether `node` may be reparented under `target`: both live, not the
    /// same node, and `target` not inside `node`'s subtree.
    pub fn can_reparent(&self, node: NodeId, target: NodeId) -> bool {
        self.forest.is_alive(node)
            && self.forest.is_alive(target)
            && !self.forest.is_in_subtree(node, target)
    }

    /// Move `node` to become the last child of `target`. Rejected moves
    /// leave the forest untouched.
    pub fn reparent(&mut self, node: NodeId, target: NodeId) -> bool {
        self.forest.reparent(node, target)
    }

    /// Validate an overlay insertion without mutating.
    pub fn check_link(&self, parent: &Uid, child: &Uid) -> Result<(), LinkError> {
        self.overlay.check(parent, child)
    }

    /// Append an overlay edge. Self-loops and duplicates are rejected as
    /// no-ops with the reason.
    pub fn add_extra_edge(&mut self, parent: Uid, child: Uid) -> Result<(), LinkError> {
        self.overlay.try_add(parent, child)
    }

    /// Remove the exact overlay pair. `false` when it did not exist.
    pub fn remove_extra_edge(&mut self, parent: &Uid, child: &Uid) -> bool {
        self.overlay.remove(parent, child)
    }

    /// The extra parents of `child`, in insertion order.
    pub fn extra_parents_of(&self, child: &Uid) -> Vec<Uid> {
        self.overlay.parents_of(child).cloned().collect()
    }

    /// Replace the whole document with a single default root and an empty
    /// overlay. Callers snapshot first; the reset itself is undoable.
    pub fn reset(&mut self) {
        self.forest = Forest::with_default_root();
        self.overlay = Overlay::new();
    }
}
