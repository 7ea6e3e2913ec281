// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core forest implementation: the node arena, ownership links, and uid
//! allocation.

use hashbrown::HashMap;
use kurbo::Point;
use smallvec::SmallVec;

use crate::types::{NodeId, Uid};

/// Name given to the root created for empty and unrecoverable documents.
pub const DEFAULT_ROOT_NAME: &str = "root";

/// Per-node document data.
#[derive(Clone, Debug)]
pub struct NodeInfo {
    /// Persistent identity. Unique across the forest.
    pub uid: Uid,
    /// Display name. Names may repeat; they are never an identity key.
    pub name: String,
    /// Free-form annotation text.
    pub memo: String,
    /// Stored position, if one has been assigned. Layout assigns a position
    /// at most once; afterwards only explicit moves change it.
    pub position: Option<Point>,
}

impl NodeInfo {
    /// A fresh node: empty memo, no stored position.
    pub fn named(uid: Uid, name: impl Into<String>) -> Self {
        Self {
            uid,
            name: name.into(),
            memo: String::new(),
            position: None,
        }
    }
}

#[derive(Clone, Debug)]
struct Node {
    generation: u32,
    parent: Option<NodeId>,
    children: SmallVec<[NodeId; 4]>,
    info: NodeInfo,
}

impl Node {
    fn new(generation: u32, info: NodeInfo) -> Self {
        Self {
            generation,
            parent: None,
            children: SmallVec::new(),
            info,
        }
    }
}

/// The ownership forest.
///
/// Nodes live in a slot arena addressed by generational [`NodeId`]s, so
/// ancestry questions are answered by handle comparison, never by comparing
/// names or values. Parent links and the uid index are maintained on every
/// structural mutation rather than re-derived by search, which keeps
/// [`Forest::parent_of`] and [`Forest::node_by_uid`] cheap during drags.
///
/// Cloning a `Forest` deep-copies the whole arena; the history stacks rely
/// on this to restore pre-mutation state with all handles intact.
#[derive(Clone, Debug)]
pub struct Forest {
    /// slots
    nodes: Vec<Option<Node>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    /// root handles, in render order
    roots: Vec<NodeId>,
    uid_index: HashMap<Uid, NodeId>,
    /// next value of the uid counter; always above every numeric uid in use
    next_uid: u64,
}

impl Default for Forest {
    fn default() -> Self {
        Self::new()
    }
}

impl Forest {
    /// Create an empty forest.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            roots: Vec::new(),
            uid_index: HashMap::new(),
            next_uid: 1,
        }
    }

    /// Create a forest holding a single default root.
    ///
    /// This is the shape substituted for empty or unparseable documents.
    pub fn with_default_root() -> Self {
        let mut forest = Self::new();
        let uid = forest.allocate_uid();
        forest.insert_root(NodeInfo::named(uid, DEFAULT_ROOT_NAME));
        forest
    }

    /// Allocate the next uid and advance the counter.
    pub fn allocate_uid(&mut self) -> Uid {
        let uid = Uid::from_counter(self.next_uid);
        self.next_uid += 1;
        uid
    }

    /// Advance the uid counter past a uid seen in a loaded document.
    ///
    /// Keeps the counter strictly above every numeric uid in use, so later
    /// allocations can never collide with a pre-existing id.
    pub fn note_uid(&mut self, uid: &Uid) {
        if let Some(n) = uid.numeric()
            && n >= self.next_uid
        {
            self.next_uid = n + 1;
        }
    }

    /// The next value the uid counter will hand out.
    pub fn next_uid_hint(&self) -> u64 {
        self.next_uid
    }

    fn alloc_slot(&mut self, info: NodeInfo) -> NodeId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, info));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, info)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        let id = NodeId::new(idx, generation);
        let uid = self.node(id).info.uid.clone();
        self.note_uid(&uid);
        self.uid_index.insert(uid, id);
        id
    }

    /// Insert a new root node at the end of the root list.
    pub fn insert_root(&mut self, info: NodeInfo) -> NodeId {
        let id = self.alloc_slot(info);
        self.roots.push(id);
        id
    }

    /// Insert a new node as the last child of `parent`.
    ///
    /// Returns `None` when `parent` is stale.
    pub fn insert_child(&mut self, parent: NodeId, info: NodeInfo) -> Option<NodeId> {
        if !self.is_alive(parent) {
            return None;
        }
        let id = self.alloc_slot(info);
        self.node_mut(id).parent = Some(parent);
        self.node_mut(parent).children.push(id);
        Some(id)
    }

    /// Remove a node and its whole subtree from the forest.
    ///
    /// The node is detached from its owner (parent's child list or the root
    /// list) and every slot in the subtree is freed. Returns the uids of all
    /// removed nodes so the overlay can drop edges that reference them;
    /// empty when `id` was already stale.
    pub fn remove(&mut self, id: NodeId) -> Vec<Uid> {
        let mut removed = Vec::new();
        if !self.is_alive(id) {
            return removed;
        }
        self.detach(id);
        self.remove_subtree(id, &mut removed);
        removed
    }

    fn remove_subtree(&mut self, id: NodeId, removed: &mut Vec<Uid>) {
        let children: Vec<NodeId> = self.node(id).children.to_vec();
        for child in children {
            self.remove_subtree(child, removed);
        }
        if let Some(node) = self.nodes[id.idx()].take() {
            self.uid_index.remove(&node.info.uid);
            removed.push(node.info.uid);
            self.free_list.push(id.idx());
        }
    }

    /// Unhook `id` from its owner slot without freeing it.
    fn detach(&mut self, id: NodeId) {
        match self.node(id).parent {
            Some(parent) => {
                self.node_mut(parent).children.retain(|c| *c != id);
                self.node_mut(id).parent = None;
            }
            None => self.roots.retain(|r| *r != id),
        }
    }

    /// Move `id` to become the last child of `new_parent`.
    ///
    /// Rejected (returns `false`) when either handle is stale, when the two
    /// are the same node, or when `new_parent` lies inside `id`'s subtree;
    /// accepting any of those would break single-ownership or acyclicity.
    pub fn reparent(&mut self, id: NodeId, new_parent: NodeId) -> bool {
        if !self.is_alive(id) || !self.is_alive(new_parent) {
            return false;
        }
        if self.is_in_subtree(id, new_parent) {
            return false;
        }
        self.detach(id);
        self.node_mut(id).parent = Some(new_parent);
        self.node_mut(new_parent).children.push(id);
        true
    }

    /// Whether `node` lies in the subtree rooted at `root` (inclusive).
    ///
    /// Walks parent links upward from `node`, so the cost is the depth of
    /// `node`, not the size of `root`'s subtree.
    pub fn is_in_subtree(&self, root: NodeId, node: NodeId) -> bool {
        if !self.is_alive(root) || !self.is_alive(node) {
            return false;
        }
        let mut current = Some(node);
        while let Some(id) = current {
            if id == root {
                return true;
            }
            current = self.node(id).parent;
        }
        false
    }

    /// Whether `id` refers to a live node.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.idx())
            .and_then(|slot| slot.as_ref())
            .is_some_and(|node| node.generation == id.generation())
    }

    /// The document data of a live node.
    pub fn info(&self, id: NodeId) -> Option<&NodeInfo> {
        self.live(id).map(|node| &node.info)
    }

    /// The uid of a live node.
    pub fn uid_of(&self, id: NodeId) -> Option<&Uid> {
        self.live(id).map(|node| &node.info.uid)
    }

    /// Look up a live node by its persistent uid.
    pub fn node_by_uid(&self, uid: &Uid) -> Option<NodeId> {
        self.uid_index.get(uid).copied().filter(|id| self.is_alive(*id))
    }

    /// The owning parent of a live node, or `None` for roots and stale
    /// handles.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.live(id).and_then(|node| node.parent)
    }

    /// The children of a node, in order. Empty for stale handles.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        match self.live(id) {
            Some(node) => &node.children,
            None => &[],
        }
    }

    /// The root nodes, in order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Rename a node. Returns `false` for stale handles.
    pub fn set_name(&mut self, id: NodeId, name: &str) -> bool {
        match self.live_mut(id) {
            Some(node) => {
                node.info.name.clear();
                node.info.name.push_str(name);
                true
            }
            None => false,
        }
    }

    /// Replace a node's memo text. Returns `false` for stale handles.
    pub fn set_memo(&mut self, id: NodeId, memo: &str) -> bool {
        match self.live_mut(id) {
            Some(node) => {
                node.info.memo.clear();
                node.info.memo.push_str(memo);
                true
            }
            None => false,
        }
    }

    /// The stored position of a node, if it has one.
    pub fn position(&self, id: NodeId) -> Option<Point> {
        self.live(id).and_then(|node| node.info.position)
    }

    /// Store a node's position. Returns `false` for stale handles.
    pub fn set_position(&mut self, id: NodeId, position: Point) -> bool {
        match self.live_mut(id) {
            Some(node) => {
                node.info.position = Some(position);
                true
            }
            None => false,
        }
    }

    /// Depth-first (pre-order) traversal over the whole forest, roots in
    /// order. This is render order: parents precede their children, earlier
    /// siblings precede later ones.
    pub fn depth_first(&self) -> DepthFirst<'_> {
        let mut stack: Vec<NodeId> = self.roots.clone();
        stack.reverse();
        DepthFirst {
            forest: self,
            stack,
        }
    }

    /// Number of leaves in the subtree rooted at `id`.
    ///
    /// A node without children counts as one leaf. Zero for stale handles.
    pub fn count_leaves(&self, id: NodeId) -> usize {
        match self.live(id) {
            None => 0,
            Some(node) if node.children.is_empty() => 1,
            Some(node) => node
                .children
                .iter()
                .map(|child| self.count_leaves(*child))
                .sum(),
        }
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    /// Whether the forest holds no live nodes.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    fn live(&self, id: NodeId) -> Option<&Node> {
        self.nodes
            .get(id.idx())
            .and_then(|slot| slot.as_ref())
            .filter(|node| node.generation == id.generation())
    }

    fn live_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes
            .get_mut(id.idx())
            .and_then(|slot| slot.as_mut())
            .filter(|node| node.generation == id.generation())
    }

    /// Access a node after a liveness check; panics if `id` is stale.
    fn node(&self, id: NodeId) -> &Node {
        self.nodes[id.idx()].as_ref().expect("dangling NodeId")
    }

    /// Access a node mutably after a liveness check; panics if `id` is stale.
    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes[id.idx()].as_mut().expect("dangling NodeId")
    }
}

/// Iterator over the forest in depth-first render order.
#[derive(Debug)]
pub struct DepthFirst<'a> {
    forest: &'a Forest,
    stack: Vec<NodeId>,
}

impl Iterator for DepthFirst<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        let children = self.forest.children_of(id);
        self.stack.extend(children.iter().rev().copied());
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(forest: &mut Forest, name: &str) -> NodeInfo {
        let uid = forest.allocate_uid();
        NodeInfo::named(uid, name)
    }

    #[test]
    fn uids_are_unique_and_counter_stays_ahead() {
        let mut forest = Forest::new();
        let info = named(&mut forest, "a");
        let a = forest.insert_root(info);
        let info = named(&mut forest, "b");
        let b = forest.insert_child(a, info).unwrap();
        let ua = forest.uid_of(a).unwrap().clone();
        let ub = forest.uid_of(b).unwrap().clone();
        assert_ne!(ua, ub);
        assert!(forest.next_uid_hint() > ub.numeric().unwrap());
    }

    #[test]
    fn note_uid_advances_past_existing_ids() {
        let mut forest = Forest::new();
        forest.note_uid(&Uid::from("41"));
        assert_eq!(forest.allocate_uid(), Uid::from("42"));
        // Non-numeric ids leave the counter alone.
        forest.note_uid(&Uid::from("not-a-number"));
        assert_eq!(forest.allocate_uid(), Uid::from("43"));
    }

    #[test]
    fn remove_frees_subtree_and_reports_uids() {
        let mut forest = Forest::new();
        let info = named(&mut forest, "root");
        let root = forest.insert_root(info);
        let info = named(&mut forest, "a");
        let a = forest.insert_child(root, info).unwrap();
        let info = named(&mut forest, "a1");
        let a1 = forest.insert_child(a, info).unwrap();

        let removed = forest.remove(a);
        assert_eq!(removed.len(), 2);
        assert!(!forest.is_alive(a));
        assert!(!forest.is_alive(a1));
        assert!(forest.is_alive(root));
        assert_eq!(forest.children_of(root), &[]);
        // Stale handles stay stale even after the slot is reused.
        let info = named(&mut forest, "fresh");
        let fresh = forest.insert_child(root, info).unwrap();
        assert!(forest.is_alive(fresh));
        assert!(!forest.is_alive(a));
    }

    #[test]
    fn remove_root_detaches_from_root_list() {
        let mut forest = Forest::new();
        let info = named(&mut forest, "r1");
        let r1 = forest.insert_root(info);
        let info = named(&mut forest, "r2");
        let r2 = forest.insert_root(info);
        forest.remove(r1);
        assert_eq!(forest.roots(), &[r2]);
    }

    #[test]
    fn reparent_moves_node_and_keeps_order() {
        let mut forest = Forest::new();
        let info = named(&mut forest, "root");
        let root = forest.insert_root(info);
        let info = named(&mut forest, "a");
        let a = forest.insert_child(root, info).unwrap();
        let info = named(&mut forest, "b");
        let b = forest.insert_child(root, info).unwrap();

        assert!(forest.reparent(a, b));
        assert_eq!(forest.children_of(root), &[b]);
        assert_eq!(forest.children_of(b), &[a]);
        assert_eq!(forest.parent_of(a), Some(b));
    }

    #[test]
    fn reparent_rejects_self_and_descendants() {
        let mut forest = Forest::new();
        let info = named(&mut forest, "root");
        let root = forest.insert_root(info);
        let info = named(&mut forest, "a");
        let a = forest.insert_child(root, info).unwrap();
        let info = named(&mut forest, "a1");
        let a1 = forest.insert_child(a, info).unwrap();

        assert!(!forest.reparent(a, a));
        assert!(!forest.reparent(a, a1));
        assert!(!forest.reparent(root, a1));
        // Tree unchanged.
        assert_eq!(forest.children_of(root), &[a]);
        assert_eq!(forest.children_of(a), &[a1]);
    }

    #[test]
    fn reparent_root_becomes_child() {
        let mut forest = Forest::new();
        let info = named(&mut forest, "r1");
        let r1 = forest.insert_root(info);
        let info = named(&mut forest, "r2");
        let r2 = forest.insert_root(info);
        assert!(forest.reparent(r2, r1));
        assert_eq!(forest.roots(), &[r1]);
        assert_eq!(forest.parent_of(r2), Some(r1));
    }

    #[test]
    fn uid_lookup_tracks_mutations() {
        let mut forest = Forest::new();
        let info = named(&mut forest, "root");
        let root = forest.insert_root(info);
        let uid = forest.uid_of(root).unwrap().clone();
        assert_eq!(forest.node_by_uid(&uid), Some(root));
        forest.remove(root);
        assert_eq!(forest.node_by_uid(&uid), None);
    }

    #[test]
    fn depth_first_is_preorder_render_order() {
        let mut forest = Forest::new();
        let info = named(&mut forest, "r1");
        let r1 = forest.insert_root(info);
        let info = named(&mut forest, "a");
        let a = forest.insert_child(r1, info).unwrap();
        let info = named(&mut forest, "a1");
        let a1 = forest.insert_child(a, info).unwrap();
        let info = named(&mut forest, "b");
        let b = forest.insert_child(r1, info).unwrap();
        let info = named(&mut forest, "r2");
        let r2 = forest.insert_root(info);

        let order: Vec<NodeId> = forest.depth_first().collect();
        assert_eq!(order, vec![r1, a, a1, b, r2]);
    }

    #[test]
    fn count_leaves_counts_childless_nodes() {
        let mut forest = Forest::new();
        let info = named(&mut forest, "root");
        let root = forest.insert_root(info);
        assert_eq!(forest.count_leaves(root), 1);
        let info = named(&mut forest, "a");
        let a = forest.insert_child(root, info).unwrap();
        let info = named(&mut forest, "b");
        forest.insert_child(root, info).unwrap();
        let info = named(&mut forest, "a1");
        forest.insert_child(a, info).unwrap();
        assert_eq!(forest.count_leaves(root), 2);
    }

    #[test]
    fn positions_are_sticky_until_set() {
        let mut forest = Forest::new();
        let info = named(&mut forest, "root");
        let root = forest.insert_root(info);
        assert_eq!(forest.position(root), None);
        assert!(forest.set_position(root, Point::new(10.0, 20.0)));
        assert_eq!(forest.position(root), Some(Point::new(10.0, 20.0)));
    }
}
