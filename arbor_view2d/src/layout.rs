// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lazy initial placement for nodes without a stored position.
//!
//! Placement is sticky: a node is positioned at most once, on the first
//! draw after it appears, and the stored position is never recomputed,
//! neither when siblings arrive or leave nor on reparent. Only explicit moves
//! change it afterwards. This is what keeps a hand-arranged map stable
//! while the tree around it keeps changing.

use arbor_forest::{Document, NodeId};
use kurbo::Point;

/// Where the first root lands.
pub const ROOT_BASE: Point = Point::new(100.0, 50.0);

/// Horizontal gap between successive roots.
pub const ROOT_GAP: f64 = 150.0;

/// Horizontal spacing between siblings.
pub const CHILD_GAP: f64 = 80.0;

/// Vertical drop from a parent to its children's row.
pub const LEVEL_DROP: f64 = 80.0;

/// Assign a position to every node that lacks one.
///
/// Roots march left to right along the baseline at [`ROOT_GAP`] intervals.
/// A node's children sit one [`LEVEL_DROP`] below it, spread at
/// [`CHILD_GAP`] intervals and centered on the parent's *current* x, so
/// children first drawn after a parent was moved appear under where it is
/// now.
pub fn assign_positions(doc: &mut Document) {
    let roots = doc.forest().roots().to_vec();
    for (i, root) in roots.iter().enumerate() {
        let fallback = Point::new(ROOT_BASE.x + ROOT_GAP * i as f64, ROOT_BASE.y);
        place(doc, *root, fallback);
    }
}

fn place(doc: &mut Document, id: NodeId, fallback: Point) {
    let pos = match doc.forest().position(id) {
        Some(pos) => pos,
        None => {
            doc.set_position(id, fallback);
            fallback
        }
    };
    let children = doc.forest().children_of(id).to_vec();
    if children.is_empty() {
        return;
    }
    let start_x = pos.x - (children.len() - 1) as f64 * CHILD_GAP / 2.0;
    let child_y = pos.y + LEVEL_DROP;
    for (i, child) in children.iter().enumerate() {
        place(doc, *child, Point::new(start_x + CHILD_GAP * i as f64, child_y));
    }
}
