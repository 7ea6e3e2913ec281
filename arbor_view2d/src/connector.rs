// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Connector geometry for ownership and overlay edges.
//!
//! A connector is the segment between two node boxes' centers, clipped at
//! each box boundary along that line: an arrow that starts and ends on
//! the box edges instead of under the labels. Connectors are derived
//! geometry with no state of their own: recompute the ones touching a node
//! whenever its box changes (a move, a reparent, an undo), or all of them
//! on a full redraw.

use arbor_forest::{Document, NodeId};
use kurbo::{Line, Point, Rect};

use crate::scene::Scene;

/// Which relationship a connector draws.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EdgeKind {
    /// A parent-child ownership edge.
    Ownership,
    /// An extra-edge overlay link.
    Extra,
}

/// One renderable connector between two live nodes.
#[derive(Clone, Copy, Debug)]
pub struct Connector {
    /// Ownership or overlay.
    pub kind: EdgeKind,
    /// The parent end (arrow tail).
    pub parent: NodeId,
    /// The child end (arrow head).
    pub child: NodeId,
    /// Clipped segment from the parent's boundary to the child's.
    pub line: Line,
}

/// The point on `rect`'s boundary along the ray from its center toward
/// `target`.
///
/// Falls back to the center itself when `target` coincides with it (the
/// boxes are concentric; there is no direction to clip along).
pub fn edge_anchor(rect: Rect, target: Point) -> Point {
    let center = rect.center();
    let d = target - center;
    if d.x == 0.0 && d.y == 0.0 {
        return center;
    }
    let half_width = rect.width() / 2.0;
    let half_height = rect.height() / 2.0;
    let factor_x = if d.x != 0.0 {
        half_width / d.x.abs()
    } else {
        f64::INFINITY
    };
    let factor_y = if d.y != 0.0 {
        half_height / d.y.abs()
    } else {
        f64::INFINITY
    };
    center + d * factor_x.min(factor_y)
}

/// The clipped segment between two boxes, parent end first.
pub fn connector_line(parent: Rect, child: Rect) -> Line {
    Line::new(
        edge_anchor(parent, child.center()),
        edge_anchor(child, parent.center()),
    )
}

/// Every connector in the document, ownership edges first (they render
/// underneath), then overlay edges in insertion order.
///
/// Edges whose endpoints are missing from the scene (no position yet, or a
/// uid with no live node) contribute nothing.
pub fn connectors(doc: &Document, scene: &Scene) -> Vec<Connector> {
    let mut out = Vec::new();
    let forest = doc.forest();
    for parent in forest.depth_first() {
        for &child in forest.children_of(parent) {
            push_connector(scene, EdgeKind::Ownership, parent, child, &mut out);
        }
    }
    for edge in doc.overlay().edges() {
        let (Some(parent), Some(child)) = (
            forest.node_by_uid(&edge.parent),
            forest.node_by_uid(&edge.child),
        ) else {
            continue;
        };
        push_connector(scene, EdgeKind::Extra, parent, child, &mut out);
    }
    out
}

/// The connectors with `id` at either end; what must be redrawn while that
/// node is dragged.
pub fn connectors_touching(doc: &Document, scene: &Scene, id: NodeId) -> Vec<Connector> {
    connectors(doc, scene)
        .into_iter()
        .filter(|c| c.parent == id || c.child == id)
        .collect()
}

fn push_connector(
    scene: &Scene,
    kind: EdgeKind,
    parent: NodeId,
    child: NodeId,
    out: &mut Vec<Connector>,
) {
    let (Some(pb), Some(cb)) = (scene.node_box(parent), scene.node_box(child)) else {
        return;
    };
    out.push(Connector {
        kind,
        parent,
        child,
        line: connector_line(pb.label, cb.label),
    });
}
