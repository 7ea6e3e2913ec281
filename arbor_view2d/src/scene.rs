// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node box geometry in render order.
//!
//! The scene is the bridge between the document and everything spatial: it
//! turns stored positions plus measured label text into model-space boxes,
//! in the order nodes are drawn (depth-first, roots in order, parents
//! before children). Hit testing, connector clipping, and the presentation
//! layer all read the same boxes, so they cannot disagree about where a
//! node is.
//!
//! Scenes are transient. Rebuild after every document mutation, undo/redo,
//! or drag movement; per-frame rebuilds over a flat list are cheaper than
//! keeping an incremental structure honest.

use arbor_forest::{Document, NodeId};
use arbor_hit::{HitMap, Region, RegionFlags, RegionPart};
use kurbo::{Point, Rect, Size, Vec2};

/// Base label size, in model units, at scale 1.0.
pub const LABEL_FONT_SIZE: f64 = 12.0;

/// Base annotate-affordance size, in model units, at scale 1.0.
pub const ANNOTATE_FONT_SIZE: f64 = 10.0;

/// Horizontal padding around label text.
pub const LABEL_PAD_X: f64 = 4.0;

/// Vertical padding around label text.
pub const LABEL_PAD_Y: f64 = 2.0;

/// Gap between the label text box and the annotate affordance.
pub const ANNOTATE_MARGIN: f64 = 8.0;

/// Text measurement provided by the presentation layer.
///
/// The core never rasterizes text; it only needs extents so label boxes
/// match what is actually drawn. Headless callers and tests use
/// [`MonoMetrics`].
pub trait TextMetrics {
    /// The extent of `text` rendered at `font_size`, in the same units as
    /// `font_size`.
    fn extent(&self, text: &str, font_size: f64) -> Size;
}

/// Fixed-advance approximation of text extents.
#[derive(Clone, Copy, Debug)]
pub struct MonoMetrics {
    /// Horizontal advance per character, as a fraction of the font size.
    pub advance: f64,
    /// Line height, as a fraction of the font size.
    pub line_height: f64,
}

impl Default for MonoMetrics {
    fn default() -> Self {
        Self {
            advance: 0.6,
            line_height: 1.2,
        }
    }
}

impl TextMetrics for MonoMetrics {
    fn extent(&self, text: &str, font_size: f64) -> Size {
        let chars = text.chars().count().max(1);
        Size::new(
            chars as f64 * self.advance * font_size,
            self.line_height * font_size,
        )
    }
}

/// Geometry of one node on the canvas.
#[derive(Clone, Copy, Debug)]
pub struct NodeBox {
    /// The node this box belongs to.
    pub id: NodeId,
    /// Padded box around the label text; the node's press/drag/drop region
    /// and the box connectors clip against.
    pub label: Rect,
    /// The annotate affordance beside the label.
    pub annotate: Rect,
}

/// All node boxes, in render order.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    boxes: Vec<NodeBox>,
}

impl Scene {
    /// Build the scene for the current document state.
    ///
    /// Nodes without a stored position contribute nothing; run
    /// [`crate::layout::assign_positions`] first so every node has one.
    /// While a drag is in progress, `ghost` displaces that one node by the
    /// drag offset. Only that node: its subtree keeps its stored
    /// positions, exactly as it will after the release commits.
    pub fn build(
        doc: &Document,
        metrics: &dyn TextMetrics,
        ghost: Option<(NodeId, Vec2)>,
    ) -> Self {
        let forest = doc.forest();
        let mut boxes = Vec::with_capacity(forest.len());
        for id in forest.depth_first() {
            let Some(info) = forest.info(id) else {
                continue;
            };
            let Some(mut pos) = info.position else {
                continue;
            };
            if let Some((dragged, offset)) = ghost
                && dragged == id
            {
                pos += offset;
            }
            let text = metrics.extent(&info.name, LABEL_FONT_SIZE);
            let text_box = Rect::from_center_size(pos, text);
            let label = text_box.inflate(LABEL_PAD_X, LABEL_PAD_Y);
            let annotate = Rect::from_center_size(
                Point::new(
                    text_box.x1 + ANNOTATE_MARGIN,
                    pos.y - ANNOTATE_MARGIN,
                ),
                Size::new(ANNOTATE_FONT_SIZE, ANNOTATE_FONT_SIZE),
            );
            boxes.push(NodeBox {
                id,
                label,
                annotate,
            });
        }
        Self { boxes }
    }

    /// The boxes, in render order.
    pub fn boxes(&self) -> &[NodeBox] {
        &self.boxes
    }

    /// The box for one node, if it is in the scene.
    pub fn node_box(&self, id: NodeId) -> Option<&NodeBox> {
        self.boxes.iter().find(|b| b.id == id)
    }

    /// Interactive regions for this scene, in render order. Each node
    /// contributes its label region, then its annotate region, matching
    /// draw order.
    pub fn hit_map(&self) -> HitMap<NodeId> {
        let mut map = HitMap::new();
        for b in &self.boxes {
            map.push(Region {
                key: b.id,
                part: RegionPart::Label,
                rect: b.label,
                flags: RegionFlags::default(),
            });
            map.push(Region {
                key: b.id,
                part: RegionPart::Annotate,
                rect: b.annotate,
                flags: RegionFlags::default(),
            });
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::assign_positions;
    use arbor_hit::QueryFilter;

    fn scene_for(doc: &Document) -> Scene {
        Scene::build(doc, &MonoMetrics::default(), None)
    }

    #[test]
    fn boxes_center_on_stored_positions() {
        let mut doc = Document::new();
        let root = doc.forest().roots()[0];
        doc.set_position(root, Point::new(100.0, 50.0));
        let scene = scene_for(&doc);
        let b = scene.node_box(root).unwrap();
        assert_eq!(b.label.center(), Point::new(100.0, 50.0));
        // "root" at 12pt mono: 4 chars * 7.2 wide, 14.4 tall, plus padding.
        assert_eq!(b.label.width(), 4.0 * 7.2 + 2.0 * LABEL_PAD_X);
        assert_eq!(b.label.height(), 14.4 + 2.0 * LABEL_PAD_Y);
    }

    #[test]
    fn annotate_sits_right_of_the_text_box() {
        let mut doc = Document::new();
        let root = doc.forest().roots()[0];
        doc.set_position(root, Point::new(0.0, 0.0));
        let scene = scene_for(&doc);
        let b = scene.node_box(root).unwrap();
        let text_right = b.label.x1 - LABEL_PAD_X;
        assert_eq!(b.annotate.center().x, text_right + ANNOTATE_MARGIN);
        assert_eq!(b.annotate.center().y, -ANNOTATE_MARGIN);
        // The affordance pokes past the padded label on the right.
        assert!(b.annotate.x1 > b.label.x1);
    }

    #[test]
    fn unpositioned_nodes_are_skipped_until_layout_runs() {
        let mut doc = Document::new();
        let root = doc.forest().roots()[0];
        doc.add_child(root, "child").unwrap();
        let scene = scene_for(&doc);
        assert!(scene.boxes().is_empty());

        assign_positions(&mut doc);
        let scene = scene_for(&doc);
        assert_eq!(scene.boxes().len(), 2);
    }

    #[test]
    fn ghost_displaces_only_the_dragged_node() {
        let mut doc = Document::new();
        let root = doc.forest().roots()[0];
        let child = doc.add_child(root, "child").unwrap();
        assign_positions(&mut doc);
        let base_root = doc.forest().position(root).unwrap();
        let base_child = doc.forest().position(child).unwrap();

        let scene = Scene::build(
            &doc,
            &MonoMetrics::default(),
            Some((root, Vec2::new(30.0, -10.0))),
        );
        let root_box = scene.node_box(root).unwrap();
        let child_box = scene.node_box(child).unwrap();
        assert_eq!(root_box.label.center(), base_root + Vec2::new(30.0, -10.0));
        assert_eq!(child_box.label.center(), base_child);
        // The stored position is untouched while the ghost floats.
        assert_eq!(doc.forest().position(root), Some(base_root));
    }

    #[test]
    fn hit_map_resolves_label_and_annotate() {
        let mut doc = Document::new();
        let root = doc.forest().roots()[0];
        doc.set_position(root, Point::new(0.0, 0.0));
        let scene = scene_for(&doc);
        let b = *scene.node_box(root).unwrap();
        let map = scene.hit_map();

        let hit = map
            .hit_test_point(b.label.center(), QueryFilter::new().pickable())
            .unwrap();
        assert_eq!((hit.key, hit.part), (root, RegionPart::Label));

        let hit = map
            .hit_test_point(b.annotate.center(), QueryFilter::new().pickable())
            .unwrap();
        assert_eq!((hit.key, hit.part), (root, RegionPart::Annotate));

        assert!(
            map.hit_test_point(Point::new(500.0, 500.0), QueryFilter::new())
                .is_none()
        );
    }

    #[test]
    fn render_order_is_depth_first() {
        let mut doc = Document::new();
        let root = doc.forest().roots()[0];
        let a = doc.add_child(root, "a").unwrap();
        let a1 = doc.add_child(a, "a1").unwrap();
        let b = doc.add_child(root, "b").unwrap();
        assign_positions(&mut doc);
        let scene = scene_for(&doc);
        let order: Vec<NodeId> = scene.boxes().iter().map(|b| b.id).collect();
        assert_eq!(order, vec![root, a, a1, b]);
    }
}
