// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=arbor_hit --heading-base-level=0

//! Arbor Hit: render-order hit testing over interactive node regions.
//!
//! A [`HitMap`] is a flat list of axis-aligned regions in render order,
//! rebuilt from scene geometry whenever that geometry changes. Queries
//! resolve a model-space point to the owning region:
//!
//! - [`HitMap::hit_test_point`] finds the region under a press or click,
//!   restricted by a [`QueryFilter`] over [`RegionFlags`].
//! - [`HitMap::drop_target`] resolves a drag release to a reparent target,
//!   with a caller-supplied exclusion predicate (the dragged node and its
//!   descendants are never valid targets).
//!
//! Each node contributes two region kinds ([`RegionPart`]): the padded
//! label box and the small annotate affordance beside it.
//!
//! ## Resolution order
//!
//! When a point overlaps several regions, the **first region in render
//! order wins**. Parents and earlier siblings are drawn first, so this is
//! the bottom-most drawn region, matching how release targets behave in the
//! editor. A nearest-center tie-break was considered and rejected: it is
//! not what direct manipulation users see, because the winning region is
//! exactly the one their pointer is inside.
//!
//! The map holds plain keys, never references into the scene or the
//! document; a linear scan over a few hundred regions is cheaper to rebuild
//! and query than any index would be to maintain at this scale.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

use alloc::vec::Vec;

use kurbo::{Point, Rect};

bitflags::bitflags! {
    /// Region flags controlling visibility and picking.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct RegionFlags: u8 {
        /// Region is visible (drawn by the presentation layer).
        const VISIBLE  = 0b0000_0001;
        /// Region is pickable (participates in hit testing).
        const PICKABLE = 0b0000_0010;
    }
}

impl Default for RegionFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::PICKABLE
    }
}

/// Which affordance of a node a region represents.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum RegionPart {
    /// The padded box around the node's label. Press targets, drag handles,
    /// and reparent drop targets are all label regions.
    Label,
    /// The annotate affordance anchored beside the label. A click here
    /// opens the node's memo editor, independent of any drag gesture.
    Annotate,
}

/// One interactive region: a key, which part of the node it is, and its
/// model-space box.
#[derive(Clone, Debug)]
pub struct Region<K> {
    /// Caller's key for the owning node.
    pub key: K,
    /// Which affordance this region is.
    pub part: RegionPart,
    /// Model-space bounds, inclusive of edges.
    pub rect: Rect,
    /// Visibility and picking flags.
    pub flags: RegionFlags,
}

/// Filters applied during hit testing.
#[derive(Clone, Copy, Debug)]
pub struct QueryFilter {
    /// Bitfield of required flags. Only regions containing all of them are
    /// considered.
    pub required_flags: RegionFlags,
}

impl Default for QueryFilter {
    fn default() -> Self {
        Self {
            required_flags: RegionFlags::empty(),
        }
    }
}

impl QueryFilter {
    /// Create a new empty filter (includes all regions).
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter to only visible regions.
    pub fn visible(mut self) -> Self {
        self.required_flags |= RegionFlags::VISIBLE;
        self
    }

    /// Filter to only pickable regions.
    pub fn pickable(mut self) -> Self {
        self.required_flags |= RegionFlags::PICKABLE;
        self
    }

    /// Check if a region's flags satisfy this filter.
    pub fn matches(&self, flags: RegionFlags) -> bool {
        flags.contains(self.required_flags)
    }
}

/// Interactive regions in render order.
#[derive(Clone, Debug, Default)]
pub struct HitMap<K> {
    regions: Vec<Region<K>>,
}

impl<K> HitMap<K> {
    /// Create an empty map.
    pub fn new() -> Self {
        Self {
            regions: Vec::new(),
        }
    }

    /// Build a map from regions already in render order.
    pub fn from_regions(regions: Vec<Region<K>>) -> Self {
        Self { regions }
    }

    /// Append a region at the end of the render order.
    pub fn push(&mut self, region: Region<K>) {
        self.regions.push(region);
    }

    /// Drop all regions; the map is rebuilt from scratch on every redraw.
    pub fn clear(&mut self) {
        self.regions.clear();
    }

    /// The regions, in render order.
    pub fn regions(&self) -> &[Region<K>] {
        &self.regions
    }

    /// Number of regions.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether the map holds no regions.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Resolve a model-space point to the first overlapping region in
    /// render order, restricted by `filter`.
    pub fn hit_test_point(&self, point: Point, filter: QueryFilter) -> Option<&Region<K>> {
        self.regions
            .iter()
            .find(|r| filter.matches(r.flags) && contains_inclusive(&r.rect, point))
    }

    /// Resolve a drag-release point to a reparent target: the first
    /// overlapping **label** region in render order for which `exclude`
    /// returns `false`.
    ///
    /// Callers pass an `exclude` predicate rejecting the dragged node and
    /// every node in its subtree; this map knows keys, not tree structure.
    pub fn drop_target(
        &self,
        point: Point,
        filter: QueryFilter,
        mut exclude: impl FnMut(&K) -> bool,
    ) -> Option<&Region<K>> {
        self.regions.iter().find(|r| {
            r.part == RegionPart::Label
                && filter.matches(r.flags)
                && contains_inclusive(&r.rect, point)
                && !exclude(&r.key)
        })
    }
}

/// Whether `rect` contains `point`, counting all four edges as inside.
///
/// `kurbo::Rect::contains` is half-open; hit testing wants presses on the
/// boundary to land.
fn contains_inclusive(rect: &Rect, point: Point) -> bool {
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}
