// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=arbor_view2d --heading-base-level=0

//! Arbor View2D: canvas geometry for the mind-map editor.
//!
//! Everything spatial that is not hit testing lives here:
//!
//! - [`ViewTransform`]: the cumulative pan/zoom mapping between model and
//!   screen space, with anchored zoom and the minimum label size floor.
//! - [`layout`]: lazy, sticky initial placement (roots along a baseline,
//!   children centered beneath their parent), assigned once and then owned
//!   by the stored position.
//! - [`Scene`]: per-frame node boxes (padded label + annotate affordance)
//!   in render order, measured through a [`TextMetrics`] provider, with
//!   ghost displacement for the node being dragged.
//! - [`connector`]: clipped-rectangle connectors for ownership and overlay
//!   edges.
//!
//! The split mirrors how the pieces change: the transform persists across
//! frames, stored positions persist in the document, and scenes and
//! connectors are rebuilt from them whenever anything moves.

pub mod connector;
pub mod layout;
mod scene;
mod transform;

pub use scene::{
    ANNOTATE_FONT_SIZE, ANNOTATE_MARGIN, LABEL_FONT_SIZE, LABEL_PAD_X, LABEL_PAD_Y, MonoMetrics,
    NodeBox, Scene, TextMetrics,
};
pub use transform::{
    MIN_LABEL_SIZE, ViewTransform, ZOOM_IN_FACTOR, ZOOM_OUT_FACTOR,
};
