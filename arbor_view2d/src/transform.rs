// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The cumulative pan/zoom mapping between model and screen space.

use kurbo::{Point, TranslateScale, Vec2};

/// Scale applied per zoom-in notch.
pub const ZOOM_IN_FACTOR: f64 = 1.1;

/// Scale applied per zoom-out notch.
pub const ZOOM_OUT_FACTOR: f64 = 1.0 / 1.1;

/// Rendered label sizes never shrink below this, whatever the zoom.
pub const MIN_LABEL_SIZE: f64 = 1.0;

/// Cumulative view transform: `screen = offset + scale · model`.
///
/// The scale starts at 1.0 and accumulates multiplicatively through
/// [`ViewTransform::zoom`]; the offset accumulates through panning and
/// through the anchor correction zooming applies. There is no rotation and
/// no shear, so the two numbers are the whole story.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    scale: f64,
    offset: Vec2,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewTransform {
    /// The identity view: scale 1.0, no pan.
    pub fn new() -> Self {
        Self {
            scale: 1.0,
            offset: Vec2::ZERO,
        }
    }

    /// Current cumulative scale.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Current pan offset in screen units.
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Map a model-space point to screen space.
    pub fn to_screen(&self, model: Point) -> Point {
        (self.offset + model.to_vec2() * self.scale).to_point()
    }

    /// Map a screen-space point to model space.
    pub fn to_model(&self, screen: Point) -> Point {
        ((screen.to_vec2() - self.offset) / self.scale).to_point()
    }

    /// The same mapping as a kurbo [`TranslateScale`], for presentation
    /// layers that consume affine transforms wholesale.
    pub fn as_translate_scale(&self) -> TranslateScale {
        TranslateScale::new(self.offset, self.scale)
    }

    /// Translate the view by a screen-space delta.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Rescale about `focal` (screen space): the model point under `focal`
    /// stays under it, and the cumulative scale multiplies by `factor`.
    ///
    /// Zooming twice about the same anchor composes multiplicatively:
    /// `zoom(p, a)` then `zoom(p, b)` lands exactly where `zoom(p, a·b)`
    /// does. Any positive factor is valid; the notch constants are
    /// [`ZOOM_IN_FACTOR`] and [`ZOOM_OUT_FACTOR`].
    pub fn zoom(&mut self, focal: Point, factor: f64) {
        self.offset = focal.to_vec2() - (focal.to_vec2() - self.offset) * factor;
        self.scale *= factor;
    }

    /// The rendered size for a base label size under the current zoom,
    /// floored at [`MIN_LABEL_SIZE`] so labels stay visible.
    pub fn font_size(&self, base: f64) -> f64 {
        (base * self.scale).max(MIN_LABEL_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point, b: Point) -> bool {
        (a - b).hypot() < 1e-9
    }

    #[test]
    fn identity_maps_points_to_themselves() {
        let view = ViewTransform::new();
        let p = Point::new(12.0, -3.0);
        assert_eq!(view.to_screen(p), p);
        assert_eq!(view.to_model(p), p);
    }

    #[test]
    fn to_model_inverts_to_screen() {
        let mut view = ViewTransform::new();
        view.pan_by(Vec2::new(40.0, -10.0));
        view.zoom(Point::new(200.0, 150.0), 1.7);
        let p = Point::new(33.0, 77.0);
        assert!(close(view.to_model(view.to_screen(p)), p));
    }

    #[test]
    fn zoom_keeps_the_focal_point_fixed() {
        let mut view = ViewTransform::new();
        view.pan_by(Vec2::new(25.0, 5.0));
        let focal = Point::new(300.0, 200.0);
        let anchored_model = view.to_model(focal);
        view.zoom(focal, ZOOM_IN_FACTOR);
        assert!(close(view.to_screen(anchored_model), focal));
        view.zoom(focal, ZOOM_OUT_FACTOR);
        assert!(close(view.to_screen(anchored_model), focal));
    }

    #[test]
    fn zoom_composes_multiplicatively_about_one_anchor() {
        let focal = Point::new(120.0, 90.0);
        let mut stepped = ViewTransform::new();
        stepped.pan_by(Vec2::new(-7.0, 13.0));
        let mut single = stepped;

        stepped.zoom(focal, 1.3);
        stepped.zoom(focal, 0.5);
        single.zoom(focal, 1.3 * 0.5);

        assert!((stepped.scale() - single.scale()).abs() < 1e-12);
        assert!((stepped.offset() - single.offset()).hypot() < 1e-9);
    }

    #[test]
    fn many_notches_accumulate_scale() {
        let mut view = ViewTransform::new();
        for _ in 0..4 {
            view.zoom(Point::ZERO, ZOOM_IN_FACTOR);
        }
        assert!((view.scale() - ZOOM_IN_FACTOR.powi(4)).abs() < 1e-12);
    }

    #[test]
    fn font_size_scales_and_floors() {
        let mut view = ViewTransform::new();
        assert_eq!(view.font_size(12.0), 12.0);
        view.zoom(Point::ZERO, 2.0);
        assert_eq!(view.font_size(12.0), 24.0);
        // Zoom far out: the label never vanishes.
        let mut tiny = ViewTransform::new();
        tiny.zoom(Point::ZERO, 0.01);
        assert_eq!(tiny.font_size(12.0), MIN_LABEL_SIZE);
    }

    #[test]
    fn pan_moves_screen_but_not_model() {
        let mut view = ViewTransform::new();
        let p = Point::new(10.0, 10.0);
        let before = view.to_screen(p);
        view.pan_by(Vec2::new(100.0, 50.0));
        let after = view.to_screen(p);
        assert_eq!(after - before, Vec2::new(100.0, 50.0));
        assert!((view.scale() - 1.0).abs() < f64::EPSILON);
    }
}
