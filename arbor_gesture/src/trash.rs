// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The screen-space trash zone.

use kurbo::{Point, Rect};

/// Distance from the trash zone's center, in screen units, at which drag
/// feedback starts (the zone highlights before the pointer is over it).
pub const TRASH_NEAR_THRESHOLD: f64 = 100.0;

/// Delete target anchored in screen space.
///
/// The presentation layer repositions it on window resize via
/// [`TrashZone::set_rect`]; gestures test against it with the raw screen
/// position, untouched by the view transform.
#[derive(Clone, Copy, Debug)]
pub struct TrashZone {
    rect: Rect,
}

impl TrashZone {
    /// Create a zone covering `rect` in screen coordinates.
    pub fn new(rect: Rect) -> Self {
        Self { rect }
    }

    /// Current screen-space bounds.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Move the zone (window resized or layout changed).
    pub fn set_rect(&mut self, rect: Rect) {
        self.rect = rect;
    }

    /// Whether a release at `screen` lands in the zone (edges inclusive):
    /// the dragged node is deleted.
    pub fn is_over(&self, screen: Point) -> bool {
        screen.x >= self.rect.x0
            && screen.x <= self.rect.x1
            && screen.y >= self.rect.y0
            && screen.y <= self.rect.y1
    }

    /// Whether the pointer is close enough for warning feedback: within
    /// [`TRASH_NEAR_THRESHOLD`] of the zone's center.
    pub fn is_near(&self, screen: Point) -> bool {
        (screen - self.rect.center()).hypot() < TRASH_NEAR_THRESHOLD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone() -> TrashZone {
        TrashZone::new(Rect::new(950.0, 650.0, 1000.0, 700.0))
    }

    #[test]
    fn over_is_edge_inclusive() {
        let z = zone();
        assert!(z.is_over(Point::new(950.0, 650.0)));
        assert!(z.is_over(Point::new(1000.0, 700.0)));
        assert!(!z.is_over(Point::new(949.0, 650.0)));
    }

    #[test]
    fn near_reaches_beyond_the_rect() {
        let z = zone();
        // Center is (975, 675); 80 units left of it is outside the rect but
        // inside the feedback radius.
        assert!(!z.is_over(Point::new(895.0, 675.0)));
        assert!(z.is_near(Point::new(895.0, 675.0)));
        assert!(!z.is_near(Point::new(875.0, 675.0)));
    }

    #[test]
    fn set_rect_moves_the_zone() {
        let mut z = zone();
        z.set_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        assert!(z.is_over(Point::new(5.0, 5.0)));
        assert!(!z.is_over(Point::new(975.0, 675.0)));
    }
}
