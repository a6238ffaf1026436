//! The affine placement of a layer and the hit-region derived from it.
//!
//! # Composition Order
//!
//! A layer of size `w x h` is drawn by:
//! 1. Scaling about its center `(w/2, h/2)`
//! 2. Rotating about its center
//! 3. Translating by `(translate_x, translate_y)`
//!
//! Rotation is in degrees, positive = clockwise on a y-down display.

use kurbo::{Affine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Current placement of a layer on the display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerTransform {
    pub translate_x: f64,
    pub translate_y: f64,
    /// Uniform scale factor.
    pub scale: f64,
    /// Accumulated rotation in degrees, not wrapped.
    pub rotation: f64,
}

impl Default for LayerTransform {
    fn default() -> Self {
        Self {
            translate_x: 0.0,
            translate_y: 0.0,
            scale: 1.0,
            rotation: 0.0,
        }
    }
}

impl LayerTransform {
    /// Identity scale and rotation at the given offset.
    pub fn at(translate_x: f64, translate_y: f64) -> Self {
        Self {
            translate_x,
            translate_y,
            ..Self::default()
        }
    }

    pub fn translation(&self) -> Vec2 {
        Vec2::new(self.translate_x, self.translate_y)
    }

    /// Move by `delta`.
    pub fn translate_by(&mut self, delta: Vec2) {
        self.translate_x += delta.x;
        self.translate_y += delta.y;
    }

    /// Matrix mapping layer-local coordinates to display coordinates.
    pub fn to_affine(&self, size: (f64, f64)) -> Affine {
        let center = Point::new(size.0 / 2.0, size.1 / 2.0);
        Affine::translate(self.translation())
            * Affine::rotate_about(self.rotation.to_radians(), center)
            * Affine::scale_about(self.scale, center)
    }

    /// Axis-aligned bounding box of the transformed layer bounds.
    pub fn hit_region(&self, size: (f64, f64)) -> Rect {
        let bounds = Rect::new(0.0, 0.0, size.0, size.1);
        self.to_affine(size).transform_rect_bbox(bounds)
    }

    /// Check that every component is a finite number.
    pub fn is_finite(&self) -> bool {
        self.translate_x.is_finite()
            && self.translate_y.is_finite()
            && self.scale.is_finite()
            && self.rotation.is_finite()
    }
}

/// Check a point against a hit-region, edges included on the top-left and
/// excluded on the bottom-right.
#[inline]
pub fn region_contains(region: Rect, point: Point) -> bool {
    region.contains(point)
}
