//! Two-finger measurements: span for pinch-zoom and angle for rotation.
//!
//! These are pure functions over pointer positions so the engine can be
//! driven without a platform gesture recognizer.

use kurbo::Point;

use crate::GestureConfig;

/// Spans shorter than this are treated as fingers on top of each other.
const MIN_SPAN: f64 = 1e-6;

/// Distance between two pointers.
#[inline]
pub fn span(p0: Point, p1: Point) -> f64 {
    p0.distance(p1)
}

/// Angle of the line from `p0` to `p1`, in degrees.
///
/// `atan2(dy, dx)` with `d = p1 - p0`, so two fingers side by side read
/// 0° and a second finger straight below the first reads 90°.
#[inline]
pub fn rotation_degrees(p0: Point, p1: Point) -> f64 {
    (p1 - p0).atan2().to_degrees()
}

/// Ratio between two consecutive span samples.
///
/// Returns `None` when the previous span is degenerate or either sample
/// isn't finite, in which case the scale must not change.
#[inline]
pub fn span_ratio(previous: f64, current: f64) -> Option<f64> {
    if !previous.is_finite() || !current.is_finite() || previous < MIN_SPAN {
        return None;
    }
    Some(current / previous)
}

/// Apply one pinch increment to `scale`.
///
/// The running product is clamped after every step, so a gesture that
/// overshoots the limit and comes back starts shrinking from the limit, not
/// from the overshoot.
#[inline]
pub fn scale_step(scale: f64, ratio: f64, config: &GestureConfig) -> f64 {
    config.clamp_scale(scale * ratio)
}

/// Scale after a pinch from `previous_span` to `current_span`.
pub fn pinch(scale: f64, previous_span: f64, current_span: f64, config: &GestureConfig) -> f64 {
    match span_ratio(previous_span, current_span) {
        Some(ratio) => scale_step(scale, ratio, config),
        None => scale,
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
