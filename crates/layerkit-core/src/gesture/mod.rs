//! Touch gestures that move, pinch-zoom and rotate a layer.
//!
//! Events flow through [`TouchTransformEngine::handle`], which runs the pure
//! [`step`] state machine and keeps the layer's [`LayerTransform`] and
//! hit-region up to date.
//!
//! # Gestures
//!
//! - One finger inside the hit-region drags the layer.
//! - A second finger switches to pinch and rotate. Scale follows the ratio
//!   of finger distances and is clamped to [`crate::GestureConfig`] limits after
//!   every step. Rotation follows the change of the angle between the two
//!   fingers.
//! - Lifting a finger falls back to dragging with whichever finger is left.

mod engine;
mod event;
mod pinch;
mod state;
mod transform;

pub use engine::TouchTransformEngine;
pub use event::{Pointer, PointerId, TouchAction, TouchEvent};
pub use pinch::{pinch, rotation_degrees, scale_step, span, span_ratio};
pub use state::{step, Effects, GestureInputError, GestureState, Step};
pub use transform::{region_contains, LayerTransform};
