//! Gesture state machine.
//!
//! ```text
//!            down inside region              secondary down
//!   Idle ────────────────────────▶ Dragging ───────────────▶ Transforming
//!    ▲                                │  ▲                        │
//!    │          up / cancel           │  └──── secondary up ──────┤
//!    └────────────────────────────────┴───────────────────────────┘
//!                        up / cancel / too few pointers
//! ```
//!
//! [`step`] is a pure function from the previous state, transform and event
//! to the next state, transform and the effects the host has to act on.

use kurbo::Point;
use std::collections::BTreeMap;
use thiserror::Error;

use super::event::{PointerId, TouchAction, TouchEvent};
use super::pinch::{pinch, rotation_degrees, span};
use super::transform::{region_contains, LayerTransform};
use crate::GestureConfig;

/// Touch input that contradicts the current gesture.
///
/// Never returned as an error; the engine resets to idle and reports it in
/// [`Effects::recovered`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GestureInputError {
    /// A two-finger gesture received an event with fewer than two fingers.
    #[error("Inconsistent gesture input: expected at least {expected} pointers, got {actual}")]
    TooFewPointers { expected: usize, actual: usize },
}

/// Per-gesture bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureState {
    /// No finger is tracked.
    #[default]
    Idle,
    /// One finger pans the layer.
    Dragging {
        /// The finger whose movement pans the layer.
        pointer: PointerId,
        /// Where that finger was last seen.
        last_touch: Point,
    },
    /// Two or more fingers pinch and rotate the layer.
    Transforming {
        pointer: PointerId,
        last_touch: Point,
        /// Angle between the two tracked fingers at the previous event.
        last_angle: f64,
        /// Distance between the two tracked fingers at the previous event.
        last_span: f64,
    },
}

impl GestureState {
    pub fn is_idle(&self) -> bool {
        matches!(self, GestureState::Idle)
    }

    /// The tracked primary pointer, if any.
    pub fn active_pointer(&self) -> Option<PointerId> {
        match *self {
            GestureState::Idle => None,
            GestureState::Dragging { pointer, .. } | GestureState::Transforming { pointer, .. } => {
                Some(pointer)
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            GestureState::Idle => "idle",
            GestureState::Dragging { .. } => "dragging",
            GestureState::Transforming { .. } => "transforming",
        }
    }
}

/// What the host has to do after an event.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Effects {
    /// The event belongs to this layer; don't offer it to other layers.
    pub consumed: bool,
    /// Translation, scale or rotation changed.
    pub repaint: bool,
    /// Set when inconsistent input forced a reset to idle.
    pub recovered: Option<GestureInputError>,
}

impl Effects {
    fn declined() -> Self {
        Self::default()
    }

    fn consumed() -> Self {
        Self {
            consumed: true,
            ..Self::default()
        }
    }
}

/// Result of feeding one event through [`step`].
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub state: GestureState,
    pub transform: LayerTransform,
    pub effects: Effects,
}

/// Advance the gesture by one event.
///
/// `hit_region` is the layer's current touchable box; only a `PointerDown`
/// inside it starts a gesture.
pub fn step(
    state: &GestureState,
    transform: &LayerTransform,
    hit_region: kurbo::Rect,
    event: &TouchEvent,
    config: &GestureConfig,
) -> Step {
    let pointers = event.pointer_map();
    let mut next = Step {
        state: *state,
        transform: *transform,
        effects: Effects::consumed(),
    };

    match (*state, event.action) {
        // A fresh gesture always starts from scratch, whatever came before.
        (_, TouchAction::PointerDown) => {
            let Some(pos) = pointers.get(&event.pointer).copied() else {
                next.state = GestureState::Idle;
                next.effects = Effects::declined();
                return next;
            };
            if region_contains(hit_region, pos) {
                next.state = GestureState::Dragging {
                    pointer: event.pointer,
                    last_touch: pos,
                };
            } else {
                next.state = GestureState::Idle;
                next.effects = Effects::declined();
            }
        }

        (GestureState::Idle, _) => {
            next.effects = Effects::declined();
        }

        (_, TouchAction::PointerUp) | (_, TouchAction::PointerCancel) => {
            next.state = GestureState::Idle;
        }

        (GestureState::Dragging { pointer, last_touch }, TouchAction::PointerMove) => {
            if let Some(pos) = pointers.get(&pointer).copied() {
                let delta = pos - last_touch;
                if delta.x != 0.0 || delta.y != 0.0 {
                    next.transform.translate_by(delta);
                    next.effects.repaint = true;
                }
                next.state = GestureState::Dragging {
                    pointer,
                    last_touch: pos,
                };
            }
        }

        (
            GestureState::Dragging { pointer, last_touch }
            | GestureState::Transforming {
                pointer,
                last_touch,
                ..
            },
            TouchAction::SecondaryPointerDown,
        ) => {
            if let Some((p0, p1)) = tracked_pair(&pointers) {
                let last_touch = pointers.get(&pointer).copied().unwrap_or(last_touch);
                next.state = GestureState::Transforming {
                    pointer,
                    last_touch,
                    last_angle: rotation_degrees(p0, p1),
                    last_span: span(p0, p1),
                };
            }
        }

        (
            GestureState::Transforming {
                pointer,
                last_touch,
                last_angle,
                last_span,
            },
            TouchAction::PointerMove,
        ) => {
            let Some((p0, p1)) = tracked_pair(&pointers) else {
                let err = GestureInputError::TooFewPointers {
                    expected: 2,
                    actual: pointers.len(),
                };
                tracing::warn!(error = %err, "resetting gesture to idle");
                next.state = GestureState::Idle;
                next.effects.recovered = Some(err);
                return next;
            };

            let angle = rotation_degrees(p0, p1);
            let current_span = span(p0, p1);
            let scale = pinch(transform.scale, last_span, current_span, config);
            let rotation = transform.rotation + (angle - last_angle);

            next.effects.repaint = scale != transform.scale || rotation != transform.rotation;
            next.transform.scale = scale;
            next.transform.rotation = rotation;
            next.state = GestureState::Transforming {
                pointer,
                last_touch: pointers.get(&pointer).copied().unwrap_or(last_touch),
                last_angle: angle,
                last_span: current_span,
            };
        }

        (
            GestureState::Dragging { pointer, .. } | GestureState::Transforming { pointer, .. },
            TouchAction::SecondaryPointerUp,
        ) => {
            let mut remaining = pointers;
            if remaining.remove(&event.pointer).is_none() {
                // The departing pointer isn't one we know about.
                return next;
            }

            let (pointer, last_touch) = match remaining.get(&pointer) {
                Some(&pos) => (pointer, pos),
                None => match remaining.iter().next() {
                    Some((&id, &pos)) => (id, pos),
                    None => {
                        next.state = GestureState::Idle;
                        return next;
                    }
                },
            };

            next.state = match tracked_pair(&remaining) {
                Some((p0, p1)) => GestureState::Transforming {
                    pointer,
                    last_touch,
                    last_angle: rotation_degrees(p0, p1),
                    last_span: span(p0, p1),
                },
                None => GestureState::Dragging {
                    pointer,
                    last_touch,
                },
            };
        }
    }

    if next.state != *state {
        tracing::debug!(
            from = state.name(),
            to = next.state.name(),
            action = ?event.action,
            "gesture transition"
        );
    }
    next
}

/// The two lowest pointer ids, which drive rotation and pinch.
fn tracked_pair(pointers: &BTreeMap<PointerId, Point>) -> Option<(Point, Point)> {
    let mut iter = pointers.values();
    let p0 = *iter.next()?;
    let p1 = *iter.next()?;
    Some((p0, p1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::event::Pointer;
    use kurbo::Rect;

    fn region() -> Rect {
        Rect::new(0.0, 0.0, 100.0, 100.0)
    }

    fn run(state: GestureState, transform: LayerTransform, event: TouchEvent) -> Step {
        step(&state, &transform, region(), &event, &GestureConfig::default())
    }

    fn dragging(pointer: PointerId, x: f64, y: f64) -> GestureState {
        GestureState::Dragging {
            pointer,
            last_touch: Point::new(x, y),
        }
    }

    fn secondary(
        action: TouchAction,
        pointer: PointerId,
        pointers: &[(PointerId, f64, f64)],
    ) -> TouchEvent {
        TouchEvent::new(
            action,
            pointer,
            pointers
                .iter()
                .map(|&(id, x, y)| Pointer::new(id, x, y))
                .collect(),
        )
    }

    #[test]
    fn test_down_inside_starts_drag() {
        let ev = TouchEvent::down(4, 10.0, 20.0);
        let s = run(GestureState::Idle, LayerTransform::default(), ev);
        assert_eq!(s.state, dragging(4, 10.0, 20.0));
        assert!(s.effects.consumed);
        assert!(!s.effects.repaint);
    }

    #[test]
    fn test_down_outside_is_declined() {
        let ev = TouchEvent::down(0, 150.0, 20.0);
        let s = run(GestureState::Idle, LayerTransform::default(), ev);
        assert_eq!(s.state, GestureState::Idle);
        assert!(!s.effects.consumed);
        assert_eq!(s.transform, LayerTransform::default());
    }

    #[test]
    fn test_down_with_unreported_pointer_is_declined() {
        let ev = secondary(TouchAction::PointerDown, 9, &[(1, 10.0, 10.0)]);
        let s = run(GestureState::Idle, LayerTransform::default(), ev);
        assert_eq!(s.state, GestureState::Idle);
        assert!(!s.effects.consumed);
    }

    #[test]
    fn test_idle_ignores_everything_but_down() {
        let t = LayerTransform::default();
        for ev in [
            TouchEvent::moved(vec![Pointer::new(0, 5.0, 5.0)]),
            TouchEvent::up(0, 5.0, 5.0),
            TouchEvent::cancel(vec![]),
            secondary(TouchAction::SecondaryPointerDown, 1, &[(0, 1.0, 1.0), (1, 2.0, 2.0)]),
            secondary(TouchAction::SecondaryPointerUp, 1, &[(0, 1.0, 1.0), (1, 2.0, 2.0)]),
        ] {
            let s = run(GestureState::Idle, t, ev);
            assert_eq!(s.state, GestureState::Idle);
            assert!(!s.effects.consumed);
            assert_eq!(s.transform, t);
        }
    }

    #[test]
    fn test_drag_translates_by_delta() {
        let s = run(
            dragging(0, 10.0, 10.0),
            LayerTransform::at(1.0, 2.0),
            TouchEvent::moved(vec![Pointer::new(0, 20.0, 15.0)]),
        );
        assert_eq!(s.transform.translate_x, 11.0);
        assert_eq!(s.transform.translate_y, 7.0);
        assert_eq!(s.state, dragging(0, 20.0, 15.0));
        assert!(s.effects.repaint);
    }

    #[test]
    fn test_drag_without_motion_does_not_repaint() {
        let s = run(
            dragging(0, 10.0, 10.0),
            LayerTransform::default(),
            TouchEvent::moved(vec![Pointer::new(0, 10.0, 10.0)]),
        );
        assert!(!s.effects.repaint);
        assert!(s.effects.consumed);
    }

    #[test]
    fn test_drag_move_for_unknown_pointer_is_noop() {
        let state = dragging(0, 10.0, 10.0);
        let s = run(
            state,
            LayerTransform::default(),
            TouchEvent::moved(vec![Pointer::new(3, 50.0, 50.0)]),
        );
        assert_eq!(s.state, state);
        assert_eq!(s.transform, LayerTransform::default());
        assert!(!s.effects.repaint);
    }

    #[test]
    fn test_drag_move_with_nan_position_is_ignored() {
        let state = dragging(0, 10.0, 10.0);
        let t = LayerTransform::at(5.0, 5.0);
        for (x, y) in [(f64::NAN, 20.0), (20.0, f64::INFINITY), (f64::NEG_INFINITY, 0.0)] {
            let s = run(state, t, TouchEvent::moved(vec![Pointer::new(0, x, y)]));
            assert_eq!(s.state, state);
            assert_eq!(s.transform, t);
            assert!(s.transform.is_finite());
            assert!(!s.effects.repaint);
        }

        // The next good sample moves from the last good one
        let s = run(
            state,
            t,
            TouchEvent::moved(vec![Pointer::new(0, 12.0, 13.0)]),
        );
        assert_eq!(s.transform, LayerTransform::at(7.0, 8.0));
    }

    #[test]
    fn test_down_at_non_finite_position_is_declined() {
        let region = Rect::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::INFINITY);
        let ev = TouchEvent::down(0, f64::INFINITY, 10.0);
        let s = step(
            &GestureState::Idle,
            &LayerTransform::default(),
            region,
            &ev,
            &GestureConfig::default(),
        );
        assert!(s.state.is_idle());
        assert!(!s.effects.consumed);

        let ev = TouchEvent::down(0, f64::NAN, f64::NAN);
        let s = run(GestureState::Idle, LayerTransform::default(), ev);
        assert!(!s.effects.consumed);
    }

    #[test]
    fn test_pinch_ignores_non_finite_second_finger() {
        let state = GestureState::Transforming {
            pointer: 0,
            last_touch: Point::new(0.0, 0.0),
            last_angle: 0.0,
            last_span: 10.0,
        };
        let ev = TouchEvent::moved(vec![Pointer::new(0, 0.0, 0.0), Pointer::new(1, f64::NAN, 0.0)]);
        let s = run(state, LayerTransform::default(), ev);
        // Only one usable finger left
        assert!(s.state.is_idle());
        assert!(s.effects.recovered.is_some());
        assert_eq!(s.transform, LayerTransform::default());
    }

    #[test]
    fn test_up_and_cancel_reset() {
        let ev = TouchEvent::up(0, 1.0, 1.0);
        let s = run(dragging(0, 1.0, 1.0), LayerTransform::default(), ev);
        assert!(s.state.is_idle());
        let s = run(
            dragging(0, 1.0, 1.0),
            LayerTransform::default(),
            TouchEvent::cancel(vec![Pointer::new(0, 1.0, 1.0)]),
        );
        assert!(s.state.is_idle());
    }

    #[test]
    fn test_secondary_down_enters_transforming() {
        let ev = secondary(
            TouchAction::SecondaryPointerDown,
            1,
            &[(0, 0.0, 0.0), (1, 10.0, 0.0)],
        );
        let s = run(dragging(0, 0.0, 0.0), LayerTransform::default(), ev);
        assert_eq!(
            s.state,
            GestureState::Transforming {
                pointer: 0,
                last_touch: Point::new(0.0, 0.0),
                last_angle: 0.0,
                last_span: 10.0,
            }
        );
    }

    #[test]
    fn test_rotation_accumulates() {
        let state = GestureState::Transforming {
            pointer: 0,
            last_touch: Point::new(0.0, 0.0),
            last_angle: 0.0,
            last_span: 10.0,
        };
        let ev = TouchEvent::moved(vec![Pointer::new(0, 0.0, 0.0), Pointer::new(1, 0.0, 10.0)]);
        let s = run(state, LayerTransform::default(), ev);
        assert!((s.transform.rotation - 90.0).abs() < 1e-9);
        // Same span, same scale
        assert!((s.transform.scale - 1.0).abs() < 1e-12);
        assert!(s.effects.repaint);
        // Transforming never pans
        assert_eq!(s.transform.translation(), kurbo::Vec2::ZERO);
    }

    #[test]
    fn test_pinch_scales_and_clamps() {
        let state = GestureState::Transforming {
            pointer: 0,
            last_touch: Point::new(0.0, 0.0),
            last_angle: 0.0,
            last_span: 10.0,
        };
        let ev = TouchEvent::moved(vec![Pointer::new(0, 0.0, 0.0), Pointer::new(1, 100.0, 0.0)]);
        let s = run(state, LayerTransform::default(), ev);
        assert_eq!(s.transform.scale, 5.0);
    }

    #[test]
    fn test_transforming_with_one_pointer_recovers() {
        let state = GestureState::Transforming {
            pointer: 0,
            last_touch: Point::new(0.0, 0.0),
            last_angle: 0.0,
            last_span: 10.0,
        };
        let t = LayerTransform::at(3.0, 4.0);
        let s = run(state, t, TouchEvent::moved(vec![Pointer::new(0, 5.0, 5.0)]));
        assert!(s.state.is_idle());
        assert_eq!(s.transform, t);
        assert_eq!(
            s.effects.recovered,
            Some(GestureInputError::TooFewPointers {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_secondary_up_of_primary_promotes_other() {
        let state = GestureState::Transforming {
            pointer: 0,
            last_touch: Point::new(0.0, 0.0),
            last_angle: 0.0,
            last_span: 10.0,
        };
        let ev = secondary(
            TouchAction::SecondaryPointerUp,
            0,
            &[(0, 0.0, 0.0), (1, 30.0, 40.0)],
        );
        let s = run(state, LayerTransform::default(), ev);
        assert_eq!(s.state, dragging(1, 30.0, 40.0));
    }

    #[test]
    fn test_secondary_up_of_other_keeps_primary() {
        let state = GestureState::Transforming {
            pointer: 0,
            last_touch: Point::new(0.0, 0.0),
            last_angle: 0.0,
            last_span: 10.0,
        };
        let ev = secondary(
            TouchAction::SecondaryPointerUp,
            1,
            &[(0, 2.0, 3.0), (1, 30.0, 40.0)],
        );
        let s = run(state, LayerTransform::default(), ev);
        assert_eq!(s.state, dragging(0, 2.0, 3.0));
    }

    #[test]
    fn test_secondary_up_of_unknown_pointer_is_noop() {
        let state = GestureState::Transforming {
            pointer: 0,
            last_touch: Point::new(0.0, 0.0),
            last_angle: 0.0,
            last_span: 10.0,
        };
        let ev = secondary(
            TouchAction::SecondaryPointerUp,
            7,
            &[(0, 0.0, 0.0), (1, 10.0, 0.0)],
        );
        let s = run(state, LayerTransform::default(), ev);
        assert_eq!(s.state, state);
    }

    #[test]
    fn test_third_finger_up_stays_transforming() {
        let state = GestureState::Transforming {
            pointer: 0,
            last_touch: Point::new(0.0, 0.0),
            last_angle: 0.0,
            last_span: 10.0,
        };
        let ev = secondary(
            TouchAction::SecondaryPointerUp,
            0,
            &[(0, 0.0, 0.0), (1, 10.0, 0.0), (2, 10.0, 10.0)],
        );
        let s = run(state, LayerTransform::default(), ev);
        match s.state {
            GestureState::Transforming {
                pointer,
                last_touch,
                last_angle,
                last_span,
            } => {
                assert_eq!(pointer, 1);
                assert_eq!(last_touch, Point::new(10.0, 0.0));
                assert!((last_angle - 90.0).abs() < 1e-9);
                assert!((last_span - 10.0).abs() < 1e-9);
            }
            other => panic!("expected transforming, got {:?}", other),
        }
    }

    #[test]
    fn test_error_display() {
        let err = GestureInputError::TooFewPointers {
            expected: 2,
            actual: 1,
        };
        assert_eq!(
            err.to_string(),
            "Inconsistent gesture input: expected at least 2 pointers, got 1"
        );
    }
}
