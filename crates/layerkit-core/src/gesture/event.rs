//! Touch event records handed over by the host's input system.

use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stable identifier the platform assigns to a finger for its whole
/// down-to-up lifetime.
pub type PointerId = i32;

/// What happened in a touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TouchAction {
    /// The first finger touched the screen.
    PointerDown,
    /// One or more fingers moved.
    PointerMove,
    /// The last finger left the screen.
    PointerUp,
    /// The platform aborted the gesture.
    PointerCancel,
    /// Another finger touched the screen while at least one is down.
    SecondaryPointerDown,
    /// A finger left the screen while at least one other stays down.
    SecondaryPointerUp,
}

impl TouchAction {
    /// Decode the numeric action codes used by the wasm bindings.
    ///
    /// 0 = down, 1 = up, 2 = move, 3 = cancel, 5 = secondary down,
    /// 6 = secondary up. These match the platform's masked action values.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(TouchAction::PointerDown),
            1 => Some(TouchAction::PointerUp),
            2 => Some(TouchAction::PointerMove),
            3 => Some(TouchAction::PointerCancel),
            5 => Some(TouchAction::SecondaryPointerDown),
            6 => Some(TouchAction::SecondaryPointerUp),
            _ => None,
        }
    }
}

/// One finger and where it currently is, in display coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pointer {
    pub id: PointerId,
    pub x: f64,
    pub y: f64,
}

impl Pointer {
    pub fn new(id: PointerId, x: f64, y: f64) -> Self {
        Self { id, x, y }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Whether both coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A single touch event.
///
/// `pointers` lists every finger currently down, including the one that
/// triggered the action (so a `SecondaryPointerUp` still reports the
/// departing finger). `pointer` names the finger the action is about; for
/// moves it is informational.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchEvent {
    pub action: TouchAction,
    pub pointer: PointerId,
    pub pointers: Vec<Pointer>,
}

impl TouchEvent {
    pub fn new(action: TouchAction, pointer: PointerId, pointers: Vec<Pointer>) -> Self {
        Self {
            action,
            pointer,
            pointers,
        }
    }

    /// First finger down at `(x, y)`.
    pub fn down(id: PointerId, x: f64, y: f64) -> Self {
        Self::new(TouchAction::PointerDown, id, vec![Pointer::new(id, x, y)])
    }

    /// Last finger up at `(x, y)`.
    pub fn up(id: PointerId, x: f64, y: f64) -> Self {
        Self::new(TouchAction::PointerUp, id, vec![Pointer::new(id, x, y)])
    }

    /// Movement with the full set of current positions.
    pub fn moved(pointers: Vec<Pointer>) -> Self {
        let pointer = pointers.first().map_or(0, |p| p.id);
        Self::new(TouchAction::PointerMove, pointer, pointers)
    }

    pub fn cancel(pointers: Vec<Pointer>) -> Self {
        let pointer = pointers.first().map_or(0, |p| p.id);
        Self::new(TouchAction::PointerCancel, pointer, pointers)
    }

    /// Position of `id` in this event, if it is reported with finite
    /// coordinates.
    pub fn position_of(&self, id: PointerId) -> Option<Point> {
        self.pointers
            .iter()
            .find(|p| p.id == id && p.is_finite())
            .map(Pointer::position)
    }

    /// All reported pointers keyed by id.
    ///
    /// Pointers with a NaN or infinite coordinate count as not reported.
    /// Duplicate ids keep the last usable position.
    pub fn pointer_map(&self) -> BTreeMap<PointerId, Point> {
        self.pointers
            .iter()
            .filter(|p| p.is_finite())
            .map(|p| (p.id, p.position()))
            .collect()
    }
}
