//! Coordinate spaces and the pure geometry the pose rules are built from.
//!
//! Three spaces exist and are never mixed implicitly:
//!
//! * [`Normalized`] — detector frame, x/y in `[0, 1]`.
//! * [`Screen`] — window pixels.
//! * [`World`] — the drawing surface, independent of pan/zoom.
//!
//! `Point<Screen>` and `Point<World>` are different types, so handing a screen
//! point to code expecting world coordinates is a compile error.  Conversions
//! live next to the things that define them (the screen projection and the
//! view transform).

use std::marker::PhantomData;

use crate::landmark::{Hand, PINKY_MCP, THUMB_IP, THUMB_TIP, WRIST};

// ════════════════════════════════════════════════════════════════════════════
// Spaces
// ════════════════════════════════════════════════════════════════════════════

/// Detector image space, `[0, 1]` on both axes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Normalized;

/// Window pixel space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Screen;

/// Drawing-surface space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct World;

// ════════════════════════════════════════════════════════════════════════════
// Point
// ════════════════════════════════════════════════════════════════════════════

/// A 2D point tagged with its coordinate space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point<S> {
    pub x: f32,
    pub y: f32,
    _space: PhantomData<S>,
}

impl<S> Point<S> {
    pub const fn new(x: f32, y: f32) -> Self {
        Point { x, y, _space: PhantomData }
    }

    pub fn distance(self, other: Point<S>) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn lerp(self, other: Point<S>, t: f32) -> Point<S> {
        Point::new(lerp(self.x, other.x, t), lerp(self.y, other.y, t))
    }

    pub fn midpoint(self, other: Point<S>) -> Point<S> {
        self.lerp(other, 0.5)
    }

    /// Reinterpret the raw coordinates in another space.  Only conversion
    /// functions should call this.
    pub fn cast<T>(self) -> Point<T> {
        Point::new(self.x, self.y)
    }
}

/// Euclidean distance between two points of the same space.
pub fn distance<S>(a: Point<S>, b: Point<S>) -> f32 {
    a.distance(b)
}

/// Linear interpolation: `t = 0` yields `a`, `t = 1` yields `b`.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Component-wise [`lerp`] between two points.
pub fn lerp_point<S>(a: Point<S>, b: Point<S>, t: f32) -> Point<S> {
    a.lerp(b, t)
}

// ════════════════════════════════════════════════════════════════════════════
// Finger predicates
// ════════════════════════════════════════════════════════════════════════════

/// Tip-to-mcp distance under which a finger counts as folded regardless of
/// the wrist comparison.
pub const FOLD_PROXIMITY: f32 = 0.05;

/// True when the tip is farther from the wrist than the pip joint, by at
/// least `margin` (a multiplier ≥ 1.0).
pub fn is_finger_extended(hand: &Hand, tip: usize, pip: usize, margin: f32) -> bool {
    let wrist = hand.point(WRIST);
    wrist.distance(hand.point(tip)) > wrist.distance(hand.point(pip)) * margin
}

/// True when the tip curls back nearer the wrist than the pip joint, or sits
/// within `proximity` of the mcp joint.
///
/// The first test catches a fold seen flat-on, the second one seen edge-on
/// where the wrist distances are foreshortened.
pub fn is_finger_folded(hand: &Hand, tip: usize, pip: usize, mcp: usize, proximity: f32) -> bool {
    let wrist = hand.point(WRIST);
    let t = hand.point(tip);
    wrist.distance(t) < wrist.distance(hand.point(pip))
        || t.distance(hand.point(mcp)) < proximity
}

/// Thumb extension measured against the pinky knuckle: an extended thumb
/// reaches farther across than its own IP joint.
pub fn is_thumb_extended(hand: &Hand) -> bool {
    let baseline = hand.point(PINKY_MCP);
    hand.point(THUMB_TIP).distance(baseline) > hand.point(THUMB_IP).distance(baseline)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
