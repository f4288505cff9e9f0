//! Hand landmarks as produced by the external detector.
//!
//! A [`Hand`] is always exactly [`LANDMARK_COUNT`] points in MediaPipe order.
//! Anything shorter or longer never becomes a `Hand`; callers get `None`
//! from [`Hand::from_slice`] and treat the hand as absent.

use serde::Deserialize;

use crate::geometry::{Normalized, Point};

/// Number of landmarks per detected hand.
pub const LANDMARK_COUNT: usize = 21;

// ════════════════════════════════════════════════════════════════════════════
// Joint indices
// ════════════════════════════════════════════════════════════════════════════

pub const WRIST:      usize = 0;
pub const THUMB_CMC:  usize = 1;
pub const THUMB_MCP:  usize = 2;
pub const THUMB_IP:   usize = 3;
pub const THUMB_TIP:  usize = 4;
pub const INDEX_MCP:  usize = 5;
pub const INDEX_PIP:  usize = 6;
pub const INDEX_DIP:  usize = 7;
pub const INDEX_TIP:  usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP:   usize = 13;
pub const RING_PIP:   usize = 14;
pub const RING_DIP:   usize = 15;
pub const RING_TIP:   usize = 16;
pub const PINKY_MCP:  usize = 17;
pub const PINKY_PIP:  usize = 18;
pub const PINKY_DIP:  usize = 19;
pub const PINKY_TIP:  usize = 20;

/// The four non-thumb fingers as `(tip, pip, mcp)` triples.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Finger { Index, Middle, Ring, Pinky }

impl Finger {
    pub const ALL: [Finger; 4] = [Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky];

    pub fn tip(self) -> usize {
        match self {
            Finger::Index  => INDEX_TIP,
            Finger::Middle => MIDDLE_TIP,
            Finger::Ring   => RING_TIP,
            Finger::Pinky  => PINKY_TIP,
        }
    }

    pub fn pip(self) -> usize { self.tip() - 2 }
    pub fn mcp(self) -> usize { self.tip() - 3 }
}

// ════════════════════════════════════════════════════════════════════════════
// Landmark / Hand
// ════════════════════════════════════════════════════════════════════════════

/// One tracked point. `x`/`y` are normalized to the detector frame, `z` is
/// relative depth and ignored by the pose rules.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Landmark { x, y, z }
    }

    /// The landmark's projection onto the detector image plane.
    pub fn planar(&self) -> Point<Normalized> {
        Point::new(self.x, self.y)
    }
}

/// A complete 21-landmark hand.
#[derive(Clone, Debug, PartialEq)]
pub struct Hand {
    landmarks: [Landmark; LANDMARK_COUNT],
}

impl Hand {
    pub fn new(landmarks: [Landmark; LANDMARK_COUNT]) -> Self {
        Hand { landmarks }
    }

    /// Build a hand from a detector landmark list; `None` when the list does
    /// not have exactly [`LANDMARK_COUNT`] entries.
    pub fn from_slice(points: &[Landmark]) -> Option<Self> {
        let landmarks: [Landmark; LANDMARK_COUNT] = points.try_into().ok()?;
        Some(Hand { landmarks })
    }

    pub fn landmark(&self, idx: usize) -> &Landmark { &self.landmarks[idx] }
    pub fn landmarks(&self) -> &[Landmark; LANDMARK_COUNT] { &self.landmarks }

    /// Planar position of landmark `idx`.
    pub fn point(&self, idx: usize) -> Point<Normalized> {
        self.landmarks[idx].planar()
    }

    pub fn wrist(&self)     -> Point<Normalized> { self.point(WRIST) }
    pub fn index_tip(&self) -> Point<Normalized> { self.point(INDEX_TIP) }
    pub fn thumb_tip(&self) -> Point<Normalized> { self.point(THUMB_TIP) }

    /// Distance between the thumb and index finger tips — the pinch metric.
    pub fn pinch_distance(&self) -> f32 {
        self.thumb_tip().distance(self.index_tip())
    }

    /// A copy of this hand shifted by `(dx, dy)` in normalized units.
    pub fn translated(&self, dx: f32, dy: f32) -> Hand {
        let mut landmarks = self.landmarks;
        for lm in &mut landmarks {
            lm.x += dx;
            lm.y += dy;
        }
        Hand { landmarks }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_slice_requires_exact_count() {
        let short = vec![Landmark::default(); 20];
        let exact = vec![Landmark::default(); 21];
        let long  = vec![Landmark::default(); 22];
        assert!(Hand::from_slice(&short).is_none());
        assert!(Hand::from_slice(&exact).is_some());
        assert!(Hand::from_slice(&long).is_none());
    }

    #[test]
    fn finger_joint_indices() {
        assert_eq!(Finger::Index.mcp(), INDEX_MCP);
        assert_eq!(Finger::Middle.pip(), MIDDLE_PIP);
        assert_eq!(Finger::Pinky.tip(), PINKY_TIP);
        assert_eq!(Finger::Ring.mcp(), RING_MCP);
    }

    #[test]
    fn translated_moves_every_point() {
        let mut pts = [Landmark::default(); 21];
        pts[INDEX_TIP] = Landmark::new(0.4, 0.4, 0.0);
        let hand = Hand::new(pts).translated(0.1, -0.2);
        assert!((hand.index_tip().x - 0.5).abs() < 1e-6);
        assert!((hand.index_tip().y - 0.2).abs() < 1e-6);
        assert!((hand.wrist().x - 0.1).abs() < 1e-6);
    }
}
