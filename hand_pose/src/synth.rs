//! Synthetic hand poses.
//!
//! Used by the keyboard/mouse simulation source to drive the pipeline without
//! a camera, and by tests as fixtures.  Geometry is a stylised upright right
//! hand (fingers pointing toward −y) roughly 0.2 units tall, centred on the
//! palm at `(cx, cy)`.

use crate::landmark::*;

/// Per-finger MCP offsets from the wrist: index, middle, ring, pinky.
const MCP_OFFSETS: [(f32, f32); 4] = [(-0.03, -0.10), (-0.01, -0.10), (0.01, -0.10), (0.03, -0.09)];

/// (pip, dip, tip) offsets from the MCP for a straight finger.
const EXTENDED: [(f32, f32); 3] = [(0.0, -0.04), (0.0, -0.07), (0.0, -0.095)];
/// (pip, dip, tip) offsets from the MCP for a curled finger; the tip ends up
/// back toward the wrist, just past the knuckle.
const FOLDED:   [(f32, f32); 3] = [(0.0, -0.03), (0.0, -0.005), (0.0, 0.015)];

const THUMB_CMC_OFF: (f32, f32) = (-0.04, -0.03);
const THUMB_MCP_OFF: (f32, f32) = (-0.07, -0.05);
const THUMB_IP_OFF:  (f32, f32) = (-0.09, -0.07);
const THUMB_OUT:     (f32, f32) = (-0.11, -0.09);
/// Folded thumb tip rests across the palm, clear of the index tip.
const THUMB_TUCKED:  (f32, f32) = (0.03, -0.05);

/// Build a hand with an explicit extended/folded state per digit.
/// `fingers` is index, middle, ring, pinky.
pub fn hand(cx: f32, cy: f32, thumb_out: bool, fingers: [bool; 4]) -> Hand {
    let wx = cx;
    let wy = cy + 0.08;
    let at = |(dx, dy): (f32, f32)| Landmark::new(wx + dx, wy + dy, 0.0);

    let mut pts = [Landmark::default(); LANDMARK_COUNT];
    pts[WRIST]     = at((0.0, 0.0));
    pts[THUMB_CMC] = at(THUMB_CMC_OFF);
    pts[THUMB_MCP] = at(THUMB_MCP_OFF);
    pts[THUMB_IP]  = at(THUMB_IP_OFF);
    pts[THUMB_TIP] = at(if thumb_out { THUMB_OUT } else { THUMB_TUCKED });

    for (i, finger) in Finger::ALL.iter().enumerate() {
        let (mx, my) = MCP_OFFSETS[i];
        let joints = if fingers[i] { EXTENDED } else { FOLDED };
        let mcp = finger.mcp();
        pts[mcp] = at((mx, my));
        for (k, (jx, jy)) in joints.iter().enumerate() {
            pts[mcp + 1 + k] = at((mx + jx, my + jy));
        }
    }
    Hand::new(pts)
}

pub fn open_palm(cx: f32, cy: f32) -> Hand { hand(cx, cy, true,  [true, true, true, true]) }
pub fn fist(cx: f32, cy: f32)      -> Hand { hand(cx, cy, false, [false, false, false, false]) }
pub fn pointing(cx: f32, cy: f32)  -> Hand { hand(cx, cy, false, [true, false, false, false]) }
pub fn peace(cx: f32, cy: f32)     -> Hand { hand(cx, cy, false, [true, true, false, false]) }

/// A pointing hand with the thumb tip brought to `gap` units right of the
/// index tip.
pub fn pinch(cx: f32, cy: f32, gap: f32) -> Hand {
    let mut pts = *pointing(cx, cy).landmarks();
    let tip = pts[INDEX_TIP];
    pts[THUMB_TIP] = Landmark::new(tip.x + gap, tip.y, 0.0);
    Hand::new(pts)
}

/// Two pointing hands `spread` apart horizontally, centred on `(cx, cy)`.
pub fn zoom_pair(cx: f32, cy: f32, spread: f32) -> [Hand; 2] {
    let half = spread * 0.5;
    [pointing(cx - half, cy), pointing(cx + half, cy)]
}
