//! Pan/zoom view transform.
//!
//! `screen = world * scale + offset`, with `scale` clamped to
//! `[min_scale, max_scale]`.  Two-hand zoom feeds the two index-tip screen
//! positions once per frame:
//!
//! * The first frame of a zoom only records the baseline (distance between
//!   the tips and their midpoint) — there is nothing to divide by yet.
//! * Every later frame scales by `new_dist / prev_dist` and re-solves the
//!   offset so the world point under the current midpoint stays put:
//!   `offset' = center - (center - offset) * (scale' / scale)`.  Moving both
//!   hands without changing their spread leaves the view alone.
//! * [`ViewTransform::end_zoom`] drops the baseline so the next zoom starts
//!   clean.

use serde::Deserialize;
use tracing::debug;

use hand_pose::{Point, Screen, World};

/// Baselines shorter than this are re-recorded instead of divided by.
const MIN_BASELINE: f32 = 1e-6;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub min_scale: f32,
    pub max_scale: f32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        ViewConfig { min_scale: 0.5, max_scale: 5.0 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct ZoomBaseline {
    distance: f32,
    center:   Point<Screen>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ViewTransform {
    pub offset_x: f32,
    pub offset_y: f32,
    scale:        f32,
    config:       ViewConfig,
    baseline:     Option<ZoomBaseline>,
}

impl ViewTransform {
    pub fn new(config: ViewConfig) -> Self {
        ViewTransform {
            offset_x: 0.0,
            offset_y: 0.0,
            scale:    1.0_f32.clamp(config.min_scale, config.max_scale),
            config,
            baseline: None,
        }
    }

    pub fn scale(&self) -> f32 { self.scale }

    pub fn is_zooming(&self) -> bool { self.baseline.is_some() }

    pub fn to_screen(&self, p: Point<World>) -> Point<Screen> {
        Point::new(p.x * self.scale + self.offset_x, p.y * self.scale + self.offset_y)
    }

    pub fn to_world(&self, p: Point<Screen>) -> Point<World> {
        Point::new((p.x - self.offset_x) / self.scale, (p.y - self.offset_y) / self.scale)
    }

    /// Feed one zoom frame with the two index-tip screen positions.
    pub fn apply_zoom(&mut self, a: Point<Screen>, b: Point<Screen>) {
        let distance = a.distance(b);
        let center   = a.midpoint(b);

        let prev = match self.baseline {
            Some(prev) if prev.distance > MIN_BASELINE => prev,
            _ => {
                self.baseline = Some(ZoomBaseline { distance, center });
                return;
            }
        };

        let new_scale = (self.scale * (distance / prev.distance))
            .clamp(self.config.min_scale, self.config.max_scale);
        let k = new_scale / self.scale;

        self.offset_x = center.x - (center.x - self.offset_x) * k;
        self.offset_y = center.y - (center.y - self.offset_y) * k;
        self.scale    = new_scale;
        self.baseline = Some(ZoomBaseline { distance, center });
    }

    /// Leave zoom: the next [`apply_zoom`](Self::apply_zoom) records a fresh
    /// baseline.
    pub fn end_zoom(&mut self) {
        if self.baseline.take().is_some() {
            debug!("zoom ended at scale {:.2}", self.scale);
        }
    }

    /// Back to identity.
    pub fn reset(&mut self) {
        self.offset_x = 0.0;
        self.offset_y = 0.0;
        self.scale    = 1.0_f32.clamp(self.config.min_scale, self.config.max_scale);
        self.baseline = None;
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        ViewTransform::new(ViewConfig::default())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn sp(x: f32, y: f32) -> Point<Screen> { Point::new(x, y) }

    fn close(a: f32, b: f32) -> bool { (a - b).abs() < 1e-3 }

    #[test]
    fn first_frame_is_calibration_only() {
        let mut v = ViewTransform::default();
        v.apply_zoom(sp(100.0, 100.0), sp(200.0, 100.0));
        assert_eq!(v.scale(), 1.0);
        assert_eq!((v.offset_x, v.offset_y), (0.0, 0.0));
        assert!(v.is_zooming());
    }

    #[test]
    fn doubling_distance_doubles_scale_about_fixed_center() {
        let mut v = ViewTransform::default();
        let c = sp(320.0, 240.0);
        v.apply_zoom(sp(270.0, 240.0), sp(370.0, 240.0));
        let world_under_c = v.to_world(c);
        v.apply_zoom(sp(220.0, 240.0), sp(420.0, 240.0));

        assert!(close(v.scale(), 2.0));
        let back = v.to_screen(world_under_c);
        assert!(close(back.x, c.x) && close(back.y, c.y));
        let again = v.to_screen(v.to_world(c));
        assert!(close(again.x, c.x) && close(again.y, c.y));
    }

    #[test]
    fn scale_clamps_to_max() {
        let mut v = ViewTransform::default();
        let mut d = 20.0;
        v.apply_zoom(sp(300.0 - d, 200.0), sp(300.0 + d, 200.0));
        for _ in 0..5 {
            d *= 2.0;
            let before = v.scale();
            v.apply_zoom(sp(300.0 - d, 200.0), sp(300.0 + d, 200.0));
            assert!(close(v.scale(), (before * 2.0).min(5.0)));
        }
        assert!(close(v.scale(), 5.0));
        // The centre still maps to itself at the clamp.
        let c = sp(300.0, 200.0);
        let back = v.to_screen(v.to_world(c));
        assert!(close(back.x, c.x) && close(back.y, c.y));
    }

    #[test]
    fn scale_clamps_to_min() {
        let mut v = ViewTransform::default();
        v.apply_zoom(sp(0.0, 0.0), sp(400.0, 0.0));
        v.apply_zoom(sp(0.0, 0.0), sp(10.0, 0.0));
        assert!(close(v.scale(), 0.5));
    }

    #[test]
    fn zero_baseline_rebaselines() {
        let mut v = ViewTransform::default();
        v.apply_zoom(sp(50.0, 50.0), sp(50.0, 50.0));
        v.apply_zoom(sp(0.0, 50.0), sp(100.0, 50.0));
        assert_eq!(v.scale(), 1.0);
        assert!(v.scale().is_finite());
    }

    #[test]
    fn translating_hands_at_same_spread_keeps_offset() {
        let mut v = ViewTransform::default();
        v.apply_zoom(sp(100.0, 100.0), sp(200.0, 100.0));
        v.apply_zoom(sp(130.0, 120.0), sp(230.0, 120.0));
        assert!(close(v.scale(), 1.0));
        assert!(close(v.offset_x, 0.0) && close(v.offset_y, 0.0));
    }

    #[test]
    fn zoom_holds_world_point_under_new_midpoint() {
        let mut v = ViewTransform::default();
        v.apply_zoom(sp(100.0, 100.0), sp(200.0, 100.0));
        // Spread doubles while the midpoint moves from (150,100) to (200,150).
        let c = sp(200.0, 150.0);
        let world_under_c = v.to_world(c);
        v.apply_zoom(sp(100.0, 150.0), sp(300.0, 150.0));
        assert!(close(v.scale(), 2.0));
        assert!(close(v.offset_x, -200.0) && close(v.offset_y, -150.0));
        let back = v.to_screen(world_under_c);
        assert!(close(back.x, c.x) && close(back.y, c.y));
    }

    #[test]
    fn end_zoom_clears_baseline() {
        let mut v = ViewTransform::default();
        v.apply_zoom(sp(0.0, 0.0), sp(100.0, 0.0));
        v.end_zoom();
        assert!(!v.is_zooming());
        // Fresh baseline: a larger spread right after does not zoom.
        v.apply_zoom(sp(0.0, 0.0), sp(300.0, 0.0));
        assert_eq!(v.scale(), 1.0);
    }

    #[test]
    fn world_screen_round_trip_under_zoom() {
        let mut v = ViewTransform::default();
        v.apply_zoom(sp(100.0, 100.0), sp(200.0, 100.0));
        v.apply_zoom(sp(75.0, 100.0), sp(225.0, 100.0));
        let w: Point<World> = Point::new(12.5, -40.0);
        let s = v.to_screen(w);
        let w2 = v.to_world(s);
        assert!(close(w.x, w2.x) && close(w.y, w2.y));
    }
}
