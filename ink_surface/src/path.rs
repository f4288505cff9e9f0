//! Midpoint quadratic smoothing.
//!
//! Raw stroke samples are treated as control points of a running quadratic
//! curve: each segment ends at the midpoint between two consecutive samples
//! and bends through the sample between them.  Consecutive segments share a
//! tangent at the midpoints, so noisy samples render as continuous ink.
//!
//! ```text
//!  p0 ──▶ mid(p1,p2) via p1 ──▶ mid(p2,p3) via p2 ──▶ … ──▶ line to pn
//! ```

use hand_pose::Point;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand<S> {
    MoveTo(Point<S>),
    QuadTo { ctrl: Point<S>, to: Point<S> },
    LineTo(Point<S>),
}

/// Quadratic Bézier from `from` to `to` bending toward `ctrl`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuadSegment<S> {
    pub from: Point<S>,
    pub ctrl: Point<S>,
    pub to:   Point<S>,
}

impl<S: Copy> QuadSegment<S> {
    pub fn eval(&self, t: f32) -> Point<S> {
        let u = 1.0 - t;
        let x = u * u * self.from.x + 2.0 * u * t * self.ctrl.x + t * t * self.to.x;
        let y = u * u * self.from.y + 2.0 * u * t * self.ctrl.y + t * t * self.to.y;
        Point::new(x, y)
    }

    /// `steps + 1` evenly spaced samples from `from` to `to` inclusive.
    pub fn flatten(&self, steps: usize) -> Vec<Point<S>> {
        let steps = steps.max(1);
        (0..=steps).map(|i| self.eval(i as f32 / steps as f32)).collect()
    }

    /// Control-polygon length; an upper bound on the curve length, good
    /// enough to pick a flattening step count.
    pub fn hull_length(&self) -> f32 {
        self.from.distance(self.ctrl) + self.ctrl.distance(self.to)
    }
}

/// Build the smoothed path for a point sequence.
///
/// Fewer than two points yields no path: a single sample is not a segment.
pub fn smooth_path<S: Copy>(points: &[Point<S>]) -> Vec<PathCommand<S>> {
    let (first, last) = match points {
        [first, .., last] => (*first, *last),
        _ => return Vec::new(),
    };

    let mut cmds = Vec::with_capacity(points.len() + 1);
    cmds.push(PathCommand::MoveTo(first));
    for pair in points[1..].windows(2) {
        let (ctrl, next) = (pair[0], pair[1]);
        cmds.push(PathCommand::QuadTo { ctrl, to: ctrl.midpoint(next) });
    }
    cmds.push(PathCommand::LineTo(last));
    cmds
}

/// Walk a path as a sequence of straight pieces, flattening each quadratic
/// into roughly `px_per_step`-long steps.  `f` receives `(from, to)`.
pub fn for_each_line<S: Copy>(cmds: &[PathCommand<S>], px_per_step: f32, mut f: impl FnMut(Point<S>, Point<S>)) {
    let mut pen: Option<Point<S>> = None;
    for cmd in cmds {
        match *cmd {
            PathCommand::MoveTo(p) => pen = Some(p),
            PathCommand::LineTo(p) => {
                if let Some(from) = pen { f(from, p); }
                pen = Some(p);
            }
            PathCommand::QuadTo { ctrl, to } => {
                if let Some(from) = pen {
                    let seg = QuadSegment { from, ctrl, to };
                    let steps = (seg.hull_length() / px_per_step.max(0.5)).ceil() as usize;
                    let pts = seg.flatten(steps.clamp(1, 64));
                    for w in pts.windows(2) { f(w[0], w[1]); }
                }
                pen = Some(to);
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use hand_pose::World;

    fn wp(x: f32, y: f32) -> Point<World> { Point::new(x, y) }

    #[test]
    fn short_inputs_make_no_path() {
        assert!(smooth_path::<World>(&[]).is_empty());
        assert!(smooth_path(&[wp(1.0, 1.0)]).is_empty());
    }

    #[test]
    fn two_points_is_a_straight_line() {
        let cmds = smooth_path(&[wp(0.0, 0.0), wp(10.0, 0.0)]);
        assert_eq!(cmds, vec![PathCommand::MoveTo(wp(0.0, 0.0)), PathCommand::LineTo(wp(10.0, 0.0))]);
    }

    #[test]
    fn interior_points_become_controls_ending_at_midpoints() {
        let pts = [wp(0.0, 0.0), wp(10.0, 0.0), wp(10.0, 10.0), wp(0.0, 10.0)];
        let cmds = smooth_path(&pts);
        assert_eq!(cmds.len(), 4);
        assert_eq!(cmds[1], PathCommand::QuadTo { ctrl: wp(10.0, 0.0), to: wp(10.0, 5.0) });
        assert_eq!(cmds[2], PathCommand::QuadTo { ctrl: wp(10.0, 10.0), to: wp(5.0, 10.0) });
        assert_eq!(cmds[3], PathCommand::LineTo(wp(0.0, 10.0)));
    }

    #[test]
    fn quad_endpoints_and_flatten() {
        let q = QuadSegment { from: wp(0.0, 0.0), ctrl: wp(5.0, 10.0), to: wp(10.0, 0.0) };
        assert_eq!(q.eval(0.0), wp(0.0, 0.0));
        assert_eq!(q.eval(1.0), wp(10.0, 0.0));
        assert!((q.eval(0.5).y - 5.0).abs() < 1e-5);
        let pts = q.flatten(8);
        assert_eq!(pts.len(), 9);
    }

    #[test]
    fn line_walk_is_continuous() {
        let pts = [wp(0.0, 0.0), wp(20.0, 0.0), wp(20.0, 20.0), wp(40.0, 20.0)];
        let cmds = smooth_path(&pts);
        let mut pieces = Vec::new();
        for_each_line(&cmds, 2.0, |a, b| pieces.push((a, b)));
        assert!(!pieces.is_empty());
        for w in pieces.windows(2) {
            assert_eq!(w[0].1, w[1].0);
        }
        assert_eq!(pieces.first().map(|p| p.0), Some(wp(0.0, 0.0)));
        assert_eq!(pieces.last().map(|p| p.1), Some(wp(40.0, 20.0)));
    }
}
