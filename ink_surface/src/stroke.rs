//! Ink engine — strokes in world space.
//!
//! While the active gesture is `PinchDraw` the engine follows the index tip:
//!
//! 1. **Smooth.** The new point is `lerp(anchor, target, alpha)` where
//!    `anchor` is the previous emitted point.  `alpha` is distance-adaptive:
//!    small moves get a low weight (jitter is damped), fast moves a high one
//!    (the line keeps up with the finger).
//! 2. **Thin.** A point closer than `min_spacing` to the stroke's last point
//!    is not appended, which bounds point density without losing shape.
//!
//! When the gesture stops being `PinchDraw` the open stroke is sealed into
//! history and the anchor is dropped, so the next stroke starts exactly at
//! the finger instead of sliding in from the old position.

use serde::Deserialize;
use tracing::{debug, info};

use hand_pose::{Gesture, Point, World};

use crate::particles::ParticleField;

// ════════════════════════════════════════════════════════════════════════════
// Tool
// ════════════════════════════════════════════════════════════════════════════

pub const MIN_WIDTH: f32 = 1.0;
pub const MAX_WIDTH: f32 = 64.0;

/// Current pen.  Copied into each stroke when it starts, so changing the
/// tool never touches strokes already drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tool {
    /// Packed ARGB.
    pub color:  u32,
    pub width:  f32,
    pub eraser: bool,
}

impl Default for Tool {
    fn default() -> Self {
        Tool { color: 0xFF00E5FF, width: 6.0, eraser: false }
    }
}

/// Discrete selection emitted by the menu layer or keyboard.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ToolEvent {
    SelectColor(u32),
    SelectWidth(f32),
    SetEraser(bool),
}

impl Tool {
    pub fn apply(&mut self, event: ToolEvent) {
        match event {
            ToolEvent::SelectColor(c) => {
                self.color  = c;
                self.eraser = false;
            }
            ToolEvent::SelectWidth(w) => self.width = w.clamp(MIN_WIDTH, MAX_WIDTH),
            ToolEvent::SetEraser(on)  => self.eraser = on,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Stroke
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub struct Stroke {
    pub points: Vec<Point<World>>,
    pub color:  u32,
    pub width:  f32,
    pub eraser: bool,
}

impl Stroke {
    fn start(tool: &Tool, first: Point<World>) -> Self {
        Stroke {
            points: vec![first],
            color:  tool.color,
            width:  tool.width,
            eraser: tool.eraser,
        }
    }

    pub fn last_point(&self) -> Option<Point<World>> {
        self.points.last().copied()
    }

    /// A stroke needs two points before it is a line.
    pub fn is_line(&self) -> bool {
        self.points.len() >= 2
    }
}

// ════════════════════════════════════════════════════════════════════════════
// InkConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct InkConfig {
    /// Smoothing weight at or below `slow_distance` of travel.
    pub smoothing_slow: f32,
    /// Smoothing weight at or above `fast_distance` of travel.
    pub smoothing_fast: f32,
    pub slow_distance:  f32,
    pub fast_distance:  f32,
    /// Minimum world distance between consecutive stroke points.
    pub min_spacing:    f32,
    /// Dissolve samples every `dissolve_stride`-th point.
    pub dissolve_stride: usize,
}

impl Default for InkConfig {
    fn default() -> Self {
        InkConfig {
            smoothing_slow:  0.25,
            smoothing_fast:  0.75,
            slow_distance:   2.0,
            fast_distance:   40.0,
            min_spacing:     1.5,
            dissolve_stride: 3,
        }
    }
}

impl InkConfig {
    /// Smoothing weight for a move of `travel` world units.
    pub fn smoothing_for(&self, travel: f32) -> f32 {
        let span = (self.fast_distance - self.slow_distance).max(f32::EPSILON);
        let t = ((travel - self.slow_distance) / span).clamp(0.0, 1.0);
        self.smoothing_slow + (self.smoothing_fast - self.smoothing_slow) * t
    }
}

// ════════════════════════════════════════════════════════════════════════════
// InkEngine
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Default)]
pub struct InkEngine {
    config:  InkConfig,
    tool:    Tool,
    history: Vec<Stroke>,
    current: Option<Stroke>,
    /// Last emitted (smoothed) point of the open stroke.
    anchor:  Option<Point<World>>,
}

impl InkEngine {
    pub fn new(config: InkConfig) -> Self {
        InkEngine { config, ..InkEngine::default() }
    }

    pub fn tool(&self) -> &Tool { &self.tool }
    pub fn history(&self) -> &[Stroke] { &self.history }
    pub fn current(&self) -> Option<&Stroke> { self.current.as_ref() }
    pub fn is_drawing(&self) -> bool { self.current.is_some() }

    /// Applies to the next stroke only.
    pub fn apply_tool(&mut self, event: ToolEvent) {
        self.tool.apply(event);
        debug!("tool now {:?}", self.tool);
    }

    /// Per-frame update.  `target` is the raw index tip in world space, when
    /// a hand is visible.
    pub fn update(&mut self, active: Gesture, target: Option<Point<World>>) {
        if active != Gesture::PinchDraw {
            self.seal();
            return;
        }
        let Some(target) = target else { return };

        let point = match self.anchor {
            Some(anchor) => {
                let alpha = self.config.smoothing_for(anchor.distance(target));
                anchor.lerp(target, alpha)
            }
            None => target,
        };
        self.anchor = Some(point);

        match &mut self.current {
            None => {
                debug!("stroke started at ({:.1}, {:.1})", point.x, point.y);
                self.current = Some(Stroke::start(&self.tool, point));
            }
            Some(stroke) => {
                let far_enough = stroke
                    .last_point()
                    .map_or(true, |last| last.distance(point) > self.config.min_spacing);
                if far_enough {
                    stroke.points.push(point);
                }
            }
        }
    }

    /// Move the open stroke into history.  No-op when nothing is open.
    pub fn seal(&mut self) {
        self.anchor = None;
        if let Some(stroke) = self.current.take() {
            debug!("stroke sealed with {} points", stroke.points.len());
            self.history.push(stroke);
        }
    }

    /// Drop the open stroke without keeping it.
    pub fn cancel(&mut self) {
        self.anchor = None;
        if self.current.take().is_some() {
            debug!("stroke cancelled");
        }
    }

    /// Turn every sealed ink stroke into particles and clear history.
    ///
    /// Samples points `0, stride, 2·stride, …` of each stroke.  Eraser strokes
    /// carry no visible ink and spawn nothing.  Returns the spawn count.
    pub fn dissolve(&mut self, field: &mut ParticleField) -> usize {
        let stride = self.config.dissolve_stride.max(1);
        let mut spawned = 0;
        for stroke in self.history.drain(..) {
            if stroke.eraser { continue; }
            for &p in stroke.points.iter().step_by(stride) {
                field.burst(p, stroke.color, stroke.width);
                spawned += 1;
            }
        }
        info!("dissolved ink into {} particles", spawned);
        spawned
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
