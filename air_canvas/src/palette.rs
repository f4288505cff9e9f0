//! Menu palette — the swatches shown while the menu is open.
//!
//! Swatches are laid out in screen-unit coordinates (fractions of the
//! window), the same space as [`Session::cursor`](crate::session::Session::cursor).
//! Holding the cursor over one swatch for [`DEFAULT_HOVER_SECS`] emits its
//! [`ToolEvent`] once; the cursor has to leave the swatch before it can fire
//! again.

use hand_pose::{Normalized, Point};
use ink_surface::{Tool, ToolEvent};

pub const DEFAULT_HOVER_SECS: f32 = 0.6;

/// Widths offered in the menu, in world units.
pub const WIDTHS: [f32; 4] = [2.0, 6.0, 12.0, 24.0];

// ════════════════════════════════════════════════════════════════════════════
// Colors
// ════════════════════════════════════════════════════════════════════════════

/// Convert HSV (h in degrees, s and v in 0–1) to opaque packed ARGB.
pub fn hsv_to_argb(h: f32, s: f32, v: f32) -> u32 {
    let h      = h.rem_euclid(360.0) / 60.0;
    let sector = h.floor();
    let f      = h - sector;
    let (p, q, t) = (v * (1.0 - s), v * (1.0 - s * f), v * (1.0 - s * (1.0 - f)));
    let (r, g, b) = match sector as u32 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    let byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
    0xFF00_0000 | (byte(r) << 16) | (byte(g) << 8) | byte(b)
}

/// The six pen colors, also bound to keys `1`–`6`.  Evenly spaced hues
/// starting at cyan, plus white in the last slot.
pub fn pen_colors() -> [u32; 6] {
    let mut colors = [0xFFFF_FFFF; 6];
    for (i, c) in colors.iter_mut().take(5).enumerate() {
        *c = hsv_to_argb(186.0 + i as f32 * 72.0, 1.0, 1.0);
    }
    colors
}

// ════════════════════════════════════════════════════════════════════════════
// Swatch
// ════════════════════════════════════════════════════════════════════════════

/// Axis-aligned rectangle in screen-unit coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnitRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl UnitRect {
    pub fn contains(&self, p: Point<Normalized>) -> bool {
        p.x >= self.x && p.x < self.x + self.w && p.y >= self.y && p.y < self.y + self.h
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Swatch {
    pub rect:  UnitRect,
    pub event: ToolEvent,
    pub label: String,
}

impl Swatch {
    /// Whether this swatch describes the tool's current state.
    pub fn is_selected(&self, tool: &Tool) -> bool {
        match self.event {
            ToolEvent::SelectColor(c) => !tool.eraser && tool.color == c,
            ToolEvent::SelectWidth(w) => (tool.width - w).abs() < 1e-3,
            ToolEvent::SetEraser(on)  => tool.eraser == on,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// MenuPalette
// ════════════════════════════════════════════════════════════════════════════

pub struct MenuPalette {
    swatches:   Vec<Swatch>,
    hover:      Option<usize>,
    held:       f32,
    fired:      bool,
    hover_secs: f32,
}

impl Default for MenuPalette {
    fn default() -> Self {
        MenuPalette::new(DEFAULT_HOVER_SECS)
    }
}

impl MenuPalette {
    pub fn new(hover_secs: f32) -> Self {
        MenuPalette {
            swatches: layout(),
            hover:    None,
            held:     0.0,
            fired:    false,
            hover_secs,
        }
    }

    pub fn swatches(&self) -> &[Swatch] { &self.swatches }
    pub fn hovered(&self) -> Option<usize> { self.hover }

    /// 0.0–1.0 toward selecting the hovered swatch.
    pub fn hover_progress(&self) -> f32 {
        if self.hover.is_none() || self.fired { return 0.0; }
        (self.held / self.hover_secs.max(f32::EPSILON)).clamp(0.0, 1.0)
    }

    pub fn hit(&self, p: Point<Normalized>) -> Option<usize> {
        self.swatches.iter().position(|s| s.rect.contains(p))
    }

    /// Advance the hover timer.  Returns the swatch's event on the frame the
    /// hover completes.
    pub fn update(&mut self, cursor: Option<Point<Normalized>>, dt: f32) -> Option<ToolEvent> {
        let hit = cursor.and_then(|p| self.hit(p));
        if hit != self.hover {
            self.hover = hit;
            self.held  = 0.0;
            self.fired = false;
            return None;
        }
        let idx = hit?;
        if self.fired { return None; }

        self.held += dt.max(0.0);
        if self.held >= self.hover_secs {
            self.fired = true;
            return Some(self.swatches[idx].event);
        }
        None
    }

    /// Forget any hover in progress.
    pub fn reset(&mut self) {
        self.hover = None;
        self.held  = 0.0;
        self.fired = false;
    }
}

/// Two centred rows: six colors on top, four widths and the eraser below.
fn layout() -> Vec<Swatch> {
    const SIZE: f32 = 0.09;
    const GAP:  f32 = 0.02;
    const TOP:  f32 = 0.30;

    let row = |n: usize, y: f32| {
        let total = n as f32 * SIZE + (n - 1) as f32 * GAP;
        let x0 = 0.5 - total / 2.0;
        (0..n).map(move |i| UnitRect { x: x0 + i as f32 * (SIZE + GAP), y, w: SIZE, h: SIZE })
    };

    let mut swatches: Vec<Swatch> = row(6, TOP)
        .zip(pen_colors())
        .enumerate()
        .map(|(i, (rect, c))| Swatch { rect, event: ToolEvent::SelectColor(c), label: format!("{}", i + 1) })
        .collect();

    let lower: Vec<UnitRect> = row(WIDTHS.len() + 1, TOP + SIZE + GAP * 2.0).collect();
    for (&rect, w) in lower.iter().zip(WIDTHS) {
        swatches.push(Swatch { rect, event: ToolEvent::SelectWidth(w), label: format!("{w:.0}") });
    }
    if let Some(&rect) = lower.last() {
        swatches.push(Swatch { rect, event: ToolEvent::SetEraser(true), label: "ERASE".into() });
    }
    swatches
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
