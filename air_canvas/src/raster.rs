//! Software raster: a packed-ARGB pixel buffer and the handful of primitives
//! the visualizer needs.
//!
//! Two canvases are used per frame.  The *frame* canvas is opaque and goes to
//! the window.  The *ink* canvas keeps alpha: painting writes opaque pixels,
//! erasing writes transparent ones, and [`Canvas::composite`] lays it over
//! the frame.

use crate::session::FrameImage;

pub const TRANSPARENT: u32 = 0x0000_0000;

// ════════════════════════════════════════════════════════════════════════════
// Colour helpers
// ════════════════════════════════════════════════════════════════════════════

/// Mix two colours. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.  The result is
/// opaque.
pub fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let mix = |shift: u32| {
        let ca = ((a >> shift) & 0xFF) as f32;
        let cb = ((b >> shift) & 0xFF) as f32;
        ((ca + (cb - ca) * t).round() as u32) << shift
    };
    0xFF00_0000 | mix(16) | mix(8) | mix(0)
}

fn alpha_of(c: u32) -> f32 {
    (c >> 24) as f32 / 255.0
}

// ════════════════════════════════════════════════════════════════════════════
// Canvas
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub struct Canvas {
    width:  usize,
    height: usize,
    pixels: Vec<u32>,
}

impl Canvas {
    pub fn new(width: usize, height: usize, fill: u32) -> Self {
        Canvas { width, height, pixels: vec![fill; width * height] }
    }

    pub fn width(&self)  -> usize { self.width }
    pub fn height(&self) -> usize { self.height }
    pub fn pixels(&self) -> &[u32] { &self.pixels }

    pub fn fill(&mut self, color: u32) {
        self.pixels.fill(color);
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<u32> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let (x, y) = (usize::try_from(x).ok()?, usize::try_from(y).ok()?);
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, color: u32) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    /// Blend `color` over the existing pixel with opacity `alpha`.
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: u32, alpha: f32) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = blend(self.pixels[i], color, alpha);
        }
    }

    // ── rectangles ─────────────────────────────────────────────────────────

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: u32) {
        let x0 = x.clamp(0, self.width as i32);
        let x1 = (x + w).clamp(x0, self.width as i32);
        let y0 = y.max(0);
        let y1 = (y + h).min(self.height as i32);
        for row in y0..y1 {
            let base = row as usize * self.width;
            self.pixels[base + x0 as usize..base + x1 as usize].fill(color);
        }
    }

    /// Translucent rectangle over whatever is already drawn.
    pub fn shade_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: u32, alpha: f32) {
        for row in y..y + h {
            for col in x..x + w {
                self.blend_pixel(col, row, color, alpha);
            }
        }
    }

    pub fn draw_border(&mut self, x: i32, y: i32, w: i32, h: i32, thickness: i32, color: u32) {
        self.fill_rect(x, y, w, thickness, color);
        self.fill_rect(x, y + h - thickness, w, thickness, color);
        self.fill_rect(x, y, thickness, h, color);
        self.fill_rect(x + w - thickness, y, thickness, h, color);
    }

    // ── round things ───────────────────────────────────────────────────────

    fn for_disc(&self, cx: f32, cy: f32, r: f32, mut f: impl FnMut(i32, i32)) {
        let r = r.max(0.5);
        let (x0, x1) = ((cx - r).floor() as i32, (cx + r).ceil() as i32);
        let (y0, y1) = ((cy - r).floor() as i32, (cy + r).ceil() as i32);
        let r2 = r * r;
        for y in y0.max(0)..=y1.min(self.height as i32 - 1) {
            for x in x0.max(0)..=x1.min(self.width as i32 - 1) {
                let (dx, dy) = (x as f32 + 0.5 - cx, y as f32 + 0.5 - cy);
                if dx * dx + dy * dy <= r2 {
                    f(x, y);
                }
            }
        }
    }

    /// Filled disc; `alpha` < 1 blends, otherwise the pixels are replaced.
    pub fn fill_disc(&mut self, cx: f32, cy: f32, r: f32, color: u32, alpha: f32) {
        let mut hits = Vec::new();
        self.for_disc(cx, cy, r, |x, y| hits.push((x, y)));
        for (x, y) in hits {
            if alpha >= 1.0 {
                self.set_pixel(x, y, color);
            } else {
                self.blend_pixel(x, y, color, alpha);
            }
        }
    }

    /// Make a disc fully transparent.
    pub fn erase_disc(&mut self, cx: f32, cy: f32, r: f32) {
        self.fill_disc(cx, cy, r, TRANSPARENT, 1.0);
    }

    /// Thick line as a run of disc stamps no more than half a radius apart.
    pub fn stamp_line(&mut self, a: (f32, f32), b: (f32, f32), r: f32, color: u32) {
        let (dx, dy) = (b.0 - a.0, b.1 - a.1);
        let len   = (dx * dx + dy * dy).sqrt();
        let step  = (r * 0.5).max(0.5);
        let n     = (len / step).ceil().max(1.0) as usize;
        for i in 0..=n {
            let t = i as f32 / n as f32;
            self.fill_disc(a.0 + dx * t, a.1 + dy * t, r, color, 1.0);
        }
    }

    /// Ring arc starting at 12 o'clock, clockwise, covering `frac` of a turn.
    pub fn draw_arc(&mut self, cx: f32, cy: f32, r: f32, thickness: f32, frac: f32, color: u32) {
        let frac = frac.clamp(0.0, 1.0);
        if frac <= 0.0 { return; }
        let outer = r + thickness * 0.5;
        let inner = (r - thickness * 0.5).max(0.0);
        let mut hits = Vec::new();
        self.for_disc(cx, cy, outer, |x, y| {
            let (dx, dy) = (x as f32 + 0.5 - cx, y as f32 + 0.5 - cy);
            if dx * dx + dy * dy < inner * inner { return; }
            // 0 at 12 o'clock, increasing clockwise (screen y points down).
            let turn = dx.atan2(-dy).rem_euclid(std::f32::consts::TAU) / std::f32::consts::TAU;
            if turn <= frac {
                hits.push((x, y));
            }
        });
        for (x, y) in hits {
            self.set_pixel(x, y, color);
        }
    }

    // ── layers ─────────────────────────────────────────────────────────────

    /// Stretch a camera frame over the whole canvas (nearest neighbour),
    /// optionally flipped horizontally.
    pub fn blit_image(&mut self, image: &FrameImage, mirror: bool) {
        if image.width == 0 || image.height == 0 || image.pixels.len() < image.width * image.height {
            return;
        }
        for y in 0..self.height {
            let sy = y * image.height / self.height.max(1);
            for x in 0..self.width {
                let dx = if mirror { self.width - 1 - x } else { x };
                let sx = dx * image.width / self.width.max(1);
                self.pixels[y * self.width + x] = 0xFF00_0000 | image.pixels[sy * image.width + sx];
            }
        }
    }

    /// Lay an alpha-carrying layer of the same size over this canvas.
    pub fn composite(&mut self, layer: &Canvas) {
        for (dst, &src) in self.pixels.iter_mut().zip(&layer.pixels) {
            let a = alpha_of(src);
            if a >= 1.0 {
                *dst = src;
            } else if a > 0.0 {
                *dst = blend(*dst, src, a);
            }
        }
    }

    // ── text ───────────────────────────────────────────────────────────────

    /// Draw `text` in the 3×5 bitmap font, each font pixel `scale` screen
    /// pixels square.  Returns the x just past the last glyph.
    pub fn draw_label(&mut self, text: &str, x: i32, y: i32, scale: i32, color: u32) -> i32 {
        let scale = scale.max(1);
        let mut cx = x;
        for ch in text.chars() {
            for (row, bits) in glyph(ch).iter().enumerate() {
                for col in 0..3 {
                    if bits & (0b100 >> col) != 0 {
                        self.fill_rect(cx + col * scale, y + row as i32 * scale, scale, scale, color);
                    }
                }
            }
            cx += 4 * scale;
            if cx >= self.width as i32 { break; }
        }
        cx
    }
}

/// Width in pixels of `text` drawn by [`Canvas::draw_label`].
pub fn label_width(text: &str, scale: i32) -> i32 {
    text.chars().count() as i32 * 4 * scale.max(1)
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

/// Five rows of three bits, most significant bit on the left.
const FONT: &[(char, [u8; 5])] = &[
    ('0', [0b111, 0b101, 0b101, 0b101, 0b111]),
    ('1', [0b010, 0b110, 0b010, 0b010, 0b111]),
    ('2', [0b111, 0b001, 0b111, 0b100, 0b111]),
    ('3', [0b111, 0b001, 0b111, 0b001, 0b111]),
    ('4', [0b101, 0b101, 0b111, 0b001, 0b001]),
    ('5', [0b111, 0b100, 0b111, 0b001, 0b111]),
    ('6', [0b111, 0b100, 0b111, 0b101, 0b111]),
    ('7', [0b111, 0b001, 0b001, 0b001, 0b001]),
    ('8', [0b111, 0b101, 0b111, 0b101, 0b111]),
    ('9', [0b111, 0b101, 0b111, 0b001, 0b111]),
    ('A', [0b010, 0b101, 0b111, 0b101, 0b101]),
    ('B', [0b110, 0b101, 0b110, 0b101, 0b110]),
    ('C', [0b011, 0b100, 0b100, 0b100, 0b011]),
    ('D', [0b110, 0b101, 0b101, 0b101, 0b110]),
    ('E', [0b111, 0b100, 0b110, 0b100, 0b111]),
    ('F', [0b111, 0b100, 0b110, 0b100, 0b100]),
    ('G', [0b011, 0b100, 0b101, 0b101, 0b011]),
    ('H', [0b101, 0b101, 0b111, 0b101, 0b101]),
    ('I', [0b111, 0b010, 0b010, 0b010, 0b111]),
    ('J', [0b001, 0b001, 0b001, 0b101, 0b010]),
    ('K', [0b101, 0b101, 0b110, 0b101, 0b101]),
    ('L', [0b100, 0b100, 0b100, 0b100, 0b111]),
    ('M', [0b101, 0b111, 0b111, 0b101, 0b101]),
    ('N', [0b110, 0b101, 0b101, 0b101, 0b101]),
    ('O', [0b010, 0b101, 0b101, 0b101, 0b010]),
    ('P', [0b110, 0b101, 0b110, 0b100, 0b100]),
    ('Q', [0b010, 0b101, 0b101, 0b110, 0b011]),
    ('R', [0b110, 0b101, 0b110, 0b101, 0b101]),
    ('S', [0b011, 0b100, 0b010, 0b001, 0b110]),
    ('T', [0b111, 0b010, 0b010, 0b010, 0b010]),
    ('U', [0b101, 0b101, 0b101, 0b101, 0b111]),
    ('V', [0b101, 0b101, 0b101, 0b101, 0b010]),
    ('W', [0b101, 0b101, 0b111, 0b111, 0b101]),
    ('X', [0b101, 0b101, 0b010, 0b101, 0b101]),
    ('Y', [0b101, 0b101, 0b010, 0b010, 0b010]),
    ('Z', [0b111, 0b001, 0b010, 0b100, 0b111]),
    ('/', [0b001, 0b001, 0b010, 0b100, 0b100]),
    ('-', [0b000, 0b000, 0b111, 0b000, 0b000]),
    ('.', [0b000, 0b000, 0b000, 0b000, 0b010]),
    (',', [0b000, 0b000, 0b000, 0b010, 0b100]),
    (':', [0b000, 0b010, 0b000, 0b010, 0b000]),
    ('=', [0b000, 0b111, 0b000, 0b111, 0b000]),
    ('+', [0b000, 0b010, 0b111, 0b010, 0b000]),
    ('[', [0b110, 0b100, 0b100, 0b100, 0b110]),
    (']', [0b011, 0b001, 0b001, 0b001, 0b011]),
    ('(', [0b010, 0b100, 0b100, 0b100, 0b010]),
    (')', [0b010, 0b001, 0b001, 0b001, 0b010]),
    ('%', [0b101, 0b001, 0b010, 0b100, 0b101]),
    ('x', [0b000, 0b101, 0b010, 0b101, 0b000]),
    (' ', [0b000, 0b000, 0b000, 0b000, 0b000]),
];

fn glyph(c: char) -> [u8; 5] {
    let find = |c: char| FONT.iter().find(|(k, _)| *k == c).map(|(_, g)| *g);
    find(c)
        .or_else(|| find(c.to_ascii_uppercase()))
        .unwrap_or([0b000, 0b000, 0b010, 0b000, 0b000])
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_endpoints() {
        assert_eq!(blend(0xFF000000, 0xFFFFFFFF, 0.0), 0xFF000000);
        assert_eq!(blend(0xFF000000, 0xFFFFFFFF, 1.0), 0xFFFFFFFF);
        assert_eq!(blend(0xFF000000, 0xFF0000C8, 0.5), 0xFF000064);
    }

    #[test]
    fn out_of_bounds_writes_are_ignored() {
        let mut c = Canvas::new(4, 4, 0);
        c.set_pixel(-1, 0, 1);
        c.set_pixel(4, 0, 1);
        c.fill_rect(-10, -10, 100, 2, 7);
        assert!(c.pixels().iter().all(|&p| p == 0));
        c.fill_rect(2, 2, 100, 100, 7);
        assert_eq!(c.pixels().iter().filter(|&&p| p == 7).count(), 4);
    }

    #[test]
    fn disc_is_round_and_erase_clears_it() {
        let mut c = Canvas::new(21, 21, TRANSPARENT);
        c.fill_disc(10.5, 10.5, 5.0, 0xFFFF0000, 1.0);
        assert_eq!(c.pixel(10, 10), Some(0xFFFF0000));
        assert_eq!(c.pixel(10, 6), Some(0xFFFF0000));
        assert_eq!(c.pixel(6, 6), Some(TRANSPARENT));
        c.erase_disc(10.5, 10.5, 2.0);
        assert_eq!(c.pixel(10, 10), Some(TRANSPARENT));
        assert_eq!(c.pixel(10, 6), Some(0xFFFF0000));
    }

    #[test]
    fn stamped_line_has_no_gaps() {
        let mut c = Canvas::new(64, 16, TRANSPARENT);
        c.stamp_line((4.0, 8.0), (60.0, 8.0), 1.5, 0xFF00FF00);
        for x in 4..60 {
            assert_eq!(c.pixel(x, 7), Some(0xFF00FF00), "gap at x={x}");
        }
    }

    #[test]
    fn composite_respects_alpha() {
        let mut frame = Canvas::new(3, 1, 0xFF000000);
        let mut ink = Canvas::new(3, 1, TRANSPARENT);
        ink.set_pixel(0, 0, 0xFFFFFFFF);
        ink.set_pixel(1, 0, 0x80FFFFFF);
        frame.composite(&ink);
        assert_eq!(frame.pixel(0, 0), Some(0xFFFFFFFF));
        let mid = frame.pixel(1, 0).map(|p| p & 0xFF);
        assert!(matches!(mid, Some(v) if (120..=136).contains(&v)));
        assert_eq!(frame.pixel(2, 0), Some(0xFF000000));
    }

    #[test]
    fn arc_covers_requested_fraction() {
        let mut half = Canvas::new(41, 41, 0);
        half.draw_arc(20.5, 20.5, 15.0, 3.0, 0.5, 1);
        // Right side drawn, left side not.
        assert_eq!(half.pixel(35, 20), Some(1));
        assert_eq!(half.pixel(5, 20), Some(0));
    }

    #[test]
    fn blit_scales_and_mirrors() {
        let img = FrameImage { width: 2, height: 1, pixels: vec![0x111111, 0x222222] };
        let mut c = Canvas::new(4, 2, 0);
        c.blit_image(&img, false);
        assert_eq!(c.pixel(0, 1), Some(0xFF111111));
        assert_eq!(c.pixel(3, 0), Some(0xFF222222));
        c.blit_image(&img, true);
        assert_eq!(c.pixel(0, 0), Some(0xFF222222));
    }

    #[test]
    fn labels_advance_four_columns_per_glyph() {
        let mut c = Canvas::new(64, 8, 0);
        let end = c.draw_label("ab1", 0, 0, 1, 9);
        assert_eq!(end, label_width("ab1", 1));
        assert_eq!(glyph('a'), glyph('A'));
        assert_eq!(c.pixel(1, 0), Some(9)); // top of 'A'
    }
}
