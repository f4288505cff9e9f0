//! Software-rendered visualizer using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │ camera frame / background                      (dwell)    │
//! │                                                           │
//! │      ink strokes under the view transform                 │
//! │      dissolve particles                                   │
//! │                                                           │
//! │        ┌──── menu palette (menu mode only) ────┐          │
//! │        │  1  2  3  4  5  6                     │          │
//! │        │  2  6  12 24 ERASE        ◯ cursor    │          │
//! │        └───────────────────────────────────────┘          │
//! │ status bar                                                │
//! │ key legend                                                │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! Drawing is split from the window: [`render_scene`] paints into plain
//! [`Canvas`]es and is what the tests exercise; [`Visualizer`] owns the
//! window, polls input and presents the result.

use std::sync::mpsc::Sender;
use std::time::Duration;

use anyhow::{anyhow, Result};
use minifb::{Key, KeyRepeat, MouseMode, Window, WindowOptions};
use tracing::warn;

use hand_pose::{Point, Screen};
use ink_surface::path::for_each_line;
use ink_surface::{smooth_path, Stroke, Tool, ToolEvent, ViewTransform};

use crate::palette::{pen_colors, MenuPalette};
use crate::raster::{label_width, Canvas, TRANSPARENT};
use crate::session::{FrameImage, Mode, Session};
use crate::source::{SimInput, SimPose};

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

const BG_COLOR:      u32 = 0xFF1A1A2E;
const TEXT_BG:       u32 = 0xFF0F3460;
const MENU_SHADE:    u32 = 0xFF000000;
const PANEL_COLOR:   u32 = 0xFF16213E;
const CURSOR_COLOR:  u32 = 0xFFFFFFFF;
const DWELL_COLOR:   u32 = 0xFFFFD700;
const SELECT_COLOR:  u32 = 0xFFFFFFFF;
const LEGEND_COLOR:  u32 = 0xFF888888;
const STATUS_H:      i32 = 44;
const TEXT_SCALE:    i32 = 2;
/// Step length, in screen pixels, when flattening stroke curves.
const FLATTEN_STEP:  f32 = 2.0;

const LEGEND: &str =
    "SPACE=PINCH P=POINT V=PEACE O=PALM Z=ZOOM(WHEEL) 1-6=COLOR E=ERASER [ ]=WIDTH R=RESET Q=QUIT";

// ════════════════════════════════════════════════════════════════════════════
// Scene rendering
// ════════════════════════════════════════════════════════════════════════════

/// Everything one frame draws.
pub struct Scene<'a> {
    pub session:    &'a Session,
    pub palette:    &'a MenuPalette,
    pub status:     &'a str,
    pub background: Option<&'a FrameImage>,
}

/// Paint one frame.  `ink` is scratch space of the same size as `frame`.
pub fn render_scene(frame: &mut Canvas, ink: &mut Canvas, scene: &Scene<'_>) {
    let session = scene.session;
    let view    = session.view();

    // 1. Background
    match scene.background {
        Some(img) => frame.blit_image(img, session.projection().mirror),
        None      => frame.fill(BG_COLOR),
    }

    // 2. Ink: history in order, then the open stroke.
    ink.fill(TRANSPARENT);
    for stroke in session.strokes().iter().chain(session.current_stroke()) {
        draw_stroke(ink, stroke, view);
    }
    frame.composite(ink);

    // 3. Particles
    for p in session.particles() {
        let s = view.to_screen(p.pos);
        let r = (p.size * view.scale() * 0.5).max(0.5);
        frame.fill_disc(s.x, s.y, r, p.color, p.opacity());
    }

    // 4. Menu
    if session.mode() == Mode::Menu {
        draw_menu(frame, scene.palette, session);
    }

    // 5. Dwell ring
    draw_dwell(frame, session.dwell_progress());

    // 6. Status bar and legend
    draw_status(frame, session, scene.status);
}

fn draw_stroke(ink: &mut Canvas, stroke: &Stroke, view: &ViewTransform) {
    let pts: Vec<Point<Screen>> = stroke.points.iter().map(|&p| view.to_screen(p)).collect();
    let r     = (stroke.width * view.scale() * 0.5).max(0.5);
    let color = if stroke.eraser { TRANSPARENT } else { stroke.color };

    match pts.as_slice() {
        []  => {}
        [p] => ink.fill_disc(p.x, p.y, r, color, 1.0),
        _   => for_each_line(&smooth_path(&pts), FLATTEN_STEP, |a, b| {
            ink.stamp_line((a.x, a.y), (b.x, b.y), r, color);
        }),
    }
}

fn draw_menu(frame: &mut Canvas, palette: &MenuPalette, session: &Session) {
    let (w, h) = (frame.width() as f32, frame.height() as f32);
    frame.shade_rect(0, 0, w as i32, h as i32, MENU_SHADE, 0.45);

    // Panel around the swatches.
    let (mut x0, mut y0, mut x1, mut y1) = (1.0_f32, 1.0_f32, 0.0_f32, 0.0_f32);
    for s in palette.swatches() {
        x0 = x0.min(s.rect.x);
        y0 = y0.min(s.rect.y);
        x1 = x1.max(s.rect.x + s.rect.w);
        y1 = y1.max(s.rect.y + s.rect.h);
    }
    let pad = 0.02;
    let px = ((x0 - pad) * w) as i32;
    let py = ((y0 - pad) * h) as i32;
    frame.fill_rect(px, py, ((x1 - x0 + 2.0 * pad) * w) as i32, ((y1 - y0 + 2.0 * pad) * h) as i32, PANEL_COLOR);
    frame.draw_label("MENU - POINT AND HOLD TO PICK", px, py - 8 * TEXT_SCALE, TEXT_SCALE, CURSOR_COLOR);

    let tool = session.tool();
    for (i, s) in palette.swatches().iter().enumerate() {
        let (sx, sy) = ((s.rect.x * w) as i32, (s.rect.y * h) as i32);
        let (sw, sh) = ((s.rect.w * w) as i32, (s.rect.h * h) as i32);
        let fill = match s.event {
            ToolEvent::SelectColor(c) => c,
            _ => 0xFF2A2A4A,
        };
        frame.fill_rect(sx, sy, sw, sh, fill);
        if let ToolEvent::SelectWidth(width) = s.event {
            frame.fill_disc(sx as f32 + sw as f32 / 2.0, sy as f32 + sh as f32 / 2.0, width * 0.5, tool.color, 1.0);
        }
        let lw = label_width(&s.label, TEXT_SCALE);
        frame.draw_label(&s.label, sx + (sw - lw) / 2, sy + sh - 7 * TEXT_SCALE, TEXT_SCALE, 0xFF000000 | !fill);
        if s.is_selected(tool) {
            frame.draw_border(sx - 3, sy - 3, sw + 6, sh + 6, 3, SELECT_COLOR);
        }
        if palette.hovered() == Some(i) {
            let progress = palette.hover_progress();
            frame.fill_rect(sx, sy + sh + 4, (sw as f32 * progress) as i32, 4, DWELL_COLOR);
        }
    }

    if let Some(c) = session.cursor() {
        let (cx, cy) = (c.x * w, c.y * h);
        frame.draw_arc(cx, cy, 10.0, 3.0, 1.0, CURSOR_COLOR);
        frame.fill_disc(cx, cy, 2.5, CURSOR_COLOR, 1.0);
    }
}

fn draw_dwell(frame: &mut Canvas, progress: f32) {
    if progress <= 0.0 { return; }
    let cx = frame.width() as f32 - 40.0;
    frame.draw_arc(cx, 40.0, 22.0, 6.0, 1.0, 0xFF333333);
    frame.draw_arc(cx, 40.0, 22.0, 6.0, progress, DWELL_COLOR);
}

fn draw_status(frame: &mut Canvas, session: &Session, status: &str) {
    let (w, h) = (frame.width() as i32, frame.height() as i32);
    let top = h - STATUS_H;
    frame.fill_rect(0, top, w, STATUS_H, TEXT_BG);

    let tool = session.tool();
    let line = format!(
        "{}  {}  HANDS {}  ZOOM {:.2}x  WIDTH {:.0}{}  {}",
        session.mode().label(),
        session.active_gesture().label(),
        session.hands_seen(),
        session.view().scale(),
        tool.width,
        if tool.eraser { "  ERASER" } else { "" },
        status,
    );
    let x = 10 + 16 + 8;
    frame.fill_rect(10, top + 8, 16, 10, if tool.eraser { 0xFF444444 } else { tool.color });
    frame.draw_label(&line, x, top + 8, TEXT_SCALE, 0xFFEEEEEE);
    frame.draw_label(LEGEND, 10, top + 28, 1, LEGEND_COLOR);
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer — window + input
// ════════════════════════════════════════════════════════════════════════════

/// What the window asked for this iteration, besides simulated hands.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UiInput {
    pub quit:        bool,
    pub tool_events: Vec<ToolEvent>,
    pub reset_view:  bool,
}

pub struct Visualizer {
    window: Window,
    frame:  Canvas,
    ink:    Canvas,
    /// Present only in simulation mode.
    sim_tx: Option<Sender<SimInput>>,
    spread: f32,
}

impl Visualizer {
    pub fn new(width: usize, height: usize, sim_tx: Option<Sender<SimInput>>) -> Result<Self> {
        let mut window = Window::new(
            "Air Canvas",
            width, height,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| anyhow!("failed to open window: {e}"))?;

        window.limit_update_rate(Some(Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            frame:  Canvas::new(width, height, BG_COLOR),
            ink:    Canvas::new(width, height, TRANSPARENT),
            sim_tx,
            spread: 0.3,
        })
    }

    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Poll keyboard and mouse.  In simulation mode this also sends one
    /// [`SimInput::Sample`] for the simulated hand.
    pub fn poll_input(&mut self, tool: &Tool) -> UiInput {
        let mut ui = UiInput::default();
        if !self.window.is_open() {
            ui.quit = true;
            return ui;
        }

        let pressed = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);

        if pressed(Key::Q) || pressed(Key::Escape) {
            ui.quit = true;
        }
        let colors = pen_colors();
        let color_keys = [Key::Key1, Key::Key2, Key::Key3, Key::Key4, Key::Key5, Key::Key6];
        for (k, c) in color_keys.into_iter().zip(colors) {
            if pressed(k) { ui.tool_events.push(ToolEvent::SelectColor(c)); }
        }
        if pressed(Key::E) {
            ui.tool_events.push(ToolEvent::SetEraser(!tool.eraser));
        }
        if self.window.is_key_pressed(Key::LeftBracket, KeyRepeat::Yes) {
            ui.tool_events.push(ToolEvent::SelectWidth(tool.width - 2.0));
        }
        if self.window.is_key_pressed(Key::RightBracket, KeyRepeat::Yes) {
            ui.tool_events.push(ToolEvent::SelectWidth(tool.width + 2.0));
        }
        ui.reset_view = pressed(Key::R);

        if let Some(tx) = &self.sim_tx {
            if let Some((_, dy)) = self.window.get_scroll_wheel() {
                self.spread = (self.spread + dy * 0.01).clamp(0.05, 0.9);
            }
            let held = |k: Key| self.window.is_key_down(k);
            let pose = if held(Key::Z) {
                SimPose::Zoom
            } else if held(Key::Space) {
                SimPose::Pinch
            } else if held(Key::P) {
                SimPose::Point
            } else if held(Key::V) {
                SimPose::Peace
            } else if held(Key::O) {
                SimPose::OpenPalm
            } else {
                SimPose::Relaxed
            };
            if let Some((mx, my)) = self.window.get_mouse_pos(MouseMode::Clamp) {
                let x = mx / self.frame.width().max(1) as f32;
                let y = my / self.frame.height().max(1) as f32;
                let _ = tx.send(SimInput::Sample { x, y, pose, spread: self.spread });
            }
            if ui.quit {
                let _ = tx.send(SimInput::Quit);
            }
        }
        ui
    }

    /// Render one frame.
    pub fn render(&mut self, scene: &Scene<'_>) {
        render_scene(&mut self.frame, &mut self.ink, scene);
        if let Err(e) = self.window.update_with_buffer(self.frame.pixels(), self.frame.width(), self.frame.height()) {
            warn!("window update failed: {e}");
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
