//! Top-level application loop.
//!
//! `AppState` owns the [`Session`], the menu palette and the status line.
//! It consumes [`SourceEvent`]s and window input and hands a [`Scene`] to
//! the visualizer each frame.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::Instant;

use anyhow::Result;
use tracing::{info, warn};

use ink_surface::ToolEvent;

use crate::config::{AppConfig, SourceChoice};
use crate::palette::MenuPalette;
use crate::session::{FrameImage, Mode, Session, SessionConfig};
use crate::source::{
    launch_detector, spawn_landmark_source, stdin_source, DetectorHandle, SimLandmarkSource, SourceEvent,
};
use crate::visualizer::{Scene, UiInput, Visualizer};

/// Longest gap credited to the dwell timers; a stalled detector must not
/// complete a toggle in one frame.
const MAX_FRAME_DT: f32 = 0.25;

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    session:    Session,
    palette:    MenuPalette,
    background: Option<FrameImage>,
    pub status: String,
}

impl AppState {
    pub fn new(cfg: SessionConfig) -> Self {
        AppState {
            session:    Session::new(cfg),
            palette:    MenuPalette::default(),
            background: None,
            status:     "Ready - pinch to draw, hold an open palm for the menu".to_string(),
        }
    }

    // ── process one SourceEvent ──────────────────────────────────────────

    /// Returns false once the source has closed.
    pub fn handle_event(&mut self, event: SourceEvent, dt: f32) -> bool {
        match event {
            SourceEvent::Frame(mut frame) => {
                if let Some(img) = frame.image.take() {
                    self.background = Some(img);
                }
                let dt = dt.clamp(0.0, MAX_FRAME_DT);
                let report = self.session.process_frame(&frame, dt);

                match report.toggled {
                    Some(Mode::Menu)   => self.status = "Menu - point at a swatch and hold".to_string(),
                    Some(Mode::Canvas) => self.status = "Canvas".to_string(),
                    None => {}
                }
                if report.dissolved > 0 {
                    self.status = format!("Dissolved into {} particles", report.dissolved);
                }

                if self.session.mode() == Mode::Menu {
                    if let Some(ev) = self.palette.update(self.session.cursor(), dt) {
                        self.apply_tool(ev);
                    }
                } else {
                    self.palette.reset();
                }
            }
            SourceEvent::Status(msg) => self.status = msg,
            SourceEvent::Closed => {
                info!("landmark source closed");
                self.status = "Landmark source closed".to_string();
                return false;
            }
        }
        true
    }

    pub fn handle_ui(&mut self, ui: &UiInput) {
        for &ev in &ui.tool_events {
            self.apply_tool(ev);
        }
        if ui.reset_view {
            self.session.reset_view();
            self.status = "View reset".to_string();
        }
    }

    fn apply_tool(&mut self, ev: ToolEvent) {
        self.session.apply_tool(ev);
        self.status = match ev {
            ToolEvent::SelectColor(c)  => format!("Color {:06X}", c & 0x00FF_FFFF),
            ToolEvent::SelectWidth(_)  => format!("Width {:.0}", self.session.tool().width),
            ToolEvent::SetEraser(true) => "Eraser on".to_string(),
            ToolEvent::SetEraser(false) => "Eraser off".to_string(),
        };
    }

    // ── Per-frame tick ────────────────────────────────────────────────────

    /// Called once per rendered frame, after drawing.
    pub fn tick(&mut self) {
        self.session.tick();
    }

    // ── Accessors for the render loop ─────────────────────────────────────

    pub fn session(&self) -> &Session { &self.session }
    pub fn palette(&self) -> &MenuPalette { &self.palette }

    pub fn scene(&self) -> Scene<'_> {
        Scene {
            session:    &self.session,
            palette:    &self.palette,
            status:     &self.status,
            background: self.background.as_ref(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// Starts the landmark source, opens the window and drives the
/// event/render loop at ~60 fps.  A detector that fails to start, or never
/// signals ready, is reported in the status bar; the window still opens,
/// with no gesture input.
pub fn run(cfg: AppConfig) -> Result<()> {
    let mut app = AppState::new(cfg.session.clone());

    // Kept alive for the whole loop; dropping it stops the detector.
    let mut _detector: Option<DetectorHandle> = None;
    let mut sim_tx = None;

    let mut events: Option<Receiver<SourceEvent>> = match &cfg.source {
        SourceChoice::Sim => {
            let (tx, rx) = mpsc::channel();
            sim_tx = Some(tx);
            Some(spawn_landmark_source(SimLandmarkSource { rx, mirror: cfg.session.mirror }))
        }
        SourceChoice::Stdin => Some(spawn_landmark_source(stdin_source(cfg.min_confidence))),
        SourceChoice::Detector(cmd) => match launch_detector(cmd, cfg.min_confidence) {
            Ok((handle, source)) => {
                _detector = Some(handle);
                app.status = "Waiting for detector...".to_string();
                Some(spawn_landmark_source(source))
            }
            Err(e) => {
                warn!("detector unavailable: {e:#}");
                app.status = format!("Detector unavailable: {e}");
                None
            }
        },
    };

    let mut vis = Visualizer::new(cfg.session.screen_width, cfg.session.screen_height, sim_tx)?;
    let mut last_frame = Instant::now();

    while vis.is_open() {
        // 1. Window input
        let ui = vis.poll_input(app.session().tool());
        if ui.quit { break; }
        app.handle_ui(&ui);

        // 2. Drain landmark frames
        if let Some(rx) = &events {
            let mut open = true;
            loop {
                match rx.try_recv() {
                    Ok(ev) => {
                        let now = Instant::now();
                        let dt  = now.duration_since(last_frame).as_secs_f32();
                        if matches!(ev, SourceEvent::Frame(_)) { last_frame = now; }
                        open &= app.handle_event(ev, dt);
                    }
                    Err(TryRecvError::Empty)        => break,
                    Err(TryRecvError::Disconnected) => { open = false; break; }
                }
            }
            if !open { events = None; }
        }

        // 3. Render, then advance the particles
        vis.render(&app.scene());
        app.tick();
    }

    info!("window closed");
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::pen_colors;
    use crate::session::FrameInput;
    use crate::source::{sim_hands, SimPose};
    use hand_pose::synth;

    const DT: f32 = 1.0 / 30.0;

    fn make_app() -> AppState {
        AppState::new(SessionConfig { mirror: false, seed: Some(5), ..SessionConfig::default() })
    }

    fn frames(app: &mut AppState, hands: &[hand_pose::Hand], n: usize) {
        for _ in 0..n {
            app.handle_event(SourceEvent::Frame(FrameInput::from_hands(hands)), DT);
        }
    }

    #[test]
    fn pointing_at_a_swatch_selects_it() {
        let mut app = make_app();
        frames(&mut app, &[synth::open_palm(0.5, 0.5)], 40);
        assert_eq!(app.session().mode(), Mode::Menu);

        let rect = app.palette().swatches()[0].rect;
        let hands = sim_hands(rect.x + rect.w / 2.0, rect.y + rect.h / 2.0, SimPose::Point, 0.0, false);
        frames(&mut app, &hands, 40);

        assert_eq!(app.session().tool().color, pen_colors()[0]);
        assert!(app.status.starts_with("Color"));
    }

    #[test]
    fn canvas_mode_ignores_palette() {
        let mut app = make_app();
        let rect = app.palette().swatches()[0].rect;
        let hands = sim_hands(rect.x + rect.w / 2.0, rect.y + rect.h / 2.0, SimPose::Point, 0.0, false);
        let before = *app.session().tool();
        frames(&mut app, &hands, 60);
        assert_eq!(*app.session().tool(), before);
        assert_eq!(app.palette().hovered(), None);
    }

    #[test]
    fn status_and_close_events() {
        let mut app = make_app();
        assert!(app.handle_event(SourceEvent::Status("detector: camera lost".into()), DT));
        assert_eq!(app.status, "detector: camera lost");
        assert!(!app.handle_event(SourceEvent::Closed, DT));
    }

    #[test]
    fn frame_image_becomes_background() {
        let mut app = make_app();
        let img = FrameImage { width: 2, height: 2, pixels: vec![0; 4] };
        let frame = FrameInput { hands: Vec::new(), image: Some(img.clone()) };
        app.handle_event(SourceEvent::Frame(frame), DT);
        assert_eq!(app.scene().background, Some(&img));
        // Later frames without an image keep the last one.
        app.handle_event(SourceEvent::Frame(FrameInput::default()), DT);
        assert_eq!(app.scene().background, Some(&img));
    }

    #[test]
    fn long_stall_is_clamped() {
        let mut app = make_app();
        // Fill the gesture buffer first so the palm is active.
        frames(&mut app, &[synth::open_palm(0.5, 0.5)], 4);
        let palm = SourceEvent::Frame(FrameInput::from_hands(&[synth::open_palm(0.5, 0.5)]));
        app.handle_event(palm, 10.0);
        assert_eq!(app.session().mode(), Mode::Canvas);
        assert!(app.session().dwell_progress() <= MAX_FRAME_DT + 4.0 * DT + 1e-4);
    }

    #[test]
    fn ui_events_reach_the_tool_and_view() {
        let mut app = make_app();
        app.handle_ui(&UiInput {
            quit:        false,
            tool_events: vec![ToolEvent::SelectWidth(20.0), ToolEvent::SetEraser(true)],
            reset_view:  false,
        });
        assert_eq!(app.session().tool().width, 20.0);
        assert!(app.session().tool().eraser);
        assert_eq!(app.status, "Eraser on");

        app.handle_ui(&UiInput { reset_view: true, ..UiInput::default() });
        assert_eq!(app.session().view().scale(), 1.0);
        assert_eq!(app.status, "View reset");
    }

    #[test]
    fn dissolve_is_reported() {
        let mut app = make_app();
        let mut x = 0.3;
        for _ in 0..30 {
            frames(&mut app, &[synth::pinch(x, 0.6, 0.02)], 1);
            x += 0.01;
        }
        frames(&mut app, &[synth::pinch(x, 0.6, 0.09)], 6);
        frames(&mut app, &[synth::peace(0.5, 0.6)], 6);
        assert!(app.status.starts_with("Dissolved into"));
        assert!(app.session().strokes().is_empty());
        assert!(!app.session().particles().is_empty());
    }
}
