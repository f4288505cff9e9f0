//! Mode controller — the per-frame pipeline and the canvas/menu state machine.
//!
//! [`Session`] owns every piece of mutable state (stabilizer buffer, view,
//! ink, particles, menu dwell) and exposes one entry point,
//! [`Session::process_frame`].  Each call runs to completion:
//!
//! ```text
//! FrameInput ─▶ hands ─▶ classify ─▶ stabilize ─▶ menu dwell ─▶ route
//!                                                               ├─ Menu:   cursor
//!                                                               └─ Canvas: zoom / ink / dissolve
//! ```
//!
//! ## Menu toggle
//!
//! Dwell progress rises while the active gesture is `OpenPalm` and falls at
//! the same rate otherwise.  When it reaches 1 the mode flips once, the
//! gesture buffer is cleared, a cooldown starts and the toggle disarms.  It
//! re-arms only after the cooldown has elapsed *and* the palm has been
//! dropped, so holding the palm indefinitely toggles exactly once.

use serde::Deserialize;
use tracing::{debug, info};

use hand_pose::{
    ClassifierConfig, Gesture, GestureStabilizer, Hand, Landmark, Normalized, Point,
    PoseClassifier, Screen, StabilizerConfig,
};
use ink_surface::{
    InkConfig, InkEngine, Particle, ParticleConfig, ParticleField, Stroke, Tool, ToolEvent,
    ViewConfig, ViewTransform,
};

// ════════════════════════════════════════════════════════════════════════════
// Frame input
// ════════════════════════════════════════════════════════════════════════════

/// Camera image delivered alongside the landmarks, packed `0x00RRGGBB`.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameImage {
    pub width:  usize,
    pub height: usize,
    pub pixels: Vec<u32>,
}

/// One detector result.  Hands are in detector order; the first is primary.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameInput {
    pub hands: Vec<Vec<Landmark>>,
    pub image: Option<FrameImage>,
}

impl FrameInput {
    pub fn from_hands(hands: &[Hand]) -> Self {
        FrameInput {
            hands: hands.iter().map(|h| h.landmarks().to_vec()).collect(),
            image: None,
        }
    }
}

/// Validate the raw landmark lists.  A degenerate primary hand empties the
/// frame; a degenerate secondary is dropped.  At most two hands are kept.
fn valid_hands(raw: &[Vec<Landmark>]) -> Vec<Hand> {
    let mut lists = raw.iter();
    let Some(first) = lists.next() else { return Vec::new() };
    let Some(primary) = Hand::from_slice(first) else {
        debug!("primary hand has {} landmarks, ignoring frame", first.len());
        return Vec::new();
    };
    let mut hands = vec![primary];
    hands.extend(lists.next().and_then(|l| Hand::from_slice(l)));
    hands
}

// ════════════════════════════════════════════════════════════════════════════
// Config
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ModeConfig {
    /// Seconds of continuous open palm to toggle the menu.
    pub dwell_secs:       f32,
    /// Seconds after a toggle before another can start.
    pub cooldown_secs:    f32,
    /// Exponential smoothing factor for the menu cursor.
    pub cursor_smoothing: f32,
}

impl Default for ModeConfig {
    fn default() -> Self {
        ModeConfig {
            dwell_secs:       1.0,
            cooldown_secs:    1.0,
            cursor_smoothing: 0.3,
        }
    }
}

/// Everything the session needs; deserializable from a partial JSON file.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub classifier:    ClassifierConfig,
    pub stabilizer:    StabilizerConfig,
    pub view:          ViewConfig,
    pub ink:           InkConfig,
    pub particles:     ParticleConfig,
    pub mode:          ModeConfig,
    pub screen_width:  usize,
    pub screen_height: usize,
    /// Flip x so a front camera behaves like a mirror.
    pub mirror:        bool,
    /// Fixed particle seed; OS-seeded when absent.
    pub seed:          Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            classifier:    ClassifierConfig::default(),
            stabilizer:    StabilizerConfig::default(),
            view:          ViewConfig::default(),
            ink:           InkConfig::default(),
            particles:     ParticleConfig::default(),
            mode:          ModeConfig::default(),
            screen_width:  1280,
            screen_height: 720,
            mirror:        true,
            seed:          None,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Projection — normalized detector space → screen
// ════════════════════════════════════════════════════════════════════════════

/// The only way from detector coordinates to screen coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    pub width:  f32,
    pub height: f32,
    pub mirror: bool,
}

impl Projection {
    /// Detector point as a fraction of the screen, mirror applied.
    pub fn to_unit(&self, p: Point<Normalized>) -> Point<Normalized> {
        let x = if self.mirror { 1.0 - p.x } else { p.x };
        Point::new(x, p.y)
    }

    pub fn to_screen(&self, p: Point<Normalized>) -> Point<Screen> {
        let u = self.to_unit(p);
        Point::new(u.x * self.width, u.y * self.height)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Mode / MenuState
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Canvas,
    Menu,
}

impl Mode {
    pub fn label(self) -> &'static str {
        match self {
            Mode::Canvas => "CANVAS",
            Mode::Menu   => "MENU",
        }
    }
}

/// Open/closed flag plus the dwell machinery guarding the toggle.
#[derive(Clone, Debug, PartialEq)]
pub struct MenuState {
    pub open:     bool,
    /// 0.0–1.0 toward the next toggle.
    pub progress: f32,
    cooldown:     f32,
    armed:        bool,
}

impl Default for MenuState {
    fn default() -> Self {
        MenuState { open: false, progress: 0.0, cooldown: 0.0, armed: true }
    }
}

impl MenuState {
    pub fn mode(&self) -> Mode {
        if self.open { Mode::Menu } else { Mode::Canvas }
    }

    /// Advance the dwell by `dt` seconds.  Returns true on the frame the menu
    /// toggles.
    pub fn update(&mut self, active: Gesture, dt: f32, cfg: &ModeConfig) -> bool {
        let dt   = dt.max(0.0);
        let palm = active == Gesture::OpenPalm;
        self.cooldown = (self.cooldown - dt).max(0.0);

        if !self.armed {
            self.progress = 0.0;
            if !palm && self.cooldown <= 0.0 {
                self.armed = true;
            }
            return false;
        }

        let rate = dt / cfg.dwell_secs.max(f32::EPSILON);
        let next = if palm { self.progress + rate } else { self.progress - rate };
        self.progress = next.clamp(0.0, 1.0);

        if self.progress >= 1.0 {
            self.open     = !self.open;
            self.progress = 0.0;
            self.cooldown = cfg.cooldown_secs;
            self.armed    = false;
            return true;
        }
        false
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Session
// ════════════════════════════════════════════════════════════════════════════

/// What happened during one [`Session::process_frame`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameReport {
    pub raw:       Gesture,
    pub active:    Gesture,
    /// New mode when the menu toggled this frame.
    pub toggled:   Option<Mode>,
    /// Particles spawned by a dissolve this frame.
    pub dissolved: usize,
}

pub struct Session {
    config:     SessionConfig,
    projection: Projection,
    classifier: PoseClassifier,
    stabilizer: GestureStabilizer,
    menu:       MenuState,
    view:       ViewTransform,
    ink:        InkEngine,
    particles:  ParticleField,
    cursor:     Option<Point<Normalized>>,
    raw:        Gesture,
    hands_seen: usize,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Session {
            projection: Projection {
                width:  config.screen_width as f32,
                height: config.screen_height as f32,
                mirror: config.mirror,
            },
            classifier: PoseClassifier::new(config.classifier.clone()),
            stabilizer: GestureStabilizer::new(&config.stabilizer),
            menu:       MenuState::default(),
            view:       ViewTransform::new(config.view.clone()),
            ink:        InkEngine::new(config.ink.clone()),
            particles:  ParticleField::new(config.particles.clone(), config.seed),
            cursor:     None,
            raw:        Gesture::None,
            hands_seen: 0,
            config,
        }
    }

    // ── per-frame entry point ─────────────────────────────────────────────

    /// Run one detector frame through the whole pipeline.  `dt` is the time
    /// since the previous frame in seconds.
    pub fn process_frame(&mut self, frame: &FrameInput, dt: f32) -> FrameReport {
        let hands = valid_hands(&frame.hands);
        self.hands_seen = hands.len();

        let prev   = self.stabilizer.active();
        let raw    = self.classifier.classify(&hands, self.stabilizer.pinch_active());
        let active = self.stabilizer.push(raw);
        self.raw   = raw;

        let mut report = FrameReport { raw, active, ..FrameReport::default() };

        if self.menu.update(active, dt, &self.config.mode) {
            self.stabilizer.clear_history();
            self.ink.seal();
            self.view.end_zoom();
            self.cursor = None;
            let mode = self.menu.mode();
            info!("menu toggled → {}", mode.label());
            report.toggled = Some(mode);
        }

        match self.menu.mode() {
            Mode::Menu   => self.menu_frame(active, &hands),
            Mode::Canvas => report.dissolved = self.canvas_frame(prev, active, &hands),
        }
        report
    }

    fn menu_frame(&mut self, active: Gesture, hands: &[Hand]) {
        self.ink.seal();
        self.view.end_zoom();

        if active != Gesture::Pointing {
            self.cursor = None;
            return;
        }
        let Some(hand) = hands.first() else { return };
        let target = self.projection.to_unit(hand.index_tip());
        let k = self.config.mode.cursor_smoothing;
        self.cursor = Some(match self.cursor {
            Some(c) => c.lerp(target, k),
            None    => target,
        });
    }

    /// Returns the number of particles spawned.
    fn canvas_frame(&mut self, prev: Gesture, active: Gesture, hands: &[Hand]) -> usize {
        self.cursor = None;

        if active == Gesture::TwoFingerZoom {
            self.ink.cancel();
            if let [a, b, ..] = hands {
                let pa = self.projection.to_screen(a.index_tip());
                let pb = self.projection.to_screen(b.index_tip());
                self.view.apply_zoom(pa, pb);
            }
            return 0;
        }
        self.view.end_zoom();

        let target = hands
            .first()
            .map(|h| self.view.to_world(self.projection.to_screen(h.index_tip())));
        self.ink.update(active, target);

        let entered_clear = active == Gesture::PeaceClear && prev != Gesture::PeaceClear;
        if entered_clear && !self.ink.history().is_empty() {
            return self.ink.dissolve(&mut self.particles);
        }
        0
    }

    // ── simulation / external input ───────────────────────────────────────

    /// Advance the particle simulation one step.  Called once per rendered
    /// frame, after drawing.
    pub fn tick(&mut self) {
        self.particles.step();
    }

    /// Tool selection; affects strokes started afterwards.
    pub fn apply_tool(&mut self, event: ToolEvent) {
        self.ink.apply_tool(event);
    }

    pub fn reset_view(&mut self) {
        self.view.reset();
    }

    // ── output boundary ───────────────────────────────────────────────────

    pub fn mode(&self) -> Mode { self.menu.mode() }
    pub fn active_gesture(&self) -> Gesture { self.stabilizer.active() }
    pub fn raw_gesture(&self) -> Gesture { self.raw }
    /// Menu cursor as a fraction of the screen; only while pointing in the menu.
    pub fn cursor(&self) -> Option<Point<Normalized>> { self.cursor }
    pub fn dwell_progress(&self) -> f32 { self.menu.progress }
    pub fn hands_seen(&self) -> usize { self.hands_seen }
    pub fn strokes(&self) -> &[Stroke] { self.ink.history() }
    pub fn current_stroke(&self) -> Option<&Stroke> { self.ink.current() }
    pub fn particles(&self) -> &[Particle] { self.particles.particles() }
    pub fn view(&self) -> &ViewTransform { &self.view }
    pub fn tool(&self) -> &Tool { self.ink.tool() }
    pub fn projection(&self) -> &Projection { &self.projection }
    pub fn config(&self) -> &SessionConfig { &self.config }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use hand_pose::synth;

    const DT: f32 = 1.0 / 30.0;

    fn session() -> Session {
        Session::new(SessionConfig { seed: Some(11), mirror: false, ..SessionConfig::default() })
    }

    fn feed(s: &mut Session, hands: &[Hand], frames: usize) -> Vec<FrameReport> {
        let frame = FrameInput::from_hands(hands);
        (0..frames).map(|_| s.process_frame(&frame, DT)).collect()
    }

    fn toggles(reports: &[FrameReport]) -> Vec<Mode> {
        reports.iter().filter_map(|r| r.toggled).collect()
    }

    /// Draw a horizontal stroke by pinching and sliding right, then open the
    /// pinch in place so the index tip does not jump while the release is
    /// being debounced.
    fn draw_stroke(s: &mut Session, y: f32) {
        let mut x = 0.3;
        for _ in 0..40 {
            feed(s, &[synth::pinch(x, y, 0.02)], 1);
            x += 0.01;
        }
        feed(s, &[synth::pinch(x, y, 0.09)], 8);
    }

    #[test]
    fn empty_and_degenerate_frames_are_none() {
        let mut s = session();
        let r = s.process_frame(&FrameInput::default(), DT);
        assert_eq!(r.raw, Gesture::None);

        let short = FrameInput { hands: vec![vec![Landmark::default(); 12]], image: None };
        assert_eq!(s.process_frame(&short, DT).raw, Gesture::None);
        assert_eq!(s.hands_seen(), 0);
    }

    #[test]
    fn degenerate_secondary_hand_is_dropped() {
        let mut s = session();
        let mut frame = FrameInput::from_hands(&[synth::open_palm(0.5, 0.5)]);
        frame.hands.push(vec![Landmark::default(); 3]);
        assert_eq!(s.process_frame(&frame, DT).raw, Gesture::OpenPalm);
        assert_eq!(s.hands_seen(), 1);
    }

    #[test]
    fn palm_held_three_dwells_toggles_once() {
        let mut s = session();
        let reports = feed(&mut s, &[synth::open_palm(0.5, 0.5)], 3 * 30 + 10);
        assert_eq!(toggles(&reports), vec![Mode::Menu]);
        assert_eq!(s.mode(), Mode::Menu);
    }

    #[test]
    fn palm_must_be_dropped_and_cooldown_pass_before_next_toggle() {
        let mut s = session();
        feed(&mut s, &[synth::open_palm(0.5, 0.5)], 45);
        assert_eq!(s.mode(), Mode::Menu);

        // Drop the palm only briefly: still inside the cooldown.
        feed(&mut s, &[synth::fist(0.5, 0.5)], 6);
        let quick = feed(&mut s, &[synth::open_palm(0.5, 0.5)], 20);
        assert!(toggles(&quick).is_empty());

        // A proper release, then a full dwell, closes the menu.
        feed(&mut s, &[synth::fist(0.5, 0.5)], 40);
        let again = feed(&mut s, &[synth::open_palm(0.5, 0.5)], 45);
        assert_eq!(toggles(&again), vec![Mode::Canvas]);
    }

    #[test]
    fn short_palm_flash_does_not_toggle() {
        let mut s = session();
        for _ in 0..5 {
            feed(&mut s, &[synth::open_palm(0.5, 0.5)], 12);
            feed(&mut s, &[synth::fist(0.5, 0.5)], 12);
        }
        assert_eq!(s.mode(), Mode::Canvas);
    }

    #[test]
    fn pinch_draws_and_release_seals() {
        let mut s = session();
        draw_stroke(&mut s, 0.5);
        assert_eq!(s.strokes().len(), 1);
        assert!(s.strokes()[0].is_line());
        assert!(s.current_stroke().is_none());
    }

    #[test]
    fn stroke_points_are_world_space() {
        let mut s = session();
        draw_stroke(&mut s, 0.5);
        let ys: Vec<f32> = s.strokes()[0].points.iter().map(|p| p.y).collect();
        // Index tip sits 0.115 above the palm centre; screen height 720.
        let expected = (0.5 - 0.115) * 720.0;
        assert!(ys.iter().all(|y| (y - expected).abs() < 1.0));
    }

    #[test]
    fn pinch_hysteresis_keeps_drawing_in_band() {
        let mut s = session();
        feed(&mut s, &[synth::pinch(0.5, 0.5, 0.02)], 6);
        assert_eq!(s.active_gesture(), Gesture::PinchDraw);
        // Fingers drift to 0.055 apart: above entry, below exit.
        let reports = feed(&mut s, &[synth::pinch(0.5, 0.5, 0.055)], 10);
        assert!(reports.iter().all(|r| r.active == Gesture::PinchDraw));
        assert!(s.current_stroke().is_some());
        // Past the exit threshold the pinch ends.
        feed(&mut s, &[synth::pinch(0.5, 0.5, 0.09)], 6);
        assert_eq!(s.active_gesture(), Gesture::Pointing);
        assert!(s.current_stroke().is_none());
    }

    #[test]
    fn peace_dissolves_once_on_entry() {
        let mut s = session();
        draw_stroke(&mut s, 0.4);
        draw_stroke(&mut s, 0.6);
        let points: usize = s.strokes().iter().map(|st| (st.points.len() + 2) / 3).sum();

        let reports = feed(&mut s, &[synth::peace(0.5, 0.5)], 20);
        let dissolved: Vec<usize> = reports.iter().map(|r| r.dissolved).filter(|&n| n > 0).collect();
        assert_eq!(dissolved, vec![points]);
        assert!(s.strokes().is_empty());
        assert_eq!(s.particles().len(), points);
    }

    #[test]
    fn peace_with_empty_history_spawns_nothing() {
        let mut s = session();
        let reports = feed(&mut s, &[synth::peace(0.5, 0.5)], 10);
        assert!(reports.iter().all(|r| r.dissolved == 0));
        assert!(s.particles().is_empty());
    }

    #[test]
    fn particles_drain_after_dissolve() {
        let mut s = session();
        draw_stroke(&mut s, 0.5);
        feed(&mut s, &[synth::peace(0.5, 0.5)], 6);
        assert!(!s.particles().is_empty());
        for _ in 0..64 { s.tick(); }
        assert!(s.particles().is_empty());
    }

    #[test]
    fn two_hand_zoom_scales_and_cancels_stroke() {
        let mut s = session();
        feed(&mut s, &[synth::pinch(0.5, 0.5, 0.02)], 8);
        assert!(s.current_stroke().is_some());

        feed(&mut s, &synth::zoom_pair(0.5, 0.5, 0.3), 4);
        assert_eq!(s.active_gesture(), Gesture::TwoFingerZoom);
        assert!(s.current_stroke().is_none());
        assert!(s.strokes().is_empty());

        feed(&mut s, &synth::zoom_pair(0.5, 0.5, 0.6), 1);
        assert!((s.view().scale() - 2.0).abs() < 1e-3);

        // Leaving zoom clears the baseline.
        feed(&mut s, &[synth::fist(0.5, 0.5)], 6);
        assert!(!s.view().is_zooming());
    }

    #[test]
    fn menu_cursor_follows_pointing_only() {
        let mut s = session();
        feed(&mut s, &[synth::open_palm(0.5, 0.5)], 40);
        assert_eq!(s.mode(), Mode::Menu);

        feed(&mut s, &[synth::pointing(0.3, 0.4)], 6);
        let c = s.cursor().expect("cursor while pointing");
        let tip = synth::pointing(0.3, 0.4).index_tip();
        assert!((c.x - tip.x).abs() < 1e-4 && (c.y - tip.y).abs() < 1e-4);

        // Smoothing: a jump moves the cursor 30% of the way.
        feed(&mut s, &[synth::pointing(0.7, 0.4)], 1);
        let moved = s.cursor().expect("cursor");
        assert!((moved.x - (tip.x + 0.4 * 0.3)).abs() < 1e-4);

        feed(&mut s, &[synth::fist(0.5, 0.5)], 6);
        assert!(s.cursor().is_none());
    }

    #[test]
    fn menu_disables_drawing() {
        let mut s = session();
        feed(&mut s, &[synth::open_palm(0.5, 0.5)], 40);
        feed(&mut s, &[synth::pinch(0.5, 0.5, 0.02)], 20);
        assert!(s.current_stroke().is_none());
        assert!(s.strokes().is_empty());
    }

    #[test]
    fn canvas_cursor_always_hidden() {
        let mut s = session();
        feed(&mut s, &[synth::pointing(0.5, 0.5)], 10);
        assert_eq!(s.active_gesture(), Gesture::Pointing);
        assert!(s.cursor().is_none());
        assert!(s.current_stroke().is_none());
    }

    #[test]
    fn tool_change_mid_stroke_applies_to_next() {
        let mut s = session();
        feed(&mut s, &[synth::pinch(0.4, 0.5, 0.02)], 6);
        s.apply_tool(ToolEvent::SelectColor(0xFF123456));
        draw_stroke(&mut s, 0.5);
        assert_eq!(s.strokes()[0].color, Tool::default().color);
        draw_stroke(&mut s, 0.6);
        assert_eq!(s.strokes()[1].color, 0xFF123456);
    }

    #[test]
    fn mirror_flips_x() {
        let p = Projection { width: 100.0, height: 50.0, mirror: true };
        let s = p.to_screen(Point::new(0.25, 0.5));
        assert!((s.x - 75.0).abs() < 1e-4 && (s.y - 25.0).abs() < 1e-4);
    }

    #[test]
    fn dwell_decays_when_palm_dropped() {
        let cfg = ModeConfig::default();
        let mut m = MenuState::default();
        for _ in 0..15 { m.update(Gesture::OpenPalm, DT, &cfg); }
        let half = m.progress;
        assert!(half > 0.4 && half < 0.6);
        for _ in 0..5 { m.update(Gesture::None, DT, &cfg); }
        assert!(m.progress < half);
        assert!(!m.open);
    }
}
