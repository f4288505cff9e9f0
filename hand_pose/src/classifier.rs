//! Pose classifier — one raw [`Gesture`] per frame.
//!
//! Classification is an ordered rule list.  Rules are tried top to bottom and
//! the first match wins, so order is part of the contract:
//!
//! 1. two hands, both index fingers extended → `TwoFingerZoom`
//! 2. thumb + all four fingers extended, thumb clear of index → `OpenPalm`
//! 3. index + middle extended, ring + pinky folded → `PeaceClear`
//! 4. only index extended, thumb clear of index → `Pointing`
//! 5. thumb tip on index tip → `PinchDraw`
//!
//! An open palm also has index + middle extended; it beats the peace sign
//! only because rule 2 runs first.
//!
//! The pinch threshold is hysteretic: the caller reports whether a pinch is
//! currently active and the classifier uses the looser exit threshold while it
//! is.  The pointing rule keeps its thumb clearance at least that wide so a
//! held pinch drifting inside the band never flips to pointing.

use serde::Deserialize;

use crate::geometry::{is_finger_extended, is_finger_folded, is_thumb_extended};
use crate::landmark::{Finger, Hand};

// ════════════════════════════════════════════════════════════════════════════
// Gesture
// ════════════════════════════════════════════════════════════════════════════

/// Discrete gesture vocabulary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Gesture {
    #[default]
    None,
    PinchDraw,
    OpenPalm,
    Pointing,
    PeaceClear,
    TwoFingerZoom,
}

impl Gesture {
    pub const ALL: [Gesture; 6] = [
        Gesture::None,
        Gesture::PinchDraw,
        Gesture::OpenPalm,
        Gesture::Pointing,
        Gesture::PeaceClear,
        Gesture::TwoFingerZoom,
    ];

    /// Dense index into [`Gesture::ALL`], used for vote counting.
    pub fn ordinal(self) -> usize {
        match self {
            Gesture::None          => 0,
            Gesture::PinchDraw     => 1,
            Gesture::OpenPalm      => 2,
            Gesture::Pointing      => 3,
            Gesture::PeaceClear    => 4,
            Gesture::TwoFingerZoom => 5,
        }
    }

    /// Short label for status display.
    pub fn label(self) -> &'static str {
        match self {
            Gesture::None          => "none",
            Gesture::PinchDraw     => "pinch draw",
            Gesture::OpenPalm      => "open palm",
            Gesture::Pointing      => "pointing",
            Gesture::PeaceClear    => "peace clear",
            Gesture::TwoFingerZoom => "two finger zoom",
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ClassifierConfig
// ════════════════════════════════════════════════════════════════════════════

/// Thresholds in normalized landmark units.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Wrist→tip must exceed wrist→pip by this factor for "extended".
    pub extension_margin:   f32,
    /// Tip within this distance of its mcp counts as folded.
    pub fold_proximity:     f32,
    /// Minimum thumb–index distance for an open palm.
    pub palm_clearance:     f32,
    /// Minimum thumb–index distance for pointing.
    pub pointing_clearance: f32,
    /// Pinch starts below this distance.
    pub pinch_enter:        f32,
    /// An active pinch ends above this distance.
    pub pinch_exit:         f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        ClassifierConfig {
            extension_margin:   1.1,
            fold_proximity:     0.05,
            palm_clearance:     0.1,
            pointing_clearance: 0.05,
            pinch_enter:        0.035,
            pinch_exit:         0.065,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Rules
// ════════════════════════════════════════════════════════════════════════════

/// Everything a rule may look at for one frame.
struct PoseContext<'a> {
    cfg:             &'a ClassifierConfig,
    hands:           &'a [Hand],
    primary:         &'a Hand,
    pinch_threshold: f32,
}

impl PoseContext<'_> {
    fn extended(&self, hand: &Hand, finger: Finger) -> bool {
        is_finger_extended(hand, finger.tip(), finger.pip(), self.cfg.extension_margin)
    }

    fn folded(&self, hand: &Hand, finger: Finger) -> bool {
        is_finger_folded(hand, finger.tip(), finger.pip(), finger.mcp(), self.cfg.fold_proximity)
    }
}

type Rule = fn(&PoseContext) -> bool;

const RULES: [(Rule, Gesture); 5] = [
    (two_finger_zoom, Gesture::TwoFingerZoom),
    (open_palm,       Gesture::OpenPalm),
    (peace_sign,      Gesture::PeaceClear),
    (pointing,        Gesture::Pointing),
    (pinch,           Gesture::PinchDraw),
];

fn two_finger_zoom(ctx: &PoseContext) -> bool {
    match ctx.hands {
        [a, b, ..] => ctx.extended(a, Finger::Index) && ctx.extended(b, Finger::Index),
        _ => false,
    }
}

fn open_palm(ctx: &PoseContext) -> bool {
    let h = ctx.primary;
    is_thumb_extended(h)
        && Finger::ALL.iter().all(|&f| ctx.extended(h, f))
        && h.pinch_distance() > ctx.cfg.palm_clearance
}

fn peace_sign(ctx: &PoseContext) -> bool {
    let h = ctx.primary;
    ctx.extended(h, Finger::Index)
        && ctx.extended(h, Finger::Middle)
        && ctx.folded(h, Finger::Ring)
        && ctx.folded(h, Finger::Pinky)
}

fn pointing(ctx: &PoseContext) -> bool {
    let h = ctx.primary;
    let clearance = ctx.cfg.pointing_clearance.max(ctx.pinch_threshold);
    ctx.extended(h, Finger::Index)
        && ctx.folded(h, Finger::Middle)
        && ctx.folded(h, Finger::Ring)
        && ctx.folded(h, Finger::Pinky)
        && h.pinch_distance() > clearance
}

fn pinch(ctx: &PoseContext) -> bool {
    ctx.primary.pinch_distance() < ctx.pinch_threshold
}

// ════════════════════════════════════════════════════════════════════════════
// PoseClassifier
// ════════════════════════════════════════════════════════════════════════════

/// Stateless classifier; pinch hysteresis state is supplied per call.
#[derive(Clone, Debug, Default)]
pub struct PoseClassifier {
    pub config: ClassifierConfig,
}

impl PoseClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        PoseClassifier { config }
    }

    /// Pinch distance threshold for the current hysteresis state.
    pub fn pinch_threshold(&self, pinch_active: bool) -> f32 {
        if pinch_active { self.config.pinch_exit } else { self.config.pinch_enter }
    }

    /// Classify one frame.  `hands` is in detector order, first is primary.
    /// No hands classifies as [`Gesture::None`].
    pub fn classify(&self, hands: &[Hand], pinch_active: bool) -> Gesture {
        let Some(ctx) = self.context(hands, pinch_active) else {
            return Gesture::None;
        };
        RULES
            .iter()
            .find(|(rule, _)| rule(&ctx))
            .map(|&(_, gesture)| gesture)
            .unwrap_or(Gesture::None)
    }

    /// Evaluate the single rule for `gesture` in isolation, ignoring the
    /// rules ranked above it.  `Gesture::None` has no rule and never matches.
    pub fn matches(&self, gesture: Gesture, hands: &[Hand], pinch_active: bool) -> bool {
        let Some(ctx) = self.context(hands, pinch_active) else {
            return false;
        };
        RULES
            .iter()
            .find(|(_, g)| *g == gesture)
            .is_some_and(|(rule, _)| rule(&ctx))
    }

    fn context<'a>(&'a self, hands: &'a [Hand], pinch_active: bool) -> Option<PoseContext<'a>> {
        let primary = hands.first()?;
        Some(PoseContext {
            cfg: &self.config,
            hands,
            primary,
            pinch_threshold: self.pinch_threshold(pinch_active),
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
