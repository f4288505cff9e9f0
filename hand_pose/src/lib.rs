//! # hand_pose
//!
//! Turns per-frame hand landmarks into a debounced gesture label.
//!
//! ```text
//! landmarks ──▶ PoseClassifier ──▶ raw Gesture ──▶ GestureStabilizer ──▶ active Gesture
//!                     ▲                                   │
//!                     └──────── pinch_active ◀────────────┘
//! ```
//!
//! * [`landmark`] — the 21-point [`Hand`] and its joint indices.
//! * [`geometry`] — coordinate spaces, distance / lerp, finger predicates.
//! * [`classifier`] — ordered rule chain from hands to one raw [`Gesture`].
//! * [`stabilizer`] — ring-buffer majority vote with a sticky active gesture.
//! * [`synth`] — canned hand poses for simulation and tests.
//!
//! ## Gesture vocabulary
//!
//! | Gesture | Pose |
//! |---|---|
//! | `PinchDraw` | thumb tip touching index tip |
//! | `OpenPalm` | all five fingers extended, thumb clear of index |
//! | `Pointing` | index extended, others folded |
//! | `PeaceClear` | index + middle extended, ring + pinky folded |
//! | `TwoFingerZoom` | two hands, both index fingers extended |

pub mod landmark;
pub mod geometry;
pub mod classifier;
pub mod stabilizer;
pub mod synth;

pub use landmark::{Hand, Landmark, LANDMARK_COUNT};
pub use geometry::{
    distance, lerp, lerp_point, is_finger_extended, is_finger_folded, is_thumb_extended,
    Normalized, Point, Screen, World,
};
pub use classifier::{ClassifierConfig, Gesture, PoseClassifier};
pub use stabilizer::{GestureBuffer, GestureStabilizer, StabilizerConfig};
