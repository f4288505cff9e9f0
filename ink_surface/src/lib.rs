//! # ink_surface
//!
//! Everything that lives in world space on the drawing surface.
//!
//! * [`view`] — [`ViewTransform`], the pan/zoom mapping between screen and
//!   world, driven by two-hand zoom.
//! * [`stroke`] — [`InkEngine`]: stroke accumulation with adaptive smoothing
//!   and minimum point spacing, sealed stroke history, dissolve.
//! * [`path`] — midpoint quadratic smoothing of a stroke for rendering.
//! * [`particles`] — the [`ParticleField`] that dissolved ink turns into.

pub mod view;
pub mod path;
pub mod particles;
pub mod stroke;

pub use view::{ViewConfig, ViewTransform};
pub use path::{smooth_path, PathCommand, QuadSegment};
pub use particles::{Particle, ParticleConfig, ParticleField};
pub use stroke::{InkConfig, InkEngine, Stroke, Tool, ToolEvent};
