//! # air_canvas
//!
//! A drawing surface driven by hand gestures: landmarks from a hand detector
//! (or the keyboard/mouse simulator) are classified, debounced and routed to
//! ink, zoom or the tool menu, then rendered with `minifb`.
//!
//! ## Gesture → Action mapping
//!
//! | Gesture | Mode | Action |
//! |---|---|---|
//! | Pinch (thumb + index) | Canvas | Draw with the current tool; release seals the stroke |
//! | Two hands, index fingers out | Canvas | Zoom about the midpoint of the tips |
//! | Peace sign | Canvas | Dissolve every stroke into falling particles |
//! | Open palm, held 1 s | Either | Toggle the menu (once per hold) |
//! | Pointing | Menu | Move the cursor; hold over a swatch 0.6 s to pick it |
//!
//! ## Landmark sources
//!
//! * (default) — **Simulation**: the mouse positions a synthetic hand.
//! * `--detector "<cmd>"` — an external process printing `READY` and then one
//!   JSON detection per line.
//! * `--stdin` — the same JSON lines piped into this process.
//!
//! ### Simulation keyboard shortcuts
//!
//! | Key | Action |
//! |---|---|
//! | `Space` (hold) | Pinch |
//! | `P` (hold) | Point |
//! | `V` (hold) | Peace |
//! | `O` (hold) | Open palm |
//! | `Z` (hold) + wheel | Two-hand zoom; wheel spreads the hands |
//! | `1`–`6` | Pen color |
//! | `E` | Toggle eraser |
//! | `[` / `]` | Narrower / wider pen |
//! | `R` | Reset the view |
//! | `Q` / `Escape` | Quit |

pub mod session;
pub mod config;
pub mod source;
pub mod palette;
pub mod raster;
pub mod visualizer;
pub mod app;
