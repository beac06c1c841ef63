//! Kinema Animation Helpers
//!
//! Reusable animation building blocks composed from [`kinema_core`] graph
//! nodes. Every helper only builds nodes; evaluation is driven by the caller.
//!
//! # Features
//!
//! - **Math**: degree/radian conversion, variadic min/max, polynomial `atan`/`atan2`
//! - **Run Loops**: clock-driven spring and timing animations that restart on demand
//! - **Color**: HSV conversion and multi-stop color interpolation
//! - **Lookup**: `match`-style branching, index lookup and snap points
//! - **Gestures**: scroll offsets bound to value slots
//!
//! # Example
//!
//! ```rust
//! use kinema_animation::{get_snap_point, run_spring};
//! use kinema_core::NodeGraph;
//!
//! let mut graph = NodeGraph::new();
//! let clock = graph.clock();
//! let dest = get_snap_point(&mut graph, 140.0, 0.0, &[0.0, 100.0, 300.0]).unwrap();
//! let position = run_spring(&mut graph, clock, 0.0, dest);
//!
//! let mut x = 0.0;
//! for frame in 1..=300 {
//!     x = graph.step(position, frame as f64 * 16.0).unwrap();
//! }
//! assert_eq!(x, 100.0);
//! ```

pub mod branch;
pub mod color;
pub mod gesture;
pub mod math;
pub mod run;
pub mod transform;

pub use branch::{get_snap_point, lookup, match_branches};
pub use color::{color_hsv, interpolate_colors, rgb_to_hsv, Hsv};
pub use gesture::{on_scroll, ContentOffset, ScrollEvent, ScrollHandler};
pub use math::{atan, atan2, max, min, to_deg, to_rad};
pub use run::{run_spring, run_spring_with, run_timing};
pub use transform::{translate_z, ScaleTransform};
