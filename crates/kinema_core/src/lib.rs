//! Kinema Core Runtime
//!
//! This crate provides the declarative animation node graph:
//!
//! - **Expression Nodes**: arithmetic, comparison and control-flow nodes over `f64`
//! - **Value Slots & Clocks**: mutable state and frame-synchronised time sources
//! - **Integrators**: spring physics and eased timing, stepped once per frame
//! - **Evaluation**: frame-driven, dependency-tracked root updates
//!
//! # Example
//!
//! ```rust
//! use kinema_core::{NodeGraph, SpringConfig};
//!
//! let mut graph = NodeGraph::new();
//!
//! let clock = graph.clock();
//! let state = graph.spring_state();
//! let start = graph.start_clock(clock);
//! let spring = graph.spring(clock, state, 100.0, SpringConfig::default());
//! let root = graph.block([start, spring]);
//!
//! let mut position = 0.0;
//! for frame in 1..=120 {
//!     position = graph.step(root, frame as f64 * 16.0).unwrap();
//! }
//! assert!((position - 100.0).abs() < 1.0);
//! ```

pub mod color;
pub mod config;
pub mod easing;
pub mod error;
pub mod eval;
pub mod graph;
pub mod interpolate;
pub mod node;
pub mod spring;
pub mod timing;

pub use color::{pack_argb, packed_alpha, RgbColor};
pub use config::EvalConfig;
pub use easing::{CubicBezier, Easing};
pub use error::{GraphError, Result};
pub use graph::{GraphStats, NodeGraph};
pub use interpolate::InterpolateConfig;
pub use node::{truthy, Adaptable, BinaryOp, Clock, ClockId, Extrapolate, NodeId, UnaryOp, ValueNode};
pub use spring::{SpringConfig, SpringState, SpringStep};
pub use timing::{timing_step, TimingConfig, TimingSpec, TimingState, TimingStep};
