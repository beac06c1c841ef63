//! Duration-based timing animation
//!
//! Progress is tracked relative to the remaining distance, so the target may
//! change mid-flight and the animation still lands on it when the duration
//! elapses.

use serde::{Deserialize, Serialize};

use crate::easing::Easing;
use crate::node::{Adaptable, ValueNode};

/// Configuration for a timing animation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimingConfig {
    pub to_value: Adaptable,
    /// Duration in milliseconds
    pub duration: Adaptable,
    pub easing: Easing,
}

impl TimingConfig {
    pub fn new(to_value: impl Into<Adaptable>, duration: impl Into<Adaptable>) -> Self {
        Self {
            to_value: to_value.into(),
            duration: duration.into(),
            easing: Easing::default(),
        }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }
}

/// Serializable form of [`TimingConfig`] with literal operands
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimingSpec {
    pub to_value: f64,
    pub duration_ms: f64,
    #[serde(default)]
    pub easing: Easing,
}

impl From<TimingSpec> for TimingConfig {
    fn from(spec: TimingSpec) -> Self {
        TimingConfig::new(spec.to_value, spec.duration_ms).with_easing(spec.easing)
    }
}

/// Value slots a timing node reads and writes every frame
#[derive(Clone, Copy, Debug)]
pub struct TimingState {
    pub finished: ValueNode,
    pub position: ValueNode,
    /// Clock time of the last step, 0 before the first one
    pub time: ValueNode,
    /// Elapsed animation time in milliseconds
    pub frame_time: ValueNode,
}

/// Result of one timing step
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimingStep {
    pub position: f64,
    pub frame_time: f64,
    pub finished: bool,
}

/// Advance a timing animation by `elapsed_ms`
pub fn timing_step(
    easing: Easing,
    position: f64,
    frame_time: f64,
    elapsed_ms: f64,
    to_value: f64,
    duration: f64,
) -> TimingStep {
    let new_frame_time = frame_time + elapsed_ms;

    if duration <= 0.0 || new_frame_time >= duration {
        return TimingStep {
            position: to_value,
            frame_time: new_frame_time,
            finished: true,
        };
    }

    let progress = easing.apply(frame_time / duration);
    let remaining = 1.0 - progress;
    if remaining.abs() <= f64::EPSILON {
        // Curve already at the target; hold there until the duration runs out
        return TimingStep {
            position: to_value,
            frame_time: new_frame_time,
            finished: false,
        };
    }

    let next_progress = easing.apply(new_frame_time / duration);
    let full_distance = (to_value - position) / remaining;
    let start_position = to_value - full_distance;

    TimingStep {
        position: start_position + full_distance * next_progress,
        frame_time: new_frame_time,
        finished: false,
    }
}
