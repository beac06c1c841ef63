//! Spring physics
//!
//! Closed-form damped harmonic oscillator. Each frame the spring is solved
//! analytically from its current position and velocity, so large frame gaps
//! never destabilize it the way explicit integration can.

use serde::{Deserialize, Serialize};

use crate::node::ValueNode;

/// Configuration for a spring animation
///
/// `to_value` is not part of the configuration: it is always an operand of
/// the spring node, driven by the caller.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringConfig {
    pub damping: f64,
    pub mass: f64,
    pub stiffness: f64,
    /// Stop as soon as the target is crossed instead of oscillating around it
    pub overshoot_clamping: bool,
    pub rest_speed_threshold: f64,
    pub rest_displacement_threshold: f64,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            damping: 7.0,
            mass: 1.0,
            stiffness: 121.6,
            overshoot_clamping: false,
            rest_speed_threshold: 0.001,
            rest_displacement_threshold: 0.001,
        }
    }
}

impl SpringConfig {
    /// Create a new spring configuration with default rest thresholds
    pub fn new(stiffness: f64, damping: f64, mass: f64) -> Self {
        Self {
            stiffness,
            damping,
            mass,
            ..Self::default()
        }
    }

    pub fn with_overshoot_clamping(mut self, clamp: bool) -> Self {
        self.overshoot_clamping = clamp;
        self
    }

    pub fn with_rest_thresholds(mut self, speed: f64, displacement: f64) -> Self {
        self.rest_speed_threshold = speed;
        self.rest_displacement_threshold = displacement;
        self
    }

    /// Calculate critical damping for this spring's stiffness and mass
    pub fn critical_damping(&self) -> f64 {
        2.0 * (self.stiffness * self.mass).sqrt()
    }

    /// Damping ratio ζ (1.0 is critically damped)
    pub fn damping_ratio(&self) -> f64 {
        self.damping / self.critical_damping()
    }

    /// Undamped angular frequency ω₀ in rad/s
    pub fn natural_frequency(&self) -> f64 {
        (self.stiffness / self.mass).sqrt()
    }

    /// Check if the spring is underdamped (will oscillate)
    pub fn is_underdamped(&self) -> bool {
        self.damping_ratio() < 1.0
    }

    /// Advance a spring by `dt` seconds
    ///
    /// Overdamped springs are solved with the critically damped curve, which
    /// settles slightly faster but never oscillates either.
    pub fn step(&self, position: f64, velocity: f64, to_value: f64, dt: f64) -> SpringStep {
        let zeta = self.damping_ratio();
        let omega0 = self.natural_frequency();
        let x0 = position - to_value;
        let v0 = velocity;

        let (x, v) = if zeta < 1.0 {
            let omega1 = omega0 * (1.0 - zeta * zeta).sqrt();
            let envelope = (-zeta * omega0 * dt).exp();
            let b = (v0 + zeta * omega0 * x0) / omega1;
            let (sin1, cos1) = (omega1 * dt).sin_cos();
            let x = envelope * (x0 * cos1 + b * sin1);
            let v = envelope
                * ((b * omega1 - zeta * omega0 * x0) * cos1 - (x0 * omega1 + zeta * omega0 * b) * sin1);
            (x, v)
        } else {
            let envelope = (-omega0 * dt).exp();
            let k = v0 + omega0 * x0;
            (envelope * (x0 + k * dt), envelope * (v0 - omega0 * dt * k))
        };

        let mut next = SpringStep {
            position: to_value + x,
            velocity: v,
            finished: false,
        };

        let overshooting = self.overshoot_clamping
            && self.stiffness != 0.0
            && if position < to_value {
                next.position > to_value
            } else {
                next.position < to_value
            };
        let at_rest_speed = next.velocity.abs() < self.rest_speed_threshold;
        let at_rest_displacement = self.stiffness == 0.0
            || (to_value - next.position).abs() < self.rest_displacement_threshold;

        if overshooting || (at_rest_speed && at_rest_displacement) {
            if self.stiffness != 0.0 {
                next.velocity = 0.0;
                next.position = to_value;
            }
            next.finished = true;
        }

        next
    }
}

/// Result of one spring step
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringStep {
    pub position: f64,
    pub velocity: f64,
    pub finished: bool,
}

/// Value slots a spring node reads and writes every frame
#[derive(Clone, Copy, Debug)]
pub struct SpringState {
    pub finished: ValueNode,
    pub velocity: ValueNode,
    pub position: ValueNode,
    /// Clock time of the last step, 0 before the first one
    pub time: ValueNode,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settle(config: SpringConfig, from: f64, to: f64, frames: usize) -> (SpringStep, usize) {
        let mut state = SpringStep {
            position: from,
            velocity: 0.0,
            finished: false,
        };
        for frame in 0..frames {
            state = config.step(state.position, state.velocity, to, 1.0 / 60.0);
            if state.finished {
                return (state, frame);
            }
        }
        (state, frames)
    }

    #[test]
    fn test_default_config() {
        let config = SpringConfig::default();
        assert_eq!(config.damping, 7.0);
        assert_eq!(config.mass, 1.0);
        assert_eq!(config.stiffness, 121.6);
        assert!(!config.overshoot_clamping);
        assert!(config.is_underdamped());
    }

    #[test]
    fn test_spring_settles_to_target() {
        let (state, frames) = settle(SpringConfig::default(), 0.0, 100.0, 600);
        assert!(state.finished);
        assert!(frames < 600);
        assert_eq!(state.position, 100.0);
        assert_eq!(state.velocity, 0.0);
    }

    #[test]
    fn test_underdamped_spring_overshoots() {
        let config = SpringConfig::default();
        let mut position = 0.0;
        let mut velocity = 0.0;
        let mut peak: f64 = 0.0;
        for _ in 0..120 {
            let next = config.step(position, velocity, 1.0, 1.0 / 60.0);
            position = next.position;
            velocity = next.velocity;
            peak = peak.max(position);
        }
        assert!(peak > 1.0);
    }

    #[test]
    fn test_overshoot_clamping_stops_at_target() {
        let config = SpringConfig::default().with_overshoot_clamping(true);
        let (state, _) = settle(config, 0.0, 1.0, 600);
        assert!(state.finished);
        assert_eq!(state.position, 1.0);
    }

    #[test]
    fn test_critically_damped_does_not_overshoot() {
        let mut config = SpringConfig::new(100.0, 0.0, 1.0);
        config.damping = config.critical_damping();
        assert!(!config.is_underdamped());

        let mut position = 0.0;
        let mut velocity = 0.0;
        for _ in 0..300 {
            let next = config.step(position, velocity, 50.0, 1.0 / 60.0);
            assert!(next.position <= 50.0 + 1e-9);
            position = next.position;
            velocity = next.velocity;
        }
    }

    #[test]
    fn test_large_time_step_is_stable() {
        let config = SpringConfig::new(400.0, 30.0, 1.0);
        let mut position = 0.0;
        let mut velocity = 0.0;
        for _ in 0..100 {
            let next = config.step(position, velocity, 1000.0, 0.1);
            assert!(next.position < 2000.0);
            assert!(next.position > -500.0);
            position = next.position;
            velocity = next.velocity;
        }
    }

    #[test]
    fn test_zero_step_keeps_state() {
        let config = SpringConfig::default();
        let next = config.step(10.0, 3.0, 20.0, 0.0);
        assert!((next.position - 10.0).abs() < 1e-12);
        assert!((next.velocity - 3.0).abs() < 1e-12);
        assert!(!next.finished);
    }

    #[test]
    fn test_heavier_mass_settles_slower() {
        let (_, light) = settle(SpringConfig::new(121.6, 7.0, 1.0), 0.0, 100.0, 2000);
        let (heavy_state, heavy) = settle(SpringConfig::new(121.6, 7.0, 2.0), 0.0, 100.0, 2000);
        assert!(heavy_state.finished);
        assert!(heavy > light);
    }

    #[test]
    fn test_config_from_toml_uses_defaults() {
        let config: SpringConfig = toml::from_str("stiffness = 300.0\ndamping = 20.0").unwrap();
        assert_eq!(config.stiffness, 300.0);
        assert_eq!(config.damping, 20.0);
        assert_eq!(config.mass, 1.0);
        assert_eq!(config.rest_speed_threshold, 0.001);
    }
}
