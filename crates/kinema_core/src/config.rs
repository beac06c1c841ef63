//! Evaluator configuration

use serde::{Deserialize, Serialize};

/// Tuning knobs for [`NodeGraph`](crate::graph::NodeGraph) evaluation
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Largest clock delta a single spring step may consume, in
    /// milliseconds. Longer gaps (a stalled frame, a backgrounded app) are
    /// treated as this long.
    pub max_delta_ms: f64,
    /// Maximum expression nesting depth
    pub max_depth: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            max_delta_ms: 64.0,
            max_depth: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: EvalConfig = toml::from_str("max_depth = 64").unwrap();
        assert_eq!(config.max_depth, 64);
        assert_eq!(config.max_delta_ms, 64.0);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = EvalConfig {
            max_delta_ms: 32.0,
            max_depth: 10,
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: EvalConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
