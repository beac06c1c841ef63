//! Piecewise-linear interpolation

use crate::error::{GraphError, Result};
use crate::node::Extrapolate;

/// Input/output stops of an `interpolate` node
#[derive(Clone, Debug, PartialEq)]
pub struct InterpolateConfig {
    pub input_range: Vec<f64>,
    pub output_range: Vec<f64>,
    pub extrapolate_left: Extrapolate,
    pub extrapolate_right: Extrapolate,
}

impl InterpolateConfig {
    pub fn new(input_range: impl Into<Vec<f64>>, output_range: impl Into<Vec<f64>>) -> Self {
        Self {
            input_range: input_range.into(),
            output_range: output_range.into(),
            extrapolate_left: Extrapolate::Extend,
            extrapolate_right: Extrapolate::Extend,
        }
    }

    /// Use the same extrapolation on both sides
    pub fn extrapolate(mut self, extrapolate: Extrapolate) -> Self {
        self.extrapolate_left = extrapolate;
        self.extrapolate_right = extrapolate;
        self
    }

    pub fn clamp(self) -> Self {
        self.extrapolate(Extrapolate::Clamp)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.input_range.len() != self.output_range.len() {
            return Err(GraphError::RangeMismatch {
                inputs: self.input_range.len(),
                outputs: self.output_range.len(),
            });
        }
        if self.input_range.len() < 2 {
            return Err(GraphError::EmptyRange);
        }
        if self.input_range.windows(2).any(|w| !(w[0] <= w[1])) {
            return Err(GraphError::NonMonotonicRange);
        }
        Ok(())
    }
}

/// Map `x` through validated stops
pub(crate) fn interpolate(
    x: f64,
    inputs: &[f64],
    outputs: &[f64],
    left: Extrapolate,
    right: Extrapolate,
) -> f64 {
    let last = inputs.len() - 1;

    if x < inputs[0] {
        match left {
            Extrapolate::Clamp => return outputs[0],
            Extrapolate::Identity => return x,
            Extrapolate::Extend => {}
        }
    }
    if x > inputs[last] {
        match right {
            Extrapolate::Clamp => return outputs[last],
            Extrapolate::Identity => return x,
            Extrapolate::Extend => {}
        }
    }

    // First segment whose upper stop lies beyond x, or the last one
    let segment = (0..last - 1)
        .find(|&i| x < inputs[i + 1])
        .unwrap_or(last - 1);

    let (in0, in1) = (inputs[segment], inputs[segment + 1]);
    let (out0, out1) = (outputs[segment], outputs[segment + 1]);

    if in1 == in0 {
        return if x <= in0 { out0 } else { out1 };
    }

    out0 + (x - in0) / (in1 - in0) * (out1 - out0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(x: f64, config: &InterpolateConfig) -> f64 {
        interpolate(
            x,
            &config.input_range,
            &config.output_range,
            config.extrapolate_left,
            config.extrapolate_right,
        )
    }

    #[test]
    fn test_multi_segment() {
        let config = InterpolateConfig::new([0.0, 1.0, 3.0], [0.0, 10.0, 30.0]);
        assert_eq!(eval(0.5, &config), 5.0);
        assert_eq!(eval(1.0, &config), 10.0);
        assert_eq!(eval(2.0, &config), 20.0);
    }

    #[test]
    fn test_extrapolation_modes() {
        let config = InterpolateConfig::new([0.0, 1.0], [0.0, 100.0]);
        assert_eq!(eval(2.0, &config), 200.0);
        assert_eq!(eval(-1.0, &config), -100.0);

        let clamped = config.clone().clamp();
        assert_eq!(eval(2.0, &clamped), 100.0);
        assert_eq!(eval(-1.0, &clamped), 0.0);

        let identity = config.extrapolate(Extrapolate::Identity);
        assert_eq!(eval(7.0, &identity), 7.0);
    }

    #[test]
    fn test_descending_outputs() {
        let config = InterpolateConfig::new([0.0, 100.0], [1.0, 0.0]).clamp();
        assert_eq!(eval(25.0, &config), 0.75);
    }

    #[test]
    fn test_repeated_stop_is_a_step() {
        let config = InterpolateConfig::new([0.0, 1.0, 1.0, 2.0], [0.0, 1.0, 5.0, 6.0]);
        assert_eq!(eval(0.5, &config), 0.5);
        assert_eq!(eval(1.5, &config), 5.5);
    }

    #[test]
    fn test_validation() {
        assert_eq!(
            InterpolateConfig::new([0.0, 1.0], [0.0]).validate(),
            Err(GraphError::RangeMismatch {
                inputs: 2,
                outputs: 1
            })
        );
        assert_eq!(
            InterpolateConfig::new([0.0], [0.0]).validate(),
            Err(GraphError::EmptyRange)
        );
        assert_eq!(
            InterpolateConfig::new([1.0, 0.0], [0.0, 1.0]).validate(),
            Err(GraphError::NonMonotonicRange)
        );
        assert!(InterpolateConfig::new([0.0, 1.0], [5.0, 6.0]).validate().is_ok());
    }
}
