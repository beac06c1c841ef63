//! Easing curves for timing animations

use serde::{Deserialize, Serialize};

/// Easing curve applied to timing progress
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    #[default]
    Linear,
    /// CSS `ease`, i.e. `cubic-bezier(0.25, 0.1, 0.25, 1.0)`
    Ease,
    InQuad,
    OutQuad,
    InOutQuad,
    InCubic,
    OutCubic,
    InOutCubic,
    InQuart,
    OutQuart,
    InOutQuart,
    CubicBezier { x1: f64, y1: f64, x2: f64, y2: f64 },
}

impl Easing {
    /// Map linear progress to eased progress
    ///
    /// Progress is clamped to `[0, 1]` first, so the curve never overshoots
    /// the endpoints even when the frame clock runs past the duration.
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match *self {
            Easing::Linear => t,
            Easing::Ease => CubicBezier::new(0.25, 0.1, 0.25, 1.0).solve(t),
            Easing::InQuad => t * t,
            Easing::OutQuad => 1.0 - (1.0 - t).powi(2),
            Easing::InOutQuad => in_out(t, 2),
            Easing::InCubic => t * t * t,
            Easing::OutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::InOutCubic => in_out(t, 3),
            Easing::InQuart => t.powi(4),
            Easing::OutQuart => 1.0 - (1.0 - t).powi(4),
            Easing::InOutQuart => in_out(t, 4),
            Easing::CubicBezier { x1, y1, x2, y2 } => CubicBezier::new(x1, y1, x2, y2).solve(t),
        }
    }
}

/// Symmetric polynomial in-out curve of the given degree
fn in_out(t: f64, degree: i32) -> f64 {
    if t < 0.5 {
        2f64.powi(degree - 1) * t.powi(degree)
    } else {
        1.0 - (-2.0 * t + 2.0).powi(degree) / 2.0
    }
}

/// A CSS-style cubic bezier timing curve with fixed endpoints (0,0) and (1,1)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubicBezier {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
}

impl CubicBezier {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Find y for a given x.
    ///
    /// Newton-Raphson first; bisection when the slope is too flat to converge.
    pub fn solve(&self, x: f64) -> f64 {
        if x <= 0.0 {
            return 0.0;
        }
        if x >= 1.0 {
            return 1.0;
        }

        let mut p = x;
        for _ in 0..8 {
            let err = sample(p, self.x1, self.x2) - x;
            if err.abs() < 1e-7 {
                return sample(p, self.y1, self.y2);
            }
            let slope = slope(p, self.x1, self.x2);
            if slope.abs() < 1e-7 {
                break;
            }
            p -= err / slope;
        }

        let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
        p = x;
        for _ in 0..32 {
            let val = sample(p, self.x1, self.x2);
            if (val - x).abs() < 1e-7 {
                break;
            }
            if val < x {
                lo = p;
            } else {
                hi = p;
            }
            p = (lo + hi) * 0.5;
        }

        sample(p, self.y1, self.y2)
    }
}

/// B(t) = 3(1-t)²t·p1 + 3(1-t)t²·p2 + t³, in Horner form
#[inline]
fn sample(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    ((a * t + b) * t + c) * t
}

#[inline]
fn slope(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    (3.0 * a * t + 2.0 * b) * t + c
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 11] = [
        Easing::Linear,
        Easing::Ease,
        Easing::InQuad,
        Easing::OutQuad,
        Easing::InOutQuad,
        Easing::InCubic,
        Easing::OutCubic,
        Easing::InOutCubic,
        Easing::InQuart,
        Easing::OutQuart,
        Easing::InOutQuart,
    ];

    #[test]
    fn test_endpoints_are_exact() {
        for easing in ALL {
            assert_eq!(easing.apply(0.0), 0.0, "{:?}", easing);
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-9, "{:?}", easing);
        }
    }

    #[test]
    fn test_progress_is_clamped() {
        assert_eq!(Easing::Linear.apply(1.5), 1.0);
        assert_eq!(Easing::OutCubic.apply(-0.2), 0.0);
    }

    #[test]
    fn test_in_out_is_symmetric() {
        for easing in [Easing::InOutQuad, Easing::InOutCubic, Easing::InOutQuart] {
            assert!((easing.apply(0.5) - 0.5).abs() < 1e-9);
            let a = easing.apply(0.2);
            let b = easing.apply(0.8);
            assert!((a + b - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_linear_bezier_is_identity() {
        let curve = CubicBezier::new(0.0, 0.0, 1.0, 1.0);
        for i in 1..10 {
            let x = i as f64 / 10.0;
            assert!((curve.solve(x) - x).abs() < 1e-5);
        }
    }

    #[test]
    fn test_ease_is_monotonic() {
        let mut last = 0.0;
        for i in 1..=20 {
            let y = Easing::Ease.apply(i as f64 / 20.0);
            assert!(y >= last);
            last = y;
        }
    }

    #[test]
    fn test_deserialize_from_json() {
        let easing: Easing = serde_json::from_str(r#""in_out_cubic""#).unwrap();
        assert_eq!(easing, Easing::InOutCubic);

        let bezier: Easing =
            serde_json::from_str(r#"{"cubic_bezier":{"x1":0.4,"y1":0.0,"x2":0.2,"y2":1.0}}"#)
                .unwrap();
        assert!(matches!(bezier, Easing::CubicBezier { .. }));
    }
}
