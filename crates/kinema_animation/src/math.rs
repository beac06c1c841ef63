//! Math helpers built from graph nodes
//!
//! The node graph has no trigonometric nodes, so angles are computed with
//! polynomial and rational approximations made of arithmetic nodes.

use std::f64::consts::{FRAC_PI_4, PI};

use kinema_core::{Adaptable, NodeGraph, NodeId};

/// Degrees to radians
pub fn to_rad(graph: &mut NodeGraph, deg: impl Into<Adaptable>) -> NodeId {
    graph.multiply(deg, PI / 180.0)
}

/// Radians to degrees
pub fn to_deg(graph: &mut NodeGraph, rad: impl Into<Adaptable>) -> NodeId {
    graph.multiply(rad, 180.0 / PI)
}

/// Smallest of `args`, or `None` when there are none
pub fn min<I>(graph: &mut NodeGraph, args: I) -> Option<Adaptable>
where
    I: IntoIterator,
    I::Item: Into<Adaptable>,
{
    pairwise(graph, args, |graph, a, b| graph.min(a, b))
}

/// Largest of `args`, or `None` when there are none
pub fn max<I>(graph: &mut NodeGraph, args: I) -> Option<Adaptable>
where
    I: IntoIterator,
    I::Item: Into<Adaptable>,
{
    pairwise(graph, args, |graph, a, b| graph.max(a, b))
}

/// Combine neighbours level by level so the result is `log2(n)` nodes deep
fn pairwise<I>(
    graph: &mut NodeGraph,
    args: I,
    combine: fn(&mut NodeGraph, Adaptable, Adaptable) -> NodeId,
) -> Option<Adaptable>
where
    I: IntoIterator,
    I::Item: Into<Adaptable>,
{
    let mut level: Vec<Adaptable> = args.into_iter().map(Into::into).collect();
    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| match *pair {
                [a, b] => combine(graph, a, b).into(),
                _ => pair[0],
            })
            .collect();
    }
    level.pop()
}

/// Arctangent of `x`, accurate to about 0.0015 rad for `|x| <= 1`
///
/// `π/4·x − x·(|x| − 1)·(0.2447 + 0.0663·|x|)`
pub fn atan(graph: &mut NodeGraph, x: impl Into<Adaptable>) -> NodeId {
    let x = x.into();
    let abs_x = graph.abs(x);

    let linear = graph.multiply(FRAC_PI_4, x);
    let shifted = graph.sub(abs_x, 1.0);
    let slope = graph.multiply(0.0663, abs_x);
    let slope = graph.add(0.2447, slope);
    let correction = graph.multiply(x, shifted);
    let correction = graph.multiply(correction, slope);

    graph.sub(linear, correction)
}

/// Quadrant-aware arctangent of `y / x`, in `[-π, π]`
///
/// Each half plane reduces the angle to an [`atan`] of a ratio in `[-1, 1]`.
/// `atan2(0, 0)` divides zero by zero and yields NaN.
pub fn atan2(
    graph: &mut NodeGraph,
    y: impl Into<Adaptable>,
    x: impl Into<Adaptable>,
) -> NodeId {
    let (y, x) = (y.into(), x.into());
    let abs_y = graph.abs(y);

    // x >= 0: π/4 − atan((x − |y|) / (x + |y|))
    let num = graph.sub(x, abs_y);
    let den = graph.add(x, abs_y);
    let ratio = graph.divide(num, den);
    let offset = atan(graph, ratio);
    let right = graph.sub(FRAC_PI_4, offset);

    // x < 0: 3π/4 − atan((x + |y|) / (|y| − x))
    let num = graph.add(x, abs_y);
    let den = graph.sub(abs_y, x);
    let ratio = graph.divide(num, den);
    let offset = atan(graph, ratio);
    let left = graph.sub(3.0 * FRAC_PI_4, offset);

    let facing_right = graph.greater_or_eq(x, 0.0);
    let angle = graph.cond(facing_right, right, left);

    let below = graph.less_than(y, 0.0);
    let negated = graph.multiply(angle, -1.0);
    graph.cond(below, negated, angle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degree_roundtrip() {
        let mut graph = NodeGraph::new();
        for deg in [-720.0, -90.0, 0.0, 45.0, 123.4, 360.0] {
            let rad = to_rad(&mut graph, deg);
            let back = to_deg(&mut graph, rad);
            assert!((graph.evaluate(back).unwrap() - deg).abs() < 1e-9);
        }

        let half_turn = to_rad(&mut graph, 180.0);
        assert!((graph.evaluate(half_turn).unwrap() - PI).abs() < 1e-12);
    }

    #[test]
    fn test_variadic_min_max() {
        let mut graph = NodeGraph::new();
        let x = graph.value(-3.0);

        let lowest = min(&mut graph, [Adaptable::from(4.0), x.into(), 2.0.into()]).unwrap();
        let highest = max(&mut graph, [Adaptable::from(4.0), x.into(), 2.0.into()]).unwrap();
        assert_eq!(graph.evaluate(lowest), Ok(-3.0));
        assert_eq!(graph.evaluate(highest), Ok(4.0));

        assert_eq!(min(&mut graph, [7.0]), Some(Adaptable::Const(7.0)));
        assert_eq!(max(&mut graph, Vec::<f64>::new()), None);
    }

    #[test]
    fn test_min_max_of_many_arguments() {
        let mut graph = NodeGraph::new();
        let args: Vec<f64> = (0..5000).map(|i| ((i * 37) % 5000) as f64).collect();

        let lowest = min(&mut graph, args.iter().copied()).unwrap();
        let highest = max(&mut graph, args.iter().copied()).unwrap();
        assert_eq!(graph.evaluate(lowest), Ok(0.0));
        assert_eq!(graph.evaluate(highest), Ok(4999.0));
    }

    #[test]
    fn test_atan_unit_range() {
        let mut graph = NodeGraph::new();
        for i in -10..=10 {
            let x = i as f64 / 10.0;
            let node = atan(&mut graph, x);
            let approx = graph.evaluate(node).unwrap();
            assert!((approx - x.atan()).abs() < 0.002, "atan({x}) = {approx}");
        }
    }

    #[test]
    fn test_atan2_axes() {
        let mut graph = NodeGraph::new();
        let cases = [
            (0.0, 1.0, 0.0),
            (1.0, 0.0, PI / 2.0),
            (0.0, -1.0, PI),
            (-1.0, 0.0, -PI / 2.0),
        ];
        for (y, x, expected) in cases {
            let node = atan2(&mut graph, y, x);
            let angle = graph.evaluate(node).unwrap();
            assert!((angle - expected).abs() < 1e-9, "atan2({y}, {x}) = {angle}");
        }
    }

    #[test]
    fn test_atan2_origin_is_nan() {
        let mut graph = NodeGraph::new();
        let node = atan2(&mut graph, 0.0, 0.0);
        assert!(graph.evaluate(node).unwrap().is_nan());
    }
}
