//! Color interpolation through HSV
//!
//! Colors are interpolated channel by channel in HSV space and converted back
//! to a packed RGB color node each frame.

use kinema_core::{Adaptable, InterpolateConfig, NodeGraph, NodeId, Result, RgbColor};
use serde::{Deserialize, Serialize};

use crate::branch::match_branches;

/// Hue in degrees `[0, 360)`, saturation and value in `[0, 1]`
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Hsv {
    pub h: f64,
    pub s: f64,
    pub v: f64,
}

impl From<RgbColor> for Hsv {
    fn from(color: RgbColor) -> Self {
        rgb_to_hsv(color)
    }
}

/// Convert an RGB color to HSV; grays get a hue of 0
pub fn rgb_to_hsv(color: RgbColor) -> Hsv {
    let r = color.r as f64 / 255.0;
    let g = color.g as f64 / 255.0;
    let b = color.b as f64 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let s = if max == 0.0 { 0.0 } else { delta / max };

    // Position on the wheel in 60 degree sectors
    let sector = if delta == 0.0 {
        0.0
    } else if max == r {
        (g - b) / delta + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };

    Hsv {
        h: sector * 60.0,
        s,
        v: max,
    }
}

/// Color node from HSV channel nodes
///
/// `h` is in degrees; hues of 360 and above land in the last sector.
pub fn color_hsv(
    graph: &mut NodeGraph,
    h: impl Into<Adaptable>,
    s: impl Into<Adaptable>,
    v: impl Into<Adaptable>,
) -> NodeId {
    let (h, s, v) = (h.into(), s.into(), v.into());

    let c: Adaptable = graph.multiply(v, s).into();
    let sector = graph.divide(h, 60.0);
    let wrapped = graph.modulo(sector, 2.0);
    let centered = graph.sub(wrapped, 1.0);
    let distance = graph.abs(centered);
    let falloff = graph.sub(1.0, distance);
    let x: Adaptable = graph.multiply(c, falloff).into();
    let m: Adaptable = graph.sub(v, c).into();
    let zero = Adaptable::Const(0.0);

    let mut rgb = |r: Adaptable, g: Adaptable, b: Adaptable| -> Adaptable {
        let r = channel(graph, r, m);
        let g = channel(graph, g, m);
        let b = channel(graph, b, m);
        graph.color(r, g, b).into()
    };
    let sectors = [
        rgb(c, x, zero),
        rgb(x, c, zero),
        rgb(zero, c, x),
        rgb(zero, x, c),
        rgb(x, zero, c),
        rgb(c, zero, x),
    ];

    let mut branches: Vec<Adaptable> = Vec::with_capacity(11);
    for (i, color) in sectors.iter().take(5).enumerate() {
        let bound = (i + 1) as f64 * 60.0;
        branches.push(graph.less_than(h, bound).into());
        branches.push(*color);
    }
    branches.push(sectors[5]);

    match match_branches(graph, &branches) {
        Some(Adaptable::Node(node)) => node,
        other => graph.block(other),
    }
}

/// `round(255 * (value + m))`
fn channel(graph: &mut NodeGraph, value: Adaptable, m: Adaptable) -> NodeId {
    let shifted = graph.add(value, m);
    let scaled = graph.multiply(255.0, shifted);
    graph.round(scaled)
}

/// Color node blending `colors` as `t` moves across `input_range`
///
/// Hue, saturation and value are interpolated separately and clamped to the
/// outermost colors. Hue is interpolated linearly in degrees, so a blend
/// across the 0/360 boundary travels the long way round the wheel.
pub fn interpolate_colors(
    graph: &mut NodeGraph,
    t: impl Into<Adaptable>,
    input_range: &[f64],
    colors: &[RgbColor],
) -> Result<NodeId> {
    let t = t.into();
    let hsv: Vec<Hsv> = colors.iter().copied().map(rgb_to_hsv).collect();

    let mut channel = |select: fn(&Hsv) -> f64| {
        let outputs: Vec<f64> = hsv.iter().map(select).collect();
        graph.interpolate(t, InterpolateConfig::new(input_range, outputs).clamp())
    };
    let h = channel(|c| c.h)?;
    let s = channel(|c| c.s)?;
    let v = channel(|c| c.v)?;

    tracing::trace!(stops = colors.len(), "interpolate colors");
    Ok(color_hsv(graph, h, s, v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinema_core::GraphError;

    fn eval_color(graph: &mut NodeGraph, node: NodeId) -> RgbColor {
        let packed = graph.evaluate(node).unwrap();
        RgbColor::from_packed(packed).unwrap()
    }

    #[test]
    fn test_rgb_to_hsv_primaries() {
        assert_eq!(rgb_to_hsv(RgbColor::RED), Hsv { h: 0.0, s: 1.0, v: 1.0 });
        assert_eq!(rgb_to_hsv(RgbColor::GREEN), Hsv { h: 120.0, s: 1.0, v: 1.0 });
        assert_eq!(rgb_to_hsv(RgbColor::BLUE), Hsv { h: 240.0, s: 1.0, v: 1.0 });
        assert_eq!(rgb_to_hsv(RgbColor::BLACK), Hsv::default());
        assert_eq!(rgb_to_hsv(RgbColor::WHITE), Hsv { h: 0.0, s: 0.0, v: 1.0 });
    }

    #[test]
    fn test_rgb_to_hsv_magenta_side() {
        // Red dominant with more blue than green wraps near 360
        let hsv = Hsv::from(RgbColor::new(255, 0, 128));
        assert!(hsv.h > 300.0 && hsv.h < 360.0);
    }

    #[test]
    fn test_color_hsv_sectors() {
        let mut graph = NodeGraph::new();
        let cases = [
            (0.0, RgbColor::RED),
            (60.0, RgbColor::new(255, 255, 0)),
            (120.0, RgbColor::GREEN),
            (180.0, RgbColor::new(0, 255, 255)),
            (240.0, RgbColor::BLUE),
            (300.0, RgbColor::new(255, 0, 255)),
            (360.0, RgbColor::RED),
        ];
        for (h, expected) in cases {
            let node = color_hsv(&mut graph, h, 1.0, 1.0);
            assert_eq!(eval_color(&mut graph, node), expected, "hue {h}");
        }
    }

    #[test]
    fn test_color_hsv_roundtrip() {
        let mut graph = NodeGraph::new();
        for color in [
            RgbColor::new(12, 200, 99),
            RgbColor::new(250, 128, 3),
            RgbColor::new(80, 80, 80),
        ] {
            let hsv = rgb_to_hsv(color);
            let node = color_hsv(&mut graph, hsv.h, hsv.s, hsv.v);
            assert_eq!(eval_color(&mut graph, node), color);
        }
    }

    #[test]
    fn test_interpolate_black_to_white() {
        let mut graph = NodeGraph::new();
        let t = graph.value(0.5);
        let node = interpolate_colors(
            &mut graph,
            t,
            &[0.0, 1.0],
            &[RgbColor::BLACK, RgbColor::WHITE],
        )
        .unwrap();

        assert_eq!(eval_color(&mut graph, node), RgbColor::new(128, 128, 128));

        graph.set_value(t, 4.0).unwrap();
        assert_eq!(eval_color(&mut graph, node), RgbColor::WHITE);
        graph.set_value(t, -4.0).unwrap();
        assert_eq!(eval_color(&mut graph, node), RgbColor::BLACK);
    }

    #[test]
    fn test_interpolate_hits_stops() {
        let mut graph = NodeGraph::new();
        let t = graph.value(0.0);
        let colors = [RgbColor::RED, RgbColor::GREEN, RgbColor::BLUE];
        let node = interpolate_colors(&mut graph, t, &[0.0, 50.0, 100.0], &colors).unwrap();

        for (stop, color) in [0.0, 50.0, 100.0].into_iter().zip(colors) {
            graph.set_value(t, stop).unwrap();
            assert_eq!(eval_color(&mut graph, node), color);
        }
    }

    #[test]
    fn test_interpolate_hue_goes_the_long_way() {
        let mut graph = NodeGraph::new();
        let t = graph.value(0.5);
        // Hues of about 350 and 10 degrees
        let colors = [RgbColor::new(255, 0, 43), RgbColor::new(255, 43, 0)];
        let node = interpolate_colors(&mut graph, t, &[0.0, 1.0], &colors).unwrap();

        assert_eq!(eval_color(&mut graph, node), RgbColor::new(0, 255, 255));
    }

    #[test]
    fn test_interpolate_rejects_bad_ranges() {
        let mut graph = NodeGraph::new();
        assert_eq!(
            interpolate_colors(&mut graph, 0.0, &[0.0, 1.0], &[RgbColor::RED]),
            Err(GraphError::RangeMismatch {
                inputs: 2,
                outputs: 1
            })
        );
        assert_eq!(
            interpolate_colors(&mut graph, 0.0, &[0.0], &[RgbColor::RED]),
            Err(GraphError::EmptyRange)
        );
    }

    #[test]
    fn test_hsv_deserialize() {
        let hsv: Hsv = toml::from_str("h = 90.0\ns = 0.5\nv = 1.0").unwrap();
        assert_eq!(hsv, Hsv { h: 90.0, s: 0.5, v: 1.0 });
    }
}
