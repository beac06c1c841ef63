//! Multi-branch selection
//!
//! Every helper here folds its inputs into nested `cond` nodes from the right,
//! so the first entry in list order ends up as the outermost test.

use kinema_core::{Adaptable, NodeGraph};

use crate::math;

/// Chain of `cond` nodes from `[test1, result1, test2, result2, ..., fallback]`
///
/// The first truthy test selects its result. With an odd number of entries
/// the last one is the fallback; without one a failed chain yields NaN. A
/// single entry is returned as is and an empty list yields `None`.
pub fn match_branches(graph: &mut NodeGraph, branches: &[Adaptable]) -> Option<Adaptable> {
    let (mut acc, pairs) = match branches.len() {
        0 => return None,
        n if n % 2 == 1 => (Some(branches[n - 1]), &branches[..n - 1]),
        _ => (None, branches),
    };

    for pair in pairs.chunks_exact(2).rev() {
        let node = match acc {
            Some(otherwise) => graph.cond(pair[0], pair[1], otherwise),
            None => graph.when(pair[0], pair[1]),
        };
        acc = Some(node.into());
    }
    acc
}

/// Element of `array` at `index`, or `not_found`
///
/// A missing `not_found` becomes a fresh undefined value.
pub fn lookup<I>(
    graph: &mut NodeGraph,
    array: I,
    index: impl Into<Adaptable>,
    not_found: Option<Adaptable>,
) -> Adaptable
where
    I: IntoIterator,
    I::Item: Into<Adaptable>,
    I::IntoIter: DoubleEndedIterator + ExactSizeIterator,
{
    let index = index.into();
    let not_found = not_found.unwrap_or_else(|| graph.undefined().into());

    array
        .into_iter()
        .enumerate()
        .rev()
        .fold(not_found, |acc, (i, item)| {
            let hit = graph.eq(i as f64, index);
            graph.cond(hit, item, acc).into()
        })
}

/// Snap point nearest to where `value` would land given `velocity`
///
/// The landing point is `value + 0.2 * velocity`. Ties go to the earliest
/// point in `points`. Returns `None` when `points` is empty.
pub fn get_snap_point(
    graph: &mut NodeGraph,
    value: impl Into<Adaptable>,
    velocity: impl Into<Adaptable>,
    points: &[f64],
) -> Option<Adaptable> {
    if points.is_empty() {
        return None;
    }

    let projected = graph.multiply(0.2, velocity);
    let point = graph.add(value, projected);

    let deltas: Vec<Adaptable> = points
        .iter()
        .map(|&p| distance(graph, point.into(), p))
        .collect();
    let min_delta = math::min(graph, deltas.iter().copied())?;

    let undefined: Adaptable = graph.undefined().into();
    let snapped = points
        .iter()
        .zip(&deltas)
        .rev()
        .fold(undefined, |acc, (&p, &delta)| {
            let nearest = graph.eq(delta, min_delta);
            graph.cond(nearest, p, acc).into()
        });
    Some(snapped)
}

fn distance(graph: &mut NodeGraph, from: Adaptable, to: f64) -> Adaptable {
    let diff = graph.sub(from, to);
    graph.abs(diff).into()
}
