//! Transform helpers

use kinema_core::{Adaptable, NodeGraph, NodeId};

/// Scale factor to apply to a view
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleTransform {
    pub scale: NodeId,
}

/// Fake a translation along z by scaling: `perspective / (perspective − z)`
pub fn translate_z(
    graph: &mut NodeGraph,
    perspective: impl Into<Adaptable>,
    z: impl Into<Adaptable>,
) -> ScaleTransform {
    let perspective = perspective.into();
    let distance = graph.sub(perspective, z);
    ScaleTransform {
        scale: graph.divide(perspective, distance),
    }
}
