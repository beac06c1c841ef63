//! Graph error types

use thiserror::Error;

use crate::node::{Clock, NodeId};

/// Errors that can occur when building or evaluating a node graph
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    /// Handle does not belong to this graph or was removed
    #[error("unknown node: {0:?}")]
    UnknownNode(NodeId),

    /// Clock handle does not belong to this graph
    #[error("unknown clock: {0:?}")]
    UnknownClock(Clock),

    /// Expression nesting is deeper than the configured limit
    #[error("evaluation exceeded the maximum depth of {limit}")]
    DepthExceeded { limit: usize },

    /// Interpolation ranges differ in length
    #[error("input range has {inputs} stops but output range has {outputs}")]
    RangeMismatch { inputs: usize, outputs: usize },

    /// Interpolation needs at least two stops
    #[error("interpolation range needs at least two stops")]
    EmptyRange,

    /// Interpolation input stops must be non-decreasing
    #[error("interpolation input range must be non-decreasing")]
    NonMonotonicRange,
}

/// Result type for graph operations
pub type Result<T> = std::result::Result<T, GraphError>;
