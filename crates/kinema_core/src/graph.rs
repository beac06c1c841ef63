//! The node graph arena and its builder API
//!
//! `NodeGraph` owns every node, value slot and clock. Builders never fail
//! except where ranges are validated; they only append nodes. Evaluation
//! lives in [`crate::eval`].

use rustc_hash::FxHashMap;
use rustc_hash::FxHashSet;
use slotmap::SlotMap;
use smallvec::SmallVec;

use crate::config::EvalConfig;
use crate::error::{GraphError, Result};
use crate::interpolate::InterpolateConfig;
use crate::node::{
    Adaptable, BinaryOp, Clock, ClockId, ClockOp, NodeId, NodeKind, SpringProc, TimingProc,
    UnaryOp, ValueNode,
};
use crate::spring::{SpringConfig, SpringState};
use crate::timing::{TimingConfig, TimingState};

/// Internal clock storage
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct ClockState {
    pub running: bool,
    /// Timestamp of the last frame the clock ran in
    pub value: f64,
}

/// Value slots and clocks reachable from a root
#[derive(Clone, Debug, Default)]
pub(crate) struct Dependencies {
    /// Slot and its write version at the last evaluation
    pub values: SmallVec<[(NodeId, u64); 8]>,
    pub clocks: SmallVec<[ClockId; 2]>,
}

/// Last result of a root evaluated through [`NodeGraph::step`]
#[derive(Clone, Debug)]
pub(crate) struct RootCache {
    pub value: f64,
    pub deps: Dependencies,
}

/// Arena of expression nodes, value slots and clocks
pub struct NodeGraph {
    pub(crate) nodes: SlotMap<NodeId, NodeKind>,
    pub(crate) clocks: SlotMap<ClockId, ClockState>,
    /// Write counter per value slot, for change detection
    pub(crate) versions: FxHashMap<NodeId, u64>,
    /// Integrator nodes already advanced in the current frame
    pub(crate) stepped: FxHashSet<NodeId>,
    pub(crate) roots: FxHashMap<NodeId, RootCache>,
    pub(crate) frame: u64,
    pub(crate) timestamp_ms: f64,
    pub(crate) config: EvalConfig,
}

impl NodeGraph {
    /// Create an empty graph with the default configuration
    pub fn new() -> Self {
        Self::with_config(EvalConfig::default())
    }

    pub fn with_config(config: EvalConfig) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            clocks: SlotMap::with_key(),
            versions: FxHashMap::default(),
            stepped: FxHashSet::default(),
            roots: FxHashMap::default(),
            frame: 0,
            timestamp_ms: 0.0,
            config,
        }
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    fn insert(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.insert(kind)
    }

    // =========================================================================
    // LEAVES
    // =========================================================================

    pub fn constant(&mut self, value: f64) -> NodeId {
        self.insert(NodeKind::Constant(value))
    }

    /// Create a mutable value slot
    pub fn value(&mut self, initial: f64) -> ValueNode {
        let id = self.insert(NodeKind::Value(initial));
        self.versions.insert(id, 0);
        ValueNode(id)
    }

    /// Create a value slot that has never been written (evaluates to NaN)
    pub fn undefined(&mut self) -> ValueNode {
        self.value(f64::NAN)
    }

    /// Create a stopped clock
    pub fn clock(&mut self) -> Clock {
        Clock(self.clocks.insert(ClockState {
            running: false,
            value: self.timestamp_ms,
        }))
    }

    // =========================================================================
    // ARITHMETIC
    // =========================================================================

    fn unary(&mut self, op: UnaryOp, input: impl Into<Adaptable>) -> NodeId {
        self.insert(NodeKind::Unary {
            op,
            input: input.into(),
        })
    }

    fn binary(
        &mut self,
        op: BinaryOp,
        lhs: impl Into<Adaptable>,
        rhs: impl Into<Adaptable>,
    ) -> NodeId {
        self.insert(NodeKind::Binary {
            op,
            lhs: lhs.into(),
            rhs: rhs.into(),
        })
    }

    pub fn add(&mut self, a: impl Into<Adaptable>, b: impl Into<Adaptable>) -> NodeId {
        self.binary(BinaryOp::Add, a, b)
    }

    pub fn sub(&mut self, a: impl Into<Adaptable>, b: impl Into<Adaptable>) -> NodeId {
        self.binary(BinaryOp::Sub, a, b)
    }

    pub fn multiply(&mut self, a: impl Into<Adaptable>, b: impl Into<Adaptable>) -> NodeId {
        self.binary(BinaryOp::Multiply, a, b)
    }

    pub fn divide(&mut self, a: impl Into<Adaptable>, b: impl Into<Adaptable>) -> NodeId {
        self.binary(BinaryOp::Divide, a, b)
    }

    pub fn pow(&mut self, a: impl Into<Adaptable>, b: impl Into<Adaptable>) -> NodeId {
        self.binary(BinaryOp::Pow, a, b)
    }

    /// Remainder with the sign of the divisor
    pub fn modulo(&mut self, a: impl Into<Adaptable>, b: impl Into<Adaptable>) -> NodeId {
        self.binary(BinaryOp::Modulo, a, b)
    }

    pub fn min(&mut self, a: impl Into<Adaptable>, b: impl Into<Adaptable>) -> NodeId {
        self.binary(BinaryOp::Min, a, b)
    }

    pub fn max(&mut self, a: impl Into<Adaptable>, b: impl Into<Adaptable>) -> NodeId {
        self.binary(BinaryOp::Max, a, b)
    }

    pub fn abs(&mut self, a: impl Into<Adaptable>) -> NodeId {
        self.unary(UnaryOp::Abs, a)
    }

    /// Round half up
    pub fn round(&mut self, a: impl Into<Adaptable>) -> NodeId {
        self.unary(UnaryOp::Round, a)
    }

    pub fn floor(&mut self, a: impl Into<Adaptable>) -> NodeId {
        self.unary(UnaryOp::Floor, a)
    }

    pub fn ceil(&mut self, a: impl Into<Adaptable>) -> NodeId {
        self.unary(UnaryOp::Ceil, a)
    }

    pub fn sqrt(&mut self, a: impl Into<Adaptable>) -> NodeId {
        self.unary(UnaryOp::Sqrt, a)
    }

    pub fn exp(&mut self, a: impl Into<Adaptable>) -> NodeId {
        self.unary(UnaryOp::Exp, a)
    }

    // =========================================================================
    // COMPARISON & LOGIC
    // =========================================================================

    pub fn eq(&mut self, a: impl Into<Adaptable>, b: impl Into<Adaptable>) -> NodeId {
        self.binary(BinaryOp::Eq, a, b)
    }

    pub fn neq(&mut self, a: impl Into<Adaptable>, b: impl Into<Adaptable>) -> NodeId {
        self.binary(BinaryOp::Neq, a, b)
    }

    pub fn less_than(&mut self, a: impl Into<Adaptable>, b: impl Into<Adaptable>) -> NodeId {
        self.binary(BinaryOp::LessThan, a, b)
    }

    pub fn less_or_eq(&mut self, a: impl Into<Adaptable>, b: impl Into<Adaptable>) -> NodeId {
        self.binary(BinaryOp::LessOrEq, a, b)
    }

    pub fn greater_than(&mut self, a: impl Into<Adaptable>, b: impl Into<Adaptable>) -> NodeId {
        self.binary(BinaryOp::GreaterThan, a, b)
    }

    pub fn greater_or_eq(&mut self, a: impl Into<Adaptable>, b: impl Into<Adaptable>) -> NodeId {
        self.binary(BinaryOp::GreaterOrEq, a, b)
    }

    pub fn and(&mut self, a: impl Into<Adaptable>, b: impl Into<Adaptable>) -> NodeId {
        self.binary(BinaryOp::And, a, b)
    }

    pub fn or(&mut self, a: impl Into<Adaptable>, b: impl Into<Adaptable>) -> NodeId {
        self.binary(BinaryOp::Or, a, b)
    }

    pub fn not(&mut self, a: impl Into<Adaptable>) -> NodeId {
        self.unary(UnaryOp::Not, a)
    }

    // =========================================================================
    // CONTROL FLOW & SIDE EFFECTS
    // =========================================================================

    /// Evaluate `then` when `test` is truthy, `otherwise` when it is not
    ///
    /// Exactly one branch is evaluated per frame.
    pub fn cond(
        &mut self,
        test: impl Into<Adaptable>,
        then: impl Into<Adaptable>,
        otherwise: impl Into<Adaptable>,
    ) -> NodeId {
        self.insert(NodeKind::Cond {
            test: test.into(),
            then: then.into(),
            otherwise: Some(otherwise.into()),
        })
    }

    /// `cond` without an else branch; a falsy test yields NaN
    pub fn when(&mut self, test: impl Into<Adaptable>, then: impl Into<Adaptable>) -> NodeId {
        self.insert(NodeKind::Cond {
            test: test.into(),
            then: then.into(),
            otherwise: None,
        })
    }

    /// Evaluate children in order, yielding the last one
    pub fn block<I>(&mut self, children: I) -> NodeId
    where
        I: IntoIterator,
        I::Item: Into<Adaptable>,
    {
        let children = children.into_iter().map(Into::into).collect();
        self.insert(NodeKind::Block(children))
    }

    /// Write `source` into `target`, yielding the written value
    pub fn set(&mut self, target: ValueNode, source: impl Into<Adaptable>) -> NodeId {
        self.insert(NodeKind::Set {
            target,
            source: source.into(),
        })
    }

    /// Log `label` and the value of `input` each time it is evaluated
    pub fn debug(&mut self, label: impl Into<String>, input: impl Into<Adaptable>) -> NodeId {
        self.insert(NodeKind::Debug {
            label: label.into(),
            input: input.into(),
        })
    }

    // =========================================================================
    // CLOCKS
    // =========================================================================

    /// 1 while the clock is running, 0 otherwise
    pub fn clock_running(&mut self, clock: Clock) -> NodeId {
        self.insert(NodeKind::Clock {
            op: ClockOp::Running,
            clock,
        })
    }

    pub fn start_clock(&mut self, clock: Clock) -> NodeId {
        self.insert(NodeKind::Clock {
            op: ClockOp::Start,
            clock,
        })
    }

    pub fn stop_clock(&mut self, clock: Clock) -> NodeId {
        self.insert(NodeKind::Clock {
            op: ClockOp::Stop,
            clock,
        })
    }

    // =========================================================================
    // COMPOSITE
    // =========================================================================

    /// Piecewise-linear mapping of `input` through `config`
    pub fn interpolate(
        &mut self,
        input: impl Into<Adaptable>,
        config: InterpolateConfig,
    ) -> Result<NodeId> {
        config.validate()?;
        Ok(self.insert(NodeKind::Interpolate {
            input: input.into(),
            input_range: config.input_range,
            output_range: config.output_range,
            extrapolate_left: config.extrapolate_left,
            extrapolate_right: config.extrapolate_right,
        }))
    }

    /// Opaque color from channels in `[0, 255]`, packed as `0xAARRGGBB`
    pub fn color(
        &mut self,
        r: impl Into<Adaptable>,
        g: impl Into<Adaptable>,
        b: impl Into<Adaptable>,
    ) -> NodeId {
        self.color_rgba(r, g, b, 1.0)
    }

    /// Color with alpha in `[0, 1]`
    pub fn color_rgba(
        &mut self,
        r: impl Into<Adaptable>,
        g: impl Into<Adaptable>,
        b: impl Into<Adaptable>,
        a: impl Into<Adaptable>,
    ) -> NodeId {
        self.insert(NodeKind::Color {
            r: r.into(),
            g: g.into(),
            b: b.into(),
            a: a.into(),
        })
    }

    /// Fresh value slots for one spring animation
    pub fn spring_state(&mut self) -> SpringState {
        SpringState {
            finished: self.value(0.0),
            velocity: self.value(0.0),
            position: self.value(0.0),
            time: self.value(0.0),
        }
    }

    /// Fresh value slots for one timing animation
    pub fn timing_state(&mut self) -> TimingState {
        TimingState {
            finished: self.value(0.0),
            position: self.value(0.0),
            time: self.value(0.0),
            frame_time: self.value(0.0),
        }
    }

    /// Spring integrator: advances `state` toward `to_value` once per frame
    /// and yields the new position
    pub fn spring(
        &mut self,
        clock: Clock,
        state: SpringState,
        to_value: impl Into<Adaptable>,
        config: SpringConfig,
    ) -> NodeId {
        self.insert(NodeKind::Spring(Box::new(SpringProc {
            clock,
            state,
            to_value: to_value.into(),
            config,
        })))
    }

    /// Timing integrator: advances `state` along `config` once per frame and
    /// yields the new position
    pub fn timing(&mut self, clock: Clock, state: TimingState, config: TimingConfig) -> NodeId {
        self.insert(NodeKind::Timing(Box::new(TimingProc {
            clock,
            state,
            to_value: config.to_value,
            duration: config.duration,
            easing: config.easing,
        })))
    }

    // =========================================================================
    // DIRECT ACCESS
    // =========================================================================

    /// Write a value slot from outside the graph (gesture input, props)
    pub fn set_value(&mut self, value: ValueNode, v: f64) -> Result<()> {
        self.write_value(value, v)
    }

    /// Read a value slot without evaluating anything
    pub fn get_value(&self, value: ValueNode) -> Result<f64> {
        match self.nodes.get(value.0) {
            Some(NodeKind::Value(v)) => Ok(*v),
            _ => Err(GraphError::UnknownNode(value.0)),
        }
    }

    pub(crate) fn write_value(&mut self, value: ValueNode, v: f64) -> Result<()> {
        match self.nodes.get_mut(value.0) {
            Some(NodeKind::Value(slot)) => {
                *slot = v;
                *self.versions.entry(value.0).or_insert(0) += 1;
                Ok(())
            }
            _ => Err(GraphError::UnknownNode(value.0)),
        }
    }

    pub fn is_clock_running(&self, clock: Clock) -> Result<bool> {
        self.clocks
            .get(clock.0)
            .map(|c| c.running)
            .ok_or(GraphError::UnknownClock(clock))
    }

    /// Check if any clock still needs frames
    pub fn has_running_clocks(&self) -> bool {
        self.clocks.values().any(|c| c.running)
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    /// Remove a node; nodes still referencing it fail to evaluate
    pub fn remove(&mut self, node: NodeId) -> bool {
        self.versions.remove(&node);
        self.roots.remove(&node);
        self.nodes.remove(node).is_some()
    }

    /// Get statistics about the graph
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            node_count: self.nodes.len(),
            value_count: self.versions.len(),
            clock_count: self.clocks.len(),
            running_clocks: self.clocks.values().filter(|c| c.running).count(),
            frame: self.frame,
        }
    }
}

impl Default for NodeGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics about the node graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphStats {
    pub node_count: usize,
    pub value_count: usize,
    pub clock_count: usize,
    pub running_clocks: usize,
    pub frame: u64,
}
