//! Node handles and the node tagged union
//!
//! Every expression lives in a [`NodeGraph`](crate::graph::NodeGraph) arena and is
//! referenced through a cheap, copyable handle. Formulas accept [`Adaptable`]
//! operands so the same builder works for literals and for nodes.

use slotmap::new_key_type;
use smallvec::SmallVec;

use crate::easing::Easing;
use crate::spring::{SpringConfig, SpringState};
use crate::timing::TimingState;

new_key_type! {
    /// Unique identifier for an expression node
    pub struct NodeId;
    /// Unique identifier for a clock
    pub struct ClockId;
}

/// Handle to a mutable value slot
///
/// Value nodes are the only nodes whose result changes without the graph being
/// rebuilt: `set` nodes and [`NodeGraph::set_value`](crate::graph::NodeGraph::set_value)
/// write into them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ValueNode(pub(crate) NodeId);

impl ValueNode {
    /// The node id of this value slot
    pub fn id(&self) -> NodeId {
        self.0
    }
}

/// Handle to a frame-driven clock
///
/// A clock evaluates to the current frame timestamp in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Clock(pub(crate) ClockId);

impl Clock {
    pub fn id(&self) -> ClockId {
        self.0
    }
}

/// Either a literal number or a node producing one
///
/// Clocks live in their own arena rather than among the nodes, so a clock
/// operand gets its own variant instead of a wrapper node per use.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Adaptable {
    /// Literal value
    Const(f64),
    /// Lazily evaluated node
    Node(NodeId),
    /// Current frame time of a clock
    Clock(Clock),
}

impl Adaptable {
    /// Returns the literal if this operand is a constant
    pub fn as_const(&self) -> Option<f64> {
        match self {
            Adaptable::Const(v) => Some(*v),
            _ => None,
        }
    }

    /// Check if this operand is a literal
    pub fn is_const(&self) -> bool {
        matches!(self, Adaptable::Const(_))
    }
}

impl From<f64> for Adaptable {
    fn from(value: f64) -> Self {
        Adaptable::Const(value)
    }
}

impl From<f32> for Adaptable {
    fn from(value: f32) -> Self {
        Adaptable::Const(value as f64)
    }
}

impl From<i32> for Adaptable {
    fn from(value: i32) -> Self {
        Adaptable::Const(value as f64)
    }
}

impl From<bool> for Adaptable {
    fn from(value: bool) -> Self {
        Adaptable::Const(if value { 1.0 } else { 0.0 })
    }
}

impl From<NodeId> for Adaptable {
    fn from(id: NodeId) -> Self {
        Adaptable::Node(id)
    }
}

impl From<ValueNode> for Adaptable {
    fn from(value: ValueNode) -> Self {
        Adaptable::Node(value.0)
    }
}

impl From<Clock> for Adaptable {
    fn from(clock: Clock) -> Self {
        Adaptable::Clock(clock)
    }
}

impl From<&Adaptable> for Adaptable {
    fn from(value: &Adaptable) -> Self {
        *value
    }
}

/// Single-operand operators
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Abs,
    Round,
    Floor,
    Ceil,
    Sqrt,
    Exp,
    Not,
}

impl UnaryOp {
    pub fn apply(self, x: f64) -> f64 {
        match self {
            UnaryOp::Abs => x.abs(),
            // Half-up rounding, matching JavaScript's Math.round
            UnaryOp::Round => (x + 0.5).floor(),
            UnaryOp::Floor => x.floor(),
            UnaryOp::Ceil => x.ceil(),
            UnaryOp::Sqrt => x.sqrt(),
            UnaryOp::Exp => x.exp(),
            UnaryOp::Not => bool_to_num(!truthy(x)),
        }
    }
}

/// Two-operand operators
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Multiply,
    Divide,
    Pow,
    Modulo,
    Min,
    Max,
    Eq,
    Neq,
    LessThan,
    LessOrEq,
    GreaterThan,
    GreaterOrEq,
    And,
    Or,
}

impl BinaryOp {
    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Multiply => a * b,
            BinaryOp::Divide => a / b,
            BinaryOp::Pow => a.powf(b),
            // Always takes the sign of the divisor
            BinaryOp::Modulo => ((a % b) + b) % b,
            BinaryOp::Min => a.min(b),
            BinaryOp::Max => a.max(b),
            BinaryOp::Eq => bool_to_num(a == b),
            BinaryOp::Neq => bool_to_num(a != b),
            BinaryOp::LessThan => bool_to_num(a < b),
            BinaryOp::LessOrEq => bool_to_num(a <= b),
            BinaryOp::GreaterThan => bool_to_num(a > b),
            BinaryOp::GreaterOrEq => bool_to_num(a >= b),
            BinaryOp::And => bool_to_num(truthy(a) && truthy(b)),
            BinaryOp::Or => bool_to_num(truthy(a) || truthy(b)),
        }
    }
}

/// Behavior of an interpolation outside its input range
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Extrapolate {
    /// Continue the slope of the outermost segment
    #[default]
    Extend,
    /// Hold the outermost output value
    Clamp,
    /// Return the input unchanged
    Identity,
}

/// Clock operations
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockOp {
    Running,
    Start,
    Stop,
}

/// Internal node storage
///
/// Nodes never change after construction except `Value`, whose slot is
/// written during evaluation.
#[derive(Clone, Debug)]
pub(crate) enum NodeKind {
    Constant(f64),
    Value(f64),
    Unary {
        op: UnaryOp,
        input: Adaptable,
    },
    Binary {
        op: BinaryOp,
        lhs: Adaptable,
        rhs: Adaptable,
    },
    Cond {
        test: Adaptable,
        then: Adaptable,
        otherwise: Option<Adaptable>,
    },
    Block(SmallVec<[Adaptable; 4]>),
    Set {
        target: ValueNode,
        source: Adaptable,
    },
    Clock {
        op: ClockOp,
        clock: Clock,
    },
    Debug {
        label: String,
        input: Adaptable,
    },
    Interpolate {
        input: Adaptable,
        input_range: Vec<f64>,
        output_range: Vec<f64>,
        extrapolate_left: Extrapolate,
        extrapolate_right: Extrapolate,
    },
    Color {
        r: Adaptable,
        g: Adaptable,
        b: Adaptable,
        a: Adaptable,
    },
    Spring(Box<SpringProc>),
    Timing(Box<TimingProc>),
}

/// Spring integrator node payload
#[derive(Clone, Copy, Debug)]
pub(crate) struct SpringProc {
    pub clock: Clock,
    pub state: SpringState,
    pub to_value: Adaptable,
    pub config: SpringConfig,
}

/// Timing integrator node payload
#[derive(Clone, Copy, Debug)]
pub(crate) struct TimingProc {
    pub clock: Clock,
    pub state: TimingState,
    pub to_value: Adaptable,
    pub duration: Adaptable,
    pub easing: Easing,
}

/// Truthiness of a number: anything but 0 and NaN
#[inline]
pub fn truthy(x: f64) -> bool {
    x != 0.0 && !x.is_nan()
}

#[inline]
pub(crate) fn bool_to_num(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modulo_follows_divisor_sign() {
        assert_eq!(BinaryOp::Modulo.apply(5.0, 2.0), 1.0);
        assert_eq!(BinaryOp::Modulo.apply(-1.0, 2.0), 1.0);
        assert_eq!(BinaryOp::Modulo.apply(4.5, 2.0), 0.5);
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(UnaryOp::Round.apply(127.5), 128.0);
        assert_eq!(UnaryOp::Round.apply(-0.5), 0.0);
        assert_eq!(UnaryOp::Round.apply(2.4), 2.0);
    }

    #[test]
    fn test_truthiness() {
        assert!(truthy(1.0));
        assert!(truthy(-0.001));
        assert!(!truthy(0.0));
        assert!(!truthy(f64::NAN));
        assert_eq!(UnaryOp::Not.apply(f64::NAN), 1.0);
    }

    #[test]
    fn test_adaptable_conversions() {
        assert_eq!(Adaptable::from(2), Adaptable::Const(2.0));
        assert_eq!(Adaptable::from(true), Adaptable::Const(1.0));
        assert_eq!(Adaptable::from(0.5f32).as_const(), Some(0.5));
    }
}
