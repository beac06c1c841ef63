//! Per-frame evaluation
//!
//! The caller drives frames: [`NodeGraph::advance_frame`] moves every running
//! clock to the new timestamp, then nodes are evaluated on demand.
//!
//! - [`NodeGraph::evaluate`] always walks the expression.
//! - [`NodeGraph::step`] / [`NodeGraph::update`] walk a root only when a value
//!   slot reachable from it was written or a clock reachable from it is
//!   running. A finished animation therefore stays put until one of its
//!   inputs changes, and then runs again.
//!
//! Side effects (`set`, `start_clock`, `stop_clock`) run in the order they are
//! reached. Spring and timing nodes advance at most once per frame however
//! many times they are reached.

use rustc_hash::FxHashSet;

use crate::color::pack_argb;
use crate::error::{GraphError, Result};
use crate::graph::{Dependencies, NodeGraph, RootCache};
use crate::interpolate::interpolate;
use crate::node::{
    bool_to_num, truthy, Adaptable, Clock, ClockOp, NodeId, NodeKind, SpringProc, TimingProc,
    ValueNode,
};
use crate::timing::timing_step;

impl NodeGraph {
    /// Start a new frame at `timestamp_ms`
    pub fn advance_frame(&mut self, timestamp_ms: f64) {
        self.frame += 1;
        self.timestamp_ms = timestamp_ms;
        self.stepped.clear();
        for clock in self.clocks.values_mut() {
            if clock.running {
                clock.value = timestamp_ms;
            }
        }
        tracing::trace!(frame = self.frame, timestamp_ms, "advance frame");
    }

    /// Number of frames advanced so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Timestamp of the current frame in milliseconds
    pub fn timestamp_ms(&self) -> f64 {
        self.timestamp_ms
    }

    /// Evaluate an operand in the current frame
    pub fn evaluate(&mut self, operand: impl Into<Adaptable>) -> Result<f64> {
        self.eval_at(operand.into(), 0)
    }

    /// Advance to `timestamp_ms` and bring `root` up to date
    pub fn step(&mut self, root: NodeId, timestamp_ms: f64) -> Result<f64> {
        self.advance_frame(timestamp_ms);
        self.update(root)
    }

    /// Bring `root` up to date in the current frame
    ///
    /// Returns the cached result when nothing `root` depends on has changed
    /// since its last update.
    pub fn update(&mut self, root: NodeId) -> Result<f64> {
        let mut deps = match self.roots.remove(&root) {
            Some(cache) if !self.is_stale(&cache.deps) => {
                let value = cache.value;
                self.roots.insert(root, cache);
                return Ok(value);
            }
            Some(cache) => cache.deps,
            None => self.dependencies(root)?,
        };

        let value = self.eval_node(root, 0)?;

        for (id, version) in deps.values.iter_mut() {
            *version = self.versions.get(id).copied().unwrap_or(0);
        }
        self.roots.insert(root, RootCache { value, deps });
        Ok(value)
    }

    fn is_stale(&self, deps: &Dependencies) -> bool {
        let clock_running = deps
            .clocks
            .iter()
            .any(|id| self.clocks.get(*id).map_or(true, |c| c.running));
        let value_written = deps
            .values
            .iter()
            .any(|(id, version)| self.versions.get(id) != Some(version));
        clock_running || value_written
    }

    /// Every value slot and clock reachable from `root`
    fn dependencies(&self, root: NodeId) -> Result<Dependencies> {
        let mut deps = Dependencies::default();
        let mut seen = FxHashSet::default();
        let mut stack = vec![Adaptable::Node(root)];

        while let Some(operand) = stack.pop() {
            let id = match operand {
                Adaptable::Const(_) => continue,
                Adaptable::Clock(clock) => {
                    if !deps.clocks.contains(&clock.0) {
                        deps.clocks.push(clock.0);
                    }
                    continue;
                }
                Adaptable::Node(id) => id,
            };
            if !seen.insert(id) {
                continue;
            }

            match self.nodes.get(id).ok_or(GraphError::UnknownNode(id))? {
                NodeKind::Constant(_) => {}
                NodeKind::Value(_) => deps.values.push((id, 0)),
                NodeKind::Unary { input, .. }
                | NodeKind::Debug { input, .. }
                | NodeKind::Interpolate { input, .. } => stack.push(*input),
                NodeKind::Binary { lhs, rhs, .. } => stack.extend([*lhs, *rhs]),
                NodeKind::Cond {
                    test,
                    then,
                    otherwise,
                } => {
                    stack.extend([*test, *then]);
                    stack.extend(*otherwise);
                }
                NodeKind::Block(children) => stack.extend(children.iter().copied()),
                NodeKind::Set { target, source } => stack.extend([(*target).into(), *source]),
                NodeKind::Clock { clock, .. } => stack.push((*clock).into()),
                NodeKind::Color { r, g, b, a } => stack.extend([*r, *g, *b, *a]),
                NodeKind::Spring(proc) => {
                    let state = proc.state;
                    stack.extend([proc.clock.into(), proc.to_value]);
                    stack.extend(
                        [state.finished, state.velocity, state.position, state.time]
                            .map(Adaptable::from),
                    );
                }
                NodeKind::Timing(proc) => {
                    let state = proc.state;
                    stack.extend([proc.clock.into(), proc.to_value, proc.duration]);
                    stack.extend(
                        [state.finished, state.position, state.time, state.frame_time]
                            .map(Adaptable::from),
                    );
                }
            }
        }
        Ok(deps)
    }

    fn eval_at(&mut self, operand: Adaptable, depth: usize) -> Result<f64> {
        match operand {
            Adaptable::Const(v) => Ok(v),
            Adaptable::Node(id) => self.eval_node(id, depth),
            Adaptable::Clock(clock) => self.clock_value(clock),
        }
    }

    fn eval_node(&mut self, mut id: NodeId, depth: usize) -> Result<f64> {
        if depth >= self.config.max_depth {
            return Err(GraphError::DepthExceeded {
                limit: self.config.max_depth,
            });
        }
        let next = depth + 1;

        // The selected branch of a `cond` is evaluated in place, so chains of
        // nested conds run at constant depth
        loop {
            let node = self.nodes.get(id).ok_or(GraphError::UnknownNode(id))?;
            return match node {
                NodeKind::Constant(v) => Ok(*v),
                NodeKind::Value(v) => Ok(*v),
                NodeKind::Unary { op, input } => {
                    let (op, input) = (*op, *input);
                    let x = self.eval_at(input, next)?;
                    Ok(op.apply(x))
                }
                NodeKind::Binary { op, lhs, rhs } => {
                    let (op, lhs, rhs) = (*op, *lhs, *rhs);
                    let a = self.eval_at(lhs, next)?;
                    let b = self.eval_at(rhs, next)?;
                    Ok(op.apply(a, b))
                }
                NodeKind::Cond {
                    test,
                    then,
                    otherwise,
                } => {
                    let (test, then, otherwise) = (*test, *then, *otherwise);
                    let branch = if truthy(self.eval_at(test, next)?) {
                        Some(then)
                    } else {
                        otherwise
                    };
                    match branch {
                        Some(Adaptable::Node(branch)) => {
                            id = branch;
                            continue;
                        }
                        Some(branch) => self.eval_at(branch, next),
                        None => Ok(f64::NAN),
                    }
                }
                NodeKind::Block(children) => {
                    let children = children.clone();
                    let mut last = f64::NAN;
                    for child in children {
                        last = self.eval_at(child, next)?;
                    }
                    Ok(last)
                }
                NodeKind::Set { target, source } => {
                    let (target, source) = (*target, *source);
                    let v = self.eval_at(source, next)?;
                    self.write_value(target, v)?;
                    Ok(v)
                }
                NodeKind::Clock { op, clock } => {
                    let (op, clock) = (*op, *clock);
                    self.clock_op(op, clock)
                }
                NodeKind::Debug { input, .. } => {
                    let input = *input;
                    let v = self.eval_at(input, next)?;
                    if let Some(NodeKind::Debug { label, .. }) = self.nodes.get(id) {
                        tracing::debug!(target: "kinema::debug", "{}: {}", label, v);
                    }
                    Ok(v)
                }
                NodeKind::Interpolate { input, .. } => {
                    let input = *input;
                    let x = self.eval_at(input, next)?;
                    match self.nodes.get(id) {
                        Some(NodeKind::Interpolate {
                            input_range,
                            output_range,
                            extrapolate_left,
                            extrapolate_right,
                            ..
                        }) => Ok(interpolate(
                            x,
                            input_range,
                            output_range,
                            *extrapolate_left,
                            *extrapolate_right,
                        )),
                        _ => Err(GraphError::UnknownNode(id)),
                    }
                }
                NodeKind::Color { r, g, b, a } => {
                    let (r, g, b, a) = (*r, *g, *b, *a);
                    let r = self.eval_at(r, next)?;
                    let g = self.eval_at(g, next)?;
                    let b = self.eval_at(b, next)?;
                    let a = self.eval_at(a, next)?;
                    Ok(pack_argb(r, g, b, a))
                }
                NodeKind::Spring(proc) => {
                    let proc = **proc;
                    self.step_spring(id, proc, next)
                }
                NodeKind::Timing(proc) => {
                    let proc = **proc;
                    self.step_timing(id, proc, next)
                }
            };
        }
    }

    fn clock_value(&self, clock: Clock) -> Result<f64> {
        self.clocks
            .get(clock.0)
            .map(|c| c.value)
            .ok_or(GraphError::UnknownClock(clock))
    }

    fn clock_op(&mut self, op: ClockOp, clock: Clock) -> Result<f64> {
        let now = self.timestamp_ms;
        let state = self
            .clocks
            .get_mut(clock.0)
            .ok_or(GraphError::UnknownClock(clock))?;

        match op {
            ClockOp::Running => Ok(bool_to_num(state.running)),
            ClockOp::Start => {
                if !state.running {
                    state.running = true;
                    state.value = now;
                    tracing::debug!(clock = ?clock.0, timestamp_ms = now, "start clock");
                }
                Ok(0.0)
            }
            ClockOp::Stop => {
                if state.running {
                    state.running = false;
                    tracing::debug!(clock = ?clock.0, timestamp_ms = now, "stop clock");
                }
                Ok(0.0)
            }
        }
    }

    /// Milliseconds since the integrator last ran; 0 on its first step
    fn elapsed_since(&self, time: ValueNode, now: f64) -> Result<f64> {
        let last = self.get_value(time)?;
        let last = if truthy(last) { last } else { now };
        Ok((now - last).max(0.0))
    }

    fn step_spring(&mut self, id: NodeId, proc: SpringProc, depth: usize) -> Result<f64> {
        let state = proc.state;
        if !self.stepped.insert(id) {
            return self.get_value(state.position);
        }

        let now = self.clock_value(proc.clock)?;
        let to_value = self.eval_at(proc.to_value, depth)?;
        let position = self.get_value(state.position)?;
        let velocity = self.get_value(state.velocity)?;
        let dt_ms = self
            .elapsed_since(state.time, now)?
            .min(self.config.max_delta_ms);

        let step = proc.config.step(position, velocity, to_value, dt_ms / 1000.0);

        self.write_value(state.position, step.position)?;
        self.write_value(state.velocity, step.velocity)?;
        self.write_value(state.time, now)?;
        if step.finished {
            self.write_value(state.finished, 1.0)?;
        }
        Ok(step.position)
    }

    fn step_timing(&mut self, id: NodeId, proc: TimingProc, depth: usize) -> Result<f64> {
        let state = proc.state;
        if !self.stepped.insert(id) {
            return self.get_value(state.position);
        }

        let now = self.clock_value(proc.clock)?;
        let to_value = self.eval_at(proc.to_value, depth)?;
        let duration = self.eval_at(proc.duration, depth)?;
        let position = self.get_value(state.position)?;
        let frame_time = self.get_value(state.frame_time)?;
        let elapsed = self.elapsed_since(state.time, now)?;

        let step = timing_step(
            proc.easing,
            position,
            frame_time,
            elapsed,
            to_value,
            duration,
        );

        self.write_value(state.position, step.position)?;
        self.write_value(state.frame_time, step.frame_time)?;
        self.write_value(state.time, now)?;
        if step.finished {
            self.write_value(state.finished, 1.0)?;
        }
        Ok(step.position)
    }
}
