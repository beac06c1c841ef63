//! Clock-driven animation loops
//!
//! Each adapter owns a fresh state record and returns a block that
//!
//! 1. resets the state and starts `clock` when the clock is idle,
//! 2. advances the integrator,
//! 3. stops `clock` once the integrator reports it finished,
//! 4. yields the current position.
//!
//! Because the reset only fires while the clock is stopped, evaluating the
//! node again after it finished restarts the animation from the then-current
//! input.

use kinema_core::{Adaptable, Clock, NodeGraph, NodeId, SpringConfig, TimingConfig, ValueNode};

/// Spring from `value` to `dest` with the default spring configuration
pub fn run_spring(
    graph: &mut NodeGraph,
    clock: Clock,
    value: impl Into<Adaptable>,
    dest: impl Into<Adaptable>,
) -> NodeId {
    run_spring_with(graph, clock, value, dest, SpringConfig::default())
}

/// Spring from `value` to `dest` with a custom configuration
///
/// The target is latched from `dest` whenever the animation (re)starts.
pub fn run_spring_with(
    graph: &mut NodeGraph,
    clock: Clock,
    value: impl Into<Adaptable>,
    dest: impl Into<Adaptable>,
    config: SpringConfig,
) -> NodeId {
    let state = graph.spring_state();
    let to_value = graph.value(0.0);

    let resets = [
        graph.set(state.finished, 0.0),
        graph.set(state.time, 0.0),
        graph.set(state.position, value),
        graph.set(state.velocity, 0.0),
        graph.set(to_value, dest),
    ];
    let integrator = graph.spring(clock, state, to_value, config);

    run_loop(graph, clock, &resets, integrator, state.finished, state.position)
}

/// Timing animation from `value` along `config`
pub fn run_timing(
    graph: &mut NodeGraph,
    clock: Clock,
    value: impl Into<Adaptable>,
    config: TimingConfig,
) -> NodeId {
    let state = graph.timing_state();

    let resets = [
        graph.set(state.finished, 0.0),
        graph.set(state.time, 0.0),
        graph.set(state.position, value),
        graph.set(state.frame_time, 0.0),
    ];
    let integrator = graph.timing(clock, state, config);

    run_loop(graph, clock, &resets, integrator, state.finished, state.position)
}

fn run_loop(
    graph: &mut NodeGraph,
    clock: Clock,
    resets: &[NodeId],
    integrator: NodeId,
    finished: ValueNode,
    position: ValueNode,
) -> NodeId {
    let start = graph.start_clock(clock);
    let restart = graph.block(resets.iter().copied().chain([start]));
    let running = graph.clock_running(clock);
    let idle_check = graph.cond(running, 0.0, restart);

    let stop = graph.stop_clock(clock);
    let stop = graph.debug("stop clock", stop);
    let finish = graph.when(finished, stop);

    graph.block([idle_check, integrator, finish, position.id()])
}
