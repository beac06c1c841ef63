//! Snap Demo
//!
//! This example flings a value toward the nearest snap point with a spring and
//! prints the position and a color that follows it, frame by frame.
//!
//! Run with: RUST_LOG=debug cargo run -p kinema_animation --example snap_demo

use kinema_animation::{get_snap_point, interpolate_colors, run_spring};
use kinema_core::{NodeGraph, Result, RgbColor};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let mut graph = NodeGraph::new();
    let clock = graph.clock();
    let offset = graph.value(120.0);
    let velocity = graph.value(900.0);

    let points = [0.0, 200.0, 400.0];
    let Some(snap) = get_snap_point(&mut graph, offset, velocity, &points) else {
        return Ok(());
    };
    let position = run_spring(&mut graph, clock, offset, snap);

    // Record the position once per frame so the tint reads the same sample
    let x = graph.value(0.0);
    let record = graph.set(x, position);
    let colors = [RgbColor::RED, RgbColor::GREEN, RgbColor::BLUE];
    let tint = interpolate_colors(&mut graph, x, &points, &colors)?;
    let frame = graph.block([record, tint]);

    let mut timestamp = 0.0;
    loop {
        timestamp += 16.0;
        let packed = graph.step(frame, timestamp)?;
        let color = RgbColor::from_packed(packed).unwrap_or_default();
        println!(
            "{timestamp:>6.0} ms  x = {:>8.3}  tint = #{:06x}",
            graph.get_value(x)?,
            color.to_hex()
        );

        if !graph.is_clock_running(clock)? {
            break;
        }
    }

    println!("stats: {:?}", graph.stats());
    Ok(())
}
