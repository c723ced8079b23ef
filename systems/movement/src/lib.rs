#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that proposes one route step per eligible robot per tick.
//!
//! The system proposes and the world disposes: every [`Command::Step`]
//! emitted here is re-validated by the world before a robot actually moves,
//! so a stale snapshot can never push a robot through an obstacle.

use grid_sweepers_core::{Command, Event, RobotView};

/// Movement proposer driven by the per-tick event stream.
#[derive(Debug, Default)]
pub struct Movement;

impl Movement {
    /// Creates a new movement system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Emits a [`Command::Step`] for every robot that may advance this tick.
    ///
    /// Steps are only proposed once the clock advanced, after route
    /// assignments settled. Robots without a stored route, robots charging
    /// below full, and depleted robots are skipped.
    pub fn handle(&mut self, events: &[Event], robots: &RobotView, out: &mut Vec<Command>) {
        if !events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }))
        {
            return;
        }

        for snapshot in robots.iter() {
            if snapshot.route_len == 0 {
                continue;
            }
            if !snapshot.may_step() {
                continue;
            }
            out.push(Command::Step { robot: snapshot.id });
        }
    }
}
