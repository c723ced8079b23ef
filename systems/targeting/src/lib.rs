#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that selects navigation targets for robots awaiting routes.

use grid_sweepers_core::{CellCoord, Command, Event, RobotView, TargetMode, TerrainView};
use grid_sweepers_system_pathfinding::Pathfinder;

/// Target selector that reuses the searcher and route buffers across calls.
///
/// Reacts to [`Event::TargetNeeded`] by scoring every candidate cell with an
/// A* search from the robot's position and emitting an
/// [`Command::AssignRoute`] for the closest reachable one. Candidates tie on
/// route length break by column, then row, so selection is reproducible.
#[derive(Debug, Default)]
pub struct Targeting {
    pathfinder: Pathfinder,
    scratch_route: Vec<CellCoord>,
    best_route: Vec<CellCoord>,
}

impl Targeting {
    /// Creates a new target selector with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes world events and immutable views to emit route assignments.
    ///
    /// Cleaning requests skip candidates remembered in the robot's recent
    /// targets; charging requests consider every station. A request with no
    /// reachable candidate emits nothing — the controller retries on the
    /// next tick.
    pub fn handle(
        &mut self,
        events: &[Event],
        robots: &RobotView,
        terrain: TerrainView<'_>,
        dirty_cells: &[CellCoord],
        station_cells: &[CellCoord],
        out: &mut Vec<Command>,
    ) {
        for event in events {
            let Event::TargetNeeded { robot, mode } = event else {
                continue;
            };
            let Some(snapshot) = robots.get(*robot) else {
                continue;
            };

            let candidates = match mode {
                TargetMode::Cleaning => dirty_cells,
                TargetMode::Charging => station_cells,
            };

            let mut best: Option<Candidate> = None;
            for &cell in candidates {
                if *mode == TargetMode::Cleaning && snapshot.recent_targets.contains(&cell) {
                    continue;
                }
                if !self
                    .pathfinder
                    .find_path(terrain, snapshot.cell, cell, &mut self.scratch_route)
                {
                    continue;
                }

                let candidate = Candidate {
                    cell,
                    length: self.scratch_route.len(),
                };
                let replace = match best {
                    None => true,
                    Some(existing) => candidate.precedes(existing),
                };
                if replace {
                    best = Some(candidate);
                    std::mem::swap(&mut self.best_route, &mut self.scratch_route);
                }
            }

            if let Some(choice) = best {
                out.push(Command::AssignRoute {
                    robot: *robot,
                    mode: *mode,
                    target: choice.cell,
                    path: self.best_route.clone(),
                });
            }
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Candidate {
    cell: CellCoord,
    length: usize,
}

impl Candidate {
    fn precedes(self, other: Candidate) -> bool {
        let rank = (self.length, self.cell.column(), self.cell.row());
        let other_rank = (other.length, other.cell.column(), other.cell.row());
        rank < other_rank
    }
}
