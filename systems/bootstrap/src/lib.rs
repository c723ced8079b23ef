#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that prepares a Grid Sweepers scenario.

use grid_sweepers_core::{ChargePolicy, Command, ScatterConfig};
use grid_sweepers_world::{query, World};

/// Parameters describing one simulation run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Scenario {
    /// Number of grid columns.
    pub columns: u32,
    /// Number of grid rows.
    pub rows: u32,
    /// Probability (percent per cell) of seeding a dirty tile.
    pub dirt_density_pct: u8,
    /// Number of robots to spawn.
    pub robots: u32,
    /// Number of charging stations to place.
    pub stations: u32,
    /// Number of obstacles to place.
    pub obstacles: u32,
    /// Seed for the population RNG.
    pub seed: u64,
    /// Recharge behavior applied at charging stations.
    pub charge_policy: ChargePolicy,
    /// Tick budget before the run stops regardless of progress.
    pub max_ticks: u64,
}

impl Default for Scenario {
    /// Mirrors the reference model's defaults: a 15x15 grid at 20 percent
    /// dirt density with five robots, one charger each, and five obstacles.
    fn default() -> Self {
        Self {
            columns: 15,
            rows: 15,
            dirt_density_pct: 20,
            robots: 5,
            stations: 5,
            obstacles: 5,
            seed: 0,
            charge_policy: ChargePolicy::default(),
            max_ticks: 300,
        }
    }
}

/// Produces the data required to boot the simulation.
#[derive(Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Derives the banner that should be shown when the run starts.
    #[must_use]
    pub fn welcome_banner<'world>(&self, world: &'world World) -> &'world str {
        query::welcome_banner(world)
    }

    /// Translates a scenario into the command batch that builds its world.
    #[must_use]
    pub fn initial_commands(&self, scenario: &Scenario) -> Vec<Command> {
        vec![
            Command::ConfigureGrid {
                columns: scenario.columns,
                rows: scenario.rows,
            },
            Command::SetChargePolicy {
                policy: scenario.charge_policy,
            },
            Command::Populate {
                scatter: ScatterConfig {
                    dirt_density_pct: scenario.dirt_density_pct,
                    obstacles: scenario.obstacles,
                    stations: scenario.stations,
                    robots: scenario.robots,
                    seed: scenario.seed,
                },
            },
        ]
    }
}
