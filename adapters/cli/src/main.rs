#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs the Grid Sweepers simulation.
//!
//! Each frame pumps the command/event cycle once: the world advances a
//! tick, the target selector answers `TargetNeeded` events with routes,
//! the movement system proposes steps, and analytics publishes the
//! cleaning report the runner uses for its stop conditions.

use anyhow::{bail, Result};
use clap::Parser;
use grid_sweepers_core::{CellCoord, CellEntity, ChargePolicy, Command, Event, TileCondition};
use grid_sweepers_system_analytics::Analytics;
use grid_sweepers_system_bootstrap::{Bootstrap, Scenario};
use grid_sweepers_system_movement::Movement;
use grid_sweepers_system_targeting::Targeting;
use grid_sweepers_world::{self as world, query, World};

/// Command-line arguments selecting the scenario to simulate.
#[derive(Debug, Parser)]
#[command(
    name = "grid-sweepers",
    about = "Battery-constrained cleaning robots on a grid."
)]
struct Args {
    /// Number of grid columns.
    #[arg(long, default_value_t = 15)]
    columns: u32,

    /// Number of grid rows.
    #[arg(long, default_value_t = 15)]
    rows: u32,

    /// Percent chance of each floor cell starting dirty.
    #[arg(long, default_value_t = 20)]
    dirt_density: u8,

    /// Number of robots to spawn.
    #[arg(long, default_value_t = 5)]
    robots: u32,

    /// Number of charging stations to place.
    #[arg(long, default_value_t = 5)]
    stations: u32,

    /// Number of obstacles to place.
    #[arg(long, default_value_t = 5)]
    obstacles: u32,

    /// RNG seed for world population; drawn randomly (and printed) if absent.
    #[arg(long)]
    seed: Option<u64>,

    /// Tick budget before the run stops regardless of progress.
    #[arg(long, default_value_t = 300)]
    max_ticks: u64,

    /// Recharge to full in a single tick instead of trickle charging.
    #[arg(long)]
    instant_charge: bool,

    /// Suppress the per-tick grid rendering.
    #[arg(long)]
    quiet: bool,
}

impl Args {
    fn to_scenario(&self) -> Scenario {
        Scenario {
            columns: self.columns,
            rows: self.rows,
            dirt_density_pct: self.dirt_density,
            robots: self.robots,
            stations: self.stations,
            obstacles: self.obstacles,
            seed: self.seed.unwrap_or_else(rand::random),
            charge_policy: if self.instant_charge {
                ChargePolicy::Instant
            } else {
                ChargePolicy::default()
            },
            max_ticks: self.max_ticks,
        }
    }
}

/// Entry point for the Grid Sweepers command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    if args.columns == 0 || args.rows == 0 {
        bail!("the grid needs at least one cell");
    }
    if args.dirt_density > 100 {
        bail!("dirt density is a percentage and cannot exceed 100");
    }
    run(&args.to_scenario(), args.quiet)
}

fn run(scenario: &Scenario, quiet: bool) -> Result<()> {
    let mut world = World::new();
    let bootstrap = Bootstrap::default();
    println!("{}", bootstrap.welcome_banner(&world));
    println!("seed: {}", scenario.seed);

    let mut events = Vec::new();
    for command in bootstrap.initial_commands(scenario) {
        world::apply(&mut world, command, &mut events);
    }

    let mut targeting = Targeting::new();
    let mut movement = Movement::new();
    let mut analytics = Analytics::new();

    let mut ticks_run = 0;
    for _ in 0..scenario.max_ticks {
        let _ = run_tick(
            &mut world,
            &mut targeting,
            &mut movement,
            &mut analytics,
        );
        ticks_run += 1;

        if !quiet {
            if let Some(report) = analytics.last_report() {
                println!(
                    "tick {:>4}  dirty {:>3}  cleaned {:>5.1}%",
                    report.tick,
                    report.dirty,
                    report.cleaned_pct()
                );
            }
            render(&world);
        }

        let spotless = analytics
            .last_report()
            .map_or(false, |report| report.is_spotless());
        if spotless || all_robots_stopped(&world) {
            break;
        }
    }

    print_summary(&analytics, ticks_run);
    Ok(())
}

/// Pumps one full frame and returns every event raised during it.
fn run_tick(
    world: &mut World,
    targeting: &mut Targeting,
    movement: &mut Movement,
    analytics: &mut Analytics,
) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::Tick, &mut events);

    let mut route_commands = Vec::new();
    {
        let robots = query::robot_view(world);
        let terrain = query::terrain_view(world);
        let dirty = query::dirty_cells(world);
        let stations = query::station_cells(world);
        targeting.handle(&events, &robots, terrain, &dirty, &stations, &mut route_commands);
    }
    for command in route_commands {
        world::apply(world, command, &mut events);
    }

    let mut step_commands = Vec::new();
    {
        let robots = query::robot_view(world);
        movement.handle(&events, &robots, &mut step_commands);
    }
    for command in step_commands {
        world::apply(world, command, &mut events);
    }

    let census = query::tile_census(world);
    let robots = query::robot_view(world);
    let mut published = Vec::new();
    analytics.handle(&events, census, &robots, &mut published);
    events.append(&mut published);
    events
}

fn all_robots_stopped(world: &World) -> bool {
    query::robot_view(world)
        .iter()
        .all(|snapshot| snapshot.condition.is_terminal())
}

fn render(world: &World) {
    let (columns, rows) = query::dimensions(world);
    let mut canvas = String::new();
    for row in 0..rows {
        for column in 0..columns {
            canvas.push(glyph_for(world, CellCoord::new(column, row)));
        }
        canvas.push('\n');
    }
    print!("{canvas}");
}

fn glyph_for(world: &World, cell: CellCoord) -> char {
    let contents = query::cell_contents(world, cell);
    if contents
        .iter()
        .any(|entity| matches!(entity, CellEntity::Robot(_)))
    {
        return 'R';
    }
    match contents.first() {
        Some(CellEntity::Obstacle) => '#',
        Some(CellEntity::Station(_)) => 'C',
        Some(CellEntity::Tile(TileCondition::Dirty)) => '*',
        _ => '.',
    }
}

fn print_summary(analytics: &Analytics, ticks_run: u64) {
    let Some(report) = analytics.last_report() else {
        println!("no ticks were simulated");
        return;
    };
    println!("finished after {ticks_run} ticks");
    println!(
        "cleaned {:.1}% of tiles ({} still dirty)",
        report.cleaned_pct(),
        report.dirty
    );
    for (robot, moves) in &report.robot_moves {
        println!("robot {} moved {} cells", robot.get(), moves);
    }
}
