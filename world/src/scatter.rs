//! Seeded random population of a configured grid.
//!
//! The scatter mirrors the reference model's setup order: dirty tiles first
//! by per-cell density, then stations and obstacles on shuffled open floor,
//! then robots parked on the stations they will recharge at. The RNG seed
//! arrives explicitly in the [`ScatterConfig`] so identical configs always
//! produce identical worlds.

use grid_sweepers_core::{CellCoord, Event, ScatterConfig, TileCondition};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{GroundCell, World};

pub(crate) fn populate(world: &mut World, scatter: ScatterConfig, out_events: &mut Vec<Event>) {
    let mut rng = ChaCha8Rng::seed_from_u64(scatter.seed);

    // Dirt pass walks cells in row-major order so the draw sequence is stable.
    let density = u32::from(scatter.dirt_density_pct.min(100));
    for row in 0..world.rows {
        for column in 0..world.columns {
            if rng.gen_range(0..100u32) < density {
                let _ = world.place_dirt(CellCoord::new(column, row), out_events);
            }
        }
    }

    let mut open = open_floor_cells(world);
    open.shuffle(&mut rng);
    let mut cursor = open.into_iter();

    let mut station_cells = Vec::new();
    for _ in 0..scatter.stations {
        let Some(cell) = cursor.next() else {
            break;
        };
        if world.place_station(cell, out_events) {
            station_cells.push(cell);
        }
    }

    for _ in 0..scatter.obstacles {
        let Some(cell) = cursor.next() else {
            break;
        };
        let _ = world.place_obstacle(cell, out_events);
    }

    // Robots park on chargers first; spares land on leftover open floor.
    let mut spawned = 0;
    for cell in &station_cells {
        if spawned == scatter.robots {
            break;
        }
        if world.spawn_robot(*cell, out_events) {
            spawned += 1;
        }
    }
    while spawned < scatter.robots {
        let Some(cell) = cursor.next() else {
            break;
        };
        if world.spawn_robot(cell, out_events) {
            spawned += 1;
        }
    }
}

fn open_floor_cells(world: &World) -> Vec<CellCoord> {
    let mut cells = Vec::new();
    for row in 0..world.rows {
        for column in 0..world.columns {
            let cell = CellCoord::new(column, row);
            let Some(index) = world.index(cell) else {
                continue;
            };
            if matches!(world.ground[index], GroundCell::Floor(TileCondition::Cleaned))
                && !world.robot_occupies(cell)
            {
                cells.push(cell);
            }
        }
    }
    cells
}
