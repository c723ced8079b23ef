#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Grid Sweepers.
//!
//! The world owns every entity by stable id, executes [`Command`] values
//! through [`apply`], and broadcasts [`Event`] values describing what
//! actually happened. Robots are processed in ascending id order so replays
//! of the same command script always produce the same event log.

use std::collections::VecDeque;

use grid_sweepers_core::{
    Battery, CellCoord, ChargePolicy, Command, Event, PlacementError, PlacementKind,
    RecentTargets, RobotCondition, RobotId, RouteError, StationCondition, StationId, TargetMode,
    TileCondition, WELCOME_BANNER,
};

mod scatter;

/// Represents the authoritative Grid Sweepers world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    columns: u32,
    rows: u32,
    ground: Vec<GroundCell>,
    blocked: Vec<bool>,
    stations: Vec<Station>,
    robots: Vec<Robot>,
    charge_policy: ChargePolicy,
    tick_index: u64,
    next_station_id: u32,
    next_robot_id: u32,
}

impl World {
    /// Creates an empty world awaiting a [`Command::ConfigureGrid`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            banner: WELCOME_BANNER,
            columns: 0,
            rows: 0,
            ground: Vec::new(),
            blocked: Vec::new(),
            stations: Vec::new(),
            robots: Vec::new(),
            charge_policy: ChargePolicy::default(),
            tick_index: 0,
            next_station_id: 0,
            next_robot_id: 0,
        }
    }

    fn configure_grid(&mut self, columns: u32, rows: u32) {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        self.columns = columns;
        self.rows = rows;
        self.ground = vec![GroundCell::Floor(TileCondition::Cleaned); capacity];
        self.blocked = vec![false; capacity];
        self.stations.clear();
        self.robots.clear();
        self.tick_index = 0;
        self.next_station_id = 0;
        self.next_robot_id = 0;
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() >= self.columns || cell.row() >= self.rows {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        Some(row * width + column)
    }

    #[cfg(test)]
    fn robot_mut(&mut self, robot: RobotId) -> Option<&mut Robot> {
        self.robots.iter_mut().find(|candidate| candidate.id == robot)
    }

    fn robot_occupies(&self, cell: CellCoord) -> bool {
        self.robots.iter().any(|robot| robot.cell == cell)
    }

    fn refresh_station_markers(&mut self) {
        for index in 0..self.stations.len() {
            let cell = self.stations[index].cell;
            let occupied = self.robots.iter().any(|robot| robot.cell == cell);
            self.stations[index].condition = if occupied {
                StationCondition::InUse
            } else {
                StationCondition::NotInUse
            };
        }
    }

    pub(crate) fn place_dirt(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) -> bool {
        let Some(index) = self.index(cell) else {
            out_events.push(Event::PlacementRejected {
                kind: PlacementKind::Dirt,
                cell,
                reason: PlacementError::OutOfBounds,
            });
            return false;
        };

        match self.ground[index] {
            GroundCell::Floor(_) => {
                self.ground[index] = GroundCell::Floor(TileCondition::Dirty);
                out_events.push(Event::DirtPlaced { cell });
                true
            }
            GroundCell::Station(_) | GroundCell::Obstacle => {
                out_events.push(Event::PlacementRejected {
                    kind: PlacementKind::Dirt,
                    cell,
                    reason: PlacementError::Occupied,
                });
                false
            }
        }
    }

    pub(crate) fn place_obstacle(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) -> bool {
        let Some(index) = self.index(cell) else {
            out_events.push(Event::PlacementRejected {
                kind: PlacementKind::Obstacle,
                cell,
                reason: PlacementError::OutOfBounds,
            });
            return false;
        };

        let vacant = matches!(self.ground[index], GroundCell::Floor(TileCondition::Cleaned))
            && !self.robot_occupies(cell);
        if !vacant {
            out_events.push(Event::PlacementRejected {
                kind: PlacementKind::Obstacle,
                cell,
                reason: PlacementError::Occupied,
            });
            return false;
        }

        self.ground[index] = GroundCell::Obstacle;
        self.blocked[index] = true;
        out_events.push(Event::ObstaclePlaced { cell });
        true
    }

    pub(crate) fn place_station(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) -> bool {
        let Some(index) = self.index(cell) else {
            out_events.push(Event::PlacementRejected {
                kind: PlacementKind::Station,
                cell,
                reason: PlacementError::OutOfBounds,
            });
            return false;
        };

        let vacant = matches!(self.ground[index], GroundCell::Floor(TileCondition::Cleaned))
            && !self.robot_occupies(cell);
        if !vacant {
            out_events.push(Event::PlacementRejected {
                kind: PlacementKind::Station,
                cell,
                reason: PlacementError::Occupied,
            });
            return false;
        }

        let station = StationId::new(self.next_station_id);
        self.next_station_id += 1;
        self.ground[index] = GroundCell::Station(station);
        self.stations.push(Station {
            id: station,
            cell,
            condition: StationCondition::NotInUse,
        });
        out_events.push(Event::StationPlaced { station, cell });
        true
    }

    pub(crate) fn spawn_robot(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) -> bool {
        let Some(index) = self.index(cell) else {
            out_events.push(Event::PlacementRejected {
                kind: PlacementKind::Robot,
                cell,
                reason: PlacementError::OutOfBounds,
            });
            return false;
        };

        let passable = !matches!(self.ground[index], GroundCell::Obstacle);
        if !passable || self.robot_occupies(cell) {
            out_events.push(Event::PlacementRejected {
                kind: PlacementKind::Robot,
                cell,
                reason: PlacementError::Occupied,
            });
            return false;
        }

        let robot = RobotId::new(self.next_robot_id);
        self.next_robot_id += 1;
        self.robots.push(Robot::spawned_at(robot, cell));
        self.refresh_station_markers();
        out_events.push(Event::RobotSpawned { robot, cell });
        true
    }

    fn route_ends_at_station(&self, robot_index: usize) -> bool {
        let Some(goal) = self.robots[robot_index].route.back().copied() else {
            return false;
        };
        self.index(goal)
            .map_or(false, |index| matches!(self.ground[index], GroundCell::Station(_)))
    }

    /// Runs one robot's clean/charge/retarget controller for the tick.
    ///
    /// Ordering matches the control loop contract: cell inspection first,
    /// then the low-battery override, then the empty-route fallback. A
    /// charging robot below full charge is stationary and skips both
    /// retarget checks.
    fn run_robot_controller(&mut self, robot_index: usize, out_events: &mut Vec<Event>) {
        if self.robots[robot_index].condition.is_terminal() {
            return;
        }

        let cell = self.robots[robot_index].cell;
        if let Some(index) = self.index(cell) {
            match self.ground[index] {
                GroundCell::Floor(TileCondition::Dirty) => {
                    self.ground[index] = GroundCell::Floor(TileCondition::Cleaned);
                    let robot = &mut self.robots[robot_index];
                    robot.condition = RobotCondition::Exploring;
                    out_events.push(Event::TileCleaned {
                        robot: robot.id,
                        cell,
                    });
                }
                GroundCell::Station(_) => {
                    let policy = self.charge_policy;
                    let robot = &mut self.robots[robot_index];
                    if !robot.battery.is_full() {
                        robot.condition = RobotCondition::Charging;
                        let amount = match policy {
                            ChargePolicy::Trickle { amount } => amount,
                            ChargePolicy::Instant => Battery::FULL,
                        };
                        robot.battery.charge(amount);
                        out_events.push(Event::RobotCharging {
                            robot: robot.id,
                            level: robot.battery.level(),
                        });
                        if robot.battery.is_full() {
                            robot.condition = RobotCondition::Exploring;
                            out_events.push(Event::RobotRecharged { robot: robot.id });
                        }
                    }
                }
                GroundCell::Floor(TileCondition::Cleaned) | GroundCell::Obstacle => {}
            }
        }

        if self.robots[robot_index].condition == RobotCondition::Charging {
            return;
        }

        if self.robots[robot_index].battery.is_low() && !self.route_ends_at_station(robot_index) {
            let robot = &mut self.robots[robot_index];
            robot.route.clear();
            out_events.push(Event::TargetNeeded {
                robot: robot.id,
                mode: TargetMode::Charging,
            });
        } else if self.robots[robot_index].route.is_empty() {
            out_events.push(Event::TargetNeeded {
                robot: self.robots[robot_index].id,
                mode: TargetMode::Cleaning,
            });
        }
    }

    fn assign_route(
        &mut self,
        robot: RobotId,
        mode: TargetMode,
        target: CellCoord,
        path: Vec<CellCoord>,
        out_events: &mut Vec<Event>,
    ) {
        let Some(robot_index) = self.robots.iter().position(|candidate| candidate.id == robot)
        else {
            out_events.push(Event::RouteRejected {
                robot,
                reason: RouteError::UnknownRobot,
            });
            return;
        };

        let Some(first) = path.first().copied() else {
            out_events.push(Event::RouteRejected {
                robot,
                reason: RouteError::EmptyRoute,
            });
            return;
        };

        if !self.robots[robot_index].cell.is_adjacent_to(first) {
            out_events.push(Event::RouteRejected {
                robot,
                reason: RouteError::DetachedRoute,
            });
            return;
        }

        let traversable = path.iter().all(|cell| {
            self.index(*cell)
                .map_or(false, |index| !matches!(self.ground[index], GroundCell::Obstacle))
        });
        if !traversable {
            out_events.push(Event::RouteRejected {
                robot,
                reason: RouteError::BlockedRoute,
            });
            return;
        }

        let length = path.len();
        let state = &mut self.robots[robot_index];
        state.route = path.into();
        state.recent_targets.push(target);
        out_events.push(Event::RouteAssigned {
            robot,
            mode,
            target,
            length,
        });
    }

    /// Executes one step of the robot's stored route.
    ///
    /// Battery drains by exactly one unit per executed move. Depletion is
    /// terminal and takes precedence over the idle transition.
    fn execute_step(&mut self, robot: RobotId, out_events: &mut Vec<Event>) {
        let Some(robot_index) = self.robots.iter().position(|candidate| candidate.id == robot)
        else {
            return;
        };

        {
            let state = &self.robots[robot_index];
            if state.condition.is_terminal() {
                return;
            }
            if state.condition == RobotCondition::Charging && !state.battery.is_full() {
                return;
            }
        }

        let Some(next) = self.robots[robot_index].route.pop_front() else {
            out_events.push(Event::TargetNeeded {
                robot,
                mode: TargetMode::Cleaning,
            });
            return;
        };

        let from = self.robots[robot_index].cell;
        let enterable = from.is_adjacent_to(next)
            && self.index(next).map_or(false, |index| {
                !matches!(self.ground[index], GroundCell::Obstacle)
            });
        if !enterable {
            let state = &mut self.robots[robot_index];
            state.route.clear();
            out_events.push(Event::TargetNeeded {
                robot,
                mode: TargetMode::Cleaning,
            });
            return;
        }

        let state = &mut self.robots[robot_index];
        state.cell = next;
        state.move_count += 1;
        state.battery.drain_step();
        out_events.push(Event::RobotMoved {
            robot,
            from,
            to: next,
        });

        if state.battery.is_empty() {
            state.condition = RobotCondition::OutOfBattery;
            state.route.clear();
            out_events.push(Event::RobotDepleted { robot });
        } else if state.route.is_empty() {
            state.condition = RobotCondition::Idle;
            state.recent_targets.clear();
            out_events.push(Event::RobotIdled { robot });
        }

        self.refresh_station_markers();
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureGrid { columns, rows } => {
            world.configure_grid(columns, rows);
            out_events.push(Event::GridConfigured { columns, rows });
        }
        Command::SetChargePolicy { policy } => {
            world.charge_policy = policy;
            out_events.push(Event::ChargePolicyChanged { policy });
        }
        Command::Populate { scatter: config } => {
            scatter::populate(world, config, out_events);
        }
        Command::PlaceDirt { cell } => {
            let _ = world.place_dirt(cell, out_events);
        }
        Command::PlaceObstacle { cell } => {
            let _ = world.place_obstacle(cell, out_events);
        }
        Command::PlaceStation { cell } => {
            let _ = world.place_station(cell, out_events);
        }
        Command::SpawnRobot { cell } => {
            let _ = world.spawn_robot(cell, out_events);
        }
        Command::Tick => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced {
                tick: world.tick_index,
            });
            for robot_index in 0..world.robots.len() {
                world.run_robot_controller(robot_index, out_events);
            }
        }
        Command::AssignRoute {
            robot,
            mode,
            target,
            path,
        } => {
            world.assign_route(robot, mode, target, path, out_events);
        }
        Command::Step { robot } => {
            world.execute_step(robot, out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{GroundCell, World};
    use grid_sweepers_core::{
        CellCoord, CellEntity, ChargePolicy, RobotSnapshot, RobotView, TerrainView, TileCondition,
    };

    /// Retrieves the welcome banner that adapters may display to users.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides the configured grid dimensions as `(columns, rows)`.
    #[must_use]
    pub fn dimensions(world: &World) -> (u32, u32) {
        (world.columns, world.rows)
    }

    /// Current tick index; zero before the first [`super::Command::Tick`].
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Recharge policy currently applied at charging stations.
    #[must_use]
    pub fn charge_policy(world: &World) -> ChargePolicy {
        world.charge_policy
    }

    /// Reports whether the provided cell lies outside the configured grid.
    #[must_use]
    pub fn is_out_of_bounds(world: &World, cell: CellCoord) -> bool {
        world.index(cell).is_none()
    }

    /// Reports whether the cell is a clean floor tile with no robot on it.
    #[must_use]
    pub fn is_cell_empty(world: &World, cell: CellCoord) -> bool {
        world.index(cell).map_or(false, |index| {
            matches!(world.ground[index], GroundCell::Floor(TileCondition::Cleaned))
                && !world.robot_occupies(cell)
        })
    }

    /// Enumerates every entity occupying the provided cell.
    #[must_use]
    pub fn cell_contents(world: &World, cell: CellCoord) -> Vec<CellEntity> {
        let mut contents = Vec::new();
        if let Some(index) = world.index(cell) {
            match world.ground[index] {
                GroundCell::Floor(condition) => contents.push(CellEntity::Tile(condition)),
                GroundCell::Station(station) => {
                    if let Some(found) = world
                        .stations
                        .iter()
                        .find(|candidate| candidate.id == station)
                    {
                        contents.push(CellEntity::Station(found.condition));
                    }
                }
                GroundCell::Obstacle => contents.push(CellEntity::Obstacle),
            }
            for robot in &world.robots {
                if robot.cell == cell {
                    contents.push(CellEntity::Robot(robot.id));
                }
            }
        }
        contents
    }

    /// Captures a read-only view of the robots inhabiting the grid.
    #[must_use]
    pub fn robot_view(world: &World) -> RobotView {
        let snapshots: Vec<RobotSnapshot> = world
            .robots
            .iter()
            .map(|robot| RobotSnapshot {
                id: robot.id,
                cell: robot.cell,
                condition: robot.condition,
                battery: robot.battery,
                move_count: robot.move_count,
                route_len: robot.route.len(),
                route_goal: robot.route.back().copied(),
                recent_targets: robot.recent_targets.iter().collect(),
            })
            .collect();
        RobotView::from_snapshots(snapshots)
    }

    /// Exposes a read-only view of the terrain obstacle mask.
    #[must_use]
    pub fn terrain_view(world: &World) -> TerrainView<'_> {
        TerrainView::new(&world.blocked, world.columns, world.rows)
    }

    /// Enumerates the cells currently holding dirty tiles, row-major order.
    #[must_use]
    pub fn dirty_cells(world: &World) -> Vec<CellCoord> {
        cells_matching(world, |ground| {
            matches!(ground, GroundCell::Floor(TileCondition::Dirty))
        })
    }

    /// Enumerates the cells holding charging stations, row-major order.
    #[must_use]
    pub fn station_cells(world: &World) -> Vec<CellCoord> {
        cells_matching(world, |ground| matches!(ground, GroundCell::Station(_)))
    }

    /// Enumerates the cells holding obstacles, row-major order.
    #[must_use]
    pub fn obstacle_cells(world: &World) -> Vec<CellCoord> {
        cells_matching(world, |ground| matches!(ground, GroundCell::Obstacle))
    }

    /// Counts dirty and cleaned floor tiles as `(dirty, cleaned)`.
    #[must_use]
    pub fn tile_census(world: &World) -> (u32, u32) {
        let mut dirty = 0;
        let mut cleaned = 0;
        for ground in &world.ground {
            match ground {
                GroundCell::Floor(TileCondition::Dirty) => dirty += 1,
                GroundCell::Floor(TileCondition::Cleaned) => cleaned += 1,
                GroundCell::Station(_) | GroundCell::Obstacle => {}
            }
        }
        (dirty, cleaned)
    }

    fn cells_matching<F>(world: &World, matches_ground: F) -> Vec<CellCoord>
    where
        F: Fn(&GroundCell) -> bool,
    {
        let mut cells = Vec::new();
        for row in 0..world.rows {
            for column in 0..world.columns {
                let cell = CellCoord::new(column, row);
                if let Some(index) = world.index(cell) {
                    if matches_ground(&world.ground[index]) {
                        cells.push(cell);
                    }
                }
            }
        }
        cells
    }
}

/// Ground-level occupant of a grid cell.
///
/// Every in-bounds cell holds exactly one ground entity; robots sit on top
/// of floor tiles and stations but never on obstacles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum GroundCell {
    Floor(TileCondition),
    Station(StationId),
    Obstacle,
}

#[derive(Debug)]
struct Station {
    id: StationId,
    cell: CellCoord,
    condition: StationCondition,
}

#[derive(Debug)]
struct Robot {
    id: RobotId,
    cell: CellCoord,
    condition: RobotCondition,
    battery: Battery,
    route: VecDeque<CellCoord>,
    recent_targets: RecentTargets,
    move_count: u32,
}

impl Robot {
    fn spawned_at(id: RobotId, cell: CellCoord) -> Self {
        Self {
            id,
            cell,
            condition: RobotCondition::Charged,
            battery: Battery::full(),
            route: VecDeque::new(),
            recent_targets: RecentTargets::new(),
            move_count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_sweepers_core::{CellEntity, RouteError};

    fn configured_world(columns: u32, rows: u32) -> World {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(&mut world, Command::ConfigureGrid { columns, rows }, &mut events);
        world
    }

    fn spawn_at(world: &mut World, cell: CellCoord) -> RobotId {
        let mut events = Vec::new();
        apply(world, Command::SpawnRobot { cell }, &mut events);
        match events.last() {
            Some(Event::RobotSpawned { robot, .. }) => *robot,
            other => panic!("expected RobotSpawned, got {other:?}"),
        }
    }

    fn straight_route(from: CellCoord, to_row: u32) -> Vec<CellCoord> {
        (from.row() + 1..=to_row)
            .map(|row| CellCoord::new(from.column(), row))
            .collect()
    }

    #[test]
    fn configure_grid_resets_contents() {
        let mut world = configured_world(4, 3);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceDirt {
                cell: CellCoord::new(1, 1),
            },
            &mut events,
        );
        assert_eq!(query::tile_census(&world), (1, 11));

        apply(
            &mut world,
            Command::ConfigureGrid {
                columns: 2,
                rows: 2,
            },
            &mut events,
        );
        assert_eq!(query::dimensions(&world), (2, 2));
        assert_eq!(query::tile_census(&world), (0, 4));
        assert!(query::robot_view(&world).into_vec().is_empty());
    }

    #[test]
    fn placements_reject_out_of_bounds_cells() {
        let mut world = configured_world(2, 2);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceObstacle {
                cell: CellCoord::new(5, 0),
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::PlacementRejected {
                kind: PlacementKind::Obstacle,
                cell: CellCoord::new(5, 0),
                reason: PlacementError::OutOfBounds,
            }]
        );
    }

    #[test]
    fn station_placement_rejects_dirty_floor() {
        let mut world = configured_world(3, 3);
        let mut events = Vec::new();
        let cell = CellCoord::new(1, 1);
        apply(&mut world, Command::PlaceDirt { cell }, &mut events);

        events.clear();
        apply(&mut world, Command::PlaceStation { cell }, &mut events);
        assert_eq!(
            events,
            vec![Event::PlacementRejected {
                kind: PlacementKind::Station,
                cell,
                reason: PlacementError::Occupied,
            }]
        );
    }

    #[test]
    fn spawned_robot_marks_station_in_use() {
        let mut world = configured_world(3, 3);
        let mut events = Vec::new();
        let cell = CellCoord::new(0, 0);
        apply(&mut world, Command::PlaceStation { cell }, &mut events);
        let _ = spawn_at(&mut world, cell);

        let contents = query::cell_contents(&world, cell);
        assert!(contents.contains(&CellEntity::Station(StationCondition::InUse)));
    }

    #[test]
    fn tick_cleans_dirty_tile_under_robot() {
        let mut world = configured_world(3, 3);
        let mut events = Vec::new();
        let cell = CellCoord::new(1, 1);
        apply(&mut world, Command::PlaceDirt { cell }, &mut events);
        let robot = spawn_at(&mut world, cell);

        events.clear();
        apply(&mut world, Command::Tick, &mut events);

        assert!(events.contains(&Event::TileCleaned { robot, cell }));
        assert_eq!(query::tile_census(&world), (0, 9));
        let view = query::robot_view(&world);
        assert_eq!(
            view.get(robot).expect("robot snapshot").condition,
            RobotCondition::Exploring
        );
    }

    #[test]
    fn trickle_charging_caps_at_full_and_resumes_exploring() {
        let mut world = configured_world(2, 2);
        let mut events = Vec::new();
        let cell = CellCoord::new(0, 0);
        apply(&mut world, Command::PlaceStation { cell }, &mut events);
        let robot = spawn_at(&mut world, cell);
        world.robot_mut(robot).expect("robot state").battery = Battery::new(93);

        events.clear();
        apply(&mut world, Command::Tick, &mut events);
        assert!(events.contains(&Event::RobotCharging { robot, level: 98 }));

        events.clear();
        apply(&mut world, Command::Tick, &mut events);
        assert!(events.contains(&Event::RobotCharging { robot, level: 100 }));
        assert!(events.contains(&Event::RobotRecharged { robot }));
        let view = query::robot_view(&world);
        assert_eq!(
            view.get(robot).expect("robot snapshot").condition,
            RobotCondition::Exploring
        );
    }

    #[test]
    fn instant_policy_recharges_in_one_tick() {
        let mut world = configured_world(2, 2);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SetChargePolicy {
                policy: ChargePolicy::Instant,
            },
            &mut events,
        );
        let cell = CellCoord::new(0, 0);
        apply(&mut world, Command::PlaceStation { cell }, &mut events);
        let robot = spawn_at(&mut world, cell);
        world.robot_mut(robot).expect("robot state").battery = Battery::new(12);

        events.clear();
        apply(&mut world, Command::Tick, &mut events);
        assert!(events.contains(&Event::RobotCharging { robot, level: 100 }));
        assert!(events.contains(&Event::RobotRecharged { robot }));
    }

    #[test]
    fn charging_robot_below_full_requests_no_target() {
        let mut world = configured_world(2, 2);
        let mut events = Vec::new();
        let cell = CellCoord::new(0, 0);
        apply(&mut world, Command::PlaceStation { cell }, &mut events);
        let robot = spawn_at(&mut world, cell);
        world.robot_mut(robot).expect("robot state").battery = Battery::new(10);

        events.clear();
        apply(&mut world, Command::Tick, &mut events);
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::TargetNeeded { .. })));
    }

    #[test]
    fn low_battery_discards_route_and_requests_charging_target() {
        let mut world = configured_world(5, 5);
        let mut events = Vec::new();
        let start = CellCoord::new(0, 0);
        let robot = spawn_at(&mut world, start);
        apply(
            &mut world,
            Command::PlaceDirt {
                cell: CellCoord::new(0, 3),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::AssignRoute {
                robot,
                mode: TargetMode::Cleaning,
                target: CellCoord::new(0, 3),
                path: straight_route(start, 3),
            },
            &mut events,
        );
        world.robot_mut(robot).expect("robot state").battery = Battery::new(25);

        events.clear();
        apply(&mut world, Command::Tick, &mut events);

        assert!(events.contains(&Event::TargetNeeded {
            robot,
            mode: TargetMode::Charging,
        }));
        let view = query::robot_view(&world);
        assert_eq!(view.get(robot).expect("robot snapshot").route_len, 0);
    }

    #[test]
    fn low_battery_keeps_route_that_ends_at_station() {
        let mut world = configured_world(5, 5);
        let mut events = Vec::new();
        let start = CellCoord::new(0, 0);
        let station = CellCoord::new(0, 3);
        apply(&mut world, Command::PlaceStation { cell: station }, &mut events);
        let robot = spawn_at(&mut world, start);
        apply(
            &mut world,
            Command::AssignRoute {
                robot,
                mode: TargetMode::Charging,
                target: station,
                path: straight_route(start, 3),
            },
            &mut events,
        );
        world.robot_mut(robot).expect("robot state").battery = Battery::new(25);

        events.clear();
        apply(&mut world, Command::Tick, &mut events);

        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::TargetNeeded { .. })));
        let view = query::robot_view(&world);
        assert_eq!(view.get(robot).expect("robot snapshot").route_len, 3);
    }

    #[test]
    fn route_assignment_records_recent_target() {
        let mut world = configured_world(5, 5);
        let mut events = Vec::new();
        let start = CellCoord::new(0, 0);
        let robot = spawn_at(&mut world, start);

        events.clear();
        apply(
            &mut world,
            Command::AssignRoute {
                robot,
                mode: TargetMode::Cleaning,
                target: CellCoord::new(0, 2),
                path: straight_route(start, 2),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::RouteAssigned {
                robot,
                mode: TargetMode::Cleaning,
                target: CellCoord::new(0, 2),
                length: 2,
            }]
        );
        let view = query::robot_view(&world);
        let snapshot = view.get(robot).expect("robot snapshot");
        assert_eq!(snapshot.recent_targets, vec![CellCoord::new(0, 2)]);
        assert_eq!(snapshot.route_goal, Some(CellCoord::new(0, 2)));
    }

    #[test]
    fn detached_route_is_rejected() {
        let mut world = configured_world(5, 5);
        let mut events = Vec::new();
        let robot = spawn_at(&mut world, CellCoord::new(0, 0));

        events.clear();
        apply(
            &mut world,
            Command::AssignRoute {
                robot,
                mode: TargetMode::Cleaning,
                target: CellCoord::new(3, 3),
                path: vec![CellCoord::new(3, 3)],
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::RouteRejected {
                robot,
                reason: RouteError::DetachedRoute,
            }]
        );
    }

    #[test]
    fn route_crossing_obstacle_is_rejected() {
        let mut world = configured_world(5, 5);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceObstacle {
                cell: CellCoord::new(0, 1),
            },
            &mut events,
        );
        let robot = spawn_at(&mut world, CellCoord::new(0, 0));

        events.clear();
        apply(
            &mut world,
            Command::AssignRoute {
                robot,
                mode: TargetMode::Cleaning,
                target: CellCoord::new(0, 2),
                path: straight_route(CellCoord::new(0, 0), 2),
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::RouteRejected {
                robot,
                reason: RouteError::BlockedRoute,
            }]
        );
    }

    #[test]
    fn step_moves_robot_and_drains_one_unit() {
        let mut world = configured_world(5, 5);
        let mut events = Vec::new();
        let start = CellCoord::new(0, 0);
        let robot = spawn_at(&mut world, start);
        apply(
            &mut world,
            Command::AssignRoute {
                robot,
                mode: TargetMode::Cleaning,
                target: CellCoord::new(0, 2),
                path: straight_route(start, 2),
            },
            &mut events,
        );

        events.clear();
        apply(&mut world, Command::Step { robot }, &mut events);

        assert!(events.contains(&Event::RobotMoved {
            robot,
            from: start,
            to: CellCoord::new(0, 1),
        }));
        let view = query::robot_view(&world);
        let snapshot = view.get(robot).expect("robot snapshot");
        assert_eq!(snapshot.cell, CellCoord::new(0, 1));
        assert_eq!(snapshot.battery.level(), 99);
        assert_eq!(snapshot.move_count, 1);
    }

    #[test]
    fn exhausted_route_yields_idle_and_clears_recent_targets() {
        let mut world = configured_world(5, 5);
        let mut events = Vec::new();
        let start = CellCoord::new(0, 0);
        let robot = spawn_at(&mut world, start);
        apply(
            &mut world,
            Command::AssignRoute {
                robot,
                mode: TargetMode::Cleaning,
                target: CellCoord::new(0, 1),
                path: vec![CellCoord::new(0, 1)],
            },
            &mut events,
        );

        events.clear();
        apply(&mut world, Command::Step { robot }, &mut events);

        assert!(events.contains(&Event::RobotIdled { robot }));
        let view = query::robot_view(&world);
        let snapshot = view.get(robot).expect("robot snapshot");
        assert_eq!(snapshot.condition, RobotCondition::Idle);
        assert!(snapshot.recent_targets.is_empty());
    }

    #[test]
    fn depletion_is_terminal_and_outranks_idle() {
        let mut world = configured_world(5, 5);
        let mut events = Vec::new();
        let start = CellCoord::new(0, 0);
        let robot = spawn_at(&mut world, start);
        apply(
            &mut world,
            Command::AssignRoute {
                robot,
                mode: TargetMode::Cleaning,
                target: CellCoord::new(0, 1),
                path: vec![CellCoord::new(0, 1)],
            },
            &mut events,
        );
        world.robot_mut(robot).expect("robot state").battery = Battery::new(1);

        events.clear();
        apply(&mut world, Command::Step { robot }, &mut events);

        assert!(events.contains(&Event::RobotDepleted { robot }));
        assert!(!events.contains(&Event::RobotIdled { robot }));
        let view = query::robot_view(&world);
        assert_eq!(
            view.get(robot).expect("robot snapshot").condition,
            RobotCondition::OutOfBattery
        );

        events.clear();
        apply(&mut world, Command::Tick, &mut events);
        apply(&mut world, Command::Step { robot }, &mut events);
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::TargetNeeded { .. } | Event::RobotMoved { .. })));
    }

    #[test]
    fn step_without_route_requests_cleaning_target() {
        let mut world = configured_world(3, 3);
        let mut events = Vec::new();
        let robot = spawn_at(&mut world, CellCoord::new(0, 0));

        events.clear();
        apply(&mut world, Command::Step { robot }, &mut events);
        assert_eq!(
            events,
            vec![Event::TargetNeeded {
                robot,
                mode: TargetMode::Cleaning,
            }]
        );
    }

    #[test]
    fn charging_robot_ignores_step_commands() {
        let mut world = configured_world(3, 3);
        let mut events = Vec::new();
        let cell = CellCoord::new(0, 0);
        apply(&mut world, Command::PlaceStation { cell }, &mut events);
        let robot = spawn_at(&mut world, cell);
        {
            let state = world.robot_mut(robot).expect("robot state");
            state.battery = Battery::new(50);
            state.condition = RobotCondition::Charging;
            state.route = vec![CellCoord::new(0, 1)].into();
        }

        events.clear();
        apply(&mut world, Command::Step { robot }, &mut events);
        assert!(events.is_empty());
        let view = query::robot_view(&world);
        assert_eq!(view.get(robot).expect("robot snapshot").cell, cell);
    }

    #[test]
    fn idle_robot_requests_cleaning_target_on_tick() {
        let mut world = configured_world(3, 3);
        let mut events = Vec::new();
        let robot = spawn_at(&mut world, CellCoord::new(1, 1));

        events.clear();
        apply(&mut world, Command::Tick, &mut events);
        assert!(events.contains(&Event::TargetNeeded {
            robot,
            mode: TargetMode::Cleaning,
        }));
    }
}
