#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Grid Sweepers engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the simulation boots.
pub const WELCOME_BANNER: &str = "Welcome to Grid Sweepers.";

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column.abs_diff(other.column) + self.row.abs_diff(other.row)
    }

    /// Reports whether `other` shares an edge with this cell.
    #[must_use]
    pub fn is_adjacent_to(self, other: CellCoord) -> bool {
        self.manhattan_distance(other) == 1
    }
}

/// Unique identifier assigned to a sweeper robot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RobotId(u32);

impl RobotId {
    /// Creates a new robot identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a charging station.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StationId(u32);

impl StationId {
    /// Creates a new station identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Behavioral state of a sweeper robot.
///
/// Transitions are governed by the world's tick controller: cleaning a tile
/// or finishing a recharge hands back `Exploring`, standing on a station
/// below full charge holds `Charging`, an exhausted route yields `Idle`, and
/// a drained battery ends in `OutOfBattery`, which has no outgoing
/// transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RobotCondition {
    /// Initial state of a freshly spawned robot at full battery.
    Charged,
    /// Actively pursuing or searching for a cleaning target.
    Exploring,
    /// Stationary on a charging station, battery below full.
    Charging,
    /// Route fully consumed; awaiting a fresh target.
    Idle,
    /// Battery reached zero. Terminal.
    OutOfBattery,
}

impl RobotCondition {
    /// Reports whether the robot has permanently stopped acting.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::OutOfBattery)
    }
}

/// Cleanliness of a floor tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileCondition {
    /// The tile needs cleaning and is a valid cleaning goal.
    Dirty,
    /// The tile has been cleaned (or started clean).
    Cleaned,
}

/// Occupancy marker of a charging station.
///
/// Purely informational: the world updates it to mirror occupancy but never
/// enforces it as a capacity limit, so two robots may recharge at the same
/// station.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StationCondition {
    /// No robot currently occupies the station cell.
    NotInUse,
    /// At least one robot occupies the station cell.
    InUse,
}

/// Battery charge level clamped to the inclusive range `[0, 100]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Battery(u8);

impl Battery {
    /// Maximum charge level.
    pub const FULL: u8 = 100;

    /// Level at or below which a robot diverts to a charging station.
    pub const LOW_THRESHOLD: u8 = 30;

    /// Creates a battery at the provided level, clamped to `[0, 100]`.
    #[must_use]
    pub const fn new(level: u8) -> Self {
        if level > Self::FULL {
            Self(Self::FULL)
        } else {
            Self(level)
        }
    }

    /// Creates a fully charged battery.
    #[must_use]
    pub const fn full() -> Self {
        Self(Self::FULL)
    }

    /// Current charge level.
    #[must_use]
    pub const fn level(&self) -> u8 {
        self.0
    }

    /// Drains the battery by exactly one unit, saturating at zero.
    pub fn drain_step(&mut self) {
        self.0 = self.0.saturating_sub(1);
    }

    /// Adds the provided amount of charge, saturating at [`Battery::FULL`].
    pub fn charge(&mut self, amount: u8) {
        self.0 = self.0.saturating_add(amount).min(Self::FULL);
    }

    /// Reports whether the battery holds its maximum charge.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.0 == Self::FULL
    }

    /// Reports whether the battery is completely drained.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Reports whether the charge sits at or below the low-battery threshold.
    #[must_use]
    pub const fn is_low(&self) -> bool {
        self.0 <= Self::LOW_THRESHOLD
    }
}

impl Default for Battery {
    fn default() -> Self {
        Self::full()
    }
}

/// Purpose of a target-selection request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetMode {
    /// Seek the nearest reachable dirty tile.
    Cleaning,
    /// Seek the nearest reachable charging station.
    Charging,
}

/// Recharge behavior applied while a robot stands on a charging station.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChargePolicy {
    /// Adds `amount` charge per tick, capped at full.
    Trickle {
        /// Charge gained each tick spent on the station.
        amount: u8,
    },
    /// Jumps straight to full charge on arrival.
    Instant,
}

impl ChargePolicy {
    /// Default trickle amount matching the captured reference behavior.
    pub const DEFAULT_TRICKLE: u8 = 5;
}

impl Default for ChargePolicy {
    fn default() -> Self {
        Self::Trickle {
            amount: Self::DEFAULT_TRICKLE,
        }
    }
}

/// Entity occupying a grid cell, as reported by cell-content queries.
///
/// Replaces runtime type inspection with a tagged variant: callers ask the
/// entity what it can do instead of asking what it is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellEntity {
    /// Floor tile with its cleanliness.
    Tile(TileCondition),
    /// Charging station with its occupancy marker.
    Station(StationCondition),
    /// Impassable obstacle.
    Obstacle,
    /// Sweeper robot currently occupying the cell.
    Robot(RobotId),
}

impl CellEntity {
    /// Reports whether the entity blocks traversal through its cell.
    #[must_use]
    pub const fn blocks_movement(&self) -> bool {
        matches!(self, Self::Obstacle)
    }

    /// Reports whether the entity is a valid goal for the provided mode.
    #[must_use]
    pub const fn is_goal_of(&self, mode: TargetMode) -> bool {
        match (self, mode) {
            (Self::Tile(TileCondition::Dirty), TargetMode::Cleaning) => true,
            (Self::Station(_), TargetMode::Charging) => true,
            _ => false,
        }
    }
}

/// Bounded memory of recently selected cleaning targets.
///
/// A deterministic ring: pushing beyond [`RecentTargets::CAPACITY`] evicts
/// the oldest entry. Membership prevents the selector from immediately
/// re-choosing a cell it just serviced.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecentTargets {
    cells: VecDeque<CellCoord>,
}

impl RecentTargets {
    /// Maximum number of remembered target cells.
    pub const CAPACITY: usize = 5;

    /// Creates an empty target memory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports whether the provided cell is currently remembered.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.cells.contains(&cell)
    }

    /// Remembers the provided cell, evicting the oldest entry beyond capacity.
    ///
    /// Pushing a cell that is already remembered leaves the ring unchanged.
    pub fn push(&mut self, cell: CellCoord) {
        if self.contains(cell) {
            return;
        }
        self.cells.push_back(cell);
        if self.cells.len() > Self::CAPACITY {
            let _ = self.cells.pop_front();
        }
    }

    /// Forgets every remembered cell.
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Number of remembered cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether no cells are remembered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterator over remembered cells from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.cells.iter().copied()
    }
}

/// Parameters for seeded random world population.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScatterConfig {
    /// Probability (percent per cell) of seeding a dirty tile.
    pub dirt_density_pct: u8,
    /// Number of obstacles dropped on empty cells.
    pub obstacles: u32,
    /// Number of charging stations dropped on empty cells.
    pub stations: u32,
    /// Number of robots to spawn; parked on stations where possible.
    pub robots: u32,
    /// Seed for the population RNG, threaded explicitly for reproducibility.
    pub seed: u64,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Configures the world's grid using the provided dimensions, clearing
    /// any previous contents.
    ConfigureGrid {
        /// Number of columns laid out in the grid.
        columns: u32,
        /// Number of rows laid out in the grid.
        rows: u32,
    },
    /// Selects the recharge behavior applied at charging stations.
    SetChargePolicy {
        /// Policy the world should apply from the next tick onward.
        policy: ChargePolicy,
    },
    /// Populates the configured grid from a seeded random scatter.
    Populate {
        /// Density, entity counts, and RNG seed for the scatter.
        scatter: ScatterConfig,
    },
    /// Marks the tile at the provided cell as dirty.
    PlaceDirt {
        /// Cell that should hold a dirty tile.
        cell: CellCoord,
    },
    /// Places an impassable obstacle at the provided cell.
    PlaceObstacle {
        /// Cell the obstacle should occupy.
        cell: CellCoord,
    },
    /// Places a charging station at the provided cell.
    PlaceStation {
        /// Cell the station should occupy.
        cell: CellCoord,
    },
    /// Spawns a fully charged robot at the provided cell.
    SpawnRobot {
        /// Cell the robot should start from.
        cell: CellCoord,
    },
    /// Advances the simulation by one tick, running every robot's
    /// clean/charge/retarget controller in ascending id order.
    Tick,
    /// Installs a route computed by the target selector.
    AssignRoute {
        /// Robot the route belongs to.
        robot: RobotId,
        /// Purpose the route was selected for.
        mode: TargetMode,
        /// Final cell of the route.
        target: CellCoord,
        /// Ordered cells to traverse, excluding the robot's current cell.
        path: Vec<CellCoord>,
    },
    /// Executes one step of the robot's stored route.
    Step {
        /// Robot attempting to advance.
        robot: RobotId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that the grid was configured with the provided dimensions.
    GridConfigured {
        /// Number of columns laid out in the grid.
        columns: u32,
        /// Number of rows laid out in the grid.
        rows: u32,
    },
    /// Confirms that the recharge policy changed.
    ChargePolicyChanged {
        /// Policy now in effect.
        policy: ChargePolicy,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Tick index after the advance.
        tick: u64,
    },
    /// Confirms that a dirty tile was seeded.
    DirtPlaced {
        /// Cell holding the dirty tile.
        cell: CellCoord,
    },
    /// Confirms that an obstacle was placed.
    ObstaclePlaced {
        /// Cell the obstacle occupies.
        cell: CellCoord,
    },
    /// Confirms that a charging station was placed.
    StationPlaced {
        /// Identifier assigned to the station by the world.
        station: StationId,
        /// Cell the station occupies.
        cell: CellCoord,
    },
    /// Confirms that a robot was spawned.
    RobotSpawned {
        /// Identifier assigned to the robot by the world.
        robot: RobotId,
        /// Cell the robot occupies after spawning.
        cell: CellCoord,
    },
    /// Reports that a placement request was rejected.
    PlacementRejected {
        /// Kind of entity requested for placement.
        kind: PlacementKind,
        /// Cell provided in the placement request.
        cell: CellCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a robot cleaned the tile beneath it.
    TileCleaned {
        /// Robot that performed the cleaning.
        robot: RobotId,
        /// Cell whose tile transitioned to cleaned.
        cell: CellCoord,
    },
    /// Reports charge gained by a robot standing on a station.
    RobotCharging {
        /// Robot receiving charge.
        robot: RobotId,
        /// Battery level after the charge was applied.
        level: u8,
    },
    /// Confirms that a robot reached full charge and resumed exploring.
    RobotRecharged {
        /// Robot that finished recharging.
        robot: RobotId,
    },
    /// Requests a fresh target for a robot without a usable route.
    TargetNeeded {
        /// Robot awaiting a route.
        robot: RobotId,
        /// Purpose the next route should serve.
        mode: TargetMode,
    },
    /// Confirms that a route was accepted and stored.
    RouteAssigned {
        /// Robot the route belongs to.
        robot: RobotId,
        /// Purpose the route serves.
        mode: TargetMode,
        /// Final cell of the route.
        target: CellCoord,
        /// Number of steps in the stored route.
        length: usize,
    },
    /// Reports that a route assignment was rejected.
    RouteRejected {
        /// Robot the rejected route was intended for.
        robot: RobotId,
        /// Specific reason the route failed validation.
        reason: RouteError,
    },
    /// Confirms that a robot advanced one cell along its route.
    RobotMoved {
        /// Robot that moved.
        robot: RobotId,
        /// Cell the robot occupied before moving.
        from: CellCoord,
        /// Cell the robot occupies after the move.
        to: CellCoord,
    },
    /// Confirms that a robot consumed its whole route and went idle.
    RobotIdled {
        /// Robot that went idle.
        robot: RobotId,
    },
    /// Reports that a robot's battery reached zero. Terminal for the robot.
    RobotDepleted {
        /// Robot that ran out of battery.
        robot: RobotId,
    },
    /// Publishes an updated cleaning-progress report.
    ReportPublished {
        /// Report computed for the latest tick.
        report: CleaningReport,
    },
}

/// Kinds of entities that placement commands may request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementKind {
    /// A dirty floor tile.
    Dirt,
    /// An impassable obstacle.
    Obstacle,
    /// A charging station.
    Station,
    /// A sweeper robot.
    Robot,
}

/// Reasons a placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The requested cell lies outside the configured grid bounds.
    OutOfBounds,
    /// The requested cell already holds a conflicting entity.
    Occupied,
}

/// Reasons a route assignment may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RouteError {
    /// No robot with the provided identifier exists.
    UnknownRobot,
    /// The provided route contains no cells.
    EmptyRoute,
    /// The route's first cell is not adjacent to the robot.
    DetachedRoute,
    /// The route crosses an out-of-bounds or obstacle cell.
    BlockedRoute,
}

/// Immutable representation of a single robot's state used for queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RobotSnapshot {
    /// Unique identifier assigned to the robot.
    pub id: RobotId,
    /// Grid cell currently occupied by the robot.
    pub cell: CellCoord,
    /// Behavioral state at snapshot time.
    pub condition: RobotCondition,
    /// Battery charge at snapshot time.
    pub battery: Battery,
    /// Number of moves executed since spawning.
    pub move_count: u32,
    /// Remaining cells in the stored route.
    pub route_len: usize,
    /// Final cell of the stored route, if any.
    pub route_goal: Option<CellCoord>,
    /// Recently selected cleaning targets, oldest first.
    pub recent_targets: Vec<CellCoord>,
}

impl RobotSnapshot {
    /// Reports whether the robot may execute a step this tick.
    ///
    /// Terminal robots never move; charging robots stay put until full.
    #[must_use]
    pub fn may_step(&self) -> bool {
        if self.condition.is_terminal() {
            return false;
        }
        !(self.condition == RobotCondition::Charging && !self.battery.is_full())
    }
}

/// Read-only snapshot describing all robots in the world.
#[derive(Clone, Debug, Default)]
pub struct RobotView {
    snapshots: Vec<RobotSnapshot>,
}

impl RobotView {
    /// Creates a new robot view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<RobotSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured robot snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &RobotSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot for the provided robot, if present.
    #[must_use]
    pub fn get(&self, robot: RobotId) -> Option<&RobotSnapshot> {
        self.snapshots.iter().find(|snapshot| snapshot.id == robot)
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<RobotSnapshot> {
        self.snapshots
    }
}

/// Read-only view of the terrain: grid bounds plus the obstacle mask.
#[derive(Clone, Copy, Debug)]
pub struct TerrainView<'a> {
    blocked: &'a [bool],
    columns: u32,
    rows: u32,
}

impl<'a> TerrainView<'a> {
    /// Captures a terrain view backed by the provided row-major mask.
    #[must_use]
    pub fn new(blocked: &'a [bool], columns: u32, rows: u32) -> Self {
        Self {
            blocked,
            columns,
            rows,
        }
    }

    /// Reports whether the cell lies within the configured grid bounds.
    #[must_use]
    pub fn in_bounds(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Reports whether the cell is impassable.
    ///
    /// Out-of-bounds cells count as blocked so traversal code needs no
    /// separate bounds check.
    #[must_use]
    pub fn is_blocked(&self, cell: CellCoord) -> bool {
        match self.index(cell) {
            Some(index) => self.blocked.get(index).copied().unwrap_or(true),
            None => true,
        }
    }

    /// Provides the dimensions of the underlying grid.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.in_bounds(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        Some(row * width + column)
    }
}

/// Cleaning-progress report computed by the analytics system.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CleaningReport {
    /// Tick index the report describes.
    pub tick: u64,
    /// Number of tiles still dirty.
    pub dirty: u32,
    /// Number of tiles cleaned (including tiles that started clean).
    pub cleaned: u32,
    /// Moves executed per robot, ordered by robot id.
    pub robot_moves: Vec<(RobotId, u32)>,
}

impl CleaningReport {
    /// Percentage of tiles currently clean, in `[0, 100]`.
    ///
    /// A world without tiles reports 100 percent clean.
    #[must_use]
    pub fn cleaned_pct(&self) -> f64 {
        let total = self.dirty + self.cleaned;
        if total == 0 {
            return 100.0;
        }
        f64::from(self.cleaned) / f64::from(total) * 100.0
    }

    /// Reports whether no dirty tiles remain.
    #[must_use]
    pub const fn is_spotless(&self) -> bool {
        self.dirty == 0
    }
}
