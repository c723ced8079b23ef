#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic A* search over the terrain grid.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use grid_sweepers_core::{CellCoord, TerrainView};

/// A* searcher that reuses scratch buffers to avoid repeated allocations.
///
/// Search runs over 4-connected neighbors with uniform edge cost and the
/// Manhattan distance as an admissible heuristic. Obstacle cells and
/// out-of-bounds cells are never expanded, closed cells are never
/// re-expanded, and the search terminates by frontier exhaustion when the
/// goal is unreachable.
///
/// Frontier ties are broken by a total order — f-cost, then g-cost (larger
/// first, so nodes nearer the goal expand sooner), then column, then row —
/// which keeps routes reproducible across runs and platforms.
#[derive(Debug, Default)]
pub struct Pathfinder {
    frontier: BinaryHeap<FrontierEntry>,
    cost: Vec<u32>,
    parent: Vec<Option<CellCoord>>,
    closed: Vec<bool>,
}

impl Pathfinder {
    /// Creates a new searcher with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes the shortest route from `start` to `goal`.
    ///
    /// On success `out` holds the route excluding `start` and ending at
    /// `goal`, and the call returns `true`. When no route exists — the goal
    /// is blocked, enclosed, out of bounds, or equal to `start` — `out` is
    /// left empty and the call returns `false`.
    pub fn find_path(
        &mut self,
        terrain: TerrainView<'_>,
        start: CellCoord,
        goal: CellCoord,
        out: &mut Vec<CellCoord>,
    ) -> bool {
        out.clear();

        if start == goal {
            return false;
        }
        if terrain.is_blocked(start) || terrain.is_blocked(goal) {
            return false;
        }

        let (columns, rows) = terrain.dimensions();
        let Some(node_count) = node_count(columns, rows) else {
            return false;
        };
        self.prepare_workspace(node_count);

        let Some(start_index) = index(columns, start) else {
            return false;
        };
        self.cost[start_index] = 0;
        self.frontier.push(FrontierEntry {
            f: start.manhattan_distance(goal),
            g: 0,
            cell: start,
        });

        while let Some(entry) = self.frontier.pop() {
            let Some(entry_index) = index(columns, entry.cell) else {
                continue;
            };
            if self.closed[entry_index] {
                continue;
            }
            self.closed[entry_index] = true;

            if entry.cell == goal {
                self.reconstruct(columns, start, goal, out);
                return true;
            }

            let next_g = entry.g + 1;
            for neighbor in cardinal_neighbors(entry.cell, columns, rows) {
                if terrain.is_blocked(neighbor) {
                    continue;
                }
                let Some(neighbor_index) = index(columns, neighbor) else {
                    continue;
                };
                if self.closed[neighbor_index] {
                    continue;
                }
                if next_g >= self.cost[neighbor_index] {
                    continue;
                }

                self.cost[neighbor_index] = next_g;
                self.parent[neighbor_index] = Some(entry.cell);
                self.frontier.push(FrontierEntry {
                    f: next_g + neighbor.manhattan_distance(goal),
                    g: next_g,
                    cell: neighbor,
                });
            }
        }

        false
    }

    fn prepare_workspace(&mut self, node_count: usize) {
        self.frontier.clear();
        if self.cost.len() != node_count {
            self.cost = vec![u32::MAX; node_count];
            self.parent = vec![None; node_count];
            self.closed = vec![false; node_count];
        } else {
            self.cost.fill(u32::MAX);
            self.parent.fill(None);
            self.closed.fill(false);
        }
    }

    fn reconstruct(
        &self,
        columns: u32,
        start: CellCoord,
        goal: CellCoord,
        out: &mut Vec<CellCoord>,
    ) {
        let mut current = goal;
        while current != start {
            out.push(current);
            let Some(previous) = index(columns, current).and_then(|offset| self.parent[offset])
            else {
                break;
            };
            current = previous;
        }
        out.reverse();
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct FrontierEntry {
    f: u32,
    g: u32,
    cell: CellCoord,
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap pops the maximum, so "greater" means expanded earlier.
        other
            .f
            .cmp(&self.f)
            .then_with(|| self.g.cmp(&other.g))
            .then_with(|| other.cell.column().cmp(&self.cell.column()))
            .then_with(|| other.cell.row().cmp(&self.cell.row()))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn node_count(columns: u32, rows: u32) -> Option<usize> {
    let count = u64::from(columns) * u64::from(rows);
    let count = usize::try_from(count).ok()?;
    if count == 0 {
        None
    } else {
        Some(count)
    }
}

fn index(columns: u32, cell: CellCoord) -> Option<usize> {
    if cell.column() >= columns {
        return None;
    }
    let row = usize::try_from(cell.row()).ok()?;
    let column = usize::try_from(cell.column()).ok()?;
    let width = usize::try_from(columns).ok()?;
    row.checked_mul(width)?.checked_add(column)
}

fn cardinal_neighbors(cell: CellCoord, columns: u32, rows: u32) -> impl Iterator<Item = CellCoord> {
    let mut candidates = [None; 4];
    let mut count = 0;

    if let Some(row) = cell.row().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(cell.column(), row));
        count += 1;
    }
    if let Some(column) = cell.column().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(column, cell.row()));
        count += 1;
    }
    if cell.column() + 1 < columns {
        candidates[count] = Some(CellCoord::new(cell.column() + 1, cell.row()));
        count += 1;
    }
    if cell.row() + 1 < rows {
        candidates[count] = Some(CellCoord::new(cell.column(), cell.row() + 1));
        count += 1;
    }

    candidates.into_iter().take(count).flatten()
}
