#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! A* path search over the shared grid view.
//!
//! The search moves one cell per step through the walkable Moore
//! neighbourhood. Each step costs `1` plus any extra cost registered for the
//! entered cell. The heuristic is the Manhattan distance to the goal, which
//! overestimates diagonal moves; returned paths are always valid but are not
//! guaranteed to be the cheapest.

use std::{
    cmp::Ordering,
    collections::{BinaryHeap, HashMap},
};

use hiding_wumpus_core::{CellCoord, GridView, NeighborMode, TargetError};
use tracing::trace;

/// Additional per-cell cost paid when stepping into the cell.
///
/// Negative values are treated as zero.
pub type ExtraCosts = HashMap<CellCoord, f32>;

/// Reusable A* planner that keeps the diagnostics of its latest search.
#[derive(Debug, Default)]
pub struct Pathfinder {
    scratch: SearchScratch,
    open: BinaryHeap<OpenEntry>,
    visited: Vec<CellCoord>,
    frontier: Vec<CellCoord>,
    path: Vec<CellCoord>,
}

impl Pathfinder {
    /// Creates a planner with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Finds a path from `start` to `goal`, both inclusive.
    ///
    /// Returns an empty path when either cell lies off the grid, when the goal
    /// is a wall, or when the search exhausts its frontier. The start may be a
    /// wall so that an agent trapped inside one can walk out.
    pub fn find_path(
        &mut self,
        grid: GridView<'_>,
        start: CellCoord,
        goal: CellCoord,
        extra_costs: &ExtraCosts,
    ) -> Vec<CellCoord> {
        self.search(grid, start, goal, extra_costs);
        self.path.clone()
    }

    /// Finds a path like [`Pathfinder::find_path`] but names the reason for failure.
    pub fn plan(
        &mut self,
        grid: GridView<'_>,
        start: CellCoord,
        goal: CellCoord,
        extra_costs: &ExtraCosts,
    ) -> Result<Vec<CellCoord>, TargetError> {
        if !grid.contains(start) {
            self.reset(grid.cell_count());
            return Err(TargetError::OutOfBounds { cell: start });
        }
        if !grid.contains(goal) {
            self.reset(grid.cell_count());
            return Err(TargetError::OutOfBounds { cell: goal });
        }
        if grid.is_wall(goal) {
            self.reset(grid.cell_count());
            return Err(TargetError::Wall { cell: goal });
        }

        let path = self.find_path(grid, start, goal, extra_costs);
        if path.is_empty() {
            return Err(TargetError::NoPath {
                from: start,
                to: goal,
            });
        }
        Ok(path)
    }

    /// Read-only snapshot of the most recent search for debug overlays.
    #[must_use]
    pub fn diagnostics(&self) -> SearchDiagnostics<'_> {
        SearchDiagnostics {
            visited: &self.visited,
            frontier: &self.frontier,
            path: &self.path,
        }
    }

    fn reset(&mut self, cell_count: usize) {
        self.scratch.reset(cell_count);
        self.open.clear();
        self.visited.clear();
        self.frontier.clear();
        self.path.clear();
    }

    fn search(
        &mut self,
        grid: GridView<'_>,
        start: CellCoord,
        goal: CellCoord,
        extra_costs: &ExtraCosts,
    ) {
        self.reset(grid.cell_count());

        let (Some(start_index), Some(goal_index)) = (grid.index(start), grid.index(goal)) else {
            return;
        };
        if grid.is_wall(goal) {
            return;
        }

        let mut sequence = 0_u64;
        self.scratch.g_scores[start_index] = 0.0;
        self.scratch.queued[start_index] = true;
        self.open.push(OpenEntry {
            f_score: heuristic(start, goal) as f32,
            g_score: 0.0,
            sequence,
            cell: start,
            index: start_index,
        });

        while let Some(entry) = self.open.pop() {
            if entry.g_score > self.scratch.g_scores[entry.index] {
                continue;
            }

            if !self.scratch.expanded[entry.index] {
                self.scratch.expanded[entry.index] = true;
                self.visited.push(entry.cell);
            }

            if entry.index == goal_index {
                self.reconstruct(grid, goal_index);
                break;
            }

            for neighbor in grid.neighbors(entry.cell, NeighborMode::Walkable) {
                let Some(neighbor_index) = grid.index(neighbor) else {
                    continue;
                };
                let step_cost = 1.0 + extra_costs.get(&neighbor).copied().unwrap_or(0.0).max(0.0);
                let tentative = entry.g_score + step_cost;
                if tentative >= self.scratch.g_scores[neighbor_index] {
                    continue;
                }

                self.scratch.g_scores[neighbor_index] = tentative;
                self.scratch.came_from[neighbor_index] = Some(entry.index);
                self.scratch.queued[neighbor_index] = true;
                sequence += 1;
                self.open.push(OpenEntry {
                    f_score: tentative + heuristic(neighbor, goal) as f32,
                    g_score: tentative,
                    sequence,
                    cell: neighbor,
                    index: neighbor_index,
                });
            }
        }

        self.frontier.extend(
            self.scratch
                .queued
                .iter()
                .zip(&self.scratch.expanded)
                .enumerate()
                .filter(|(_, (queued, expanded))| **queued && !**expanded)
                .filter_map(|(index, _)| grid.coord_at(index)),
        );

        trace!(
            ?start,
            ?goal,
            visited = self.visited.len(),
            path_length = self.path.len(),
            "path search finished"
        );
    }

    fn reconstruct(&mut self, grid: GridView<'_>, goal_index: usize) {
        let mut cursor = Some(goal_index);
        while let Some(index) = cursor {
            if let Some(cell) = grid.coord_at(index) {
                self.path.push(cell);
            }
            cursor = self.scratch.came_from[index];
        }
        self.path.reverse();
    }
}

/// Borrowed record of the cells touched by the latest search.
#[derive(Clone, Copy, Debug)]
pub struct SearchDiagnostics<'a> {
    /// Cells expanded by the search, in expansion order.
    pub visited: &'a [CellCoord],
    /// Cells queued but never expanded, in row-major order.
    pub frontier: &'a [CellCoord],
    /// Path returned by the search, empty on failure.
    pub path: &'a [CellCoord],
}

/// Per-search state indexed by row-major cell index, reset before every search.
#[derive(Debug, Default)]
struct SearchScratch {
    g_scores: Vec<f32>,
    came_from: Vec<Option<usize>>,
    queued: Vec<bool>,
    expanded: Vec<bool>,
}

impl SearchScratch {
    fn reset(&mut self, cell_count: usize) {
        self.g_scores.clear();
        self.g_scores.resize(cell_count, f32::INFINITY);
        self.came_from.clear();
        self.came_from.resize(cell_count, None);
        self.queued.clear();
        self.queued.resize(cell_count, false);
        self.expanded.clear();
        self.expanded.resize(cell_count, false);
    }
}

fn heuristic(cell: CellCoord, goal: CellCoord) -> u32 {
    cell.manhattan_distance(goal)
}

#[derive(Clone, Copy, Debug)]
struct OpenEntry {
    f_score: f32,
    g_score: f32,
    sequence: u64,
    cell: CellCoord,
    index: usize,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap pops the maximum; lower f and earlier insertion win.
        other
            .f_score
            .total_cmp(&self.f_score)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}
