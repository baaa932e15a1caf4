#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seeker decision logic: freeze, track, predict, explore, fall back.

use std::{cmp::Reverse, time::Duration};

use hiding_wumpus_core::{CellCoord, Decision, DecisionContext, GridView, Policy, Thought};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Tunables for the seeker.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PursuitConfig {
    /// Seconds the seeker stays frozen after each round reset.
    pub freeze_seconds: f32,
    /// Seconds after losing sight during which the last sighting is searched.
    pub prediction_window_seconds: f32,
    /// Chebyshev radius searched around the last sighting.
    pub search_radius: u32,
    /// Stale cells tried through the targeter per decision.
    pub exploration_attempts: usize,
    /// Random cells tried once exploration failed.
    pub fallback_attempts: usize,
}

impl Default for PursuitConfig {
    fn default() -> Self {
        Self {
            freeze_seconds: 3.0,
            prediction_window_seconds: 3.0,
            search_radius: 3,
            exploration_attempts: 50,
            fallback_attempts: 50,
        }
    }
}

/// State the seeker acted in on its latest decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PursuitMode {
    /// Waiting out the head start given to the hider.
    Frozen,
    /// Heading straight for a visible hider.
    Tracking,
    /// Searching around the last sighting.
    Predicting,
    /// Heading for the cell unseen for longest.
    Exploring,
    /// Trying random cells after every other choice failed.
    Fallback,
}

/// Last place and time the hider was seen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sighting {
    /// Cell the hider occupied.
    pub cell: CellCoord,
    /// Round time of the sighting.
    pub at: Duration,
}

/// Seeker policy driven by visibility, a short memory and per-cell staleness.
#[derive(Debug)]
pub struct PursuitPolicy {
    config: PursuitConfig,
    freeze_remaining: Duration,
    last_seen: Option<Sighting>,
    staleness: Vec<u32>,
    mode: PursuitMode,
    rng: ChaCha8Rng,
}

impl PursuitPolicy {
    /// Creates an unfrozen seeker policy whose random choices are driven by `seed`.
    #[must_use]
    pub fn new(config: PursuitConfig, seed: u64) -> Self {
        Self {
            config,
            freeze_remaining: Duration::ZERO,
            last_seen: None,
            staleness: Vec::new(),
            mode: PursuitMode::Exploring,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Mode chosen on the latest decision.
    #[must_use]
    pub fn mode(&self) -> PursuitMode {
        self.mode
    }

    /// Last sighting of the hider this round.
    #[must_use]
    pub fn last_seen(&self) -> Option<Sighting> {
        self.last_seen
    }

    /// Decision ticks each cell has gone unseen, in row-major order.
    #[must_use]
    pub fn staleness(&self) -> &[u32] {
        &self.staleness
    }

    /// Freeze time left before the seeker acts.
    #[must_use]
    pub fn freeze_remaining(&self) -> Duration {
        self.freeze_remaining
    }

    fn refresh_staleness(&mut self, grid: GridView<'_>) {
        if self.staleness.len() != grid.cell_count() {
            self.staleness.clear();
            self.staleness.resize(grid.cell_count(), 0);
        }
        for (counter, cell) in self.staleness.iter_mut().zip(grid.cells()) {
            if grid.is_wall(cell) || grid.is_visible_to_seeker(cell) {
                *counter = 0;
            } else {
                *counter = counter.saturating_add(1);
            }
        }
    }

    fn predict(
        &mut self,
        context: &DecisionContext<'_>,
        sighting: Sighting,
        targeter: &mut dyn FnMut(CellCoord) -> bool,
    ) -> Option<CellCoord> {
        for radius in 0..=self.config.search_radius {
            let mut ring = ring_cells(context.grid, sighting.cell, radius);
            ring.shuffle(&mut self.rng);
            for cell in ring {
                if cell == context.own_cell || !context.grid.is_walkable(cell) {
                    continue;
                }
                if targeter(cell) {
                    return Some(cell);
                }
            }
        }
        None
    }

    fn explore(
        &self,
        context: &DecisionContext<'_>,
        targeter: &mut dyn FnMut(CellCoord) -> bool,
    ) -> Option<CellCoord> {
        let grid = context.grid;
        let mut candidates: Vec<(CellCoord, u32)> = grid
            .cells()
            .zip(self.staleness.iter().copied())
            .filter(|&(cell, staleness)| staleness > 0 && cell != context.own_cell && grid.is_walkable(cell))
            .collect();
        candidates.sort_by_key(|&(cell, staleness)| {
            (Reverse(staleness), cell.manhattan_distance(context.own_cell), cell.row(), cell.column())
        });

        candidates
            .into_iter()
            .take(self.config.exploration_attempts)
            .map(|(cell, _)| cell)
            .find(|&cell| targeter(cell))
    }

    fn fall_back(
        &mut self,
        context: &DecisionContext<'_>,
        targeter: &mut dyn FnMut(CellCoord) -> bool,
    ) -> Option<CellCoord> {
        let size = context.grid.size();
        if size == 0 {
            return None;
        }
        for _ in 0..self.config.fallback_attempts {
            let cell = CellCoord::new(self.rng.gen_range(0..size), self.rng.gen_range(0..size));
            if context.grid.is_walkable(cell) && targeter(cell) {
                return Some(cell);
            }
        }
        None
    }

    fn within_prediction_window(&self, now: Duration) -> Option<Sighting> {
        let sighting = self.last_seen?;
        let window = seconds(self.config.prediction_window_seconds);
        (now.saturating_sub(sighting.at) <= window).then_some(sighting)
    }
}

impl Policy for PursuitPolicy {
    fn decide(
        &mut self,
        context: &DecisionContext<'_>,
        targeter: &mut dyn FnMut(CellCoord) -> bool,
    ) -> Decision {
        if self.is_frozen() {
            self.mode = PursuitMode::Frozen;
            return Decision::Keep {
                thought: Thought::Frozen,
            };
        }

        self.refresh_staleness(context.grid);

        let hider = context.opponent_cell;
        if !context.grid.is_wall_between(context.own_cell, hider) {
            self.last_seen = Some(Sighting {
                cell: hider,
                at: context.elapsed,
            });
            if targeter(hider) {
                self.mode = PursuitMode::Tracking;
                debug!(?hider, "seeker tracking");
                return Decision::Retarget {
                    cell: hider,
                    thought: Thought::Tracking,
                };
            }
        } else if let Some(sighting) = self.within_prediction_window(context.elapsed) {
            if let Some(cell) = self.predict(context, sighting, targeter) {
                self.mode = PursuitMode::Predicting;
                debug!(?cell, last_seen = ?sighting.cell, "seeker predicting");
                return Decision::Retarget {
                    cell,
                    thought: Thought::Predicting,
                };
            }
        }

        if let Some(cell) = self.explore(context, targeter) {
            self.mode = PursuitMode::Exploring;
            debug!(?cell, "seeker exploring");
            return Decision::Retarget {
                cell,
                thought: Thought::Exploring,
            };
        }

        self.mode = PursuitMode::Fallback;
        match self.fall_back(context, targeter) {
            Some(cell) => {
                debug!(?cell, "seeker wandering");
                Decision::Retarget {
                    cell,
                    thought: Thought::Wandering,
                }
            }
            None => {
                warn!(
                    attempts = self.config.fallback_attempts,
                    "seeker could not set any target"
                );
                Decision::Keep {
                    thought: Thought::Stuck,
                }
            }
        }
    }

    fn advance(&mut self, dt: Duration) {
        self.freeze_remaining = self.freeze_remaining.saturating_sub(dt);
    }

    fn reset_round(&mut self) {
        self.freeze_remaining = seconds(self.config.freeze_seconds);
        self.last_seen = None;
        self.staleness.clear();
        self.mode = PursuitMode::Frozen;
    }

    fn is_frozen(&self) -> bool {
        !self.freeze_remaining.is_zero()
    }
}

fn seconds(value: f32) -> Duration {
    Duration::try_from_secs_f32(value.max(0.0)).unwrap_or(Duration::ZERO)
}

/// Cells on the grid at exactly Chebyshev distance `radius` from `center`, row-major.
fn ring_cells(grid: GridView<'_>, center: CellCoord, radius: u32) -> Vec<CellCoord> {
    let low_column = center.column().saturating_sub(radius);
    let low_row = center.row().saturating_sub(radius);
    let high_column = center.column().saturating_add(radius).min(grid.size().saturating_sub(1));
    let high_row = center.row().saturating_add(radius).min(grid.size().saturating_sub(1));

    let mut cells = Vec::new();
    for row in low_row..=high_row {
        for column in low_column..=high_column {
            let cell = CellCoord::new(column, row);
            if grid.contains(cell) && cell.chebyshev_distance(center) == radius {
                cells.push(cell);
            }
        }
    }
    cells
}
