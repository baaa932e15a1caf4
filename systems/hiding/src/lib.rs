#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Hiding spot scoring and the hider's decision policy.
//!
//! Every open cell the seeker cannot currently see is a candidate. Four
//! criteria are measured per candidate, normalised over all candidates into
//! `[0, 1]`, weighted and summed; the highest score wins.

use hiding_wumpus_core::{CellCoord, Distance, GridView, NeighborMode};
use hiding_wumpus_system_distance_field::{BlindSpots, DistanceField};
use serde::{Deserialize, Serialize};

mod policy;

pub use policy::HiderPolicy;

/// Per-criterion multipliers applied to normalised scores.
///
/// Any finite non-negative value is accepted; zero disables a criterion.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CriterionWeights {
    /// Weight for hugging walls; closer to a wall scores higher.
    pub wall_proximity: f32,
    /// Weight for shadow depth; farther from seeker-visible cells scores higher.
    pub shadow_depth: f32,
    /// Weight for travel distance; farther from the travel origin scores higher.
    pub travel_distance: f32,
    /// Weight for blind-spot size; larger unseen regions score higher.
    pub blind_spot_size: f32,
}

impl Default for CriterionWeights {
    fn default() -> Self {
        Self {
            wall_proximity: 3.0,
            shadow_depth: 2.0,
            travel_distance: 4.0,
            blind_spot_size: 1.0,
        }
    }
}

/// Cell the travel-distance criterion is measured from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelOrigin {
    /// Walking distance from the hider's own cell.
    #[default]
    Hider,
    /// Walking distance from the seeker's cell.
    Seeker,
}

/// Tunables for the hider.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HidingConfig {
    /// Criterion weights used by the evaluator.
    pub weights: CriterionWeights,
    /// Origin of the travel-distance criterion.
    pub travel_origin: TravelOrigin,
    /// Ranked candidates tried through the targeter before wandering.
    pub candidate_attempts: usize,
    /// Random walkable cells tried once every ranked candidate failed.
    pub wander_attempts: usize,
}

impl Default for HidingConfig {
    fn default() -> Self {
        Self {
            weights: CriterionWeights::default(),
            travel_origin: TravelOrigin::Hider,
            candidate_attempts: 50,
            wander_attempts: 50,
        }
    }
}

/// Scores every candidate hiding spot and keeps the intermediate fields for inspection.
#[derive(Clone, Debug)]
pub struct HidingSpotEvaluator {
    weights: CriterionWeights,
    travel_origin: TravelOrigin,
    size: u32,
    wall_field: DistanceField,
    shadow_field: DistanceField,
    travel_field: DistanceField,
    blind_spots: BlindSpots,
    scores: Vec<Option<f32>>,
}

impl HidingSpotEvaluator {
    /// Creates an evaluator with the provided weights and travel origin.
    #[must_use]
    pub fn new(weights: CriterionWeights, travel_origin: TravelOrigin) -> Self {
        Self {
            weights,
            travel_origin,
            size: 0,
            wall_field: DistanceField::default(),
            shadow_field: DistanceField::default(),
            travel_field: DistanceField::default(),
            blind_spots: BlindSpots::default(),
            scores: Vec::new(),
        }
    }

    /// Scores every candidate and returns the best one.
    ///
    /// Returns `None` when the seeker sees every open cell. Ties resolve to
    /// the first candidate in row-major order.
    pub fn choose_target(
        &mut self,
        grid: GridView<'_>,
        hider: CellCoord,
        seeker: CellCoord,
    ) -> Option<CellCoord> {
        let is_candidate = |cell: CellCoord| grid.is_walkable(cell) && !grid.is_visible_to_seeker(cell);
        self.size = grid.size();

        let wall_sources: Vec<CellCoord> = grid
            .cells()
            .filter(|&cell| is_candidate(cell))
            .filter(|&cell| {
                grid.neighbors(cell, NeighborMode::IncludeWalls)
                    .any(|neighbor| grid.is_wall(neighbor))
            })
            .collect();
        self.wall_field
            .rebuild_with(grid, wall_sources, NeighborMode::Walkable, is_candidate);

        let shadow_sources: Vec<CellCoord> = grid
            .cells()
            .filter(|&cell| is_candidate(cell))
            .filter(|&cell| {
                grid.neighbors(cell, NeighborMode::IncludeWalls).any(|neighbor| {
                    grid.is_walkable(neighbor) && grid.is_visible_to_seeker(neighbor)
                })
            })
            .collect();
        self.shadow_field
            .rebuild_with(grid, shadow_sources, NeighborMode::Walkable, is_candidate);

        let origin = match self.travel_origin {
            TravelOrigin::Hider => hider,
            TravelOrigin::Seeker => seeker,
        };
        self.travel_field = DistanceField::from_cell(grid, origin);
        self.blind_spots = BlindSpots::compute(grid, is_candidate);

        let candidates: Vec<CellCoord> = grid.cells().filter(|&cell| is_candidate(cell)).collect();
        let wall_range = finite_range(&self.wall_field, &candidates);
        let shadow_range = finite_range(&self.shadow_field, &candidates);
        let travel_range = finite_range(&self.travel_field, &candidates);
        let spot_range = range(
            candidates
                .iter()
                .filter_map(|&cell| self.blind_spots.size_of(cell)),
        );

        self.scores.clear();
        self.scores.resize(grid.cell_count(), None);
        let mut best: Option<(CellCoord, f32)> = None;
        for &cell in &candidates {
            let wall = match self.wall_field.get(cell) {
                Distance::Finite(value) => 1.0 - normalise(value, wall_range),
                Distance::Unreachable => 0.0,
            };
            let shadow = match self.shadow_field.get(cell) {
                Distance::Finite(value) => normalise(value, shadow_range),
                Distance::Unreachable => 1.0,
            };
            let travel = match self.travel_field.get(cell) {
                Distance::Finite(value) => normalise(value, travel_range),
                Distance::Unreachable => 0.0,
            };
            let spot = self
                .blind_spots
                .size_of(cell)
                .map_or(0.0, |value| normalise(value, spot_range));

            let score = self.weights.wall_proximity * wall
                + self.weights.shadow_depth * shadow
                + self.weights.travel_distance * travel
                + self.weights.blind_spot_size * spot;

            if let Some(index) = grid.index(cell) {
                self.scores[index] = Some(score);
            }
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((cell, score));
            }
        }

        best.map(|(cell, _)| cell)
    }

    /// Candidates of the last evaluation ordered from best to worst score.
    ///
    /// Equal scores keep row-major order.
    #[must_use]
    pub fn ranked(&self) -> Vec<CellCoord> {
        let view = GridView::new(self.size, &[]);
        let mut ranked: Vec<(CellCoord, f32)> = self
            .scores
            .iter()
            .enumerate()
            .filter_map(|(index, score)| Some((view.coord_at(index)?, (*score)?)))
            .collect();
        ranked.sort_by(|left, right| right.1.total_cmp(&left.1));
        ranked.into_iter().map(|(cell, _)| cell).collect()
    }

    /// Score of the cell in the last evaluation, `None` for non-candidates.
    #[must_use]
    pub fn score(&self, cell: CellCoord) -> Option<f32> {
        let index = GridView::new(self.size, &[]).index(cell)?;
        self.scores.get(index).copied().flatten()
    }

    /// Dense score map in row-major order, `None` for non-candidates.
    #[must_use]
    pub fn scores(&self) -> &[Option<f32>] {
        &self.scores
    }

    /// Hops from each candidate to the nearest candidate touching a wall.
    #[must_use]
    pub fn wall_field(&self) -> &DistanceField {
        &self.wall_field
    }

    /// Hops from each candidate to the nearest candidate bordering seeker-visible floor.
    #[must_use]
    pub fn shadow_field(&self) -> &DistanceField {
        &self.shadow_field
    }

    /// Walking distance from the travel origin.
    #[must_use]
    pub fn travel_field(&self) -> &DistanceField {
        &self.travel_field
    }

    /// Connected candidate regions.
    #[must_use]
    pub fn blind_spots(&self) -> &BlindSpots {
        &self.blind_spots
    }
}

impl Default for HidingSpotEvaluator {
    fn default() -> Self {
        Self::new(CriterionWeights::default(), TravelOrigin::default())
    }
}

fn finite_range(field: &DistanceField, candidates: &[CellCoord]) -> Option<(u32, u32)> {
    range(candidates.iter().filter_map(|&cell| field.get(cell).finite()))
}

fn range(values: impl Iterator<Item = u32>) -> Option<(u32, u32)> {
    values.fold(None, |acc, value| match acc {
        None => Some((value, value)),
        Some((low, high)) => Some((low.min(value), high.max(value))),
    })
}

fn normalise(value: u32, range: Option<(u32, u32)>) -> f32 {
    let Some((low, high)) = range else {
        return 0.0;
    };
    if high == low {
        return 0.0;
    }
    (value.saturating_sub(low)) as f32 / (high - low) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walls_at(size: u32, cells: &[(u32, u32)]) -> Vec<bool> {
        let mut walls = vec![false; (size * size) as usize];
        for &(column, row) in cells {
            walls[(row * size + column) as usize] = true;
        }
        walls
    }

    fn visibility_from(grid: GridView<'_>, seeker: CellCoord) -> Vec<bool> {
        grid.cells()
            .map(|cell| !grid.is_wall_between(cell, seeker))
            .collect()
    }

    #[test]
    fn normalise_maps_range_onto_unit_interval() {
        assert_eq!(normalise(5, Some((5, 5))), 0.0);
        assert_eq!(normalise(2, Some((0, 4))), 0.5);
        assert_eq!(normalise(4, Some((0, 4))), 1.0);
        assert_eq!(normalise(3, None), 0.0);
    }

    #[test]
    fn no_candidates_when_seeker_sees_everything() {
        let walls = walls_at(4, &[]);
        let visible = vec![true; 16];
        let grid = GridView::new(4, &walls).with_visibility(&visible, &visible);
        let mut evaluator = HidingSpotEvaluator::default();

        let choice = evaluator.choose_target(grid, CellCoord::new(3, 3), CellCoord::new(0, 0));

        assert_eq!(choice, None);
        assert!(evaluator.ranked().is_empty());
    }

    #[test]
    fn chosen_spot_is_open_and_unseen() {
        let walls = walls_at(
            7,
            &[(3, 0), (3, 1), (3, 2), (3, 3), (3, 4), (5, 5), (1, 5)],
        );
        let grid = GridView::new(7, &walls);
        let seeker = CellCoord::new(0, 0);
        let visible = visibility_from(grid, seeker);
        let grid = grid.with_visibility(&visible, &visible);
        let mut evaluator = HidingSpotEvaluator::default();

        let choice = evaluator
            .choose_target(grid, CellCoord::new(6, 6), seeker)
            .expect("a hiding spot exists");

        assert!(grid.is_walkable(choice));
        assert!(!grid.is_visible_to_seeker(choice));
        assert_eq!(evaluator.ranked().first(), Some(&choice));
        let best = evaluator.score(choice).unwrap_or(f32::NAN);
        assert!(evaluator
            .scores()
            .iter()
            .flatten()
            .all(|score| *score <= best));
    }

    #[test]
    fn visible_cells_and_walls_are_never_scored() {
        let walls = walls_at(5, &[(2, 1), (2, 2), (2, 3)]);
        let grid = GridView::new(5, &walls);
        let seeker = CellCoord::new(0, 2);
        let visible = visibility_from(grid, seeker);
        let grid = grid.with_visibility(&visible, &visible);
        let mut evaluator = HidingSpotEvaluator::default();

        let _ = evaluator.choose_target(grid, CellCoord::new(4, 2), seeker);

        for cell in grid.cells() {
            if grid.is_wall(cell) || grid.is_visible_to_seeker(cell) {
                assert_eq!(evaluator.score(cell), None, "{cell:?} was scored");
            } else {
                assert!(evaluator.score(cell).is_some(), "{cell:?} was skipped");
            }
        }
    }

    #[test]
    fn single_criterion_weight_prefers_deepest_shadow() {
        let walls = walls_at(6, &[(1, 0), (1, 1), (1, 2), (1, 3), (1, 4)]);
        let grid = GridView::new(6, &walls);
        let seeker = CellCoord::new(0, 0);
        let visible = visibility_from(grid, seeker);
        let grid = grid.with_visibility(&visible, &visible);
        let weights = CriterionWeights {
            wall_proximity: 0.0,
            shadow_depth: 1.0,
            travel_distance: 0.0,
            blind_spot_size: 0.0,
        };
        let mut evaluator = HidingSpotEvaluator::new(weights, TravelOrigin::Hider);

        let choice = evaluator
            .choose_target(grid, CellCoord::new(5, 5), seeker)
            .expect("shadow exists");

        let depth = evaluator.shadow_field().get(choice);
        let deepest = evaluator
            .shadow_field()
            .iter()
            .filter(|(cell, _)| evaluator.score(*cell).is_some())
            .map(|(_, distance)| distance)
            .max()
            .unwrap_or(Distance::Unreachable);
        assert_eq!(depth, deepest);
    }

    #[test]
    fn travel_origin_switches_the_measured_field() {
        let walls = walls_at(5, &[]);
        let visible = vec![false; 25];
        let grid = GridView::new(5, &walls).with_visibility(&visible, &visible);
        let weights = CriterionWeights {
            wall_proximity: 0.0,
            shadow_depth: 0.0,
            travel_distance: 1.0,
            blind_spot_size: 0.0,
        };
        let hider = CellCoord::new(0, 0);
        let seeker = CellCoord::new(4, 4);

        let mut from_hider = HidingSpotEvaluator::new(weights, TravelOrigin::Hider);
        let mut from_seeker = HidingSpotEvaluator::new(weights, TravelOrigin::Seeker);

        assert_eq!(
            from_hider.choose_target(grid, hider, seeker),
            Some(CellCoord::new(4, 0))
        );
        assert_eq!(
            from_seeker.choose_target(grid, hider, seeker),
            Some(CellCoord::new(0, 0))
        );
    }
}
