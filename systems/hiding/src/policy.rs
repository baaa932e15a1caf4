//! Hider decision policy built on the hiding spot evaluator.

use hiding_wumpus_core::{CellCoord, Decision, DecisionContext, Policy, Thought};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

use crate::{HidingConfig, HidingSpotEvaluator};

/// Hider that runs to the best-scoring unseen cell and stays there while unseen.
#[derive(Debug)]
pub struct HiderPolicy {
    config: HidingConfig,
    evaluator: HidingSpotEvaluator,
    chosen_spot: Option<CellCoord>,
    rng: ChaCha8Rng,
}

impl HiderPolicy {
    /// Creates a hider policy whose random fallback is driven by `seed`.
    #[must_use]
    pub fn new(config: HidingConfig, seed: u64) -> Self {
        Self {
            evaluator: HidingSpotEvaluator::new(config.weights, config.travel_origin),
            config,
            chosen_spot: None,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Evaluator holding the score map of the latest decision.
    #[must_use]
    pub fn evaluator(&self) -> &HidingSpotEvaluator {
        &self.evaluator
    }

    /// Spot the hider last committed to.
    #[must_use]
    pub fn chosen_spot(&self) -> Option<CellCoord> {
        self.chosen_spot
    }

    fn wander(
        &mut self,
        context: &DecisionContext<'_>,
        targeter: &mut dyn FnMut(CellCoord) -> bool,
    ) -> Option<CellCoord> {
        let size = context.grid.size();
        if size == 0 {
            return None;
        }
        for _ in 0..self.config.wander_attempts {
            let cell = CellCoord::new(self.rng.gen_range(0..size), self.rng.gen_range(0..size));
            if context.grid.is_walkable(cell) && targeter(cell) {
                return Some(cell);
            }
        }
        None
    }
}

impl Policy for HiderPolicy {
    fn decide(
        &mut self,
        context: &DecisionContext<'_>,
        targeter: &mut dyn FnMut(CellCoord) -> bool,
    ) -> Decision {
        let here = context.own_cell;
        if !context.grid.is_visible_to_seeker(here) && self.chosen_spot == Some(here) {
            return Decision::Keep {
                thought: Thought::Safe,
            };
        }

        let Some(best) = self
            .evaluator
            .choose_target(context.grid, here, context.opponent_cell)
        else {
            debug!(?here, "no unseen cell left to hide in");
            self.chosen_spot = None;
            return Decision::Keep {
                thought: Thought::Stuck,
            };
        };

        let ranked = self.evaluator.ranked();
        for &cell in ranked.iter().take(self.config.candidate_attempts) {
            if targeter(cell) {
                debug!(?cell, ?best, score = self.evaluator.score(cell), "hider fleeing");
                self.chosen_spot = Some(cell);
                return Decision::Retarget {
                    cell,
                    thought: Thought::Fleeing,
                };
            }
        }

        warn!(
            attempts = self.config.candidate_attempts,
            "no ranked hiding spot was reachable; wandering"
        );
        self.chosen_spot = None;
        match self.wander(context, targeter) {
            Some(cell) => Decision::Retarget {
                cell,
                thought: Thought::Wandering,
            },
            None => {
                warn!(attempts = self.config.wander_attempts, "hider could not set any target");
                Decision::Keep {
                    thought: Thought::Stuck,
                }
            }
        }
    }

    fn reset_round(&mut self) {
        self.chosen_spot = None;
    }
}
