use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use hiding_wumpus_core::CellCoord;
use hiding_wumpus_system_simulation::{RoundOutcome, Simulation, SimulationConfig};

fn maze_walls() -> Vec<CellCoord> {
    let mut walls = Vec::new();
    for row in 0..8 {
        walls.push(CellCoord::new(3, row));
    }
    for row in 4..12 {
        walls.push(CellCoord::new(7, row));
    }
    for column in 8..11 {
        walls.push(CellCoord::new(column, 3));
    }
    walls
}

fn replay(seed: u64) -> Vec<RoundOutcome> {
    let config = SimulationConfig {
        grid_size: 12,
        round_time_limit_seconds: 40.0,
        seed,
        ..SimulationConfig::default()
    };
    let mut simulation = Simulation::new(config).expect("valid config");
    simulation.set_walls(maze_walls());
    simulation.run_batch(3)
}

fn fingerprint(outcomes: &[RoundOutcome]) -> u64 {
    let mut hasher = DefaultHasher::new();
    for outcome in outcomes {
        outcome.caught.hash(&mut hasher);
        outcome.steps.hash(&mut hasher);
        outcome.path_length.hash(&mut hasher);
        outcome.final_distance.hash(&mut hasher);
        outcome.exposure_time.to_bits().hash(&mut hasher);
    }
    hasher.finish()
}

#[test]
fn batch_outcomes_are_deterministic_for_a_seed() {
    let first = replay(7);
    let second = replay(7);

    assert_eq!(first.len(), 3);
    assert_eq!(first, second, "batch replay diverged");
    assert_eq!(fingerprint(&first), fingerprint(&second));
}

#[test]
fn rounds_respect_the_time_limit() {
    for outcome in replay(21) {
        assert!(outcome.steps <= 1_200, "{outcome:?}");
        assert!(outcome.time_elapsed <= 40.0 + 1e-3, "{outcome:?}");
        if !outcome.caught {
            assert_eq!(outcome.steps, 1_200, "{outcome:?}");
        }
    }
}
