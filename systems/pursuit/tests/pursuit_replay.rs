use std::time::Duration;

use hiding_wumpus_core::{CellCoord, Decision, DecisionContext, GridView, Policy};
use hiding_wumpus_system_pathfinding::{ExtraCosts, Pathfinder};
use hiding_wumpus_system_pursuit::{PursuitConfig, PursuitMode, PursuitPolicy};

const SIZE: u32 = 10;

fn maze() -> Vec<bool> {
    let mut walls = vec![false; (SIZE * SIZE) as usize];
    for row in 0..7 {
        walls[(row * SIZE + 3) as usize] = true;
    }
    for row in 3..SIZE {
        walls[(row * SIZE + 6) as usize] = true;
    }
    walls
}

fn hider_route() -> Vec<CellCoord> {
    vec![
        CellCoord::new(1, 8),
        CellCoord::new(2, 8),
        CellCoord::new(4, 8),
        CellCoord::new(5, 4),
        CellCoord::new(5, 1),
        CellCoord::new(8, 1),
        CellCoord::new(8, 6),
        CellCoord::new(9, 9),
    ]
}

fn replay(seed: u64) -> Vec<(Decision, PursuitMode)> {
    let walls = maze();
    let bare = GridView::new(SIZE, &walls);
    let seeker = CellCoord::new(0, 0);
    let sight: Vec<bool> = bare
        .cells()
        .map(|cell| !bare.is_wall_between(cell, seeker))
        .collect();
    let grid = bare.with_visibility(&sight, &sight);

    let mut policy = PursuitPolicy::new(PursuitConfig::default(), seed);
    let mut pathfinder = Pathfinder::new();
    let mut outcomes = Vec::new();

    for (second, hider) in hider_route().into_iter().enumerate() {
        let context = DecisionContext {
            grid,
            own_cell: seeker,
            own_position: seeker.center(),
            opponent_cell: hider,
            current_target: None,
            elapsed: Duration::from_secs(second as u64 * 2),
        };
        let decision = policy.decide(&context, &mut |cell| {
            !pathfinder
                .find_path(grid, seeker, cell, &ExtraCosts::new())
                .is_empty()
        });
        if let Some(cell) = decision.target() {
            assert!(grid.is_walkable(cell), "targeted wall {cell:?}");
        }
        outcomes.push((decision, policy.mode()));
    }

    outcomes
}

#[test]
fn pursuit_decisions_replay_identically_for_a_seed() {
    assert_eq!(replay(17), replay(17));
}

#[test]
fn pursuit_walks_through_every_active_mode() {
    let modes: Vec<PursuitMode> = replay(17).into_iter().map(|(_, mode)| mode).collect();

    assert_eq!(modes.first(), Some(&PursuitMode::Tracking));
    assert!(modes.contains(&PursuitMode::Predicting), "modes: {modes:?}");
    assert!(modes.contains(&PursuitMode::Exploring), "modes: {modes:?}");
}
