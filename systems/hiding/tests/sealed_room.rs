use std::time::Duration;

use hiding_wumpus_core::{CellCoord, Decision, DecisionContext, GridView, Policy, Thought};
use hiding_wumpus_system_hiding::{HiderPolicy, HidingConfig};
use hiding_wumpus_system_pathfinding::{ExtraCosts, Pathfinder};

const SIZE: u32 = 8;

fn sealed_layout() -> Vec<bool> {
    let mut walls = vec![false; (SIZE * SIZE) as usize];
    for row in 0..SIZE {
        walls[(row * SIZE + 4) as usize] = true;
    }
    walls
}

#[test]
fn hider_behind_sealed_wall_picks_reachable_unseen_floor() {
    let walls = sealed_layout();
    let bare = GridView::new(SIZE, &walls);
    let seeker = CellCoord::new(1, 3);
    let hider = CellCoord::new(6, 6);
    let seeker_sight: Vec<bool> = bare
        .cells()
        .map(|cell| !bare.is_wall_between(cell, seeker))
        .collect();
    let hider_sight: Vec<bool> = bare
        .cells()
        .map(|cell| !bare.is_wall_between(cell, hider))
        .collect();
    let grid = bare.with_visibility(&seeker_sight, &hider_sight);

    let mut policy = HiderPolicy::new(HidingConfig::default(), 11);
    let mut pathfinder = Pathfinder::new();
    let context = DecisionContext {
        grid,
        own_cell: hider,
        own_position: hider.center(),
        opponent_cell: seeker,
        current_target: None,
        elapsed: Duration::from_secs(4),
    };

    let decision = policy.decide(&context, &mut |cell| {
        !pathfinder
            .find_path(grid, hider, cell, &ExtraCosts::new())
            .is_empty()
    });

    let Decision::Retarget { cell, thought } = decision else {
        panic!("hider should move, got {decision:?}");
    };
    assert_eq!(thought, Thought::Fleeing);
    assert!(!grid.is_wall(cell));
    assert!(!grid.is_visible_to_seeker(cell));
    assert!(cell.column() > 4, "{cell:?} lies on the seeker's side");
}

#[test]
fn identical_inputs_yield_identical_decisions() {
    let walls = sealed_layout();
    let bare = GridView::new(SIZE, &walls);
    let seeker = CellCoord::new(5, 0);
    let sight: Vec<bool> = bare
        .cells()
        .map(|cell| !bare.is_wall_between(cell, seeker))
        .collect();
    let grid = bare.with_visibility(&sight, &sight);
    let context = DecisionContext {
        grid,
        own_cell: CellCoord::new(7, 1),
        own_position: CellCoord::new(7, 1).center(),
        opponent_cell: seeker,
        current_target: None,
        elapsed: Duration::ZERO,
    };

    let mut first = HiderPolicy::new(HidingConfig::default(), 5);
    let mut second = HiderPolicy::new(HidingConfig::default(), 5);

    assert_eq!(
        first.decide(&context, &mut |_| true),
        second.decide(&context, &mut |_| true)
    );
    assert_eq!(first.evaluator().scores(), second.evaluator().scores());
}
