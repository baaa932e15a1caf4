use hiding_wumpus_core::{CellCoord, Distance, GridView, NeighborMode};
use hiding_wumpus_system_distance_field::DistanceField;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const SIZE: u32 = 9;

#[test]
fn distances_match_exhaustive_relaxation_on_sampled_grids() {
    let mut rng = ChaCha8Rng::seed_from_u64(0xbf5);

    for round in 0..40 {
        let walls: Vec<bool> = (0..SIZE * SIZE).map(|_| rng.gen_bool(0.3)).collect();
        let grid = GridView::new(SIZE, &walls);
        let source_count = rng.gen_range(1..4);
        let sources: Vec<CellCoord> = (0..source_count)
            .map(|_| CellCoord::new(rng.gen_range(0..SIZE), rng.gen_range(0..SIZE)))
            .collect();
        let mode = if round % 2 == 0 {
            NeighborMode::Walkable
        } else {
            NeighborMode::IncludeWalls
        };

        let field = DistanceField::compute(grid, sources.iter().copied(), mode);
        let expected = relax(grid, &sources, mode);

        for (index, cell) in grid.cells().enumerate() {
            let expected = expected[index].map_or(Distance::Unreachable, Distance::Finite);
            assert_eq!(
                field.get(cell),
                expected,
                "round {round}: distance mismatch at {cell:?} for sources {sources:?}"
            );
        }
    }
}

#[test]
fn multi_source_field_is_the_minimum_of_single_source_fields() {
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let walls: Vec<bool> = (0..SIZE * SIZE).map(|_| rng.gen_bool(0.2)).collect();
    let grid = GridView::new(SIZE, &walls);
    let sources = [CellCoord::new(0, 0), CellCoord::new(8, 8), CellCoord::new(4, 0)];

    let combined = DistanceField::compute(grid, sources, NeighborMode::Walkable);
    let singles: Vec<DistanceField> = sources
        .iter()
        .map(|&source| DistanceField::from_cell(grid, source))
        .collect();

    for cell in grid.cells() {
        let nearest = singles
            .iter()
            .map(|field| field.get(cell))
            .min()
            .unwrap_or(Distance::Unreachable);
        assert_eq!(combined.get(cell), nearest, "mismatch at {cell:?}");
    }
}

/// Bellman-Ford style relaxation used as an independent oracle.
fn relax(grid: GridView<'_>, sources: &[CellCoord], mode: NeighborMode) -> Vec<Option<u32>> {
    let mut distances = vec![None; grid.cell_count()];
    for &source in sources {
        if let Some(index) = grid.index(source) {
            distances[index] = Some(0);
        }
    }

    let mut changed = true;
    while changed {
        changed = false;
        for cell in grid.cells() {
            let Some(index) = grid.index(cell) else {
                continue;
            };
            let Some(distance) = distances[index] else {
                continue;
            };
            for neighbor in grid.neighbors(cell, mode) {
                let Some(neighbor_index) = grid.index(neighbor) else {
                    continue;
                };
                let candidate = distance + 1;
                if distances[neighbor_index].map_or(true, |current| candidate < current) {
                    distances[neighbor_index] = Some(candidate);
                    changed = true;
                }
            }
        }
    }

    distances
}
