#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Breadth-first distance fields and blind-spot grouping over the grid.

use std::collections::VecDeque;

use hiding_wumpus_core::{CellCoord, Distance, GridView, NeighborMode};

/// Hop distances from the nearest source to every cell of the grid.
///
/// Every step between Moore neighbours costs one hop. Cells no source
/// reaches stay [`Distance::Unreachable`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DistanceField {
    size: u32,
    distances: Vec<Distance>,
}

impl DistanceField {
    /// Computes a multi-source field over the whole grid.
    ///
    /// Sources seed the search as given, walls included. In
    /// [`NeighborMode::Walkable`] the search never enters a wall; in
    /// [`NeighborMode::IncludeWalls`] walls are ordinary nodes.
    #[must_use]
    pub fn compute(
        grid: GridView<'_>,
        sources: impl IntoIterator<Item = CellCoord>,
        mode: NeighborMode,
    ) -> Self {
        Self::compute_within(grid, sources, mode, |_| true)
    }

    /// Computes a multi-source field restricted to cells admitted by `region`.
    ///
    /// Sources outside the region are ignored and the search never enters a
    /// cell the region rejects.
    #[must_use]
    pub fn compute_within<F>(
        grid: GridView<'_>,
        sources: impl IntoIterator<Item = CellCoord>,
        mode: NeighborMode,
        region: F,
    ) -> Self
    where
        F: FnMut(CellCoord) -> bool,
    {
        let mut field = Self::default();
        field.rebuild_with(grid, sources, mode, region);
        field
    }

    /// Computes the walking distance from a single cell to every other cell.
    ///
    /// The source may be a wall; the search still never enters other walls.
    #[must_use]
    pub fn from_cell(grid: GridView<'_>, source: CellCoord) -> Self {
        Self::compute(grid, [source], NeighborMode::Walkable)
    }

    /// Rebuilds the field in place, reusing the distance buffer.
    pub fn rebuild_with<F>(
        &mut self,
        grid: GridView<'_>,
        sources: impl IntoIterator<Item = CellCoord>,
        mode: NeighborMode,
        mut admits: F,
    ) where
        F: FnMut(CellCoord) -> bool,
    {
        let cell_count = grid.cell_count();
        self.size = grid.size();
        self.distances.clear();
        self.distances.resize(cell_count, Distance::Unreachable);

        let mut queue = VecDeque::new();
        for source in sources {
            let Some(index) = grid.index(source) else {
                continue;
            };
            if self.distances[index] == Distance::Finite(0) || !admits(source) {
                continue;
            }
            self.distances[index] = Distance::Finite(0);
            queue.push_back((source, 0_u32));
        }

        while let Some((cell, distance)) = queue.pop_front() {
            let next = distance.saturating_add(1);
            for neighbor in grid.neighbors(cell, mode) {
                let Some(index) = grid.index(neighbor) else {
                    continue;
                };
                if self.distances[index].is_reachable() || !admits(neighbor) {
                    continue;
                }
                self.distances[index] = Distance::Finite(next);
                queue.push_back((neighbor, next));
            }
        }
    }

    /// Number of cells along each edge of the grid the field was built for.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Distance stored for the cell; cells off the grid are unreachable.
    #[must_use]
    pub fn get(&self, cell: CellCoord) -> Distance {
        self.view()
            .index(cell)
            .and_then(|index| self.distances.get(index).copied())
            .unwrap_or(Distance::Unreachable)
    }

    /// Dense distances in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[Distance] {
        &self.distances
    }

    /// Iterates every cell with its distance in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, Distance)> + '_ {
        let view = self.view();
        self.distances
            .iter()
            .enumerate()
            .filter_map(move |(index, distance)| Some((view.coord_at(index)?, *distance)))
    }

    /// Largest finite distance in the field.
    #[must_use]
    pub fn max_finite(&self) -> Option<u32> {
        self.distances.iter().filter_map(|distance| distance.finite()).max()
    }

    fn view(&self) -> GridView<'static> {
        GridView::new(self.size, &[])
    }
}

/// Connected groups of cells admitted by a region, labelled with their size.
///
/// Cells are connected through walkable Moore neighbours inside the region.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlindSpots {
    size: u32,
    group_of: Vec<Option<usize>>,
    group_sizes: Vec<u32>,
}

impl BlindSpots {
    /// Groups every walkable cell admitted by `region` into connected components.
    #[must_use]
    pub fn compute<F>(grid: GridView<'_>, mut region: F) -> Self
    where
        F: FnMut(CellCoord) -> bool,
    {
        let mut spots = Self {
            size: grid.size(),
            group_of: vec![None; grid.cell_count()],
            group_sizes: Vec::new(),
        };

        let mut admitted = vec![false; grid.cell_count()];
        for (index, cell) in grid.cells().enumerate() {
            admitted[index] = grid.is_walkable(cell) && region(cell);
        }

        let mut queue = VecDeque::new();
        for (index, cell) in grid.cells().enumerate() {
            if !admitted[index] || spots.group_of[index].is_some() {
                continue;
            }

            let group = spots.group_sizes.len();
            let mut members = 1_u32;
            spots.group_of[index] = Some(group);
            queue.push_back(cell);

            while let Some(current) = queue.pop_front() {
                for neighbor in grid.neighbors(current, NeighborMode::Walkable) {
                    let Some(neighbor_index) = grid.index(neighbor) else {
                        continue;
                    };
                    if !admitted[neighbor_index] || spots.group_of[neighbor_index].is_some() {
                        continue;
                    }
                    spots.group_of[neighbor_index] = Some(group);
                    members += 1;
                    queue.push_back(neighbor);
                }
            }

            spots.group_sizes.push(members);
        }

        spots
    }

    /// Size of the group containing the cell, or `None` outside every group.
    #[must_use]
    pub fn size_of(&self, cell: CellCoord) -> Option<u32> {
        let index = GridView::new(self.size, &[]).index(cell)?;
        let group = (*self.group_of.get(index)?)?;
        self.group_sizes.get(group).copied()
    }

    /// Number of distinct groups.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.group_sizes.len()
    }

    /// Reports whether two cells belong to the same group.
    #[must_use]
    pub fn same_group(&self, first: CellCoord, second: CellCoord) -> bool {
        let view = GridView::new(self.size, &[]);
        let group = |cell| {
            view.index(cell)
                .and_then(|index| self.group_of.get(index).copied().flatten())
        };
        matches!((group(first), group(second)), (Some(a), Some(b)) if a == b)
    }
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

    #[test]
    fn single_source_counts_diagonal_steps() {
        let walls = walls_at(5, &[]);
        let grid = GridView::new(5, &walls);

        let field = DistanceField::from_cell(grid, CellCoord::new(0, 0));

        assert_eq!(field.get(CellCoord::new(0, 0)), Distance::Finite(0));
        assert_eq!(field.get(CellCoord::new(3, 3)), Distance::Finite(3));
        assert_eq!(field.get(CellCoord::new(4, 1)), Distance::Finite(4));
        assert_eq!(field.max_finite(), Some(4));
    }

    #[test]
    fn walls_are_unreachable_in_walkable_mode() {
        let walls = walls_at(5, &[(2, 0), (2, 1), (2, 2), (2, 3), (2, 4)]);
        let grid = GridView::new(5, &walls);

        let field = DistanceField::compute(grid, [CellCoord::new(0, 0)], NeighborMode::Walkable);

        assert_eq!(field.get(CellCoord::new(2, 2)), Distance::Unreachable);
        assert_eq!(field.get(CellCoord::new(4, 4)), Distance::Unreachable);
        assert_eq!(field.get(CellCoord::new(1, 4)), Distance::Finite(4));
    }

    #[test]
    fn wall_permissive_mode_walks_through_walls() {
        let walls = walls_at(5, &[(2, 0), (2, 1), (2, 2), (2, 3), (2, 4)]);
        let grid = GridView::new(5, &walls);

        let field = DistanceField::compute(grid, [CellCoord::new(0, 0)], NeighborMode::IncludeWalls);

        assert_eq!(field.get(CellCoord::new(2, 2)), Distance::Finite(2));
        assert_eq!(field.get(CellCoord::new(4, 4)), Distance::Finite(4));
    }

    #[test]
    fn multiple_sources_take_the_nearest() {
        let walls = walls_at(7, &[]);
        let grid = GridView::new(7, &walls);

        let field = DistanceField::compute(
            grid,
            [CellCoord::new(0, 3), CellCoord::new(6, 3)],
            NeighborMode::Walkable,
        );

        assert_eq!(field.get(CellCoord::new(3, 3)), Distance::Finite(3));
        assert_eq!(field.get(CellCoord::new(5, 0)), Distance::Finite(3));
        assert_eq!(field.get(CellCoord::new(6, 3)), Distance::Finite(0));
    }

    #[test]
    fn region_limits_the_search() {
        let walls = walls_at(5, &[]);
        let grid = GridView::new(5, &walls);

        let field = DistanceField::compute_within(
            grid,
            [CellCoord::new(0, 0), CellCoord::new(4, 4)],
            NeighborMode::Walkable,
            |cell| cell.row() == 0,
        );

        assert_eq!(field.get(CellCoord::new(4, 0)), Distance::Finite(4));
        assert_eq!(field.get(CellCoord::new(4, 4)), Distance::Unreachable);
        assert_eq!(field.get(CellCoord::new(0, 1)), Distance::Unreachable);
    }

    #[test]
    fn empty_source_set_leaves_everything_unreachable() {
        let walls = walls_at(3, &[]);
        let grid = GridView::new(3, &walls);

        let field = DistanceField::compute(grid, [], NeighborMode::Walkable);

        assert!(field.cells().iter().all(|distance| !distance.is_reachable()));
        assert_eq!(field.max_finite(), None);
    }

    #[test]
    fn wall_source_still_escapes_in_single_source_mode() {
        let walls = walls_at(3, &[(0, 0), (2, 2)]);
        let grid = GridView::new(3, &walls);

        let field = DistanceField::from_cell(grid, CellCoord::new(0, 0));

        assert_eq!(field.get(CellCoord::new(1, 1)), Distance::Finite(1));
        assert_eq!(field.get(CellCoord::new(2, 2)), Distance::Unreachable);
    }

    #[test]
    fn blind_spots_group_connected_cells() {
        let walls = walls_at(5, &[(2, 0), (2, 1), (2, 2), (2, 3), (2, 4)]);
        let grid = GridView::new(5, &walls);

        let spots = BlindSpots::compute(grid, |cell| cell.column() != 4 || cell.row() < 2);

        assert_eq!(spots.group_count(), 2);
        assert_eq!(spots.size_of(CellCoord::new(0, 0)), Some(10));
        assert_eq!(spots.size_of(CellCoord::new(3, 0)), Some(7));
        assert_eq!(spots.size_of(CellCoord::new(4, 4)), None);
        assert_eq!(spots.size_of(CellCoord::new(2, 2)), None);
        assert!(spots.same_group(CellCoord::new(3, 4), CellCoord::new(4, 0)));
        assert!(!spots.same_group(CellCoord::new(0, 0), CellCoord::new(3, 0)));
    }

    #[test]
    fn diagonal_gap_splits_blind_spots() {
        let walls = walls_at(2, &[(1, 0), (0, 1)]);
        let grid = GridView::new(2, &walls);

        let spots = BlindSpots::compute(grid, |_| true);

        assert_eq!(spots.group_count(), 2);
        assert_eq!(spots.size_of(CellCoord::new(0, 0)), Some(1));
        assert_eq!(spots.size_of(CellCoord::new(1, 1)), Some(1));
    }
}
