//! Owning cell grid with wall and visibility flags.

use hiding_wumpus_core::{CellCoord, CellPoint, CellState, GridView};

/// Square grid of cells owned by the world.
///
/// Walls change through world commands only; visibility is recomputed from
/// both agents' cells after every mutation and tick.
#[derive(Clone, Debug)]
pub struct Grid {
    size: u32,
    tile_length: f32,
    header_height: f32,
    walls: Vec<bool>,
    seeker_visibility: Vec<bool>,
    hider_visibility: Vec<bool>,
}

impl Grid {
    pub(crate) fn new(size: u32, tile_length: f32, header_height: f32) -> Self {
        let edge = usize::try_from(size).unwrap_or(0);
        let cell_count = edge.checked_mul(edge).unwrap_or(0);
        Self {
            size,
            tile_length,
            header_height,
            walls: vec![false; cell_count],
            seeker_visibility: vec![true; cell_count],
            hider_visibility: vec![true; cell_count],
        }
    }

    /// Number of cells along each edge.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Side length of a cell in screen pixels.
    #[must_use]
    pub fn tile_length(&self) -> f32 {
        self.tile_length
    }

    /// Borrowed view used by systems.
    #[must_use]
    pub fn view(&self) -> GridView<'_> {
        GridView::new(self.size, &self.walls)
            .with_visibility(&self.seeker_visibility, &self.hider_visibility)
    }

    /// Reports whether signed coordinates fall inside the grid.
    #[must_use]
    pub fn is_valid_position(&self, column: i64, row: i64) -> bool {
        self.view().is_valid_position(column, row)
    }

    /// Snapshot of the cell's flags, or `None` when it lies off the grid.
    #[must_use]
    pub fn cell(&self, cell: CellCoord) -> Option<CellState> {
        self.view().cell(cell)
    }

    /// Iterates the wall cells in row-major order.
    pub fn wall_cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        let view = self.view();
        self.walls
            .iter()
            .enumerate()
            .filter(|(_, is_wall)| **is_wall)
            .filter_map(move |(index, _)| view.coord_at(index))
    }

    /// Converts a position in cell units to screen pixels.
    #[must_use]
    pub fn grid_to_screen(&self, point: CellPoint) -> (f32, f32) {
        (
            point.column() * self.tile_length,
            point.row() * self.tile_length + self.header_height,
        )
    }

    /// Converts screen pixels to the cell underneath, clamped onto the grid.
    #[must_use]
    pub fn screen_to_grid(&self, x: f32, y: f32) -> CellCoord {
        let last = self.size.saturating_sub(1);
        if self.tile_length <= 0.0 {
            return CellCoord::new(0, 0);
        }
        let column = (x / self.tile_length).max(0.0) as u32;
        let row = ((y - self.header_height) / self.tile_length).max(0.0) as u32;
        CellCoord::new(column.min(last), row.min(last))
    }

    pub(crate) fn toggle_wall(&mut self, cell: CellCoord) -> Option<bool> {
        let index = self.view().index(cell)?;
        let slot = self.walls.get_mut(index)?;
        *slot = !*slot;
        Some(*slot)
    }

    pub(crate) fn clear_walls(&mut self) {
        self.walls.fill(false);
    }

    /// Replaces the wall layout, ignoring cells off the grid. Returns the ignored count.
    pub(crate) fn replace_walls(&mut self, cells: &[CellCoord]) -> usize {
        self.walls.fill(false);
        let mut ignored = 0;
        for &cell in cells {
            match self.view().index(cell) {
                Some(index) => self.walls[index] = true,
                None => ignored += 1,
            }
        }
        ignored
    }

    pub(crate) fn wall_count(&self) -> usize {
        self.walls.iter().filter(|is_wall| **is_wall).count()
    }

    pub(crate) fn update_visibility(&mut self, seeker: CellCoord, hider: CellCoord) {
        let size = self.size;
        let (seeker_flags, hider_flags) = {
            let view = GridView::new(size, &self.walls);
            let seeker_flags: Vec<bool> = view
                .cells()
                .map(|cell| !view.is_wall_between(cell, seeker))
                .collect();
            let hider_flags: Vec<bool> = view
                .cells()
                .map(|cell| !view.is_wall_between(cell, hider))
                .collect();
            (seeker_flags, hider_flags)
        };
        self.seeker_visibility = seeker_flags;
        self.hider_visibility = hider_flags;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_twice_restores_the_cell() {
        let mut grid = Grid::new(4, 30.0, 100.0);
        let cell = CellCoord::new(2, 3);

        assert_eq!(grid.toggle_wall(cell), Some(true));
        assert_eq!(grid.toggle_wall(cell), Some(false));
        assert!(grid.cell(cell).map_or(false, |state| !state.is_wall));
        assert_eq!(grid.toggle_wall(CellCoord::new(4, 0)), None);
    }

    #[test]
    fn screen_conversions_account_for_header() {
        let grid = Grid::new(20, 30.0, 100.0);

        assert_eq!(
            grid.grid_to_screen(CellPoint::new(2.0, 1.0)),
            (60.0, 130.0)
        );
        assert_eq!(grid.screen_to_grid(65.0, 131.0), CellCoord::new(2, 1));
        assert_eq!(grid.screen_to_grid(-10.0, 20.0), CellCoord::new(0, 0));
        assert_eq!(grid.screen_to_grid(5_000.0, 5_000.0), CellCoord::new(19, 19));
    }

    #[test]
    fn visibility_is_blocked_by_walls() {
        let mut grid = Grid::new(5, 30.0, 0.0);
        let _ = grid.replace_walls(&[CellCoord::new(2, 0)]);
        grid.update_visibility(CellCoord::new(0, 0), CellCoord::new(4, 4));

        let view = grid.view();
        assert!(!view.is_visible_to_seeker(CellCoord::new(4, 0)));
        assert!(view.is_visible_to_seeker(CellCoord::new(1, 0)));
        assert!(view.is_visible_to_hider(CellCoord::new(4, 0)));
    }

    #[test]
    fn replacing_walls_ignores_cells_off_grid() {
        let mut grid = Grid::new(3, 30.0, 0.0);

        let ignored = grid.replace_walls(&[CellCoord::new(1, 1), CellCoord::new(7, 0)]);

        assert_eq!(ignored, 1);
        assert_eq!(grid.wall_count(), 1);
        assert_eq!(grid.wall_cells().collect::<Vec<_>>(), vec![CellCoord::new(1, 1)]);
    }
}
