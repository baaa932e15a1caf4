//! Saved level layout.

use hiding_wumpus_core::{CellCoord, CellPoint};
use serde::{Deserialize, Serialize};

/// Grid size, walls, seeker position and optional seeker target.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Level {
    /// Number of cells along each grid edge.
    pub grid_size: u32,
    /// Wall cells as `[column, row]` pairs.
    pub walls: Vec<[u32; 2]>,
    /// Continuous seeker position as `[column, row]`.
    pub npc_position: [f32; 2],
    /// Cell the seeker walks towards, if any.
    pub target_position: Option<[u32; 2]>,
}

impl Level {
    /// Wall cells in the order they were stored.
    pub fn wall_cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.walls
            .iter()
            .map(|&[column, row]| CellCoord::new(column, row))
    }

    /// Seeker position as a grid point.
    #[must_use]
    pub fn seeker_position(&self) -> CellPoint {
        let [column, row] = self.npc_position;
        CellPoint::new(column, row)
    }

    /// Seeker target as a cell.
    #[must_use]
    pub fn target(&self) -> Option<CellCoord> {
        self.target_position
            .map(|[column, row]| CellCoord::new(column, row))
    }

    /// First wall or target cell that lies outside the grid.
    #[must_use]
    pub fn first_cell_outside_grid(&self) -> Option<CellCoord> {
        let size = self.grid_size;
        self.wall_cells()
            .chain(self.target())
            .find(|cell| cell.column() >= size || cell.row() >= size)
    }
}
