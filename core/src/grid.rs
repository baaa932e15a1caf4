//! Read-only grid queries shared by every system.

use crate::CellCoord;

/// Selects whether wall cells may be returned by [`GridView::neighbors`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NeighborMode {
    /// Only open cells are neighbours; used for paths and walking distances.
    Walkable,
    /// Wall cells are returned too; used when sensing walls.
    IncludeWalls,
}

/// Snapshot of a single cell's flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellState {
    /// Position of the cell.
    pub coord: CellCoord,
    /// Whether the cell blocks movement and sight.
    pub is_wall: bool,
    /// Whether the seeker had line of sight to the cell on the last tick.
    pub visible_to_seeker: bool,
    /// Whether the hider had line of sight to the cell on the last tick.
    pub visible_to_hider: bool,
}

/// Borrowed view over a square grid's walls and visibility flags.
///
/// Flags are stored row-major. Cells without a visibility sample report
/// `false`.
#[derive(Clone, Copy, Debug)]
pub struct GridView<'a> {
    size: u32,
    walls: &'a [bool],
    seeker_visibility: &'a [bool],
    hider_visibility: &'a [bool],
}

impl<'a> GridView<'a> {
    /// Captures a view over the provided wall flags without visibility data.
    #[must_use]
    pub const fn new(size: u32, walls: &'a [bool]) -> Self {
        Self {
            size,
            walls,
            seeker_visibility: &[],
            hider_visibility: &[],
        }
    }

    /// Attaches per-cell visibility flags to the view.
    #[must_use]
    pub const fn with_visibility(self, seeker: &'a [bool], hider: &'a [bool]) -> Self {
        Self {
            seeker_visibility: seeker,
            hider_visibility: hider,
            ..self
        }
    }

    /// Number of cells along each edge.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Total number of cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let edge = usize::try_from(self.size).unwrap_or(0);
        edge.saturating_mul(edge)
    }

    /// Reports whether signed coordinates fall inside the grid.
    #[must_use]
    pub fn is_valid_position(&self, column: i64, row: i64) -> bool {
        let size = i64::from(self.size);
        (0..size).contains(&column) && (0..size).contains(&row)
    }

    /// Reports whether the cell lies on the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.size && cell.row() < self.size
    }

    /// Row-major index of the cell, if it lies on the grid.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.size).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    /// Cell stored at the provided row-major index.
    #[must_use]
    pub fn coord_at(&self, index: usize) -> Option<CellCoord> {
        if index >= self.cell_count() {
            return None;
        }
        let width = usize::try_from(self.size).ok()?;
        let column = u32::try_from(index % width).ok()?;
        let row = u32::try_from(index / width).ok()?;
        Some(CellCoord::new(column, row))
    }

    /// Iterates every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let size = self.size;
        (0..size).flat_map(move |row| (0..size).map(move |column| CellCoord::new(column, row)))
    }

    /// Snapshot of the cell's flags, or `None` when it lies off the grid.
    #[must_use]
    pub fn cell(&self, cell: CellCoord) -> Option<CellState> {
        let index = self.index(cell)?;
        Some(CellState {
            coord: cell,
            is_wall: flag(self.walls, index),
            visible_to_seeker: flag(self.seeker_visibility, index),
            visible_to_hider: flag(self.hider_visibility, index),
        })
    }

    /// Reports whether the cell is a wall. Cells off the grid are not walls.
    #[must_use]
    pub fn is_wall(&self, cell: CellCoord) -> bool {
        self.index(cell).map_or(false, |index| flag(self.walls, index))
    }

    /// Reports whether the cell lies on the grid and is open floor.
    #[must_use]
    pub fn is_walkable(&self, cell: CellCoord) -> bool {
        self.index(cell).map_or(false, |index| !flag(self.walls, index))
    }

    /// Reports whether the seeker saw the cell on the last visibility pass.
    #[must_use]
    pub fn is_visible_to_seeker(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .map_or(false, |index| flag(self.seeker_visibility, index))
    }

    /// Reports whether the hider saw the cell on the last visibility pass.
    #[must_use]
    pub fn is_visible_to_hider(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .map_or(false, |index| flag(self.hider_visibility, index))
    }

    /// Returns the Moore neighbourhood of `cell`, clipped to the grid.
    ///
    /// Wall cells are skipped in [`NeighborMode::Walkable`]. In both modes a
    /// diagonal neighbour is skipped when both orthogonal cells flanking the
    /// move are walls, so nothing slips through a diagonal gap.
    #[must_use]
    pub fn neighbors(&self, cell: CellCoord, mode: NeighborMode) -> Neighbors {
        let mut neighbors = Neighbors::default();
        if !self.contains(cell) {
            return neighbors;
        }

        for column_delta in -1..=1 {
            for row_delta in -1..=1 {
                if column_delta == 0 && row_delta == 0 {
                    continue;
                }
                let Some(candidate) = cell.offset(column_delta, row_delta) else {
                    continue;
                };
                if !self.contains(candidate) {
                    continue;
                }
                if mode == NeighborMode::Walkable && self.is_wall(candidate) {
                    continue;
                }
                if column_delta != 0 && row_delta != 0 && self.cuts_corner(cell, column_delta, row_delta)
                {
                    continue;
                }
                neighbors.push(candidate);
            }
        }

        neighbors
    }

    /// Reports whether a wall lies strictly between two cells on their Bresenham line.
    ///
    /// The line is always traced from the smaller coordinate to the larger
    /// one, so swapping the arguments rasterises the same cells and yields the
    /// same answer. The endpoints themselves never block.
    #[must_use]
    pub fn is_wall_between(&self, from: CellCoord, to: CellCoord) -> bool {
        let (start, end) = if from <= to { (from, to) } else { (to, from) };
        bresenham_line(start, end)
            .filter(|&cell| cell != start && cell != end)
            .any(|cell| self.is_wall(cell))
    }

    fn cuts_corner(&self, cell: CellCoord, column_delta: i32, row_delta: i32) -> bool {
        let horizontal = cell.offset(column_delta, 0);
        let vertical = cell.offset(0, row_delta);
        match (horizontal, vertical) {
            (Some(horizontal), Some(vertical)) => self.is_wall(horizontal) && self.is_wall(vertical),
            _ => false,
        }
    }
}

fn flag(flags: &[bool], index: usize) -> bool {
    flags.get(index).copied().unwrap_or(false)
}

/// Fixed-capacity neighbour list returned by [`GridView::neighbors`].
#[derive(Clone, Debug, Default)]
pub struct Neighbors {
    buffer: [Option<CellCoord>; 8],
    len: usize,
    cursor: usize,
}

impl Neighbors {
    fn push(&mut self, cell: CellCoord) {
        if self.len < self.buffer.len() {
            self.buffer[self.len] = Some(cell);
            self.len += 1;
        }
    }
}

impl Iterator for Neighbors {
    type Item = CellCoord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.len {
            return None;
        }

        let value = self.buffer[self.cursor];
        self.cursor += 1;
        value
    }
}

/// Traces the integer Bresenham line between two cells, both endpoints included.
#[must_use]
pub fn bresenham_line(from: CellCoord, to: CellCoord) -> LineCells {
    let column = i64::from(from.column());
    let row = i64::from(from.row());
    let end_column = i64::from(to.column());
    let end_row = i64::from(to.row());
    let delta_column = (end_column - column).abs();
    let delta_row = (end_row - row).abs();

    LineCells {
        column,
        row,
        end_column,
        end_row,
        delta_column,
        delta_row,
        step_column: if column < end_column { 1 } else { -1 },
        step_row: if row < end_row { 1 } else { -1 },
        error: delta_column - delta_row,
        finished: false,
    }
}

/// Iterator over the cells of a Bresenham line.
#[derive(Clone, Debug)]
pub struct LineCells {
    column: i64,
    row: i64,
    end_column: i64,
    end_row: i64,
    delta_column: i64,
    delta_row: i64,
    step_column: i64,
    step_row: i64,
    error: i64,
    finished: bool,
}

impl Iterator for LineCells {
    type Item = CellCoord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let current = CellCoord::new(
            u32::try_from(self.column).ok()?,
            u32::try_from(self.row).ok()?,
        );

        if self.column == self.end_column && self.row == self.end_row {
            self.finished = true;
            return Some(current);
        }

        let doubled = 2 * self.error;
        if doubled > -self.delta_row {
            self.error -= self.delta_row;
            self.column += self.step_column;
        }
        if doubled < self.delta_column {
            self.error += self.delta_column;
            self.row += self.step_row;
        }

        Some(current)
    }
}
