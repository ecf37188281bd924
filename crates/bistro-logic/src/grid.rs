//! Occupancy grid: walls, furniture ids per cell, walkability.
//!
//! "Has furniture" and "blocks movement" are tracked separately. A rug sits
//! on a cell without blocking it, and pathfinding only ever looks at the
//! blocking flag.

use serde::{Deserialize, Serialize};

use crate::error::PlacementError;
use crate::ids::{FurnitureId, GridPos};

/// A single grid cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Permanent wall; never walkable, never buildable.
    pub wall: bool,
    /// Furniture standing on this cell, if any.
    pub occupant: Option<FurnitureId>,
    /// True when the occupant blocks movement.
    pub blocks: bool,
}

impl Cell {
    pub fn is_walkable(&self) -> bool {
        !self.wall && !self.blocks
    }
}

/// Largest supported grid edge.
pub const MAX_GRID_SIZE: u32 = 256;

/// Square N×N grid stored row-major.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridWorld {
    size: i32,
    cells: Vec<Cell>,
    /// Bumped on every mutation; lets path caches notice stale results.
    revision: u64,
}

impl GridWorld {
    /// Restaurant grid: the row `y == 0` and column `x == 0` are walls.
    pub fn with_walls(size: u32) -> Self {
        let mut grid = Self::open(size);
        for y in 0..grid.size {
            for x in 0..grid.size {
                if x == 0 || y == 0 {
                    let idx = grid.index(GridPos::new(x, y));
                    grid.cells[idx].wall = true;
                }
            }
        }
        grid
    }

    /// Grid without any walls. `size` is capped at `MAX_GRID_SIZE`.
    pub fn open(size: u32) -> Self {
        let size = size.min(MAX_GRID_SIZE) as usize;
        Self {
            size: size as i32,
            cells: vec![Cell::default(); size * size],
            revision: 0,
        }
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.size && pos.y < self.size
    }

    fn index(&self, pos: GridPos) -> usize {
        (pos.y * self.size + pos.x) as usize
    }

    /// Dense index for a cell, `None` when out of bounds.
    pub fn cell_index(&self, pos: GridPos) -> Option<usize> {
        self.in_bounds(pos).then(|| self.index(pos))
    }

    pub fn cell(&self, pos: GridPos) -> Option<&Cell> {
        self.cell_index(pos).map(|i| &self.cells[i])
    }

    pub fn is_wall(&self, pos: GridPos) -> bool {
        self.cell(pos).map(|c| c.wall).unwrap_or(false)
    }

    /// Out-of-bounds cells are never walkable.
    pub fn is_walkable(&self, pos: GridPos) -> bool {
        self.cell(pos).map(Cell::is_walkable).unwrap_or(false)
    }

    pub fn occupant_at(&self, pos: GridPos) -> Option<FurnitureId> {
        self.cell(pos).and_then(|c| c.occupant)
    }

    /// Put furniture on a free, in-bounds, non-wall cell.
    pub fn place(
        &mut self,
        id: FurnitureId,
        pos: GridPos,
        blocks_movement: bool,
    ) -> Result<(), PlacementError> {
        self.check_placement(pos)?;
        let idx = self.index(pos);
        self.cells[idx].occupant = Some(id);
        self.cells[idx].blocks = blocks_movement;
        self.revision += 1;
        Ok(())
    }

    /// Validate a placement without mutating anything.
    pub fn check_placement(&self, pos: GridPos) -> Result<(), PlacementError> {
        let cell = self.cell(pos).ok_or(PlacementError::OutOfBounds(pos))?;
        if cell.wall {
            return Err(PlacementError::Wall(pos));
        }
        if cell.occupant.is_some() {
            return Err(PlacementError::Occupied(pos));
        }
        Ok(())
    }

    /// Clear a cell, returning whatever stood there.
    pub fn remove(&mut self, pos: GridPos) -> Option<FurnitureId> {
        let idx = self.cell_index(pos)?;
        let occupant = self.cells[idx].occupant.take()?;
        self.cells[idx].blocks = false;
        self.revision += 1;
        Some(occupant)
    }

    /// All cells holding furniture, in row-major order.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (GridPos, FurnitureId)> + '_ {
        self.cells.iter().enumerate().filter_map(move |(i, c)| {
            let pos = GridPos::new(i as i32 % self.size, i as i32 / self.size);
            c.occupant.map(|id| (pos, id))
        })
    }

    /// Structural self-check used when restoring snapshots.
    pub fn is_consistent(&self) -> bool {
        if self.size <= 0 || self.size as u32 > MAX_GRID_SIZE {
            return false;
        }
        if Some(self.cells.len()) != (self.size as usize).checked_mul(self.size as usize) {
            return false;
        }
        self.cells
            .iter()
            .all(|c| !(c.wall && c.occupant.is_some()) && (c.occupant.is_some() || !c.blocks))
    }
}
