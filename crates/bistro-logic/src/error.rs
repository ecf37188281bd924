//! Error types shared by the pure logic modules.

use crate::ids::GridPos;

/// Why a piece of furniture could not be placed on a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PlacementError {
    #[error("cell {0} is outside the grid")]
    OutOfBounds(GridPos),

    #[error("cell {0} is a wall")]
    Wall(GridPos),

    #[error("cell {0} is already occupied")]
    Occupied(GridPos),
}

/// A purchase was attempted without enough money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("need ${needed}, have ${available}")]
pub struct InsufficientFunds {
    pub needed: i64,
    pub available: i64,
}

/// Adding ingredients would exceed the pantry's storage limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("storage full: {stored} stored + {incoming} incoming exceeds limit {limit}")]
pub struct StorageFull {
    pub stored: u32,
    pub incoming: u32,
    pub limit: u32,
}
