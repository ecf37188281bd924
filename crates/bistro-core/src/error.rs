//! Errors returned by the engine's entry points.

use bistro_logic::error::{InsufficientFunds, PlacementError, StorageFull};
use bistro_logic::ids::{FurnitureId, GridPos, StaffId};
use bistro_logic::recipes::Ingredient;

/// A rejected command. Nothing is mutated when one of these is returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimError {
    #[error("invalid placement: {0}")]
    InvalidPlacement(#[from] PlacementError),

    #[error("insufficient funds: {0}")]
    InsufficientFunds(#[from] InsufficientFunds),

    #[error(transparent)]
    StorageFull(#[from] StorageFull),

    #[error("no {0:?} seeds in stock")]
    NoSeeds(Ingredient),

    #[error("unknown staff member {0}")]
    UnknownStaff(StaffId),

    #[error("no furniture at {0}")]
    NoFurnitureAt(GridPos),

    #[error("furniture at {0} is not a garden")]
    NotAGarden(GridPos),

    #[error("{0} is not a free, clean table")]
    TableUnavailable(FurnitureId),

    #[error("garden at {0} has nothing ready to harvest")]
    GardenNotReady(GridPos),

    #[error("garden at {0} is already planted")]
    GardenOccupied(GridPos),

    #[error("{0} is not exhausted")]
    StaffNotExhausted(StaffId),
}

pub type SimResult<T> = Result<T, SimError>;
