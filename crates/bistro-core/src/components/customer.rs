//! Customer components.

use serde::{Deserialize, Serialize};

use bistro_logic::ids::{CustomerId, FurnitureId, GridPos};
use bistro_logic::recipes::Recipe;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CustomerState {
    /// Walking from the entrance to the table.
    Arriving,
    WaitingForFood,
    /// A server is bringing the food; patience is frozen.
    BeingServed,
    Eating { remaining: f32 },
    Leaving,
    LeavingAngry,
}

impl CustomerState {
    pub fn tag(&self) -> &'static str {
        match self {
            CustomerState::Arriving => "arriving",
            CustomerState::WaitingForFood => "waiting_for_food",
            CustomerState::BeingServed => "being_served",
            CustomerState::Eating { .. } => "eating",
            CustomerState::Leaving => "leaving",
            CustomerState::LeavingAngry => "leaving_angry",
        }
    }

    /// States in which the customer has an open order.
    pub fn has_open_order(&self) -> bool {
        matches!(self, CustomerState::WaitingForFood | CustomerState::BeingServed)
    }

    /// States in which the customer holds their table.
    pub fn holds_table(&self) -> bool {
        !matches!(self, CustomerState::Leaving | CustomerState::LeavingAngry)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub table: FurnitureId,
    /// Cell of the table, cached so a removed table can still be walked away from.
    pub seat: GridPos,
    pub order: Recipe,
    pub patience: f32,
    pub max_patience: f32,
    pub vip: bool,
    pub state: CustomerState,
}

/// Marks an agent for removal at the end of the tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Departed;
