//! Staff components: role, task state, energy and progression.

use serde::{Deserialize, Serialize};

use bistro_logic::economy::Progression;
use bistro_logic::ids::{CustomerId, FurnitureId, StaffId};
use bistro_logic::recipes::Recipe;

pub const FULL_ENERGY: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StaffRole {
    Cook,
    Server,
    Cleaner,
}

impl StaffRole {
    pub fn name(self) -> &'static str {
        match self {
            StaffRole::Cook => "cook",
            StaffRole::Server => "server",
            StaffRole::Cleaner => "cleaner",
        }
    }
}

/// What a staff member is doing, with everything the current task refers to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StaffState {
    Idle,
    /// Out of energy; waits to be fed.
    Exhausted,

    // Cook
    MovingToStation {
        order: CustomerId,
        recipe: Recipe,
        station: FurnitureId,
        dropoff: FurnitureId,
        timer: f32,
    },
    Cooking {
        order: CustomerId,
        recipe: Recipe,
        station: FurnitureId,
        dropoff: FurnitureId,
        timer: f32,
    },
    MovingToDropoff {
        order: CustomerId,
        recipe: Recipe,
        dropoff: FurnitureId,
    },

    // Server
    MovingToPickup {
        customer: CustomerId,
        item: Recipe,
        dropoff: FurnitureId,
    },
    MovingToTable {
        customer: CustomerId,
        item: Recipe,
    },

    // Cleaner
    MovingToDirt {
        table: FurnitureId,
    },
    Cleaning {
        table: FurnitureId,
        timer: f32,
    },
}

impl StaffState {
    pub fn tag(&self) -> &'static str {
        match self {
            StaffState::Idle => "idle",
            StaffState::Exhausted => "exhausted",
            StaffState::MovingToStation { .. } => "moving_to_station",
            StaffState::Cooking { .. } => "cooking",
            StaffState::MovingToDropoff { .. } => "moving_to_dropoff",
            StaffState::MovingToPickup { .. } => "moving_to_pickup",
            StaffState::MovingToTable { .. } => "moving_to_table",
            StaffState::MovingToDirt { .. } => "moving_to_dirt",
            StaffState::Cleaning { .. } => "cleaning",
        }
    }

    /// Working states drain energy.
    pub fn is_working(&self) -> bool {
        !matches!(self, StaffState::Idle | StaffState::Exhausted)
    }

    /// Recipe a cook has committed to but not yet delivered.
    pub fn recipe_in_progress(&self) -> Option<Recipe> {
        match self {
            StaffState::MovingToStation { recipe, .. }
            | StaffState::Cooking { recipe, .. }
            | StaffState::MovingToDropoff { recipe, .. } => Some(*recipe),
            _ => None,
        }
    }

    /// Dropoff a cook intends to fill.
    pub fn dropoff_target(&self) -> Option<FurnitureId> {
        match self {
            StaffState::MovingToStation { dropoff, .. }
            | StaffState::Cooking { dropoff, .. }
            | StaffState::MovingToDropoff { dropoff, .. } => Some(*dropoff),
            _ => None,
        }
    }

    /// Item a server has in hand.
    pub fn carried_item(&self) -> Option<Recipe> {
        match self {
            StaffState::MovingToTable { item, .. } => Some(*item),
            _ => None,
        }
    }

    /// Customer a server is working for.
    pub fn serving(&self) -> Option<CustomerId> {
        match self {
            StaffState::MovingToPickup { customer, .. } | StaffState::MovingToTable { customer, .. } => {
                Some(*customer)
            }
            _ => None,
        }
    }
}

/// A hired staff member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Staff {
    pub id: StaffId,
    pub role: StaffRole,
    pub state: StaffState,
    pub energy: f32,
    pub progress: Progression,
}

impl Staff {
    pub fn new(id: StaffId, role: StaffRole, max_xp: u32) -> Self {
        Self {
            id,
            role,
            state: StaffState::Idle,
            energy: FULL_ENERGY,
            progress: Progression::new(max_xp),
        }
    }
}
