//! Systems - logic that operates on components
//!
//! Run by `SimulationEngine::tick` in this order: movement, staff,
//! customers, gardens and dirt, spawner, eviction.

pub mod cleaner;
pub mod cook;
pub mod customer;
mod eviction;
pub mod garden;
mod movement;
pub mod server;
mod spawner;
mod staff;

pub use cleaner::dirt_system;
pub use customer::customer_system;
pub use eviction::*;
pub use garden::garden_system;
pub use movement::*;
pub use spawner::*;
pub use staff::*;
