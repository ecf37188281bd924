//! Component definitions for the ECS simulation.
//!
//! Components are pure data structs attached to agent entities. Every agent
//! also carries a `bistro_logic::motor::Motor` for movement. Behavior lives
//! in systems.

mod customer;
mod staff;

pub use bistro_logic::motor::Motor;
pub use customer::*;
pub use staff::*;
