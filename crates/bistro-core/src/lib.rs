//! Bistro Core - Restaurant Simulation Engine
//!
//! A tick-driven simulation of a small restaurant: customers walk in, order,
//! wait and pay; cooks, servers and cleaners work the grid between stoves,
//! counters and tables.
//!
//! # Architecture
//!
//! Agents live in a `hecs` ECS world; everything else lives in a
//! [`context::SimulationContext`]:
//! - **Entities**: staff and customers, each with a `Motor`
//! - **Context**: grid, furniture, order board, ledger, pantry, recipe book
//! - **Systems**: per-tick logic run in a fixed order by the engine
//!
//! # Example
//!
//! ```rust,no_run
//! use bistro_core::prelude::*;
//!
//! let mut engine = SimulationEngine::starter();
//! let table = engine.place_furniture(FurnitureKind::Table, GridPos::new(8, 8)).unwrap();
//! engine.spawn_customer(table).unwrap();
//!
//! loop {
//!     engine.tick(1.0 / 60.0);
//! }
//! ```

pub mod components;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod persistence;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::engine::{AgentKind, AgentView, SimulationEngine};
    pub use crate::error::{SimError, SimResult};
    pub use bistro_logic::config::SimConfig;
    pub use bistro_logic::ids::{CustomerId, FurnitureId, GridPos, StaffId};
    pub use bistro_logic::recipes::{Ingredient, Recipe};
    pub use bistro_logic::stations::{DecorKind, FurnitureKind};
}
