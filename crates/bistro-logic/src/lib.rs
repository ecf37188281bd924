//! Pure simulation logic for Bistro.
//!
//! This crate contains the restaurant rules that are independent of the ECS
//! world and of any runtime: plain data structures and functions over them,
//! unit-testable on their own.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | `SimConfig` tunables with serde defaults |
//! | [`economy`] | Ledger, progression, decor bonuses, payment, prices |
//! | [`error`] | Placement and resource errors |
//! | [`grid`] | Occupancy grid with walls and walkability |
//! | [`ids`] | Id newtypes, id allocation, grid coordinates |
//! | [`motor`] | Continuous agent movement along cell paths |
//! | [`orders`] | FIFO order board keyed by customer |
//! | [`pathfinding`] | BFS routing with a revision-scoped cache |
//! | [`recipes`] | Recipes, ingredients, pantry, recipe discovery |
//! | [`stations`] | Furniture arena: reservations, dropoffs, tables, gardens |

pub mod config;
pub mod economy;
pub mod error;
pub mod grid;
pub mod ids;
pub mod motor;
pub mod orders;
pub mod pathfinding;
pub mod recipes;
pub mod stations;
