//! Tunable simulation parameters.
//!
//! Every field has a default, so a partial JSON document only overrides the
//! values it names. Loading from disk lives in `bistro-core`.

use serde::{Deserialize, Serialize};

/// All knobs of a restaurant simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // Spatial
    pub grid_size: u32,
    /// Largest step `tick` will simulate at once.
    pub max_dt: f32,
    /// Walking speed of new agents, tiles per second.
    pub agent_speed: f32,
    pub path_cache_capacity: usize,

    // Kitchen
    /// Global multiplier on cook time (2.0 = twice as fast).
    pub cooking_speed: f32,
    pub dropoff_capacity: usize,

    // Customers
    pub patience: f32,
    pub vip_patience: f32,
    pub vip_chance: f64,
    pub eat_duration: f32,
    pub dirty_chance: f64,
    /// `None` leaves dirty tables for a cleaner.
    pub auto_clean_after: Option<f32>,
    pub clean_duration: f32,

    // Staff
    pub energy_decay_per_sec: f32,
    pub feed_cost: i64,
    pub staff_xp_per_cook: u32,
    pub staff_max_xp: u32,
    pub level_up_speed_bonus: f32,
    pub cook_hire_cost: i64,
    pub server_hire_cost: i64,
    pub cleaner_hire_cost: i64,

    // Economy
    pub starting_money: i64,
    pub starting_ingredients: u32,
    pub storage_limit: u32,
    pub storage_upgrade_step: u32,
    pub seed_cost: i64,
    pub harvest_yield: u32,
    pub harvest_xp: u32,
    pub garden_growth_per_sec: f32,
    pub starting_max_xp: u32,
    pub starting_max_fame: f32,
    pub fame_per_sec: f32,
    pub fame_cap_step: f32,

    // Spawning
    pub auto_spawn: bool,
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            grid_size: 12,
            max_dt: 0.1,
            agent_speed: 2.0,
            path_cache_capacity: 256,

            cooking_speed: 1.0,
            dropoff_capacity: 1,

            patience: 30.0,
            vip_patience: 25.0,
            vip_chance: 0.1,
            eat_duration: 5.0,
            dirty_chance: 0.5,
            auto_clean_after: Some(3.0),
            clean_duration: 1.0,

            energy_decay_per_sec: 100.0 / 3600.0,
            feed_cost: 10,
            staff_xp_per_cook: 5,
            staff_max_xp: 100,
            level_up_speed_bonus: 0.5,
            cook_hire_cost: 100,
            server_hire_cost: 80,
            cleaner_hire_cost: 60,

            starting_money: 100,
            starting_ingredients: 5,
            storage_limit: 20,
            storage_upgrade_step: 10,
            seed_cost: 10,
            harvest_yield: 5,
            harvest_xp: 5,
            garden_growth_per_sec: 0.5,
            starting_max_xp: 100,
            starting_max_fame: 100.0,
            fame_per_sec: 0.5 / 60.0,
            fame_cap_step: 50.0,

            auto_spawn: false,
            seed: 42,
        }
    }
}

impl SimConfig {
    /// Cell where customers enter and leave.
    pub fn entrance(&self) -> crate::ids::GridPos {
        let edge = self.grid_size as i32 - 1;
        crate::ids::GridPos::new(edge, edge)
    }
}
