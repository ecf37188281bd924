//! Save/Load functionality for persisting simulation state
//!
//! Uses bincode for a compact binary snapshot of the whole restaurant. Agents
//! are stored as plain component pairs and respawned on load. A snapshot is
//! decoded and checked in full before anything replaces the running state.

use std::collections::{BTreeMap, BTreeSet};

use hecs::World;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use bistro_logic::config::SimConfig;
use bistro_logic::economy::Ledger;
use bistro_logic::grid::GridWorld;
use bistro_logic::ids::{CustomerId, StaffId};
use bistro_logic::orders::OrderBoard;
use bistro_logic::pathfinding::Pathfinder;
use bistro_logic::recipes::{Pantry, RecipeBook};
use bistro_logic::stations::{FurnitureKind, StationRegistry, StationState};

use crate::components::{Customer, CustomerState, Motor, Staff, StaffRole};
use crate::context::{IdSpace, SimulationContext};

/// Version number for the snapshot format (increment when it changes)
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to encode snapshot: {0}")]
    Encode(bincode::Error),

    #[error("failed to decode snapshot: {0}")]
    Decode(bincode::Error),

    #[error("snapshot version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("corrupted snapshot: {0}")]
    Corrupted(String),
}

/// Everything needed to resume a simulation.
#[derive(Serialize, Deserialize)]
pub struct Snapshot {
    /// Must stay the first field; it is read on its own before a full decode.
    pub version: u32,
    pub config: SimConfig,
    pub grid: GridWorld,
    pub stations: StationRegistry,
    pub orders: OrderBoard,
    pub ledger: Ledger,
    pub pantry: Pantry,
    pub recipes: RecipeBook,
    pub ids: IdSpace,
    pub spawn_timer: f32,
    /// Seed the random source continues from.
    pub rng_seed: u64,
    pub staff: Vec<(Staff, Motor)>,
    pub customers: Vec<(Customer, Motor)>,
}

/// Serialize the world and context.
///
/// The random source is reseeded from a value stored in the snapshot, so the
/// running engine and one restored from these bytes draw the same numbers.
pub fn save(world: &World, ctx: &mut SimulationContext) -> Result<Vec<u8>, SnapshotError> {
    let rng_seed: u64 = ctx.rng.gen();
    ctx.rng = StdRng::seed_from_u64(rng_seed);

    let mut staff: Vec<(Staff, Motor)> = world
        .query::<(&Staff, &Motor)>()
        .iter()
        .map(|(_, (s, m))| (s.clone(), m.clone()))
        .collect();
    staff.sort_by_key(|(s, _)| s.id);

    let mut customers: Vec<(Customer, Motor)> = world
        .query::<(&Customer, &Motor)>()
        .iter()
        .map(|(_, (c, m))| (c.clone(), m.clone()))
        .collect();
    customers.sort_by_key(|(c, _)| c.id);

    let snapshot = Snapshot {
        version: SNAPSHOT_VERSION,
        config: ctx.config.clone(),
        grid: ctx.grid.clone(),
        stations: ctx.stations.clone(),
        orders: ctx.orders.clone(),
        ledger: ctx.ledger.clone(),
        pantry: ctx.pantry.clone(),
        recipes: ctx.recipes.clone(),
        ids: ctx.ids,
        spawn_timer: ctx.spawn_timer,
        rng_seed,
        staff,
        customers,
    };

    bincode::serialize(&snapshot).map_err(SnapshotError::Encode)
}

/// Decode and validate a snapshot into a fresh world and context.
pub fn load(bytes: &[u8]) -> Result<(World, SimulationContext), SnapshotError> {
    let found: u32 = bincode::deserialize(bytes).map_err(SnapshotError::Decode)?;
    if found != SNAPSHOT_VERSION {
        return Err(SnapshotError::VersionMismatch {
            expected: SNAPSHOT_VERSION,
            found,
        });
    }

    let snapshot: Snapshot = bincode::deserialize(bytes).map_err(SnapshotError::Decode)?;
    validate(&snapshot).map_err(SnapshotError::Corrupted)?;

    let mut world = World::new();
    for (staff, motor) in snapshot.staff {
        world.spawn((staff, motor));
    }
    for (customer, motor) in snapshot.customers {
        world.spawn((customer, motor));
    }

    let ctx = SimulationContext {
        pathfinder: Pathfinder::with_cache(snapshot.config.path_cache_capacity),
        grid: snapshot.grid,
        stations: snapshot.stations,
        orders: snapshot.orders,
        ledger: snapshot.ledger,
        pantry: snapshot.pantry,
        recipes: snapshot.recipes,
        ids: snapshot.ids,
        rng: StdRng::seed_from_u64(snapshot.rng_seed),
        spawn_timer: snapshot.spawn_timer,
        config: snapshot.config,
    };
    Ok((world, ctx))
}

/// Cross-check every reference in a snapshot.
fn validate(s: &Snapshot) -> Result<(), String> {
    crate::config::validate(&s.config).map_err(|e| e.to_string())?;
    if !s.grid.is_consistent() {
        return Err("grid cells are inconsistent".into());
    }
    if s.grid.size() != s.config.grid_size as i32 {
        return Err(format!(
            "grid size {} does not match config {}",
            s.grid.size(),
            s.config.grid_size
        ));
    }

    // Furniture <-> grid
    for f in s.stations.iter() {
        if f.id.0 >= s.ids.furniture.peek() {
            return Err(format!("{} was never allocated", f.id));
        }
        if s.grid.occupant_at(f.pos) != Some(f.id) {
            return Err(format!("{} is not on its cell {}", f.id, f.pos));
        }
        let blocks = s.grid.cell(f.pos).map(|c| c.blocks).unwrap_or(false);
        if blocks != f.blocks_movement() {
            return Err(format!("{} has the wrong walkability", f.id));
        }
        let state_matches = matches!(
            (f.kind, &f.state),
            (FurnitureKind::Table, StationState::Table { .. })
                | (FurnitureKind::Stove | FurnitureKind::DrinkMachine, StationState::Appliance { .. })
                | (FurnitureKind::Counter, StationState::Dropoff { .. })
                | (FurnitureKind::Garden, StationState::Garden(_))
                | (FurnitureKind::Decor(_), StationState::Decor)
        );
        if !state_matches {
            return Err(format!("{} has state for another kind", f.id));
        }
    }
    for (pos, id) in s.grid.occupied_cells() {
        if s.stations.get(id).map(|f| f.pos) != Some(pos) {
            return Err(format!("cell {pos} points at missing {id}"));
        }
    }

    // Agents
    let mut staff_ids = BTreeSet::new();
    for (staff, _) in &s.staff {
        if staff.id.0 >= s.ids.staff.peek() || !staff_ids.insert(staff.id) {
            return Err(format!("bad or duplicate id {}", staff.id));
        }
    }
    let mut customer_ids = BTreeSet::new();
    for (customer, _) in &s.customers {
        if customer.id.0 >= s.ids.customers.peek() || !customer_ids.insert(customer.id) {
            return Err(format!("bad or duplicate id {}", customer.id));
        }
    }

    // Orders exist exactly for waiting customers
    for order in s.orders.iter() {
        let waiting = s
            .customers
            .iter()
            .any(|(c, _)| c.id == order.customer && c.state.has_open_order());
        if !waiting {
            return Err(format!("order for {} has no waiting customer", order.customer));
        }
        if let Some(cook) = order.claimed_by {
            if !is_role(s, cook, StaffRole::Cook) {
                return Err(format!("order claimed by unknown cook {cook}"));
            }
        }
    }
    for (customer, _) in &s.customers {
        if customer.state.has_open_order() && !s.orders.contains(customer.id) {
            return Err(format!("{} is waiting without an order", customer.id));
        }
        if customer.state.holds_table() {
            let holds = s
                .stations
                .get(customer.table)
                .and_then(|f| f.table_occupant())
                == Some(customer.id);
            if !holds {
                return Err(format!("{} lost its table", customer.id));
            }
        }
    }

    // Every customer being served has exactly one server on the way. A server
    // may still target a customer who stormed out; delivery handles that.
    let mut served: BTreeMap<CustomerId, usize> = BTreeMap::new();
    for (staff, _) in &s.staff {
        if staff.role != StaffRole::Server {
            continue;
        }
        if let Some(customer) = staff.state.serving() {
            *served.entry(customer).or_default() += 1;
        }
    }
    if let Some((customer, n)) = served.iter().find(|(_, n)| **n > 1) {
        return Err(format!("{customer} is being served by {n} servers"));
    }
    for (customer, _) in &s.customers {
        if customer.state == CustomerState::BeingServed && !served.contains_key(&customer.id) {
            return Err(format!("{} is being served by nobody", customer.id));
        }
    }

    // Station claims point at live agents
    for f in s.stations.iter() {
        if let Some(staff) = f.reserved_by() {
            if !staff_ids.contains(&staff) {
                return Err(format!("{} reserved by unknown {staff}", f.id));
            }
        }
        if let Some(customer) = f.table_occupant() {
            if !customer_ids.contains(&customer) {
                return Err(format!("{} occupied by unknown {customer}", f.id));
            }
        }
        if let Some(cleaner) = f.dirt().and_then(|d| d.claimed_by) {
            if !staff_ids.contains(&cleaner) {
                return Err(format!("{} claimed by unknown {cleaner}", f.id));
            }
        }
    }
    Ok(())
}

fn is_role(s: &Snapshot, id: StaffId, role: StaffRole) -> bool {
    s.staff.iter().any(|(staff, _)| staff.id == id && staff.role == role)
}

