//! Simulation engine - main entry point for running the simulation

use hecs::{Entity, World};

use bistro_logic::config::SimConfig;
use bistro_logic::economy::{furniture_cost, furniture_refund, Ledger};
use bistro_logic::grid::{GridWorld, MAX_GRID_SIZE};
use bistro_logic::ids::{CustomerId, FurnitureId, GridPos, StaffId};
use bistro_logic::orders::Order;
use bistro_logic::recipes::{Ingredient, Pantry, Recipe, RecipeBook};
use bistro_logic::stations::{Furniture, FurnitureKind};

use crate::components::*;
use crate::context::SimulationContext;
use crate::error::{SimError, SimResult};
use crate::persistence::{self, SnapshotError};
use crate::systems::*;

/// What kind of agent an `AgentView` describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentKind {
    Staff(StaffRole),
    Customer,
}

/// Read-only summary of one agent, for renderers and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentView {
    pub kind: AgentKind,
    pub id: u32,
    pub position: (f32, f32),
    pub state: &'static str,
}

/// Main simulation engine
pub struct SimulationEngine {
    /// ECS world containing all agents
    pub world: World,
    /// Grid, furniture, orders, books and everything else that is not an agent
    pub ctx: SimulationContext,
}

impl SimulationEngine {
    /// Create an empty restaurant with default settings
    pub fn new() -> Self {
        Self::with_config(SimConfig::default())
    }

    /// Create an empty restaurant. An invalid config is logged and its grid
    /// size is clamped into the supported range.
    pub fn with_config(mut config: SimConfig) -> Self {
        if let Err(e) = crate::config::validate(&config) {
            log::warn!("Starting with an invalid config: {e}");
        }
        config.grid_size = config.grid_size.clamp(3, MAX_GRID_SIZE);
        Self {
            world: World::new(),
            ctx: SimulationContext::new(config),
        }
    }

    /// The opening layout: two stoves, two counters, four tables, two
    /// gardens, one cook and one server.
    pub fn starter() -> Self {
        Self::starter_with(SimConfig::default())
    }

    pub fn starter_with(config: SimConfig) -> Self {
        let mut engine = Self::with_config(config);
        let layout = [
            (FurnitureKind::Stove, 2, 1),
            (FurnitureKind::Stove, 3, 1),
            (FurnitureKind::Counter, 2, 3),
            (FurnitureKind::Counter, 3, 3),
            (FurnitureKind::Table, 4, 4),
            (FurnitureKind::Table, 6, 4),
            (FurnitureKind::Table, 4, 6),
            (FurnitureKind::Table, 6, 6),
            (FurnitureKind::Garden, 1, 6),
            (FurnitureKind::Garden, 1, 7),
        ];
        for (kind, x, y) in layout {
            if let Err(e) = engine.place_furniture(kind, GridPos::new(x, y)) {
                log::warn!("Starter layout skipped a {}: {e}", kind.name());
            }
        }
        engine.add_staff(StaffRole::Cook, GridPos::new(2, 2));
        engine.add_staff(StaffRole::Server, GridPos::new(5, 5));
        engine
    }

    /// Advance the simulation by `dt` seconds (clamped to `max_dt`).
    pub fn tick(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.clamp(0.0, self.ctx.config.max_dt) } else { 0.0 };

        // T0: Movement
        movement_system(&mut self.world, dt);

        // T1: Agents, in creation order
        staff_system(&mut self.world, &mut self.ctx, dt);
        customer_system(&mut self.world, &mut self.ctx, dt);

        // T2: Upkeep
        garden_system(&mut self.ctx, dt);
        dirt_system(&mut self.ctx, dt);
        spawner_system(&mut self.world, &mut self.ctx, dt);

        // T3: Cleanup
        eviction_system(&mut self.world, &mut self.ctx);
    }

    // ── Building ────────────────────────────────────────────────────────

    /// Place furniture for free.
    pub fn place_furniture(&mut self, kind: FurnitureKind, pos: GridPos) -> SimResult<FurnitureId> {
        let id = self.ctx.place_furniture(kind, pos)?;
        log::info!("Placed {} {id} at {pos}", kind.name());
        Ok(id)
    }

    /// Remove furniture without refund. Anyone seated at a removed table
    /// leaves angry; food queued on a removed counter is lost.
    pub fn remove_furniture(&mut self, pos: GridPos) -> Option<Furniture> {
        let removed = self.ctx.remove_furniture(pos)?;
        log::info!("Removed {} {} from {pos}", removed.kind.name(), removed.id);

        if removed.kind == FurnitureKind::Table {
            for (_, customer) in self.world.query_mut::<&mut Customer>() {
                if customer.table == removed.id && customer.state.holds_table() {
                    crate::systems::customer::storm_out(&mut self.ctx, customer);
                }
            }
        }
        Some(removed)
    }

    /// Buy and place furniture. Nothing is charged if the cell is unusable.
    pub fn buy_furniture(&mut self, kind: FurnitureKind, pos: GridPos) -> SimResult<FurnitureId> {
        self.ctx.grid.check_placement(pos)?;
        self.ctx.ledger.spend(furniture_cost(kind))?;
        self.place_furniture(kind, pos)
    }

    /// Remove furniture and collect its refund.
    pub fn sell_furniture(&mut self, pos: GridPos) -> SimResult<i64> {
        let removed = self
            .remove_furniture(pos)
            .ok_or(SimError::NoFurnitureAt(pos))?;
        let refund = furniture_refund(removed.kind);
        self.ctx.ledger.earn(refund);
        Ok(refund)
    }

    // ── Agents ──────────────────────────────────────────────────────────

    /// Seat a customer with a random dish at `table`.
    pub fn spawn_customer(&mut self, table: FurnitureId) -> SimResult<CustomerId> {
        crate::systems::customer::spawn_random(&mut self.world, &mut self.ctx, table)
    }

    /// Seat a customer with a chosen dish.
    pub fn spawn_customer_ordering(&mut self, table: FurnitureId, item: Recipe, vip: bool) -> SimResult<CustomerId> {
        crate::systems::customer::spawn(&mut self.world, &mut self.ctx, table, item, vip)
    }

    /// Add a staff member at `pos` without paying for them.
    pub fn add_staff(&mut self, role: StaffRole, pos: GridPos) -> StaffId {
        let id = StaffId(self.ctx.ids.staff.allocate());
        let staff = Staff::new(id, role, self.ctx.config.staff_max_xp);
        self.world
            .spawn((staff, Motor::new(pos, self.ctx.config.agent_speed)));
        log::info!("{id} joined as {}", role.name());
        id
    }

    /// Hire a staff member; they walk in from the entrance.
    pub fn hire_staff(&mut self, role: StaffRole) -> SimResult<StaffId> {
        let cost = match role {
            StaffRole::Cook => self.ctx.config.cook_hire_cost,
            StaffRole::Server => self.ctx.config.server_hire_cost,
            StaffRole::Cleaner => self.ctx.config.cleaner_hire_cost,
        };
        self.ctx.ledger.spend(cost)?;
        let entrance = self.ctx.entrance();
        Ok(self.add_staff(role, entrance))
    }

    /// Let a staff member go. Whatever they held is released immediately.
    pub fn fire_staff(&mut self, id: StaffId) -> SimResult<()> {
        let entity = self.staff_entity(id).ok_or(SimError::UnknownStaff(id))?;
        evict(&mut self.world, &mut self.ctx, entity);
        log::info!("{id} was let go");
        Ok(())
    }

    /// Pay to restore an exhausted staff member's energy.
    pub fn feed_staff(&mut self, id: StaffId) -> SimResult<()> {
        let entity = self.staff_entity(id).ok_or(SimError::UnknownStaff(id))?;
        let mut staff = self
            .world
            .get::<&mut Staff>(entity)
            .map_err(|_| SimError::UnknownStaff(id))?;
        if staff.state != StaffState::Exhausted {
            return Err(SimError::StaffNotExhausted(id));
        }
        self.ctx.ledger.spend(self.ctx.config.feed_cost)?;
        staff.energy = FULL_ENERGY;
        staff.state = StaffState::Idle;
        log::info!("{id} was fed and is back to work");
        Ok(())
    }

    fn staff_entity(&self, id: StaffId) -> Option<Entity> {
        self.world
            .query::<&Staff>()
            .iter()
            .find(|(_, s)| s.id == id)
            .map(|(entity, _)| entity)
    }

    // ── Pantry and gardens ──────────────────────────────────────────────

    pub fn buy_seed(&mut self, ingredient: Ingredient) -> SimResult<()> {
        self.ctx.ledger.spend(self.ctx.config.seed_cost)?;
        self.ctx.pantry.add_seed(ingredient);
        Ok(())
    }

    pub fn plant(&mut self, pos: GridPos, ingredient: Ingredient) -> SimResult<()> {
        crate::systems::garden::plant(&mut self.ctx, pos, ingredient)
    }

    /// Harvest a ripe garden; returns any recipes discovered.
    pub fn harvest(&mut self, pos: GridPos) -> SimResult<Vec<Recipe>> {
        crate::systems::garden::harvest(&mut self.ctx, pos)
    }

    /// Raise the storage limit; returns the new limit.
    pub fn upgrade_storage(&mut self) -> SimResult<u32> {
        let limit = self.ctx.pantry.storage_limit();
        self.ctx.ledger.spend(limit as i64 * 2)?;
        let new_limit = limit + self.ctx.config.storage_upgrade_step;
        self.ctx.pantry.set_storage_limit(new_limit);
        log::info!("Storage upgraded to {new_limit}");
        Ok(new_limit)
    }

    // ── Persistence ─────────────────────────────────────────────────────

    /// Encode the full state as a versioned binary snapshot.
    pub fn serialize_state(&mut self) -> Result<Vec<u8>, SnapshotError> {
        persistence::save(&self.world, &mut self.ctx)
    }

    /// Replace the running state with a snapshot. On any error the current
    /// state is left untouched.
    pub fn restore_state(&mut self, bytes: &[u8]) -> Result<(), SnapshotError> {
        match persistence::load(bytes) {
            Ok((world, ctx)) => {
                self.world = world;
                self.ctx = ctx;
                log::info!("Restored snapshot ({} bytes)", bytes.len());
                Ok(())
            }
            Err(e) => {
                log::warn!("Rejected snapshot: {e}");
                Err(e)
            }
        }
    }

    // ── Queries ─────────────────────────────────────────────────────────

    /// Every agent: staff by id, then customers by id.
    pub fn agents(&self) -> Vec<AgentView> {
        let mut staff: Vec<AgentView> = self
            .world
            .query::<(&Staff, &Motor)>()
            .iter()
            .map(|(_, (s, m))| AgentView {
                kind: AgentKind::Staff(s.role),
                id: s.id.0,
                position: m.position(),
                state: s.state.tag(),
            })
            .collect();
        staff.sort_by_key(|a| a.id);

        let mut customers: Vec<AgentView> = self
            .world
            .query::<(&Customer, &Motor)>()
            .iter()
            .map(|(_, (c, m))| AgentView {
                kind: AgentKind::Customer,
                id: c.id.0,
                position: m.position(),
                state: c.state.tag(),
            })
            .collect();
        customers.sort_by_key(|a| a.id);

        staff.extend(customers);
        staff
    }

    pub fn furniture(&self) -> impl Iterator<Item = &Furniture> {
        self.ctx.stations.iter()
    }

    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.ctx.orders.iter()
    }

    /// Dropoffs and the items waiting on them.
    pub fn dropoffs(&self) -> impl Iterator<Item = (FurnitureId, &[Recipe])> {
        self.ctx.stations.dropoffs()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ctx.ledger
    }

    pub fn pantry(&self) -> &Pantry {
        &self.ctx.pantry
    }

    pub fn recipes(&self) -> &RecipeBook {
        &self.ctx.recipes
    }

    pub fn grid(&self) -> &GridWorld {
        &self.ctx.grid
    }

    pub fn config(&self) -> &SimConfig {
        &self.ctx.config
    }

    pub fn customer(&self, id: CustomerId) -> Option<Customer> {
        self.world
            .query::<&Customer>()
            .iter()
            .find(|(_, c)| c.id == id)
            .map(|(_, c)| c.clone())
    }

    pub fn staff(&self, id: StaffId) -> Option<Staff> {
        self.world
            .query::<&Staff>()
            .iter()
            .find(|(_, s)| s.id == id)
            .map(|(_, s)| s.clone())
    }

    pub fn customer_count(&self) -> usize {
        self.world.query::<&Customer>().iter().count()
    }

    pub fn staff_count(&self) -> usize {
        self.world.query::<&Staff>().iter().count()
    }
}

impl Default for SimulationEngine {
    fn default() -> Self {
        Self::new()
    }
}
