//! Shared simulation state handed to every system.
//!
//! Everything that is not an agent lives here: the grid and its furniture,
//! the order board, the books, the pantry and the random source. Agents live
//! in the `hecs::World` next to it.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use bistro_logic::config::SimConfig;
use bistro_logic::economy::{Bonuses, Ledger};
use bistro_logic::grid::GridWorld;
use bistro_logic::ids::{FurnitureId, GridPos, IdAllocator};
use bistro_logic::orders::OrderBoard;
use bistro_logic::pathfinding::Pathfinder;
use bistro_logic::recipes::{Pantry, RecipeBook};
use bistro_logic::stations::{Furniture, FurnitureKind, StationRegistry};

use crate::error::SimResult;

/// One allocator per id space.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct IdSpace {
    pub furniture: IdAllocator,
    pub staff: IdAllocator,
    pub customers: IdAllocator,
}

pub struct SimulationContext {
    pub config: SimConfig,
    pub grid: GridWorld,
    pub pathfinder: Pathfinder,
    pub stations: StationRegistry,
    pub orders: OrderBoard,
    pub ledger: Ledger,
    pub pantry: Pantry,
    pub recipes: RecipeBook,
    pub ids: IdSpace,
    pub rng: StdRng,
    /// Seconds since the last automatic arrival.
    pub spawn_timer: f32,
}

impl SimulationContext {
    /// Empty restaurant: walls only, starting money and stock.
    pub fn new(config: SimConfig) -> Self {
        Self {
            grid: GridWorld::with_walls(config.grid_size),
            pathfinder: Pathfinder::with_cache(config.path_cache_capacity),
            stations: StationRegistry::new(),
            orders: OrderBoard::new(),
            ledger: Ledger::new(&config),
            pantry: Pantry::stocked(config.storage_limit, config.starting_ingredients),
            recipes: RecipeBook::default(),
            ids: IdSpace::default(),
            rng: StdRng::seed_from_u64(config.seed),
            spawn_timer: 0.0,
            config,
        }
    }

    /// Where agents enter and leave.
    pub fn entrance(&self) -> GridPos {
        self.config.entrance()
    }

    /// Decor bonuses for the current floor.
    pub fn bonuses(&self) -> Bonuses {
        Bonuses::from_decor(self.stations.decor())
    }

    /// Bernoulli roll; probabilities outside 0..=1 are clamped.
    pub fn roll(&mut self, p: f64) -> bool {
        let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
        self.rng.gen_bool(p)
    }

    pub fn furniture_at(&self, pos: GridPos) -> Option<&Furniture> {
        self.grid.occupant_at(pos).and_then(|id| self.stations.get(id))
    }

    /// Put new furniture on the grid and register it.
    pub fn place_furniture(&mut self, kind: FurnitureKind, pos: GridPos) -> SimResult<FurnitureId> {
        self.grid.check_placement(pos)?;
        let id = FurnitureId(self.ids.furniture.allocate());
        self.grid.place(id, pos, kind.blocks_movement())?;
        self.stations
            .insert(Furniture::new(id, kind, pos, self.config.dropoff_capacity));
        Ok(id)
    }

    /// Take furniture off the grid. Queued items and reservations go with it.
    pub fn remove_furniture(&mut self, pos: GridPos) -> Option<Furniture> {
        let id = self.grid.remove(pos)?;
        self.stations.remove(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bistro_logic::error::PlacementError;
    use bistro_logic::stations::DecorKind;

    use crate::error::SimError;

    #[test]
    fn test_place_and_remove() {
        let mut ctx = SimulationContext::new(SimConfig::default());
        let pos = GridPos::new(3, 3);
        let id = ctx.place_furniture(FurnitureKind::Stove, pos).unwrap();
        assert_eq!(ctx.furniture_at(pos).map(|f| f.id), Some(id));
        assert!(!ctx.grid.is_walkable(pos));

        let err = ctx.place_furniture(FurnitureKind::Table, pos).unwrap_err();
        assert_eq!(err, SimError::InvalidPlacement(PlacementError::Occupied(pos)));

        let removed = ctx.remove_furniture(pos).unwrap();
        assert_eq!(removed.id, id);
        assert!(ctx.grid.is_walkable(pos));
        assert!(ctx.stations.is_empty());
    }

    #[test]
    fn test_failed_placement_does_not_burn_an_id() {
        let mut ctx = SimulationContext::new(SimConfig::default());
        assert!(ctx.place_furniture(FurnitureKind::Table, GridPos::new(0, 4)).is_err());
        assert_eq!(ctx.ids.furniture.peek(), 0);
    }

    #[test]
    fn test_bonuses_follow_decor() {
        let mut ctx = SimulationContext::new(SimConfig::default());
        ctx.place_furniture(FurnitureKind::Decor(DecorKind::Lamp), GridPos::new(5, 5))
            .unwrap();
        assert!((ctx.bonuses().patience_decay - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_roll_clamps() {
        let mut ctx = SimulationContext::new(SimConfig::default());
        assert!(ctx.roll(3.0));
        assert!(!ctx.roll(-1.0));
    }
}
