//! Furniture records and the station registry.
//!
//! The registry is an arena of furniture keyed by `FurnitureId`. Grid cells
//! point into it by id; agents refer to stations by id as well. All
//! per-station mutable state (reservations, dropoff queues, table occupancy,
//! garden crops) lives here and nowhere else.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ids::{CustomerId, FurnitureId, GridPos, StaffId};
use crate::recipes::{ApplianceKind, Ingredient, Recipe};

/// Growth points a garden needs before it can be harvested.
pub const GARDEN_READY_AT: f32 = 100.0;

/// Purely decorative furniture that contributes ambient bonuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecorKind {
    /// +10% XP from customers.
    Plant,
    /// Slows patience decay by 10%.
    Lamp,
    /// +10% big-tip chance. Does not block movement.
    Rug,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FurnitureKind {
    Table,
    Stove,
    Counter,
    DrinkMachine,
    Garden,
    Decor(DecorKind),
}

impl FurnitureKind {
    pub fn blocks_movement(self) -> bool {
        !matches!(self, FurnitureKind::Decor(DecorKind::Rug))
    }

    pub fn appliance(self) -> Option<ApplianceKind> {
        match self {
            FurnitureKind::Stove => Some(ApplianceKind::Stove),
            FurnitureKind::DrinkMachine => Some(ApplianceKind::DrinkMachine),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FurnitureKind::Table => "table",
            FurnitureKind::Stove => "stove",
            FurnitureKind::Counter => "counter",
            FurnitureKind::DrinkMachine => "drink_machine",
            FurnitureKind::Garden => "garden",
            FurnitureKind::Decor(DecorKind::Plant) => "plant",
            FurnitureKind::Decor(DecorKind::Lamp) => "lamp",
            FurnitureKind::Decor(DecorKind::Rug) => "rug",
        }
    }
}

/// Left behind on a table by a messy customer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirtMarker {
    /// Cleaner currently heading over, if any.
    pub claimed_by: Option<StaffId>,
    /// Seconds until the mess clears by itself; `None` waits for a cleaner.
    pub auto_clean_in: Option<f32>,
}

/// A plot that grows one ingredient at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GardenPlot {
    pub crop: Option<Ingredient>,
    pub growth: f32,
    pub ready: bool,
}

impl GardenPlot {
    /// Grow at `rate` points per second.
    pub fn grow(&mut self, dt: f32, rate: f32) {
        if self.crop.is_some() && !self.ready {
            self.growth += dt * rate;
            if self.growth >= GARDEN_READY_AT {
                self.growth = GARDEN_READY_AT;
                self.ready = true;
            }
        }
    }
}

/// Functional state carried by each kind of furniture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StationState {
    Table {
        occupant: Option<CustomerId>,
        dirt: Option<DirtMarker>,
    },
    Appliance {
        reserved_by: Option<StaffId>,
    },
    Dropoff {
        items: Vec<Recipe>,
        capacity: usize,
    },
    Garden(GardenPlot),
    Decor,
}

/// One piece of furniture on the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Furniture {
    pub id: FurnitureId,
    pub kind: FurnitureKind,
    pub pos: GridPos,
    pub state: StationState,
}

impl Furniture {
    pub fn new(id: FurnitureId, kind: FurnitureKind, pos: GridPos, dropoff_capacity: usize) -> Self {
        let state = match kind {
            FurnitureKind::Table => StationState::Table {
                occupant: None,
                dirt: None,
            },
            FurnitureKind::Stove | FurnitureKind::DrinkMachine => {
                StationState::Appliance { reserved_by: None }
            }
            FurnitureKind::Counter => StationState::Dropoff {
                items: Vec::new(),
                capacity: dropoff_capacity,
            },
            FurnitureKind::Garden => StationState::Garden(GardenPlot::default()),
            FurnitureKind::Decor(_) => StationState::Decor,
        };
        Self { id, kind, pos, state }
    }

    pub fn blocks_movement(&self) -> bool {
        self.kind.blocks_movement()
    }

    /// Items waiting on a dropoff; empty for anything else.
    pub fn items(&self) -> &[Recipe] {
        match &self.state {
            StationState::Dropoff { items, .. } => items,
            _ => &[],
        }
    }

    pub fn has_room(&self) -> bool {
        self.free_slots().is_some_and(|n| n > 0)
    }

    /// Remaining dropoff capacity; `None` for anything that is not a dropoff.
    pub fn free_slots(&self) -> Option<usize> {
        match &self.state {
            StationState::Dropoff { items, capacity } => Some(capacity.saturating_sub(items.len())),
            _ => None,
        }
    }

    pub fn reserved_by(&self) -> Option<StaffId> {
        match self.state {
            StationState::Appliance { reserved_by } => reserved_by,
            _ => None,
        }
    }

    pub fn table_occupant(&self) -> Option<CustomerId> {
        match self.state {
            StationState::Table { occupant, .. } => occupant,
            _ => None,
        }
    }

    pub fn dirt(&self) -> Option<DirtMarker> {
        match self.state {
            StationState::Table { dirt, .. } => dirt,
            _ => None,
        }
    }

    /// An unoccupied, clean table.
    pub fn is_free_table(&self) -> bool {
        matches!(
            self.state,
            StationState::Table {
                occupant: None,
                dirt: None
            }
        )
    }

    pub fn garden(&self) -> Option<&GardenPlot> {
        match &self.state {
            StationState::Garden(plot) => Some(plot),
            _ => None,
        }
    }
}

/// Why an item could not be pushed onto a dropoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropoffRejection {
    Missing,
    Full,
}

/// Arena of all furniture, iterated in creation (id) order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StationRegistry {
    furniture: BTreeMap<FurnitureId, Furniture>,
}

impl StationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, furniture: Furniture) {
        self.furniture.insert(furniture.id, furniture);
    }

    pub fn remove(&mut self, id: FurnitureId) -> Option<Furniture> {
        self.furniture.remove(&id)
    }

    pub fn get(&self, id: FurnitureId) -> Option<&Furniture> {
        self.furniture.get(&id)
    }

    pub fn get_mut(&mut self, id: FurnitureId) -> Option<&mut Furniture> {
        self.furniture.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Furniture> {
        self.furniture.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Furniture> {
        self.furniture.values_mut()
    }

    pub fn len(&self) -> usize {
        self.furniture.len()
    }

    pub fn is_empty(&self) -> bool {
        self.furniture.is_empty()
    }

    pub fn position(&self, id: FurnitureId) -> Option<GridPos> {
        self.get(id).map(|f| f.pos)
    }

    // ── Appliances ──────────────────────────────────────────────────────

    /// First unreserved appliance of the given kind.
    pub fn first_free_appliance(&self, kind: ApplianceKind) -> Option<FurnitureId> {
        self.iter()
            .find(|f| f.kind.appliance() == Some(kind) && f.reserved_by().is_none())
            .map(|f| f.id)
    }

    /// Claim an appliance exclusively. Fails if missing or already taken.
    pub fn reserve(&mut self, id: FurnitureId, staff: StaffId) -> bool {
        match self.get_mut(id).map(|f| &mut f.state) {
            Some(StationState::Appliance { reserved_by }) if reserved_by.is_none() => {
                *reserved_by = Some(staff);
                true
            }
            _ => false,
        }
    }

    /// Release an appliance if `staff` holds it.
    pub fn release(&mut self, id: FurnitureId, staff: StaffId) -> bool {
        match self.get_mut(id).map(|f| &mut f.state) {
            Some(StationState::Appliance { reserved_by }) if *reserved_by == Some(staff) => {
                *reserved_by = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_reserved_by(&self, id: FurnitureId, staff: StaffId) -> bool {
        self.get(id).and_then(Furniture::reserved_by) == Some(staff)
    }

    /// Drop every reservation held by `staff`.
    pub fn release_all(&mut self, staff: StaffId) {
        for furniture in self.furniture.values_mut() {
            if let StationState::Appliance { reserved_by } = &mut furniture.state {
                if *reserved_by == Some(staff) {
                    *reserved_by = None;
                }
            }
        }
    }

    // ── Dropoffs ────────────────────────────────────────────────────────

    /// First counter with free capacity.
    pub fn first_dropoff_with_room(&self) -> Option<FurnitureId> {
        self.iter().find(|f| f.has_room()).map(|f| f.id)
    }

    pub fn push_item(&mut self, id: FurnitureId, item: Recipe) -> Result<(), DropoffRejection> {
        match self.get_mut(id).map(|f| &mut f.state) {
            Some(StationState::Dropoff { items, capacity }) => {
                if items.len() >= *capacity {
                    Err(DropoffRejection::Full)
                } else {
                    items.push(item);
                    Ok(())
                }
            }
            _ => Err(DropoffRejection::Missing),
        }
    }

    /// Remove one instance of `item` from a dropoff.
    pub fn take_item(&mut self, id: FurnitureId, item: Recipe) -> bool {
        match self.get_mut(id).map(|f| &mut f.state) {
            Some(StationState::Dropoff { items, .. }) => match items.iter().position(|i| *i == item) {
                Some(idx) => {
                    items.remove(idx);
                    true
                }
                None => false,
            },
            _ => false,
        }
    }

    /// Copies of `item` waiting across all dropoffs.
    pub fn stock_of(&self, item: Recipe) -> usize {
        self.iter()
            .flat_map(|f| f.items())
            .filter(|i| **i == item)
            .count()
    }

    /// Dropoffs and their queued items, in id order.
    pub fn dropoffs(&self) -> impl Iterator<Item = (FurnitureId, &[Recipe])> {
        self.iter()
            .filter(|f| f.kind == FurnitureKind::Counter)
            .map(|f| (f.id, f.items()))
    }

    // ── Tables ──────────────────────────────────────────────────────────

    pub fn first_free_table(&self) -> Option<FurnitureId> {
        self.iter().find(|f| f.is_free_table()).map(|f| f.id)
    }

    /// Seat a customer at a free, clean table.
    pub fn occupy_table(&mut self, id: FurnitureId, customer: CustomerId) -> bool {
        match self.get_mut(id).map(|f| &mut f.state) {
            Some(StationState::Table { occupant, dirt }) if occupant.is_none() && dirt.is_none() => {
                *occupant = Some(customer);
                true
            }
            _ => false,
        }
    }

    /// Free a table if `customer` holds it.
    pub fn vacate_table(&mut self, id: FurnitureId, customer: CustomerId) -> bool {
        match self.get_mut(id).map(|f| &mut f.state) {
            Some(StationState::Table { occupant, .. }) if *occupant == Some(customer) => {
                *occupant = None;
                true
            }
            _ => false,
        }
    }

    pub fn dirty_table(&mut self, id: FurnitureId, auto_clean_in: Option<f32>) -> bool {
        match self.get_mut(id).map(|f| &mut f.state) {
            Some(StationState::Table { dirt, .. }) => {
                *dirt = Some(DirtMarker {
                    claimed_by: None,
                    auto_clean_in,
                });
                true
            }
            _ => false,
        }
    }

    /// First dirty table no cleaner has claimed.
    pub fn first_unclaimed_dirty_table(&self) -> Option<FurnitureId> {
        self.iter()
            .find(|f| matches!(f.dirt(), Some(d) if d.claimed_by.is_none()))
            .map(|f| f.id)
    }

    pub fn claim_dirt(&mut self, id: FurnitureId, staff: StaffId) -> bool {
        match self.get_mut(id).map(|f| &mut f.state) {
            Some(StationState::Table { dirt: Some(d), .. }) if d.claimed_by.is_none() => {
                d.claimed_by = Some(staff);
                true
            }
            _ => false,
        }
    }

    pub fn is_dirt_claimed_by(&self, id: FurnitureId, staff: StaffId) -> bool {
        matches!(self.get(id).and_then(Furniture::dirt), Some(d) if d.claimed_by == Some(staff))
    }

    /// Remove the dirt marker. Returns false if the table was already clean.
    pub fn clean_table(&mut self, id: FurnitureId) -> bool {
        match self.get_mut(id).map(|f| &mut f.state) {
            Some(StationState::Table { dirt, .. }) => dirt.take().is_some(),
            _ => false,
        }
    }

    /// Drop every dirt claim held by `staff`.
    pub fn release_dirt_claims(&mut self, staff: StaffId) {
        for furniture in self.furniture.values_mut() {
            if let StationState::Table { dirt: Some(d), .. } = &mut furniture.state {
                if d.claimed_by == Some(staff) {
                    d.claimed_by = None;
                }
            }
        }
    }

    /// Count down auto-clean timers; returns tables that became clean.
    pub fn tick_dirt(&mut self, dt: f32) -> Vec<FurnitureId> {
        let mut cleaned = Vec::new();
        for furniture in self.furniture.values_mut() {
            if let StationState::Table { dirt, .. } = &mut furniture.state {
                if let Some(remaining) = dirt.as_mut().and_then(|d| d.auto_clean_in.as_mut()) {
                    *remaining -= dt;
                    if *remaining <= 0.0 {
                        *dirt = None;
                        cleaned.push(furniture.id);
                    }
                }
            }
        }
        cleaned
    }

    // ── Gardens ─────────────────────────────────────────────────────────

    pub fn garden_mut(&mut self, id: FurnitureId) -> Option<&mut GardenPlot> {
        match self.get_mut(id).map(|f| &mut f.state) {
            Some(StationState::Garden(plot)) => Some(plot),
            _ => None,
        }
    }

    pub fn grow_gardens(&mut self, dt: f32, rate: f32) {
        for furniture in self.furniture.values_mut() {
            if let StationState::Garden(plot) = &mut furniture.state {
                plot.grow(dt, rate);
            }
        }
    }

    // ── Decor ───────────────────────────────────────────────────────────

    pub fn decor(&self) -> impl Iterator<Item = DecorKind> + '_ {
        self.iter().filter_map(|f| match f.kind {
            FurnitureKind::Decor(d) => Some(d),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> StationRegistry {
        let mut reg = StationRegistry::new();
        reg.insert(Furniture::new(FurnitureId(0), FurnitureKind::Stove, GridPos::new(2, 1), 1));
        reg.insert(Furniture::new(FurnitureId(1), FurnitureKind::Stove, GridPos::new(3, 1), 1));
        reg.insert(Furniture::new(FurnitureId(2), FurnitureKind::Counter, GridPos::new(2, 3), 1));
        reg.insert(Furniture::new(FurnitureId(3), FurnitureKind::Table, GridPos::new(4, 4), 1));
        reg
    }

    #[test]
    fn test_reservation_is_exclusive() {
        let mut reg = registry();
        assert!(reg.reserve(FurnitureId(0), StaffId(1)));
        assert!(!reg.reserve(FurnitureId(0), StaffId(2)));
        assert_eq!(reg.first_free_appliance(ApplianceKind::Stove), Some(FurnitureId(1)));
        assert_eq!(reg.first_free_appliance(ApplianceKind::DrinkMachine), None);

        assert!(!reg.release(FurnitureId(0), StaffId(2)));
        assert!(reg.release(FurnitureId(0), StaffId(1)));
        assert!(reg.reserve(FurnitureId(0), StaffId(2)));
    }

    #[test]
    fn test_release_all() {
        let mut reg = registry();
        reg.reserve(FurnitureId(0), StaffId(1));
        reg.reserve(FurnitureId(1), StaffId(1));
        reg.release_all(StaffId(1));
        assert!(reg.iter().all(|f| f.reserved_by().is_none()));
    }

    #[test]
    fn test_dropoff_capacity() {
        let mut reg = registry();
        assert_eq!(reg.first_dropoff_with_room(), Some(FurnitureId(2)));
        assert!(reg.push_item(FurnitureId(2), Recipe::Burger).is_ok());
        assert_eq!(reg.push_item(FurnitureId(2), Recipe::Pizza), Err(DropoffRejection::Full));
        assert_eq!(reg.push_item(FurnitureId(0), Recipe::Pizza), Err(DropoffRejection::Missing));
        assert_eq!(reg.first_dropoff_with_room(), None);
        assert_eq!(reg.stock_of(Recipe::Burger), 1);

        assert!(!reg.take_item(FurnitureId(2), Recipe::Pizza));
        assert!(reg.take_item(FurnitureId(2), Recipe::Burger));
        assert_eq!(reg.stock_of(Recipe::Burger), 0);
    }

    #[test]
    fn test_table_occupancy_and_dirt() {
        let mut reg = registry();
        let table = FurnitureId(3);
        assert!(reg.occupy_table(table, CustomerId(1)));
        assert!(!reg.occupy_table(table, CustomerId(2)));
        assert!(!reg.vacate_table(table, CustomerId(2)));
        assert!(reg.vacate_table(table, CustomerId(1)));

        reg.dirty_table(table, Some(1.0));
        assert_eq!(reg.first_free_table(), None);
        assert!(!reg.occupy_table(table, CustomerId(2)));
        assert!(reg.claim_dirt(table, StaffId(4)));
        assert!(!reg.claim_dirt(table, StaffId(5)));
        assert!(reg.is_dirt_claimed_by(table, StaffId(4)));

        assert!(reg.tick_dirt(0.5).is_empty());
        assert_eq!(reg.tick_dirt(0.6), vec![table]);
        assert_eq!(reg.first_free_table(), Some(table));
    }

    #[test]
    fn test_garden_growth() {
        let mut plot = GardenPlot::default();
        plot.grow(10.0, 0.5);
        assert_eq!(plot.growth, 0.0);
        plot.crop = Some(Ingredient::Meat);
        plot.grow(100.0, 0.5);
        assert!(!plot.ready);
        plot.grow(150.0, 0.5);
        assert!(plot.ready);
        assert_eq!(plot.growth, GARDEN_READY_AT);
    }

    #[test]
    fn test_rug_is_walkable() {
        assert!(!FurnitureKind::Decor(DecorKind::Rug).blocks_movement());
        assert!(FurnitureKind::Decor(DecorKind::Lamp).blocks_movement());
        assert!(FurnitureKind::Table.blocks_movement());
    }
}
