//! End-to-end scenarios driven through the public engine API.

use std::collections::BTreeSet;

use bistro_core::persistence::{Snapshot, SnapshotError, SNAPSHOT_VERSION};
use bistro_core::prelude::*;
use bistro_logic::error::PlacementError;
use bistro_logic::grid::{Cell, GridWorld};
use bistro_logic::ids::CustomerId;

const DT: f32 = 0.1;

fn quiet_config() -> SimConfig {
    SimConfig {
        vip_chance: 0.0,
        dirty_chance: 0.0,
        ..SimConfig::default()
    }
}

/// Open orders and customers that expect food match one to one.
fn assert_orders_consistent(engine: &SimulationEngine) {
    let mut seen = BTreeSet::new();
    for order in engine.orders() {
        assert!(seen.insert(order.customer), "two orders for {}", order.customer);
        let customer = engine
            .customer(order.customer)
            .unwrap_or_else(|| panic!("order for missing {}", order.customer));
        assert!(customer.state.has_open_order(), "{} has an order in {:?}", customer.id, customer.state);
        assert_eq!(customer.order, order.item);
    }
    for (_, customer) in engine.world.query::<&Customer>().iter() {
        if customer.state.has_open_order() {
            assert!(seen.contains(&customer.id), "{} waits without an order", customer.id);
        }
    }
}

/// No appliance is worked by two cooks, and every busy cook holds its station.
fn assert_stations_exclusive(engine: &SimulationEngine) {
    let mut in_use = BTreeSet::new();
    for (_, staff) in engine.world.query::<&Staff>().iter() {
        let station = match staff.state {
            StaffState::MovingToStation { station, .. } | StaffState::Cooking { station, .. } => station,
            _ => continue,
        };
        assert!(in_use.insert(station), "{station} shared by two cooks");
        if let Some(f) = engine.ctx.stations.get(station) {
            assert_eq!(f.reserved_by(), Some(staff.id));
        }
    }
    for f in engine.furniture() {
        if let Some(holder) = f.reserved_by() {
            assert!(engine.staff(holder).is_some(), "{} held by departed {holder}", f.id);
        }
    }
}

fn run_until(engine: &mut SimulationEngine, max_ticks: usize, mut done: impl FnMut(&SimulationEngine) -> bool) -> bool {
    for _ in 0..max_ticks {
        engine.tick(DT);
        if done(engine) {
            return true;
        }
    }
    false
}

fn state_of(engine: &SimulationEngine, id: CustomerId) -> Option<CustomerState> {
    engine.customer(id).map(|c| c.state)
}

#[test]
fn unattended_customer_leaves_angry() {
    let mut engine = SimulationEngine::with_config(quiet_config());
    let table = engine
        .place_furniture(FurnitureKind::Table, GridPos::new(6, 6))
        .unwrap();
    let id = engine
        .spawn_customer_ordering(table, Recipe::Burger, false)
        .unwrap();

    let mut last_patience = f32::INFINITY;
    let left = run_until(&mut engine, 1000, |e| {
        let c = e.customer(id).unwrap();
        if c.state == CustomerState::WaitingForFood {
            assert!(c.patience <= last_patience);
            last_patience = c.patience;
        }
        c.state == CustomerState::LeavingAngry
    });
    assert!(left);
    assert_eq!(engine.orders().count(), 0);
    assert!(engine.ctx.stations.get(table).unwrap().is_free_table());
    assert_eq!(engine.ledger().money, 100);
    assert_eq!(engine.ledger().customers_served, 0);

    assert!(run_until(&mut engine, 500, |e| e.customer(id).is_none()));
    assert_eq!(engine.customer_count(), 0);
}

/// Seats a burger customer at (6, 6) and returns the patience seen on every
/// tick they spend waiting, up to and excluding the tick they storm out.
fn patience_while_waiting(lamps: i32) -> Vec<f32> {
    let mut engine = SimulationEngine::with_config(quiet_config());
    for x in 3..3 + lamps {
        engine
            .place_furniture(FurnitureKind::Decor(DecorKind::Lamp), GridPos::new(x, 1))
            .unwrap();
    }
    let table = engine
        .place_furniture(FurnitureKind::Table, GridPos::new(6, 6))
        .unwrap();
    let id = engine
        .spawn_customer_ordering(table, Recipe::Burger, false)
        .unwrap();

    let mut seen = Vec::new();
    let left = run_until(&mut engine, 2000, |e| match state_of(e, id) {
        Some(CustomerState::WaitingForFood) => {
            seen.push(e.customer(id).unwrap().patience);
            false
        }
        state => state == Some(CustomerState::LeavingAngry),
    });
    assert!(left, "customer never left");
    seen
}

#[test]
fn patience_runs_out_after_thirty_seconds() {
    let seen = patience_while_waiting(0);
    assert_eq!(seen[0], 30.0);
    // The first waiting tick plus 300 ticks of 0.1 s, give or take rounding
    let ticks = seen.len() as i32;
    assert!((299..=301).contains(&ticks), "left after {ticks} ticks");
}

#[test]
fn a_lamp_slows_patience_decay() {
    let seen = patience_while_waiting(1);
    assert_eq!(seen[0], 30.0);
    for pair in seen.windows(2) {
        let delta = pair[0] - pair[1];
        assert!((delta - 0.09).abs() < 1e-4, "decayed {delta} in one tick");
    }
}

#[test]
fn many_lamps_stop_at_the_decay_floor() {
    let seen = patience_while_waiting(7);
    for pair in seen.windows(2) {
        let delta = pair[0] - pair[1];
        assert!((delta - 0.05).abs() < 1e-4, "decayed {delta} in one tick");
    }
    let ticks = seen.len() as i32;
    assert!((599..=601).contains(&ticks), "left after {ticks} ticks");
}

#[test]
fn cook_and_server_feed_a_customer() {
    let mut engine = SimulationEngine::with_config(quiet_config());
    engine.place_furniture(FurnitureKind::Stove, GridPos::new(2, 1)).unwrap();
    engine.place_furniture(FurnitureKind::Counter, GridPos::new(2, 3)).unwrap();
    let table = engine
        .place_furniture(FurnitureKind::Table, GridPos::new(6, 6))
        .unwrap();
    engine.add_staff(StaffRole::Cook, GridPos::new(2, 2));
    engine.add_staff(StaffRole::Server, GridPos::new(5, 5));
    let meat_before = engine.pantry().count(Ingredient::Meat);

    let id = engine
        .spawn_customer_ordering(table, Recipe::Burger, false)
        .unwrap();

    let eating = run_until(&mut engine, 600, |e| {
        matches!(state_of(e, id), Some(CustomerState::Eating { .. }))
    });
    assert!(eating, "customer was never served");
    assert_eq!(engine.orders().count(), 0);
    assert_eq!(engine.pantry().count(Ingredient::Meat), meat_before - 1);
    assert!(engine.dropoffs().all(|(_, items)| items.is_empty()));

    let patience = engine.customer(id).unwrap().patience;
    let expected = 100 + 20 + (patience / 10.0).floor() as i64;

    assert!(run_until(&mut engine, 100, |e| e.ledger().customers_served == 1));
    assert_eq!(engine.ledger().money, expected);
    assert!(engine.ledger().fame > 0.0);
    assert_eq!(state_of(&engine, id), Some(CustomerState::Leaving));
    assert!(engine.ctx.stations.get(table).unwrap().is_free_table());
}

#[test]
fn busy_restaurant_keeps_its_invariants() {
    let config = SimConfig {
        auto_spawn: true,
        ..SimConfig::default()
    };
    let mut engine = SimulationEngine::starter_with(config);
    engine.add_staff(StaffRole::Cook, GridPos::new(3, 2));
    engine.add_staff(StaffRole::Cook, GridPos::new(4, 2));
    engine.add_staff(StaffRole::Cleaner, GridPos::new(8, 8));

    for _ in 0..3000 {
        engine.tick(DT);
        assert_orders_consistent(&engine);
        assert_stations_exclusive(&engine);
        for (_, items) in engine.dropoffs() {
            assert!(items.len() <= engine.config().dropoff_capacity);
        }
    }
    assert!(engine.ledger().customers_served > 0);
}

#[test]
fn placement_rejects_walls_and_occupied_cells() {
    let mut engine = SimulationEngine::new();
    let wall = GridPos::new(0, 4);
    assert_eq!(
        engine.place_furniture(FurnitureKind::Table, wall),
        Err(SimError::InvalidPlacement(PlacementError::Wall(wall)))
    );

    let pos = GridPos::new(4, 4);
    let first = engine.place_furniture(FurnitureKind::Stove, pos).unwrap();
    assert_eq!(
        engine.place_furniture(FurnitureKind::Table, pos),
        Err(SimError::InvalidPlacement(PlacementError::Occupied(pos)))
    );
    assert_eq!(engine.grid().occupant_at(pos), Some(first));
    assert!(!engine.grid().is_walkable(pos));

    let outside = GridPos::new(40, 4);
    assert!(matches!(
        engine.buy_furniture(FurnitureKind::Table, outside),
        Err(SimError::InvalidPlacement(PlacementError::OutOfBounds(_)))
    ));
    assert_eq!(engine.ledger().money, 100);

    engine.remove_furniture(pos).unwrap();
    assert!(engine.grid().is_walkable(pos));
    assert!(engine.remove_furniture(pos).is_none());
}

#[test]
fn occupied_table_cannot_seat_another_customer() {
    let mut engine = SimulationEngine::new();
    let table = engine
        .place_furniture(FurnitureKind::Table, GridPos::new(5, 5))
        .unwrap();
    engine.spawn_customer(table).unwrap();
    assert_eq!(engine.spawn_customer(table), Err(SimError::TableUnavailable(table)));
}

#[test]
fn selling_a_seated_table_sends_the_customer_away() {
    let mut engine = SimulationEngine::with_config(quiet_config());
    let pos = GridPos::new(4, 8);
    let table = engine.place_furniture(FurnitureKind::Table, pos).unwrap();
    let id = engine
        .spawn_customer_ordering(table, Recipe::Pizza, false)
        .unwrap();
    assert!(run_until(&mut engine, 200, |e| {
        state_of(e, id) == Some(CustomerState::WaitingForFood)
    }));

    assert_eq!(engine.sell_furniture(pos), Ok(25));
    assert_eq!(engine.ledger().money, 125);
    assert_eq!(state_of(&engine, id), Some(CustomerState::LeavingAngry));
    assert_orders_consistent(&engine);
    assert!(run_until(&mut engine, 300, |e| e.customer(id).is_none()));
}

#[test]
fn staff_hire_fire_and_feed() {
    let mut engine = SimulationEngine::new();
    let cook = engine.hire_staff(StaffRole::Cook).unwrap();
    assert_eq!(engine.ledger().money, 0);
    assert!(matches!(
        engine.hire_staff(StaffRole::Cleaner),
        Err(SimError::InsufficientFunds(_))
    ));

    for (_, staff) in engine.world.query_mut::<&mut Staff>() {
        staff.energy = 0.0;
    }
    engine.tick(DT);
    assert_eq!(engine.staff(cook).unwrap().state, StaffState::Exhausted);
    assert!(matches!(engine.feed_staff(cook), Err(SimError::InsufficientFunds(_))));

    engine.ctx.ledger.earn(10);
    engine.feed_staff(cook).unwrap();
    assert_eq!(engine.ledger().money, 0);
    assert_eq!(engine.staff(cook).unwrap().energy, FULL_ENERGY);

    engine.fire_staff(cook).unwrap();
    assert_eq!(engine.staff_count(), 0);
    assert_eq!(engine.feed_staff(cook), Err(SimError::UnknownStaff(cook)));
}

#[test]
fn firing_a_busy_cook_frees_station_and_order() {
    let mut engine = SimulationEngine::with_config(quiet_config());
    let stove = engine.place_furniture(FurnitureKind::Stove, GridPos::new(2, 1)).unwrap();
    engine.place_furniture(FurnitureKind::Counter, GridPos::new(2, 3)).unwrap();
    let table = engine
        .place_furniture(FurnitureKind::Table, GridPos::new(6, 6))
        .unwrap();
    let cook = engine.add_staff(StaffRole::Cook, GridPos::new(2, 2));
    let id = engine
        .spawn_customer_ordering(table, Recipe::Burger, false)
        .unwrap();

    assert!(run_until(&mut engine, 300, |e| {
        matches!(e.staff(cook).map(|s| s.state), Some(StaffState::Cooking { .. }))
    }));
    engine.fire_staff(cook).unwrap();

    assert_eq!(engine.ctx.stations.get(stove).unwrap().reserved_by(), None);
    let order = engine.orders().find(|o| o.customer == id).unwrap();
    assert_eq!(order.claimed_by, None);
    assert_eq!(state_of(&engine, id), Some(CustomerState::WaitingForFood));
}

#[test]
fn garden_harvest_requires_a_ripe_plot() {
    let mut engine = SimulationEngine::starter();
    let plot = GridPos::new(1, 6);
    assert!(matches!(engine.plant(plot, Ingredient::Cheese), Err(SimError::NoSeeds(_))));

    engine.buy_seed(Ingredient::Cheese).unwrap();
    engine.plant(plot, Ingredient::Cheese).unwrap();
    assert_eq!(engine.harvest(plot), Err(SimError::GardenNotReady(plot)));

    let before = engine.pantry().count(Ingredient::Cheese);
    assert!(run_until(&mut engine, 5000, |e| {
        e.ctx.furniture_at(plot).and_then(|f| f.garden()).map_or(false, |g| g.ready)
    }));
    assert!(matches!(engine.harvest(plot), Err(SimError::StorageFull(_))));
    engine.upgrade_storage().unwrap();
    engine.harvest(plot).unwrap();
    assert_eq!(
        engine.pantry().count(Ingredient::Cheese),
        before + engine.config().harvest_yield
    );
    assert_eq!(engine.harvest(plot), Err(SimError::GardenNotReady(plot)));
}

#[test]
fn snapshot_round_trip_continues_identically() {
    let config = SimConfig {
        auto_spawn: true,
        ..SimConfig::default()
    };
    let mut original = SimulationEngine::starter_with(config);
    for _ in 0..400 {
        original.tick(DT);
    }

    let bytes = original.serialize_state().unwrap();
    let mut restored = SimulationEngine::new();
    restored.restore_state(&bytes).unwrap();

    assert_eq!(restored.agents(), original.agents());
    assert_eq!(restored.ledger(), original.ledger());

    for _ in 0..600 {
        original.tick(DT);
        restored.tick(DT);
    }
    assert_eq!(restored.agents(), original.agents());
    assert_eq!(restored.ledger(), original.ledger());
    assert_eq!(
        restored.orders().cloned().collect::<Vec<_>>(),
        original.orders().cloned().collect::<Vec<_>>()
    );
}

#[test]
fn bad_snapshots_leave_the_engine_untouched() {
    let mut source = SimulationEngine::starter();
    let table = source.furniture().find(|f| f.is_free_table()).map(|f| f.id).unwrap();
    source.spawn_customer(table).unwrap();
    let good = source.serialize_state().unwrap();

    let mut engine = SimulationEngine::starter();
    engine.buy_furniture(FurnitureKind::Table, GridPos::new(9, 9)).unwrap();
    let agents = engine.agents();
    let money = engine.ledger().money;
    let furniture = engine.furniture().count();

    let truncated = &good[..good.len() / 2];
    assert!(matches!(engine.restore_state(truncated), Err(SnapshotError::Decode(_))));
    assert!(matches!(engine.restore_state(&[1, 2]), Err(SnapshotError::Decode(_))));

    let mut wrong_version = good.clone();
    wrong_version[..4].copy_from_slice(&99u32.to_le_bytes());
    assert!(matches!(
        engine.restore_state(&wrong_version),
        Err(SnapshotError::VersionMismatch { expected: SNAPSHOT_VERSION, found: 99 })
    ));

    let mut tampered: Snapshot = bincode::deserialize(&good).unwrap();
    tampered.orders.post(CustomerId(77), Recipe::Soda);
    let tampered = bincode::serialize(&tampered).unwrap();
    assert!(matches!(engine.restore_state(&tampered), Err(SnapshotError::Corrupted(_))));

    assert_eq!(engine.agents(), agents);
    assert_eq!(engine.ledger().money, money);
    assert_eq!(engine.furniture().count(), furniture);

    engine.restore_state(&good).unwrap();
    assert_eq!(engine.customer_count(), 1);
}

#[test]
fn absurd_grid_sizes_are_rejected_on_restore() {
    let mut engine = SimulationEngine::starter();
    let good = engine.serialize_state().unwrap();
    let agents = engine.agents();

    let huge: GridWorld = bincode::deserialize(&bincode::serialize(&(50_000i32, Vec::<Cell>::new(), 0u64)).unwrap()).unwrap();

    let mut tampered: Snapshot = bincode::deserialize(&good).unwrap();
    tampered.grid = huge.clone();
    let bytes = bincode::serialize(&tampered).unwrap();
    assert!(matches!(engine.restore_state(&bytes), Err(SnapshotError::Corrupted(_))));

    let mut tampered: Snapshot = bincode::deserialize(&good).unwrap();
    tampered.config.grid_size = 50_000;
    let bytes = bincode::serialize(&tampered).unwrap();
    assert!(matches!(engine.restore_state(&bytes), Err(SnapshotError::Corrupted(_))));

    let mut tampered: Snapshot = bincode::deserialize(&good).unwrap();
    tampered.config.grid_size = 50_000;
    tampered.grid = huge;
    let bytes = bincode::serialize(&tampered).unwrap();
    assert!(matches!(engine.restore_state(&bytes), Err(SnapshotError::Corrupted(_))));

    assert_eq!(engine.agents(), agents);
    assert_eq!(engine.ctx.grid.size(), 12);
}

#[test]
fn oversized_config_is_clamped_on_start() {
    let engine = SimulationEngine::with_config(SimConfig {
        grid_size: 50_000,
        ..quiet_config()
    });
    assert_eq!(engine.config().grid_size, 256);
    assert_eq!(engine.ctx.grid.size(), 256);
}

#[test]
fn served_customers_need_exactly_one_server() {
    let mut source = SimulationEngine::with_config(quiet_config());
    let table = source
        .place_furniture(FurnitureKind::Table, GridPos::new(6, 6))
        .unwrap();
    source.add_staff(StaffRole::Server, GridPos::new(5, 5));
    source.add_staff(StaffRole::Server, GridPos::new(4, 5));
    let id = source
        .spawn_customer_ordering(table, Recipe::Soda, false)
        .unwrap();
    assert!(run_until(&mut source, 500, |e| state_of(e, id) == Some(CustomerState::WaitingForFood)));
    let good = source.serialize_state().unwrap();

    let mut engine = SimulationEngine::starter();
    let agents = engine.agents();
    let delivering = StaffState::MovingToTable { customer: id, item: Recipe::Soda };

    // Nobody on the way
    let mut tampered: Snapshot = bincode::deserialize(&good).unwrap();
    tampered.customers[0].0.state = CustomerState::BeingServed;
    let bytes = bincode::serialize(&tampered).unwrap();
    assert!(matches!(engine.restore_state(&bytes), Err(SnapshotError::Corrupted(_))));

    // Two servers carrying the same order
    let mut tampered: Snapshot = bincode::deserialize(&good).unwrap();
    tampered.customers[0].0.state = CustomerState::BeingServed;
    tampered.staff[0].0.state = delivering.clone();
    tampered.staff[1].0.state = delivering.clone();
    let bytes = bincode::serialize(&tampered).unwrap();
    assert!(matches!(engine.restore_state(&bytes), Err(SnapshotError::Corrupted(_))));
    assert_eq!(engine.agents(), agents);

    // Exactly one
    let mut tampered: Snapshot = bincode::deserialize(&good).unwrap();
    tampered.customers[0].0.state = CustomerState::BeingServed;
    tampered.staff[1].0.state = delivering;
    let bytes = bincode::serialize(&tampered).unwrap();
    engine.restore_state(&bytes).unwrap();
    assert_eq!(state_of(&engine, id), Some(CustomerState::BeingServed));
}
