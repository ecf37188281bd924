//! Bistro Headless Simulation Harness
//!
//! Runs scripted restaurant shifts against the real engine and checks the
//! bookkeeping holds together. No rendering, no input.
//!
//! Usage:
//!   cargo run -p bistro-simtest
//!   cargo run -p bistro-simtest -- --verbose

use std::collections::BTreeSet;

use bistro_core::prelude::*;
use bistro_logic::economy::{compute_payment, fame_gain, spawn_interval, Bonuses};
use bistro_logic::grid::GridWorld;
use bistro_logic::ids::FurnitureId;
use bistro_logic::pathfinding::Pathfinder;

// ── Shift config (same JSON schema the engine loads) ────────────────────
const SHIFT_CONFIG_JSON: &str = include_str!("../../../data/simtest_config.json");

const DT: f32 = 0.1;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== Bistro Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Shift config
    let config = match bistro_core::config::from_json(SHIFT_CONFIG_JSON) {
        Ok(config) => {
            results.push(TestResult {
                name: "config_parse".into(),
                passed: true,
                detail: format!("seed {}, grid {}", config.seed, config.grid_size),
            });
            config
        }
        Err(e) => {
            results.push(TestResult {
                name: "config_parse".into(),
                passed: false,
                detail: e.to_string(),
            });
            SimConfig::default()
        }
    };

    // 2. Pathfinding on the walled grid
    results.extend(validate_pathfinding(verbose));

    // 3. Pricing and fame curves
    results.extend(validate_economy(verbose));

    // 4. A full busy shift
    results.extend(validate_shift(&config, verbose));

    // 5. Customers nobody serves
    results.extend(validate_neglect(verbose));

    // 6. Snapshot and resume
    results.extend(validate_snapshot(&config, verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 2. Pathfinding ──────────────────────────────────────────────────────

fn validate_pathfinding(verbose: bool) -> Vec<TestResult> {
    println!("--- Pathfinding ---");
    let mut results = Vec::new();

    let mut grid = GridWorld::with_walls(12);
    let mut pathfinder = Pathfinder::new();
    let entrance = GridPos::new(11, 11);

    // Every open cell is reachable from the entrance
    let mut unreachable = Vec::new();
    for y in 0..12 {
        for x in 0..12 {
            let pos = GridPos::new(x, y);
            if grid.is_walkable(pos) && pathfinder.find_path(&grid, entrance, pos).is_none() {
                unreachable.push(pos);
            }
        }
    }
    results.push(TestResult {
        name: "path_all_open_cells_reachable".into(),
        passed: unreachable.is_empty(),
        detail: format!("{} unreachable cells", unreachable.len()),
    });

    // Wall cells never appear inside a path
    let path = pathfinder
        .find_path(&grid, entrance, GridPos::new(1, 1))
        .unwrap_or_default();
    let crosses_wall = path.iter().any(|p| grid.is_wall(*p));
    results.push(TestResult {
        name: "path_avoids_walls".into(),
        passed: !path.is_empty() && !crosses_wall,
        detail: format!("{} steps to the far corner", path.len()),
    });

    // A row of tables forces a detour
    for x in 1..11 {
        if let Err(e) = grid.place(FurnitureId(x as u32), GridPos::new(x, 6), true) {
            results.push(TestResult {
                name: "path_detour_setup".into(),
                passed: false,
                detail: e.to_string(),
            });
            return results;
        }
    }
    let detour = pathfinder
        .find_path(&grid, GridPos::new(1, 8), GridPos::new(1, 4))
        .map(|p| p.len());
    results.push(TestResult {
        name: "path_detours_around_furniture".into(),
        passed: detour == Some(24),
        detail: format!("detour length {:?}", detour),
    });

    if verbose {
        println!("  cache holds {} paths", pathfinder.cache_size());
    }
    results
}

// ── 3. Economy ──────────────────────────────────────────────────────────

fn validate_economy(verbose: bool) -> Vec<TestResult> {
    println!("--- Economy ---");
    let mut results = Vec::new();
    let bonuses = Bonuses::default();

    // Payment never drops with more patience
    let mut last = 0;
    let mut monotone = true;
    for p in 0..=30 {
        let payment = compute_payment(p as f32, false, false, &bonuses);
        monotone &= payment.money >= last;
        last = payment.money;
    }
    results.push(TestResult {
        name: "payment_grows_with_patience".into(),
        passed: monotone,
        detail: format!("full patience pays ${}", last),
    });

    let plain = compute_payment(20.0, false, false, &bonuses);
    let vip = compute_payment(20.0, true, false, &bonuses);
    results.push(TestResult {
        name: "payment_vip_triples".into(),
        passed: vip.money == plain.money * 3 && vip.xp == plain.xp * 3,
        detail: format!("${} vs ${}", plain.money, vip.money),
    });

    let fame_range: Vec<f32> = (0..=30).map(|p| fame_gain(p as f32, 30.0)).collect();
    let in_range = fame_range.iter().all(|f| (1.0..=6.0).contains(f));
    results.push(TestResult {
        name: "fame_gain_bounded".into(),
        passed: in_range,
        detail: format!(
            "{} to {}",
            fame_range.first().copied().unwrap_or_default(),
            fame_range.last().copied().unwrap_or_default()
        ),
    });

    let intervals: Vec<f32> = [0.0, 50.0, 100.0, 500.0].iter().map(|f| spawn_interval(*f)).collect();
    let shrinking = intervals.windows(2).all(|w| w[1] <= w[0]);
    results.push(TestResult {
        name: "spawn_interval_shrinks_with_fame".into(),
        passed: shrinking && intervals.iter().all(|i| *i >= 2.0),
        detail: format!("{:?}", intervals),
    });

    if verbose {
        println!("  payments sampled over 31 patience values");
    }
    results
}

// ── 4. Busy shift ───────────────────────────────────────────────────────

fn validate_shift(config: &SimConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Busy Shift ---");
    let mut results = Vec::new();

    let mut engine = SimulationEngine::starter_with(config.clone());
    engine.add_staff(StaffRole::Cook, GridPos::new(3, 2));
    engine.add_staff(StaffRole::Cleaner, GridPos::new(8, 8));

    let mut order_violations = 0;
    let mut station_violations = 0;
    let mut dropoff_violations = 0;
    let ticks = 6000;
    for _ in 0..ticks {
        engine.tick(DT);
        order_violations += count_order_violations(&engine);
        station_violations += count_station_violations(&engine);
        dropoff_violations += engine
            .dropoffs()
            .filter(|(_, items)| items.len() > engine.config().dropoff_capacity)
            .count();
    }

    results.push(TestResult {
        name: "shift_orders_match_customers".into(),
        passed: order_violations == 0,
        detail: format!("{} violations over {} ticks", order_violations, ticks),
    });
    results.push(TestResult {
        name: "shift_stations_exclusive".into(),
        passed: station_violations == 0,
        detail: format!("{} violations", station_violations),
    });
    results.push(TestResult {
        name: "shift_dropoffs_within_capacity".into(),
        passed: dropoff_violations == 0,
        detail: format!("{} violations", dropoff_violations),
    });

    let ledger = engine.ledger();
    results.push(TestResult {
        name: "shift_customers_served".into(),
        passed: ledger.customers_served > 0 && ledger.money > config.starting_money,
        detail: format!(
            "{} served, ${} in the till, fame {:.1}",
            ledger.customers_served, ledger.money, ledger.fame
        ),
    });

    if verbose {
        for agent in engine.agents() {
            println!("  {:?} #{} {} at {:?}", agent.kind, agent.id, agent.state, agent.position);
        }
    }
    results
}

fn count_order_violations(engine: &SimulationEngine) -> usize {
    let mut seen = BTreeSet::new();
    let mut violations = 0;
    for order in engine.orders() {
        let waiting = engine
            .customer(order.customer)
            .map_or(false, |c| c.state.has_open_order() && c.order == order.item);
        if !seen.insert(order.customer) || !waiting {
            violations += 1;
        }
    }
    violations
        + engine
            .world
            .query::<&Customer>()
            .iter()
            .filter(|(_, c)| c.state.has_open_order() && !seen.contains(&c.id))
            .count()
}

fn count_station_violations(engine: &SimulationEngine) -> usize {
    let mut in_use = BTreeSet::new();
    let mut violations = 0;
    for (_, staff) in engine.world.query::<&Staff>().iter() {
        if let StaffState::MovingToStation { station, .. } | StaffState::Cooking { station, .. } = staff.state {
            let held = engine
                .ctx
                .stations
                .get(station)
                .map_or(true, |f| f.reserved_by() == Some(staff.id));
            if !in_use.insert(station) || !held {
                violations += 1;
            }
        }
    }
    violations
}

// ── 5. Neglect ──────────────────────────────────────────────────────────

fn validate_neglect(verbose: bool) -> Vec<TestResult> {
    println!("--- Neglected Customers ---");
    let mut results = Vec::new();

    let mut engine = SimulationEngine::new();
    let mut tables = Vec::new();
    for x in [4, 6, 8] {
        match engine.place_furniture(FurnitureKind::Table, GridPos::new(x, 5)) {
            Ok(id) => tables.push(id),
            Err(e) => {
                results.push(TestResult {
                    name: "neglect_setup".into(),
                    passed: false,
                    detail: e.to_string(),
                });
                return results;
            }
        }
    }
    for table in &tables {
        if let Err(e) = engine.spawn_customer(*table) {
            results.push(TestResult {
                name: "neglect_setup".into(),
                passed: false,
                detail: e.to_string(),
            });
            return results;
        }
    }

    let mut angry_seen = false;
    for _ in 0..1200 {
        engine.tick(DT);
        angry_seen |= engine
            .agents()
            .iter()
            .any(|a| a.kind == AgentKind::Customer && a.state == "leaving_angry");
    }

    results.push(TestResult {
        name: "neglect_customers_storm_out".into(),
        passed: angry_seen && engine.customer_count() == 0,
        detail: format!("{} customers still inside", engine.customer_count()),
    });
    results.push(TestResult {
        name: "neglect_no_income".into(),
        passed: engine.ledger().money == engine.config().starting_money && engine.orders().count() == 0,
        detail: format!("${}", engine.ledger().money),
    });
    let free = engine.furniture().filter(|f| f.is_free_table()).count();
    results.push(TestResult {
        name: "neglect_tables_freed".into(),
        passed: free == tables.len(),
        detail: format!("{}/{} tables free", free, tables.len()),
    });

    if verbose {
        println!("  fame after neglect: {:.2}", engine.ledger().fame);
    }
    results
}

// ── 6. Snapshot ─────────────────────────────────────────────────────────

fn validate_snapshot(config: &SimConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Snapshot ---");
    let mut results = Vec::new();

    let mut original = SimulationEngine::starter_with(config.clone());
    for _ in 0..900 {
        original.tick(DT);
    }
    let bytes = match original.serialize_state() {
        Ok(bytes) => bytes,
        Err(e) => {
            results.push(TestResult {
                name: "snapshot_encode".into(),
                passed: false,
                detail: e.to_string(),
            });
            return results;
        }
    };

    let mut restored = SimulationEngine::new();
    let loaded = restored.restore_state(&bytes);
    results.push(TestResult {
        name: "snapshot_restore".into(),
        passed: loaded.is_ok(),
        detail: match &loaded {
            Ok(()) => format!("{} bytes", bytes.len()),
            Err(e) => e.to_string(),
        },
    });

    for _ in 0..900 {
        original.tick(DT);
        restored.tick(DT);
    }
    results.push(TestResult {
        name: "snapshot_deterministic_resume".into(),
        passed: original.agents() == restored.agents() && original.ledger() == restored.ledger(),
        detail: format!(
            "{} agents, ${} vs ${}",
            original.agents().len(),
            original.ledger().money,
            restored.ledger().money
        ),
    });

    let before = restored.ledger().money;
    let rejected = restored.restore_state(&bytes[..bytes.len() / 3]).is_err();
    results.push(TestResult {
        name: "snapshot_rejects_truncated".into(),
        passed: rejected && restored.ledger().money == before,
        detail: "state untouched after rejection".into(),
    });

    if verbose {
        println!("  snapshot size: {} bytes", bytes.len());
    }
    results
}
