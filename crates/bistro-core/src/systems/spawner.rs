//! Fame accrual and automatic customer arrivals.

use hecs::World;

use bistro_logic::economy::spawn_interval;

use crate::context::SimulationContext;
use crate::systems::customer::spawn_random;

pub fn spawner_system(world: &mut World, ctx: &mut SimulationContext, dt: f32) {
    let (rate, step) = (ctx.config.fame_per_sec, ctx.config.fame_cap_step);
    ctx.ledger.accrue(dt, rate, step);

    if !ctx.config.auto_spawn {
        return;
    }
    ctx.spawn_timer += dt;
    if ctx.spawn_timer < spawn_interval(ctx.ledger.fame) {
        return;
    }
    ctx.spawn_timer = 0.0;

    match ctx.stations.first_free_table() {
        Some(table) => {
            if let Err(e) = spawn_random(world, ctx, table) {
                log::warn!("Could not seat a new customer: {e}");
            }
        }
        None => log::debug!("No free table, customer turned away"),
    }
}
