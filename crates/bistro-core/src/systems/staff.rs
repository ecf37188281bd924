//! Staff dispatcher: energy, exhaustion and per-role controllers.
//!
//! Staff run one at a time in hire order. Each member is copied out of the
//! world, stepped, and written back before the next one runs, so a claim
//! made by an earlier staff member is visible to every later one in the
//! same tick.

use hecs::{Entity, World};

use bistro_logic::ids::StaffId;

use crate::components::{Motor, Staff, StaffRole, StaffState};
use crate::context::SimulationContext;
use crate::systems::{cleaner, cook, server};

pub fn staff_system(world: &mut World, ctx: &mut SimulationContext, dt: f32) {
    let mut roster: Vec<(StaffId, Entity)> = world
        .query::<&Staff>()
        .iter()
        .map(|(entity, s)| (s.id, entity))
        .collect();
    roster.sort_by_key(|(id, _)| *id);

    for (_, entity) in roster {
        let (mut staff, mut motor) = match (world.get::<&Staff>(entity), world.get::<&Motor>(entity)) {
            (Ok(s), Ok(m)) => ((*s).clone(), (*m).clone()),
            _ => continue,
        };

        step(world, ctx, &mut staff, &mut motor, dt);

        if let Ok(mut s) = world.get::<&mut Staff>(entity) {
            *s = staff;
        }
        if let Ok(mut m) = world.get::<&mut Motor>(entity) {
            *m = motor;
        }
    }
}

fn step(world: &World, ctx: &mut SimulationContext, staff: &mut Staff, motor: &mut Motor, dt: f32) {
    // Only between tasks, so an exhausted worker never holds a reservation
    if staff.state == StaffState::Idle && staff.energy <= 0.0 {
        staff.state = StaffState::Exhausted;
        motor.stop();
        log::info!("{} ({}) is exhausted", staff.id, staff.role.name());
        return;
    }

    match staff.role {
        StaffRole::Cook => cook::step(world, ctx, staff, motor, dt),
        StaffRole::Server => server::step(world, ctx, staff, motor),
        StaffRole::Cleaner => cleaner::step(ctx, staff, motor, dt),
    }

    if staff.state.is_working() {
        staff.energy = (staff.energy - dt * ctx.config.energy_decay_per_sec).max(0.0);
    }
}
