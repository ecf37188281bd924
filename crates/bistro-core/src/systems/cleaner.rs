//! Cleaner controller and dirty-table upkeep.

use bistro_logic::ids::FurnitureId;

use crate::components::{Motor, Staff, StaffState};
use crate::context::SimulationContext;
use crate::systems::movement::walk_to;

pub fn step(ctx: &mut SimulationContext, staff: &mut Staff, motor: &mut Motor, dt: f32) {
    let me = staff.id;
    staff.state = match staff.state.clone() {
        StaffState::Idle => match ctx.stations.first_unclaimed_dirty_table() {
            Some(table) if ctx.stations.claim_dirt(table, me) => {
                log::debug!("{me} heading to clean {table}");
                head_to(ctx, motor, table)
            }
            _ => StaffState::Idle,
        },

        StaffState::MovingToDirt { table } => {
            if ctx.stations.is_dirt_claimed_by(table, me) {
                head_to(ctx, motor, table)
            } else {
                motor.stop();
                StaffState::Idle
            }
        }

        StaffState::Cleaning { table, timer } => {
            if !ctx.stations.is_dirt_claimed_by(table, me) {
                StaffState::Idle
            } else if timer - dt > 0.0 {
                StaffState::Cleaning {
                    table,
                    timer: timer - dt,
                }
            } else {
                ctx.stations.clean_table(table);
                log::debug!("{me} cleaned {table}");
                StaffState::Idle
            }
        }

        other => other,
    };
}

fn head_to(ctx: &mut SimulationContext, motor: &mut Motor, table: FurnitureId) -> StaffState {
    match ctx.stations.position(table) {
        Some(pos) if walk_to(ctx, motor, pos) => StaffState::Cleaning {
            table,
            timer: ctx.config.clean_duration,
        },
        Some(_) => StaffState::MovingToDirt { table },
        None => StaffState::Idle,
    }
}

/// Count down self-cleaning messes.
pub fn dirt_system(ctx: &mut SimulationContext, dt: f32) {
    for table in ctx.stations.tick_dirt(dt) {
        log::debug!("{table} cleaned itself");
    }
}
