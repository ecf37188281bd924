//! Movement system - advances every agent's motor along its path

use hecs::World;

use bistro_logic::ids::GridPos;
use bistro_logic::motor::MoveOutcome;

use crate::components::Motor;
use crate::context::SimulationContext;

/// Step all motors by `dt` seconds.
pub fn movement_system(world: &mut World, dt: f32) {
    for (_entity, motor) in world.query_mut::<&mut Motor>() {
        motor.advance(dt);
    }
}

/// Drive a motor toward `target`; true once the agent stands there.
///
/// Safe to call every tick: an agent already walking to `target` keeps its
/// path, and one stuck elsewhere (no path last time) tries again.
pub fn walk_to(ctx: &mut SimulationContext, motor: &mut Motor, target: GridPos) -> bool {
    if motor.arrived_at(target) {
        return true;
    }
    matches!(
        motor.move_to(&ctx.grid, &mut ctx.pathfinder, target),
        MoveOutcome::Arrived
    )
}
