//! Cook controller: claim an order, cook it, put it on a dropoff.
//!
//! A cook only starts when the kitchen is short of the item: open orders for
//! it must outnumber the copies already on dropoffs, in servers' hands and in
//! other cooks' pipelines. Orders are scanned first-come first-served and the
//! first one that can actually be worked (ingredients, a free appliance, room
//! on a dropoff) is taken, so one blocked order never starves the rest.

use hecs::World;

use bistro_logic::ids::{CustomerId, FurnitureId, StaffId};
use bistro_logic::recipes::{Cookable, Recipe};
use bistro_logic::stations::DropoffRejection;

use crate::components::{Motor, Staff, StaffState};
use crate::context::SimulationContext;
use crate::systems::movement::walk_to;

struct Job {
    order: CustomerId,
    recipe: Recipe,
    station: FurnitureId,
    dropoff: FurnitureId,
}

pub fn step(world: &World, ctx: &mut SimulationContext, staff: &mut Staff, motor: &mut Motor, dt: f32) {
    let me = staff.id;
    staff.state = match staff.state.clone() {
        StaffState::Idle => match find_job(world, ctx) {
            Some(job) => start_job(ctx, staff, motor, job),
            None => StaffState::Idle,
        },

        StaffState::MovingToStation {
            order,
            recipe,
            station,
            dropoff,
            timer,
        } => match ctx.stations.position(station) {
            Some(pos) if ctx.stations.is_reserved_by(station, me) => {
                if walk_to(ctx, motor, pos) {
                    log::debug!("{me} started cooking {recipe} for {order}");
                    StaffState::Cooking {
                        order,
                        recipe,
                        station,
                        dropoff,
                        timer,
                    }
                } else {
                    StaffState::MovingToStation {
                        order,
                        recipe,
                        station,
                        dropoff,
                        timer,
                    }
                }
            }
            _ => abandon(ctx, motor, me, order, station),
        },

        StaffState::Cooking {
            order,
            recipe,
            station,
            dropoff,
            timer,
        } => {
            if !ctx.stations.is_reserved_by(station, me) {
                abandon(ctx, motor, me, order, station)
            } else if timer - dt > 0.0 {
                StaffState::Cooking {
                    order,
                    recipe,
                    station,
                    dropoff,
                    timer: timer - dt,
                }
            } else {
                ctx.stations.release(station, me);
                carry_to_dropoff(ctx, motor, me, order, recipe, dropoff)
            }
        }

        StaffState::MovingToDropoff {
            order,
            recipe,
            dropoff,
        } => carry_to_dropoff(ctx, motor, me, order, recipe, dropoff),

        // Exhausted, or a state that belongs to another role
        other => other,
    };
}

/// First order the kitchen can and should work on, FIFO.
fn find_job(world: &World, ctx: &SimulationContext) -> Option<Job> {
    let dropoff = dropoff_with_room(world, ctx)?;
    ctx.orders
        .iter()
        .filter(|o| o.claimed_by.is_none() && ctx.recipes.is_unlocked(o.item))
        .find_map(|o| {
            let supply = ctx.stations.stock_of(o.item) + in_flight(world, o.item);
            if ctx.orders.demand_for(o.item) <= supply || !ctx.pantry.can_cook(o.item) {
                return None;
            }
            let station = ctx.stations.first_free_appliance(o.item.appliance())?;
            Some(Job {
                order: o.customer,
                recipe: o.item,
                station,
                dropoff,
            })
        })
}

/// Copies of `item` being cooked or carried right now.
fn in_flight(world: &World, item: Recipe) -> usize {
    world
        .query::<&Staff>()
        .iter()
        .filter(|(_, s)| s.state.recipe_in_progress() == Some(item) || s.state.carried_item() == Some(item))
        .count()
}

/// First dropoff with a slot no other cook is already heading for.
fn dropoff_with_room(world: &World, ctx: &SimulationContext) -> Option<FurnitureId> {
    let mut query = world.query::<&Staff>();
    let pending: Vec<FurnitureId> = query
        .iter()
        .filter_map(|(_, s)| s.state.dropoff_target())
        .collect();
    ctx.stations
        .iter()
        .filter_map(|f| f.free_slots().map(|free| (f.id, free)))
        .find(|(id, free)| *free > pending.iter().filter(|p| *p == id).count())
        .map(|(id, _)| id)
}

fn start_job(ctx: &mut SimulationContext, staff: &mut Staff, motor: &mut Motor, job: Job) -> StaffState {
    let me = staff.id;
    if !ctx.stations.reserve(job.station, me) {
        return StaffState::Idle;
    }
    if !ctx.orders.claim(job.order, me) || !ctx.pantry.consume(job.recipe) {
        ctx.orders.release_claim(job.order, me);
        ctx.stations.release(job.station, me);
        return StaffState::Idle;
    }

    if staff.progress.gain(ctx.config.staff_xp_per_cook) {
        motor.speed += ctx.config.level_up_speed_bonus;
        log::info!("{me} reached level {}", staff.progress.level);
    }

    log::debug!("{me} claimed {} for {} at {}", job.recipe, job.order, job.station);
    let timer = job.recipe.base_cook_time() / ctx.config.cooking_speed;
    if let Some(pos) = ctx.stations.position(job.station) {
        walk_to(ctx, motor, pos);
    }
    StaffState::MovingToStation {
        order: job.order,
        recipe: job.recipe,
        station: job.station,
        dropoff: job.dropoff,
        timer,
    }
}

fn carry_to_dropoff(
    ctx: &mut SimulationContext,
    motor: &mut Motor,
    me: StaffId,
    order: CustomerId,
    recipe: Recipe,
    dropoff: FurnitureId,
) -> StaffState {
    let Some(pos) = ctx.stations.position(dropoff) else {
        log::warn!("{me} dropped {recipe}: {dropoff} is gone");
        ctx.orders.release_claim(order, me);
        return StaffState::Idle;
    };
    if !walk_to(ctx, motor, pos) {
        return StaffState::MovingToDropoff {
            order,
            recipe,
            dropoff,
        };
    }

    match ctx.stations.push_item(dropoff, recipe) {
        Ok(()) => log::debug!("{me} placed {recipe} on {dropoff}"),
        Err(DropoffRejection::Full) => log::warn!("{me} dropped {recipe}: {dropoff} is full"),
        Err(DropoffRejection::Missing) => log::warn!("{me} dropped {recipe}: {dropoff} is gone"),
    }
    ctx.orders.release_claim(order, me);
    StaffState::Idle
}

/// Give up the current dish; the ingredients are lost.
fn abandon(
    ctx: &mut SimulationContext,
    motor: &mut Motor,
    me: StaffId,
    order: CustomerId,
    station: FurnitureId,
) -> StaffState {
    log::debug!("{me} abandoned the order of {order}: {station} is unavailable");
    ctx.stations.release(station, me);
    ctx.orders.release_claim(order, me);
    motor.stop();
    StaffState::Idle
}
