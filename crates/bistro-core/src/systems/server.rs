//! Server controller: match ready food to waiting customers and deliver it.

use hecs::{Entity, World};

use bistro_logic::ids::{CustomerId, FurnitureId, StaffId};
use bistro_logic::recipes::Recipe;

use crate::components::{Customer, CustomerState, Motor, Staff, StaffState};
use crate::context::SimulationContext;
use crate::systems::customer::{find_customer, receive};
use crate::systems::movement::walk_to;

pub fn step(world: &World, ctx: &mut SimulationContext, staff: &mut Staff, motor: &mut Motor) {
    let me = staff.id;
    staff.state = match staff.state.clone() {
        StaffState::Idle => match find_delivery(world, ctx) {
            Some((entity, customer, item, dropoff)) => {
                if let Ok(mut c) = world.get::<&mut Customer>(entity) {
                    c.state = CustomerState::BeingServed;
                }
                log::debug!("{me} picking up {item} from {dropoff} for {customer}");
                pick_up(world, ctx, motor, me, customer, item, dropoff)
            }
            None => StaffState::Idle,
        },

        StaffState::MovingToPickup {
            customer,
            item,
            dropoff,
        } => pick_up(world, ctx, motor, me, customer, item, dropoff),

        StaffState::MovingToTable { customer, item } => deliver(world, ctx, motor, me, customer, item),

        other => other,
    };
}

/// First waiting customer (by id) whose dish sits on a dropoff that other
/// servers have not already spoken for.
fn find_delivery(world: &World, ctx: &SimulationContext) -> Option<(Entity, CustomerId, Recipe, FurnitureId)> {
    let targeted: Vec<(FurnitureId, Recipe)> = world
        .query::<&Staff>()
        .iter()
        .filter_map(|(_, s)| match s.state {
            StaffState::MovingToPickup { dropoff, item, .. } => Some((dropoff, item)),
            _ => None,
        })
        .collect();

    let mut waiting: Vec<(CustomerId, Recipe, Entity)> = world
        .query::<&Customer>()
        .iter()
        .filter(|(_, c)| c.state == CustomerState::WaitingForFood)
        .map(|(entity, c)| (c.id, c.order, entity))
        .collect();
    waiting.sort_by_key(|(id, _, _)| *id);

    waiting.into_iter().find_map(|(customer, item, entity)| {
        ctx.stations
            .dropoffs()
            .find(|(dropoff, items)| {
                let ready = items.iter().filter(|i| **i == item).count();
                let spoken_for = targeted
                    .iter()
                    .filter(|(d, i)| d == dropoff && *i == item)
                    .count();
                ready > spoken_for
            })
            .map(|(dropoff, _)| (entity, customer, item, dropoff))
    })
}

fn pick_up(
    world: &World,
    ctx: &mut SimulationContext,
    motor: &mut Motor,
    me: StaffId,
    customer: CustomerId,
    item: Recipe,
    dropoff: FurnitureId,
) -> StaffState {
    let Some(pos) = ctx.stations.position(dropoff) else {
        release_customer(world, customer);
        motor.stop();
        return StaffState::Idle;
    };
    if !walk_to(ctx, motor, pos) {
        return StaffState::MovingToPickup {
            customer,
            item,
            dropoff,
        };
    }

    let still_waiting = find_customer(world, customer)
        .and_then(|e| world.get::<&Customer>(e).ok().map(|c| c.state == CustomerState::BeingServed))
        .unwrap_or(false);
    if !still_waiting {
        return StaffState::Idle;
    }
    if !ctx.stations.take_item(dropoff, item) {
        log::debug!("{me} found no {item} on {dropoff}");
        release_customer(world, customer);
        return StaffState::Idle;
    }
    deliver(world, ctx, motor, me, customer, item)
}

fn deliver(
    world: &World,
    ctx: &mut SimulationContext,
    motor: &mut Motor,
    me: StaffId,
    customer: CustomerId,
    item: Recipe,
) -> StaffState {
    let Some(entity) = find_customer(world, customer) else {
        log::warn!("{me} discarded {item}: {customer} is gone");
        return StaffState::Idle;
    };
    let seat = match world.get::<&Customer>(entity) {
        Ok(c) => c.seat,
        Err(_) => return StaffState::Idle,
    };
    if !walk_to(ctx, motor, seat) {
        return StaffState::MovingToTable { customer, item };
    }

    if let Ok(mut c) = world.get::<&mut Customer>(entity) {
        if receive(&mut c, ctx, item) {
            log::debug!("{me} served {item} to {customer}");
        } else {
            log::warn!("{me} discarded {item}: {customer} no longer wants it");
        }
    }
    StaffState::Idle
}

/// Put a customer back in the queue after a failed pickup.
pub(crate) fn release_customer(world: &World, customer: CustomerId) {
    if let Some(entity) = find_customer(world, customer) {
        if let Ok(mut c) = world.get::<&mut Customer>(entity) {
            if c.state == CustomerState::BeingServed {
                c.state = CustomerState::WaitingForFood;
            }
        }
    }
}
