//! Customer lifecycle: arrive, order, wait, eat, pay, leave.

use hecs::{Entity, World};
use rand::seq::SliceRandom;

use bistro_logic::economy::{compute_payment, fame_gain, Bonuses};
use bistro_logic::ids::{CustomerId, FurnitureId, GridPos};
use bistro_logic::motor::Motor;
use bistro_logic::recipes::Recipe;

use crate::components::{Customer, CustomerState, Departed};
use crate::context::SimulationContext;
use crate::error::{SimError, SimResult};
use crate::systems::movement::walk_to;

/// Advance every customer, oldest first.
pub fn customer_system(world: &mut World, ctx: &mut SimulationContext, dt: f32) {
    let bonuses = ctx.bonuses();
    let exit = ctx.entrance();

    let mut roster: Vec<(CustomerId, Entity)> = world
        .query::<&Customer>()
        .iter()
        .map(|(entity, c)| (c.id, entity))
        .collect();
    roster.sort_by_key(|(id, _)| *id);

    let mut departed = Vec::new();
    for (_, entity) in roster {
        let Ok((customer, motor)) = world.query_one_mut::<(&mut Customer, &mut Motor)>(entity) else {
            continue;
        };
        if step(ctx, customer, motor, dt, &bonuses, exit) {
            departed.push(entity);
        }
    }

    for entity in departed {
        if let Err(e) = world.insert_one(entity, Departed) {
            log::warn!("Could not mark a departed customer: {e}");
        }
    }
}

/// Returns true once the customer has walked out.
fn step(
    ctx: &mut SimulationContext,
    customer: &mut Customer,
    motor: &mut Motor,
    dt: f32,
    bonuses: &Bonuses,
    exit: GridPos,
) -> bool {
    match customer.state {
        CustomerState::Arriving => {
            if walk_to(ctx, motor, customer.seat) {
                ctx.orders.post(customer.id, customer.order);
                customer.patience = customer.max_patience;
                customer.state = CustomerState::WaitingForFood;
                log::debug!("{} seated at {}, ordered {}", customer.id, customer.table, customer.order);
            }
        }
        CustomerState::WaitingForFood => {
            customer.patience -= dt * bonuses.patience_decay;
            if customer.patience <= 0.0 {
                customer.patience = 0.0;
                storm_out(ctx, customer);
                walk_to(ctx, motor, exit);
            }
        }
        CustomerState::BeingServed => {}
        CustomerState::Eating { remaining } => {
            let remaining = remaining - dt;
            if remaining > 0.0 {
                customer.state = CustomerState::Eating { remaining };
            } else {
                settle(ctx, customer, bonuses);
                walk_to(ctx, motor, exit);
            }
        }
        CustomerState::Leaving | CustomerState::LeavingAngry => {
            return walk_to(ctx, motor, exit);
        }
    }
    false
}

/// Give up waiting: order withdrawn, table freed, nothing paid.
pub(crate) fn storm_out(ctx: &mut SimulationContext, customer: &mut Customer) {
    ctx.orders.remove(customer.id);
    ctx.stations.vacate_table(customer.table, customer.id);
    customer.state = CustomerState::LeavingAngry;
    log::debug!("{} left angry", customer.id);
}

/// Pay for the meal, maybe leave a mess, free the table.
fn settle(ctx: &mut SimulationContext, customer: &mut Customer, bonuses: &Bonuses) {
    let big_tip = ctx.roll(bonuses.tip_chance);
    let payment = compute_payment(customer.patience, customer.vip, big_tip, bonuses);
    let fame = fame_gain(customer.patience, customer.max_patience);
    ctx.ledger.record_payment(&payment, fame);
    log::debug!("{} paid ${} (tip ${})", customer.id, payment.money, payment.tip);

    if ctx.roll(ctx.config.dirty_chance) {
        ctx.stations
            .dirty_table(customer.table, ctx.config.auto_clean_after);
    }
    ctx.stations.vacate_table(customer.table, customer.id);
    customer.state = CustomerState::Leaving;
}

/// Hand a dish to a customer who is being served.
///
/// Returns false (and changes nothing) if the customer is not expecting it.
pub fn receive(customer: &mut Customer, ctx: &mut SimulationContext, item: Recipe) -> bool {
    if customer.state != CustomerState::BeingServed || item != customer.order {
        return false;
    }
    ctx.orders.remove(customer.id);
    customer.state = CustomerState::Eating {
        remaining: ctx.config.eat_duration,
    };
    true
}

/// Seat a new customer at `table` with a random unlocked dish.
pub fn spawn_random(world: &mut World, ctx: &mut SimulationContext, table: FurnitureId) -> SimResult<CustomerId> {
    let item = ctx
        .recipes
        .unlocked()
        .choose(&mut ctx.rng)
        .copied()
        .unwrap_or(Recipe::Burger);
    let vip = ctx.roll(ctx.config.vip_chance);
    spawn(world, ctx, table, item, vip)
}

/// Seat a new customer at `table`. They walk in from the entrance and order
/// on arrival.
pub fn spawn(
    world: &mut World,
    ctx: &mut SimulationContext,
    table: FurnitureId,
    item: Recipe,
    vip: bool,
) -> SimResult<CustomerId> {
    let seat = match ctx.stations.get(table) {
        Some(f) if f.is_free_table() => f.pos,
        _ => return Err(SimError::TableUnavailable(table)),
    };
    let id = CustomerId(ctx.ids.customers.allocate());
    ctx.stations.occupy_table(table, id);

    let max_patience = if vip {
        ctx.config.vip_patience
    } else {
        ctx.config.patience
    };
    let customer = Customer {
        id,
        table,
        seat,
        order: item,
        patience: max_patience,
        max_patience,
        vip,
        state: CustomerState::Arriving,
    };
    world.spawn((customer, Motor::new(ctx.entrance(), ctx.config.agent_speed)));
    log::debug!("{id} arriving for {table}{}", if vip { " (VIP)" } else { "" });
    Ok(id)
}

pub fn find_customer(world: &World, id: CustomerId) -> Option<Entity> {
    world
        .query::<&Customer>()
        .iter()
        .find(|(_, c)| c.id == id)
        .map(|(entity, _)| entity)
}
