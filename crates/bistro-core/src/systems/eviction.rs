//! Removal of departed agents and release of everything they held.

use hecs::{Entity, World};

use crate::components::{Customer, Departed, Staff};
use crate::context::SimulationContext;
use crate::systems::server::release_customer;

/// Despawn every agent flagged `Departed` this tick.
pub fn eviction_system(world: &mut World, ctx: &mut SimulationContext) {
    let gone: Vec<Entity> = world
        .query::<&Departed>()
        .iter()
        .map(|(entity, _)| entity)
        .collect();
    for entity in gone {
        evict(world, ctx, entity);
    }
}

/// Remove one agent from the world and from every index that mentions it.
pub fn evict(world: &mut World, ctx: &mut SimulationContext, entity: Entity) {
    let customer = world.get::<&Customer>(entity).ok().map(|c| (c.id, c.table));
    if let Some((id, table)) = customer {
        ctx.orders.remove(id);
        ctx.stations.vacate_table(table, id);
        log::debug!("{id} left the restaurant");
    }

    let staff = world.get::<&Staff>(entity).ok().map(|s| (s.id, s.state.serving()));
    if let Some((id, serving)) = staff {
        ctx.stations.release_all(id);
        ctx.stations.release_dirt_claims(id);
        ctx.orders.release_claims_of(id);
        if let Some(customer) = serving {
            release_customer(world, customer);
        }
    }

    let _ = world.despawn(entity);
}
