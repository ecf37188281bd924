//! Gardens: planting, growth and harvest.

use bistro_logic::ids::GridPos;
use bistro_logic::recipes::{Ingredient, Recipe};

use crate::context::SimulationContext;
use crate::error::{SimError, SimResult};

pub fn garden_system(ctx: &mut SimulationContext, dt: f32) {
    let rate = ctx.config.garden_growth_per_sec;
    ctx.stations.grow_gardens(dt, rate);
}

/// Sow a held seed in the empty garden at `pos`.
pub fn plant(ctx: &mut SimulationContext, pos: GridPos, crop: Ingredient) -> SimResult<()> {
    let id = ctx.grid.occupant_at(pos).ok_or(SimError::NoFurnitureAt(pos))?;
    let plot = ctx.stations.garden_mut(id).ok_or(SimError::NotAGarden(pos))?;
    if plot.crop.is_some() {
        return Err(SimError::GardenOccupied(pos));
    }
    if !ctx.pantry.take_seed(crop) {
        return Err(SimError::NoSeeds(crop));
    }
    plot.crop = Some(crop);
    plot.growth = 0.0;
    plot.ready = false;
    log::debug!("Planted {crop:?} at {pos}");
    Ok(())
}

/// Collect a ripe garden. Returns the recipes the new stock unlocked.
pub fn harvest(ctx: &mut SimulationContext, pos: GridPos) -> SimResult<Vec<Recipe>> {
    let id = ctx.grid.occupant_at(pos).ok_or(SimError::NoFurnitureAt(pos))?;
    let plot = ctx.stations.garden_mut(id).ok_or(SimError::NotAGarden(pos))?;
    let crop = match plot.crop {
        Some(crop) if plot.ready => crop,
        _ => return Err(SimError::GardenNotReady(pos)),
    };
    ctx.pantry.store(crop, ctx.config.harvest_yield)?;
    *plot = Default::default();

    ctx.ledger.add_xp(ctx.config.harvest_xp);
    let unlocked = ctx.recipes.discover(&ctx.pantry);
    for recipe in &unlocked {
        log::info!("Discovered a new recipe: {recipe}");
    }
    Ok(unlocked)
}
