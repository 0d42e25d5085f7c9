//! Animal behavior: energy economics, movement, feeding, reproduction and
//! evolution along the Mouse -> Sheep and Cat -> Wolf lineages.
//!
//! Per tick an animal ages and pays its move cost, moves, eats one random
//! diet-matching occupant of its new cell, then either dies (energy below
//! zero), reproduces, or evolves. Reproduction is checked before evolution and
//! at most one of the two happens per tick.

use crate::config::{AnimalConfig, Movement};
use crate::entity::{AnimalState, EntityId, EntityState, Species};
use crate::error::EngineError;
use crate::grid::{Neighborhood, Position};
use crate::scheduler::TickContext;
use crate::store::EntityStore;
use crate::SimRng;
use rand::seq::SliceRandom;
use rand::Rng;

/// What happened to an animal at the end of its step
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Outcome {
    Survived,
    Starved,
    Reproduced { offspring: EntityId },
    Evolved { into: EntityId, species: Species },
}

/// Step behavior shared by every animal species
pub fn step_animal(ctx: &mut TickContext<'_>, id: EntityId) -> Result<(), EngineError> {
    advance(ctx, id).map(|_| ())
}

/// Run one animal step and report how it ended
pub fn advance(ctx: &mut TickContext<'_>, id: EntityId) -> Result<Outcome, EngineError> {
    let Some((pos, mut animal)) = ctx
        .store
        .get(id)
        .and_then(|entity| entity.as_animal().map(|animal| (entity.pos, *animal)))
    else {
        return Ok(Outcome::Survived);
    };
    let species = animal.species;
    let config = ctx.config;
    let params: &AnimalConfig = config.species.get(species);

    // Phase 1: metabolism
    animal.age += 1;
    animal.energy -= params.move_cost;

    // Phase 2: movement
    let target = choose_destination(
        ctx.store,
        ctx.rng,
        pos,
        species,
        params.movement,
        config.world.neighborhood,
    );
    ctx.store.move_to(id, target);

    // Phase 3: feeding
    animal.energy += feed(ctx, target, species);

    // Phase 4: death
    if animal.energy < 0.0 {
        ctx.store.destroy(id);
        return Ok(Outcome::Starved);
    }

    // Phase 5: reproduction, else evolution
    let outcome = if animal.energy > params.reproduce_energy
        && ctx.rng.gen::<f64>() < params.reproduce_chance
    {
        animal.energy /= 2.0;
        let offspring = ctx
            .store
            .create(target, EntityState::Animal(AnimalState::new(species, animal.energy)));
        Outcome::Reproduced { offspring }
    } else if let Some(next) = species
        .evolves_to()
        .filter(|_| animal.energy > params.reproduce_energy && animal.age > params.evolution_time)
    {
        let replacement = EntityState::Animal(AnimalState::new(next, animal.energy));
        let into = ctx
            .store
            .replace(id, replacement)
            .ok_or_else(|| EngineError::Inconsistent {
                id,
                detail: "evolving animal is not active".to_string(),
            })?;
        log::trace!(
            "tick {}: {:?} {} evolved into {:?} {} at {}",
            ctx.tick,
            species,
            id,
            next,
            into,
            target
        );
        return Ok(Outcome::Evolved { into, species: next });
    } else {
        Outcome::Survived
    };

    if let Some(entity) = ctx.store.get_mut(id) {
        entity.state = EntityState::Animal(animal);
    }
    Ok(outcome)
}

/// Eat one random diet-matching occupant of `pos`, returning the energy gained
fn feed(ctx: &mut TickContext<'_>, pos: Position, species: Species) -> f64 {
    let prey = ctx.store.occupants_matching(pos, |kind| species.eats(kind));
    let Some(&victim) = prey.choose(ctx.rng) else {
        return 0.0;
    };
    match ctx.store.destroy(victim) {
        Some(eaten) => ctx.config.food_energy.yield_of(eaten.kind()),
        None => 0.0,
    }
}

/// Pick the cell an animal moves to this tick
pub fn choose_destination(
    store: &EntityStore,
    rng: &mut SimRng,
    pos: Position,
    species: Species,
    movement: Movement,
    neighborhood: Neighborhood,
) -> Position {
    if let Movement::Hunt { radius } = movement {
        if let Some(prey) = nearest_prey(store, pos, species, radius) {
            return step_towards(store, pos, prey, neighborhood);
        }
    }
    random_neighbor(store, rng, pos, neighborhood)
}

/// Uniform choice over the neighborhood, staying put on a single-cell grid
pub fn random_neighbor(
    store: &EntityStore,
    rng: &mut SimRng,
    pos: Position,
    neighborhood: Neighborhood,
) -> Position {
    store
        .grid()
        .neighborhood(pos, neighborhood, 1, false)
        .choose(rng)
        .copied()
        .unwrap_or(pos)
}

/// Closest cell within `radius` holding something `species` eats.
/// Ties go to the first cell in scan order.
pub fn nearest_prey(
    store: &EntityStore,
    pos: Position,
    species: Species,
    radius: usize,
) -> Option<Position> {
    let grid = store.grid();
    grid.neighborhood(pos, Neighborhood::Moore, radius, false)
        .into_iter()
        .filter(|&cell| store.occupants(cell).any(|entity| species.eats(entity.kind())))
        .min_by_key(|&cell| grid.manhattan(pos, cell))
}

/// Neighboring cell (or the current one) closest to `target`
pub fn step_towards(
    store: &EntityStore,
    pos: Position,
    target: Position,
    neighborhood: Neighborhood,
) -> Position {
    let grid = store.grid();
    grid.neighborhood(pos, neighborhood, 1, true)
        .into_iter()
        .min_by_key(|&cell| grid.manhattan(cell, target))
        .unwrap_or(pos)
}
