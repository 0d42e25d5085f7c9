//! Soil fertility ladder and vegetation succession (Grass -> Bush -> Tree).
//!
//! Soil and vegetation form a feedback loop: fertility gates which plant may
//! grow on a cell, and the plant standing on a cell slowly changes its
//! fertility. Grass and bush enrich the soil; a tree exhausts it and dies.

use crate::entity::{BushState, EntityId, EntityState, GrassState, Vegetation};
use crate::error::EngineError;
use crate::grid::Position;
use crate::scheduler::TickContext;
use crate::store::EntityStore;

fn read_state(store: &EntityStore, id: EntityId) -> Option<(Position, EntityState)> {
    store.get(id).map(|entity| (entity.pos, entity.state))
}

fn write_state(store: &mut EntityStore, id: EntityId, state: EntityState) {
    if let Some(entity) = store.get_mut(id) {
        entity.state = state;
    }
}

/// Soil step: track what grows on the cell and adjust fertility
pub fn step_soil(ctx: &mut TickContext<'_>, id: EntityId) -> Result<(), EngineError> {
    let Some((pos, EntityState::Soil(mut soil))) = read_state(ctx.store, id) else {
        return Ok(());
    };
    let limits = &ctx.config.soil;

    match ctx.store.vegetation_at(pos) {
        None => {
            soil.vacant_ticks += 1;
            if soil.vacant_ticks > ctx.config.vegetation.soil_evolution_time && soil.fertility >= 1 {
                let regrow = ctx.config.vegetation.grass_regrowth_time as i64;
                ctx.store
                    .create(pos, EntityState::Grass(GrassState::sprouting(regrow)));
                soil.vacant_ticks = 0;
            }
        }
        Some((tree, Vegetation::Tree)) => {
            soil.under_tree_ticks += 1;
            if soil.under_tree_ticks > limits.tree_exhaustion_ticks {
                soil.fertility = soil.fertility.saturating_sub(1);
                soil.under_tree_ticks = 0;
                ctx.store.destroy(tree);
                log::trace!("tick {}: soil at {} exhausted, tree {} died", ctx.tick, pos, tree);
            }
        }
        Some((_, Vegetation::Bush)) => {
            soil.under_bush_ticks += 1;
            if soil.under_bush_ticks > limits.bush_enrichment_ticks && soil.fertility < limits.max_fertility {
                soil.fertility += 1;
                soil.under_bush_ticks = 0;
            }
        }
        Some((_, Vegetation::Grass)) => {
            soil.under_grass_ticks += 1;
            if soil.under_grass_ticks > limits.grass_enrichment_ticks && soil.fertility < limits.max_fertility {
                soil.fertility += 1;
                soil.under_grass_ticks = 0;
            }
        }
    }

    write_state(ctx.store, id, EntityState::Soil(soil));
    Ok(())
}

/// Grass step: regrow, age once grown, and turn into a bush on fertile soil
pub fn step_grass(ctx: &mut TickContext<'_>, id: EntityId) -> Result<(), EngineError> {
    let Some((pos, EntityState::Grass(mut grass))) = read_state(ctx.store, id) else {
        return Ok(());
    };
    let vegetation = &ctx.config.vegetation;

    if !grass.grown {
        grass.regrow_ticks -= 1;
        if grass.regrow_ticks <= 0 {
            grass.grown = true;
            grass.regrow_ticks = vegetation.grass_regrowth_time as i64;
        }
    } else {
        grass.growth_age += 1;
    }

    let fertility = ctx.store.fertility_at(pos, ctx.tick)?;
    if grass.grown && grass.growth_age > vegetation.grass_evolution_time && fertility > 1 {
        ctx.store
            .replace(id, EntityState::Bush(BushState::default()));
        return Ok(());
    }

    write_state(ctx.store, id, EntityState::Grass(grass));
    Ok(())
}

/// Bush step: age and turn into a tree on rich soil
pub fn step_bush(ctx: &mut TickContext<'_>, id: EntityId) -> Result<(), EngineError> {
    let Some((pos, EntityState::Bush(mut bush))) = read_state(ctx.store, id) else {
        return Ok(());
    };
    bush.age += 1;

    let fertility = ctx.store.fertility_at(pos, ctx.tick)?;
    if bush.age > ctx.config.vegetation.bush_evolution_time && fertility > 2 {
        ctx.store.replace(id, EntityState::Tree);
        return Ok(());
    }

    write_state(ctx.store, id, EntityState::Bush(bush));
    Ok(())
}

/// Trees are terminal. Their removal is driven by the soil underneath.
pub fn step_tree(ctx: &mut TickContext<'_>, id: EntityId) -> Result<(), EngineError> {
    if let Some(entity) = ctx.store.get(id) {
        ctx.store.soil_at(entity.pos, ctx.tick)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::entity::{Kind, SoilState};
    use crate::SimRng;
    use rand::SeedableRng;

    struct Cell {
        store: EntityStore,
        rng: SimRng,
        config: Config,
        soil: EntityId,
    }

    impl Cell {
        fn new(fertility: u8) -> Self {
            let mut store = EntityStore::new(1, 1);
            let soil = store.create(Position::new(0, 0), EntityState::Soil(SoilState::with_fertility(fertility)));
            Self {
                store,
                rng: SimRng::seed_from_u64(0),
                config: Config::default(),
                soil,
            }
        }

        fn step(&mut self, id: EntityId, tick: u64) -> Result<(), EngineError> {
            let kind = self.store.get(id).map(|e| e.kind());
            let mut ctx = TickContext {
                store: &mut self.store,
                rng: &mut self.rng,
                config: &self.config,
                tick,
            };
            match kind {
                Some(Kind::Soil) => step_soil(&mut ctx, id),
                Some(Kind::Grass) => step_grass(&mut ctx, id),
                Some(Kind::Bush) => step_bush(&mut ctx, id),
                Some(Kind::Tree) => step_tree(&mut ctx, id),
                _ => Ok(()),
            }
        }

        fn soil(&self) -> SoilState {
            *self.store.get(self.soil).unwrap().as_soil().unwrap()
        }
    }

    #[test]
    fn test_vacant_fertile_soil_sprouts_grass() {
        let mut cell = Cell::new(1);
        let wait = cell.config.vegetation.soil_evolution_time as u64;

        for tick in 1..=wait {
            cell.step(cell.soil, tick).unwrap();
            assert_eq!(cell.store.count_of(Kind::Grass), 0);
        }
        cell.step(cell.soil, wait + 1).unwrap();

        assert_eq!(cell.store.count_of(Kind::Grass), 1);
        assert_eq!(cell.soil().vacant_ticks, 0);
        let grass = cell.store.iter_kind(Kind::Grass).next().unwrap();
        assert_eq!(
            grass.as_grass().unwrap().regrow_ticks,
            cell.config.vegetation.grass_regrowth_time as i64
        );
    }

    #[test]
    fn test_barren_soil_stays_bare() {
        let mut cell = Cell::new(0);
        for tick in 1..=50 {
            cell.step(cell.soil, tick).unwrap();
        }
        assert_eq!(cell.store.count_of(Kind::Grass), 0);
        assert_eq!(cell.soil().vacant_ticks, 50);
    }

    #[test]
    fn test_tree_exhausts_soil() {
        let mut cell = Cell::new(3);
        let tree = cell.store.create(Position::new(0, 0), EntityState::Tree);

        for tick in 1..=200 {
            cell.step(cell.soil, tick).unwrap();
        }
        assert!(cell.store.is_active(tree));
        assert_eq!(cell.soil().fertility, 3);

        cell.step(cell.soil, 201).unwrap();
        assert!(!cell.store.is_active(tree));
        assert_eq!(cell.soil().fertility, 2);
        assert_eq!(cell.soil().under_tree_ticks, 0);
    }

    #[test]
    fn test_bush_enriches_soil() {
        let mut cell = Cell::new(1);
        cell.store.create(Position::new(0, 0), EntityState::Bush(BushState::default()));

        for tick in 1..=100 {
            cell.step(cell.soil, tick).unwrap();
        }
        assert_eq!(cell.soil().fertility, 1);
        cell.step(cell.soil, 101).unwrap();
        assert_eq!(cell.soil().fertility, 2);
    }

    #[test]
    fn test_grass_enrichment_capped_at_max() {
        let mut cell = Cell::new(4);
        cell.store.create(Position::new(0, 0), EntityState::Grass(GrassState::default()));

        for tick in 1..=400 {
            cell.step(cell.soil, tick).unwrap();
        }
        assert_eq!(cell.soil().fertility, 4);
    }

    #[test]
    fn test_grass_grows_then_ages() {
        let mut cell = Cell::new(1);
        let grass = cell.store.create(Position::new(0, 0), EntityState::Grass(GrassState::sprouting(2)));

        cell.step(grass, 1).unwrap();
        assert!(!cell.store.get(grass).unwrap().as_grass().unwrap().grown);
        cell.step(grass, 2).unwrap();
        let state = *cell.store.get(grass).unwrap().as_grass().unwrap();
        assert!(state.grown);
        assert_eq!(state.regrow_ticks, cell.config.vegetation.grass_regrowth_time as i64);
        assert_eq!(state.growth_age, 0);

        cell.step(grass, 3).unwrap();
        assert_eq!(cell.store.get(grass).unwrap().as_grass().unwrap().growth_age, 1);
    }

    #[test]
    fn test_grass_needs_fertility_above_one() {
        let mut cell = Cell::new(1);
        let grass = cell.store.create(
            Position::new(0, 0),
            EntityState::Grass(GrassState {
                grown: true,
                regrow_ticks: 0,
                growth_age: 1000,
            }),
        );

        for tick in 1..=100 {
            cell.step(grass, tick).unwrap();
        }
        assert!(cell.store.is_active(grass));
        assert_eq!(cell.store.count_of(Kind::Bush), 0);
    }

    #[test]
    fn test_grass_becomes_bush() {
        let mut cell = Cell::new(2);
        let grass = cell.store.create(
            Position::new(0, 0),
            EntityState::Grass(GrassState {
                grown: true,
                regrow_ticks: 0,
                growth_age: cell.config.vegetation.grass_evolution_time,
            }),
        );

        cell.step(grass, 1).unwrap();
        assert!(!cell.store.is_active(grass));
        assert_eq!(cell.store.count_of(Kind::Bush), 1);
        assert_eq!(cell.store.vegetation_at(Position::new(0, 0)).unwrap().1, Vegetation::Bush);
    }

    #[test]
    fn test_bush_needs_fertility_above_two() {
        let mut cell = Cell::new(2);
        let bush = cell.store.create(Position::new(0, 0), EntityState::Bush(BushState { age: 500 }));
        for tick in 1..=50 {
            cell.step(bush, tick).unwrap();
        }
        assert!(cell.store.is_active(bush));
        assert_eq!(cell.store.count_of(Kind::Tree), 0);
    }

    #[test]
    fn test_bush_becomes_tree() {
        let mut cell = Cell::new(3);
        let bush = cell.store.create(Position::new(0, 0), EntityState::Bush(BushState::default()));
        let wait = cell.config.vegetation.bush_evolution_time as u64;

        for tick in 1..=wait {
            cell.step(bush, tick).unwrap();
        }
        assert!(cell.store.is_active(bush));
        cell.step(bush, wait + 1).unwrap();
        assert!(!cell.store.is_active(bush));
        assert_eq!(cell.store.count_of(Kind::Tree), 1);
    }

    #[test]
    fn test_vegetation_without_soil_is_fatal() {
        let mut store = EntityStore::new(2, 1);
        let bush = store.create(Position::new(1, 0), EntityState::Bush(BushState::default()));
        let config = Config::default();
        let mut rng = SimRng::seed_from_u64(0);
        let mut ctx = TickContext {
            store: &mut store,
            rng: &mut rng,
            config: &config,
            tick: 12,
        };

        let err = step_bush(&mut ctx, bush).unwrap_err();
        assert!(matches!(err, EngineError::MissingSoil { tick: 12, .. }));
    }
}
