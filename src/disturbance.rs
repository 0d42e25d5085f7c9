//! Periodic fire sweep and the fire patches it leaves behind.

use crate::config::Config;
use crate::entity::{EntityId, EntityState, FireState, Kind};
use crate::error::EngineError;
use crate::grid::Position;
use crate::scheduler::TickContext;
use crate::store::EntityStore;
use crate::SimRng;
use rand::seq::index;

/// Result of one disturbance sweep
#[derive(Clone, Debug, Default)]
pub struct SweepReport {
    /// Tick the sweep ran on
    pub tick: u64,
    /// Cells burned, in sample order
    pub burned: Vec<Position>,
    /// Non-soil entities destroyed
    pub destroyed: usize,
}

/// Whether a sweep is due after `tick` has completed
pub fn is_due(config: &Config, tick: u64) -> bool {
    let period = config.disturbance.period;
    config.disturbance.enabled && period > 0 && tick > 0 && tick % period == 0
}

/// Burn a random sample of cells: everything but soil is destroyed and a fire
/// patch is left on each sampled cell.
///
/// Bypasses per-entity stepping and works directly on the store.
pub fn sweep(store: &mut EntityStore, rng: &mut SimRng, config: &Config, tick: u64) -> SweepReport {
    let width = store.grid().width();
    let total = store.grid().cell_count();
    let amount = config.disturbance_cells().min(total);

    let mut report = SweepReport {
        tick,
        burned: Vec::with_capacity(amount),
        destroyed: 0,
    };

    for cell in index::sample(rng, total, amount).iter() {
        let pos = Position::new(cell % width, cell / width);
        for victim in store.occupants_matching(pos, |kind| kind != Kind::Soil) {
            if store.destroy(victim).is_some() {
                report.destroyed += 1;
            }
        }
        store.create(pos, EntityState::FirePatch(FireState::default()));
        report.burned.push(pos);
    }

    report
}

/// Fire patch step: age, and burn out once past the configured lifetime
pub fn step_fire(ctx: &mut TickContext<'_>, id: EntityId) -> Result<(), EngineError> {
    let Some(entity) = ctx.store.get_mut(id) else {
        return Ok(());
    };
    let EntityState::FirePatch(fire) = &mut entity.state else {
        return Ok(());
    };
    fire.age += 1;

    if let Some(lifetime) = ctx.config.disturbance.fire_decay_ticks {
        if fire.age > lifetime {
            ctx.store.destroy(id);
        }
    }
    Ok(())
}
