//! Per-kind randomized activation.
//!
//! One tick visits every kind in the configured order. For each kind the
//! scheduler steps a shuffled snapshot of its active ids, skipping ids that
//! are no longer active when their turn comes. Every kind's snapshot is taken
//! before the first pass, so entities created anywhere in a tick are first
//! stepped on the next tick.

use crate::config::Config;
use crate::entity::{EntityId, Kind};
use crate::error::EngineError;
use crate::store::EntityStore;
use crate::{animal, disturbance, succession, SimRng};
use rand::seq::SliceRandom;

/// Mutable state available to a step behavior
pub struct TickContext<'a> {
    pub store: &'a mut EntityStore,
    pub rng: &'a mut SimRng,
    pub config: &'a Config,
    /// Number of the tick being executed (1 for the first tick)
    pub tick: u64,
}

/// Step behavior of one entity kind
pub type StepFn = fn(&mut TickContext<'_>, EntityId) -> Result<(), EngineError>;

/// Dispatch table from kind to step behavior
pub fn behavior(kind: Kind) -> StepFn {
    match kind {
        Kind::Soil => succession::step_soil,
        Kind::Grass => succession::step_grass,
        Kind::Bush => succession::step_bush,
        Kind::Tree => succession::step_tree,
        Kind::Mouse | Kind::Sheep | Kind::Cat | Kind::Wolf => animal::step_animal,
        Kind::FirePatch => disturbance::step_fire,
    }
}

/// Activations performed during one tick
#[derive(Clone, Debug, Default)]
pub struct TickReport {
    /// Entities stepped, indexed by `Kind::index`
    pub stepped: [usize; Kind::COUNT],
    /// Snapshot entries skipped because they were destroyed mid-pass
    pub skipped: usize,
}

impl TickReport {
    pub fn stepped_of(&self, kind: Kind) -> usize {
        self.stepped[kind.index()]
    }

    pub fn total_stepped(&self) -> usize {
        self.stepped.iter().sum()
    }
}

pub struct Scheduler {
    order: Vec<Kind>,
}

impl Scheduler {
    pub fn new(order: Vec<Kind>) -> Self {
        Self { order }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.scheduler.kind_order.clone())
    }

    /// Run one full pass over every kind
    pub fn step(&self, ctx: &mut TickContext<'_>) -> Result<TickReport, EngineError> {
        let mut report = TickReport::default();

        // Frozen before any pass runs, so nothing born this tick is stepped
        let snapshots: Vec<(Kind, Vec<EntityId>)> = self
            .order
            .iter()
            .map(|&kind| (kind, ctx.store.snapshot_of(kind)))
            .collect();

        for (kind, mut snapshot) in snapshots {
            snapshot.shuffle(ctx.rng);
            let step = behavior(kind);

            for id in snapshot {
                if !ctx.store.is_active(id) {
                    report.skipped += 1;
                    continue;
                }
                step(ctx, id)?;
                report.stepped[kind.index()] += 1;
            }
        }

        Ok(report)
    }
}
