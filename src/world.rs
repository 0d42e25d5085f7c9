//! World simulation engine - main simulation loop.

use crate::config::Config;
use crate::disturbance::{self, SweepReport};
use crate::entity::{AnimalState, EntityId, EntityState, GrassState, Kind, SoilState, Species};
use crate::error::{ConfigError, EngineError};
use crate::grid::Position;
use crate::scheduler::{Scheduler, TickContext, TickReport};
use crate::stats::{PopulationStats, StatsHistory};
use crate::store::EntityStore;
use crate::SimRng;
use rand::prelude::*;

/// The simulation world
pub struct World {
    // Entities and spatial index
    store: EntityStore,
    scheduler: Scheduler,

    // State
    pub time: u64,

    // Configuration, validated at construction and read-only afterwards
    config: Config,

    // Statistics
    pub stats: PopulationStats,
    pub stats_history: StatsHistory,
    last_tick: TickReport,
    last_sweep: Option<SweepReport>,

    // Random number generator (seeded for reproducibility)
    rng: SimRng,
    seed: u64,
}

impl World {
    /// Create and seed a world. Uses `config.seed` when set, a random seed otherwise.
    pub fn initialize(config: Config) -> Result<Self, ConfigError> {
        let seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
        Self::new_with_seed(config, seed)
    }

    /// Create and seed a world with a specific seed for reproducibility
    pub fn new_with_seed(config: Config, seed: u64) -> Result<Self, ConfigError> {
        let mut world = Self::empty(config, seed)?;
        world.populate();

        log::info!(
            "World initialized: {}x{}, seed={}, soil={}, grass={}, mice={}, sheep={}, cats={}, wolves={}",
            world.config.world.width,
            world.config.world.height,
            seed,
            world.count_of(Kind::Soil),
            world.count_of(Kind::Grass),
            world.count_of(Kind::Mouse),
            world.count_of(Kind::Sheep),
            world.count_of(Kind::Cat),
            world.count_of(Kind::Wolf),
        );

        Ok(world)
    }

    /// Create a world with soil on every cell and nothing else.
    ///
    /// Fertility is still drawn from `vegetation.initial_fertility`. Use
    /// [`World::spawn`] to place entities by hand.
    pub fn empty(config: Config, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut rng = SimRng::seed_from_u64(seed);
        let mut store = EntityStore::new(config.world.width, config.world.height);

        for y in 0..config.world.height {
            for x in 0..config.world.width {
                let fertility = config
                    .vegetation
                    .initial_fertility
                    .choose(&mut rng)
                    .copied()
                    .unwrap_or(0);
                store.create(Position::new(x, y), EntityState::Soil(SoilState::with_fertility(fertility)));
            }
        }

        let mut world = Self {
            store,
            scheduler: Scheduler::from_config(&config),
            time: 0,
            stats: PopulationStats::new(),
            stats_history: StatsHistory::new(config.logging.stats_interval),
            last_tick: TickReport::default(),
            last_sweep: None,
            config,
            rng,
            seed,
        };
        world.stats = PopulationStats::sample(&world.store, 0);
        world.stats_history.record(world.stats.clone());

        Ok(world)
    }

    /// Seed grass on fertile soil and the initial animal populations
    fn populate(&mut self) {
        if self.config.vegetation.seed_grass {
            let regrowth = self.config.vegetation.grass_regrowth_time.max(1) as i64;
            let fertile: Vec<Position> = self
                .store
                .iter_kind(Kind::Soil)
                .filter(|soil| soil.as_soil().map_or(false, |s| s.fertility > 0))
                .map(|soil| soil.pos)
                .collect();
            for pos in fertile {
                let countdown = self.rng.gen_range(0..regrowth);
                self.store
                    .create(pos, EntityState::Grass(GrassState::sprouting(countdown)));
            }
        }

        let (width, height) = (self.config.world.width, self.config.world.height);
        for species in Species::ALL {
            let params = self.config.species.get(species).clone();
            for _ in 0..params.initial_count {
                let x = self.rng.gen_range(0..width);
                let y = self.rng.gen_range(0..height);
                let energy = self.rng.gen_range(0..params.initial_energy_max.max(1)) as f64;
                self.store.create(
                    Position::new(x, y),
                    EntityState::Animal(AnimalState::new(species, energy)),
                );
            }
        }

        self.stats = PopulationStats::sample(&self.store, self.time);
        if let Some(first) = self.stats_history.snapshots.first_mut() {
            *first = self.stats.clone();
        }
    }

    /// Place an entity by hand
    pub fn spawn(&mut self, pos: Position, state: EntityState) -> EntityId {
        self.store.create(pos, state)
    }

    /// Main simulation step
    pub fn step(&mut self) -> Result<(), EngineError> {
        let tick = self.time + 1;

        // Phase 1: activate every entity, kind by kind
        let mut ctx = TickContext {
            store: &mut self.store,
            rng: &mut self.rng,
            config: &self.config,
            tick,
        };
        self.last_tick = match self.scheduler.step(&mut ctx) {
            Ok(report) => report,
            Err(e) => {
                log::error!("Simulation halted: {}", e);
                return Err(e);
            }
        };

        // Phase 2: advance the clock
        self.time = tick;

        // Phase 3: sample metrics
        self.update_stats();

        // Phase 4: disturbance
        if disturbance::is_due(&self.config, self.time) {
            let report = disturbance::sweep(&mut self.store, &mut self.rng, &self.config, self.time);
            log::info!(
                "Fire at tick {}: {} cells burned, {} entities destroyed",
                self.time,
                report.burned.len(),
                report.destroyed
            );
            self.last_sweep = Some(report);
        }

        Ok(())
    }

    fn update_stats(&mut self) {
        self.stats = PopulationStats::sample(&self.store, self.time);

        if self.stats_history.is_due(self.time) {
            self.stats_history.record(self.stats.clone());
            log::debug!("{}", self.stats.summary());
        }
    }

    /// Run simulation for specified number of steps
    pub fn run(&mut self, steps: u64) -> Result<(), EngineError> {
        for _ in 0..steps {
            self.step()?;
        }
        Ok(())
    }

    /// Run simulation with callback for progress updates
    pub fn run_with_callback<F>(&mut self, steps: u64, mut callback: F) -> Result<(), EngineError>
    where
        F: FnMut(&World, u64),
    {
        for i in 0..steps {
            self.step()?;
            callback(self, i);
        }
        Ok(())
    }

    /// Number of active entities of `kind`
    #[inline]
    pub fn count_of(&self, kind: Kind) -> usize {
        self.store.count_of(kind)
    }

    /// Number of completed ticks
    #[inline]
    pub fn tick_number(&self) -> u64 {
        self.time
    }

    /// Total animals of every species
    pub fn animal_population(&self) -> usize {
        Species::ALL
            .iter()
            .map(|species| self.count_of(species.kind()))
            .sum()
    }

    /// Check if every animal species is gone
    pub fn is_extinct(&self) -> bool {
        self.animal_population() == 0
    }

    /// Read access to entities and the grid
    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// Activations of the most recent tick
    pub fn last_tick(&self) -> &TickReport {
        &self.last_tick
    }

    /// Most recent disturbance sweep, if any has run
    pub fn last_sweep(&self) -> Option<&SweepReport> {
        self.last_sweep.as_ref()
    }

    /// Verify grid and store agree on every entity
    pub fn audit(&self) -> Result<(), EngineError> {
        self.store.audit()
    }

    /// Configuration the world was built with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get seed for reproducibility
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        let mut config = Config::default();
        config.world.width = 15;
        config.world.height = 15;
        config
    }

    #[test]
    fn test_world_creation() {
        let config = test_config();
        let world = World::new_with_seed(config.clone(), 1).unwrap();

        assert_eq!(world.count_of(Kind::Soil), 225);
        assert_eq!(world.count_of(Kind::Mouse), config.species.mouse.initial_count);
        assert_eq!(world.count_of(Kind::Cat), config.species.cat.initial_count);
        assert_eq!(world.tick_number(), 0);
        assert!(world.audit().is_ok());
    }

    #[test]
    fn test_grass_only_on_fertile_soil() {
        let world = World::new_with_seed(test_config(), 2).unwrap();
        for grass in world.store().iter_kind(Kind::Grass) {
            let fertility = world.store().fertility_at(grass.pos, 0).unwrap();
            assert!(fertility > 0);
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = test_config();
        config.disturbance.fraction = 2.0;
        assert!(World::initialize(config).is_err());
    }

    #[test]
    fn test_world_step() {
        let mut world = World::new_with_seed(test_config(), 3).unwrap();
        world.step().unwrap();

        assert_eq!(world.tick_number(), 1);
        assert_eq!(world.stats.time, 1);
        assert!(world.last_tick().stepped_of(Kind::Soil) == 225);
    }

    #[test]
    fn test_world_run() {
        let mut world = World::new_with_seed(test_config(), 4).unwrap();
        world.run(150).unwrap();

        assert_eq!(world.time, 150);
        assert_eq!(world.count_of(Kind::Soil), 225);
        assert!(world.audit().is_ok());
        assert_eq!(world.last_sweep().unwrap().tick, 100);
    }

    #[test]
    fn test_run_with_callback() {
        let mut world = World::new_with_seed(test_config(), 9).unwrap();
        let mut seen = Vec::new();
        world
            .run_with_callback(5, |w, i| seen.push((i, w.tick_number())))
            .unwrap();

        assert_eq!(seen, vec![(0, 1), (1, 2), (2, 3), (3, 4), (4, 5)]);
    }

    #[test]
    fn test_reproducibility() {
        let config = test_config();

        let mut world1 = World::new_with_seed(config.clone(), 42).unwrap();
        let mut world2 = World::new_with_seed(config, 42).unwrap();

        world1.run(120).unwrap();
        world2.run(120).unwrap();

        assert_eq!(world1.stats, world2.stats);
        assert_eq!(world1.stats_history.snapshots, world2.stats_history.snapshots);
    }

    #[test]
    fn test_config_is_the_validated_one() {
        let mut config = test_config();
        config.disturbance.period = 7;
        let world = World::new_with_seed(config, 8).unwrap();

        assert_eq!(world.config().disturbance.period, 7);
        assert!(world.config().validate().is_ok());
    }

    #[test]
    fn test_config_seed_used() {
        let mut config = test_config();
        config.seed = Some(777);
        let world = World::initialize(config).unwrap();
        assert_eq!(world.seed(), 777);
    }

    #[test]
    fn test_stats_history_interval() {
        let mut config = test_config();
        config.logging.stats_interval = 10;
        let mut world = World::new_with_seed(config, 5).unwrap();
        world.run(50).unwrap();

        let times: Vec<u64> = world.stats_history.snapshots.iter().map(|s| s.time).collect();
        assert_eq!(times, vec![0, 10, 20, 30, 40, 50]);
    }
}
