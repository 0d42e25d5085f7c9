//! # SUCCESSION
//!
//! Grid-based multi-species ecosystem simulator with soil and vegetation succession.
//!
//! ## Features
//!
//! - **Succession**: soil fertility drives grass, bush and tree growth, and vegetation feeds back into the soil
//! - **Food web**: mice, sheep, cats and wolves that eat, breed and evolve into the next species
//! - **Disturbance**: periodic fires clear most of the map
//! - **Configurable**: YAML configuration files
//! - **Reproducible**: Seeded random number generation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use succession::{Config, Kind, World};
//!
//! // Create world with default config
//! let mut world = World::new_with_seed(Config::default(), 42).unwrap();
//!
//! // Run simulation
//! world.run(1000).unwrap();
//!
//! // Check results
//! println!("Mice: {}", world.count_of(Kind::Mouse));
//! println!("Trees: {}", world.count_of(Kind::Tree));
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use succession::Config;
//!
//! let mut config = Config::default();
//! config.species.wolf.initial_count = 5;
//! config.disturbance.period = 250;
//! assert!(config.validate().is_ok());
//! ```

pub mod animal;
pub mod config;
pub mod disturbance;
pub mod entity;
pub mod error;
pub mod grid;
pub mod scheduler;
pub mod species;
pub mod stats;
pub mod store;
pub mod succession;
pub mod world;

// Re-export main types
pub use config::Config;
pub use entity::{Kind, Species};
pub use error::{ConfigError, EngineError, Error};
pub use grid::Position;
pub use world::World;

/// Random source shared by every world
pub type SimRng = rand_chacha::ChaCha8Rng;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run a quick benchmark on a `size` x `size` world
pub fn benchmark(steps: u64, size: usize, seed: u64) -> Result<BenchmarkResult, Error> {
    use std::time::Instant;

    let mut config = Config::default();
    config.world.width = size;
    config.world.height = size;

    let mut world = World::new_with_seed(config, seed)?;
    let initial_animals = world.animal_population();

    let start = Instant::now();
    world.run(steps)?;
    let elapsed = start.elapsed();

    Ok(BenchmarkResult {
        steps,
        size,
        initial_animals,
        final_animals: world.animal_population(),
        final_entities: world.store().len(),
        elapsed_secs: elapsed.as_secs_f64(),
        steps_per_second: steps as f64 / elapsed.as_secs_f64(),
    })
}

/// Benchmark result
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    pub steps: u64,
    pub size: usize,
    pub initial_animals: usize,
    pub final_animals: usize,
    pub final_entities: usize,
    pub elapsed_secs: f64,
    pub steps_per_second: f64,
}

impl std::fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Benchmark Results ===")?;
        writeln!(f, "Steps: {}", self.steps)?;
        writeln!(f, "Grid: {}x{}", self.size, self.size)?;
        writeln!(f, "Animals: {} -> {}", self.initial_animals, self.final_animals)?;
        writeln!(f, "Entities: {}", self.final_entities)?;
        writeln!(f, "Time: {:.3}s", self.elapsed_secs)?;
        writeln!(f, "Speed: {:.1} steps/s", self.steps_per_second)?;
        Ok(())
    }
}
