//! Configuration system for the succession simulation.
//!
//! Supports YAML configuration files with defaults taken from the classic
//! mouse/sheep/cat/wolf succession model.

use crate::entity::{Kind, Species};
use crate::error::ConfigError;
use crate::grid::Neighborhood;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub world: WorldConfig,
    #[serde(default)]
    pub vegetation: VegetationConfig,
    #[serde(default)]
    pub soil: SoilConfig,
    #[serde(default)]
    pub species: SpeciesConfig,
    #[serde(default)]
    pub food_energy: FoodEnergyConfig,
    #[serde(default)]
    pub disturbance: DisturbanceConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Random seed; a fresh one is drawn when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Grid dimensions and topology
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    pub width: usize,
    pub height: usize,
    /// Neighborhood animals move within
    #[serde(default)]
    pub neighborhood: Neighborhood,
}

/// Vegetation growth and succession timings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VegetationConfig {
    /// Ticks for fresh grass to become fully grown
    pub grass_regrowth_time: u32,
    /// Ticks grown grass must exceed before turning into a bush
    pub grass_evolution_time: u32,
    /// Ticks a bush must exceed before turning into a tree
    pub bush_evolution_time: u32,
    /// Ticks bare soil must exceed before sprouting grass
    pub soil_evolution_time: u32,
    /// Fertility levels drawn uniformly when seeding soil
    pub initial_fertility: Vec<u8>,
    /// Seed a sprouting grass on every fertile cell at start
    pub seed_grass: bool,
}

/// Soil fertility feedback thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoilConfig {
    /// Ticks under a tree before the soil is exhausted and the tree dies
    pub tree_exhaustion_ticks: u32,
    /// Ticks under a bush before fertility rises
    pub bush_enrichment_ticks: u32,
    /// Ticks under grass before fertility rises
    pub grass_enrichment_ticks: u32,
    /// Highest fertility level
    pub max_fertility: u8,
}

/// How an animal picks its next cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Movement {
    /// Uniform choice among neighboring cells
    #[default]
    Random,
    /// Step towards the nearest prey within `radius`, else move randomly
    Hunt { radius: usize },
}

/// Per-species parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimalConfig {
    /// Number of animals seeded at start
    pub initial_count: usize,
    /// Seed energy is drawn from [0, initial_energy_max)
    pub initial_energy_max: u32,
    /// Probability of reproducing on a tick with enough energy
    pub reproduce_chance: f64,
    /// Energy that must be exceeded to reproduce or evolve
    pub reproduce_energy: f64,
    /// Age that must be exceeded to evolve
    pub evolution_time: u32,
    /// Energy spent per tick
    pub move_cost: f64,
    #[serde(default)]
    pub movement: Movement,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesConfig {
    pub mouse: AnimalConfig,
    pub sheep: AnimalConfig,
    pub cat: AnimalConfig,
    pub wolf: AnimalConfig,
}

impl SpeciesConfig {
    pub fn get(&self, species: Species) -> &AnimalConfig {
        match species {
            Species::Mouse => &self.mouse,
            Species::Sheep => &self.sheep,
            Species::Cat => &self.cat,
            Species::Wolf => &self.wolf,
        }
    }

    pub fn get_mut(&mut self, species: Species) -> &mut AnimalConfig {
        match species {
            Species::Mouse => &mut self.mouse,
            Species::Sheep => &mut self.sheep,
            Species::Cat => &mut self.cat,
            Species::Wolf => &mut self.wolf,
        }
    }
}

/// Energy gained by eating one entity of each prey kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodEnergyConfig {
    pub grass: f64,
    pub bush: f64,
    pub tree: f64,
    pub mouse: f64,
    pub sheep: f64,
    pub cat: f64,
}

impl FoodEnergyConfig {
    /// Yield for consuming `kind`; zero for anything that is not food
    pub fn yield_of(&self, kind: Kind) -> f64 {
        match kind {
            Kind::Grass => self.grass,
            Kind::Bush => self.bush,
            Kind::Tree => self.tree,
            Kind::Mouse => self.mouse,
            Kind::Sheep => self.sheep,
            Kind::Cat => self.cat,
            Kind::Soil | Kind::Wolf | Kind::FirePatch => 0.0,
        }
    }
}

/// Periodic fire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisturbanceConfig {
    pub enabled: bool,
    /// Ticks between sweeps
    pub period: u64,
    /// Fraction of cells burned per sweep (0.0 - 1.0)
    pub fraction: f64,
    /// Ticks a fire patch lingers; `None` keeps it forever
    pub fire_decay_ticks: Option<u32>,
}

/// Order in which kinds are activated within a tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    pub kind_order: Vec<Kind>,
}

/// Logging and metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Ticks between stats history snapshots
    pub stats_interval: u64,
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 20,
            height: 20,
            neighborhood: Neighborhood::Moore,
        }
    }
}

impl Default for VegetationConfig {
    fn default() -> Self {
        Self {
            grass_regrowth_time: 30,
            grass_evolution_time: 5,
            bush_evolution_time: 5,
            soil_evolution_time: 5,
            initial_fertility: vec![0, 1, 2, 3],
            seed_grass: true,
        }
    }
}

impl Default for SoilConfig {
    fn default() -> Self {
        Self {
            tree_exhaustion_ticks: 200,
            bush_enrichment_ticks: 100,
            grass_enrichment_ticks: 150,
            max_fertility: 4,
        }
    }
}

impl Default for SpeciesConfig {
    fn default() -> Self {
        Self {
            mouse: AnimalConfig {
                initial_count: 10,
                initial_energy_max: 10,
                reproduce_chance: 0.04,
                reproduce_energy: 4.0,
                evolution_time: 5,
                move_cost: 1.0,
                movement: Movement::Random,
            },
            sheep: AnimalConfig {
                initial_count: 0,
                initial_energy_max: 20,
                reproduce_chance: 0.04,
                reproduce_energy: 15.0,
                evolution_time: 5,
                move_cost: 2.0,
                movement: Movement::Random,
            },
            cat: AnimalConfig {
                initial_count: 4,
                initial_energy_max: 20,
                reproduce_chance: 0.05,
                reproduce_energy: 10.0,
                evolution_time: 5,
                move_cost: 1.0,
                movement: Movement::Random,
            },
            wolf: AnimalConfig {
                initial_count: 0,
                initial_energy_max: 30,
                reproduce_chance: 0.05,
                reproduce_energy: 20.0,
                evolution_time: 5,
                move_cost: 2.0,
                movement: Movement::Random,
            },
        }
    }
}

impl Default for FoodEnergyConfig {
    fn default() -> Self {
        Self {
            grass: 4.0,
            bush: 8.0,
            tree: 12.0,
            mouse: 8.0,
            sheep: 20.0,
            cat: 12.0,
        }
    }
}

impl Default for DisturbanceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            period: 100,
            fraction: 0.8,
            fire_decay_ticks: Some(10),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            kind_order: vec![
                Kind::Soil,
                Kind::Grass,
                Kind::Bush,
                Kind::Tree,
                Kind::FirePatch,
                Kind::Mouse,
                Kind::Sheep,
                Kind::Cat,
                Kind::Wolf,
            ],
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            stats_interval: 10,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Number of cells burned by one disturbance sweep
    pub fn disturbance_cells(&self) -> usize {
        let total = self.world.width * self.world.height;
        (self.disturbance.fraction * total as f64).floor() as usize
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.world.width == 0 || self.world.height == 0 {
            return Err(ConfigError::invalid("world", "width and height must be > 0"));
        }

        if self.vegetation.initial_fertility.is_empty() {
            return Err(ConfigError::invalid(
                "vegetation.initial_fertility",
                "at least one level is required",
            ));
        }
        if let Some(level) = self
            .vegetation
            .initial_fertility
            .iter()
            .find(|&&level| level > self.soil.max_fertility)
        {
            return Err(ConfigError::invalid(
                "vegetation.initial_fertility",
                format!("level {} exceeds max_fertility {}", level, self.soil.max_fertility),
            ));
        }

        for species in Species::ALL {
            let animal = self.species.get(species);
            if !(0.0..=1.0).contains(&animal.reproduce_chance) {
                return Err(ConfigError::invalid(
                    "species.reproduce_chance",
                    format!("{:?}: {} is outside [0, 1]", species, animal.reproduce_chance),
                ));
            }
            if animal.move_cost < 0.0 || !animal.move_cost.is_finite() {
                return Err(ConfigError::invalid(
                    "species.move_cost",
                    format!("{:?}: must be a finite value >= 0", species),
                ));
            }
            if let Movement::Hunt { radius: 0 } = animal.movement {
                return Err(ConfigError::invalid(
                    "species.movement",
                    format!("{:?}: hunt radius must be > 0", species),
                ));
            }
        }

        let food = &self.food_energy;
        if [food.grass, food.bush, food.tree, food.mouse, food.sheep, food.cat]
            .iter()
            .any(|&e| e < 0.0 || !e.is_finite())
        {
            return Err(ConfigError::invalid("food_energy", "yields must be finite and >= 0"));
        }

        if self.disturbance.period == 0 {
            return Err(ConfigError::invalid("disturbance.period", "must be > 0"));
        }
        if !(0.0..=1.0).contains(&self.disturbance.fraction) {
            return Err(ConfigError::invalid(
                "disturbance.fraction",
                format!(
                    "{} would sample more cells than the {} available",
                    self.disturbance.fraction,
                    self.world.width * self.world.height
                ),
            ));
        }

        let order = &self.scheduler.kind_order;
        if order.len() != Kind::COUNT || Kind::ALL.iter().any(|kind| !order.contains(kind)) {
            return Err(ConfigError::invalid(
                "scheduler.kind_order",
                "must list every kind exactly once",
            ));
        }

        if self.logging.stats_interval == 0 {
            return Err(ConfigError::invalid("logging.stats_interval", "must be > 0"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.species.cat.movement = Movement::Hunt { radius: 2 };
        config.disturbance.fire_decay_ticks = None;

        let yaml = serde_yaml::to_string(&config).unwrap();
        let loaded: Config = serde_yaml::from_str(&yaml).unwrap();

        assert_eq!(config.world.width, loaded.world.width);
        assert_eq!(loaded.species.cat.movement, Movement::Hunt { radius: 2 });
        assert_eq!(loaded.disturbance.fire_decay_ticks, None);
        assert_eq!(loaded.scheduler.kind_order, config.scheduler.kind_order);
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        let mut config = Config::default();
        config.world.width = 33;
        config.save(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.world.width, 33);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "world:\n  width: 12\n  height: 8\nseed: 7\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.world.width, 12);
        assert_eq!(config.world.neighborhood, Neighborhood::Moore);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.disturbance.period, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_disturbance_fraction_out_of_range() {
        let mut config = Config::default();
        config.disturbance.fraction = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "disturbance.fraction", .. })
        ));
    }

    #[test]
    fn test_kind_order_must_be_complete() {
        let mut config = Config::default();
        config.scheduler.kind_order.pop();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.scheduler.kind_order[0] = Kind::Wolf;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_fertility_above_max_rejected() {
        let mut config = Config::default();
        config.vegetation.initial_fertility = vec![1, 5];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_disturbance_cells() {
        let mut config = Config::default();
        config.world.width = 10;
        config.world.height = 10;
        assert_eq!(config.disturbance_cells(), 80);
    }
}
