//! Population statistics sampled from the entity store.
//!
//! Sampling is read-only: it only calls `count_of` and reads entity state.

use crate::entity::{Entity, Kind};
use crate::store::EntityStore;
use serde::{Deserialize, Serialize};

/// Population snapshot for a simulation tick
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PopulationStats {
    /// Tick the snapshot was taken after
    pub time: u64,
    pub soil: usize,
    pub grass: usize,
    pub bush: usize,
    pub tree: usize,
    pub mice: usize,
    pub sheep: usize,
    pub cats: usize,
    pub wolves: usize,
    pub fires: usize,
    /// Mean energy across all animals
    pub energy_mean: f64,
    /// Mean fertility across all soil
    pub fertility_mean: f64,
}

impl PopulationStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sample the store
    pub fn sample(store: &EntityStore, time: u64) -> Self {
        let animals: Vec<f64> = [Kind::Mouse, Kind::Sheep, Kind::Cat, Kind::Wolf]
            .into_iter()
            .flat_map(|kind| store.iter_kind(kind))
            .filter_map(Entity::as_animal)
            .map(|animal| animal.energy)
            .collect();
        let energy_mean = if animals.is_empty() {
            0.0
        } else {
            animals.iter().sum::<f64>() / animals.len() as f64
        };

        let soil = store.count_of(Kind::Soil);
        let fertility_mean = if soil == 0 {
            0.0
        } else {
            store
                .iter_kind(Kind::Soil)
                .filter_map(Entity::as_soil)
                .map(|soil| soil.fertility as f64)
                .sum::<f64>()
                / soil as f64
        };

        Self {
            time,
            soil,
            grass: store.count_of(Kind::Grass),
            bush: store.count_of(Kind::Bush),
            tree: store.count_of(Kind::Tree),
            mice: store.count_of(Kind::Mouse),
            sheep: store.count_of(Kind::Sheep),
            cats: store.count_of(Kind::Cat),
            wolves: store.count_of(Kind::Wolf),
            fires: store.count_of(Kind::FirePatch),
            energy_mean,
            fertility_mean,
        }
    }

    /// Count recorded for `kind`
    pub fn count(&self, kind: Kind) -> usize {
        match kind {
            Kind::Soil => self.soil,
            Kind::Grass => self.grass,
            Kind::Bush => self.bush,
            Kind::Tree => self.tree,
            Kind::Mouse => self.mice,
            Kind::Sheep => self.sheep,
            Kind::Cat => self.cats,
            Kind::Wolf => self.wolves,
            Kind::FirePatch => self.fires,
        }
    }

    /// Total animals of every species
    pub fn animals(&self) -> usize {
        self.mice + self.sheep + self.cats + self.wolves
    }

    /// Format stats as a one-line summary
    pub fn summary(&self) -> String {
        format!(
            "T:{:6} | Mice:{:4} Sheep:{:4} Cats:{:4} Wolves:{:4} | Grass:{:4} Bush:{:4} Tree:{:4} Fire:{:4} | Energy:{:.1} Fert:{:.2}",
            self.time,
            self.mice,
            self.sheep,
            self.cats,
            self.wolves,
            self.grass,
            self.bush,
            self.tree,
            self.fires,
            self.energy_mean,
            self.fertility_mean,
        )
    }
}

/// Historical statistics tracker
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StatsHistory {
    /// All recorded snapshots
    pub snapshots: Vec<PopulationStats>,
    /// Recording interval
    pub interval: u64,
}

impl StatsHistory {
    /// Create new history with recording interval
    pub fn new(interval: u64) -> Self {
        Self {
            snapshots: Vec::new(),
            interval,
        }
    }

    /// Whether a snapshot should be taken after `time`
    pub fn is_due(&self, time: u64) -> bool {
        self.interval > 0 && time % self.interval == 0
    }

    pub fn record(&mut self, stats: PopulationStats) {
        self.snapshots.push(stats);
    }

    /// Latest snapshot at or before `time`
    pub fn get_at(&self, time: u64) -> Option<&PopulationStats> {
        self.snapshots.iter().rev().find(|s| s.time <= time)
    }

    /// Count of `kind` over time
    pub fn series(&self, kind: Kind) -> Vec<(u64, usize)> {
        self.snapshots
            .iter()
            .map(|s| (s.time, s.count(kind)))
            .collect()
    }

    /// Save history to a JSON file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string(self)?;
        std::fs::write(path, json)
    }

    /// Load history from a JSON file
    pub fn load(path: &str) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}
