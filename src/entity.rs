//! Entity records: kind tags and kind-specific state.

use crate::grid::Position;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique entity identifier. Assigned monotonically, never reused.
pub type EntityId = u64;

/// Category tag of an entity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Kind {
    Soil,
    Grass,
    Bush,
    Tree,
    Mouse,
    Sheep,
    Cat,
    Wolf,
    FirePatch,
}

impl Kind {
    pub const COUNT: usize = 9;

    /// Every kind, in declaration order
    pub const ALL: [Kind; Kind::COUNT] = [
        Kind::Soil,
        Kind::Grass,
        Kind::Bush,
        Kind::Tree,
        Kind::Mouse,
        Kind::Sheep,
        Kind::Cat,
        Kind::Wolf,
        Kind::FirePatch,
    ];

    /// Dense index used for per-kind tables
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Grass, Bush or Tree
    pub const fn is_vegetation(self) -> bool {
        self.vegetation().is_some()
    }

    /// The succession stage for this kind, if it is vegetation
    pub const fn vegetation(self) -> Option<Vegetation> {
        match self {
            Kind::Grass => Some(Vegetation::Grass),
            Kind::Bush => Some(Vegetation::Bush),
            Kind::Tree => Some(Vegetation::Tree),
            _ => None,
        }
    }

    pub const fn is_animal(self) -> bool {
        self.species().is_some()
    }

    /// The animal species for this kind, if any
    pub const fn species(self) -> Option<Species> {
        match self {
            Kind::Mouse => Some(Species::Mouse),
            Kind::Sheep => Some(Species::Sheep),
            Kind::Cat => Some(Species::Cat),
            Kind::Wolf => Some(Species::Wolf),
            _ => None,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Soil => "Soil",
            Kind::Grass => "Grass",
            Kind::Bush => "Bush",
            Kind::Tree => "Tree",
            Kind::Mouse => "Mouse",
            Kind::Sheep => "Sheep",
            Kind::Cat => "Cat",
            Kind::Wolf => "Wolf",
            Kind::FirePatch => "FirePatch",
        };
        f.write_str(name)
    }
}

/// Succession stage. Ordered from pioneer to climax.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Vegetation {
    Grass,
    Bush,
    Tree,
}

/// Animal species. The subset of [`Kind`] that moves, feeds and reproduces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Species {
    Mouse,
    Sheep,
    Cat,
    Wolf,
}

impl Species {
    pub const ALL: [Species; 4] = [Species::Mouse, Species::Sheep, Species::Cat, Species::Wolf];

    pub const fn kind(self) -> Kind {
        match self {
            Species::Mouse => Kind::Mouse,
            Species::Sheep => Kind::Sheep,
            Species::Cat => Kind::Cat,
            Species::Wolf => Kind::Wolf,
        }
    }
}

/// Soil patch state. Exactly one per cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SoilState {
    /// 0 = barren, 1 = grass, 2 = bush, 3+ = tree
    pub fertility: u8,
    pub vacant_ticks: u32,
    pub under_tree_ticks: u32,
    pub under_bush_ticks: u32,
    pub under_grass_ticks: u32,
}

impl SoilState {
    pub fn with_fertility(fertility: u8) -> Self {
        Self {
            fertility,
            ..Self::default()
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GrassState {
    pub grown: bool,
    /// Ticks left until fully grown
    pub regrow_ticks: i64,
    /// Ticks spent fully grown
    pub growth_age: u32,
}

impl GrassState {
    pub fn sprouting(regrow_ticks: i64) -> Self {
        Self {
            grown: false,
            regrow_ticks,
            growth_age: 0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BushState {
    pub age: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimalState {
    pub species: Species,
    /// May dip below zero transiently, before the death check
    pub energy: f64,
    pub age: u32,
}

impl AnimalState {
    pub fn new(species: Species, energy: f64) -> Self {
        Self {
            species,
            energy,
            age: 0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FireState {
    pub age: u32,
}

/// Kind-specific mutable state. The variant determines the entity's [`Kind`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum EntityState {
    Soil(SoilState),
    Grass(GrassState),
    Bush(BushState),
    Tree,
    Animal(AnimalState),
    FirePatch(FireState),
}

impl EntityState {
    pub fn kind(&self) -> Kind {
        match self {
            EntityState::Soil(_) => Kind::Soil,
            EntityState::Grass(_) => Kind::Grass,
            EntityState::Bush(_) => Kind::Bush,
            EntityState::Tree => Kind::Tree,
            EntityState::Animal(animal) => animal.species.kind(),
            EntityState::FirePatch(_) => Kind::FirePatch,
        }
    }
}

/// Canonical entity record, owned by the entity store
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub pos: Position,
    pub state: EntityState,
}

impl Entity {
    #[inline]
    pub fn kind(&self) -> Kind {
        self.state.kind()
    }

    pub fn as_soil(&self) -> Option<&SoilState> {
        match &self.state {
            EntityState::Soil(soil) => Some(soil),
            _ => None,
        }
    }

    pub fn as_animal(&self) -> Option<&AnimalState> {
        match &self.state {
            EntityState::Animal(animal) => Some(animal),
            _ => None,
        }
    }

    pub fn as_grass(&self) -> Option<&GrassState> {
        match &self.state {
            EntityState::Grass(grass) => Some(grass),
            _ => None,
        }
    }
}
