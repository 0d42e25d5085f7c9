//! Fixed species table: diets and evolutionary lineages.
//!
//! Numeric parameters (costs, thresholds, chances, yields) are configurable;
//! who eats whom and who evolves into whom is not.
//!
//! | Species | Diet              | Evolves to |
//! |---------|-------------------|------------|
//! | Mouse   | Grass             | Sheep      |
//! | Sheep   | Grass, Bush       | -          |
//! | Cat     | Mouse             | Wolf       |
//! | Wolf    | Mouse, Sheep, Cat | -          |

use crate::entity::{Kind, Species};

impl Species {
    /// Kinds this species feeds on
    pub const fn diet(self) -> &'static [Kind] {
        match self {
            Species::Mouse => &[Kind::Grass],
            Species::Sheep => &[Kind::Grass, Kind::Bush],
            Species::Cat => &[Kind::Mouse],
            Species::Wolf => &[Kind::Mouse, Kind::Sheep, Kind::Cat],
        }
    }

    /// Next species in the lineage, if any
    pub const fn evolves_to(self) -> Option<Species> {
        match self {
            Species::Mouse => Some(Species::Sheep),
            Species::Cat => Some(Species::Wolf),
            Species::Sheep | Species::Wolf => None,
        }
    }

    #[inline]
    pub fn eats(self, kind: Kind) -> bool {
        self.diet().contains(&kind)
    }
}
