//! Error types for configuration and the simulation engine.

use crate::entity::EntityId;
use crate::grid::Position;

/// Configuration rejected at load or initialization time
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A field holds a value outside its allowed range
    #[error("invalid configuration: {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Fatal engine failure. Aborts the tick in which it occurs.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A cell expected to hold exactly one Soil entity holds none
    #[error("tick {tick}: no soil entity at {pos}")]
    MissingSoil { pos: Position, tick: u64 },

    /// Grid and entity store disagree about an entity
    #[error("entity {id}: {detail}")]
    Inconsistent { id: EntityId, detail: String },
}

impl EngineError {
    /// Position involved in the failure, if it has one
    pub fn position(&self) -> Option<Position> {
        match self {
            Self::MissingSoil { pos, .. } => Some(*pos),
            Self::Inconsistent { .. } => None,
        }
    }
}

/// Any failure while building or running a world
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}
