//! Entity store: canonical owner of every entity record.
//!
//! The store also owns the [`Grid`] and is the only place either structure is
//! mutated, so an entity is active iff it is in its kind's member set, in the
//! record map, and in exactly one grid cell. `create`, `destroy` and `move_to`
//! update all three together.

use crate::entity::{Entity, EntityId, EntityState, Kind, Vegetation};
use crate::error::EngineError;
use crate::grid::{Grid, Position};
use std::collections::{BTreeSet, HashMap};

#[derive(Clone)]
pub struct EntityStore {
    grid: Grid,
    entities: HashMap<EntityId, Entity>,
    /// Active ids per kind, indexed by `Kind::index`. Ordered by id, which is
    /// creation order.
    members: [BTreeSet<EntityId>; Kind::COUNT],
    next_id: EntityId,
}

impl EntityStore {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid: Grid::new(width, height),
            entities: HashMap::new(),
            members: Default::default(),
            next_id: 0,
        }
    }

    /// Read-only view of the spatial index
    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Register a new entity at `pos` (wrapped onto the grid) and return its id
    pub fn create(&mut self, pos: Position, state: EntityState) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;

        let pos = self.grid.normalize(pos);
        let kind = state.kind();
        self.grid.place(id, pos);
        self.members[kind.index()].insert(id);
        self.entities.insert(id, Entity { id, pos, state });

        id
    }

    /// Remove an entity. Destroying an unknown or already destroyed id is a
    /// no-op returning `None`.
    pub fn destroy(&mut self, id: EntityId) -> Option<Entity> {
        let entity = self.entities.remove(&id)?;
        self.members[entity.kind().index()].remove(&id);
        self.grid.remove(id, entity.pos);
        Some(entity)
    }

    /// Relocate an entity. Returns false if it is not active.
    pub fn move_to(&mut self, id: EntityId, pos: Position) -> bool {
        let pos = self.grid.normalize(pos);
        let Some(entity) = self.entities.get_mut(&id) else {
            return false;
        };
        let from = entity.pos;
        if from == pos {
            return true;
        }
        entity.pos = pos;
        self.grid.move_to(id, from, pos)
    }

    /// Replace an entity with a fresh one of another kind at the same position.
    /// The old id is retired and the new id returned.
    pub fn replace(&mut self, id: EntityId, state: EntityState) -> Option<EntityId> {
        let old = self.destroy(id)?;
        Some(self.create(old.pos, state))
    }

    #[inline]
    pub fn is_active(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    #[inline]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    #[inline]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Number of active entities of `kind`
    #[inline]
    pub fn count_of(&self, kind: Kind) -> usize {
        self.members[kind.index()].len()
    }

    /// Number of active entities of every kind
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Frozen copy of the active ids of `kind`, in creation order
    pub fn snapshot_of(&self, kind: Kind) -> Vec<EntityId> {
        self.members[kind.index()].iter().copied().collect()
    }

    /// Active entities of `kind`, in creation order
    pub fn iter_kind(&self, kind: Kind) -> impl Iterator<Item = &Entity> + '_ {
        self.members[kind.index()]
            .iter()
            .filter_map(move |id| self.entities.get(id))
    }

    /// Entities occupying `pos`
    pub fn occupants(&self, pos: Position) -> impl Iterator<Item = &Entity> + '_ {
        self.grid
            .occupants(pos)
            .iter()
            .filter_map(move |id| self.entities.get(id))
    }

    /// Ids of occupants of `pos` whose kind satisfies `pred`, in cell order
    pub fn occupants_matching(&self, pos: Position, pred: impl Fn(Kind) -> bool) -> Vec<EntityId> {
        self.occupants(pos)
            .filter(|entity| pred(entity.kind()))
            .map(|entity| entity.id)
            .collect()
    }

    /// The Soil entity of a cell.
    ///
    /// Every cell holds exactly one Soil entity; finding none is an invariant
    /// violation reported with the position and tick.
    pub fn soil_at(&self, pos: Position, tick: u64) -> Result<EntityId, EngineError> {
        self.occupants(pos)
            .find(|entity| entity.kind() == Kind::Soil)
            .map(|entity| entity.id)
            .ok_or(EngineError::MissingSoil {
                pos: self.grid.normalize(pos),
                tick,
            })
    }

    /// Fertility of the soil under `pos`
    pub fn fertility_at(&self, pos: Position, tick: u64) -> Result<u8, EngineError> {
        let soil = self.soil_at(pos, tick)?;
        Ok(self
            .get(soil)
            .and_then(Entity::as_soil)
            .map(|soil| soil.fertility)
            .unwrap_or(0))
    }

    /// The vegetation occupying `pos`, preferring the most advanced
    /// succession stage when more than one is present
    pub fn vegetation_at(&self, pos: Position) -> Option<(EntityId, Vegetation)> {
        self.occupants(pos)
            .filter_map(|entity| entity.kind().vegetation().map(|stage| (entity.id, stage)))
            .max_by_key(|&(id, stage)| (stage, std::cmp::Reverse(id)))
    }

    /// Check that grid, member sets and records agree
    pub fn audit(&self) -> Result<(), EngineError> {
        let mut seen_in_grid: HashMap<EntityId, usize> = HashMap::new();
        for pos in self.grid.positions() {
            for &id in self.grid.occupants(pos) {
                *seen_in_grid.entry(id).or_insert(0) += 1;
                match self.entities.get(&id) {
                    Some(entity) if entity.pos != pos => {
                        let detail = format!("listed at {} but records {}", pos, entity.pos);
                        return Err(inconsistent(entity, &detail));
                    }
                    Some(_) => {}
                    None => {
                        return Err(EngineError::Inconsistent {
                            id,
                            detail: format!("destroyed id still listed at {}", pos),
                        });
                    }
                }
            }
        }

        for entity in self.entities.values() {
            if seen_in_grid.get(&entity.id).copied() != Some(1) {
                return Err(inconsistent(entity, "not in exactly one grid cell"));
            }
            let memberships = Kind::ALL
                .iter()
                .filter(|kind| self.members[kind.index()].contains(&entity.id))
                .count();
            if memberships != 1 || !self.members[entity.kind().index()].contains(&entity.id) {
                return Err(inconsistent(entity, "not in exactly its own kind set"));
            }
        }

        let member_total: usize = self.members.iter().map(BTreeSet::len).sum();
        if member_total != self.entities.len() {
            return Err(EngineError::Inconsistent {
                id: self.next_id,
                detail: format!(
                    "{} kind memberships for {} records",
                    member_total,
                    self.entities.len()
                ),
            });
        }

        Ok(())
    }
}

fn inconsistent(entity: &Entity, detail: &str) -> EngineError {
    EngineError::Inconsistent {
        id: entity.id,
        detail: format!("{} {}", entity.kind(), detail),
    }
}
