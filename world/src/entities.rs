//! Authoritative entity state management utilities.

use std::collections::BTreeMap;

use panel_battle_core::{CellCoord, EntityId, EntityKind, EntitySnapshot, Health, Side};

/// State of a live entity stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct EntityState {
    pub(crate) id: EntityId,
    pub(crate) kind: EntityKind,
    pub(crate) side: Side,
    pub(crate) cell: CellCoord,
    pub(crate) health: Health,
    pub(crate) paused: bool,
}

impl EntityState {
    pub(crate) fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot {
            id: self.id,
            kind: self.kind,
            side: self.side,
            cell: self.cell,
            health: self.health,
            paused: self.paused,
        }
    }
}

/// Registry that stores live entities and manages identifier allocation.
///
/// Identifiers are never reused, so a stale id can only ever miss.
#[derive(Debug)]
pub(crate) struct EntityRegistry {
    entries: BTreeMap<EntityId, EntityState>,
    next_entity_id: EntityId,
}

impl EntityRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_entity_id: EntityId::new(0),
        }
    }

    pub(crate) fn insert(
        &mut self,
        kind: EntityKind,
        side: Side,
        cell: CellCoord,
        health: Health,
        paused: bool,
    ) -> EntityId {
        let id = self.next_entity_id;
        self.next_entity_id = EntityId::new(id.get().saturating_add(1));
        let _ = self.entries.insert(
            id,
            EntityState {
                id,
                kind,
                side,
                cell,
                health,
                paused,
            },
        );
        id
    }

    pub(crate) fn get(&self, id: EntityId) -> Option<&EntityState> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: EntityId) -> Option<&mut EntityState> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: EntityId) -> Option<EntityState> {
        self.entries.remove(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &EntityState> {
        self.entries.values()
    }

    pub(crate) fn set_paused(&mut self, paused: bool) {
        for entity in self.entries.values_mut() {
            entity.paused = paused;
        }
    }
}
