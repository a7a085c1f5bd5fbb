#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative battle state for the panel battle engine.
//!
//! The world owns the grid, the occupancy table, every live entity and the
//! effects bound to each panel. It only changes through [`apply`], and every
//! change is reported as an [`Event`].

mod entities;
mod grid;
mod panel_effect;

use std::time::Duration;

use panel_battle_core::{
    CellCoord, Command, ConfigError, DamageSource, Definitions, EffectKind, EntityId,
    EntityKind, Event, Health, MoveError, PanelTypeId, Side, SpawnError,
};
use tracing::{debug, trace, warn};

use self::entities::EntityRegistry;
pub use self::grid::{GridIndex, GridLayout};
pub use self::panel_effect::{EffectPhase, EffectTick, PanelEffect};

/// Represents the authoritative battle state.
#[derive(Debug)]
pub struct World {
    definitions: Definitions,
    grid: GridIndex,
    entities: EntityRegistry,
    paused: bool,
    tick_index: u64,
}

impl World {
    /// Builds a world from a grid layout and the panel catalog.
    pub fn new(layout: &GridLayout, definitions: Definitions) -> Result<Self, ConfigError> {
        let grid = GridIndex::build(layout, &definitions)?;
        Ok(Self {
            definitions,
            grid,
            entities: EntityRegistry::new(),
            paused: false,
            tick_index: 0,
        })
    }

    fn advance(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        out_events.push(Event::TimeAdvanced { dt });

        for (cell, kind, outcome) in self.grid.advance_effects(dt) {
            match outcome {
                EffectTick::Apply(amount) => {
                    let Some(occupant) = self.grid.occupant(cell) else {
                        continue;
                    };
                    self.damage(occupant, amount, DamageSource::Panel(cell), out_events);
                }
                EffectTick::Expired => {
                    debug!(?cell, ?kind, "panel effect expired");
                    out_events.push(Event::PanelEffectExpired { cell, kind });
                }
                EffectTick::Idle => {}
            }
        }
    }

    fn spawn(
        &mut self,
        kind: EntityKind,
        side: Side,
        cell: CellCoord,
        health: Health,
        out_events: &mut Vec<Event>,
    ) {
        let reason = match self.grid.cell_at(cell) {
            _ if health.is_depleted() => Some(SpawnError::Depleted),
            None => Some(SpawnError::OutOfBounds),
            Some(target) if !target.traversable => Some(SpawnError::Blocked),
            Some(target) if target.occupant.is_some() => Some(SpawnError::Occupied),
            Some(_) => None,
        };
        if let Some(reason) = reason {
            debug!(?cell, ?reason, "spawn rejected");
            out_events.push(Event::SpawnRejected { cell, reason });
            return;
        }

        let entity = self.entities.insert(kind, side, cell, health, self.paused);
        self.grid.occupy(entity, cell);
        debug!(entity = entity.get(), ?kind, ?cell, "entity spawned");
        out_events.push(Event::EntitySpawned {
            entity,
            kind,
            side,
            cell,
        });
    }

    fn relocate(&mut self, entity: EntityId, to: CellCoord, out_events: &mut Vec<Event>) {
        let from = match self.entities.get(entity) {
            Some(state) => state.cell,
            None => {
                out_events.push(Event::MoveRejected {
                    entity,
                    to,
                    reason: MoveError::UnknownEntity,
                });
                return;
            }
        };

        let reason = match self.grid.cell_at(to) {
            None => Some(MoveError::OutOfBounds),
            Some(target) if !target.traversable => Some(MoveError::Blocked),
            Some(target) if target.occupant.is_some() => Some(MoveError::Occupied),
            Some(_) => None,
        };
        if let Some(reason) = reason {
            trace!(entity = entity.get(), ?to, ?reason, "move rejected");
            out_events.push(Event::MoveRejected { entity, to, reason });
            return;
        }

        self.grid.relocate(entity, from, to);
        if let Some(state) = self.entities.get_mut(entity) {
            state.cell = to;
        }
        debug!(entity = entity.get(), ?from, ?to, "entity moved");
        out_events.push(Event::EntityMoved { entity, from, to });

        self.break_if_cracked(from, out_events);
    }

    fn break_if_cracked(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) {
        let Some(effect) = self.grid.effect(cell) else {
            return;
        };
        if effect.kind() != EffectKind::Cracked || !effect.is_active() {
            return;
        }
        let Some(current) = self.grid.cell_at(cell).map(|state| state.panel) else {
            return;
        };
        let broken = self
            .definitions
            .panel(current)
            .and_then(|definition| definition.breaks_into.as_deref())
            .and_then(|name| self.definitions.panel_id(name));
        if let Some(broken) = broken {
            self.change_panel(cell, broken, out_events);
        }
    }

    fn damage(
        &mut self,
        entity: EntityId,
        amount: u32,
        source: DamageSource,
        out_events: &mut Vec<Event>,
    ) {
        let Some(state) = self.entities.get_mut(entity) else {
            trace!(entity = entity.get(), "damage to missing entity ignored");
            return;
        };

        state.health = state.health.saturating_sub(amount);
        let remaining = state.health;
        debug!(entity = entity.get(), amount, remaining = remaining.get(), ?source, "entity damaged");
        out_events.push(Event::EntityDamaged {
            entity,
            amount,
            remaining,
            source,
        });

        if remaining.is_depleted() {
            self.destroy(entity, out_events);
        }
    }

    fn destroy(&mut self, entity: EntityId, out_events: &mut Vec<Event>) {
        let Some(state) = self.entities.remove(entity) else {
            return;
        };
        if self.grid.occupant(state.cell) == Some(entity) {
            self.grid.vacate(state.cell);
        }
        debug!(entity = entity.get(), cell = ?state.cell, "entity destroyed");
        out_events.push(Event::EntityDestroyed {
            entity,
            cell: state.cell,
        });
    }

    fn change_panel(&mut self, cell: CellCoord, panel: PanelTypeId, out_events: &mut Vec<Event>) {
        let Some(definition) = self.definitions.panel(panel) else {
            warn!(?cell, panel = panel.get(), "unknown panel type requested");
            return;
        };
        match self.grid.set_panel(cell, panel, definition) {
            None => trace!(?cell, "panel change outside the grid ignored"),
            Some(previous) if previous == panel => {
                warn!(?cell, panel = %definition.name, "panel is already of the requested type");
            }
            Some(previous) => {
                debug!(?cell, from = previous.get(), to = panel.get(), "panel changed");
                out_events.push(Event::PanelChanged {
                    cell,
                    from: previous,
                    to: panel,
                });
            }
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            if world.paused {
                trace!("tick skipped while paused");
                return;
            }
            world.advance(dt, out_events);
        }
        Command::SetPaused { paused } => {
            if world.paused == paused {
                return;
            }
            world.paused = paused;
            world.entities.set_paused(paused);
            out_events.push(Event::PauseChanged { paused });
        }
        Command::SpawnEntity {
            kind,
            side,
            cell,
            health,
        } => world.spawn(kind, side, cell, health, out_events),
        Command::MoveEntity { entity, to } => world.relocate(entity, to, out_events),
        Command::DamageEntity {
            entity,
            amount,
            source,
        } => world.damage(entity, amount, source, out_events),
        Command::DestroyEntity { entity } => world.destroy(entity, out_events),
        Command::ChangePanel { cell, panel } => world.change_panel(cell, panel, out_events),
        Command::FlashCell {
            cell,
            material,
            duration,
            interval,
        } => {
            if world.grid.cell_at(cell).is_some() {
                out_events.push(Event::CellFlashRequested {
                    cell,
                    material,
                    duration,
                    interval,
                });
            }
        }
        Command::PlayAnimation { entity, action } => {
            if world.entities.get(entity).is_some() {
                out_events.push(Event::AnimationRequested { entity, action });
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use panel_battle_core::{
        CellCoord, Definitions, EntityId, EntityKind, EntitySnapshot, GridCell,
    };

    use super::{GridIndex, PanelEffect, World};

    /// Reports whether the global pause flag is set.
    #[must_use]
    pub fn is_paused(world: &World) -> bool {
        world.paused
    }

    /// Number of ticks that advanced the clock so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Provides read-only access to the grid index.
    #[must_use]
    pub fn grid(world: &World) -> &GridIndex {
        &world.grid
    }

    /// Looks up a single cell.
    #[must_use]
    pub fn cell_at(world: &World, coord: CellCoord) -> Option<GridCell> {
        world.grid.cell_at(coord)
    }

    /// Effect bound to the cell at `coord`.
    #[must_use]
    pub fn panel_effect(world: &World, coord: CellCoord) -> Option<&PanelEffect> {
        world.grid.effect(coord)
    }

    /// Provides read-only access to the definition catalog.
    #[must_use]
    pub fn definitions(world: &World) -> &Definitions {
        &world.definitions
    }

    /// Captures a snapshot of a live entity.
    #[must_use]
    pub fn entity(world: &World, id: EntityId) -> Option<EntitySnapshot> {
        world.entities.get(id).map(|state| state.snapshot())
    }

    /// Captures snapshots of every live entity in identifier order.
    #[must_use]
    pub fn entities(world: &World) -> Vec<EntitySnapshot> {
        world.entities.iter().map(|state| state.snapshot()).collect()
    }

    /// Captures the navi, if it is alive.
    #[must_use]
    pub fn navi(world: &World) -> Option<EntitySnapshot> {
        world
            .entities
            .iter()
            .find(|state| state.kind == EntityKind::Navi)
            .map(|state| state.snapshot())
    }
}
