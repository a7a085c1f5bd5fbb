#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-step driver that owns the world and every enemy controller.
//!
//! Each [`BattleLoop::step`] advances panel effects through the world's tick
//! and then every controller in ascending entity order. Controllers whose
//! entity left the battle are dropped at the end of the step, which cancels
//! their pending delayed actions.

use std::{collections::BTreeMap, time::Duration};

use panel_battle_core::{
    CellCoord, Command, ConfigError, Definitions, EntityId, EntityKind, Event, Health, Side,
    SpawnError,
};
use panel_battle_system_enemy_ai::AiController;
use panel_battle_world::{self as world, query, GridLayout, World};
use tracing::{debug, info};

const SEED_MIX: u64 = 0x9e37_79b9_7f4a_7c15;

/// Parameters of a battle run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Simulated time advanced by each step.
    pub tick: Duration,
    /// Seed from which every controller derives its random stream.
    pub seed: u64,
}

impl Config {
    /// Creates a configuration.
    #[must_use]
    pub const fn new(tick: Duration, seed: u64) -> Self {
        Self { tick, seed }
    }

    fn controller_seed(&self, entity: EntityId) -> u64 {
        self.seed ^ u64::from(entity.get()).wrapping_add(1).wrapping_mul(SEED_MIX)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Duration::from_millis(50), 0)
    }
}

/// State of the battle as seen from the Navi.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Both sides still stand.
    InProgress,
    /// Every spawned enemy has been destroyed.
    Victory,
    /// The Navi has been destroyed.
    Defeat,
}

/// Owns a battle: the world, the Navi and one controller per enemy.
#[derive(Debug)]
pub struct BattleLoop {
    config: Config,
    world: World,
    navi: Option<EntityId>,
    controllers: BTreeMap<EntityId, AiController>,
    enemies_spawned: usize,
}

impl BattleLoop {
    /// Builds an empty battle over the provided layout.
    pub fn new(
        config: Config,
        definitions: Definitions,
        layout: &GridLayout,
    ) -> Result<Self, ConfigError> {
        let world = World::new(layout, definitions)?;
        Ok(Self {
            config,
            world,
            navi: None,
            controllers: BTreeMap::new(),
            enemies_spawned: 0,
        })
    }

    /// Battle configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Read-only access to the world for queries.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Identifier of the Navi, once spawned.
    #[must_use]
    pub const fn navi(&self) -> Option<EntityId> {
        self.navi
    }

    /// Controller driving `entity`, if it is still alive.
    #[must_use]
    pub fn controller(&self, entity: EntityId) -> Option<&AiController> {
        self.controllers.get(&entity)
    }

    /// Number of live controllers.
    #[must_use]
    pub fn controller_count(&self) -> usize {
        self.controllers.len()
    }

    /// Places the Navi on the player's side.
    pub fn spawn_navi(
        &mut self,
        cell: CellCoord,
        health: Health,
        out_events: &mut Vec<Event>,
    ) -> Result<EntityId, ConfigError> {
        if self.navi.is_some() {
            return Err(ConfigError::DuplicateNavi);
        }
        let navi = self.spawn(EntityKind::Navi, Side::Player, cell, health, out_events)?;
        info!(entity = navi.get(), ?cell, "navi entered the battle");
        self.navi = Some(navi);
        Ok(navi)
    }

    /// Places the named enemy and wires its controller to the Navi.
    ///
    /// The entity is removed again if its controller cannot be built.
    pub fn spawn_enemy(
        &mut self,
        name: &str,
        cell: CellCoord,
        out_events: &mut Vec<Event>,
    ) -> Result<EntityId, ConfigError> {
        let navi = self.navi.ok_or(ConfigError::MissingNavi)?;
        let definition = query::definitions(&self.world)
            .enemy(name)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownEnemy(name.to_owned()))?;
        let _ = definition.archetype()?;

        let health = Health::new(definition.health);
        let entity = self.spawn(EntityKind::Enemy, Side::Enemy, cell, health, out_events)?;
        let seed = self.config.controller_seed(entity);
        match AiController::init(&self.world, entity, navi, &definition, seed) {
            Ok(controller) => {
                info!(entity = entity.get(), enemy = name, ?cell, "enemy entered the battle");
                let _ = self.controllers.insert(entity, controller);
                self.enemies_spawned += 1;
                Ok(entity)
            }
            Err(error) => {
                world::apply(&mut self.world, Command::DestroyEntity { entity }, out_events);
                Err(error)
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
    ) -> Result<EntityId, ConfigError> {
        let start = out_events.len();
        world::apply(
            &mut self.world,
            Command::SpawnEntity {
                kind,
                side,
                cell,
                health,
            },
            out_events,
        );
        for event in &out_events[start..] {
            match event {
                Event::EntitySpawned { entity, .. } => return Ok(*entity),
                Event::SpawnRejected { cell, reason } => {
                    return Err(ConfigError::SpawnRejected {
                        cell: *cell,
                        reason: *reason,
                    })
                }
                _ => {}
            }
        }
        Err(ConfigError::SpawnRejected {
            cell,
            reason: SpawnError::OutOfBounds,
        })
    }

    /// Applies a command from an external collaborator such as player input.
    pub fn submit(&mut self, command: Command, out_events: &mut Vec<Event>) {
        world::apply(&mut self.world, command, out_events);
        self.retire_controllers();
    }

    /// Broadcasts the global pause flag.
    pub fn set_paused(&mut self, paused: bool, out_events: &mut Vec<Event>) {
        world::apply(&mut self.world, Command::SetPaused { paused }, out_events);
    }

    /// Advances the battle by one fixed tick.
    pub fn step(&mut self, out_events: &mut Vec<Event>) {
        let dt = self.config.tick;
        world::apply(&mut self.world, Command::Tick { dt }, out_events);
        if query::is_paused(&self.world) {
            return;
        }

        for controller in self.controllers.values_mut() {
            controller.tick(&mut self.world, dt, out_events);
        }
        self.retire_controllers();
    }

    /// Advances the battle by `ticks` steps, stopping early once decided.
    pub fn run(&mut self, ticks: u64, out_events: &mut Vec<Event>) -> Outcome {
        for _ in 0..ticks {
            self.step(out_events);
            let outcome = self.outcome();
            if outcome != Outcome::InProgress {
                info!(?outcome, tick = query::tick_index(&self.world), "battle decided");
                return outcome;
            }
        }
        self.outcome()
    }

    /// Current result of the battle.
    #[must_use]
    pub fn outcome(&self) -> Outcome {
        if let Some(navi) = self.navi {
            if query::entity(&self.world, navi).is_none() {
                return Outcome::Defeat;
            }
        }
        let enemies_alive = query::entities(&self.world)
            .iter()
            .any(|entity| entity.kind == EntityKind::Enemy);
        if self.enemies_spawned > 0 && !enemies_alive {
            return Outcome::Victory;
        }
        Outcome::InProgress
    }

    fn retire_controllers(&mut self) {
        let world = &self.world;
        self.controllers.retain(|entity, _| {
            let alive = query::entity(world, *entity).is_some();
            if !alive {
                debug!(entity = entity.get(), "controller retired");
            }
            alive
        });
    }
}
