#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Delay-gated movement behaviours for enemy entities.
//!
//! Every mover shares a [`MovementTimer`]. Once the timer elapses the
//! archetype-specific variant decides where to go and relocates its owner
//! through the world's transactional move command. The patrol-and-strike
//! variant additionally raises [`MovementSignal::ReadyToAct`] after a
//! successful lunge, which the AI controller consumes within the same tick.

mod patrol_strike;
mod teleport_flank;
mod timer;

use std::time::Duration;

use panel_battle_core::{
    Archetype, CellCoord, Command, ConfigError, EnemyDefinition, EntityId, Event,
};
use panel_battle_world::{self as world, query, World};
use tracing::trace;

pub use self::patrol_strike::{PatrolStrike, RETURN_DELAY};
pub use self::teleport_flank::{TeleportFlank, STEPS_BEFORE_FLANK};
pub use self::timer::{MovementPhase, MovementTimer};

/// Signals raised by movement for the owning controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MovementSignal {
    /// The mover just reached a striking position.
    ReadyToAct,
}

/// Archetype-specific movement behaviour.
#[derive(Clone, Debug, PartialEq)]
pub enum MovementStyle {
    /// Lunge beside the opponent when rows align, then return to base.
    PatrolStrike(PatrolStrike),
    /// Random teleports on the own side followed by a flank.
    TeleportFlank(TeleportFlank),
}

impl MovementStyle {
    /// Archetype this behaviour belongs to.
    #[must_use]
    pub const fn archetype(&self) -> Archetype {
        match self {
            Self::PatrolStrike(_) => Archetype::PatrolStrike,
            Self::TeleportFlank(_) => Archetype::TeleportFlank,
        }
    }
}

/// Movement state owned by a single entity.
#[derive(Clone, Debug, PartialEq)]
pub struct MovementState {
    owner: EntityId,
    timer: MovementTimer,
    style: MovementStyle,
}

impl MovementState {
    /// Creates movement state from explicit parts.
    #[must_use]
    pub const fn new(owner: EntityId, timer: MovementTimer, style: MovementStyle) -> Self {
        Self {
            owner,
            timer,
            style,
        }
    }

    /// Builds the movement variant matching the definition's archetype.
    ///
    /// The owner's current cell becomes the patrol base, and `seed` drives
    /// teleport destinations.
    pub fn init(
        world: &World,
        owner: EntityId,
        definition: &EnemyDefinition,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        let snapshot = query::entity(world, owner).ok_or(ConfigError::UnknownEntity(owner))?;
        let timer =
            MovementTimer::with_initial_delay(definition.move_delay(), definition.initial_move_delay());
        let style = match definition.archetype()? {
            Archetype::PatrolStrike => MovementStyle::PatrolStrike(PatrolStrike::new(snapshot.cell)),
            Archetype::TeleportFlank => MovementStyle::TeleportFlank(TeleportFlank::new(seed)),
        };
        Ok(Self::new(owner, timer, style))
    }

    /// Entity that owns this movement state.
    #[must_use]
    pub const fn owner(&self) -> EntityId {
        self.owner
    }

    /// Archetype of the movement behaviour.
    #[must_use]
    pub const fn archetype(&self) -> Archetype {
        self.style.archetype()
    }

    /// Behaviour variant.
    #[must_use]
    pub const fn style(&self) -> &MovementStyle {
        &self.style
    }

    /// Delay timer gating movement decisions.
    #[must_use]
    pub const fn timer(&self) -> &MovementTimer {
        &self.timer
    }

    /// Restores the base movement delay.
    pub fn reset(&mut self) {
        self.timer.reset();
    }

    /// Advances the timer and, once it elapses, runs one movement decision.
    ///
    /// Nothing happens while the world is paused or once the owner has left
    /// the battle.
    pub fn tick(
        &mut self,
        world: &mut World,
        opponent: EntityId,
        dt: Duration,
        signals: &mut Vec<MovementSignal>,
        out_events: &mut Vec<Event>,
    ) {
        if query::is_paused(world) || query::entity(world, self.owner).is_none() {
            return;
        }
        if !self.timer.advance(dt) {
            return;
        }

        self.timer.begin_action();
        match &mut self.style {
            MovementStyle::PatrolStrike(variant) => variant.handle_movement(
                world,
                self.owner,
                opponent,
                &mut self.timer,
                signals,
                out_events,
            ),
            MovementStyle::TeleportFlank(variant) => {
                variant.handle_movement(world, self.owner, opponent, &mut self.timer, out_events)
            }
        }
        if self.timer.phase() == MovementPhase::Acting {
            trace!(entity = self.owner.get(), "movement deferred");
            self.timer.defer();
        }
    }
}

/// Moves `entity` to `to` and reports whether it now stands there.
///
/// Staying on the current cell counts as success without touching the world.
pub fn relocate(world: &mut World, entity: EntityId, to: CellCoord, out_events: &mut Vec<Event>) -> bool {
    match query::entity(world, entity) {
        Some(snapshot) if snapshot.cell == to => return true,
        Some(_) => {}
        None => return false,
    }

    let start = out_events.len();
    world::apply(world, Command::MoveEntity { entity, to }, out_events);
    out_events[start..].iter().any(|event| {
        matches!(event, Event::EntityMoved { entity: moved, to: reached, .. } if *moved == entity && *reached == to)
    })
}
