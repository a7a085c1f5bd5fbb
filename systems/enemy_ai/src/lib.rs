#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Attack timing and attack decisions layered on top of enemy movement.
//!
//! Each [`AiController`] exclusively owns the movement state of one enemy.
//! Patrol-and-strike controllers react to the movement's ready-to-act signal
//! with a telegraphed attack that resolves half a second later.
//! Teleport-and-flank controllers poll their range every tick instead and
//! strike without warning.

mod attack;
mod delayed;

use std::time::Duration;

use panel_battle_core::{
    ActionKind, Archetype, Command, ConfigError, DamageSource, Direction,
    EnemyDefinition, EntityId, EntitySnapshot, Event, MaterialId, PanelTypeId, CRACKED_PANEL,
};
use panel_battle_system_movement::{MovementSignal, MovementState};
use panel_battle_world::{self as world, query, World};
use tracing::{debug, trace};

pub use self::attack::AttackTimer;
pub use self::delayed::{Countdown, DelayedAction, PendingAction};

/// Ticks between the ready-to-act signal and the warning flash.
pub const TELEGRAPH_TICKS: u32 = 2;
/// Delay between the ready-to-act signal and attack resolution.
pub const RESOLVE_DELAY: Duration = Duration::from_millis(500);
/// Total duration of the warning flash.
pub const FLASH_DURATION: Duration = Duration::from_millis(250);
/// Interval between material swaps of the warning flash.
pub const FLASH_INTERVAL: Duration = Duration::from_millis(50);

/// Drives one enemy entity.
#[derive(Clone, Debug, PartialEq)]
pub struct AiController {
    entity: EntityId,
    opponent: EntityId,
    archetype: Archetype,
    movement: MovementState,
    attack: AttackTimer,
    damage: u32,
    cracked_panel: Option<PanelTypeId>,
    pending: Vec<DelayedAction>,
    signals: Vec<MovementSignal>,
}

impl AiController {
    /// Wires a controller to `entity`, targeting `opponent`.
    ///
    /// Fails when either entity is missing, the definition carries no
    /// archetype, or a patrol-and-strike enemy has no cracked panel to leave
    /// behind.
    pub fn init(
        world: &World,
        entity: EntityId,
        opponent: EntityId,
        definition: &EnemyDefinition,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        if query::entity(world, opponent).is_none() {
            return Err(ConfigError::UnknownEntity(opponent));
        }
        let movement = MovementState::init(world, entity, definition, seed)?;
        let archetype = movement.archetype();
        let cracked_panel = match archetype {
            Archetype::PatrolStrike => Some(
                query::definitions(world)
                    .require_panel(CRACKED_PANEL)
                    .map_err(|_| ConfigError::MissingCrackedPanel)?,
            ),
            Archetype::TeleportFlank => None,
        };

        debug!(entity = entity.get(), ?archetype, "enemy controller initialised");
        Ok(Self {
            entity,
            opponent,
            archetype,
            movement,
            attack: AttackTimer::new(definition.attack_delay()),
            damage: definition.damage,
            cracked_panel,
            pending: Vec::new(),
            signals: Vec::new(),
        })
    }

    /// Replaces the owned movement state.
    ///
    /// The replacement must belong to the controller's archetype; a mismatch
    /// is a setup error.
    pub fn with_movement(mut self, movement: MovementState) -> Result<Self, ConfigError> {
        if movement.archetype() != self.archetype {
            return Err(ConfigError::ArchetypeMismatch {
                expected: self.archetype,
                found: movement.archetype(),
            });
        }
        self.movement = movement;
        Ok(self)
    }

    /// Entity driven by this controller.
    #[must_use]
    pub const fn entity(&self) -> EntityId {
        self.entity
    }

    /// Entity this controller attacks.
    #[must_use]
    pub const fn opponent(&self) -> EntityId {
        self.opponent
    }

    /// Archetype of the controller.
    #[must_use]
    pub const fn archetype(&self) -> Archetype {
        self.archetype
    }

    /// Owned movement state.
    #[must_use]
    pub const fn movement(&self) -> &MovementState {
        &self.movement
    }

    /// Attack cooldown.
    #[must_use]
    pub const fn attack(&self) -> &AttackTimer {
        &self.attack
    }

    /// Delayed actions still counting down.
    #[must_use]
    pub fn pending(&self) -> &[DelayedAction] {
        &self.pending
    }

    /// Restores both movement and attack delays.
    pub fn reset(&mut self) {
        self.movement.reset();
        self.attack.reset();
    }

    /// Advances the controller by one tick.
    ///
    /// Delayed actions scheduled earlier count down first, then movement
    /// runs, then the archetype's attack logic consumes any signal movement
    /// raised during this same tick. A destroyed owner cancels everything
    /// pending.
    pub fn tick(&mut self, world: &mut World, dt: Duration, out_events: &mut Vec<Event>) {
        if query::is_paused(world) {
            return;
        }
        if query::entity(world, self.entity).is_none() {
            if !self.pending.is_empty() {
                trace!(entity = self.entity.get(), "owner gone; cancelling delayed actions");
                self.pending.clear();
            }
            return;
        }

        self.advance_pending(world, dt, out_events);
        if query::entity(world, self.entity).is_none() {
            return;
        }

        self.movement
            .tick(world, self.opponent, dt, &mut self.signals, out_events);

        match self.archetype {
            Archetype::PatrolStrike => {
                for signal in self.signals.drain(..) {
                    match signal {
                        MovementSignal::ReadyToAct => {
                            debug!(entity = self.entity.get(), "attack telegraphed");
                            self.pending.push(DelayedAction::new(
                                Countdown::Ticks(TELEGRAPH_TICKS),
                                PendingAction::Telegraph,
                            ));
                            self.pending.push(DelayedAction::new(
                                Countdown::Time(RESOLVE_DELAY),
                                PendingAction::Resolve,
                            ));
                        }
                    }
                }
            }
            Archetype::TeleportFlank => {
                self.signals.clear();
                self.poll_attack(world, dt, out_events);
            }
        }
    }

    fn advance_pending(&mut self, world: &mut World, dt: Duration, out_events: &mut Vec<Event>) {
        let mut fired = Vec::new();
        self.pending.retain_mut(|delayed| {
            if delayed.advance(dt) {
                fired.push(delayed.action());
                false
            } else {
                true
            }
        });

        for action in fired {
            match action {
                PendingAction::Telegraph => self.flash_warning(world, out_events),
                PendingAction::Resolve => self.resolve_strike(world, out_events),
            }
        }
    }

    fn flash_warning(&self, world: &mut World, out_events: &mut Vec<Event>) {
        let Some(target) = query::entity(world, self.opponent) else {
            return;
        };
        world::apply(
            world,
            Command::FlashCell {
                cell: target.cell,
                material: MaterialId::warning(),
                duration: FLASH_DURATION,
                interval: FLASH_INTERVAL,
            },
            out_events,
        );
    }

    fn resolve_strike(&mut self, world: &mut World, out_events: &mut Vec<Event>) {
        let Some(me) = query::entity(world, self.entity) else {
            return;
        };
        let target = query::entity(world, self.opponent);

        if target.map_or(false, |target| in_strike_range(&me, &target)) {
            debug!(entity = self.entity.get(), damage = self.damage, "strike connected");
            world::apply(
                world,
                Command::DamageEntity {
                    entity: self.opponent,
                    amount: self.damage,
                    source: DamageSource::Entity(self.entity),
                },
                out_events,
            );
            world::apply(
                world,
                Command::PlayAnimation {
                    entity: self.entity,
                    action: ActionKind::Strike,
                },
                out_events,
            );
        } else {
            let left = query::grid(world).relative(me.cell, Direction::Left);
            if let (Some(left), Some(cracked)) = (left, self.cracked_panel) {
                debug!(entity = self.entity.get(), cell = ?left.coord, "strike missed; cracking panel");
                world::apply(
                    world,
                    Command::ChangePanel {
                        cell: left.coord,
                        panel: cracked,
                    },
                    out_events,
                );
            }
        }

        self.attack.reset();
    }

    fn poll_attack(&mut self, world: &mut World, dt: Duration, out_events: &mut Vec<Event>) {
        let in_range = self.opponent_in_flank_range(world);
        if !self.attack.poll(dt, in_range) {
            return;
        }

        if self.opponent_in_flank_range(world) {
            debug!(entity = self.entity.get(), damage = self.damage, "wide slash connected");
            world::apply(
                world,
                Command::DamageEntity {
                    entity: self.opponent,
                    amount: self.damage,
                    source: DamageSource::Entity(self.entity),
                },
                out_events,
            );
            world::apply(
                world,
                Command::PlayAnimation {
                    entity: self.entity,
                    action: ActionKind::WideSlash,
                },
                out_events,
            );
        }
        self.attack.reset();
    }

    fn opponent_in_flank_range(&self, world: &World) -> bool {
        match (
            query::entity(world, self.entity),
            query::entity(world, self.opponent),
        ) {
            (Some(me), Some(target)) => in_flank_range(&me, &target),
            _ => false,
        }
    }
}

/// Opponent stands directly left of the attacker on the same row.
#[must_use]
pub fn in_strike_range(attacker: &EntitySnapshot, target: &EntitySnapshot) -> bool {
    attacker.cell.row() == target.cell.row()
        && attacker.cell.column().checked_sub(1) == Some(target.cell.column())
}

/// Opponent stands one column left of the attacker, at most one row away.
#[must_use]
pub fn in_flank_range(attacker: &EntitySnapshot, target: &EntitySnapshot) -> bool {
    target.cell.column().checked_add(1) == Some(attacker.cell.column())
        && attacker.cell.row().abs_diff(target.cell.row()) <= 1
}
