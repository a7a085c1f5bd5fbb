#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the panel battle engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and the battle systems. Callers submit [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values describing
//! what actually happened. Systems read immutable snapshots and respond
//! exclusively with new commands.

mod definitions;
mod error;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use definitions::{
    Archetype, Definitions, EffectKind, EnemyDefinition, PanelDefinition, BROKEN_PANEL,
    CRACKED_PANEL, NORMAL_PANEL, POISON_PANEL,
};
pub use error::ConfigError;

/// Material requested when a cell flashes as an attack warning.
pub const WARNING_MATERIAL: &str = "yellow";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Broadcasts the global pause flag to every component.
    SetPaused {
        /// Whether the battle should be paused.
        paused: bool,
    },
    /// Places a new entity onto the grid.
    SpawnEntity {
        /// Role of the entity within the battle.
        kind: EntityKind,
        /// Side of the field the entity fights for.
        side: Side,
        /// Cell the entity should occupy.
        cell: CellCoord,
        /// Starting health of the entity.
        health: Health,
    },
    /// Relocates an entity to another cell as one atomic step.
    MoveEntity {
        /// Entity being relocated.
        entity: EntityId,
        /// Destination cell.
        to: CellCoord,
    },
    /// Subtracts health from an entity.
    DamageEntity {
        /// Entity receiving the damage.
        entity: EntityId,
        /// Amount of health removed.
        amount: u32,
        /// Origin of the damage.
        source: DamageSource,
    },
    /// Removes an entity from the battle regardless of its health.
    DestroyEntity {
        /// Entity to remove.
        entity: EntityId,
    },
    /// Replaces the panel type of a cell, discarding its previous effect.
    ChangePanel {
        /// Cell whose panel changes.
        cell: CellCoord,
        /// Panel type the cell becomes.
        panel: PanelTypeId,
    },
    /// Requests that the presentation layer flash a cell.
    FlashCell {
        /// Cell to flash.
        cell: CellCoord,
        /// Material shown while flashing.
        material: MaterialId,
        /// Total flashing time.
        duration: Duration,
        /// Time between material swaps.
        interval: Duration,
    },
    /// Requests that the presentation layer play an animation for an entity.
    PlayAnimation {
        /// Entity performing the action.
        entity: EntityId,
        /// Action being animated.
        action: ActionKind,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that the global pause flag changed.
    PauseChanged {
        /// Pause flag after processing the command.
        paused: bool,
    },
    /// Confirms that an entity entered the grid.
    EntitySpawned {
        /// Identifier allocated to the entity.
        entity: EntityId,
        /// Role of the entity.
        kind: EntityKind,
        /// Side the entity fights for.
        side: Side,
        /// Cell the entity occupies.
        cell: CellCoord,
    },
    /// Reports that a spawn request was rejected.
    SpawnRejected {
        /// Cell named by the request.
        cell: CellCoord,
        /// Specific reason the spawn failed.
        reason: SpawnError,
    },
    /// Confirms that an entity moved between two cells.
    EntityMoved {
        /// Entity that moved.
        entity: EntityId,
        /// Cell occupied before the move.
        from: CellCoord,
        /// Cell occupied after the move.
        to: CellCoord,
    },
    /// Reports that a move request was rejected without mutating anything.
    MoveRejected {
        /// Entity named by the request.
        entity: EntityId,
        /// Destination named by the request.
        to: CellCoord,
        /// Specific reason the move failed.
        reason: MoveError,
    },
    /// Confirms that an entity lost health.
    EntityDamaged {
        /// Entity that was damaged.
        entity: EntityId,
        /// Health removed by the hit.
        amount: u32,
        /// Health remaining after the hit.
        remaining: Health,
        /// Origin of the damage.
        source: DamageSource,
    },
    /// Confirms that an entity left the battle and released its cell.
    EntityDestroyed {
        /// Entity that was removed.
        entity: EntityId,
        /// Cell the entity occupied when it was removed.
        cell: CellCoord,
    },
    /// Confirms that a cell changed panel type.
    PanelChanged {
        /// Cell whose panel changed.
        cell: CellCoord,
        /// Panel type before the change.
        from: PanelTypeId,
        /// Panel type after the change.
        to: PanelTypeId,
    },
    /// Reports that a panel effect reached its expiry condition.
    PanelEffectExpired {
        /// Cell whose effect became inactive.
        cell: CellCoord,
        /// Kind of effect that expired.
        kind: EffectKind,
    },
    /// Fire-and-forget request to flash a cell.
    CellFlashRequested {
        /// Cell to flash.
        cell: CellCoord,
        /// Material shown while flashing.
        material: MaterialId,
        /// Total flashing time.
        duration: Duration,
        /// Time between material swaps.
        interval: Duration,
    },
    /// Fire-and-forget request to animate an entity.
    AnimationRequested {
        /// Entity performing the action.
        entity: EntityId,
        /// Action being animated.
        action: ActionKind,
    },
}

/// Cardinal directions available for relative grid lookups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Toward decreasing row indices.
    Up,
    /// Toward increasing row indices.
    Down,
    /// Toward decreasing column indices.
    Left,
    /// Toward increasing column indices.
    Right,
}

/// Side of the field that owns a cell or an entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Side {
    /// Cell owned by neither combatant.
    #[default]
    Neutral,
    /// Player (Navi) side of the field.
    Player,
    /// Enemy side of the field.
    Enemy,
}

/// Role an entity plays in the battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Player-controlled unit targeted by enemy AI.
    Navi,
    /// AI-driven opponent.
    Enemy,
}

/// Unique identifier assigned to an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier of a panel definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PanelTypeId(u32);

impl PanelTypeId {
    /// Creates a new panel type identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Health points carried by an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Health(u32);

impl Health {
    /// Creates a new health value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the remaining health points.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Health left after removing `amount`, clamped at zero.
    #[must_use]
    pub const fn saturating_sub(self, amount: u32) -> Self {
        Self(self.0.saturating_sub(amount))
    }

    /// Reports whether no health remains.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.0 == 0
    }
}

/// Name of a presentation material.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialId(String);

impl MaterialId {
    /// Creates a material identifier.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Material used for attack warnings.
    #[must_use]
    pub fn warning() -> Self {
        Self::new(WARNING_MATERIAL)
    }

    /// Name of the material.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Actions the presentation layer may animate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Single-target hammer strike.
    Strike,
    /// Three-cell sword sweep.
    WideSlash,
}

/// Origin of a health change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DamageSource {
    /// Attack performed by another entity.
    Entity(EntityId),
    /// Effect of the panel at the provided cell.
    Panel(CellCoord),
    /// Damage issued by a collaborator outside the core.
    External,
}

/// Reasons a move request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveError {
    /// The entity does not exist (never spawned or already destroyed).
    UnknownEntity,
    /// The destination lies outside the grid.
    OutOfBounds,
    /// The destination panel is not traversable.
    Blocked,
    /// Another entity occupies the destination.
    Occupied,
}

/// Reasons a spawn request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpawnError {
    /// The requested cell lies outside the grid.
    OutOfBounds,
    /// The requested panel is not traversable.
    Blocked,
    /// Another entity already occupies the requested cell.
    Occupied,
    /// The entity would enter the battle with no health left.
    Depleted,
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Neighbouring coordinate in the provided direction.
    ///
    /// Returns `None` when the step would leave the non-negative quadrant.
    /// Upper bounds are the grid's concern.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<Self> {
        match direction {
            Direction::Up => self.row.checked_sub(1).map(|row| Self::new(self.column, row)),
            Direction::Down => self.row.checked_add(1).map(|row| Self::new(self.column, row)),
            Direction::Left => self
                .column
                .checked_sub(1)
                .map(|column| Self::new(column, self.row)),
            Direction::Right => self
                .column
                .checked_add(1)
                .map(|column| Self::new(column, self.row)),
        }
    }
}

/// Immutable representation of a single entity used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntitySnapshot {
    /// Unique identifier assigned to the entity.
    pub id: EntityId,
    /// Role of the entity.
    pub kind: EntityKind,
    /// Side the entity fights for.
    pub side: Side,
    /// Cell currently occupied by the entity.
    pub cell: CellCoord,
    /// Remaining health.
    pub health: Health,
    /// Mirror of the global pause flag as last broadcast to the entity.
    pub paused: bool,
}

/// Immutable representation of a single grid cell used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridCell {
    /// Location of the cell.
    pub coord: CellCoord,
    /// Static traversable flag of the current panel type.
    pub traversable: bool,
    /// Fixed side ownership assigned at grid construction.
    pub side: Side,
    /// Entity currently standing on the cell, if any.
    pub occupant: Option<EntityId>,
    /// Current panel type.
    pub panel: PanelTypeId,
    /// Kind of effect bound to the current panel.
    pub effect: EffectKind,
}
