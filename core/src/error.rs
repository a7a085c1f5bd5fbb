//! Initialization failures.

use thiserror::Error;

use crate::{Archetype, CellCoord, EntityId, PanelTypeId, SpawnError};

/// Setup or data errors detected before a battle starts.
///
/// Per-tick conditions never produce a `ConfigError`; they are absorbed by
/// the world and reported as rejection events at most.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The grid layout has no columns or no rows.
    #[error("battle grid must have at least one column and one row")]
    EmptyGrid,
    /// A panel name does not match any definition.
    #[error("panel type `{0}` is not defined")]
    UnknownPanel(String),
    /// A panel identifier does not match any definition.
    #[error("panel type id {} is not defined", .0.get())]
    UnknownPanelId(PanelTypeId),
    /// Two panel definitions share a name.
    #[error("panel type `{0}` is defined more than once")]
    DuplicatePanel(String),
    /// A panel override targets a cell outside the grid.
    #[error("panel override at ({}, {}) lies outside the grid", .0.column(), .0.row())]
    OverrideOutOfBounds(CellCoord),
    /// Two enemy definitions share a name.
    #[error("enemy `{0}` is defined more than once")]
    DuplicateEnemy(String),
    /// An enemy name does not match any definition.
    #[error("enemy `{0}` is not defined")]
    UnknownEnemy(String),
    /// An enemy definition has no behaviour bound to it.
    #[error("enemy `{0}` has no behaviour archetype bound")]
    MissingArchetype(String),
    /// An enemy definition would spawn with no health.
    #[error("enemy `{0}` must start with positive health")]
    DepletedEnemy(String),
    /// A controller was handed movement built for another archetype.
    #[error("{expected:?} controller cannot drive {found:?} movement")]
    ArchetypeMismatch {
        /// Archetype the controller implements.
        expected: Archetype,
        /// Archetype the movement state implements.
        found: Archetype,
    },
    /// Patrol-and-strike attacks crack panels but no cracked panel exists.
    #[error("patrol-and-strike enemies require a `cracked` panel definition")]
    MissingCrackedPanel,
    /// The named entity does not exist in the world.
    #[error("entity {} does not exist", .0.get())]
    UnknownEntity(EntityId),
    /// Enemies need a navi to target.
    #[error("enemies cannot be spawned before the navi")]
    MissingNavi,
    /// A second navi was requested.
    #[error("a navi is already present")]
    DuplicateNavi,
    /// The world refused a setup spawn.
    #[error("spawn at ({}, {}) rejected: {reason:?}", .cell.column(), .cell.row())]
    SpawnRejected {
        /// Cell named by the spawn.
        cell: CellCoord,
        /// Reason reported by the world.
        reason: SpawnError,
    },
}
