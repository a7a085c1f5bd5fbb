use std::time::Duration;

use panel_battle_core::{CellCoord, Direction, EntityId, Event};
use panel_battle_world::{query, World};
use tracing::debug;

use crate::{relocate, MovementSignal, MovementTimer};

/// Countdown before an advanced patrol-and-strike mover heads home.
pub const RETURN_DELAY: Duration = Duration::from_millis(100);

/// Waits at its base until the opponent shares its row, lunges to the cell on
/// the opponent's right, then returns to base.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatrolStrike {
    base_cell: CellCoord,
    at_base: bool,
}

impl PatrolStrike {
    /// Creates the variant remembering `base_cell` as home.
    #[must_use]
    pub const fn new(base_cell: CellCoord) -> Self {
        Self {
            base_cell,
            at_base: true,
        }
    }

    /// Cell the mover returns to after each lunge.
    #[must_use]
    pub const fn base_cell(&self) -> CellCoord {
        self.base_cell
    }

    /// Reports whether the mover has lunged and not yet returned.
    #[must_use]
    pub const fn is_advanced(&self) -> bool {
        !self.at_base
    }

    pub(crate) fn handle_movement(
        &mut self,
        world: &mut World,
        mover: EntityId,
        opponent: EntityId,
        timer: &mut MovementTimer,
        signals: &mut Vec<MovementSignal>,
        out_events: &mut Vec<Event>,
    ) {
        if !self.at_base {
            if relocate(world, mover, self.base_cell, out_events) {
                self.at_base = true;
                timer.reset();
            }
            return;
        }

        let (Some(me), Some(target)) = (query::entity(world, mover), query::entity(world, opponent))
        else {
            return;
        };
        if me.cell.row() != target.cell.row() {
            return;
        }

        let Some(strike_cell) = query::grid(world).relative(target.cell, Direction::Right) else {
            return;
        };
        let already_there = strike_cell.coord == me.cell;
        if !already_there && !query::grid(world).is_traversable(strike_cell.coord) {
            return;
        }
        if !relocate(world, mover, strike_cell.coord, out_events) {
            return;
        }

        debug!(entity = mover.get(), cell = ?strike_cell.coord, "lunged beside opponent");
        self.at_base = false;
        signals.push(MovementSignal::ReadyToAct);
        timer.reset_with(RETURN_DELAY);
    }
}
