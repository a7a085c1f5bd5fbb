use panel_battle_core::{Direction, EntityId, Event};
use panel_battle_world::{query, World};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};

use crate::{relocate, MovementTimer};

/// Random teleports taken before the mover flanks its opponent.
pub const STEPS_BEFORE_FLANK: u32 = 4;

/// Teleports to random cells on its own side, then appears in front of the
/// opponent.
#[derive(Clone, Debug)]
pub struct TeleportFlank {
    steps_taken: u32,
    rng: ChaCha8Rng,
}

impl TeleportFlank {
    /// Creates the variant with a deterministic random stream.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            steps_taken: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Random teleports taken since the last flank.
    #[must_use]
    pub const fn steps_taken(&self) -> u32 {
        self.steps_taken
    }

    pub(crate) fn handle_movement(
        &mut self,
        world: &mut World,
        mover: EntityId,
        opponent: EntityId,
        timer: &mut MovementTimer,
        out_events: &mut Vec<Event>,
    ) {
        let Some(me) = query::entity(world, mover) else {
            return;
        };

        if self.steps_taken < STEPS_BEFORE_FLANK {
            let own_side = query::grid(world).cells_on_side(me.side);
            if !own_side.is_empty() {
                let pick = own_side[self.rng.gen_range(0..own_side.len())].coord;
                if query::grid(world).is_traversable(pick) {
                    let _ = relocate(world, mover, pick, out_events);
                } else {
                    trace!(entity = mover.get(), cell = ?pick, "teleport target blocked");
                }
            }
            self.steps_taken += 1;
            timer.reset();
            return;
        }

        if let Some(target) = query::entity(world, opponent) {
            let grid = query::grid(world);
            let front = grid.relative(target.cell, Direction::Right);
            let candidates = [
                front,
                front.and_then(|cell| grid.relative(cell.coord, Direction::Down)),
                front.and_then(|cell| grid.relative(cell.coord, Direction::Up)),
            ];
            let destination = candidates
                .into_iter()
                .flatten()
                .find(|cell| cell.coord == me.cell || grid.is_traversable(cell.coord))
                .map(|cell| cell.coord);
            match destination {
                Some(cell) => {
                    debug!(entity = mover.get(), ?cell, "flanking opponent");
                    let _ = relocate(world, mover, cell, out_events);
                }
                None => trace!(entity = mover.get(), "no flank cell free; staying put"),
            }
        }

        self.steps_taken = 0;
        timer.reset();
    }
}

impl PartialEq for TeleportFlank {
    fn eq(&self, other: &Self) -> bool {
        self.steps_taken == other.steps_taken
            && self.rng.get_seed() == other.rng.get_seed()
            && self.rng.get_word_pos() == other.rng.get_word_pos()
    }
}
