use std::time::Duration;

use tracing::trace;

/// Phase of a delay-gated action cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MovementPhase {
    /// Counting the remaining delay down.
    Waiting,
    /// Delay elapsed; the next decision runs on the current or a later tick.
    Ready,
    /// A decision is running during this tick.
    Acting,
}

/// Countdown shared by every movement variant.
///
/// The remaining delay only shrinks while waiting, and `Ready` is entered once
/// per full countdown. A decision that cannot find a destination defers back
/// to `Ready`, so it is retried on the next tick without waiting again.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MovementTimer {
    base: Duration,
    remaining: Duration,
    phase: MovementPhase,
}

impl MovementTimer {
    /// Creates a timer that waits `base` before every decision.
    #[must_use]
    pub const fn new(base: Duration) -> Self {
        Self::with_initial_delay(base, base)
    }

    /// Creates a timer whose first countdown is `initial` instead of `base`.
    #[must_use]
    pub const fn with_initial_delay(base: Duration, initial: Duration) -> Self {
        Self {
            base,
            remaining: initial,
            phase: MovementPhase::Waiting,
        }
    }

    /// Delay restored by [`MovementTimer::reset`].
    #[must_use]
    pub const fn base(&self) -> Duration {
        self.base
    }

    /// Delay left before the timer becomes ready.
    #[must_use]
    pub const fn remaining(&self) -> Duration {
        self.remaining
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> MovementPhase {
        self.phase
    }

    /// Reports whether a decision may run.
    #[must_use]
    pub fn can_act(&self) -> bool {
        self.phase == MovementPhase::Ready
    }

    /// Counts down by `dt` and reports whether a decision may run this tick.
    pub fn advance(&mut self, dt: Duration) -> bool {
        if self.phase == MovementPhase::Waiting {
            self.remaining = self.remaining.saturating_sub(dt);
            if self.remaining.is_zero() {
                trace!("movement timer ready");
                self.phase = MovementPhase::Ready;
            }
        }
        self.can_act()
    }

    /// Marks the start of a decision.
    pub fn begin_action(&mut self) {
        if self.phase == MovementPhase::Ready {
            self.phase = MovementPhase::Acting;
        }
    }

    /// Abandons the running decision; it is retried on the next tick.
    pub fn defer(&mut self) {
        if self.phase == MovementPhase::Acting {
            self.phase = MovementPhase::Ready;
        }
    }

    /// Restores the base delay and clears readiness.
    pub fn reset(&mut self) {
        self.reset_with(self.base);
    }

    /// Starts a countdown of `delay` instead of the base delay.
    pub fn reset_with(&mut self, delay: Duration) {
        self.remaining = delay;
        self.phase = MovementPhase::Waiting;
    }
}
