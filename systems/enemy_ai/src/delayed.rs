use std::time::Duration;

/// Remaining wait before a delayed action fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Countdown {
    /// Fires after this many further ticks.
    Ticks(u32),
    /// Fires once this much simulated time has elapsed.
    Time(Duration),
}

/// Work scheduled by the patrol-and-strike attack sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PendingAction {
    /// Flash the opponent's current cell as a warning.
    Telegraph,
    /// Decide between damage and cracking the terrain.
    Resolve,
}

/// A pending action counting down to its execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DelayedAction {
    countdown: Countdown,
    action: PendingAction,
}

impl DelayedAction {
    /// Schedules `action` to fire once `countdown` elapses.
    #[must_use]
    pub const fn new(countdown: Countdown, action: PendingAction) -> Self {
        Self { countdown, action }
    }

    /// Action that fires when the countdown elapses.
    #[must_use]
    pub const fn action(&self) -> PendingAction {
        self.action
    }

    /// Consumes one tick of `dt` and reports whether the action fires.
    pub(crate) fn advance(&mut self, dt: Duration) -> bool {
        self.countdown = match self.countdown {
            Countdown::Ticks(ticks) => Countdown::Ticks(ticks.saturating_sub(1)),
            Countdown::Time(remaining) => Countdown::Time(remaining.saturating_sub(dt)),
        };
        match self.countdown {
            Countdown::Ticks(ticks) => ticks == 0,
            Countdown::Time(remaining) => remaining.is_zero(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: Duration = Duration::from_millis(100);

    #[test]
    fn tick_countdown_ignores_tick_length() {
        let mut action = DelayedAction::new(Countdown::Ticks(2), PendingAction::Telegraph);
        assert!(!action.advance(Duration::from_secs(10)));
        assert!(action.advance(Duration::ZERO));
    }

    #[test]
    fn time_countdown_fires_once_elapsed() {
        let mut action =
            DelayedAction::new(Countdown::Time(Duration::from_millis(250)), PendingAction::Resolve);
        assert!(!action.advance(TICK));
        assert!(!action.advance(TICK));
        assert!(action.advance(TICK));
    }
}
