use std::time::Duration;

/// Attack cooldown mirroring the movement timer's waiting/ready shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttackTimer {
    base: Duration,
    remaining: Duration,
    can_attack: bool,
}

impl AttackTimer {
    /// Creates a cooldown of `base` that starts fully charged down.
    #[must_use]
    pub const fn new(base: Duration) -> Self {
        Self {
            base,
            remaining: base,
            can_attack: false,
        }
    }

    /// Delay restored by [`AttackTimer::reset`].
    #[must_use]
    pub const fn base(&self) -> Duration {
        self.base
    }

    /// Delay left before an attack becomes possible.
    #[must_use]
    pub const fn remaining(&self) -> Duration {
        self.remaining
    }

    /// Reports whether the next attack may execute.
    #[must_use]
    pub const fn can_attack(&self) -> bool {
        self.can_attack
    }

    /// Counts down while the target is in range and reports readiness.
    pub fn poll(&mut self, dt: Duration, in_range: bool) -> bool {
        if in_range && !self.can_attack {
            self.remaining = self.remaining.saturating_sub(dt);
        }
        if self.remaining.is_zero() {
            self.can_attack = true;
        }
        self.can_attack
    }

    /// Restores the base delay and clears readiness.
    pub fn reset(&mut self) {
        self.remaining = self.base;
        self.can_attack = false;
    }
}
