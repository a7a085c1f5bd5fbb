//! Recurring per-panel effects.

use std::time::Duration;

use panel_battle_core::{EffectKind, PanelDefinition};

/// Whether an effect currently does anything.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectPhase {
    /// Bound to a plain panel, or expired.
    Inactive,
    /// Applies every tick.
    Active,
}

/// Result of advancing an effect by one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectTick {
    /// Nothing to apply this tick.
    Idle,
    /// Apply this magnitude to the cell's occupant, if there is one.
    Apply(u32),
    /// The expiry condition fired; the effect is now inactive.
    Expired,
}

/// Effect bound to one cell for as long as the cell keeps its panel type.
///
/// Magnitudes are applied whole, once per tick, so timing stays replayable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PanelEffect {
    kind: EffectKind,
    magnitude: u32,
    remaining: Option<Duration>,
    phase: EffectPhase,
}

impl PanelEffect {
    /// Binds the effect described by a panel definition.
    #[must_use]
    pub fn bind(definition: &PanelDefinition) -> Self {
        let phase = if definition.effect == EffectKind::None {
            EffectPhase::Inactive
        } else {
            EffectPhase::Active
        };
        Self {
            kind: definition.effect,
            magnitude: definition.magnitude,
            remaining: definition.effect_duration(),
            phase,
        }
    }

    /// Kind of effect.
    #[must_use]
    pub const fn kind(&self) -> EffectKind {
        self.kind
    }

    /// Magnitude applied per tick.
    #[must_use]
    pub const fn magnitude(&self) -> u32 {
        self.magnitude
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> EffectPhase {
        self.phase
    }

    /// Reports whether the effect is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.phase == EffectPhase::Active
    }

    /// Time left before expiry, if the effect expires at all.
    #[must_use]
    pub const fn remaining(&self) -> Option<Duration> {
        self.remaining
    }

    /// Advances the effect by one tick.
    pub fn advance(&mut self, dt: Duration) -> EffectTick {
        if self.phase == EffectPhase::Inactive {
            return EffectTick::Idle;
        }

        if let Some(remaining) = self.remaining {
            if remaining.is_zero() {
                self.phase = EffectPhase::Inactive;
                return EffectTick::Expired;
            }
            self.remaining = Some(remaining.saturating_sub(dt));
        }

        match self.kind {
            EffectKind::Poison if self.magnitude > 0 => EffectTick::Apply(self.magnitude),
            EffectKind::Poison | EffectKind::Cracked | EffectKind::None => EffectTick::Idle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: Duration = Duration::from_millis(100);

    #[test]
    fn plain_panels_bind_inactive() {
        let mut effect = PanelEffect::bind(&PanelDefinition::normal());
        assert_eq!(effect.phase(), EffectPhase::Inactive);
        assert_eq!(effect.advance(TICK), EffectTick::Idle);
    }

    #[test]
    fn poison_applies_full_magnitude_every_tick() {
        let mut effect = PanelEffect::bind(&PanelDefinition::poison(3));
        for _ in 0..5 {
            assert_eq!(effect.advance(TICK), EffectTick::Apply(3));
        }
        assert!(effect.is_active());
    }

    #[test]
    fn short_ticks_do_not_accumulate_fractions() {
        let mut effect = PanelEffect::bind(&PanelDefinition::poison(2));
        assert_eq!(effect.advance(Duration::from_millis(1)), EffectTick::Apply(2));
        assert_eq!(effect.advance(Duration::from_secs(5)), EffectTick::Apply(2));
    }

    #[test]
    fn expiry_deactivates_after_duration() {
        let mut definition = PanelDefinition::poison(1);
        definition.effect_duration_ms = Some(300);
        let mut effect = PanelEffect::bind(&definition);

        for _ in 0..3 {
            assert_eq!(effect.advance(TICK), EffectTick::Apply(1));
        }
        assert_eq!(effect.advance(TICK), EffectTick::Expired);
        assert_eq!(effect.phase(), EffectPhase::Inactive);
        assert_eq!(effect.advance(TICK), EffectTick::Idle);
    }

    #[test]
    fn cracked_panels_stay_active_without_damage() {
        let mut effect = PanelEffect::bind(&PanelDefinition::cracked());
        assert_eq!(effect.advance(TICK), EffectTick::Idle);
        assert!(effect.is_active());
        assert_eq!(effect.magnitude(), 0);
        assert_eq!(effect.remaining(), None);
    }
}
