//! Per-entity health unit.
//!
//! `Health` owns the current/max pair and the death latch; it knows nothing
//! about the registry or the world. The simulation root applies the returned
//! [`DamageOutcome`] — reporting the new value to the registry, stamping
//! death annotations, scheduling despawn — so the unit itself stays a pure
//! value type.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Result of applying damage to a [`Health`] unit.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DamageOutcome {
    /// The entity absorbed the hit and remains alive.
    Survived,
    /// This hit reduced health to zero. Reported exactly once; the death
    /// latch swallows further hits.
    Died,
    /// The entity was already dead; the hit had no effect.
    AlreadyDead,
}

/// Hit points with a one-shot death latch.
///
/// Once dead, a unit ignores all further damage until [`Health::reset`] is
/// called. Pooled entities reset on every loan, so a recycled enemy always
/// starts at full health.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    current: i32,
    max: i32,
    dead: bool,
}

impl Health {
    /// Creates a unit at full health.
    ///
    /// `max` is clamped to at least 1 so a misconfigured entity is born
    /// alive rather than instantly dead.
    #[must_use]
    pub fn new(max: i32) -> Self {
        let max = max.max(1);
        Self {
            current: max,
            max,
            dead: false,
        }
    }

    /// Returns current health. Never negative.
    #[must_use]
    pub const fn current(&self) -> i32 {
        self.current
    }

    /// Returns maximum health.
    #[must_use]
    pub const fn max(&self) -> i32 {
        self.max
    }

    /// Returns current health as a fraction of maximum, in `0.0..=1.0`.
    #[must_use]
    pub fn fraction(&self) -> f32 {
        self.current as f32 / self.max as f32
    }

    /// Returns whether the death latch has fired.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.dead
    }

    /// Applies `amount` damage and reports the outcome.
    ///
    /// Negative amounts are treated as zero; healing goes through
    /// [`Health::heal`].
    pub fn apply_damage(&mut self, amount: i32) -> DamageOutcome {
        if self.dead {
            return DamageOutcome::AlreadyDead;
        }
        let amount = amount.max(0);
        self.current = (self.current - amount).max(0);
        debug!(current = self.current, max = self.max, "applied {amount} damage");
        if self.current == 0 {
            self.dead = true;
            DamageOutcome::Died
        } else {
            DamageOutcome::Survived
        }
    }

    /// Restores `amount` health, capped at maximum. Dead units stay dead;
    /// bringing one back goes through [`Health::revive`].
    pub fn heal(&mut self, amount: i32) {
        if self.dead {
            return;
        }
        self.current = (self.current + amount.max(0)).min(self.max);
    }

    /// Clears the death latch and raises health from zero to `amount`,
    /// clamped to `1..=max`. No-op on a living unit; healing the living
    /// goes through [`Health::heal`].
    pub fn revive(&mut self, amount: i32) {
        if !self.dead {
            return;
        }
        self.dead = false;
        self.current = amount.clamp(1, self.max);
        debug!(current = self.current, max = self.max, "revived");
    }

    /// Restores full health and clears the death latch.
    pub fn reset(&mut self) {
        self.current = self.max;
        self.dead = false;
    }
}
