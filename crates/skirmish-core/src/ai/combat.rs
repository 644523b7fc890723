//! Fire-control for an AI agent.
//!
//! `Combat` owns the shot cooldown and the attack gate. It never spawns
//! anything itself: a successful attack check yields a [`FireCommand`] that
//! the simulation root hands to the factory, so a missing projectile
//! blueprint degrades into a skipped attack instead of a failure inside the
//! agent.

use glam::Vec3;
use tracing::trace;

use crate::ai::detection::Detection;
use crate::config::CombatConfig;
use crate::entity::ObjectKind;
use crate::registry::EntityRecord;
use crate::services::Occlusion;

/// Request to spawn one projectile, emitted when an agent fires.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FireCommand {
    /// Projectile blueprint to request from the factory.
    pub kind: ObjectKind,
    /// Muzzle position the projectile starts from.
    pub origin: Vec3,
    /// Normalized horizontal flight direction.
    pub direction: Vec3,
}

/// Per-agent combat unit.
#[derive(Debug)]
pub struct Combat {
    config: CombatConfig,
    cooldown: f32,
}

impl Combat {
    /// Creates a combat unit with its cooldown spent, so the first valid
    /// shot waits one full interval.
    #[must_use]
    pub const fn new(config: CombatConfig) -> Self {
        Self {
            config,
            cooldown: 0.0,
        }
    }

    /// Returns the combat tunables.
    #[must_use]
    pub const fn config(&self) -> &CombatConfig {
        &self.config
    }

    /// Checks whether a shot at `target` is currently legal: the target must
    /// be active, within attack range, and in line of sight.
    ///
    /// Cooldown is not part of this check; it gates [`Combat::update`].
    #[must_use]
    pub fn can_attack(
        &self,
        position: Vec3,
        target: Option<&EntityRecord>,
        detection: &Detection,
        occlusion: &dyn Occlusion,
    ) -> bool {
        let Some(target) = target else {
            return false;
        };
        target.is_active()
            && target.distance_to(position) <= self.config.attack_range
            && detection.has_line_of_sight(position, target.position(), occlusion)
    }

    /// Accumulates cooldown and fires when it elapses with a legal shot.
    ///
    /// An elapsed cooldown with no legal shot stays elapsed: the agent fires
    /// on the first frame the target becomes attackable, not an interval
    /// later.
    pub fn update(
        &mut self,
        delta: f32,
        position: Vec3,
        target: Option<&EntityRecord>,
        detection: &Detection,
        occlusion: &dyn Occlusion,
    ) -> Option<FireCommand> {
        self.cooldown += delta;
        if self.cooldown < self.config.fire_interval {
            return None;
        }
        if !self.can_attack(position, target, detection, occlusion) {
            return None;
        }
        self.cooldown = 0.0;

        let target = target?;
        let direction = Self::horizontal_direction(position, target.position())?;
        trace!(target = %target.id(), "firing");
        Some(FireCommand {
            kind: self.config.projectile_kind,
            origin: position + direction * self.config.muzzle_offset,
            direction,
        })
    }

    /// Flattens the bearing to the target onto the XZ plane and normalizes.
    /// Returns `None` for a target directly above or below the shooter.
    fn horizontal_direction(from: Vec3, to: Vec3) -> Option<Vec3> {
        let flat = Vec3::new(to.x - from.x, 0.0, to.z - from.z);
        (flat.length_squared() > 0.0).then(|| flat.normalize())
    }

    /// Zeroes the cooldown ahead of a pool release.
    pub fn reset(&mut self) {
        self.cooldown = 0.0;
    }
}
