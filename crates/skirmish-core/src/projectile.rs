//! Straight-flying projectile lifecycle.
//!
//! Projectiles are pooled entities. Each tick they probe ahead for
//! obstacles, advance along a fixed horizontal direction, and test for
//! contact against registry records on the target team. The projectile
//! never applies damage itself; it reports a [`ProjectileOutcome`] and the
//! simulation root routes the hit to the victim's health unit.

use glam::Vec3;
use tracing::trace;

use crate::config::ProjectileConfig;
use crate::entity::{EntityId, Team};
use crate::registry::Registry;
use crate::services::Occlusion;

/// What one projectile tick produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileOutcome {
    /// Still airborne.
    InFlight,
    /// Contacted an entity on the target team. Despawn and apply damage.
    Hit {
        /// The entity that was struck.
        target: EntityId,
        /// Damage to apply.
        damage: i32,
    },
    /// Flew into occluding geometry. Despawn without damage.
    Obstructed,
    /// Lifetime elapsed without contact. Despawn without damage.
    Expired,
}

/// One pooled projectile instance.
#[derive(Debug)]
pub struct Projectile {
    config: ProjectileConfig,
    target_team: Team,
    id: EntityId,
    position: Vec3,
    direction: Vec3,
    age: f32,
    active: bool,
}

impl Projectile {
    /// Constructs an inactive projectile. [`Projectile::launch`] puts it in
    /// flight.
    #[must_use]
    pub const fn new(config: ProjectileConfig, target_team: Team) -> Self {
        Self {
            config,
            target_team,
            id: EntityId::new(0),
            position: Vec3::ZERO,
            direction: Vec3::ZERO,
            age: 0.0,
            active: false,
        }
    }

    /// Returns the projectile's current entity id.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the current position.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Returns whether the projectile is in flight.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Puts the projectile in flight under a fresh id.
    ///
    /// `direction` is flattened onto the XZ plane and normalized; a
    /// degenerate direction leaves the projectile inactive.
    pub fn launch(&mut self, id: EntityId, origin: Vec3, direction: Vec3) {
        self.reset();
        let flat = Vec3::new(direction.x, 0.0, direction.z);
        if flat.length_squared() == 0.0 {
            return;
        }
        self.id = id;
        self.position = origin;
        self.direction = flat.normalize();
        self.active = true;
    }

    /// Takes the projectile out of flight. Precedes a pool release.
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Clears flight state ahead of a pool release.
    pub fn reset(&mut self) {
        self.position = Vec3::ZERO;
        self.direction = Vec3::ZERO;
        self.age = 0.0;
        self.active = false;
    }

    /// Advances one tick: expire, probe, move, then test for contact.
    pub fn update(
        &mut self,
        delta: f32,
        registry: &Registry,
        occlusion: &dyn Occlusion,
    ) -> ProjectileOutcome {
        if !self.active {
            return ProjectileOutcome::Expired;
        }

        self.age += delta;
        if self.age >= self.config.lifetime {
            trace!(id = %self.id, "projectile expired");
            return ProjectileOutcome::Expired;
        }

        // Probe ahead before moving so a wall inside this tick's travel is
        // caught rather than tunneled through.
        let step = self.config.speed * delta;
        let probe = self.config.probe_distance.max(step);
        if occlusion.blocked(self.position, self.position + self.direction * probe) {
            trace!(id = %self.id, "projectile obstructed");
            return ProjectileOutcome::Obstructed;
        }

        self.position += self.direction * step;

        let victims = registry.find_in_radius(
            self.position,
            self.config.hit_radius,
            None,
            Some(self.target_team),
        );
        if let Some(victim) = victims.first() {
            trace!(id = %self.id, target = %victim.id(), "projectile hit");
            return ProjectileOutcome::Hit {
                target: victim.id(),
                damage: self.config.damage,
            };
        }

        ProjectileOutcome::InFlight
    }
}
