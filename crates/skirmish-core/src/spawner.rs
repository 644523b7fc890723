//! Enemy wave spawner.
//!
//! Emits a spawn position on a fixed interval while the number of its live
//! spawns is under the cap. The spawner tracks its spawns by id and prunes
//! against the registry each tick, so enemies killed (or swept) free up
//! capacity automatically.

use glam::Vec3;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::trace;

use crate::config::SpawnerConfig;
use crate::entity::{EntityId, ObjectKind};
use crate::registry::Registry;

/// One spawn point with an interval timer and a live-spawn cap.
#[derive(Debug)]
pub struct Spawner {
    config: SpawnerConfig,
    origin: Vec3,
    timer: f32,
    live: Vec<EntityId>,
}

impl Spawner {
    /// Creates a spawner centered on `origin`.
    #[must_use]
    pub const fn new(config: SpawnerConfig, origin: Vec3) -> Self {
        Self {
            config,
            origin,
            timer: 0.0,
            live: Vec::new(),
        }
    }

    /// Object kind this spawner produces.
    #[must_use]
    pub const fn kind(&self) -> ObjectKind {
        self.config.kind
    }

    /// Number of this spawner's enemies still registered.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Ticks the spawner. Returns a spawn position when a spawn is due and
    /// capacity allows; an interval that fires at the cap is skipped, not
    /// deferred.
    pub fn update(
        &mut self,
        delta: f32,
        registry: &Registry,
        rng: &mut ChaCha8Rng,
    ) -> Option<Vec3> {
        self.live.retain(|id| registry.contains(*id));

        self.timer += delta;
        if self.timer < self.config.interval {
            return None;
        }
        self.timer = 0.0;

        if self.live.len() >= self.config.max_active {
            trace!(cap = self.config.max_active, "spawner at capacity");
            return None;
        }

        // `area` holds half-extents: sampling spans the full `-w..=w` box.
        let [width, depth] = self.config.area;
        let x = rng.gen_range(-width..=width);
        let z = rng.gen_range(-depth..=depth);
        Some(Vec3::new(
            self.origin.x + x,
            self.config.spawn_height,
            self.origin.z + z,
        ))
    }

    /// Records a spawn produced for this spawner's last emitted position.
    pub fn record_spawn(&mut self, id: EntityId) {
        self.live.push(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityKind, Team};
    use crate::registry::Registration;
    use rand::SeedableRng;

    fn spawner() -> Spawner {
        Spawner::new(SpawnerConfig::default(), Vec3::ZERO)
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(11)
    }

    #[test]
    fn nothing_spawns_before_the_interval() {
        let mut spawner = spawner();
        let registry = Registry::new();
        let mut rng = rng();
        // Default interval is 5 s.
        assert!(spawner.update(4.9, &registry, &mut rng).is_none());
        assert!(spawner.update(0.2, &registry, &mut rng).is_some());
    }

    #[test]
    fn spawn_positions_span_the_half_extent_box() {
        let mut spawner = spawner();
        let registry = Registry::new();
        let mut rng = rng();
        // Default area is [10, 10], giving a 20x20 box around the origin.
        let mut widest = 0.0f32;
        for _ in 0..50 {
            let position = spawner.update(5.1, &registry, &mut rng).unwrap();
            assert!(position.x.abs() <= 10.0);
            assert!(position.z.abs() <= 10.0);
            assert_eq!(position.y, 1.0);
            widest = widest.max(position.x.abs()).max(position.z.abs());
        }
        // The extents are half-widths, not full widths: samples reach
        // beyond a [-5, 5] box.
        assert!(widest > 5.0, "samples never left the inner box ({widest})");
    }

    #[test]
    fn cap_blocks_spawning_until_a_spawn_dies() {
        let config = SpawnerConfig {
            max_active: 1,
            ..SpawnerConfig::default()
        };
        let mut spawner = Spawner::new(config, Vec3::ZERO);
        let mut registry = Registry::new();
        let mut rng = rng();

        assert!(spawner.update(5.1, &registry, &mut rng).is_some());
        registry.register(Registration::new(
            EntityId::new(1),
            EntityKind::Enemy,
            Team::Enemies,
            "enemy",
        ));
        spawner.record_spawn(EntityId::new(1));

        // At cap: the due interval is skipped.
        assert!(spawner.update(5.1, &registry, &mut rng).is_none());

        // The spawn dies; capacity frees up on the next tick.
        registry.unregister(EntityId::new(1));
        assert!(spawner.update(5.1, &registry, &mut rng).is_some());
        assert_eq!(spawner.live_count(), 0);
    }

    #[test]
    fn pruning_drops_swept_ids() {
        let mut spawner = spawner();
        let registry = Registry::new();
        let mut rng = rng();
        // Recorded id was never registered (or already swept).
        spawner.record_spawn(EntityId::new(42));
        spawner.update(0.1, &registry, &mut rng);
        assert_eq!(spawner.live_count(), 0);
    }
}
