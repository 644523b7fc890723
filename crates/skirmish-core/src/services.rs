//! External capability seams: navigation and occlusion.
//!
//! The AI core consumes pathfinding and line-of-sight as opaque services.
//! Nothing in this crate implements a navigation mesh or a physics raycast;
//! the traits here define exactly what the core needs, and the host embeds
//! its real implementations behind them.
//!
//! Two reference implementations ship with the crate — [`DirectNavigator`]
//! (straight-line movement over an unobstructed plane) and [`OpenField`]
//! (nothing ever occludes). They back the test suite and make the core
//! runnable stand-alone.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Pathfinding capability consumed by enemy movement.
///
/// The core issues destination requests and steps along the returned route;
/// it never blocks waiting for arrival and never inspects the path itself.
pub trait Navigator: Send {
    /// Validates a destination. A rejected destination leaves the agent idle.
    fn request_path(&mut self, from: Vec3, to: Vec3) -> bool;

    /// Samples a random reachable point within `radius` of `origin`.
    ///
    /// Returns `None` when no reachable point exists (e.g. origin is off the
    /// navigable surface).
    fn sample_reachable_point(&mut self, origin: Vec3, radius: f32) -> Option<Vec3>;

    /// Advances an agent from `from` toward `to` by at most `max_step`,
    /// returning the new position along the route.
    fn advance(&mut self, from: Vec3, to: Vec3, max_step: f32) -> Vec3;
}

/// Line-of-sight capability consumed by detection and projectiles.
pub trait Occlusion: Send {
    /// Returns true when occluding geometry blocks the segment `from..to`.
    fn blocked(&self, from: Vec3, to: Vec3) -> bool;
}

/// Straight-line navigator over an unobstructed plane.
///
/// Accepts every path, samples points uniformly in a horizontal disc, and
/// advances in a straight line. Sampling is driven by a seeded RNG so runs
/// are reproducible.
#[derive(Debug)]
pub struct DirectNavigator {
    rng: ChaCha8Rng,
}

impl DirectNavigator {
    /// Creates a navigator with the given sampling seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Navigator for DirectNavigator {
    fn request_path(&mut self, _from: Vec3, _to: Vec3) -> bool {
        true
    }

    fn sample_reachable_point(&mut self, origin: Vec3, radius: f32) -> Option<Vec3> {
        if radius <= 0.0 {
            return None;
        }
        let angle = self.rng.gen_range(0.0..std::f32::consts::TAU);
        // sqrt keeps the distribution uniform over the disc area.
        let distance = radius * self.rng.gen::<f32>().sqrt();
        Some(origin + Vec3::new(angle.cos() * distance, 0.0, angle.sin() * distance))
    }

    fn advance(&mut self, from: Vec3, to: Vec3, max_step: f32) -> Vec3 {
        let delta = to - from;
        let distance = delta.length();
        if distance <= max_step {
            to
        } else {
            from + delta / distance * max_step
        }
    }
}

/// Occlusion service for a world with no occluding geometry.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenField;

impl Occlusion for OpenField {
    fn blocked(&self, _from: Vec3, _to: Vec3) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_navigator_accepts_all_paths() {
        let mut nav = DirectNavigator::new(1);
        assert!(nav.request_path(Vec3::ZERO, Vec3::new(100.0, 0.0, 100.0)));
    }

    #[test]
    fn sample_stays_within_radius() {
        let mut nav = DirectNavigator::new(7);
        let origin = Vec3::new(5.0, 1.0, -3.0);
        for _ in 0..100 {
            let point = nav.sample_reachable_point(origin, 10.0).unwrap();
            assert!(origin.distance(point) <= 10.0 + 1e-4);
            // Sampling is horizontal; height is preserved.
            assert_eq!(point.y, origin.y);
        }
    }

    #[test]
    fn sample_rejects_zero_radius() {
        let mut nav = DirectNavigator::new(7);
        assert!(nav.sample_reachable_point(Vec3::ZERO, 0.0).is_none());
    }

    #[test]
    fn sampling_is_deterministic_per_seed() {
        let mut a = DirectNavigator::new(42);
        let mut b = DirectNavigator::new(42);
        for _ in 0..10 {
            assert_eq!(
                a.sample_reachable_point(Vec3::ZERO, 5.0),
                b.sample_reachable_point(Vec3::ZERO, 5.0)
            );
        }
    }

    #[test]
    fn advance_clamps_to_destination() {
        let mut nav = DirectNavigator::new(1);
        let to = Vec3::new(1.0, 0.0, 0.0);
        assert_eq!(nav.advance(Vec3::ZERO, to, 10.0), to);
    }

    #[test]
    fn advance_steps_along_the_segment() {
        let mut nav = DirectNavigator::new(1);
        let next = nav.advance(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), 1.0);
        assert!((next - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn open_field_never_blocks() {
        let field = OpenField;
        assert!(!field.blocked(Vec3::ZERO, Vec3::new(0.0, 0.0, 1000.0)));
    }
}
