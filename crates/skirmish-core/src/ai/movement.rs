//! Locomotion bookkeeping for an AI agent.
//!
//! `Movement` tracks the agent's outstanding destination, look-at target, and
//! patrol pause. It steps the agent's position through the [`Navigator`]
//! every frame and reports arrival; it never changes AI state itself —
//! arrival only flips local "is moving" bookkeeping, which the state machine
//! reads at its own cadence.

use glam::Vec3;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::config::MovementConfig;
use crate::services::Navigator;

/// Rotates `current` yaw toward `desired` by at most `max_step` radians,
/// taking the short way around.
fn rotate_toward(current: f32, desired: f32, max_step: f32) -> f32 {
    let diff = (desired - current + std::f32::consts::PI).rem_euclid(std::f32::consts::TAU)
        - std::f32::consts::PI;
    current + diff.clamp(-max_step, max_step)
}

/// Yaw pointing from `from` toward `to` on the XZ plane, or `None` when the
/// two points share a column.
fn yaw_toward(from: Vec3, to: Vec3) -> Option<f32> {
    let dx = to.x - from.x;
    let dz = to.z - from.z;
    if dx == 0.0 && dz == 0.0 {
        None
    } else {
        Some(dx.atan2(dz))
    }
}

/// Per-agent movement unit.
#[derive(Debug)]
pub struct Movement {
    config: MovementConfig,
    destination: Option<Vec3>,
    stop_distance: f32,
    look_target: Option<Vec3>,
    patrol_delay: Option<f32>,
}

impl Movement {
    /// Creates an idle movement unit.
    #[must_use]
    pub const fn new(config: MovementConfig) -> Self {
        Self {
            config,
            destination: None,
            stop_distance: 0.0,
            look_target: None,
            patrol_delay: None,
        }
    }

    /// Returns the movement tunables.
    #[must_use]
    pub const fn config(&self) -> &MovementConfig {
        &self.config
    }

    /// Returns whether a destination is outstanding.
    #[must_use]
    pub const fn is_moving(&self) -> bool {
        self.destination.is_some()
    }

    /// Returns whether the agent is idle and its patrol pause has elapsed.
    #[must_use]
    pub const fn ready_for_patrol(&self) -> bool {
        self.destination.is_none() && self.patrol_delay.is_none()
    }

    /// Requests travel to `destination`, stopping within `stop_distance` of
    /// it. Returns false (and stays idle) if the navigator rejects the path.
    pub fn move_to(
        &mut self,
        navigator: &mut dyn Navigator,
        from: Vec3,
        destination: Vec3,
        stop_distance: f32,
    ) -> bool {
        if !navigator.request_path(from, destination) {
            return false;
        }
        self.destination = Some(destination);
        self.stop_distance = stop_distance;
        true
    }

    /// Cancels any outstanding destination.
    pub fn stop(&mut self) {
        self.destination = None;
        self.stop_distance = 0.0;
    }

    /// Faces the agent toward `point` until cleared.
    pub fn look_at(&mut self, point: Vec3) {
        self.look_target = Some(point);
    }

    /// Clears the look-at target; the agent faces its travel direction again.
    pub fn stop_look_at(&mut self) {
        self.look_target = None;
    }

    /// Starts the randomized pause before the next patrol leg.
    pub fn schedule_patrol_delay(&mut self, rng: &mut ChaCha8Rng) {
        let min = self.config.patrol_delay_min;
        let max = self.config.patrol_delay_max.max(min);
        let delay = if max > min { rng.gen_range(min..max) } else { min };
        self.patrol_delay = Some(delay);
    }

    /// Advances one frame: steps toward the destination, turns toward the
    /// look target (or travel direction), and ticks the patrol pause.
    ///
    /// Returns true on the frame the destination is reached.
    pub fn update(
        &mut self,
        navigator: &mut dyn Navigator,
        delta: f32,
        position: &mut Vec3,
        heading: &mut f32,
    ) -> bool {
        if let Some(remaining) = self.patrol_delay {
            let remaining = remaining - delta;
            self.patrol_delay = (remaining > 0.0).then_some(remaining);
        }

        let mut arrived = false;
        if let Some(destination) = self.destination {
            let step = self.config.move_speed * delta;
            *position = navigator.advance(*position, destination, step);
            let threshold = self.config.arrive_threshold.max(self.stop_distance);
            if position.distance(destination) <= threshold {
                self.stop();
                arrived = true;
            }
        }

        let face = self.look_target.or(self.destination);
        if let Some(desired) = face.and_then(|point| yaw_toward(*position, point)) {
            *heading = rotate_toward(*heading, desired, self.config.look_at_speed * delta);
        }

        arrived
    }

    /// Clears all transient state ahead of a pool release.
    pub fn reset(&mut self) {
        self.destination = None;
        self.stop_distance = 0.0;
        self.look_target = None;
        self.patrol_delay = None;
    }
}
