//! Target acquisition for an AI agent.
//!
//! `Detection` polls the registry on its own interval for the closest
//! hostile within range, then gates the candidate through a line-of-sight
//! check. It stores only the target's id; consumers re-resolve through the
//! registry before every use, so a target destroyed by another subsystem
//! reads as absent rather than dangling.

use glam::Vec3;
use tracing::trace;

use crate::config::{DetectionConfig, LosPolicy};
use crate::entity::{EntityId, EntityKind};
use crate::registry::Registry;
use crate::services::Occlusion;

/// Per-agent detection unit.
#[derive(Debug)]
pub struct Detection {
    config: DetectionConfig,
    hostile_kind: EntityKind,
    timer: f32,
    current_target: Option<EntityId>,
}

impl Detection {
    /// Creates a detection unit hunting entities of `hostile_kind`.
    #[must_use]
    pub const fn new(config: DetectionConfig, hostile_kind: EntityKind) -> Self {
        Self {
            config,
            hostile_kind,
            timer: 0.0,
            current_target: None,
        }
    }

    /// Returns the detection tunables.
    #[must_use]
    pub const fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Returns the current target id, if any.
    ///
    /// This is a weak reference: resolve it through
    /// [`Registry::resolve_active`] before acting on it.
    #[must_use]
    pub const fn target(&self) -> Option<EntityId> {
        self.current_target
    }

    /// Accumulates time and re-acquires when the search interval elapses.
    pub fn update(
        &mut self,
        delta: f32,
        position: Vec3,
        registry: &Registry,
        occlusion: &dyn Occlusion,
    ) {
        self.timer += delta;
        if self.timer < self.config.search_interval {
            return;
        }
        self.timer = 0.0;
        self.acquire(position, registry, occlusion);
    }

    /// Runs one target acquisition pass immediately.
    pub fn acquire(&mut self, position: Vec3, registry: &Registry, occlusion: &dyn Occlusion) {
        if self.config.detection_range <= 0.0 {
            self.current_target = None;
            return;
        }

        let candidate =
            registry.find_closest(self.hostile_kind, position, self.config.detection_range);
        let Some(record) = candidate else {
            self.current_target = None;
            return;
        };

        if self.has_line_of_sight(position, record.position(), occlusion) {
            if self.current_target != Some(record.id()) {
                trace!(target = %record.id(), "acquired target");
            }
            self.current_target = Some(record.id());
        } else {
            match self.config.los_policy {
                LosPolicy::DropImmediately => self.current_target = None,
                // Keep the previous target while the candidate is occluded;
                // it will still fail resolution if it despawns.
                LosPolicy::Retain => {}
            }
        }
    }

    /// Tests the line of sight from this agent's eye point to a point above
    /// `target_position`.
    #[must_use]
    pub fn has_line_of_sight(
        &self,
        position: Vec3,
        target_position: Vec3,
        occlusion: &dyn Occlusion,
    ) -> bool {
        let eye = position + Vec3::new(0.0, self.config.eye_height, 0.0);
        let aim = target_position + Vec3::new(0.0, self.config.target_eye_height, 0.0);
        !occlusion.blocked(eye, aim)
    }

    /// Clears the target and timer ahead of a pool release.
    pub fn reset(&mut self) {
        self.timer = 0.0;
        self.current_target = None;
    }
}
