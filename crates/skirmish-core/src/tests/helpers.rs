//! Test helper functions for setting up simulation worlds.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use glam::Vec3;

use crate::ai::AiState;
use crate::config::SimConfig;
use crate::entity::EntityKind;
use crate::services::Occlusion;
use crate::sim::Simulation;

/// Routes tracing output through the test harness. Safe to call from every
/// test; only the first call installs a subscriber.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Tunables for the standard close-quarters scenario: detection range 10,
/// attack range 3, patrol disabled so the enemy holds still until it sees
/// something.
pub fn scenario_config() -> SimConfig {
    let mut config = SimConfig::default();
    config.detection.detection_range = 10.0;
    config.combat.attack_range = 3.0;
    config.movement.patrol_enabled = false;
    config
}

/// Steps a simulation in 50 ms ticks for roughly `seconds`.
pub fn run(sim: &mut Simulation, seconds: f32) {
    let steps = (seconds / 0.05).round() as usize;
    for _ in 0..steps {
        sim.step(0.05);
    }
}

/// Steps until the enemy reaches `state`, up to `timeout` seconds.
///
/// Panics with the actual state when the timeout expires, so a failed
/// transition names where the machine got stuck.
pub fn run_until_state(
    sim: &mut Simulation,
    enemy: crate::entity::EntityId,
    state: AiState,
    timeout: f32,
) {
    let steps = (timeout / 0.05).round() as usize;
    for _ in 0..steps {
        if sim.enemy_state(enemy) == Some(state) {
            return;
        }
        sim.step(0.05);
    }
    panic!(
        "enemy never reached {state:?}; stuck in {:?}",
        sim.enemy_state(enemy)
    );
}

/// Occlusion service whose blocking can be flipped mid-test.
#[derive(Debug, Clone)]
pub struct ToggleWall {
    blocked: Arc<AtomicBool>,
}

impl ToggleWall {
    /// Creates an initially-clear wall plus the handle that controls it.
    pub fn new() -> (Self, Arc<AtomicBool>) {
        let blocked = Arc::new(AtomicBool::new(false));
        (
            Self {
                blocked: Arc::clone(&blocked),
            },
            blocked,
        )
    }
}

impl Occlusion for ToggleWall {
    fn blocked(&self, _from: Vec3, _to: Vec3) -> bool {
        self.blocked.load(Ordering::Relaxed)
    }
}

/// Collapses a world into a comparable snapshot: every registered record's
/// id, kind partition, and position, in deterministic order.
pub fn world_fingerprint(sim: &Simulation) -> Vec<(u64, [f32; 3])> {
    let mut fingerprint = Vec::new();
    for kind in EntityKind::ALL {
        for record in sim.registry().records_by_kind(kind) {
            fingerprint.push((record.id().as_u64(), record.position().to_array()));
        }
    }
    fingerprint
}
