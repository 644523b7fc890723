//! Simulation tunables.
//!
//! Every cadence, range, and threshold in the core is configured here rather
//! than hard-coded in the subsystems. All structs deserialize with serde so a
//! server can load a full [`SimConfig`] from JSON; `Default` values match the
//! shipped game balance.

use crate::entity::ObjectKind;
use serde::{Deserialize, Serialize};

/// Top-level configuration for one simulation instance.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Registry maintenance cadence.
    pub registry: RegistryConfig,
    /// Enemy target acquisition.
    pub detection: DetectionConfig,
    /// Enemy fire cadence and ranges.
    pub combat: CombatConfig,
    /// Enemy movement and patrol behavior.
    pub movement: MovementConfig,
    /// Projectile flight and damage.
    pub projectile: ProjectileConfig,
    /// Enemy wave spawner.
    pub spawner: SpawnerConfig,
    /// Starting health for players and enemies.
    pub health: HealthConfig,
}

/// Registry maintenance cadence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Seconds between maintenance passes (position refresh + invalid sweep).
    ///
    /// This bounds record staleness: an active record's cached position is
    /// never older than one interval, and a record whose entity was destroyed
    /// out-of-band survives at most one interval.
    pub maintenance_interval: f32,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            maintenance_interval: 0.1,
        }
    }
}

/// Policy applied when the closest candidate target is occluded.
///
/// Flagged as a tunable rather than hard-coded: dropping on a single blocked
/// ray makes enemies forgetful around corners, retaining makes them clingy.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LosPolicy {
    /// Clear the current target the moment line of sight is blocked.
    DropImmediately,
    /// Keep the previous target (without refreshing it) while occluded.
    Retain,
}

/// Enemy target acquisition tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Maximum acquisition distance. Zero disables acquisition entirely.
    pub detection_range: f32,
    /// Seconds between target searches.
    pub search_interval: f32,
    /// Height of the observer's eye above its position.
    pub eye_height: f32,
    /// Height of the aim point above the target's position.
    pub target_eye_height: f32,
    /// What to do when the candidate target is occluded.
    pub los_policy: LosPolicy,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            detection_range: 15.0,
            search_interval: 0.5,
            eye_height: 1.5,
            target_eye_height: 1.8,
            los_policy: LosPolicy::DropImmediately,
        }
    }
}

/// Enemy fire cadence and ranges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Seconds between shots.
    pub fire_interval: f32,
    /// Maximum firing distance.
    pub attack_range: f32,
    /// Projectile requested from the factory on each shot.
    pub projectile_kind: ObjectKind,
    /// Forward offset of the projectile spawn point.
    pub muzzle_offset: f32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            fire_interval: 3.0,
            attack_range: 10.0,
            projectile_kind: ObjectKind::BasicProjectile,
            muzzle_offset: 1.5,
        }
    }
}

/// Enemy movement and patrol tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Travel speed in units per second.
    pub move_speed: f32,
    /// Turn rate multiplier when facing a look-at target.
    pub look_at_speed: f32,
    /// Distance below which a destination counts as reached.
    pub arrive_threshold: f32,
    /// Seconds between state machine evaluations.
    pub state_interval: f32,
    /// Whether idle enemies wander at all.
    pub patrol_enabled: bool,
    /// Radius around home within which patrol points are sampled.
    pub patrol_radius: f32,
    /// Minimum pause after reaching a patrol point.
    pub patrol_delay_min: f32,
    /// Maximum pause after reaching a patrol point.
    pub patrol_delay_max: f32,
    /// Home distance below which Returning hands back to Patrol.
    pub home_threshold: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            move_speed: 3.0,
            look_at_speed: 5.0,
            arrive_threshold: 0.5,
            state_interval: 0.1,
            patrol_enabled: true,
            patrol_radius: 10.0,
            patrol_delay_min: 1.0,
            patrol_delay_max: 3.0,
            home_threshold: 2.0,
        }
    }
}

/// Projectile flight and damage tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    /// Flight speed in units per second.
    pub speed: f32,
    /// Damage applied on hit.
    pub damage: i32,
    /// Seconds before an airborne projectile expires.
    pub lifetime: f32,
    /// Distance within which a projectile connects with a target.
    pub hit_radius: f32,
    /// Forward raycast distance for the obstacle probe.
    pub probe_distance: f32,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            speed: 10.0,
            damage: 10,
            lifetime: 5.0,
            hit_radius: 0.5,
            probe_distance: 2.0,
        }
    }
}

/// Enemy wave spawner tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerConfig {
    /// Object kind spawned each wave.
    pub kind: ObjectKind,
    /// Seconds between spawn attempts.
    pub interval: f32,
    /// Half-extents of the rectangular spawn area on the XZ plane.
    pub area: [f32; 2],
    /// Spawn height.
    pub spawn_height: f32,
    /// Maximum simultaneously live spawned enemies.
    pub max_active: usize,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            kind: ObjectKind::BasicEnemy,
            interval: 5.0,
            area: [10.0, 10.0],
            spawn_height: 1.0,
            max_active: 10,
        }
    }
}

/// Starting health values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Player maximum health.
    pub player_max: i32,
    /// Enemy maximum health.
    pub enemy_max: i32,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            player_max: 100,
            enemy_max: 100,
        }
    }
}
