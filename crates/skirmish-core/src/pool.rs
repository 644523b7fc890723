//! Type-keyed object pool and factory.
//!
//! Transient entities (enemies, projectiles) are recycled instead of
//! rebuilt: [`Factory::create`] hands out an idle instance when one exists,
//! constructing from the kind's [`Blueprint`] otherwise, and
//! [`Factory::release`] takes deactivated instances back.
//!
//! Two rules keep loans sound:
//!
//! - Every loan carries a fresh [`EntityId`], so an id retained from a
//!   previous loan can never alias the recycled instance.
//! - An instance is either active-and-in-the-world or idle-in-the-pool,
//!   never both. Releasing an active instance, or one already idle, is a
//!   hard [`PoolError`].

use std::collections::HashMap;

use glam::Vec3;
use tracing::{debug, trace};

use crate::ai::EnemyAgent;
use crate::config::{CombatConfig, DetectionConfig, MovementConfig, ProjectileConfig, SimConfig};
use crate::entity::{EntityId, ObjectKind, Team};
use crate::error::{PoolError, SpawnError};
use crate::projectile::Projectile;

/// Construction template for one object kind.
///
/// The factory mapping is static configuration: a kind with no blueprint is
/// a [`SpawnError::MissingBlueprint`] at the call site, never a silent
/// substitution.
#[derive(Debug, Clone)]
pub enum Blueprint {
    /// Template for a pooled AI enemy.
    Enemy {
        /// Detection tunables.
        detection: DetectionConfig,
        /// Combat tunables.
        combat: CombatConfig,
        /// Movement tunables.
        movement: MovementConfig,
        /// Starting health.
        max_health: i32,
    },
    /// Template for a pooled projectile.
    Projectile {
        /// Flight tunables.
        config: ProjectileConfig,
        /// Team the projectile damages.
        target_team: Team,
    },
}

/// An instance on loan from (or idle in) the pool.
#[derive(Debug)]
pub enum PooledObject {
    /// An AI enemy.
    Enemy(Box<EnemyAgent>),
    /// A projectile.
    Projectile(Box<Projectile>),
}

impl PooledObject {
    /// Id from the instance's current (or most recent) loan.
    #[must_use]
    pub fn id(&self) -> EntityId {
        match self {
            Self::Enemy(agent) => agent.id(),
            Self::Projectile(projectile) => projectile.id(),
        }
    }

    /// Whether the instance is live in the world.
    #[must_use]
    pub fn is_active(&self) -> bool {
        match self {
            Self::Enemy(agent) => agent.is_active(),
            Self::Projectile(projectile) => projectile.is_active(),
        }
    }

    fn reset(&mut self) {
        match self {
            Self::Enemy(agent) => agent.reset(),
            Self::Projectile(projectile) => projectile.reset(),
        }
    }
}

/// Factory plus per-kind idle pools.
///
/// Also the simulation's id allocator: every entity id, pooled or not,
/// comes from [`Factory::allocate_id`] so ids stay unique process-wide.
#[derive(Debug, Default)]
pub struct Factory {
    blueprints: HashMap<ObjectKind, Blueprint>,
    idle: HashMap<ObjectKind, Vec<PooledObject>>,
    next_id: u64,
}

impl Factory {
    /// Creates a factory with no blueprints configured.
    #[must_use]
    pub fn new() -> Self {
        Self {
            blueprints: HashMap::new(),
            idle: HashMap::new(),
            next_id: 0,
        }
    }

    /// Creates a factory with the standard blueprints derived from `config`.
    #[must_use]
    pub fn from_config(config: &SimConfig) -> Self {
        let mut factory = Self::new();
        factory.set_blueprint(
            ObjectKind::BasicEnemy,
            Blueprint::Enemy {
                detection: config.detection.clone(),
                combat: config.combat.clone(),
                movement: config.movement.clone(),
                max_health: config.health.enemy_max,
            },
        );
        factory.set_blueprint(
            ObjectKind::BasicProjectile,
            Blueprint::Projectile {
                config: config.projectile.clone(),
                target_team: Team::Players,
            },
        );
        factory
    }

    /// Installs or replaces the blueprint for a kind.
    pub fn set_blueprint(&mut self, kind: ObjectKind, blueprint: Blueprint) {
        self.blueprints.insert(kind, blueprint);
    }

    /// Hands out the next unique entity id.
    pub fn allocate_id(&mut self) -> EntityId {
        self.next_id += 1;
        EntityId::new(self.next_id)
    }

    /// Number of idle instances pooled for a kind.
    #[must_use]
    pub fn idle_count(&self, kind: ObjectKind) -> usize {
        self.idle.get(&kind).map_or(0, Vec::len)
    }

    /// Produces a ready-to-use instance of `kind` at `position`, facing
    /// `heading`, under a fresh id.
    ///
    /// Reuses an idle instance when one exists; otherwise constructs from
    /// the blueprint. Instances come out fully reset either way.
    pub fn create(
        &mut self,
        kind: ObjectKind,
        position: Vec3,
        heading: f32,
    ) -> Result<PooledObject, SpawnError> {
        let recycled = self.idle.get_mut(&kind).and_then(Vec::pop);
        let mut object = match recycled {
            Some(object) => {
                trace!(%kind, "reusing pooled instance");
                object
            }
            None => self.construct(kind)?,
        };

        let id = self.allocate_id();
        match &mut object {
            PooledObject::Enemy(agent) => agent.spawn(id, position),
            PooledObject::Projectile(projectile) => {
                let direction = Vec3::new(heading.sin(), 0.0, heading.cos());
                projectile.launch(id, position, direction);
            }
        }
        debug!(%id, %kind, "created instance");
        Ok(object)
    }

    fn construct(&self, kind: ObjectKind) -> Result<PooledObject, SpawnError> {
        let Some(blueprint) = self.blueprints.get(&kind) else {
            return Err(SpawnError::MissingBlueprint(kind));
        };
        Ok(match blueprint.clone() {
            Blueprint::Enemy {
                detection,
                combat,
                movement,
                max_health,
            } => PooledObject::Enemy(Box::new(EnemyAgent::new(
                detection, combat, movement, max_health,
            ))),
            Blueprint::Projectile {
                config,
                target_team,
            } => PooledObject::Projectile(Box::new(Projectile::new(config, target_team))),
        })
    }

    /// Returns an instance to the idle pool for `kind`.
    ///
    /// The instance must already be deactivated by its owning components;
    /// an active instance, or an id already idle in the bucket, is rejected.
    pub fn release(&mut self, kind: ObjectKind, mut object: PooledObject) -> Result<(), PoolError> {
        let id = object.id();
        if object.is_active() {
            return Err(PoolError::StillActive { id });
        }
        let bucket = self.idle.entry(kind).or_default();
        if bucket.iter().any(|idle| idle.id() == id) {
            return Err(PoolError::AlreadyPooled { id, kind });
        }
        object.reset();
        trace!(%id, %kind, "released instance");
        bucket.push(object);
        Ok(())
    }
}
