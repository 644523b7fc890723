//! Simulation root: owns the registry, the factory, and every live entity.
//!
//! One `Simulation` instance is one authoritative game world. All registry
//! mutation, AI updates, and pool traffic happen on the thread that calls
//! [`Simulation::step`]; "concurrency" is the cooperative interleaving of
//! many per-entity state machines inside one tick, never parallel mutation.
//!
//! Tick order: registry maintenance (on its own coarser interval), then
//! spawner, enemy agents, projectile spawns from this tick's shots, and
//! projectile flight and hits. Running maintenance first means entities
//! deactivated on the previous tick drop out of queries before any agent
//! searches again. A failure inside one entity's update degrades that
//! entity only; it never aborts the tick for the others.

use std::collections::BTreeMap;

use glam::Vec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use crate::ai::{AgentServices, AiState, EnemyAgent, FireCommand};
use crate::config::SimConfig;
use crate::entity::{EntityId, EntityKind, ObjectKind, Team};
use crate::error::SpawnError;
use crate::health::{DamageOutcome, Health};
use crate::pool::{Factory, PooledObject};
use crate::projectile::{Projectile, ProjectileOutcome};
use crate::registry::{
    AnnotationValue, HandleResolver, LiveState, Registration, Registry, RegistryEvent,
};
use crate::services::{DirectNavigator, Navigator, Occlusion, OpenField};
use crate::spawner::Spawner;

/// Server-side state for one connected player's avatar.
///
/// Position and heading are pushed in from the session layer; this core
/// only simulates what happens to the avatar, not how it moves.
#[derive(Debug)]
pub struct PlayerState {
    position: Vec3,
    heading: f32,
    active: bool,
    health: Health,
}

impl PlayerState {
    /// Returns the avatar's position.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Returns whether the avatar is alive and enabled.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Returns the avatar's health unit.
    #[must_use]
    pub const fn health(&self) -> &Health {
        &self.health
    }
}

/// Liveness view over the simulation's entity maps, handed to the registry
/// during maintenance.
struct WorldHandles<'a> {
    players: &'a BTreeMap<EntityId, PlayerState>,
    enemies: &'a BTreeMap<EntityId, EnemyAgent>,
    projectiles: &'a BTreeMap<EntityId, Projectile>,
}

impl HandleResolver for WorldHandles<'_> {
    fn resolve(&self, id: EntityId) -> Option<LiveState> {
        if let Some(player) = self.players.get(&id) {
            return Some(LiveState {
                position: player.position,
                heading: player.heading,
                active: player.active,
            });
        }
        if let Some(agent) = self.enemies.get(&id) {
            return Some(LiveState {
                position: agent.position(),
                heading: agent.heading(),
                active: agent.is_active(),
            });
        }
        if let Some(projectile) = self.projectiles.get(&id) {
            return Some(LiveState {
                position: projectile.position(),
                heading: 0.0,
                active: projectile.is_active(),
            });
        }
        None
    }
}

/// One authoritative game world.
pub struct Simulation {
    config: SimConfig,
    registry: Registry,
    factory: Factory,
    navigator: Box<dyn Navigator>,
    occlusion: Box<dyn Occlusion>,
    rng: ChaCha8Rng,
    players: BTreeMap<EntityId, PlayerState>,
    enemies: BTreeMap<EntityId, EnemyAgent>,
    projectiles: BTreeMap<EntityId, Projectile>,
    spawner: Option<Spawner>,
    clock: f64,
    maintenance_timer: f32,
}

impl Simulation {
    /// Creates a world with the built-in flat-plane services, fully
    /// deterministic for a given `seed` and input sequence.
    #[must_use]
    pub fn new(config: SimConfig, seed: u64) -> Self {
        let navigator = Box::new(DirectNavigator::new(seed.wrapping_add(1)));
        Self::with_services(config, seed, navigator, Box::new(OpenField))
    }

    /// Creates a world with host-supplied navigation and occlusion services.
    #[must_use]
    pub fn with_services(
        config: SimConfig,
        seed: u64,
        navigator: Box<dyn Navigator>,
        occlusion: Box<dyn Occlusion>,
    ) -> Self {
        let factory = Factory::from_config(&config);
        Self {
            config,
            registry: Registry::new(),
            factory,
            navigator,
            occlusion,
            rng: ChaCha8Rng::seed_from_u64(seed),
            players: BTreeMap::new(),
            enemies: BTreeMap::new(),
            projectiles: BTreeMap::new(),
            spawner: None,
            clock: 0.0,
            maintenance_timer: 0.0,
        }
    }

    /// Read access to the entity directory.
    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Simulation-clock seconds since the world was created.
    #[must_use]
    pub const fn clock(&self) -> f64 {
        self.clock
    }

    /// Drains lifecycle events for the external replication layer.
    pub fn drain_events(&mut self) -> Vec<RegistryEvent> {
        self.registry.drain_events()
    }

    /// Installs the configured wave spawner centered on `origin`.
    pub fn install_spawner(&mut self, origin: Vec3) {
        self.spawner = Some(Spawner::new(self.config.spawner.clone(), origin));
    }

    // -------------------------------------------------------------------------
    // Players
    // -------------------------------------------------------------------------

    /// Adds a player avatar and registers it.
    pub fn add_player(&mut self, name: impl Into<String>, position: Vec3) -> EntityId {
        let id = self.factory.allocate_id();
        let max = self.config.health.player_max;
        let name = name.into();
        self.players.insert(
            id,
            PlayerState {
                position,
                heading: 0.0,
                active: true,
                health: Health::new(max),
            },
        );
        self.registry.register(
            Registration::new(id, EntityKind::Player, Team::Players, name)
                .at(position)
                .with_health(max, max),
        );
        info!(%id, "player joined");
        id
    }

    /// Removes a player avatar and unregisters it.
    pub fn remove_player(&mut self, id: EntityId) {
        if self.players.remove(&id).is_some() {
            self.registry.unregister(id);
            info!(%id, "player left");
        }
    }

    /// Pushes an avatar's transform in from the session layer.
    pub fn set_player_transform(&mut self, id: EntityId, position: Vec3, heading: f32) {
        if let Some(player) = self.players.get_mut(&id) {
            player.position = position;
            player.heading = heading;
        }
    }

    /// Returns a player's server-side state.
    #[must_use]
    pub fn player(&self, id: EntityId) -> Option<&PlayerState> {
        self.players.get(&id)
    }

    // -------------------------------------------------------------------------
    // Enemies and projectiles
    // -------------------------------------------------------------------------

    /// Spawns an enemy of the standard kind at `position`.
    pub fn spawn_enemy(&mut self, position: Vec3) -> Result<EntityId, SpawnError> {
        self.spawn_pooled(ObjectKind::BasicEnemy, position, 0.0)
    }

    /// Returns an enemy agent by id.
    #[must_use]
    pub fn enemy(&self, id: EntityId) -> Option<&EnemyAgent> {
        self.enemies.get(&id)
    }

    /// Returns an enemy's current AI state tag.
    #[must_use]
    pub fn enemy_state(&self, id: EntityId) -> Option<AiState> {
        self.enemies.get(&id).map(EnemyAgent::state)
    }

    /// Number of projectiles currently in flight.
    #[must_use]
    pub fn projectile_count(&self) -> usize {
        self.projectiles.len()
    }

    fn spawn_pooled(
        &mut self,
        kind: ObjectKind,
        position: Vec3,
        heading: f32,
    ) -> Result<EntityId, SpawnError> {
        let object = self.factory.create(kind, position, heading)?;
        let id = object.id();
        match object {
            PooledObject::Enemy(agent) => {
                self.registry.register(
                    Registration::new(id, EntityKind::Enemy, Team::Enemies, kind.to_string())
                        .at(position)
                        .with_health(agent.health().current(), agent.health().max())
                        .with_detection_range(agent.detection().config().detection_range),
                );
                self.enemies.insert(id, *agent);
            }
            PooledObject::Projectile(projectile) => {
                if !projectile.is_active() {
                    // Degenerate launch direction; put the instance straight
                    // back and report the failed spawn.
                    if let Err(error) = self
                        .factory
                        .release(kind, PooledObject::Projectile(projectile))
                    {
                        warn!(%kind, %error, "failed launch release rejected");
                    }
                    return Err(SpawnError::BlueprintMismatch(kind));
                }
                self.registry.register(
                    Registration::new(id, EntityKind::Projectile, Team::Neutral, kind.to_string())
                        .at(position),
                );
                self.projectiles.insert(id, *projectile);
            }
        }
        Ok(id)
    }

    /// Applies damage to any entity with a health unit.
    ///
    /// Updates the registry snapshot, and on death stamps the standard
    /// annotations ("isDead", "deathTime") before despawning enemies or
    /// deactivating players.
    pub fn apply_damage(&mut self, id: EntityId, amount: i32) {
        let outcome = if let Some(player) = self.players.get_mut(&id) {
            let outcome = player.health.apply_damage(amount);
            self.registry
                .update_health(id, player.health.current(), None);
            outcome
        } else if let Some(agent) = self.enemies.get_mut(&id) {
            let outcome = agent.health_mut().apply_damage(amount);
            self.registry
                .update_health(id, agent.health().current(), None);
            outcome
        } else {
            return;
        };

        if outcome == DamageOutcome::Died {
            self.on_death(id);
        }
    }

    /// Revives a dead player at `health` points.
    ///
    /// Reactivates the avatar, reports the restored health to the registry,
    /// and clears the "isDead" annotation. No-op for unknown ids and for
    /// players who are still alive.
    pub fn revive_player(&mut self, id: EntityId, health: i32) {
        let Some(player) = self.players.get_mut(&id) else {
            return;
        };
        if !player.health.is_dead() {
            return;
        }
        player.health.revive(health);
        player.active = true;
        let current = player.health.current();
        self.registry.update_health(id, current, None);
        self.registry
            .set_annotation(id, "isDead", AnnotationValue::Bool(false));
        info!(%id, health = current, "player revived");
    }

    fn on_death(&mut self, id: EntityId) {
        info!(%id, "entity died");
        self.registry
            .set_annotation(id, "isDead", AnnotationValue::Bool(true));
        self.registry
            .set_annotation(id, "deathTime", AnnotationValue::Timestamp(self.clock));

        if let Some(player) = self.players.get_mut(&id) {
            // Dead avatars stay registered (for respawn flows) but inactive.
            player.active = false;
        } else if self.enemies.contains_key(&id) {
            self.despawn_enemy(id);
        }
    }

    fn despawn_enemy(&mut self, id: EntityId) {
        let Some(mut agent) = self.enemies.remove(&id) else {
            return;
        };
        self.registry.unregister(id);
        agent.deactivate();
        if let Err(error) = self
            .factory
            .release(ObjectKind::BasicEnemy, PooledObject::Enemy(Box::new(agent)))
        {
            warn!(%id, %error, "enemy release rejected");
        }
    }

    fn despawn_projectile(&mut self, id: EntityId) {
        let Some(mut projectile) = self.projectiles.remove(&id) else {
            return;
        };
        self.registry.unregister(id);
        projectile.deactivate();
        if let Err(error) = self.factory.release(
            ObjectKind::BasicProjectile,
            PooledObject::Projectile(Box::new(projectile)),
        ) {
            warn!(%id, %error, "projectile release rejected");
        }
    }

    // -------------------------------------------------------------------------
    // Tick
    // -------------------------------------------------------------------------

    /// Advances the world by `delta` seconds.
    pub fn step(&mut self, delta: f32) {
        self.clock += f64::from(delta);

        self.step_maintenance(delta);
        self.step_spawner(delta);
        let shots = self.step_enemies(delta);
        self.fire_shots(&shots);
        self.step_projectiles(delta);
    }

    fn step_spawner(&mut self, delta: f32) {
        let Some(spawner) = &mut self.spawner else {
            return;
        };
        let Some(position) = spawner.update(delta, &self.registry, &mut self.rng) else {
            return;
        };
        let kind = spawner.kind();
        match self.spawn_pooled(kind, position, 0.0) {
            Ok(id) => {
                if let Some(spawner) = &mut self.spawner {
                    spawner.record_spawn(id);
                }
            }
            // Configuration gap: skip this wave, keep simulating.
            Err(error) => warn!(%kind, %error, "wave spawn failed"),
        }
    }

    fn step_enemies(&mut self, delta: f32) -> Vec<FireCommand> {
        let mut services = AgentServices {
            registry: &self.registry,
            navigator: self.navigator.as_mut(),
            occlusion: self.occlusion.as_ref(),
            rng: &mut self.rng,
        };
        let mut shots = Vec::new();
        for agent in self.enemies.values_mut() {
            if let Some(shot) = agent.update(delta, &mut services) {
                shots.push(shot);
            }
        }
        shots
    }

    fn fire_shots(&mut self, shots: &[FireCommand]) {
        for shot in shots {
            let heading = shot.direction.x.atan2(shot.direction.z);
            if let Err(error) = self.spawn_pooled(shot.kind, shot.origin, heading) {
                // Missing projectile blueprint degrades into a skipped
                // attack; the shooter keeps running.
                warn!(kind = %shot.kind, %error, "attack skipped");
            }
        }
    }

    fn step_projectiles(&mut self, delta: f32) {
        let mut finished = Vec::new();
        for (id, projectile) in &mut self.projectiles {
            let outcome = projectile.update(delta, &self.registry, self.occlusion.as_ref());
            if outcome != ProjectileOutcome::InFlight {
                finished.push((*id, outcome));
            }
        }
        for (id, outcome) in finished {
            if let ProjectileOutcome::Hit { target, damage } = outcome {
                self.apply_damage(target, damage);
            }
            self.despawn_projectile(id);
        }
    }

    fn step_maintenance(&mut self, delta: f32) {
        self.maintenance_timer += delta;
        if self.maintenance_timer < self.config.registry.maintenance_interval {
            return;
        }
        self.maintenance_timer = 0.0;
        let handles = WorldHandles {
            players: &self.players,
            enemies: &self.enemies,
            projectiles: &self.projectiles,
        };
        self.registry.maintain(&handles, self.clock);
    }
}
