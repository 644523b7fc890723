//! Enemy AI: detection, combat, movement, and the state machine that
//! coordinates them.
//!
//! [`EnemyAgent`] is the per-enemy composition root. Each simulation tick it
//! runs its units in a fixed order — detect, evaluate state, move, fire —
//! against a [`AgentServices`] bundle borrowed from the simulation. The
//! agent owns its own transform and health; everything else it reaches
//! through weak ids resolved per use.

pub mod combat;
pub mod detection;
pub mod movement;
pub mod state_machine;

use glam::Vec3;
use rand_chacha::ChaCha8Rng;

use crate::config::{CombatConfig, DetectionConfig, MovementConfig};
use crate::entity::{EntityId, EntityKind};
use crate::health::Health;
use crate::registry::Registry;
use crate::services::{Navigator, Occlusion};

pub use combat::{Combat, FireCommand};
pub use detection::Detection;
pub use movement::Movement;
pub use state_machine::{AiState, StateCommand, StateInputs, StateMachine, TargetSnapshot};

/// World services an agent borrows for one update.
pub struct AgentServices<'a> {
    /// Read-only view of the entity directory.
    pub registry: &'a Registry,
    /// Pathfinding capability.
    pub navigator: &'a mut dyn Navigator,
    /// Line-of-sight capability.
    pub occlusion: &'a dyn Occlusion,
    /// Simulation RNG, used for patrol pauses.
    pub rng: &'a mut ChaCha8Rng,
}

/// One AI-controlled enemy: transform, health, and the four AI units.
#[derive(Debug)]
pub struct EnemyAgent {
    id: EntityId,
    position: Vec3,
    heading: f32,
    home: Vec3,
    active: bool,
    health: Health,
    detection: Detection,
    combat: Combat,
    movement: Movement,
    state_machine: StateMachine,
}

impl EnemyAgent {
    /// Constructs an inactive agent from its tunables. [`EnemyAgent::spawn`]
    /// places it into the world.
    #[must_use]
    pub fn new(
        detection: DetectionConfig,
        combat: CombatConfig,
        movement: MovementConfig,
        max_health: i32,
    ) -> Self {
        let state_interval = movement.state_interval;
        Self {
            id: EntityId::new(0),
            position: Vec3::ZERO,
            heading: 0.0,
            home: Vec3::ZERO,
            active: false,
            health: Health::new(max_health),
            detection: Detection::new(detection, EntityKind::Player),
            combat: Combat::new(combat),
            movement: Movement::new(movement),
            state_machine: StateMachine::new(state_interval),
        }
    }

    /// Returns the agent's current entity id.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the agent's position.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Returns the agent's heading (yaw, radians).
    #[must_use]
    pub const fn heading(&self) -> f32 {
        self.heading
    }

    /// Returns the spawn/home position.
    #[must_use]
    pub const fn home(&self) -> Vec3 {
        self.home
    }

    /// Returns whether the agent is live in the world.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Returns the agent's health unit.
    #[must_use]
    pub const fn health(&self) -> &Health {
        &self.health
    }

    /// Mutable access to the health unit, for damage application.
    pub fn health_mut(&mut self) -> &mut Health {
        &mut self.health
    }

    /// Returns the current AI state tag.
    #[must_use]
    pub const fn state(&self) -> AiState {
        self.state_machine.state()
    }

    /// Returns the agent's detection unit.
    #[must_use]
    pub const fn detection(&self) -> &Detection {
        &self.detection
    }

    /// Returns whether the agent currently has an outstanding destination.
    #[must_use]
    pub const fn is_moving(&self) -> bool {
        self.movement.is_moving()
    }

    /// Places the agent into the world under a fresh id.
    ///
    /// The spawn point becomes home. All units start from their reset state,
    /// so a recycled agent carries nothing over from its previous loan.
    pub fn spawn(&mut self, id: EntityId, position: Vec3) {
        self.reset();
        self.id = id;
        self.position = position;
        self.home = position;
        self.heading = 0.0;
        self.active = true;
    }

    /// Marks the agent as out of the world. Precedes a pool release.
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Resets every unit to its idle state: full health, no target, no
    /// destination, cooldowns zeroed, state back to `Patrol`.
    pub fn reset(&mut self) {
        self.health.reset();
        self.detection.reset();
        self.combat.reset();
        self.movement.reset();
        self.state_machine.reset();
    }

    /// Runs one simulation tick: detect, evaluate state, move, fire.
    ///
    /// Returns a fire command when the combat unit shoots this tick; the
    /// caller owns projectile creation.
    pub fn update(&mut self, delta: f32, services: &mut AgentServices<'_>) -> Option<FireCommand> {
        if !self.active {
            return None;
        }
        let registry = services.registry;
        let occlusion = services.occlusion;

        self.detection
            .update(delta, self.position, registry, occlusion);

        // Weak-reference discipline: the stored target id is re-resolved
        // against the registry every tick before anything acts on it.
        let target = self
            .detection
            .target()
            .and_then(|id| registry.resolve_active(id));

        if self.state_machine.tick(delta) {
            let snapshot = target.map(|record| TargetSnapshot {
                position: record.position(),
                in_los: self
                    .detection
                    .has_line_of_sight(self.position, record.position(), occlusion),
            });
            let inputs = StateInputs {
                position: self.position,
                home: self.home,
                target: snapshot,
                patrol_enabled: self.movement.config().patrol_enabled,
                ready_for_patrol: self.movement.ready_for_patrol(),
                detection_range: self.detection.config().detection_range,
                attack_range: self.combat.config().attack_range,
                home_threshold: self.movement.config().home_threshold,
            };
            for command in self.state_machine.evaluate(&inputs) {
                self.execute(command, services.navigator);
            }
        }

        let arrived =
            self.movement
                .update(services.navigator, delta, &mut self.position, &mut self.heading);
        if arrived && self.state_machine.state() == AiState::Patrol {
            // Pause before the next wander leg instead of looping restlessly.
            self.movement.schedule_patrol_delay(services.rng);
        }

        self.combat
            .update(delta, self.position, target, &self.detection, occlusion)
    }

    fn execute(&mut self, command: StateCommand, navigator: &mut dyn Navigator) {
        match command {
            StateCommand::StartPatrolLeg => {
                let radius = self.movement.config().patrol_radius;
                if let Some(point) = navigator.sample_reachable_point(self.home, radius) {
                    self.movement.move_to(navigator, self.position, point, 0.0);
                }
            }
            StateCommand::MoveTo {
                destination,
                stop_distance,
            } => {
                self.movement
                    .move_to(navigator, self.position, destination, stop_distance);
            }
            StateCommand::Stop => self.movement.stop(),
            StateCommand::LookAt(point) => self.movement.look_at(point),
            StateCommand::StopLookAt => self.movement.stop_look_at(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::entity::Team;
    use crate::registry::Registration;
    use crate::services::{DirectNavigator, OpenField};
    use rand::SeedableRng;

    fn agent() -> EnemyAgent {
        let config = SimConfig::default();
        let mut agent = EnemyAgent::new(
            config.detection,
            config.combat,
            config.movement,
            config.health.enemy_max,
        );
        agent.spawn(EntityId::new(100), Vec3::ZERO);
        agent
    }

    fn world() -> (Registry, DirectNavigator, OpenField, ChaCha8Rng) {
        (
            Registry::new(),
            DirectNavigator::new(7),
            OpenField,
            ChaCha8Rng::seed_from_u64(7),
        )
    }

    fn run(agent: &mut EnemyAgent, world: &mut (Registry, DirectNavigator, OpenField, ChaCha8Rng), seconds: f32) -> Vec<FireCommand> {
        let steps = (seconds / 0.05).round() as usize;
        let mut shots = Vec::new();
        for _ in 0..steps {
            let mut services = AgentServices {
                registry: &world.0,
                navigator: &mut world.1,
                occlusion: &world.2,
                rng: &mut world.3,
            };
            if let Some(shot) = agent.update(0.05, &mut services) {
                shots.push(shot);
            }
        }
        shots
    }

    #[test]
    fn spawn_sets_home_and_activates() {
        let mut agent = agent();
        agent.spawn(EntityId::new(5), Vec3::new(3.0, 1.0, 3.0));
        assert_eq!(agent.id(), EntityId::new(5));
        assert_eq!(agent.home(), Vec3::new(3.0, 1.0, 3.0));
        assert!(agent.is_active());
        assert_eq!(agent.state(), AiState::Patrol);
    }

    #[test]
    fn idle_agent_wanders_near_home() {
        let mut agent = agent();
        let mut world = world();
        run(&mut agent, &mut world, 5.0);
        // The agent should have started at least one patrol leg by now.
        let moved = agent.position() != Vec3::ZERO || agent.is_moving();
        assert!(moved);
        // Patrol points are sampled within the patrol radius of home.
        assert!(agent.position().distance(agent.home()) <= 10.0 + 0.001);
    }

    #[test]
    fn hostile_in_range_triggers_a_chase() {
        let mut agent = agent();
        let mut world = world();
        world.0.register(
            Registration::new(EntityId::new(1), EntityKind::Player, Team::Players, "player")
                .at(Vec3::new(12.0, 0.0, 0.0)),
        );
        run(&mut agent, &mut world, 1.0);
        let state = agent.state();
        assert!(
            state == AiState::Chasing || state == AiState::Attacking,
            "agent ignored a hostile in range: {state:?}"
        );
    }

    #[test]
    fn chase_closes_to_attack_range_and_fires() {
        let mut agent = agent();
        let mut world = world();
        // Close enough that even a patrol wander before the first search
        // cannot carry the agent out of detection range.
        world.0.register(
            Registration::new(EntityId::new(1), EntityKind::Player, Team::Players, "player")
                .at(Vec3::new(12.0, 0.0, 0.0)),
        );
        let shots = run(&mut agent, &mut world, 10.0);
        assert_eq!(agent.state(), AiState::Attacking);
        assert!(!shots.is_empty());
        // Shots fly horizontally, roughly toward the target.
        assert_eq!(shots[0].direction.y, 0.0);
        assert!(shots[0].direction.x > 0.9);
    }

    #[test]
    fn losing_the_target_sends_the_agent_home() {
        // Patrol disabled so the agent holds still before and after the
        // engagement; transient states stay observable.
        let config = SimConfig::default();
        let mut movement = config.movement;
        movement.patrol_enabled = false;
        let mut agent = EnemyAgent::new(
            config.detection,
            config.combat,
            movement,
            config.health.enemy_max,
        );
        agent.spawn(EntityId::new(100), Vec3::ZERO);

        let mut world = world();
        world.0.register(
            Registration::new(EntityId::new(1), EntityKind::Player, Team::Players, "player")
                .at(Vec3::new(12.0, 0.0, 0.0)),
        );
        run(&mut agent, &mut world, 2.0);
        let engaged = agent.state();
        assert!(
            engaged == AiState::Chasing || engaged == AiState::Attacking,
            "agent never engaged: {engaged:?}"
        );

        world.0.unregister(EntityId::new(1));
        run(&mut agent, &mut world, 5.0);
        assert_eq!(agent.state(), AiState::Patrol);
        assert!(agent.position().distance(agent.home()) <= 2.0 + 0.001);
    }

    #[test]
    fn inactive_agent_does_nothing() {
        let mut agent = agent();
        agent.deactivate();
        let mut world = world();
        let shots = run(&mut agent, &mut world, 2.0);
        assert!(shots.is_empty());
        assert_eq!(agent.position(), Vec3::ZERO);
    }

    #[test]
    fn reset_clears_all_unit_state() {
        let mut agent = agent();
        let mut world = world();
        world.0.register(
            Registration::new(EntityId::new(1), EntityKind::Player, Team::Players, "player")
                .at(Vec3::new(5.0, 0.0, 0.0)),
        );
        run(&mut agent, &mut world, 2.0);
        agent.health_mut().apply_damage(40);

        agent.reset();
        assert_eq!(agent.state(), AiState::Patrol);
        assert!(agent.detection().target().is_none());
        assert!(!agent.is_moving());
        assert_eq!(agent.health().current(), agent.health().max());
    }
}
