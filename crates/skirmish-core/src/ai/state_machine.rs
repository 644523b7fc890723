//! The patrol/chase/attack/return state machine.
//!
//! The machine is a pure transition table: it consumes a [`StateInputs`]
//! snapshot, mutates its state tag, and emits [`StateCommand`]s for the
//! owning agent to execute. It holds no references into the world, which
//! keeps every transition unit-testable without a registry or navigator.
//!
//! Evaluation runs at a fixed cadence (the state interval), not every frame;
//! between evaluations the agent keeps executing its last commands.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// State tag for an AI agent.
///
/// Initial state is `Patrol`. There is no terminal state; destruction ends
/// the machine externally.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AiState {
    /// Wandering near home, looking for targets.
    Patrol,
    /// Closing on an acquired target.
    Chasing,
    /// In range and firing.
    Attacking,
    /// Walking back to the home position.
    Returning,
}

/// Snapshot of a detected target, pre-resolved by the owning agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetSnapshot {
    /// Target's last-known position.
    pub position: Vec3,
    /// Whether line of sight to the target currently holds.
    pub in_los: bool,
}

/// Everything one evaluation reads. Built fresh by the agent each pass so
/// the machine never sees stale references.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateInputs {
    /// Agent's current position.
    pub position: Vec3,
    /// Agent's spawn/home position.
    pub home: Vec3,
    /// Resolved current target, absent if lost or destroyed.
    pub target: Option<TargetSnapshot>,
    /// Whether the agent may wander while idle.
    pub patrol_enabled: bool,
    /// Whether the agent is idle with its patrol pause elapsed.
    pub ready_for_patrol: bool,
    /// Acquisition radius; a chased target past this is lost.
    pub detection_range: f32,
    /// Firing radius; also the chase stopping distance.
    pub attack_range: f32,
    /// Home distance below which Returning hands back to Patrol.
    pub home_threshold: f32,
}

/// Side effect requested by a transition, executed by the owning agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StateCommand {
    /// Pick a random reachable point near home and walk to it.
    StartPatrolLeg,
    /// Walk toward a point, halting within `stop_distance` of it.
    MoveTo {
        /// Travel destination.
        destination: Vec3,
        /// Halt radius around the destination.
        stop_distance: f32,
    },
    /// Cancel the outstanding destination.
    Stop,
    /// Face a point.
    LookAt(Vec3),
    /// Stop facing; resume facing the travel direction.
    StopLookAt,
}

/// Per-agent state machine.
#[derive(Debug)]
pub struct StateMachine {
    state: AiState,
    interval: f32,
    timer: f32,
}

impl StateMachine {
    /// Creates a machine in `Patrol`, evaluating every `interval` seconds.
    #[must_use]
    pub const fn new(interval: f32) -> Self {
        Self {
            state: AiState::Patrol,
            interval,
            timer: 0.0,
        }
    }

    /// Returns the current state tag.
    #[must_use]
    pub const fn state(&self) -> AiState {
        self.state
    }

    /// Accumulates time; returns true when an evaluation is due.
    pub fn tick(&mut self, delta: f32) -> bool {
        self.timer += delta;
        if self.timer < self.interval {
            return false;
        }
        self.timer = 0.0;
        true
    }

    /// Runs one evaluation of the transition table. A single evaluation
    /// emits at most two commands.
    pub fn evaluate(&mut self, inputs: &StateInputs) -> Vec<StateCommand> {
        let mut commands = Vec::new();
        let next = match self.state {
            AiState::Patrol => self.evaluate_patrol(inputs, &mut commands),
            AiState::Chasing => Self::evaluate_chasing(inputs, &mut commands),
            AiState::Attacking => Self::evaluate_attacking(inputs, &mut commands),
            AiState::Returning => Self::evaluate_returning(inputs, &mut commands),
        };
        if next != self.state {
            debug!(from = ?self.state, to = ?next, "state transition");
            self.state = next;
        }
        commands
    }

    fn evaluate_patrol(&self, inputs: &StateInputs, commands: &mut Vec<StateCommand>) -> AiState {
        if inputs.target.is_some() {
            return AiState::Chasing;
        }
        if inputs.patrol_enabled && inputs.ready_for_patrol {
            commands.push(StateCommand::StartPatrolLeg);
        }
        AiState::Patrol
    }

    fn evaluate_chasing(inputs: &StateInputs, commands: &mut Vec<StateCommand>) -> AiState {
        let Some(target) = inputs.target else {
            commands.push(StateCommand::StopLookAt);
            return AiState::Returning;
        };
        let distance = inputs.position.distance(target.position);
        if distance > inputs.detection_range {
            commands.push(StateCommand::StopLookAt);
            return AiState::Returning;
        }
        if distance <= inputs.attack_range {
            commands.push(StateCommand::Stop);
            return AiState::Attacking;
        }
        commands.push(StateCommand::MoveTo {
            destination: target.position,
            stop_distance: inputs.attack_range,
        });
        commands.push(StateCommand::LookAt(target.position));
        AiState::Chasing
    }

    fn evaluate_attacking(inputs: &StateInputs, commands: &mut Vec<StateCommand>) -> AiState {
        let Some(target) = inputs.target else {
            commands.push(StateCommand::StopLookAt);
            return AiState::Returning;
        };
        if inputs.position.distance(target.position) > inputs.attack_range {
            return AiState::Chasing;
        }
        if !target.in_los {
            return AiState::Chasing;
        }
        commands.push(StateCommand::LookAt(target.position));
        AiState::Attacking
    }

    fn evaluate_returning(inputs: &StateInputs, commands: &mut Vec<StateCommand>) -> AiState {
        if inputs.position.distance(inputs.home) <= inputs.home_threshold {
            commands.push(StateCommand::StopLookAt);
            return AiState::Patrol;
        }
        if inputs.target.is_some() {
            return AiState::Chasing;
        }
        commands.push(StateCommand::MoveTo {
            destination: inputs.home,
            stop_distance: 0.0,
        });
        AiState::Returning
    }

    /// Forces the machine back to `Patrol` ahead of a pool release.
    pub fn reset(&mut self) {
        self.state = AiState::Patrol;
        self.timer = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> StateInputs {
        StateInputs {
            position: Vec3::ZERO,
            home: Vec3::ZERO,
            target: None,
            patrol_enabled: true,
            ready_for_patrol: true,
            detection_range: 15.0,
            attack_range: 10.0,
            home_threshold: 2.0,
        }
    }

    fn target_at(distance: f32) -> TargetSnapshot {
        TargetSnapshot {
            position: Vec3::new(distance, 0.0, 0.0),
            in_los: true,
        }
    }

    fn machine_in(state: AiState) -> StateMachine {
        let mut machine = StateMachine::new(0.1);
        machine.state = state;
        machine
    }

    #[test]
    fn tick_gates_evaluation_to_the_interval() {
        let mut machine = StateMachine::new(0.1);
        assert!(!machine.tick(0.05));
        assert!(machine.tick(0.05));
        assert!(!machine.tick(0.05));
    }

    mod patrol_tests {
        use super::*;

        #[test]
        fn target_acquired_moves_to_chasing() {
            let mut machine = machine_in(AiState::Patrol);
            let inputs = StateInputs {
                target: Some(target_at(12.0)),
                ..inputs()
            };
            machine.evaluate(&inputs);
            assert_eq!(machine.state(), AiState::Chasing);
        }

        #[test]
        fn idle_agent_starts_a_patrol_leg() {
            let mut machine = machine_in(AiState::Patrol);
            let commands = machine.evaluate(&inputs());
            assert_eq!(machine.state(), AiState::Patrol);
            assert_eq!(commands, vec![StateCommand::StartPatrolLeg]);
        }

        #[test]
        fn patrol_disabled_stays_put_forever() {
            let mut machine = machine_in(AiState::Patrol);
            let inputs = StateInputs {
                patrol_enabled: false,
                ..inputs()
            };
            for _ in 0..100 {
                let commands = machine.evaluate(&inputs);
                assert_eq!(machine.state(), AiState::Patrol);
                assert!(commands.is_empty());
            }
        }

        #[test]
        fn no_patrol_leg_while_already_moving() {
            let mut machine = machine_in(AiState::Patrol);
            let inputs = StateInputs {
                ready_for_patrol: false,
                ..inputs()
            };
            let commands = machine.evaluate(&inputs);
            assert!(commands.is_empty());
        }
    }

    mod chasing_tests {
        use super::*;

        #[test]
        fn target_lost_returns_home() {
            let mut machine = machine_in(AiState::Chasing);
            let commands = machine.evaluate(&inputs());
            assert_eq!(machine.state(), AiState::Returning);
            assert_eq!(commands, vec![StateCommand::StopLookAt]);
        }

        #[test]
        fn target_past_detection_range_returns_home() {
            let mut machine = machine_in(AiState::Chasing);
            let inputs = StateInputs {
                target: Some(target_at(20.0)),
                ..inputs()
            };
            machine.evaluate(&inputs);
            assert_eq!(machine.state(), AiState::Returning);
        }

        #[test]
        fn target_in_attack_range_starts_attacking() {
            let mut machine = machine_in(AiState::Chasing);
            let inputs = StateInputs {
                target: Some(target_at(8.0)),
                ..inputs()
            };
            let commands = machine.evaluate(&inputs);
            assert_eq!(machine.state(), AiState::Attacking);
            assert_eq!(commands, vec![StateCommand::Stop]);
        }

        #[test]
        fn closing_on_target_moves_with_attack_range_stop() {
            let mut machine = machine_in(AiState::Chasing);
            let target = target_at(12.0);
            let inputs = StateInputs {
                target: Some(target),
                ..inputs()
            };
            let commands = machine.evaluate(&inputs);
            assert_eq!(machine.state(), AiState::Chasing);
            assert_eq!(
                commands,
                vec![
                    StateCommand::MoveTo {
                        destination: target.position,
                        stop_distance: 10.0,
                    },
                    StateCommand::LookAt(target.position),
                ]
            );
        }
    }

    mod attacking_tests {
        use super::*;

        #[test]
        fn target_lost_returns_home() {
            let mut machine = machine_in(AiState::Attacking);
            let commands = machine.evaluate(&inputs());
            assert_eq!(machine.state(), AiState::Returning);
            assert_eq!(commands, vec![StateCommand::StopLookAt]);
        }

        #[test]
        fn target_out_of_range_resumes_chase() {
            let mut machine = machine_in(AiState::Attacking);
            let inputs = StateInputs {
                target: Some(target_at(11.0)),
                ..inputs()
            };
            machine.evaluate(&inputs);
            assert_eq!(machine.state(), AiState::Chasing);
        }

        #[test]
        fn occluded_target_resumes_chase() {
            let mut machine = machine_in(AiState::Attacking);
            let inputs = StateInputs {
                target: Some(TargetSnapshot {
                    position: Vec3::new(5.0, 0.0, 0.0),
                    in_los: false,
                }),
                ..inputs()
            };
            machine.evaluate(&inputs);
            assert_eq!(machine.state(), AiState::Chasing);
        }

        #[test]
        fn holding_the_shot_keeps_facing_the_target() {
            let mut machine = machine_in(AiState::Attacking);
            let target = target_at(5.0);
            let inputs = StateInputs {
                target: Some(target),
                ..inputs()
            };
            let commands = machine.evaluate(&inputs);
            assert_eq!(machine.state(), AiState::Attacking);
            assert_eq!(commands, vec![StateCommand::LookAt(target.position)]);
        }
    }

    mod returning_tests {
        use super::*;

        #[test]
        fn reaching_home_resumes_patrol() {
            let mut machine = machine_in(AiState::Returning);
            let inputs = StateInputs {
                position: Vec3::new(1.5, 0.0, 0.0),
                ..inputs()
            };
            let commands = machine.evaluate(&inputs);
            assert_eq!(machine.state(), AiState::Patrol);
            assert_eq!(commands, vec![StateCommand::StopLookAt]);
        }

        #[test]
        fn fresh_target_interrupts_the_walk_home() {
            let mut machine = machine_in(AiState::Returning);
            let inputs = StateInputs {
                position: Vec3::new(10.0, 0.0, 0.0),
                target: Some(target_at(5.0)),
                ..inputs()
            };
            machine.evaluate(&inputs);
            assert_eq!(machine.state(), AiState::Chasing);
        }

        #[test]
        fn home_check_wins_over_a_new_target() {
            // At home with a visible target: the table checks home first.
            let mut machine = machine_in(AiState::Returning);
            let inputs = StateInputs {
                position: Vec3::new(1.0, 0.0, 0.0),
                target: Some(target_at(5.0)),
                ..inputs()
            };
            machine.evaluate(&inputs);
            assert_eq!(machine.state(), AiState::Patrol);
        }

        #[test]
        fn far_from_home_keeps_walking() {
            let mut machine = machine_in(AiState::Returning);
            let inputs = StateInputs {
                position: Vec3::new(10.0, 0.0, 0.0),
                ..inputs()
            };
            let commands = machine.evaluate(&inputs);
            assert_eq!(machine.state(), AiState::Returning);
            assert_eq!(
                commands,
                vec![StateCommand::MoveTo {
                    destination: Vec3::ZERO,
                    stop_distance: 0.0,
                }]
            );
        }
    }

    #[test]
    fn reset_returns_to_patrol() {
        let mut machine = machine_in(AiState::Attacking);
        machine.reset();
        assert_eq!(machine.state(), AiState::Patrol);
    }
}
