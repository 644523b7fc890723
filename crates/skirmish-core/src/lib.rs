//! # Skirmish Core
//!
//! Server-authoritative simulation core for the Skirmish multiplayer action
//! game: a live, queryable directory of simulated entities and the per-enemy
//! AI that hunts players through it.
//!
//! ## Architecture
//!
//! - **Registry**: categorized, spatially-searchable directory of live
//!   entities with partition indexes by kind and team
//! - **AI units**: detection, combat, movement, and the
//!   patrol/chase/attack/return state machine, composed per enemy
//! - **Pool/Factory**: type-keyed recycling of transient entities (enemies,
//!   projectiles) with fresh ids per loan
//! - **Simulation**: the root that owns all of the above and advances the
//!   world one fixed tick at a time on a single thread
//!
//! Navigation and occlusion are consumed as capability traits
//! ([`services::Navigator`], [`services::Occlusion`]); the host embeds its
//! real pathfinding and raycasts behind them.
//!
//! ## Usage
//!
//! ```
//! use glam::Vec3;
//! use skirmish_core::{SimConfig, Simulation};
//!
//! let mut sim = Simulation::new(SimConfig::default(), 42);
//! let player = sim.add_player("alice", Vec3::new(8.0, 0.0, 0.0));
//! sim.spawn_enemy(Vec3::ZERO).unwrap();
//!
//! for _ in 0..100 {
//!     sim.step(0.05);
//! }
//! assert!(sim.registry().contains(player));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ai;
pub mod config;
pub mod entity;
pub mod error;
pub mod health;
pub mod pool;
pub mod projectile;
pub mod registry;
pub mod services;
pub mod sim;
pub mod spawner;

pub use config::{LosPolicy, SimConfig};
pub use entity::{EntityId, EntityKind, ObjectKind, Team};
pub use error::{PoolError, SpawnError};
pub use registry::{Registry, RegistryEvent};
pub use sim::Simulation;

#[cfg(test)]
mod tests;
