//! Identity types shared across the simulation.
//!
//! - [`EntityId`]: Unique identifier for simulated entities
//! - [`EntityKind`]: Coarse entity category used for partitioned search
//! - [`Team`]: Allegiance grouping for friend/foe queries
//! - [`ObjectKind`]: Type key for the object pool and factory
//!
//! Entity IDs are the only cross-boundary key in the system: the registry,
//! the AI units, and the (external) replication layer all refer to entities
//! by id, never by reference or memory address. A stale id simply fails to
//! resolve; it can never dangle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a simulated entity.
///
/// `EntityId` is a newtype wrapper around `u64`. Ids are allocated
/// monotonically by the [`Factory`](crate::pool::Factory) and are unique for
/// the entity's registered lifetime; a pooled instance receives a fresh id
/// each time it is handed out, so a stale id from a previous loan can never
/// alias a recycled entity.
///
/// # Ordering
///
/// Ids order by their numeric value, which gives the simulation a
/// deterministic iteration order over entities.
///
/// # Example
///
/// ```
/// use skirmish_core::entity::EntityId;
///
/// let a = EntityId::new(1);
/// let b = EntityId::new(2);
///
/// assert!(a < b);
/// assert_eq!(a.as_u64(), 1);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new `EntityId` from a raw `u64` value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<EntityId> for u64 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// Coarse entity category used for partitioned registry search.
///
/// Every registered entity belongs to exactly one kind. The registry keeps a
/// per-kind index so that queries like "closest player" never scan unrelated
/// records.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// A connected player's avatar.
    Player,
    /// An AI-driven hostile.
    Enemy,
    /// An in-flight projectile.
    Projectile,
}

impl EntityKind {
    /// All kinds, in declaration order. Used to pre-seed partition indexes.
    pub const ALL: [Self; 3] = [Self::Player, Self::Enemy, Self::Projectile];
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => write!(f, "Player"),
            Self::Enemy => write!(f, "Enemy"),
            Self::Projectile => write!(f, "Projectile"),
        }
    }
}

/// Allegiance grouping, independent of [`EntityKind`].
///
/// Team membership drives friend/foe queries: an enemy's detection unit
/// looks for the closest record on the opposing team without caring whether
/// that record is a player avatar or something else.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    /// Human-controlled side.
    Players,
    /// AI-controlled side.
    Enemies,
    /// Unaffiliated (loose projectiles, props).
    Neutral,
}

impl Team {
    /// All teams, in declaration order. Used to pre-seed partition indexes.
    pub const ALL: [Self; 3] = [Self::Players, Self::Enemies, Self::Neutral];
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Players => write!(f, "Players"),
            Self::Enemies => write!(f, "Enemies"),
            Self::Neutral => write!(f, "Neutral"),
        }
    }
}

/// Type key for the object pool and factory.
///
/// Each `ObjectKind` maps to one blueprint in the factory configuration.
/// Requesting a kind with no configured blueprint is a configuration error
/// surfaced at the call site, never silently substituted.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Standard patrol-and-chase enemy.
    BasicEnemy,
    /// Straight-flying enemy projectile.
    BasicProjectile,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BasicEnemy => write!(f, "BasicEnemy"),
            Self::BasicProjectile => write!(f, "BasicProjectile"),
        }
    }
}
