//! Error taxonomy for the simulation core.
//!
//! The steady-state tick loop never propagates errors across subsystem
//! boundaries: identifier misses return `Option::None`, duplicate
//! registrations are logged no-ops. The types here cover the cases a caller
//! must decide about — configuration gaps and pool misuse.

use crate::entity::{EntityId, ObjectKind};
use thiserror::Error;

/// Failure to produce an entity instance from the factory.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpawnError {
    /// No blueprint is configured for the requested object kind.
    ///
    /// This is a configuration error: the caller skips the action (no spawn,
    /// no attack) and gameplay continues degraded.
    #[error("no blueprint configured for {0}")]
    MissingBlueprint(ObjectKind),

    /// The blueprint produced an instance that could not enter the world
    /// (for example a projectile with a degenerate launch direction).
    #[error("blueprint for {0} produced an unusable instance")]
    BlueprintMismatch(ObjectKind),
}

/// Failure to return an instance to the object pool.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    /// An instance with this id is already idle in the pool.
    ///
    /// Releasing twice would let two borrowers observe the same instance, so
    /// this is a hard error rather than a defensive no-op.
    #[error("instance {id} is already pooled under {kind}")]
    AlreadyPooled {
        /// Id carried by the rejected instance.
        id: EntityId,
        /// Pool bucket the duplicate was found in.
        kind: ObjectKind,
    },

    /// The instance was released while still marked active.
    ///
    /// Owning components must run their reset sequence and deactivate the
    /// instance before it goes back to the pool; otherwise the next borrower
    /// observes stale state.
    #[error("instance {id} released while still active")]
    StillActive {
        /// Id carried by the rejected instance.
        id: EntityId,
    },
}
