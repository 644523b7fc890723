//! Test module for determinism and integration tests.
//!
//! Unit tests live next to their modules; this module covers whole-world
//! behavior:
//! - **Determinism tests**: same seed and inputs replay identically
//! - **Integration tests**: spawn-to-despawn scenarios across the registry,
//!   AI, pool, and projectile lifecycle
//! - **Helper functions**: world setup utilities
//!
//! # Test Structure
//!
//! - `determinism.rs`: replay reproducibility
//! - `integration.rs`: end-to-end gameplay scenarios
//! - `helpers.rs`: setup utilities and occlusion stubs

mod determinism;
mod helpers;

pub use helpers::*;
