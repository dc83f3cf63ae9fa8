//! # mbcrypt-core
//!
//! Out-of-order lane scheduler for multi-buffer symmetric crypto.
//!
//! Callers submit independent jobs one at a time. Each job is routed to the
//! [`LaneManager`] of its algorithm family, which packs jobs onto the
//! fixed-width lanes of a vector kernel and advances all of them together.
//! Jobs finish shortest-remaining-first, not in submission order: callers
//! correlate results through [`Job::user_data`](mbcrypt_backend::Job).
//!
//! ```no_run
//! use mbcrypt_core::{Engine, backend::{CpuRef, HashAlg, Job}};
//!
//! let mut engine: Engine<CpuRef> = Engine::new();
//! let mut done: Vec<Job> = Vec::new();
//! for (i, packet) in [vec![0u8; 64], vec![1u8; 1500]].into_iter().enumerate() {
//!     done.extend(engine.submit(Job::hash(HashAlg::Sha256, packet).with_user_data(i as u64)));
//! }
//! done.extend(engine.flush_all());
//! assert_eq!(done.len(), 2);
//! ```

pub use mbcrypt_backend as backend;

pub mod config;
pub mod engine;
pub mod lane;
pub mod manager;
pub mod queue;

/// Backend-parametric test functions, instantiated with
/// [`engine_test_suite!`].
pub mod test_suite;

#[cfg(test)]
mod tests;

pub use config::{ConfigError, EngineConfig, FORCE_TIER_ENV, SHA_EXT_ENV};
pub use engine::{Engine, EngineStats};
pub use lane::Lane;
pub use manager::LaneManager;
pub use queue::SubmissionQueue;
