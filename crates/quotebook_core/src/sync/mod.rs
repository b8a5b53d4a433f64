//! Remote sync: fetch, merge and schedule.
//!
//! # Responsibility
//! - Pull quotes from an external source.
//! - Merge them into local state without duplicates.
//! - Repeat on a fixed interval until stopped.
//!
//! # Invariants
//! - Sync is one-directional: remote to local only.

pub mod reconciler;
pub mod remote_source;
pub mod scheduler;
