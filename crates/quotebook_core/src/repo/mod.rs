//! Repository layer over the in-memory quote list.
//!
//! # Responsibility
//! - Hold the ordered quote collection and its mutation rules.
//! - Keep store serialization details out of service orchestration.

pub mod quote_repo;
