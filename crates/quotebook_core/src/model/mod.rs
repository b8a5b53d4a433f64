//! Domain model for stored quotes.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//!
//! # Invariants
//! - Quote identity is value-based: equal `(text, category)` means the same
//!   quote.

pub mod quote;
