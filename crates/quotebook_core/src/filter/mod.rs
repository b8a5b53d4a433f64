//! Category-derived views over the quote list.
//!
//! # Invariants
//! - Categories are never stored; they are recomputed from quotes on demand.

pub mod category_index;
