//! Category index and filter selection.
//!
//! # Responsibility
//! - Derive distinct categories in first-seen order.
//! - Resolve a persisted filter against the categories that still exist.
//! - Produce the filtered display list.
//!
//! # Invariants
//! - `categories` returns each category exactly once.
//! - `resolve_selection` only ever returns `"all"` or a member of `available`.

use crate::model::quote::{Quote, ALL_CATEGORIES};
use std::collections::HashSet;

/// Returns distinct categories in first-seen order.
pub fn categories(quotes: &[Quote]) -> Vec<String> {
    let mut seen = HashSet::new();
    quotes
        .iter()
        .filter(|quote| seen.insert(quote.category.as_str()))
        .map(|quote| quote.category.clone())
        .collect()
}

/// Resolves a persisted filter value, falling back to `"all"` when stale.
pub fn resolve_selection<S: AsRef<str>>(persisted: Option<&str>, available: &[S]) -> String {
    match persisted {
        Some(ALL_CATEGORIES) => ALL_CATEGORIES.to_string(),
        Some(value) if available.iter().any(|category| category.as_ref() == value) => {
            value.to_string()
        }
        _ => ALL_CATEGORIES.to_string(),
    }
}

/// Returns quotes visible under `selection`, in repository order.
pub fn filter_quotes<'a>(quotes: &'a [Quote], selection: &str) -> Vec<&'a Quote> {
    if selection == ALL_CATEGORIES {
        return quotes.iter().collect();
    }
    quotes
        .iter()
        .filter(|quote| quote.category == selection)
        .collect()
}
