//! In-memory quote repository with store-backed hydration.
//!
//! # Responsibility
//! - Own the ordered quote list for the lifetime of a session.
//! - Hydrate from and write back to a `KeyValueStore`.
//! - Merge externally sourced quotes without duplicating existing ones.
//!
//! # Invariants
//! - Insertion order is append order and is never rearranged.
//! - `merge` never appends a quote equal on `(text, category)` to one
//!   already present. `add` and `extend_unchecked` do not check.
//! - `revision` increases by exactly one per call that changed the list.
//! - Hydration never fails; bad stored data degrades to an empty list.

use crate::model::quote::{Quote, QuoteValidationError};
use crate::store::{KeyValueStore, StoreResult, QUOTES_KEY};
use log::{info, warn};
use rand::Rng;
use std::collections::HashSet;

/// How the stored quote list looked when the repository was hydrated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    /// The store has never held a quote list.
    Missing,
    /// The stored list parsed; `skipped` entries failed shape validation.
    Loaded { skipped: usize },
    /// The stored value is not a JSON array, or the store read failed.
    Malformed,
}

/// Ordered in-memory quote collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteRepository {
    quotes: Vec<Quote>,
    revision: u64,
}

impl QuoteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a repository around an existing list without touching storage.
    pub fn from_quotes(quotes: Vec<Quote>) -> Self {
        Self {
            quotes,
            revision: 0,
        }
    }

    /// Hydrates from `store`, returning an empty repository on any failure.
    pub fn load(store: &impl KeyValueStore) -> Self {
        Self::load_with_status(store).0
    }

    /// Hydrates from `store` and reports what was found.
    pub fn load_with_status(store: &impl KeyValueStore) -> (Self, LoadStatus) {
        let raw = match store.get(QUOTES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                info!("event=quotes_load module=repo status=ok source=missing count=0");
                return (Self::new(), LoadStatus::Missing);
            }
            Err(err) => {
                warn!(
                    "event=quotes_load module=repo status=error error_code=store_read_failed error={err}"
                );
                return (Self::new(), LoadStatus::Malformed);
            }
        };

        let entries = match serde_json::from_str::<Vec<serde_json::Value>>(&raw) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(
                    "event=quotes_load module=repo status=error error_code=malformed_payload error={err}"
                );
                return (Self::new(), LoadStatus::Malformed);
            }
        };

        let total = entries.len();
        let quotes: Vec<Quote> = entries.into_iter().filter_map(decode_quote).collect();
        let skipped = total - quotes.len();
        if skipped > 0 {
            warn!("event=quotes_load module=repo status=partial skipped={skipped}");
        }
        info!(
            "event=quotes_load module=repo status=ok source=store count={}",
            quotes.len()
        );

        (Self::from_quotes(quotes), LoadStatus::Loaded { skipped })
    }

    /// Writes the full list to `store` as a compact JSON array.
    pub fn save(&self, store: &mut impl KeyValueStore) -> StoreResult<()> {
        let payload = serde_json::to_string(&self.quotes)?;
        store.set(QUOTES_KEY, &payload)
    }

    /// Appends one user-entered quote.
    ///
    /// # Errors
    /// - Returns `QuoteValidationError` for blank text or category; the list
    ///   is left untouched.
    pub fn add(
        &mut self,
        text: impl AsRef<str>,
        category: impl AsRef<str>,
    ) -> Result<&Quote, QuoteValidationError> {
        let quote = Quote::new(text, category)?;
        self.quotes.push(quote);
        self.revision += 1;
        Ok(&self.quotes[self.quotes.len() - 1])
    }

    /// Appends every candidate not already present; returns how many landed.
    ///
    /// Duplicates inside `candidates` itself are collapsed as well.
    pub fn merge(&mut self, candidates: impl IntoIterator<Item = Quote>) -> usize {
        let mut seen: HashSet<(String, String)> = self
            .quotes
            .iter()
            .map(|quote| (quote.text.clone(), quote.category.clone()))
            .collect();

        let before = self.quotes.len();
        for candidate in candidates {
            if candidate.validate().is_err() {
                continue;
            }
            let identity = (candidate.text.clone(), candidate.category.clone());
            if seen.insert(identity) {
                self.quotes.push(candidate);
            }
        }

        let added = self.quotes.len() - before;
        if added > 0 {
            self.revision += 1;
        }
        added
    }

    /// Appends every valid candidate with no duplicate check.
    pub fn extend_unchecked(&mut self, candidates: impl IntoIterator<Item = Quote>) -> usize {
        let before = self.quotes.len();
        self.quotes.extend(
            candidates
                .into_iter()
                .filter(|candidate| candidate.validate().is_ok()),
        );

        let added = self.quotes.len() - before;
        if added > 0 {
            self.revision += 1;
        }
        added
    }

    pub fn all(&self) -> &[Quote] {
        &self.quotes
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Picks one quote uniformly at random.
    pub fn random_pick(&self) -> Option<&Quote> {
        self.random_pick_with(&mut rand::thread_rng())
    }

    /// Picks one quote uniformly using the caller's RNG.
    pub fn random_pick_with<R: Rng>(&self, rng: &mut R) -> Option<&Quote> {
        if self.quotes.is_empty() {
            return None;
        }
        self.quotes.get(rng.gen_range(0..self.quotes.len()))
    }
}

fn decode_quote(value: serde_json::Value) -> Option<Quote> {
    let quote = serde_json::from_value::<Quote>(value).ok()?;
    quote.validate().ok()?;
    Some(quote)
}
