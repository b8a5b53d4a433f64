//! One-directional reconciliation of remote quotes into local state.
//!
//! # Invariants
//! - Remote quotes are strictly additive; local records are never replaced
//!   or removed.
//! - A failed fetch leaves local state untouched.
//! - `reconcile_shared` never holds the service lock across the fetch.

use crate::repo::quote_repo::QuoteRepository;
use crate::service::quote_service::{ServiceResult, SharedQuoteService};
use crate::store::KeyValueStore;
use crate::sync::remote_source::{RemoteSource, SyncResult};
use log::{info, warn};

/// Fetches from `source` and merges the batch into `repo`.
///
/// Returns the number of newly appended quotes.
pub async fn reconcile<R: RemoteSource + ?Sized>(
    repo: &mut QuoteRepository,
    source: &R,
) -> SyncResult<usize> {
    let batch = match source.fetch_remote().await {
        Ok(batch) => batch,
        Err(err) => {
            warn!(
                "event=reconcile module=sync status=error source={} error={err}",
                source.source_id()
            );
            return Err(err);
        }
    };

    let fetched = batch.len();
    let added = repo.merge(batch);
    info!(
        "event=reconcile module=sync status=ok source={} fetched={fetched} added={added}",
        source.source_id()
    );
    Ok(added)
}

/// Reconciles a shared service, letting other callers run during the fetch.
pub async fn reconcile_shared<S, T, R>(
    service: &SharedQuoteService<S, T>,
    source: &R,
) -> ServiceResult<usize>
where
    S: KeyValueStore,
    T: KeyValueStore,
    R: RemoteSource + ?Sized,
{
    let batch = match source.fetch_remote().await {
        Ok(batch) => batch,
        Err(err) => {
            warn!(
                "event=reconcile module=sync status=error source={} error={err}",
                source.source_id()
            );
            return Err(err.into());
        }
    };

    let mut guard = service.lock().await;
    guard.merge_remote(batch)
}
