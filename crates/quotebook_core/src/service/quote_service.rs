//! Quote use-case service.
//!
//! # Responsibility
//! - Own the repository together with its durable and session stores.
//! - Persist and notify listeners after every repository mutation.
//! - Expose the operations a presentation layer needs.
//!
//! # Invariants
//! - Every state change is written back to the durable store before the
//!   call returns. A failed write is reported, never rolled back.
//! - Listeners run after the write attempt, once per mutation.
//! - The persisted selection is resolved against current categories on
//!   every read.

use crate::filter::category_index::{categories, filter_quotes, resolve_selection};
use crate::model::quote::{starter_quotes, Quote, QuoteValidationError};
use crate::repo::quote_repo::{LoadStatus, QuoteRepository};
use crate::store::{
    KeyValueStore, StoreError, LAST_VIEWED_QUOTE_KEY, SELECTED_CATEGORY_KEY,
};
use crate::sync::reconciler::reconcile;
use crate::sync::remote_source::{RemoteSource, SyncError};
use crate::transfer::{
    export_json, export_to_file, import_from_file, parse_import, ImportBatch, TransferError,
    TransferResult,
};
use log::{error, info, warn};
use rand::Rng;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service handle shared between presentation and the sync loop.
pub type SharedQuoteService<S, T> = Arc<Mutex<QuoteService<S, T>>>;

/// Callback invoked after each repository mutation.
pub type ChangeListener = Box<dyn FnMut(&QuoteChange, &[Quote]) + Send>;

/// Service error for quote use-cases.
#[derive(Debug)]
pub enum ServiceError {
    Validation(QuoteValidationError),
    /// Selection names a category that no quote carries.
    UnknownCategory(String),
    Store(StoreError),
    Transfer(TransferError),
    Sync(SyncError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::UnknownCategory(value) => write!(f, "unknown category: `{value}`"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Transfer(err) => write!(f, "{err}"),
            Self::Sync(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::UnknownCategory(_) => None,
            Self::Store(err) => Some(err),
            Self::Transfer(err) => Some(err),
            Self::Sync(err) => Some(err),
        }
    }
}

impl From<QuoteValidationError> for ServiceError {
    fn from(value: QuoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<TransferError> for ServiceError {
    fn from(value: TransferError) -> Self {
        Self::Transfer(value)
    }
}

impl From<SyncError> for ServiceError {
    fn from(value: SyncError) -> Self {
        Self::Sync(value)
    }
}

/// What changed in the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteChange {
    /// Starter quotes were written into a never-used store.
    Seeded { added: usize },
    /// One user-entered quote was appended.
    Added(Quote),
    /// Remote quotes were merged in.
    Merged { added: usize },
    /// Quotes were appended from an import file.
    Imported { added: usize },
}

/// Outcome of one import call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    pub added: usize,
    /// Array elements rejected by shape validation.
    pub skipped: usize,
}

/// Options applied when opening a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceOptions {
    /// Seed built-in quotes when the store has never held a quote list.
    pub seed_starter_quotes: bool,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            seed_starter_quotes: true,
        }
    }
}

/// Quote facade over a durable store `S` and a session store `T`.
pub struct QuoteService<S: KeyValueStore, T: KeyValueStore> {
    repo: QuoteRepository,
    store: S,
    session: T,
    listeners: Vec<ChangeListener>,
}

impl<S: KeyValueStore, T: KeyValueStore> QuoteService<S, T> {
    /// Hydrates the repository from `store` and optionally seeds it.
    ///
    /// # Errors
    /// - Returns `Store` only when seeding could not be persisted. Bad stored
    ///   data never fails the open.
    pub fn open(store: S, session: T, options: ServiceOptions) -> ServiceResult<Self> {
        let (repo, status) = QuoteRepository::load_with_status(&store);
        let mut service = Self {
            repo,
            store,
            session,
            listeners: Vec::new(),
        };

        if options.seed_starter_quotes && status == LoadStatus::Missing {
            let added = service.repo.extend_unchecked(starter_quotes());
            info!("event=quotes_seed module=service status=ok added={added}");
            service.commit(QuoteChange::Seeded { added })?;
        }

        Ok(service)
    }

    /// Wraps the service for sharing with a sync loop.
    pub fn into_shared(self) -> SharedQuoteService<S, T> {
        Arc::new(Mutex::new(self))
    }

    /// Registers a listener for repository changes.
    pub fn subscribe(&mut self, listener: impl FnMut(&QuoteChange, &[Quote]) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn repository(&self) -> &QuoteRepository {
        &self.repo
    }

    pub fn quotes(&self) -> &[Quote] {
        self.repo.all()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn session_store(&self) -> &T {
        &self.session
    }

    /// Adds one user-entered quote.
    pub fn add_quote(
        &mut self,
        text: impl AsRef<str>,
        category: impl AsRef<str>,
    ) -> ServiceResult<Quote> {
        let quote = match self.repo.add(text, category) {
            Ok(quote) => quote.clone(),
            Err(err) => {
                warn!("event=quote_add module=service status=error error={err}");
                return Err(err.into());
            }
        };

        info!(
            "event=quote_add module=service status=ok category={} total={}",
            quote.category,
            self.repo.len()
        );
        self.commit(QuoteChange::Added(quote.clone()))?;
        Ok(quote)
    }

    /// Merges remote quotes; persists only when something was added.
    pub fn merge_remote(&mut self, candidates: Vec<Quote>) -> ServiceResult<usize> {
        let added = self.repo.merge(candidates);
        if added > 0 {
            self.commit(QuoteChange::Merged { added })?;
        }
        Ok(added)
    }

    /// Runs one fetch-and-merge cycle against `source`.
    pub async fn reconcile<R: RemoteSource + ?Sized>(&mut self, source: &R) -> ServiceResult<usize> {
        let added = reconcile(&mut self.repo, source).await?;
        if added > 0 {
            self.commit(QuoteChange::Merged { added })?;
        }
        Ok(added)
    }

    /// Appends every valid element of an import payload, duplicates included.
    ///
    /// # Errors
    /// - `Transfer` when the payload is not a JSON array; nothing is added.
    pub fn import_json(&mut self, json: &str) -> ServiceResult<ImportReport> {
        let batch = parse_import(json);
        self.import_batch(batch)
    }

    /// Like `import_json`, reading the payload from `path`.
    pub fn import_file(&mut self, path: impl AsRef<Path>) -> ServiceResult<ImportReport> {
        let batch = import_from_file(path);
        self.import_batch(batch)
    }

    /// Renders every quote as pretty-printed JSON.
    pub fn export_json(&self) -> ServiceResult<String> {
        Ok(export_json(self.repo.all())?)
    }

    /// Writes every quote to `path`; returns how many were written.
    pub fn export_file(&self, path: impl AsRef<Path>) -> ServiceResult<usize> {
        export_to_file(path, self.repo.all())?;
        Ok(self.repo.len())
    }

    pub fn categories(&self) -> Vec<String> {
        categories(self.repo.all())
    }

    /// Returns the persisted filter, or `"all"` when unset or stale.
    pub fn selected_category(&self) -> String {
        let persisted = match self.store.get(SELECTED_CATEGORY_KEY) {
            Ok(value) => value,
            Err(err) => {
                warn!(
                    "event=selection_read module=service status=error error_code=store_read_failed error={err}"
                );
                None
            }
        };
        resolve_selection(persisted.as_deref(), &self.categories())
    }

    /// Persists a new filter selection.
    ///
    /// # Errors
    /// - `UnknownCategory` when `category` is neither `"all"` nor present.
    pub fn select_category(&mut self, category: &str) -> ServiceResult<String> {
        let requested = category.trim();
        let resolved = resolve_selection(Some(requested), &self.categories());
        if resolved != requested {
            return Err(ServiceError::UnknownCategory(requested.to_string()));
        }
        self.store.set(SELECTED_CATEGORY_KEY, &resolved)?;
        info!("event=selection_set module=service status=ok category={resolved}");
        Ok(resolved)
    }

    /// Quotes visible under the current selection.
    pub fn visible_quotes(&self) -> Vec<&Quote> {
        let selection = self.selected_category();
        filter_quotes(self.repo.all(), &selection)
    }

    /// Picks a random quote and records it as last viewed.
    pub fn show_random(&mut self) -> ServiceResult<Option<Quote>> {
        self.show_random_with(&mut rand::thread_rng())
    }

    /// Like `show_random`, drawing from the caller's RNG.
    ///
    /// The selection always resolves to `"all"` or to a category some quote
    /// carries, so the view is empty only when the repository is.
    pub fn show_random_with<G: Rng>(&mut self, rng: &mut G) -> ServiceResult<Option<Quote>> {
        let picked = {
            let visible = self.visible_quotes();
            if visible.is_empty() {
                None
            } else {
                Some(visible[rng.gen_range(0..visible.len())].clone())
            }
        };

        if let Some(quote) = &picked {
            let payload = serde_json::to_string(quote).map_err(StoreError::from)?;
            self.session.set(LAST_VIEWED_QUOTE_KEY, &payload)?;
        }
        Ok(picked)
    }

    /// Reads the last viewed quote back from the session store.
    pub fn last_viewed(&self) -> Option<Quote> {
        let raw = self.session.get(LAST_VIEWED_QUOTE_KEY).ok()??;
        let quote = serde_json::from_str::<Quote>(&raw).ok()?;
        quote.validate().ok()?;
        Some(quote)
    }

    fn import_batch(&mut self, batch: TransferResult<ImportBatch>) -> ServiceResult<ImportReport> {
        let batch = match batch {
            Ok(batch) => batch,
            Err(err) => {
                warn!("event=quotes_import module=service status=error error={err}");
                return Err(err.into());
            }
        };

        let added = self.repo.extend_unchecked(batch.quotes);
        info!(
            "event=quotes_import module=service status=ok added={added} skipped={}",
            batch.skipped
        );
        if added > 0 {
            self.commit(QuoteChange::Imported { added })?;
        }
        Ok(ImportReport {
            added,
            skipped: batch.skipped,
        })
    }

    fn commit(&mut self, change: QuoteChange) -> ServiceResult<()> {
        let saved = self.repo.save(&mut self.store);
        for listener in &mut self.listeners {
            listener(&change, self.repo.all());
        }
        saved.map_err(|err| {
            error!(
                "event=quotes_save module=service status=error revision={} error={err}",
                self.repo.revision()
            );
            ServiceError::Store(err)
        })
    }
}

impl<S: KeyValueStore, T: KeyValueStore> std::fmt::Debug for QuoteService<S, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuoteService")
            .field("quotes", &self.repo.len())
            .field("revision", &self.repo.revision())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
