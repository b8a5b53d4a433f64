//! Core domain logic for Quotebook.
//! This crate owns the quote list, its persistence and remote sync.

pub mod config;
pub mod db;
pub mod filter;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;
pub mod sync;
pub mod transfer;

pub use config::{load_config, ConfigError, QuotebookConfig};
pub use filter::category_index::{categories, filter_quotes, resolve_selection};
pub use logging::{init_logging, logging_status, LogLevel, LoggingError};
pub use model::quote::{starter_quotes, Quote, QuoteValidationError, ALL_CATEGORIES};
pub use repo::quote_repo::{LoadStatus, QuoteRepository};
pub use service::quote_service::{
    ImportReport, QuoteChange, QuoteService, ServiceError, ServiceOptions, ServiceResult,
    SharedQuoteService,
};
pub use store::{KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore, StoreError};
pub use sync::reconciler::{reconcile, reconcile_shared};
pub use sync::remote_source::{HttpRemoteSource, RemoteSource, SyncError, SyncResult};
pub use sync::scheduler::{start_sync, ScheduleError, SyncEvent, SyncHandle};
pub use transfer::{
    export_json, export_to_file, import_from_file, parse_import, ImportBatch, TransferError,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
