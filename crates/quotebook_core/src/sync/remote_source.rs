//! Remote quote source adapters.
//!
//! # Responsibility
//! - Define the async fetch contract used by reconciliation.
//! - Map a mocked HTTP feed of `{title}` objects into quotes.
//!
//! # Invariants
//! - Fetch failures are returned as `SyncError`; nothing panics across the
//!   boundary.
//! - Every fetched quote carries the configured sentinel category.
//! - At most `batch_size` entries are read from the payload.

use crate::model::quote::Quote;
use async_trait::async_trait;
use log::{debug, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{Duration, Instant};

pub const DEFAULT_REMOTE_ENDPOINT: &str = "https://jsonplaceholder.typicode.com/posts";
pub const DEFAULT_REMOTE_CATEGORY: &str = "Server";
pub const DEFAULT_BATCH_SIZE: usize = 5;
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

const REMOTE_TEXT_FIELD: &str = "title";

pub type SyncResult<T> = Result<T, SyncError>;

/// Failure of one remote fetch.
#[derive(Debug)]
pub enum SyncError {
    /// Transport-level failure (DNS, connect, TLS, body read).
    Http(reqwest::Error),
    /// Remote answered with a non-success status.
    Status(u16),
    /// Fetch did not complete within the configured timeout.
    Timeout(Duration),
    /// Remote body was not the expected JSON shape.
    Payload(String),
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http(err) => write!(f, "remote fetch failed: {err}"),
            Self::Status(code) => write!(f, "remote fetch returned HTTP {code}"),
            Self::Timeout(limit) => {
                write!(f, "remote fetch timed out after {}ms", limit.as_millis())
            }
            Self::Payload(message) => write!(f, "invalid remote payload: {message}"),
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Http(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value)
    }
}

/// Source of externally owned quotes.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Short stable name used in log records.
    fn source_id(&self) -> &str;

    /// Fetches one batch of remote quotes.
    async fn fetch_remote(&self) -> SyncResult<Vec<Quote>>;
}

/// HTTP GET adapter for a JSON array feed.
pub struct HttpRemoteSource {
    client: reqwest::Client,
    endpoint: String,
    category: String,
    batch_size: usize,
    timeout: Duration,
}

impl HttpRemoteSource {
    /// Builds an adapter with the default batch size, category and timeout.
    pub fn new(endpoint: impl Into<String>) -> SyncResult<Self> {
        Self::with_options(
            endpoint,
            DEFAULT_REMOTE_CATEGORY,
            DEFAULT_BATCH_SIZE,
            DEFAULT_FETCH_TIMEOUT,
        )
    }

    pub fn with_options(
        endpoint: impl Into<String>,
        category: impl Into<String>,
        batch_size: usize,
        timeout: Duration,
    ) -> SyncResult<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            category: category.into(),
            batch_size,
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn fetch_body(&self) -> SyncResult<serde_json::Value> {
        let response = self.client.get(&self.endpoint).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Status(status.as_u16()));
        }
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|err| SyncError::Payload(err.to_string()))
    }
}

#[async_trait]
impl RemoteSource for HttpRemoteSource {
    fn source_id(&self) -> &str {
        "http"
    }

    async fn fetch_remote(&self) -> SyncResult<Vec<Quote>> {
        let started_at = Instant::now();
        let body = match tokio::time::timeout(self.timeout, self.fetch_body()).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(
                    "event=remote_fetch module=sync status=error error_code=timeout duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                return Err(SyncError::Timeout(self.timeout));
            }
        };

        let quotes = map_remote_payload(&body, &self.category, self.batch_size)?;
        debug!(
            "event=remote_fetch module=sync status=ok count={} duration_ms={}",
            quotes.len(),
            started_at.elapsed().as_millis()
        );
        Ok(quotes)
    }
}

/// Maps the first `batch_size` payload entries into sentinel-category quotes.
///
/// Entries without a non-blank string `title` are skipped.
pub fn map_remote_payload(
    body: &serde_json::Value,
    category: &str,
    batch_size: usize,
) -> SyncResult<Vec<Quote>> {
    let entries = body
        .as_array()
        .ok_or_else(|| SyncError::Payload("expected a JSON array".to_string()))?;

    Ok(entries
        .iter()
        .take(batch_size)
        .filter_map(|entry| entry.get(REMOTE_TEXT_FIELD)?.as_str())
        .filter_map(|title| Quote::new(title, category).ok())
        .collect())
}
