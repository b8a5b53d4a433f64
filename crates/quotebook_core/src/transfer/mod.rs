//! JSON import and export of the quote list.
//!
//! # Responsibility
//! - Render the full list as pretty-printed JSON for download/export.
//! - Parse user-supplied JSON into validated quotes.
//!
//! # Invariants
//! - Import input must be a JSON array; anything else is rejected whole.
//! - Elements that are not `{text, category}` objects with non-blank
//!   strings are skipped and counted, never passed through.

use crate::model::quote::Quote;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub type TransferResult<T> = Result<T, TransferError>;

/// Error for file and payload transfer operations.
#[derive(Debug)]
pub enum TransferError {
    /// Input is not valid JSON.
    Parse(serde_json::Error),
    /// Input is JSON but its top level is not an array.
    NotAnArray,
    Encode(serde_json::Error),
    Io(std::io::Error),
}

impl Display for TransferError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid import JSON: {err}"),
            Self::NotAnArray => write!(f, "invalid import JSON: expected an array of quotes"),
            Self::Encode(err) => write!(f, "failed to encode export: {err}"),
            Self::Io(err) => write!(f, "transfer file error: {err}"),
        }
    }
}

impl Error for TransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) | Self::Encode(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::NotAnArray => None,
        }
    }
}

impl From<std::io::Error> for TransferError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Validated import payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImportBatch {
    pub quotes: Vec<Quote>,
    /// Array elements dropped by shape validation.
    pub skipped: usize,
}

/// Renders quotes as a pretty-printed JSON array.
pub fn export_json(quotes: &[Quote]) -> TransferResult<String> {
    serde_json::to_string_pretty(quotes).map_err(TransferError::Encode)
}

/// Writes the pretty-printed export to `path`, replacing any existing file.
pub fn export_to_file(path: impl AsRef<Path>, quotes: &[Quote]) -> TransferResult<()> {
    let payload = export_json(quotes)?;
    std::fs::write(path, payload)?;
    Ok(())
}

/// Parses import text into validated quotes.
pub fn parse_import(json: &str) -> TransferResult<ImportBatch> {
    let value: serde_json::Value = serde_json::from_str(json).map_err(TransferError::Parse)?;
    let serde_json::Value::Array(entries) = value else {
        return Err(TransferError::NotAnArray);
    };

    let mut batch = ImportBatch::default();
    for entry in entries {
        match decode_entry(&entry) {
            Some(quote) => batch.quotes.push(quote),
            None => batch.skipped += 1,
        }
    }
    Ok(batch)
}

/// Reads and parses an import file.
pub fn import_from_file(path: impl AsRef<Path>) -> TransferResult<ImportBatch> {
    let contents = std::fs::read_to_string(path)?;
    parse_import(&contents)
}

fn decode_entry(entry: &serde_json::Value) -> Option<Quote> {
    let text = entry.get("text")?.as_str()?;
    let category = entry.get("category")?.as_str()?;
    Quote::new(text, category).ok()
}
