//! Quote domain model.
//!
//! # Responsibility
//! - Define the canonical `(text, category)` record stored by the repository.
//! - Validate user-supplied fields before they reach storage.
//!
//! # Invariants
//! - A quote has no identifier; identity is the `(text, category)` pair.
//! - Both fields are non-empty after trimming.
//! - Quotes are immutable once added.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Category value meaning "no filter".
pub const ALL_CATEGORIES: &str = "all";

/// Validation error for quote construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteValidationError {
    EmptyText,
    EmptyCategory,
}

impl Display for QuoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "quote text cannot be empty"),
            Self::EmptyCategory => write!(f, "quote category cannot be empty"),
        }
    }
}

impl Error for QuoteValidationError {}

/// One stored quote.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Quote {
    pub text: String,
    pub category: String,
}

impl Quote {
    /// Builds a quote from raw input, trimming both fields.
    ///
    /// # Errors
    /// - `EmptyText` when `text` is blank.
    /// - `EmptyCategory` when `category` is blank.
    pub fn new(
        text: impl AsRef<str>,
        category: impl AsRef<str>,
    ) -> Result<Self, QuoteValidationError> {
        let quote = Self {
            text: text.as_ref().trim().to_string(),
            category: category.as_ref().trim().to_string(),
        };
        quote.validate()?;
        Ok(quote)
    }

    /// Checks field invariants on an already-built quote.
    ///
    /// Deserialized quotes bypass `new`, so every read boundary calls this.
    pub fn validate(&self) -> Result<(), QuoteValidationError> {
        if self.text.trim().is_empty() {
            return Err(QuoteValidationError::EmptyText);
        }
        if self.category.trim().is_empty() {
            return Err(QuoteValidationError::EmptyCategory);
        }
        Ok(())
    }

    /// Returns whether both records share the same identity.
    pub fn same_identity(&self, other: &Quote) -> bool {
        self.text == other.text && self.category == other.category
    }
}

/// Built-in quotes used to seed a store that has never held any.
pub fn starter_quotes() -> Vec<Quote> {
    [
        (
            "The journey of a thousand miles begins with one step.",
            "Motivation",
        ),
        (
            "Life is what happens when you're busy making other plans.",
            "Life",
        ),
        (
            "Success usually comes to those who are too busy to be looking for it.",
            "Success",
        ),
    ]
    .into_iter()
    .map(|(text, category)| Quote {
        text: text.to_string(),
        category: category.to_string(),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::{starter_quotes, Quote, QuoteValidationError};

    #[test]
    fn new_trims_fields() {
        let quote = Quote::new("  Stay hungry.  ", " Life ").expect("valid quote");
        assert_eq!(quote.text, "Stay hungry.");
        assert_eq!(quote.category, "Life");
    }

    #[test]
    fn new_rejects_blank_fields() {
        assert_eq!(
            Quote::new("   ", "Life").unwrap_err(),
            QuoteValidationError::EmptyText
        );
        assert_eq!(
            Quote::new("text", "\t").unwrap_err(),
            QuoteValidationError::EmptyCategory
        );
    }

    #[test]
    fn serializes_with_plain_field_names() {
        let quote = Quote::new("A", "X").unwrap();
        let json = serde_json::to_string(&quote).unwrap();
        assert_eq!(json, r#"{"text":"A","category":"X"}"#);
    }

    #[test]
    fn starter_quotes_are_valid_and_distinct() {
        let quotes = starter_quotes();
        assert_eq!(quotes.len(), 3);
        assert!(quotes.iter().all(|quote| quote.validate().is_ok()));
        assert!(!quotes[0].same_identity(&quotes[1]));
    }
}
