#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Occurrence data source trait and HTTP client for the Sentinel REST
//! backend.
//!
//! The dashboard engine only depends on [`OccurrenceSource`]; the HTTP
//! implementation in [`http`] is one provider of it. Sources are never
//! trusted to filter authoritatively: the engine re-filters every batch
//! against the selected window.

pub mod config;
pub mod envelope;
pub mod http;
pub mod retry;

use async_trait::async_trait;
use sentinel_dashboard_models::TimeFilter;
use sentinel_occurrence_models::OccurrenceRecord;

/// Errors that can occur while fetching occurrences.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Upstream answered with a non-success status.
    #[error("Upstream returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// Source is misconfigured.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of what went wrong.
        message: String,
    },
}

/// One batch of occurrences returned by a source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccurrenceBatch {
    /// The occurrences, in upstream order.
    pub occurrences: Vec<OccurrenceRecord>,
    /// Whether upstream served placeholder data instead of real records.
    pub fallback: bool,
    /// Optional upstream notice accompanying the batch.
    pub message: Option<String>,
}

impl OccurrenceBatch {
    #[must_use]
    pub const fn new(occurrences: Vec<OccurrenceRecord>) -> Self {
        Self {
            occurrences,
            fallback: false,
            message: None,
        }
    }
}

/// A provider of raw occurrence records.
///
/// `window` is a hint: implementations may return more (or fewer) records
/// than the window strictly contains.
#[async_trait]
pub trait OccurrenceSource: Send + Sync {
    /// Returns a short identifier for logs (e.g., `"http"`).
    fn name(&self) -> &str;

    /// Fetches occurrences for the given window.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the data cannot be retrieved or decoded.
    async fn fetch(&self, window: &TimeFilter) -> Result<OccurrenceBatch, SourceError>;
}
