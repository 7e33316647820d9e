//! HTTP implementation of [`OccurrenceSource`] against the Sentinel REST
//! backend.
//!
//! Preset windows hit `/ocorrencias/dashboard?timeFilter=<tag>`; custom
//! ranges hit `/ocorrencias/dashboard/data?startDate=<iso>&endDate=<iso>`.

use async_trait::async_trait;
use chrono::SecondsFormat;
use sentinel_dashboard_models::TimeFilter;

use crate::config::SourceConfig;
use crate::envelope::decode_envelope;
use crate::{OccurrenceBatch, OccurrenceSource, SourceError, retry};

/// Fetches occurrences from the REST backend.
pub struct HttpOccurrenceSource {
    client: reqwest::Client,
    config: SourceConfig,
}

impl HttpOccurrenceSource {
    /// Builds a client with the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the underlying client cannot be
    /// constructed.
    pub fn new(config: SourceConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }

    /// Builds a source from [`SourceConfig::from_env`].
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if configuration is missing or the client
    /// cannot be built.
    pub fn from_env() -> Result<Self, SourceError> {
        Self::new(SourceConfig::from_env()?)
    }

    /// URL and query parameters for a window.
    #[must_use]
    pub fn endpoint(&self, window: &TimeFilter) -> (String, Vec<(&'static str, String)>) {
        let base = &self.config.api_url;
        match window {
            TimeFilter::Custom(range) => (
                format!("{base}/ocorrencias/dashboard/data"),
                vec![
                    (
                        "startDate",
                        range.start().to_rfc3339_opts(SecondsFormat::Millis, true),
                    ),
                    (
                        "endDate",
                        range.end().to_rfc3339_opts(SecondsFormat::Millis, true),
                    ),
                ],
            ),
            preset => (
                format!("{base}/ocorrencias/dashboard"),
                vec![("timeFilter", preset.kind().to_string())],
            ),
        }
    }
}

#[async_trait]
impl OccurrenceSource for HttpOccurrenceSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self, window: &TimeFilter) -> Result<OccurrenceBatch, SourceError> {
        let (url, params) = self.endpoint(window);
        log::debug!("GET {url} {params:?}");

        let body = retry::send_json(
            || {
                self.client
                    .get(&url)
                    .header(reqwest::header::ACCEPT, "application/json")
                    .query(&params)
            },
            self.config.max_retries,
        )
        .await?;

        let batch = decode_envelope(body);
        if batch.fallback {
            log::warn!(
                "Backend served fallback data: {}",
                batch.message.as_deref().unwrap_or("no message")
            );
        }
        log::info!(
            "Fetched {} occurrence(s) for window {window}",
            batch.occurrences.len()
        );
        Ok(batch)
    }
}
