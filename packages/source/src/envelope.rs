//! Decoding of the dashboard response envelope.
//!
//! The backend answers either `{ "ocorrencias": [...] }` (optionally with
//! `fallback` and `message`) or a bare array of occurrences. Records that
//! fail to decode are skipped individually so one bad row never empties the
//! whole batch.

use sentinel_occurrence_models::OccurrenceRecord;
use serde_json::Value;

use crate::OccurrenceBatch;

/// Decodes a response body into an [`OccurrenceBatch`].
///
/// Any shape other than the two known envelopes yields an empty batch.
#[must_use]
pub fn decode_envelope(body: Value) -> OccurrenceBatch {
    match body {
        Value::Array(items) => OccurrenceBatch::new(decode_records(items)),
        Value::Object(mut map) => {
            let occurrences = match map.remove("ocorrencias") {
                Some(Value::Array(items)) => decode_records(items),
                Some(other) => {
                    log::warn!("Ignoring non-array `ocorrencias` field: {other}");
                    Vec::new()
                }
                None => Vec::new(),
            };
            let fallback = map
                .get("fallback")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            let message = map
                .get("message")
                .and_then(Value::as_str)
                .map(String::from);
            OccurrenceBatch {
                occurrences,
                fallback,
                message,
            }
        }
        other => {
            log::warn!("Unexpected dashboard response shape: {other}");
            OccurrenceBatch::default()
        }
    }
}

fn decode_records(items: Vec<Value>) -> Vec<OccurrenceRecord> {
    let total = items.len();
    let records: Vec<OccurrenceRecord> = items
        .into_iter()
        .enumerate()
        .filter_map(|(idx, item)| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("Skipping malformed occurrence #{idx}: {e}");
                None
            }
        })
        .collect();
    if records.len() != total {
        log::warn!("Decoded {}/{total} occurrences", records.len());
    }
    records
}
