#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Time-windowed aggregation engine for the occurrence dashboard.
//!
//! Everything except [`view_model`] is a pure function of its inputs,
//! including an explicit `now`. The pipeline is:
//!
//! 1. [`window::resolve`] turns a [`TimeFilter`] into an interval.
//! 2. [`filter::filter_records`] keeps the records inside it.
//! 3. [`buckets`], [`aggregate`] and [`stats`] reduce the filtered set.
//!
//! [`compute_snapshot`] runs the whole pipeline in one call.

pub mod aggregate;
pub mod buckets;
pub mod filter;
pub mod labels;
pub mod sample;
pub mod stats;
pub mod view_model;
pub mod window;

use chrono::{DateTime, Utc};
use sentinel_dashboard_models::{DashboardSnapshot, InvalidRangeError, LabelOptions, TimeFilter};
use sentinel_occurrence_models::OccurrenceRecord;
use sentinel_source::SourceError;

/// Errors surfaced by the dashboard view-model.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// A user-supplied date range ends before it starts.
    #[error(transparent)]
    InvalidRange(#[from] InvalidRangeError),

    /// The source failed and sample fallback is disabled.
    #[error("Failed to fetch occurrences: {0}")]
    Source(#[from] SourceError),
}

/// Computes every derived series for `filter` over the raw collection.
#[must_use]
pub fn compute_snapshot(
    raw: &[OccurrenceRecord],
    filter: &TimeFilter,
    now: DateTime<Utc>,
    options: &LabelOptions,
) -> DashboardSnapshot {
    let interval = window::resolve(filter, now);
    let filtered = filter::filter_records(raw, interval);

    let unparseable = raw.iter().filter(|r| r.instant().is_none()).count();
    if unparseable > 0 {
        log::warn!("{unparseable} occurrence(s) have unparseable timestamps");
    }
    log::debug!(
        "Filter {filter} kept {}/{} occurrence(s)",
        filtered.len(),
        raw.len()
    );

    DashboardSnapshot {
        filter: *filter,
        by_time: buckets::bucketize(&filtered, filter, now, options),
        by_type: aggregate::by_type(&filtered),
        by_status: aggregate::by_status(&filtered),
        by_severity: aggregate::by_severity(&filtered),
        statistics: stats::summarize(&filtered),
        raw_count: raw.len() as u64,
        unparseable_timestamps: unparseable as u64,
    }
}
