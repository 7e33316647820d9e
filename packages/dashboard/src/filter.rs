//! Record filtering against a resolved interval.

use sentinel_dashboard_models::Interval;
use sentinel_occurrence_models::OccurrenceRecord;

/// Selects the records that fall inside `interval`, preserving order.
///
/// For [`Interval::Unbounded`] every record is kept, including ones whose
/// timestamp cannot be parsed. For bounded intervals a record is kept iff
/// its timestamp parses and lies in `[start, end]`.
#[must_use]
pub fn filter_records(records: &[OccurrenceRecord], interval: Interval) -> Vec<&OccurrenceRecord> {
    match interval {
        Interval::Unbounded => records.iter().collect(),
        bounded => records
            .iter()
            .filter(|record| record.instant().is_some_and(|at| bounded.contains(at)))
            .collect(),
    }
}
