//! Categorical breakdowns of the filtered occurrence set.

use std::collections::HashMap;

use sentinel_dashboard_models::ChartDataPoint;
use sentinel_occurrence_models::{OccurrenceRecord, OccurrenceStatus, Severity};

/// Counts per type code, verbatim, in first-seen order.
#[must_use]
pub fn by_type(records: &[&OccurrenceRecord]) -> Vec<ChartDataPoint> {
    let mut points: Vec<ChartDataPoint> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let code = record.occurrence_type.as_str();
        if let Some(&idx) = positions.get(code) {
            points[idx].value += 1;
        } else {
            positions.insert(code, points.len());
            points.push(ChartDataPoint::new(code, 1));
        }
    }

    points
}

/// Counts per canonical status, always all four in fixed order.
///
/// Statuses outside the normalization table are not counted anywhere.
#[must_use]
pub fn by_status(records: &[&OccurrenceRecord]) -> Vec<ChartDataPoint> {
    let statuses = OccurrenceStatus::all();
    let mut counts = vec![0_u64; statuses.len()];

    for record in records {
        match OccurrenceStatus::from_raw(&record.status) {
            Some(status) => {
                if let Some(idx) = statuses.iter().position(|s| *s == status) {
                    counts[idx] += 1;
                }
            }
            None => log::debug!("Dropping unknown status {:?} from status chart", record.status),
        }
    }

    statuses
        .iter()
        .zip(counts)
        .map(|(status, value)| ChartDataPoint::new(status.to_string(), value))
        .collect()
}

/// Counts per inferred severity, always all four in fixed order.
#[must_use]
pub fn by_severity(records: &[&OccurrenceRecord]) -> Vec<ChartDataPoint> {
    let severities = Severity::all();
    let mut counts = vec![0_u64; severities.len()];

    for record in records {
        let severity = record.severity();
        if let Some(idx) = severities.iter().position(|s| *s == severity) {
            counts[idx] += 1;
        }
    }

    severities
        .iter()
        .zip(counts)
        .map(|(severity, value)| ChartDataPoint::new(severity.to_string(), value))
        .collect()
}
