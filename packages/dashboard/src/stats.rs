//! Headline statistics.

use sentinel_dashboard_models::DashboardStatistics;
use sentinel_occurrence_models::{OccurrenceRecord, StatisticsBucket};

/// Totals the filtered set by coarse status class.
///
/// Every record counts towards exactly one class, so
/// `resolved + in_progress + open == total` always holds.
#[must_use]
pub fn summarize(records: &[&OccurrenceRecord]) -> DashboardStatistics {
    records
        .iter()
        .fold(DashboardStatistics::default(), |mut stats, record| {
            stats.total += 1;
            match StatisticsBucket::classify(&record.status) {
                StatisticsBucket::Resolved => stats.resolved += 1,
                StatisticsBucket::InProgress => stats.in_progress += 1,
                StatisticsBucket::Open => stats.open += 1,
            }
            stats
        })
}

#[cfg(test)]
mod tests {
    use sentinel_dashboard_models::StatisticsPercentages;

    use super::*;

    fn records(statuses: &[&str]) -> Vec<OccurrenceRecord> {
        statuses
            .iter()
            .map(|status| OccurrenceRecord::new("t", "FURTO", *status, "2024-11-05T10:00:00Z"))
            .collect()
    }

    #[test]
    fn unknown_statuses_count_as_open() {
        let records = records(&["RESOLVIDO", "ABERTO", "EM_ANDAMENTO", "FECHADO", "UNKNOWN_X"]);
        let refs: Vec<&OccurrenceRecord> = records.iter().collect();
        assert_eq!(
            summarize(&refs),
            DashboardStatistics {
                total: 5,
                resolved: 1,
                in_progress: 1,
                open: 3,
            }
        );
    }

    #[test]
    fn empty_input_is_all_zero() {
        let stats = summarize(&[]);
        assert_eq!(stats, DashboardStatistics::default());
        assert_eq!(stats.percentages(), StatisticsPercentages::default());
    }

    #[test]
    fn classes_always_sum_to_total() {
        let records = records(&[
            "resolved",
            "Em andamento",
            "in-progress",
            "",
            "  concluido ",
            "weird",
            "ABERTO",
        ]);
        let refs: Vec<&OccurrenceRecord> = records.iter().collect();
        let stats = summarize(&refs);
        assert_eq!(stats.total, 7);
        assert_eq!(stats.resolved + stats.in_progress + stats.open, stats.total);
        assert_eq!(stats.resolved, 2);
        assert_eq!(stats.in_progress, 2);
    }

    #[test]
    fn percentages_round_to_nearest() {
        let records = records(&["RESOLVIDO", "ABERTO", "ABERTO"]);
        let refs: Vec<&OccurrenceRecord> = records.iter().collect();
        let pct = summarize(&refs).percentages();
        assert_eq!(pct.resolved, 33);
        assert_eq!(pct.open, 67);
        assert_eq!(pct.in_progress, 0);
    }
}
