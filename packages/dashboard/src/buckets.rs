//! Time bucketing for the trend chart.
//!
//! A filter is turned into an ordered list of [`Anchor`]s, and every record
//! is counted towards the anchor nearest to its timestamp. Anchors are
//! representative instants, not range boundaries, so a record may land in
//! a neighbouring period when anchors are far apart.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, TimeDelta, Utc};
use sentinel_dashboard_models::{ChartDataPoint, CustomRange, LabelOptions, TimeFilter};
use sentinel_occurrence_models::OccurrenceRecord;

use crate::labels::{LabelFormat, format_label};

/// Number of anchors for every rolling preset.
pub const ROLLING_ANCHORS: i32 = 7;

/// Number of monthly anchors for the all-time view.
pub const ALL_TIME_MONTHS: i32 = 12;

/// Number of anchors for custom ranges between one week and one month.
pub const CUSTOM_MEDIUM_ANCHORS: i64 = 6;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// A labelled representative instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub label: String,
    pub at: DateTime<Utc>,
}

/// Generates the chronological anchors for `filter`.
///
/// Rolling presets place seven anchors ending at `now`. `All` uses the
/// first day of each of the last twelve calendar months (current month
/// included). Custom ranges scale with their span.
#[must_use]
pub fn anchors(filter: &TimeFilter, now: DateTime<Utc>, options: &LabelOptions) -> Vec<Anchor> {
    let (step, format) = match filter {
        TimeFilter::LastHour => (TimeDelta::minutes(10), LabelFormat::HourMinute),
        TimeFilter::LastDay => (TimeDelta::hours(4), LabelFormat::Hour),
        TimeFilter::Last7Days => (TimeDelta::days(1), LabelFormat::Weekday),
        TimeFilter::Last30Days => (TimeDelta::days(5), LabelFormat::DayMonth),
        TimeFilter::Last90Days => (TimeDelta::days(13), LabelFormat::DayMonth),
        TimeFilter::All => return all_time(now, options),
        TimeFilter::Custom(range) => return custom(range, options),
    };
    rolling(now, step, format, options)
}

fn all_time(now: DateTime<Utc>, options: &LabelOptions) -> Vec<Anchor> {
    let local = now.with_timezone(&options.offset);
    (0..ALL_TIME_MONTHS)
        .rev()
        .filter_map(|back| month_start(month_index(&local) - back, options.offset))
        .map(|at| anchor(at, LabelFormat::MonthYear, options))
        .collect()
}

fn rolling(
    now: DateTime<Utc>,
    step: TimeDelta,
    format: LabelFormat,
    options: &LabelOptions,
) -> Vec<Anchor> {
    (0..ROLLING_ANCHORS)
        .rev()
        .map(|back| anchor(now - step * back, format, options))
        .collect()
}

fn custom(range: &CustomRange, options: &LabelOptions) -> Vec<Anchor> {
    let start = range.start();
    let days = span_days(range);

    if days <= 7 {
        (0..days)
            .map(|i| anchor(start + TimeDelta::days(i), LabelFormat::DayMonth, options))
            .collect()
    } else if days <= 30 {
        let step = (days + CUSTOM_MEDIUM_ANCHORS - 1) / CUSTOM_MEDIUM_ANCHORS;
        (0..CUSTOM_MEDIUM_ANCHORS)
            .map(|i| anchor(start + TimeDelta::days(i * step), LabelFormat::DayMonth, options))
            .collect()
    } else {
        let first = start.with_timezone(&options.offset);
        let last = range.end().with_timezone(&options.offset);
        (month_index(&first)..=month_index(&last))
            .filter_map(|index| month_start(index, options.offset))
            .map(|at| anchor(at, LabelFormat::MonthYear, options))
            .collect()
    }
}

/// Whole days spanned by a custom range, rounded up, at least one.
fn span_days(range: &CustomRange) -> i64 {
    let ms = range.span().num_milliseconds();
    ((ms + DAY_MS - 1) / DAY_MS).max(1)
}

fn anchor(at: DateTime<Utc>, format: LabelFormat, options: &LabelOptions) -> Anchor {
    Anchor {
        label: format_label(at, format, options),
        at,
    }
}

/// Months since year zero, so calendar months can be stepped as integers.
#[allow(clippy::cast_possible_wrap)]
fn month_index(date: &impl Datelike) -> i32 {
    date.year() * 12 + date.month0() as i32
}

/// First instant of the month at `index`, in local time at `offset`.
fn month_start(index: i32, offset: FixedOffset) -> Option<DateTime<Utc>> {
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12).unsigned_abs() + 1;
    NaiveDate::from_ymd_opt(year, month, 1)?
        .and_time(NaiveTime::MIN)
        .and_local_timezone(offset)
        .single()
        .map(|local| local.with_timezone(&Utc))
}

/// Index of the anchor nearest to `at`. Ties go to the earliest anchor.
fn nearest(anchors: &[Anchor], at: DateTime<Utc>) -> Option<usize> {
    let mut best: Option<(usize, TimeDelta)> = None;
    for (idx, anchor) in anchors.iter().enumerate() {
        let distance = (at - anchor.at).abs();
        if best.is_none_or(|(_, closest)| distance < closest) {
            best = Some((idx, distance));
        }
    }
    best.map(|(idx, _)| idx)
}

/// Counts records per anchor, in anchor order.
///
/// Records with unparseable timestamps are skipped.
#[must_use]
pub fn bucketize(
    records: &[&OccurrenceRecord],
    filter: &TimeFilter,
    now: DateTime<Utc>,
    options: &LabelOptions,
) -> Vec<ChartDataPoint> {
    let anchors = anchors(filter, now, options);
    let mut counts = vec![0_u64; anchors.len()];

    for record in records {
        let Some(at) = record.instant() else {
            log::trace!("Skipping occurrence {:?} with unparseable timestamp", record.title);
            continue;
        };
        if let Some(idx) = nearest(&anchors, at) {
            counts[idx] += 1;
        }
    }

    anchors
        .into_iter()
        .zip(counts)
        .map(|(anchor, value)| ChartDataPoint::new(anchor.label, value))
        .collect()
}

#[cfg(test)]
mod tests {
    use sentinel_dashboard_models::LabelLocale;

    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn now() -> DateTime<Utc> {
        utc("2024-11-10T12:00:00Z")
    }

    fn custom(start: &str, end: &str) -> TimeFilter {
        TimeFilter::Custom(CustomRange::new(utc(start), utc(end)).unwrap())
    }

    fn labels(filter: &TimeFilter) -> Vec<String> {
        anchors(filter, now(), &LabelOptions::default())
            .into_iter()
            .map(|a| a.label)
            .collect()
    }

    #[test]
    fn rolling_presets_have_seven_points_ending_now() {
        for filter in [
            TimeFilter::LastHour,
            TimeFilter::LastDay,
            TimeFilter::Last7Days,
            TimeFilter::Last30Days,
            TimeFilter::Last90Days,
        ] {
            let generated = anchors(&filter, now(), &LabelOptions::default());
            assert_eq!(generated.len(), 7, "{filter}");
            assert_eq!(generated.last().unwrap().at, now(), "{filter}");
            assert!(generated.windows(2).all(|w| w[0].at < w[1].at), "{filter}");
        }
    }

    #[test]
    fn rolling_labels() {
        assert_eq!(
            labels(&TimeFilter::LastHour),
            vec!["11:00", "11:10", "11:20", "11:30", "11:40", "11:50", "12:00"]
        );
        assert_eq!(
            labels(&TimeFilter::LastDay),
            vec!["12:00", "16:00", "20:00", "00:00", "04:00", "08:00", "12:00"]
        );
        assert_eq!(
            labels(&TimeFilter::Last7Days),
            vec!["seg", "ter", "qua", "qui", "sex", "sáb", "dom"]
        );
        assert_eq!(labels(&TimeFilter::Last30Days)[0], "11/10");
        assert_eq!(labels(&TimeFilter::Last90Days)[0], "24/08");
    }

    #[test]
    fn all_time_uses_last_twelve_months() {
        let generated = labels(&TimeFilter::All);
        assert_eq!(generated.len(), 12);
        assert_eq!(generated.first().unwrap(), "dez/23");
        assert_eq!(generated.last().unwrap(), "nov/24");

        let english = anchors(
            &TimeFilter::All,
            now(),
            &LabelOptions {
                locale: LabelLocale::EnUs,
                ..LabelOptions::default()
            },
        );
        assert_eq!(english[0].label, "Dec/23");
        assert_eq!(english[0].at, utc("2023-12-01T00:00:00Z"));
    }

    #[test]
    fn short_custom_range_has_one_anchor_per_day() {
        let filter = custom("2024-11-05T00:00:00Z", "2024-11-09T23:59:59.999Z");
        assert_eq!(
            labels(&filter),
            vec!["05/11", "06/11", "07/11", "08/11", "09/11"]
        );
    }

    #[test]
    fn zero_length_custom_range_still_has_an_anchor() {
        let filter = custom("2024-11-05T08:00:00Z", "2024-11-05T08:00:00Z");
        assert_eq!(labels(&filter), vec!["05/11"]);
    }

    #[test]
    fn medium_custom_range_has_six_anchors() {
        let filter = custom("2024-11-01T00:00:00Z", "2024-11-20T23:59:59.999Z");
        assert_eq!(
            labels(&filter),
            vec!["01/11", "05/11", "09/11", "13/11", "17/11", "21/11"]
        );
    }

    #[test]
    fn long_custom_range_uses_calendar_months() {
        let filter = custom("2024-09-15T00:00:00Z", "2024-11-09T23:59:59.999Z");
        assert_eq!(labels(&filter), vec!["set/24", "out/24", "nov/24"]);

        let across_years = custom("2023-11-20T00:00:00Z", "2024-02-02T00:00:00Z");
        assert_eq!(
            labels(&across_years),
            vec!["nov/23", "dez/23", "jan/24", "fev/24"]
        );
    }

    #[test]
    fn records_go_to_the_nearest_anchor() {
        let records = [
            OccurrenceRecord::new("a", "FURTO", "ABERTO", "2024-11-10T11:58:00Z"),
            OccurrenceRecord::new("b", "FURTO", "ABERTO", "2024-11-10T11:03:00Z"),
            OccurrenceRecord::new("c", "FURTO", "ABERTO", "2024-11-10T11:21:00Z"),
        ];
        let refs: Vec<&OccurrenceRecord> = records.iter().collect();
        let points = bucketize(&refs, &TimeFilter::LastHour, now(), &LabelOptions::default());
        let values: Vec<u64> = points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![1, 0, 1, 0, 0, 0, 1]);
    }

    #[test]
    fn ties_go_to_the_earliest_anchor() {
        let record = OccurrenceRecord::new("tie", "FURTO", "ABERTO", "2024-11-10T11:55:00Z");
        let points = bucketize(&[&record], &TimeFilter::LastHour, now(), &LabelOptions::default());
        assert_eq!(points[5].label, "11:50");
        assert_eq!(points[5].value, 1);
        assert_eq!(points[6].value, 0);
    }

    #[test]
    fn unparseable_and_distant_records() {
        let records = [
            OccurrenceRecord::new("ok", "FURTO", "ABERTO", "2024-11-09T12:00:00Z"),
            OccurrenceRecord::new("broken", "FURTO", "ABERTO", "not a date"),
            OccurrenceRecord::new("ancient", "FURTO", "ABERTO", "2001-01-01T00:00:00Z"),
        ];
        let refs: Vec<&OccurrenceRecord> = records.iter().collect();
        let points = bucketize(&refs, &TimeFilter::Last7Days, now(), &LabelOptions::default());

        assert_eq!(points.len(), 7);
        let total: u64 = points.iter().map(|p| p.value).sum();
        assert_eq!(total, 2);
        // Records far in the past collapse onto the first anchor.
        assert_eq!(points[0].value, 1);
        assert_eq!(points[5].value, 1);
    }

    #[test]
    fn bucketize_is_deterministic() {
        let records = [
            OccurrenceRecord::new("a", "FURTO", "ABERTO", "2024-11-01T12:00:00Z"),
            OccurrenceRecord::new("b", "ASSEDIO", "ABERTO", "2024-10-20T12:00:00Z"),
        ];
        let refs: Vec<&OccurrenceRecord> = records.iter().collect();
        let options = LabelOptions::default();
        assert_eq!(
            bucketize(&refs, &TimeFilter::Last30Days, now(), &options),
            bucketize(&refs, &TimeFilter::Last30Days, now(), &options)
        );
    }

    #[test]
    fn month_stepping_wraps_years() {
        let january = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let offset = FixedOffset::east_opt(0).unwrap();
        assert_eq!(
            month_start(month_index(&january) - 1, offset),
            Some(utc("2023-12-01T00:00:00Z"))
        );
        assert_eq!(
            month_start(month_index(&january) + 13, offset),
            Some(utc("2025-02-01T00:00:00Z"))
        );
    }
}
