#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Time filter, interval, chart and statistics types for the occurrence
//! dashboard.
//!
//! These are plain values: the aggregation engine in `sentinel_dashboard`
//! produces them, and any frontend (CLI, web) renders them.

use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Tag of a [`TimeFilter`], without the custom-range payload.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum TimeFilterKind {
    #[serde(rename = "1h")]
    #[strum(serialize = "1h")]
    LastHour,
    #[serde(rename = "1d")]
    #[strum(serialize = "1d")]
    LastDay,
    #[serde(rename = "7d")]
    #[strum(serialize = "7d")]
    Last7Days,
    #[serde(rename = "30d")]
    #[strum(serialize = "30d")]
    Last30Days,
    #[serde(rename = "90d")]
    #[strum(serialize = "90d")]
    Last90Days,
    #[serde(rename = "all")]
    #[strum(serialize = "all")]
    All,
    #[serde(rename = "custom")]
    #[strum(serialize = "custom")]
    Custom,
}

/// An explicit `[start, end]` range chosen by the user.
///
/// Construction validates `start <= end`, so every `CustomRange` in
/// circulation is well-formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "CustomRangeRepr")]
pub struct CustomRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

#[derive(Deserialize)]
struct CustomRangeRepr {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<CustomRangeRepr> for CustomRange {
    type Error = InvalidRangeError;

    fn try_from(value: CustomRangeRepr) -> Result<Self, Self::Error> {
        Self::new(value.start, value.end)
    }
}

impl CustomRange {
    /// Creates a range from two instants.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRangeError`] if `end` is before `start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, InvalidRangeError> {
        if end < start {
            return Err(InvalidRangeError { start, end });
        }
        Ok(Self { start, end })
    }

    /// Creates a range covering whole calendar days in the given offset:
    /// from `start_date` 00:00:00.000 through `end_date` 23:59:59.999.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRangeError`] if `end_date` is before `start_date`.
    pub fn from_dates(
        start_date: NaiveDate,
        end_date: NaiveDate,
        offset: FixedOffset,
    ) -> Result<Self, InvalidRangeError> {
        let start = local_to_utc(start_date.and_time(NaiveTime::MIN), offset);
        let end_of_day = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
        let end = local_to_utc(end_date.and_time(end_of_day), offset);
        Self::new(start, end)
    }

    /// Inclusive start instant.
    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Inclusive end instant.
    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Length of the range.
    #[must_use]
    pub fn span(&self) -> TimeDelta {
        self.end - self.start
    }
}

fn local_to_utc(local: NaiveDateTime, offset: FixedOffset) -> DateTime<Utc> {
    let shifted = local - TimeDelta::seconds(i64::from(offset.local_minus_utc()));
    DateTime::from_naive_utc_and_offset(shifted, Utc)
}

/// Error returned when a custom range ends before it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidRangeError {
    /// The requested start.
    pub start: DateTime<Utc>,
    /// The requested end, which precedes `start`.
    pub end: DateTime<Utc>,
}

impl std::fmt::Display for InvalidRangeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid range: end {} is before start {}",
            self.end.to_rfc3339(),
            self.start.to_rfc3339()
        )
    }
}

impl std::error::Error for InvalidRangeError {}

/// The window of occurrences the dashboard aggregates over.
///
/// Preset filters are relative to "now", which is always supplied by the
/// caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum TimeFilter {
    #[serde(rename = "1h")]
    LastHour,
    #[serde(rename = "1d")]
    LastDay,
    #[serde(rename = "7d")]
    Last7Days,
    #[default]
    #[serde(rename = "30d")]
    Last30Days,
    #[serde(rename = "90d")]
    Last90Days,
    #[serde(rename = "all")]
    All,
    #[serde(rename = "custom")]
    Custom(CustomRange),
}

impl TimeFilter {
    /// Returns the tag of this filter.
    #[must_use]
    pub const fn kind(&self) -> TimeFilterKind {
        match self {
            Self::LastHour => TimeFilterKind::LastHour,
            Self::LastDay => TimeFilterKind::LastDay,
            Self::Last7Days => TimeFilterKind::Last7Days,
            Self::Last30Days => TimeFilterKind::Last30Days,
            Self::Last90Days => TimeFilterKind::Last90Days,
            Self::All => TimeFilterKind::All,
            Self::Custom(_) => TimeFilterKind::Custom,
        }
    }

    /// Builds the payload-free filter for a tag. Returns `None` for
    /// [`TimeFilterKind::Custom`], which needs an explicit range.
    #[must_use]
    pub const fn preset(kind: TimeFilterKind) -> Option<Self> {
        match kind {
            TimeFilterKind::LastHour => Some(Self::LastHour),
            TimeFilterKind::LastDay => Some(Self::LastDay),
            TimeFilterKind::Last7Days => Some(Self::Last7Days),
            TimeFilterKind::Last30Days => Some(Self::Last30Days),
            TimeFilterKind::Last90Days => Some(Self::Last90Days),
            TimeFilterKind::All => Some(Self::All),
            TimeFilterKind::Custom => None,
        }
    }

    /// Look-back length of a rolling preset. `None` for `All` and `Custom`.
    #[must_use]
    pub const fn lookback(&self) -> Option<TimeDelta> {
        match self {
            Self::LastHour => Some(TimeDelta::hours(1)),
            Self::LastDay => Some(TimeDelta::hours(24)),
            Self::Last7Days => Some(TimeDelta::days(7)),
            Self::Last30Days => Some(TimeDelta::days(30)),
            Self::Last90Days => Some(TimeDelta::days(90)),
            Self::All | Self::Custom(_) => None,
        }
    }

    /// The custom range carried by this filter, if any.
    #[must_use]
    pub const fn custom_range(&self) -> Option<&CustomRange> {
        match self {
            Self::Custom(range) => Some(range),
            _ => None,
        }
    }
}

impl std::fmt::Display for TimeFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Custom(range) => write!(
                f,
                "custom({}..={})",
                range.start.to_rfc3339(),
                range.end.to_rfc3339()
            ),
            other => write!(f, "{}", other.kind()),
        }
    }
}

/// Error returned when a filter tag cannot be parsed into a preset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTimeFilterError {
    /// The rejected input.
    pub input: String,
}

impl std::fmt::Display for ParseTimeFilterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown time filter {:?}: expected one of 1h, 1d, 7d, 30d, 90d, all",
            self.input
        )
    }
}

impl std::error::Error for ParseTimeFilterError {}

impl FromStr for TimeFilter {
    type Err = ParseTimeFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeFilterKind::from_str(s.trim())
            .ok()
            .and_then(Self::preset)
            .ok_or_else(|| ParseTimeFilterError {
                input: s.to_string(),
            })
    }
}

/// A concrete window of instants. Bounded intervals include both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    /// No bounds; everything matches.
    Unbounded,
    /// `[start, end]`.
    Bounded {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl Interval {
    /// Whether `instant` falls inside this interval.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        match self {
            Self::Unbounded => true,
            Self::Bounded { start, end } => *start <= instant && instant <= *end,
        }
    }
}

/// One labelled value in a chart series.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChartDataPoint {
    /// Display label (bucket label or category code).
    pub label: String,
    /// Number of occurrences.
    pub value: u64,
}

impl ChartDataPoint {
    #[must_use]
    pub fn new(label: impl Into<String>, value: u64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Headline counts for the statistics panel.
///
/// `resolved + in_progress + open == total` always holds for values
/// produced by the summarizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStatistics {
    pub total: u64,
    pub resolved: u64,
    pub in_progress: u64,
    pub open: u64,
}

impl DashboardStatistics {
    /// Share of each class in the total, rounded to whole percent.
    #[must_use]
    pub fn percentages(&self) -> StatisticsPercentages {
        StatisticsPercentages {
            resolved: percentage_of(self.resolved, self.total),
            in_progress: percentage_of(self.in_progress, self.total),
            open: percentage_of(self.open, self.total),
        }
    }
}

/// Rounded percentage of `part` in `total`; 0 when `total` is 0.
#[must_use]
pub fn percentage_of(part: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let rounded = (part.saturating_mul(200) + total) / total.saturating_mul(2);
    u8::try_from(rounded).unwrap_or(u8::MAX)
}

/// Percentages derived from [`DashboardStatistics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsPercentages {
    pub resolved: u8,
    pub in_progress: u8,
    pub open: u8,
}

/// Language used for weekday and month abbreviations in bucket labels.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum LabelLocale {
    /// Brazilian Portuguese (`seg`, `jan/25`).
    #[default]
    #[serde(rename = "pt-br")]
    #[strum(to_string = "pt-br", serialize = "pt_br", serialize = "pt")]
    PtBr,
    /// US English (`Mon`, `Jan/25`).
    #[serde(rename = "en-us")]
    #[strum(to_string = "en-us", serialize = "en_us", serialize = "en")]
    EnUs,
}

/// How bucket labels are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelOptions {
    /// Abbreviation language.
    pub locale: LabelLocale,
    /// Offset used for clock times and calendar-month boundaries.
    pub offset: FixedOffset,
}

impl Default for LabelOptions {
    fn default() -> Self {
        Self {
            locale: LabelLocale::default(),
            offset: Utc.fix(),
        }
    }
}

impl LabelOptions {
    /// Options with an offset given in minutes east of UTC. Returns `None`
    /// if the offset is out of range.
    #[must_use]
    pub fn with_offset_minutes(locale: LabelLocale, minutes: i32) -> Option<Self> {
        let offset = FixedOffset::east_opt(minutes.checked_mul(60)?)?;
        Some(Self { locale, offset })
    }
}

/// Everything a dashboard view renders for one filter selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    /// The filter the series were computed for.
    pub filter: TimeFilter,
    /// Occurrence counts per time bucket, chronological.
    pub by_time: Vec<ChartDataPoint>,
    /// Occurrence counts per type, first-seen order.
    pub by_type: Vec<ChartDataPoint>,
    /// Occurrence counts per canonical status.
    pub by_status: Vec<ChartDataPoint>,
    /// Occurrence counts per inferred severity.
    pub by_severity: Vec<ChartDataPoint>,
    /// Headline counts over the filtered set.
    pub statistics: DashboardStatistics,
    /// Size of the raw collection before filtering.
    pub raw_count: u64,
    /// Raw records whose timestamp could not be parsed.
    pub unparseable_timestamps: u64,
}
