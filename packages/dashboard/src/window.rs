//! Time-window resolution.
//!
//! Turns a [`TimeFilter`] into a concrete [`Interval`] against an explicit
//! "now", and decides whether a previously fetched window still covers a
//! newly selected one.

use chrono::{DateTime, Utc};
use sentinel_dashboard_models::{Interval, TimeFilter};

/// Resolves a filter to the interval it selects at `now`.
///
/// Rolling presets end at `now`; custom ranges are used verbatim; `All` is
/// unbounded.
#[must_use]
pub fn resolve(filter: &TimeFilter, now: DateTime<Utc>) -> Interval {
    match filter {
        TimeFilter::All => Interval::Unbounded,
        TimeFilter::Custom(range) => Interval::Bounded {
            start: range.start(),
            end: range.end(),
        },
        preset => preset.lookback().map_or(Interval::Unbounded, |lookback| {
            Interval::Bounded {
                start: now - lookback,
                end: now,
            }
        }),
    }
}

/// Whether data fetched for `held` at `fetched_at` contains everything
/// `requested` selects at `now`.
///
/// Rolling windows are open-ended towards the present: newer records are
/// a matter of refreshing, not of window coverage.
#[must_use]
pub fn covers(
    held: &TimeFilter,
    fetched_at: DateTime<Utc>,
    requested: &TimeFilter,
    now: DateTime<Utc>,
) -> bool {
    let (held_start, held_end) = match resolve(held, fetched_at) {
        Interval::Unbounded => return true,
        Interval::Bounded { start, end } => match held {
            TimeFilter::Custom(_) => (start, Some(end)),
            _ => (start, None),
        },
    };

    match resolve(requested, now) {
        Interval::Unbounded => false,
        Interval::Bounded { start, end } => {
            start >= held_start && held_end.is_none_or(|held_end| end <= held_end)
        }
    }
}
