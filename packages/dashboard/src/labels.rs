//! Locale-aware bucket labels.

use chrono::{DateTime, Datelike, Timelike, Utc};
use sentinel_dashboard_models::{LabelLocale, LabelOptions};

const WEEKDAYS_PT: [&str; 7] = ["seg", "ter", "qua", "qui", "sex", "sáb", "dom"];
const WEEKDAYS_EN: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

const MONTHS_PT: [&str; 12] = [
    "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
];
const MONTHS_EN: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// How an anchor instant is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelFormat {
    /// `HH:MM`
    HourMinute,
    /// `HH:00`
    Hour,
    /// Weekday abbreviation.
    Weekday,
    /// `DD/MM`
    DayMonth,
    /// `MMM/YY`
    MonthYear,
}

/// Renders `at` in the configured offset and locale.
#[must_use]
pub fn format_label(at: DateTime<Utc>, format: LabelFormat, options: &LabelOptions) -> String {
    let local = at.with_timezone(&options.offset);
    match format {
        LabelFormat::HourMinute => format!("{:02}:{:02}", local.hour(), local.minute()),
        LabelFormat::Hour => format!("{:02}:00", local.hour()),
        LabelFormat::Weekday => {
            let idx = local.weekday().num_days_from_monday() as usize;
            match options.locale {
                LabelLocale::PtBr => WEEKDAYS_PT[idx],
                LabelLocale::EnUs => WEEKDAYS_EN[idx],
            }
            .to_string()
        }
        LabelFormat::DayMonth => format!("{:02}/{:02}", local.day(), local.month()),
        LabelFormat::MonthYear => {
            let idx = local.month0() as usize;
            let month = match options.locale {
                LabelLocale::PtBr => MONTHS_PT[idx],
                LabelLocale::EnUs => MONTHS_EN[idx],
            };
            format!("{month}/{:02}", local.year().rem_euclid(100))
        }
    }
}
