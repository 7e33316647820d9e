//! Plain-text rendering of a dashboard snapshot.

use std::fmt::Write;

use sentinel_dashboard_models::{ChartDataPoint, DashboardSnapshot};
use sentinel_occurrence_models::display_label;

/// Renders the snapshot as aligned tables.
///
/// # Errors
///
/// Only fails if writing to the buffer fails.
pub fn render_tables(snapshot: &DashboardSnapshot) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    let stats = &snapshot.statistics;
    let pct = stats.percentages();

    writeln!(
        out,
        "Dashboard for {} ({} of {} occurrence(s))",
        snapshot.filter, stats.total, snapshot.raw_count
    )?;
    if snapshot.unparseable_timestamps > 0 {
        writeln!(
            out,
            "  {} occurrence(s) with unparseable timestamps",
            snapshot.unparseable_timestamps
        )?;
    }
    writeln!(out)?;

    writeln!(out, "{:<14} {:>6} {:>5}", "STATUS", "COUNT", "%")?;
    writeln!(out, "{:<14} {:>6} {:>4}%", "Resolved", stats.resolved, pct.resolved)?;
    writeln!(out, "{:<14} {:>6} {:>4}%", "In progress", stats.in_progress, pct.in_progress)?;
    writeln!(out, "{:<14} {:>6} {:>4}%", "Open", stats.open, pct.open)?;
    writeln!(out, "{:<14} {:>6}", "Total", stats.total)?;

    section(&mut out, "TIME", &snapshot.by_time, str::to_string)?;
    section(&mut out, "TYPE", &snapshot.by_type, display_label)?;
    section(&mut out, "STATUS", &snapshot.by_status, display_label)?;
    section(&mut out, "SEVERITY", &snapshot.by_severity, display_label)?;

    Ok(out)
}

fn section(
    out: &mut String,
    title: &str,
    points: &[ChartDataPoint],
    label: impl Fn(&str) -> String,
) -> std::fmt::Result {
    writeln!(out)?;
    writeln!(out, "{title:<24} COUNT")?;
    if points.is_empty() {
        writeln!(out, "  (none)")?;
    }
    for point in points {
        writeln!(out, "{:<24} {:>5}", label(&point.label), point.value)?;
    }
    Ok(())
}
