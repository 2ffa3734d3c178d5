//! Plain-text rendering of dashboard data.
//!
//! Summaries become stat cards, the type distribution a small table,
//! and the flowrate series a labelled list, mirroring what the browser
//! dashboard charts would show.

use std::fmt::Write as _;

use flowdash_domain::constants::HISTORY_LIMIT;
use flowdash_domain::{flowrate_chart, type_chart, DatasetSummary};

/// Render one dataset summary as stat cards plus charts
pub fn render_summary(summary: &DatasetSummary) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Dataset #{}  uploaded {}", summary.id, summary.uploaded_at.to_rfc3339());
    let _ = writeln!(out, "  Rows:        {}", summary.total_count);
    let _ = writeln!(
        out,
        "  Flowrate:    avg {:.2}  min {:.2}  max {:.2}",
        summary.avg_flowrate, summary.min_flowrate, summary.max_flowrate
    );
    let _ = writeln!(
        out,
        "  Pressure:    avg {:.2}  min {:.2}  max {:.2}",
        summary.avg_pressure, summary.min_pressure, summary.max_pressure
    );
    let _ = writeln!(
        out,
        "  Temperature: avg {:.2}  min {:.2}  max {:.2}",
        summary.avg_temperature, summary.min_temperature, summary.max_temperature
    );

    let types = type_chart(&summary.type_distribution);
    if !types.labels.is_empty() {
        let _ = writeln!(out, "\n  {}:", types.label);
        for (label, count) in types.labels.iter().zip(&types.data) {
            let _ = writeln!(out, "    {label:<20} {count:>6.0}");
        }
    }

    let flow = flowrate_chart(&summary.rows);
    if !flow.labels.is_empty() {
        let _ = writeln!(out, "\n  {} (first {} rows):", flow.label, flow.labels.len());
        for (label, value) in flow.labels.iter().zip(&flow.data) {
            let _ = writeln!(out, "    {label:<20} {value:>10.2}");
        }
    }

    out.trim_end().to_string()
}

/// Render the upload history as one line per dataset
pub fn render_history(entries: &[DatasetSummary]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Recent uploads (backend keeps the last {HISTORY_LIMIT}):");
    for entry in entries {
        let _ = writeln!(
            out,
            "  #{:<5} {}  {:>6} rows  avg flowrate {:.2}",
            entry.id,
            entry.uploaded_at.format("%Y-%m-%d %H:%M"),
            entry.total_count,
            entry.avg_flowrate
        );
    }
    out.trim_end().to_string()
}
