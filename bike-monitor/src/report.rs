//! Plain-text tables for logs and the CLI.

use std::fmt::Write;

use crate::domain::{NetworkSummary, RankingEntry, StationSnapshot};

const RULE_WIDTH: usize = 78;
const NAME_WIDTH: usize = 28;

/// Render a ranking as a fixed-width table.
pub fn format_ranking_table(entries: &[RankingEntry]) -> String {
    let mut out = String::new();
    let rule = "=".repeat(RULE_WIDTH);

    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "Top {} stations by mean available bikes", entries.len());
    let _ = writeln!(out, "{rule}");

    if entries.is_empty() {
        let _ = writeln!(out, "No data available for analysis yet.");
        let _ = write!(out, "{rule}");
        return out;
    }

    let _ = writeln!(
        out,
        "{:<4} {:<NAME_WIDTH$} {:>10} {:>10} {:>10} {:>10}",
        "#", "Station", "Snapshots", "Total", "Avg bikes", "Util %"
    );
    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));

    for (rank, e) in entries.iter().enumerate() {
        let label = e
            .name
            .as_deref()
            .or(e.station_id.as_deref())
            .unwrap_or("(unnamed)");
        let _ = writeln!(
            out,
            "{:<4} {:<NAME_WIDTH$} {:>10} {:>10} {:>10} {:>10}",
            rank + 1,
            truncate(label, NAME_WIDTH),
            e.snapshot_count,
            e.total_bikes,
            opt_number(e.avg_bikes),
            opt_percent(e.avg_utilization_percent),
        );
    }

    let _ = write!(out, "{rule}");
    out
}

/// Render the latest cycle: totals followed by one line per station.
pub fn format_latest(summary: Option<&NetworkSummary>, rows: &[StationSnapshot]) -> String {
    let Some(summary) = summary else {
        return "No snapshot has been stored yet.".to_string();
    };

    let mut out = String::new();
    let _ = writeln!(out, "Latest snapshot: {}", summary.snapshot_time);
    let _ = writeln!(
        out,
        "Stations: {}  Bikes available: {}  Empty docks: {}",
        summary.station_count, summary.total_bikes, summary.total_docks
    );
    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));
    let _ = writeln!(
        out,
        "{:<NAME_WIDTH$} {:>8} {:>8} {:>10}",
        "Station", "Bikes", "Docks", "Util %"
    );

    for r in rows {
        let label = r.name.as_deref().or(r.station_id.as_deref()).unwrap_or("(unnamed)");
        let _ = writeln!(
            out,
            "{:<NAME_WIDTH$} {:>8} {:>8} {:>10}",
            truncate(label, NAME_WIDTH),
            opt_count(r.num_bikes_available),
            opt_count(r.num_docks_available),
            opt_percent(r.utilization_percent()),
        );
    }

    out.truncate(out.trim_end().len());
    out
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut t: String = s.chars().take(max_chars - 1).collect();
    t.push('…');
    t
}

fn opt_number(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.2}")).unwrap_or_else(|| "n/a".into())
}

fn opt_percent(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.2}%")).unwrap_or_else(|| "n/a".into())
}

fn opt_count(v: Option<u32>) -> String {
    v.map(|v| v.to_string()).unwrap_or_else(|| "-".into())
}
