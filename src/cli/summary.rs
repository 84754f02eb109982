//! Prints the human-facing run summary to the console (spec §7: "all
//! recoverable errors are surfaced in the final summary with counts").

use colored::*;
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};

use crate::pipeline::RunSummary;

pub fn print_summary(summary: &RunSummary) {
    println!("{}", "Run summary".cyan().bold());

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![Cell::new("Metric").fg(Color::Green), Cell::new("Value").fg(Color::Green)]);

    table.add_row(vec![Cell::new("Rows read"), Cell::new(summary.total_rows_read.to_string())]);
    table.add_row(vec![Cell::new("Rows excluded (bad coords)"), Cell::new(summary.excluded_rows.to_string())]);
    table.add_row(vec![Cell::new("Sensors excluded (bad coords)"), Cell::new(summary.excluded_sensors.to_string())]);
    table.add_row(vec![
        Cell::new("Elected interval"),
        Cell::new(format!("{} min", summary.elected_interval.minutes())),
    ]);
    table.add_row(vec![Cell::new("Imputed half-hour samples"), Cell::new(summary.imputed_count.to_string())]);
    table.add_row(vec![Cell::new("Timestamps on axis"), Cell::new(summary.timestamps_total.to_string())]);
    table.add_row(vec![
        Cell::new("Timestamps accepted"),
        Cell::new(summary.timestamps_accepted.to_string()).fg(Color::Green),
    ]);
    table.add_row(vec![
        Cell::new("Timestamps dropped (< s_min)"),
        Cell::new(summary.timestamps_dropped_insufficient.to_string()),
    ]);
    table.add_row(vec![
        Cell::new("Task failures").add_attribute(Attribute::Bold),
        Cell::new(summary.task_failures.len().to_string()).fg(if summary.task_failures.is_empty() {
            Color::Green
        } else {
            Color::Yellow
        }),
    ]);
    table.add_row(vec![
        Cell::new("Kelurahan with no grid points"),
        Cell::new(summary.kelurahan_without_grid_points.len().to_string()),
    ]);
    println!("{table}");

    for (timestamp_type, wall_clock) in &summary.representative_timestamps {
        println!(
            "{} {} -> {}",
            "representative:".cyan(),
            timestamp_type.as_str(),
            wall_clock.format("%Y-%m-%d %H:%M:%S %z")
        );
    }

    for failure in &summary.task_failures {
        println!(
            "{} timestamp {}: {}",
            "warning:".yellow(),
            failure.timestamp_ms,
            failure.reason
        );
    }
}
