//! Output formatting helpers for CLI commands

use crate::trace::TraceBreakdown;
use crate::workload::{PendingAction, WorkloadSnapshot, WorkloadState, WorkloadView};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde_json::json;

/// Colored label for a workload state
pub fn state_label(state: &WorkloadState) -> String {
    let label = state.label();
    match state {
        WorkloadState::Ready => label.cyan().to_string(),
        WorkloadState::Running => label.green().to_string(),
        WorkloadState::Pausing | WorkloadState::Paused => label.yellow().to_string(),
        WorkloadState::Finished => label.blue().to_string(),
        WorkloadState::Erred => label.red().to_string(),
        WorkloadState::Terminated => label.magenta().to_string(),
        WorkloadState::Unknown(_) => label.dimmed().to_string(),
    }
}

fn pending_suffix(pending: Option<PendingAction>) -> String {
    match pending {
        Some(action) => format!(" ({}…)", action.label()).dimmed().to_string(),
        None => String::new(),
    }
}

/// Format workloads as a table
pub fn format_workloads_table(snapshot: &WorkloadSnapshot) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Name", "ID", "State", "Seed", "Events", "Sessions", "Tasks", "Elapsed", "Debug Logs",
    ]);

    for WorkloadView { workload, pending } in snapshot.views() {
        let debug = if workload.debug_logging_enabled {
            "on".green().to_string()
        } else {
            "off".to_string()
        };

        table.add_row(vec![
            Cell::new(&workload.name),
            Cell::new(&workload.id),
            Cell::new(format!("{}{}", state_label(&workload.state), pending_suffix(pending))),
            Cell::new(workload.seed),
            Cell::new(workload.num_events_processed),
            Cell::new(format!(
                "{}/{}",
                workload.num_active_sessions, workload.num_sessions_created
            )),
            Cell::new(workload.num_tasks_executed),
            Cell::new(&workload.time_elapsed_str),
            Cell::new(debug),
        ]);
    }

    table.to_string()
}

/// One line summary of workload counts per state
pub fn format_workloads_summary(snapshot: &WorkloadSnapshot) -> String {
    let counts = snapshot.count_by_state();
    if counts.is_empty() {
        return "No workloads registered".to_string();
    }
    let parts: Vec<String> = counts
        .iter()
        .map(|(state, count)| format!("{} {}", count, state))
        .collect();
    format!("{} workloads: {}", snapshot.len(), parts.join(", "))
}

/// Format workloads as JSON
pub fn format_workloads_json(snapshot: &WorkloadSnapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&json!({
        "workloads": snapshot.views()
    }))
}

fn format_share(share: Option<f64>) -> String {
    match share {
        Some(share) => format!("{:.2}%", share * 100.0),
        None => "-".to_string(),
    }
}

/// Format one latency breakdown as a table
pub fn format_breakdown_table(breakdown: &TraceBreakdown) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "#",
        "Split",
        "Start",
        "End",
        "Latency (ms)",
        "% of E2E",
        "Cumulative (ms)",
    ]);

    for row in &breakdown.rows {
        let latency = format!("{:.3}", row.split.latency);
        let latency = if row.is_anomalous {
            latency.red().to_string()
        } else {
            latency
        };

        table.add_row(vec![
            Cell::new(row.index),
            Cell::new(row.split.split_name.display_name()),
            Cell::new(format!("{:.3}", row.split.start)),
            Cell::new(format!("{:.3}", row.split.end)),
            Cell::new(latency),
            Cell::new(format_share(row.relative_share)),
            Cell::new(format!("{:.3}", row.cumulative_latency)),
        ]);
    }

    table.to_string()
}

/// Format a heading and table for every breakdown
pub fn format_breakdowns(breakdowns: &[TraceBreakdown]) -> String {
    if breakdowns.is_empty() {
        return "No request traces returned".to_string();
    }

    let mut out = String::new();
    for breakdown in breakdowns {
        out.push_str(&format!(
            "{} {} {}, end-to-end {:.3} ms\n",
            breakdown.source.to_string().bold(),
            breakdown.message_type,
            breakdown.message_id.dimmed(),
            breakdown.e2e_latency,
        ));
        if breakdown.has_anomalies() {
            out.push_str(&format!(
                "{}\n",
                "Negative latencies present, hop clocks may be skewed".yellow()
            ));
        }
        out.push_str(&format_breakdown_table(breakdown));
        out.push_str("\n\n");
    }
    out.trim_end().to_string()
}

/// Format breakdowns as JSON
pub fn format_breakdowns_json(breakdowns: &[TraceBreakdown]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&json!({
        "breakdowns": breakdowns
    }))
}
