//! Workload command handlers

use crate::cli::{Toggle, WorkloadCommands};
use crate::context::AppContext;
use crate::subscription::{reply_within, SubscriptionHandle};
use crate::workload::WorkloadSnapshot;
use std::sync::Arc;
use std::time::Duration;

fn require_workload(snapshot: &WorkloadSnapshot, id: &str) -> Result<(), String> {
    if snapshot.contains(id) {
        Ok(())
    } else {
        Err(format!("Unknown workload: {}", id))
    }
}

fn describe(snapshot: &WorkloadSnapshot, id: &str) -> String {
    match snapshot.get(id) {
        Some(w) if w.name.is_empty() => w.id.clone(),
        Some(w) => format!("{} ({})", w.name, w.id),
        None => id.to_string(),
    }
}

async fn execute(
    handle: &SubscriptionHandle,
    cmd: &WorkloadCommands,
    timeout: Duration,
) -> Result<String, Box<dyn std::error::Error>> {
    handle.wait_until_subscribed(timeout).await?;
    // Pause and stop-all decide what to send from the current list
    reply_within(handle.refresh()?, timeout).await?;

    let snapshot = handle.store().snapshot();
    let (rx, verb, id) = match cmd {
        WorkloadCommands::Start(args) => {
            require_workload(&snapshot, &args.id)?;
            (handle.start_workload(&args.id)?, "Start", Some(&args.id))
        }
        WorkloadCommands::Stop(args) => {
            require_workload(&snapshot, &args.id)?;
            (handle.stop_workload(&args.id)?, "Stop", Some(&args.id))
        }
        WorkloadCommands::Pause(args) => {
            require_workload(&snapshot, &args.id)?;
            let paused = snapshot
                .get(&args.id)
                .is_some_and(|w| w.state.is_paused_or_pausing());
            let verb = if paused { "Resume" } else { "Pause" };
            (handle.pause_workload(&args.id)?, verb, Some(&args.id))
        }
        WorkloadCommands::DebugLogs(args) => {
            require_workload(&snapshot, &args.id)?;
            let enabled = args.state == Toggle::On;
            let verb = if enabled {
                "Enable debug logs"
            } else {
                "Disable debug logs"
            };
            (
                handle.toggle_debug_logs(&args.id, enabled)?,
                verb,
                Some(&args.id),
            )
        }
        WorkloadCommands::StopAll(_) => {
            let running = snapshot.running_ids();
            if running.is_empty() {
                return Ok("No running workloads to stop".to_string());
            }
            (handle.stop_all_workloads()?, "Stop all", None)
        }
    };

    reply_within(rx, timeout).await?;

    let snapshot = handle.store().snapshot();
    Ok(match id {
        Some(id) => {
            let state = snapshot
                .get(id)
                .map(|w| w.state.label().to_string())
                .unwrap_or_else(|| "removed".to_string());
            format!(
                "✓ {} acknowledged for workload {}, now {}",
                verb,
                describe(&snapshot, id),
                state
            )
        }
        None => format!(
            "✓ {} acknowledged, {} workload(s) still running",
            verb,
            snapshot.running_ids().len()
        ),
    })
}

/// Handle `clusterview workload ...`
pub async fn handle_workload(
    ctx: Arc<AppContext>,
    cmd: &WorkloadCommands,
) -> Result<String, Box<dyn std::error::Error>> {
    let timeout = ctx.config.subscription.command_timeout();
    let (handle, task) = ctx.start_subscription()?;

    let result = tokio::select! {
        _ = ctx.cancel.cancelled() => Err("Interrupted".into()),
        result = execute(&handle, cmd, timeout) => result,
    };

    ctx.shutdown(vec![task]).await;
    result
}
