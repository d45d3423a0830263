//! Watch command implementation

use crate::cli::output::{format_workloads_json, format_workloads_summary, format_workloads_table};
use crate::cli::WatchArgs;
use crate::context::AppContext;
use crate::subscription::reply_within;
use crate::workload::WorkloadSnapshot;
use std::io::IsTerminal;
use std::sync::Arc;

fn render(snapshot: &WorkloadSnapshot, json: bool) -> Result<String, serde_json::Error> {
    if json {
        format_workloads_json(snapshot)
    } else {
        Ok(format!(
            "{}\n{}",
            format_workloads_table(snapshot),
            format_workloads_summary(snapshot)
        ))
    }
}

/// Handle `clusterview watch`
///
/// Prints the workload list after every published change until shutdown,
/// or once with `--once`.
pub async fn run_watch(
    ctx: Arc<AppContext>,
    args: &WatchArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let (handle, task) = ctx.start_subscription()?;

    if args.once {
        let timeout = ctx.config.subscription.command_timeout();
        let result = async {
            handle.wait_until_subscribed(timeout).await?;
            reply_within(handle.refresh()?, timeout).await?;
            Ok::<_, Box<dyn std::error::Error>>(render(&ctx.store.snapshot(), args.json)?)
        }
        .await;
        ctx.shutdown(vec![task]).await;
        println!("{}", result?);
        return Ok(());
    }

    let clear_screen = !args.json && std::io::stdout().is_terminal();
    let mut updates = ctx.store.subscribe();
    let mut state = handle.state_changes();

    loop {
        tokio::select! {
            _ = ctx.cancel.cancelled() => break,
            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = *state.borrow_and_update();
                if !args.json {
                    eprintln!("Subscription {}", current);
                }
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                let output = render(&snapshot, args.json)?;
                if clear_screen {
                    print!("\x1b[2J\x1b[H");
                }
                println!("{}", output);
            }
        }
    }

    ctx.shutdown(vec![task]).await;
    Ok(())
}
