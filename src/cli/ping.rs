//! Ping command implementation

use crate::cli::output::{format_breakdowns, format_breakdowns_json};
use crate::cli::PingArgs;
use crate::context::AppContext;
use std::sync::Arc;

/// Handle `clusterview ping`
pub async fn handle_ping(
    ctx: Arc<AppContext>,
    args: &PingArgs,
) -> Result<String, Box<dyn std::error::Error>> {
    let outcome = tokio::select! {
        _ = ctx.cancel.cancelled() => return Err("Interrupted".into()),
        outcome = ctx.client.ping_kernel(&args.kernel_id, args.socket) => outcome?,
    };

    if !outcome.response.success {
        tracing::warn!(
            kernel_id = %args.kernel_id,
            msg = %outcome.response.msg,
            "Gateway reported ping failure"
        );
    }

    let breakdowns = outcome.breakdowns();
    if args.json {
        return Ok(format_breakdowns_json(&breakdowns)?);
    }

    let mut out = format!(
        "Pinged kernel {} over {} socket: {} replica(s), round trip {:.3} ms\n\n",
        outcome.kernel_id,
        outcome.socket_type,
        outcome.traces().len(),
        outcome.round_trip_ms()
    );
    out.push_str(&format_breakdowns(&breakdowns));
    Ok(out)
}
