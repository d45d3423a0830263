//! Trace command implementation

use crate::cli::output::{format_breakdowns, format_breakdowns_json};
use crate::cli::TraceArgs;
use crate::trace::{breakdowns, PongResponse, RequestTrace};
use serde::Deserialize;

/// Accepted file contents: a full ping response, a trace array or one trace.
#[derive(Deserialize)]
#[serde(untagged)]
enum TraceFile {
    Pong(PongResponse),
    Traces(Vec<RequestTrace>),
    Single(Box<RequestTrace>),
}

impl TraceFile {
    fn into_traces(self) -> Vec<RequestTrace> {
        match self {
            TraceFile::Pong(pong) => pong.request_traces,
            TraceFile::Traces(traces) => traces,
            TraceFile::Single(trace) => vec![*trace],
        }
    }
}

/// Parse saved traces from JSON text.
pub fn parse_traces(content: &str) -> Result<Vec<RequestTrace>, serde_json::Error> {
    serde_json::from_str::<TraceFile>(content).map(TraceFile::into_traces)
}

/// Handle `clusterview trace`
pub fn handle_trace(args: &TraceArgs) -> Result<String, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(&args.file)
        .map_err(|e| format!("Failed to read {}: {}", args.file.display(), e))?;
    let traces = parse_traces(&content).map_err(|e| {
        format!(
            "{} is not a ping response or trace list: {}",
            args.file.display(),
            e
        )
    })?;

    let result = breakdowns(&traces, args.reply_received_at, args.request_sent_at);

    if args.json {
        Ok(format_breakdowns_json(&result)?)
    } else {
        Ok(format_breakdowns(&result))
    }
}
