//! Latency breakdown of a segmented trace for display.

use super::aggregator::average;
use super::segmenter::segment;
use super::types::{RequestTrace, RequestTraceSplit, Timestamp};
use serde::Serialize;

/// One row of a latency breakdown table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownRow {
    pub index: usize,
    pub split: RequestTraceSplit,
    /// Fraction of the end-to-end latency spent in this split.
    /// `None` when the end-to-end latency is zero.
    pub relative_share: Option<f64>,
    /// Time from the start of the first split to the end of this one.
    pub cumulative_latency: f64,
    /// Set when the split's latency is negative.
    pub is_anomalous: bool,
}

/// Which trace a breakdown was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "replica_id", rename_all = "snake_case")]
pub enum BreakdownSource {
    Replica(i32),
    Average,
}

impl std::fmt::Display for BreakdownSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BreakdownSource::Replica(id) => write!(f, "Kernel #{}", id),
            BreakdownSource::Average => f.write_str("Average"),
        }
    }
}

/// Segmented trace plus derived totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceBreakdown {
    pub source: BreakdownSource,
    pub message_id: String,
    pub message_type: String,
    pub e2e_latency: f64,
    pub rows: Vec<BreakdownRow>,
}

impl TraceBreakdown {
    /// Segment `trace` and compute shares of the end-to-end latency.
    pub fn from_trace(
        source: BreakdownSource,
        trace: &RequestTrace,
        reply_received_at: Timestamp,
        initial_request_sent_at: Option<Timestamp>,
    ) -> Self {
        let splits = segment(reply_received_at, trace, initial_request_sent_at);
        let origin = splits
            .first()
            .map(|s| s.start)
            .unwrap_or(trace.request_received_by_gateway);
        let e2e_latency = reply_received_at - initial_request_sent_at.unwrap_or(origin);

        let rows = splits
            .into_iter()
            .enumerate()
            .map(|(index, split)| {
                let relative_share = if e2e_latency != 0.0 {
                    Some(split.latency / e2e_latency)
                } else {
                    None
                };
                let cumulative_latency = split.end - origin;
                let is_anomalous = split.latency < 0.0;
                if is_anomalous {
                    tracing::debug!(
                        message_id = %split.message_id,
                        split = %split.split_name,
                        latency = split.latency,
                        "Negative split latency"
                    );
                }
                BreakdownRow {
                    index,
                    split,
                    relative_share,
                    cumulative_latency,
                    is_anomalous,
                }
            })
            .collect();

        Self {
            source,
            message_id: trace.message_id.clone(),
            message_type: trace.message_type.clone(),
            e2e_latency,
            rows,
        }
    }

    /// Whether any split in this breakdown has a negative latency.
    pub fn has_anomalies(&self) -> bool {
        self.rows.iter().any(|r| r.is_anomalous)
    }
}

/// Build a breakdown for every replica trace, followed by an averaged one
/// when more than one replica answered.
pub fn breakdowns(
    traces: &[RequestTrace],
    reply_received_at: Timestamp,
    initial_request_sent_at: Option<Timestamp>,
) -> Vec<TraceBreakdown> {
    let mut result: Vec<TraceBreakdown> = traces
        .iter()
        .map(|trace| {
            TraceBreakdown::from_trace(
                BreakdownSource::Replica(trace.replica_id),
                trace,
                reply_received_at,
                initial_request_sent_at,
            )
        })
        .collect();

    if traces.len() > 1 {
        if let Some(averaged) = average(traces) {
            result.push(TraceBreakdown::from_trace(
                BreakdownSource::Average,
                &averaged,
                reply_received_at,
                initial_request_sent_at,
            ));
        }
    }

    result
}
