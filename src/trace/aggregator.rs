//! Averages per-replica traces of one logical request.

use super::types::RequestTrace;

/// Build one representative trace from the traces of every replica that
/// answered the same request.
///
/// Only the request-side gateway and local daemon hop timestamps are averaged.
/// Identity fields, kernel-internal timestamps, reply-side timestamps and
/// extras are taken from the first trace as-is, and the traces are not checked
/// for sharing a message id.
///
/// Returns `None` for an empty slice.
pub fn average(traces: &[RequestTrace]) -> Option<RequestTrace> {
    let first = traces.first()?;
    let count = traces.len() as f64;

    let mean = |field: fn(&RequestTrace) -> f64| -> f64 {
        traces.iter().map(field).sum::<f64>() / count
    };

    let mut averaged = first.clone();
    averaged.request_received_by_gateway = mean(|t: &RequestTrace| t.request_received_by_gateway);
    averaged.request_sent_by_gateway = mean(|t: &RequestTrace| t.request_sent_by_gateway);
    averaged.request_received_by_local_daemon =
        mean(|t: &RequestTrace| t.request_received_by_local_daemon);
    averaged.request_sent_by_local_daemon = mean(|t: &RequestTrace| t.request_sent_by_local_daemon);

    tracing::trace!(
        message_id = %averaged.message_id,
        replicas = traces.len(),
        "Averaged request traces"
    );

    Some(averaged)
}
