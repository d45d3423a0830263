//! Splits a request trace into named latency segments.

use super::types::{RequestTrace, RequestTraceSplit, SplitName, Timestamp};

/// Number of splits produced for requests whose kernel work is not broken down.
pub const SPLIT_COUNT: usize = 11;

/// Number of splits produced for `execute_request` and `yield_request`.
pub const SPLIT_COUNT_WITH_KERNEL_PHASES: usize = 15;

/// Segment a single replica's trace into its ordered hop-by-hop splits.
///
/// `reply_received_at` is the client's own clock reading when the reply
/// arrived. When `initial_request_sent_at` is `None` the first split collapses
/// to a zero-length interval at `request_received_by_gateway`.
///
/// The order of the returned splits follows the request's path through the
/// cluster, never the timestamp values. Latencies are `end - start` and may be
/// negative when clocks across hosts disagree.
pub fn segment(
    reply_received_at: Timestamp,
    trace: &RequestTrace,
    initial_request_sent_at: Option<Timestamp>,
) -> Vec<RequestTraceSplit> {
    let split = |split_name: SplitName, start: Timestamp, end: Timestamp| RequestTraceSplit {
        message_id: trace.message_id.clone(),
        message_type: trace.message_type.clone(),
        kernel_id: trace.kernel_id.clone(),
        replica_id: trace.replica_id,
        split_name,
        start,
        end,
        latency: end - start,
    };

    let capacity = if trace.has_kernel_phases() {
        SPLIT_COUNT_WITH_KERNEL_PHASES
    } else {
        SPLIT_COUNT
    };
    let mut splits = Vec::with_capacity(capacity);

    let client_start = initial_request_sent_at.unwrap_or(trace.request_received_by_gateway);
    splits.push(split(
        SplitName::ClientToGlobalScheduler,
        client_start,
        trace.request_received_by_gateway,
    ));

    // Request path
    splits.push(split(
        SplitName::GlobalSchedulerProcessRequest,
        trace.request_received_by_gateway,
        trace.request_sent_by_gateway,
    ));
    splits.push(split(
        SplitName::GlobalSchedulerToLocalScheduler,
        trace.request_sent_by_gateway,
        trace.request_received_by_local_daemon,
    ));
    splits.push(split(
        SplitName::LocalSchedulerProcessRequest,
        trace.request_received_by_local_daemon,
        trace.request_sent_by_local_daemon,
    ));
    splits.push(split(
        SplitName::LocalSchedulerToKernel,
        trace.request_sent_by_local_daemon,
        trace.request_received_by_kernel_replica,
    ));

    if trace.has_kernel_phases() {
        splits.push(split(
            SplitName::KernelPreprocessRequest,
            trace.request_received_by_kernel_replica,
            trace.election_creation_time,
        ));
        splits.push(split(
            SplitName::KernelCreateElection,
            trace.election_creation_time,
            trace.election_proposal_phase_start_time,
        ));
        splits.push(split(
            SplitName::KernelElectionProposalAndVoting,
            trace.election_proposal_phase_start_time,
            trace.election_execution_phase_start_time,
        ));
        splits.push(split(
            SplitName::KernelExecuteCode,
            trace.execution_start_unix_millis,
            trace.execution_end_unix_millis,
        ));
        splits.push(split(
            SplitName::KernelPostprocessRequest,
            trace.execution_end_unix_millis,
            trace.reply_sent_by_kernel_replica,
        ));
    } else {
        splits.push(split(
            SplitName::KernelProcessRequest,
            trace.request_received_by_kernel_replica,
            trace.reply_sent_by_kernel_replica,
        ));
    }

    // Reply path
    splits.push(split(
        SplitName::KernelToLocalScheduler,
        trace.reply_sent_by_kernel_replica,
        trace.reply_received_by_local_daemon,
    ));
    splits.push(split(
        SplitName::LocalSchedulerProcessReply,
        trace.reply_received_by_local_daemon,
        trace.reply_sent_by_local_daemon,
    ));
    splits.push(split(
        SplitName::LocalSchedulerToGlobalScheduler,
        trace.reply_sent_by_local_daemon,
        trace.reply_received_by_gateway,
    ));
    splits.push(split(
        SplitName::GlobalSchedulerProcessReply,
        trace.reply_received_by_gateway,
        trace.reply_sent_by_gateway,
    ));
    splits.push(split(
        SplitName::GlobalSchedulerToClient,
        trace.reply_sent_by_gateway,
        reply_received_at,
    ));

    splits
}
