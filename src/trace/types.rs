//! Request trace data types

use serde::{Deserialize, Serialize};

/// Absolute timestamp as reported by the cluster (unix milliseconds).
///
/// Kept as `f64` so that averaged traces can carry fractional values.
pub type Timestamp = f64;

/// Lifecycle timestamps of one request as it crossed the cluster.
///
/// One trace is produced per kernel replica that received the request, so
/// several traces may share the same `message_id`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestTrace {
    pub message_id: String,
    pub message_type: String,
    pub kernel_id: String,
    pub replica_id: i32,

    pub request_received_by_gateway: Timestamp,
    pub request_sent_by_gateway: Timestamp,
    pub request_received_by_local_daemon: Timestamp,
    pub request_sent_by_local_daemon: Timestamp,
    pub request_received_by_kernel_replica: Timestamp,
    pub reply_sent_by_kernel_replica: Timestamp,
    pub reply_received_by_local_daemon: Timestamp,
    pub reply_sent_by_local_daemon: Timestamp,
    pub reply_received_by_gateway: Timestamp,
    pub reply_sent_by_gateway: Timestamp,

    pub election_creation_time: Timestamp,
    pub election_proposal_phase_start_time: Timestamp,
    pub election_execution_phase_start_time: Timestamp,
    pub execution_start_unix_millis: Timestamp,
    pub execution_end_unix_millis: Timestamp,

    /// Extra measurements reported by the kernel; not used for segmentation.
    #[serde(flatten)]
    pub extras: TraceExtras,
}

/// Optional duration fields carried alongside a trace.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceExtras {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_trace_uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e2e_latency_milliseconds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuda_init_microseconds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_dependency_microseconds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_model_and_training_data_microseconds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_model_and_training_data_microseconds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_time_microseconds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replay_time_microseconds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copy_from_cpu_to_gpu_microseconds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copy_from_gpu_to_cpu_microseconds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leader_election_time_microseconds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub election_end_time: Option<Timestamp>,
}

impl RequestTrace {
    /// Whether the kernel-side work of this request is broken into sub-phases.
    pub fn has_kernel_phases(&self) -> bool {
        matches!(
            self.message_type.as_str(),
            "execute_request" | "yield_request"
        )
    }
}

/// Named hop of a request's path through the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SplitName {
    ClientToGlobalScheduler,
    GlobalSchedulerProcessRequest,
    GlobalSchedulerToLocalScheduler,
    LocalSchedulerProcessRequest,
    LocalSchedulerToKernel,
    KernelProcessRequest,
    KernelPreprocessRequest,
    KernelCreateElection,
    KernelElectionProposalAndVoting,
    KernelExecuteCode,
    KernelPostprocessRequest,
    KernelToLocalScheduler,
    LocalSchedulerProcessReply,
    LocalSchedulerToGlobalScheduler,
    GlobalSchedulerProcessReply,
    GlobalSchedulerToClient,
}

impl SplitName {
    /// Human-readable label.
    pub fn display_name(&self) -> &'static str {
        match self {
            SplitName::ClientToGlobalScheduler => "Client → Global Scheduler",
            SplitName::GlobalSchedulerProcessRequest => "Global Scheduler Processing Request",
            SplitName::GlobalSchedulerToLocalScheduler => "Global Scheduler → Local Scheduler",
            SplitName::LocalSchedulerProcessRequest => "Local Scheduler Processing Request",
            SplitName::LocalSchedulerToKernel => "Local Scheduler → Kernel",
            SplitName::KernelProcessRequest => "Kernel Processing Request",
            SplitName::KernelPreprocessRequest => "Kernel Preprocessing Request",
            SplitName::KernelCreateElection => "Kernel Creating Election",
            SplitName::KernelElectionProposalAndVoting => "Kernel Election Proposal & Voting",
            SplitName::KernelExecuteCode => "Kernel Executing Code",
            SplitName::KernelPostprocessRequest => "Kernel Postprocessing Request",
            SplitName::KernelToLocalScheduler => "Kernel → Local Scheduler",
            SplitName::LocalSchedulerProcessReply => "Local Scheduler Processing Reply",
            SplitName::LocalSchedulerToGlobalScheduler => "Local Scheduler → Global Scheduler",
            SplitName::GlobalSchedulerProcessReply => "Global Scheduler Processing Reply",
            SplitName::GlobalSchedulerToClient => "Global Scheduler → Client",
        }
    }
}

impl std::fmt::Display for SplitName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A named interval derived from a [`RequestTrace`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestTraceSplit {
    pub message_id: String,
    pub message_type: String,
    pub kernel_id: String,
    pub replica_id: i32,
    pub split_name: SplitName,
    pub start: Timestamp,
    pub end: Timestamp,
    /// Always `end - start`; negative when the source clocks disagree.
    pub latency: f64,
}

/// Sent by the gateway in response to pinging a kernel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PongResponse {
    pub id: String,
    pub success: bool,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub request_traces: Vec<RequestTrace>,
}
