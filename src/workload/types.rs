//! Workload data model as pushed by the workload driver.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Deserialize `null` as the type's default (Go encodes empty slices as `null`).
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Lifecycle state of a workload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WorkloadState {
    /// Registered and ready to be started.
    Ready,
    Running,
    /// Finishing the current tick before pausing.
    Pausing,
    Paused,
    /// Stopped after processing all events.
    Finished,
    /// Stopped because of an error.
    Erred,
    /// Stopped early on request.
    Terminated,
    Unknown(String),
}

impl WorkloadState {
    pub fn as_str(&self) -> &str {
        match self {
            WorkloadState::Ready => "WorkloadReady",
            WorkloadState::Running => "WorkloadRunning",
            WorkloadState::Pausing => "WorkloadPausing",
            WorkloadState::Paused => "WorkloadPaused",
            WorkloadState::Finished => "WorkloadFinished",
            WorkloadState::Erred => "WorkloadErred",
            WorkloadState::Terminated => "WorkloadTerminated",
            WorkloadState::Unknown(s) => s,
        }
    }

    /// Short label for tables.
    pub fn label(&self) -> &str {
        match self {
            WorkloadState::Ready => "Ready",
            WorkloadState::Running => "Running",
            WorkloadState::Pausing => "Pausing",
            WorkloadState::Paused => "Paused",
            WorkloadState::Finished => "Complete",
            WorkloadState::Erred => "Erred",
            WorkloadState::Terminated => "Terminated",
            WorkloadState::Unknown(_) => "Unknown",
        }
    }

    /// Finished, erred or terminated.
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            WorkloadState::Finished | WorkloadState::Erred | WorkloadState::Terminated
        )
    }

    /// Running, pausing or paused.
    pub fn is_in_progress(&self) -> bool {
        matches!(
            self,
            WorkloadState::Running | WorkloadState::Pausing | WorkloadState::Paused
        )
    }

    pub fn is_paused_or_pausing(&self) -> bool {
        matches!(self, WorkloadState::Pausing | WorkloadState::Paused)
    }
}

impl Default for WorkloadState {
    fn default() -> Self {
        WorkloadState::Unknown(String::new())
    }
}

impl From<String> for WorkloadState {
    fn from(s: String) -> Self {
        match s.as_str() {
            "WorkloadReady" => WorkloadState::Ready,
            "WorkloadRunning" => WorkloadState::Running,
            "WorkloadPausing" => WorkloadState::Pausing,
            "WorkloadPaused" => WorkloadState::Paused,
            "WorkloadFinished" => WorkloadState::Finished,
            "WorkloadErred" => WorkloadState::Erred,
            "WorkloadTerminated" => WorkloadState::Terminated,
            _ => WorkloadState::Unknown(s),
        }
    }
}

impl From<WorkloadState> for String {
    fn from(state: WorkloadState) -> Self {
        match state {
            WorkloadState::Unknown(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for WorkloadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A workload registered with the cluster.
///
/// Keys not modelled here are kept in `extra` so that merge patches touching
/// them survive a round trip through this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workload {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "workload_state", default, deserialize_with = "null_as_default")]
    pub state: WorkloadState,
    #[serde(default, deserialize_with = "null_as_default")]
    pub seed: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub timescale_adjustment_factor: f64,
    #[serde(default)]
    pub registered_time: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub time_elapsed: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub time_elapsed_str: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub num_tasks_executed: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub num_active_sessions: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub num_sessions_created: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub num_events_processed: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub num_active_trainings: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub debug_logging_enabled: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub error_message: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub simulation_clock_time: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub current_tick: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tick_durations_milliseconds: Vec<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sum_tick_durations_millis: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub events_processed: Vec<WorkloadEvent>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sessions: Vec<Session>,
    #[serde(flatten)]
    pub extra: Unmodelled,
}

impl Workload {
    /// Minimal workload with the given id and name, everything else defaulted.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            state: WorkloadState::Ready,
            seed: 0,
            timescale_adjustment_factor: 1.0,
            registered_time: None,
            start_time: None,
            time_elapsed: 0.0,
            time_elapsed_str: String::new(),
            num_tasks_executed: 0,
            num_active_sessions: 0,
            num_sessions_created: 0,
            num_events_processed: 0,
            num_active_trainings: 0,
            debug_logging_enabled: false,
            error_message: String::new(),
            simulation_clock_time: String::new(),
            current_tick: 0,
            tick_durations_milliseconds: Vec::new(),
            sum_tick_durations_millis: 0.0,
            events_processed: Vec::new(),
            sessions: Vec::new(),
            extra: Unmodelled::new(),
        }
    }

    /// Number of sessions that are idle or training, counted from `sessions`.
    pub fn num_active_sessions_observed(&self) -> usize {
        self.sessions
            .iter()
            .filter(|s| s.state == "idle" || s.state == "training")
            .count()
    }
}

/// Keys of a nested driver object that this crate does not model.
pub type Unmodelled = serde_json::Map<String, serde_json::Value>;

/// One processed workload event. Never modified once received.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkloadEvent {
    pub idx: i64,
    pub id: String,
    pub name: String,
    /// Target session id
    pub session: String,
    /// Logical event time
    pub timestamp: String,
    /// Real time at which the event was processed
    pub processed_at: String,
    /// Simulation clock time at which the event was processed
    pub sim_processed_at: String,
    pub processed_successfully: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub status: String,
    #[serde(flatten)]
    pub extra: Unmodelled,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceRequest {
    /// Millicpus (1/1000 of a core)
    pub cpus: f64,
    pub gpus: f64,
    /// GPU memory in GB
    pub vram: f64,
    pub memory_mb: f64,
    pub gpu_type: String,
    #[serde(flatten)]
    pub extra: Unmodelled,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Session {
    pub id: String,
    pub form_id: String,
    pub state: String,
    pub start_tick: i64,
    pub stop_tick: i64,
    pub max_resource_request: Option<ResourceRequest>,
    pub current_resource_request: Option<ResourceRequest>,
    #[serde(deserialize_with = "null_as_default")]
    pub trainings: Vec<TrainingEvent>,
    pub trainings_completed: u64,
    pub error_message: String,
    #[serde(deserialize_with = "null_as_default")]
    pub stderr_io_pub_messages: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub stdout_io_pub_messages: Vec<String>,
    /// Nanoseconds, as Go encodes a `time.Duration`
    pub total_delay: i64,
    pub total_delay_milliseconds: i64,
    pub discarded: bool,
    pub failed_ticks: u64,
    #[serde(flatten)]
    pub extra: Unmodelled,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingEvent {
    pub training_index: i64,
    #[serde(rename = "cpus")]
    pub millicpus: f64,
    #[serde(rename = "memory")]
    pub mem_usage_mb: f64,
    #[serde(rename = "vram")]
    pub vram_usage_gb: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub gpu_utilizations: Vec<GpuUtilization>,
    pub start_tick: i64,
    pub duration_in_ticks: i64,
    #[serde(flatten)]
    pub extra: Unmodelled,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GpuUtilization {
    pub utilization: f64,
    #[serde(flatten)]
    pub extra: Unmodelled,
}
