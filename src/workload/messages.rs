//! Messages exchanged over the workload WebSocket.

use super::types::Workload;
use serde::{Deserialize, Deserializer, Serialize};

/// Status value of a successful response.
pub const STATUS_OK: &str = "OK";

/// Deserialize an optional batch, dropping `null` entries.
fn batch<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let entries: Option<Vec<Option<T>>> = Option::deserialize(deserializer)?;
    Ok(entries.unwrap_or_default().into_iter().flatten().collect())
}

/// A JSON merge patch for one workload, encoded as a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchedWorkload {
    #[serde(rename = "workloadId")]
    pub workload_id: String,
    pub patch: String,
}

/// Push or reply message carrying workload changes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkloadResponse {
    #[serde(default)]
    pub msg_id: String,
    #[serde(default)]
    pub op: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "batch")]
    pub new_workloads: Vec<Workload>,
    #[serde(default, deserialize_with = "batch")]
    pub modified_workloads: Vec<Workload>,
    #[serde(default, deserialize_with = "batch")]
    pub deleted_workloads: Vec<Workload>,
    #[serde(default, deserialize_with = "batch")]
    pub patched_workloads: Vec<PatchedWorkload>,
}

impl WorkloadResponse {
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }

    /// Whether the message carries no workload changes at all.
    pub fn is_empty(&self) -> bool {
        self.new_workloads.is_empty()
            && self.modified_workloads.is_empty()
            && self.deleted_workloads.is_empty()
            && self.patched_workloads.is_empty()
    }
}

/// Failure reply to a control request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub msg_id: String,
    #[serde(default)]
    pub op: String,
    #[serde(default)]
    pub status: String,
    #[serde(rename = "ErrorMessage", default)]
    pub error_message: String,
    #[serde(rename = "Description", default)]
    pub description: String,
    #[serde(rename = "Valid", default)]
    pub valid: bool,
}

impl std::fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.description.is_empty() {
            write!(f, "'{}' failed: {}", self.op, self.error_message)
        } else {
            write!(
                f,
                "'{}' failed: {} ({})",
                self.op, self.error_message, self.description
            )
        }
    }
}

/// Decoded inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    Response(WorkloadResponse),
    Error(ErrorResponse),
}

impl InboundMessage {
    /// Decode a frame: responses with status `OK` are workload responses,
    /// anything else is an error response.
    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        let response: WorkloadResponse = serde_json::from_str(text)?;
        if response.is_ok() {
            return Ok(InboundMessage::Response(response));
        }
        let error: ErrorResponse = serde_json::from_str(text)?;
        Ok(InboundMessage::Error(error))
    }

    pub fn msg_id(&self) -> &str {
        match self {
            InboundMessage::Response(r) => &r.msg_id,
            InboundMessage::Error(e) => &e.msg_id,
        }
    }
}

/// Control request sent to the workload driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ControlRequest {
    Subscribe {
        msg_id: String,
    },
    GetWorkloads {
        msg_id: String,
    },
    StartWorkload {
        msg_id: String,
        workload_id: String,
    },
    StopWorkload {
        msg_id: String,
        workload_id: String,
    },
    PauseWorkload {
        msg_id: String,
        workload_id: String,
    },
    UnpauseWorkload {
        msg_id: String,
        workload_id: String,
    },
    StopWorkloads {
        msg_id: String,
        workload_ids: Vec<String>,
    },
    ToggleDebugLogs {
        msg_id: String,
        workload_id: String,
        enabled: bool,
    },
}

fn new_msg_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl ControlRequest {
    pub fn subscribe() -> Self {
        ControlRequest::Subscribe {
            msg_id: new_msg_id(),
        }
    }

    pub fn get_workloads() -> Self {
        ControlRequest::GetWorkloads {
            msg_id: new_msg_id(),
        }
    }

    pub fn start_workload(workload_id: impl Into<String>) -> Self {
        ControlRequest::StartWorkload {
            msg_id: new_msg_id(),
            workload_id: workload_id.into(),
        }
    }

    pub fn stop_workload(workload_id: impl Into<String>) -> Self {
        ControlRequest::StopWorkload {
            msg_id: new_msg_id(),
            workload_id: workload_id.into(),
        }
    }

    pub fn pause_workload(workload_id: impl Into<String>) -> Self {
        ControlRequest::PauseWorkload {
            msg_id: new_msg_id(),
            workload_id: workload_id.into(),
        }
    }

    pub fn unpause_workload(workload_id: impl Into<String>) -> Self {
        ControlRequest::UnpauseWorkload {
            msg_id: new_msg_id(),
            workload_id: workload_id.into(),
        }
    }

    pub fn stop_workloads(workload_ids: Vec<String>) -> Self {
        ControlRequest::StopWorkloads {
            msg_id: new_msg_id(),
            workload_ids,
        }
    }

    pub fn toggle_debug_logs(workload_id: impl Into<String>, enabled: bool) -> Self {
        ControlRequest::ToggleDebugLogs {
            msg_id: new_msg_id(),
            workload_id: workload_id.into(),
            enabled,
        }
    }

    pub fn msg_id(&self) -> &str {
        match self {
            ControlRequest::Subscribe { msg_id }
            | ControlRequest::GetWorkloads { msg_id }
            | ControlRequest::StartWorkload { msg_id, .. }
            | ControlRequest::StopWorkload { msg_id, .. }
            | ControlRequest::PauseWorkload { msg_id, .. }
            | ControlRequest::UnpauseWorkload { msg_id, .. }
            | ControlRequest::StopWorkloads { msg_id, .. }
            | ControlRequest::ToggleDebugLogs { msg_id, .. } => msg_id,
        }
    }

    /// Wire name of the operation.
    pub fn op(&self) -> &'static str {
        match self {
            ControlRequest::Subscribe { .. } => "subscribe",
            ControlRequest::GetWorkloads { .. } => "get_workloads",
            ControlRequest::StartWorkload { .. } => "start_workload",
            ControlRequest::StopWorkload { .. } => "stop_workload",
            ControlRequest::PauseWorkload { .. } => "pause_workload",
            ControlRequest::UnpauseWorkload { .. } => "unpause_workload",
            ControlRequest::StopWorkloads { .. } => "stop_workloads",
            ControlRequest::ToggleDebugLogs { .. } => "toggle_debug_logs",
        }
    }

    /// Id of the single workload this request targets, if any.
    pub fn workload_id(&self) -> Option<&str> {
        match self {
            ControlRequest::StartWorkload { workload_id, .. }
            | ControlRequest::StopWorkload { workload_id, .. }
            | ControlRequest::PauseWorkload { workload_id, .. }
            | ControlRequest::UnpauseWorkload { workload_id, .. }
            | ControlRequest::ToggleDebugLogs { workload_id, .. } => Some(workload_id),
            _ => None,
        }
    }
}
