//! Workloads pushed by the cluster's workload driver.
//!
//! [`types`] holds the data model, [`messages`] the WebSocket wire format and
//! [`store`] the client-side cache that server pushes are reconciled into.
//! New, modified and deleted batches carry whole workloads; patched batches
//! carry RFC 7396 JSON merge patches against the cached copy.

pub mod messages;
pub mod store;
pub mod types;

pub use messages::{
    ControlRequest, ErrorResponse, InboundMessage, PatchedWorkload, WorkloadResponse,
};
pub use store::{
    reconcile, PendingAction, ReconcileReport, WorkloadSnapshot, WorkloadStore, WorkloadView,
};
pub use types::{
    GpuUtilization, ResourceRequest, Session, TrainingEvent, Unmodelled, Workload, WorkloadEvent,
    WorkloadState,
};
