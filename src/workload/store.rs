//! Client-side cache of workloads kept in sync by server pushes.
//!
//! Every inbound message is reconciled into a brand new [`WorkloadSnapshot`]
//! which is then published in a single step through a `watch` channel, so a
//! reader holding an `Arc<WorkloadSnapshot>` never sees a half-applied message.

use super::messages::WorkloadResponse;
use super::types::{Workload, WorkloadState};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::watch;

/// Optimistic client-side action awaiting server confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingAction {
    Starting,
    Stopping,
    Pausing,
    Resuming,
    TogglingDebugLogs,
}

impl PendingAction {
    pub fn label(&self) -> &'static str {
        match self {
            PendingAction::Starting => "starting",
            PendingAction::Stopping => "stopping",
            PendingAction::Pausing => "pausing",
            PendingAction::Resuming => "resuming",
            PendingAction::TogglingDebugLogs => "toggling debug logs",
        }
    }
}

/// Workload paired with its pending overlay, for display.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct WorkloadView<'a> {
    pub workload: &'a Workload,
    pub pending: Option<PendingAction>,
}

/// Immutable view of all known workloads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkloadSnapshot {
    workloads: BTreeMap<String, Workload>,
    /// Confirmed server state is never altered by this overlay.
    pending: BTreeMap<String, PendingAction>,
}

impl WorkloadSnapshot {
    pub fn get(&self, id: &str) -> Option<&Workload> {
        self.workloads.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.workloads.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.workloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workloads.is_empty()
    }

    /// Workloads ordered by id.
    pub fn workloads(&self) -> impl Iterator<Item = &Workload> {
        self.workloads.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.workloads.keys().map(String::as_str)
    }

    pub fn pending(&self, id: &str) -> Option<PendingAction> {
        self.pending.get(id).copied()
    }

    pub fn views(&self) -> Vec<WorkloadView<'_>> {
        self.workloads
            .values()
            .map(|workload| WorkloadView {
                workload,
                pending: self.pending(&workload.id),
            })
            .collect()
    }

    /// Ids of workloads that are actively running.
    pub fn running_ids(&self) -> Vec<String> {
        self.workloads
            .values()
            .filter(|w| w.state == WorkloadState::Running)
            .map(|w| w.id.clone())
            .collect()
    }

    /// Number of workloads per state label.
    pub fn count_by_state(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for workload in self.workloads.values() {
            *counts.entry(workload.state.label().to_string()).or_insert(0) += 1;
        }
        counts
    }
}

/// What a single reconciliation did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Entries from `new` and `modified` written into the map.
    pub upserted: usize,
    /// Entries from `deleted` that were present.
    pub deleted: usize,
    pub patched: usize,
    /// Patches for ids absent from the map.
    pub orphan_patches: Vec<String>,
    /// Patches that did not parse, produced an undecodable workload or
    /// changed the workload's id.
    pub rejected_patches: Vec<String>,
}

impl ReconcileReport {
    pub fn has_faults(&self) -> bool {
        !self.orphan_patches.is_empty() || !self.rejected_patches.is_empty()
    }
}

/// Apply one server message to `prev`, producing the next snapshot.
///
/// Batches are applied in the order new, modified, deleted, patched no matter
/// how they appear in the payload. `prev` is left untouched.
pub fn reconcile(
    prev: &WorkloadSnapshot,
    msg: &WorkloadResponse,
) -> (WorkloadSnapshot, ReconcileReport) {
    let mut next = prev.clone();
    let mut report = ReconcileReport::default();

    for workload in msg.new_workloads.iter().chain(msg.modified_workloads.iter()) {
        next.pending.remove(&workload.id);
        next.workloads.insert(workload.id.clone(), workload.clone());
        report.upserted += 1;
    }

    for workload in &msg.deleted_workloads {
        next.pending.remove(&workload.id);
        if next.workloads.remove(&workload.id).is_some() {
            report.deleted += 1;
        }
    }

    for patched in &msg.patched_workloads {
        let id = &patched.workload_id;

        let Some(current) = next.workloads.get(id) else {
            tracing::error!(
                workload_id = %id,
                patch = %patched.patch,
                known_workloads = next.workloads.len(),
                "Received patch for unknown workload, dropping it"
            );
            report.orphan_patches.push(id.clone());
            continue;
        };

        match apply_merge_patch(current, &patched.patch) {
            Ok(merged) if merged.id != *id => {
                // The map key is the workload id; a patch may not move it
                tracing::error!(
                    workload_id = %id,
                    patched_id = %merged.id,
                    "Workload patch changes the id, keeping previous state"
                );
                report.rejected_patches.push(id.clone());
            }
            Ok(merged) => {
                next.pending.remove(id);
                next.workloads.insert(id.clone(), merged);
                report.patched += 1;
            }
            Err(e) => {
                tracing::error!(
                    workload_id = %id,
                    error = %e,
                    "Failed to apply workload patch, keeping previous state"
                );
                report.rejected_patches.push(id.clone());
            }
        }
    }

    (next, report)
}

/// RFC 7396 merge of `patch` into a copy of `workload`.
fn apply_merge_patch(workload: &Workload, patch: &str) -> Result<Workload, serde_json::Error> {
    let patch: serde_json::Value = serde_json::from_str(patch)?;
    let mut document = serde_json::to_value(workload)?;
    json_patch::merge(&mut document, &patch);
    serde_json::from_value(document)
}

/// Published, shareable workload cache.
pub struct WorkloadStore {
    tx: watch::Sender<Arc<WorkloadSnapshot>>,
}

impl WorkloadStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Arc::new(WorkloadSnapshot::default()));
        Self { tx }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<WorkloadSnapshot> {
        self.tx.borrow().clone()
    }

    /// Receiver notified after every published change.
    pub fn subscribe(&self) -> watch::Receiver<Arc<WorkloadSnapshot>> {
        self.tx.subscribe()
    }

    /// Reconcile a server message and publish the result.
    pub fn apply(&self, msg: &WorkloadResponse) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        self.tx.send_modify(|current| {
            let (next, r) = reconcile(current, msg);
            *current = Arc::new(next);
            report = r;
        });

        tracing::debug!(
            msg_id = %msg.msg_id,
            op = %msg.op,
            upserted = report.upserted,
            deleted = report.deleted,
            patched = report.patched,
            orphan_patches = report.orphan_patches.len(),
            "Reconciled workload message"
        );

        report
    }

    /// Record an optimistic action on a known workload.
    ///
    /// Returns `false` (and changes nothing) if the workload is unknown. The
    /// overlay is cleared by the next server update touching the workload.
    pub fn mark_pending(&self, id: &str, action: PendingAction) -> bool {
        let mut marked = false;
        self.tx.send_if_modified(|current| {
            if !current.contains(id) {
                return false;
            }
            let mut next = WorkloadSnapshot::clone(current);
            next.pending.insert(id.to_string(), action);
            *current = Arc::new(next);
            marked = true;
            true
        });
        marked
    }

    /// Drop a pending overlay entry without a server update.
    pub fn clear_pending(&self, id: &str) {
        self.tx.send_if_modified(|current| {
            if current.pending(id).is_none() {
                return false;
            }
            let mut next = WorkloadSnapshot::clone(current);
            next.pending.remove(id);
            *current = Arc::new(next);
            true
        });
    }
}

impl Default for WorkloadStore {
    fn default() -> Self {
        Self::new()
    }
}
