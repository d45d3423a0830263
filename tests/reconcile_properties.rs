//! Property tests for workload reconciliation.

use clusterview::workload::{
    reconcile, PatchedWorkload, Workload, WorkloadResponse, WorkloadSnapshot,
};
use proptest::prelude::*;

fn arb_workload() -> impl Strategy<Value = Workload> {
    ("w-[0-9]", "[a-z]{1,8}", 0u64..100).prop_map(|(id, name, tasks)| {
        let mut workload = Workload::new(id, name);
        workload.num_tasks_executed = tasks;
        workload
    })
}

fn arb_batch() -> impl Strategy<Value = Vec<Workload>> {
    prop::collection::vec(arb_workload(), 0..6)
}

fn arb_patch() -> impl Strategy<Value = PatchedWorkload> {
    let tasks = ("w-[0-9]", 0u64..100).prop_map(|(id, tasks)| PatchedWorkload {
        workload_id: id,
        patch: format!("{{\"num_tasks_executed\": {}}}", tasks),
    });
    // Some patches try to move the workload to another id
    let rename = ("w-[0-9]", "w-[0-9]").prop_map(|(id, new_id)| PatchedWorkload {
        workload_id: id,
        patch: format!("{{\"id\": \"{}\", \"current_tick\": 1}}", new_id),
    });
    prop_oneof![3 => tasks, 1 => rename]
}

fn arb_message() -> impl Strategy<Value = WorkloadResponse> {
    (
        arb_batch(),
        arb_batch(),
        arb_batch(),
        prop::collection::vec(arb_patch(), 0..6),
    )
        .prop_map(|(new, modified, deleted, patched)| WorkloadResponse {
            msg_id: "m".to_string(),
            op: "workload_update".to_string(),
            status: "OK".to_string(),
            new_workloads: new,
            modified_workloads: modified,
            deleted_workloads: deleted,
            patched_workloads: patched,
        })
}

fn arb_snapshot() -> impl Strategy<Value = WorkloadSnapshot> {
    arb_batch().prop_map(|workloads| {
        let msg = WorkloadResponse {
            new_workloads: workloads,
            ..Default::default()
        };
        reconcile(&WorkloadSnapshot::default(), &msg).0
    })
}

proptest! {
    #[test]
    fn prop_reconcile_is_deterministic(prev in arb_snapshot(), msg in arb_message()) {
        prop_assert_eq!(reconcile(&prev, &msg).0, reconcile(&prev, &msg).0);
    }

    #[test]
    fn prop_upsert_only_messages_are_idempotent(
        prev in arb_snapshot(),
        new in arb_batch(),
        modified in arb_batch(),
    ) {
        let msg = WorkloadResponse {
            new_workloads: new,
            modified_workloads: modified,
            ..Default::default()
        };
        let (once, _) = reconcile(&prev, &msg);
        let (twice, _) = reconcile(&once, &msg);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_deleted_ids_stay_deleted(prev in arb_snapshot(), msg in arb_message()) {
        let (next, _) = reconcile(&prev, &msg);
        // Patches never resurrect a workload, so every deleted id stays gone
        for deleted in &msg.deleted_workloads {
            prop_assert!(!next.contains(&deleted.id));
        }
    }

    #[test]
    fn prop_patches_never_add_workloads(
        prev in arb_snapshot(),
        patches in prop::collection::vec(arb_patch(), 0..8),
    ) {
        let msg = WorkloadResponse {
            patched_workloads: patches.clone(),
            ..Default::default()
        };
        let (next, report) = reconcile(&prev, &msg);
        prop_assert_eq!(next.len(), prev.len());
        let orphans = patches.iter().filter(|p| !prev.contains(&p.workload_id)).count();
        prop_assert_eq!(report.orphan_patches.len(), orphans);
    }

    #[test]
    fn prop_ids_match_keys(prev in arb_snapshot(), msg in arb_message()) {
        // Patches that would change a workload's id are rejected
        let (next, _) = reconcile(&prev, &msg);
        let ids: Vec<String> = next.ids().map(str::to_string).collect();
        let workload_ids: Vec<String> = next.workloads().map(|w| w.id.clone()).collect();
        prop_assert_eq!(ids, workload_ids);
    }
}
