//! Benchmarks for trace segmentation and workload reconciliation

use clusterview::trace::{average, breakdowns, segment, RequestTrace};
use clusterview::workload::{
    reconcile, PatchedWorkload, Workload, WorkloadResponse, WorkloadSnapshot,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn make_trace(replica_id: i32, message_type: &str) -> RequestTrace {
    RequestTrace {
        message_id: "msg-1".to_string(),
        message_type: message_type.to_string(),
        kernel_id: "kernel-1".to_string(),
        replica_id,
        request_received_by_gateway: 100.0,
        request_sent_by_gateway: 110.0,
        request_received_by_local_daemon: 120.0,
        request_sent_by_local_daemon: 130.0,
        request_received_by_kernel_replica: 140.0,
        reply_sent_by_kernel_replica: 200.0,
        reply_received_by_local_daemon: 210.0,
        reply_sent_by_local_daemon: 220.0,
        reply_received_by_gateway: 230.0,
        reply_sent_by_gateway: 240.0,
        election_creation_time: 145.0,
        election_proposal_phase_start_time: 150.0,
        election_execution_phase_start_time: 160.0,
        execution_start_unix_millis: 161.0,
        execution_end_unix_millis: 190.0,
        ..Default::default()
    }
}

fn bench_segment(c: &mut Criterion) {
    let plain = make_trace(1, "kernel_info_request");
    let execute = make_trace(1, "execute_request");

    c.bench_function("segment_plain", |b| {
        b.iter(|| segment(black_box(250.0), black_box(&plain), Some(90.0)))
    });

    c.bench_function("segment_execute_request", |b| {
        b.iter(|| segment(black_box(250.0), black_box(&execute), Some(90.0)))
    });
}

fn bench_breakdowns(c: &mut Criterion) {
    let traces: Vec<_> = (1..=3).map(|r| make_trace(r, "execute_request")).collect();

    c.bench_function("average_three_replicas", |b| {
        b.iter(|| average(black_box(&traces)))
    });

    c.bench_function("breakdowns_three_replicas", |b| {
        b.iter(|| breakdowns(black_box(&traces), 250.0, Some(90.0)))
    });
}

fn bench_reconcile(c: &mut Criterion) {
    let initial = WorkloadResponse {
        new_workloads: (0..200)
            .map(|i| Workload::new(format!("w-{}", i), format!("workload-{}", i)))
            .collect(),
        ..Default::default()
    };
    let (snapshot, _) = reconcile(&WorkloadSnapshot::default(), &initial);

    let patches = WorkloadResponse {
        patched_workloads: (0..20)
            .map(|i| PatchedWorkload {
                workload_id: format!("w-{}", i),
                patch: format!("{{\"num_tasks_executed\": {}}}", i),
            })
            .collect(),
        ..Default::default()
    };

    c.bench_function("reconcile_20_patches_200_workloads", |b| {
        b.iter(|| reconcile(black_box(&snapshot), black_box(&patches)))
    });
}

criterion_group!(benches, bench_segment, bench_breakdowns, bench_reconcile);
criterion_main!(benches);
