//! CLI Integration Tests
//!
//! End-to-end tests for CLI commands using assert_cmd.

mod common;

use assert_cmd::assert::OutputAssertExt;
use assert_cmd::Command;
use common::{make_trace, workload_json, FakeDriver};
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the clusterview binary for testing
fn clusterview_cmd() -> Command {
    let mut cmd = Command::cargo_bin("clusterview").unwrap();
    cmd.env_remove("CLUSTERVIEW_GATEWAY_URL")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_version_output() {
    clusterview_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("clusterview"));
}

#[test]
fn test_help_shows_all_commands() {
    clusterview_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("watch"))
        .stdout(predicate::str::contains("ping"))
        .stdout(predicate::str::contains("trace"))
        .stdout(predicate::str::contains("workload"))
        .stdout(predicate::str::contains("config"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn test_workload_help() {
    clusterview_cmd()
        .args(["workload", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("start"))
        .stdout(predicate::str::contains("pause"))
        .stdout(predicate::str::contains("debug-logs"))
        .stdout(predicate::str::contains("stop-all"));
}

#[test]
fn test_config_init_creates_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("clusterview.toml");

    clusterview_cmd()
        .args(["config", "init", "-o", config_path.to_str().unwrap()])
        .assert()
        .success();

    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("[gateway]"));
}

#[test]
fn test_config_init_with_gateway() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("clusterview.toml");

    clusterview_cmd()
        .args(["config", "init", "-o", config_path.to_str().unwrap()])
        .args(["--gateway", "https://gw.example:8443"])
        .assert()
        .success();

    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("url = \"https://gw.example:8443\""));
    assert!(content.contains("[subscription]"));
}

#[test]
fn test_config_init_no_overwrite() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("clusterview.toml");
    std::fs::write(&config_path, "existing content").unwrap();

    clusterview_cmd()
        .args(["config", "init", "-o", config_path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("exists"));
}

#[test]
fn test_trace_table_output() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("pong.json");
    let pong = serde_json::json!({
        "id": "kernel-1",
        "success": true,
        "requestTraces": [
            make_trace(1, "execute_request", 100.0),
            make_trace(2, "execute_request", 100.0)
        ]
    });
    std::fs::write(&file, pong.to_string()).unwrap();

    clusterview_cmd()
        .args([
            "trace",
            file.to_str().unwrap(),
            "--reply-received-at",
            "250",
            "--request-sent-at",
            "90",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Kernel #1"))
        .stdout(predicate::str::contains("Kernel #2"))
        .stdout(predicate::str::contains("Average"))
        .stdout(predicate::str::contains("Kernel Executing Code"))
        .stdout(predicate::str::contains("Global Scheduler → Client"));
}

#[test]
fn test_trace_json_output() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("traces.json");
    let traces = serde_json::json!([make_trace(1, "kernel_info_request", 100.0)]);
    std::fs::write(&file, traces.to_string()).unwrap();

    let output = clusterview_cmd()
        .args([
            "trace",
            file.to_str().unwrap(),
            "--reply-received-at",
            "250",
            "--json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rows = value["breakdowns"][0]["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 11);
    assert_eq!(rows[10]["split"]["end"], 250.0);
}

#[test]
fn test_trace_rejects_garbage_file() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("garbage.json");
    std::fs::write(&file, "[1, 2, 3]").unwrap();

    clusterview_cmd()
        .args(["trace", file.to_str().unwrap(), "--reply-received-at", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_invalid_gateway_url_rejected() {
    clusterview_cmd()
        .args(["ping", "kernel-1", "--gateway", "not a url"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("gateway.url"));
}

#[test]
fn test_ping_unreachable_gateway_fails() {
    clusterview_cmd()
        .args(["ping", "kernel-1", "--gateway", "http://127.0.0.1:9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_invalid_command() {
    clusterview_cmd()
        .arg("invalid-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_watch_once_prints_workloads() {
    let driver = FakeDriver::start(vec![
        workload_json("w-1", "alpha", "WorkloadRunning"),
        workload_json("w-2", "beta", "WorkloadReady"),
    ])
    .await;
    let gateway = format!("http://{}", driver.addr);

    let output = tokio::task::spawn_blocking(move || {
        clusterview_cmd()
            .args(["watch", "--once", "--json", "--gateway", &gateway])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let workloads = value["workloads"].as_array().unwrap();
    assert_eq!(workloads.len(), 2);
    assert_eq!(workloads[0]["workload"]["name"], "alpha");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_workload_start_command() {
    let driver = FakeDriver::start(vec![workload_json("w-2", "beta", "WorkloadReady")]).await;
    let gateway = format!("http://{}", driver.addr);

    let output = tokio::task::spawn_blocking(move || {
        clusterview_cmd()
            .args(["workload", "start", "w-2", "--gateway", &gateway])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    output
        .assert()
        .success()
        .stdout(predicate::str::contains("Start acknowledged"))
        .stdout(predicate::str::contains("Running"));
    assert!(driver.received_ops().contains(&"start_workload".to_string()));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_workload_unknown_id_fails() {
    let driver = FakeDriver::start(vec![]).await;
    let gateway = format!("http://{}", driver.addr);

    let output = tokio::task::spawn_blocking(move || {
        clusterview_cmd()
            .args(["workload", "stop", "w-404", "--gateway", &gateway])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    output
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown workload: w-404"));
    assert!(!driver.received_ops().contains(&"stop_workload".to_string()));
}
