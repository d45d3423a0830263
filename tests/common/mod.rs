//! Shared test utilities for clusterview integration tests.
//!
//! Provides trace builders and an in-process fake of the workload driver's
//! WebSocket endpoint.

#![allow(dead_code)]

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use clusterview::config::ClusterviewConfig;
use clusterview::trace::RequestTrace;
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

// =============================================================================
// Trace Builders
// =============================================================================

/// Trace whose hops are 10 ms apart starting at `origin`.
pub fn make_trace(replica_id: i32, message_type: &str, origin: f64) -> RequestTrace {
    RequestTrace {
        message_id: "msg-1".to_string(),
        message_type: message_type.to_string(),
        kernel_id: "kernel-1".to_string(),
        replica_id,
        request_received_by_gateway: origin,
        request_sent_by_gateway: origin + 10.0,
        request_received_by_local_daemon: origin + 20.0,
        request_sent_by_local_daemon: origin + 30.0,
        request_received_by_kernel_replica: origin + 40.0,
        reply_sent_by_kernel_replica: origin + 100.0,
        reply_received_by_local_daemon: origin + 110.0,
        reply_sent_by_local_daemon: origin + 120.0,
        reply_received_by_gateway: origin + 130.0,
        reply_sent_by_gateway: origin + 140.0,
        election_creation_time: origin + 45.0,
        election_proposal_phase_start_time: origin + 50.0,
        election_execution_phase_start_time: origin + 60.0,
        execution_start_unix_millis: origin + 61.0,
        execution_end_unix_millis: origin + 90.0,
        ..Default::default()
    }
}

/// Wire form of a workload as the driver sends it.
pub fn workload_json(id: &str, name: &str, state: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "workload_state": state,
        "seed": 7,
        "num_tasks_executed": 0,
        "debug_logging_enabled": false,
        "events_processed": null,
        "sessions": null
    })
}

/// Configuration pointing at `addr` with short timeouts.
pub fn config_for(addr: SocketAddr) -> ClusterviewConfig {
    let mut config = ClusterviewConfig::default();
    config.gateway.url = format!("http://{}", addr);
    config.subscription.reconnect_delay_ms = 50;
    config.subscription.command_timeout_seconds = 5;
    config
}

/// Poll `condition` until it holds or `timeout` elapses.
pub async fn eventually<F>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

// =============================================================================
// Fake Workload Driver
// =============================================================================

#[derive(Debug, Clone)]
enum Outbound {
    Text(String),
    Binary(Vec<u8>),
    Close,
}

struct DriverState {
    workloads: Mutex<Vec<Value>>,
    received: Mutex<Vec<Value>>,
    reject_ops: Mutex<Vec<String>>,
    connections: AtomicUsize,
    outbound: broadcast::Sender<Outbound>,
}

impl DriverState {
    fn find(&self, id: &str) -> Option<Value> {
        self.workloads
            .lock()
            .unwrap()
            .iter()
            .find(|w| w["id"] == id)
            .cloned()
    }

    fn update<F: FnOnce(&mut Value)>(&self, id: &str, f: F) -> Option<Value> {
        let mut workloads = self.workloads.lock().unwrap();
        let workload = workloads.iter_mut().find(|w| w["id"] == id)?;
        f(workload);
        Some(workload.clone())
    }

    fn respond(&self, text: &str) -> Value {
        let request: Value = serde_json::from_str(text).unwrap_or(Value::Null);
        self.received.lock().unwrap().push(request.clone());

        let op = request["op"].as_str().unwrap_or_default().to_string();
        let msg_id = request["msg_id"].clone();

        let error = |message: &str| {
            json!({
                "msg_id": msg_id,
                "op": op,
                "status": "ERROR",
                "ErrorMessage": message,
                "Description": "rejected by fake driver",
                "Valid": true
            })
        };

        if self.reject_ops.lock().unwrap().contains(&op) {
            return error("operation rejected");
        }

        let set_state = |id: &str, state: &str| {
            self.update(id, |w| w["workload_state"] = json!(state))
        };

        let modified = match op.as_str() {
            "subscribe" | "get_workloads" => {
                let workloads = self.workloads.lock().unwrap().clone();
                return json!({
                    "msg_id": msg_id,
                    "op": op,
                    "status": "OK",
                    "new_workloads": workloads
                });
            }
            "start_workload" | "unpause_workload" => {
                set_state(request["workload_id"].as_str().unwrap_or_default(), "WorkloadRunning")
                    .into_iter()
                    .collect::<Vec<_>>()
            }
            "stop_workload" => {
                set_state(request["workload_id"].as_str().unwrap_or_default(), "WorkloadTerminated")
                    .into_iter()
                    .collect()
            }
            "pause_workload" => {
                set_state(request["workload_id"].as_str().unwrap_or_default(), "WorkloadPaused")
                    .into_iter()
                    .collect()
            }
            "toggle_debug_logs" => {
                let enabled = request["enabled"].clone();
                self.update(request["workload_id"].as_str().unwrap_or_default(), |w| {
                    w["debug_logging_enabled"] = enabled
                })
                .into_iter()
                .collect()
            }
            "stop_workloads" => request["workload_ids"]
                .as_array()
                .cloned()
                .unwrap_or_default()
                .iter()
                .filter_map(|id| set_state(id.as_str().unwrap_or_default(), "WorkloadTerminated"))
                .collect(),
            _ => return error("unknown operation"),
        };

        if modified.is_empty() && op != "stop_workloads" {
            return error("no such workload");
        }

        json!({
            "msg_id": msg_id,
            "op": op,
            "status": "OK",
            "modified_workloads": modified
        })
    }
}

/// In-process fake of the workload driver WebSocket endpoint.
pub struct FakeDriver {
    pub addr: SocketAddr,
    state: Arc<DriverState>,
    handle: JoinHandle<()>,
}

impl Drop for FakeDriver {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl FakeDriver {
    pub async fn start(workloads: Vec<Value>) -> Self {
        let (outbound, _) = broadcast::channel(64);
        let state = Arc::new(DriverState {
            workloads: Mutex::new(workloads),
            received: Mutex::new(Vec::new()),
            reject_ops: Mutex::new(Vec::new()),
            connections: AtomicUsize::new(0),
            outbound,
        });

        let app = Router::new()
            .route("/websocket/workload", get(ws_handler))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind listener");
        let addr = listener.local_addr().expect("Failed to get addr");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server failed");
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    pub fn config(&self) -> ClusterviewConfig {
        config_for(self.addr)
    }

    /// Requests received so far, in order.
    pub fn received(&self) -> Vec<Value> {
        self.state.received.lock().unwrap().clone()
    }

    pub fn received_ops(&self) -> Vec<String> {
        self.received()
            .iter()
            .map(|r| r["op"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    pub fn connections(&self) -> usize {
        self.state.connections.load(Ordering::SeqCst)
    }

    /// Answer every request with this op with an error response.
    pub fn reject(&self, op: &str) {
        self.state.reject_ops.lock().unwrap().push(op.to_string());
    }

    /// Push a text frame to every connected client.
    pub fn push(&self, frame: Value) {
        let _ = self.state.outbound.send(Outbound::Text(frame.to_string()));
    }

    pub fn push_raw(&self, text: &str) {
        let _ = self.state.outbound.send(Outbound::Text(text.to_string()));
    }

    pub fn push_binary(&self, frame: Value) {
        let _ = self
            .state
            .outbound
            .send(Outbound::Binary(frame.to_string().into_bytes()));
    }

    /// Close every open connection.
    pub fn disconnect_all(&self) {
        let _ = self.state.outbound.send(Outbound::Close);
    }
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<DriverState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<DriverState>) {
    state.connections.fetch_add(1, Ordering::SeqCst);
    let (mut sender, mut receiver) = socket.split();
    let mut outbound = state.outbound.subscribe();

    loop {
        tokio::select! {
            msg = receiver.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    let reply = state.respond(&text);
                    if sender.send(Message::Text(reply.to_string())).await.is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
            out = outbound.recv() => match out {
                Ok(Outbound::Text(text)) => {
                    if sender.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Ok(Outbound::Binary(bytes)) => {
                    if sender.send(Message::Binary(bytes)).await.is_err() {
                        break;
                    }
                }
                Ok(Outbound::Close) => {
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                }
                Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }
}
