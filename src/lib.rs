//! clusterview: client core for a distributed Jupyter notebook cluster.
//!
//! - [`trace`] segments per-hop request traces into latency splits.
//! - [`workload`] mirrors the workload driver's state from pushed diffs.
//! - [`subscription`] keeps that mirror live over a WebSocket.
//! - [`api`] calls the gateway's HTTP API (kernel ping).
//! - [`cli`] is the terminal front end built on top of the above.

pub mod api;
pub mod cli;
pub mod config;
pub mod context;
pub mod logging;
pub mod subscription;
pub mod trace;
pub mod workload;
