//! Live subscription to the workload driver's WebSocket.
//!
//! A single background task owns the connection. It sends `subscribe` on
//! every (re)connect, reconciles each inbound frame into the shared
//! [`WorkloadStore`](crate::workload::WorkloadStore) in receipt order, and
//! routes replies to the [`SubscriptionHandle`] call that issued the request.
//! Commands are never queued across a disconnect.

mod client;
mod error;
mod state;

pub use client::{reply_within, CommandReply, SubscriptionHandle, WorkloadSubscriber};
pub use error::SubscriptionError;
pub use state::ConnectionState;
