//! Request trace analysis.
//!
//! A [`RequestTrace`] records when a request (and its reply) crossed each hop
//! of the cluster: client → global scheduler → local scheduler → kernel
//! replica and back. This module turns those timestamps into ordered latency
//! segments ([`segment`]), averages the traces of several replicas answering
//! the same request ([`average`]) and derives display breakdowns
//! ([`TraceBreakdown`]).
//!
//! Everything here is pure and synchronous: no I/O, no mutation of inputs.
//!
//! # Example
//!
//! ```
//! use clusterview::trace::{segment, RequestTrace, SplitName};
//!
//! let trace = RequestTrace {
//!     message_type: "inspect_request".to_string(),
//!     request_received_by_gateway: 100.0,
//!     request_sent_by_gateway: 110.0,
//!     request_received_by_local_daemon: 120.0,
//!     request_sent_by_local_daemon: 130.0,
//!     request_received_by_kernel_replica: 140.0,
//!     reply_sent_by_kernel_replica: 200.0,
//!     reply_received_by_local_daemon: 210.0,
//!     reply_sent_by_local_daemon: 220.0,
//!     reply_received_by_gateway: 230.0,
//!     reply_sent_by_gateway: 240.0,
//!     ..Default::default()
//! };
//!
//! let splits = segment(250.0, &trace, Some(90.0));
//! assert_eq!(splits.len(), 11);
//! assert_eq!(splits[0].split_name, SplitName::ClientToGlobalScheduler);
//! assert_eq!(splits[0].latency, 10.0);
//! ```

pub mod aggregator;
pub mod breakdown;
pub mod segmenter;
pub mod types;

pub use aggregator::average;
pub use breakdown::{breakdowns, BreakdownRow, BreakdownSource, TraceBreakdown};
pub use segmenter::{segment, SPLIT_COUNT, SPLIT_COUNT_WITH_KERNEL_PHASES};
pub use types::{PongResponse, RequestTrace, RequestTraceSplit, SplitName, Timestamp, TraceExtras};
