// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gobw-monitor: the heartbeat/service liveness monitor (spec.md §4.2).

pub mod heartbeat;

pub use heartbeat::{ingest_heartbeat, sweep, HeartbeatMessage, ThreadStatus, HEARTBEAT_INTERVAL};
