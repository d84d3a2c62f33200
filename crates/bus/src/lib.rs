// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gobw-bus: the message bus client (spec.md §4.7, §6).

pub mod bus;
pub mod error;
pub mod fake;
pub mod lapin_bus;
pub mod offline;

pub use bus::{Delivery, DeliveryStream, MessageBus};
pub use error::BusError;
pub use fake::FakeMessageBus;
pub use lapin_bus::LapinBus;
pub use offline::{load_message, save_message, OFFLOAD_THRESHOLD_BYTES};
