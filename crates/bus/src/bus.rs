// SPDX-License-Identifier: MIT

//! The `MessageBus` trait: the one seam the dispatch loop and every handler
//! talk through (spec.md §4.7, §6).

use crate::error::BusError;
use async_trait::async_trait;
use futures_util::Stream;
use gobw_core::Envelope;
use std::pin::Pin;

/// A single delivered message plus the handle needed to ack/nack it.
pub struct Delivery {
    pub envelope: Envelope,
    pub(crate) ack: AckHandle,
}

pub(crate) enum AckHandle {
    Lapin(lapin::acker::Acker),
    Fake(crate::fake::FakeAck),
}

pub type DeliveryStream = Pin<Box<dyn Stream<Item = Result<Delivery, BusError>> + Send>>;

/// Topic-exchange semantics over one workflow exchange (spec.md §6):
/// `publish` sends to `exchange` under routing key `key`; `consume` binds a
/// named queue and yields its deliveries one at a time (prefetch=1).
#[async_trait]
pub trait MessageBus: Send + Sync {
    async fn publish(&self, exchange: &str, key: &str, envelope: &Envelope) -> Result<(), BusError>;
    async fn consume(&self, queue: &str) -> Result<DeliveryStream, BusError>;
    async fn ack(&self, delivery: Delivery) -> Result<(), BusError>;
    async fn nack(&self, delivery: Delivery) -> Result<(), BusError>;
}
