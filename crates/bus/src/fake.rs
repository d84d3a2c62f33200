// SPDX-License-Identifier: MIT

//! An in-memory [`MessageBus`] double for tests, grounded on the teacher's
//! `test-support` feature-gated fakes.

use crate::bus::{AckHandle, Delivery, DeliveryStream, MessageBus};
use crate::error::BusError;
use async_trait::async_trait;
use gobw_core::Envelope;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

#[derive(Clone)]
pub struct FakeAck {
    state: Arc<Mutex<AckLog>>,
    tag: u64,
}

impl FakeAck {
    pub fn ack(&self) {
        self.state.lock().acked.push(self.tag);
    }

    pub fn nack(&self) {
        self.state.lock().nacked.push(self.tag);
    }
}

#[derive(Default)]
struct AckLog {
    acked: Vec<u64>,
    nacked: Vec<u64>,
    next_tag: u64,
}

struct Queue {
    name: String,
    pending: VecDeque<Envelope>,
}

/// Routes messages by `(exchange, key)` to queues bound with a matching
/// pattern (`#` wildcards only, enough to exercise the dispatch bindings in
/// tests).
#[derive(Default)]
pub struct FakeMessageBus {
    queues: Mutex<Vec<(String, Queue)>>,
    published: Mutex<Vec<(String, String, Envelope)>>,
    ack_log: Arc<Mutex<AckLog>>,
}

impl FakeMessageBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `queue` to routing keys matching `pattern` (`#` matches
    /// anything after the given prefix; an exact string matches only
    /// itself).
    pub fn bind(&self, queue: &str, pattern: &str) {
        self.queues.lock().push((
            pattern.to_string(),
            Queue {
                name: queue.to_string(),
                pending: VecDeque::new(),
            },
        ));
    }

    pub fn published(&self) -> Vec<(String, String, Envelope)> {
        self.published.lock().clone()
    }

    pub fn acked_count(&self) -> usize {
        self.ack_log.lock().acked.len()
    }

    pub fn nacked_count(&self) -> usize {
        self.ack_log.lock().nacked.len()
    }

    fn route(&self, key: &str, envelope: &Envelope) {
        for (pattern, queue) in self.queues.lock().iter_mut() {
            if matches_pattern(pattern, key) {
                queue.pending.push_back(envelope.clone());
            }
        }
    }
}

fn matches_pattern(pattern: &str, key: &str) -> bool {
    match pattern.strip_suffix('#') {
        Some(prefix) => key.starts_with(prefix),
        None => pattern == key,
    }
}

#[async_trait]
impl MessageBus for FakeMessageBus {
    async fn publish(&self, exchange: &str, key: &str, envelope: &Envelope) -> Result<(), BusError> {
        self.published
            .lock()
            .push((exchange.to_string(), key.to_string(), envelope.clone()));
        self.route(key, envelope);
        Ok(())
    }

    async fn consume(&self, queue: &str) -> Result<DeliveryStream, BusError> {
        let mut deliveries = Vec::new();
        {
            let mut queues = self.queues.lock();
            for (_, q) in queues.iter_mut().filter(|(_, q)| q.name == queue) {
                while let Some(envelope) = q.pending.pop_front() {
                    let mut log = self.ack_log.lock();
                    let tag = log.next_tag;
                    log.next_tag += 1;
                    deliveries.push(Ok(Delivery {
                        envelope,
                        ack: AckHandle::Fake(FakeAck {
                            state: self.ack_log.clone(),
                            tag,
                        }),
                    }));
                }
            }
        }
        Ok(Box::pin(tokio_stream::iter(deliveries)))
    }

    async fn ack(&self, delivery: Delivery) -> Result<(), BusError> {
        if let AckHandle::Fake(fake) = delivery.ack {
            fake.ack();
        }
        Ok(())
    }

    async fn nack(&self, delivery: Delivery) -> Result<(), BusError> {
        if let AckHandle::Fake(fake) = delivery.ack {
            fake.nack();
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
