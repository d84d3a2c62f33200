// SPDX-License-Identifier: MIT

//! `lapin`-backed [`MessageBus`] over a single AMQP topic exchange,
//! prefetch=1 per consumer (spec.md §4.7).

use crate::bus::{AckHandle, Delivery, DeliveryStream, MessageBus};
use crate::error::BusError;
use async_trait::async_trait;
use futures_util::StreamExt;
use gobw_core::Envelope;
use lapin::options::{
    BasicAckOptions, BasicConsumeOptions, BasicNackOptions, BasicPublishOptions, BasicQosOptions,
    ExchangeDeclareOptions,
};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties, ExchangeKind};
use tracing::debug;

pub struct LapinBus {
    connection: Connection,
    exchange: String,
}

impl LapinBus {
    pub async fn connect(amqp_url: &str, exchange: &str) -> Result<Self, BusError> {
        let connection = Connection::connect(amqp_url, ConnectionProperties::default()).await?;
        let channel = connection.create_channel().await?;
        channel
            .exchange_declare(
                exchange,
                ExchangeKind::Topic,
                ExchangeDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await?;
        Ok(Self {
            connection,
            exchange: exchange.to_string(),
        })
    }

    async fn channel(&self) -> Result<Channel, BusError> {
        Ok(self.connection.create_channel().await?)
    }
}

#[async_trait]
impl MessageBus for LapinBus {
    async fn publish(&self, exchange: &str, key: &str, envelope: &Envelope) -> Result<(), BusError> {
        let exchange = if exchange.is_empty() { &self.exchange } else { exchange };
        let payload = serde_json::to_vec(envelope)?;
        let channel = self.channel().await?;
        channel
            .basic_publish(
                exchange,
                key,
                BasicPublishOptions::default(),
                &payload,
                BasicProperties::default(),
            )
            .await?
            .await?;
        debug!(exchange, key, "published envelope");
        Ok(())
    }

    async fn consume(&self, queue: &str) -> Result<DeliveryStream, BusError> {
        let channel = self.channel().await?;
        channel
            .basic_qos(1, BasicQosOptions::default())
            .await?;
        let consumer = channel
            .basic_consume(
                queue,
                &format!("gobw-{queue}"),
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await?;

        let stream = consumer.map(|delivery| {
            let delivery = delivery?;
            let envelope: Envelope = serde_json::from_slice(&delivery.data)?;
            Ok(Delivery {
                envelope,
                ack: AckHandle::Lapin(delivery.acker),
            })
        });

        Ok(Box::pin(stream))
    }

    async fn ack(&self, delivery: Delivery) -> Result<(), BusError> {
        match delivery.ack {
            AckHandle::Lapin(acker) => acker.ack(BasicAckOptions::default()).await?,
            AckHandle::Fake(fake) => fake.ack(),
        }
        Ok(())
    }

    async fn nack(&self, delivery: Delivery) -> Result<(), BusError> {
        match delivery.ack {
            AckHandle::Lapin(acker) => {
                acker
                    .nack(BasicNackOptions {
                        requeue: true,
                        ..Default::default()
                    })
                    .await?
            }
            AckHandle::Fake(fake) => fake.nack(),
        }
        Ok(())
    }
}
