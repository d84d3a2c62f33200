// SPDX-License-Identifier: MIT

//! The dispatch loop (spec.md §4.7, C7): one consumer binding per logical
//! queue, each driven by its own tokio task. Prefetch=1 lives in the bus
//! client (`gobw_bus::LapinBus::consume`); here we only implement the
//! ack-on-success / leave-unacked-for-redelivery policy and per-binding
//! FIFO (one task per binding, no cross-binding ordering).

use futures_util::StreamExt;
use gobw_core::Envelope;
use gobw_engine::EngineContext;
use std::future::Future;
use std::sync::Arc;
use tracing::{error, info};

pub const JOBSTEP_RESULT_QUEUE: &str = "JOBSTEP_RESULT_QUEUE";
pub const WORKFLOW_QUEUE: &str = "WORKFLOW_QUEUE";
pub const LOG_QUEUE: &str = "LOG_QUEUE";
pub const AUDIT_LOG_QUEUE: &str = "AUDIT_LOG_QUEUE";
pub const HEARTBEAT_QUEUE: &str = "HEARTBEAT_QUEUE";
pub const PROGRESS_QUEUE: &str = "PROGRESS_QUEUE";
pub const TASK_QUEUE: &str = "TASK_QUEUE";
pub const TASK_RESULT_QUEUE: &str = "TASK_RESULT_QUEUE";

/// Spawns one task per consumer binding and returns their join handles.
/// The caller (typically `main`) awaits them alongside its signal handlers.
pub fn spawn_all(ctx: EngineContext) -> Vec<tokio::task::JoinHandle<()>> {
    let ctx = Arc::new(ctx);
    vec![
        spawn_binding(ctx.clone(), JOBSTEP_RESULT_QUEUE, crate::handlers::result::handle_result),
        spawn_binding(ctx.clone(), WORKFLOW_QUEUE, crate::handlers::workflow::start_workflow),
        spawn_binding(ctx.clone(), LOG_QUEUE, crate::handlers::logs::log_save),
        spawn_binding(ctx.clone(), AUDIT_LOG_QUEUE, crate::handlers::logs::audit_log_save),
        spawn_binding(ctx.clone(), HEARTBEAT_QUEUE, crate::handlers::heartbeat::ingest_heartbeat),
        spawn_binding(ctx.clone(), PROGRESS_QUEUE, crate::handlers::progress::on_workflow_progress),
        spawn_binding(ctx.clone(), TASK_QUEUE, crate::handlers::tasks::on_start_tasks),
        spawn_binding(ctx, TASK_RESULT_QUEUE, crate::handlers::tasks::on_task_result),
    ]
}

/// Consumes `queue` in a loop for as long as the bus keeps yielding
/// deliveries, invoking `handler` for each. Acks on `Ok`, nacks (leaving
/// the message for bus-driven redelivery) on `Err` (spec.md §4.7, §7).
fn spawn_binding<F, Fut>(ctx: Arc<EngineContext>, queue: &'static str, handler: F) -> tokio::task::JoinHandle<()>
where
    F: Fn(Arc<EngineContext>, Envelope) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send,
{
    tokio::spawn(async move {
        loop {
            let mut stream = match ctx.bus.consume(queue).await {
                Ok(stream) => stream,
                Err(e) => {
                    error!(queue, error = %e, "failed to bind consumer, retrying");
                    tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                    continue;
                }
            };

            while let Some(delivery) = stream.next().await {
                match delivery {
                    Ok(delivery) => {
                        let envelope = delivery.envelope.clone();
                        match handler(ctx.clone(), envelope).await {
                            Ok(()) => {
                                if let Err(e) = ctx.bus.ack(delivery).await {
                                    error!(queue, error = %e, "ack failed");
                                }
                            }
                            Err(e) => {
                                error!(queue, error = %e, "handler failed, leaving for redelivery");
                                if let Err(e) = ctx.bus.nack(delivery).await {
                                    error!(queue, error = %e, "nack failed");
                                }
                            }
                        }
                    }
                    Err(e) => error!(queue, error = %e, "bus delivery error"),
                }
            }

            info!(queue, "consumer stream ended, rebinding");
        }
    })
}
