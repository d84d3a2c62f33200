// SPDX-License-Identifier: MIT

//! Bootstraps an [`EngineContext`](gobw_engine::EngineContext), spawns every
//! dispatch-loop binding, and blocks until a termination signal arrives or a
//! binding task exits unexpectedly. Shared by `gobwd`'s own `main` and the
//! `gobw` control binary's no-subcommand path.

use crate::config::Config;
use tracing::{error, info};

pub async fn run(config: &Config) -> anyhow::Result<()> {
    let ctx = crate::bootstrap(config).await?;
    let handles = crate::dispatch::spawn_all(ctx);

    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
    let mut sigint = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())?;

    tokio::select! {
        _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
        _ = sigint.recv() => info!("received SIGINT, shutting down"),
        _ = wait_any(handles) => error!("a dispatch task exited unexpectedly"),
    }
    Ok(())
}

async fn wait_any(handles: Vec<tokio::task::JoinHandle<()>>) {
    let (result, _, _) = futures_util::future::select_all(handles).await;
    if let Err(e) = result {
        error!(error = %e, "dispatch task panicked");
    }
}
