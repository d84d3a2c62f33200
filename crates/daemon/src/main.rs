// SPDX-License-Identifier: MIT

//! gobworkflow daemon (gobwd)
//!
//! Background process that binds the workflow exchange's consumer queues
//! and dispatches every delivery to its engine operation (spec.md §4.7).

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use gobw_daemon::Config;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("gobwd {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("gobwd {}", env!("CARGO_PKG_VERSION"));
                println!("gobworkflow daemon - consumes the workflow exchange and runs jobs");
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: gobwd [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let _log_guard = setup_logging();

    let config = Config::from_env()?;
    info!(exchange = %config.workflow_exchange, "starting gobworkflow daemon");

    gobw_daemon::run(&config).await
}

fn setup_logging() -> tracing_appender::non_blocking::WorkerGuard {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stdout());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    guard
}
