// SPDX-License-Identifier: MIT

//! gobw - entry point for running or migrating the gobworkflow daemon.
//!
//! Grounded on the teacher's `crates/cli::main` argument-parsing shape,
//! generalized from the teacher's dynamic subcommand dispatch to a typed
//! `Command` enum (spec.md §9 "dynamic dispatch ... replaced by an enum of
//! commands") since this daemon exposes exactly one operator-facing action
//! beyond running: forcing a migration.

use clap::{Parser, Subcommand};
use gobw_daemon::Config;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "gobw", version, about = "gobworkflow daemon control")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run pending database migrations to head, then exit.
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_logging();
    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Some(Command::Migrate) => {
            if let Err(e) = gobw_storage::StorageGateway::connect(&config.database_url, true).await {
                error!(error = %e, "migration failed");
                std::process::exit(1);
            }
            info!("migrations applied");
            Ok(())
        }
        None => gobw_daemon::run(&config).await,
    }
}

fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(filter).with(fmt::layer()).init();
}
