// SPDX-License-Identifier: MIT

//! The reconnect envelope (spec.md §4.1): every gateway operation runs
//! through this, so a connection drop is invisible to callers beyond added
//! latency.

use crate::error::{classify, StorageError};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::future::Future;
use std::sync::RwLock;
use std::time::Duration;

/// Fixed 32-bit id for the migration advisory lock (spec.md §4.1).
const ADVISORY_LOCK_ID: i64 = 0x474f_4257; // "GOBW"

/// Default wait between reconnect attempts (spec.md §4.1).
pub const RECONNECT_INTERVAL: Duration = Duration::from_secs(60);

/// Holds the live connection pool behind a swappable cell so the reconnect
/// loop can replace it without callers needing to re-acquire a new gateway.
pub struct StorageGateway {
    pool: RwLock<PgPool>,
    database_url: String,
    reconnect_interval: Duration,
}

impl Clone for StorageGateway {
    fn clone(&self) -> Self {
        Self {
            pool: RwLock::new(self.pool.read().unwrap_or_else(|e| e.into_inner()).clone()),
            database_url: self.database_url.clone(),
            reconnect_interval: self.reconnect_interval,
        }
    }
}

impl StorageGateway {
    /// Connects, migrating to head under an advisory lock. `force_migrate`
    /// skips waiting for the lock (uses `pg_try_advisory_lock`) but still
    /// releases it on completion if it was acquired.
    pub async fn connect(database_url: &str, force_migrate: bool) -> Result<Self, StorageError> {
        let pool = Self::connect_pool(database_url, force_migrate).await?;
        Ok(Self {
            pool: RwLock::new(pool),
            database_url: database_url.to_string(),
            reconnect_interval: RECONNECT_INTERVAL,
        })
    }

    #[cfg(test)]
    pub(crate) fn with_reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval = interval;
        self
    }

    async fn connect_pool(database_url: &str, force_migrate: bool) -> Result<PgPool, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(classify)?;

        let held = if force_migrate {
            let (acquired,): (bool,) = sqlx::query_as("SELECT pg_try_advisory_lock($1)")
                .bind(ADVISORY_LOCK_ID)
                .fetch_one(&pool)
                .await
                .map_err(classify)?;
            acquired
        } else {
            sqlx::query("SELECT pg_advisory_lock($1)")
                .bind(ADVISORY_LOCK_ID)
                .execute(&pool)
                .await
                .map_err(classify)?;
            true
        };

        sqlx::migrate!("./migrations").run(&pool).await?;

        if held {
            sqlx::query("SELECT pg_advisory_unlock($1)")
                .bind(ADVISORY_LOCK_ID)
                .execute(&pool)
                .await
                .map_err(classify)?;
        }

        Ok(pool)
    }

    fn pool(&self) -> PgPool {
        self.pool.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    async fn is_connected(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool()).await.is_ok()
    }

    async fn disconnect(&self) {
        let old = {
            let mut guard = self.pool.write().unwrap_or_else(|e| e.into_inner());
            let replacement =
                PgPool::connect_lazy(&self.database_url).unwrap_or_else(|_| guard.clone());
            std::mem::replace(&mut *guard, replacement)
        };
        old.close().await;
    }

    /// Disconnects, sleeps, then retries `connect()` until it succeeds
    /// (spec.md §4.1: "repeat until success").
    async fn reconnect(&self) -> Result<(), StorageError> {
        self.disconnect().await;
        loop {
            tokio::time::sleep(self.reconnect_interval).await;
            match Self::connect_pool(&self.database_url, false).await {
                Ok(pool) => {
                    *self.pool.write().unwrap_or_else(|e| e.into_inner()) = pool;
                    return Ok(());
                }
                Err(e) if e.is_transient() => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Runs `op` against the live pool. On a transient failure, verifies the
    /// connection, reconnects if needed, and re-runs `op` — the reconnect
    /// envelope (spec.md §4.1).
    pub async fn with_reconnect<T, F, Fut>(&self, op: F) -> Result<T, StorageError>
    where
        F: Fn(PgPool) -> Fut,
        Fut: Future<Output = Result<T, sqlx::Error>>,
    {
        loop {
            match op(self.pool()).await {
                Ok(v) => return Ok(v),
                Err(e) => {
                    let classified = classify(e);
                    if classified.is_transient() {
                        if !self.is_connected().await {
                            self.reconnect().await?;
                        }
                        continue;
                    }
                    return Err(classified);
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "gateway_tests.rs"]
mod tests;
