// SPDX-License-Identifier: MIT

use thiserror::Error;

/// The typed equivalent of the original's bare try/except around operational
/// errors: callers branch on which variant they got instead of inspecting a
/// driver-specific exception.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Connection-level failure. Triggers the reconnect loop.
    #[error("transient database error: {0}")]
    Transient(#[source] sqlx::Error),
    /// A constraint violation the caller may choose to tolerate (e.g.
    /// `log_save` racing a job deletion).
    #[error("integrity violation: {0}")]
    Integrity(#[source] sqlx::Error),
    /// Anything else: propagated unchanged.
    #[error(transparent)]
    Other(sqlx::Error),
    #[error("schema migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error(transparent)]
    Core(#[from] gobw_core::CoreError),
    #[error("task {0} is not locked")]
    NotLocked(String),
    #[error("no row found for id {0}")]
    NotFound(String),
}

impl StorageError {
    pub fn is_transient(&self) -> bool {
        matches!(self, StorageError::Transient(_))
    }

    /// True on a foreign-key violation (Postgres SQLSTATE 23503), the case
    /// `log_save` tolerates when its owning job has already been deleted.
    pub fn is_foreign_key_violation(&self) -> bool {
        match self {
            StorageError::Integrity(sqlx::Error::Database(db_err)) => {
                db_err.code().as_deref() == Some("23503")
            }
            _ => false,
        }
    }
}

/// Classifies a raw driver error into the transient/integrity/other
/// triage the reconnect envelope acts on (spec.md §4.1).
pub fn classify(err: sqlx::Error) -> StorageError {
    match &err {
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            StorageError::Transient(err)
        }
        sqlx::Error::Database(db_err) => {
            let is_integrity = matches!(
                db_err.code().as_deref(),
                Some("23503") | Some("23505") | Some("23502")
            );
            if is_integrity {
                StorageError::Integrity(err)
            } else {
                StorageError::Other(err)
            }
        }
        _ => StorageError::Other(err),
    }
}
