//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::StatsError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by the `ScoringEngine` state machine.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EngineError {
    #[error("a session is already in progress")]
    SessionInProgress,
    #[error("no session is in progress")]
    NoActiveSession,
    #[error(transparent)]
    Stats(#[from] StatsError),
}

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
