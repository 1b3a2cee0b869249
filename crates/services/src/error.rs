//! Shared error types for the services crate.

use thiserror::Error;

use quizya_core::model::{GuestSessionError, SessionId, SessionStatusError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `SessionTimingService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TimingServiceError {
    #[error("session {0} not found")]
    NotFound(SessionId),
    #[error(transparent)]
    Status(#[from] SessionStatusError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `DashboardService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DashboardError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted when writing a guest record.
///
/// Reads never fail; see `GuestIdentityService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GuestIdentityError {
    #[error(transparent)]
    Validation(#[from] GuestSessionError),
    #[error("failed to encode guest record: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
