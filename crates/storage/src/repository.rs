use async_trait::async_trait;
use quizya_core::model::{ExamId, SessionId, SessionKind, SessionStatus, TimedSession};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("storage is unavailable in this context")]
    Unavailable,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository contract for exam and attendance sessions.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Persist or update a session.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the session cannot be stored.
    async fn upsert_session(&self, session: &TimedSession) -> Result<(), StorageError>;

    /// Fetch a session by ID, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn get_session(&self, id: SessionId) -> Result<Option<TimedSession>, StorageError>;

    /// List an exam's sessions in the given status, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn list_sessions(
        &self,
        exam_id: ExamId,
        status: SessionStatus,
    ) -> Result<Vec<TimedSession>, StorageError>;

    /// List every active session of the given kind, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn list_active(&self, kind: SessionKind) -> Result<Vec<TimedSession>, StorageError>;

    /// Mark a session closed, but only if it is still active at write time.
    ///
    /// Returns `false` when the stored session already left `active`
    /// (completed or closed), leaving it untouched.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the session does not exist.
    async fn close_if_active(&self, id: SessionId) -> Result<bool, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    sessions: Arc<Mutex<HashMap<SessionId, TimedSession>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn filtered(
        &self,
        keep: impl Fn(&TimedSession) -> bool,
    ) -> Result<Vec<TimedSession>, StorageError> {
        let guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut out: Vec<TimedSession> = guard.values().filter(|s| keep(s)).cloned().collect();
        out.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(out)
    }
}

#[async_trait]
impl SessionRepository for InMemoryRepository {
    async fn upsert_session(&self, session: &TimedSession) -> Result<(), StorageError> {
        let mut guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(session.id, session.clone());
        Ok(())
    }

    async fn get_session(&self, id: SessionId) -> Result<Option<TimedSession>, StorageError> {
        let guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&id).cloned())
    }

    async fn list_sessions(
        &self,
        exam_id: ExamId,
        status: SessionStatus,
    ) -> Result<Vec<TimedSession>, StorageError> {
        self.filtered(|s| s.exam_id == exam_id && s.status == status)
    }

    async fn list_active(&self, kind: SessionKind) -> Result<Vec<TimedSession>, StorageError> {
        self.filtered(|s| s.kind == kind && s.status == SessionStatus::Active)
    }

    async fn close_if_active(&self, id: SessionId) -> Result<bool, StorageError> {
        let mut guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let session = guard.get_mut(&id).ok_or(StorageError::NotFound)?;
        if session.status != SessionStatus::Active {
            return Ok(false);
        }
        session.status = SessionStatus::Closed;
        Ok(true)
    }
}

/// Bundles repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub sessions: Arc<dyn SessionRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let sessions: Arc<dyn SessionRepository> = Arc::new(InMemoryRepository::new());
        Self { sessions }
    }
}
