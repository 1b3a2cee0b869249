use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use quizya_core::model::{SessionId, SessionKind, SessionStatus, TimedSession};
use storage::repository::SessionRepository;

use crate::Clock;
use crate::error::TimingServiceError;

/// Snapshot of a session's auto-close state at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTiming {
    pub status: SessionStatus,
    pub has_auto_closed: bool,
    pub remaining: Option<Duration>,
    pub deadline: Option<DateTime<Utc>>,
}

impl SessionTiming {
    #[must_use]
    pub fn evaluate(session: &TimedSession, now: DateTime<Utc>) -> Self {
        Self {
            status: session.status,
            has_auto_closed: session.has_auto_closed(now),
            remaining: session.remaining_time(now),
            deadline: session.deadline(),
        }
    }
}

/// Applies the auto-close evaluator to stored sessions.
///
/// The evaluator itself never mutates anything; this service is the one that
/// transitions expired `active` sessions to `closed`.
#[derive(Clone)]
pub struct SessionTimingService {
    clock: Clock,
    sessions: Arc<dyn SessionRepository>,
}

impl SessionTimingService {
    #[must_use]
    pub fn new(clock: Clock, sessions: Arc<dyn SessionRepository>) -> Self {
        Self { clock, sessions }
    }

    async fn load(&self, id: SessionId) -> Result<TimedSession, TimingServiceError> {
        self.sessions
            .get_session(id)
            .await?
            .ok_or(TimingServiceError::NotFound(id))
    }

    /// Evaluate a session's timing against the service clock.
    ///
    /// # Errors
    ///
    /// Returns `TimingServiceError::NotFound` for unknown sessions, or a storage error.
    pub async fn timing(&self, id: SessionId) -> Result<SessionTiming, TimingServiceError> {
        let session = self.load(id).await?;
        Ok(SessionTiming::evaluate(&session, self.clock.now()))
    }

    /// Close the session if it is active and its deadline has passed.
    ///
    /// Returns whether the session was closed by this call.
    ///
    /// # Errors
    ///
    /// Returns `TimingServiceError::NotFound` for unknown sessions, or a storage error.
    pub async fn close_if_expired(&self, id: SessionId) -> Result<bool, TimingServiceError> {
        let mut session = self.load(id).await?;
        self.close_expired_session(&mut session).await
    }

    /// Close every active session of `kind` whose deadline has passed.
    ///
    /// # Errors
    ///
    /// Returns `TimingServiceError` on the first storage failure.
    pub async fn close_expired(
        &self,
        kind: SessionKind,
    ) -> Result<Vec<SessionId>, TimingServiceError> {
        let active = self.sessions.list_active(kind).await?;
        tracing::debug!(kind = kind.as_str(), active = active.len(), "sweeping sessions");

        let mut closed = Vec::new();
        for mut session in active {
            if self.close_expired_session(&mut session).await? {
                closed.push(session.id);
            }
        }
        Ok(closed)
    }

    async fn close_expired_session(
        &self,
        session: &mut TimedSession,
    ) -> Result<bool, TimingServiceError> {
        if !session.is_active() || !session.has_auto_closed(self.clock.now()) {
            return Ok(false);
        }

        if !self.sessions.close_if_active(session.id).await? {
            tracing::debug!(
                session_id = %session.id,
                "session left active before it could be closed"
            );
            return Ok(false);
        }

        session.close()?;
        tracing::info!(
            session_id = %session.id,
            kind = session.kind.as_str(),
            "auto-closed expired session"
        );
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizya_core::model::ExamId;
    use quizya_core::time::fixed_now;
    use storage::repository::InMemoryRepository;

    #[tokio::test]
    async fn zero_duration_is_never_closed() {
        let repo = Arc::new(InMemoryRepository::new());
        let session = TimedSession::start(
            SessionId::generate(),
            ExamId::generate(),
            SessionKind::Attendance,
            Some(0),
            fixed_now() - Duration::days(2),
        );
        repo.upsert_session(&session).await.unwrap();

        let svc = SessionTimingService::new(Clock::fixed(fixed_now()), repo);
        let timing = svc.timing(session.id).await.unwrap();
        assert!(!timing.has_auto_closed);
        assert_eq!(timing.remaining, None);
        assert!(!svc.close_if_expired(session.id).await.unwrap());
    }

    #[tokio::test]
    async fn unknown_session_is_reported() {
        let svc =
            SessionTimingService::new(Clock::fixed(fixed_now()), Arc::new(InMemoryRepository::new()));
        let id = SessionId::generate();
        let err = svc.timing(id).await.unwrap_err();
        assert!(matches!(err, TimingServiceError::NotFound(missing) if missing == id));
    }
}
