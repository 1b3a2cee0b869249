use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::{ExamId, ScoreRecord, SessionId, StudentId};
use crate::timing;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionStatusError {
    #[error("session is already {0}")]
    NotActive(SessionStatus),

    #[error("unknown session status: {0}")]
    UnknownStatus(String),

    #[error("unknown session kind: {0}")]
    UnknownKind(String),
}

//
// ─── KIND / STATUS ─────────────────────────────────────────────────────────────
//

/// What a timed session tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    Attendance,
    Exam,
}

impl SessionKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SessionKind::Attendance => "attendance",
            SessionKind::Exam => "exam",
        }
    }
}

impl FromStr for SessionKind {
    type Err = SessionStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "attendance" => Ok(SessionKind::Attendance),
            "exam" => Ok(SessionKind::Exam),
            other => Err(SessionStatusError::UnknownKind(other.to_string())),
        }
    }
}

/// Lifecycle state of a session.
///
/// `Completed` is reached when a taker submits; `Closed` when a teacher or the
/// auto-close sweep ends the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Completed,
    Closed,
}

impl SessionStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Completed => "completed",
            SessionStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = SessionStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(SessionStatus::Active),
            "completed" => Ok(SessionStatus::Completed),
            "closed" => Ok(SessionStatus::Closed),
            other => Err(SessionStatusError::UnknownStatus(other.to_string())),
        }
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// A timed exam or attendance session as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedSession {
    pub id: SessionId,
    pub exam_id: ExamId,
    pub kind: SessionKind,
    pub status: SessionStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub auto_close_duration_minutes: Option<i64>,
    pub score: Option<f64>,
    pub student_id: Option<StudentId>,
    pub guest_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TimedSession {
    /// Create an active session that started at `now`.
    #[must_use]
    pub fn start(
        id: SessionId,
        exam_id: ExamId,
        kind: SessionKind,
        auto_close_duration_minutes: Option<i64>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            exam_id,
            kind,
            status: SessionStatus::Active,
            started_at: Some(now),
            auto_close_duration_minutes,
            score: None,
            student_id: None,
            guest_email: None,
            created_at: now,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    #[must_use]
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        timing::auto_close_deadline(self.started_at, self.auto_close_duration_minutes)
    }

    #[must_use]
    pub fn has_auto_closed(&self, now: DateTime<Utc>) -> bool {
        timing::has_auto_closed(self.started_at, self.auto_close_duration_minutes, now)
    }

    #[must_use]
    pub fn remaining_time(&self, now: DateTime<Utc>) -> Option<Duration> {
        timing::remaining_time(self.started_at, self.auto_close_duration_minutes, now)
    }

    /// Record a submission and mark the session completed.
    ///
    /// # Errors
    ///
    /// Returns `SessionStatusError::NotActive` if the session already ended.
    pub fn complete(&mut self, score: Option<f64>) -> Result<(), SessionStatusError> {
        if !self.is_active() {
            return Err(SessionStatusError::NotActive(self.status));
        }
        self.status = SessionStatus::Completed;
        self.score = score;
        Ok(())
    }

    /// Mark the session closed.
    ///
    /// # Errors
    ///
    /// Returns `SessionStatusError::NotActive` if the session already ended.
    pub fn close(&mut self) -> Result<(), SessionStatusError> {
        if !self.is_active() {
            return Err(SessionStatusError::NotActive(self.status));
        }
        self.status = SessionStatus::Closed;
        Ok(())
    }

    #[must_use]
    pub fn score_record(&self) -> ScoreRecord {
        ScoreRecord::new(self.score)
    }
}
