use quizya_core::model::{ExamId, SessionId, SessionKind, SessionStatus, TimedSession};

use super::{SqliteRepository, mapping::map_session_row};
use crate::repository::{SessionRepository, StorageError};

const SESSION_COLUMNS: &str = r"
    id, exam_id, kind, status, started_at, auto_close_duration_minutes,
    score, student_id, guest_email, created_at
";

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn map_rows(rows: &[sqlx::sqlite::SqliteRow]) -> Result<Vec<TimedSession>, StorageError> {
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        out.push(map_session_row(row)?);
    }
    Ok(out)
}

#[async_trait::async_trait]
impl SessionRepository for SqliteRepository {
    async fn upsert_session(&self, session: &TimedSession) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO sessions (
                    id, exam_id, kind, status, started_at, auto_close_duration_minutes,
                    score, student_id, guest_email, created_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                ON CONFLICT(id) DO UPDATE SET
                    exam_id = excluded.exam_id,
                    kind = excluded.kind,
                    status = excluded.status,
                    started_at = excluded.started_at,
                    auto_close_duration_minutes = excluded.auto_close_duration_minutes,
                    score = excluded.score,
                    student_id = excluded.student_id,
                    guest_email = excluded.guest_email
            ",
        )
        .bind(session.id.to_string())
        .bind(session.exam_id.to_string())
        .bind(session.kind.as_str())
        .bind(session.status.as_str())
        .bind(session.started_at)
        .bind(session.auto_close_duration_minutes)
        .bind(session.score)
        .bind(session.student_id.map(|id| id.to_string()))
        .bind(session.guest_email.as_deref())
        .bind(session.created_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn get_session(&self, id: SessionId) -> Result<Option<TimedSession>, StorageError> {
        let sql = format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1");
        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.as_ref().map(map_session_row).transpose()
    }

    async fn list_sessions(
        &self,
        exam_id: ExamId,
        status: SessionStatus,
    ) -> Result<Vec<TimedSession>, StorageError> {
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM sessions
             WHERE exam_id = ?1 AND status = ?2
             ORDER BY created_at ASC, id ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(exam_id.to_string())
            .bind(status.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        map_rows(&rows)
    }

    async fn list_active(&self, kind: SessionKind) -> Result<Vec<TimedSession>, StorageError> {
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM sessions
             WHERE kind = ?1 AND status = ?2
             ORDER BY created_at ASC, id ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(kind.as_str())
            .bind(SessionStatus::Active.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        map_rows(&rows)
    }

    async fn close_if_active(&self, id: SessionId) -> Result<bool, StorageError> {
        let res = sqlx::query("UPDATE sessions SET status = ?1 WHERE id = ?2 AND status = ?3")
            .bind(SessionStatus::Closed.as_str())
            .bind(id.to_string())
            .bind(SessionStatus::Active.as_str())
            .execute(&self.pool)
            .await
            .map_err(conn)?;

        if res.rows_affected() > 0 {
            return Ok(true);
        }

        let exists = sqlx::query("SELECT 1 FROM sessions WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;
        match exists {
            Some(_) => Ok(false),
            None => Err(StorageError::NotFound),
        }
    }
}
