use std::str::FromStr;

use quizya_core::model::{ExamId, SessionId, SessionKind, SessionStatus, StudentId, TimedSession};
use sqlx::Row;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn parse_column<T>(row: &sqlx::sqlite::SqliteRow, column: &'static str) -> Result<T, StorageError>
where
    T: FromStr,
    T::Err: core::fmt::Display,
{
    let raw: String = row.try_get(column).map_err(ser)?;
    raw.parse::<T>()
        .map_err(|e| StorageError::Serialization(format!("invalid {column}: {e}")))
}

pub(crate) fn map_session_row(row: &sqlx::sqlite::SqliteRow) -> Result<TimedSession, StorageError> {
    let student_id = row
        .try_get::<Option<String>, _>("student_id")
        .map_err(ser)?
        .map(|raw| StudentId::from_str(&raw).map_err(ser))
        .transpose()?;

    Ok(TimedSession {
        id: parse_column::<SessionId>(row, "id")?,
        exam_id: parse_column::<ExamId>(row, "exam_id")?,
        kind: parse_column::<SessionKind>(row, "kind")?,
        status: parse_column::<SessionStatus>(row, "status")?,
        started_at: row.try_get("started_at").map_err(ser)?,
        auto_close_duration_minutes: row.try_get("auto_close_duration_minutes").map_err(ser)?,
        score: row.try_get("score").map_err(ser)?,
        student_id,
        guest_email: row.try_get("guest_email").map_err(ser)?,
        created_at: row.try_get("created_at").map_err(ser)?,
    })
}
