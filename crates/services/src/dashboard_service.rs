use std::sync::Arc;

use quizya_core::model::{ExamId, ScoreRecord, ScoreSummary, SessionStatus};
use storage::repository::SessionRepository;

use crate::error::DashboardError;

/// Dashboard analytics over stored sessions.
#[derive(Clone)]
pub struct DashboardService {
    sessions: Arc<dyn SessionRepository>,
}

impl DashboardService {
    #[must_use]
    pub fn new(sessions: Arc<dyn SessionRepository>) -> Self {
        Self { sessions }
    }

    /// Count and average score of an exam's completed sessions.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError` on storage failures.
    pub async fn exam_stats(&self, exam_id: ExamId) -> Result<ScoreSummary, DashboardError> {
        let completed = self
            .sessions
            .list_sessions(exam_id, SessionStatus::Completed)
            .await?;
        let records: Vec<ScoreRecord> = completed.iter().map(|s| s.score_record()).collect();
        let summary = ScoreSummary::aggregate(&records);
        tracing::debug!(
            exam_id = %exam_id,
            count = summary.count,
            average = summary.average_score,
            "computed exam stats"
        );
        Ok(summary)
    }
}
