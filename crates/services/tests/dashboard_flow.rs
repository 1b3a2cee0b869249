use std::sync::Arc;

use chrono::Duration;
use quizya_core::model::{ExamId, ScoreSummary, SessionId, SessionKind, TimedSession};
use quizya_core::time::fixed_now;
use services::DashboardService;
use storage::repository::{InMemoryRepository, SessionRepository};

async fn seed(repo: &InMemoryRepository, exam: ExamId, score: Option<f64>, complete: bool) {
    let mut session = TimedSession::start(
        SessionId::generate(),
        exam,
        SessionKind::Exam,
        Some(30),
        fixed_now() - Duration::minutes(5),
    );
    if complete {
        session.complete(score).unwrap();
    }
    repo.upsert_session(&session).await.unwrap();
}

#[tokio::test]
async fn exam_stats_averages_completed_sessions_only() {
    let repo = InMemoryRepository::new();
    let exam = ExamId::generate();

    seed(&repo, exam, Some(80.0), true).await;
    seed(&repo, exam, Some(90.0), true).await;
    seed(&repo, exam, None, true).await;
    // still running, must not count
    seed(&repo, exam, None, false).await;
    // different exam
    seed(&repo, ExamId::generate(), Some(10.0), true).await;

    let svc = DashboardService::new(Arc::new(repo));
    let stats = svc.exam_stats(exam).await.unwrap();
    assert_eq!(
        stats,
        ScoreSummary {
            count: 3,
            average_score: 57
        }
    );
}

#[tokio::test]
async fn exam_without_submissions_reports_zero() {
    let svc = DashboardService::new(Arc::new(InMemoryRepository::new()));
    let stats = svc.exam_stats(ExamId::generate()).await.unwrap();
    assert_eq!(stats, ScoreSummary::default());
}
