use chrono::Duration;
use quizya_core::model::{ExamId, SessionId, SessionKind, SessionStatus, StudentId, TimedSession};
use quizya_core::time::fixed_now;
use storage::repository::{SessionRepository, StorageError};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn sqlite_roundtrip_preserves_optional_fields() {
    let repo = connect("memdb_roundtrip").await;

    let mut session = TimedSession::start(
        SessionId::generate(),
        ExamId::generate(),
        SessionKind::Exam,
        Some(45),
        fixed_now(),
    );
    session.student_id = Some(StudentId::new(SessionId::generate().value()));
    repo.upsert_session(&session).await.unwrap();

    let fetched = repo.get_session(session.id).await.unwrap().expect("stored");
    assert_eq!(fetched, session);

    let mut guest = TimedSession::start(
        SessionId::generate(),
        session.exam_id,
        SessionKind::Exam,
        None,
        fixed_now(),
    );
    guest.started_at = None;
    guest.guest_email = Some("jo@x.com".into());
    repo.upsert_session(&guest).await.unwrap();

    let fetched = repo.get_session(guest.id).await.unwrap().expect("stored");
    assert_eq!(fetched.started_at, None);
    assert_eq!(fetched.auto_close_duration_minutes, None);
    assert_eq!(fetched.guest_email.as_deref(), Some("jo@x.com"));
}

#[tokio::test]
async fn sqlite_filters_completed_sessions_per_exam() {
    let repo = connect("memdb_completed").await;
    let exam = ExamId::generate();

    for (offset, score) in [(0, Some(80.0)), (1, Some(90.0)), (2, None)] {
        let mut s = TimedSession::start(
            SessionId::generate(),
            exam,
            SessionKind::Exam,
            None,
            fixed_now() + Duration::minutes(offset),
        );
        s.complete(score).unwrap();
        repo.upsert_session(&s).await.unwrap();
    }
    let still_running = TimedSession::start(
        SessionId::generate(),
        exam,
        SessionKind::Exam,
        Some(10),
        fixed_now(),
    );
    repo.upsert_session(&still_running).await.unwrap();

    let completed = repo
        .list_sessions(exam, SessionStatus::Completed)
        .await
        .unwrap();
    let scores: Vec<_> = completed.iter().map(|s| s.score).collect();
    assert_eq!(scores, vec![Some(80.0), Some(90.0), None]);

    let active = repo.list_active(SessionKind::Exam).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, still_running.id);
}

#[tokio::test]
async fn sqlite_close_if_active() {
    let repo = connect("memdb_close_if_active").await;

    let err = repo
        .close_if_active(SessionId::generate())
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::NotFound));

    let session = TimedSession::start(
        SessionId::generate(),
        ExamId::generate(),
        SessionKind::Attendance,
        Some(5),
        fixed_now(),
    );
    repo.upsert_session(&session).await.unwrap();
    assert!(repo.close_if_active(session.id).await.unwrap());
    assert!(!repo.close_if_active(session.id).await.unwrap());

    let fetched = repo.get_session(session.id).await.unwrap().unwrap();
    assert_eq!(fetched.status, SessionStatus::Closed);
    assert!(repo.list_active(SessionKind::Attendance).await.unwrap().is_empty());
}

#[tokio::test]
async fn sqlite_close_if_active_keeps_submission_that_landed_first() {
    let repo = connect("memdb_close_after_submit").await;
    let exam = ExamId::generate();

    let session = TimedSession::start(
        SessionId::generate(),
        exam,
        SessionKind::Exam,
        Some(5),
        fixed_now() - Duration::minutes(10),
    );
    repo.upsert_session(&session).await.unwrap();

    let snapshot = repo.list_active(SessionKind::Exam).await.unwrap();
    assert_eq!(snapshot.len(), 1);

    let mut submitted = snapshot[0].clone();
    submitted.complete(Some(90.0)).unwrap();
    repo.upsert_session(&submitted).await.unwrap();

    assert!(!repo.close_if_active(snapshot[0].id).await.unwrap());
    let completed = repo
        .list_sessions(exam, SessionStatus::Completed)
        .await
        .unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].score, Some(90.0));
}

#[tokio::test]
async fn sqlite_upsert_updates_existing_row() {
    let repo = connect("memdb_upsert_update").await;
    let exam = ExamId::generate();

    let mut session = TimedSession::start(
        SessionId::generate(),
        exam,
        SessionKind::Exam,
        Some(30),
        fixed_now(),
    );
    repo.upsert_session(&session).await.unwrap();

    session.complete(Some(72.5)).unwrap();
    session.guest_email = Some("jo@x.com".into());
    repo.upsert_session(&session).await.unwrap();

    let fetched = repo.get_session(session.id).await.unwrap().unwrap();
    assert_eq!(fetched.status, SessionStatus::Completed);
    assert_eq!(fetched.score, Some(72.5));
    assert_eq!(fetched.guest_email.as_deref(), Some("jo@x.com"));
    assert_eq!(fetched.created_at, session.created_at);

    assert!(repo.list_active(SessionKind::Exam).await.unwrap().is_empty());
    let completed = repo
        .list_sessions(exam, SessionStatus::Completed)
        .await
        .unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].id, session.id);
}

#[tokio::test]
async fn sqlite_migrations_are_idempotent() {
    let repo = connect("memdb_migrate_twice").await;
    repo.migrate().await.expect("second migrate");
}
