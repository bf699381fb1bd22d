//! End-to-end smoke tests for the attempt workflow against in-memory
//! storage: begin, answer, tick, submit, persist, retry.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Duration;

use exam_core::ledger::ExamMode;
use exam_core::model::{
    DepartmentId, ExamBlueprint, ExamId, IdentityToken, OptionIndex, Question, QuestionId,
};
use exam_core::session::TickOutcome;
use exam_core::time::{Clock, fixed_now};
use services::{AttemptError, AttemptService, PaletteStatus};
use storage::repository::{
    ExamRepository, QuestionRepository, Storage, StorageError, SubmissionRecord,
    SubmissionRepository, SubmissionRow,
};

fn opt(v: u8) -> OptionIndex {
    OptionIndex::new(v).unwrap()
}

fn build_question(id: u64, correct: u8) -> Question {
    Question::new(
        QuestionId::new(id),
        format!("Question {id}"),
        Some(format!("Question {id} (secondary)")),
        ["A", "B", "C", "D"].map(String::from),
        opt(correct),
    )
    .unwrap()
}

async fn seed_exam(storage: &Storage, exam_id: u64, duration: u32, questions: u32) {
    let blueprint = ExamBlueprint::new(
        ExamId::new(exam_id),
        DepartmentId::new(7),
        "Data Structures",
        duration,
        questions,
    )
    .unwrap();
    storage.exams.upsert_exam(&blueprint).await.unwrap();
    for position in 0..questions {
        let question = build_question(u64::from(position) + 1, u8::try_from(position % 4).unwrap());
        storage
            .questions
            .upsert_question(ExamId::new(exam_id), position, &question)
            .await
            .unwrap();
    }
}

fn service_at(storage: &Storage, offset_seconds: i64) -> AttemptService {
    let clock = Clock::fixed(fixed_now() + Duration::seconds(offset_seconds));
    AttemptService::from_storage(clock, storage)
}

#[tokio::test]
async fn full_lifecycle_persists_the_graded_result() {
    let storage = Storage::in_memory();
    seed_exam(&storage, 1, 600, 3).await;
    let identity = IdentityToken::new("student-42");

    let service = service_at(&storage, 0);
    let mut attempt = service
        .start_attempt(ExamId::new(1), ExamMode::Exam)
        .await
        .unwrap();

    // q0 correct, q1 wrong, q2 skipped
    attempt.session_mut().select_current(opt(0)).unwrap();
    attempt.session_mut().next().unwrap();
    attempt.session_mut().select_current(opt(3)).unwrap();
    attempt.session_mut().toggle_review(2).unwrap();

    assert_eq!(
        attempt.palette(),
        vec![
            PaletteStatus::Answered,
            PaletteStatus::Answered,
            PaletteStatus::Marked,
        ]
    );

    let progress = attempt.progress(fixed_now() + Duration::seconds(60));
    assert_eq!(progress.answered(), 2);
    assert_eq!(progress.unanswered(), 1);
    assert_eq!(progress.time_remaining_seconds(), 540);

    // submit 90 seconds in
    let later = service_at(&storage, 90);
    let id = later.submit(&mut attempt, &identity).await.unwrap();
    assert_eq!(attempt.submission_id(), Some(id));

    let record = storage.submissions.get_submission(id).await.unwrap();
    assert_eq!(record.identity.as_str(), "student-42");
    assert_eq!(record.result.score(), 0.67);
    assert_eq!(record.result.percentage(), 22.33);
    assert!(!record.result.passed());
    assert_eq!(record.result.time_taken_seconds(), 90);
    assert_eq!(record.result.attempt_id(), attempt.session().attempt_id());
}

#[tokio::test]
async fn expiry_tick_auto_persists() {
    let storage = Storage::in_memory();
    seed_exam(&storage, 1, 5, 2).await;
    let identity = IdentityToken::new("student-42");

    let service = service_at(&storage, 0);
    let mut attempt = service
        .start_attempt(ExamId::new(1), ExamMode::Exam)
        .await
        .unwrap();
    attempt.session_mut().select_current(opt(0)).unwrap();

    let running = service.tick(&mut attempt, &identity).await.unwrap();
    assert_eq!(running, TickOutcome::Running { remaining: 5 });
    assert_eq!(attempt.submission_id(), None);

    // the host loop stalls past the deadline; one late tick both scores
    // and persists
    let late = service_at(&storage, 30);
    let outcome = late.tick(&mut attempt, &identity).await.unwrap();
    assert_eq!(outcome, TickOutcome::Expired);

    let id = attempt.submission_id().expect("persisted on expiry");
    let record = storage.submissions.get_submission(id).await.unwrap();
    assert_eq!(record.result.time_taken_seconds(), 5);
    assert_eq!(record.result.correct_answers(), 1);

    // further ticks are inert
    assert_eq!(late.tick(&mut attempt, &identity).await.unwrap(), TickOutcome::Over);
}

#[tokio::test]
async fn duplicate_submit_stores_one_row() {
    let storage = Storage::in_memory();
    seed_exam(&storage, 1, 600, 2).await;
    let identity = IdentityToken::new("student-42");

    let service = service_at(&storage, 10);
    let mut attempt = service
        .start_attempt(ExamId::new(1), ExamMode::Exam)
        .await
        .unwrap();

    let first = service.submit(&mut attempt, &identity).await.unwrap();
    let second = service.submit(&mut attempt, &identity).await.unwrap();
    assert_eq!(first, second);

    let rows = storage.submissions.list_submissions(ExamId::new(1), 10).await.unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn start_attempt_surfaces_catalog_misses() {
    let storage = Storage::in_memory();
    let service = service_at(&storage, 0);

    let err = service
        .start_attempt(ExamId::new(404), ExamMode::Exam)
        .await
        .unwrap_err();
    assert!(matches!(err, AttemptError::ExamNotFound(id) if id == ExamId::new(404)));

    // exam exists, content was never loaded
    let blueprint =
        ExamBlueprint::new(ExamId::new(2), DepartmentId::new(7), "Empty", 600, 3).unwrap();
    storage.exams.upsert_exam(&blueprint).await.unwrap();
    let err = service
        .start_attempt(ExamId::new(2), ExamMode::Exam)
        .await
        .unwrap_err();
    assert!(matches!(err, AttemptError::NoQuestions(id) if id == ExamId::new(2)));
}

/// Fails the first append, then delegates; models a transient storage
/// outage at submit time.
struct FlakySubmissions {
    inner: Arc<dyn SubmissionRepository>,
    failed_once: AtomicBool,
}

#[async_trait]
impl SubmissionRepository for FlakySubmissions {
    async fn append_submission(&self, record: &SubmissionRecord) -> Result<i64, StorageError> {
        if !self.failed_once.swap(true, Ordering::SeqCst) {
            return Err(StorageError::Connection("socket reset".into()));
        }
        self.inner.append_submission(record).await
    }

    async fn get_submission(&self, id: i64) -> Result<SubmissionRecord, StorageError> {
        self.inner.get_submission(id).await
    }

    async fn list_submissions(
        &self,
        exam_id: ExamId,
        limit: u32,
    ) -> Result<Vec<SubmissionRow>, StorageError> {
        self.inner.list_submissions(exam_id, limit).await
    }
}

#[tokio::test]
async fn finalize_retries_a_failed_persist_without_rescoring() {
    let mut storage = Storage::in_memory();
    seed_exam(&storage, 1, 600, 2).await;
    storage.submissions = Arc::new(FlakySubmissions {
        inner: Arc::new(storage::repository::InMemoryRepository::new()),
        failed_once: AtomicBool::new(false),
    });
    let identity = IdentityToken::new("student-42");

    let service = service_at(&storage, 10);
    let mut attempt = service
        .start_attempt(ExamId::new(1), ExamMode::Exam)
        .await
        .unwrap();
    attempt.session_mut().select_current(opt(0)).unwrap();

    let err = service.submit(&mut attempt, &identity).await.unwrap_err();
    assert!(matches!(err, AttemptError::Storage(_)));

    // the graded result survived the failed write
    let cached = attempt.session().result().cloned().expect("still graded");
    assert_eq!(attempt.submission_id(), None);

    let id = service
        .finalize_submission(&mut attempt, &identity)
        .await
        .unwrap();
    let record = storage.submissions.get_submission(id).await.unwrap();
    assert_eq!(record.result, cached);

    // a second finalize is a no-op returning the recorded id
    let again = service
        .finalize_submission(&mut attempt, &identity)
        .await
        .unwrap();
    assert_eq!(again, id);
    let rows = storage.submissions.list_submissions(ExamId::new(1), 10).await.unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn finalize_before_submit_is_rejected() {
    let storage = Storage::in_memory();
    seed_exam(&storage, 1, 600, 2).await;
    let service = service_at(&storage, 0);
    let mut attempt = service
        .start_attempt(ExamId::new(1), ExamMode::Exam)
        .await
        .unwrap();

    let err = service
        .finalize_submission(&mut attempt, &IdentityToken::new("student-42"))
        .await
        .unwrap_err();
    assert!(matches!(err, AttemptError::NotSubmitted));
}
