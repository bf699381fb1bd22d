use exam_core::model::{
    AttemptId, DepartmentId, ExamBlueprint, ExamId, IdentityToken, OptionIndex, Question,
    QuestionId, QuestionResult, SubmissionResult,
};
use exam_core::time::fixed_now;
use storage::repository::{
    DepartmentRecord, DepartmentRepository, ExamRepository, QuestionRepository, SubmissionRecord,
    SubmissionRepository,
};
use storage::sqlite::SqliteRepository;

fn opt(v: u8) -> OptionIndex {
    OptionIndex::new(v).unwrap()
}

fn build_question(id: u64, correct: u8) -> Question {
    Question::new(
        QuestionId::new(id),
        format!("Q{id}"),
        Some(format!("Q{id} deuxième langue")),
        ["A", "B", "C", "D"].map(String::from),
        opt(correct),
    )
    .unwrap()
}

async fn seed_exam(repo: &SqliteRepository, exam_id: u64, total: u32) -> ExamBlueprint {
    let department = DepartmentRecord {
        id: DepartmentId::new(1),
        name: "Computer Science".into(),
    };
    repo.upsert_department(&department).await.unwrap();

    let blueprint = ExamBlueprint::new(
        ExamId::new(exam_id),
        department.id,
        "Integration Exam",
        600,
        total,
    )
    .unwrap();
    repo.upsert_exam(&blueprint).await.unwrap();
    blueprint
}

#[tokio::test]
async fn sqlite_roundtrips_exam_and_ordered_questions() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_exam_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let blueprint = seed_exam(&repo, 1, 3).await;

    // insert out of display order; reads must come back by position
    repo.upsert_question(blueprint.exam_id(), 2, &build_question(30, 2))
        .await
        .unwrap();
    repo.upsert_question(blueprint.exam_id(), 0, &build_question(10, 0))
        .await
        .unwrap();
    repo.upsert_question(blueprint.exam_id(), 1, &build_question(20, 1))
        .await
        .unwrap();

    let fetched = repo.get_exam(blueprint.exam_id()).await.unwrap();
    assert_eq!(fetched, blueprint);
    assert_eq!(fetched.passing_threshold_percent(), 40);

    let questions = repo.questions_for_exam(blueprint.exam_id()).await.unwrap();
    let ids: Vec<u64> = questions.iter().map(|q| q.id().value()).collect();
    assert_eq!(ids, vec![10, 20, 30]);
    assert_eq!(questions[1].correct(), opt(1));
    assert!(questions[0].prompt_secondary().is_some());
}

#[tokio::test]
async fn sqlite_misses_surface_not_found_and_empty_lists() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_misses?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let err = repo.get_exam(ExamId::new(404)).await.unwrap_err();
    assert!(matches!(err, storage::StorageError::NotFound));

    let questions = repo.questions_for_exam(ExamId::new(404)).await.unwrap();
    assert!(questions.is_empty());
}

#[tokio::test]
async fn sqlite_roundtrips_submission_with_breakdown() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_submissions?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let blueprint = seed_exam(&repo, 2, 3).await;
    let attempt_id = AttemptId::generate();

    let breakdown = vec![
        QuestionResult {
            question_id: QuestionId::new(10),
            user_answer: Some(opt(0)),
            correct_answer: opt(0),
            is_correct: true,
            is_skipped: false,
        },
        QuestionResult {
            question_id: QuestionId::new(20),
            user_answer: Some(opt(3)),
            correct_answer: opt(1),
            is_correct: false,
            is_skipped: false,
        },
        QuestionResult {
            question_id: QuestionId::new(30),
            user_answer: None,
            correct_answer: opt(2),
            is_correct: false,
            is_skipped: true,
        },
    ];
    let result = SubmissionResult::new(
        blueprint.exam_id(),
        attempt_id,
        0.67,
        3,
        1,
        1,
        1,
        22.33,
        false,
        480,
        breakdown,
    )
    .unwrap();
    let record = SubmissionRecord::new(result, IdentityToken::new("student-42"), fixed_now());

    let id = repo.append_submission(&record).await.unwrap();
    let fetched = repo.get_submission(id).await.unwrap();

    assert_eq!(fetched.result, record.result);
    assert_eq!(fetched.identity.as_str(), "student-42");
    assert_eq!(fetched.submitted_at, fixed_now());
    assert_eq!(fetched.result.attempt_id(), attempt_id);
    assert_eq!(fetched.result.breakdown().len(), 3);
    assert!(fetched.result.breakdown()[2].is_skipped);

    // append the same record again (persistence retry): new row, same result
    let retry_id = repo.append_submission(&record).await.unwrap();
    assert_ne!(retry_id, id);
    let rows = repo.list_submissions(blueprint.exam_id(), 10).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].id, retry_id);
    assert_eq!(rows[0].record.result, rows[1].record.result);
}
