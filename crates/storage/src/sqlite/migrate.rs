use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Runs a single, consolidated migration for the current schema.
///
/// Creates the full schema (departments, exams, questions, submissions with
/// their per-question answers, and indexes).
#[allow(clippy::too_many_lines)]
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    // Version 1: full schema.
    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS departments (
                    id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS exams (
                    id INTEGER PRIMARY KEY,
                    department_id INTEGER NOT NULL,
                    title TEXT NOT NULL,
                    duration_seconds INTEGER NOT NULL CHECK (duration_seconds > 0),
                    total_questions INTEGER NOT NULL CHECK (total_questions > 0),
                    passing_threshold_percent INTEGER NOT NULL
                        CHECK (passing_threshold_percent BETWEEN 1 AND 100),
                    FOREIGN KEY (department_id) REFERENCES departments(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS questions (
                    id INTEGER NOT NULL,
                    exam_id INTEGER NOT NULL,
                    position INTEGER NOT NULL CHECK (position >= 0),
                    prompt TEXT NOT NULL,
                    prompt_secondary TEXT,
                    option_0 TEXT NOT NULL,
                    option_1 TEXT NOT NULL,
                    option_2 TEXT NOT NULL,
                    option_3 TEXT NOT NULL,
                    correct_option INTEGER NOT NULL CHECK (correct_option BETWEEN 0 AND 3),
                    PRIMARY KEY (id, exam_id),
                    UNIQUE (exam_id, position),
                    FOREIGN KEY (exam_id) REFERENCES exams(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS submissions (
                    id INTEGER PRIMARY KEY,
                    exam_id INTEGER NOT NULL,
                    attempt_id TEXT NOT NULL,
                    identity TEXT NOT NULL,
                    score REAL NOT NULL,
                    total_questions INTEGER NOT NULL CHECK (total_questions > 0),
                    correct_answers INTEGER NOT NULL CHECK (correct_answers >= 0),
                    wrong_answers INTEGER NOT NULL CHECK (wrong_answers >= 0),
                    skipped_questions INTEGER NOT NULL CHECK (skipped_questions >= 0),
                    percentage REAL NOT NULL,
                    passed INTEGER NOT NULL,
                    time_taken_seconds INTEGER NOT NULL CHECK (time_taken_seconds >= 0),
                    submitted_at TEXT NOT NULL,
                    FOREIGN KEY (exam_id) REFERENCES exams(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS submission_answers (
                    submission_id INTEGER NOT NULL,
                    position INTEGER NOT NULL CHECK (position >= 0),
                    question_id INTEGER NOT NULL,
                    user_answer INTEGER CHECK (user_answer BETWEEN 0 AND 3),
                    correct_answer INTEGER NOT NULL CHECK (correct_answer BETWEEN 0 AND 3),
                    is_correct INTEGER NOT NULL,
                    is_skipped INTEGER NOT NULL,
                    PRIMARY KEY (submission_id, position),
                    FOREIGN KEY (submission_id) REFERENCES submissions(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_exams_department ON exams(department_id);",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_questions_exam_position ON questions(exam_id, position);",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_submissions_exam ON submissions(exam_id, id DESC);",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO schema_migrations (version, applied_at) VALUES (1, ?1)")
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
    }

    Ok(())
}
