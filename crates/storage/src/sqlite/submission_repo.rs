use exam_core::model::{AttemptId, IdentityToken, QuestionResult, SubmissionResult};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{
    exam_id_from_i64, id_i64, option_index_from_i64, question_id_from_i64, ser, u32_from_i64,
};
use crate::repository::{SubmissionRecord, SubmissionRepository, SubmissionRow, StorageError};

async fn load_breakdown(
    pool: &sqlx::SqlitePool,
    submission_id: i64,
) -> Result<Vec<QuestionResult>, StorageError> {
    let rows = sqlx::query(
        r"
            SELECT question_id, user_answer, correct_answer, is_correct, is_skipped
            FROM submission_answers
            WHERE submission_id = ?1
            ORDER BY position
        ",
    )
    .bind(submission_id)
    .fetch_all(pool)
    .await
    .map_err(|e| StorageError::Connection(e.to_string()))?;

    rows.iter()
        .map(|row| {
            let user_answer = row
                .try_get::<Option<i64>, _>("user_answer")
                .map_err(ser)?
                .map(|v| option_index_from_i64("user_answer", v))
                .transpose()?;
            Ok(QuestionResult {
                question_id: question_id_from_i64(
                    row.try_get::<i64, _>("question_id").map_err(ser)?,
                )?,
                user_answer,
                correct_answer: option_index_from_i64(
                    "correct_answer",
                    row.try_get::<i64, _>("correct_answer").map_err(ser)?,
                )?,
                is_correct: row.try_get::<bool, _>("is_correct").map_err(ser)?,
                is_skipped: row.try_get::<bool, _>("is_skipped").map_err(ser)?,
            })
        })
        .collect()
}

async fn map_submission(
    pool: &sqlx::SqlitePool,
    row: &sqlx::sqlite::SqliteRow,
) -> Result<SubmissionRow, StorageError> {
    let id: i64 = row.try_get("id").map_err(ser)?;
    let exam_id = exam_id_from_i64(row.try_get::<i64, _>("exam_id").map_err(ser)?)?;
    let attempt_id: AttemptId = row
        .try_get::<String, _>("attempt_id")
        .map_err(ser)?
        .parse()
        .map_err(ser)?;
    let identity = IdentityToken::new(row.try_get::<String, _>("identity").map_err(ser)?);
    let submitted_at = row.try_get("submitted_at").map_err(ser)?;

    let breakdown = load_breakdown(pool, id).await?;
    let result = SubmissionResult::new(
        exam_id,
        attempt_id,
        row.try_get::<f64, _>("score").map_err(ser)?,
        u32_from_i64(
            "total_questions",
            row.try_get::<i64, _>("total_questions").map_err(ser)?,
        )?,
        u32_from_i64(
            "correct_answers",
            row.try_get::<i64, _>("correct_answers").map_err(ser)?,
        )?,
        u32_from_i64(
            "wrong_answers",
            row.try_get::<i64, _>("wrong_answers").map_err(ser)?,
        )?,
        u32_from_i64(
            "skipped_questions",
            row.try_get::<i64, _>("skipped_questions").map_err(ser)?,
        )?,
        row.try_get::<f64, _>("percentage").map_err(ser)?,
        row.try_get::<bool, _>("passed").map_err(ser)?,
        u32_from_i64(
            "time_taken_seconds",
            row.try_get::<i64, _>("time_taken_seconds").map_err(ser)?,
        )?,
        breakdown,
    )
    .map_err(ser)?;

    Ok(SubmissionRow::new(
        id,
        SubmissionRecord::new(result, identity, submitted_at),
    ))
}

#[async_trait::async_trait]
impl SubmissionRepository for SqliteRepository {
    async fn append_submission(&self, record: &SubmissionRecord) -> Result<i64, StorageError> {
        let result = &record.result;
        let exam_id = id_i64("exam_id", result.exam_id().value())?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let res = sqlx::query(
            r"
                INSERT INTO submissions (
                    exam_id, attempt_id, identity, score, total_questions,
                    correct_answers, wrong_answers, skipped_questions,
                    percentage, passed, time_taken_seconds, submitted_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            ",
        )
        .bind(exam_id)
        .bind(result.attempt_id().to_string())
        .bind(record.identity.as_str())
        .bind(result.score())
        .bind(i64::from(result.total_questions()))
        .bind(i64::from(result.correct_answers()))
        .bind(i64::from(result.wrong_answers()))
        .bind(i64::from(result.skipped_questions()))
        .bind(result.percentage())
        .bind(result.passed())
        .bind(i64::from(result.time_taken_seconds()))
        .bind(record.submitted_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let submission_id = res.last_insert_rowid();

        for (position, entry) in result.breakdown().iter().enumerate() {
            sqlx::query(
                r"
                    INSERT INTO submission_answers (
                        submission_id, position, question_id,
                        user_answer, correct_answer, is_correct, is_skipped
                    )
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ",
            )
            .bind(submission_id)
            .bind(i64::try_from(position).map_err(ser)?)
            .bind(id_i64("question_id", entry.question_id.value())?)
            .bind(entry.user_answer.map(|a| i64::from(a.value())))
            .bind(i64::from(entry.correct_answer.value()))
            .bind(entry.is_correct)
            .bind(entry.is_skipped)
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(submission_id)
    }

    async fn get_submission(&self, id: i64) -> Result<SubmissionRecord, StorageError> {
        let row = sqlx::query(
            r"
                SELECT id, exam_id, attempt_id, identity, score, total_questions,
                       correct_answers, wrong_answers, skipped_questions,
                       percentage, passed, time_taken_seconds, submitted_at
                FROM submissions
                WHERE id = ?1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?
        .ok_or(StorageError::NotFound)?;

        Ok(map_submission(&self.pool, &row).await?.record)
    }

    async fn list_submissions(
        &self,
        exam_id: exam_core::model::ExamId,
        limit: u32,
    ) -> Result<Vec<SubmissionRow>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, exam_id, attempt_id, identity, score, total_questions,
                       correct_answers, wrong_answers, skipped_questions,
                       percentage, passed, time_taken_seconds, submitted_at
                FROM submissions
                WHERE exam_id = ?1
                ORDER BY id DESC
                LIMIT ?2
            ",
        )
        .bind(id_i64("exam_id", exam_id.value())?)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            out.push(map_submission(&self.pool, row).await?);
        }
        Ok(out)
    }
}
