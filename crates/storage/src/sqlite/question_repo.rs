use exam_core::model::{ExamId, Question};

use super::SqliteRepository;
use super::mapping::{id_i64, map_question_row};
use crate::repository::{QuestionRepository, StorageError};

#[async_trait::async_trait]
impl QuestionRepository for SqliteRepository {
    async fn upsert_question(
        &self,
        exam_id: ExamId,
        position: u32,
        question: &Question,
    ) -> Result<(), StorageError> {
        let options = question.options();

        sqlx::query(
            r"
                INSERT INTO questions (
                    id, exam_id, position, prompt, prompt_secondary,
                    option_0, option_1, option_2, option_3, correct_option
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                ON CONFLICT(id, exam_id) DO UPDATE SET
                    position = excluded.position,
                    prompt = excluded.prompt,
                    prompt_secondary = excluded.prompt_secondary,
                    option_0 = excluded.option_0,
                    option_1 = excluded.option_1,
                    option_2 = excluded.option_2,
                    option_3 = excluded.option_3,
                    correct_option = excluded.correct_option
            ",
        )
        .bind(id_i64("question_id", question.id().value())?)
        .bind(id_i64("exam_id", exam_id.value())?)
        .bind(i64::from(position))
        .bind(question.prompt())
        .bind(question.prompt_secondary())
        .bind(&options[0])
        .bind(&options[1])
        .bind(&options[2])
        .bind(&options[3])
        .bind(i64::from(question.correct().value()))
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(())
    }

    async fn questions_for_exam(&self, exam_id: ExamId) -> Result<Vec<Question>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, prompt, prompt_secondary,
                       option_0, option_1, option_2, option_3, correct_option
                FROM questions
                WHERE exam_id = ?1
                ORDER BY position
            ",
        )
        .bind(id_i64("exam_id", exam_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        rows.iter().map(map_question_row).collect()
    }
}
