use exam_core::model::{DepartmentId, ExamBlueprint, ExamId};

use super::SqliteRepository;
use super::mapping::{id_i64, map_exam_row};
use crate::repository::{ExamRepository, StorageError};

#[async_trait::async_trait]
impl ExamRepository for SqliteRepository {
    async fn upsert_exam(&self, exam: &ExamBlueprint) -> Result<(), StorageError> {
        let id = id_i64("exam_id", exam.exam_id().value())?;
        let department_id = id_i64("department_id", exam.department_id().value())?;

        sqlx::query(
            r"
                INSERT INTO exams (
                    id, department_id, title, duration_seconds,
                    total_questions, passing_threshold_percent
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(id) DO UPDATE SET
                    department_id = excluded.department_id,
                    title = excluded.title,
                    duration_seconds = excluded.duration_seconds,
                    total_questions = excluded.total_questions,
                    passing_threshold_percent = excluded.passing_threshold_percent
            ",
        )
        .bind(id)
        .bind(department_id)
        .bind(exam.title())
        .bind(i64::from(exam.duration_seconds()))
        .bind(i64::from(exam.total_questions()))
        .bind(i64::from(exam.passing_threshold_percent()))
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(())
    }

    async fn get_exam(&self, id: ExamId) -> Result<ExamBlueprint, StorageError> {
        let row = sqlx::query(
            r"
                SELECT id, department_id, title, duration_seconds,
                       total_questions, passing_threshold_percent
                FROM exams
                WHERE id = ?1
            ",
        )
        .bind(id_i64("exam_id", id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?
        .ok_or(StorageError::NotFound)?;

        map_exam_row(&row)
    }

    async fn list_exams(
        &self,
        department_id: DepartmentId,
    ) -> Result<Vec<ExamBlueprint>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, department_id, title, duration_seconds,
                       total_questions, passing_threshold_percent
                FROM exams
                WHERE department_id = ?1
                ORDER BY id
            ",
        )
        .bind(id_i64("department_id", department_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        rows.iter().map(map_exam_row).collect()
    }
}
