use std::sync::Arc;

use exam_core::model::{DepartmentId, ExamBlueprint, ExamId, Question};
use storage::repository::{ExamRepository, QuestionRepository, StorageError};

use crate::error::AttemptError;

/// Facade over the question-set provider.
///
/// Turns the raw storage contract into the two failure modes the exam flow
/// actually cares about: a missing exam and an exam without content.
/// Everything else propagates unchanged.
#[derive(Clone)]
pub struct ExamCatalog {
    exams: Arc<dyn ExamRepository>,
    questions: Arc<dyn QuestionRepository>,
}

impl ExamCatalog {
    #[must_use]
    pub fn new(exams: Arc<dyn ExamRepository>, questions: Arc<dyn QuestionRepository>) -> Self {
        Self { exams, questions }
    }

    /// Fetch an exam blueprint.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::ExamNotFound` when the exam does not exist;
    /// other storage failures pass through.
    pub async fn exam(&self, exam_id: ExamId) -> Result<ExamBlueprint, AttemptError> {
        self.exams.get_exam(exam_id).await.map_err(|e| match e {
            StorageError::NotFound => AttemptError::ExamNotFound(exam_id),
            other => AttemptError::Storage(other),
        })
    }

    /// Fetch an exam together with its ordered questions.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::ExamNotFound` or `AttemptError::NoQuestions`;
    /// other storage failures pass through.
    pub async fn exam_with_questions(
        &self,
        exam_id: ExamId,
    ) -> Result<(ExamBlueprint, Vec<Question>), AttemptError> {
        let blueprint = self.exam(exam_id).await?;
        let questions = self.questions.questions_for_exam(exam_id).await?;
        if questions.is_empty() {
            return Err(AttemptError::NoQuestions(exam_id));
        }
        Ok((blueprint, questions))
    }

    /// List the exams of one department.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::Storage` on lookup failures.
    pub async fn exams_for_department(
        &self,
        department_id: DepartmentId,
    ) -> Result<Vec<ExamBlueprint>, AttemptError> {
        Ok(self.exams.list_exams(department_id).await?)
    }
}
