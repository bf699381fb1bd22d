use serde::Serialize;
use thiserror::Error;

use crate::model::ids::{AttemptId, ExamId, QuestionId};
use crate::model::question::OptionIndex;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SubmissionResultError {
    #[error("correct + wrong + skipped ({sum}) does not match total questions ({total})")]
    CountMismatch { total: u32, sum: u32 },

    #[error("breakdown has {len} entries for {total} questions")]
    BreakdownLengthMismatch { total: u32, len: usize },
}

/// Per-question grading detail. Derived by the scoring engine, never
/// constructed independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    pub question_id: QuestionId,
    pub user_answer: Option<OptionIndex>,
    pub correct_answer: OptionIndex,
    pub is_correct: bool,
    pub is_skipped: bool,
}

/// The graded outcome of one completed exam attempt.
///
/// Immutable once produced; re-persisting the same result is safe and never
/// re-triggers scoring. Serializes to the flat camelCase object consumed by
/// result views and the submission sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResult {
    exam_id: ExamId,
    attempt_id: AttemptId,
    score: f64,
    total_questions: u32,
    correct_answers: u32,
    wrong_answers: u32,
    #[serde(rename = "skipped")]
    skipped_questions: u32,
    percentage: f64,
    passed: bool,
    #[serde(rename = "timeTaken")]
    time_taken_seconds: u32,
    breakdown: Vec<QuestionResult>,
}

impl SubmissionResult {
    /// Assembles a result, checking that the counts partition the question
    /// total and that the breakdown covers every question.
    ///
    /// # Errors
    ///
    /// Returns `SubmissionResultError::CountMismatch` or
    /// `SubmissionResultError::BreakdownLengthMismatch`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        exam_id: ExamId,
        attempt_id: AttemptId,
        score: f64,
        total_questions: u32,
        correct_answers: u32,
        wrong_answers: u32,
        skipped_questions: u32,
        percentage: f64,
        passed: bool,
        time_taken_seconds: u32,
        breakdown: Vec<QuestionResult>,
    ) -> Result<Self, SubmissionResultError> {
        let sum = correct_answers + wrong_answers + skipped_questions;
        if sum != total_questions {
            return Err(SubmissionResultError::CountMismatch {
                total: total_questions,
                sum,
            });
        }
        if breakdown.len() != total_questions as usize {
            return Err(SubmissionResultError::BreakdownLengthMismatch {
                total: total_questions,
                len: breakdown.len(),
            });
        }

        Ok(Self {
            exam_id,
            attempt_id,
            score,
            total_questions,
            correct_answers,
            wrong_answers,
            skipped_questions,
            percentage,
            passed,
            time_taken_seconds,
            breakdown,
        })
    }

    #[must_use]
    pub fn exam_id(&self) -> ExamId {
        self.exam_id
    }

    #[must_use]
    pub fn attempt_id(&self) -> AttemptId {
        self.attempt_id
    }

    #[must_use]
    pub fn score(&self) -> f64 {
        self.score
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn correct_answers(&self) -> u32 {
        self.correct_answers
    }

    #[must_use]
    pub fn wrong_answers(&self) -> u32 {
        self.wrong_answers
    }

    #[must_use]
    pub fn skipped_questions(&self) -> u32 {
        self.skipped_questions
    }

    #[must_use]
    pub fn percentage(&self) -> f64 {
        self.percentage
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.passed
    }

    #[must_use]
    pub fn time_taken_seconds(&self) -> u32 {
        self.time_taken_seconds
    }

    #[must_use]
    pub fn breakdown(&self) -> &[QuestionResult] {
        &self.breakdown
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u64, user: Option<u8>, correct: u8) -> QuestionResult {
        let correct_answer = OptionIndex::new(correct).unwrap();
        let user_answer = user.map(|v| OptionIndex::new(v).unwrap());
        QuestionResult {
            question_id: QuestionId::new(id),
            user_answer,
            correct_answer,
            is_correct: user_answer == Some(correct_answer),
            is_skipped: user_answer.is_none(),
        }
    }

    #[test]
    fn rejects_counts_that_do_not_partition_total() {
        let err = SubmissionResult::new(
            ExamId::new(1),
            AttemptId::generate(),
            1.0,
            3,
            1,
            1,
            0,
            33.33,
            false,
            60,
            vec![entry(1, Some(0), 0), entry(2, Some(1), 0), entry(3, None, 0)],
        )
        .unwrap_err();
        assert_eq!(err, SubmissionResultError::CountMismatch { total: 3, sum: 2 });
    }

    #[test]
    fn rejects_short_breakdown() {
        let err = SubmissionResult::new(
            ExamId::new(1),
            AttemptId::generate(),
            1.0,
            3,
            1,
            1,
            1,
            33.33,
            false,
            60,
            vec![entry(1, Some(0), 0)],
        )
        .unwrap_err();
        assert_eq!(
            err,
            SubmissionResultError::BreakdownLengthMismatch { total: 3, len: 1 }
        );
    }

    #[test]
    fn serializes_to_flat_camel_case_object() {
        let result = SubmissionResult::new(
            ExamId::new(7),
            AttemptId::generate(),
            0.67,
            3,
            1,
            1,
            1,
            22.33,
            false,
            120,
            vec![entry(1, Some(0), 0), entry(2, Some(1), 0), entry(3, None, 0)],
        )
        .unwrap();

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["examId"], 7);
        assert_eq!(value["score"], 0.67);
        assert_eq!(value["totalQuestions"], 3);
        assert_eq!(value["skipped"], 1);
        assert_eq!(value["timeTaken"], 120);
        assert_eq!(value["passed"], false);
        assert_eq!(value["breakdown"][2]["userAnswer"], serde_json::Value::Null);
        assert_eq!(value["breakdown"][2]["isSkipped"], true);
        assert_eq!(value["breakdown"][0]["correctAnswer"], 0);
    }
}
