use thiserror::Error;

use crate::ledger::AnswerLedger;
use crate::model::{
    AttemptId, ExamBlueprint, Question, QuestionResult, SubmissionResult, SubmissionResultError,
};

/// Penalty contributed by an incorrect (non-skipped) answer.
pub const NEGATIVE_MARK: f64 = 1.0 / 3.0;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScoringError {
    /// The ledger and the question set disagree on length. This is a
    /// precondition violation: a correctly constructed session cannot
    /// produce it.
    #[error("ledger covers {ledger} questions but the question set has {questions}")]
    LengthMismatch { questions: usize, ledger: usize },

    /// There is nothing to grade. Sessions cannot be constructed without
    /// questions, so this only reaches direct callers of `score`.
    #[error("cannot score an empty question set")]
    EmptyQuestionSet,

    #[error(transparent)]
    Result(#[from] SubmissionResultError),
}

//
// ─── SCORING ───────────────────────────────────────────────────────────────────
//

/// Grades a frozen ledger against its question set.
///
/// Pure and deterministic: identical inputs always yield an identical
/// `SubmissionResult`, which keeps retried persistence of the same attempt
/// safe. Per question in index order: a skipped question contributes 0, a
/// correct answer +1, a wrong answer −1/3. The score and the percentage are
/// rounded half-up to two decimals; the percentage can be negative when
/// wrong answers dominate.
///
/// Passing compares the (possibly fractional) rounded score against the
/// blueprint's integer passing marks (see `ExamBlueprint::passing_marks`).
///
/// # Errors
///
/// Returns `ScoringError::LengthMismatch` when the ledger was built for a
/// different question count and `ScoringError::EmptyQuestionSet` when there
/// is nothing to grade; both indicate a construction bug, not a recoverable
/// condition.
pub fn score(
    questions: &[Question],
    ledger: &AnswerLedger,
    blueprint: &ExamBlueprint,
    attempt_id: AttemptId,
    time_taken_seconds: u32,
) -> Result<SubmissionResult, ScoringError> {
    if questions.len() != ledger.total() {
        return Err(ScoringError::LengthMismatch {
            questions: questions.len(),
            ledger: ledger.total(),
        });
    }
    if questions.is_empty() {
        return Err(ScoringError::EmptyQuestionSet);
    }

    let mut correct = 0u32;
    let mut wrong = 0u32;
    let mut skipped = 0u32;
    let mut raw_score = 0.0f64;
    let mut breakdown = Vec::with_capacity(questions.len());

    for (question, entry) in questions.iter().zip(ledger.entries()) {
        let user_answer = entry.selected();
        let correct_answer = question.correct();
        let is_skipped = user_answer.is_none();
        let is_correct = user_answer == Some(correct_answer);

        match user_answer {
            None => skipped += 1,
            Some(answer) if answer == correct_answer => {
                correct += 1;
                raw_score += 1.0;
            }
            Some(_) => {
                wrong += 1;
                raw_score -= NEGATIVE_MARK;
            }
        }

        breakdown.push(QuestionResult {
            question_id: question.id(),
            user_answer,
            correct_answer,
            is_correct,
            is_skipped,
        });
    }

    let total = u32::try_from(questions.len()).unwrap_or(u32::MAX);
    let final_score = round_half_up_2(raw_score);
    let percentage = round_half_up_2(final_score / f64::from(total) * 100.0);
    let passed = final_score >= f64::from(blueprint.passing_marks());

    Ok(SubmissionResult::new(
        blueprint.exam_id(),
        attempt_id,
        final_score,
        total,
        correct,
        wrong,
        skipped,
        percentage,
        passed,
        time_taken_seconds,
        breakdown,
    )?)
}

/// Rounds to two decimals with halves going toward positive infinity,
/// matching the rounding the result record has always been produced with.
fn round_half_up_2(value: f64) -> f64 {
    (value * 100.0 + 0.5).floor() / 100.0
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
