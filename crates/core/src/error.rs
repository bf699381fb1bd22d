use thiserror::Error;

use crate::ledger::LedgerError;
use crate::model::{ExamError, QuestionError, SubmissionResultError};
use crate::scoring::ScoringError;
use crate::session::SessionError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Exam(#[from] ExamError),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error(transparent)]
    Result(#[from] SubmissionResultError),
}
