//! Shared error types for the services crate.

use thiserror::Error;

use exam_core::model::ExamId;
use exam_core::session::SessionError;
use storage::repository::StorageError;

/// Errors emitted by the attempt workflow and the exam catalog.
///
/// `ExamNotFound` and `NoQuestions` surface collaborator lookup failures
/// verbatim to the caller; an exam cannot start without a blueprint and at
/// least one question. Double submission never appears here because the
/// session guard absorbs it silently.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AttemptError {
    #[error("exam not found: {0}")]
    ExamNotFound(ExamId),

    #[error("exam {0} has no questions")]
    NoQuestions(ExamId),

    #[error("attempt has no graded result to persist")]
    NotSubmitted,

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
