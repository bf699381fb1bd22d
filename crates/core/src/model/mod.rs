mod exam;
mod ids;
mod question;
mod result;

pub use exam::{DEFAULT_PASSING_PERCENT, ExamBlueprint, ExamError};
pub use ids::{AttemptId, DepartmentId, ExamId, IdentityToken, ParseIdError, QuestionId};
pub use question::{OPTION_COUNT, OptionIndex, Question, QuestionError};
pub use result::{QuestionResult, SubmissionResult, SubmissionResultError};
