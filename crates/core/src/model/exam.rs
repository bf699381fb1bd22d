use thiserror::Error;

use crate::model::ids::{DepartmentId, ExamId};

/// Passing threshold applied when the question-set provider does not specify
/// one (40% of the total question count, rounded up).
pub const DEFAULT_PASSING_PERCENT: u8 = 40;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExamError {
    #[error("exam title must not be empty")]
    EmptyTitle,

    #[error("exam duration must be positive")]
    ZeroDuration,

    #[error("exam must have at least one question")]
    ZeroQuestions,

    #[error("passing threshold must be in 1..=100, got {provided}")]
    InvalidPassingPercent { provided: u8 },
}

/// What the question-set provider promises about an exam before any question
/// content is loaded: how long it runs, how many questions it has, and the
/// pass bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamBlueprint {
    exam_id: ExamId,
    department_id: DepartmentId,
    title: String,
    duration_seconds: u32,
    total_questions: u32,
    passing_threshold_percent: u8,
}

impl ExamBlueprint {
    /// Creates a blueprint with the default 40% passing threshold.
    ///
    /// # Errors
    ///
    /// Returns `ExamError` if the title is empty, the duration is zero, or
    /// the question count is zero.
    pub fn new(
        exam_id: ExamId,
        department_id: DepartmentId,
        title: impl Into<String>,
        duration_seconds: u32,
        total_questions: u32,
    ) -> Result<Self, ExamError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ExamError::EmptyTitle);
        }
        if duration_seconds == 0 {
            return Err(ExamError::ZeroDuration);
        }
        if total_questions == 0 {
            return Err(ExamError::ZeroQuestions);
        }

        Ok(Self {
            exam_id,
            department_id,
            title,
            duration_seconds,
            total_questions,
            passing_threshold_percent: DEFAULT_PASSING_PERCENT,
        })
    }

    /// Overrides the passing threshold percent.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::InvalidPassingPercent` outside `1..=100`.
    pub fn with_passing_threshold(mut self, percent: u8) -> Result<Self, ExamError> {
        if percent == 0 || percent > 100 {
            return Err(ExamError::InvalidPassingPercent { provided: percent });
        }
        self.passing_threshold_percent = percent;
        Ok(self)
    }

    #[must_use]
    pub fn exam_id(&self) -> ExamId {
        self.exam_id
    }

    #[must_use]
    pub fn department_id(&self) -> DepartmentId {
        self.department_id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn duration_seconds(&self) -> u32 {
        self.duration_seconds
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn passing_threshold_percent(&self) -> u8 {
        self.passing_threshold_percent
    }

    /// The integer score a submission must reach to pass.
    ///
    /// `ceil(total_questions * percent / 100)`. The comparison against the
    /// possibly-fractional score is intentionally literal: a 39.9-point score
    /// fails a 40-point bar.
    #[must_use]
    pub fn passing_marks(&self) -> u32 {
        (self.total_questions * u32::from(self.passing_threshold_percent)).div_ceil(100)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn blueprint(total: u32) -> ExamBlueprint {
        ExamBlueprint::new(
            ExamId::new(1),
            DepartmentId::new(1),
            "Midterm",
            1_800,
            total,
        )
        .unwrap()
    }

    #[test]
    fn rejects_zero_duration_and_zero_questions() {
        let err = ExamBlueprint::new(ExamId::new(1), DepartmentId::new(1), "T", 0, 10).unwrap_err();
        assert_eq!(err, ExamError::ZeroDuration);

        let err = ExamBlueprint::new(ExamId::new(1), DepartmentId::new(1), "T", 60, 0).unwrap_err();
        assert_eq!(err, ExamError::ZeroQuestions);
    }

    #[test]
    fn passing_marks_rounds_up() {
        // ceil(3 * 0.40) = 2
        assert_eq!(blueprint(3).passing_marks(), 2);
        // ceil(100 * 0.40) = 40
        assert_eq!(blueprint(100).passing_marks(), 40);
        // ceil(1 * 0.40) = 1
        assert_eq!(blueprint(1).passing_marks(), 1);
    }

    #[test]
    fn passing_threshold_override_is_validated() {
        assert!(blueprint(10).with_passing_threshold(101).is_err());
        assert!(blueprint(10).with_passing_threshold(0).is_err());

        let strict = blueprint(10).with_passing_threshold(75).unwrap();
        assert_eq!(strict.passing_marks(), 8);
    }
}
