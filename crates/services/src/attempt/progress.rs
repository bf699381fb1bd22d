use chrono::{DateTime, Utc};
use serde::Serialize;

use exam_core::session::ExamSession;
use exam_core::timer::{format_remaining, is_low_time};

/// Point-in-time snapshot of an attempt for header and status-bar rendering.
///
/// Captured fresh on every render; holds no reference back to the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptProgress {
    total_questions: usize,
    answered: usize,
    unanswered: usize,
    marked_for_review: usize,
    visited: usize,
    current_index: usize,
    time_remaining_seconds: u32,
    /// Countdown formatted for display, `MM:SS` or `H:MM:SS`.
    time_remaining_display: String,
    low_time: bool,
    is_over: bool,
}

impl AttemptProgress {
    #[must_use]
    pub fn capture(session: &ExamSession, now: DateTime<Utc>) -> Self {
        let ledger = session.ledger();
        let total = session.questions().len();
        let answered = ledger.answered_count();
        let remaining = session.time_remaining(now);
        Self {
            total_questions: total,
            answered,
            unanswered: total - answered,
            marked_for_review: ledger.marked_count(),
            visited: ledger.visited_count(),
            current_index: session.current_index(),
            time_remaining_seconds: remaining,
            time_remaining_display: format_remaining(remaining),
            low_time: is_low_time(remaining),
            is_over: session.is_over(),
        }
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.total_questions
    }

    #[must_use]
    pub fn answered(&self) -> usize {
        self.answered
    }

    #[must_use]
    pub fn unanswered(&self) -> usize {
        self.unanswered
    }

    #[must_use]
    pub fn marked_for_review(&self) -> usize {
        self.marked_for_review
    }

    #[must_use]
    pub fn visited(&self) -> usize {
        self.visited
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub fn time_remaining_seconds(&self) -> u32 {
        self.time_remaining_seconds
    }

    #[must_use]
    pub fn time_remaining_display(&self) -> &str {
        &self.time_remaining_display
    }

    #[must_use]
    pub fn low_time(&self) -> bool {
        self.low_time
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.is_over
    }
}
