use crate::model::{Question, QuestionResult, SubmissionResult};

/// Which slice of a graded result the post-exam review screen shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReviewFilter {
    #[default]
    All,
    Correct,
    Wrong,
    Skipped,
}

impl ReviewFilter {
    /// Whether a graded entry belongs to this view. `Wrong` means a present,
    /// incorrect answer; a skipped question is neither correct nor wrong.
    #[must_use]
    pub fn matches(self, entry: &QuestionResult) -> bool {
        match self {
            ReviewFilter::All => true,
            ReviewFilter::Correct => entry.is_correct,
            ReviewFilter::Wrong => !entry.is_skipped && !entry.is_correct,
            ReviewFilter::Skipped => entry.is_skipped,
        }
    }
}

/// Lazily walks a completed result next to its question set, yielding
/// `(index, question, graded entry)` for entries the filter selects.
///
/// Original question order is preserved for every filter. The returned
/// iterator is `Clone`, so a review screen can restart or re-run the same
/// view without re-deriving anything.
pub fn review_entries<'a>(
    questions: &'a [Question],
    result: &'a SubmissionResult,
    filter: ReviewFilter,
) -> impl Iterator<Item = (usize, &'a Question, &'a QuestionResult)> + Clone {
    questions
        .iter()
        .zip(result.breakdown())
        .enumerate()
        .filter(move |(_, (_, entry))| filter.matches(entry))
        .map(|(index, (question, entry))| (index, question, entry))
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
