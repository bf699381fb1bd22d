use thiserror::Error;

use crate::model::OptionIndex;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LedgerError {
    #[error("question index out of range: {index} (total {total})")]
    InvalidIndex { index: usize, total: usize },

    #[error("question {index} is locked and cannot be revised in exam mode")]
    LockedQuestion { index: usize },

    #[error("ledger is frozen; the session has been submitted")]
    Frozen,
}

//
// ─── MODE ──────────────────────────────────────────────────────────────────────
//

/// Controls whether a selected answer locks against revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExamMode {
    /// Answers lock on first selection; revision fails with `LockedQuestion`.
    #[default]
    Exam,
    /// Answers stay editable for the whole session.
    Practice,
}

//
// ─── ENTRY ─────────────────────────────────────────────────────────────────────
//

/// Per-question answer and flag state for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnswerEntry {
    selected: Option<OptionIndex>,
    marked_for_review: bool,
    visited: bool,
    locked: bool,
}

impl AnswerEntry {
    #[must_use]
    pub fn selected(&self) -> Option<OptionIndex> {
        self.selected
    }

    #[must_use]
    pub fn is_marked_for_review(&self) -> bool {
        self.marked_for_review
    }

    #[must_use]
    pub fn is_visited(&self) -> bool {
        self.visited
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

//
// ─── LEDGER ────────────────────────────────────────────────────────────────────
//

/// Answer state for every question of an active session.
///
/// Holds exactly one entry per index in `[0, total)`. The ledger never reads
/// question content; whether a selection is correct is resolved only at
/// scoring time. Once frozen (on submit) every mutation fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerLedger {
    mode: ExamMode,
    entries: Vec<AnswerEntry>,
    frozen: bool,
}

impl AnswerLedger {
    /// Allocates a ledger with all entries unset, unvisited, and unlocked.
    #[must_use]
    pub fn new(total_questions: usize, mode: ExamMode) -> Self {
        Self {
            mode,
            entries: vec![AnswerEntry::default(); total_questions],
            frozen: false,
        }
    }

    #[must_use]
    pub fn mode(&self) -> ExamMode {
        self.mode
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    #[must_use]
    pub fn entries(&self) -> &[AnswerEntry] {
        &self.entries
    }

    /// Returns the entry at `index`.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidIndex` out of range.
    pub fn entry(&self, index: usize) -> Result<&AnswerEntry, LedgerError> {
        self.entries.get(index).ok_or(LedgerError::InvalidIndex {
            index,
            total: self.entries.len(),
        })
    }

    /// Records a selection for the question at `index`.
    ///
    /// Under `ExamMode::Exam` the entry locks on first selection and later
    /// attempts fail; under `ExamMode::Practice` the selection is
    /// overwritten freely.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Frozen` after submission,
    /// `LedgerError::InvalidIndex` out of range, and
    /// `LedgerError::LockedQuestion` for a locked entry in exam mode.
    pub fn select_option(&mut self, index: usize, option: OptionIndex) -> Result<(), LedgerError> {
        let mode = self.mode;
        let entry = self.entry_mut(index)?;
        if entry.locked && mode == ExamMode::Exam {
            return Err(LedgerError::LockedQuestion { index });
        }

        entry.selected = Some(option);
        if mode == ExamMode::Exam {
            entry.locked = true;
        }
        Ok(())
    }

    /// Flips the review flag and returns the new value.
    ///
    /// Marking has no effect on scoring.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Frozen` or `LedgerError::InvalidIndex`.
    pub fn toggle_review(&mut self, index: usize) -> Result<bool, LedgerError> {
        let entry = self.entry_mut(index)?;
        entry.marked_for_review = !entry.marked_for_review;
        Ok(entry.marked_for_review)
    }

    /// Marks the question at `index` as visited. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Frozen` or `LedgerError::InvalidIndex`.
    pub fn mark_visited(&mut self, index: usize) -> Result<(), LedgerError> {
        self.entry_mut(index)?.visited = true;
        Ok(())
    }

    /// Number of questions with a present selection.
    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.entries.iter().filter(|e| e.selected.is_some()).count()
    }

    /// Number of questions flagged for review.
    #[must_use]
    pub fn marked_count(&self) -> usize {
        self.entries.iter().filter(|e| e.marked_for_review).count()
    }

    /// Number of questions navigation has reached at least once.
    #[must_use]
    pub fn visited_count(&self) -> usize {
        self.entries.iter().filter(|e| e.visited).count()
    }

    /// Makes the ledger read-only. Called once on the submit path; there is
    /// no way back.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    fn entry_mut(&mut self, index: usize) -> Result<&mut AnswerEntry, LedgerError> {
        if self.frozen {
            return Err(LedgerError::Frozen);
        }
        let total = self.entries.len();
        self.entries
            .get_mut(index)
            .ok_or(LedgerError::InvalidIndex { index, total })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
