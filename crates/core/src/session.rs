use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

use crate::ledger::{AnswerLedger, ExamMode, LedgerError};
use crate::model::{AttemptId, ExamBlueprint, OptionIndex, Question, SubmissionResult};
use crate::scoring::{self, ScoringError};
use crate::timer::{ExamTimer, TimerEvent};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("question index out of range: {index} (total {total})")]
    InvalidIndex { index: usize, total: usize },

    #[error("no previous question before the first")]
    InvalidTransition,

    #[error("session is no longer in progress")]
    SessionOver,

    #[error("pause is only available in practice mode")]
    PauseUnavailable,

    #[error("blueprint promises {expected} questions but the provider returned {actual}")]
    QuestionCountMismatch { expected: u32, actual: usize },

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Scoring(#[from] ScoringError),
}

//
// ─── STATES & OUTCOMES ─────────────────────────────────────────────────────────
//

/// Lifecycle of one exam session.
///
/// `Submitting` only exists inside the submit path; externally a session is
/// observed in progress or in one of the two terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    NotStarted,
    InProgress,
    Submitting,
    Completed,
    Expired,
}

impl SessionStatus {
    /// True for `Completed` and `Expired`.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Expired)
    }
}

/// Outcome of a `next()` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    /// Moved to the given index.
    Moved(usize),
    /// Already at the last question; the caller's cue to offer submission.
    /// The session never auto-submits on navigation.
    AtEnd,
}

/// Outcome of a `submit()` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// This call ran the scoring engine.
    Submitted,
    /// A previous submit (or timer expiry) already ran it; this call was
    /// absorbed without side effects.
    AlreadySubmitted,
}

/// Outcome of a `tick()` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Countdown still running.
    Running { remaining: u32 },
    /// This tick crossed the deadline; the session scored itself and is now
    /// `Expired`.
    Expired,
    /// The session was already in a terminal state.
    Over,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One user's in-memory exam attempt.
///
/// Owns the question set, the answer ledger, and the countdown; navigation,
/// answering, and timing all flow through this type, and UI layers observe
/// it rather than the timer directly. Explicit submit and timer expiry share
/// one submit path guarded for at-most-once scoring; after the terminal
/// state is reached no navigation or answer mutation is accepted.
///
/// Discarding the session before submission discards the attempt; nothing
/// is persisted by this type.
#[derive(Clone, PartialEq)]
pub struct ExamSession {
    attempt_id: AttemptId,
    blueprint: ExamBlueprint,
    questions: Vec<Question>,
    ledger: AnswerLedger,
    timer: ExamTimer,
    status: SessionStatus,
    current: usize,
    started_at: DateTime<Utc>,
    result: Option<SubmissionResult>,
}

impl ExamSession {
    /// Begins a session: allocates the ledger, starts the countdown, and
    /// marks question 0 visited.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::QuestionCountMismatch` when the provider's
    /// question list does not match the blueprint's promised count.
    pub fn begin(
        blueprint: ExamBlueprint,
        questions: Vec<Question>,
        mode: ExamMode,
        now: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        if questions.len() != blueprint.total_questions() as usize {
            return Err(SessionError::QuestionCountMismatch {
                expected: blueprint.total_questions(),
                actual: questions.len(),
            });
        }

        let mut ledger = AnswerLedger::new(questions.len(), mode);
        ledger.mark_visited(0)?;

        Ok(Self {
            attempt_id: AttemptId::generate(),
            timer: ExamTimer::start(blueprint.duration_seconds(), now),
            blueprint,
            questions,
            ledger,
            status: SessionStatus::InProgress,
            current: 0,
            started_at: now,
            result: None,
        })
    }

    #[must_use]
    pub fn attempt_id(&self) -> AttemptId {
        self.attempt_id
    }

    #[must_use]
    pub fn blueprint(&self) -> &ExamBlueprint {
        &self.blueprint
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn current_question(&self) -> &Question {
        &self.questions[self.current]
    }

    #[must_use]
    pub fn ledger(&self) -> &AnswerLedger {
        &self.ledger
    }

    /// The graded result, present once the session has been submitted or
    /// has expired.
    #[must_use]
    pub fn result(&self) -> Option<&SubmissionResult> {
        self.result.as_ref()
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.status.is_terminal()
    }

    /// Seconds left on the countdown.
    #[must_use]
    pub fn time_remaining(&self, now: DateTime<Utc>) -> u32 {
        if self.is_over() { 0 } else { self.timer.remaining(now) }
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.ledger.answered_count()
    }

    // ─── Navigation ────────────────────────────────────────────────────────────

    /// Advances to the next question, marking it visited.
    ///
    /// At the last question this returns `NavOutcome::AtEnd` instead of
    /// advancing; submitting is the caller's decision.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::SessionOver` after submission or expiry.
    pub fn next(&mut self) -> Result<NavOutcome, SessionError> {
        self.ensure_in_progress()?;
        if self.current + 1 >= self.questions.len() {
            return Ok(NavOutcome::AtEnd);
        }
        self.move_to(self.current + 1)?;
        Ok(NavOutcome::Moved(self.current))
    }

    /// Steps back one question, marking it visited.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` at index 0 (consumers
    /// disable the control instead of calling this) and
    /// `SessionError::SessionOver` after the terminal state.
    pub fn previous(&mut self) -> Result<usize, SessionError> {
        self.ensure_in_progress()?;
        if self.current == 0 {
            return Err(SessionError::InvalidTransition);
        }
        self.move_to(self.current - 1)?;
        Ok(self.current)
    }

    /// Jumps straight to `index` (question-palette navigation), marking it
    /// visited. Always permitted within range, including to answered or
    /// locked questions.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidIndex` out of range and
    /// `SessionError::SessionOver` after the terminal state.
    pub fn jump_to(&mut self, index: usize) -> Result<(), SessionError> {
        self.ensure_in_progress()?;
        if index >= self.questions.len() {
            return Err(SessionError::InvalidIndex {
                index,
                total: self.questions.len(),
            });
        }
        self.move_to(index)
    }

    // ─── Answering ─────────────────────────────────────────────────────────────

    /// Records an answer for the question at `index`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::SessionOver` after the terminal state;
    /// ledger failures (`InvalidIndex`, `LockedQuestion`) pass through.
    pub fn select_option(&mut self, index: usize, option: OptionIndex) -> Result<(), SessionError> {
        self.ensure_in_progress()?;
        Ok(self.ledger.select_option(index, option)?)
    }

    /// Records an answer for the current question.
    ///
    /// # Errors
    ///
    /// Same as [`ExamSession::select_option`].
    pub fn select_current(&mut self, option: OptionIndex) -> Result<(), SessionError> {
        self.select_option(self.current, option)
    }

    /// Flips the review flag on the question at `index`; returns the new
    /// flag value. Never affects scoring.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::SessionOver` after the terminal state;
    /// ledger failures pass through.
    pub fn toggle_review(&mut self, index: usize) -> Result<bool, SessionError> {
        self.ensure_in_progress()?;
        Ok(self.ledger.toggle_review(index)?)
    }

    // ─── Timing & submission ───────────────────────────────────────────────────

    /// Suspends the countdown. Practice-mode capability; exam mode runs
    /// without pause. Idempotent while already paused.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::PauseUnavailable` in exam mode and
    /// `SessionError::SessionOver` after the terminal state.
    pub fn pause(&mut self, now: DateTime<Utc>) -> Result<(), SessionError> {
        self.ensure_in_progress()?;
        if self.ledger.mode() != ExamMode::Practice {
            return Err(SessionError::PauseUnavailable);
        }
        self.timer.pause(now);
        Ok(())
    }

    /// Resumes a paused countdown; the paused span is excluded from elapsed
    /// time. No-op when not paused.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::PauseUnavailable` in exam mode and
    /// `SessionError::SessionOver` after the terminal state.
    pub fn resume(&mut self, now: DateTime<Utc>) -> Result<(), SessionError> {
        self.ensure_in_progress()?;
        if self.ledger.mode() != ExamMode::Practice {
            return Err(SessionError::PauseUnavailable);
        }
        self.timer.resume(now);
        Ok(())
    }

    /// Advances session time. Call at roughly 1 Hz; the countdown reconciles
    /// against wall clock, so missed ticks cannot cause drift.
    ///
    /// When this tick crosses the deadline the session runs the shared
    /// submit path and lands in `Expired`.
    ///
    /// # Errors
    ///
    /// Propagates scoring failures from the expiry submit path.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Result<TickOutcome, SessionError> {
        if self.status != SessionStatus::InProgress {
            return Ok(TickOutcome::Over);
        }

        match self.timer.tick(now) {
            TimerEvent::Tick { remaining } => Ok(TickOutcome::Running { remaining }),
            TimerEvent::Expired => {
                self.finish(now, SessionStatus::Expired)?;
                Ok(TickOutcome::Expired)
            }
            TimerEvent::Idle => Ok(TickOutcome::Over),
        }
    }

    /// Submits the session explicitly.
    ///
    /// Shares one code path with timer expiry; the only difference is the
    /// terminal state (`Completed` here, `Expired` there). A second call,
    /// or a call racing an expiry tick, is absorbed as
    /// `SubmitOutcome::AlreadySubmitted`, guaranteeing the scoring engine
    /// runs at most once per session.
    ///
    /// # Errors
    ///
    /// Propagates scoring failures, which indicate a construction bug
    /// rather than a user-recoverable condition; the session is left in
    /// `Submitting` and accepts no further mutation.
    pub fn submit(&mut self, now: DateTime<Utc>) -> Result<SubmitOutcome, SessionError> {
        if self.status != SessionStatus::InProgress {
            return Ok(SubmitOutcome::AlreadySubmitted);
        }
        self.finish(now, SessionStatus::Completed)?;
        Ok(SubmitOutcome::Submitted)
    }

    /// The shared terminal transition: freeze the ledger, score it, land in
    /// `terminal`.
    fn finish(&mut self, now: DateTime<Utc>, terminal: SessionStatus) -> Result<(), SessionError> {
        self.status = SessionStatus::Submitting;
        self.ledger.freeze();

        let result = scoring::score(
            &self.questions,
            &self.ledger,
            &self.blueprint,
            self.attempt_id,
            self.timer.elapsed_seconds(now),
        )?;
        self.result = Some(result);
        self.status = terminal;
        Ok(())
    }

    fn ensure_in_progress(&self) -> Result<(), SessionError> {
        if self.status == SessionStatus::InProgress {
            Ok(())
        } else {
            Err(SessionError::SessionOver)
        }
    }

    fn move_to(&mut self, index: usize) -> Result<(), SessionError> {
        self.ledger.mark_visited(index)?;
        self.current = index;
        Ok(())
    }
}

impl fmt::Debug for ExamSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExamSession")
            .field("attempt_id", &self.attempt_id)
            .field("exam_id", &self.blueprint.exam_id())
            .field("status", &self.status)
            .field("current", &self.current)
            .field("questions_len", &self.questions.len())
            .field("answered", &self.ledger.answered_count())
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
