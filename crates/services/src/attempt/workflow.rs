use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use exam_core::ledger::ExamMode;
use exam_core::model::{ExamId, IdentityToken, SubmissionResult};
use exam_core::session::{ExamSession, SubmitOutcome, TickOutcome};
use exam_core::time::Clock;
use storage::repository::{Storage, SubmissionRecord, SubmissionRepository};

use crate::attempt::progress::AttemptProgress;
use crate::attempt::view::{self, PaletteStatus};
use crate::catalog::ExamCatalog;
use crate::error::AttemptError;

//
// ─── ATTEMPT ───────────────────────────────────────────────────────────────────
//

/// One live attempt: the in-memory session plus its persistence state.
///
/// `submission_id` is set exactly once, when the graded result first lands
/// in storage. A failed persist leaves it unset so the write can be retried
/// without re-entering the scoring engine.
#[derive(Debug, Clone)]
pub struct Attempt {
    session: ExamSession,
    submission_id: Option<i64>,
}

impl Attempt {
    #[must_use]
    pub fn session(&self) -> &ExamSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut ExamSession {
        &mut self.session
    }

    /// Row id of the persisted submission, once stored.
    #[must_use]
    pub fn submission_id(&self) -> Option<i64> {
        self.submission_id
    }

    /// Snapshot of counts and countdown for UI rendering.
    #[must_use]
    pub fn progress(&self, now: DateTime<Utc>) -> AttemptProgress {
        AttemptProgress::capture(&self.session, now)
    }

    /// Per-question palette states in display order.
    #[must_use]
    pub fn palette(&self) -> Vec<PaletteStatus> {
        view::palette(&self.session)
    }
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Drives attempts end to end: begin from the catalog, tick the countdown,
/// submit, and persist the graded result.
#[derive(Clone)]
pub struct AttemptService {
    clock: Clock,
    catalog: ExamCatalog,
    submissions: Arc<dyn SubmissionRepository>,
}

impl AttemptService {
    #[must_use]
    pub fn new(clock: Clock, catalog: ExamCatalog, submissions: Arc<dyn SubmissionRepository>) -> Self {
        Self {
            clock,
            catalog,
            submissions,
        }
    }

    /// Convenience constructor wiring all repositories from one `Storage`.
    #[must_use]
    pub fn from_storage(clock: Clock, storage: &Storage) -> Self {
        Self::new(
            clock,
            ExamCatalog::new(Arc::clone(&storage.exams), Arc::clone(&storage.questions)),
            Arc::clone(&storage.submissions),
        )
    }

    #[must_use]
    pub fn catalog(&self) -> &ExamCatalog {
        &self.catalog
    }

    /// Loads an exam and begins a fresh session on it.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::ExamNotFound` or `AttemptError::NoQuestions`
    /// from the catalog, and `AttemptError::Session` if the stored question
    /// count disagrees with the blueprint.
    pub async fn start_attempt(
        &self,
        exam_id: ExamId,
        mode: ExamMode,
    ) -> Result<Attempt, AttemptError> {
        let (blueprint, questions) = self.catalog.exam_with_questions(exam_id).await?;
        let session = ExamSession::begin(blueprint, questions, mode, self.clock.now())?;
        info!(
            exam_id = %exam_id,
            attempt_id = %session.attempt_id(),
            questions = session.questions().len(),
            "attempt started"
        );
        Ok(Attempt {
            session,
            submission_id: None,
        })
    }

    /// Advances the attempt's countdown by one host-loop tick.
    ///
    /// When the tick crosses the deadline the session scores itself and the
    /// result is persisted immediately, so an expired attempt is never lost
    /// with the process. A persist failure is returned to the caller but
    /// the graded result stays cached on the session; retry through
    /// [`AttemptService::finalize_submission`].
    ///
    /// # Errors
    ///
    /// Propagates scoring and storage failures.
    pub async fn tick(
        &self,
        attempt: &mut Attempt,
        identity: &IdentityToken,
    ) -> Result<TickOutcome, AttemptError> {
        let outcome = attempt.session.tick(self.clock.now())?;
        if outcome == TickOutcome::Expired {
            warn!(
                attempt_id = %attempt.session.attempt_id(),
                "countdown expired, auto-submitting"
            );
            self.persist(attempt, identity).await?;
        }
        Ok(outcome)
    }

    /// Submits the attempt and persists the graded result.
    ///
    /// A duplicate submit (double click, or a submit racing an expiry tick)
    /// is absorbed by the session; this method then only ensures the
    /// already-graded result is persisted, never re-scoring.
    ///
    /// # Errors
    ///
    /// Propagates scoring failures from the session and storage failures
    /// from the persist.
    pub async fn submit(
        &self,
        attempt: &mut Attempt,
        identity: &IdentityToken,
    ) -> Result<i64, AttemptError> {
        match attempt.session.submit(self.clock.now())? {
            SubmitOutcome::Submitted => {}
            SubmitOutcome::AlreadySubmitted => {
                warn!(
                    attempt_id = %attempt.session.attempt_id(),
                    "duplicate submit absorbed"
                );
            }
        }
        self.persist(attempt, identity).await
    }

    /// Persists an already-graded attempt, retrying a failed earlier write.
    ///
    /// Idempotent once the write has succeeded: the recorded row id is
    /// returned without touching storage again.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::NotSubmitted` when the session has no graded
    /// result yet, and storage failures from the append.
    pub async fn finalize_submission(
        &self,
        attempt: &mut Attempt,
        identity: &IdentityToken,
    ) -> Result<i64, AttemptError> {
        if attempt.session.result().is_none() {
            return Err(AttemptError::NotSubmitted);
        }
        self.persist(attempt, identity).await
    }

    async fn persist(
        &self,
        attempt: &mut Attempt,
        identity: &IdentityToken,
    ) -> Result<i64, AttemptError> {
        if let Some(id) = attempt.submission_id {
            return Ok(id);
        }

        let result: &SubmissionResult = attempt
            .session
            .result()
            .ok_or(AttemptError::NotSubmitted)?;
        let record = SubmissionRecord::new(result.clone(), identity.clone(), self.clock.now());
        let id = self.submissions.append_submission(&record).await?;
        attempt.submission_id = Some(id);
        info!(
            attempt_id = %result.attempt_id(),
            submission_id = id,
            score = result.score(),
            passed = result.passed(),
            "submission persisted"
        );
        Ok(id)
    }
}
