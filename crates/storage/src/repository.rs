use async_trait::async_trait;
use chrono::{DateTime, Utc};
use exam_core::model::{DepartmentId, ExamBlueprint, ExamId, IdentityToken, Question};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use exam_core::model::SubmissionResult;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// A department grouping exams in the catalog. Display glue for the core,
/// but the storage contract carries it so exams can be listed per
/// department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentRecord {
    pub id: DepartmentId,
    pub name: String,
}

/// Persisted shape for one graded attempt: the immutable result plus the
/// identity it belongs to and when it was submitted.
///
/// Appending the same record twice is safe from the engine's point of view;
/// it simply creates a second row for the same attempt. The scoring engine
/// is never re-entered for a persist.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionRecord {
    pub result: SubmissionResult,
    pub identity: IdentityToken,
    pub submitted_at: DateTime<Utc>,
}

impl SubmissionRecord {
    #[must_use]
    pub fn new(result: SubmissionResult, identity: IdentityToken, submitted_at: DateTime<Utc>) -> Self {
        Self {
            result,
            identity,
            submitted_at,
        }
    }
}

/// A persisted submission together with its storage row id.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionRow {
    pub id: i64,
    pub record: SubmissionRecord,
}

impl SubmissionRow {
    #[must_use]
    pub fn new(id: i64, record: SubmissionRecord) -> Self {
        Self { id, record }
    }
}

/// Repository contract for departments.
#[async_trait]
pub trait DepartmentRepository: Send + Sync {
    /// Persist or update a department.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the department cannot be stored.
    async fn upsert_department(&self, department: &DepartmentRecord) -> Result<(), StorageError>;

    /// List all departments, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn list_departments(&self) -> Result<Vec<DepartmentRecord>, StorageError>;
}

/// Repository contract for the exam catalog (the question-set provider's
/// exam half).
#[async_trait]
pub trait ExamRepository: Send + Sync {
    /// Persist or update an exam blueprint.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the exam cannot be stored.
    async fn upsert_exam(&self, exam: &ExamBlueprint) -> Result<(), StorageError>;

    /// Fetch an exam blueprint by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_exam(&self, id: ExamId) -> Result<ExamBlueprint, StorageError>;

    /// List the exams of one department, ordered by exam id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn list_exams(&self, department_id: DepartmentId)
    -> Result<Vec<ExamBlueprint>, StorageError>;
}

/// Repository contract for question content (the question-set provider's
/// question half).
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Persist or update a question at a display position within an exam.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the question cannot be stored.
    async fn upsert_question(
        &self,
        exam_id: ExamId,
        position: u32,
        question: &Question,
    ) -> Result<(), StorageError>;

    /// Fetch an exam's questions in display order. An exam with no
    /// questions yields an empty vec, not `NotFound`; the services layer
    /// decides what that means.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn questions_for_exam(&self, exam_id: ExamId) -> Result<Vec<Question>, StorageError>;
}

/// Repository contract for the submission sink.
#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    /// Append a graded submission; returns the new row id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the submission cannot be stored.
    async fn append_submission(&self, record: &SubmissionRecord) -> Result<i64, StorageError>;

    /// Fetch a persisted submission by row id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_submission(&self, id: i64) -> Result<SubmissionRecord, StorageError>;

    /// List recent submissions for an exam, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn list_submissions(
        &self,
        exam_id: ExamId,
        limit: u32,
    ) -> Result<Vec<SubmissionRow>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    departments: Arc<Mutex<HashMap<DepartmentId, DepartmentRecord>>>,
    exams: Arc<Mutex<HashMap<ExamId, ExamBlueprint>>>,
    questions: Arc<Mutex<HashMap<ExamId, Vec<(u32, Question)>>>>,
    submissions: Arc<Mutex<Vec<SubmissionRow>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock<T>(mutex: &Mutex<T>) -> Result<std::sync::MutexGuard<'_, T>, StorageError> {
        mutex.lock().map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl DepartmentRepository for InMemoryRepository {
    async fn upsert_department(&self, department: &DepartmentRecord) -> Result<(), StorageError> {
        let mut guard = Self::lock(&self.departments)?;
        guard.insert(department.id, department.clone());
        Ok(())
    }

    async fn list_departments(&self) -> Result<Vec<DepartmentRecord>, StorageError> {
        let guard = Self::lock(&self.departments)?;
        let mut departments: Vec<DepartmentRecord> = guard.values().cloned().collect();
        departments.sort_by_key(|d| d.id);
        Ok(departments)
    }
}

#[async_trait]
impl ExamRepository for InMemoryRepository {
    async fn upsert_exam(&self, exam: &ExamBlueprint) -> Result<(), StorageError> {
        let mut guard = Self::lock(&self.exams)?;
        guard.insert(exam.exam_id(), exam.clone());
        Ok(())
    }

    async fn get_exam(&self, id: ExamId) -> Result<ExamBlueprint, StorageError> {
        let guard = Self::lock(&self.exams)?;
        guard.get(&id).cloned().ok_or(StorageError::NotFound)
    }

    async fn list_exams(
        &self,
        department_id: DepartmentId,
    ) -> Result<Vec<ExamBlueprint>, StorageError> {
        let guard = Self::lock(&self.exams)?;
        let mut exams: Vec<ExamBlueprint> = guard
            .values()
            .filter(|e| e.department_id() == department_id)
            .cloned()
            .collect();
        exams.sort_by_key(ExamBlueprint::exam_id);
        Ok(exams)
    }
}

#[async_trait]
impl QuestionRepository for InMemoryRepository {
    async fn upsert_question(
        &self,
        exam_id: ExamId,
        position: u32,
        question: &Question,
    ) -> Result<(), StorageError> {
        let mut guard = Self::lock(&self.questions)?;
        let slots = guard.entry(exam_id).or_default();
        slots.retain(|(pos, _)| *pos != position);
        slots.push((position, question.clone()));
        slots.sort_by_key(|(pos, _)| *pos);
        Ok(())
    }

    async fn questions_for_exam(&self, exam_id: ExamId) -> Result<Vec<Question>, StorageError> {
        let guard = Self::lock(&self.questions)?;
        Ok(guard
            .get(&exam_id)
            .map(|slots| slots.iter().map(|(_, q)| q.clone()).collect())
            .unwrap_or_default())
    }
}

#[async_trait]
impl SubmissionRepository for InMemoryRepository {
    async fn append_submission(&self, record: &SubmissionRecord) -> Result<i64, StorageError> {
        let mut guard = Self::lock(&self.submissions)?;
        let id = i64::try_from(guard.len())
            .map_err(|_| StorageError::Serialization("submission id overflow".into()))?
            + 1;
        guard.push(SubmissionRow::new(id, record.clone()));
        Ok(id)
    }

    async fn get_submission(&self, id: i64) -> Result<SubmissionRecord, StorageError> {
        let guard = Self::lock(&self.submissions)?;
        guard
            .iter()
            .find(|row| row.id == id)
            .map(|row| row.record.clone())
            .ok_or(StorageError::NotFound)
    }

    async fn list_submissions(
        &self,
        exam_id: ExamId,
        limit: u32,
    ) -> Result<Vec<SubmissionRow>, StorageError> {
        let guard = Self::lock(&self.submissions)?;
        Ok(guard
            .iter()
            .rev()
            .filter(|row| row.record.result.exam_id() == exam_id)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

/// Aggregates the four repositories behind trait objects for easy backend
/// swapping.
#[derive(Clone)]
pub struct Storage {
    pub departments: Arc<dyn DepartmentRepository>,
    pub exams: Arc<dyn ExamRepository>,
    pub questions: Arc<dyn QuestionRepository>,
    pub submissions: Arc<dyn SubmissionRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self {
            departments: Arc::new(repo.clone()),
            exams: Arc::new(repo.clone()),
            questions: Arc::new(repo.clone()),
            submissions: Arc::new(repo),
        }
    }
}
