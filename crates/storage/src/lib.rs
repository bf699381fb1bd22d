#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{
    DepartmentRecord, DepartmentRepository, ExamRepository, InMemoryRepository,
    QuestionRepository, Storage, StorageError, SubmissionRecord, SubmissionRepository,
    SubmissionRow,
};
pub use sqlite::{SqliteInitError, SqliteRepository};
