#![forbid(unsafe_code)]

//! Orchestration layer tying the exam engine to storage.
//!
//! [`ExamCatalog`] resolves exams and their questions, [`AttemptService`]
//! drives a session from begin through tick, submit, and persist, and the
//! view helpers project a session into UI-ready snapshots.

pub mod attempt;
pub mod catalog;
pub mod error;

pub use attempt::{Attempt, AttemptProgress, AttemptService, PaletteStatus, palette};
pub use catalog::ExamCatalog;
pub use error::AttemptError;
pub use exam_core::time::Clock;
