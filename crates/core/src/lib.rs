#![forbid(unsafe_code)]

pub mod error;
pub mod ledger;
pub mod model;
pub mod review;
pub mod scoring;
pub mod session;
pub mod time;
pub mod timer;

pub use error::Error;
pub use ledger::{AnswerEntry, AnswerLedger, ExamMode, LedgerError};
pub use review::{ReviewFilter, review_entries};
pub use session::{ExamSession, NavOutcome, SessionError, SessionStatus, SubmitOutcome, TickOutcome};
pub use time::Clock;
pub use timer::{ExamTimer, TimerEvent, format_remaining, is_low_time};
