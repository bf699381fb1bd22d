//! Attempt orchestration: starting sessions from the catalog, forwarding
//! user actions, and persisting graded results.

mod progress;
mod view;
mod workflow;

pub use progress::AttemptProgress;
pub use view::{PaletteStatus, palette};
pub use workflow::{Attempt, AttemptService};
