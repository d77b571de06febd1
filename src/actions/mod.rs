//! User-triggered actions.
//!
//! The [`ActionOrchestrator`] is the single entry point for everything a user
//! can do. It validates input, calls the backend, tracks progress per action,
//! refreshes the affected views and reports the outcome as a [`Notice`].

mod notice;
mod orchestrator;
mod state;
mod validation;

pub use notice::{Confirm, Notice, NoticeLevel, NoticeSink};
pub use orchestrator::{ActionError, ActionOrchestrator};
pub use state::{ActionKey, ActionKind, ActionStatus, ActionTracker};
pub use validation::{RegisterForm, ValidationError, lenient_abi, validate_alert, validate_raw_tx};
