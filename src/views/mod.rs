//! Client-side caches of backend state.
//!
//! Each view owns its own slice of state and only ever replaces it
//! wholesale with a fresh query result. The log tail is the exception: it is
//! fed by a push stream and only appends.

mod event_feed;
mod log_tail;
mod registry;
mod status;

pub use event_feed::{EventFeed, FeedError, FeedSnapshot, RefreshOutcome};
pub use log_tail::{LogBuffer, LogTail, LogTailHandle, TailState};
pub use registry::{ContractRegistry, RegistryError, RemoveOutcome};
pub use status::StatusPanel;
