//! Transport to the monitoring backend: request/response calls over REST and
//! the one-way log stream.

mod error;
mod rest;
pub mod sse;
pub mod traits;

pub use error::TransportError;
pub use rest::RestBackend;
pub use traits::{Backend, LogFrames, LogSource};
