//! A set of helpers for testing

mod backend;
mod contract;
mod event;
mod http_client;
mod log_source;
mod notice;

pub use backend::FakeBackend;
pub use contract::ContractBuilder;
pub use event::EventBuilder;
pub use http_client::create_test_backend;
pub use log_source::ChannelLogSource;
pub use notice::RecordingNoticeSink;
