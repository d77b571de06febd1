//! Configuration module for Thorax.

mod app_config;
mod helpers;
mod http_base;
mod http_retry;
mod log_tail;

pub use app_config::AppConfig;
pub use helpers::{
    deserialize_duration_from_ms, deserialize_duration_from_seconds, deserialize_url,
    serialize_duration_to_ms, serialize_duration_to_seconds,
};
pub use http_base::BaseHttpClientConfig;
pub use http_retry::{HttpRetryConfig, JitterSetting};
pub use log_tail::{LogTailConfig, ReconnectPolicy};
