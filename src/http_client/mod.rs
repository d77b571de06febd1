//! Construction of the HTTP clients used to talk to the backend.

mod client;

pub use client::{create_base_client, create_retryable_http_client, create_stream_client};
