//! Builds the reqwest clients for request/response calls and for the
//! long-lived log stream.

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{Jitter, RetryTransientMiddleware, policies::ExponentialBackoff};

use crate::config::{BaseHttpClientConfig, HttpRetryConfig, JitterSetting};

/// Creates the base `reqwest::Client` for request/response calls.
pub fn create_base_client(config: &BaseHttpClientConfig) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .pool_max_idle_per_host(config.max_idle_per_host)
        .pool_idle_timeout(Some(config.idle_timeout))
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout)
        .build()
}

/// Creates the client used for the log stream.
///
/// It shares the connect timeout but has no overall request timeout, since
/// the response body is open for as long as the subscription lives.
pub fn create_stream_client(
    config: &BaseHttpClientConfig,
) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().connect_timeout(config.connect_timeout).build()
}

/// Wraps `base_client` with the retry middleware described by `config`.
///
/// With `max_retries == 0` the middleware never re-sends a request, which
/// keeps every failure terminal for the attempt that produced it.
pub fn create_retryable_http_client(
    config: &HttpRetryConfig,
    base_client: reqwest::Client,
) -> ClientWithMiddleware {
    let policy_builder = match config.jitter {
        JitterSetting::None => ExponentialBackoff::builder().jitter(Jitter::None),
        JitterSetting::Full => ExponentialBackoff::builder().jitter(Jitter::Full),
    };

    let retry_policy = policy_builder
        .base(config.base_for_backoff)
        .retry_bounds(config.initial_backoff_ms, config.max_backoff_secs)
        .build_with_max_retries(config.max_retries);

    ClientBuilder::new(base_client).with(RetryTransientMiddleware::new_with_policy(retry_policy)).build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_base_client_from_defaults() {
        let client = create_base_client(&BaseHttpClientConfig::default());
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_retryable_client_without_retries_sends_once() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("GET", "/metrics").with_status(503).expect(1).create_async().await;

        let client = create_retryable_http_client(&HttpRetryConfig::default(), reqwest::Client::new());
        let response = client.get(format!("{}/metrics", server.url())).send().await.unwrap();

        assert_eq!(response.status().as_u16(), 503);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_retryable_client_retries_transient_errors_when_configured() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("GET", "/metrics").with_status(503).expect(3).create_async().await;

        let config = HttpRetryConfig {
            max_retries: 2,
            initial_backoff_ms: std::time::Duration::from_millis(1),
            max_backoff_secs: std::time::Duration::from_secs(1),
            jitter: JitterSetting::None,
            ..Default::default()
        };
        let client = create_retryable_http_client(&config, reqwest::Client::new());
        let response = client.get(format!("{}/metrics", server.url())).send().await.unwrap();

        assert_eq!(response.status().as_u16(), 503);
        mock.assert_async().await;
    }
}
