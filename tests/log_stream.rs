//! Integration tests for the live log tail over server-sent events

use std::{sync::Arc, time::Duration};

use thorax::{
    config::{LogTailConfig, ReconnectPolicy},
    test_helpers::create_test_backend,
    views::{LogTail, TailState},
};

fn config(reconnect: ReconnectPolicy) -> LogTailConfig {
    LogTailConfig { reconnect, ..Default::default() }
}

#[tokio::test]
async fn test_tail_buffers_valid_payloads() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/logs/stream")
        .match_header("accept", "text/event-stream")
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(concat!(
            ": keep-alive\n\n",
            "data: {\"type\":\"event\",\"event_name\":\"Transfer\",\"block\":10,\"breach_detected\":false}\n\n",
            "data: not json\n\n",
            "data: {\"type\":\"activation\",\"active\":true,\"contract_id\":\"c1\"}\r\n\r\n",
        ))
        .create_async()
        .await;
    let backend = Arc::new(create_test_backend(&server.url()));

    let handle = LogTail::mount(backend, config(ReconnectPolicy::disabled()));
    tokio::time::timeout(Duration::from_secs(5), async {
        while !handle.is_finished() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    let entries = handle.snapshot().await;
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].to_string(), "event · Transfer · blk=10 · breach=false");
    assert_eq!(entries[1].kind, "activation");
    assert_eq!(entries[1].extra["contract_id"], "c1");
    assert_eq!(handle.state(), TailState::Disconnected);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_tail_retries_failed_subscription_then_gives_up() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/logs/stream")
        .with_status(503)
        .expect(3)
        .create_async()
        .await;
    let backend = Arc::new(create_test_backend(&server.url()));
    let policy = ReconnectPolicy {
        max_attempts: 2,
        initial_backoff_ms: Duration::from_millis(5),
        max_backoff_secs: Duration::from_millis(20),
    };

    let handle = LogTail::mount(backend, config(policy));
    tokio::time::timeout(Duration::from_secs(5), async {
        while !handle.is_finished() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    assert!(handle.snapshot().await.is_empty());
    mock.assert_async().await;
}
