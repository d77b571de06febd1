//! End-to-end tests of user actions against a mocked backend

use std::sync::Arc;

use mockito::{Matcher, ServerGuard};
use serde_json::json;
use thorax::{
    actions::{ActionError, ActionOrchestrator, NoticeLevel},
    cmd::{self, Command, DeleteArgs},
    config::AppConfig,
    models::EventScope,
    test_helpers::{RecordingNoticeSink, create_test_backend},
    views::RemoveOutcome,
};
use url::Url;

fn orchestrator(server: &ServerGuard) -> (ActionOrchestrator, Arc<RecordingNoticeSink>) {
    let notices = Arc::new(RecordingNoticeSink::new());
    let backend = Arc::new(create_test_backend(&server.url()));
    (ActionOrchestrator::new(backend, notices.clone()), notices)
}

#[tokio::test]
async fn test_monitor_once_refreshes_even_when_scan_reports_error() {
    let mut server = mockito::Server::new_async().await;
    let scan = server
        .mock("POST", "/monitor-once")
        .with_status(200)
        .with_body(r#"{"error":"rpc unreachable"}"#)
        .expect(1)
        .create_async()
        .await;
    let metrics = server
        .mock("GET", "/metrics")
        .with_status(200)
        .with_body(r#"{"metrics":{}}"#)
        .expect(1)
        .create_async()
        .await;
    let contracts = server
        .mock("GET", "/contracts")
        .with_status(200)
        .with_body(r#"{"contracts":[]}"#)
        .expect(1)
        .create_async()
        .await;
    let events = server
        .mock("GET", "/events")
        .with_status(200)
        .with_body(r#"{"events":[]}"#)
        .expect(1)
        .create_async()
        .await;
    let (orchestrator, notices) = orchestrator(&server);

    let result = orchestrator.monitor_once().await;

    assert!(matches!(result, Err(ActionError::Rejected(_))));
    assert_eq!(notices.notices()[0].level, NoticeLevel::Error);
    scan.assert_async().await;
    metrics.assert_async().await;
    contracts.assert_async().await;
    events.assert_async().await;
}

#[tokio::test]
async fn test_delete_with_confirmation_refreshes_registry() {
    let mut server = mockito::Server::new_async().await;
    let delete = server
        .mock("DELETE", "/contracts/c1")
        .with_status(200)
        .with_body(r#"{"deleted":true}"#)
        .expect(1)
        .create_async()
        .await;
    let list = server
        .mock("GET", "/contracts")
        .with_status(200)
        .with_body(r#"{"contracts":[{"id":"c2","contract_hash":"0x2"}]}"#)
        .create_async()
        .await;
    let (orchestrator, _) = orchestrator(&server);

    let outcome = orchestrator.delete("c1", &|_: &str| true).await.unwrap();

    assert_eq!(outcome, RemoveOutcome::Removed);
    let ids: Vec<String> =
        orchestrator.registry().contracts().await.into_iter().map(|c| c.id).collect();
    assert_eq!(ids, vec!["c2"]);
    delete.assert_async().await;
    list.assert_async().await;
}

#[tokio::test]
async fn test_delete_without_confirmation_sends_nothing() {
    let mut server = mockito::Server::new_async().await;
    let delete = server.mock("DELETE", Matcher::Any).expect(0).create_async().await;
    let (orchestrator, _) = orchestrator(&server);

    let outcome = orchestrator.delete("c1", &|_: &str| false).await.unwrap();

    assert_eq!(outcome, RemoveOutcome::Cancelled);
    delete.assert_async().await;
}

#[tokio::test]
async fn test_send_alert_looks_up_owner_then_notifies() {
    let mut server = mockito::Server::new_async().await;
    let _list = server
        .mock("GET", "/contracts")
        .with_status(200)
        .with_body(r#"{"contracts":[{"id":"c1","contract_hash":"0x1","owner_email":"ops@example.com"}]}"#)
        .create_async()
        .await;
    let notify = server
        .mock("POST", "/notify")
        .match_body(Matcher::Json(json!({ "contract_id": "c1", "message": "Pause now", "voice": false })))
        .with_status(200)
        .with_body(r#"{"sent":true}"#)
        .expect(1)
        .create_async()
        .await;
    let (orchestrator, notices) = orchestrator(&server);

    orchestrator.send_alert("c1", " Pause now ", false).await.unwrap();

    assert_eq!(notices.notices()[0].message, "Alert sent");
    notify.assert_async().await;
}

#[tokio::test]
async fn test_select_events_scoped_to_contract() {
    let mut server = mockito::Server::new_async().await;
    let _scoped = server
        .mock("GET", "/contracts/c1/events")
        .match_query(Matcher::UrlEncoded("range".into(), "1m".into()))
        .with_status(200)
        .with_body(r#"{"events":[{"id":1,"event_name":"Withdraw"},{"id":2,"event_name":"Transfer"}]}"#)
        .create_async()
        .await;
    let (orchestrator, _) = orchestrator(&server);

    let scope = EventScope::contract("c1", "1m".parse().ok());
    orchestrator.select_events(scope.clone()).await.unwrap();

    let snapshot = orchestrator.feed().snapshot().await;
    assert_eq!(snapshot.scope, scope);
    let names: Vec<&str> = snapshot.events.iter().map(|e| e.event_name.as_str()).collect();
    assert_eq!(names, vec!["Withdraw", "Transfer"]);
}

#[tokio::test]
async fn test_delete_command_with_yes_flag() {
    let mut server = mockito::Server::new_async().await;
    let delete = server
        .mock("DELETE", "/contracts/c9")
        .with_status(200)
        .with_body(r#"{"deleted":true}"#)
        .expect(1)
        .create_async()
        .await;
    let _list = server
        .mock("GET", "/contracts")
        .with_status(200)
        .with_body(r#"{"contracts":[]}"#)
        .create_async()
        .await;
    let config = AppConfig::default().with_backend_url(Url::parse(&server.url()).unwrap());

    cmd::execute(Command::Delete(DeleteArgs { id: "c9".into(), yes: true }), config).await.unwrap();

    delete.assert_async().await;
}

#[tokio::test]
async fn test_command_surfaces_backend_failure() {
    let mut server = mockito::Server::new_async().await;
    let _list = server.mock("GET", "/contracts").with_status(500).create_async().await;
    let config = AppConfig::default().with_backend_url(Url::parse(&server.url()).unwrap());

    let result = cmd::execute(Command::Contracts, config).await;

    assert!(matches!(result, Err(cmd::Error::Transport(_))));
}
