use std::{future::Future, sync::Arc};

use serde_json::Value;
use thiserror::Error;

use super::{
    ActionKey, ActionKind, ActionTracker, Confirm, Notice, NoticeSink, RegisterForm,
    ValidationError, lenient_abi, validate_alert, validate_raw_tx,
};
use crate::{
    display::risk_percent,
    models::{
        AnalyzeAbiRequest, EventScope, ExitRequest, LegalAnalyzeRequest, MonitorOnceResponse,
        NotifyRequest, RegisterContractResponse,
    },
    transport::{Backend, TransportError},
    views::{
        ContractRegistry, EventFeed, FeedError, RefreshOutcome, RegistryError, RemoveOutcome,
        StatusPanel,
    },
};

/// Failure of a user action.
#[derive(Debug, Error)]
pub enum ActionError {
    /// The same action on the same target is still running.
    #[error("{0} is already in progress")]
    InProgress(ActionKey),

    /// Input was rejected before any network call.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The backend call failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Loading the event list failed.
    #[error(transparent)]
    Feed(#[from] FeedError),

    /// The backend answered but did not confirm the action.
    #[error("{0}")]
    Rejected(String),
}

impl From<RegistryError> for ActionError {
    fn from(error: RegistryError) -> Self {
        match error {
            RegistryError::Validation(e) => ActionError::Validation(e),
            RegistryError::Transport(e) => ActionError::Transport(e),
        }
    }
}

/// Runs user actions against the backend and keeps the views current.
pub struct ActionOrchestrator {
    backend: Arc<dyn Backend>,
    registry: Arc<ContractRegistry>,
    feed: Arc<EventFeed>,
    status: Arc<StatusPanel>,
    tracker: ActionTracker,
    notices: Arc<dyn NoticeSink>,
}

impl ActionOrchestrator {
    /// Creates an orchestrator with fresh, empty views over `backend`.
    pub fn new(backend: Arc<dyn Backend>, notices: Arc<dyn NoticeSink>) -> Self {
        Self {
            registry: Arc::new(ContractRegistry::new(backend.clone())),
            feed: Arc::new(EventFeed::new(backend.clone())),
            status: Arc::new(StatusPanel::new(backend.clone())),
            tracker: ActionTracker::new(),
            backend,
            notices,
        }
    }

    /// The contract list view.
    pub fn registry(&self) -> &Arc<ContractRegistry> {
        &self.registry
    }

    /// The event feed view.
    pub fn feed(&self) -> &Arc<EventFeed> {
        &self.feed
    }

    /// The health and metrics view.
    pub fn status(&self) -> &Arc<StatusPanel> {
        &self.status
    }

    /// Progress of every action run so far.
    pub fn tracker(&self) -> &ActionTracker {
        &self.tracker
    }

    /// Refreshes health, metrics, contracts and the current event scope
    /// concurrently. All four are attempted; the first failure is returned.
    pub async fn refresh_all(&self) -> Result<(), ActionError> {
        let (health, metrics, contracts, events) = tokio::join!(
            self.status.refresh_health(),
            self.status.refresh_metrics(),
            self.registry.refresh(),
            self.feed.refresh_current(),
        );
        let result = health
            .map(drop)
            .and(metrics.map(drop))
            .and(contracts.map(drop))
            .map_err(ActionError::from)
            .and(events.map(drop).map_err(ActionError::from));
        if let Err(e) = &result {
            self.notices.publish(Notice::error(format!("Failed to refresh dashboard: {e}")));
        }
        result
    }

    /// Switches the event feed to `scope`.
    pub async fn select_events(&self, scope: EventScope) -> Result<RefreshOutcome, ActionError> {
        self.feed.refresh(scope).await.map_err(|e| {
            self.notices.publish(Notice::error(format!("Failed to load events: {}", e.source)));
            ActionError::from(e)
        })
    }

    /// Validates and registers a contract, then refreshes the registry.
    pub async fn register(
        &self,
        form: &RegisterForm,
    ) -> Result<RegisterContractResponse, ActionError> {
        self.run(
            ActionKey::global(ActionKind::Register),
            "Failed to register contract",
            |response: &RegisterContractResponse| match response.risk_level() {
                Some(level) => Some(format!(
                    "Contract registered successfully (risk {}%)",
                    risk_percent(Some(level))
                )),
                None => Some("Contract registered successfully".to_string()),
            },
            async { Ok::<_, ActionError>(self.registry.register(form).await?) },
        )
        .await
    }

    /// Enables or disables monitoring of contract `id`.
    pub async fn set_active(&self, id: &str, active: bool) -> Result<Value, ActionError> {
        let verb = if active { "activated" } else { "deactivated" };
        self.run(
            ActionKey::on(ActionKind::SetActive, id),
            "Failed to update contract status",
            |_: &Value| Some(format!("Contract {verb} successfully")),
            async { Ok::<_, ActionError>(self.registry.set_active(id, active).await?) },
        )
        .await
    }

    /// Deletes contract `id` once `confirm` agrees. A declined prompt
    /// publishes nothing and leaves the action idle.
    pub async fn delete(&self, id: &str, confirm: &dyn Confirm) -> Result<RemoveOutcome, ActionError> {
        self.run(
            ActionKey::on(ActionKind::Delete, id),
            "Failed to delete contract",
            |outcome: &RemoveOutcome| match outcome {
                RemoveOutcome::Removed => Some("Contract deleted".to_string()),
                RemoveOutcome::Cancelled => None,
            },
            async { Ok::<_, ActionError>(self.registry.remove(id, confirm).await?) },
        )
        .await
    }

    /// Sends a manual alert to the owner of contract `id`.
    ///
    /// The message must be non-blank and the contract must have an owner
    /// email. A response without `"sent": true` counts as a failure.
    pub async fn send_alert(&self, id: &str, message: &str, voice: bool) -> Result<Value, ActionError> {
        self.run(
            ActionKey::on(ActionKind::SendAlert, id),
            "Failed to send alert",
            |_: &Value| Some("Alert sent".to_string()),
            async {
                let contract = match self.registry.get(id).await {
                    Some(contract) => Some(contract),
                    None => {
                        self.registry.refresh().await?;
                        self.registry.get(id).await
                    }
                };
                validate_alert(message, contract.as_ref())?;

                let request = NotifyRequest {
                    contract_id: id.to_string(),
                    message: message.trim().to_string(),
                    voice,
                };
                let response = self.backend.notify(&request).await?;
                if response.get("sent").and_then(Value::as_bool) != Some(true) {
                    return Err(ActionError::Rejected(
                        "The backend did not confirm the alert was sent".to_string(),
                    ));
                }
                Ok(response)
            },
        )
        .await
    }

    /// Triggers one scan cycle.
    ///
    /// Metrics, contracts and events are refreshed afterwards whatever the
    /// scan returned. A 2xx body carrying an `error` field or a failed
    /// `status` is reported as a failure.
    pub async fn monitor_once(&self) -> Result<MonitorOnceResponse, ActionError> {
        self.run(
            ActionKey::global(ActionKind::MonitorOnce),
            "Monitoring failed",
            |response: &MonitorOnceResponse| match response.monitoring {
                Some(stats) => Some(format!(
                    "Monitoring completed successfully: {} blocks scanned, {} events recorded",
                    stats.scanned_blocks, stats.events_recorded
                )),
                None => Some("Monitoring completed successfully".to_string()),
            },
            async {
                let scan = self.backend.monitor_once().await;

                let (metrics, contracts, events) = tokio::join!(
                    self.status.refresh_metrics(),
                    self.registry.refresh(),
                    self.feed.refresh_current(),
                );
                if let Err(e) = metrics {
                    tracing::warn!(error = %e, "Failed to refresh metrics after scan");
                }
                if let Err(e) = contracts {
                    tracing::warn!(error = %e, "Failed to refresh contracts after scan");
                }
                if let Err(e) = events {
                    tracing::warn!(error = %e, "Failed to refresh events after scan");
                }

                let scan = scan?;
                match scan.failure() {
                    Some(failure) => Err(ActionError::Rejected(failure)),
                    None => Ok(scan),
                }
            },
        )
        .await
    }

    /// Runs the ABI risk analysis. Text that is not a JSON object is sent as
    /// an empty ABI.
    pub async fn analyze_abi(&self, abi_text: &str) -> Result<Value, ActionError> {
        self.run(
            ActionKey::global(ActionKind::AnalyzeAbi),
            "ABI risk analysis failed",
            |_: &Value| Some("ABI risk analysis completed".to_string()),
            async {
                let request = AnalyzeAbiRequest { abi: lenient_abi(abi_text) };
                Ok::<_, ActionError>(self.backend.analyze_abi(&request).await?)
            },
        )
        .await
    }

    /// Runs the legal analysis. Text that is not a JSON object is sent as an
    /// empty ABI.
    pub async fn analyze_legal(&self, abi_text: &str, voice: bool) -> Result<Value, ActionError> {
        self.run(
            ActionKey::global(ActionKind::AnalyzeLegal),
            "Legal analysis failed",
            |_: &Value| Some("Legal analysis completed".to_string()),
            async {
                let request = LegalAnalyzeRequest { abi: lenient_abi(abi_text), voice };
                Ok::<_, ActionError>(self.backend.legal_analyze(&request).await?)
            },
        )
        .await
    }

    /// Broadcasts a pre-signed exit transaction.
    pub async fn exit_broadcast(&self, raw_tx_hex: &str) -> Result<Value, ActionError> {
        self.run(
            ActionKey::global(ActionKind::ExitBroadcast),
            "Exit broadcast failed",
            |_: &Value| Some("Exit broadcast completed".to_string()),
            async {
                validate_raw_tx(raw_tx_hex)?;
                let request = ExitRequest { raw_tx_hex: raw_tx_hex.trim().to_string() };
                Ok::<_, ActionError>(self.backend.exit_broadcast(&request).await?)
            },
        )
        .await
    }

    /// Drives one action through the tracker and publishes its outcome.
    ///
    /// `success` returns `None` when the action turned out to be a no-op;
    /// the key then goes back to idle and no notice is published.
    async fn run<T, S, F>(
        &self,
        key: ActionKey,
        failure: &str,
        success: S,
        action: F,
    ) -> Result<T, ActionError>
    where
        S: FnOnce(&T) -> Option<String>,
        F: Future<Output = Result<T, ActionError>>,
    {
        if !self.tracker.begin(&key) {
            tracing::debug!(action = %key, "Ignoring duplicate submission");
            return Err(ActionError::InProgress(key));
        }
        tracing::debug!(action = %key, "Action started");

        match action.await {
            Ok(value) => {
                match success(&value) {
                    Some(message) => {
                        self.tracker.succeed(&key);
                        tracing::info!(action = %key, %message, "Action succeeded");
                        self.notices.publish(Notice::success(message));
                    }
                    None => {
                        self.tracker.reset(&key);
                        tracing::debug!(action = %key, "Action ended without changes");
                    }
                }
                Ok(value)
            }
            Err(e) => {
                self.tracker.fail(&key, e.to_string());
                tracing::warn!(action = %key, error = %e, "Action failed");
                self.notices.publish(Notice::error(format!("{failure}: {e}")));
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        actions::{ActionStatus, NoticeLevel},
        models::{HealthDetail, Metrics, MonitoringStats, RangePreset},
        test_helpers::{ContractBuilder, EventBuilder, FakeBackend, RecordingNoticeSink},
        transport::traits::MockBackend,
    };

    fn orchestrator(backend: Arc<dyn Backend>) -> (ActionOrchestrator, Arc<RecordingNoticeSink>) {
        let notices = Arc::new(RecordingNoticeSink::new());
        (ActionOrchestrator::new(backend, notices.clone()), notices)
    }

    fn server_error() -> TransportError {
        TransportError::Status {
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            body: "boom".to_string(),
        }
    }

    #[tokio::test]
    async fn test_monitor_once_refreshes_after_success() {
        let mut backend = MockBackend::new();
        backend.expect_monitor_once().times(1).returning(|| {
            Ok(MonitorOnceResponse {
                monitoring: Some(MonitoringStats { scanned_blocks: 3, events_recorded: 1 }),
                ..Default::default()
            })
        });
        backend.expect_metrics().times(1).returning(|| Ok(Default::default()));
        backend.expect_list_contracts().times(1).returning(|| Ok(vec![]));
        backend.expect_list_events().times(1).returning(|| Ok(vec![]));
        let (orchestrator, notices) = orchestrator(Arc::new(backend));

        let response = orchestrator.monitor_once().await.unwrap();

        assert_eq!(response.monitoring.unwrap().scanned_blocks, 3);
        let notices = notices.notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Success);
        assert!(notices[0].message.contains("3 blocks scanned"));
    }

    #[tokio::test]
    async fn test_monitor_once_refreshes_after_transport_failure() {
        let mut backend = MockBackend::new();
        backend.expect_monitor_once().times(1).returning(|| Err(server_error()));
        backend.expect_metrics().times(1).returning(|| Ok(Default::default()));
        backend.expect_list_contracts().times(1).returning(|| Ok(vec![]));
        backend.expect_list_events().times(1).returning(|| Ok(vec![]));
        let (orchestrator, notices) = orchestrator(Arc::new(backend));

        let result = orchestrator.monitor_once().await;

        assert!(matches!(result, Err(ActionError::Transport(_))));
        assert_eq!(notices.notices()[0].level, NoticeLevel::Error);
    }

    #[tokio::test]
    async fn test_monitor_once_in_band_error_is_a_failure() {
        let backend = Arc::new(FakeBackend::new());
        backend.set_monitor_response(MonitorOnceResponse {
            error: Some(json!("rpc unreachable")),
            ..Default::default()
        });
        let (orchestrator, _) = orchestrator(backend.clone());

        let result = orchestrator.monitor_once().await;

        match result {
            Err(ActionError::Rejected(message)) => assert_eq!(message, "rpc unreachable"),
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(backend.count_calls("list_contracts"), 1);
        assert_eq!(backend.count_calls("list_events"), 1);
        assert_eq!(backend.count_calls("metrics"), 1);
    }

    #[tokio::test]
    async fn test_monitor_once_refreshes_the_selected_scope() {
        let backend = Arc::new(FakeBackend::new());
        backend.set_contract_events("c1", vec![EventBuilder::new("e1").build()]);
        let (orchestrator, _) = orchestrator(backend.clone());
        orchestrator.select_events(EventScope::contract("c1", Some(RangePreset::OneWeek))).await.unwrap();

        orchestrator.monitor_once().await.unwrap();

        assert_eq!(backend.count_calls("list_contract_events c1 1w"), 2);
        assert_eq!(orchestrator.feed().snapshot().await.events.len(), 1);
    }

    #[tokio::test]
    async fn test_send_alert_requires_message_and_owner_email() {
        let backend = Arc::new(FakeBackend::new());
        backend.set_contracts(vec![ContractBuilder::new("c1").build()]);
        let (orchestrator, notices) = orchestrator(backend.clone());

        let result = orchestrator.send_alert("c1", "  ", true).await;

        match result {
            Err(ActionError::Validation(errors)) => {
                assert!(errors.field("message").is_some());
                assert!(errors.field("owner_email").is_some());
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(backend.count_calls("notify"), 0);
        assert_eq!(notices.notices()[0].level, NoticeLevel::Error);
    }

    #[tokio::test]
    async fn test_send_alert_unknown_contract() {
        let backend = Arc::new(FakeBackend::new());
        let (orchestrator, _) = orchestrator(backend.clone());

        let result = orchestrator.send_alert("missing", "hello", false).await;

        match result {
            Err(ActionError::Validation(errors)) => assert!(errors.field("contract_id").is_some()),
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(backend.count_calls("notify"), 0);
    }

    #[tokio::test]
    async fn test_send_alert_requires_sent_acknowledgement() {
        let backend = Arc::new(FakeBackend::new());
        backend.set_contracts(vec![ContractBuilder::new("c1").owner_email("ops@example.com").build()]);
        backend.set_response("notify", json!({ "queued": true }));
        let (orchestrator, _) = orchestrator(backend.clone());

        let result = orchestrator.send_alert("c1", "Pause withdrawals", true).await;

        assert!(matches!(result, Err(ActionError::Rejected(_))));
        assert_eq!(
            backend.last_body("notify").unwrap(),
            json!({ "contract_id": "c1", "message": "Pause withdrawals", "voice": true })
        );
    }

    #[tokio::test]
    async fn test_send_alert_success() {
        let backend = Arc::new(FakeBackend::new());
        backend.set_contracts(vec![ContractBuilder::new("c1").owner_email("ops@example.com").build()]);
        let (orchestrator, notices) = orchestrator(backend.clone());
        orchestrator.registry().refresh().await.unwrap();

        orchestrator.send_alert("c1", "Pause withdrawals", false).await.unwrap();

        assert_eq!(notices.notices(), vec![Notice::success("Alert sent")]);
        assert_eq!(
            orchestrator.tracker().status(&ActionKey::on(ActionKind::SendAlert, "c1")),
            ActionStatus::Succeeded
        );
    }

    #[tokio::test]
    async fn test_analysis_sends_empty_abi_for_invalid_text() {
        let backend = Arc::new(FakeBackend::new());
        let (orchestrator, _) = orchestrator(backend.clone());

        orchestrator.analyze_abi("{invalid json").await.unwrap();
        orchestrator.analyze_legal("not json", true).await.unwrap();

        assert_eq!(backend.last_body("analyze_abi").unwrap(), json!({ "abi": {} }));
        assert_eq!(backend.last_body("legal_analyze").unwrap(), json!({ "abi": {}, "voice": true }));
    }

    #[tokio::test]
    async fn test_exit_broadcast_requires_raw_tx() {
        let backend = Arc::new(FakeBackend::new());
        let (orchestrator, _) = orchestrator(backend.clone());

        assert!(matches!(orchestrator.exit_broadcast(" ").await, Err(ActionError::Validation(_))));
        assert_eq!(backend.count_calls("exit_broadcast"), 0);

        orchestrator.exit_broadcast("00ab").await.unwrap();
        assert_eq!(backend.last_body("exit_broadcast").unwrap(), json!({ "raw_tx_hex": "00ab" }));
    }

    #[tokio::test]
    async fn test_register_reports_risk_percent() {
        let backend = Arc::new(FakeBackend::new());
        let (orchestrator, notices) = orchestrator(backend.clone());
        let form = RegisterForm {
            contract_hash: "0xabc".into(),
            owner_email: "ops@example.com".into(),
            ..Default::default()
        };

        let response = orchestrator.register(&form).await.unwrap();

        assert_eq!(response.contract.unwrap().contract_hash, "0xabc");
        assert_eq!(notices.notices()[0].message, "Contract registered successfully (risk 40%)");
        assert_eq!(orchestrator.registry().contracts().await.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_delete_is_tracked() {
        let backend = Arc::new(FakeBackend::new());
        backend.set_contracts(vec![ContractBuilder::new("c1").build()]);
        backend.fail_on("delete_contract");
        let (orchestrator, notices) = orchestrator(backend.clone());

        let result = orchestrator.delete("c1", &|_: &str| true).await;

        assert!(matches!(result, Err(ActionError::Transport(_))));
        let key = ActionKey::on(ActionKind::Delete, "c1");
        assert!(matches!(orchestrator.tracker().status(&key), ActionStatus::Failed(_)));
        assert!(notices.notices()[0].message.starts_with("Failed to delete contract"));
    }

    #[tokio::test]
    async fn test_declined_delete_is_silent_and_idle() {
        let backend = Arc::new(FakeBackend::new());
        backend.set_contracts(vec![ContractBuilder::new("c1").build()]);
        let (orchestrator, notices) = orchestrator(backend.clone());

        let outcome = orchestrator.delete("c1", &|_: &str| false).await.unwrap();

        assert_eq!(outcome, RemoveOutcome::Cancelled);
        let key = ActionKey::on(ActionKind::Delete, "c1");
        assert_eq!(orchestrator.tracker().status(&key), ActionStatus::Idle);
        assert!(notices.notices().is_empty());
        assert_eq!(backend.count_calls("delete_contract"), 0);
    }

    #[tokio::test]
    async fn test_delete_succeeds_when_follow_up_refresh_fails() {
        let backend = Arc::new(FakeBackend::new());
        backend.set_contracts(vec![ContractBuilder::new("c1").build()]);
        backend.fail_on("list_contracts");
        let (orchestrator, notices) = orchestrator(backend.clone());

        let outcome = orchestrator.delete("c1", &|_: &str| true).await.unwrap();

        assert_eq!(outcome, RemoveOutcome::Removed);
        let key = ActionKey::on(ActionKind::Delete, "c1");
        assert_eq!(orchestrator.tracker().status(&key), ActionStatus::Succeeded);
        assert_eq!(notices.notices(), vec![Notice::success("Contract deleted")]);
    }

    #[tokio::test]
    async fn test_duplicate_submission_is_refused() {
        let backend = Arc::new(FakeBackend::new());
        let (orchestrator, _) = orchestrator(backend.clone());
        let key = ActionKey::global(ActionKind::MonitorOnce);
        assert!(orchestrator.tracker().begin(&key));

        let result = orchestrator.monitor_once().await;

        assert!(matches!(result, Err(ActionError::InProgress(_))));
        assert_eq!(backend.count_calls("monitor_once"), 0);
    }

    #[tokio::test]
    async fn test_refresh_all_attempts_every_view() {
        let backend = Arc::new(FakeBackend::new());
        backend.fail_on("health_detail");
        let (orchestrator, notices) = orchestrator(backend.clone());

        assert!(orchestrator.refresh_all().await.is_err());

        assert_eq!(backend.count_calls("metrics"), 1);
        assert_eq!(backend.count_calls("list_contracts"), 1);
        assert_eq!(backend.count_calls("list_events"), 1);
        assert_eq!(notices.notices().len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_all_fills_status_panel() {
        let backend = Arc::new(FakeBackend::new());
        backend.set_health(HealthDetail { gemini_configured: true, ..Default::default() });
        backend.set_metrics(Metrics::from([("events_recorded".to_string(), 7)]));
        let (orchestrator, notices) = orchestrator(backend.clone());

        orchestrator.refresh_all().await.unwrap();

        let health = orchestrator.status().health().await.unwrap();
        assert!(health.gemini_configured);
        assert!(!health.spoon_available);
        assert_eq!(orchestrator.status().metrics().await["events_recorded"], 7);
        assert!(notices.notices().is_empty());
    }
}
