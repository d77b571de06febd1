//! An in-memory `Backend` that records calls and can be scripted to fail or
//! stall.

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{Value, json};
use tokio::sync::Notify;

use crate::{
    models::{
        AnalyzeAbiRequest, Contract, Event, ExitRequest, HealthDetail, LegalAnalyzeRequest,
        Metrics, MonitorOnceResponse, NotifyRequest, RangePreset, RegisterContractRequest,
        RegisterContractResponse,
    },
    transport::{Backend, TransportError},
};

/// A backend keeping contracts and events in memory.
///
/// Every call is recorded as a short string such as `delete_contract c1` or
/// `list_contract_events c1 1w`. Operations named with [`fail_on`] return a
/// 500 status; contract event queries for a gated id wait until the gate is
/// notified.
///
/// [`fail_on`]: FakeBackend::fail_on
#[derive(Default)]
pub struct FakeBackend {
    contracts: Mutex<Vec<Contract>>,
    events: Mutex<Vec<Event>>,
    contract_events: Mutex<HashMap<String, Vec<Event>>>,
    health: Mutex<HealthDetail>,
    metrics: Mutex<Metrics>,
    monitor_response: Mutex<MonitorOnceResponse>,
    responses: Mutex<HashMap<&'static str, Value>>,
    bodies: Mutex<Vec<(&'static str, Value)>>,
    failures: Mutex<HashSet<String>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    calls: Mutex<Vec<String>>,
    call_recorded: Notify,
}

impl FakeBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the stored contracts.
    pub fn set_contracts(&self, contracts: Vec<Contract>) {
        *self.contracts.lock().unwrap() = contracts;
    }

    /// Replaces the events returned for all contracts.
    pub fn set_events(&self, events: Vec<Event>) {
        *self.events.lock().unwrap() = events;
    }

    /// Sets the events returned for one contract, whatever the range.
    pub fn set_contract_events(&self, id: &str, events: Vec<Event>) {
        self.contract_events.lock().unwrap().insert(id.to_string(), events);
    }

    /// Sets the health flags.
    pub fn set_health(&self, health: HealthDetail) {
        *self.health.lock().unwrap() = health;
    }

    /// Sets the counters.
    pub fn set_metrics(&self, metrics: Metrics) {
        *self.metrics.lock().unwrap() = metrics;
    }

    /// Sets the body returned by `monitor_once`.
    pub fn set_monitor_response(&self, response: MonitorOnceResponse) {
        *self.monitor_response.lock().unwrap() = response;
    }

    /// Overrides the JSON returned by one of `notify`, `legal_analyze`,
    /// `analyze_abi`, `exit_broadcast` or `set_contract_active`.
    pub fn set_response(&self, operation: &'static str, response: Value) {
        self.responses.lock().unwrap().insert(operation, response);
    }

    /// Makes `operation` fail with a 500 status from now on.
    pub fn fail_on(&self, operation: &str) {
        self.failures.lock().unwrap().insert(operation.to_string());
    }

    /// Stalls event queries for contract `id` until the returned gate is
    /// notified once per query.
    pub fn gate_contract_events(&self, id: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.lock().unwrap().insert(id.to_string(), gate.clone());
        gate
    }

    /// Calls recorded so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of recorded calls that start with `prefix`.
    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|call| call.starts_with(prefix)).count()
    }

    /// The JSON body of the last call to `operation`, if it sent one.
    pub fn last_body(&self, operation: &str) -> Option<Value> {
        self.bodies
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(name, _)| *name == operation)
            .map(|(_, body)| body.clone())
    }

    /// Waits until `call` has been recorded.
    pub async fn wait_for_call(&self, call: &str) {
        loop {
            let notified = self.call_recorded.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.calls.lock().unwrap().iter().any(|recorded| recorded == call) {
                return;
            }
            notified.await;
        }
    }

    fn record(&self, operation: &'static str, detail: Option<String>) -> Result<(), TransportError> {
        let call = match detail {
            Some(detail) => format!("{operation} {detail}"),
            None => operation.to_string(),
        };
        self.calls.lock().unwrap().push(call);
        self.call_recorded.notify_waiters();

        if self.failures.lock().unwrap().contains(operation) {
            return Err(TransportError::Status {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: format!("{operation} failed"),
            });
        }
        Ok(())
    }

    fn record_body(&self, operation: &'static str, body: Value) {
        self.bodies.lock().unwrap().push((operation, body));
    }

    fn response_or(&self, operation: &'static str, default: Value) -> Value {
        self.responses.lock().unwrap().get(operation).cloned().unwrap_or(default)
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn health_detail(&self) -> Result<HealthDetail, TransportError> {
        self.record("health_detail", None)?;
        Ok(self.health.lock().unwrap().clone())
    }

    async fn metrics(&self) -> Result<Metrics, TransportError> {
        self.record("metrics", None)?;
        Ok(self.metrics.lock().unwrap().clone())
    }

    async fn list_contracts(&self) -> Result<Vec<Contract>, TransportError> {
        self.record("list_contracts", None)?;
        Ok(self.contracts.lock().unwrap().clone())
    }

    async fn register_contract(
        &self,
        request: &RegisterContractRequest,
    ) -> Result<RegisterContractResponse, TransportError> {
        let hash = request.contract_hash.clone().unwrap_or_default();
        self.record("register_contract", Some(hash.clone()))?;
        self.record_body("register_contract", serde_json::to_value(request).unwrap());

        let contract = {
            let mut contracts = self.contracts.lock().unwrap();
            let contract = Contract {
                id: format!("c{}", contracts.len() + 1),
                contract_hash: hash,
                contract_name: None,
                chain: request.chain,
                network: request.network,
                active: false,
                risk_level: Some(4.0),
                breach_vectors: Vec::new(),
                monitoring_events: Vec::new(),
                formatted_report: None,
                owner_email: Some(request.owner_email.clone()),
            };
            contracts.push(contract.clone());
            contract
        };
        Ok(RegisterContractResponse {
            contract: Some(contract),
            analysis: json!({ "risk_level": 4.0 }),
            exit_broadcast: request.raw_tx_hex.as_ref().map(|_| json!({ "sent": true })),
        })
    }

    async fn set_contract_active(&self, id: &str, active: bool) -> Result<Value, TransportError> {
        self.record("set_contract_active", Some(format!("{id} {active}")))?;
        if let Some(contract) = self.contracts.lock().unwrap().iter_mut().find(|c| c.id == id) {
            contract.active = active;
        }
        Ok(self.response_or("set_contract_active", json!({ "id": id, "active": active })))
    }

    async fn delete_contract(&self, id: &str) -> Result<(), TransportError> {
        self.record("delete_contract", Some(id.to_string()))?;
        self.contracts.lock().unwrap().retain(|c| c.id != id);
        Ok(())
    }

    async fn list_events(&self) -> Result<Vec<Event>, TransportError> {
        self.record("list_events", None)?;
        Ok(self.events.lock().unwrap().clone())
    }

    async fn list_contract_events(
        &self,
        id: &str,
        range: Option<RangePreset>,
    ) -> Result<Vec<Event>, TransportError> {
        let detail = match range {
            Some(range) => format!("{id} {}", range.as_query_value()),
            None => id.to_string(),
        };
        let result = self.record("list_contract_events", Some(detail));
        let gate = self.gates.lock().unwrap().get(id).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        result?;
        Ok(self.contract_events.lock().unwrap().get(id).cloned().unwrap_or_default())
    }

    async fn monitor_once(&self) -> Result<MonitorOnceResponse, TransportError> {
        self.record("monitor_once", None)?;
        Ok(self.monitor_response.lock().unwrap().clone())
    }

    async fn notify(&self, request: &NotifyRequest) -> Result<Value, TransportError> {
        self.record("notify", Some(request.contract_id.clone()))?;
        self.record_body("notify", serde_json::to_value(request).unwrap());
        Ok(self.response_or("notify", json!({ "sent": true, "voice": request.voice })))
    }

    async fn legal_analyze(&self, request: &LegalAnalyzeRequest) -> Result<Value, TransportError> {
        self.record("legal_analyze", None)?;
        self.record_body("legal_analyze", serde_json::to_value(request).unwrap());
        Ok(self.response_or("legal_analyze", json!({ "summary": "No issues found" })))
    }

    async fn analyze_abi(&self, request: &AnalyzeAbiRequest) -> Result<Value, TransportError> {
        self.record("analyze_abi", None)?;
        self.record_body("analyze_abi", serde_json::to_value(request).unwrap());
        Ok(self.response_or("analyze_abi", json!({ "risk_level": 2 })))
    }

    async fn exit_broadcast(&self, request: &ExitRequest) -> Result<Value, TransportError> {
        self.record("exit_broadcast", None)?;
        self.record_body("exit_broadcast", serde_json::to_value(request).unwrap());
        Ok(self.response_or("exit_broadcast", json!({ "txid": "0xfeed" })))
    }
}
