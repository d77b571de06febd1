//! The seams between the views and the backend.

use async_trait::async_trait;
use futures::stream::BoxStream;
#[cfg(test)]
use mockall::automock;
use serde_json::Value;

use super::TransportError;
use crate::models::{
    AnalyzeAbiRequest, Contract, Event, ExitRequest, HealthDetail, LegalAnalyzeRequest, Metrics,
    MonitorOnceResponse, NotifyRequest, RangePreset, RegisterContractRequest,
    RegisterContractResponse,
};

/// Request/response operations offered by the monitoring backend.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Backend: Send + Sync {
    /// Integration availability flags.
    async fn health_detail(&self) -> Result<HealthDetail, TransportError>;

    /// Operational counters.
    async fn metrics(&self) -> Result<Metrics, TransportError>;

    /// All registered contracts.
    async fn list_contracts(&self) -> Result<Vec<Contract>, TransportError>;

    /// Registers a contract and runs the initial analysis.
    async fn register_contract(
        &self,
        request: &RegisterContractRequest,
    ) -> Result<RegisterContractResponse, TransportError>;

    /// Enables or disables monitoring. The response shape is not relied on.
    async fn set_contract_active(&self, id: &str, active: bool) -> Result<Value, TransportError>;

    /// Deletes a contract and its events.
    async fn delete_contract(&self, id: &str) -> Result<(), TransportError>;

    /// Events across all contracts.
    async fn list_events(&self) -> Result<Vec<Event>, TransportError>;

    /// Events of one contract, optionally limited to a time window.
    async fn list_contract_events(
        &self,
        id: &str,
        range: Option<RangePreset>,
    ) -> Result<Vec<Event>, TransportError>;

    /// Triggers one scan cycle.
    async fn monitor_once(&self) -> Result<MonitorOnceResponse, TransportError>;

    /// Sends a manual alert to the contract owner.
    async fn notify(&self, request: &NotifyRequest) -> Result<Value, TransportError>;

    /// Runs the legal analysis over an ABI.
    async fn legal_analyze(&self, request: &LegalAnalyzeRequest) -> Result<Value, TransportError>;

    /// Runs the ABI risk analysis.
    async fn analyze_abi(&self, request: &AnalyzeAbiRequest) -> Result<Value, TransportError>;

    /// Broadcasts a pre-signed exit transaction.
    async fn exit_broadcast(&self, request: &ExitRequest) -> Result<Value, TransportError>;
}

/// Raw `data` payloads of the log stream, in arrival order.
pub type LogFrames = BoxStream<'static, Result<String, TransportError>>;

/// A push source of log messages.
#[async_trait]
pub trait LogSource: Send + Sync {
    /// Opens a subscription. The stream ends (or yields an error) when the
    /// connection drops; dropping it closes the connection.
    async fn subscribe(&self) -> Result<LogFrames, TransportError>;
}
