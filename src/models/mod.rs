//! Wire types shared by the transport, the views and the command line.

pub mod backend;
pub mod contract;
pub mod event;
pub mod log_entry;

pub use backend::{
    ActivateRequest, AnalyzeAbiRequest, ExitRequest, HealthDetail, LegalAnalyzeRequest, Metrics,
    MonitorOnceResponse, MonitoringStats, NotifyRequest, RegisterContractRequest,
    RegisterContractResponse,
};
pub use contract::{Chain, Contract, Network};
pub use event::{Event, EventScope, RangePreset, Severity};
pub use log_entry::LogEntry;

use serde::{Deserialize, Deserializer, de};
use serde_json::Value;

/// Backend identifiers are opaque; accept them as strings or integers.
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!("invalid identifier: {other}"))),
    }
}
