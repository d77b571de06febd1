//! Request and response bodies of the backend's REST surface.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Chain, Contract, Network};

/// Availability of the backend's integrations, from `/health/detail`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthDetail {
    /// The agent framework is importable.
    pub spoon_available: bool,
    /// A Gemini key is configured.
    pub gemini_configured: bool,
    /// An OpenAI key is configured.
    pub openai_configured: bool,
    /// An Anthropic key is configured.
    pub anthropic_configured: bool,
    /// A DeepSeek key is configured.
    pub deepseek_configured: bool,
    /// An OpenRouter key is configured.
    pub openrouter_configured: bool,
    /// Text-to-speech is configured.
    pub elevenlabs_configured: bool,
}

impl HealthDetail {
    /// Integration flags as `(label, available)` pairs, in display order.
    pub fn integrations(&self) -> [(&'static str, bool); 7] {
        [
            ("SpoonOS", self.spoon_available),
            ("Gemini", self.gemini_configured),
            ("OpenAI", self.openai_configured),
            ("Anthropic", self.anthropic_configured),
            ("DeepSeek", self.deepseek_configured),
            ("OpenRouter", self.openrouter_configured),
            ("ElevenLabs", self.elevenlabs_configured),
        ]
    }
}

/// Operational counters keyed by name.
pub type Metrics = BTreeMap<String, i64>;

/// Body of `POST /register-contract`. Absent optional fields are omitted
/// from the payload rather than sent as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisterContractRequest {
    /// On-chain hash or address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_hash: Option<String>,
    /// Parsed ABI/manifest.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abi: Option<Value>,
    /// Deployment network.
    pub network: Network,
    /// Chain family.
    pub chain: Chain,
    /// Notification contact.
    pub owner_email: String,
    /// Pre-signed transaction to broadcast right after registration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_tx_hex: Option<String>,
}

/// Response of `POST /register-contract`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RegisterContractResponse {
    /// The stored contract.
    pub contract: Option<Contract>,
    /// Combined ABI, legal and risk analysis.
    pub analysis: Value,
    /// Broadcast result when a raw transaction was supplied.
    pub exit_broadcast: Option<Value>,
}

impl RegisterContractResponse {
    /// Risk level reported by the registration analysis.
    pub fn risk_level(&self) -> Option<f64> {
        self.analysis.get("risk_level").and_then(Value::as_f64)
    }
}

/// Body of `POST /contracts/{id}/activate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActivateRequest {
    /// Desired monitoring state.
    pub active: bool,
}

/// Body of `POST /notify`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotifyRequest {
    /// Target contract.
    pub contract_id: String,
    /// Alert text.
    pub message: String,
    /// Also synthesize a voice message.
    pub voice: bool,
}

/// Body of `POST /legal-analyze`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegalAnalyzeRequest {
    /// ABI/manifest object.
    pub abi: Value,
    /// Also synthesize a voice summary.
    pub voice: bool,
}

/// Body of `POST /analyze-abi`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzeAbiRequest {
    /// ABI/manifest object.
    pub abi: Value,
}

/// Body of `POST /exit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExitRequest {
    /// Signed transaction, hex encoded.
    pub raw_tx_hex: String,
}

/// Counters of one scan cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringStats {
    /// Blocks inspected.
    pub scanned_blocks: u64,
    /// Events stored.
    pub events_recorded: u64,
}

/// Response of `POST /monitor-once`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MonitorOnceResponse {
    /// Scan statistics.
    pub monitoring: Option<MonitoringStats>,
    /// Error reported in-band with a success status.
    pub error: Option<Value>,
    /// Optional status marker.
    pub status: Option<String>,
}

impl MonitorOnceResponse {
    /// Returns the failure reported inside a 2xx body, if any.
    pub fn failure(&self) -> Option<String> {
        if let Some(error) = self.error.as_ref().filter(|e| !e.is_null()) {
            return Some(match error {
                Value::String(message) => message.clone(),
                other => other.to_string(),
            });
        }
        match self.status.as_deref() {
            Some(status) if status.eq_ignore_ascii_case("error") || status.eq_ignore_ascii_case("failed") =>
                Some(format!("scan reported status '{status}'")),
            _ => None,
        }
    }
}
