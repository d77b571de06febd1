//! Events ingested by the backend and the scopes they are queried by.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Severity assigned to an event by the backend.
///
/// Variants are declared in ascending order so that `Ord` follows urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Bookkeeping events such as activation toggles.
    Info,
    /// Low severity.
    Low,
    /// Medium severity.
    Medium,
    /// High severity.
    High,
    /// Critical severity.
    Critical,
}

impl Severity {
    /// Lowercase label as used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown severity strings are treated like a missing severity.
fn deserialize_severity<'de, D>(deserializer: D) -> Result<Option<Severity>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| match s.to_ascii_lowercase().as_str() {
        "info" => Some(Severity::Info),
        "low" => Some(Severity::Low),
        "medium" => Some(Severity::Medium),
        "high" => Some(Severity::High),
        "critical" => Some(Severity::Critical),
        _ => None,
    }))
}

/// A single blockchain notification recorded for a contract.
///
/// Events are immutable once fetched and are kept in backend order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Backend identifier.
    #[serde(deserialize_with = "super::deserialize_id")]
    pub id: String,

    /// Name of the emitted event.
    pub event_name: String,

    /// Unix seconds.
    #[serde(default)]
    pub timestamp: Option<i64>,

    /// Assigned severity, if any.
    #[serde(default, deserialize_with = "deserialize_severity")]
    pub severity: Option<Severity>,

    /// Whether the analysis flagged this event as a breach.
    #[serde(default)]
    pub breach_detected: bool,

    /// Suggested response.
    #[serde(default)]
    pub recommended_action: Option<String>,

    /// Opaque payload as recorded by the backend.
    #[serde(default)]
    pub raw_event: Option<Value>,
}

impl Event {
    /// The supplementary AI message carried in the raw payload, if any.
    pub fn ai_message(&self) -> Option<&str> {
        self.raw_event
            .as_ref()
            .and_then(|raw| raw.get("ai_message"))
            .and_then(Value::as_str)
            .filter(|message| !message.is_empty())
    }
}

/// Coarse relative time window for scoped event queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RangePreset {
    /// Last seven days.
    #[serde(rename = "1w")]
    OneWeek,
    /// Last thirty days.
    #[serde(rename = "1m")]
    OneMonth,
    /// Last ninety days.
    #[serde(rename = "3m")]
    ThreeMonths,
}

impl RangePreset {
    /// Value of the `range` query parameter.
    pub fn as_query_value(&self) -> &'static str {
        match self {
            RangePreset::OneWeek => "1w",
            RangePreset::OneMonth => "1m",
            RangePreset::ThreeMonths => "3m",
        }
    }
}

impl fmt::Display for RangePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query_value())
    }
}

impl FromStr for RangePreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1w" => Ok(RangePreset::OneWeek),
            "1m" => Ok(RangePreset::OneMonth),
            "3m" => Ok(RangePreset::ThreeMonths),
            other => Err(format!("unknown range '{other}', expected 1w, 1m or 3m")),
        }
    }
}

/// Which events the feed shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum EventScope {
    /// Events of every contract, newest first as returned by the backend.
    #[default]
    All,
    /// Events of a single contract, optionally limited to a time window.
    Contract {
        /// Contract identifier.
        id: String,
        /// Time window; `None` means all time.
        range: Option<RangePreset>,
    },
}

impl EventScope {
    /// Scope for a single contract.
    pub fn contract(id: impl Into<String>, range: Option<RangePreset>) -> Self {
        EventScope::Contract { id: id.into(), range }
    }
}

impl fmt::Display for EventScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventScope::All => write!(f, "all contracts"),
            EventScope::Contract { id, range: None } => write!(f, "contract {id}"),
            EventScope::Contract { id, range: Some(range) } => write!(f, "contract {id} ({range})"),
        }
    }
}
