//! Entries pushed by the backend over the log stream.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One operational log message.
///
/// Only the fields the tail renders are typed; anything else the backend
/// attaches (`contract_id`, `voice`, `ok`, ...) is kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Category tag, e.g. `event`, `activation`, `notify`.
    #[serde(rename = "type", default)]
    pub kind: String,

    /// Name of the event this message concerns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,

    /// Activation state after a toggle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,

    /// Network the message originated from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,

    /// Block height.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block: Option<u64>,

    /// Transaction id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txid: Option<String>,

    /// Breach flag of an ingested event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breach_detected: Option<bool>,

    /// Untyped remainder of the payload.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LogEntry {
    /// Parses a stream payload. Anything that is not a JSON object is
    /// rejected.
    pub fn parse(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }
}

/// Renders as `type · event · active=.. · net=.. · blk=.. · tx=.. · breach=..`
/// with absent parts omitted.
impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.kind)?;
        if let Some(event_name) = self.event_name.as_deref().filter(|s| !s.is_empty()) {
            write!(f, " · {event_name}")?;
        }
        if let Some(active) = self.active {
            write!(f, " · active={active}")?;
        }
        if let Some(network) = self.network.as_deref().filter(|s| !s.is_empty()) {
            write!(f, " · net={network}")?;
        }
        if let Some(block) = self.block.filter(|b| *b != 0) {
            write!(f, " · blk={block}")?;
        }
        if let Some(txid) = self.txid.as_deref().filter(|s| !s.is_empty()) {
            write!(f, " · tx={txid}")?;
        }
        if let Some(breach) = self.breach_detected {
            write!(f, " · breach={breach}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_unknown_fields() {
        let entry = LogEntry::parse(r#"{"type":"delete","contract_id":"c1","ok":true}"#).unwrap();
        assert_eq!(entry.kind, "delete");
        assert_eq!(entry.extra.get("contract_id"), Some(&Value::from("c1")));
        assert_eq!(entry.extra.get("ok"), Some(&Value::from(true)));
    }

    #[test]
    fn test_parse_rejects_malformed_and_non_object_payloads() {
        assert!(LogEntry::parse("{not json").is_err());
        assert!(LogEntry::parse("42").is_err());
    }

    #[test]
    fn test_display_full_entry() {
        let entry = LogEntry::parse(
            r#"{"type":"event","event_name":"Transfer","network":"testnet","block":812,
                "txid":"0xaa","breach_detected":false}"#,
        )
        .unwrap();
        assert_eq!(
            entry.to_string(),
            "event · Transfer · net=testnet · blk=812 · tx=0xaa · breach=false"
        );
    }

    #[test]
    fn test_display_omits_absent_parts() {
        let entry = LogEntry::parse(r#"{"type":"activation","active":true}"#).unwrap();
        assert_eq!(entry.to_string(), "activation · active=true");
    }
}
