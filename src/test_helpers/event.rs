//! A builder for creating `Event` instances in tests.

use serde_json::json;

use crate::models::{Event, Severity};

/// A builder for creating `Event` instances in tests.
pub struct EventBuilder {
    event: Event,
}

impl EventBuilder {
    /// Creates a builder for a non-breach `Transfer` event.
    pub fn new(id: &str) -> Self {
        EventBuilder {
            event: Event {
                id: id.to_string(),
                event_name: "Transfer".to_string(),
                timestamp: None,
                severity: None,
                breach_detected: false,
                recommended_action: None,
                raw_event: None,
            },
        }
    }

    /// Sets the event name.
    pub fn name(mut self, name: &str) -> Self {
        self.event.event_name = name.to_string();
        self
    }

    /// Sets the timestamp in unix seconds.
    pub fn timestamp(mut self, timestamp: i64) -> Self {
        self.event.timestamp = Some(timestamp);
        self
    }

    /// Sets the severity.
    pub fn severity(mut self, severity: Severity) -> Self {
        self.event.severity = Some(severity);
        self
    }

    /// Sets the breach flag.
    pub fn breach(mut self, breach: bool) -> Self {
        self.event.breach_detected = breach;
        self
    }

    /// Sets the recommended action.
    pub fn recommended_action(mut self, action: &str) -> Self {
        self.event.recommended_action = Some(action.to_string());
        self
    }

    /// Sets the AI message carried in the raw payload.
    pub fn ai_message(mut self, message: &str) -> Self {
        self.event.raw_event = Some(json!({ "ai_message": message }));
        self
    }

    /// Builds the `Event` instance.
    pub fn build(self) -> Event {
        self.event
    }
}
