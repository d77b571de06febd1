use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{
    deserialize_duration_from_ms, deserialize_duration_from_seconds, serialize_duration_to_ms,
    serialize_duration_to_seconds,
};

fn default_capacity() -> usize {
    100
}

fn default_max_attempts() -> u32 {
    5
}

fn default_initial_backoff() -> Duration {
    Duration::from_millis(500)
}

fn default_max_backoff() -> Duration {
    Duration::from_secs(30)
}

/// Reconnect behavior of the live log tail after the stream drops.
///
/// Setting `max_attempts` to zero disables reconnection entirely: the first
/// transport error leaves the tail disconnected for good.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Number of consecutive reconnect attempts before giving up.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first reconnect attempt.
    #[serde(
        default = "default_initial_backoff",
        deserialize_with = "deserialize_duration_from_ms",
        serialize_with = "serialize_duration_to_ms"
    )]
    pub initial_backoff_ms: Duration,

    /// Ceiling for the doubled delay.
    #[serde(
        default = "default_max_backoff",
        deserialize_with = "deserialize_duration_from_seconds",
        serialize_with = "serialize_duration_to_seconds"
    )]
    pub max_backoff_secs: Duration,
}

impl ReconnectPolicy {
    /// A policy that never reconnects.
    pub fn disabled() -> Self {
        Self { max_attempts: 0, ..Default::default() }
    }

    /// Returns the delay to wait before reconnect attempt number `attempt`
    /// (1-based), or `None` once the attempts are exhausted.
    pub fn backoff_for(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt > self.max_attempts {
            return None;
        }
        let factor = 2u32.saturating_pow(attempt - 1);
        let delay = self.initial_backoff_ms.saturating_mul(factor);
        Some(delay.min(self.max_backoff_secs))
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_secs: default_max_backoff(),
        }
    }
}

/// Configuration for the live log tail.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct LogTailConfig {
    /// Number of most recent entries kept in the rolling buffer.
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Reconnect policy applied when the stream ends or fails.
    #[serde(default)]
    pub reconnect: ReconnectPolicy,
}

impl Default for LogTailConfig {
    fn default() -> Self {
        Self { capacity: default_capacity(), reconnect: ReconnectPolicy::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_until_capped() {
        let policy = ReconnectPolicy {
            max_attempts: 10,
            initial_backoff_ms: Duration::from_millis(500),
            max_backoff_secs: Duration::from_secs(3),
        };
        assert_eq!(policy.backoff_for(1), Some(Duration::from_millis(500)));
        assert_eq!(policy.backoff_for(2), Some(Duration::from_millis(1000)));
        assert_eq!(policy.backoff_for(3), Some(Duration::from_millis(2000)));
        assert_eq!(policy.backoff_for(4), Some(Duration::from_secs(3)));
        assert_eq!(policy.backoff_for(10), Some(Duration::from_secs(3)));
        assert_eq!(policy.backoff_for(11), None);
    }

    #[test]
    fn test_disabled_policy_never_reconnects() {
        let policy = ReconnectPolicy::disabled();
        assert_eq!(policy.backoff_for(1), None);
    }

    #[test]
    fn test_large_attempt_does_not_overflow() {
        let policy = ReconnectPolicy { max_attempts: u32::MAX, ..Default::default() };
        assert_eq!(policy.backoff_for(64), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_log_tail_config_defaults() {
        let config: LogTailConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.capacity, 100);
        assert_eq!(config.reconnect.max_attempts, 5);
    }
}
