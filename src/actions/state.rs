//! Per-action progress tracking.
//!
//! Every user action moves through `Idle -> Pending -> Succeeded | Failed`,
//! keyed by the action kind and its target, so two different contracts can
//! be toggled at once while a double submission of the same action is
//! refused.

use std::fmt;

use dashmap::{DashMap, mapref::entry::Entry};

/// The kinds of user-triggered actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Register a contract.
    Register,
    /// Activate or deactivate monitoring.
    SetActive,
    /// Delete a contract.
    Delete,
    /// Send a manual alert.
    SendAlert,
    /// Trigger one scan cycle.
    MonitorOnce,
    /// ABI risk analysis.
    AnalyzeAbi,
    /// Legal analysis.
    AnalyzeLegal,
    /// Exit transaction broadcast.
    ExitBroadcast,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ActionKind::Register => "register",
            ActionKind::SetActive => "set-active",
            ActionKind::Delete => "delete",
            ActionKind::SendAlert => "send-alert",
            ActionKind::MonitorOnce => "monitor-once",
            ActionKind::AnalyzeAbi => "analyze-abi",
            ActionKind::AnalyzeLegal => "analyze-legal",
            ActionKind::ExitBroadcast => "exit-broadcast",
        };
        f.write_str(label)
    }
}

/// An action kind plus the contract it targets, if any.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActionKey {
    /// What is being done.
    pub kind: ActionKind,
    /// Contract id for per-contract actions.
    pub target: Option<String>,
}

impl ActionKey {
    /// Key for an action without a target.
    pub fn global(kind: ActionKind) -> Self {
        Self { kind, target: None }
    }

    /// Key for an action on one contract.
    pub fn on(kind: ActionKind, target: impl Into<String>) -> Self {
        Self { kind, target: Some(target.into()) }
    }
}

impl fmt::Display for ActionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            Some(target) => write!(f, "{} {target}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

/// Where an action currently stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ActionStatus {
    /// Never run, or last run ended without changes.
    #[default]
    Idle,
    /// Running.
    Pending,
    /// Last run succeeded.
    Succeeded,
    /// Last run failed with this message.
    Failed(String),
}

/// Concurrent map of action statuses.
#[derive(Debug, Default)]
pub struct ActionTracker {
    statuses: DashMap<ActionKey, ActionStatus>,
}

impl ActionTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `key` pending. Returns `false` if it already is.
    pub fn begin(&self, key: &ActionKey) -> bool {
        match self.statuses.entry(key.clone()) {
            Entry::Occupied(mut entry) => {
                if *entry.get() == ActionStatus::Pending {
                    return false;
                }
                entry.insert(ActionStatus::Pending);
                true
            }
            Entry::Vacant(entry) => {
                entry.insert(ActionStatus::Pending);
                true
            }
        }
    }

    /// Records success of `key`.
    pub fn succeed(&self, key: &ActionKey) {
        self.statuses.insert(key.clone(), ActionStatus::Succeeded);
    }

    /// Returns `key` to idle.
    pub fn reset(&self, key: &ActionKey) {
        self.statuses.remove(key);
    }

    /// Records failure of `key`.
    pub fn fail(&self, key: &ActionKey, reason: impl Into<String>) {
        self.statuses.insert(key.clone(), ActionStatus::Failed(reason.into()));
    }

    /// Current status of `key`.
    pub fn status(&self, key: &ActionKey) -> ActionStatus {
        self.statuses.get(key).map(|status| status.clone()).unwrap_or_default()
    }

    /// Whether `key` is running.
    pub fn is_pending(&self, key: &ActionKey) -> bool {
        self.status(key) == ActionStatus::Pending
    }

    /// All running actions.
    pub fn pending(&self) -> Vec<ActionKey> {
        self.statuses
            .iter()
            .filter(|entry| *entry.value() == ActionStatus::Pending)
            .map(|entry| entry.key().clone())
            .collect()
    }
}
