//! The event list, scoped to all contracts or to one contract and range.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use thiserror::Error;
use tokio::sync::RwLock;

use crate::{
    models::{Event, EventScope},
    transport::{Backend, TransportError},
};

/// A failed load of the latest requested scope.
#[derive(Debug, Error)]
#[error("Failed to load events for {scope}: {source}")]
pub struct FeedError {
    /// The scope that was requested.
    pub scope: EventScope,
    /// Underlying transport failure.
    #[source]
    pub source: TransportError,
}

/// Outcome of a single refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The response was the latest and replaced the list.
    Applied {
        /// Number of events now shown.
        count: usize,
    },
    /// A newer refresh was issued while this one was in flight; its result
    /// was discarded.
    Superseded {
        /// Token of this request.
        token: u64,
        /// Latest token at the time the response arrived.
        latest: u64,
    },
}

/// Point-in-time copy of the feed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedSnapshot {
    /// The scope most recently requested.
    pub scope: EventScope,
    /// Events of the last applied response, in backend order.
    pub events: Vec<Event>,
    /// Whether the latest request is still outstanding.
    pub loading: bool,
    /// Token of the last applied response; 0 before the first.
    pub applied_token: u64,
    /// Scope `events` were loaded for; `None` while nothing is shown.
    pub applied_scope: Option<EventScope>,
}

/// Token-gated event list.
///
/// Every refresh takes a new token. A response is applied only while its
/// token is still the latest issued, so a slow response for an old scope can
/// never overwrite the result of a newer one.
pub struct EventFeed {
    backend: Arc<dyn Backend>,
    latest: AtomicU64,
    state: RwLock<FeedSnapshot>,
}

impl EventFeed {
    /// Creates an empty feed scoped to all contracts.
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend, latest: AtomicU64::new(0), state: RwLock::new(FeedSnapshot::default()) }
    }

    /// Fetches events for `scope` and replaces the list if no newer refresh
    /// was issued in the meantime.
    ///
    /// A failed load of a different scope than the one shown clears the list,
    /// so `events` always belong to `scope` or are empty.
    pub async fn refresh(&self, scope: EventScope) -> Result<RefreshOutcome, FeedError> {
        let token = {
            let mut state = self.state.write().await;
            let token = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
            state.scope = scope.clone();
            state.loading = true;
            token
        };
        tracing::debug!(token, %scope, "Loading events");

        let result = match &scope {
            EventScope::All => self.backend.list_events().await,
            EventScope::Contract { id, range } => self.backend.list_contract_events(id, *range).await,
        };

        let mut state = self.state.write().await;
        let latest = self.latest.load(Ordering::SeqCst);
        if token != latest {
            tracing::debug!(token, latest, %scope, "Discarding superseded events response");
            return Ok(RefreshOutcome::Superseded { token, latest });
        }

        state.loading = false;
        match result {
            Ok(events) => {
                let count = events.len();
                state.events = events;
                state.applied_token = token;
                state.applied_scope = Some(scope);
                Ok(RefreshOutcome::Applied { count })
            }
            Err(source) => {
                if state.applied_scope.as_ref() != Some(&scope) {
                    state.events.clear();
                    state.applied_scope = None;
                }
                Err(FeedError { scope, source })
            }
        }
    }

    /// Refreshes the scope most recently requested.
    pub async fn refresh_current(&self) -> Result<RefreshOutcome, FeedError> {
        let scope = self.state.read().await.scope.clone();
        self.refresh(scope).await
    }

    /// A copy of the current state.
    pub async fn snapshot(&self) -> FeedSnapshot {
        self.state.read().await.clone()
    }
}
