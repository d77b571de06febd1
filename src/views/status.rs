//! Backend health flags and operational counters.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    models::{HealthDetail, Metrics},
    transport::{Backend, TransportError},
};

/// Cached health and metrics, each replaced wholesale on refresh.
pub struct StatusPanel {
    backend: Arc<dyn Backend>,
    health: RwLock<Option<HealthDetail>>,
    metrics: RwLock<Metrics>,
}

impl StatusPanel {
    /// Creates an empty panel.
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend, health: RwLock::new(None), metrics: RwLock::new(Metrics::new()) }
    }

    /// Re-fetches the integration flags.
    pub async fn refresh_health(&self) -> Result<HealthDetail, TransportError> {
        let health = self.backend.health_detail().await?;
        *self.health.write().await = Some(health.clone());
        Ok(health)
    }

    /// Re-fetches the counters.
    pub async fn refresh_metrics(&self) -> Result<Metrics, TransportError> {
        let metrics = self.backend.metrics().await?;
        *self.metrics.write().await = metrics.clone();
        tracing::debug!(counters = metrics.len(), "Metrics refreshed");
        Ok(metrics)
    }

    /// Last fetched health flags, if any.
    pub async fn health(&self) -> Option<HealthDetail> {
        self.health.read().await.clone()
    }

    /// Last fetched counters.
    pub async fn metrics(&self) -> Metrics {
        self.metrics.read().await.clone()
    }
}
