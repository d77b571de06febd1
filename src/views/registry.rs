//! The cached list of registered contracts.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::{
    actions::{Confirm, RegisterForm, ValidationError},
    models::{Contract, RegisterContractResponse},
    transport::{Backend, TransportError},
};

/// Errors of registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The form was rejected before any network call.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The backend call failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Result of a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// The contract was deleted and the list refreshed.
    Removed,
    /// The user declined; nothing was sent.
    Cancelled,
}

/// Contracts as last returned by the backend.
pub struct ContractRegistry {
    backend: Arc<dyn Backend>,
    contracts: RwLock<Vec<Contract>>,
}

impl ContractRegistry {
    /// Creates an empty registry.
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend, contracts: RwLock::new(Vec::new()) }
    }

    /// Re-fetches the full list and replaces the cache. Entries missing from
    /// the response disappear.
    pub async fn refresh(&self) -> Result<usize, TransportError> {
        let contracts = self.backend.list_contracts().await?;
        let count = contracts.len();
        *self.contracts.write().await = contracts;
        tracing::debug!(count, "Contract registry refreshed");
        Ok(count)
    }

    /// A copy of the cached list.
    pub async fn contracts(&self) -> Vec<Contract> {
        self.contracts.read().await.clone()
    }

    /// The cached contract with `id`.
    pub async fn get(&self, id: &str) -> Option<Contract> {
        self.contracts.read().await.iter().find(|c| c.id == id).cloned()
    }

    /// Validates and submits a registration, then refreshes.
    pub async fn register(
        &self,
        form: &RegisterForm,
    ) -> Result<RegisterContractResponse, RegistryError> {
        let request = form.validate()?;
        let response = self.backend.register_contract(&request).await?;
        if let Err(e) = self.refresh().await {
            tracing::warn!(error = %e, "Registered contract but failed to refresh the registry");
        }
        Ok(response)
    }

    /// Requests a monitoring state change. The registry is refreshed
    /// afterwards whatever the outcome, so the cache shows the backend's
    /// state rather than the requested one.
    pub async fn set_active(&self, id: &str, active: bool) -> Result<Value, TransportError> {
        let result = self.backend.set_contract_active(id, active).await;
        if let Err(e) = self.refresh().await {
            tracing::warn!(contract_id = %id, error = %e, "Failed to refresh registry after activation");
        }
        result
    }

    /// Deletes a contract after the user confirms. A failed refresh after
    /// the delete is logged; the delete itself still counts.
    pub async fn remove(
        &self,
        id: &str,
        confirm: &dyn Confirm,
    ) -> Result<RemoveOutcome, TransportError> {
        if !confirm.confirm(&format!("Delete contract {id} and its events?")) {
            tracing::debug!(contract_id = %id, "Delete cancelled by user");
            return Ok(RemoveOutcome::Cancelled);
        }
        self.backend.delete_contract(id).await?;
        if let Err(e) = self.refresh().await {
            tracing::warn!(
                contract_id = %id,
                error = %e,
                "Deleted contract but failed to refresh the registry"
            );
        }
        Ok(RemoveOutcome::Removed)
    }
}
