//! Client-side validation of user input before anything is sent.

use std::{collections::BTreeMap, fmt, sync::LazyLock};

use regex::Regex;
use serde_json::{Map, Value};

use crate::models::{Chain, Contract, Network, RegisterContractRequest};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// Per-field validation failures, keyed by the backend's field names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationError {
    fields: BTreeMap<&'static str, String>,
}

impl ValidationError {
    fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.insert(field, message.into());
    }

    fn into_result(self) -> Result<(), ValidationError> {
        if self.fields.is_empty() { Ok(()) } else { Err(self) }
    }

    /// The message for `field`, if it failed.
    pub fn field(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// All failing fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.fields.iter().map(|(field, message)| (*field, message.as_str()))
    }

    /// Number of failing fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no field failed.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> =
            self.fields.iter().map(|(field, message)| format!("{field}: {message}")).collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationError {}

/// Input of the contract registration form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterForm {
    /// Required.
    pub contract_hash: String,
    /// Required; must look like an email address.
    pub owner_email: String,
    /// Optional ABI/manifest as JSON text.
    pub abi: String,
    /// Optional pre-signed transaction, passed through as is.
    pub raw_tx_hex: String,
    /// Deployment network.
    pub network: Network,
    /// Chain family.
    pub chain: Chain,
}

impl RegisterForm {
    /// Checks every field and, if all pass, builds the request body.
    ///
    /// All failing fields are reported together.
    pub fn validate(&self) -> Result<RegisterContractRequest, ValidationError> {
        let mut errors = ValidationError::default();

        let contract_hash = self.contract_hash.trim();
        if contract_hash.is_empty() {
            errors.add("contract_hash", "Contract hash is required");
        }

        let owner_email = self.owner_email.trim();
        if owner_email.is_empty() {
            errors.add("owner_email", "Owner email is required");
        } else if !EMAIL_RE.is_match(owner_email) {
            errors.add("owner_email", "Please enter a valid email address");
        }

        let abi = match self.abi.trim() {
            "" => None,
            text => match serde_json::from_str::<Value>(text) {
                Ok(abi) => Some(abi),
                Err(_) => {
                    errors.add("abi", "ABI must be valid JSON");
                    None
                }
            },
        };

        errors.into_result()?;

        let raw_tx_hex = Some(self.raw_tx_hex.trim()).filter(|hex| !hex.is_empty());
        Ok(RegisterContractRequest {
            contract_hash: Some(contract_hash.to_string()),
            abi,
            network: self.network,
            chain: self.chain,
            owner_email: owner_email.to_string(),
            raw_tx_hex: raw_tx_hex.map(str::to_string),
        })
    }
}

/// Checks an alert before it is sent to the owner of `contract`.
pub fn validate_alert(message: &str, contract: Option<&Contract>) -> Result<(), ValidationError> {
    let mut errors = ValidationError::default();
    if message.trim().is_empty() {
        errors.add("message", "Alert message is required");
    }
    match contract {
        None => errors.add("contract_id", "Contract not found"),
        Some(contract) if contract.owner_email().is_none() =>
            errors.add("owner_email", "Contract has no owner email configured"),
        Some(_) => {}
    }
    errors.into_result()
}

/// Checks the exit broadcast input.
pub fn validate_raw_tx(raw_tx_hex: &str) -> Result<(), ValidationError> {
    let mut errors = ValidationError::default();
    if raw_tx_hex.trim().is_empty() {
        errors.add("raw_tx_hex", "Raw transaction hex is required");
    }
    errors.into_result()
}

/// Best-effort parse of ABI text for the analysis endpoints.
///
/// Anything that is not a JSON object becomes `{}` and the request goes
/// ahead anyway.
pub fn lenient_abi(text: &str) -> Value {
    match serde_json::from_str::<Value>(text) {
        Ok(abi @ Value::Object(_)) => abi,
        Ok(_) | Err(_) => {
            tracing::debug!("ABI text is not a JSON object, sending an empty ABI");
            Value::Object(Map::new())
        }
    }
}
