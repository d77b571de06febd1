//! This module defines the `Contract` structure, the backend's record of a
//! registered on-chain program and its latest analysis snapshot.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// The chain family a contract is deployed on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    /// Neo N3.
    #[default]
    Neo,
    /// Any EVM-compatible chain.
    Evm,
}

/// The network a contract is deployed on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Public test network.
    #[default]
    Testnet,
    /// Production network.
    Mainnet,
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Chain::Neo => write!(f, "neo"),
            Chain::Evm => write!(f, "evm"),
        }
    }
}

impl FromStr for Chain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "neo" => Ok(Chain::Neo),
            "evm" => Ok(Chain::Evm),
            other => Err(format!("unknown chain '{other}', expected neo or evm")),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Testnet => write!(f, "testnet"),
            Network::Mainnet => write!(f, "mainnet"),
        }
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "testnet" => Ok(Network::Testnet),
            "mainnet" => Ok(Network::Mainnet),
            other => Err(format!("unknown network '{other}', expected testnet or mainnet")),
        }
    }
}

/// A contract registered for monitoring.
///
/// Every field is owned by the backend. The client never edits a contract in
/// place; changes go through an action and come back with the next refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    /// Opaque identifier, stable for the contract's lifetime.
    #[serde(deserialize_with = "super::deserialize_id")]
    pub id: String,

    /// On-chain script hash or address.
    pub contract_hash: String,

    /// Human-readable name from the manifest, if the analysis found one.
    #[serde(default)]
    pub contract_name: Option<String>,

    /// Chain family.
    #[serde(default)]
    pub chain: Chain,

    /// Deployment network.
    #[serde(default)]
    pub network: Network,

    /// Whether monitoring is currently enabled.
    #[serde(default)]
    pub active: bool,

    /// Analysis risk score on a 0-10 scale.
    #[serde(default)]
    pub risk_level: Option<f64>,

    /// Attack surface categories identified by the analysis.
    #[serde(default)]
    pub breach_vectors: Vec<String>,

    /// Event names selected for alerting.
    #[serde(default)]
    pub monitoring_events: Vec<String>,

    /// Free-text analysis report.
    #[serde(default)]
    pub formatted_report: Option<String>,

    /// Contact address for notifications.
    #[serde(default)]
    pub owner_email: Option<String>,
}

impl Contract {
    /// The name to show for this contract, falling back to its hash.
    pub fn display_name(&self) -> &str {
        self.contract_name.as_deref().filter(|name| !name.is_empty()).unwrap_or(&self.contract_hash)
    }

    /// Returns the owner email if one is configured and non-blank.
    pub fn owner_email(&self) -> Option<&str> {
        self.owner_email.as_deref().map(str::trim).filter(|email| !email.is_empty())
    }
}
