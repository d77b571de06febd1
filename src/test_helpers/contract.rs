//! A builder for creating `Contract` instances in tests.

use crate::models::{Chain, Contract, Network};

/// A builder for creating `Contract` instances in tests.
pub struct ContractBuilder {
    contract: Contract,
}

impl ContractBuilder {
    /// Creates a builder for an inactive contract with the given id and a
    /// hash derived from it.
    pub fn new(id: &str) -> Self {
        ContractBuilder {
            contract: Contract {
                id: id.to_string(),
                contract_hash: format!("0x{id}"),
                contract_name: None,
                chain: Chain::Neo,
                network: Network::Testnet,
                active: false,
                risk_level: None,
                breach_vectors: Vec::new(),
                monitoring_events: Vec::new(),
                formatted_report: None,
                owner_email: None,
            },
        }
    }

    /// Sets the contract hash.
    pub fn hash(mut self, hash: &str) -> Self {
        self.contract.contract_hash = hash.to_string();
        self
    }

    /// Sets the contract name.
    pub fn name(mut self, name: &str) -> Self {
        self.contract.contract_name = Some(name.to_string());
        self
    }

    /// Sets the chain.
    pub fn chain(mut self, chain: Chain) -> Self {
        self.contract.chain = chain;
        self
    }

    /// Sets the network.
    pub fn network(mut self, network: Network) -> Self {
        self.contract.network = network;
        self
    }

    /// Sets whether monitoring is active.
    pub fn active(mut self, active: bool) -> Self {
        self.contract.active = active;
        self
    }

    /// Sets the risk level (0-10).
    pub fn risk_level(mut self, risk_level: f64) -> Self {
        self.contract.risk_level = Some(risk_level);
        self
    }

    /// Sets the owner email.
    pub fn owner_email(mut self, email: &str) -> Self {
        self.contract.owner_email = Some(email.to_string());
        self
    }

    /// Sets the breach vectors.
    pub fn breach_vectors(mut self, vectors: Vec<String>) -> Self {
        self.contract.breach_vectors = vectors;
        self
    }

    /// Builds the `Contract` instance.
    pub fn build(self) -> Contract {
        self.contract
    }
}
