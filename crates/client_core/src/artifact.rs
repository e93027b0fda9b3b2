use std::{collections::HashMap, path::PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use shared::{domain::Address, protocol::ContractMethod};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read contract artifact '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("malformed contract artifact: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("contract ABI is missing method '{0}'")]
    MissingMethod(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct AbiEntry {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "stateMutability", default)]
    pub state_mutability: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkDeployment {
    pub address: Address,
}

/// Build output describing the contract interface and where it is deployed,
/// keyed by network id.
#[derive(Debug, Clone, Deserialize)]
pub struct ContractArtifact {
    #[serde(rename = "contractName", default)]
    pub contract_name: String,
    pub abi: Vec<AbiEntry>,
    #[serde(default)]
    pub networks: HashMap<String, NetworkDeployment>,
}

impl ContractArtifact {
    pub fn from_json(raw: &str) -> Result<Self, ArtifactError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn deployment(&self, network_id: u64) -> Option<&NetworkDeployment> {
        self.networks.get(&network_id.to_string())
    }

    fn declares_function(&self, name: &str) -> bool {
        self.abi
            .iter()
            .any(|entry| entry.kind == "function" && entry.name.as_deref() == Some(name))
    }

    /// Fails on the first client method the ABI does not declare.
    pub fn ensure_client_methods(&self) -> Result<(), ArtifactError> {
        match ContractMethod::ALL
            .iter()
            .find(|method| !self.declares_function(method.name()))
        {
            Some(method) => Err(ArtifactError::MissingMethod(method.name().to_string())),
            None => Ok(()),
        }
    }
}

/// Where the artifact comes from. Loaded fresh on every connection.
#[async_trait]
pub trait ArtifactSource: Send + Sync {
    async fn load(&self) -> Result<ContractArtifact, ArtifactError>;
}

#[async_trait]
impl ArtifactSource for PathBuf {
    async fn load(&self) -> Result<ContractArtifact, ArtifactError> {
        let raw = tokio::fs::read_to_string(self)
            .await
            .map_err(|source| ArtifactError::Read {
                path: self.display().to_string(),
                source,
            })?;
        ContractArtifact::from_json(&raw)
    }
}

#[async_trait]
impl ArtifactSource for ContractArtifact {
    async fn load(&self) -> Result<ContractArtifact, ArtifactError> {
        Ok(self.clone())
    }
}

#[cfg(test)]
#[path = "tests/artifact_tests.rs"]
mod tests;
