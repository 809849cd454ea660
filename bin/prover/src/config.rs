use alloy_primitives::Address;
use ::config::{NetworkConfig, NetworkType};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level prover configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// L1 RPC endpoint url
    pub l1_rpc_url: String,

    /// L2 RPC endpoint url
    pub l2_rpc_url: String,

    /// Which network's contract addresses to use
    pub network: NetworkType,

    /// EOA address submitting prove/finalize transactions
    pub eoa_address: Address,

    /// Log actions without executing transactions
    #[serde(default)]
    pub dry_run: bool,
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;

        Ok(config)
    }

    pub const fn network_config(&self) -> NetworkConfig {
        NetworkConfig::from_network_type(self.network)
    }
}
