//! Network configuration for withdrawal proving.
//!
//! Provides chain-specific addresses and parameters for different networks
//! (mainnet, testnet, etc.). Contract addresses live here rather than as
//! literals scattered through the call sites.

use alloy_primitives::{address, Address};
use binding::rollup::MESSAGE_PASSER_ADDRESS;
use serde::{Deserialize, Serialize};

/// Network type (mainnet or testnet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkType {
    Mainnet,
    Testnet,
}

/// Ethereum (L1) network configuration.
///
/// The portal and output oracle are L1 contracts, so their addresses belong
/// to this side of the configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EthereumConfig {
    /// Chain ID
    pub chain_id: u64,
    /// OptimismPortal contract address (withdrawal proving/finalization)
    pub portal: Address,
    /// L2OutputOracle contract address (proposed output roots)
    pub output_oracle: Address,
    /// Block time in seconds (12 for Ethereum mainnet)
    pub block_time_secs: u64,
}

impl EthereumConfig {
    /// Ethereum mainnet configuration.
    pub const fn mainnet() -> Self {
        Self {
            chain_id: 1,
            // https://etherscan.io/address/0xc54cB22944F2bE476E02dECfCD7e3E7d3e15A8Fb
            portal: address!("0xc54cB22944F2bE476E02dECfCD7e3E7d3e15A8Fb"),
            // https://etherscan.io/address/0x31d543e7BE1dA6eFDc2206Ef7822879045B9f481
            output_oracle: address!("0x31d543e7BE1dA6eFDc2206Ef7822879045B9f481"),
            block_time_secs: 12,
        }
    }

    /// Ethereum Sepolia testnet configuration.
    pub const fn sepolia() -> Self {
        Self {
            chain_id: 11155111,
            portal: address!("0xB3db4bd5bc225930eD674494F9A4F6a11B8EFBc8"),
            output_oracle: address!("0x4121dc8e48Bc6196795eb4867772A5e259fecE07"),
            block_time_secs: 12,
        }
    }
}

/// Rollup (L2) network configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollupConfig {
    /// Chain ID
    pub chain_id: u64,
    /// L2ToL1MessagePasser predeploy address
    pub message_passer: Address,
    /// Block time in seconds
    pub block_time_secs: u64,
}

impl RollupConfig {
    /// Rollup mainnet configuration.
    pub const fn mainnet() -> Self {
        Self {
            chain_id: 5000,
            message_passer: MESSAGE_PASSER_ADDRESS,
            block_time_secs: 2,
        }
    }

    /// Rollup Sepolia testnet configuration.
    pub const fn sepolia() -> Self {
        Self {
            chain_id: 5003,
            message_passer: MESSAGE_PASSER_ADDRESS,
            block_time_secs: 2,
        }
    }
}

/// Complete network configuration for withdrawal proving.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Network type (mainnet or testnet)
    pub network_type: NetworkType,
    /// Ethereum/L1 configuration
    pub ethereum: EthereumConfig,
    /// Rollup/L2 configuration
    pub rollup: RollupConfig,
}

impl NetworkConfig {
    /// Create mainnet configuration.
    pub const fn mainnet() -> Self {
        Self {
            network_type: NetworkType::Mainnet,
            ethereum: EthereumConfig::mainnet(),
            rollup: RollupConfig::mainnet(),
        }
    }

    /// Create testnet (Sepolia) configuration.
    pub const fn sepolia() -> Self {
        Self {
            network_type: NetworkType::Testnet,
            ethereum: EthereumConfig::sepolia(),
            rollup: RollupConfig::sepolia(),
        }
    }

    /// Create configuration from network type.
    pub const fn from_network_type(network_type: NetworkType) -> Self {
        match network_type {
            NetworkType::Mainnet => Self::mainnet(),
            NetworkType::Testnet => Self::sepolia(),
        }
    }
}

/// Builder for custom network configurations (private devnets, forks).
#[derive(Debug, Clone)]
pub struct NetworkConfigBuilder {
    network_type: NetworkType,
    ethereum: EthereumConfig,
    rollup: RollupConfig,
}

impl NetworkConfigBuilder {
    /// Start with mainnet defaults.
    pub const fn mainnet() -> Self {
        Self {
            network_type: NetworkType::Mainnet,
            ethereum: EthereumConfig::mainnet(),
            rollup: RollupConfig::mainnet(),
        }
    }

    /// Start with testnet defaults.
    pub const fn testnet() -> Self {
        Self {
            network_type: NetworkType::Testnet,
            ethereum: EthereumConfig::sepolia(),
            rollup: RollupConfig::sepolia(),
        }
    }

    /// Override the OptimismPortal address.
    pub const fn portal(mut self, address: Address) -> Self {
        self.ethereum.portal = address;
        self
    }

    /// Override the L2OutputOracle address.
    pub const fn output_oracle(mut self, address: Address) -> Self {
        self.ethereum.output_oracle = address;
        self
    }

    /// Override the message passer predeploy address.
    pub const fn message_passer(mut self, address: Address) -> Self {
        self.rollup.message_passer = address;
        self
    }

    /// Build the network configuration.
    pub const fn build(self) -> NetworkConfig {
        NetworkConfig {
            network_type: self.network_type,
            ethereum: self.ethereum,
            rollup: self.rollup,
        }
    }
}
