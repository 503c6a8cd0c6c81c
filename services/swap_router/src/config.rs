//! # Swap Router Configuration - Runtime Parameter Management
//!
//! ## Purpose
//!
//! Central parameter set for one engine: which chain and network it serves,
//! where the router, factory and wrapped native token live, which pools to
//! load, and how trades are bounded (slippage, hops, deadline, gas).
//!
//! ## Integration Points
//!
//! - **Input Sources**: JSON configuration file, `SWAP_ROUTER_*` environment variables
//! - **Output Destinations**: `SwapEngine` settings, `EthersChain`, token registry
//! - **Validation**: `validate()` runs before anything touches the chain; a
//!   malformed slippage tolerance is fatal here rather than per trade
//!
//! ## Architecture Role
//!
//! ```text
//! JSON file ──┐
//!             ├→ [RouterConfig] → validate() → EngineSettings / EthersChain
//! Env vars ───┘        ↓
//!               Default values
//! ```

use crate::error::ConfigError;
use crate::gas::{gwei_to_wei, GasParams, DEFAULT_GAS_PRICE_GWEI, DEFAULT_SWAP_GAS_LIMIT};
use ethers::types::Address;
use router_amm::Percent;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Smallest gas limit any transaction can have
const MIN_GAS_LIMIT: u64 = 21_000;

/// Complete configuration for one swap engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Chain name, half of the engine registry key (e.g. "ethereum")
    pub chain: String,
    /// Network name, other half of the registry key (e.g. "mainnet")
    pub network: String,
    pub chain_id: u64,
    /// Primary JSON-RPC endpoint
    pub rpc_url: String,
    /// Fallback endpoints for transaction submission
    pub backup_rpc_urls: Vec<String>,
    pub router_address: String,
    pub factory_address: String,
    /// Wrapped native token (WETH on Ethereum)
    pub wrapped_native: String,
    /// Uniswap-format token list file
    pub token_list_path: String,
    /// Direct pools to load, as "BASE-QUOTE"
    pub pools: Vec<String>,
    /// Percent literal ("0.5%") or fraction ("1/200")
    pub slippage_tolerance: String,
    pub max_hops: usize,
    /// Seconds until the on-chain deadline
    pub ttl_secs: u64,
    pub gas: GasConfig,
}

/// Gas settings as written in configuration (gwei)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GasConfig {
    pub gas_price_gwei: u64,
    pub max_fee_per_gas_gwei: Option<u64>,
    pub max_priority_fee_per_gas_gwei: Option<u64>,
    pub gas_limit: u64,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            chain: "ethereum".to_string(),
            network: "mainnet".to_string(),
            chain_id: 1,
            rpc_url: "https://eth.llamarpc.com".to_string(),
            backup_rpc_urls: Vec::new(),
            router_address: "0x7a250d5630B4cF539739dF2C5dAcb4c659F2488D".to_string(),
            factory_address: "0x5C69bEe701ef814a2B6a3EDD4B1652CB9cc5aA6f".to_string(),
            wrapped_native: "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2".to_string(),
            token_list_path: "./config/tokens.json".to_string(),
            pools: Vec::new(),
            slippage_tolerance: "1%".to_string(),
            max_hops: 3,
            ttl_secs: 300,
            gas: GasConfig::default(),
        }
    }
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            gas_price_gwei: DEFAULT_GAS_PRICE_GWEI,
            max_fee_per_gas_gwei: None,
            max_priority_fee_per_gas_gwei: None,
            gas_limit: DEFAULT_SWAP_GAS_LIMIT,
        }
    }
}

impl GasConfig {
    pub fn to_params(&self) -> GasParams {
        GasParams {
            gas_price_gwei: self.gas_price_gwei,
            max_fee_per_gas: self.max_fee_per_gas_gwei.map(gwei_to_wei),
            max_priority_fee_per_gas: self.max_priority_fee_per_gas_gwei.map(gwei_to_wei),
            gas_limit: self.gas_limit,
        }
    }
}

impl RouterConfig {
    /// Load configuration from a JSON file; missing fields take defaults
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Defaults with environment overrides applied
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    /// Override fields from `SWAP_ROUTER_*` variables when present and parseable
    pub fn apply_env_overrides(&mut self) {
        if let Ok(rpc_url) = std::env::var("SWAP_ROUTER_RPC_URL") {
            self.rpc_url = rpc_url;
        }

        if let Ok(network) = std::env::var("SWAP_ROUTER_NETWORK") {
            self.network = network;
        }

        if let Ok(slippage) = std::env::var("SWAP_ROUTER_SLIPPAGE") {
            self.slippage_tolerance = slippage;
        }

        if let Ok(pools) = std::env::var("SWAP_ROUTER_POOLS") {
            self.pools = pools
                .split(',')
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(String::from)
                .collect();
        }

        if let Ok(max_hops) = std::env::var("SWAP_ROUTER_MAX_HOPS") {
            if let Ok(value) = max_hops.parse::<usize>() {
                self.max_hops = value;
            }
        }

        if let Ok(ttl) = std::env::var("SWAP_ROUTER_TTL_SECS") {
            if let Ok(value) = ttl.parse::<u64>() {
                self.ttl_secs = value;
            }
        }

        if let Ok(gas_price) = std::env::var("SWAP_ROUTER_GAS_PRICE_GWEI") {
            if let Ok(value) = gas_price.parse::<u64>() {
                self.gas.gas_price_gwei = value;
            }
        }

        if let Ok(gas_limit) = std::env::var("SWAP_ROUTER_GAS_LIMIT") {
            if let Ok(value) = gas_limit.parse::<u64>() {
                self.gas.gas_limit = value;
            }
        }
    }

    /// Save configuration to a JSON file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Validate every parameter the engine depends on
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tolerance()?;
        self.router()?;
        self.factory()?;
        self.wrapped_native()?;

        if self.gas.gas_limit < MIN_GAS_LIMIT {
            return Err(ConfigError::InvalidValue {
                field: "gas_limit",
                reason: format!("{} is below {}", self.gas.gas_limit, MIN_GAS_LIMIT),
            });
        }

        if self.max_hops == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_hops",
                reason: "must be at least 1".to_string(),
            });
        }

        if self.ttl_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "ttl_secs",
                reason: "must be positive".to_string(),
            });
        }

        if self.rpc_url.parse::<url::Url>().is_err() {
            return Err(ConfigError::InvalidValue {
                field: "rpc_url",
                reason: format!("'{}' is not a URL", self.rpc_url),
            });
        }

        Ok(())
    }

    pub fn tolerance(&self) -> Result<Percent, ConfigError> {
        Ok(Percent::parse_percent(&self.slippage_tolerance)?)
    }

    pub fn router(&self) -> Result<Address, ConfigError> {
        parse_address("router_address", &self.router_address)
    }

    pub fn factory(&self) -> Result<Address, ConfigError> {
        parse_address("factory_address", &self.factory_address)
    }

    pub fn wrapped_native(&self) -> Result<Address, ConfigError> {
        parse_address("wrapped_native", &self.wrapped_native)
    }
}

fn parse_address(field: &'static str, value: &str) -> Result<Address, ConfigError> {
    match value.parse::<Address>() {
        Ok(address) if !address.is_zero() => Ok(address),
        _ => Err(ConfigError::InvalidAddress {
            field,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use router_amm::SlippageError;

    #[test]
    fn test_default_config_validation() {
        let config = RouterConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tolerance().unwrap(), Percent::new(1, 100).unwrap());
    }

    #[test]
    fn test_malformed_slippage_is_fatal() {
        let config = RouterConfig {
            slippage_tolerance: "half a percent".to_string(),
            ..RouterConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Slippage(SlippageError::InvalidTolerance(_)))
        ));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = RouterConfig::default();
        config.gas.gas_limit = 20_999;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "gas_limit", .. })
        ));

        let config = RouterConfig {
            max_hops: 0,
            ..RouterConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "max_hops", .. })
        ));

        let config = RouterConfig {
            router_address: "0x0000000000000000000000000000000000000000".to_string(),
            ..RouterConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidAddress { field: "router_address", .. })
        ));
    }

    #[test]
    fn test_gas_config_to_params() {
        let gas = GasConfig {
            max_priority_fee_per_gas_gwei: Some(2),
            ..GasConfig::default()
        };
        let params = gas.to_params();
        assert_eq!(params.max_fee_per_gas, None);
        assert_eq!(params.max_priority_fee_per_gas, Some(gwei_to_wei(2)));
        assert!(params.pricing().is_fee_cap());
    }

    #[test]
    fn test_env_override() {
        std::env::set_var("SWAP_ROUTER_SLIPPAGE", "0.5%");
        std::env::set_var("SWAP_ROUTER_POOLS", "WETH-USDC, DAI-USDC,");
        std::env::set_var("SWAP_ROUTER_MAX_HOPS", "not a number");

        let config = RouterConfig::from_env();

        assert_eq!(config.slippage_tolerance, "0.5%");
        assert_eq!(config.pools, vec!["WETH-USDC", "DAI-USDC"]);
        assert_eq!(config.max_hops, 3);

        // Cleanup
        std::env::remove_var("SWAP_ROUTER_SLIPPAGE");
        std::env::remove_var("SWAP_ROUTER_POOLS");
        std::env::remove_var("SWAP_ROUTER_MAX_HOPS");
    }
}
