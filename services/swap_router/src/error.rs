//! Error taxonomy for the swap router service
//!
//! - `ConfigError`: misconfiguration, fatal to the affected operation
//! - `ChainError`: failures reported by the chain collaborators
//! - `RouterError`: what engine callers see

use ethers::types::Address;
use router_amm::{AmmError, SlippageError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid slippage tolerance: {0}")]
    Slippage(#[from] SlippageError),

    #[error("Invalid address for {field}: {value}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("Engine {key} is not initialized")]
    NotInitialized { key: String },

    #[error("Engine {key} is already registered")]
    DuplicateEngine { key: String },

    #[error("Invalid swap call: {reason}")]
    InvalidSwapCall { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// The node cannot be reached at all
    #[error("Chain unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Call to {contract:?} failed: {reason}")]
    Call { contract: Address, reason: String },

    #[error("ABI encoding failed for {method}: {reason}")]
    Encoding { method: String, reason: String },

    #[error("Transaction rejected: {reason}")]
    Rejected { reason: String },
}

impl ChainError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ChainError::Unavailable { .. })
    }
}

#[derive(Debug, Error)]
pub enum RouterError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Unknown token symbol: {symbol}")]
    UnknownToken { symbol: String },

    #[error("Price error: {0}")]
    Price(#[from] AmmError),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error("Execution failed at {stage}: {source}")]
    Execution {
        stage: &'static str,
        #[source]
        source: ChainError,
    },
}

impl RouterError {
    /// Request-scoped failures a caller may retry with other inputs
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RouterError::Price(_) | RouterError::UnknownToken { .. } | RouterError::Execution { .. }
        )
    }
}

impl From<SlippageError> for RouterError {
    fn from(err: SlippageError) -> Self {
        match err {
            SlippageError::Amm(amm) => RouterError::Price(amm),
            other => RouterError::Config(ConfigError::Slippage(other)),
        }
    }
}
