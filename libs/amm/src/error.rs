//! Error types for constant-product calculations and route search

use thiserror::Error;

/// Failures raised by the AMM math, pool graph and trade search
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmmError {
    #[error("Input amount must be positive")]
    InsufficientInputAmount,

    #[error("Output amount must be positive")]
    InsufficientOutputAmount,

    #[error("Insufficient liquidity: {reason}")]
    InsufficientLiquidity { reason: String },

    #[error("Fee of {fee_bps} bps is not below 10000")]
    InvalidFee { fee_bps: u32 },

    #[error("Arithmetic overflow in {context}")]
    Overflow { context: &'static str },

    #[error("Token {token} is not part of pair {pair}")]
    TokenNotInPair { token: String, pair: String },

    #[error("Invalid pair: {reason}")]
    InvalidPair { reason: String },

    #[error("Invalid route: {reason}")]
    InvalidRoute { reason: String },

    #[error("Invalid token amount: {reason}")]
    InvalidAmount { reason: String },

    #[error("No route found from {input} to {output}")]
    NoRoute { input: String, output: String },
}

/// Failures raised while parsing or applying a slippage tolerance
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlippageError {
    #[error("Invalid slippage tolerance '{0}': expected a value like \"0.5%\" or \"1/100\"")]
    InvalidTolerance(String),

    #[error("Slippage tolerance '{0}' must be between 0% and 100%")]
    OutOfRange(String),

    #[error(transparent)]
    Amm(#[from] AmmError),
}
