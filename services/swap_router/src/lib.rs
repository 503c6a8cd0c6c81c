//! # Swap Router Service
//!
//! ## Purpose
//!
//! Quotes and executes swaps against Uniswap V2 style pools. Pools named in
//! configuration are resolved and loaded once per (chain, network) engine;
//! quotes search the loaded graph for the best multi-hop route; executions
//! bound the trade by the slippage tolerance and submit a signed router call
//! with serialized per-wallet nonces.
//!
//! ## Integration Points
//!
//! - **Input Sources**: `RouterConfig`, token list file, JSON-RPC node
//! - **Output Destinations**: router contract transactions
//! - **Collaborators**: `TokenResolver`, `ChainReader`, `ChainSubmitter`,
//!   `NonceManager` traits; `EthersChain` backs the chain side in production
//!
//! ## Architecture Role
//!
//! ```text
//! RouterConfig → [EngineRegistry] → SwapEngine ─initialize→ [pool_loader] → PoolGraph
//!                                      │
//!                                      ├─quote_sell / quote_buy→ router_amm search → Trade
//!                                      │
//!                                      └─execute→ [SwapExecutor] → gas + nonce → ChainSubmitter
//! ```

pub mod chain;
pub mod config;
pub mod engine;
pub mod error;
pub mod ethers_chain;
pub mod executor;
pub mod gas;
pub mod logging;
pub mod nonce;
pub mod pool_loader;
pub mod swap_call;
pub mod tokens;

pub use chain::{ChainReader, ChainSubmitter, SubmitRequest};
pub use config::{GasConfig, RouterConfig};
pub use engine::{Collaborators, EngineKey, EngineRegistry, EngineSettings, SwapEngine};
pub use error::{ChainError, ConfigError, RouterError};
pub use ethers_chain::EthersChain;
pub use executor::{ExecuteRequest, SubmittedTransaction, SwapExecutor};
pub use gas::{GasParams, GasPricing};
pub use nonce::{LocalNonceManager, NonceManager, WalletLocks};
pub use pool_loader::{load_pools, LoadSummary, PoolSpec};
pub use swap_call::{NativeLeg, SwapCallParameters, SwapOptions};
pub use tokens::{TokenRegistry, TokenResolver};
