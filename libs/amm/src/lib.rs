//! # Router AMM Library - Constant-Product Pricing and Route Search
//!
//! ## Purpose
//!
//! Exact arithmetic for Uniswap V2 style pools and the best-trade search that
//! runs on top of it. Everything here is pure and synchronous: no RPC, no
//! clocks, no shared state. The swap router service feeds pool snapshots in
//! and gets priced `Trade`s and `SlippageBound`s back.
//!
//! ## Integration Points
//!
//! - **Input Sources**: `Pair` snapshots built from live reserves, `Token`
//!   identities from the token registry
//! - **Output Destinations**: swap router engine (quotes) and executor
//!   (slippage bounds for the on-chain call)
//! - **Precision**: raw `U256` token units end to end; `Decimal` only for
//!   reported prices
//!
//! ## Architecture Role
//!
//! ```text
//! Token + Reserves → [Pair / PoolGraph] → [find_paths] → [Trade pricing] → [SlippageBound]
//!        ↓                  ↓                   ↓                ↓                 ↓
//! TokenAmount          Adjacency by        Simple paths     x*y=k per hop     min out / max in
//! Raw U256 units       token address       ≤ max hops       ranked, sorted    for router call
//! ```

pub mod error;
pub mod pair;
pub mod pool_traits;
pub mod route;
pub mod slippage;
pub mod token;
pub mod trade;
pub mod v2_math;

pub use error::{AmmError, SlippageError};
pub use pair::{Pair, PoolGraph};
pub use pool_traits::AmmPool;
pub use route::Route;
pub use slippage::{slippage_bound, Percent, SlippageBound};
pub use token::{Token, TokenAmount};
pub use trade::{find_paths, Trade, TradeType};
pub use v2_math::{V2Math, V2PoolState};

/// Common types for AMM calculations
pub use ethers_core::types::{Address, U256};
pub use rust_decimal::Decimal;
pub use rust_decimal_macros::dec;
