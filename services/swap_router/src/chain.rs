//! Chain collaborator interfaces
//!
//! The engine never talks to a node directly. Reads (factory lookups, reserve
//! snapshots, transaction counts) go through `ChainReader`; signed submission
//! goes through `ChainSubmitter`. `EthersChain` implements both over JSON-RPC.

use crate::error::ChainError;
use crate::gas::GasPricing;
use crate::swap_call::SwapCallParameters;
use async_trait::async_trait;
use ethers::types::{Address, TxHash, U256};
use router_amm::{Pair, Token};

#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Factory pair address for two tokens; the zero address means no pool
    async fn get_pair_address(&self, a: &Token, b: &Token) -> Result<Address, ChainError>;

    /// Live reserves of the pool at `address`
    async fn fetch_pair(&self, a: &Token, b: &Token, address: Address)
        -> Result<Pair, ChainError>;

    /// Confirmed transaction count, used to seed nonces
    async fn transaction_count(&self, wallet: Address) -> Result<U256, ChainError>;
}

/// A router call ready to be signed and sent
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    pub from: Address,
    pub contract: Address,
    pub call: SwapCallParameters,
    pub gas: GasPricing,
    pub gas_limit: U256,
    pub nonce: U256,
}

#[async_trait]
pub trait ChainSubmitter: Send + Sync {
    async fn submit(&self, request: SubmitRequest) -> Result<TxHash, ChainError>;
}
