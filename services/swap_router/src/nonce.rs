//! Per-wallet nonce sequencing
//!
//! `NonceManager::next_nonce` only peeks; the sequence advances on
//! `commit_nonce` after a submission is accepted. Callers hold the wallet's
//! `WalletLocks` guard across peek, submit and commit, so two in-flight
//! executions for one wallet can never observe the same nonce while
//! different wallets never contend.

use crate::chain::ChainReader;
use crate::error::ChainError;
use async_trait::async_trait;
use dashmap::DashMap;
use ethers::types::{Address, U256};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

#[async_trait]
pub trait NonceManager: Send + Sync {
    /// Next unused nonce for `wallet`, without consuming it
    async fn next_nonce(&self, wallet: Address) -> Result<U256, ChainError>;

    /// Mark `nonce` as used; the next nonce becomes `nonce + 1`
    async fn commit_nonce(&self, wallet: Address, nonce: U256) -> Result<(), ChainError>;
}

/// In-process nonce tracking seeded from the chain's transaction count
pub struct LocalNonceManager {
    reader: Arc<dyn ChainReader>,
    next: DashMap<Address, U256>,
}

impl LocalNonceManager {
    pub fn new(reader: Arc<dyn ChainReader>) -> Self {
        Self {
            reader,
            next: DashMap::new(),
        }
    }
}

#[async_trait]
impl NonceManager for LocalNonceManager {
    async fn next_nonce(&self, wallet: Address) -> Result<U256, ChainError> {
        if let Some(next) = self.next.get(&wallet).map(|entry| *entry) {
            return Ok(next);
        }

        let count = self.reader.transaction_count(wallet).await?;
        debug!("Seeded nonce for {:?} from chain: {}", wallet, count);
        Ok(*self.next.entry(wallet).or_insert(count))
    }

    async fn commit_nonce(&self, wallet: Address, nonce: U256) -> Result<(), ChainError> {
        let following = nonce + U256::one();
        let mut entry = self.next.entry(wallet).or_insert(following);
        if *entry < following {
            *entry = following;
        }
        Ok(())
    }
}

/// One async mutex per wallet, created on first use
#[derive(Default)]
pub struct WalletLocks {
    locks: DashMap<Address, Arc<Mutex<()>>>,
}

impl WalletLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, wallet: Address) -> OwnedMutexGuard<()> {
        let lock = self.locks.entry(wallet).or_default().clone();
        lock.lock_owned().await
    }
}
