//! In-memory collaborators for engine and executor tests

#![allow(dead_code)]

use async_trait::async_trait;
use ethers::types::{Address, TxHash, U256};
use parking_lot::Mutex;
use router_amm::{Pair, Token, TokenAmount};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use swap_router::{
    ChainError, ChainReader, ChainSubmitter, Collaborators, EngineKey, EngineSettings,
    LocalNonceManager, SubmitRequest, SwapEngine, TokenRegistry,
};
use router_amm::Percent;

pub const E18: u64 = 1_000_000_000_000_000_000;

pub fn weth() -> Token {
    Token::new(1, Address::repeat_byte(0x0e), 18, "WETH", "Wrapped Ether")
}

pub fn usdc() -> Token {
    Token::new(1, Address::repeat_byte(0x0c), 18, "USDC", "USD Coin")
}

pub fn dai() -> Token {
    Token::new(1, Address::repeat_byte(0x0d), 18, "DAI", "Dai")
}

pub fn registry() -> TokenRegistry {
    TokenRegistry::new(1, vec![weth(), usdc(), dai()])
}

/// Raw amount of `whole` tokens with 18 decimals
pub fn units(whole: u64) -> U256 {
    U256::from(whole) * U256::from(E18)
}

fn key(a: &Token, b: &Token) -> (Address, Address) {
    if a.sorts_before(b) {
        (a.address, b.address)
    } else {
        (b.address, a.address)
    }
}

/// Factory + pair reads backed by a map of pools
#[derive(Default)]
pub struct MockChain {
    pools: Mutex<HashMap<(Address, Address), (Address, U256, U256)>>,
    unavailable: AtomicBool,
    pub pair_lookups: AtomicUsize,
    pub transaction_count: AtomicU64,
}

impl MockChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or re-price) a pool; reserves given in token `a`, `b` order
    pub fn set_pool(&self, address: Address, a: &Token, ra: U256, b: &Token, rb: U256) {
        let (r0, r1) = if a.sorts_before(b) { (ra, rb) } else { (rb, ra) };
        self.pools.lock().insert(key(a, b), (address, r0, r1));
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), ChainError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ChainError::Unavailable {
                reason: "connection refused".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ChainReader for MockChain {
    async fn get_pair_address(&self, a: &Token, b: &Token) -> Result<Address, ChainError> {
        self.check_available()?;
        self.pair_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .pools
            .lock()
            .get(&key(a, b))
            .map(|(address, _, _)| *address)
            .unwrap_or_else(Address::zero))
    }

    async fn fetch_pair(&self, a: &Token, b: &Token, address: Address) -> Result<Pair, ChainError> {
        self.check_available()?;
        let (known, r0, r1) = self
            .pools
            .lock()
            .get(&key(a, b))
            .copied()
            .ok_or_else(|| ChainError::Call {
                contract: address,
                reason: "no such pool".to_string(),
            })?;
        assert_eq!(known, address);

        let (t0, t1) = if a.sorts_before(b) { (a, b) } else { (b, a) };
        Pair::new(
            address,
            TokenAmount::new(t0.clone(), r0),
            TokenAmount::new(t1.clone(), r1),
        )
        .map_err(|e| ChainError::Call {
            contract: address,
            reason: e.to_string(),
        })
    }

    async fn transaction_count(&self, _wallet: Address) -> Result<U256, ChainError> {
        self.check_available()?;
        Ok(U256::from(self.transaction_count.load(Ordering::SeqCst)))
    }
}

/// Records submissions; outcomes are scripted, defaulting to success
#[derive(Default)]
pub struct MockSubmitter {
    pub submitted: Mutex<Vec<SubmitRequest>>,
    failures: Mutex<VecDeque<ChainError>>,
    delay: Option<Duration>,
    hashes: AtomicU64,
}

impl MockSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep inside each submission so concurrent executions interleave
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn fail_next(&self, error: ChainError) {
        self.failures.lock().push_back(error);
    }

    pub fn nonces(&self) -> Vec<U256> {
        self.submitted.lock().iter().map(|r| r.nonce).collect()
    }
}

#[async_trait]
impl ChainSubmitter for MockSubmitter {
    async fn submit(&self, request: SubmitRequest) -> Result<TxHash, ChainError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let failure = self.failures.lock().pop_front();
        if let Some(error) = failure {
            return Err(error);
        }
        self.submitted.lock().push(request);
        let n = self.hashes.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(TxHash::from_low_u64_be(n))
    }
}

pub struct Harness {
    pub engine: SwapEngine,
    pub chain: Arc<MockChain>,
    pub submitter: Arc<MockSubmitter>,
}

pub fn settings(max_hops: usize) -> EngineSettings {
    EngineSettings {
        key: EngineKey::new("ethereum", "testnet"),
        max_hops,
        tolerance: Percent::new(1, 100).unwrap(),
        wrapped_native: weth().address,
    }
}

pub fn harness(chain: MockChain, submitter: MockSubmitter) -> Harness {
    let chain = Arc::new(chain);
    let submitter = Arc::new(submitter);
    let engine = SwapEngine::new(
        settings(3),
        Collaborators {
            tokens: Arc::new(registry()),
            reader: chain.clone(),
            submitter: submitter.clone(),
            nonces: Arc::new(LocalNonceManager::new(chain.clone())),
        },
    );
    Harness {
        engine,
        chain,
        submitter,
    }
}

pub fn specs(entries: &[&str]) -> Vec<String> {
    entries.iter().map(|s| s.to_string()).collect()
}
