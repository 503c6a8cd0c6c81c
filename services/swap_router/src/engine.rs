//! # Swap Engine - Quote and Execute Entry Point
//!
//! ## Purpose
//!
//! One engine per (chain, network). It owns the pool graph built at startup,
//! answers sell/buy quotes against a per-request snapshot of that graph, and
//! hands priced trades to the executor.
//!
//! ## Integration Points
//!
//! - **Input Sources**: pool specs from configuration, token resolution, chain reads
//! - **Output Destinations**: callers holding an `EngineRegistry` reference
//! - **Shared State**: the pool graph behind a `parking_lot::RwLock`; quotes
//!   only clone it, reserve refresh swaps pairs in under the write lock
//!
//! ## Architecture Role
//!
//! ```text
//! initialize(specs) → [load_pools] → PoolGraph (RwLock)
//!                                         ↓ clone
//! quote_sell / quote_buy → snapshot + fresh direct pair → [best trade] → Trade
//!                                                                          ↓
//! execute(request) ──────────────────────────────────────────→ [SwapExecutor]
//! ```

use crate::chain::{ChainReader, ChainSubmitter};
use crate::config::RouterConfig;
use crate::error::{ConfigError, RouterError};
use crate::executor::{ExecuteRequest, SubmittedTransaction, SwapExecutor};
use crate::nonce::NonceManager;
use crate::pool_loader::{load_pools, LoadSummary};
use crate::tokens::TokenResolver;
use crate::{log_pool, log_search, log_skip};
use ethers::types::Address;
use futures::future::join_all;
use parking_lot::RwLock;
use router_amm::{Pair, Percent, PoolGraph, Token, TokenAmount, Trade};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, warn};

/// Registry key: one engine per chain and network
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EngineKey {
    pub chain: String,
    pub network: String,
}

impl EngineKey {
    pub fn new(chain: impl Into<String>, network: impl Into<String>) -> Self {
        Self {
            chain: chain.into(),
            network: network.into(),
        }
    }
}

impl fmt::Display for EngineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.chain, self.network)
    }
}

/// Per-engine trading parameters
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub key: EngineKey,
    pub max_hops: usize,
    pub tolerance: Percent,
    pub wrapped_native: Address,
}

impl EngineSettings {
    pub fn from_config(config: &RouterConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            key: EngineKey::new(&config.chain, &config.network),
            max_hops: config.max_hops,
            tolerance: config.tolerance()?,
            wrapped_native: config.wrapped_native()?,
        })
    }
}

/// External services an engine depends on
#[derive(Clone)]
pub struct Collaborators {
    pub tokens: Arc<dyn TokenResolver>,
    pub reader: Arc<dyn ChainReader>,
    pub submitter: Arc<dyn ChainSubmitter>,
    pub nonces: Arc<dyn NonceManager>,
}

pub struct SwapEngine {
    settings: EngineSettings,
    tokens: Arc<dyn TokenResolver>,
    reader: Arc<dyn ChainReader>,
    executor: SwapExecutor,
    graph: RwLock<PoolGraph>,
    ready: OnceCell<LoadSummary>,
}

impl SwapEngine {
    pub fn new(settings: EngineSettings, collaborators: Collaborators) -> Self {
        let executor = SwapExecutor::new(
            collaborators.submitter,
            collaborators.nonces,
            settings.tolerance,
            settings.wrapped_native,
        );
        Self {
            settings,
            tokens: collaborators.tokens,
            reader: collaborators.reader,
            executor,
            graph: RwLock::new(PoolGraph::new()),
            ready: OnceCell::new(),
        }
    }

    pub fn key(&self) -> &EngineKey {
        &self.settings.key
    }

    /// Load the configured pools. Later calls return the first load's summary.
    pub async fn initialize(&self, pool_specs: &[String]) -> Result<LoadSummary, RouterError> {
        let summary = self
            .ready
            .get_or_try_init(|| async {
                info!("🚀 Initializing swap engine {}", self.settings.key);
                let (graph, summary) =
                    load_pools(pool_specs, self.tokens.as_ref(), self.reader.as_ref()).await?;
                *self.graph.write() = graph;
                Ok::<_, RouterError>(summary)
            })
            .await?;
        Ok(summary.clone())
    }

    pub fn is_ready(&self) -> bool {
        self.ready.initialized()
    }

    pub fn pool_count(&self) -> usize {
        self.graph.read().len()
    }

    /// Copy of the loaded pairs
    pub fn pools(&self) -> Vec<Pair> {
        self.graph.read().pairs().to_vec()
    }

    /// Best trade selling exactly `amount` of `base` for `quote`
    pub async fn quote_sell(
        &self,
        base: &str,
        quote: &str,
        amount: Decimal,
    ) -> Result<Trade, RouterError> {
        self.ensure_ready()?;
        let base = self.resolve(base).await?;
        let quote = self.resolve(quote).await?;
        let amount_in = TokenAmount::from_decimal(base.clone(), amount)?;

        let snapshot = self.snapshot_with_direct_pair(&base, &quote).await;
        log_search!(
            "Searching sell {} -> {} across {} pools",
            amount_in,
            quote,
            snapshot.len()
        );
        let trade = Trade::best_trade_exact_in(&snapshot, &amount_in, &quote, self.settings.max_hops)?;
        info!(
            "Quote sell {} -> {} via {:?}",
            trade.input_amount(),
            trade.output_amount(),
            trade.route().hop_descriptors()
        );
        Ok(trade)
    }

    /// Best trade buying exactly `amount` of `base`, paid in `quote`
    pub async fn quote_buy(
        &self,
        quote: &str,
        base: &str,
        amount: Decimal,
    ) -> Result<Trade, RouterError> {
        self.ensure_ready()?;
        let quote = self.resolve(quote).await?;
        let base = self.resolve(base).await?;
        let amount_out = TokenAmount::from_decimal(base.clone(), amount)?;

        let snapshot = self.snapshot_with_direct_pair(&quote, &base).await;
        log_search!(
            "Searching buy {} with {} across {} pools",
            amount_out,
            quote,
            snapshot.len()
        );
        let trade =
            Trade::best_trade_exact_out(&snapshot, &quote, &amount_out, self.settings.max_hops)?;
        info!(
            "Quote buy {} for {} via {:?}",
            trade.output_amount(),
            trade.input_amount(),
            trade.route().hop_descriptors()
        );
        Ok(trade)
    }

    pub async fn execute(
        &self,
        request: ExecuteRequest,
    ) -> Result<SubmittedTransaction, RouterError> {
        self.ensure_ready()?;
        self.executor.execute(request).await
    }

    /// `"SYM-SYM"` per hop, in trade direction
    pub fn trade_route(&self, trade: &Trade) -> Vec<String> {
        trade.route().hop_descriptors()
    }

    /// Re-fetch reserves of every loaded pair. Pairs that fail keep their
    /// previous reserves. Returns how many pairs were refreshed.
    pub async fn refresh_reserves(&self) -> Result<usize, RouterError> {
        self.ensure_ready()?;
        let pairs = self.pools();

        let fetches = pairs.iter().map(|pair| {
            self.reader
                .fetch_pair(pair.token0(), pair.token1(), pair.address())
        });
        let results = join_all(fetches).await;

        let mut fresh = Vec::with_capacity(pairs.len());
        for (pair, result) in pairs.iter().zip(results) {
            match result {
                Ok(updated) => fresh.push(updated.with_fee_bps(pair.fee_bps())),
                Err(e) => warn!("Keeping previous reserves for {}: {}", pair, e),
            }
        }

        let refreshed = fresh.len();
        {
            let mut graph = self.graph.write();
            for pair in fresh {
                graph.upsert(pair);
            }
        }
        log_pool!("Refreshed reserves for {}/{} pools", refreshed, pairs.len());
        Ok(refreshed)
    }

    fn ensure_ready(&self) -> Result<(), ConfigError> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(ConfigError::NotInitialized {
                key: self.settings.key.to_string(),
            })
        }
    }

    async fn resolve(&self, symbol: &str) -> Result<Token, RouterError> {
        self.tokens
            .resolve_symbol(symbol)
            .await
            .ok_or_else(|| RouterError::UnknownToken {
                symbol: symbol.to_string(),
            })
    }

    /// Clone of the graph with the direct pair for `a`/`b` re-fetched.
    ///
    /// The fresh pair only lives in the returned copy.
    async fn snapshot_with_direct_pair(&self, a: &Token, b: &Token) -> PoolGraph {
        let mut snapshot = self.graph.read().clone();

        let address = match self.reader.get_pair_address(a, b).await {
            Ok(address) if !address.is_zero() => address,
            Ok(_) => return snapshot,
            Err(e) => {
                log_skip!("Direct pair lookup {}-{} failed: {}", a, b, e);
                return snapshot;
            }
        };

        match self.reader.fetch_pair(a, b, address).await {
            Ok(pair) => snapshot.upsert(pair),
            Err(e) => log_skip!("Direct pair fetch {}-{} failed: {}", a, b, e),
        }
        snapshot
    }
}

/// Engines by (chain, network), built once at startup and shared by reference
#[derive(Default)]
pub struct EngineRegistry {
    engines: HashMap<EngineKey, Arc<SwapEngine>>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, engine: SwapEngine) -> Result<Arc<SwapEngine>, ConfigError> {
        let key = engine.key().clone();
        if self.engines.contains_key(&key) {
            return Err(ConfigError::DuplicateEngine {
                key: key.to_string(),
            });
        }
        let engine = Arc::new(engine);
        self.engines.insert(key, engine.clone());
        Ok(engine)
    }

    pub fn get(&self, chain: &str, network: &str) -> Result<Arc<SwapEngine>, ConfigError> {
        let key = EngineKey::new(chain, network);
        self.engines
            .get(&key)
            .cloned()
            .ok_or_else(|| ConfigError::NotInitialized {
                key: key.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}
