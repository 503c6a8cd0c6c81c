//! # Ethers Chain Adapter - JSON-RPC Reads and Signed Submission
//!
//! ## Purpose
//!
//! Implements `ChainReader` and `ChainSubmitter` over an HTTP `Provider`.
//! Factory and pair reads are plain `eth_call`s encoded from human-readable
//! ABIs; router calls are signed locally with the caller's `LocalWallet` and
//! broadcast raw, falling back to backup endpoints in order.
//!
//! ## Architecture Role
//!
//! ```text
//! SwapEngine ──reads──→ [EthersChain] → getPair / getReserves / nonce → Primary RPC
//! SwapExecutor ─submit→ [EthersChain] → sign → send_raw_transaction → Primary → Backups
//! ```
//!
//! Transport failures (no JSON-RPC response at all) map to
//! `ChainError::Unavailable`; node-reported errors map to `Call` or `Rejected`.

use crate::chain::{ChainReader, ChainSubmitter, SubmitRequest};
use crate::config::RouterConfig;
use crate::error::ChainError;
use crate::gas::GasPricing;
use crate::logging::LogEmoji;
use crate::swap_call::ROUTER_ABI;
use anyhow::{Context, Result};
use async_trait::async_trait;
use ethers::abi::{parse_abi, Abi, Token as AbiToken};
use ethers::providers::{Http, Middleware, Provider, ProviderError, RpcError};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{
    Address, Bytes, Eip1559TransactionRequest, TransactionRequest, TxHash, U256,
};
use router_amm::{Pair, Token, TokenAmount};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

const FACTORY_ABI: &[&str] =
    &["function getPair(address tokenA, address tokenB) external view returns (address pair)"];

const PAIR_ABI: &[&str] = &[
    "function getReserves() external view returns (uint112 reserve0, uint112 reserve1, uint32 blockTimestampLast)",
];

pub struct EthersChain {
    chain_id: u64,
    factory: Address,
    primary: Arc<Provider<Http>>,
    backups: Vec<Arc<Provider<Http>>>,
    wallet: Option<LocalWallet>,
    factory_abi: Abi,
    pair_abi: Abi,
    router_abi: Abi,
}

impl EthersChain {
    /// Connect to the configured endpoints. Without a wallet the adapter is read-only.
    pub fn new(config: &RouterConfig, wallet: Option<LocalWallet>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(5)
            .tcp_keepalive(Duration::from_secs(60))
            .tcp_nodelay(true)
            .build()
            .context("Failed to create HTTP client")?;

        let provider = |rpc_url: &str| -> Result<Arc<Provider<Http>>> {
            let url: Url = rpc_url
                .parse()
                .with_context(|| format!("Invalid RPC URL {}", rpc_url))?;
            Ok(Arc::new(Provider::new(Http::new_with_client(
                url,
                http_client.clone(),
            ))))
        };

        let primary = provider(config.rpc_url.as_str())?;
        let backups = config
            .backup_rpc_urls
            .iter()
            .map(|url| provider(url.as_str()))
            .collect::<Result<Vec<_>>>()?;

        let wallet = wallet.map(|w| w.with_chain_id(config.chain_id));

        info!("{} Chain adapter for chain {}", LogEmoji::NETWORK, config.chain_id);
        info!("   - Primary RPC: {}", config.rpc_url);
        info!("   - Backup RPCs: {}", backups.len());
        info!(
            "   - Signer: {}",
            wallet
                .as_ref()
                .map(|w| format!("{:?}", w.address()))
                .unwrap_or_else(|| "none (read-only)".to_string())
        );

        Ok(Self {
            chain_id: config.chain_id,
            factory: config.factory()?,
            primary,
            backups,
            wallet,
            factory_abi: parse_abi(FACTORY_ABI).context("Invalid factory ABI")?,
            pair_abi: parse_abi(PAIR_ABI).context("Invalid pair ABI")?,
            router_abi: parse_abi(ROUTER_ABI).context("Invalid router ABI")?,
        })
    }

    async fn call(
        &self,
        abi: &Abi,
        contract: Address,
        method: &str,
        args: &[AbiToken],
    ) -> Result<Vec<AbiToken>, ChainError> {
        let function = abi.function(method).map_err(|e| encoding(method, e))?;
        let data = function.encode_input(args).map_err(|e| encoding(method, e))?;

        let tx: TypedTransaction = TransactionRequest::new()
            .to(contract)
            .data(Bytes::from(data))
            .into();
        let output = self
            .primary
            .call(&tx, None)
            .await
            .map_err(|e| classify(contract, e))?;

        function
            .decode_output(&output)
            .map_err(|e| ChainError::Call {
                contract,
                reason: format!("undecodable {} output: {}", method, e),
            })
    }

    fn build_transaction(
        &self,
        request: &SubmitRequest,
    ) -> Result<TypedTransaction, ChainError> {
        let method = request.call.method_name;
        let data = self
            .router_abi
            .function(method)
            .and_then(|function| function.encode_input(&request.call.args))
            .map_err(|e| encoding(method, e))?;

        let tx: TypedTransaction = match request.gas {
            GasPricing::Legacy { gas_price } => TransactionRequest::new()
                .from(request.from)
                .to(request.contract)
                .data(Bytes::from(data))
                .value(request.call.value)
                .gas(request.gas_limit)
                .gas_price(gas_price)
                .nonce(request.nonce)
                .chain_id(self.chain_id)
                .into(),
            GasPricing::FeeCap {
                max_fee_per_gas,
                max_priority_fee_per_gas,
            } => {
                let mut tx = Eip1559TransactionRequest::new()
                    .from(request.from)
                    .to(request.contract)
                    .data(Bytes::from(data))
                    .value(request.call.value)
                    .gas(request.gas_limit)
                    .nonce(request.nonce)
                    .chain_id(self.chain_id);
                if let Some(max_fee) = max_fee_per_gas {
                    tx = tx.max_fee_per_gas(max_fee);
                }
                if let Some(priority) = max_priority_fee_per_gas {
                    tx = tx.max_priority_fee_per_gas(priority);
                }
                tx.into()
            }
        };
        Ok(tx)
    }

    async fn broadcast(&self, raw_tx: Bytes) -> Result<TxHash, ChainError> {
        let mut last_error = match self.primary.send_raw_transaction(raw_tx.clone()).await {
            Ok(pending) => {
                debug!("Transaction accepted by primary RPC: 0x{:x}", pending.tx_hash());
                return Ok(pending.tx_hash());
            }
            Err(e) => {
                let error = classify_submission(e);
                if !error.is_unavailable() {
                    return Err(error);
                }
                warn!("Primary RPC failed: {}, trying backup providers...", error);
                error
            }
        };

        for (i, provider) in self.backups.iter().enumerate() {
            match provider.send_raw_transaction(raw_tx.clone()).await {
                Ok(pending) => {
                    info!(
                        "Transaction submitted via backup RPC {}: 0x{:x}",
                        i + 1,
                        pending.tx_hash()
                    );
                    return Ok(pending.tx_hash());
                }
                Err(e) => {
                    let error = classify_submission(e);
                    warn!("Backup RPC {} failed: {}", i + 1, error);
                    if !error.is_unavailable() {
                        return Err(error);
                    }
                    last_error = error;
                }
            }
        }

        Err(last_error)
    }
}

#[async_trait]
impl ChainReader for EthersChain {
    async fn get_pair_address(&self, a: &Token, b: &Token) -> Result<Address, ChainError> {
        let output = self
            .call(
                &self.factory_abi,
                self.factory,
                "getPair",
                &[AbiToken::Address(a.address), AbiToken::Address(b.address)],
            )
            .await?;

        match output.as_slice() {
            [AbiToken::Address(pair)] => Ok(*pair),
            other => Err(ChainError::Call {
                contract: self.factory,
                reason: format!("unexpected getPair output {:?}", other),
            }),
        }
    }

    async fn fetch_pair(&self, a: &Token, b: &Token, address: Address) -> Result<Pair, ChainError> {
        let output = self.call(&self.pair_abi, address, "getReserves", &[]).await?;
        let (reserve0, reserve1) = match output.as_slice() {
            [AbiToken::Uint(r0), AbiToken::Uint(r1), _] => (*r0, *r1),
            other => {
                return Err(ChainError::Call {
                    contract: address,
                    reason: format!("unexpected getReserves output {:?}", other),
                })
            }
        };

        let (token0, token1) = if a.sorts_before(b) { (a, b) } else { (b, a) };
        Pair::new(
            address,
            TokenAmount::new(token0.clone(), reserve0),
            TokenAmount::new(token1.clone(), reserve1),
        )
        .map_err(|e| ChainError::Call {
            contract: address,
            reason: e.to_string(),
        })
    }

    async fn transaction_count(&self, wallet: Address) -> Result<U256, ChainError> {
        self.primary
            .get_transaction_count(wallet, None)
            .await
            .map_err(|e| classify(wallet, e))
    }
}

#[async_trait]
impl ChainSubmitter for EthersChain {
    async fn submit(&self, request: SubmitRequest) -> Result<TxHash, ChainError> {
        let wallet = match &self.wallet {
            Some(wallet) if wallet.address() == request.from => wallet,
            Some(wallet) => {
                return Err(ChainError::Rejected {
                    reason: format!(
                        "signer is {:?}, request is from {:?}",
                        wallet.address(),
                        request.from
                    ),
                })
            }
            None => {
                return Err(ChainError::Rejected {
                    reason: "no signing wallet configured".to_string(),
                })
            }
        };

        let tx = self.build_transaction(&request)?;
        let signature = wallet
            .sign_transaction(&tx)
            .await
            .map_err(|e| ChainError::Rejected {
                reason: format!("signing failed: {}", e),
            })?;

        self.broadcast(tx.rlp_signed(&signature)).await
    }
}

fn encoding(method: &str, error: ethers::abi::Error) -> ChainError {
    ChainError::Encoding {
        method: method.to_string(),
        reason: error.to_string(),
    }
}

/// True when the node never produced a JSON-RPC response
fn is_transport_failure(error: &ProviderError) -> bool {
    match error {
        ProviderError::HTTPError(_) => true,
        ProviderError::JsonRpcClientError(e) => {
            e.as_error_response().is_none() && e.as_serde_error().is_none()
        }
        _ => false,
    }
}

fn classify(contract: Address, error: ProviderError) -> ChainError {
    if is_transport_failure(&error) {
        ChainError::Unavailable {
            reason: error.to_string(),
        }
    } else {
        ChainError::Call {
            contract,
            reason: error.to_string(),
        }
    }
}

fn classify_submission(error: ProviderError) -> ChainError {
    if is_transport_failure(&error) {
        ChainError::Unavailable {
            reason: error.to_string(),
        }
    } else {
        ChainError::Rejected {
            reason: error.to_string(),
        }
    }
}
