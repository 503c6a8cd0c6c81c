//! # Swap Executor - Router Transaction Submission
//!
//! ## Purpose
//!
//! Converts a quoted trade into a submitted router transaction: slippage bound,
//! deadline, router method and arguments, gas pricing mode, and a nonce that
//! is never handed to two in-flight executions for the same wallet.
//!
//! ## Integration Points
//!
//! - **Input Sources**: `Trade` from the engine's quote path, caller gas settings
//! - **Output Destinations**: `ChainSubmitter` (signing and broadcast)
//! - **Nonce Sequencing**: `NonceManager` peek → submit → commit under a per-wallet lock
//!
//! ## Architecture Role
//!
//! ```text
//! Quoted Trade → [Slippage Bound] → [Router Call] → [Gas Mode] → [Nonce] → [Submit] → [Commit]
//!      ↓               ↓                 ↓              ↓            ↓          ↓          ↓
//!  route+amounts   min out/max in    method, args,   Legacy or    wallet lock  tx hash   only on
//!                                    value, deadline FeeCap       held ──────────────→  success
//! ```
//!
//! A failed submission releases the wallet lock without committing, so the
//! next execution for that wallet reuses the same nonce.

use crate::chain::{ChainSubmitter, SubmitRequest};
use crate::error::RouterError;
use crate::gas::{GasParams, GasPricing};
use crate::nonce::{NonceManager, WalletLocks};
use crate::swap_call::{NativeLeg, SwapCallParameters, SwapOptions};
use crate::{log_error, log_execution, log_gas, log_success};
use ethers::types::{Address, TxHash, U256};
use router_amm::{slippage_bound, Percent, Trade};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// One execution attempt
#[derive(Debug, Clone)]
pub struct ExecuteRequest {
    pub wallet: Address,
    pub trade: Trade,
    pub gas: GasParams,
    pub router: Address,
    pub ttl_secs: u64,
    /// Explicit nonce; when absent the nonce manager supplies one
    pub nonce: Option<U256>,
    /// Defaults to `wallet`
    pub recipient: Option<Address>,
    pub native: NativeLeg,
}

impl ExecuteRequest {
    pub fn new(wallet: Address, trade: Trade, router: Address, ttl_secs: u64) -> Self {
        Self {
            wallet,
            trade,
            gas: GasParams::default(),
            router,
            ttl_secs,
            nonce: None,
            recipient: None,
            native: NativeLeg::None,
        }
    }

    pub fn with_gas(mut self, gas: GasParams) -> Self {
        self.gas = gas;
        self
    }

    pub fn with_nonce(mut self, nonce: U256) -> Self {
        self.nonce = Some(nonce);
        self
    }

    pub fn with_native(mut self, native: NativeLeg) -> Self {
        self.native = native;
        self
    }
}

/// Handle of an accepted submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedTransaction {
    pub hash: TxHash,
    pub nonce: U256,
    pub method_name: &'static str,
    pub gas: GasPricing,
    pub deadline: u64,
}

pub struct SwapExecutor {
    submitter: Arc<dyn ChainSubmitter>,
    nonces: Arc<dyn NonceManager>,
    locks: WalletLocks,
    tolerance: Percent,
    wrapped_native: Address,
}

impl SwapExecutor {
    pub fn new(
        submitter: Arc<dyn ChainSubmitter>,
        nonces: Arc<dyn NonceManager>,
        tolerance: Percent,
        wrapped_native: Address,
    ) -> Self {
        Self {
            submitter,
            nonces,
            locks: WalletLocks::new(),
            tolerance,
            wrapped_native,
        }
    }

    pub fn tolerance(&self) -> Percent {
        self.tolerance
    }

    pub async fn execute(
        &self,
        request: ExecuteRequest,
    ) -> Result<SubmittedTransaction, RouterError> {
        let trade = &request.trade;
        debug!(
            "Quoted: {} -> {} via {} hop(s)",
            trade.input_amount(),
            trade.output_amount(),
            trade.route().hops()
        );

        let deadline = unix_now() + request.ttl_secs;
        let bound = slippage_bound(trade, &self.tolerance)?;
        let call = SwapCallParameters::build(
            trade,
            &SwapOptions {
                recipient: request.recipient.unwrap_or(request.wallet),
                deadline,
                bound: bound.clone(),
                native: request.native,
                wrapped_native: self.wrapped_native,
            },
        )?;
        let gas = request.gas.pricing();
        debug!(
            "Built: {} with {}, value {}, deadline {}",
            call.method_name, bound, call.value, deadline
        );
        log_gas!("Gas pricing for {}: {}", call.method_name, gas);

        let _guard = self.locks.lock(request.wallet).await;

        let nonce = match request.nonce {
            Some(nonce) => nonce,
            None => self
                .nonces
                .next_nonce(request.wallet)
                .await
                .map_err(|source| RouterError::Execution {
                    stage: "nonce",
                    source,
                })?,
        };

        let method_name = call.method_name;
        log_execution!(
            "Submitting {} for {:?} with nonce {}",
            method_name,
            request.wallet,
            nonce
        );

        let submitted = self
            .submitter
            .submit(SubmitRequest {
                from: request.wallet,
                contract: request.router,
                call,
                gas,
                gas_limit: U256::from(request.gas.gas_limit),
                nonce,
            })
            .await;

        let hash = match submitted {
            Ok(hash) => hash,
            Err(source) => {
                log_error!(
                    "Submission of {} with nonce {} failed: {}",
                    method_name,
                    nonce,
                    source
                );
                return Err(RouterError::Execution {
                    stage: "submit",
                    source,
                });
            }
        };

        self.nonces
            .commit_nonce(request.wallet, nonce)
            .await
            .map_err(|source| RouterError::Execution {
                stage: "commit",
                source,
            })?;

        log_success!("Submitted: {} nonce {} tx 0x{:x}", method_name, nonce, hash);
        Ok(SubmittedTransaction {
            hash,
            nonce,
            method_name,
            gas,
            deadline,
        })
    }
}

fn unix_now() -> u64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(elapsed) => elapsed.as_secs(),
        Err(e) => {
            tracing::error!("System clock is before the unix epoch: {}", e);
            0
        }
    }
}
