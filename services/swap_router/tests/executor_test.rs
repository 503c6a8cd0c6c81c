//! Execution: call construction, gas modes and nonce sequencing

mod common;

use common::*;
use ethers::abi::Token as AbiToken;
use ethers::types::{Address, U256};
use futures::future::join_all;
use router_amm::Trade;
use rust_decimal_macros::dec;
use std::collections::HashSet;
use std::sync::atomic::Ordering;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use swap_router::gas::gwei_to_wei;
use swap_router::{
    ChainError, ConfigError, ExecuteRequest, GasParams, GasPricing, NativeLeg, RouterError,
};

const TTL: u64 = 300;

fn router() -> Address {
    Address::repeat_byte(0x77)
}

fn wallet(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

async fn ready(submitter: MockSubmitter) -> Harness {
    let chain = MockChain::new();
    chain.set_pool(Address::repeat_byte(0xa1), &weth(), units(1000), &usdc(), units(1000));
    chain.transaction_count.store(5, Ordering::SeqCst);
    let h = harness(chain, submitter);
    h.engine.initialize(&specs(&["WETH-USDC"])).await.unwrap();
    h
}

async fn sell(h: &Harness) -> Trade {
    h.engine.quote_sell("WETH", "USDC", dec!(10)).await.unwrap()
}

#[tokio::test]
async fn test_sell_builds_exact_tokens_call() {
    let h = ready(MockSubmitter::new()).await;
    let trade = sell(&h).await;
    let before = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs();

    let submitted = h
        .engine
        .execute(ExecuteRequest::new(wallet(1), trade.clone(), router(), TTL))
        .await
        .unwrap();

    assert_eq!(submitted.method_name, "swapExactTokensForTokens");
    assert_eq!(submitted.nonce, U256::from(5u64));
    assert!(submitted.deadline >= before + TTL);

    let requests = h.submitter.submitted.lock();
    let request = &requests[0];
    assert_eq!(request.contract, router());
    assert_eq!(request.from, wallet(1));
    assert_eq!(request.call.value, U256::zero());

    // 1% tolerance: minimum out = floor(out * 99 / 100)
    let min_out = trade.output_amount().raw * U256::from(99u64) / U256::from(100u64);
    assert_eq!(request.call.args[0], AbiToken::Uint(units(10)));
    assert_eq!(request.call.args[1], AbiToken::Uint(min_out));
    assert_eq!(request.call.args[3], AbiToken::Address(wallet(1)));
}

#[tokio::test]
async fn test_native_input_attaches_value() {
    let h = ready(MockSubmitter::new()).await;
    let trade = sell(&h).await;

    let submitted = h
        .engine
        .execute(
            ExecuteRequest::new(wallet(1), trade, router(), TTL).with_native(NativeLeg::Input),
        )
        .await
        .unwrap();

    assert_eq!(submitted.method_name, "swapExactETHForTokens");
    assert_eq!(h.submitter.submitted.lock()[0].call.value, units(10));
}

#[tokio::test]
async fn test_misconfigured_native_leg_is_rejected_before_nonce() {
    let h = ready(MockSubmitter::new()).await;
    let trade = sell(&h).await;

    let result = h
        .engine
        .execute(
            ExecuteRequest::new(wallet(1), trade, router(), TTL).with_native(NativeLeg::Output),
        )
        .await;

    assert!(matches!(
        result,
        Err(RouterError::Config(ConfigError::InvalidSwapCall { .. }))
    ));
    assert!(h.submitter.submitted.lock().is_empty());
}

#[tokio::test]
async fn test_buy_uses_maximum_in() {
    let h = ready(MockSubmitter::new()).await;
    let trade = h.engine.quote_buy("USDC", "WETH", dec!(5)).await.unwrap();
    let max_in = trade.input_amount().raw * U256::from(101u64) / U256::from(100u64);

    let submitted = h
        .engine
        .execute(ExecuteRequest::new(wallet(1), trade, router(), TTL))
        .await
        .unwrap();

    assert_eq!(submitted.method_name, "swapTokensForExactTokens");
    let requests = h.submitter.submitted.lock();
    assert_eq!(requests[0].call.args[0], AbiToken::Uint(units(5)));
    assert_eq!(requests[0].call.args[1], AbiToken::Uint(max_in));
}

#[tokio::test]
async fn test_gas_modes_are_exclusive() {
    let h = ready(MockSubmitter::new()).await;
    let trade = sell(&h).await;

    let legacy = h
        .engine
        .execute(
            ExecuteRequest::new(wallet(1), trade.clone(), router(), TTL)
                .with_gas(GasParams::legacy(42, 250_000)),
        )
        .await
        .unwrap();
    assert_eq!(
        legacy.gas,
        GasPricing::Legacy {
            gas_price: U256::from(42_000_000_000u64)
        }
    );

    let fee_cap = h
        .engine
        .execute(
            ExecuteRequest::new(wallet(1), trade, router(), TTL).with_gas(GasParams::fee_cap(
                Some(gwei_to_wei(80)),
                None,
                250_000,
            )),
        )
        .await
        .unwrap();
    assert_eq!(
        fee_cap.gas,
        GasPricing::FeeCap {
            max_fee_per_gas: Some(gwei_to_wei(80)),
            max_priority_fee_per_gas: None,
        }
    );

    let requests = h.submitter.submitted.lock();
    assert_eq!(requests[1].gas, fee_cap.gas);
    assert_eq!(requests[1].gas_limit, U256::from(250_000u64));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_executions_get_distinct_nonces() {
    let h = ready(MockSubmitter::with_delay(Duration::from_millis(10))).await;
    let trade = sell(&h).await;

    let executions = (0..8).map(|_| {
        h.engine
            .execute(ExecuteRequest::new(wallet(1), trade.clone(), router(), TTL))
    });
    let results = join_all(executions).await;

    let nonces: HashSet<U256> = results
        .into_iter()
        .map(|result| result.unwrap().nonce)
        .collect();
    let expected: HashSet<U256> = (5u64..13).map(U256::from).collect();
    assert_eq!(nonces, expected);
    assert_eq!(h.submitter.nonces().len(), 8);
}

#[tokio::test]
async fn test_wallets_do_not_share_nonces() {
    let h = ready(MockSubmitter::with_delay(Duration::from_millis(5))).await;
    let trade = sell(&h).await;

    let (a, b) = tokio::join!(
        h.engine
            .execute(ExecuteRequest::new(wallet(1), trade.clone(), router(), TTL)),
        h.engine
            .execute(ExecuteRequest::new(wallet(2), trade.clone(), router(), TTL)),
    );

    assert_eq!(a.unwrap().nonce, U256::from(5u64));
    assert_eq!(b.unwrap().nonce, U256::from(5u64));
}

#[tokio::test]
async fn test_failed_submission_releases_nonce() {
    let h = ready(MockSubmitter::new()).await;
    let trade = sell(&h).await;
    h.submitter.fail_next(ChainError::Rejected {
        reason: "execution reverted".to_string(),
    });

    let failed = h
        .engine
        .execute(ExecuteRequest::new(wallet(1), trade.clone(), router(), TTL))
        .await;
    match failed {
        Err(RouterError::Execution { stage, source }) => {
            assert_eq!(stage, "submit");
            assert!(matches!(source, ChainError::Rejected { .. }));
        }
        other => panic!("expected execution error, got {other:?}"),
    }

    let retried = h
        .engine
        .execute(ExecuteRequest::new(wallet(1), trade.clone(), router(), TTL))
        .await
        .unwrap();
    assert_eq!(retried.nonce, U256::from(5u64));

    let next = h
        .engine
        .execute(ExecuteRequest::new(wallet(1), trade, router(), TTL))
        .await
        .unwrap();
    assert_eq!(next.nonce, U256::from(6u64));
    assert_eq!(h.submitter.nonces(), vec![U256::from(5u64), U256::from(6u64)]);
}

#[tokio::test]
async fn test_explicit_nonce_is_used_and_committed() {
    let h = ready(MockSubmitter::new()).await;
    let trade = sell(&h).await;

    let explicit = h
        .engine
        .execute(
            ExecuteRequest::new(wallet(1), trade.clone(), router(), TTL)
                .with_nonce(U256::from(42u64)),
        )
        .await
        .unwrap();
    assert_eq!(explicit.nonce, U256::from(42u64));

    let next = h
        .engine
        .execute(ExecuteRequest::new(wallet(1), trade, router(), TTL))
        .await
        .unwrap();
    assert_eq!(next.nonce, U256::from(43u64));
}
