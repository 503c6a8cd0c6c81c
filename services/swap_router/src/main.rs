use anyhow::{Context, Result};
use clap::Parser;
use ethers::signers::{LocalWallet, Signer};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use swap_router::{
    Collaborators, EngineRegistry, EngineSettings, EthersChain, ExecuteRequest,
    LocalNonceManager, RouterConfig, SwapEngine, TokenRegistry,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "swap_router", about = "Quote and execute constant-product swaps")]
struct Args {
    /// JSON configuration file; defaults plus SWAP_ROUTER_* variables when absent
    #[arg(long)]
    config: Option<PathBuf>,

    /// Token symbol to sell
    #[arg(long)]
    sell: String,

    /// Token symbol to buy
    #[arg(long)]
    buy: String,

    /// Human-readable amount of the sell token (or of the buy token with --exact-out)
    #[arg(long)]
    amount: Decimal,

    /// Treat --amount as the exact amount to receive
    #[arg(long)]
    exact_out: bool,

    /// Sign and submit the swap after quoting
    #[arg(long, requires = "private_key")]
    execute: bool,

    #[arg(long, env = "SWAP_ROUTER_PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    info!("🚀 Starting Swap Router...");

    let mut config = match &args.config {
        Some(path) => RouterConfig::from_file(path)
            .with_context(|| format!("Failed to load config {:?}", path))?,
        None => RouterConfig::default(),
    };
    config.apply_env_overrides();
    let settings = EngineSettings::from_config(&config).context("Invalid configuration")?;

    let tokens = Arc::new(
        TokenRegistry::from_token_list(Path::new(&config.token_list_path), config.chain_id)
            .context("Failed to load token list")?,
    );

    let wallet = args
        .private_key
        .as_deref()
        .map(str::parse::<LocalWallet>)
        .transpose()
        .context("Invalid private key format")?;
    let wallet_address = wallet.as_ref().map(|w| w.address());

    let chain = Arc::new(EthersChain::new(&config, wallet)?);
    let nonces = Arc::new(LocalNonceManager::new(chain.clone()));

    let mut registry = EngineRegistry::new();
    registry.register(SwapEngine::new(
        settings,
        Collaborators {
            tokens,
            reader: chain.clone(),
            submitter: chain,
            nonces,
        },
    ))?;

    let engine = registry.get(&config.chain, &config.network)?;
    let summary = engine.initialize(&config.pools).await?;
    info!(
        "✅ Engine {} ready with {} pools ({} skipped)",
        engine.key(),
        engine.pool_count(),
        summary.skipped
    );

    let trade = if args.exact_out {
        engine.quote_buy(&args.sell, &args.buy, args.amount).await?
    } else {
        engine.quote_sell(&args.sell, &args.buy, args.amount).await?
    };

    info!("Route: {}", engine.trade_route(&trade).join(" → "));
    info!(
        "Input {} → Output {} (execution price {}, impact {}%)",
        trade.input_amount(),
        trade.output_amount(),
        trade.execution_price(),
        trade.price_impact().round_dp(4)
    );

    if let (true, Some(wallet)) = (args.execute, wallet_address) {
        let request = ExecuteRequest::new(wallet, trade, config.router()?, config.ttl_secs)
            .with_gas(config.gas.to_params());
        let submitted = engine.execute(request).await?;
        info!(
            "✅ Submitted {} nonce {}: 0x{:x}",
            submitted.method_name, submitted.nonce, submitted.hash
        );
    }

    Ok(())
}
