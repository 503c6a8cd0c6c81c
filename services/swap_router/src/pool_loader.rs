//! Startup pool loading
//!
//! Turns configured `"BASE-QUOTE"` strings into verified pairs. Every entry
//! either lands in the graph or is skipped with a warning; only an unreachable
//! chain aborts the load.

use crate::chain::ChainReader;
use crate::error::{ChainError, RouterError};
use crate::tokens::TokenResolver;
use crate::{log_pool, log_skip};
use router_amm::PoolGraph;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// A parsed `"BASE-QUOTE"` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSpec {
    pub base: String,
    pub quote: String,
}

impl FromStr for PoolSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('-').map(str::trim).collect();
        match parts.as_slice() {
            [base, quote] if !base.is_empty() && !quote.is_empty() => Ok(Self {
                base: base.to_string(),
                quote: quote.to_string(),
            }),
            _ => Err(format!("expected BASE-QUOTE, got '{}'", s)),
        }
    }
}

impl fmt::Display for PoolSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.base, self.quote)
    }
}

/// Outcome counts of one load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub requested: usize,
    pub loaded: usize,
    pub duplicates: usize,
    pub skipped: usize,
}

/// Resolve and fetch every configured pool.
///
/// Returns `RouterError::Chain` only for `ChainError::Unavailable`.
pub async fn load_pools(
    specs: &[String],
    tokens: &dyn TokenResolver,
    chain: &dyn ChainReader,
) -> Result<(PoolGraph, LoadSummary), RouterError> {
    let mut graph = PoolGraph::new();
    let mut summary = LoadSummary {
        requested: specs.len(),
        ..LoadSummary::default()
    };

    for entry in specs {
        let spec = match entry.parse::<PoolSpec>() {
            Ok(spec) => spec,
            Err(reason) => {
                log_skip!("Skipping malformed pool entry: {}", reason);
                summary.skipped += 1;
                continue;
            }
        };

        let Some(base) = tokens.resolve_symbol(&spec.base).await else {
            log_skip!("Skipping {}: unknown base token {}", spec, spec.base);
            summary.skipped += 1;
            continue;
        };
        let Some(quote) = tokens.resolve_symbol(&spec.quote).await else {
            log_skip!("Skipping {}: unknown quote token {}", spec, spec.quote);
            summary.skipped += 1;
            continue;
        };

        let address = match chain.get_pair_address(&base, &quote).await {
            Ok(address) => address,
            Err(e) => {
                skip_or_abort(&spec, e)?;
                summary.skipped += 1;
                continue;
            }
        };
        if address.is_zero() {
            log_skip!("Skipping {}: pool does not exist", spec);
            summary.skipped += 1;
            continue;
        }
        if graph.contains(address) {
            debug!("{} resolves to already loaded pair {:?}", spec, address);
            summary.duplicates += 1;
            continue;
        }

        match chain.fetch_pair(&base, &quote, address).await {
            Ok(pair) => {
                debug!("Loaded {} at {:?}", pair, address);
                graph.insert(pair);
                summary.loaded += 1;
            }
            Err(e) => {
                skip_or_abort(&spec, e)?;
                summary.skipped += 1;
            }
        }
    }

    log_pool!(
        "Pool load complete: {} requested, {} loaded, {} duplicate, {} skipped",
        summary.requested,
        summary.loaded,
        summary.duplicates,
        summary.skipped
    );
    Ok((graph, summary))
}

fn skip_or_abort(spec: &PoolSpec, error: ChainError) -> Result<(), RouterError> {
    if error.is_unavailable() {
        return Err(RouterError::Chain(error));
    }
    log_skip!("Skipping {}: {}", spec, error);
    Ok(())
}
