//! Trades and best-trade route search
//!
//! ## Search
//!
//! The pool graph is treated as an undirected multigraph (tokens are nodes,
//! pairs are edges). Every simple path of at most `max_hops` edges from the
//! input token to the output token is enumerated depth-first. The visited-token
//! set travels with each branch by value, so a branch can never revisit a token
//! and branches share no mutable state.
//!
//! Each path is priced by composing the constant-product formula hop by hop.
//! Paths where any hop lacks liquidity are dropped. Survivors are sorted fully
//! before the best one is picked:
//!
//! - exact input: highest output first
//! - exact output: lowest input first
//! - then fewer hops
//! - then pair addresses along the route (lexicographic)

use crate::v2_math::V2Math;
use crate::{AmmError, AmmPool, Pair, PoolGraph, Route, Token, TokenAmount};
use ethers_core::types::Address;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::debug;

/// Which side of the trade is fixed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TradeType {
    /// Sell an exact input amount
    ExactInput,
    /// Buy an exact output amount
    ExactOutput,
}

/// A priced route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trade {
    route: Route,
    trade_type: TradeType,
    input_amount: TokenAmount,
    output_amount: TokenAmount,
    execution_price: Decimal,
    price_impact: Decimal,
}

impl Trade {
    /// Price `route` for an exact input amount
    pub fn exact_in(route: Route, amount_in: TokenAmount) -> Result<Self, AmmError> {
        if &amount_in.token != route.input() {
            return Err(AmmError::InvalidRoute {
                reason: format!(
                    "amount is in {} but route starts at {}",
                    amount_in.token.symbol,
                    route.input().symbol
                ),
            });
        }

        let mut current = amount_in.clone();
        for pair in route.pairs() {
            current = pair.get_amount_out(&current)?;
        }

        Self::priced(route, TradeType::ExactInput, amount_in, current)
    }

    /// Price `route` for an exact output amount
    pub fn exact_out(route: Route, amount_out: TokenAmount) -> Result<Self, AmmError> {
        if &amount_out.token != route.output() {
            return Err(AmmError::InvalidRoute {
                reason: format!(
                    "amount is in {} but route ends at {}",
                    amount_out.token.symbol,
                    route.output().symbol
                ),
            });
        }

        let mut current = amount_out.clone();
        for pair in route.pairs().iter().rev() {
            current = pair.get_amount_in(&current)?;
        }

        Self::priced(route, TradeType::ExactOutput, current, amount_out)
    }

    fn priced(
        route: Route,
        trade_type: TradeType,
        input_amount: TokenAmount,
        output_amount: TokenAmount,
    ) -> Result<Self, AmmError> {
        let input = input_amount.to_decimal()?;
        let output = output_amount.to_decimal()?;
        let execution_price = output.checked_div(input).ok_or(AmmError::Overflow {
            context: "execution price",
        })?;
        let price_impact = V2Math::calculate_price_impact(input, output, route.mid_price()?)?;

        Ok(Self {
            route,
            trade_type,
            input_amount,
            output_amount,
            execution_price,
            price_impact,
        })
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn trade_type(&self) -> TradeType {
        self.trade_type
    }

    pub fn input_amount(&self) -> &TokenAmount {
        &self.input_amount
    }

    pub fn output_amount(&self) -> &TokenAmount {
        &self.output_amount
    }

    /// Output per unit of input, in human units
    pub fn execution_price(&self) -> Decimal {
        self.execution_price
    }

    /// Percentage shortfall against the route mid price
    pub fn price_impact(&self) -> Decimal {
        self.price_impact
    }

    /// Best exact-input trade from `amount_in` to `token_out`
    pub fn best_trade_exact_in(
        graph: &PoolGraph,
        amount_in: &TokenAmount,
        token_out: &Token,
        max_hops: usize,
    ) -> Result<Self, AmmError> {
        Self::best_trades(
            graph,
            TradeType::ExactInput,
            amount_in,
            token_out,
            max_hops,
            1,
        )
        .into_iter()
        .next()
        .ok_or_else(|| no_route(&amount_in.token, token_out))
    }

    /// Best exact-output trade from `token_in` to `amount_out`
    pub fn best_trade_exact_out(
        graph: &PoolGraph,
        token_in: &Token,
        amount_out: &TokenAmount,
        max_hops: usize,
    ) -> Result<Self, AmmError> {
        Self::best_trades(
            graph,
            TradeType::ExactOutput,
            amount_out,
            token_in,
            max_hops,
            1,
        )
        .into_iter()
        .next()
        .ok_or_else(|| no_route(token_in, &amount_out.token))
    }

    /// Ranked candidates, best first, at most `max_results` long.
    ///
    /// For `ExactInput`, `amount` is the input and `other` the output token;
    /// for `ExactOutput`, `amount` is the output and `other` the input token.
    pub fn best_trades(
        graph: &PoolGraph,
        trade_type: TradeType,
        amount: &TokenAmount,
        other: &Token,
        max_hops: usize,
        max_results: usize,
    ) -> Vec<Self> {
        let (token_in, token_out) = match trade_type {
            TradeType::ExactInput => (&amount.token, other),
            TradeType::ExactOutput => (other, &amount.token),
        };
        if amount.is_zero() || token_in == token_out || max_hops == 0 {
            return Vec::new();
        }

        let mut candidates: Vec<Trade> = find_paths(graph, token_in, token_out, max_hops)
            .into_iter()
            .filter_map(|indices| {
                let pairs: Vec<Pair> = indices
                    .iter()
                    .filter_map(|&index| graph.get(index).cloned())
                    .collect();
                let priced = Route::new(pairs, token_in.clone()).and_then(|route| match trade_type {
                    TradeType::ExactInput => Trade::exact_in(route, amount.clone()),
                    TradeType::ExactOutput => Trade::exact_out(route, amount.clone()),
                });
                match priced {
                    Ok(trade) => Some(trade),
                    Err(e) => {
                        debug!("Discarding path {:?}: {}", indices, e);
                        None
                    }
                }
            })
            .collect();

        candidates.sort_by(compare_trades);
        candidates.truncate(max_results);
        candidates
    }
}

/// Enumerate all simple paths of at most `max_hops` pairs, as pair indices.
pub fn find_paths(
    graph: &PoolGraph,
    from: &Token,
    to: &Token,
    max_hops: usize,
) -> Vec<Vec<usize>> {
    let mut results = Vec::new();
    if from == to || max_hops == 0 {
        return results;
    }

    let mut visited = HashSet::new();
    visited.insert(from.address);
    explore(graph, from, to, max_hops, visited, Vec::new(), &mut results);
    results
}

fn explore(
    graph: &PoolGraph,
    current: &Token,
    target: &Token,
    max_hops: usize,
    visited: HashSet<Address>,
    path: Vec<usize>,
    results: &mut Vec<Vec<usize>>,
) {
    for &index in graph.edges_of(current) {
        let Some(pair) = graph.get(index) else {
            continue;
        };
        let Ok(next) = pair.other_token(current) else {
            continue;
        };
        if visited.contains(&next.address) {
            continue;
        }

        let mut next_path = path.clone();
        next_path.push(index);

        if next == target {
            results.push(next_path);
        } else if next_path.len() < max_hops {
            let mut next_visited = visited.clone();
            next_visited.insert(next.address);
            explore(graph, next, target, max_hops, next_visited, next_path, results);
        }
    }
}

fn compare_trades(a: &Trade, b: &Trade) -> Ordering {
    let by_amount = match a.trade_type {
        TradeType::ExactInput => b.output_amount.raw.cmp(&a.output_amount.raw),
        TradeType::ExactOutput => a.input_amount.raw.cmp(&b.input_amount.raw),
    };
    by_amount
        .then_with(|| a.route.hops().cmp(&b.route.hops()))
        .then_with(|| {
            let addresses = |trade: &Trade| {
                trade
                    .route
                    .pairs()
                    .iter()
                    .map(Pair::address)
                    .collect::<Vec<_>>()
            };
            addresses(a).cmp(&addresses(b))
        })
}

fn no_route(input: &Token, output: &Token) -> AmmError {
    AmmError::NoRoute {
        input: input.symbol.clone(),
        output: output.symbol.clone(),
    }
}
