//! Liquidity pairs and the pool graph used for routing
//!
//! A `Pair` is one constant-product pool. The `PoolGraph` indexes pairs by
//! token so route search can walk from a token to every pool touching it.

use crate::v2_math::{V2Math, V2PoolState, DEFAULT_FEE_BPS};
use crate::{AmmError, Token, TokenAmount};
use ethers_core::types::Address;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fmt;

/// A two-token constant-product pool
///
/// Tokens are kept in on-chain order (`token0` has the lower address).
/// Reserves are a snapshot; a refresh replaces the whole `Pair`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    address: Address,
    reserve0: TokenAmount,
    reserve1: TokenAmount,
    fee_bps: u32,
}

impl Pair {
    pub fn new(
        address: Address,
        reserve_a: TokenAmount,
        reserve_b: TokenAmount,
    ) -> Result<Self, AmmError> {
        if address.is_zero() {
            return Err(AmmError::InvalidPair {
                reason: "pair address is the zero address".to_string(),
            });
        }
        if reserve_a.token == reserve_b.token {
            return Err(AmmError::InvalidPair {
                reason: format!("both sides are {}", reserve_a.token.symbol),
            });
        }
        if reserve_a.token.chain_id != reserve_b.token.chain_id {
            return Err(AmmError::InvalidPair {
                reason: format!(
                    "{} and {} are on different chains",
                    reserve_a.token.symbol, reserve_b.token.symbol
                ),
            });
        }

        let (reserve0, reserve1) = if reserve_a.token.sorts_before(&reserve_b.token) {
            (reserve_a, reserve_b)
        } else {
            (reserve_b, reserve_a)
        };

        Ok(Self {
            address,
            reserve0,
            reserve1,
            fee_bps: DEFAULT_FEE_BPS,
        })
    }

    pub fn with_fee_bps(mut self, fee_bps: u32) -> Self {
        self.fee_bps = fee_bps;
        self
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn token0(&self) -> &Token {
        &self.reserve0.token
    }

    pub fn token1(&self) -> &Token {
        &self.reserve1.token
    }

    pub fn reserve0(&self) -> &TokenAmount {
        &self.reserve0
    }

    pub fn reserve1(&self) -> &TokenAmount {
        &self.reserve1
    }

    pub fn fee_bps(&self) -> u32 {
        self.fee_bps
    }

    pub fn chain_id(&self) -> u64 {
        self.reserve0.token.chain_id
    }

    pub fn involves_token(&self, token: &Token) -> bool {
        self.token0() == token || self.token1() == token
    }

    pub fn reserve_of(&self, token: &Token) -> Result<&TokenAmount, AmmError> {
        if self.token0() == token {
            Ok(&self.reserve0)
        } else if self.token1() == token {
            Ok(&self.reserve1)
        } else {
            Err(self.not_in_pair(token))
        }
    }

    /// The token on the other side of `token`
    pub fn other_token(&self, token: &Token) -> Result<&Token, AmmError> {
        if self.token0() == token {
            Ok(self.token1())
        } else if self.token1() == token {
            Ok(self.token0())
        } else {
            Err(self.not_in_pair(token))
        }
    }

    /// Reserves oriented for a swap that sells `token_in`
    pub fn oriented(&self, token_in: &Token) -> Result<V2PoolState, AmmError> {
        let reserve_in = self.reserve_of(token_in)?;
        let reserve_out = self.reserve_of(self.other_token(token_in)?)?;
        Ok(V2PoolState {
            reserve_in: reserve_in.raw,
            reserve_out: reserve_out.raw,
            fee_bps: self.fee_bps,
        })
    }

    /// Spot price of `token` expressed in the other token
    pub fn price_of(&self, token: &Token) -> Result<Decimal, AmmError> {
        let reserve_in = self.reserve_of(token)?.to_decimal()?;
        let reserve_out = self.reserve_of(self.other_token(token)?)?.to_decimal()?;
        V2Math::spot_price(reserve_in, reserve_out)
    }

    /// `"BASE-QUOTE"` descriptor in on-chain order
    pub fn symbol_pair(&self) -> String {
        format!("{}-{}", self.token0().symbol, self.token1().symbol)
    }

    fn not_in_pair(&self, token: &Token) -> AmmError {
        AmmError::TokenNotInPair {
            token: token.symbol.clone(),
            pair: self.symbol_pair(),
        }
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?})", self.symbol_pair(), self.address)
    }
}

/// Set of known pairs, indexed by token address for route search
#[derive(Debug, Clone, Default)]
pub struct PoolGraph {
    pairs: Vec<Pair>,
    adjacency: HashMap<Address, Vec<usize>>,
}

impl PoolGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = Pair>) -> Self {
        let mut graph = Self::new();
        for pair in pairs {
            graph.insert(pair);
        }
        graph
    }

    /// Add a pair. Returns `false` when a pair with the same address is already known.
    pub fn insert(&mut self, pair: Pair) -> bool {
        if self.contains(pair.address()) {
            return false;
        }
        let index = self.pairs.len();
        self.adjacency
            .entry(pair.token0().address)
            .or_default()
            .push(index);
        self.adjacency
            .entry(pair.token1().address)
            .or_default()
            .push(index);
        self.pairs.push(pair);
        true
    }

    /// Insert a pair or replace the known pair with the same address (fresh reserves)
    pub fn upsert(&mut self, pair: Pair) {
        match self.index_of(pair.address()) {
            Some(index) => self.pairs[index] = pair,
            None => {
                self.insert(pair);
            }
        }
    }

    pub fn contains(&self, address: Address) -> bool {
        self.index_of(address).is_some()
    }

    pub fn get(&self, index: usize) -> Option<&Pair> {
        self.pairs.get(index)
    }

    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Indices of every pair touching `token`
    pub fn edges_of(&self, token: &Token) -> &[usize] {
        self.adjacency
            .get(&token.address)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn index_of(&self, address: Address) -> Option<usize> {
        self.pairs.iter().position(|pair| pair.address() == address)
    }
}
