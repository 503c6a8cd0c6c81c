//! Routes: ordered walks of pairs from an input token to an output token

use crate::{AmmError, Pair, Token};
use rust_decimal::Decimal;

/// An acyclic path of pairs
///
/// `path[i]` is the token entering `pairs[i]`; `path.len() == pairs.len() + 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pairs: Vec<Pair>,
    path: Vec<Token>,
}

impl Route {
    /// Build a route starting at `input`, validating the token walk.
    pub fn new(pairs: Vec<Pair>, input: Token) -> Result<Self, AmmError> {
        if pairs.is_empty() {
            return Err(AmmError::InvalidRoute {
                reason: "route has no pairs".to_string(),
            });
        }

        let mut path = Vec::with_capacity(pairs.len() + 1);
        path.push(input);
        for pair in &pairs {
            let current = &path[path.len() - 1];
            if pair.chain_id() != current.chain_id {
                return Err(AmmError::InvalidRoute {
                    reason: format!("{} is on another chain", pair),
                });
            }
            let next = pair.other_token(current)?.clone();
            if path.contains(&next) {
                return Err(AmmError::InvalidRoute {
                    reason: format!("token {} repeats in route", next.symbol),
                });
            }
            path.push(next);
        }

        Ok(Self { pairs, path })
    }

    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    pub fn path(&self) -> &[Token] {
        &self.path
    }

    pub fn input(&self) -> &Token {
        &self.path[0]
    }

    pub fn output(&self) -> &Token {
        &self.path[self.path.len() - 1]
    }

    /// Number of pools crossed
    pub fn hops(&self) -> usize {
        self.pairs.len()
    }

    pub fn chain_id(&self) -> u64 {
        self.input().chain_id
    }

    /// Product of spot prices along the route (output per input, no fees)
    pub fn mid_price(&self) -> Result<Decimal, AmmError> {
        let mut price = Decimal::ONE;
        for (pair, token) in self.pairs.iter().zip(&self.path) {
            price = price
                .checked_mul(pair.price_of(token)?)
                .ok_or(AmmError::Overflow {
                    context: "route mid price",
                })?;
        }
        Ok(price)
    }

    /// One `"SYMBOL-SYMBOL"` descriptor per hop, in trade direction
    pub fn hop_descriptors(&self) -> Vec<String> {
        self.path
            .windows(2)
            .map(|hop| format!("{}-{}", hop[0].symbol, hop[1].symbol))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TokenAmount;
    use ethers_core::types::Address;
    use rust_decimal_macros::dec;

    fn token(byte: u8, symbol: &str) -> Token {
        Token::new(1, Address::repeat_byte(byte), 18, symbol, symbol)
    }

    fn pair(byte: u8, a: &Token, b: &Token, ra: u64, rb: u64) -> Pair {
        Pair::new(
            Address::repeat_byte(byte),
            TokenAmount::new(a.clone(), ra),
            TokenAmount::new(b.clone(), rb),
        )
        .unwrap()
    }

    #[test]
    fn test_route_walk() {
        let (a, b, c) = (token(1, "AAA"), token(2, "BBB"), token(3, "CCC"));
        let route = Route::new(
            vec![pair(0xf0, &b, &a, 1_000, 1_000), pair(0xf1, &c, &b, 1_000, 1_000)],
            a.clone(),
        )
        .unwrap();

        assert_eq!(route.path(), &[a.clone(), b, c.clone()]);
        assert_eq!(route.input(), &a);
        assert_eq!(route.output(), &c);
        assert_eq!(route.hops(), 2);
        assert_eq!(route.hop_descriptors(), vec!["AAA-BBB", "BBB-CCC"]);
    }

    #[test]
    fn test_disconnected_route_rejected() {
        let (a, b, c, d) = (token(1, "AAA"), token(2, "BBB"), token(3, "CCC"), token(4, "DDD"));
        let result = Route::new(
            vec![pair(0xf0, &a, &b, 1_000, 1_000), pair(0xf1, &c, &d, 1_000, 1_000)],
            a,
        );
        assert!(matches!(result, Err(AmmError::TokenNotInPair { .. })));
    }

    #[test]
    fn test_cyclic_route_rejected() {
        let (a, b) = (token(1, "AAA"), token(2, "BBB"));
        let result = Route::new(
            vec![pair(0xf0, &a, &b, 1_000, 1_000), pair(0xf1, &b, &a, 1_000, 1_000)],
            a,
        );
        assert!(matches!(result, Err(AmmError::InvalidRoute { .. })));
    }

    #[test]
    fn test_mid_price() {
        let (a, b, c) = (token(1, "AAA"), token(2, "BBB"), token(3, "CCC"));
        let route = Route::new(
            vec![pair(0xf0, &a, &b, 1_000, 2_000), pair(0xf1, &b, &c, 1_000, 3_000)],
            a,
        )
        .unwrap();
        assert_eq!(route.mid_price().unwrap(), dec!(6));
    }
}
