//! Token registry and symbol resolution
//!
//! Tokens come from a Uniswap-format token list (`{"name", "tokens": [...]}`).
//! Entries for other chains are ignored; symbol lookups are case-insensitive
//! and the first entry for a symbol wins.

use anyhow::{Context, Result};
use async_trait::async_trait;
use ethers::types::Address;
use router_amm::Token;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

/// Symbol → token lookup used by pool loading and quoting
#[async_trait]
pub trait TokenResolver: Send + Sync {
    async fn resolve_symbol(&self, symbol: &str) -> Option<Token>;
}

#[derive(Debug, Deserialize)]
struct TokenListJson {
    #[serde(default)]
    name: String,
    tokens: Vec<Token>,
}

/// Immutable catalogue of tokens for one chain, keyed by address
#[derive(Debug, Clone, Default)]
pub struct TokenRegistry {
    chain_id: u64,
    by_address: HashMap<Address, Token>,
    by_symbol: HashMap<String, Address>,
}

impl TokenRegistry {
    pub fn new(chain_id: u64, tokens: impl IntoIterator<Item = Token>) -> Self {
        let mut registry = Self {
            chain_id,
            ..Self::default()
        };
        for token in tokens {
            registry.add(token);
        }
        registry
    }

    /// Load a token list file, keeping only entries for `chain_id`
    pub fn from_token_list(path: &Path, chain_id: u64) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read token list {:?}", path))?;
        let list: TokenListJson =
            serde_json::from_str(&contents).context("Failed to parse token list JSON")?;

        let total = list.tokens.len();
        let registry = Self::new(
            chain_id,
            list.tokens.into_iter().filter(|t| t.chain_id == chain_id),
        );
        info!(
            "Loaded {} of {} tokens from list '{}' for chain {}",
            registry.len(),
            total,
            list.name,
            chain_id
        );
        Ok(registry)
    }

    fn add(&mut self, token: Token) {
        if token.chain_id != self.chain_id {
            warn!(
                "Ignoring {} at {:?}: chain {} is not {}",
                token.symbol, token.address, token.chain_id, self.chain_id
            );
            return;
        }
        let key = token.symbol.to_uppercase();
        if let Some(existing) = self.by_symbol.get(&key) {
            if *existing != token.address {
                warn!(
                    "Duplicate symbol {}: keeping {:?}, ignoring {:?}",
                    token.symbol, existing, token.address
                );
            }
        } else {
            self.by_symbol.insert(key, token.address);
        }
        self.by_address.entry(token.address).or_insert(token);
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn by_address(&self, address: &Address) -> Option<&Token> {
        self.by_address.get(address)
    }

    pub fn by_symbol(&self, symbol: &str) -> Option<&Token> {
        self.by_symbol
            .get(&symbol.trim().to_uppercase())
            .and_then(|address| self.by_address.get(address))
    }

    pub fn len(&self) -> usize {
        self.by_address.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_address.is_empty()
    }
}

#[async_trait]
impl TokenResolver for TokenRegistry {
    async fn resolve_symbol(&self, symbol: &str) -> Option<Token> {
        self.by_symbol(symbol).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TOKEN_LIST: &str = r#"{
        "name": "Test List",
        "timestamp": "2024-01-01T00:00:00.000Z",
        "tokens": [
            {"chainId": 1, "address": "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2", "decimals": 18, "symbol": "WETH", "name": "Wrapped Ether", "logoURI": "https://example.org/weth.png"},
            {"chainId": 1, "address": "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48", "decimals": 6, "symbol": "USDC", "name": "USD Coin"},
            {"chainId": 137, "address": "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174", "decimals": 6, "symbol": "USDC", "name": "USD Coin (PoS)"}
        ]
    }"#;

    #[test]
    fn test_load_token_list_filters_chain() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TOKEN_LIST.as_bytes()).unwrap();

        let registry = TokenRegistry::from_token_list(file.path(), 1).unwrap();
        assert_eq!(registry.len(), 2);

        let usdc = registry.by_symbol("usdc").unwrap();
        assert_eq!(usdc.decimals, 6);
        assert_eq!(
            usdc.address,
            "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48".parse::<Address>().unwrap()
        );
        assert!(registry.by_address(&usdc.address).is_some());
    }

    #[test]
    fn test_first_symbol_wins() {
        let first = Token::new(1, Address::repeat_byte(1), 18, "DAI", "Dai");
        let second = Token::new(1, Address::repeat_byte(2), 18, "DAI", "Fake Dai");
        let registry = TokenRegistry::new(1, vec![first.clone(), second]);

        assert_eq!(registry.by_symbol("DAI"), Some(&first));
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn test_resolve_unknown_symbol() {
        let registry = TokenRegistry::new(1, Vec::new());
        assert!(registry.resolve_symbol("NOPE").await.is_none());
    }
}
