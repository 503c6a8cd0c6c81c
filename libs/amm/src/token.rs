//! Token identities and raw token amounts
//!
//! Amounts are always carried in the token's smallest unit (`raw`) so the
//! constant-product math stays in exact integer arithmetic. `Decimal` is only
//! used at the edges: parsing human input and reporting prices.

use crate::AmmError;
use ethers_core::types::{Address, U256};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Largest mantissa a `Decimal` can hold (2^96 - 1)
const DECIMAL_MAX_MANTISSA: u128 = (1u128 << 96) - 1;

/// ERC-20 token identity
///
/// Identity is `(chain_id, address)`; symbol, name and decimals are metadata
/// and do not take part in equality or hashing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub chain_id: u64,
    pub address: Address,
    pub decimals: u8,
    pub symbol: String,
    pub name: String,
}

impl Token {
    pub fn new(
        chain_id: u64,
        address: Address,
        decimals: u8,
        symbol: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            chain_id,
            address,
            decimals,
            symbol: symbol.into(),
            name: name.into(),
        }
    }

    /// On-chain pair ordering: token0 is the token with the lower address
    pub fn sorts_before(&self, other: &Token) -> bool {
        self.address < other.address
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.chain_id == other.chain_id && self.address == other.address
    }
}

impl Eq for Token {}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.chain_id.hash(state);
        self.address.hash(state);
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

/// An amount of a specific token in its smallest unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenAmount {
    pub token: Token,
    pub raw: U256,
}

impl TokenAmount {
    pub fn new(token: Token, raw: impl Into<U256>) -> Self {
        Self {
            token,
            raw: raw.into(),
        }
    }

    pub fn zero(token: Token) -> Self {
        Self {
            token,
            raw: U256::zero(),
        }
    }

    /// Convert a human-readable amount (e.g. `1.5` WETH) into raw units.
    ///
    /// Digits below the token's smallest unit are truncated.
    pub fn from_decimal(token: Token, amount: Decimal) -> Result<Self, AmmError> {
        if amount.is_sign_negative() {
            return Err(AmmError::InvalidAmount {
                reason: format!("negative amount {} for {}", amount, token.symbol),
            });
        }

        let mantissa = U256::from(amount.mantissa().unsigned_abs());
        let scale = amount.scale();
        let decimals = u32::from(token.decimals);

        let raw = if decimals >= scale {
            mantissa
                .checked_mul(U256::exp10((decimals - scale) as usize))
                .ok_or(AmmError::Overflow {
                    context: "token amount scaling",
                })?
        } else {
            mantissa / U256::exp10((scale - decimals) as usize)
        };

        Ok(Self { token, raw })
    }

    /// Human-readable value of this amount.
    ///
    /// Very large amounts lose their least significant digits to fit a `Decimal`.
    pub fn to_decimal(&self) -> Result<Decimal, AmmError> {
        let mut raw = self.raw;
        let mut scale = u32::from(self.token.decimals);
        if scale > 28 {
            raw /= U256::exp10((scale - 28) as usize);
            scale = 28;
        }
        while raw > U256::from(DECIMAL_MAX_MANTISSA) && scale > 0 {
            raw /= U256::from(10u8);
            scale -= 1;
        }
        if raw > U256::from(DECIMAL_MAX_MANTISSA) {
            return Err(AmmError::Overflow {
                context: "token amount to decimal",
            });
        }

        Decimal::try_from_i128_with_scale(raw.as_u128() as i128, scale).map_err(|_| {
            AmmError::Overflow {
                context: "token amount to decimal",
            }
        })
    }

    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_decimal() {
            Ok(value) => write!(f, "{} {}", value.normalize(), self.token.symbol),
            Err(_) => write!(f, "{} raw {}", self.raw, self.token.symbol),
        }
    }
}
