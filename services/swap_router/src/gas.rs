//! # Gas Pricing - Legacy vs Fee-Cap Transaction Pricing
//!
//! ## Purpose
//!
//! Turns caller-supplied gas settings into exactly one pricing mode per
//! transaction. Supplying either fee-cap field selects the post-fee-market
//! mode; otherwise the legacy gas price is scaled from gwei to wei.
//!
//! ## Architecture Role
//!
//! ```text
//! GasParams (config / request) → [pricing()] → GasPricing → SubmitRequest
//!        ↓                             ↓               ↓
//! gwei price, optional caps     mode selection    Legacy | FeeCap (wei)
//! ```

use ethers::types::U256;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const WEI_PER_GWEI: u64 = 1_000_000_000;

/// Legacy gas price used when none is configured (30 gwei)
pub const DEFAULT_GAS_PRICE_GWEI: u64 = 30;

/// Gas limit for a router swap with a few hops
pub const DEFAULT_SWAP_GAS_LIMIT: u64 = 300_000;

/// Gas settings as supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasParams {
    /// Legacy gas price in gwei
    pub gas_price_gwei: u64,
    /// Fee-cap mode: maximum total fee per gas unit, in wei
    pub max_fee_per_gas: Option<U256>,
    /// Fee-cap mode: maximum priority fee per gas unit, in wei
    pub max_priority_fee_per_gas: Option<U256>,
    pub gas_limit: u64,
}

impl Default for GasParams {
    fn default() -> Self {
        Self {
            gas_price_gwei: DEFAULT_GAS_PRICE_GWEI,
            max_fee_per_gas: None,
            max_priority_fee_per_gas: None,
            gas_limit: DEFAULT_SWAP_GAS_LIMIT,
        }
    }
}

impl GasParams {
    pub fn legacy(gas_price_gwei: u64, gas_limit: u64) -> Self {
        Self {
            gas_price_gwei,
            gas_limit,
            ..Self::default()
        }
    }

    pub fn fee_cap(
        max_fee_per_gas: Option<U256>,
        max_priority_fee_per_gas: Option<U256>,
        gas_limit: u64,
    ) -> Self {
        Self {
            max_fee_per_gas,
            max_priority_fee_per_gas,
            gas_limit,
            ..Self::default()
        }
    }

    /// Select the pricing mode; the two modes never mix.
    pub fn pricing(&self) -> GasPricing {
        if self.max_fee_per_gas.is_some() || self.max_priority_fee_per_gas.is_some() {
            GasPricing::FeeCap {
                max_fee_per_gas: self.max_fee_per_gas,
                max_priority_fee_per_gas: self.max_priority_fee_per_gas,
            }
        } else {
            GasPricing::Legacy {
                gas_price: gwei_to_wei(self.gas_price_gwei),
            }
        }
    }
}

/// Per-transaction gas pricing, all values in wei
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasPricing {
    Legacy {
        gas_price: U256,
    },
    FeeCap {
        max_fee_per_gas: Option<U256>,
        max_priority_fee_per_gas: Option<U256>,
    },
}

impl GasPricing {
    pub fn is_fee_cap(&self) -> bool {
        matches!(self, GasPricing::FeeCap { .. })
    }
}

impl fmt::Display for GasPricing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GasPricing::Legacy { gas_price } => {
                write!(f, "legacy {} gwei", gas_price / U256::from(WEI_PER_GWEI))
            }
            GasPricing::FeeCap {
                max_fee_per_gas,
                max_priority_fee_per_gas,
            } => write!(
                f,
                "fee cap max={:?} priority={:?}",
                max_fee_per_gas, max_priority_fee_per_gas
            ),
        }
    }
}

pub fn gwei_to_wei(gwei: u64) -> U256 {
    U256::from(gwei) * U256::from(WEI_PER_GWEI)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_price_scaled_to_wei() {
        let pricing = GasParams::legacy(30, 250_000).pricing();
        assert_eq!(
            pricing,
            GasPricing::Legacy {
                gas_price: U256::from(30_000_000_000u64)
            }
        );
        assert!(!pricing.is_fee_cap());
    }

    #[test]
    fn test_any_fee_cap_field_selects_fee_cap() {
        let priority_only = GasParams::fee_cap(None, Some(gwei_to_wei(2)), 250_000);
        assert_eq!(
            priority_only.pricing(),
            GasPricing::FeeCap {
                max_fee_per_gas: None,
                max_priority_fee_per_gas: Some(U256::from(2_000_000_000u64)),
            }
        );

        let both = GasParams {
            gas_price_gwei: 50,
            max_fee_per_gas: Some(gwei_to_wei(80)),
            max_priority_fee_per_gas: Some(gwei_to_wei(2)),
            gas_limit: 250_000,
        };
        // legacy price is ignored once a cap is present
        assert!(both.pricing().is_fee_cap());
    }
}
