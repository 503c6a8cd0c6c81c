//! Uniswap V2 constant-product math with exact integer arithmetic
//!
//! Mirrors the on-chain `UniswapV2Library` formulas so quoted amounts match
//! what the router contract computes. Raw token units in `U256`, fee in basis
//! points. Price and impact helpers work on `Decimal` for reporting.

use crate::AmmError;
use ethers_core::types::U256;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Fee denominator (basis points)
pub const FEE_DENOMINATOR: u32 = 10_000;

/// Standard V2 pool fee: 30 bps = 0.3%
pub const DEFAULT_FEE_BPS: u32 = 30;

/// Pool reserves oriented for a single swap direction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct V2PoolState {
    pub reserve_in: U256,
    pub reserve_out: U256,
    pub fee_bps: u32, // Fee in basis points (30 = 0.3%)
}

impl V2PoolState {
    pub fn amount_out(&self, amount_in: U256) -> Result<U256, AmmError> {
        V2Math::get_amount_out(amount_in, self.reserve_in, self.reserve_out, self.fee_bps)
    }

    pub fn amount_in(&self, amount_out: U256) -> Result<U256, AmmError> {
        V2Math::get_amount_in(amount_out, self.reserve_in, self.reserve_out, self.fee_bps)
    }
}

/// V2 AMM math functions
pub struct V2Math;

impl V2Math {
    /// Output amount for an exact input using the x*y=k formula
    ///
    /// `out = in * (10000 - fee) * reserve_out / (reserve_in * 10000 + in * (10000 - fee))`,
    /// rounded down.
    pub fn get_amount_out(
        amount_in: U256,
        reserve_in: U256,
        reserve_out: U256,
        fee_bps: u32,
    ) -> Result<U256, AmmError> {
        if amount_in.is_zero() {
            return Err(AmmError::InsufficientInputAmount);
        }
        if reserve_in.is_zero() || reserve_out.is_zero() {
            return Err(AmmError::InsufficientLiquidity {
                reason: "pool has an empty reserve".to_string(),
            });
        }
        let fee_multiplier = Self::fee_multiplier(fee_bps)?;

        let amount_in_with_fee = checked_mul(amount_in, fee_multiplier, "amount_in with fee")?;
        let numerator = checked_mul(amount_in_with_fee, reserve_out, "amount_out numerator")?;
        let denominator = checked_mul(reserve_in, U256::from(FEE_DENOMINATOR), "amount_out denominator")?
            .checked_add(amount_in_with_fee)
            .ok_or(AmmError::Overflow {
                context: "amount_out denominator",
            })?;

        let amount_out = numerator / denominator;
        if amount_out.is_zero() {
            return Err(AmmError::InsufficientOutputAmount);
        }
        Ok(amount_out)
    }

    /// Input amount required for an exact output (reverse calculation)
    ///
    /// `in = reserve_in * out * 10000 / ((reserve_out - out) * (10000 - fee)) + 1`.
    /// The trailing +1 rounds up so the input always covers the output.
    pub fn get_amount_in(
        amount_out: U256,
        reserve_in: U256,
        reserve_out: U256,
        fee_bps: u32,
    ) -> Result<U256, AmmError> {
        if amount_out.is_zero() {
            return Err(AmmError::InsufficientOutputAmount);
        }
        if reserve_in.is_zero() || reserve_out.is_zero() {
            return Err(AmmError::InsufficientLiquidity {
                reason: "pool has an empty reserve".to_string(),
            });
        }
        if amount_out >= reserve_out {
            return Err(AmmError::InsufficientLiquidity {
                reason: format!("output {} exceeds reserve {}", amount_out, reserve_out),
            });
        }
        let fee_multiplier = Self::fee_multiplier(fee_bps)?;

        let numerator = checked_mul(
            checked_mul(reserve_in, amount_out, "amount_in numerator")?,
            U256::from(FEE_DENOMINATOR),
            "amount_in numerator",
        )?;
        let denominator = checked_mul(reserve_out - amount_out, fee_multiplier, "amount_in denominator")?;

        Ok(numerator / denominator + U256::one())
    }

    /// Spot price of the output token in units of the input token (no fee, no impact)
    pub fn spot_price(reserve_in: Decimal, reserve_out: Decimal) -> Result<Decimal, AmmError> {
        if reserve_in <= dec!(0) || reserve_out <= dec!(0) {
            return Err(AmmError::InsufficientLiquidity {
                reason: "reserves must be positive".to_string(),
            });
        }
        reserve_out.checked_div(reserve_in).ok_or(AmmError::Overflow {
            context: "spot price",
        })
    }

    /// Price impact of a trade as a percentage
    ///
    /// Compares the amount the route would return at its mid price with the
    /// amount actually received.
    pub fn calculate_price_impact(
        amount_in: Decimal,
        amount_out: Decimal,
        mid_price: Decimal,
    ) -> Result<Decimal, AmmError> {
        if amount_in <= dec!(0) || mid_price <= dec!(0) {
            return Err(AmmError::InvalidAmount {
                reason: "price impact needs a positive input and mid price".to_string(),
            });
        }

        let quoted_out = amount_in.checked_mul(mid_price).ok_or(AmmError::Overflow {
            context: "price impact quoted output",
        })?;
        let shortfall = quoted_out - amount_out;

        shortfall
            .checked_div(quoted_out)
            .and_then(|ratio| ratio.checked_mul(dec!(100)))
            .ok_or(AmmError::Overflow {
                context: "price impact",
            })
    }

    fn fee_multiplier(fee_bps: u32) -> Result<U256, AmmError> {
        if fee_bps >= FEE_DENOMINATOR {
            return Err(AmmError::InvalidFee { fee_bps });
        }
        Ok(U256::from(FEE_DENOMINATOR - fee_bps))
    }
}

fn checked_mul(a: U256, b: U256, context: &'static str) -> Result<U256, AmmError> {
    a.checked_mul(b).ok_or(AmmError::Overflow { context })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u(value: u64) -> U256 {
        U256::from(value)
    }

    #[test]
    fn test_v2_output_calculation() {
        // 10_000 in against 1M:1M reserves at 0.3%
        let output = V2Math::get_amount_out(u(10_000), u(1_000_000), u(1_000_000), 30).unwrap();
        assert_eq!(output, u(9_871));

        // Same trade with 18-decimal reserves: 10 in against 1000:1000
        let e18 = U256::exp10(18);
        let output =
            V2Math::get_amount_out(e18 * 10u64, e18 * 1000u64, e18 * 1000u64, DEFAULT_FEE_BPS).unwrap();
        assert_eq!(output, U256::from_dec_str("9871580343970612988").unwrap());
    }

    #[test]
    fn test_v2_output_is_reproducible() {
        let first = V2Math::get_amount_out(u(10_000), u(1_000_000), u(1_000_000), 30).unwrap();
        let second = V2Math::get_amount_out(u(10_000), u(1_000_000), u(1_000_000), 30).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_v2_input_calculation_rounds_up() {
        let input = V2Math::get_amount_in(u(5_000), u(1_000_000), u(1_000_000), 30).unwrap();
        assert_eq!(input, u(5_041));

        let output = V2Math::get_amount_out(input, u(1_000_000), u(1_000_000), 30).unwrap();
        assert!(output >= u(5_000));
    }

    #[test]
    fn test_insufficient_liquidity() {
        let err = V2Math::get_amount_in(u(1_000_000), u(1_000_000), u(1_000_000), 30).unwrap_err();
        assert!(matches!(err, AmmError::InsufficientLiquidity { .. }));

        let err = V2Math::get_amount_out(u(10), U256::zero(), u(1_000), 30).unwrap_err();
        assert!(matches!(err, AmmError::InsufficientLiquidity { .. }));
    }

    #[test]
    fn test_zero_amounts_rejected() {
        assert_eq!(
            V2Math::get_amount_out(U256::zero(), u(1_000), u(1_000), 30),
            Err(AmmError::InsufficientInputAmount)
        );
        assert_eq!(
            V2Math::get_amount_in(U256::zero(), u(1_000), u(1_000), 30),
            Err(AmmError::InsufficientOutputAmount)
        );
        // Dust input that rounds to nothing
        assert_eq!(
            V2Math::get_amount_out(u(1), u(1_000_000), u(1_000), 30),
            Err(AmmError::InsufficientOutputAmount)
        );
    }

    #[test]
    fn test_invalid_fee() {
        let err = V2Math::get_amount_out(u(10), u(1_000), u(1_000), 10_000).unwrap_err();
        assert_eq!(err, AmmError::InvalidFee { fee_bps: 10_000 });
    }

    #[test]
    fn test_price_impact() {
        let mid = V2Math::spot_price(dec!(1000), dec!(2000)).unwrap();
        assert_eq!(mid, dec!(2));

        let impact = V2Math::calculate_price_impact(dec!(100), dec!(181.32), mid).unwrap();

        // Large trade should have noticeable impact
        assert!(impact > dec!(0));
        assert!(impact < dec!(20)); // But not extreme for 10% of reserves
    }
}
