//! Slippage tolerance parsing and trade bounds
//!
//! A tolerance is an integer fraction so bounds stay exact in raw units:
//! `"0.5%"` becomes 5/1000. Bounds round down, which keeps the minimum output
//! exact when divisible and never loosens the maximum input.

use crate::{AmmError, SlippageError, TokenAmount, Trade, TradeType};
use ethers_core::types::U256;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// Longest fractional part accepted in a percent literal
const MAX_FRACTION_DIGITS: usize = 18;

static PERCENT_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)(?:\.(\d+))?%$").expect("valid percent regex"));

static FRACTION_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)/(\d+)$").expect("valid fraction regex"));

/// A non-negative fraction `numerator / denominator`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Percent {
    numerator: u128,
    denominator: u128,
}

impl Percent {
    pub fn new(numerator: u128, denominator: u128) -> Result<Self, SlippageError> {
        if denominator == 0 || numerator > denominator {
            return Err(SlippageError::OutOfRange(format!(
                "{}/{}",
                numerator, denominator
            )));
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// Parse `"<int>[.<frac>]%"` (e.g. `"0.5%"`) or a raw fraction `"1/200"`.
    pub fn parse_percent(value: &str) -> Result<Self, SlippageError> {
        let trimmed = value.trim();
        let invalid = || SlippageError::InvalidTolerance(value.to_string());

        if let Some(caps) = PERCENT_LITERAL.captures(trimmed) {
            let fraction = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            if fraction.len() > MAX_FRACTION_DIGITS {
                return Err(invalid());
            }
            let digits = format!("{}{}", &caps[1], fraction);
            let numerator: u128 = digits.parse().map_err(|_| invalid())?;
            let denominator = 100u128 * 10u128.pow(fraction.len() as u32);
            return Self::new(numerator, denominator)
                .map_err(|_| SlippageError::OutOfRange(value.to_string()));
        }

        if let Some(caps) = FRACTION_LITERAL.captures(trimmed) {
            let numerator: u128 = caps[1].parse().map_err(|_| invalid())?;
            let denominator: u128 = caps[2].parse().map_err(|_| invalid())?;
            return Self::new(numerator, denominator)
                .map_err(|_| SlippageError::OutOfRange(value.to_string()));
        }

        Err(invalid())
    }

    pub fn numerator(&self) -> u128 {
        self.numerator
    }

    pub fn denominator(&self) -> u128 {
        self.denominator
    }

    /// Tolerance as a plain ratio (0.005 for 0.5%)
    pub fn to_decimal(&self) -> Option<Decimal> {
        let numerator = Decimal::try_from_i128_with_scale(i128::try_from(self.numerator).ok()?, 0).ok()?;
        let denominator = Decimal::try_from_i128_with_scale(i128::try_from(self.denominator).ok()?, 0).ok()?;
        numerator.checked_div(denominator)
    }
}

impl FromStr for Percent {
    type Err = SlippageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_percent(s)
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_decimal().and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED)) {
            Some(pct) => write!(f, "{}%", pct.normalize()),
            None => write!(f, "{}/{}", self.numerator, self.denominator),
        }
    }
}

/// Execution-time protection derived from a trade and a tolerance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlippageBound {
    /// Exact-input trades: revert if less than this is received
    MinimumOut(TokenAmount),
    /// Exact-output trades: revert if more than this is spent
    MaximumIn(TokenAmount),
}

impl SlippageBound {
    pub fn amount(&self) -> &TokenAmount {
        match self {
            SlippageBound::MinimumOut(amount) | SlippageBound::MaximumIn(amount) => amount,
        }
    }
}

impl fmt::Display for SlippageBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlippageBound::MinimumOut(amount) => write!(f, "minimum out {}", amount),
            SlippageBound::MaximumIn(amount) => write!(f, "maximum in {}", amount),
        }
    }
}

/// `MinimumOut = output * (1 - T)` for sells, `MaximumIn = input * (1 + T)` for buys.
pub fn slippage_bound(trade: &Trade, tolerance: &Percent) -> Result<SlippageBound, SlippageError> {
    let numerator = U256::from(tolerance.numerator);
    let denominator = U256::from(tolerance.denominator);

    match trade.trade_type() {
        TradeType::ExactInput => {
            let output = trade.output_amount();
            let raw = scale(output.raw, denominator - numerator, denominator)?;
            Ok(SlippageBound::MinimumOut(TokenAmount::new(
                output.token.clone(),
                raw,
            )))
        }
        TradeType::ExactOutput => {
            let input = trade.input_amount();
            let raw = scale(input.raw, denominator + numerator, denominator)?;
            Ok(SlippageBound::MaximumIn(TokenAmount::new(
                input.token.clone(),
                raw,
            )))
        }
    }
}

fn scale(raw: U256, numerator: U256, denominator: U256) -> Result<U256, AmmError> {
    raw.checked_mul(numerator)
        .map(|product| product / denominator)
        .ok_or(AmmError::Overflow {
            context: "slippage bound",
        })
}
