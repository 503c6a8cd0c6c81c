//! Router call construction
//!
//! Maps a priced trade plus its slippage bound onto one of the six Uniswap V2
//! router swap methods:
//!
//! | trade        | tokens only                | native in               | native out              |
//! |--------------|----------------------------|-------------------------|-------------------------|
//! | exact input  | `swapExactTokensForTokens` | `swapExactETHForTokens` | `swapExactTokensForETH` |
//! | exact output | `swapTokensForExactTokens` | `swapETHForExactTokens` | `swapTokensForExactETH` |

use crate::error::ConfigError;
use ethers::abi::Token as AbiToken;
use ethers::types::{Address, U256};
use router_amm::{SlippageBound, Trade, TradeType};

/// Human-readable ABI of the router methods this service calls
pub const ROUTER_ABI: &[&str] = &[
    "function swapExactTokensForTokens(uint256 amountIn, uint256 amountOutMin, address[] path, address to, uint256 deadline) returns (uint256[] amounts)",
    "function swapTokensForExactTokens(uint256 amountOut, uint256 amountInMax, address[] path, address to, uint256 deadline) returns (uint256[] amounts)",
    "function swapExactETHForTokens(uint256 amountOutMin, address[] path, address to, uint256 deadline) payable returns (uint256[] amounts)",
    "function swapETHForExactTokens(uint256 amountOut, address[] path, address to, uint256 deadline) payable returns (uint256[] amounts)",
    "function swapExactTokensForETH(uint256 amountIn, uint256 amountOutMin, address[] path, address to, uint256 deadline) returns (uint256[] amounts)",
    "function swapTokensForExactETH(uint256 amountOut, uint256 amountInMax, address[] path, address to, uint256 deadline) returns (uint256[] amounts)",
];

/// Which side of the swap, if any, is the chain's native currency
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NativeLeg {
    #[default]
    None,
    /// Pay with native currency; the trade input must be the wrapped native token
    Input,
    /// Receive native currency; the trade output must be the wrapped native token
    Output,
}

/// Everything besides the trade that shapes the call
#[derive(Debug, Clone)]
pub struct SwapOptions {
    pub recipient: Address,
    /// Unix seconds
    pub deadline: u64,
    pub bound: SlippageBound,
    pub native: NativeLeg,
    pub wrapped_native: Address,
}

/// A fully described router call
#[derive(Debug, Clone, PartialEq)]
pub struct SwapCallParameters {
    pub method_name: &'static str,
    pub args: Vec<AbiToken>,
    /// Native currency attached to the call, in wei
    pub value: U256,
}

impl SwapCallParameters {
    pub fn build(trade: &Trade, options: &SwapOptions) -> Result<Self, ConfigError> {
        let route = trade.route();
        match options.native {
            NativeLeg::Input if route.input().address != options.wrapped_native => {
                return Err(native_mismatch("input", &route.input().symbol));
            }
            NativeLeg::Output if route.output().address != options.wrapped_native => {
                return Err(native_mismatch("output", &route.output().symbol));
            }
            _ => {}
        }

        let path = AbiToken::Array(
            route
                .path()
                .iter()
                .map(|token| AbiToken::Address(token.address))
                .collect(),
        );
        let to = AbiToken::Address(options.recipient);
        let deadline = AbiToken::Uint(U256::from(options.deadline));

        match (trade.trade_type(), &options.bound) {
            (TradeType::ExactInput, SlippageBound::MinimumOut(min_out)) => {
                let amount_in = trade.input_amount().raw;
                let amount_out_min = AbiToken::Uint(min_out.raw);
                Ok(match options.native {
                    NativeLeg::None => Self {
                        method_name: "swapExactTokensForTokens",
                        args: vec![AbiToken::Uint(amount_in), amount_out_min, path, to, deadline],
                        value: U256::zero(),
                    },
                    NativeLeg::Input => Self {
                        method_name: "swapExactETHForTokens",
                        args: vec![amount_out_min, path, to, deadline],
                        value: amount_in,
                    },
                    NativeLeg::Output => Self {
                        method_name: "swapExactTokensForETH",
                        args: vec![AbiToken::Uint(amount_in), amount_out_min, path, to, deadline],
                        value: U256::zero(),
                    },
                })
            }
            (TradeType::ExactOutput, SlippageBound::MaximumIn(max_in)) => {
                let amount_out = AbiToken::Uint(trade.output_amount().raw);
                Ok(match options.native {
                    NativeLeg::None => Self {
                        method_name: "swapTokensForExactTokens",
                        args: vec![amount_out, AbiToken::Uint(max_in.raw), path, to, deadline],
                        value: U256::zero(),
                    },
                    NativeLeg::Input => Self {
                        method_name: "swapETHForExactTokens",
                        args: vec![amount_out, path, to, deadline],
                        value: max_in.raw,
                    },
                    NativeLeg::Output => Self {
                        method_name: "swapTokensForExactETH",
                        args: vec![amount_out, AbiToken::Uint(max_in.raw), path, to, deadline],
                        value: U256::zero(),
                    },
                })
            }
            (trade_type, bound) => Err(ConfigError::InvalidSwapCall {
                reason: format!("{} does not apply to a {:?} trade", bound, trade_type),
            }),
        }
    }
}

fn native_mismatch(side: &str, symbol: &str) -> ConfigError {
    ConfigError::InvalidSwapCall {
        reason: format!(
            "native {} requires the wrapped native token, route {} is {}",
            side, side, symbol
        ),
    }
}
