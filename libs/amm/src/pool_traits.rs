//! Pool trait definitions for a unified swap interface

use crate::{AmmError, Pair, TokenAmount};

/// Unified pool interface used by the route search
pub trait AmmPool {
    /// Calculate output amount for given input
    fn get_amount_out(&self, amount_in: &TokenAmount) -> Result<TokenAmount, AmmError>;

    /// Calculate required input for desired output
    fn get_amount_in(&self, amount_out: &TokenAmount) -> Result<TokenAmount, AmmError>;
}

impl AmmPool for Pair {
    fn get_amount_out(&self, amount_in: &TokenAmount) -> Result<TokenAmount, AmmError> {
        let state = self.oriented(&amount_in.token)?;
        let raw = state.amount_out(amount_in.raw)?;
        Ok(TokenAmount::new(self.other_token(&amount_in.token)?.clone(), raw))
    }

    fn get_amount_in(&self, amount_out: &TokenAmount) -> Result<TokenAmount, AmmError> {
        let token_in = self.other_token(&amount_out.token)?.clone();
        let state = self.oriented(&token_in)?;
        let raw = state.amount_in(amount_out.raw)?;
        Ok(TokenAmount::new(token_in, raw))
    }
}
