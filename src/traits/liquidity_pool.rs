//! LP-share accounting extending [`SwapPool`].
//!
//! An LP share is a claim on a fraction of both reserves:
//!
//! ```text
//! share(account)        = lp(account) / total_supply
//! token_a_balance_of(a) = balance_A · share(a)
//! ```
//!
//! Values of a position are the share of each reserve converted with the
//! pool's own prices.  An empty LP supply yields zero shares rather than
//! an error.
//!
//! # Fee Accounting
//!
//! [`LiquidityPool::fees_accrued`] reports the swap fees kept in the
//! reserves per coin.  They are informational: fees are never paid out
//! separately, they raise the value of every share.

use super::SwapPool;
use crate::domain::AccountId;
use crate::error::Result;
use crate::ledger::{Token, TokenLedger};

/// Share accounting for pools that issue LP tokens.
pub trait LiquidityPool: SwapPool {
    /// Ledger of LP shares.
    #[must_use]
    fn lp_token(&self) -> &Token;

    /// Swap fees retained by the pool, `[A, B]`.
    #[must_use]
    fn fees_accrued(&self) -> [f64; 2];

    /// Token A to pair with `amount_b` at the current reserve ratio.
    #[must_use]
    fn get_a_amount_for_liquidity(&self, amount_b: f64) -> f64;

    /// Token B to pair with `amount_a` at the current reserve ratio.
    #[must_use]
    fn get_b_amount_for_liquidity(&self, amount_a: f64) -> f64;

    /// Total LP supply.
    #[must_use]
    fn get_total_liquidity(&self) -> f64 {
        self.lp_token().total_supply()
    }

    /// LP shares held by `account`.
    #[must_use]
    fn get_liquidity(&self, account: &AccountId) -> f64 {
        self.lp_token().balance_of(account)
    }

    /// Fraction of the pool owned by `account`, `0` for an empty pool.
    #[must_use]
    fn get_lp_share(&self, account: &AccountId) -> f64 {
        let total = self.get_total_liquidity();
        if total == 0.0 {
            return 0.0;
        }
        self.get_liquidity(account) / total
    }

    /// Token A reserve attributable to `account`.
    #[must_use]
    fn token_a_balance_of(&self, account: &AccountId) -> f64 {
        self.balances()[0] * self.get_lp_share(account)
    }

    /// Token B reserve attributable to `account`.
    #[must_use]
    fn token_b_balance_of(&self, account: &AccountId) -> f64 {
        self.balances()[1] * self.get_lp_share(account)
    }

    /// Value of `account`'s position in token A.
    ///
    /// # Errors
    ///
    /// Propagates price quote errors.
    fn get_value_in_token_a_of(&self, account: &AccountId) -> Result<f64> {
        self.convert_to_a(
            self.token_a_balance_of(account),
            self.token_b_balance_of(account),
        )
    }

    /// Value of `account`'s position in token B.
    ///
    /// # Errors
    ///
    /// Propagates price quote errors.
    fn get_value_in_token_b_of(&self, account: &AccountId) -> Result<f64> {
        self.convert_to_b(
            self.token_a_balance_of(account),
            self.token_b_balance_of(account),
        )
    }

    /// Value in token A of `lp_amount` shares.
    ///
    /// # Errors
    ///
    /// Propagates price quote errors.
    fn get_lp_value_in_token_a(&self, lp_amount: f64) -> Result<f64> {
        let total = self.get_total_liquidity();
        if total == 0.0 {
            return Ok(0.0);
        }
        Ok(self.get_value_in_token_a()? * lp_amount / total)
    }

    /// Accrued swap fees valued in token A.
    ///
    /// # Errors
    ///
    /// Propagates price quote errors.
    fn get_accrued_fees_in_token_a(&self) -> Result<f64> {
        let [a, b] = self.fees_accrued();
        self.convert_to_a(a, b)
    }

    /// Accrued swap fees valued in token B.
    ///
    /// # Errors
    ///
    /// Propagates price quote errors.
    fn get_accrued_fees_in_token_b(&self) -> Result<f64> {
        let [a, b] = self.fees_accrued();
        self.convert_to_b(a, b)
    }
}
