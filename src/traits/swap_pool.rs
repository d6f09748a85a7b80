//! Price and value queries shared by every swap pool.
//!
//! [`SwapPool`] asks an implementor for three things: its tracked
//! balances, an output quote ([`SwapPool::get_dy`]) and a marginal price
//! ([`SwapPool::get_spot_price`]).  Every valuation helper is derived
//! from those:
//!
//! | Method | Meaning |
//! |--------|---------|
//! | [`get_token_a_price`](SwapPool::get_token_a_price) | coin B received per coin A |
//! | [`get_token_b_price`](SwapPool::get_token_b_price) | coin A received per coin B |
//! | [`convert_to_a`](SwapPool::convert_to_a) | `a + b · price_b` |
//! | [`convert_to_b`](SwapPool::convert_to_b) | `a · price_a + b` |
//! | [`get_value_in_token_a`](SwapPool::get_value_in_token_a) | pool reserves valued in A |
//!
//! # Coin Indices
//!
//! Coin `0` is token A and coin `1` is token B.  Any other index, or an
//! input equal to the output, is rejected with
//! [`AmmError::InvalidCoinIndex`](crate::error::AmmError::InvalidCoinIndex).
//!
//! # Read-only
//!
//! Nothing here mutates the pool.  Quotes that need to simulate a trade
//! live on the pool itself because they run on a speculative copy of its
//! state.

use crate::domain::{COIN_A, COIN_B};
use crate::error::Result;

/// Read-side interface of a two-coin pool.
///
/// # Errors
///
/// Quotes propagate solver errors: a pool pushed outside the solver's
/// safe range returns [`AmmError::UnsafeValue`](crate::error::AmmError::UnsafeValue)
/// rather than a wrong price.
pub trait SwapPool {
    /// Coin balances the pool is tracking, `[A, B]`.
    #[must_use]
    fn balances(&self) -> [f64; 2];

    /// Amount of coin `j` received for `dx` of coin `i`, fees included.
    ///
    /// Returns `0` for an empty pool.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidCoinIndex`](crate::error::AmmError::InvalidCoinIndex)
    ///   for a bad pair.
    /// - [`AmmError::InvalidQuantity`](crate::error::AmmError::InvalidQuantity)
    ///   if `dx` is negative or the output is not positive.
    fn get_dy(&self, i: usize, j: usize, dx: f64) -> Result<f64>;

    /// Marginal price of coin `i` in units of coin `j`.
    ///
    /// Returns `0` if the pool holds none of coin `i`.
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`SwapPool::get_dy`].
    fn get_spot_price(&self, i: usize, j: usize) -> Result<f64>;

    /// Price of token A in token B.
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`SwapPool::get_spot_price`].
    fn get_token_a_price(&self) -> Result<f64> {
        self.get_spot_price(COIN_A, COIN_B)
    }

    /// Price of token B in token A.
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`SwapPool::get_spot_price`].
    fn get_token_b_price(&self) -> Result<f64> {
        self.get_spot_price(COIN_B, COIN_A)
    }

    /// Values a basket of both coins in token A.
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`SwapPool::get_token_b_price`].
    fn convert_to_a(&self, amount_a: f64, amount_b: f64) -> Result<f64> {
        Ok(amount_a + amount_b * self.get_token_b_price()?)
    }

    /// Values a basket of both coins in token B.
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`SwapPool::get_token_a_price`].
    fn convert_to_b(&self, amount_a: f64, amount_b: f64) -> Result<f64> {
        Ok(amount_a * self.get_token_a_price()? + amount_b)
    }

    /// Total reserves valued in token A.
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`SwapPool::convert_to_a`].
    fn get_value_in_token_a(&self) -> Result<f64> {
        let [a, b] = self.balances();
        self.convert_to_a(a, b)
    }

    /// Total reserves valued in token B.
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`SwapPool::convert_to_b`].
    fn get_value_in_token_b(&self) -> Result<f64> {
        let [a, b] = self.balances();
        self.convert_to_b(a, b)
    }
}
