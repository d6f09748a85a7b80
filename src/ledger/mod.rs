//! Fungible token ledgers the pool settles against.
//!
//! The pool never owns the balances of token A and token B.  Every
//! mutating pool call receives the two ledgers as `&mut [L; 2]` and moves
//! coins through the [`TokenLedger`] trait, mirroring them in its own
//! tracked balances.  The only ledger a pool owns is its LP-share
//! [`Token`], which is part of the pool state.

mod token;

pub use token::Token;

use crate::domain::AccountId;
use crate::error::Result;

/// Transfers and burns below this (negative) balance are rejected.  Float
/// dust from proportional withdrawals and from a supply kept as a running
/// sum can leave an account or the supply marginally negative.
pub const NEGATIVE_BALANCE_TOLERANCE: f64 = 1e-9;

/// ERC-20 style fungible token ledger.
///
/// # Contract
///
/// - Amounts are real-valued token units; negative or non-finite amounts
///   are rejected with [`AmmError::InvalidQuantity`](crate::error::AmmError::InvalidQuantity).
/// - A failed call leaves the ledger unchanged.
/// - `transfer` fails with
///   [`AmmError::InsufficientBalance`](crate::error::AmmError::InsufficientBalance)
///   when the sender would end below `-NEGATIVE_BALANCE_TOLERANCE`;
///   `burn` fails when the holder or the supply would go below
///   `-NEGATIVE_BALANCE_TOLERANCE`, and clamps dust to zero.
pub trait TokenLedger {
    /// Ticker of the token.
    fn symbol(&self) -> &str;

    /// Sum of all balances.
    fn total_supply(&self) -> f64;

    /// Balance of `account`, zero if it never held the token.
    fn balance_of(&self, account: &AccountId) -> f64;

    /// Creates `amount` new tokens for `account`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidQuantity`](crate::error::AmmError::InvalidQuantity)
    /// for negative or non-finite amounts.
    fn mint(&mut self, account: &AccountId, amount: f64) -> Result<()>;

    /// Destroys `amount` tokens held by `account`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InsufficientBalance`](crate::error::AmmError::InsufficientBalance)
    /// if the holder or the supply would become negative.
    fn burn(&mut self, account: &AccountId, amount: f64) -> Result<()>;

    /// Moves `amount` from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InsufficientBalance`](crate::error::AmmError::InsufficientBalance)
    /// if the sender cannot cover the amount.
    fn transfer(&mut self, from: &AccountId, to: &AccountId, amount: f64) -> Result<()>;
}
