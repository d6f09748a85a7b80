//! Coin indices of a two-asset pool.

use crate::error::{AmmError, Result};

/// Number of coins held by a pool.
pub const N_COINS: usize = 2;

/// Index of token A (the quote asset, price scale 1).
pub const COIN_A: usize = 0;

/// Index of token B (priced in A through the price scale).
pub const COIN_B: usize = 1;

/// Checks that `i` and `j` name two different coins of the pool.
///
/// # Errors
///
/// Returns [`AmmError::InvalidCoinIndex`] if either index is out of range
/// or both indices are equal.
pub fn check_pair(i: usize, j: usize) -> Result<()> {
    if i >= N_COINS || j >= N_COINS {
        return Err(AmmError::InvalidCoinIndex("coin index out of range"));
    }
    if i == j {
        return Err(AmmError::InvalidCoinIndex("same input and output coin"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_coins_accepted() {
        assert!(check_pair(COIN_A, COIN_B).is_ok());
        assert!(check_pair(COIN_B, COIN_A).is_ok());
    }

    #[test]
    fn same_coin_rejected() {
        assert!(matches!(
            check_pair(COIN_A, COIN_A),
            Err(AmmError::InvalidCoinIndex(_))
        ));
    }

    #[test]
    fn out_of_range_rejected() {
        assert!(check_pair(0, 2).is_err());
        assert!(check_pair(3, 1).is_err());
    }
}
