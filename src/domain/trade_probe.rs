//! Hypothetical trades used by price quotes.

use super::{COIN_A, COIN_B};

/// A trade simulated before reading a price, never committed.
///
/// # Examples
///
/// ```
/// use twocrypto_sim::domain::TradeProbe;
///
/// let probe = TradeProbe::SellA(100.0);
/// assert_eq!(probe.input_coin(), 0);
/// assert_eq!(probe.output_coin(), 1);
/// assert_eq!(probe.amount(), 100.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TradeProbe {
    /// Sell this much token A into the pool.
    SellA(f64),
    /// Sell this much token B into the pool.
    SellB(f64),
}

impl TradeProbe {
    /// Index of the coin sold.
    #[must_use]
    pub const fn input_coin(&self) -> usize {
        match self {
            Self::SellA(_) => COIN_A,
            Self::SellB(_) => COIN_B,
        }
    }

    /// Index of the coin bought.
    #[must_use]
    pub const fn output_coin(&self) -> usize {
        match self {
            Self::SellA(_) => COIN_B,
            Self::SellB(_) => COIN_A,
        }
    }

    /// Amount sold.
    #[must_use]
    pub const fn amount(&self) -> f64 {
        match self {
            Self::SellA(amount) | Self::SellB(amount) => *amount,
        }
    }
}
