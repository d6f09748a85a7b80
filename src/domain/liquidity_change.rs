//! Outcomes of liquidity deposits and withdrawals.

use core::fmt;

use serde::Serialize;

/// LP shares produced by a deposit.
///
/// `minted` is credited to the receiver; `fee` is the imbalance fee that
/// was withheld from the gross mint (always zero for the first deposit).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LiquidityDeposit {
    minted: f64,
    fee: f64,
}

impl LiquidityDeposit {
    /// Creates a deposit outcome.
    #[must_use]
    pub const fn new(minted: f64, fee: f64) -> Self {
        Self { minted, fee }
    }

    /// LP shares credited to the receiver.
    #[must_use]
    pub const fn minted(&self) -> f64 {
        self.minted
    }

    /// LP shares withheld as imbalance fee.
    #[must_use]
    pub const fn fee(&self) -> f64 {
        self.fee
    }
}

impl fmt::Display for LiquidityDeposit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Deposit(minted={}, fee={})", self.minted, self.fee)
    }
}

/// Coins paid out by a proportional withdrawal.
///
/// # Examples
///
/// ```
/// use twocrypto_sim::domain::LiquidityWithdrawal;
///
/// let out = LiquidityWithdrawal::new(10.0, 5.0, 7.0);
/// assert!(!out.is_empty());
/// assert!(LiquidityWithdrawal::default().is_empty());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LiquidityWithdrawal {
    amount_a: f64,
    amount_b: f64,
    burned: f64,
}

impl LiquidityWithdrawal {
    /// Creates a withdrawal outcome.
    #[must_use]
    pub const fn new(amount_a: f64, amount_b: f64, burned: f64) -> Self {
        Self {
            amount_a,
            amount_b,
            burned,
        }
    }

    /// Token A paid out.
    #[must_use]
    pub const fn amount_a(&self) -> f64 {
        self.amount_a
    }

    /// Token B paid out.
    #[must_use]
    pub const fn amount_b(&self) -> f64 {
        self.amount_b
    }

    /// LP shares burned.
    #[must_use]
    pub const fn burned(&self) -> f64 {
        self.burned
    }

    /// Returns `true` if nothing was paid out.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.amount_a == 0.0 && self.amount_b == 0.0
    }
}

impl fmt::Display for LiquidityWithdrawal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Withdrawal(a={}, b={}, burned={})",
            self.amount_a, self.amount_b, self.burned
        )
    }
}
