//! Outcome of an exchange.

use core::fmt;

use serde::Serialize;

/// Amounts produced by a successful exchange.
///
/// `dy` is what the receiver got, already net of the dynamic fee; `fee` is
/// the part of the gross output kept by the pool, in units of the output
/// coin.
///
/// # Examples
///
/// ```
/// use twocrypto_sim::domain::ExchangeResult;
///
/// let result = ExchangeResult::new(61.1, 0.27);
/// assert!((result.gross_output() - 61.37).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExchangeResult {
    dy: f64,
    fee: f64,
}

impl ExchangeResult {
    /// Creates a result from the net output and the fee.
    #[must_use]
    pub const fn new(dy: f64, fee: f64) -> Self {
        Self { dy, fee }
    }

    /// Amount received, net of fees.
    #[must_use]
    pub const fn dy(&self) -> f64 {
        self.dy
    }

    /// Fee retained by the pool, in output-coin units.
    #[must_use]
    pub const fn fee(&self) -> f64 {
        self.fee
    }

    /// Output before the fee was taken.
    #[must_use]
    pub fn gross_output(&self) -> f64 {
        self.dy + self.fee
    }

    /// Realised price paid, in input units per output unit.
    ///
    /// Returns `0.0` when nothing was received.
    #[must_use]
    pub fn effective_price(&self, dx: f64) -> f64 {
        if self.dy > 0.0 {
            dx / self.dy
        } else {
            0.0
        }
    }
}

impl fmt::Display for ExchangeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExchangeResult(dy={}, fee={})", self.dy, self.fee)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_price_is_input_per_output() {
        let result = ExchangeResult::new(50.0, 1.0);
        assert!((result.effective_price(100.0) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn effective_price_of_empty_output_is_zero() {
        assert_eq!(ExchangeResult::new(0.0, 0.0).effective_price(10.0), 0.0);
    }

    #[test]
    fn display_lists_both_fields() {
        let text = ExchangeResult::new(2.0, 0.5).to_string();
        assert_eq!(text, "ExchangeResult(dy=2, fee=0.5)");
    }
}
