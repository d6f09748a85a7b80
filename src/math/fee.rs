//! Fee curve and the small real-valued helpers around it.
//!
//! The swap fee slides between `mid_fee` (balanced pool) and `out_fee`
//! (imbalanced pool):
//!
//! ```text
//! K = 4 · x0 · x1 / (x0 + x1)²
//! f = fee_gamma / (fee_gamma + 1 − K)
//! fee = mid_fee · f + out_fee · (1 − f)
//! ```
//!
//! These run on `f64`; only the invariant solvers need the wad backend.

use serde::{Deserialize, Serialize};

/// Flat fee added to every liquidity-change fee.
pub const NOISE_FEE: f64 = 1e-5;

/// The three parameters that shape the dynamic fee.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeeCurve {
    /// Fee charged when the pool is perfectly balanced.
    pub mid_fee: f64,
    /// Fee charged when the pool is maximally imbalanced.
    pub out_fee: f64,
    /// How fast the fee moves from `mid_fee` to `out_fee`.
    pub fee_gamma: f64,
}

impl FeeCurve {
    /// Creates a fee curve.  Validation lives in the pool configuration.
    #[must_use]
    pub const fn new(mid_fee: f64, out_fee: f64, fee_gamma: f64) -> Self {
        Self {
            mid_fee,
            out_fee,
            fee_gamma,
        }
    }
}

/// Returns the fee fraction for price-scaled balances `xp`.
///
/// An empty pool is treated as maximally imbalanced.
///
/// # Examples
///
/// ```
/// use twocrypto_sim::math::{dynamic_fee, FeeCurve};
///
/// let curve = FeeCurve::new(0.0026, 0.0045, 0.00023);
/// assert!((dynamic_fee(&curve, [500.0, 500.0]) - 0.0026).abs() < 1e-12);
/// assert!(dynamic_fee(&curve, [900.0, 100.0]) > 0.0026);
/// ```
#[must_use]
pub fn dynamic_fee(curve: &FeeCurve, xp: [f64; 2]) -> f64 {
    let sum = xp[0] + xp[1];
    let k = if sum > 0.0 {
        4.0 * xp[0] * xp[1] / (sum * sum)
    } else {
        0.0
    };
    let f = curve.fee_gamma / (curve.fee_gamma + 1.0 - k);
    curve.mid_fee * f + curve.out_fee * (1.0 - f)
}

/// Fee fraction charged on a liquidity change of `amounts` against the
/// post-change balances `xp`.
///
/// Half the dynamic fee scaled by how one-sided the change is, plus
/// [`NOISE_FEE`].
#[must_use]
pub fn calc_token_fee(curve: &FeeCurve, amounts: [f64; 2], xp: [f64; 2]) -> f64 {
    let fee = dynamic_fee(curve, xp) / 2.0;
    let sum = amounts[0] + amounts[1];
    if sum == 0.0 {
        return NOISE_FEE;
    }
    let avg = sum / 2.0;
    let spread = (amounts[0] - avg).abs() + (amounts[1] - avg).abs();
    fee * spread / sum + NOISE_FEE
}

/// `0.5^power`, the oracle decay factor for `power` half-lives.
#[must_use]
pub fn halfpow(power: f64) -> f64 {
    0.5_f64.powf(power)
}

/// Geometric mean of two non-negative reals.
#[must_use]
pub fn geometric_mean(x: [f64; 2]) -> f64 {
    (x[0] * x[1]).sqrt()
}

/// Converts invariant `d` to the pool's virtual share value: the
/// geometric mean of `[D/2, D/(2·price_scale)]`.
#[must_use]
pub fn xcp(d: f64, price_scale: f64) -> f64 {
    geometric_mean([d / 2.0, d / (2.0 * price_scale)])
}
