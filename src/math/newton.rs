//! Newton-Raphson solvers for the two-coin crypto invariant.
//!
//! The invariant blends constant-sum and constant-product behaviour:
//!
//! ```text
//! K · D · N^(N-1) · Σx + Πx = K · D^N + (D/N)^N
//! K  = A · K0 · γ² / (γ + 1 − K0)²
//! K0 = Πx · N^N / D^N
//! ```
//!
//! [`newton_d`] finds `D` for given balances; [`newton_y`] finds one
//! balance given the other and `D`.  Both are generic over
//! [`Precision`] so the same steps run on `f64` and on 18-decimal
//! integers.  `ann` is always a raw integer, `A · N^N · A_MULTIPLIER`.
//!
//! Precondition violations return [`AmmError::UnsafeValue`] and a missed
//! convergence returns [`AmmError::NewtonRaphsonNonConvergence`].  Both
//! are fatal: the inputs are outside the solver's basin and retrying
//! cannot help.

use crate::error::{AmmError, Result};

use super::{unsafe_add, unsafe_div, unsafe_mul, unsafe_sub, Precision};

/// Scale applied to `A · N^N` so that fractional amplification fits in an
/// integer.
pub const A_MULTIPLIER: u128 = 10_000;

/// Smallest accepted `ann` (`N^N · A_MULTIPLIER / 10`).
pub const MIN_A: u128 = 4 * A_MULTIPLIER / 10;

/// Largest accepted `ann` (`N^N · A_MULTIPLIER · 100_000`).
pub const MAX_A: u128 = 4 * A_MULTIPLIER * 100_000;

/// Smallest accepted `gamma`.
pub const MIN_GAMMA: f64 = 1e-8;

/// Largest accepted `gamma`.
pub const MAX_GAMMA: f64 = 0.02;

/// Iteration cap for [`newton_d`].
pub const MAX_ITERATIONS_D: usize = 255;

const N: u128 = 2;
const MIN_GAMMA_WEI: u128 = 10_000_000_000;
const MAX_GAMMA_WEI: u128 = 20_000_000_000_000_000;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[inline]
fn int<P: Precision>(value: u128) -> P {
    P::from_u128(value)
}

/// `value` smallest increments (wei on the wad backend).
#[inline]
fn wei<P: Precision>(value: u128) -> P {
    unsafe_mul(P::ulp(), P::from_u128(value))
}

#[inline]
fn div<P: Precision>(a: P, b: P) -> Result<P> {
    a.checked_div(&b)
}

fn check_a_gamma<P: Precision>(ann: u128, gamma: P) -> Result<()> {
    if !(MIN_A..=MAX_A).contains(&ann) {
        return Err(AmmError::UnsafeValue("A out of range"));
    }
    if gamma < wei(MIN_GAMMA_WEI) || gamma > wei(MAX_GAMMA_WEI) {
        return Err(AmmError::UnsafeValue("gamma out of range"));
    }
    Ok(())
}

/// Checks that `value / d` lies in `[0.01, 100]`.
fn check_fraction<P: Precision>(value: P, d: P, context: &'static str) -> Result<()> {
    let one = P::one();
    let frac = div(value.checked_mul(&one)?, d)?;
    if frac < unsafe_div(one, int(100)) || frac > unsafe_mul(one, int(100)) {
        return Err(AmmError::UnsafeValue(context));
    }
    Ok(())
}

/// `|gamma + 1 - k0| + ulp`, always positive.
#[inline]
fn g1k0<P: Precision>(gamma_plus_one: P, k0: P) -> P {
    let distance = if gamma_plus_one > k0 {
        unsafe_sub(gamma_plus_one, k0)
    } else {
        unsafe_sub(k0, gamma_plus_one)
    };
    unsafe_add(distance, P::ulp())
}

/// `one · D / γ · g1k0 / γ · g1k0 · A_MULTIPLIER / ann`.
fn mul1<P: Precision>(d: P, gamma: P, g1k0: P, ann: P) -> Result<P> {
    let t = unsafe_div(P::one().checked_mul(&d)?, gamma);
    let t = unsafe_div(t.checked_mul(&g1k0)?, gamma);
    Ok(unsafe_div(
        t.checked_mul(&g1k0)?.checked_mul(&int(A_MULTIPLIER))?,
        ann,
    ))
}

// ---------------------------------------------------------------------------
// Solvers
// ---------------------------------------------------------------------------

/// Finds the invariant `D` of balances `x_unsorted` (already price-scaled).
///
/// Starts from `N · sqrt(x0 · x1)` and stops once
/// `|D − D_prev| · 10^14 < max(0.01, D)`.
///
/// # Errors
///
/// - [`AmmError::UnsafeValue`] if `ann` or `gamma` is out of range, the
///   larger balance is outside `[1e-9, 1e15]`, the balance ratio is below
///   `1e-4`, or a converged balance lies outside `[0.01, 100] · D`.
/// - [`AmmError::NewtonRaphsonNonConvergence`] after
///   [`MAX_ITERATIONS_D`] steps.
/// - Arithmetic errors from the checked operations.
///
/// # Examples
///
/// ```
/// use twocrypto_sim::math::{newton_d, FloatArithmetic as F};
///
/// let d = newton_d(400_000, F::new(0.000145), [F::new(1000.0), F::new(1000.0)])?;
/// assert!((d.get() - 2000.0).abs() < 1e-9);
/// # Ok::<(), twocrypto_sim::error::AmmError>(())
/// ```
pub fn newton_d<P: Precision>(ann: u128, gamma: P, x_unsorted: [P; 2]) -> Result<P> {
    check_a_gamma(ann, gamma)?;

    let one = P::one();
    let n = int::<P>(N);
    let x = if x_unsorted[0] < x_unsorted[1] {
        [x_unsorted[1], x_unsorted[0]]
    } else {
        x_unsorted
    };

    let x0_max = one.checked_mul(&int(1_000_000_000_000_000))?;
    if x[0] < wei(1_000_000_000) || x[0] > x0_max {
        return Err(AmmError::UnsafeValue("x[0] out of range"));
    }
    if div(x[1].checked_mul(&one)?, x[0])? < unsafe_div(one, int(10_000)) {
        return Err(AmmError::UnsafeValue("x[i] ratio below 1e-4"));
    }

    let ann_p = int::<P>(ann);
    let mut d = n.checked_mul(&x[0].geometric_mean(&x[1])?)?;
    let s = x[0].checked_add(&x[1])?;
    let gamma_plus_one = gamma.checked_add(&one)?;
    let two_one_n = one.checked_mul(&int(2 * N))?;
    let one_n_n = one.checked_mul(&int(N * N))?;

    for _ in 0..MAX_ITERATIONS_D {
        let d_prev = d;
        if d.is_zero() {
            return Err(AmmError::UnsafeValue("D reached zero"));
        }

        let k0 = unsafe_div(
            unsafe_div(one_n_n.checked_mul(&x[0])?, d).checked_mul(&x[1])?,
            d,
        );
        let g1k0 = g1k0(gamma_plus_one, k0);
        let mul1 = mul1(d, gamma, g1k0, ann_p)?;
        let mul2 = unsafe_div(two_one_n.checked_mul(&k0)?, g1k0);

        let neg_fprime = s
            .checked_add(&unsafe_div(s.checked_mul(&mul2)?, one))?
            .checked_add(&div(mul1.checked_mul(&n)?, k0)?)?
            .checked_sub(&unsafe_div(mul2.checked_mul(&d)?, one))?;

        let d_plus = div(d.checked_mul(&neg_fprime.checked_add(&s)?)?, neg_fprime)?;
        let mut d_minus = div(d.checked_mul(&d)?, neg_fprime)?;
        let scaled = unsafe_div(d.checked_mul(&div(mul1, neg_fprime)?)?, one);
        if one > k0 {
            let correction = div(scaled.checked_mul(&unsafe_sub(one, k0))?, k0)?;
            d_minus = d_minus.checked_add(&correction)?;
        } else {
            let correction = div(scaled.checked_mul(&unsafe_sub(k0, one))?, k0)?;
            d_minus = d_minus.checked_sub(&correction)?;
        }

        d = if d_plus > d_minus {
            unsafe_sub(d_plus, d_minus)
        } else {
            unsafe_div(unsafe_sub(d_minus, d_plus), int(2))
        };

        let diff = d.abs_diff(&d_prev);
        let tolerance = unsafe_div(one, int(100)).max(&d);
        if diff.checked_mul(&int(100_000_000_000_000))? < tolerance {
            for xi in x {
                check_fraction(xi, d, "x[i] out of range for D")?;
            }
            return Ok(d);
        }
    }

    Err(AmmError::NewtonRaphsonNonConvergence(
        "newton_d did not converge within 255 iterations",
    ))
}

/// Finds `x[i]` such that `[x[0], x[1]]` has invariant `d`, keeping
/// `x[1 − i]` fixed.
///
/// Swaps call this with `i` set to the OUTPUT coin.  Steps that would
/// overshoot halve the previous estimate instead.
///
/// # Errors
///
/// - [`AmmError::InvalidCoinIndex`] if `i > 1`.
/// - [`AmmError::UnsafeValue`] if `ann`/`gamma` are out of range, `d` is
///   outside `[0.1, 1e15]`, the fixed balance is outside `[0.01, 100] · D/N`
///   or the solution lies outside `[0.01, 100] · D`.
/// - [`AmmError::NewtonRaphsonNonConvergence`] after
///   `P::MAX_NEWTON_Y_ITERATIONS` steps.
///
/// # Examples
///
/// ```
/// use twocrypto_sim::math::{newton_y, FloatArithmetic as F};
///
/// let x = [F::new(1000.0), F::new(1000.0)];
/// let y = newton_y(400_000, F::new(0.000145), x, F::new(2000.0), 1)?;
/// assert!((y.get() - 1000.0).abs() < 1e-6);
/// # Ok::<(), twocrypto_sim::error::AmmError>(())
/// ```
pub fn newton_y<P: Precision>(ann: u128, gamma: P, x: [P; 2], d: P, i: usize) -> Result<P> {
    if i > 1 {
        return Err(AmmError::InvalidCoinIndex("newton_y index out of range"));
    }
    check_a_gamma(ann, gamma)?;

    let one = P::one();
    let n = int::<P>(N);
    let d_max = one.checked_mul(&int(1_000_000_000_000_000))?;
    if d < unsafe_div(one, int(10)) || d > d_max {
        return Err(AmmError::UnsafeValue("D out of range"));
    }

    let x_j = x[1 - i];
    if x_j.is_zero() {
        return Err(AmmError::UnsafeValue("fixed balance is zero"));
    }
    let mut y = div(d.checked_mul(&d)?, x_j.checked_mul(&int(N * N))?)?;
    let k0_i = div(one.checked_mul(&n)?.checked_mul(&x_j)?, d)?;
    let k0_i_min = unsafe_div(one, int(100)).checked_mul(&n)?;
    let k0_i_max = one.checked_mul(&int(100 * N))?;
    if k0_i < k0_i_min || k0_i > k0_i_max {
        return Err(AmmError::UnsafeValue("x[i] out of range for D"));
    }

    let e14 = int::<P>(100_000_000_000_000);
    let convergence_limit = unsafe_div(x_j, e14)
        .max(&unsafe_div(d, e14))
        .max(&wei(100));

    let ann_p = int::<P>(ann);
    let gamma_plus_one = gamma.checked_add(&one)?;
    let two_one = one.checked_mul(&int(2))?;
    // The contract adds a bare 10^18 to a value carrying two scales.
    let mul2_offset = unsafe_mul(P::ulp(), one);

    for _ in 0..P::MAX_NEWTON_Y_ITERATIONS {
        let y_prev = y;

        let k0 = unsafe_div(k0_i.checked_mul(&y)?.checked_mul(&n)?, d);
        let s = x_j.checked_add(&y)?;
        let g1k0 = g1k0(gamma_plus_one, k0);
        let mul1 = mul1(d, gamma, g1k0, ann_p)?;
        let mul2 = unsafe_div(
            mul2_offset.checked_add(&two_one.checked_mul(&k0)?)?,
            g1k0,
        );

        let yfprime = one
            .checked_mul(&y)?
            .checked_add(&s.checked_mul(&mul2)?)?
            .checked_add(&mul1)?;
        let dyfprime = d.checked_mul(&mul2)?;
        if yfprime < dyfprime {
            y = unsafe_div(y_prev, int(2));
            continue;
        }
        let yfprime = unsafe_sub(yfprime, dyfprime);
        let fprime = div(yfprime, y)?;

        let mut y_minus = div(mul1, fprime)?;
        let y_plus = div(yfprime.checked_add(&one.checked_mul(&d)?)?, fprime)?
            .checked_add(&div(y_minus.checked_mul(&one)?, k0)?)?;
        y_minus = y_minus.checked_add(&div(one.checked_mul(&s)?, fprime)?)?;

        y = if y_plus < y_minus {
            unsafe_div(y_prev, int(2))
        } else {
            unsafe_sub(y_plus, y_minus)
        };

        let diff = y.abs_diff(&y_prev);
        if diff < convergence_limit.max(&unsafe_div(y, e14)) {
            check_fraction(y, d, "y out of range for D")?;
            return Ok(y);
        }
    }

    Err(AmmError::NewtonRaphsonNonConvergence(
        "newton_y did not converge",
    ))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::math::{FloatArithmetic, WadArithmetic};

    const ANN: u128 = 400_000;
    const GAMMA: f64 = 0.000145;

    fn p<P: Precision>(value: f64) -> P {
        let Ok(v) = P::from_f64(value) else {
            panic!("valid value {value}");
        };
        v
    }

    fn d_of<P: Precision>(x: [f64; 2]) -> f64 {
        let Ok(d) = newton_d(ANN, p::<P>(GAMMA), [p(x[0]), p(x[1])]) else {
            panic!("newton_d failed for {x:?}");
        };
        d.to_f64_lossy()
    }

    fn y_of<P: Precision>(x: [f64; 2], d: f64, i: usize) -> f64 {
        let Ok(y) = newton_y(ANN, p::<P>(GAMMA), [p(x[0]), p(x[1])], p(d), i) else {
            panic!("newton_y failed for {x:?}");
        };
        y.to_f64_lossy()
    }

    // -- newton_d -----------------------------------------------------------

    #[test]
    fn balanced_pool_d_is_sum() {
        assert!((d_of::<FloatArithmetic>([1000.0, 1000.0]) - 2000.0).abs() < 1e-9);
        assert!((d_of::<WadArithmetic>([1000.0, 1000.0]) - 2000.0).abs() < 1e-9);
    }

    #[test]
    fn imbalanced_d_between_product_and_sum() {
        let d = d_of::<FloatArithmetic>([1500.0, 900.0]);
        let product = 2.0 * (1500.0_f64 * 900.0).sqrt();
        assert!(d > product);
        assert!(d < 2400.0);
    }

    #[test]
    fn d_is_symmetric() {
        let a = d_of::<WadArithmetic>([1200.0, 800.0]);
        let b = d_of::<WadArithmetic>([800.0, 1200.0]);
        assert_eq!(a, b);
    }

    #[test]
    fn backends_agree_on_d() {
        let f = d_of::<FloatArithmetic>([123_456.0, 98_765.0]);
        let w = d_of::<WadArithmetic>([123_456.0, 98_765.0]);
        assert!((f - w).abs() / w < 1e-12);
    }

    #[test]
    fn a_out_of_range_is_unsafe() {
        let x = [FloatArithmetic::new(10.0), FloatArithmetic::new(10.0)];
        let gamma = FloatArithmetic::new(GAMMA);
        assert!(matches!(
            newton_d(MIN_A - 1, gamma, x),
            Err(AmmError::UnsafeValue(_))
        ));
        assert!(matches!(
            newton_d(MAX_A + 1, gamma, x),
            Err(AmmError::UnsafeValue(_))
        ));
    }

    #[test]
    fn gamma_out_of_range_is_unsafe() {
        let x = [FloatArithmetic::new(10.0), FloatArithmetic::new(10.0)];
        assert!(newton_d(ANN, FloatArithmetic::new(0.03), x).is_err());
        assert!(newton_d(ANN, FloatArithmetic::new(1e-9), x).is_err());
    }

    #[test]
    fn extreme_ratio_is_unsafe() {
        let x = [WadArithmetic::from_u128(0), p::<WadArithmetic>(1.0)];
        let gamma = p::<WadArithmetic>(GAMMA);
        assert!(matches!(
            newton_d(ANN, gamma, [p(1.0), p(0.00001)]),
            Err(AmmError::UnsafeValue(_))
        ));
        assert!(newton_d(ANN, gamma, x).is_err());
    }

    // -- newton_y -----------------------------------------------------------

    #[test]
    fn y_recovers_balance_on_either_side() {
        let x = [1300.0, 700.0];
        let d = d_of::<WadArithmetic>(x);
        assert!((y_of::<WadArithmetic>(x, d, 1) - 700.0).abs() < 1e-6);
        assert!((y_of::<WadArithmetic>(x, d, 0) - 1300.0).abs() < 1e-6);
    }

    #[test]
    fn y_keeps_invariant_after_trade() {
        let x = [5000.0, 5000.0];
        let d = d_of::<FloatArithmetic>(x);
        let moved = [5250.0, 5000.0];
        let y = y_of::<FloatArithmetic>(moved, d, 1);
        assert!(y < 5000.0);
        let d_after = d_of::<FloatArithmetic>([5250.0, y]);
        assert!((d_after - d).abs() / d < 1e-10);
    }

    #[test]
    fn backends_agree_on_y() {
        let x = [2100.0, 1900.0];
        let d = d_of::<FloatArithmetic>([2000.0, 2000.0]);
        let f = y_of::<FloatArithmetic>(x, d, 1);
        let w = y_of::<WadArithmetic>(x, d, 1);
        assert!((f - w).abs() / w < 1e-12);
    }

    #[test]
    fn y_rejects_bad_index_and_tiny_d() {
        let x = [FloatArithmetic::new(10.0), FloatArithmetic::new(10.0)];
        let gamma = FloatArithmetic::new(GAMMA);
        assert!(matches!(
            newton_y(ANN, gamma, x, FloatArithmetic::new(20.0), 2),
            Err(AmmError::InvalidCoinIndex(_))
        ));
        assert!(matches!(
            newton_y(ANN, gamma, x, FloatArithmetic::new(0.01), 0),
            Err(AmmError::UnsafeValue(_))
        ));
    }
}
