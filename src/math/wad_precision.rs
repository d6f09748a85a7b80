//! 18-decimal fixed-point implementation of the [`Precision`] trait.
//!
//! [`WadArithmetic`] stores a real value `v` as the 256-bit integer
//! `floor(v · 10^18)`, the representation used by the on-chain pool.
//! Every quotient truncates, so running the solvers on this backend
//! reproduces the integer rounding of the reference contract.
//!
//! # Precision characteristics
//!
//! | Aspect | Value |
//! |--------|-------|
//! | Resolution | `10^-18` (one wei) |
//! | Range | `0 ..= (2^256 - 1) / 10^18` |
//! | Negative values | not representable |
//! | Determinism | exact integer arithmetic |

use core::fmt;
use core::ops::{Add, Div, Mul, Sub};

use crate::error::{AmmError, Result};

use super::{Precision, U256};

/// `10^18` as a raw `u128`.
pub const WAD: u128 = 1_000_000_000_000_000_000;

/// `U256`-backed fixed-point value with 18 decimals.
///
/// The `Add`/`Sub`/`Mul`/`Div` operator impls are the raw `U256` ones
/// and panic on overflow, underflow or a zero divisor; they exist for the
/// `unsafe_*` helpers, whose callers establish those preconditions.
///
/// # Examples
///
/// ```
/// use twocrypto_sim::math::{Precision, WadArithmetic};
///
/// let x = WadArithmetic::from_f64(1.5)?;
/// assert_eq!(x.raw().low_u128(), 1_500_000_000_000_000_000);
/// assert!((x.to_f64_lossy() - 1.5).abs() < 1e-18);
/// # Ok::<(), twocrypto_sim::error::AmmError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WadArithmetic(U256);

impl WadArithmetic {
    /// Wraps a raw integer already scaled by `10^18`.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: U256) -> Self {
        Self(raw)
    }

    /// Returns the raw integer (value × `10^18`).
    #[inline]
    #[must_use]
    pub const fn raw(&self) -> U256 {
        self.0
    }
}

/// Converts a `U256` to the nearest `f64`, limb by limb.
fn u256_to_f64(value: U256) -> f64 {
    const LIMB: f64 = 18_446_744_073_709_551_616.0; // 2^64
    let U256(limbs) = value;
    #[allow(clippy::cast_precision_loss)]
    let result = limbs
        .iter()
        .rev()
        .fold(0.0, |acc, limb| acc * LIMB + *limb as f64);
    result
}

impl fmt::Display for WadArithmetic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_f64_lossy())
    }
}

impl Add for WadArithmetic {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for WadArithmetic {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Mul for WadArithmetic {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self(self.0 * rhs.0)
    }
}

impl Div for WadArithmetic {
    type Output = Self;

    #[inline]
    fn div(self, rhs: Self) -> Self {
        Self(self.0 / rhs.0)
    }
}

impl Precision for WadArithmetic {
    const MAX_NEWTON_Y_ITERATIONS: usize = 1000;

    #[inline]
    fn zero() -> Self {
        Self(U256::zero())
    }

    #[inline]
    fn one() -> Self {
        Self(U256::from(WAD))
    }

    #[inline]
    fn ulp() -> Self {
        Self(U256::one())
    }

    // -- Conversions --------------------------------------------------------

    #[inline]
    fn from_u128(value: u128) -> Self {
        Self(U256::from(value))
    }

    /// Scales by `10^18` and rounds to the nearest wei.
    fn from_f64(value: f64) -> Result<Self> {
        if !value.is_finite() || value < 0.0 {
            return Err(AmmError::InvalidQuantity(
                "solver input must be finite and non-negative",
            ));
        }
        #[allow(clippy::cast_precision_loss)]
        let (scaled, limit) = ((value * WAD as f64).round(), u128::MAX as f64);
        if scaled >= limit {
            return Err(AmmError::Overflow("value too large for wad conversion"));
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let raw = scaled as u128;
        Ok(Self(U256::from(raw)))
    }

    /// Splits into integer and fractional wei so that values near `1.0`
    /// keep full `f64` precision.
    fn to_f64_lossy(&self) -> f64 {
        let (integer, fraction) = self.0.div_mod(U256::from(WAD));
        #[allow(clippy::cast_precision_loss)]
        let wad = WAD as f64;
        u256_to_f64(integer) + u256_to_f64(fraction) / wad
    }

    // -- Checked arithmetic -------------------------------------------------

    fn checked_add(&self, other: &Self) -> Result<Self> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(AmmError::Overflow("wad addition overflow"))
    }

    fn checked_sub(&self, other: &Self) -> Result<Self> {
        self.0
            .checked_sub(other.0)
            .map(Self)
            .ok_or(AmmError::Underflow("wad subtraction below zero"))
    }

    fn checked_mul(&self, other: &Self) -> Result<Self> {
        self.0
            .checked_mul(other.0)
            .map(Self)
            .ok_or(AmmError::Overflow("wad multiplication overflow"))
    }

    fn checked_div(&self, other: &Self) -> Result<Self> {
        self.0
            .checked_div(other.0)
            .map(Self)
            .ok_or(AmmError::DivisionByZero)
    }

    fn geometric_mean(&self, other: &Self) -> Result<Self> {
        let product = self.checked_mul(other)?;
        Ok(Self(product.0.integer_sqrt()))
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}
