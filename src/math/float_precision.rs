//! Floating-point implementation of the [`Precision`] trait.
//!
//! [`FloatArithmetic`] is a newtype over `f64` holding real token units
//! (`one() == 1.0`).  It is the fast path for long simulations where the
//! integer truncation of the on-chain pool does not matter.
//!
//! # Precision characteristics
//!
//! | Aspect | Value |
//! |--------|-------|
//! | Significant digits | ~15–17 |
//! | `ulp()` | `1e-18` (the wad increment, not machine epsilon) |
//! | Negative results | rejected by `checked_sub`, as on the wad backend |
//! | Determinism | Subject to IEEE 754 rounding |

use core::fmt;
use core::ops::{Add, Div, Mul, Sub};

use crate::error::{AmmError, Result};

use super::Precision;

/// IEEE 754 `f64`-backed precision type.
///
/// All checked arithmetic methods return [`Err`] when the result is
/// non-finite (`NaN` or `±∞`) or, for subtraction, negative.
///
/// # Examples
///
/// ```
/// use twocrypto_sim::math::{FloatArithmetic, Precision};
///
/// let a = FloatArithmetic::new(10.0);
/// let b = FloatArithmetic::new(3.0);
/// assert!(a.checked_add(&b).is_ok());
/// assert!(b.checked_sub(&a).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct FloatArithmetic(f64);

impl FloatArithmetic {
    /// Creates a new `FloatArithmetic` from a raw `f64`.
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    /// Returns the underlying `f64` value.
    #[inline]
    #[must_use]
    pub const fn get(&self) -> f64 {
        self.0
    }

    fn finite(value: f64, context: &'static str) -> Result<Self> {
        if value.is_finite() {
            Ok(Self(value))
        } else {
            Err(AmmError::Overflow(context))
        }
    }
}

impl From<f64> for FloatArithmetic {
    #[inline]
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl fmt::Display for FloatArithmetic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

macro_rules! forward_float_op {
    ($($trait:ident :: $method:ident => $op:tt),* $(,)?) => {$(
        impl $trait for FloatArithmetic {
            type Output = Self;

            #[inline]
            fn $method(self, rhs: Self) -> Self {
                Self(self.0 $op rhs.0)
            }
        }
    )*};
}

forward_float_op!(Add::add => +, Sub::sub => -, Mul::mul => *, Div::div => /);

impl Precision for FloatArithmetic {
    const MAX_NEWTON_Y_ITERATIONS: usize = 255;

    #[inline]
    fn zero() -> Self {
        Self(0.0)
    }

    #[inline]
    fn one() -> Self {
        Self(1.0)
    }

    #[inline]
    fn ulp() -> Self {
        Self(1e-18)
    }

    // -- Conversions --------------------------------------------------------

    /// Converts `u128` to `f64`.
    ///
    /// Values above 2^53 lose precision because `f64` has only 53 bits of
    /// mantissa.
    #[inline]
    fn from_u128(value: u128) -> Self {
        #[allow(clippy::cast_precision_loss)]
        Self(value as f64)
    }

    fn from_f64(value: f64) -> Result<Self> {
        if !value.is_finite() || value < 0.0 {
            return Err(AmmError::InvalidQuantity(
                "solver input must be finite and non-negative",
            ));
        }
        Ok(Self(value))
    }

    #[inline]
    fn to_f64_lossy(&self) -> f64 {
        self.0
    }

    // -- Checked arithmetic -------------------------------------------------

    fn checked_add(&self, other: &Self) -> Result<Self> {
        Self::finite(self.0 + other.0, "float addition overflow")
    }

    fn checked_sub(&self, other: &Self) -> Result<Self> {
        let result = self.0 - other.0;
        if result < 0.0 {
            return Err(AmmError::Underflow("float subtraction below zero"));
        }
        Self::finite(result, "float subtraction overflow")
    }

    fn checked_mul(&self, other: &Self) -> Result<Self> {
        Self::finite(self.0 * other.0, "float multiplication overflow")
    }

    /// Divides using IEEE 754 semantics, rounding to nearest.
    fn checked_div(&self, other: &Self) -> Result<Self> {
        if other.0 == 0.0 {
            return Err(AmmError::DivisionByZero);
        }
        Self::finite(self.0 / other.0, "float division overflow")
    }

    fn geometric_mean(&self, other: &Self) -> Result<Self> {
        let product = self.checked_mul(other)?;
        Ok(Self(product.0.sqrt()))
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.0 == 0.0
    }
}
