//! Precision trait for the solver's numeric backends.
//!
//! The [`Precision`] trait abstracts over numeric types so that the
//! invariant solvers are written once and run either on real-valued
//! floats or on 18-decimal fixed-point integers.  The backend is picked
//! at runtime through [`Arithmetic`](super::Arithmetic):
//!
//! | Backend | Type | `one()` | `ulp()` | Division |
//! |---------|------|---------|---------|----------|
//! | `Float` | `FloatArithmetic` | `1.0` | `1e-18` | IEEE 754 |
//! | `Wad` | `WadArithmetic` | `10^18` | `1` | truncating |
//!
//! # Units
//!
//! Formulas written against this trait keep the dimensions of the
//! on-chain pool: a quantity is "scaled" (a multiple of `one()`), a raw
//! dimensionless integer comes from [`Precision::from_u128`], and the
//! smallest fixed-point increment is [`Precision::ulp`].  A product of
//! two scaled values carries `one()` twice; dividing by `one()` brings it
//! back.  With these rules the same expression reproduces the integer
//! truncation of the contract on the wad backend and plain real
//! arithmetic on the float backend.

use core::fmt::Debug;
use core::ops::{Add, Div, Mul, Sub};

use crate::error::Result;

/// Abstraction over numeric types used in the invariant solvers.
///
/// The operator traits (`Add`, `Sub`, `Mul`, `Div`) are the unchecked
/// primitives behind [`unsafe_add`](super::unsafe_add) and friends; the
/// `checked_*` methods are the default.
///
/// # Contract
///
/// - Checked arithmetic returns [`Err`] on overflow, on a negative result
///   (values are unsigned on both backends) and on division by zero.
/// - [`Precision::from_f64`] rejects negative and non-finite inputs.
/// - `zero()` and `one()` return the additive identity and the scaled
///   unit.
pub trait Precision:
    Copy
    + Debug
    + PartialEq
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
{
    /// Iteration cap for the counter-balance solver.
    const MAX_NEWTON_Y_ITERATIONS: usize;

    // -- Identity constants -------------------------------------------------

    /// Returns zero.
    #[must_use]
    fn zero() -> Self;

    /// Returns the scaled unit (the representation of `1.0`).
    #[must_use]
    fn one() -> Self;

    /// Returns the smallest fixed-point increment, `10^-18` in real terms.
    #[must_use]
    fn ulp() -> Self;

    // -- Conversions --------------------------------------------------------

    /// Converts a raw dimensionless integer (a multiplier or divisor such
    /// as `N_COINS` or `10^14`).  No scaling is applied.
    #[must_use]
    fn from_u128(value: u128) -> Self;

    /// Converts a real value to its scaled representation.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidQuantity`](crate::error::AmmError::InvalidQuantity)
    /// for negative or non-finite values and
    /// [`AmmError::Overflow`](crate::error::AmmError::Overflow) when the
    /// value does not fit.
    fn from_f64(value: f64) -> Result<Self>;

    /// Converts a scaled value back to a real `f64`, possibly losing
    /// precision.
    #[must_use]
    fn to_f64_lossy(&self) -> f64;

    // -- Checked arithmetic -------------------------------------------------

    /// Checked addition.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`](crate::error::AmmError::Overflow) if
    /// the result is not representable.
    fn checked_add(&self, other: &Self) -> Result<Self>;

    /// Checked subtraction.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Underflow`](crate::error::AmmError::Underflow)
    /// if the result would be negative.
    fn checked_sub(&self, other: &Self) -> Result<Self>;

    /// Checked multiplication.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`](crate::error::AmmError::Overflow) if
    /// the result is not representable.
    fn checked_mul(&self, other: &Self) -> Result<Self>;

    /// Checked division.  The wad backend truncates the quotient, as the
    /// on-chain pool does.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::DivisionByZero`](crate::error::AmmError::DivisionByZero)
    /// if `other` is zero.
    fn checked_div(&self, other: &Self) -> Result<Self>;

    /// Square root of `self · other`, i.e. the geometric mean of two
    /// values carrying the same scale.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`](crate::error::AmmError::Overflow) if
    /// the product is not representable.
    fn geometric_mean(&self, other: &Self) -> Result<Self>;

    // -- Comparison helpers -------------------------------------------------

    /// Returns the smaller of two values.
    #[must_use]
    fn min(&self, other: &Self) -> Self {
        if self <= other {
            *self
        } else {
            *other
        }
    }

    /// Returns the larger of two values.
    #[must_use]
    fn max(&self, other: &Self) -> Self {
        if self >= other {
            *self
        } else {
            *other
        }
    }

    /// Returns `|self - other|` without leaving the unsigned domain.
    #[must_use]
    fn abs_diff(&self, other: &Self) -> Self {
        if self >= other {
            *self - *other
        } else {
            *other - *self
        }
    }

    /// Returns `true` if the value is zero.
    #[must_use]
    fn is_zero(&self) -> bool;
}
