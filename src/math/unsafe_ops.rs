//! Unchecked arithmetic for expressions whose bounds are already known.
//!
//! The on-chain solvers mark the operations that cannot overflow, go
//! negative or divide by zero (because an enclosing comparison or a
//! precondition rules it out) and skip the checks there.  These helpers
//! keep that marking visible.  On [`WadArithmetic`](super::WadArithmetic)
//! a violated precondition panics inside `U256`; on
//! [`FloatArithmetic`](super::FloatArithmetic) it yields a negative or
//! non-finite value.  Use the `checked_*` methods of
//! [`Precision`](super::Precision) everywhere else.

use core::ops::{Add, Div, Mul, Sub};

/// `a + b`.  Caller guarantees no overflow.
#[inline]
pub fn unsafe_add<T: Add<Output = T>>(a: T, b: T) -> T {
    a + b
}

/// `a - b`.  Caller guarantees `a >= b`.
#[inline]
pub fn unsafe_sub<T: Sub<Output = T>>(a: T, b: T) -> T {
    a - b
}

/// `a * b`.  Caller guarantees no overflow.
#[inline]
pub fn unsafe_mul<T: Mul<Output = T>>(a: T, b: T) -> T {
    a * b
}

/// `a / b`, truncating on integer backends.  Caller guarantees `b != 0`.
#[inline]
pub fn unsafe_div<T: Div<Output = T>>(a: T, b: T) -> T {
    a / b
}
