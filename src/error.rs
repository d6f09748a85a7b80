//! Unified error types for the crypto pool engine.
//!
//! All fallible operations across the crate return [`AmmError`] as their
//! error type.  Variants fall into three groups that callers are expected
//! to treat differently:
//!
//! | Group | Variants | Caller reaction |
//! |-------|----------|-----------------|
//! | Fatal | solver non-convergence, unsafe values, `Loss`, arithmetic | abort the run, the parameters or an invariant are broken |
//! | Rejected | `Slippage`, `PoolKilled`, bad index/quantity, insufficient balance | the operation did not happen, state is untouched |
//! | Search | `TargetPriceUnreachable` | the quote helper gave up, pick another target |
//!
//! Balance drift between the pool and its token ledgers is not an error:
//! it is logged with `tracing` and resynchronised.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, AmmError>;

/// Every error the pool, its solvers and its ledgers can produce.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AmmError {
    /// Arithmetic result does not fit the numeric backend.
    #[error("arithmetic overflow: {0}")]
    Overflow(&'static str),

    /// Subtraction would go below zero.
    #[error("arithmetic underflow: {0}")]
    Underflow(&'static str),

    /// Division by a zero value.
    #[error("division by zero")]
    DivisionByZero,

    /// A Newton-Raphson solver exhausted its iteration budget.
    #[error("newton-raphson did not converge: {0}")]
    NewtonRaphsonNonConvergence(&'static str),

    /// A solver precondition (A, gamma, balance ratio, D range) was violated.
    #[error("unsafe value: {0}")]
    UnsafeValue(&'static str),

    /// The virtual price dropped while no parameter ramp was in progress.
    #[error("loss: virtual price fell from {old_virtual_price} to {virtual_price}")]
    Loss {
        /// Virtual price computed for the new state.
        virtual_price: f64,
        /// Virtual price before the operation.
        old_virtual_price: f64,
    },

    /// The caller's limit was not met.
    #[error("slippage: got {amount}, limit {limit}")]
    Slippage {
        /// Amount the operation would produce or require.
        amount: f64,
        /// Caller-supplied bound.
        limit: f64,
    },

    /// The pool has been killed by its admin.
    #[error("the pool is killed")]
    PoolKilled,

    /// Coin index outside `{0, 1}` or input equal to output.
    #[error("invalid coin index: {0}")]
    InvalidCoinIndex(&'static str),

    /// Amount is zero, negative, non-finite or produces nothing.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(&'static str),

    /// Price is zero, negative or non-finite.
    #[error("invalid price: {0}")]
    InvalidPrice(&'static str),

    /// Pool parameters are out of range or inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(&'static str),

    /// A ledger operation would leave an account below zero.
    #[error("insufficient {symbol} balance for {account}: has {balance}, needs {amount}")]
    InsufficientBalance {
        /// Ledger symbol.
        symbol: String,
        /// Offending account.
        account: String,
        /// Balance before the operation.
        balance: f64,
        /// Amount requested.
        amount: f64,
    },

    /// The target-price search stepped past its budget.
    #[error("target price {target} unreachable, search stopped at {reached}")]
    TargetPriceUnreachable {
        /// Requested price.
        target: f64,
        /// Last price reached by the search.
        reached: f64,
    },
}

impl AmmError {
    /// Returns `true` for errors that indicate broken parameters or a
    /// violated pool invariant.  Retrying the same call cannot succeed.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Overflow(_)
                | Self::Underflow(_)
                | Self::DivisionByZero
                | Self::NewtonRaphsonNonConvergence(_)
                | Self::UnsafeValue(_)
                | Self::Loss { .. }
        )
    }

    /// Returns `true` for errors that reject a single operation without
    /// touching pool state.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::Slippage { .. }
                | Self::PoolKilled
                | Self::InvalidCoinIndex(_)
                | Self::InvalidQuantity(_)
                | Self::InvalidPrice(_)
                | Self::InsufficientBalance { .. }
        )
    }
}
