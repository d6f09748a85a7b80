//! Construction of pools from their configuration.
//!
//! [`FromConfig`] gives every pool the same entry point: validate a
//! configuration, then build a pool in its initial state.  A pool that
//! was constructed successfully satisfies all of its invariants.

use crate::error::AmmError;

/// Builds a pool from a configuration value.
///
/// # Implementors
///
/// - `impl FromConfig<CryptoPoolConfig> for CryptoPool`
///
/// # Errors
///
/// Returns [`AmmError::InvalidConfiguration`] (or a more specific
/// variant) if the configuration is invalid.
pub trait FromConfig<C> {
    /// Creates a new pool from `config`.
    ///
    /// The configuration is taken by reference so the caller can reuse
    /// it, for instance to build several identical pools for a parameter
    /// sweep.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidConfiguration`] if a parameter is out of
    ///   range or inconsistent.
    /// - [`AmmError::InvalidPrice`] if the starting price is unusable.
    fn from_config(config: &C) -> Result<Self, AmmError>
    where
        Self: Sized;
}
