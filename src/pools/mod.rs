//! Pool implementations.
//!
//! | Pool | Style |
//! |------|-------|
//! | [`CryptoPool`] | Curve V2 two-coin crypto pool |
//!
//! A pool is built from its config through
//! [`FromConfig`](crate::traits::FromConfig) and queried through
//! [`SwapPool`](crate::traits::SwapPool) and
//! [`LiquidityPool`](crate::traits::LiquidityPool).  Operations that move
//! coins are inherent methods taking the two coin ledgers.

mod crypto;

pub use crypto::{CryptoPool, PoolState, Speculation, SECONDS_PER_ITERATION, SIMULATION_ACCOUNT};

#[cfg(test)]
#[allow(clippy::panic)]
mod proptest_properties;
