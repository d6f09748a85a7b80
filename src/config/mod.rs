//! Pool configuration.
//!
//! [`PoolParams`] holds the curve parameters (amplification, `gamma`,
//! fees, re-peg tuning), [`Preset`] names the parameter sets used in
//! practice, and [`CryptoPoolConfig`] adds the accounts, the LP symbol,
//! the starting price and the solver backend needed to build a pool.

mod crypto_pool;
mod params;

pub use crypto_pool::{CryptoPoolConfig, DEFAULT_ADMIN_FEE_RECEIVER};
pub use params::{
    PoolParams, Preset, MAX_ADMIN_FEE, MAX_ALLOWED_EXTRA_PROFIT, MAX_FEE, MAX_MA_HALF_TIME,
    MIN_FEE,
};
