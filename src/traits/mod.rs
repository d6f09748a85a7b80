//! Trait seams between pools and the simulations that drive them.
//!
//! [`SwapPool`] covers price and value queries, [`LiquidityPool`] adds
//! LP-share accounting on top of it, and [`FromConfig`] is the uniform
//! constructor.  Both query traits carry provided methods derived from a
//! handful of required ones, so a new pool only implements the core
//! quote and balance accessors.

mod from_config;
mod liquidity_pool;
mod swap_pool;

pub use from_config::FromConfig;
pub use liquidity_pool::LiquidityPool;
pub use swap_pool::SwapPool;
