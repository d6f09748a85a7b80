//! Convenience re-exports for common types and traits.
//!
//! ```rust
//! use twocrypto_sim::prelude::*;
//! ```

pub use crate::config::{CryptoPoolConfig, PoolParams, Preset};
pub use crate::domain::{
    AccountId, ExchangeResult, LiquidityDeposit, LiquidityWithdrawal, TradeProbe, TweakOutcome,
    COIN_A, COIN_B,
};
pub use crate::error::{AmmError, Result};
pub use crate::ledger::{Token, TokenLedger};
pub use crate::math::Arithmetic;
pub use crate::pools::CryptoPool;
pub use crate::traits::{FromConfig, LiquidityPool, SwapPool};
