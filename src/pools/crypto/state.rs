//! Mutable pool state, snapshots and the speculation guard.

use core::ops::{Deref, DerefMut};

use serde::Serialize;

use super::CryptoPool;
use crate::error::Result;
use crate::ledger::Token;

/// Every field a pool operation can change.
///
/// Cloning a `PoolState` is a complete snapshot: restoring it undoes any
/// sequence of exchanges, deposits, withdrawals and re-pegs, including
/// LP mints and burns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolState {
    pub(super) balances: [f64; 2],
    pub(super) price_scale: f64,
    pub(super) price_oracle: f64,
    pub(super) last_prices: f64,
    pub(super) last_prices_timestamp: u64,
    pub(super) d: f64,
    pub(super) virtual_price: f64,
    pub(super) xcp_profit: f64,
    pub(super) xcp_profit_a: f64,
    pub(super) not_adjusted: bool,
    pub(super) lp_token: Token,
    pub(super) fees_accrued: [f64; 2],
    pub(super) fees_accrued_lp: f64,
}

impl PoolState {
    pub(super) fn initial(lp_symbol: &str, initial_price: f64) -> Self {
        Self {
            balances: [0.0, 0.0],
            price_scale: initial_price,
            price_oracle: initial_price,
            last_prices: initial_price,
            last_prices_timestamp: 0,
            d: 0.0,
            virtual_price: 0.0,
            xcp_profit: 0.0,
            xcp_profit_a: 1.0,
            not_adjusted: false,
            lp_token: Token::new(lp_symbol),
            fees_accrued: [0.0, 0.0],
            fees_accrued_lp: 0.0,
        }
    }

    /// Tracked coin balances `[A, B]`.
    #[must_use]
    pub const fn balances(&self) -> [f64; 2] {
        self.balances
    }

    /// Internal price of B in A used to scale balances.
    #[must_use]
    pub const fn price_scale(&self) -> f64 {
        self.price_scale
    }

    /// Exponential moving average of observed prices.
    #[must_use]
    pub const fn price_oracle(&self) -> f64 {
        self.price_oracle
    }

    /// Most recently observed trade price.
    #[must_use]
    pub const fn last_prices(&self) -> f64 {
        self.last_prices
    }

    /// Timestamp of the last oracle update.
    #[must_use]
    pub const fn last_prices_timestamp(&self) -> u64 {
        self.last_prices_timestamp
    }

    /// Cached invariant.
    #[must_use]
    pub const fn d(&self) -> f64 {
        self.d
    }

    /// Value of one LP share in units of the invariant.
    #[must_use]
    pub const fn virtual_price(&self) -> f64 {
        self.virtual_price
    }

    /// Cumulative virtual-price growth.
    #[must_use]
    pub const fn xcp_profit(&self) -> f64 {
        self.xcp_profit
    }

    /// `xcp_profit` at the last admin-fee claim.
    #[must_use]
    pub const fn xcp_profit_a(&self) -> f64 {
        self.xcp_profit_a
    }

    /// `true` while a price-scale adjustment is pending.
    #[must_use]
    pub const fn not_adjusted(&self) -> bool {
        self.not_adjusted
    }

    /// LP-share ledger.
    #[must_use]
    pub const fn lp_token(&self) -> &Token {
        &self.lp_token
    }

    /// Swap fees retained per coin.
    #[must_use]
    pub const fn fees_accrued(&self) -> [f64; 2] {
        self.fees_accrued
    }

    /// LP shares withheld as deposit fees.
    #[must_use]
    pub const fn fees_accrued_lp(&self) -> f64 {
        self.fees_accrued_lp
    }
}

impl CryptoPool {
    /// Captures the full mutable state.
    #[must_use]
    pub fn snapshot(&self) -> PoolState {
        self.state.clone()
    }

    /// Replaces the mutable state with a snapshot.
    pub fn restore(&mut self, state: PoolState) {
        self.state = state;
    }

    /// Opens a speculative session.
    ///
    /// The returned guard derefs to the pool; whatever happens through it
    /// is rolled back when the guard is dropped, whether the caller
    /// returns normally, propagates an error or unwinds.
    ///
    /// # Examples
    ///
    /// ```
    /// use twocrypto_sim::config::{CryptoPoolConfig, PoolParams, Preset};
    /// use twocrypto_sim::pools::CryptoPool;
    /// use twocrypto_sim::traits::FromConfig;
    ///
    /// let config = CryptoPoolConfig::new("pool", "AB", PoolParams::preset(Preset::Volatile), 1.0)?;
    /// let mut pool = CryptoPool::from_config(&config)?;
    /// {
    ///     let mut session = pool.speculate();
    ///     session.set_block_timestamp(86_400);
    ///     session.kill();
    /// }
    /// assert!(!pool.is_killed());
    /// # Ok::<(), twocrypto_sim::error::AmmError>(())
    /// ```
    #[must_use]
    pub fn speculate(&mut self) -> Speculation<'_> {
        let saved = Some(self.snapshot());
        let block_timestamp = self.block_timestamp;
        let is_killed = self.is_killed;
        Speculation {
            pool: self,
            saved,
            block_timestamp,
            is_killed,
        }
    }

    /// Runs `operation`, restoring the state if it fails.
    pub(super) fn atomically<R>(
        &mut self,
        operation: impl FnOnce(&mut Self) -> Result<R>,
    ) -> Result<R> {
        let saved = self.snapshot();
        let result = operation(self);
        if result.is_err() {
            self.restore(saved);
        }
        result
    }
}

/// Guard returned by [`CryptoPool::speculate`].
#[derive(Debug)]
pub struct Speculation<'a> {
    pool: &'a mut CryptoPool,
    saved: Option<PoolState>,
    block_timestamp: u64,
    is_killed: bool,
}

impl Deref for Speculation<'_> {
    type Target = CryptoPool;

    fn deref(&self) -> &CryptoPool {
        self.pool
    }
}

impl DerefMut for Speculation<'_> {
    fn deref_mut(&mut self) -> &mut CryptoPool {
        self.pool
    }
}

impl Drop for Speculation<'_> {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            self.pool.restore(saved);
        }
        self.pool.block_timestamp = self.block_timestamp;
        self.pool.is_killed = self.is_killed;
    }
}
