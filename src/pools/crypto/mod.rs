//! Two-coin crypto pool (Curve V2 style).
//!
//! Unlike a StableSwap pool, the two coins are not expected to trade at
//! par.  The pool keeps an internal `price_scale` (price of B in A),
//! trades on balances scaled by it, and moves it towards an EMA oracle
//! of its own trade prices whenever it has earned enough profit to pay
//! for the move.
//!
//! # Invariant
//!
//! ```text
//! K · D · N · Σx + Πx = K · D^N + (D/N)^N
//! K = A · K0 · γ² / (γ + 1 − K0)²,   K0 = Πx · N^N / D^N
//! x = [balance_A, balance_B · price_scale]
//! ```
//!
//! # Operation Map
//!
//! | Operation | File |
//! |-----------|------|
//! | construction, accessors, time, kill switch | this module |
//! | state, snapshot, [`Speculation`] guard | `state` |
//! | `tweak_price`, `claim_admin_fees` | `tweak` |
//! | `exchange`, `get_dy`, swap wrappers | `exchange` |
//! | deposits and withdrawals | `liquidity` |
//! | spot prices, slippage and target-price searches | `quote` |
//!
//! # Ledgers
//!
//! The pool owns its LP [`Token`] but not the coin ledgers: mutating
//! calls take `coins: &mut [L; 2]` for token A and token B, move funds
//! through [`TokenLedger`] before touching pool state, and reverse those
//! transfers if a later step fails.

mod exchange;
mod liquidity;
mod quote;
mod state;
mod tweak;

pub use state::{PoolState, Speculation};

use tracing::debug;

use crate::config::{CryptoPoolConfig, PoolParams};
use crate::domain::AccountId;
use crate::error::{AmmError, Result};
use crate::ledger::{Token, TokenLedger};
use crate::math::{xcp, Arithmetic, Solver};
use crate::traits::{FromConfig, LiquidityPool};

/// Seconds in one simulated iteration.
pub const SECONDS_PER_ITERATION: u64 = 86_400;

/// Account that receives minted probe inputs during quotes.
pub const SIMULATION_ACCOUNT: &str = "Simulation";

/// Two-coin crypto pool with a re-pegging price scale.
///
/// # Examples
///
/// ```
/// use twocrypto_sim::config::{CryptoPoolConfig, PoolParams, Preset};
/// use twocrypto_sim::domain::AccountId;
/// use twocrypto_sim::ledger::{Token, TokenLedger};
/// use twocrypto_sim::pools::CryptoPool;
/// use twocrypto_sim::traits::{FromConfig, SwapPool};
///
/// let config = CryptoPoolConfig::new("pool", "AB", PoolParams::preset(Preset::Volatile), 1.5)?;
/// let mut pool = CryptoPool::from_config(&config)?;
/// let alice = AccountId::new("alice");
/// let mut coins = [Token::new("A"), Token::new("B")];
/// coins[0].mint(&alice, 10_000.0)?;
/// coins[1].mint(&alice, 10_000.0)?;
///
/// pool.add_liquidity(&mut coins, &alice, 1_000.0, 1_000.0)?;
/// let out = pool.swap_a_for_b(&mut coins, &alice, 10.0)?;
/// assert!(out > 0.0 && out < 10.0 / 1.5);
/// assert!(pool.get_token_b_price()? > 1.4);
/// # Ok::<(), twocrypto_sim::error::AmmError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CryptoPool {
    pool_account: AccountId,
    admin_fee_receiver: AccountId,
    params: PoolParams,
    solver: Solver,
    state: PoolState,
    block_timestamp: u64,
    is_killed: bool,
}

impl CryptoPool {
    // -- Accessors ----------------------------------------------------------

    /// Account holding the pool's coins.
    #[must_use]
    pub const fn pool_account(&self) -> &AccountId {
        &self.pool_account
    }

    /// Account credited with admin fees.
    #[must_use]
    pub const fn admin_fee_receiver(&self) -> &AccountId {
        &self.admin_fee_receiver
    }

    /// Curve parameters.
    #[must_use]
    pub const fn params(&self) -> &PoolParams {
        &self.params
    }

    /// Solver backend in use.
    #[must_use]
    pub const fn arithmetic(&self) -> Arithmetic {
        self.solver.arithmetic()
    }

    /// Read-only view of the mutable state.
    #[must_use]
    pub const fn state(&self) -> &PoolState {
        &self.state
    }

    /// Internal price of B in A.
    #[must_use]
    pub const fn price_scale(&self) -> f64 {
        self.state.price_scale
    }

    /// EMA price oracle.
    #[must_use]
    pub const fn price_oracle(&self) -> f64 {
        self.state.price_oracle
    }

    /// Last observed trade price.
    #[must_use]
    pub const fn last_prices(&self) -> f64 {
        self.state.last_prices
    }

    /// Cached invariant `D`.
    #[must_use]
    pub const fn d(&self) -> f64 {
        self.state.d
    }

    /// Value of one LP share.
    #[must_use]
    pub const fn virtual_price(&self) -> f64 {
        self.state.virtual_price
    }

    /// Cumulative profit counter.
    #[must_use]
    pub const fn xcp_profit(&self) -> f64 {
        self.state.xcp_profit
    }

    /// Profit counter at the last admin claim.
    #[must_use]
    pub const fn xcp_profit_a(&self) -> f64 {
        self.state.xcp_profit_a
    }

    /// LP shares withheld as deposit fees so far.
    #[must_use]
    pub const fn fees_accrued_lp(&self) -> f64 {
        self.state.fees_accrued_lp
    }

    // -- Time ---------------------------------------------------------------

    /// Current block time in seconds.
    #[must_use]
    pub const fn block_timestamp(&self) -> u64 {
        self.block_timestamp
    }

    /// Sets the block time used by the oracle.
    pub fn set_block_timestamp(&mut self, timestamp: u64) {
        self.block_timestamp = timestamp;
    }

    /// Sets the block time to `iteration` simulated days.
    pub fn set_iteration(&mut self, iteration: u64) {
        self.block_timestamp = iteration.saturating_mul(SECONDS_PER_ITERATION);
    }

    // -- Admin --------------------------------------------------------------

    /// `true` once the pool has been killed.
    #[must_use]
    pub const fn is_killed(&self) -> bool {
        self.is_killed
    }

    /// Stops exchanges and deposits.  Withdrawals remain possible.
    pub fn kill(&mut self) {
        debug!(pool = %self.pool_account, "pool killed");
        self.is_killed = true;
    }

    /// Re-enables a killed pool.
    pub fn unkill(&mut self) {
        debug!(pool = %self.pool_account, "pool unkilled");
        self.is_killed = false;
    }

    // -- Helpers ------------------------------------------------------------

    fn ensure_alive(&self) -> Result<()> {
        if self.is_killed {
            return Err(AmmError::PoolKilled);
        }
        Ok(())
    }

    /// Balances scaled into the invariant's units.
    fn scaled(&self, balances: [f64; 2]) -> [f64; 2] {
        [balances[0], balances[1] * self.state.price_scale]
    }

    fn get_xcp(&self, d: f64) -> f64 {
        xcp(d, self.state.price_scale)
    }
}

/// One ledger movement of a multi-leg settlement.
#[derive(Debug, Clone, Copy)]
struct Leg<'a> {
    coin: usize,
    from: &'a AccountId,
    to: &'a AccountId,
    amount: f64,
}

/// Performs `legs` in order.  If one fails, the legs already done are
/// reversed and the original error is returned.
fn settle<L: TokenLedger>(coins: &mut [L; 2], legs: &[Leg<'_>]) -> Result<()> {
    for (done, leg) in legs.iter().enumerate() {
        if leg.amount == 0.0 {
            continue;
        }
        if let Err(err) = coins[leg.coin].transfer(leg.from, leg.to, leg.amount) {
            unwind(coins, &legs[..done])?;
            return Err(err);
        }
    }
    Ok(())
}

/// Reverses settled `legs`, last first.
fn unwind<L: TokenLedger>(coins: &mut [L; 2], legs: &[Leg<'_>]) -> Result<()> {
    for leg in legs.iter().rev() {
        if leg.amount == 0.0 {
            continue;
        }
        coins[leg.coin].transfer(leg.to, leg.from, leg.amount)?;
    }
    Ok(())
}

impl FromConfig<CryptoPoolConfig> for CryptoPool {
    /// Builds an empty pool.
    ///
    /// Balances and `D` start at zero; `price_scale`, `price_oracle` and
    /// `last_prices` start at the configured price.  The first deposit
    /// sets the virtual price to one.
    ///
    /// # Errors
    ///
    /// Returns the first [`CryptoPoolConfig::validate`] failure.
    fn from_config(config: &CryptoPoolConfig) -> Result<Self> {
        config.validate()?;
        let params = *config.params();
        Ok(Self {
            pool_account: config.pool_account().clone(),
            admin_fee_receiver: config.admin_fee_receiver().clone(),
            params,
            solver: Solver::new(config.arithmetic(), params.a, params.gamma),
            state: PoolState::initial(config.lp_symbol(), config.initial_price()),
            block_timestamp: 0,
            is_killed: false,
        })
    }
}

impl LiquidityPool for CryptoPool {
    fn lp_token(&self) -> &Token {
        &self.state.lp_token
    }

    fn fees_accrued(&self) -> [f64; 2] {
        self.state.fees_accrued
    }

    /// Uses the reserve ratio, or `price_scale` while the pool holds no B.
    fn get_a_amount_for_liquidity(&self, amount_b: f64) -> f64 {
        let [a, b] = self.state.balances;
        if b == 0.0 {
            return amount_b * self.state.price_scale;
        }
        amount_b * a / b
    }

    /// Uses the reserve ratio, or `price_scale` while the pool holds no A.
    fn get_b_amount_for_liquidity(&self, amount_a: f64) -> f64 {
        let [a, b] = self.state.balances;
        if a == 0.0 {
            return amount_a / self.state.price_scale;
        }
        amount_a * b / a
    }
}
