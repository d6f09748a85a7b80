//! Price-scale re-pegging and admin-fee claims.
//!
//! After every exchange and deposit the pool runs [`CryptoPool::tweak_price`]:
//!
//! 1. Decay the oracle towards the last observed price.
//! 2. Record the new trade price (or derive one from the curve).
//! 3. Recompute the virtual price and the profit counter, failing with
//!    [`AmmError::Loss`] if the virtual price dropped.
//! 4. If enough profit is banked, move `price_scale` one step towards
//!    the oracle, keeping the move only if half the profit survives it.
//!
//! When a pending adjustment is abandoned or completes, the admin share
//! of the profit is minted as LP shares.

use tracing::{debug, warn};

use super::CryptoPool;
use crate::domain::TweakOutcome;
use crate::error::{AmmError, Result};
use crate::ledger::TokenLedger;
use crate::math::{halfpow, xcp};

/// Virtual-price drop tolerated as rounding noise.
pub const LOSS_TOLERANCE: f64 = 1e-10;

/// Difference between tracked and ledger balances reported as drift.
pub const BALANCE_DRIFT_TOLERANCE: f64 = 1e-5;

impl CryptoPool {
    /// Updates the oracle, the profit counters and possibly the price
    /// scale for the new scaled balances `xp`.
    ///
    /// `p_i` is the trade price just observed (`0` to derive it from the
    /// curve) and `new_d` the invariant when the caller already knows it.
    /// `coins` is only read, by the admin-fee claim.
    ///
    /// # Errors
    ///
    /// - [`AmmError::Loss`] if the virtual price fell by more than
    ///   [`LOSS_TOLERANCE`].
    /// - Solver errors from recomputing `D` or probing the price.
    ///
    /// On error the pool state is left as it was before the call.
    pub fn tweak_price<L: TokenLedger>(
        &mut self,
        coins: &[L; 2],
        xp: [f64; 2],
        p_i: f64,
        new_d: Option<f64>,
    ) -> Result<TweakOutcome> {
        self.atomically(|pool| pool.repeg(coins, xp, p_i, new_d))
    }

    /// Resynchronises balances with the ledgers and mints the admin share
    /// of accumulated profit.  Returns the LP shares minted.
    ///
    /// # Errors
    ///
    /// Solver errors from recomputing `D`; [`AmmError::DivisionByZero`]
    /// when no LP shares exist.  On error the state is left unchanged.
    pub fn claim_admin_fees<L: TokenLedger>(&mut self, coins: &[L; 2]) -> Result<f64> {
        self.atomically(|pool| pool.claim(coins))
    }

    fn update_oracle(&mut self) -> f64 {
        let state = &mut self.state;
        if state.last_prices_timestamp < self.block_timestamp {
            #[allow(clippy::cast_precision_loss)]
            let half_lives = (self.block_timestamp - state.last_prices_timestamp) as f64
                / self.params.ma_half_time as f64;
            let alpha = halfpow(half_lives);
            state.price_oracle = state.last_prices * (1.0 - alpha) + state.price_oracle * alpha;
            state.last_prices_timestamp = self.block_timestamp;
        }
        state.price_oracle
    }

    fn repeg<L: TokenLedger>(
        &mut self,
        coins: &[L; 2],
        xp: [f64; 2],
        p_i: f64,
        new_d: Option<f64>,
    ) -> Result<TweakOutcome> {
        let price_oracle = self.update_oracle();
        let price_scale = self.state.price_scale;

        let d_unadjusted = match new_d {
            Some(d) => d,
            None => self.solver.newton_d(xp)?,
        };

        self.state.last_prices = if p_i > 0.0 {
            p_i
        } else {
            let dx_price = xp[0] / 1e6;
            let y = self
                .solver
                .newton_y([xp[0] + dx_price, xp[1]], d_unadjusted, 1)?;
            price_scale * dx_price / (xp[1] - y)
        };

        let total_supply = self.state.lp_token.total_supply();
        let old_virtual_price = self.state.virtual_price;
        let (virtual_price, xcp_profit) = if old_virtual_price > 0.0 {
            let virtual_price = xcp(d_unadjusted, price_scale) / total_supply;
            if virtual_price + LOSS_TOLERANCE < old_virtual_price {
                return Err(AmmError::Loss {
                    virtual_price,
                    old_virtual_price,
                });
            }
            let profit = self.state.xcp_profit * virtual_price / old_virtual_price;
            (virtual_price, profit)
        } else {
            (1.0, 1.0)
        };
        self.state.xcp_profit = xcp_profit;

        let norm = (price_oracle / price_scale - 1.0).abs();
        let adjustment_step = self.params.adjustment_step.max(norm / 10.0);

        let mut needs_adjustment = self.state.not_adjusted;
        if !needs_adjustment
            && virtual_price * 2.0 - 1.0 > xcp_profit + 2.0 * self.params.allowed_extra_profit
            && norm > adjustment_step
            && old_virtual_price > 0.0
        {
            needs_adjustment = true;
            self.state.not_adjusted = true;
        }

        if needs_adjustment && norm > adjustment_step && old_virtual_price > 0.0 {
            let p_new =
                (price_scale * (norm - adjustment_step) + adjustment_step * price_oracle) / norm;
            let d = self.solver.newton_d([xp[0], xp[1] * p_new / price_scale])?;
            let candidate_vp = xcp(d, p_new) / total_supply;

            if candidate_vp > 1.0 && 2.0 * candidate_vp - 1.0 > xcp_profit {
                debug!(
                    from = price_scale,
                    to = p_new,
                    oracle = price_oracle,
                    virtual_price = candidate_vp,
                    "price scale re-pegged"
                );
                self.state.price_scale = p_new;
                self.state.d = d;
                self.state.virtual_price = candidate_vp;
                return Ok(TweakOutcome::Repegged);
            }

            self.state.not_adjusted = false;
            self.state.d = d_unadjusted;
            self.state.virtual_price = virtual_price;
            self.claim(coins)?;
            return Ok(TweakOutcome::Rejected);
        }

        self.state.d = d_unadjusted;
        self.state.virtual_price = virtual_price;

        if needs_adjustment {
            self.state.not_adjusted = false;
            self.claim(coins)?;
            return Ok(TweakOutcome::Converged);
        }
        Ok(TweakOutcome::Unchanged)
    }

    fn claim<L: TokenLedger>(&mut self, coins: &[L; 2]) -> Result<f64> {
        for (k, coin) in coins.iter().enumerate() {
            let actual = coin.balance_of(&self.pool_account);
            let tracked = self.state.balances[k];
            if (tracked - actual).abs() > BALANCE_DRIFT_TOLERANCE {
                warn!(
                    coin = coin.symbol(),
                    tracked,
                    actual,
                    "pool balance drifted from ledger, resyncing"
                );
            }
            self.state.balances[k] = actual;
        }

        let xcp_profit_a = self.state.xcp_profit_a;
        let mut xcp_profit = self.state.xcp_profit;
        let mut claimed = 0.0;

        if xcp_profit > xcp_profit_a {
            let fees = (xcp_profit - xcp_profit_a) * self.params.admin_fee / 2.0;
            if fees > 0.0 {
                let vprice = self.state.virtual_price;
                let frac = vprice / (vprice - fees) - 1.0;
                claimed = self.state.lp_token.total_supply() * frac;
                self.state.lp_token.mint(&self.admin_fee_receiver, claimed)?;
                xcp_profit -= 2.0 * fees;
                self.state.xcp_profit = xcp_profit;
                debug!(
                    receiver = %self.admin_fee_receiver,
                    shares = claimed,
                    xcp_profit,
                    "admin fees claimed"
                );
            }
        }

        let total_supply = self.state.lp_token.total_supply();
        if total_supply <= 0.0 {
            return Err(AmmError::DivisionByZero);
        }
        let d = self.solver.newton_d(self.scaled(self.state.balances))?;
        self.state.d = d;
        self.state.virtual_price = self.get_xcp(d) / total_supply;

        if xcp_profit > xcp_profit_a {
            self.state.xcp_profit_a = xcp_profit;
        }
        Ok(claimed)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::super::tests::{alice, make_pool, seeded_pool, POOL};
    use super::*;
    use crate::domain::AccountId;
    use crate::ledger::Token;
    use crate::math::Arithmetic;
    use crate::traits::{LiquidityPool, SwapPool};

    #[test]
    fn oracle_decays_towards_last_price() {
        let mut pool = make_pool(Arithmetic::Float, 1.0);
        pool.state.last_prices = 2.0;
        pool.set_block_timestamp(600);
        let oracle = pool.update_oracle();
        assert!((oracle - 1.5).abs() < 1e-12);
        assert_eq!(pool.state().last_prices_timestamp(), 600);
        // Same block: no further decay.
        assert!((pool.update_oracle() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn unchanged_when_oracle_agrees() {
        let (mut pool, coins) = seeded_pool(Arithmetic::Wad);
        let xp = pool.scaled(pool.balances());
        let Ok(outcome) = pool.tweak_price(&coins, xp, 0.0, None) else {
            panic!("tweak");
        };
        assert_eq!(outcome, TweakOutcome::Unchanged);
        assert!((pool.virtual_price() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn loss_is_fatal_and_restores_state() {
        let (mut pool, coins) = seeded_pool(Arithmetic::Float);
        let before = pool.snapshot();
        let xp = pool.scaled(pool.balances());
        let shrunk = [xp[0] * 0.9, xp[1] * 0.9];
        let Err(err) = pool.tweak_price(&coins, shrunk, 0.0, None) else {
            panic!("expected a loss");
        };
        assert!(matches!(err, AmmError::Loss { .. }));
        assert!(err.is_fatal());
        assert_eq!(pool.snapshot(), before);
    }

    #[test]
    fn profitable_pool_repegs_towards_oracle() {
        let (mut pool, coins) = seeded_pool(Arithmetic::Wad);
        // Bank profit, then point the oracle away from the scale.
        pool.state.xcp_profit = 1.0;
        pool.state.virtual_price = 1.0;
        let xp = pool.scaled(pool.balances());
        let Ok(d) = pool.solver.newton_d(xp) else {
            panic!("D");
        };
        let supply = pool.get_total_liquidity();
        pool.state.lp_token = {
            let mut lp = Token::new("AB");
            let Ok(()) = lp.mint(&alice(), supply * 0.99) else {
                panic!("mint");
            };
            lp
        };
        pool.state.price_oracle = 1.6;
        pool.state.last_prices = 1.6;
        let Ok(outcome) = pool.tweak_price(&coins, xp, 1.6, Some(d)) else {
            panic!("tweak");
        };
        assert_eq!(outcome, TweakOutcome::Repegged);
        assert!(pool.price_scale() > 1.5);
        assert!(pool.price_scale() < 1.6);
        assert!(pool.state().not_adjusted());
    }

    #[test]
    fn price_scale_converges_to_constant_oracle() {
        let (mut pool, coins) = seeded_pool(Arithmetic::Float);
        let oracle = 1.53;
        // Burning LP shares banks virtual-price profit for the steps.
        let supply = pool.get_total_liquidity();
        let Ok(()) = pool.state.lp_token.burn(&alice(), supply * 0.02) else {
            panic!("burn");
        };
        pool.state.price_oracle = oracle;
        pool.state.last_prices = oracle;

        let mut outcomes = Vec::new();
        for day in 1..=120 {
            pool.set_iteration(day);
            let xp = pool.scaled(pool.balances());
            let Ok(outcome) = pool.tweak_price(&coins, xp, oracle, None) else {
                panic!("tweak on day {day}");
            };
            outcomes.push(outcome);
        }

        assert!((oracle / pool.price_scale() - 1.0).abs() <= pool.params().adjustment_step);
        assert!(outcomes.contains(&TweakOutcome::Repegged));
        assert!(outcomes.contains(&TweakOutcome::Converged));
        assert!(!pool.state().not_adjusted());
        assert_eq!(outcomes.last(), Some(&TweakOutcome::Unchanged));
        assert!(pool.virtual_price() > 1.0);
    }

    #[test]
    fn unprofitable_repeg_is_rejected_and_fees_claimed() {
        let (mut pool, coins) = seeded_pool(Arithmetic::Float);
        let d_before = pool.state().d();
        let supply = pool.get_total_liquidity();
        pool.state.not_adjusted = true;
        pool.state.xcp_profit = 1.5;
        pool.state.price_oracle = 1.6;
        pool.state.last_prices = 1.6;

        let xp = pool.scaled(pool.balances());
        let Ok(outcome) = pool.tweak_price(&coins, xp, 1.6, None) else {
            panic!("tweak");
        };

        assert_eq!(outcome, TweakOutcome::Rejected);
        assert_eq!(pool.price_scale(), 1.5);
        assert!(!pool.state().not_adjusted());
        assert!((pool.state().d() - d_before).abs() < 1e-9 * d_before);
        // fees = 0.5 · 0.5 / 2 = 0.125 of a virtual price of 1
        let admin = AccountId::new("Curve Admin");
        let expected = supply * (1.0 / 0.875 - 1.0);
        assert!((pool.get_liquidity(&admin) - expected).abs() < 1e-6);
        assert!((pool.xcp_profit() - 1.25).abs() < 1e-9);
        assert!((pool.xcp_profit_a() - 1.25).abs() < 1e-9);
    }

    #[test]
    fn claim_mints_relative_share_to_admin() {
        let (mut pool, coins) = seeded_pool(Arithmetic::Float);
        pool.state.xcp_profit = 1.02;
        pool.state.xcp_profit_a = 1.0;
        let supply = pool.get_total_liquidity();
        let Ok(claimed) = pool.claim_admin_fees(&coins) else {
            panic!("claim");
        };
        // fees = 0.02 · 0.5 / 2 = 0.005; frac = 1/(1 − 0.005) − 1
        let expected = supply * (1.0 / 0.995 - 1.0);
        assert!((claimed - expected).abs() < 1e-9);
        let admin = AccountId::new("Curve Admin");
        assert!((pool.get_liquidity(&admin) - expected).abs() < 1e-9);
        assert!((pool.xcp_profit() - 1.01).abs() < 1e-12);
        assert!((pool.xcp_profit_a() - 1.01).abs() < 1e-12);
    }

    #[test]
    fn claim_without_profit_only_gulps() {
        let (mut pool, mut coins) = seeded_pool(Arithmetic::Float);
        // Donate coins directly to the pool account.
        let Ok(()) = coins[0].transfer(&alice(), &AccountId::new(POOL), 10.0) else {
            panic!("donation");
        };
        let before = pool.balances()[0];
        let Ok(claimed) = pool.claim_admin_fees(&coins) else {
            panic!("claim");
        };
        assert_eq!(claimed, 0.0);
        assert!((pool.balances()[0] - before - 10.0).abs() < 1e-9);
        assert!(pool.virtual_price() > 1.0);
    }
}
