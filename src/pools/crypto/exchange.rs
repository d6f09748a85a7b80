//! Swaps and the read-only output quote.

use tracing::trace;

use super::{settle, unwind, CryptoPool, Leg};
use crate::domain::{check_pair, AccountId, ExchangeResult, COIN_A, COIN_B};
use crate::error::{AmmError, Result};
use crate::ledger::TokenLedger;
use crate::math::dynamic_fee;
use crate::traits::SwapPool;

/// One unit of the 18-decimal representation, withheld from every output.
pub const ROUNDING_GUARD: f64 = 1e-18;

/// Trades below this size do not record a price.
const MIN_PRICED_AMOUNT: f64 = 1e-13;

impl CryptoPool {
    /// Output and fee for selling `dx` of coin `i`, without side effects.
    fn simulate_exchange(&self, i: usize, j: usize, dx: f64) -> Result<ExchangeResult> {
        let mut balances = self.state.balances;
        balances[i] += dx;
        let mut xp = self.scaled(balances);

        let y = self.solver.newton_y(xp, self.state.d, j)?;
        let mut dy = xp[j] - y - ROUNDING_GUARD;
        xp[j] = y;
        if j > 0 {
            dy /= self.state.price_scale;
        }
        let fee = dynamic_fee(&self.params.fee_curve(), xp) * dy;
        Ok(ExchangeResult::new(dy - fee, fee))
    }

    /// Sells `dx` of coin `i` from `sender` and pays coin `j` to `receiver`.
    ///
    /// The fee is taken from the output and stays in the pool.  After the
    /// transfer the trade price is fed to [`CryptoPool::tweak_price`].
    ///
    /// # Errors
    ///
    /// - [`AmmError::PoolKilled`], [`AmmError::InvalidCoinIndex`] and
    ///   [`AmmError::InvalidQuantity`] for bad input or a non-positive
    ///   output.
    /// - [`AmmError::Slippage`] if the output is below `min_dy`.
    /// - Ledger errors from either transfer.
    /// - Fatal solver or [`AmmError::Loss`] errors from the re-peg.
    ///
    /// On error neither the pool nor the ledgers are changed.
    #[allow(clippy::too_many_arguments)]
    pub fn exchange<L: TokenLedger>(
        &mut self,
        coins: &mut [L; 2],
        sender: &AccountId,
        i: usize,
        j: usize,
        dx: f64,
        min_dy: f64,
        receiver: &AccountId,
    ) -> Result<ExchangeResult> {
        self.ensure_alive()?;
        check_pair(i, j)?;
        if !dx.is_finite() || dx <= 0.0 {
            return Err(AmmError::InvalidQuantity("exchange input must be positive"));
        }

        let quote = self.simulate_exchange(i, j, dx)?;
        let dy = quote.dy();
        if dy <= 0.0 {
            return Err(AmmError::InvalidQuantity("exchange output is not positive"));
        }
        if dy < min_dy {
            return Err(AmmError::Slippage {
                amount: dy,
                limit: min_dy,
            });
        }

        let pool_account = self.pool_account.clone();
        let legs = [
            Leg {
                coin: i,
                from: sender,
                to: &pool_account,
                amount: dx,
            },
            Leg {
                coin: j,
                from: &pool_account,
                to: receiver,
                amount: dy,
            },
        ];
        settle(coins, &legs)?;

        let ledgers = &*coins;
        let tweaked = self.atomically(|pool| {
            pool.state.balances[i] += dx;
            pool.state.balances[j] -= dy;
            pool.state.fees_accrued[j] += quote.fee();

            let price = if dx > MIN_PRICED_AMOUNT && dy > MIN_PRICED_AMOUNT {
                if i == COIN_A {
                    dx / dy
                } else {
                    dy / dx
                }
            } else {
                0.0
            };
            let xp = pool.scaled(pool.state.balances);
            pool.tweak_price(ledgers, xp, price, None)
        });

        match tweaked {
            Ok(outcome) => {
                trace!(
                    i,
                    j,
                    dx,
                    dy,
                    fee = quote.fee(),
                    ?outcome,
                    price_scale = self.state.price_scale,
                    "exchange"
                );
                Ok(quote)
            }
            Err(err) => {
                unwind(coins, &legs)?;
                Err(err)
            }
        }
    }

    /// Sells `amount` of token A for token B.  Returns the B received.
    ///
    /// # Errors
    ///
    /// [`AmmError::InvalidQuantity`] for a negative amount, otherwise the
    /// errors of [`CryptoPool::exchange`].
    pub fn swap_a_for_b<L: TokenLedger>(
        &mut self,
        coins: &mut [L; 2],
        account: &AccountId,
        amount: f64,
    ) -> Result<f64> {
        self.swap(coins, account, COIN_A, COIN_B, amount)
    }

    /// Sells `amount` of token B for token A.  Returns the A received.
    ///
    /// # Errors
    ///
    /// Same as [`CryptoPool::swap_a_for_b`].
    pub fn swap_b_for_a<L: TokenLedger>(
        &mut self,
        coins: &mut [L; 2],
        account: &AccountId,
        amount: f64,
    ) -> Result<f64> {
        self.swap(coins, account, COIN_B, COIN_A, amount)
    }

    fn swap<L: TokenLedger>(
        &mut self,
        coins: &mut [L; 2],
        account: &AccountId,
        i: usize,
        j: usize,
        amount: f64,
    ) -> Result<f64> {
        if amount.is_nan() || amount < 0.0 {
            return Err(AmmError::InvalidQuantity("swap amount must not be negative"));
        }
        if amount == 0.0 {
            return Ok(0.0);
        }
        Ok(self.exchange(coins, account, i, j, amount, 0.0, account)?.dy())
    }
}

impl SwapPool for CryptoPool {
    fn balances(&self) -> [f64; 2] {
        self.state.balances
    }

    fn get_dy(&self, i: usize, j: usize, dx: f64) -> Result<f64> {
        check_pair(i, j)?;
        if !dx.is_finite() || dx < 0.0 {
            return Err(AmmError::InvalidQuantity("quote input must not be negative"));
        }
        if self.state.balances == [0.0, 0.0] {
            return Ok(0.0);
        }
        let dy = self.simulate_exchange(i, j, dx)?.dy();
        if dy <= 0.0 {
            return Err(AmmError::InvalidQuantity("quote output is not positive"));
        }
        Ok(dy)
    }

    /// Samples 2 % of the input reserve: large enough to swamp the
    /// solver's tolerance, small enough to keep price impact low.
    fn get_spot_price(&self, i: usize, j: usize) -> Result<f64> {
        check_pair(i, j)?;
        let reserve = self.state.balances[i];
        if reserve == 0.0 {
            return Ok(0.0);
        }
        let sample = reserve * 0.02;
        Ok(self.get_dy(i, j, sample)? / sample)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::super::tests::{alice, funded_coins, make_pool, seeded_pool, POOL};
    use super::*;
    use crate::math::Arithmetic;
    use crate::traits::LiquidityPool;

    #[test]
    fn swap_moves_coins_and_balances() {
        let (mut pool, mut coins) = seeded_pool(Arithmetic::Wad);
        let before = pool.balances();
        let Ok(dy) = pool.swap_a_for_b(&mut coins, &alice(), 100.0) else {
            panic!("swap");
        };
        // Between constant product and par at price 1.5, minus fees.
        assert!(dy > 58.0 && dy < 100.0 / 1.5);
        let after = pool.balances();
        assert!((after[0] - before[0] - 100.0).abs() < 1e-9);
        assert!((before[1] - after[1] - dy).abs() < 1e-9);

        let pool_account = AccountId::new(POOL);
        assert!((coins[0].balance_of(&pool_account) - after[0]).abs() < 1e-9);
        assert!((coins[1].balance_of(&pool_account) - after[1]).abs() < 1e-9);
        assert!((coins[1].balance_of(&alice()) - (1_000_000.0 - before[1] + dy)).abs() < 1e-6);
    }

    #[test]
    fn get_dy_matches_exchange() {
        let (mut pool, mut coins) = seeded_pool(Arithmetic::Float);
        let Ok(quoted) = pool.get_dy(1, 0, 20.0) else {
            panic!("quote");
        };
        let Ok(paid) = pool.swap_b_for_a(&mut coins, &alice(), 20.0) else {
            panic!("swap");
        };
        assert!((quoted - paid).abs() < 1e-9);
    }

    #[test]
    fn fee_accrues_to_output_coin() {
        let (mut pool, mut coins) = seeded_pool(Arithmetic::Wad);
        let Ok(result) = pool.exchange(&mut coins, &alice(), 0, 1, 50.0, 0.0, &alice()) else {
            panic!("exchange");
        };
        let fees = pool.fees_accrued();
        assert_eq!(fees[0], 0.0);
        assert!((fees[1] - result.fee()).abs() < 1e-15);
        // Volatile preset: fee between mid and out fee.
        let rate = result.fee() / result.gross_output();
        assert!(rate >= 0.0026 - 1e-9 && rate <= 0.0045 + 1e-9);
    }

    #[test]
    fn slippage_rejects_without_side_effects() {
        let (mut pool, mut coins) = seeded_pool(Arithmetic::Wad);
        let before = pool.snapshot();
        let coins_before = coins.clone();
        let result = pool.exchange(&mut coins, &alice(), 0, 1, 10.0, 1_000.0, &alice());
        assert!(matches!(result, Err(AmmError::Slippage { .. })));
        assert_eq!(pool.snapshot(), before);
        assert_eq!(coins, coins_before);
    }

    #[test]
    fn underfunded_sender_is_rejected() {
        let (mut pool, mut coins) = seeded_pool(Arithmetic::Float);
        let bob = AccountId::new("bob");
        let before = pool.snapshot();
        let result = pool.swap_a_for_b(&mut coins, &bob, 5.0);
        assert!(matches!(result, Err(AmmError::InsufficientBalance { .. })));
        assert_eq!(pool.snapshot(), before);
    }

    #[test]
    fn bad_inputs() {
        let (mut pool, mut coins) = seeded_pool(Arithmetic::Float);
        let a = alice();
        assert!(matches!(
            pool.exchange(&mut coins, &a, 0, 0, 1.0, 0.0, &a),
            Err(AmmError::InvalidCoinIndex(_))
        ));
        assert!(matches!(
            pool.exchange(&mut coins, &a, 0, 1, -1.0, 0.0, &a),
            Err(AmmError::InvalidQuantity(_))
        ));
        assert!(matches!(
            pool.swap_b_for_a(&mut coins, &a, -1.0),
            Err(AmmError::InvalidQuantity(_))
        ));
        assert!(matches!(pool.swap_b_for_a(&mut coins, &a, 0.0), Ok(v) if v == 0.0));
    }

    #[test]
    fn empty_pool_quotes() {
        let pool = make_pool(Arithmetic::Wad, 1.0);
        assert!(matches!(pool.get_dy(0, 1, 10.0), Ok(v) if v == 0.0));
        assert!(matches!(pool.get_spot_price(0, 1), Ok(v) if v == 0.0));
    }

    #[test]
    fn spot_prices_are_reciprocal_up_to_fees() {
        let (pool, _) = seeded_pool(Arithmetic::Wad);
        let (Ok(a), Ok(b)) = (pool.get_token_a_price(), pool.get_token_b_price()) else {
            panic!("prices");
        };
        assert!((b / 1.5 - 1.0).abs() < 0.01);
        assert!(a * b < 1.0 && a * b > 0.9);
    }

    #[test]
    fn balanced_deposit_quotes_initial_price_then_trades() {
        let mut pool = make_pool(Arithmetic::Wad, 1.5);
        let mut coins = funded_coins();
        let Ok(_) =
            pool.add_liquidity_amounts(&mut coins, [1_000.0, 1_000.0 / 1.5], 0.0, &alice(), &alice())
        else {
            panic!("deposit");
        };
        assert!(pool.d() > 0.0);
        let Ok(b) = pool.get_token_b_price() else {
            panic!("price");
        };
        assert!((b / 1.5 - 1.0).abs() < 0.01);

        let before = pool.balances();
        let Ok(dy) = pool.swap_a_for_b(&mut coins, &alice(), 100.0) else {
            panic!("swap");
        };
        assert!(dy > 0.0 && dy < 100.0 / 1.5);
        assert!((pool.balances()[0] - before[0] - 100.0).abs() < 1e-9);
    }

    #[test]
    fn swap_raises_virtual_price() {
        let (mut pool, mut coins) = seeded_pool(Arithmetic::Wad);
        let Ok(_) = pool.swap_a_for_b(&mut coins, &alice(), 30.0) else {
            panic!("swap");
        };
        assert!(pool.virtual_price() > 1.0);
        assert!(pool.xcp_profit() > 1.0);
        assert!(pool.get_total_liquidity() > 0.0);
    }
}
