//! Quotes that simulate a trade before reading a price.
//!
//! Every probe runs inside a [`Speculation`](super::Speculation) against
//! clones of the caller's ledgers: the probe input is minted to
//! [`SIMULATION_ACCOUNT`] on the clone, the exchange runs for real
//! (re-peg included), the answer is read, and the guard rolls the pool
//! back.  The caller's ledgers are only ever read.
//!
//! | Method | Answer |
//! |--------|--------|
//! | [`get_spot_price_after`](CryptoPool::get_spot_price_after) | spot price once a probe trade has executed |
//! | [`get_slippage_from_input`](CryptoPool::get_slippage_from_input) | `1 − output / (input · initial_price)` |
//! | [`get_input_for_max_slippage`](CryptoPool::get_input_for_max_slippage) | largest tested input within a slippage bound |
//! | [`get_input_a_amount_from_target_price_b`](CryptoPool::get_input_a_amount_from_target_price_b) | A to sell to lift the B price to a target |

use tracing::debug;

use super::{CryptoPool, SIMULATION_ACCOUNT};
use crate::domain::{check_pair, AccountId, TradeProbe, COIN_A, COIN_B};
use crate::error::{AmmError, Result};
use crate::ledger::TokenLedger;
use crate::traits::SwapPool;

/// Refinements before the max-slippage search gives up.
pub const MAX_SLIPPAGE_STEPS: u32 = 30;

/// Steps before the target-price search gives up.
pub const MAX_TARGET_PRICE_STEPS: u32 = 100;

/// Smallest step of the target-price search, in token A.
const MIN_TARGET_PRICE_STEP: f64 = 100.0;

impl CryptoPool {
    /// Executes `dx` of coin `i` for coin `j` speculatively and hands the
    /// post-trade pool and the output to `read`.
    fn probe<L, R>(
        &mut self,
        coins: &[L; 2],
        i: usize,
        j: usize,
        dx: f64,
        read: impl FnOnce(&CryptoPool, f64) -> Result<R>,
    ) -> Result<R>
    where
        L: TokenLedger + Clone,
    {
        let account = AccountId::new(SIMULATION_ACCOUNT);
        let mut scratch = coins.clone();
        scratch[i].mint(&account, dx)?;

        let mut session = self.speculate();
        let output = session
            .exchange(&mut scratch, &account, i, j, dx, 0.0, &account)?
            .dy();
        read(&*session, output)
    }

    /// Spot price of coin `i` in coin `j` after `probe` has traded.
    ///
    /// Returns the larger of the post-trade spot price and the probe's own
    /// execution price: a re-peg during the probe can leave the spot
    /// below what the trade paid.  Returns `0` when the pool holds none of
    /// coin `i`.
    ///
    /// # Errors
    ///
    /// Errors of the speculative [`CryptoPool::exchange`] and of
    /// [`SwapPool::get_dy`].
    pub fn get_spot_price_after<L: TokenLedger + Clone>(
        &mut self,
        coins: &[L; 2],
        i: usize,
        j: usize,
        probe: TradeProbe,
    ) -> Result<f64> {
        check_pair(i, j)?;
        if self.state.balances[i] == 0.0 {
            return Ok(0.0);
        }
        let amount = probe.amount();
        if amount <= 0.0 {
            return self.get_spot_price(i, j);
        }

        let before = cfg!(debug_assertions).then(|| self.snapshot());
        let price = self.probe(
            coins,
            probe.input_coin(),
            probe.output_coin(),
            amount,
            |pool, output| {
                let execution_price = amount / output;
                Ok(pool.get_spot_price(i, j)?.max(execution_price))
            },
        );
        if let Some(state) = before {
            debug_assert_eq!(state, self.state, "probe leaked into the live state");
        }
        price
    }

    /// Slippage of selling `input` of coin `i` against `initial_price`
    /// (coin `j` per coin `i`).
    ///
    /// # Errors
    ///
    /// [`AmmError::InvalidCoinIndex`], and errors of the speculative
    /// exchange.
    pub fn get_slippage_from_input<L: TokenLedger + Clone>(
        &mut self,
        coins: &[L; 2],
        initial_price: f64,
        i: usize,
        j: usize,
        input: f64,
    ) -> Result<f64> {
        check_pair(i, j)?;
        self.probe(coins, i, j, input, |_, output| {
            Ok(1.0 - output / (input * initial_price))
        })
    }

    /// Slippage of selling `input` of token A, against its spot price.
    /// `0` when the pool has no price.
    ///
    /// # Errors
    ///
    /// Same as [`CryptoPool::get_slippage_from_input`].
    pub fn get_slippage_from_input_a<L: TokenLedger + Clone>(
        &mut self,
        coins: &[L; 2],
        input: f64,
    ) -> Result<f64> {
        let initial_price = self.get_token_a_price()?;
        if initial_price == 0.0 {
            return Ok(0.0);
        }
        self.get_slippage_from_input(coins, initial_price, COIN_A, COIN_B, input)
    }

    /// Slippage of selling `input` of token B, against its spot price.
    /// `0` when the pool has no price.
    ///
    /// # Errors
    ///
    /// Same as [`CryptoPool::get_slippage_from_input`].
    pub fn get_slippage_from_input_b<L: TokenLedger + Clone>(
        &mut self,
        coins: &[L; 2],
        input: f64,
    ) -> Result<f64> {
        let initial_price = self.get_token_b_price()?;
        if initial_price == 0.0 {
            return Ok(0.0);
        }
        self.get_slippage_from_input(coins, initial_price, COIN_B, COIN_A, input)
    }

    /// Largest input of coin `i` found whose slippage stays within
    /// `max_slippage`.
    ///
    /// Starts at a fifth of the reserve and shrinks by a factor in
    /// `[0.5, 0.8]`, faster the worse the slippage.  Returns `0.0` when
    /// [`MAX_SLIPPAGE_STEPS`] refinements were not enough; callers must
    /// read that as "no safe input", not as a trade size.
    ///
    /// # Errors
    ///
    /// Same as [`CryptoPool::get_slippage_from_input`].
    pub fn get_input_for_max_slippage<L: TokenLedger + Clone>(
        &mut self,
        coins: &[L; 2],
        initial_price: f64,
        max_slippage: f64,
        i: usize,
        j: usize,
    ) -> Result<f64> {
        check_pair(i, j)?;
        let mut input = self.state.balances[i] / 5.0;
        if input <= 0.0 {
            return Ok(0.0);
        }
        let mut slippage = self.get_slippage_from_input(coins, initial_price, i, j, input)?;
        let mut steps = 0;
        while slippage > max_slippage {
            steps += 1;
            if steps >= MAX_SLIPPAGE_STEPS {
                debug!(i, j, max_slippage, slippage, input, "max-slippage search gave up");
                return Ok(0.0);
            }
            input *= (0.8 - 0.3 * slippage).clamp(0.5, 0.8);
            slippage = self.get_slippage_from_input(coins, initial_price, i, j, input)?;
        }
        Ok(input)
    }

    /// [`CryptoPool::get_input_for_max_slippage`] selling token A.
    ///
    /// # Errors
    ///
    /// Same as [`CryptoPool::get_input_for_max_slippage`].
    pub fn get_input_a_for_max_slippage<L: TokenLedger + Clone>(
        &mut self,
        coins: &[L; 2],
        max_slippage: f64,
    ) -> Result<f64> {
        let initial_price = self.get_token_a_price()?;
        self.get_input_for_max_slippage(coins, initial_price, max_slippage, COIN_A, COIN_B)
    }

    /// [`CryptoPool::get_input_for_max_slippage`] selling token B.
    ///
    /// # Errors
    ///
    /// Same as [`CryptoPool::get_input_for_max_slippage`].
    pub fn get_input_b_for_max_slippage<L: TokenLedger + Clone>(
        &mut self,
        coins: &[L; 2],
        max_slippage: f64,
    ) -> Result<f64> {
        let initial_price = self.get_token_b_price()?;
        self.get_input_for_max_slippage(coins, initial_price, max_slippage, COIN_B, COIN_A)
    }

    /// Token A to sell so the B price reaches `target` (A per B).
    ///
    /// Walks up in equal steps and returns the last input whose resulting
    /// price stayed below the target.  `0` when the pool holds no B or the
    /// price is already at or above the target.
    ///
    /// # Errors
    ///
    /// [`AmmError::TargetPriceUnreachable`] after
    /// [`MAX_TARGET_PRICE_STEPS`] steps, and errors of the probe trades.
    pub fn get_input_a_amount_from_target_price_b<L: TokenLedger + Clone>(
        &mut self,
        coins: &[L; 2],
        target: f64,
    ) -> Result<f64> {
        if self.state.balances[COIN_B] == 0.0 {
            return Ok(0.0);
        }
        let initial_price = self.get_token_b_price()?;
        if target <= initial_price {
            return Ok(0.0);
        }

        let step_amount = (4.0 * self.state.balances[COIN_A]
            / f64::from(MAX_TARGET_PRICE_STEPS)
            * (target / initial_price - 1.0))
            .max(MIN_TARGET_PRICE_STEP);
        let mut input = 0.0;
        let mut price = initial_price;
        let mut steps = 0;
        while target > price {
            input += step_amount;
            price = self.get_spot_price_after(coins, COIN_B, COIN_A, TradeProbe::SellA(input))?;
            steps += 1;
            if steps >= MAX_TARGET_PRICE_STEPS {
                return Err(AmmError::TargetPriceUnreachable {
                    target,
                    reached: price,
                });
            }
        }
        Ok(input - step_amount)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::super::tests::{make_pool, seeded_pool};
    use super::*;
    use crate::ledger::Token;
    use crate::math::Arithmetic;

    #[test]
    fn probes_leave_pool_and_ledgers_untouched() {
        let (mut pool, coins) = seeded_pool(Arithmetic::Wad);
        let before = pool.snapshot();
        let coins_before = coins.clone();
        let Ok(after) = pool.get_spot_price_after(&coins, 1, 0, TradeProbe::SellA(200.0)) else {
            panic!("probe");
        };
        let Ok(now) = pool.get_token_b_price() else {
            panic!("price");
        };
        assert!(after > now);
        assert_eq!(pool.snapshot(), before);
        assert_eq!(coins, coins_before);
        assert_eq!(coins[0].balance_of(&AccountId::new(SIMULATION_ACCOUNT)), 0.0);
    }

    #[test]
    fn selling_b_raises_a_price() {
        let (mut pool, coins) = seeded_pool(Arithmetic::Float);
        let Ok(now) = pool.get_token_a_price() else {
            panic!("price");
        };
        let Ok(after) = pool.get_spot_price_after(&coins, 0, 1, TradeProbe::SellB(100.0)) else {
            panic!("probe");
        };
        // A gets dearer when B floods in.
        assert!(after > now);
    }

    #[test]
    fn slippage_grows_with_size() {
        let (mut pool, coins) = seeded_pool(Arithmetic::Wad);
        let (Ok(small), Ok(large)) = (
            pool.get_slippage_from_input_a(&coins, 10.0),
            pool.get_slippage_from_input_a(&coins, 300.0),
        ) else {
            panic!("slippage");
        };
        assert!(large > small);
        assert!(large < 1.0);
    }

    #[test]
    fn empty_pool_has_no_slippage() {
        let mut pool = make_pool(Arithmetic::Wad, 1.0);
        let coins = [Token::new("A"), Token::new("B")];
        assert!(matches!(pool.get_slippage_from_input_b(&coins, 10.0), Ok(v) if v == 0.0));
        assert!(matches!(pool.get_input_a_for_max_slippage(&coins, 0.01), Ok(v) if v == 0.0));
    }

    #[test]
    fn max_slippage_input_is_within_bound() {
        let (mut pool, coins) = seeded_pool(Arithmetic::Wad);
        let max = 0.02;
        let Ok(input) = pool.get_input_a_for_max_slippage(&coins, max) else {
            panic!("search");
        };
        assert!(input > 0.0 && input <= 200.0);
        let Ok(slippage) = pool.get_slippage_from_input_a(&coins, input) else {
            panic!("slippage");
        };
        assert!(slippage <= max);
    }

    #[test]
    fn impossible_slippage_returns_sentinel() {
        let (mut pool, coins) = seeded_pool(Arithmetic::Float);
        // The fee alone exceeds a negative bound.
        let Ok(input) = pool.get_input_b_for_max_slippage(&coins, -0.5) else {
            panic!("search");
        };
        assert_eq!(input, 0.0);
    }

    #[test]
    fn target_price_search_stops_below_target() {
        let (mut pool, coins) = seeded_pool(Arithmetic::Wad);
        let Ok(now) = pool.get_token_b_price() else {
            panic!("price");
        };
        assert!(matches!(
            pool.get_input_a_amount_from_target_price_b(&coins, now * 0.5),
            Ok(v) if v == 0.0
        ));

        let target = now * 1.2;
        let Ok(input) = pool.get_input_a_amount_from_target_price_b(&coins, target) else {
            panic!("search");
        };
        if input > 0.0 {
            let Ok(reached) =
                pool.get_spot_price_after(&coins, 1, 0, TradeProbe::SellA(input))
            else {
                panic!("probe");
            };
            assert!(reached < target);
        }
    }
}
