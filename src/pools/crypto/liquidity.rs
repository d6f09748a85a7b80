//! Deposits and withdrawals.
//!
//! Deposits may be imbalanced: the pool charges a fee on the imbalanced
//! part (see [`calc_token_fee`](crate::math::calc_token_fee)) and, for a
//! single-sided deposit, treats the implied price like a trade.
//! Proportional withdrawals are fee-free and leave the virtual price
//! unchanged.

use tracing::debug;

use super::{settle, unwind, CryptoPool, Leg};
use crate::domain::{AccountId, LiquidityDeposit, LiquidityWithdrawal, COIN_A, COIN_B};
use crate::error::{AmmError, Result};
use crate::ledger::{TokenLedger, NEGATIVE_BALANCE_TOLERANCE};
use crate::math::calc_token_fee;
use crate::traits::{LiquidityPool, SwapPool};

/// Haircut applied to the paired B amount in [`CryptoPool::add_liquidity`].
pub const PAIRED_DEPOSIT_HAIRCUT: f64 = 0.999;

/// Single-sided withdrawals below this many A are skipped.
pub const MIN_SINGLE_SIDED_WITHDRAWAL: f64 = 10.0;

/// Deposits minting less than this do not record a price.
const MIN_PRICED_MINT: f64 = 1e-13;

impl CryptoPool {
    /// Deposits `amounts` of `[A, B]` from `sender` and mints LP shares to
    /// `receiver`.
    ///
    /// The first deposit mints `get_xcp(D)` shares, so the virtual price
    /// starts at one.  Later deposits mint in proportion to the growth of
    /// `D`, less the imbalance fee, and run [`CryptoPool::tweak_price`].
    ///
    /// # Errors
    ///
    /// - [`AmmError::PoolKilled`]; [`AmmError::InvalidQuantity`] for
    ///   negative amounts, an empty deposit or nothing minted.
    /// - [`AmmError::Slippage`] if fewer than `min_mint` shares result.
    /// - Ledger, solver and re-peg errors.
    ///
    /// Nothing is changed on error.
    pub fn add_liquidity_amounts<L: TokenLedger>(
        &mut self,
        coins: &mut [L; 2],
        amounts: [f64; 2],
        min_mint: f64,
        sender: &AccountId,
        receiver: &AccountId,
    ) -> Result<LiquidityDeposit> {
        self.ensure_alive()?;
        if amounts.iter().any(|a| !a.is_finite() || *a < 0.0) {
            return Err(AmmError::InvalidQuantity("deposit amounts must not be negative"));
        }
        if amounts[COIN_A] <= 0.0 && amounts[COIN_B] <= 0.0 {
            return Err(AmmError::InvalidQuantity("no coins to add"));
        }

        let old_balances = self.state.balances;
        let balances = [
            old_balances[0] + amounts[0],
            old_balances[1] + amounts[1],
        ];
        let xp = self.scaled(balances);
        let xp_old = self.scaled(old_balances);
        let amountsp: [f64; 2] =
            core::array::from_fn(|k| if amounts[k] > 0.0 { xp[k] - xp_old[k] } else { 0.0 });

        let old_d = self.state.d;
        let d = self.solver.newton_d(xp)?;
        let supply = self.state.lp_token.total_supply();

        let (minted, fee) = if old_d > 0.0 {
            let gross = supply * d / old_d - supply;
            let fee = calc_token_fee(&self.params.fee_curve(), amountsp, xp) * gross;
            (gross - fee, fee)
        } else {
            (self.get_xcp(d), 0.0)
        };
        if minted <= 0.0 {
            return Err(AmmError::InvalidQuantity("nothing minted"));
        }
        if minted < min_mint {
            return Err(AmmError::Slippage {
                amount: minted,
                limit: min_mint,
            });
        }

        let pool_account = self.pool_account.clone();
        let legs = [
            Leg {
                coin: COIN_A,
                from: sender,
                to: &pool_account,
                amount: amounts[COIN_A],
            },
            Leg {
                coin: COIN_B,
                from: sender,
                to: &pool_account,
                amount: amounts[COIN_B],
            },
        ];
        settle(coins, &legs)?;

        let ledgers = &*coins;
        let committed = self.atomically(|pool| {
            pool.state.balances = balances;
            pool.state.lp_token.mint(receiver, minted)?;

            if old_d > 0.0 {
                let price = single_sided_price(amounts, balances, minted, supply + minted);
                pool.tweak_price(ledgers, xp, price, Some(d))?;
            } else {
                pool.state.d = d;
                pool.state.virtual_price = 1.0;
                pool.state.xcp_profit = 1.0;
                pool.state.xcp_profit_a = 1.0;
                pool.state.not_adjusted = false;
            }
            Ok(())
        });
        if let Err(err) = committed {
            unwind(coins, &legs)?;
            return Err(err);
        }

        debug!(
            %receiver,
            amount_a = amounts[COIN_A],
            amount_b = amounts[COIN_B],
            minted,
            fee,
            d,
            "liquidity added"
        );
        Ok(LiquidityDeposit::new(minted, fee))
    }

    /// Deposits `amount_a` of A with the matching amount of B for
    /// `account`.  Returns the `(a, b)` actually deposited.
    ///
    /// The B side is the reserve-ratio amount less a 0.1 % haircut.  The
    /// deposit fee is added to [`CryptoPool::fees_accrued_lp`].
    ///
    /// # Errors
    ///
    /// [`AmmError::Slippage`] if the B side exceeds `max_amount_b`,
    /// otherwise the errors of [`CryptoPool::add_liquidity_amounts`].
    pub fn add_liquidity<L: TokenLedger>(
        &mut self,
        coins: &mut [L; 2],
        account: &AccountId,
        amount_a: f64,
        max_amount_b: f64,
    ) -> Result<(f64, f64)> {
        let amount_b = self.get_b_amount_for_liquidity(amount_a) * PAIRED_DEPOSIT_HAIRCUT;
        if amount_b > max_amount_b {
            return Err(AmmError::Slippage {
                amount: amount_b,
                limit: max_amount_b,
            });
        }
        let deposit =
            self.add_liquidity_amounts(coins, [amount_a, amount_b], 0.0, account, account)?;
        self.state.fees_accrued_lp += deposit.fee();
        Ok((amount_a, amount_b))
    }

    /// Burns up to `liquidity` of `account`'s shares for a proportional
    /// slice of both reserves.
    ///
    /// The amount is clamped to what the account owns.  A holder burning
    /// the whole supply, up to float dust, takes both reserves and leaves
    /// the pool empty.  Allowed on a killed pool.
    ///
    /// # Errors
    ///
    /// [`AmmError::InvalidQuantity`] for a negative amount; ledger errors.
    pub fn remove_liquidity<L: TokenLedger>(
        &mut self,
        coins: &mut [L; 2],
        account: &AccountId,
        liquidity: f64,
    ) -> Result<LiquidityWithdrawal> {
        if !liquidity.is_finite() || liquidity < 0.0 {
            return Err(AmmError::InvalidQuantity("liquidity must not be negative"));
        }
        let liquidity = liquidity.min(self.get_liquidity(account));
        let supply = self.get_total_liquidity();
        if liquidity <= 0.0 || supply <= 0.0 {
            return Ok(LiquidityWithdrawal::default());
        }

        let share = if liquidity + NEGATIVE_BALANCE_TOLERANCE >= supply {
            1.0
        } else {
            liquidity / supply
        };
        let [balance_a, balance_b] = self.state.balances;
        let (amount_a, amount_b) = (balance_a * share, balance_b * share);

        let pool_account = self.pool_account.clone();
        let legs = [
            Leg {
                coin: COIN_A,
                from: &pool_account,
                to: account,
                amount: amount_a,
            },
            Leg {
                coin: COIN_B,
                from: &pool_account,
                to: account,
                amount: amount_b,
            },
        ];
        settle(coins, &legs)?;

        let committed = self.atomically(|pool| {
            pool.state.lp_token.burn(account, liquidity)?;
            pool.state.balances = [balance_a - amount_a, balance_b - amount_b];
            pool.state.d *= 1.0 - share;
            Ok(())
        });
        if let Err(err) = committed {
            unwind(coins, &legs)?;
            return Err(err);
        }

        debug!(%account, amount_a, amount_b, burned = liquidity, "liquidity removed");
        Ok(LiquidityWithdrawal::new(amount_a, amount_b, liquidity))
    }

    /// Burns every share `account` holds.
    ///
    /// # Errors
    ///
    /// Same as [`CryptoPool::remove_liquidity`].
    pub fn remove_all_liquidity<L: TokenLedger>(
        &mut self,
        coins: &mut [L; 2],
        account: &AccountId,
    ) -> Result<LiquidityWithdrawal> {
        let liquidity = self.get_liquidity(account);
        self.remove_liquidity(coins, account, liquidity)
    }

    /// Withdraws roughly `amount_a` worth of A for `account`: a
    /// proportional withdrawal whose B leg is swapped back to A.
    ///
    /// The share withdrawn is sized from the position's value in A, then
    /// capped so that selling its B leg stays within `max_slippage`.
    /// Returns the A received, or `0` for requests under
    /// [`MIN_SINGLE_SIDED_WITHDRAWAL`] and positions worth nothing.
    ///
    /// # Errors
    ///
    /// Errors of the quote, [`CryptoPool::remove_liquidity`] and
    /// [`CryptoPool::swap_b_for_a`].
    pub fn remove_liquidity_single_a<L: TokenLedger + Clone>(
        &mut self,
        coins: &mut [L; 2],
        account: &AccountId,
        amount_a: f64,
        max_slippage: f64,
    ) -> Result<f64> {
        if amount_a < MIN_SINGLE_SIDED_WITHDRAWAL {
            return Ok(0.0);
        }
        let liquidity = self.get_liquidity(account);
        let position_a = self.token_a_balance_of(account);
        let position_b = self.token_b_balance_of(account);

        let swapped = if position_b > 0.0 {
            self.get_dy(COIN_B, COIN_A, position_b)?
        } else {
            0.0
        };
        let potential_a = position_a + swapped;
        if potential_a <= 0.0 {
            return Ok(0.0);
        }
        let mut to_withdraw = liquidity * amount_a / potential_a;

        let max_b = self.get_input_b_for_max_slippage(coins, max_slippage)?;
        if max_b < position_b {
            to_withdraw = to_withdraw.min(liquidity * max_b / position_b);
        }

        let withdrawn = self.remove_liquidity(coins, account, to_withdraw)?;
        if withdrawn.is_empty() {
            return Ok(0.0);
        }
        let swapped = self.swap_b_for_a(coins, account, withdrawn.amount_b())?;
        Ok(withdrawn.amount_a() + swapped)
    }

    /// Withdraws `account`'s whole position as token A.
    ///
    /// # Errors
    ///
    /// Same as [`CryptoPool::remove_liquidity`] and
    /// [`CryptoPool::swap_b_for_a`].
    pub fn remove_all_liquidity_single_a<L: TokenLedger>(
        &mut self,
        coins: &mut [L; 2],
        account: &AccountId,
    ) -> Result<f64> {
        let withdrawn = self.remove_all_liquidity(coins, account)?;
        if withdrawn.is_empty() {
            return Ok(0.0);
        }
        let swapped = self.swap_b_for_a(coins, account, withdrawn.amount_b())?;
        Ok(withdrawn.amount_a() + swapped)
    }
}

/// Price of B in A implied by a one-coin deposit, `0` for a two-coin one.
///
/// Solves `p · (dx_i − minted/supply · x_i) = minted/supply · x_k` for the
/// deposited coin `i`, with `supply` already including `minted`.
fn single_sided_price(amounts: [f64; 2], balances: [f64; 2], minted: f64, supply: f64) -> f64 {
    if minted <= MIN_PRICED_MINT || (amounts[0] != 0.0 && amounts[1] != 0.0) {
        return 0.0;
    }
    let (ix, other) = if amounts[0] == 0.0 { (1, 0) } else { (0, 1) };
    let share = minted / supply;
    let price = balances[other] * share / (amounts[ix] - share * balances[ix]);
    if ix == 0 {
        1.0 / price
    } else {
        price
    }
}
