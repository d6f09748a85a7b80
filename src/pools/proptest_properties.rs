//! Property-based tests using `proptest` for crypto-pool invariants.
//!
//! 1. **Swap reversibility**: a round trip A→B→A returns at most the input.
//! 2. **Virtual price monotonicity**: swaps never lower the virtual price.
//! 3. **Fee bounds**: the fee rate stays between `mid_fee` and `out_fee`.
//! 4. **Liquidity conservation**: deposit then withdraw returns at most
//!    the deposit, and nearly all of it.
//! 5. **Price movement direction**: selling A makes B dearer.
//! 6. **Invariant conservation**: `newton_y` at the current `D` recovers
//!    the balance it replaced.
//! 7. **Fee-free trades keep `D`**: a trade solved on the curve leaves the
//!    invariant where it was.
//! 8. **Fee-free round trip**: selling the output straight back returns
//!    the input.

use proptest::prelude::*;

use crate::config::{CryptoPoolConfig, PoolParams, Preset};
use crate::domain::{AccountId, TradeProbe};
use crate::ledger::{Token, TokenLedger};
use crate::math::{Arithmetic, Solver};
use crate::pools::CryptoPool;
use crate::traits::{FromConfig, LiquidityPool, SwapPool};

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn lp() -> AccountId {
    AccountId::new("lp")
}

fn trader() -> AccountId {
    AccountId::new("trader")
}

/// Volatile pool at `price` holding `deposit_a` of A and the matching B.
fn make_pool(arithmetic: Arithmetic, price: f64, deposit_a: f64) -> (CryptoPool, [Token; 2]) {
    let params = PoolParams::preset(Preset::Volatile);
    let Ok(config) = CryptoPoolConfig::new("pool", "AB", params, price) else {
        panic!("valid config");
    };
    let Ok(mut pool) = CryptoPool::from_config(&config.with_arithmetic(arithmetic)) else {
        panic!("valid pool");
    };
    let mut coins = [Token::new("A"), Token::new("B")];
    for coin in &mut coins {
        for account in [lp(), trader()] {
            let Ok(()) = coin.mint(&account, 1e12) else {
                panic!("mint");
            };
        }
    }
    let Ok(_) = pool.add_liquidity(&mut coins, &lp(), deposit_a, f64::INFINITY) else {
        panic!("seed liquidity");
    };
    (pool, coins)
}

// ---------------------------------------------------------------------------
// Custom strategies
// ---------------------------------------------------------------------------

fn arithmetic_strategy() -> impl Strategy<Value = Arithmetic> {
    prop_oneof![Just(Arithmetic::Float), Just(Arithmetic::Wad)]
}

/// Initial price of B in A, in [0.2, 5].
fn price_strategy() -> impl Strategy<Value = f64> {
    (20u32..=500u32).prop_map(|v| f64::from(v) / 100.0)
}

/// Token A deposit in [1 000, 1 000 000].
fn deposit_strategy() -> impl Strategy<Value = f64> {
    (1_000u32..=1_000_000u32).prop_map(f64::from)
}

/// Trade size as a fraction of the input reserve, in [0.1 %, 10 %].
fn fraction_strategy() -> impl Strategy<Value = f64> {
    (1u32..=100u32).prop_map(|v| f64::from(v) / 1_000.0)
}

// ---------------------------------------------------------------------------
// Properties 1-3: swaps
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_swap_reversibility(
        arithmetic in arithmetic_strategy(),
        price in price_strategy(),
        deposit in deposit_strategy(),
        fraction in fraction_strategy(),
    ) {
        let (mut pool, mut coins) = make_pool(arithmetic, price, deposit);
        let dx = deposit * fraction;
        let Ok(dy) = pool.swap_a_for_b(&mut coins, &trader(), dx) else {
            panic!("swap of {dx} A failed");
        };
        let Ok(back) = pool.swap_b_for_a(&mut coins, &trader(), dy) else {
            panic!("swap back of {dy} B failed");
        };
        prop_assert!(back <= dx, "round trip gained: {} > {}", back, dx);
    }

    #[test]
    fn prop_virtual_price_never_falls(
        arithmetic in arithmetic_strategy(),
        price in price_strategy(),
        deposit in deposit_strategy(),
        fractions in proptest::collection::vec(fraction_strategy(), 1..6),
    ) {
        let (mut pool, mut coins) = make_pool(arithmetic, price, deposit);
        let mut last = pool.virtual_price();
        for (k, fraction) in fractions.into_iter().enumerate() {
            let result = if k % 2 == 0 {
                let dx = pool.balances()[0] * fraction;
                pool.swap_a_for_b(&mut coins, &trader(), dx)
            } else {
                let dx = pool.balances()[1] * fraction;
                pool.swap_b_for_a(&mut coins, &trader(), dx)
            };
            prop_assert!(result.is_ok(), "swap {} failed: {:?}", k, result);
            let vp = pool.virtual_price();
            prop_assert!(vp + 1e-10 >= last, "virtual price fell: {} < {}", vp, last);
            last = vp;
        }
    }

    #[test]
    fn prop_fee_rate_within_curve(
        arithmetic in arithmetic_strategy(),
        price in price_strategy(),
        deposit in deposit_strategy(),
        fraction in fraction_strategy(),
    ) {
        let (mut pool, mut coins) = make_pool(arithmetic, price, deposit);
        let params = *pool.params();
        let dx = deposit * fraction;
        let Ok(result) = pool.exchange(&mut coins, &trader(), 0, 1, dx, 0.0, &trader()) else {
            panic!("exchange of {dx} A failed");
        };
        let rate = result.fee() / result.gross_output();
        prop_assert!(rate >= params.mid_fee - 1e-9, "fee rate {} below mid", rate);
        prop_assert!(rate <= params.out_fee + 1e-9, "fee rate {} above out", rate);
    }
}

// ---------------------------------------------------------------------------
// Property 4: Liquidity conservation
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_liquidity_conservation(
        arithmetic in arithmetic_strategy(),
        price in price_strategy(),
        deposit in deposit_strategy(),
        fraction in fraction_strategy(),
    ) {
        let (mut pool, mut coins) = make_pool(arithmetic, price, deposit);
        let amount = deposit * fraction;
        let Ok((da, db)) = pool.add_liquidity(&mut coins, &trader(), amount, f64::INFINITY) else {
            panic!("deposit of {amount} A failed");
        };
        let Ok(withdrawal) = pool.remove_all_liquidity(&mut coins, &trader()) else {
            panic!("withdrawal failed");
        };
        prop_assert!(withdrawal.amount_a() <= da * (1.0 + 1e-9));
        prop_assert!(withdrawal.amount_b() <= db * (1.0 + 1e-9));
        prop_assert!(withdrawal.amount_a() >= da * 0.99);
        prop_assert!(withdrawal.amount_b() >= db * 0.99);
        prop_assert_eq!(pool.get_liquidity(&trader()), 0.0);
    }
}

// ---------------------------------------------------------------------------
// Property 5: Price movement direction
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_selling_a_raises_b_price(
        arithmetic in arithmetic_strategy(),
        price in price_strategy(),
        deposit in deposit_strategy(),
        fraction in fraction_strategy(),
    ) {
        let (mut pool, coins) = make_pool(arithmetic, price, deposit);
        let before_state = pool.snapshot();
        let Ok(before) = pool.get_token_b_price() else {
            panic!("spot price failed");
        };
        let trade = TradeProbe::SellA(deposit * fraction);
        let Ok(after) = pool.get_spot_price_after(&coins, 1, 0, trade) else {
            panic!("price after {trade:?} failed");
        };
        prop_assert!(after > before, "B price did not rise: {} <= {}", after, before);
        prop_assert_eq!(pool.snapshot(), before_state);
        prop_assert_eq!(coins[0].balance_of(&AccountId::new("pool")), pool.balances()[0]);
    }
}

// ---------------------------------------------------------------------------
// Property 6: Invariant conservation
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_newton_y_recovers_balance(
        arithmetic in arithmetic_strategy(),
        x0 in 1_000u32..=1_000_000u32,
        ratio in 20u32..=500u32,
        i in 0usize..2,
    ) {
        let params = PoolParams::preset(Preset::Volatile);
        let solver = Solver::new(arithmetic, params.a, params.gamma);
        let x = [f64::from(x0), f64::from(x0) * f64::from(ratio) / 100.0];
        let Ok(d) = solver.newton_d(x) else {
            panic!("newton_d failed for {x:?}");
        };
        let Ok(y) = solver.newton_y(x, d, i) else {
            panic!("newton_y failed for {x:?} at D = {d}");
        };
        let error = (y - x[i]).abs() / x[i];
        prop_assert!(error < 1e-6, "recovered {} for {} (relative error {})", y, x[i], error);
    }
}

// ---------------------------------------------------------------------------
// Properties 7-8: fee-free trades on the curve
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_fee_free_trade_keeps_d(
        arithmetic in arithmetic_strategy(),
        x0 in 1_000u32..=1_000_000u32,
        ratio in 20u32..=500u32,
        fraction in fraction_strategy(),
    ) {
        let params = PoolParams::preset(Preset::Volatile);
        let solver = Solver::new(arithmetic, params.a, params.gamma);
        let x = [f64::from(x0), f64::from(x0) * f64::from(ratio) / 100.0];
        let Ok(d) = solver.newton_d(x) else {
            panic!("newton_d failed for {x:?}");
        };
        let dx = x[0] * fraction;
        let Ok(y) = solver.newton_y([x[0] + dx, x[1]], d, 1) else {
            panic!("newton_y failed for {dx} on {x:?}");
        };
        prop_assert!(y < x[1], "adding {} of coin 0 did not release coin 1", dx);

        let Ok(d_after) = solver.newton_d([x[0] + dx, y]) else {
            panic!("newton_d failed after the trade");
        };
        let drift = (d_after - d).abs() / d;
        prop_assert!(drift < 1e-9, "D moved from {} to {} (relative {})", d, d_after, drift);
    }

    #[test]
    fn prop_fee_free_round_trip_returns_input(
        arithmetic in arithmetic_strategy(),
        x0 in 1_000u32..=1_000_000u32,
        ratio in 20u32..=500u32,
        fraction in fraction_strategy(),
    ) {
        let params = PoolParams::preset(Preset::Volatile);
        let solver = Solver::new(arithmetic, params.a, params.gamma);
        let x = [f64::from(x0), f64::from(x0) * f64::from(ratio) / 100.0];
        let Ok(d) = solver.newton_d(x) else {
            panic!("newton_d failed for {x:?}");
        };
        let dx = x[0] * fraction;
        let Ok(y) = solver.newton_y([x[0] + dx, x[1]], d, 1) else {
            panic!("newton_y failed for {dx} on {x:?}");
        };
        let dy = x[1] - y;

        // Sell the received coin 1 straight back.
        let Ok(x0_back) = solver.newton_y([x[0] + dx, y + dy], d, 0) else {
            panic!("newton_y failed selling {dy} back");
        };
        let returned = x[0] + dx - x0_back;
        let tolerance = 1e-9 * (x[0] + x[1]);
        prop_assert!(
            (returned - dx).abs() <= tolerance,
            "sold {} and got {} back", dx, returned
        );
    }
}
