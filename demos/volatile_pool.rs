//! Volatile crypto pool walkthrough.
//!
//! Seeds a two-coin pool at a B price of 2 A, trades it for a week of
//! simulated days and shows how `price_scale`, the oracle and the virtual
//! price respond, then asks the pool how much A it can absorb within 1 %
//! slippage.
//!
//! # Run
//!
//! ```bash
//! RUST_LOG=twocrypto_sim=debug cargo run --example volatile_pool
//! ```

use tracing_subscriber::EnvFilter;
use twocrypto_sim::prelude::*;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Volatile crypto pool ===\n");

    // ── 1. Configure the pool ───────────────────────────────────────────
    let params = PoolParams::preset(Preset::Volatile);
    let config = CryptoPoolConfig::new("pool", "AB", params, 2.0)?;
    let mut pool = CryptoPool::from_config(&config)?;

    println!("Fees:            mid {} / out {}", params.mid_fee, params.out_fee);
    println!("Initial price:   {} A per B", pool.price_scale());

    // ── 2. Fund accounts and seed liquidity ─────────────────────────────
    let lp = AccountId::new("lp");
    let trader = AccountId::new("trader");
    let mut coins = [Token::new("A"), Token::new("B")];
    for coin in &mut coins {
        coin.mint(&lp, 1_000_000.0)?;
        coin.mint(&trader, 1_000_000.0)?;
    }

    let (deposit_a, deposit_b) = pool.add_liquidity(&mut coins, &lp, 200_000.0, f64::INFINITY)?;
    println!("\nSeeded with {deposit_a:.2} A and {deposit_b:.2} B");
    println!("LP supply:       {:.4}", pool.get_total_liquidity());

    // ── 3. Trade through a week of simulated days ───────────────────────
    //    The trader buys B every day; the pool's oracle follows the
    //    rising price and price_scale is re-pegged once profit allows.
    println!("\n{:>4} {:>12} {:>12} {:>12} {:>12}", "day", "spot B", "oracle", "scale", "vp");
    for day in 1..=7 {
        pool.set_iteration(day);
        let received = pool.swap_a_for_b(&mut coins, &trader, 4_000.0)?;
        let sold_back = received * 0.25;
        pool.swap_b_for_a(&mut coins, &trader, sold_back)?;

        println!(
            "{day:>4} {:>12.6} {:>12.6} {:>12.6} {:>12.8}",
            pool.get_token_b_price()?,
            pool.price_oracle(),
            pool.price_scale(),
            pool.virtual_price(),
        );
    }

    // ── 4. Fee accounting ───────────────────────────────────────────────
    let [fees_a, fees_b] = pool.fees_accrued();
    println!("\nFees accrued:    {fees_a:.4} A / {fees_b:.4} B");
    println!("Fees in A:       {:.4}", pool.get_accrued_fees_in_token_a()?);
    println!("xcp_profit:      {:.8}", pool.xcp_profit());

    let minted = pool.claim_admin_fees(&coins)?;
    println!("Admin LP minted: {minted:.6}");

    // ── 5. Quotes leave the pool untouched ──────────────────────────────
    let before = pool.snapshot();
    let max_input = pool.get_input_a_for_max_slippage(&coins, 0.01)?;
    let slippage = pool.get_slippage_from_input_a(&coins, max_input)?;
    println!("\nLargest A trade within 1 % slippage: {max_input:.2} (slippage {slippage:.5})");
    assert_eq!(pool.snapshot(), before);

    // ── 6. Withdraw everything ──────────────────────────────────────────
    let withdrawal = pool.remove_all_liquidity(&mut coins, &lp)?;
    println!(
        "\nLP withdrew {:.2} A and {:.2} B",
        withdrawal.amount_a(),
        withdrawal.amount_b()
    );
    println!("LP supply left:  {:.6}", pool.get_total_liquidity());

    Ok(())
}
