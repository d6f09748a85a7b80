//! Value types shared by the pool, its ledgers and its callers.
//!
//! Amounts and prices are plain real-valued `f64` token units, as in the
//! simulations this engine serves.  The types here give names to the
//! small records that cross module boundaries: who holds balances,
//! which coin is which, and what an operation produced.

mod account;
mod coin;
mod liquidity_change;
mod swap_result;
mod trade_probe;
mod tweak_outcome;

pub use account::AccountId;
pub use coin::{check_pair, COIN_A, COIN_B, N_COINS};
pub use liquidity_change::{LiquidityDeposit, LiquidityWithdrawal};
pub use swap_result::ExchangeResult;
pub use trade_probe::TradeProbe;
pub use tweak_outcome::TweakOutcome;
