//! # twocrypto-sim
//!
//! Two-coin Curve V2 style crypto pool engine for protocol simulations.
//!
//! The pool trades two coins that are not expected to hold par.  It keeps
//! an internal `price_scale`, prices trades on balances rescaled by it,
//! charges a fee that widens as the pool drifts from balance, and
//! re-pegs `price_scale` towards an EMA oracle of its own trades once it
//! has banked enough profit to pay for the move.
//!
//! # Quick Start
//!
//! ```rust
//! use twocrypto_sim::prelude::*;
//!
//! let params = PoolParams::preset(Preset::Volatile);
//! let config = CryptoPoolConfig::new("pool", "AB", params, 2.0)?;
//! let mut pool = CryptoPool::from_config(&config)?;
//!
//! // The pool settles against ledgers it does not own.
//! let alice = AccountId::new("alice");
//! let mut coins = [Token::new("A"), Token::new("B")];
//! coins[0].mint(&alice, 100_000.0)?;
//! coins[1].mint(&alice, 100_000.0)?;
//!
//! pool.add_liquidity(&mut coins, &alice, 10_000.0, 10_000.0)?;
//! let received = pool.swap_a_for_b(&mut coins, &alice, 100.0)?;
//!
//! assert!(received > 0.0 && received < 50.0);
//! assert!(pool.virtual_price() >= 1.0);
//! # Ok::<(), AmmError>(())
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │  CryptoPoolConfig │  validated parameters, initial price
//! └────────┬─────────┘
//!          │ FromConfig
//!          ▼
//! ┌──────────────────┐     ┌──────────────┐
//! │    CryptoPool     │────▶│ TokenLedger  │  coin A, coin B (caller-owned)
//! └────────┬─────────┘     └──────────────┘
//!          │ Solver (Float | Wad)
//!          ▼
//! ┌──────────────────┐
//! │       math        │  newton_d, newton_y, dynamic fee
//! └──────────────────┘
//! ```
//!
//! # Module Guide
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`domain`] | Value types: [`AccountId`](domain::AccountId), [`ExchangeResult`](domain::ExchangeResult), [`TweakOutcome`](domain::TweakOutcome), … |
//! | [`ledger`] | [`TokenLedger`](ledger::TokenLedger) collaborator and the in-memory [`Token`](ledger::Token) |
//! | [`math`] | Precision backends, invariant solvers, fee engine |
//! | [`config`] | [`PoolParams`](config::PoolParams), presets and [`CryptoPoolConfig`](config::CryptoPoolConfig) |
//! | [`traits`] | [`SwapPool`](traits::SwapPool), [`LiquidityPool`](traits::LiquidityPool), [`FromConfig`](traits::FromConfig) |
//! | [`pools`] | [`CryptoPool`](pools::CryptoPool) and its speculation guard |
//! | [`error`] | [`AmmError`](error::AmmError) unified error enum |
//! | [`prelude`] | Convenience re-exports |
//!
//! # Logging
//!
//! The crate emits [`tracing`] events (re-pegs, admin-fee mints, liquidity
//! changes, balance drift, individual exchanges) and never installs a
//! subscriber.

pub mod config;
pub mod domain;
pub mod error;
pub mod ledger;
pub mod math;
pub mod pools;
pub mod prelude;
pub mod traits;
