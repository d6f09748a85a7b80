//! In-memory token ledger.

use std::collections::BTreeMap;

use serde::Serialize;

use super::{TokenLedger, NEGATIVE_BALANCE_TOLERANCE};
use crate::domain::AccountId;
use crate::error::{AmmError, Result};

/// Map-backed [`TokenLedger`] used by simulations and as the pool's LP
/// share register.
///
/// # Examples
///
/// ```
/// use twocrypto_sim::domain::AccountId;
/// use twocrypto_sim::ledger::{Token, TokenLedger};
///
/// let alice = AccountId::new("alice");
/// let bob = AccountId::new("bob");
/// let mut lusd = Token::new("LUSD");
/// lusd.mint(&alice, 100.0)?;
/// lusd.transfer(&alice, &bob, 40.0)?;
/// assert_eq!(lusd.balance_of(&bob), 40.0);
/// assert!(lusd.transfer(&bob, &alice, 41.0).is_err());
/// # Ok::<(), twocrypto_sim::error::AmmError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    symbol: String,
    total_supply: f64,
    balances: BTreeMap<AccountId, f64>,
}

impl Token {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            total_supply: 0.0,
            balances: BTreeMap::new(),
        }
    }

    /// Iterates over accounts with a recorded balance.
    pub fn holders(&self) -> impl Iterator<Item = (&AccountId, f64)> {
        self.balances.iter().map(|(account, balance)| (account, *balance))
    }

    fn check_amount(amount: f64) -> Result<()> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(AmmError::InvalidQuantity(
                "token amount must be finite and non-negative",
            ));
        }
        Ok(())
    }

    fn insufficient(&self, account: &AccountId, amount: f64) -> AmmError {
        AmmError::InsufficientBalance {
            symbol: self.symbol.clone(),
            account: account.to_string(),
            balance: self.balance_of(account),
            amount,
        }
    }
}

impl TokenLedger for Token {
    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn total_supply(&self) -> f64 {
        self.total_supply
    }

    fn balance_of(&self, account: &AccountId) -> f64 {
        self.balances.get(account).copied().unwrap_or(0.0)
    }

    fn mint(&mut self, account: &AccountId, amount: f64) -> Result<()> {
        Self::check_amount(amount)?;
        self.total_supply += amount;
        *self.balances.entry(account.clone()).or_insert(0.0) += amount;
        Ok(())
    }

    fn burn(&mut self, account: &AccountId, amount: f64) -> Result<()> {
        Self::check_amount(amount)?;
        let balance = self.balance_of(account) - amount;
        let supply = self.total_supply - amount;
        if balance < -NEGATIVE_BALANCE_TOLERANCE || supply < -NEGATIVE_BALANCE_TOLERANCE {
            return Err(self.insufficient(account, amount));
        }
        self.total_supply = supply.max(0.0);
        self.balances.insert(account.clone(), balance.max(0.0));
        Ok(())
    }

    fn transfer(&mut self, from: &AccountId, to: &AccountId, amount: f64) -> Result<()> {
        Self::check_amount(amount)?;
        let remaining = self.balance_of(from) - amount;
        if remaining < -NEGATIVE_BALANCE_TOLERANCE {
            return Err(self.insufficient(from, amount));
        }
        self.balances.insert(from.clone(), remaining);
        *self.balances.entry(to.clone()).or_insert(0.0) += amount;
        Ok(())
    }
}
