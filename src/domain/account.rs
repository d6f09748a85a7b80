//! Ledger account identifier.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Name of an account holding balances on a [`TokenLedger`](crate::ledger::TokenLedger).
///
/// Simulations address users, the pool itself and the admin-fee receiver
/// by name, so the identifier is a plain string wrapper.  Ordering is
/// lexicographic, which keeps ledger iteration deterministic.
///
/// # Examples
///
/// ```
/// use twocrypto_sim::domain::AccountId;
///
/// let alice = AccountId::new("alice");
/// assert_eq!(alice.as_str(), "alice");
/// assert_eq!(AccountId::from("alice"), alice);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Creates an account identifier from any string-like value.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the account name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the name is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for AccountId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for AccountId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
