//! Configuration for two-coin crypto pools (Curve V2 style).

use serde::{Deserialize, Serialize};

use super::PoolParams;
use crate::domain::AccountId;
use crate::error::AmmError;
use crate::math::Arithmetic;

/// Account that receives the admin share of profits unless configured
/// otherwise.
pub const DEFAULT_ADMIN_FEE_RECEIVER: &str = "Curve Admin";

fn default_admin_fee_receiver() -> AccountId {
    AccountId::new(DEFAULT_ADMIN_FEE_RECEIVER)
}

/// Configuration for a [`CryptoPool`](crate::pools::CryptoPool).
///
/// The pool account holds the pool's coins on the token ledgers; the
/// admin-fee receiver is credited LP shares when profits are claimed.
/// `initial_price` is the starting `price_scale`, the price of coin B in
/// units of coin A.
///
/// The struct deserializes from any serde format; `admin_fee_receiver`
/// and `arithmetic` are optional there.  Deserialized values are not
/// validated until [`CryptoPoolConfig::validate`] (or pool construction)
/// runs.
///
/// # Validation
///
/// - [`PoolParams::validate`] passes.
/// - `initial_price` is finite and positive.
/// - `pool_account` and `admin_fee_receiver` are non-empty and distinct.
/// - `lp_symbol` is non-empty.
///
/// # Examples
///
/// ```
/// use twocrypto_sim::config::{CryptoPoolConfig, PoolParams, Preset};
/// use twocrypto_sim::math::Arithmetic;
///
/// let config = CryptoPoolConfig::new(
///     "pool",
///     "ETHUSD",
///     PoolParams::preset(Preset::Volatile),
///     1500.0,
/// )?
/// .with_arithmetic(Arithmetic::Float);
/// assert_eq!(config.admin_fee_receiver().as_str(), "Curve Admin");
/// # Ok::<(), twocrypto_sim::error::AmmError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CryptoPoolConfig {
    pool_account: AccountId,
    #[serde(default = "default_admin_fee_receiver")]
    admin_fee_receiver: AccountId,
    lp_symbol: String,
    params: PoolParams,
    initial_price: f64,
    #[serde(default)]
    arithmetic: Arithmetic,
}

impl CryptoPoolConfig {
    /// Creates a validated configuration using the wad backend and the
    /// default admin-fee receiver.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidConfiguration`] if any rule listed on
    /// the type fails.
    pub fn new(
        pool_account: impl Into<AccountId>,
        lp_symbol: impl Into<String>,
        params: PoolParams,
        initial_price: f64,
    ) -> Result<Self, AmmError> {
        let config = Self {
            pool_account: pool_account.into(),
            admin_fee_receiver: default_admin_fee_receiver(),
            lp_symbol: lp_symbol.into(),
            params,
            initial_price,
            arithmetic: Arithmetic::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Replaces the admin-fee receiver.
    #[must_use]
    pub fn with_admin_fee_receiver(mut self, receiver: impl Into<AccountId>) -> Self {
        self.admin_fee_receiver = receiver.into();
        self
    }

    /// Selects the solver backend.
    #[must_use]
    pub const fn with_arithmetic(mut self, arithmetic: Arithmetic) -> Self {
        self.arithmetic = arithmetic;
        self
    }

    /// Validates all configuration invariants.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidConfiguration`] for an out-of-range parameter,
    ///   an empty or shared account, or an empty LP symbol.
    /// - [`AmmError::InvalidPrice`] if `initial_price` is not a finite
    ///   positive number.
    pub fn validate(&self) -> Result<(), AmmError> {
        self.params.validate()?;
        if !(self.initial_price.is_finite() && self.initial_price > 0.0) {
            return Err(AmmError::InvalidPrice(
                "initial price must be finite and positive",
            ));
        }
        if self.pool_account.is_empty() || self.admin_fee_receiver.is_empty() {
            return Err(AmmError::InvalidConfiguration("account names must be non-empty"));
        }
        if self.pool_account == self.admin_fee_receiver {
            return Err(AmmError::InvalidConfiguration(
                "pool account and admin fee receiver must differ",
            ));
        }
        if self.lp_symbol.is_empty() {
            return Err(AmmError::InvalidConfiguration("LP symbol must be non-empty"));
        }
        Ok(())
    }

    /// Returns the account holding the pool's coins.
    #[must_use]
    pub const fn pool_account(&self) -> &AccountId {
        &self.pool_account
    }

    /// Returns the account credited with admin fees.
    #[must_use]
    pub const fn admin_fee_receiver(&self) -> &AccountId {
        &self.admin_fee_receiver
    }

    /// Returns the LP token symbol.
    #[must_use]
    pub fn lp_symbol(&self) -> &str {
        &self.lp_symbol
    }

    /// Returns the curve parameters.
    #[must_use]
    pub const fn params(&self) -> &PoolParams {
        &self.params
    }

    /// Returns the starting price scale.
    #[must_use]
    pub const fn initial_price(&self) -> f64 {
        self.initial_price
    }

    /// Returns the solver backend.
    #[must_use]
    pub const fn arithmetic(&self) -> Arithmetic {
        self.arithmetic
    }
}
