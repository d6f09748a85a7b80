//! Curve parameters of a crypto pool.

use serde::{Deserialize, Serialize};

use crate::error::AmmError;
use crate::math::{FeeCurve, MAX_A, MAX_GAMMA, MIN_A, MIN_GAMMA};

/// Lowest accepted `mid_fee`.
pub const MIN_FEE: f64 = 5e-5;

/// Highest accepted `out_fee`.
pub const MAX_FEE: f64 = 1.0;

/// Highest accepted share of profit routed to the admin.
pub const MAX_ADMIN_FEE: f64 = 1.0;

/// Highest accepted `allowed_extra_profit`.
pub const MAX_ALLOWED_EXTRA_PROFIT: f64 = 0.01;

/// Longest accepted oracle half-life, one week in seconds.
pub const MAX_MA_HALF_TIME: u64 = 7 * 86_400;

/// Named parameter sets.
///
/// | Preset | `A` (raw) | `gamma` | `mid_fee` | `out_fee` |
/// |--------|-----------|---------|-----------|-----------|
/// | `Volatile` | 400 000 | 1.45e-4 | 0.26 % | 0.45 % |
/// | `Forex` | 20 000 000 | 1e-3 | 0.05 % | 0.45 % |
/// | `ChickenBonds` | 200 000 000 | 0.0199 | 0.15 % | 0.30 % |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// Uncorrelated volatile pairs (ETH/USD style).
    Volatile,
    /// Loosely pegged fiat pairs.
    Forex,
    /// Tightly correlated bond/underlying pairs.
    ChickenBonds,
}

/// Immutable curve parameters of a [`CryptoPool`](crate::pools::CryptoPool).
///
/// All fee and profit fields are real fractions (`0.0026` is 0.26 %).
/// `a` is the raw amplification `A · N^N · A_MULTIPLIER` consumed by the
/// solvers.
///
/// # Validation
///
/// | Field | Range |
/// |-------|-------|
/// | `a` | `MIN_A ..= MAX_A` |
/// | `gamma` | `MIN_GAMMA ..= MAX_GAMMA` |
/// | `mid_fee`, `out_fee` | `MIN_FEE <= mid_fee <= out_fee <= MAX_FEE` |
/// | `admin_fee` | `0 ..= MAX_ADMIN_FEE` |
/// | `fee_gamma` | `(0, 1]` |
/// | `allowed_extra_profit` | `0 ..= 0.01` |
/// | `adjustment_step` | `(0, 1]` |
/// | `ma_half_time` | `1 ..= 604800` seconds |
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoolParams {
    /// Raw amplification.
    pub a: u128,
    /// Width of the curve's flat region.
    pub gamma: f64,
    /// Swap fee of a balanced pool.
    pub mid_fee: f64,
    /// Swap fee of a fully imbalanced pool.
    pub out_fee: f64,
    /// Profit that must be kept in reserve before re-pegging.
    pub allowed_extra_profit: f64,
    /// Shape of the transition from `mid_fee` to `out_fee`.
    pub fee_gamma: f64,
    /// Minimum relative move of the price scale per re-peg.
    pub adjustment_step: f64,
    /// Share of the profit paid to the admin.
    pub admin_fee: f64,
    /// Half-life of the price oracle EMA, in seconds.
    pub ma_half_time: u64,
}

impl PoolParams {
    /// Returns the parameter set of a [`Preset`].
    ///
    /// # Examples
    ///
    /// ```
    /// use twocrypto_sim::config::{PoolParams, Preset};
    ///
    /// let params = PoolParams::preset(Preset::Volatile);
    /// assert_eq!(params.a, 400_000);
    /// assert!(params.validate().is_ok());
    /// ```
    #[must_use]
    pub const fn preset(preset: Preset) -> Self {
        match preset {
            Preset::Volatile => Self {
                a: 400_000,
                gamma: 0.000_145,
                mid_fee: 0.0026,
                out_fee: 0.0045,
                allowed_extra_profit: 0.000_002,
                fee_gamma: 0.000_23,
                adjustment_step: 0.000_146,
                admin_fee: 0.5,
                ma_half_time: 600,
            },
            Preset::Forex => Self {
                a: 20_000_000,
                gamma: 0.001,
                mid_fee: 0.0005,
                out_fee: 0.0045,
                allowed_extra_profit: 1e-8,
                fee_gamma: 0.005,
                adjustment_step: 0.000_005_5,
                admin_fee: 0.5,
                ma_half_time: 600,
            },
            Preset::ChickenBonds => Self {
                a: 200_000_000,
                gamma: 0.0199,
                mid_fee: 0.0015,
                out_fee: 0.003,
                allowed_extra_profit: 1e-10,
                fee_gamma: 0.005,
                adjustment_step: 0.000_005_5,
                admin_fee: 0.5,
                ma_half_time: 600,
            },
        }
    }

    /// Validates every range in the table above.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidConfiguration`] naming the first field
    /// out of range.
    pub fn validate(&self) -> Result<(), AmmError> {
        if !(MIN_A..=MAX_A).contains(&self.a) {
            return Err(AmmError::InvalidConfiguration("A out of range"));
        }
        if !(MIN_GAMMA..=MAX_GAMMA).contains(&self.gamma) {
            return Err(AmmError::InvalidConfiguration("gamma out of range"));
        }
        if !(self.mid_fee >= MIN_FEE && self.mid_fee <= self.out_fee && self.out_fee <= MAX_FEE)
        {
            return Err(AmmError::InvalidConfiguration(
                "fees must satisfy MIN_FEE <= mid_fee <= out_fee <= MAX_FEE",
            ));
        }
        if !(0.0..=MAX_ADMIN_FEE).contains(&self.admin_fee) {
            return Err(AmmError::InvalidConfiguration("admin_fee out of range"));
        }
        if !(self.fee_gamma > 0.0 && self.fee_gamma <= 1.0) {
            return Err(AmmError::InvalidConfiguration("fee_gamma out of range"));
        }
        if !(0.0..=MAX_ALLOWED_EXTRA_PROFIT).contains(&self.allowed_extra_profit) {
            return Err(AmmError::InvalidConfiguration(
                "allowed_extra_profit out of range",
            ));
        }
        if !(self.adjustment_step > 0.0 && self.adjustment_step <= 1.0) {
            return Err(AmmError::InvalidConfiguration(
                "adjustment_step out of range",
            ));
        }
        if !(1..=MAX_MA_HALF_TIME).contains(&self.ma_half_time) {
            return Err(AmmError::InvalidConfiguration("ma_half_time out of range"));
        }
        Ok(())
    }

    /// Returns the fee-curve slice of the parameters.
    #[must_use]
    pub const fn fee_curve(&self) -> FeeCurve {
        FeeCurve::new(self.mid_fee, self.out_fee, self.fee_gamma)
    }
}

impl From<Preset> for PoolParams {
    fn from(preset: Preset) -> Self {
        Self::preset(preset)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        for preset in [Preset::Volatile, Preset::Forex, Preset::ChickenBonds] {
            assert!(PoolParams::preset(preset).validate().is_ok(), "{preset:?}");
        }
    }

    #[test]
    fn a_out_of_range_rejected() {
        let mut params = PoolParams::preset(Preset::Volatile);
        params.a = MIN_A - 1;
        assert!(params.validate().is_err());
        params.a = MAX_A + 1;
        assert!(params.validate().is_err());
    }

    #[test]
    fn gamma_out_of_range_rejected() {
        let mut params = PoolParams::preset(Preset::Volatile);
        params.gamma = 0.05;
        assert!(params.validate().is_err());
    }

    #[test]
    fn mid_fee_above_out_fee_rejected() {
        let mut params = PoolParams::preset(Preset::Volatile);
        params.mid_fee = 0.01;
        assert!(matches!(
            params.validate(),
            Err(AmmError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn nan_fields_rejected() {
        let mut params = PoolParams::preset(Preset::Forex);
        params.fee_gamma = f64::NAN;
        assert!(params.validate().is_err());
        let mut params = PoolParams::preset(Preset::Forex);
        params.adjustment_step = f64::NAN;
        assert!(params.validate().is_err());
    }

    #[test]
    fn zero_half_time_rejected() {
        let mut params = PoolParams::preset(Preset::ChickenBonds);
        params.ma_half_time = 0;
        assert!(params.validate().is_err());
    }

    #[test]
    fn fee_curve_slice() {
        let curve = PoolParams::preset(Preset::Volatile).fee_curve();
        assert_eq!(curve.mid_fee, 0.0026);
        assert_eq!(curve.out_fee, 0.0045);
        assert_eq!(curve.fee_gamma, 0.000_23);
    }

    #[test]
    fn preset_from_json_name() {
        let Ok(preset) = serde_json::from_str::<Preset>("\"chicken_bonds\"") else {
            panic!("preset name");
        };
        assert_eq!(PoolParams::from(preset).a, 200_000_000);
    }
}
