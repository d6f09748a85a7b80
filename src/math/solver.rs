//! Runtime backend selection for the invariant solvers.
//!
//! The pool keeps its balances as `f64`.  [`Solver`] converts them into
//! the chosen [`Arithmetic`] backend, runs [`newton_d`] or [`newton_y`]
//! and converts the answer back.

use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::{newton_d, newton_y, FloatArithmetic, Precision, WadArithmetic};

/// Numeric backend used by the solvers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Arithmetic {
    /// Plain `f64` arithmetic.
    Float,
    /// 18-decimal integer arithmetic matching the on-chain truncation.
    #[default]
    Wad,
}

/// Solver bound to one pool's amplification and `gamma`.
///
/// # Examples
///
/// ```
/// use twocrypto_sim::math::{Arithmetic, Solver};
///
/// let solver = Solver::new(Arithmetic::Wad, 400_000, 0.000145);
/// let d = solver.newton_d([1000.0, 1000.0])?;
/// let y = solver.newton_y([1100.0, 1000.0], d, 1)?;
/// assert!(y < 1000.0);
/// # Ok::<(), twocrypto_sim::error::AmmError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Solver {
    arithmetic: Arithmetic,
    ann: u128,
    gamma: f64,
}

impl Solver {
    /// Creates a solver for amplification `ann` and curve width `gamma`.
    #[must_use]
    pub const fn new(arithmetic: Arithmetic, ann: u128, gamma: f64) -> Self {
        Self {
            arithmetic,
            ann,
            gamma,
        }
    }

    /// Returns the backend in use.
    #[must_use]
    pub const fn arithmetic(&self) -> Arithmetic {
        self.arithmetic
    }

    /// Returns the raw amplification `A · N^N · A_MULTIPLIER`.
    #[must_use]
    pub const fn ann(&self) -> u128 {
        self.ann
    }

    /// Returns `gamma`.
    #[must_use]
    pub const fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Invariant of price-scaled balances `xp`.
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`newton_d`] and of the conversion into
    /// the backend.
    pub fn newton_d(&self, xp: [f64; 2]) -> Result<f64> {
        match self.arithmetic {
            Arithmetic::Float => self.d_with::<FloatArithmetic>(xp),
            Arithmetic::Wad => self.d_with::<WadArithmetic>(xp),
        }
    }

    /// Balance `xp[i]` that keeps invariant `d` with `xp[1 − i]` fixed.
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`newton_y`] and of the conversion into
    /// the backend.
    pub fn newton_y(&self, xp: [f64; 2], d: f64, i: usize) -> Result<f64> {
        match self.arithmetic {
            Arithmetic::Float => self.y_with::<FloatArithmetic>(xp, d, i),
            Arithmetic::Wad => self.y_with::<WadArithmetic>(xp, d, i),
        }
    }

    /// `sqrt(x0 · x1)` computed on the selected backend.
    ///
    /// # Errors
    ///
    /// Returns a conversion or overflow error from the backend.
    pub fn geometric_mean(&self, x: [f64; 2]) -> Result<f64> {
        match self.arithmetic {
            Arithmetic::Float => Self::mean_with::<FloatArithmetic>(x),
            Arithmetic::Wad => Self::mean_with::<WadArithmetic>(x),
        }
    }

    fn mean_with<P: Precision>(x: [f64; 2]) -> Result<f64> {
        let mean = P::from_f64(x[0])?.geometric_mean(&P::from_f64(x[1])?)?;
        Ok(mean.to_f64_lossy())
    }

    fn d_with<P: Precision>(&self, xp: [f64; 2]) -> Result<f64> {
        let x = [P::from_f64(xp[0])?, P::from_f64(xp[1])?];
        let d = newton_d(self.ann, P::from_f64(self.gamma)?, x)?;
        Ok(d.to_f64_lossy())
    }

    fn y_with<P: Precision>(&self, xp: [f64; 2], d: f64, i: usize) -> Result<f64> {
        let x = [P::from_f64(xp[0])?, P::from_f64(xp[1])?];
        let y = newton_y(self.ann, P::from_f64(self.gamma)?, x, P::from_f64(d)?, i)?;
        Ok(y.to_f64_lossy())
    }
}
