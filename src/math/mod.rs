//! Arithmetic backends and the invariant mathematics of the pool.
//!
//! | Item | Purpose |
//! |------|---------|
//! | [`Precision`] | numeric backend trait |
//! | [`FloatArithmetic`] / [`WadArithmetic`] | `f64` and 18-decimal `U256` backends |
//! | [`unsafe_add`] … [`unsafe_div`] | unchecked operators with caller-proven bounds |
//! | [`newton_d`] / [`newton_y`] | invariant and counter-balance solvers |
//! | [`FeeCurve`] / [`dynamic_fee`] / [`calc_token_fee`] | fee engine |
//! | [`halfpow`] / [`xcp`] | oracle decay and virtual share value |
//! | [`Arithmetic`] / [`Solver`] | runtime backend selection over real-valued inputs |

mod fee;
mod float_precision;
mod newton;
mod precision;
mod solver;
mod unsafe_ops;
mod wad_precision;

#[allow(clippy::all, clippy::pedantic)]
mod uint_impl {
    use uint::construct_uint;

    construct_uint! {
        /// 256-bit unsigned integer backing the wad representation.
        pub struct U256(4);
    }
}

pub use fee::{calc_token_fee, dynamic_fee, geometric_mean, halfpow, xcp, FeeCurve, NOISE_FEE};
pub use float_precision::FloatArithmetic;
pub use newton::{
    newton_d, newton_y, A_MULTIPLIER, MAX_A, MAX_GAMMA, MAX_ITERATIONS_D, MIN_A, MIN_GAMMA,
};
pub use precision::Precision;
pub use solver::{Arithmetic, Solver};
pub use uint_impl::U256;
pub use unsafe_ops::{unsafe_add, unsafe_div, unsafe_mul, unsafe_sub};
pub use wad_precision::{WadArithmetic, WAD};
