//! Result of a price-scale adjustment round.

use core::fmt;

use serde::Serialize;

/// What `tweak_price` decided after a swap or deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TweakOutcome {
    /// No adjustment was pending; only oracle, D and virtual price moved.
    Unchanged,
    /// The price scale moved one step towards the oracle.
    Repegged,
    /// A step was tried and dropped because it would eat too much profit.
    /// Admin fees were claimed.
    Rejected,
    /// The pending adjustment ended because the scale is already within a
    /// step of the oracle.  Admin fees were claimed.
    Converged,
}

impl TweakOutcome {
    /// Returns `true` if admin fees were claimed in this round.
    #[must_use]
    pub const fn claimed_admin_fees(&self) -> bool {
        matches!(self, Self::Rejected | Self::Converged)
    }
}

impl fmt::Display for TweakOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unchanged => "unchanged",
            Self::Repegged => "repegged",
            Self::Rejected => "rejected",
            Self::Converged => "converged",
        };
        f.write_str(name)
    }
}
