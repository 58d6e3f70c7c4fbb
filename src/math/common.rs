//! Shared scalers and checked-arithmetic trait definitions.
//!
//! All accounting paths go through these traits so overflow surfaces as
//! `LaunchpadError::MathOverflow` instead of wrapping or panicking.

use crate::error::LaunchpadError;

/// Scale of the reward-per-point accumulator
pub const SCALE: usize = 18;
/// Identity for the accumulator scale
pub const WAD: u128 = 1_000_000_000_000_000_000;
/// Basis points denominator (10000 bps = 1.0x)
pub const BPS_DENOMINATOR: u64 = 10_000;
/// Block time is expressed in milliseconds
pub const MILLIS_PER_SECOND: u64 = 1_000;
/// One day of block time
pub const MILLIS_PER_DAY: u64 = 86_400_000;

/// Try to subtract, return an error on underflow
pub trait TrySub: Sized {
    /// Subtract
    fn try_sub(self, rhs: Self) -> Result<Self, LaunchpadError>;
}

/// Try to add, return an error on overflow
pub trait TryAdd: Sized {
    /// Add
    fn try_add(self, rhs: Self) -> Result<Self, LaunchpadError>;
}

/// Try to divide, return an error on overflow or divide by zero
pub trait TryDiv<RHS>: Sized {
    /// Divide
    fn try_div(self, rhs: RHS) -> Result<Self, LaunchpadError>;
}

/// Try to multiply, return an error on overflow
pub trait TryMul<RHS>: Sized {
    /// Multiply
    fn try_mul(self, rhs: RHS) -> Result<Self, LaunchpadError>;
}
