//! Checked arithmetic over `U256` token amounts.

use odra::casper_types::U256;

use crate::error::LaunchpadError;
use crate::math::common::{TryAdd, TryDiv, TryMul, TrySub, BPS_DENOMINATOR};

impl TryAdd for U256 {
    fn try_add(self, rhs: Self) -> Result<Self, LaunchpadError> {
        self.checked_add(rhs).ok_or(LaunchpadError::MathOverflow)
    }
}

impl TrySub for U256 {
    fn try_sub(self, rhs: Self) -> Result<Self, LaunchpadError> {
        self.checked_sub(rhs).ok_or(LaunchpadError::MathOverflow)
    }
}

impl TryMul<U256> for U256 {
    fn try_mul(self, rhs: U256) -> Result<Self, LaunchpadError> {
        self.checked_mul(rhs).ok_or(LaunchpadError::MathOverflow)
    }
}

impl TryDiv<U256> for U256 {
    fn try_div(self, rhs: U256) -> Result<Self, LaunchpadError> {
        self.checked_div(rhs).ok_or(LaunchpadError::MathOverflow)
    }
}

/// `amount * num / den` with truncating division.
pub fn mul_div(amount: U256, num: U256, den: U256) -> Result<U256, LaunchpadError> {
    amount.try_mul(num)?.try_div(den)
}

/// Basis-point share of an amount, truncating.
pub fn share_bps(amount: U256, bps: u64) -> Result<U256, LaunchpadError> {
    mul_div(amount, U256::from(bps), U256::from(BPS_DENOMINATOR))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_add_overflows() {
        assert_eq!(
            U256::max_value().try_add(U256::one()),
            Err(LaunchpadError::MathOverflow)
        );
        assert_eq!(U256::from(2u64).try_add(U256::from(3u64)), Ok(U256::from(5u64)));
    }

    #[test]
    fn checked_sub_underflows() {
        assert_eq!(
            U256::one().try_sub(U256::from(2u64)),
            Err(LaunchpadError::MathOverflow)
        );
    }

    #[test]
    fn division_by_zero_is_an_error() {
        assert_eq!(
            U256::one().try_div(U256::zero()),
            Err(LaunchpadError::MathOverflow)
        );
    }

    #[test]
    fn mul_div_truncates() {
        // 10 * 1 / 3 = 3 (truncated)
        assert_eq!(
            mul_div(U256::from(10u64), U256::one(), U256::from(3u64)),
            Ok(U256::from(3u64))
        );
    }

    #[test]
    fn share_bps_takes_fraction() {
        // 250 bps of 10_000 = 250
        assert_eq!(share_bps(U256::from(10_000u64), 250), Ok(U256::from(250u64)));
        // 10000 bps is identity
        assert_eq!(share_bps(U256::from(777u64), 10_000), Ok(U256::from(777u64)));
        assert_eq!(share_bps(U256::zero(), 500), Ok(U256::zero()));
    }
}
