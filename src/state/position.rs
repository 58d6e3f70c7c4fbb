//! Staking positions and per-staker accounting.

use odra::prelude::*;
use odra::casper_types::U256;

use crate::error::LaunchpadError;
use crate::math::{mul_div, TryAdd, TrySub, BPS_DENOMINATOR};

/// Supported lock periods, in days.
pub const LOCK_DAYS_SHORT: u64 = 30;
pub const LOCK_DAYS_MEDIUM: u64 = 90;
pub const LOCK_DAYS_LONG: u64 = 180;

/// A single stake. `lock_end` and `multiplier_bps` are fixed at creation;
/// later multiplier-table changes never touch open positions.
#[odra::odra_type]
pub struct StakePosition {
    pub amount: U256,
    pub lock_end: u64,
    pub multiplier_bps: u32,
}

impl StakePosition {
    pub fn points(&self) -> Result<U256, LaunchpadError> {
        position_points(self.amount, self.multiplier_bps)
    }

    pub fn is_unlocked(&self, now: u64) -> bool {
        self.lock_end <= now
    }
}

/// `amount * multiplier_bps / 10000`, truncating.
pub fn position_points(amount: U256, multiplier_bps: u32) -> Result<U256, LaunchpadError> {
    mul_div(
        amount,
        U256::from(multiplier_bps),
        U256::from(BPS_DENOMINATOR),
    )
}

/// Per-staker aggregate used by the reward accumulator.
#[odra::odra_type]
#[derive(Default)]
pub struct StakerAccount {
    pub staked: U256,
    pub points: U256,
    pub reward_debt: U256,
    pub pending_rewards: U256,
}

/// Lock multiplier table, in bps per supported period.
#[odra::odra_type]
pub struct LockMultipliers {
    pub m30: u32,
    pub m90: u32,
    pub m180: u32,
}

impl Default for LockMultipliers {
    fn default() -> Self {
        Self {
            m30: 10_000,
            m90: 11_000,
            m180: 12_000,
        }
    }
}

impl LockMultipliers {
    pub fn for_days(&self, lock_days: u64) -> Result<u32, LaunchpadError> {
        match lock_days {
            LOCK_DAYS_SHORT => Ok(self.m30),
            LOCK_DAYS_MEDIUM => Ok(self.m90),
            LOCK_DAYS_LONG => Ok(self.m180),
            _ => Err(LaunchpadError::InvalidLockPeriod),
        }
    }
}

/// Sum of amounts over positions whose lock has expired.
pub fn unlocked_balance(positions: &[StakePosition], now: u64) -> Result<U256, LaunchpadError> {
    let mut unlocked = U256::zero();
    for position in positions.iter().filter(|p| p.is_unlocked(now)) {
        unlocked = unlocked.try_add(position.amount)?;
    }
    Ok(unlocked)
}

/// Reduces unlocked positions oldest-first until `amount` is covered and drops
/// emptied positions. Returns the points released. Point deltas are recomputed
/// per position so pool totals stay exactly `sum(amount * multiplier / 10000)`.
pub fn reduce_unlocked(
    positions: &mut Vec<StakePosition>,
    amount: U256,
    now: u64,
) -> Result<U256, LaunchpadError> {
    let mut remaining = amount;
    let mut released_points = U256::zero();

    for position in positions.iter_mut() {
        if remaining.is_zero() {
            break;
        }
        if !position.is_unlocked(now) {
            continue;
        }
        let taken = position.amount.min(remaining);
        let points_before = position.points()?;
        position.amount = position.amount.try_sub(taken)?;
        let points_after = position.points()?;
        released_points = released_points.try_add(points_before.try_sub(points_after)?)?;
        remaining = remaining.try_sub(taken)?;
    }

    if !remaining.is_zero() {
        return Err(LaunchpadError::StillLocked);
    }

    positions.retain(|p| !p.amount.is_zero());
    Ok(released_points)
}
