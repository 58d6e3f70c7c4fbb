//! Lock-multiplier staking pool with continuous reward accrual.
//!
//! One instance per stake token. Rewards stream at `reward_rate_per_second`
//! and are split pro rata over points (`amount * multiplier / 10000`) via a
//! WAD-scaled per-point accumulator: on every state-mutating call the pool
//! first rolls the accumulator forward, then settles the caller against it.
//! The reward token balance held by the contract funds payouts.

use odra::prelude::*;
use odra::casper_types::U256;
use odra::ContractRef;

use crate::error::{ok_or_revert, LaunchpadError};
use crate::interfaces::TokenClientContractRef;
use crate::math::{TryAdd, TryDiv, TryMul, TrySub, MILLIS_PER_DAY, MILLIS_PER_SECOND, WAD};
use crate::state::{
    reduce_unlocked, unlocked_balance, LockMultipliers, StakePosition, StakerAccount,
};

pub mod events {
    use odra::prelude::*;
    use odra::casper_types::U256;

    #[odra::event]
    pub struct Staked {
        pub staker: Address,
        pub amount: U256,
        pub lock_days: u64,
        pub multiplier_bps: u32,
        pub points: U256,
    }

    #[odra::event]
    pub struct Unstaked {
        pub staker: Address,
        pub amount: U256,
        pub points_released: U256,
    }

    #[odra::event]
    pub struct RewardsClaimed {
        pub staker: Address,
        pub amount: U256,
    }

    #[odra::event]
    pub struct RewardRateChanged {
        pub rate_per_second: U256,
    }

    #[odra::event]
    pub struct LockMultipliersChanged {
        pub m30: u32,
        pub m90: u32,
        pub m180: u32,
    }
}

#[odra::module(events = [
    events::Staked,
    events::Unstaked,
    events::RewardsClaimed,
    events::RewardRateChanged,
    events::LockMultipliersChanged
])]
pub struct StakingPool {
    stake_token: Var<Address>,
    reward_token: Var<Address>,
    owner: Var<Address>,

    reward_rate_per_second: Var<U256>,
    last_update: Var<u64>,
    acc_reward_per_point: Var<U256>,

    total_staked: Var<U256>,
    total_points: Var<U256>,
    multipliers: Var<LockMultipliers>,

    positions: Mapping<Address, Vec<StakePosition>>,
    accounts: Mapping<Address, StakerAccount>,
}

#[odra::module]
impl StakingPool {
    pub fn init(&mut self, stake_token: Address, reward_token: Address, reward_rate_per_second: U256) {
        self.stake_token.set(stake_token);
        self.reward_token.set(reward_token);
        self.owner.set(self.env().caller());
        self.reward_rate_per_second.set(reward_rate_per_second);
        self.last_update.set(self.env().get_block_time());
        self.acc_reward_per_point.set(U256::zero());
        self.total_staked.set(U256::zero());
        self.total_points.set(U256::zero());
        self.multipliers.set(LockMultipliers::default());
    }

    // =========================================================================
    // STAKING
    // =========================================================================

    /// Opens a new position. The lock end and the multiplier are frozen into
    /// the position at creation; later table changes never touch it.
    pub fn stake(&mut self, amount: U256, lock_days: u64) {
        if amount.is_zero() {
            self.env().revert(LaunchpadError::InvalidAmount);
        }
        let table = self.multipliers.get_or_default();
        let multiplier_bps = ok_or_revert(&self.env(), table.for_days(lock_days));

        let caller = self.env().caller();
        let acc = self.update_pool();
        let acc = ok_or_revert(&self.env(), acc);
        let mut account = ok_or_revert(&self.env(), self.settle(caller, acc));

        let now = self.env().get_block_time();
        let position = StakePosition {
            amount,
            lock_end: now + lock_days * MILLIS_PER_DAY,
            multiplier_bps,
        };
        let points = ok_or_revert(&self.env(), position.points());

        account.staked = ok_or_revert(&self.env(), account.staked.try_add(amount));
        account.points = ok_or_revert(&self.env(), account.points.try_add(points));
        let total_staked =
            ok_or_revert(&self.env(), self.total_staked.get_or_default().try_add(amount));
        self.total_staked.set(total_staked);
        let total_points =
            ok_or_revert(&self.env(), self.total_points.get_or_default().try_add(points));
        self.total_points.set(total_points);

        let mut positions = self.positions.get(&caller).unwrap_or_default();
        positions.push(position);
        self.positions.set(&caller, positions);
        self.accounts.set(&caller, account);

        // accounting is settled; pull the stake last
        let mut stake_token = self.stake_token_ref();
        stake_token.transfer_from(caller, self.env().self_address(), amount);

        self.env().emit_event(events::Staked {
            staker: caller,
            amount,
            lock_days,
            multiplier_bps,
            points,
        });
    }

    /// Returns stake from expired positions, oldest first.
    pub fn unstake(&mut self, amount: U256) {
        if amount.is_zero() {
            self.env().revert(LaunchpadError::InvalidAmount);
        }
        let caller = self.env().caller();
        let acc = self.update_pool();
        let acc = ok_or_revert(&self.env(), acc);
        let mut account = ok_or_revert(&self.env(), self.settle(caller, acc));
        if amount > account.staked {
            self.env().revert(LaunchpadError::InvalidAmount);
        }

        let now = self.env().get_block_time();
        let mut positions = self.positions.get(&caller).unwrap_or_default();
        let unlocked = ok_or_revert(&self.env(), unlocked_balance(&positions, now));
        if unlocked < amount {
            self.env().revert(LaunchpadError::StillLocked);
        }
        let released = ok_or_revert(&self.env(), reduce_unlocked(&mut positions, amount, now));

        account.staked = ok_or_revert(&self.env(), account.staked.try_sub(amount));
        account.points = ok_or_revert(&self.env(), account.points.try_sub(released));
        let total_staked =
            ok_or_revert(&self.env(), self.total_staked.get_or_default().try_sub(amount));
        self.total_staked.set(total_staked);
        let total_points =
            ok_or_revert(&self.env(), self.total_points.get_or_default().try_sub(released));
        self.total_points.set(total_points);

        self.positions.set(&caller, positions);
        self.accounts.set(&caller, account);

        let mut stake_token = self.stake_token_ref();
        stake_token.transfer(caller, amount);

        self.env().emit_event(events::Unstaked {
            staker: caller,
            amount,
            points_released: released,
        });
    }

    /// Pays out the caller's pending rewards. A zero balance is a no-op.
    pub fn claim(&mut self) {
        let caller = self.env().caller();
        let acc = self.update_pool();
        let acc = ok_or_revert(&self.env(), acc);
        let mut account = ok_or_revert(&self.env(), self.settle(caller, acc));

        let payout = account.pending_rewards;
        account.pending_rewards = U256::zero();
        self.accounts.set(&caller, account);

        if payout.is_zero() {
            return;
        }
        let mut reward_token = self.reward_token_ref();
        reward_token.transfer(caller, payout);

        self.env().emit_event(events::RewardsClaimed {
            staker: caller,
            amount: payout,
        });
    }

    // =========================================================================
    // OWNER CONFIGURATION
    // =========================================================================

    /// Changes the emission rate. Accrual up to now happens at the old rate.
    pub fn set_reward_rate(&mut self, rate_per_second: U256) {
        self.require_owner();
        let updated = self.update_pool();
        ok_or_revert(&self.env(), updated);
        self.reward_rate_per_second.set(rate_per_second);
        self.env().emit_event(events::RewardRateChanged { rate_per_second });
    }

    /// Changes the multiplier table for future positions only.
    pub fn set_lock_multipliers(&mut self, m30: u32, m90: u32, m180: u32) {
        self.require_owner();
        self.multipliers.set(LockMultipliers { m30, m90, m180 });
        self.env()
            .emit_event(events::LockMultipliersChanged { m30, m90, m180 });
    }

    pub fn transfer_ownership(&mut self, new_owner: Address) {
        self.require_owner();
        self.owner.set(new_owner);
    }

    // =========================================================================
    // VIEWS
    // =========================================================================

    /// Tier points held by `account`. The `PointsSource` surface queried by
    /// the tier aggregator.
    pub fn points_of(&self, account: Address) -> U256 {
        self.accounts.get(&account).unwrap_or_default().points
    }

    pub fn staked_of(&self, account: Address) -> U256 {
        self.accounts.get(&account).unwrap_or_default().staked
    }

    /// Stake withdrawable right now.
    pub fn unlocked_of(&self, account: Address) -> U256 {
        let positions = self.positions.get(&account).unwrap_or_default();
        let now = self.env().get_block_time();
        ok_or_revert(&self.env(), unlocked_balance(&positions, now))
    }

    pub fn positions_of(&self, account: Address) -> Vec<StakePosition> {
        self.positions.get(&account).unwrap_or_default()
    }

    /// Rewards claimable right now, including not-yet-settled accrual.
    pub fn pending_reward_of(&self, account: Address) -> U256 {
        let result = self.projected_accumulator().and_then(|acc| {
            let record = self.accounts.get(&account).unwrap_or_default();
            let owed = record
                .points
                .try_mul(acc.try_sub(record.reward_debt)?)?
                .try_div(U256::from(WAD))?;
            record.pending_rewards.try_add(owed)
        });
        ok_or_revert(&self.env(), result)
    }

    pub fn total_staked(&self) -> U256 {
        self.total_staked.get_or_default()
    }

    pub fn total_points(&self) -> U256 {
        self.total_points.get_or_default()
    }

    pub fn reward_rate(&self) -> U256 {
        self.reward_rate_per_second.get_or_default()
    }

    pub fn lock_multipliers(&self) -> LockMultipliers {
        self.multipliers.get_or_default()
    }

    // =========================================================================
    // INTERNAL
    // =========================================================================

    fn require_owner(&self) {
        if self.owner.get() != Some(self.env().caller()) {
            self.env().revert(LaunchpadError::Unauthorized);
        }
    }

    /// Rolls the accumulator forward to `now` and returns it.
    fn update_pool(&mut self) -> Result<U256, LaunchpadError> {
        let now = self.env().get_block_time();
        let last = self.last_update.get_or_default();
        let mut acc = self.acc_reward_per_point.get_or_default();
        if now > last {
            let total_points = self.total_points.get_or_default();
            if !total_points.is_zero() {
                let accrued = self
                    .reward_rate_per_second
                    .get_or_default()
                    .try_mul(U256::from(now - last))?
                    .try_mul(U256::from(WAD))?
                    .try_div(U256::from(MILLIS_PER_SECOND))?
                    .try_div(total_points)?;
                acc = acc.try_add(accrued)?;
                self.acc_reward_per_point.set(acc);
            }
            self.last_update.set(now);
        }
        Ok(acc)
    }

    /// Read-only variant of `update_pool` for views.
    fn projected_accumulator(&self) -> Result<U256, LaunchpadError> {
        let now = self.env().get_block_time();
        let last = self.last_update.get_or_default();
        let acc = self.acc_reward_per_point.get_or_default();
        let total_points = self.total_points.get_or_default();
        if now <= last || total_points.is_zero() {
            return Ok(acc);
        }
        let accrued = self
            .reward_rate_per_second
            .get_or_default()
            .try_mul(U256::from(now - last))?
            .try_mul(U256::from(WAD))?
            .try_div(U256::from(MILLIS_PER_SECOND))?
            .try_div(total_points)?;
        acc.try_add(accrued)
    }

    /// Credits accrual since the last settlement and resets the debt marker.
    /// The caller persists the returned record.
    fn settle(&self, staker: Address, acc: U256) -> Result<StakerAccount, LaunchpadError> {
        let mut account = self.accounts.get(&staker).unwrap_or_default();
        let owed = account
            .points
            .try_mul(acc.try_sub(account.reward_debt)?)?
            .try_div(U256::from(WAD))?;
        account.pending_rewards = account.pending_rewards.try_add(owed)?;
        account.reward_debt = acc;
        Ok(account)
    }

    fn stake_token_ref(&self) -> TokenClientContractRef {
        let token = self.stake_token.get().expect("stake token not set");
        TokenClientContractRef::new(self.env().clone(), token)
    }

    fn reward_token_ref(&self) -> TokenClientContractRef {
        let token = self.reward_token.get().expect("reward token not set");
        TokenClientContractRef::new(self.env().clone(), token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{MockToken, MockTokenInitArgs};
    use odra::host::{Deployer, HostEnv, HostRef};

    const DAY: u64 = MILLIS_PER_DAY;
    const SECOND: u64 = MILLIS_PER_SECOND;

    struct Setup {
        env: HostEnv,
        stake_token: crate::token::MockTokenHostRef,
        reward_token: crate::token::MockTokenHostRef,
        pool: StakingPoolHostRef,
    }

    fn setup(rate_per_second: u64) -> Setup {
        let env = odra_test::env();
        let mut stake_token = MockToken::deploy(
            &env,
            MockTokenInitArgs {
                name: String::from("Project Token"),
                symbol: String::from("PRJ"),
                decimals: 18,
                initial_supply: U256::from(1_000_000_000u64),
            },
        );
        let mut reward_token = MockToken::deploy(
            &env,
            MockTokenInitArgs {
                name: String::from("Reward Token"),
                symbol: String::from("RWD"),
                decimals: 18,
                initial_supply: U256::from(1_000_000_000u64),
            },
        );
        let pool = StakingPool::deploy(
            &env,
            StakingPoolInitArgs {
                stake_token: *stake_token.address(),
                reward_token: *reward_token.address(),
                reward_rate_per_second: U256::from(rate_per_second),
            },
        );
        // seed stakers and fund the reward pot
        for account in 1..4 {
            stake_token.transfer(env.get_account(account), U256::from(1_000_000u64));
        }
        reward_token.transfer(*pool.address(), U256::from(500_000_000u64));
        Setup {
            env,
            stake_token,
            reward_token,
            pool,
        }
    }

    fn stake_as(setup: &mut Setup, account: usize, amount: u64, lock_days: u64) {
        let staker = setup.env.get_account(account);
        setup.env.set_caller(staker);
        setup
            .stake_token
            .approve(*setup.pool.address(), U256::from(amount));
        setup.pool.stake(U256::from(amount), lock_days);
    }

    #[test]
    fn stake_validations() {
        let mut s = setup(0);
        s.env.set_caller(s.env.get_account(1));
        assert_eq!(
            s.pool.try_stake(U256::zero(), 30),
            Err(LaunchpadError::InvalidAmount.into())
        );
        assert_eq!(
            s.pool.try_stake(U256::from(100u64), 45),
            Err(LaunchpadError::InvalidLockPeriod.into())
        );
    }

    #[test]
    fn staking_tracks_points_and_totals() {
        let mut s = setup(0);
        stake_as(&mut s, 1, 1_000, 30);
        let alice = s.env.get_account(1);
        assert_eq!(s.pool.points_of(alice), U256::from(1_000u64));

        stake_as(&mut s, 1, 4_000, 30);
        assert_eq!(s.pool.points_of(alice), U256::from(5_000u64));
        assert_eq!(s.pool.staked_of(alice), U256::from(5_000u64));

        stake_as(&mut s, 2, 1_000, 180);
        let bob = s.env.get_account(2);
        assert_eq!(s.pool.points_of(bob), U256::from(1_200u64));
        assert_eq!(s.pool.total_staked(), U256::from(6_000u64));
        assert_eq!(s.pool.total_points(), U256::from(6_200u64));

        // stake escrowed by the pool
        assert_eq!(
            s.stake_token.balance_of(*s.pool.address()),
            U256::from(6_000u64)
        );
    }

    #[test]
    fn unstake_respects_locks() {
        let mut s = setup(0);
        stake_as(&mut s, 1, 1_000, 30);
        let alice = s.env.get_account(1);
        s.env.set_caller(alice);

        assert_eq!(
            s.pool.try_unstake(U256::from(500u64)),
            Err(LaunchpadError::StillLocked.into())
        );
        assert_eq!(s.pool.unlocked_of(alice), U256::zero());

        s.env.advance_block_time(30 * DAY);
        assert_eq!(s.pool.unlocked_of(alice), U256::from(1_000u64));
        s.pool.unstake(U256::from(600u64));
        assert_eq!(s.pool.staked_of(alice), U256::from(400u64));
        assert_eq!(s.pool.points_of(alice), U256::from(400u64));
        assert_eq!(s.pool.total_staked(), U256::from(400u64));
        assert_eq!(s.pool.total_points(), U256::from(400u64));

        // cannot unstake more than staked, even unlocked
        assert_eq!(
            s.pool.try_unstake(U256::from(500u64)),
            Err(LaunchpadError::InvalidAmount.into())
        );
        s.pool.unstake(U256::from(400u64));
        assert_eq!(s.pool.total_staked(), U256::zero());
        assert_eq!(s.pool.positions_of(alice).len(), 0);
    }

    #[test]
    fn unstake_spans_positions_oldest_first() {
        let mut s = setup(0);
        stake_as(&mut s, 1, 1_000, 30);
        s.env.advance_block_time(DAY);
        stake_as(&mut s, 1, 2_000, 30);
        let alice = s.env.get_account(1);

        s.env.advance_block_time(29 * DAY);
        // only the first position is unlocked
        s.env.set_caller(alice);
        assert_eq!(s.pool.unlocked_of(alice), U256::from(1_000u64));
        assert_eq!(
            s.pool.try_unstake(U256::from(1_500u64)),
            Err(LaunchpadError::StillLocked.into())
        );
        s.pool.unstake(U256::from(1_000u64));

        s.env.advance_block_time(DAY);
        s.pool.unstake(U256::from(2_000u64));
        assert_eq!(s.pool.staked_of(alice), U256::zero());
        assert_eq!(
            s.stake_token.balance_of(alice),
            U256::from(1_000_000u64)
        );
    }

    #[test]
    fn rewards_accrue_pro_rata() {
        let mut s = setup(0);
        stake_as(&mut s, 1, 1_000, 30);
        stake_as(&mut s, 2, 3_000, 30);

        // 1_000 units per second over 4_000 points
        s.env.set_caller(s.env.get_account(0));
        s.pool.set_reward_rate(U256::from(1_000u64));
        s.env.advance_block_time(100 * SECOND);

        let alice = s.env.get_account(1);
        let bob = s.env.get_account(2);
        assert_eq!(s.pool.pending_reward_of(alice), U256::from(25_000u64));
        assert_eq!(s.pool.pending_reward_of(bob), U256::from(75_000u64));

        s.env.set_caller(alice);
        s.pool.claim();
        assert_eq!(s.reward_token.balance_of(alice), U256::from(25_000u64));
        assert_eq!(s.pool.pending_reward_of(alice), U256::zero());

        // claiming again immediately is a silent no-op
        s.pool.claim();
        assert_eq!(s.reward_token.balance_of(alice), U256::from(25_000u64));

        s.env.set_caller(bob);
        s.pool.claim();
        assert_eq!(s.reward_token.balance_of(bob), U256::from(75_000u64));
    }

    #[test]
    fn doubling_points_doubles_the_share() {
        let mut s = setup(0);
        stake_as(&mut s, 1, 1_000, 30);
        stake_as(&mut s, 2, 2_000, 30);
        s.env.set_caller(s.env.get_account(0));
        s.pool.set_reward_rate(U256::from(300u64));
        s.env.advance_block_time(10 * SECOND);

        let alice = s.pool.pending_reward_of(s.env.get_account(1));
        let bob = s.pool.pending_reward_of(s.env.get_account(2));
        assert_eq!(bob, alice * U256::from(2u64));
    }

    #[test]
    fn rate_change_splits_accrual_periods() {
        let mut s = setup(1_000);
        stake_as(&mut s, 1, 1_000, 30);
        s.env.advance_block_time(10 * SECOND);

        s.env.set_caller(s.env.get_account(0));
        s.pool.set_reward_rate(U256::from(2_000u64));
        s.env.advance_block_time(10 * SECOND);

        // 10s at 1_000/s plus 10s at 2_000/s, all to the only staker
        assert_eq!(
            s.pool.pending_reward_of(s.env.get_account(1)),
            U256::from(30_000u64)
        );
    }

    #[test]
    fn multiplier_changes_only_affect_new_positions() {
        let mut s = setup(0);
        stake_as(&mut s, 1, 1_000, 90);
        let alice = s.env.get_account(1);
        assert_eq!(s.pool.points_of(alice), U256::from(1_100u64));

        s.env.set_caller(s.env.get_account(0));
        s.pool.set_lock_multipliers(10_000, 12_000, 15_000);

        // the open position keeps its frozen multiplier
        assert_eq!(s.pool.points_of(alice), U256::from(1_100u64));
        stake_as(&mut s, 1, 1_000, 90);
        assert_eq!(s.pool.points_of(alice), U256::from(2_300u64));
    }

    #[test]
    fn owner_gates_configuration() {
        let mut s = setup(0);
        s.env.set_caller(s.env.get_account(1));
        assert_eq!(
            s.pool.try_set_reward_rate(U256::from(5u64)),
            Err(LaunchpadError::Unauthorized.into())
        );
        assert_eq!(
            s.pool.try_set_lock_multipliers(1, 2, 3),
            Err(LaunchpadError::Unauthorized.into())
        );
    }
}
