//! The sale state machine.
//!
//! `SalePool` carries the immutable parameters plus the mutable tallies of one
//! sale. Phases are never stored; they are recomputed from `(finalized,
//! successful, funded, now)` on every call. All methods update accounting only;
//! token movement stays with the registry so every operation can keep the
//! checks-effects-interactions order.

use odra::prelude::*;
use odra::casper_types::U256;

use crate::error::LaunchpadError;
use crate::math::{mul_div, share_bps, TryAdd, TrySub};

/// Discrete sale lifecycle states.
#[odra::odra_type]
#[derive(Default)]
pub enum SalePhase {
    /// Created, sale tokens not yet fully deposited.
    #[default]
    Unfunded = 0,
    /// Funded, purchase window not yet open.
    Upcoming = 1,
    /// Funded and inside the purchase window.
    Live = 2,
    /// Past the purchase window, not yet finalized.
    Ended = 3,
    /// Terminal: soft cap reached, claims open.
    FinalizedSuccess = 4,
    /// Terminal: soft cap missed, refunds open.
    FinalizedFailed = 5,
}

/// Immutable sale parameters, fixed at creation by the registry.
///
/// `price_num / price_den` converts base smallest units into sale-token
/// smallest units, so the ratio already carries any decimal adjustment
/// between the two tokens.
#[odra::odra_type]
pub struct SaleParams {
    pub sale_token: Address,
    pub base_token: Address,
    pub price_num: U256,
    pub price_den: U256,
    pub start: u64,
    pub end: u64,
    pub tge_time: u64,
    pub vest_start: u64,
    pub vest_duration: u64,
    pub tge_bps: u16,
    pub hard_cap_base: U256,
    pub soft_cap_base: U256,
    pub per_wallet_cap_base: U256,
    pub tier1_cap_base: U256,
    pub tier2_cap_base: U256,
    pub tier3_cap_base: U256,
    pub tier_oracle: Address,
    pub project_owner: Address,
    pub fee_token_bps: u16,
    pub fee_recipient: Address,
}

impl SaleParams {
    pub fn validate(&self) -> Result<(), LaunchpadError> {
        if self.sale_token == self.base_token {
            return Err(LaunchpadError::InvalidAddress);
        }
        if self.start >= self.end {
            return Err(LaunchpadError::InvalidTime);
        }
        if self.price_num.is_zero() || self.price_den.is_zero() {
            return Err(LaunchpadError::InvalidPrice);
        }
        if self.soft_cap_base >= self.hard_cap_base {
            return Err(LaunchpadError::InvalidCaps);
        }
        if self.tge_bps > 10_000 {
            return Err(LaunchpadError::InvalidTgeShare);
        }
        Ok(())
    }

    /// Sale tokens bought with `base_amount`, truncating.
    pub fn tokens_for_base(&self, base_amount: U256) -> Result<U256, LaunchpadError> {
        mul_div(base_amount, self.price_num, self.price_den)
    }

    /// Per-wallet base-token ceiling for a tier. Tier 0 has no allocation.
    pub fn tier_cap(&self, tier: u8) -> U256 {
        match tier {
            1 => self.tier1_cap_base,
            2 => self.tier2_cap_base,
            _ if tier >= 3 => self.tier3_cap_base,
            _ => U256::zero(),
        }
    }
}

/// Per-buyer record within one sale.
#[odra::odra_type]
#[derive(Default)]
pub struct Contribution {
    pub purchased_base: U256,
    pub purchased_tokens: U256,
    pub tge_claimed: bool,
    pub claimed_vested: U256,
    pub refunded: bool,
}

/// One sale: parameters plus mutable tallies.
#[odra::odra_type]
pub struct SalePool {
    pub params: SaleParams,
    pub total_raised_base: U256,
    pub total_tokens_sold: U256,
    pub total_sale_tokens_deposited: U256,
    pub raise_withdrawn: bool,
    pub unsold_withdrawn: bool,
    pub finalized: bool,
    pub successful: bool,
}

impl SalePool {
    pub fn new(params: SaleParams) -> Self {
        Self {
            params,
            total_raised_base: U256::zero(),
            total_tokens_sold: U256::zero(),
            total_sale_tokens_deposited: U256::zero(),
            raise_withdrawn: false,
            unsold_withdrawn: false,
            finalized: false,
            successful: false,
        }
    }

    /// `(tokens_for_sale, fee_tokens, total)` needed to fund the hard cap.
    /// Deposits count net of fee, so a depositor sends `total` to end up funded.
    pub fn required_deposit_tokens(&self) -> Result<(U256, U256, U256), LaunchpadError> {
        let tokens_for_sale = self.params.tokens_for_base(self.params.hard_cap_base)?;
        let fee_tokens = share_bps(tokens_for_sale, self.params.fee_token_bps as u64)?;
        let total = tokens_for_sale.try_add(fee_tokens)?;
        Ok((tokens_for_sale, fee_tokens, total))
    }

    pub fn is_funded(&self) -> Result<bool, LaunchpadError> {
        let (tokens_for_sale, _, _) = self.required_deposit_tokens()?;
        Ok(self.total_sale_tokens_deposited >= tokens_for_sale)
    }

    pub fn phase(&self, now: u64) -> Result<SalePhase, LaunchpadError> {
        if self.finalized {
            return Ok(if self.successful {
                SalePhase::FinalizedSuccess
            } else {
                SalePhase::FinalizedFailed
            });
        }
        if now > self.params.end {
            return Ok(SalePhase::Ended);
        }
        if !self.is_funded()? {
            return Ok(SalePhase::Unfunded);
        }
        if now < self.params.start {
            Ok(SalePhase::Upcoming)
        } else {
            Ok(SalePhase::Live)
        }
    }

    /// Credits a sale-token deposit. Returns `(fee, net)`; the fee goes to the
    /// fee recipient, the net part funds the pool.
    pub fn record_deposit(&mut self, amount: U256, now: u64) -> Result<(U256, U256), LaunchpadError> {
        if amount.is_zero() {
            return Err(LaunchpadError::InvalidAmount);
        }
        if self.finalized || now >= self.params.start {
            return Err(LaunchpadError::SaleAlreadyStarted);
        }
        // fee is charged on top of the funded portion, so sending the `total`
        // from `required_deposit_tokens` lands exactly `tokens_for_sale` net
        let net = mul_div(
            amount,
            U256::from(crate::math::BPS_DENOMINATOR),
            U256::from(crate::math::BPS_DENOMINATOR + self.params.fee_token_bps as u64),
        )?;
        let fee = amount.try_sub(net)?;
        self.total_sale_tokens_deposited = self.total_sale_tokens_deposited.try_add(net)?;
        Ok((fee, net))
    }

    /// Validates and credits a purchase. Returns the sale-token amount bought.
    pub fn record_purchase(
        &mut self,
        contribution: &mut Contribution,
        base_amount: U256,
        tier: u8,
        now: u64,
    ) -> Result<U256, LaunchpadError> {
        match self.phase(now)? {
            SalePhase::Live => {}
            SalePhase::Unfunded => return Err(LaunchpadError::SaleNotFunded),
            _ => return Err(LaunchpadError::NotLive),
        }
        if base_amount.is_zero() {
            return Err(LaunchpadError::InvalidAmount);
        }
        if tier == 0 {
            return Err(LaunchpadError::NoAllocation);
        }

        let new_raised = self.total_raised_base.try_add(base_amount)?;
        if new_raised > self.params.hard_cap_base {
            return Err(LaunchpadError::HardCapExceeded);
        }
        let new_purchased = contribution.purchased_base.try_add(base_amount)?;
        if new_purchased > self.params.per_wallet_cap_base {
            return Err(LaunchpadError::WalletCapExceeded);
        }
        if new_purchased > self.params.tier_cap(tier) {
            return Err(LaunchpadError::TierCapExceeded);
        }

        let tokens = self.params.tokens_for_base(base_amount)?;
        if tokens.is_zero() {
            return Err(LaunchpadError::InvalidAmount);
        }

        contribution.purchased_base = new_purchased;
        contribution.purchased_tokens = contribution.purchased_tokens.try_add(tokens)?;
        self.total_raised_base = new_raised;
        self.total_tokens_sold = self.total_tokens_sold.try_add(tokens)?;
        Ok(tokens)
    }

    /// Resolves the sale once the window has closed. Returns the outcome.
    pub fn finalize(&mut self, now: u64) -> Result<bool, LaunchpadError> {
        if self.finalized {
            return Err(LaunchpadError::AlreadyFinalized);
        }
        if now <= self.params.end {
            return Err(LaunchpadError::SaleNotEnded);
        }
        self.finalized = true;
        self.successful = self.total_raised_base >= self.params.soft_cap_base;
        Ok(self.successful)
    }

    fn require_success(&self) -> Result<(), LaunchpadError> {
        if !self.finalized {
            return Err(LaunchpadError::NotFinalized);
        }
        if !self.successful {
            return Err(LaunchpadError::SaleNotSuccessful);
        }
        Ok(())
    }

    /// The TGE share of a contribution.
    pub fn tge_amount(&self, contribution: &Contribution) -> Result<U256, LaunchpadError> {
        share_bps(contribution.purchased_tokens, self.params.tge_bps as u64)
    }

    /// Marks the TGE share claimed and returns it. A zero purchase is a no-op.
    pub fn claim_tge(
        &self,
        contribution: &mut Contribution,
        now: u64,
    ) -> Result<U256, LaunchpadError> {
        self.require_success()?;
        if now < self.params.tge_time {
            return Err(LaunchpadError::TgeNotReached);
        }
        if contribution.purchased_tokens.is_zero() {
            return Ok(U256::zero());
        }
        if contribution.tge_claimed {
            return Err(LaunchpadError::AlreadyClaimed);
        }
        contribution.tge_claimed = true;
        self.tge_amount(contribution)
    }

    /// Tokens vested so far, excluding the TGE share. Linear from `vest_start`
    /// over `vest_duration`; everything at `vest_start` when the duration is 0.
    pub fn vested_amount(
        &self,
        contribution: &Contribution,
        now: u64,
    ) -> Result<U256, LaunchpadError> {
        if now < self.params.vest_start {
            return Ok(U256::zero());
        }
        let total_vest = contribution
            .purchased_tokens
            .try_sub(self.tge_amount(contribution)?)?;
        if self.params.vest_duration == 0 {
            return Ok(total_vest);
        }
        let elapsed = (now - self.params.vest_start).min(self.params.vest_duration);
        mul_div(
            total_vest,
            U256::from(elapsed),
            U256::from(self.params.vest_duration),
        )
    }

    /// Advances `claimed_vested` and returns the newly claimable amount,
    /// possibly zero. Repeatable as time passes.
    pub fn claim_vested(
        &self,
        contribution: &mut Contribution,
        now: u64,
    ) -> Result<U256, LaunchpadError> {
        self.require_success()?;
        if now < self.params.vest_start {
            return Err(LaunchpadError::VestingNotStarted);
        }
        let vested = self.vested_amount(contribution, now)?;
        let claimable = vested.try_sub(contribution.claimed_vested)?;
        contribution.claimed_vested = vested;
        Ok(claimable)
    }

    /// Marks the contribution refunded and returns the full base amount paid.
    pub fn claim_refund(&self, contribution: &mut Contribution) -> Result<U256, LaunchpadError> {
        if !self.finalized {
            return Err(LaunchpadError::NotFinalized);
        }
        if self.successful {
            return Err(LaunchpadError::SaleNotFailed);
        }
        if contribution.refunded {
            return Err(LaunchpadError::AlreadyRefunded);
        }
        if contribution.purchased_base.is_zero() {
            return Err(LaunchpadError::NothingToRefund);
        }
        contribution.refunded = true;
        Ok(contribution.purchased_base)
    }

    /// Deposited sale tokens returnable to the project owner: the unsold
    /// remainder after a successful sale, the whole deposit after a failure.
    pub fn withdrawable_sale_tokens(&self) -> Result<U256, LaunchpadError> {
        if !self.finalized {
            return Err(LaunchpadError::NotFinalized);
        }
        if self.successful {
            self.total_sale_tokens_deposited.try_sub(self.total_tokens_sold)
        } else {
            Ok(self.total_sale_tokens_deposited)
        }
    }

    /// Marks the deposit-side withdrawal done and returns the amount owed.
    pub fn withdraw_unsold(&mut self) -> Result<U256, LaunchpadError> {
        if self.unsold_withdrawn {
            return Err(LaunchpadError::AlreadyClaimed);
        }
        let amount = self.withdrawable_sale_tokens()?;
        self.unsold_withdrawn = true;
        Ok(amount)
    }

    /// Marks the raise withdrawn and returns `(fee, net)` of the raised base.
    pub fn withdraw_raise(&mut self) -> Result<(U256, U256), LaunchpadError> {
        self.require_success()?;
        if self.raise_withdrawn {
            return Err(LaunchpadError::AlreadyClaimed);
        }
        self.raise_withdrawn = true;
        let fee = share_bps(self.total_raised_base, self.params.fee_token_bps as u64)?;
        let net = self.total_raised_base.try_sub(fee)?;
        Ok((fee, net))
    }
}
