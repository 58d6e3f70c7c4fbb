//! Sale registry and factory.
//!
//! Contracts on Casper cannot deploy other contracts from entry points, so the
//! registry keeps every sale as a `SalePool` record in its own storage and
//! routes all token movement itself. Accounting always settles before any
//! transfer leaves or enters this contract.

use odra::prelude::*;
use odra::casper_types::U256;
use odra::ContractRef;

use crate::error::{ok_or_revert, LaunchpadError};
use crate::interfaces::{TierOracleContractRef, TokenClientContractRef};
use crate::state::sale::{Contribution, SaleParams, SalePhase, SalePool};

/// The highest platform fee the registry accepts, 10%.
pub const MAX_PLATFORM_FEE_BPS: u16 = 1_000;

/// Everything a project owner supplies at creation. The registry stamps in
/// the caller as project owner plus the platform fee and treasury of the
/// moment, so later platform reconfiguration never touches a live sale.
#[odra::odra_type]
pub struct CreateSaleArgs {
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
}

pub mod events {
    use odra::prelude::*;
    use odra::casper_types::U256;

    #[odra::event]
    pub struct SaleCreated {
        pub sale_id: u32,
        pub project_owner: Address,
        pub sale_token: Address,
        pub base_token: Address,
    }

    #[odra::event]
    pub struct SaleTokensDeposited {
        pub sale_id: u32,
        pub amount: U256,
        pub fee: U256,
    }

    #[odra::event]
    pub struct Purchased {
        pub sale_id: u32,
        pub buyer: Address,
        pub base_amount: U256,
        pub token_amount: U256,
        pub tier: u8,
    }

    #[odra::event]
    pub struct SaleFinalized {
        pub sale_id: u32,
        pub successful: bool,
        pub total_raised_base: U256,
    }

    #[odra::event]
    pub struct TgeClaimed {
        pub sale_id: u32,
        pub buyer: Address,
        pub amount: U256,
    }

    #[odra::event]
    pub struct VestedClaimed {
        pub sale_id: u32,
        pub buyer: Address,
        pub amount: U256,
    }

    #[odra::event]
    pub struct Refunded {
        pub sale_id: u32,
        pub buyer: Address,
        pub amount: U256,
    }

    #[odra::event]
    pub struct UnsoldWithdrawn {
        pub sale_id: u32,
        pub amount: U256,
    }

    #[odra::event]
    pub struct RaiseWithdrawn {
        pub sale_id: u32,
        pub fee: U256,
        pub net: U256,
    }

    #[odra::event]
    pub struct PlatformFeeChanged {
        pub fee_bps: u16,
    }

    #[odra::event]
    pub struct PlatformTreasuryChanged {
        pub treasury: Address,
    }
}

#[odra::module(events = [
    events::SaleCreated,
    events::SaleTokensDeposited,
    events::Purchased,
    events::SaleFinalized,
    events::TgeClaimed,
    events::VestedClaimed,
    events::Refunded,
    events::UnsoldWithdrawn,
    events::RaiseWithdrawn,
    events::PlatformFeeChanged,
    events::PlatformTreasuryChanged
])]
pub struct SaleRegistry {
    owner: Var<Address>,
    platform_fee_bps: Var<u16>,
    platform_treasury: Var<Address>,
    sales_count: Var<u32>,
    sales: Mapping<u32, SalePool>,
    contributions: Mapping<(u32, Address), Contribution>,
}

#[odra::module]
impl SaleRegistry {
    pub fn init(&mut self, platform_fee_bps: u16, platform_treasury: Address) {
        if platform_fee_bps > MAX_PLATFORM_FEE_BPS {
            self.env().revert(LaunchpadError::FeeTooHigh);
        }
        self.owner.set(self.env().caller());
        self.platform_fee_bps.set(platform_fee_bps);
        self.platform_treasury.set(platform_treasury);
        self.sales_count.set(0);
    }

    // =========================================================================
    // SALE CREATION AND FUNDING
    // =========================================================================

    /// Registers a new sale and returns its id. The caller becomes the
    /// project owner; the current platform fee and treasury are frozen into
    /// the sale parameters.
    pub fn create_sale(&mut self, args: CreateSaleArgs) -> u32 {
        let project_owner = self.env().caller();
        let params = SaleParams {
            sale_token: args.sale_token,
            base_token: args.base_token,
            price_num: args.price_num,
            price_den: args.price_den,
            start: args.start,
            end: args.end,
            tge_time: args.tge_time,
            vest_start: args.vest_start,
            vest_duration: args.vest_duration,
            tge_bps: args.tge_bps,
            hard_cap_base: args.hard_cap_base,
            soft_cap_base: args.soft_cap_base,
            per_wallet_cap_base: args.per_wallet_cap_base,
            tier1_cap_base: args.tier1_cap_base,
            tier2_cap_base: args.tier2_cap_base,
            tier3_cap_base: args.tier3_cap_base,
            tier_oracle: args.tier_oracle,
            project_owner,
            fee_token_bps: self.platform_fee_bps.get_or_default(),
            fee_recipient: self.platform_treasury.get().expect("treasury not set"),
        };
        ok_or_revert(&self.env(), params.validate());

        let sale_id = self.sales_count.get_or_default();
        self.sales_count.set(sale_id + 1);
        let sale_token = params.sale_token;
        let base_token = params.base_token;
        self.sales.set(&sale_id, SalePool::new(params));
        self.env().emit_event(events::SaleCreated {
            sale_id,
            project_owner,
            sale_token,
            base_token,
        });
        sale_id
    }

    /// Pulls sale tokens from the project owner. The platform fee cut goes
    /// straight to the treasury; the rest funds the pool.
    pub fn deposit_sale_tokens(&mut self, sale_id: u32, amount: U256) {
        let caller = self.env().caller();
        let now = self.env().get_block_time();
        let mut sale = self.load_sale(sale_id);
        if caller != sale.params.project_owner {
            self.env().revert(LaunchpadError::NotProjectOwner);
        }
        let deposit = sale.record_deposit(amount, now);
        let (fee, net) = ok_or_revert(&self.env(), deposit);
        let fee_recipient = sale.params.fee_recipient;
        let sale_token = sale.params.sale_token;
        self.sales.set(&sale_id, sale);

        let mut token = self.token_ref(sale_token);
        if !fee.is_zero() {
            token.transfer_from(caller, fee_recipient, fee);
        }
        token.transfer_from(caller, self.env().self_address(), net);
        self.env().emit_event(events::SaleTokensDeposited { sale_id, amount, fee });
    }

    // =========================================================================
    // PURCHASE AND RESOLUTION
    // =========================================================================

    /// Buys into a live sale. The caller's tier comes from the sale's oracle
    /// at purchase time; tier 0 has no allocation.
    pub fn buy(&mut self, sale_id: u32, base_amount: U256) {
        let buyer = self.env().caller();
        let now = self.env().get_block_time();
        let mut sale = self.load_sale(sale_id);
        let tier =
            TierOracleContractRef::new(self.env().clone(), sale.params.tier_oracle).tier_of(buyer);

        let mut contribution = self.contributions.get(&(sale_id, buyer)).unwrap_or_default();
        let purchase = sale.record_purchase(&mut contribution, base_amount, tier, now);
        let token_amount = ok_or_revert(&self.env(), purchase);
        let base_token = sale.params.base_token;
        self.contributions.set(&(sale_id, buyer), contribution);
        self.sales.set(&sale_id, sale);

        self.token_ref(base_token)
            .transfer_from(buyer, self.env().self_address(), base_amount);
        self.env().emit_event(events::Purchased {
            sale_id,
            buyer,
            base_amount,
            token_amount,
            tier,
        });
    }

    /// Resolves a sale after its window closes. Anyone may call.
    pub fn finalize(&mut self, sale_id: u32) {
        let now = self.env().get_block_time();
        let mut sale = self.load_sale(sale_id);
        let outcome = sale.finalize(now);
        let successful = ok_or_revert(&self.env(), outcome);
        let total_raised_base = sale.total_raised_base;
        self.sales.set(&sale_id, sale);
        self.env().emit_event(events::SaleFinalized {
            sale_id,
            successful,
            total_raised_base,
        });
    }

    // =========================================================================
    // CLAIMS
    // =========================================================================

    pub fn claim_tge(&mut self, sale_id: u32) {
        let buyer = self.env().caller();
        let now = self.env().get_block_time();
        let sale = self.load_sale(sale_id);
        let mut contribution = self.contributions.get(&(sale_id, buyer)).unwrap_or_default();
        let claim = sale.claim_tge(&mut contribution, now);
        let amount = ok_or_revert(&self.env(), claim);
        self.contributions.set(&(sale_id, buyer), contribution);
        if !amount.is_zero() {
            self.token_ref(sale.params.sale_token).transfer(buyer, amount);
        }
        self.env().emit_event(events::TgeClaimed { sale_id, buyer, amount });
    }

    pub fn claim_vested(&mut self, sale_id: u32) {
        let buyer = self.env().caller();
        let now = self.env().get_block_time();
        let sale = self.load_sale(sale_id);
        let mut contribution = self.contributions.get(&(sale_id, buyer)).unwrap_or_default();
        let claim = sale.claim_vested(&mut contribution, now);
        let amount = ok_or_revert(&self.env(), claim);
        self.contributions.set(&(sale_id, buyer), contribution);
        if !amount.is_zero() {
            self.token_ref(sale.params.sale_token).transfer(buyer, amount);
        }
        self.env().emit_event(events::VestedClaimed { sale_id, buyer, amount });
    }

    /// Returns a buyer's full base payment after a failed sale.
    pub fn claim_refund(&mut self, sale_id: u32) {
        let buyer = self.env().caller();
        let sale = self.load_sale(sale_id);
        let mut contribution = self.contributions.get(&(sale_id, buyer)).unwrap_or_default();
        let refund = sale.claim_refund(&mut contribution);
        let amount = ok_or_revert(&self.env(), refund);
        self.contributions.set(&(sale_id, buyer), contribution);
        self.token_ref(sale.params.base_token).transfer(buyer, amount);
        self.env().emit_event(events::Refunded { sale_id, buyer, amount });
    }

    // =========================================================================
    // PROJECT-OWNER WITHDRAWALS
    // =========================================================================

    /// Returns the unsold remainder after success, or the whole deposit after
    /// failure, to the project owner.
    pub fn withdraw_unsold_tokens(&mut self, sale_id: u32) {
        let caller = self.env().caller();
        let mut sale = self.load_sale(sale_id);
        if caller != sale.params.project_owner {
            self.env().revert(LaunchpadError::NotProjectOwner);
        }
        let withdrawal = sale.withdraw_unsold();
        let amount = ok_or_revert(&self.env(), withdrawal);
        let sale_token = sale.params.sale_token;
        self.sales.set(&sale_id, sale);
        if !amount.is_zero() {
            self.token_ref(sale_token).transfer(caller, amount);
        }
        self.env().emit_event(events::UnsoldWithdrawn { sale_id, amount });
    }

    /// Pays out the raised base tokens after success: the fee cut to the
    /// treasury, the rest to the project owner.
    pub fn withdraw_raise(&mut self, sale_id: u32) {
        let caller = self.env().caller();
        let mut sale = self.load_sale(sale_id);
        if caller != sale.params.project_owner {
            self.env().revert(LaunchpadError::NotProjectOwner);
        }
        let withdrawal = sale.withdraw_raise();
        let (fee, net) = ok_or_revert(&self.env(), withdrawal);
        let base_token = sale.params.base_token;
        let fee_recipient = sale.params.fee_recipient;
        self.sales.set(&sale_id, sale);

        let mut token = self.token_ref(base_token);
        if !fee.is_zero() {
            token.transfer(fee_recipient, fee);
        }
        if !net.is_zero() {
            token.transfer(caller, net);
        }
        self.env().emit_event(events::RaiseWithdrawn { sale_id, fee, net });
    }

    // =========================================================================
    // PLATFORM ADMINISTRATION
    // =========================================================================

    /// Applies to sales created afterwards only.
    pub fn set_platform_fee(&mut self, fee_bps: u16) {
        self.require_owner();
        if fee_bps > MAX_PLATFORM_FEE_BPS {
            self.env().revert(LaunchpadError::FeeTooHigh);
        }
        self.platform_fee_bps.set(fee_bps);
        self.env().emit_event(events::PlatformFeeChanged { fee_bps });
    }

    pub fn set_platform_treasury(&mut self, treasury: Address) {
        self.require_owner();
        if treasury == self.env().self_address() {
            self.env().revert(LaunchpadError::InvalidTreasury);
        }
        self.platform_treasury.set(treasury);
        self.env().emit_event(events::PlatformTreasuryChanged { treasury });
    }

    pub fn transfer_ownership(&mut self, new_owner: Address) {
        self.require_owner();
        self.owner.set(new_owner);
    }

    // =========================================================================
    // VIEWS
    // =========================================================================

    pub fn sales_count(&self) -> u32 {
        self.sales_count.get_or_default()
    }

    pub fn get_all_sales(&self) -> Vec<u32> {
        (0..self.sales_count.get_or_default()).collect()
    }

    pub fn get_sale(&self, sale_id: u32) -> SalePool {
        self.load_sale(sale_id)
    }

    pub fn contribution_of(&self, sale_id: u32, account: Address) -> Contribution {
        self.contributions.get(&(sale_id, account)).unwrap_or_default()
    }

    pub fn phase_of(&self, sale_id: u32) -> SalePhase {
        let sale = self.load_sale(sale_id);
        let phase = sale.phase(self.env().get_block_time());
        ok_or_revert(&self.env(), phase)
    }

    /// `(tokens_for_sale, fee_tokens, total)` the project owner must send to
    /// fund the sale up to its hard cap.
    pub fn required_deposit_tokens(&self, sale_id: u32) -> (U256, U256, U256) {
        let sale = self.load_sale(sale_id);
        let required = sale.required_deposit_tokens();
        ok_or_revert(&self.env(), required)
    }

    pub fn platform_fee_bps(&self) -> u16 {
        self.platform_fee_bps.get_or_default()
    }

    pub fn platform_treasury(&self) -> Address {
        self.platform_treasury.get().expect("treasury not set")
    }

    // =========================================================================
    // INTERNAL
    // =========================================================================

    fn require_owner(&self) {
        if self.owner.get() != Some(self.env().caller()) {
            self.env().revert(LaunchpadError::Unauthorized);
        }
    }

    fn load_sale(&self, sale_id: u32) -> SalePool {
        match self.sales.get(&sale_id) {
            Some(sale) => sale,
            None => self.env().revert(LaunchpadError::NoSuchSale),
        }
    }

    fn token_ref(&self, token: Address) -> TokenClientContractRef {
        TokenClientContractRef::new(self.env().clone(), token)
    }
}
