//! Cross-contract interfaces.
//!
//! Callers hold an address and dispatch through the generated `*ContractRef`;
//! no contract depends on a concrete implementation of its collaborators.

use odra::prelude::*;
use odra::casper_types::U256;

/// Fungible-token surface consumed by the staking pools and the sale registry.
/// A CEP-18 subset: balances, transfers and allowance-based pulls.
#[odra::external_contract]
pub trait TokenClient {
    fn transfer(&mut self, recipient: Address, amount: U256);
    fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256);
    fn balance_of(&self, account: Address) -> U256;
    fn decimals(&self) -> u8;
}

/// Anything exposing tier points for an address. Implemented by `StakingPool`,
/// consumed by `TierAggregator`. Must be read-only.
#[odra::external_contract]
pub trait PointsSource {
    fn points_of(&self, account: Address) -> U256;
}

/// Tier classification oracle consumed by the sale registry.
/// Implemented by `TierAggregator`. Must be read-only.
#[odra::external_contract]
pub trait TierOracle {
    fn tier_of(&self, account: Address) -> u8;
    fn points_of(&self, account: Address) -> U256;
}
