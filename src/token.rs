//! Minimal CEP-18-style fungible token.
//!
//! Exposes exactly the `TokenClient` surface the pools and the registry pull
//! through, plus `approve`/`mint` so host tests and the CLI deploy script can
//! seed balances. Not meant for production use.

use odra::prelude::*;
use odra::casper_types::U256;

use crate::error::LaunchpadError;

pub mod events {
    use odra::prelude::*;
    use odra::casper_types::U256;

    #[odra::event]
    pub struct Transfer {
        pub from: Address,
        pub to: Address,
        pub amount: U256,
    }

    #[odra::event]
    pub struct Approval {
        pub owner: Address,
        pub spender: Address,
        pub amount: U256,
    }
}

#[odra::module(events = [events::Transfer, events::Approval])]
pub struct MockToken {
    name: Var<String>,
    symbol: Var<String>,
    decimals: Var<u8>,
    total_supply: Var<U256>,
    balances: Mapping<Address, U256>,
    allowances: Mapping<(Address, Address), U256>,
}

#[odra::module]
impl MockToken {
    /// Mints the initial supply to the deployer.
    pub fn init(&mut self, name: String, symbol: String, decimals: u8, initial_supply: U256) {
        self.name.set(name);
        self.symbol.set(symbol);
        self.decimals.set(decimals);
        self.total_supply.set(initial_supply);
        self.balances.set(&self.env().caller(), initial_supply);
    }

    pub fn transfer(&mut self, recipient: Address, amount: U256) {
        let caller = self.env().caller();
        self.raw_transfer(caller, recipient, amount);
    }

    pub fn approve(&mut self, spender: Address, amount: U256) {
        let caller = self.env().caller();
        self.allowances.set(&(caller, spender), amount);
        self.env().emit_event(events::Approval {
            owner: caller,
            spender,
            amount,
        });
    }

    pub fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) {
        let spender = self.env().caller();
        let allowance = self.allowances.get(&(owner, spender)).unwrap_or_default();
        if allowance < amount {
            self.env().revert(LaunchpadError::InsufficientAllowance);
        }
        self.allowances.set(&(owner, spender), allowance - amount);
        self.raw_transfer(owner, recipient, amount);
    }

    /// Unrestricted faucet-style mint; this is a test token.
    pub fn mint(&mut self, recipient: Address, amount: U256) {
        let balance = self.balances.get(&recipient).unwrap_or_default();
        self.balances.set(&recipient, balance + amount);
        let supply = self.total_supply.get_or_default();
        self.total_supply.set(supply + amount);
    }

    pub fn balance_of(&self, account: Address) -> U256 {
        self.balances.get(&account).unwrap_or_default()
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances.get(&(owner, spender)).unwrap_or_default()
    }

    pub fn name(&self) -> String {
        self.name.get_or_default()
    }

    pub fn symbol(&self) -> String {
        self.symbol.get_or_default()
    }

    pub fn decimals(&self) -> u8 {
        self.decimals.get_or_default()
    }

    pub fn total_supply(&self) -> U256 {
        self.total_supply.get_or_default()
    }

    fn raw_transfer(&mut self, from: Address, to: Address, amount: U256) {
        let from_balance = self.balances.get(&from).unwrap_or_default();
        if from_balance < amount {
            self.env().revert(LaunchpadError::InsufficientBalance);
        }
        self.balances.set(&from, from_balance - amount);
        let to_balance = self.balances.get(&to).unwrap_or_default();
        self.balances.set(&to, to_balance + amount);
        self.env().emit_event(events::Transfer { from, to, amount });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use odra::host::Deployer;

    #[test]
    fn transfer_and_allowance_bookkeeping() {
        let env = odra_test::env();
        let mut token = MockToken::deploy(
            &env,
            MockTokenInitArgs {
                name: String::from("Base USD"),
                symbol: String::from("BUSD"),
                decimals: 6,
                initial_supply: U256::from(1_000_000u64),
            },
        );
        let alice = env.get_account(0);
        let bob = env.get_account(1);

        token.transfer(bob, U256::from(300u64));
        assert_eq!(token.balance_of(bob), U256::from(300u64));
        assert_eq!(token.balance_of(alice), U256::from(999_700u64));

        token.approve(bob, U256::from(100u64));
        env.set_caller(bob);
        token.transfer_from(alice, bob, U256::from(100u64));
        assert_eq!(token.balance_of(bob), U256::from(400u64));
        assert_eq!(
            token.try_transfer_from(alice, bob, U256::from(1u64)),
            Err(LaunchpadError::InsufficientAllowance.into())
        );

        assert_eq!(
            token.try_transfer(alice, U256::from(500u64)),
            Err(LaunchpadError::InsufficientBalance.into())
        );
    }
}
