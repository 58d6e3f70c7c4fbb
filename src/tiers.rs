//! Tier aggregation over registered points sources.
//!
//! Points are recomputed from the sources on every query, so weight and
//! threshold changes apply retroactively. Queries are read-only end to end:
//! this contract never mutates state while serving a sale pool.

use odra::prelude::*;
use odra::casper_types::U256;
use odra::ContractRef;

use crate::error::{ok_or_revert, LaunchpadError};
use crate::interfaces::PointsSourceContractRef;
use crate::math::{mul_div, TryAdd, BPS_DENOMINATOR};

/// Strictly increasing tier cutoffs, closed below: `points == t1` is tier 1.
#[odra::odra_type]
pub struct TierThresholds {
    pub t1: U256,
    pub t2: U256,
    pub t3: U256,
}

pub mod events {
    use odra::prelude::*;
    use odra::casper_types::U256;

    #[odra::event]
    pub struct SourceAdded {
        pub source: Address,
    }

    #[odra::event]
    pub struct SourceRemoved {
        pub source: Address,
    }

    #[odra::event]
    pub struct WeightChanged {
        pub source: Address,
        pub weight_bps: u32,
    }

    #[odra::event]
    pub struct ThresholdsChanged {
        pub t1: U256,
        pub t2: U256,
        pub t3: U256,
    }
}

#[odra::module(events = [
    events::SourceAdded,
    events::SourceRemoved,
    events::WeightChanged,
    events::ThresholdsChanged
])]
pub struct TierAggregator {
    owner: Var<Address>,
    sources: Var<Vec<Address>>,
    weights: Mapping<Address, u32>,
    thresholds: Var<TierThresholds>,
}

#[odra::module]
impl TierAggregator {
    pub fn init(&mut self, t1: U256, t2: U256, t3: U256) {
        let thresholds = TierThresholds { t1, t2, t3 };
        ok_or_revert(&self.env(), validate_thresholds(&thresholds));
        self.owner.set(self.env().caller());
        self.sources.set(Vec::new());
        self.thresholds.set(thresholds);
    }

    // =========================================================================
    // SOURCE MANAGEMENT
    // =========================================================================

    /// Registers a points source at weight 10000 (1.0x); the first source is
    /// thereby the implicit primary until weights are tuned.
    pub fn add_staking_contract(&mut self, source: Address) {
        self.require_owner();
        let mut sources = self.sources.get_or_default();
        if sources.contains(&source) {
            self.env().revert(LaunchpadError::AlreadyRegistered);
        }
        sources.push(source);
        self.sources.set(sources);
        self.weights.set(&source, BPS_DENOMINATOR as u32);
        self.env().emit_event(events::SourceAdded { source });
    }

    /// Drops a source; its contribution disappears from the next query on.
    pub fn remove_staking_contract(&mut self, source: Address) {
        self.require_owner();
        let mut sources = self.sources.get_or_default();
        let index = match sources.iter().position(|s| *s == source) {
            Some(index) => index,
            None => self.env().revert(LaunchpadError::NotRegistered),
        };
        sources.remove(index);
        self.sources.set(sources);
        self.env().emit_event(events::SourceRemoved { source });
    }

    pub fn set_weight(&mut self, source: Address, weight_bps: u32) {
        self.require_owner();
        if weight_bps == 0 {
            self.env().revert(LaunchpadError::InvalidWeight);
        }
        if !self.sources.get_or_default().contains(&source) {
            self.env().revert(LaunchpadError::NotRegistered);
        }
        self.weights.set(&source, weight_bps);
        self.env().emit_event(events::WeightChanged { source, weight_bps });
    }

    pub fn set_thresholds(&mut self, t1: U256, t2: U256, t3: U256) {
        self.require_owner();
        let thresholds = TierThresholds { t1, t2, t3 };
        ok_or_revert(&self.env(), validate_thresholds(&thresholds));
        self.thresholds.set(thresholds);
        self.env().emit_event(events::ThresholdsChanged { t1, t2, t3 });
    }

    pub fn transfer_ownership(&mut self, new_owner: Address) {
        self.require_owner();
        self.owner.set(new_owner);
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Weighted point total over all registered sources, truncating per source.
    pub fn points_of(&self, account: Address) -> U256 {
        let result = self.weighted_points(account);
        ok_or_revert(&self.env(), result)
    }

    /// Tier classification, 0 through 3.
    pub fn tier_of(&self, account: Address) -> u8 {
        let points = self.points_of(account);
        let thresholds = self.thresholds.get().expect("thresholds not set");
        if points < thresholds.t1 {
            0
        } else if points < thresholds.t2 {
            1
        } else if points < thresholds.t3 {
            2
        } else {
            3
        }
    }

    pub fn sources(&self) -> Vec<Address> {
        self.sources.get_or_default()
    }

    pub fn weight_of(&self, source: Address) -> u32 {
        self.weights.get(&source).unwrap_or_default()
    }

    pub fn thresholds(&self) -> TierThresholds {
        self.thresholds.get().expect("thresholds not set")
    }

    // =========================================================================
    // INTERNAL
    // =========================================================================

    fn require_owner(&self) {
        if self.owner.get() != Some(self.env().caller()) {
            self.env().revert(LaunchpadError::Unauthorized);
        }
    }

    fn weighted_points(&self, account: Address) -> Result<U256, LaunchpadError> {
        let mut total = U256::zero();
        for source in self.sources.get_or_default() {
            let raw = PointsSourceContractRef::new(self.env().clone(), source).points_of(account);
            let weight = self.weights.get(&source).unwrap_or_default();
            let weighted = mul_div(
                raw,
                U256::from(weight),
                U256::from(BPS_DENOMINATOR),
            )?;
            total = total.try_add(weighted)?;
        }
        Ok(total)
    }
}

fn validate_thresholds(thresholds: &TierThresholds) -> Result<(), LaunchpadError> {
    if thresholds.t1.is_zero()
        || thresholds.t1 >= thresholds.t2
        || thresholds.t2 >= thresholds.t3
    {
        return Err(LaunchpadError::InvalidThresholds);
    }
    Ok(())
}
