#![allow(unused_imports)]

use odra::prelude::*;

use tier_launchpad::{MockToken, SaleRegistry, StakingPool, TierAggregator};

fn main() {
    // merge the schemas of every deployable contract into one JSON document
    let schema = SaleRegistry::module_schema()
        .merge(StakingPool::module_schema())
        .merge(TierAggregator::module_schema())
        .merge(MockToken::module_schema());

    println!("{}", schema.as_json().expect("Failed to generate schema"));
}
