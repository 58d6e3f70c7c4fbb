//! Tier-gated token sale launchpad.
//!
//! Four contracts cooperate: [`StakingPool`] locks a project token and accrues
//! both reward emissions and lock-weighted points, [`TierAggregator`] blends
//! points from any number of registered sources into a tier from 0 to 3,
//! [`SaleRegistry`] hosts the sales themselves, and [`MockToken`] is the
//! CEP-18-style token used by tests and local deployments.
#![cfg_attr(not(test), no_std)]
#![allow(clippy::arithmetic_side_effects)]

extern crate alloc;

pub mod error;
pub mod interfaces;
pub mod math;
pub mod registry;
pub mod staking;
pub mod state;
pub mod tiers;
pub mod token;

pub use error::LaunchpadError;
pub use registry::SaleRegistry;
pub use staking::StakingPool;
pub use tiers::TierAggregator;
pub use token::MockToken;
