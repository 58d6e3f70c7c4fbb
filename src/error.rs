//! Error taxonomy shared by every launchpad contract.

use odra::prelude::*;
use core::fmt;

#[odra::odra_error]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LaunchpadError {
    // validation - caller's fault, no state change
    InvalidAmount = 1,
    InvalidLockPeriod = 2,
    InvalidAddress = 3,
    InvalidTime = 4,
    InvalidPrice = 5,
    InvalidCaps = 6,
    InvalidTgeShare = 7,
    InvalidThresholds = 8,
    InvalidWeight = 9,
    FeeTooHigh = 10,
    InvalidTreasury = 11,
    NoSuchSale = 12,

    // authorization
    Unauthorized = 20,
    NotProjectOwner = 21,

    // state - operation invalid for the current phase
    StillLocked = 30,
    SaleNotFunded = 31,
    NotLive = 32,
    SaleAlreadyStarted = 33,
    SaleNotEnded = 34,
    AlreadyFinalized = 35,
    NotFinalized = 36,
    SaleNotSuccessful = 37,
    SaleNotFailed = 38,
    TgeNotReached = 39,
    VestingNotStarted = 40,
    AlreadyClaimed = 41,
    AlreadyRefunded = 42,
    NothingToRefund = 43,
    AlreadyRegistered = 44,
    NotRegistered = 45,

    // capacity
    NoAllocation = 50,
    HardCapExceeded = 51,
    WalletCapExceeded = 52,
    TierCapExceeded = 53,

    // arithmetic
    MathOverflow = 60,

    // token accounting (mock token)
    InsufficientBalance = 70,
    InsufficientAllowance = 71,
}

impl LaunchpadError {
    pub fn message(&self) -> &str {
        match self {
            LaunchpadError::InvalidAmount => "Input amount is invalid",
            LaunchpadError::InvalidLockPeriod => "Lock period must be 30, 90 or 180 days",
            LaunchpadError::InvalidAddress => "Input address is invalid",
            LaunchpadError::InvalidTime => "Sale start must precede sale end",
            LaunchpadError::InvalidPrice => "Price numerator and denominator must be non-zero",
            LaunchpadError::InvalidCaps => "Soft cap must be below hard cap",
            LaunchpadError::InvalidTgeShare => "TGE share exceeds 10000 bps",
            LaunchpadError::InvalidThresholds => "Tier thresholds must be strictly increasing",
            LaunchpadError::InvalidWeight => "Source weight is invalid",
            LaunchpadError::FeeTooHigh => "Platform fee exceeds 1000 bps",
            LaunchpadError::InvalidTreasury => "Platform treasury address is invalid",
            LaunchpadError::NoSuchSale => "Sale id is not registered",
            LaunchpadError::Unauthorized => "Caller is not the contract owner",
            LaunchpadError::NotProjectOwner => "Caller is not the project owner",
            LaunchpadError::StillLocked => "Unlocked balance is below the requested amount",
            LaunchpadError::SaleNotFunded => "Sale tokens have not been deposited",
            LaunchpadError::NotLive => "Sale is outside its purchase window",
            LaunchpadError::SaleAlreadyStarted => "Deposits are closed once the sale starts",
            LaunchpadError::SaleNotEnded => "Sale has not ended yet",
            LaunchpadError::AlreadyFinalized => "Sale is already finalized",
            LaunchpadError::NotFinalized => "Sale is not finalized",
            LaunchpadError::SaleNotSuccessful => "Sale did not reach its soft cap",
            LaunchpadError::SaleNotFailed => "Sale reached its soft cap",
            LaunchpadError::TgeNotReached => "TGE time has not been reached",
            LaunchpadError::VestingNotStarted => "Vesting has not started",
            LaunchpadError::AlreadyClaimed => "Already claimed",
            LaunchpadError::AlreadyRefunded => "Already refunded",
            LaunchpadError::NothingToRefund => "Nothing to refund",
            LaunchpadError::AlreadyRegistered => "Points source is already registered",
            LaunchpadError::NotRegistered => "Points source is not registered",
            LaunchpadError::NoAllocation => "Buyer has no tier allocation",
            LaunchpadError::HardCapExceeded => "Purchase would exceed the hard cap",
            LaunchpadError::WalletCapExceeded => "Purchase would exceed the per-wallet cap",
            LaunchpadError::TierCapExceeded => "Purchase would exceed the buyer's tier cap",
            LaunchpadError::MathOverflow => "Math operation overflow",
            LaunchpadError::InsufficientBalance => "Token balance is insufficient",
            LaunchpadError::InsufficientAllowance => "Token allowance is insufficient",
        }
    }
}

/// Surfaces an internal `Result` at an entrypoint boundary, reverting the
/// whole call on error.
pub(crate) fn ok_or_revert<T>(
    env: &odra::ContractEnv,
    result: Result<T, LaunchpadError>,
) -> T {
    match result {
        Ok(value) => value,
        Err(error) => env.revert(error),
    }
}

impl fmt::Display for LaunchpadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}
