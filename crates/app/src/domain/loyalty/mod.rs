//! Loyalty

pub mod eligibility;
pub mod errors;
pub mod lookup;
pub mod records;
mod repository;
pub mod service;

pub use errors::LoyaltyError;
pub use lookup::CustomerLookup;
pub use records::{
    LoyaltyProgram, LoyaltyReward, ProgramId, ProgramType, RewardId, RewardRedemption, Tier,
};
pub use service::*;
