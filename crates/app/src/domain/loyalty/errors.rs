//! Loyalty service errors.

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum LoyaltyError {
    #[error("customer not found")]
    NotFound,

    #[error("business has no active loyalty program")]
    NoActiveProgram,

    #[error("reward not found")]
    RewardNotFound,

    #[error("reward is not active")]
    RewardInactive,

    #[error("customer is not eligible for this reward")]
    NotEligible,

    #[error("unrecognised customer identifier")]
    InvalidLookup,

    #[error("failed to update customer")]
    CommitFailed(#[source] StoreError),

    #[error("storage error")]
    Store(#[from] StoreError),
}
