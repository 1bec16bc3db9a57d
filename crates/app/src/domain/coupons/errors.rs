//! Redemption errors.

use thiserror::Error;

use crate::store::StoreError;

/// Failure category shown to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    CameraUnavailable,
    InvalidFormat,
    NotFound,
    Inactive,
    Expired,
    AuditWriteFailed,
    CommitFailed,
    Storage,
}

impl ErrorKind {
    /// Whether confirming again may succeed without a new scan.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::CommitFailed)
    }
}

#[derive(Debug, Error)]
pub enum RedemptionError {
    #[error("invalid coupon code format")]
    InvalidFormat,

    #[error("coupon not found")]
    NotFound,

    #[error("coupon is inactive")]
    Inactive,

    #[error("coupon is outside its validity window")]
    Expired,

    #[error("failed to write redemption event: {0}")]
    AuditWriteFailed(String),

    #[error("failed to commit redemption")]
    CommitFailed(#[source] StoreError),

    #[error("storage error")]
    Store(#[from] StoreError),
}

impl RedemptionError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidFormat => ErrorKind::InvalidFormat,
            Self::NotFound => ErrorKind::NotFound,
            Self::Inactive => ErrorKind::Inactive,
            Self::Expired => ErrorKind::Expired,
            Self::AuditWriteFailed(_) => ErrorKind::AuditWriteFailed,
            Self::CommitFailed(_) => ErrorKind::CommitFailed,
            Self::Store(_) => ErrorKind::Storage,
        }
    }

    /// Message suitable for showing to the operator.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidFormat => "That code doesn't look right. Scan again or type it in.",
            Self::NotFound => "No coupon with that code exists for this business.",
            Self::Inactive => "This coupon is not active.",
            Self::Expired => "This coupon is not valid today.",
            Self::AuditWriteFailed(_) => "The scan could not be recorded.",
            Self::CommitFailed(_) => "The redemption could not be saved. Try confirming again.",
            Self::Store(_) => "Something went wrong looking up the coupon. Try again.",
        }
    }
}
