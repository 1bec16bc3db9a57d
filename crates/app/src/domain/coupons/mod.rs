//! Coupons

pub mod errors;
pub mod records;
mod repositories;
pub mod service;

pub use errors::{ErrorKind, RedemptionError};
pub use records::{
    Coupon, CouponId, Discount, DistributionEvent, DistributionStatus, EventSource, Redemption,
};
pub use service::*;
