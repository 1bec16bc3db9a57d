//! Tally Domain Concerns

pub mod coupons;
pub mod customers;
pub mod loyalty;
