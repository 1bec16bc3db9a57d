//! Coupon redemption and loyalty services over a document store.

pub mod audit;
pub mod context;
pub mod desk;
pub mod domain;
pub mod fixtures;
pub mod identity;
pub mod ids;
pub mod session;
pub mod store;

#[cfg(test)]
mod test;
