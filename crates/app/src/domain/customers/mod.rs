//! Customers

pub mod records;
mod repository;

pub use records::{Customer, CustomerId, WALK_IN_PREFIX};
pub use repository::StoreCustomersRepository;
