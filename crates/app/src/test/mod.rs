//! Shared test infrastructure.

mod helpers;

pub(crate) use context::{SCAN_AT, TestContext};
pub(crate) use helpers::*;
