//! Customer Records

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{identity::BusinessId, ids::TypedId};

/// Prefix of ids given to transient walk-in customers.
pub const WALK_IN_PREFIX: &str = "walk-in-";

/// Customer Id
pub type CustomerId = TypedId<Customer>;

/// Customer Record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: CustomerId,

    pub business_id: BusinessId,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default)]
    pub total_visits: i64,

    #[serde(default)]
    pub total_spent: Decimal,

    #[serde(default)]
    pub loyalty_points: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loyalty_tier: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_visit: Option<Timestamp>,
}

impl Customer {
    /// Anonymous customer attached to a scan when no registered customer is known.
    ///
    /// Never persisted.
    #[must_use]
    pub fn walk_in(business: BusinessId, point_in_time: Timestamp) -> Self {
        Self {
            id: CustomerId::new(format!(
                "{WALK_IN_PREFIX}{}",
                point_in_time.as_millisecond()
            )),
            business_id: business,
            name: "Walk-in Customer".to_string(),
            email: None,
            phone: None,
            total_visits: 0,
            total_spent: Decimal::ZERO,
            loyalty_points: 0,
            loyalty_tier: None,
            last_visit: None,
        }
    }

    #[must_use]
    pub fn is_walk_in(&self) -> bool {
        self.id.as_str().starts_with(WALK_IN_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walk_in_id_carries_the_timestamp() -> Result<(), jiff::Error> {
        let at = Timestamp::from_millisecond(1_700_000_000_123)?;
        let customer = Customer::walk_in(BusinessId::from("b-1"), at);

        assert_eq!(customer.id.as_str(), "walk-in-1700000000123");
        assert!(customer.is_walk_in());
        assert_eq!(customer.total_visits, 0);

        Ok(())
    }
}
