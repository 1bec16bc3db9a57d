//! Coupon Records

use std::fmt::{Display, Formatter, Result as FmtResult};

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    domain::{
        coupons::errors::RedemptionError,
        customers::{Customer, CustomerId},
    },
    identity::BusinessId,
    ids::TypedId,
};

/// Coupon Id
pub type CouponId = TypedId<Coupon>;

/// Discount shape, tagged by `discountType`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "discountType", rename_all = "snake_case")]
pub enum Discount {
    #[serde(rename_all = "camelCase")]
    Percentage { discount_value: Decimal },

    #[serde(rename_all = "camelCase")]
    Fixed { discount_value: Decimal },

    #[serde(rename_all = "camelCase")]
    BuyXGetY { buy_quantity: u32, get_quantity: u32 },

    #[serde(rename_all = "camelCase")]
    FreeItem { free_item: String },
}

impl Display for Discount {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Percentage { discount_value } => write!(f, "{}% off", discount_value.normalize()),
            Self::Fixed { discount_value } => write!(f, "{discount_value:.2} off"),
            Self::BuyXGetY {
                buy_quantity,
                get_quantity,
            } => write!(f, "buy {buy_quantity} get {get_quantity} free"),
            Self::FreeItem { free_item } => write!(f, "free {free_item}"),
        }
    }
}

/// Coupon Record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub id: CouponId,

    pub business_id: BusinessId,

    /// Unique within the business.
    pub code: String,

    #[serde(default)]
    pub title: String,

    #[serde(flatten)]
    pub discount: Discount,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Timestamp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<Timestamp>,

    #[serde(default)]
    pub active: bool,

    #[serde(default)]
    pub usage_count: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_limit: Option<i64>,

    #[serde(default)]
    pub distribution_count: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_limit: Option<i64>,

    #[serde(default)]
    pub first_time_only: bool,

    #[serde(default)]
    pub birthday_only: bool,
}

impl Coupon {
    /// Whether the coupon may be redeemed at `point_in_time`.
    ///
    /// Both bounds are inclusive; a missing bound is open on that side.
    ///
    /// # Errors
    ///
    /// [`RedemptionError::Inactive`] takes precedence over [`RedemptionError::Expired`].
    pub fn check_redeemable(&self, point_in_time: Timestamp) -> Result<(), RedemptionError> {
        if !self.active {
            return Err(RedemptionError::Inactive);
        }

        let started = self.start_date.is_none_or(|start| start <= point_in_time);
        let not_ended = self.end_date.is_none_or(|end| point_in_time <= end);

        if started && not_ended {
            Ok(())
        } else {
            Err(RedemptionError::Expired)
        }
    }

    /// Uses left before the usage limit, if there is one.
    #[must_use]
    pub fn remaining_uses(&self) -> Option<i64> {
        self.usage_limit
            .map(|limit| limit.saturating_sub(self.usage_count).max(0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistributionStatus {
    Sent,
    Redeemed,
}

/// Where a distribution event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSource {
    QrScan,
}

/// Append-only audit record of one scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionEvent {
    pub coupon_id: CouponId,

    pub customer_id: CustomerId,

    pub business_id: BusinessId,

    pub status: DistributionStatus,

    pub source: EventSource,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redeemed_at: Option<Timestamp>,
}

impl DistributionEvent {
    /// A `redeemed` event for a same-session scan; timestamps are assigned by the store.
    #[must_use]
    pub fn scanned(coupon: &Coupon, customer: &Customer) -> Self {
        Self {
            coupon_id: coupon.id.clone(),
            customer_id: customer.id.clone(),
            business_id: coupon.business_id.clone(),
            status: DistributionStatus::Redeemed,
            source: EventSource::QrScan,
            created_at: None,
            redeemed_at: None,
        }
    }
}

/// A resolved scan, shown to the operator for confirmation.
#[derive(Debug, Clone, PartialEq)]
pub struct Redemption {
    pub coupon: Coupon,

    pub customer: Customer,
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    fn coupon(value: serde_json::Value) -> Result<Coupon, serde_json::Error> {
        serde_json::from_value(value)
    }

    fn at(text: &str) -> Result<Timestamp, jiff::Error> {
        text.parse()
    }

    fn save10() -> Result<Coupon, serde_json::Error> {
        coupon(json!({
            "id": "c-1",
            "businessId": "b-1",
            "code": "SAVE10",
            "discountType": "percentage",
            "discountValue": 10,
            "startDate": "2026-01-01T00:00:00Z",
            "endDate": "2026-12-31T23:59:59Z",
            "active": true,
            "usageCount": 3,
            "usageLimit": 5
        }))
    }

    #[test]
    fn decodes_camel_case_document() -> TestResult {
        let coupon = save10()?;

        assert_eq!(
            coupon.discount,
            Discount::Percentage {
                discount_value: Decimal::from(10)
            }
        );
        assert_eq!(coupon.remaining_uses(), Some(2));
        assert_eq!(coupon.discount.to_string(), "10% off");

        Ok(())
    }

    #[test]
    fn other_discount_shapes() -> TestResult {
        let bogo = coupon(json!({
            "id": "c-2", "businessId": "b-1", "code": "BOGO",
            "discountType": "buy_x_get_y", "buyQuantity": 2, "getQuantity": 1
        }))?;

        let free = coupon(json!({
            "id": "c-3", "businessId": "b-1", "code": "TREAT",
            "discountType": "free_item", "freeItem": "coffee"
        }))?;

        assert_eq!(bogo.discount.to_string(), "buy 2 get 1 free");
        assert_eq!(free.discount.to_string(), "free coffee");
        assert!(!bogo.active);

        Ok(())
    }

    #[test]
    fn end_date_is_inclusive() -> TestResult {
        let coupon = save10()?;
        let end = at("2026-12-31T23:59:59Z")?;

        assert!(coupon.check_redeemable(end).is_ok());
        assert!(matches!(
            coupon.check_redeemable(end + jiff::SignedDuration::from_millis(1)),
            Err(RedemptionError::Expired)
        ));

        Ok(())
    }

    #[test]
    fn end_date_one_millisecond_ago_is_expired() -> TestResult {
        let now = at("2026-06-01T12:00:00Z")?;

        let mut coupon = save10()?;

        coupon.end_date = Some(now - jiff::SignedDuration::from_millis(1));

        assert!(matches!(
            coupon.check_redeemable(now),
            Err(RedemptionError::Expired)
        ));

        coupon.end_date = Some(now);

        assert!(coupon.check_redeemable(now).is_ok());

        Ok(())
    }

    #[test]
    fn future_start_is_expired() -> TestResult {
        let coupon = save10()?;

        assert!(matches!(
            coupon.check_redeemable(at("2025-12-31T23:59:59Z")?),
            Err(RedemptionError::Expired)
        ));
        assert!(coupon.check_redeemable(at("2026-01-01T00:00:00Z")?).is_ok());

        Ok(())
    }

    #[test]
    fn inactive_wins_over_expired() -> TestResult {
        let mut coupon = save10()?;

        coupon.active = false;

        assert!(matches!(
            coupon.check_redeemable(at("2030-01-01T00:00:00Z")?),
            Err(RedemptionError::Inactive)
        ));

        Ok(())
    }

    #[test]
    fn open_bounds_are_always_valid() -> TestResult {
        let mut coupon = save10()?;

        coupon.start_date = None;
        coupon.end_date = None;

        assert!(coupon.check_redeemable(at("1999-01-01T00:00:00Z")?).is_ok());

        Ok(())
    }
}
