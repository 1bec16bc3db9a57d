//! Loyalty Records

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    domain::{coupons::EventSource, customers::CustomerId},
    identity::BusinessId,
    ids::TypedId,
};

/// Loyalty Program Id
pub type ProgramId = TypedId<LoyaltyProgram>;

/// Loyalty Reward Id
pub type RewardId = TypedId<LoyaltyReward>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgramType {
    Points,
    Visits,
    Tiered,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tier {
    pub name: String,

    pub min_points: i64,
}

/// Loyalty Program Record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoyaltyProgram {
    pub id: ProgramId,

    pub business_id: BusinessId,

    #[serde(default)]
    pub name: String,

    #[serde(rename = "type")]
    pub program_type: ProgramType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points_per_amount: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_per_point: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visits_required: Option<i64>,

    #[serde(default)]
    pub tiers: Vec<Tier>,

    #[serde(default)]
    pub active: bool,
}

/// Loyalty Reward Record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoyaltyReward {
    pub id: RewardId,

    pub business_id: BusinessId,

    pub program_id: ProgramId,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points_cost: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visits_cost: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier_required: Option<String>,

    #[serde(default)]
    pub active: bool,
}

/// Append-only audit record of a reward being claimed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardRedemption {
    pub business_id: BusinessId,

    pub customer_id: CustomerId,

    pub program_id: ProgramId,

    pub reward_id: RewardId,

    pub points_spent: i64,

    pub visits_spent: i64,

    pub source: EventSource,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redeemed_at: Option<Timestamp>,
}
