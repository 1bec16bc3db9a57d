//! Reward eligibility rules.
//!
//! Eligibility is computed from a customer's current counters, never stored.

use crate::domain::{
    customers::Customer,
    loyalty::records::{LoyaltyProgram, LoyaltyReward, Tier},
};

/// What claiming a reward costs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewardCost {
    Points(i64),
    Visits(i64),
    Tier(String),
    Free,
}

#[must_use]
pub fn reward_cost(reward: &LoyaltyReward) -> RewardCost {
    if let Some(points) = reward.points_cost.filter(|cost| *cost > 0) {
        return RewardCost::Points(points);
    }

    if let Some(visits) = reward.visits_cost.filter(|cost| *cost > 0) {
        return RewardCost::Visits(visits);
    }

    match reward.tier_required.as_deref().map(str::trim) {
        Some(tier) if !tier.is_empty() => RewardCost::Tier(tier.to_string()),
        _ => RewardCost::Free,
    }
}

/// Visits that make up one reward cycle.
#[must_use]
pub fn cycle_length(program: &LoyaltyProgram, reward: &LoyaltyReward) -> i64 {
    program
        .visits_required
        .filter(|required| *required > 0)
        .or(reward.visits_cost)
        .unwrap_or(0)
}

/// Whether `customer` may claim `reward` right now.
///
/// A visits reward needs at least `visitsCost` visits inside completed cycles, so
/// partial progress toward the next cycle never counts.
#[must_use]
pub fn is_eligible(program: &LoyaltyProgram, reward: &LoyaltyReward, customer: &Customer) -> bool {
    if !reward.active || customer.is_walk_in() {
        return false;
    }

    match reward_cost(reward) {
        RewardCost::Points(cost) => customer.loyalty_points >= cost,
        RewardCost::Visits(cost) => {
            let completed = full_cycle_visits(customer.total_visits, cycle_length(program, reward));

            customer.total_visits >= cost && completed >= cost
        }
        RewardCost::Tier(tier) => customer
            .loyalty_tier
            .as_deref()
            .is_some_and(|current| current.eq_ignore_ascii_case(&tier)),
        RewardCost::Free => true,
    }
}

/// Highest tier whose threshold `points` reaches.
#[must_use]
pub fn tier_for_points(tiers: &[Tier], points: i64) -> Option<&Tier> {
    tiers
        .iter()
        .filter(|tier| tier.min_points <= points)
        .max_by_key(|tier| tier.min_points)
}

/// Whether `total` visits just completed a cycle of `required`.
#[must_use]
pub const fn visit_milestone(total: i64, required: i64) -> bool {
    required > 0 && total > 0 && total % required == 0
}

/// Visits contained in completed cycles; the rest is progress toward the next one.
#[must_use]
pub const fn full_cycle_visits(visits: i64, required: i64) -> i64 {
    if required <= 0 || visits <= 0 {
        return 0;
    }

    visits - visits % required
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use serde_json::json;
    use testresult::TestResult;

    use crate::{domain::customers::CustomerId, identity::BusinessId};

    use super::*;

    fn program(value: serde_json::Value) -> Result<LoyaltyProgram, serde_json::Error> {
        serde_json::from_value(value)
    }

    fn reward(value: serde_json::Value) -> Result<LoyaltyReward, serde_json::Error> {
        serde_json::from_value(value)
    }

    fn member(visits: i64, points: i64, tier: Option<&str>) -> Customer {
        let mut customer = Customer::walk_in(BusinessId::from("b-1"), Timestamp::UNIX_EPOCH);

        customer.id = CustomerId::from("cust-1");
        customer.total_visits = visits;
        customer.loyalty_points = points;
        customer.loyalty_tier = tier.map(str::to_string);

        customer
    }

    fn coffee_card() -> Result<(LoyaltyProgram, LoyaltyReward), serde_json::Error> {
        Ok((
            program(json!({
                "id": "p-1", "businessId": "b-1", "type": "visits",
                "visitsRequired": 10, "active": true
            }))?,
            reward(json!({
                "id": "r-1", "businessId": "b-1", "programId": "p-1",
                "visitsCost": 10, "active": true
            }))?,
        ))
    }

    #[test]
    fn visit_cycles() {
        assert_eq!(full_cycle_visits(23, 10), 20);
        assert_eq!(23 - full_cycle_visits(23, 10), 3);
        assert_eq!(full_cycle_visits(9, 10), 0);
        assert_eq!(full_cycle_visits(9, 0), 0);

        assert!(visit_milestone(20, 10));
        assert!(!visit_milestone(23, 10));
        assert!(!visit_milestone(0, 10));
    }

    #[test]
    fn visits_rewards_need_a_completed_cycle() -> TestResult {
        let (program, reward) = coffee_card()?;

        assert!(is_eligible(&program, &reward, &member(10, 0, None)));
        assert!(is_eligible(&program, &reward, &member(23, 0, None)));
        assert!(!is_eligible(&program, &reward, &member(9, 0, None)));

        Ok(())
    }

    #[test]
    fn points_and_tier_rewards() -> TestResult {
        let program = program(json!({
            "id": "p-2", "businessId": "b-1", "type": "tiered", "active": true
        }))?;

        let pastry = reward(json!({
            "id": "r-2", "businessId": "b-1", "programId": "p-2",
            "pointsCost": 30, "active": true
        }))?;

        let mug = reward(json!({
            "id": "r-3", "businessId": "b-1", "programId": "p-2",
            "tierRequired": "Gold", "active": true
        }))?;

        assert!(is_eligible(&program, &pastry, &member(0, 30, None)));
        assert!(!is_eligible(&program, &pastry, &member(0, 29, None)));
        assert!(is_eligible(&program, &mug, &member(0, 0, Some("gold"))));
        assert!(!is_eligible(&program, &mug, &member(0, 500, Some("Silver"))));

        Ok(())
    }

    #[test]
    fn inactive_rewards_and_walk_ins_are_never_eligible() -> TestResult {
        let (program, mut reward) = coffee_card()?;

        let walk_in = Customer::walk_in(BusinessId::from("b-1"), Timestamp::UNIX_EPOCH);

        assert!(!is_eligible(&program, &reward, &walk_in));

        reward.active = false;

        assert!(!is_eligible(&program, &reward, &member(30, 0, None)));

        Ok(())
    }

    #[test]
    fn tier_lookup_picks_highest_reached() {
        let tiers = vec![
            Tier {
                name: "Gold".to_string(),
                min_points: 100,
            },
            Tier {
                name: "Bronze".to_string(),
                min_points: 0,
            },
            Tier {
                name: "Silver".to_string(),
                min_points: 50,
            },
        ];

        assert_eq!(tier_for_points(&tiers, 75).map(|t| t.name.as_str()), Some("Silver"));
        assert_eq!(tier_for_points(&tiers, 100).map(|t| t.name.as_str()), Some("Gold"));
        assert_eq!(tier_for_points(&[], 100), None);
    }

    #[test]
    fn cost_precedence() -> TestResult {
        let both = reward(json!({
            "id": "r-4", "businessId": "b-1", "programId": "p-1",
            "pointsCost": 0, "visitsCost": 5, "active": true
        }))?;

        assert_eq!(reward_cost(&both), RewardCost::Visits(5));

        Ok(())
    }
}
