//! Loyalty Service

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::{Span, info};

use crate::{
    audit::AuditTrail,
    domain::{
        coupons::EventSource,
        customers::{Customer, CustomerId, StoreCustomersRepository},
        loyalty::{
            eligibility::{
                RewardCost, cycle_length, full_cycle_visits, is_eligible, reward_cost,
                tier_for_points, visit_milestone,
            },
            errors::LoyaltyError,
            lookup::CustomerLookup,
            records::{LoyaltyProgram, LoyaltyReward, ProgramType, RewardId, RewardRedemption},
            repository::StoreLoyaltyRepository,
        },
    },
    identity::BusinessId,
    store::DocumentStore,
};

/// Points awarded per visit by points and tiered programs.
pub const POINTS_PER_VISIT: i64 = 10;

/// Outcome of a loyalty scan.
#[derive(Debug, Clone, PartialEq)]
pub struct VisitReceipt {
    /// Customer after the visit was counted.
    pub customer: Customer,

    /// The visit completed a reward cycle.
    pub reward_earned: bool,

    pub points_awarded: i64,

    /// Tier after the visit, for tiered programs.
    pub tier: Option<String>,
}

/// Outcome of a reward claim.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardReceipt {
    /// Customer after the cost was deducted.
    pub customer: Customer,

    pub reward: LoyaltyReward,

    pub points_spent: i64,

    pub visits_spent: i64,
}

#[derive(Clone)]
pub struct StoreLoyaltyService {
    loyalty: StoreLoyaltyRepository,
    customers: StoreCustomersRepository,
    audits: AuditTrail,
}

impl StoreLoyaltyService {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, audits: AuditTrail) -> Self {
        Self {
            loyalty: StoreLoyaltyRepository::new(Arc::clone(&store)),
            customers: StoreCustomersRepository::new(store),
            audits,
        }
    }

    async fn program(&self, business: &BusinessId) -> Result<LoyaltyProgram, LoyaltyError> {
        self.loyalty
            .active_program(business)
            .await?
            .ok_or(LoyaltyError::NoActiveProgram)
    }

    async fn customer(
        &self,
        business: &BusinessId,
        lookup: &CustomerLookup,
    ) -> Result<Customer, LoyaltyError> {
        let customer = match lookup {
            CustomerLookup::Id(id) => self.customers.get(business, id).await?,
            CustomerLookup::Phone(phone) => self.customers.find_by_phone(business, phone).await?,
        };

        customer.ok_or(LoyaltyError::NotFound)
    }

    fn audit(&self, redemption: RewardRedemption) {
        let loyalty = self.loyalty.clone();

        self.audits.record("reward_redemption", async move {
            loyalty.record_redemption(&redemption).await
        });
    }
}

#[async_trait]
impl LoyaltyService for StoreLoyaltyService {
    #[tracing::instrument(
        name = "loyalty.service.record_visit",
        skip(self, lookup, point_in_time),
        fields(
            business_id = %business,
            customer_id = tracing::field::Empty,
            program_type = tracing::field::Empty,
            reward_earned = tracing::field::Empty
        ),
        err
    )]
    async fn record_visit(
        &self,
        business: BusinessId,
        lookup: CustomerLookup,
        point_in_time: Timestamp,
    ) -> Result<VisitReceipt, LoyaltyError> {
        let program = self.program(&business).await?;
        let customer = self.customer(&business, &lookup).await?;

        let span = Span::current();

        span.record("customer_id", tracing::field::display(&customer.id));
        span.record("program_type", tracing::field::debug(program.program_type));

        let points_awarded = match program.program_type {
            ProgramType::Visits => 0,
            ProgramType::Points | ProgramType::Tiered => POINTS_PER_VISIT,
        };

        let mut customer = self
            .customers
            .record_visit(&customer.id, points_awarded)
            .await
            .map_err(LoyaltyError::CommitFailed)?;

        let reward_earned = program.program_type == ProgramType::Visits
            && visit_milestone(
                customer.total_visits,
                program.visits_required.unwrap_or(0),
            );

        if program.program_type == ProgramType::Tiered {
            let reached = tier_for_points(&program.tiers, customer.loyalty_points)
                .map(|tier| tier.name.clone())
                .filter(|tier| customer.loyalty_tier.as_ref() != Some(tier));

            if let Some(tier) = reached {
                customer = self
                    .customers
                    .set_tier(&customer.id, &tier)
                    .await
                    .map_err(LoyaltyError::CommitFailed)?;

                info!(customer_id = %customer.id, %tier, "customer reached new tier");
            }
        }

        span.record("reward_earned", reward_earned);

        info!(
            customer_id = %customer.id,
            total_visits = customer.total_visits,
            loyalty_points = customer.loyalty_points,
            at = %point_in_time,
            "recorded visit"
        );

        Ok(VisitReceipt {
            tier: customer.loyalty_tier.clone(),
            customer,
            reward_earned,
            points_awarded,
        })
    }

    #[tracing::instrument(
        name = "loyalty.service.eligible_rewards",
        skip(self),
        fields(business_id = %business, customer_id = %customer),
        err
    )]
    async fn eligible_rewards(
        &self,
        business: BusinessId,
        customer: CustomerId,
    ) -> Result<Vec<LoyaltyReward>, LoyaltyError> {
        let program = self.program(&business).await?;

        let customer = self
            .customer(&business, &CustomerLookup::Id(customer.into_string()))
            .await?;

        Ok(self
            .loyalty
            .rewards(&business, &program)
            .await?
            .into_iter()
            .filter(|reward| is_eligible(&program, reward, &customer))
            .collect())
    }

    #[tracing::instrument(
        name = "loyalty.service.redeem_reward",
        skip(self, point_in_time),
        fields(
            business_id = %business,
            customer_id = %customer,
            reward_id = %reward,
            points_spent = tracing::field::Empty,
            visits_spent = tracing::field::Empty
        ),
        err
    )]
    async fn redeem_reward(
        &self,
        business: BusinessId,
        customer: CustomerId,
        reward: RewardId,
        point_in_time: Timestamp,
    ) -> Result<RewardReceipt, LoyaltyError> {
        let program = self.program(&business).await?;

        let customer = self
            .customer(&business, &CustomerLookup::Id(customer.into_string()))
            .await?;

        let reward = self
            .loyalty
            .reward(&business, reward.as_str())
            .await?
            .ok_or(LoyaltyError::RewardNotFound)?;

        if !reward.active {
            return Err(LoyaltyError::RewardInactive);
        }

        if !is_eligible(&program, &reward, &customer) {
            return Err(LoyaltyError::NotEligible);
        }

        let (points_spent, visits_spent) = match reward_cost(&reward) {
            RewardCost::Points(cost) => (cost, 0),
            RewardCost::Visits(_) => (
                0,
                full_cycle_visits(customer.total_visits, cycle_length(&program, &reward)),
            ),
            RewardCost::Tier(_) | RewardCost::Free => (0, 0),
        };

        let span = Span::current();

        span.record("points_spent", points_spent);
        span.record("visits_spent", visits_spent);

        let updated = match (points_spent, visits_spent) {
            (0, 0) => customer,
            (points, 0) => self
                .customers
                .adjust_points(&customer.id, -points)
                .await
                .map_err(LoyaltyError::CommitFailed)?,
            (_, visits) => self
                .customers
                .adjust_visits(&customer.id, -visits)
                .await
                .map_err(LoyaltyError::CommitFailed)?,
        };

        self.audit(RewardRedemption {
            business_id: business,
            customer_id: updated.id.clone(),
            program_id: program.id.clone(),
            reward_id: reward.id.clone(),
            points_spent,
            visits_spent,
            source: EventSource::QrScan,
            redeemed_at: None,
        });

        info!(
            customer_id = %updated.id,
            reward_id = %reward.id,
            points_spent,
            visits_spent,
            at = %point_in_time,
            "redeemed reward"
        );

        Ok(RewardReceipt {
            customer: updated,
            reward,
            points_spent,
            visits_spent,
        })
    }
}

#[automock]
#[async_trait]
pub trait LoyaltyService: Send + Sync {
    /// Count a visit for the customer named by `lookup`.
    async fn record_visit(
        &self,
        business: BusinessId,
        lookup: CustomerLookup,
        point_in_time: Timestamp,
    ) -> Result<VisitReceipt, LoyaltyError>;

    /// Active rewards the customer may claim now.
    async fn eligible_rewards(
        &self,
        business: BusinessId,
        customer: CustomerId,
    ) -> Result<Vec<LoyaltyReward>, LoyaltyError>;

    /// Claim a reward, deducting its cost from the customer's counters.
    async fn redeem_reward(
        &self,
        business: BusinessId,
        customer: CustomerId,
        reward: RewardId,
        point_in_time: Timestamp,
    ) -> Result<RewardReceipt, LoyaltyError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        store::Collection,
        test::{SCAN_AT, TestContext, customer, tiered_program, visits_program},
    };

    use super::*;

    fn by_id(id: &str) -> CustomerLookup {
        CustomerLookup::Id(id.to_string())
    }

    #[tokio::test]
    async fn visits_program_signals_reward_on_exact_multiple() -> TestResult {
        let ctx = TestContext::new();

        visits_program(&ctx).await?;
        customer(&ctx, "cust-1", 8, 0).await?;

        let service = StoreLoyaltyService::new(ctx.store(), ctx.audits.clone());

        let ninth = service
            .record_visit(ctx.business.clone(), by_id("cust-1"), SCAN_AT)
            .await?;

        let tenth = service
            .record_visit(ctx.business.clone(), by_id("cust-1"), SCAN_AT)
            .await?;

        assert!(!ninth.reward_earned);
        assert!(tenth.reward_earned);
        assert_eq!(tenth.customer.total_visits, 10);
        assert_eq!(tenth.points_awarded, 0);
        assert!(tenth.customer.last_visit.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn phone_lookup_records_visit() -> TestResult {
        let ctx = TestContext::new();

        visits_program(&ctx).await?;
        customer(&ctx, "cust-1", 0, 0).await?;

        let service = StoreLoyaltyService::new(ctx.store(), ctx.audits.clone());

        let receipt = service
            .record_visit(
                ctx.business.clone(),
                CustomerLookup::parse("+44 20 7946 0018")?,
                SCAN_AT,
            )
            .await?;

        assert_eq!(receipt.customer.id.as_str(), "cust-1");
        assert_eq!(receipt.customer.total_visits, 1);

        Ok(())
    }

    #[tokio::test]
    async fn unknown_customer_and_missing_program() -> TestResult {
        let ctx = TestContext::new();
        let service = StoreLoyaltyService::new(ctx.store(), ctx.audits.clone());

        let no_program = service
            .record_visit(ctx.business.clone(), by_id("cust-1"), SCAN_AT)
            .await;

        assert!(matches!(no_program, Err(LoyaltyError::NoActiveProgram)));

        visits_program(&ctx).await?;

        let unknown = service
            .record_visit(ctx.business.clone(), by_id("ghost"), SCAN_AT)
            .await;

        assert!(matches!(unknown, Err(LoyaltyError::NotFound)));

        Ok(())
    }

    #[tokio::test]
    async fn tiered_program_awards_points_and_promotes() -> TestResult {
        let ctx = TestContext::new();

        tiered_program(&ctx).await?;
        customer(&ctx, "cust-1", 4, 45).await?;

        let service = StoreLoyaltyService::new(ctx.store(), ctx.audits.clone());

        let receipt = service
            .record_visit(ctx.business.clone(), by_id("cust-1"), SCAN_AT)
            .await?;

        assert_eq!(receipt.points_awarded, POINTS_PER_VISIT);
        assert_eq!(receipt.customer.loyalty_points, 55);
        assert_eq!(receipt.customer.total_visits, 5);
        assert_eq!(receipt.tier.as_deref(), Some("Silver"));
        assert!(!receipt.reward_earned);

        Ok(())
    }

    #[tokio::test]
    async fn visits_reward_keeps_partial_progress() -> TestResult {
        let ctx = TestContext::new();

        visits_program(&ctx).await?;
        customer(&ctx, "cust-1", 23, 0).await?;

        let service = StoreLoyaltyService::new(ctx.store(), ctx.audits.clone());

        let receipt = service
            .redeem_reward(
                ctx.business.clone(),
                CustomerId::from("cust-1"),
                RewardId::from("rw-free-coffee"),
                SCAN_AT,
            )
            .await?;

        assert_eq!(receipt.customer.total_visits, 3);
        assert_eq!(receipt.visits_spent, 20);

        ctx.audits.flush().await;

        assert_eq!(ctx.memory.len(Collection::RewardRedemptions), 1);

        let again = service
            .redeem_reward(
                ctx.business.clone(),
                CustomerId::from("cust-1"),
                RewardId::from("rw-free-coffee"),
                SCAN_AT,
            )
            .await;

        assert!(matches!(again, Err(LoyaltyError::NotEligible)));

        Ok(())
    }

    #[tokio::test]
    async fn points_reward_deducts_cost() -> TestResult {
        let ctx = TestContext::new();

        tiered_program(&ctx).await?;
        customer(&ctx, "cust-1", 0, 45).await?;

        let service = StoreLoyaltyService::new(ctx.store(), ctx.audits.clone());

        let eligible = service
            .eligible_rewards(ctx.business.clone(), CustomerId::from("cust-1"))
            .await?;

        assert_eq!(
            eligible.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
            vec!["rw-pastry"]
        );

        let receipt = service
            .redeem_reward(
                ctx.business.clone(),
                CustomerId::from("cust-1"),
                RewardId::from("rw-pastry"),
                SCAN_AT,
            )
            .await?;

        assert_eq!(receipt.customer.loyalty_points, 15);
        assert_eq!(receipt.points_spent, 30);

        Ok(())
    }

    #[tokio::test]
    async fn reward_lookup_failures() -> TestResult {
        let ctx = TestContext::new();

        tiered_program(&ctx).await?;
        customer(&ctx, "cust-1", 0, 500).await?;

        let service = StoreLoyaltyService::new(ctx.store(), ctx.audits.clone());

        let missing = service
            .redeem_reward(
                ctx.business.clone(),
                CustomerId::from("cust-1"),
                RewardId::from("rw-nope"),
                SCAN_AT,
            )
            .await;

        let not_gold = service
            .redeem_reward(
                ctx.business.clone(),
                CustomerId::from("cust-1"),
                RewardId::from("rw-gold-mug"),
                SCAN_AT,
            )
            .await;

        assert!(matches!(missing, Err(LoyaltyError::RewardNotFound)));
        assert!(matches!(not_gold, Err(LoyaltyError::NotEligible)));

        Ok(())
    }
}
