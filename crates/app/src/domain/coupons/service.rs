//! Redemption Service

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tally::extract::is_valid_code;
use tokio::time::timeout;
use tracing::{Span, debug, info};

use crate::{
    audit::AuditTrail,
    domain::{
        coupons::{
            errors::RedemptionError,
            records::{CouponId, DistributionEvent, Redemption},
            repositories::{
                coupons::StoreCouponsRepository, distributions::StoreDistributionsRepository,
            },
        },
        customers::{Customer, StoreCustomersRepository},
    },
    identity::BusinessId,
    store::DocumentStore,
};

/// Upper bound on how long a scan waits for the customer named in its payload.
pub const CUSTOMER_HINT_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Clone)]
pub struct StoreRedemptionService {
    coupons: StoreCouponsRepository,
    distributions: StoreDistributionsRepository,
    customers: StoreCustomersRepository,
    audits: AuditTrail,
}

impl StoreRedemptionService {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, audits: AuditTrail) -> Self {
        Self {
            coupons: StoreCouponsRepository::new(Arc::clone(&store)),
            distributions: StoreDistributionsRepository::new(Arc::clone(&store)),
            customers: StoreCustomersRepository::new(store),
            audits,
        }
    }

    /// Registered customer named by the scan, falling back to a walk-in.
    async fn customer_for_scan(
        &self,
        business: &BusinessId,
        hint: Option<&str>,
        point_in_time: Timestamp,
    ) -> Customer {
        let Some(hint) = hint else {
            return Customer::walk_in(business.clone(), point_in_time);
        };

        match timeout(CUSTOMER_HINT_TIMEOUT, self.customers.get(business, hint)).await {
            Ok(Ok(Some(customer))) => customer,
            Ok(Ok(None)) => {
                debug!(customer_hint = hint, "customer hint did not match, using walk-in");

                Customer::walk_in(business.clone(), point_in_time)
            }
            Ok(Err(error)) => {
                debug!(customer_hint = hint, %error, "customer lookup failed, using walk-in");

                Customer::walk_in(business.clone(), point_in_time)
            }
            Err(_elapsed) => {
                debug!(customer_hint = hint, "customer lookup timed out, using walk-in");

                Customer::walk_in(business.clone(), point_in_time)
            }
        }
    }

    /// Queue the audit event. Never fails or delays the scan.
    fn audit(&self, event: DistributionEvent) {
        let distributions = self.distributions.clone();

        self.audits.record("coupon_distribution", async move {
            distributions
                .record(&event)
                .await
                .map_err(|error| RedemptionError::AuditWriteFailed(error.to_string()))
        });
    }
}

#[async_trait]
impl RedemptionService for StoreRedemptionService {
    #[tracing::instrument(
        name = "coupons.service.resolve",
        skip(self, customer_hint, point_in_time),
        fields(
            business_id = %business,
            code = %code,
            coupon_id = tracing::field::Empty,
            walk_in = tracing::field::Empty
        ),
        err
    )]
    async fn resolve(
        &self,
        business: BusinessId,
        code: String,
        customer_hint: Option<String>,
        point_in_time: Timestamp,
    ) -> Result<Redemption, RedemptionError> {
        if !is_valid_code(&code) {
            return Err(RedemptionError::InvalidFormat);
        }

        let coupon = self
            .coupons
            .find_by_code(&business, &code)
            .await?
            .ok_or(RedemptionError::NotFound)?;

        let span = Span::current();

        span.record("coupon_id", tracing::field::display(&coupon.id));

        coupon.check_redeemable(point_in_time)?;

        let customer = self
            .customer_for_scan(&business, customer_hint.as_deref(), point_in_time)
            .await;

        span.record("walk_in", customer.is_walk_in());

        self.audit(DistributionEvent::scanned(&coupon, &customer));

        info!(coupon_id = %coupon.id, customer_id = %customer.id, "resolved coupon");

        Ok(Redemption { coupon, customer })
    }

    #[tracing::instrument(
        name = "coupons.service.commit",
        skip(self),
        fields(coupon_id = %coupon, usage_count = tracing::field::Empty),
        err
    )]
    async fn commit(&self, coupon: CouponId) -> Result<(), RedemptionError> {
        let updated = self
            .coupons
            .increment_usage(&coupon)
            .await
            .map_err(RedemptionError::CommitFailed)?;

        Span::current().record("usage_count", updated.usage_count);

        info!(coupon_id = %coupon, usage_count = updated.usage_count, "committed redemption");

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait RedemptionService: Send + Sync {
    /// Look up a scanned code and preview the redemption.
    ///
    /// Queues one audit event without waiting for it. Does not consume the coupon.
    async fn resolve(
        &self,
        business: BusinessId,
        code: String,
        customer_hint: Option<String>,
        point_in_time: Timestamp,
    ) -> Result<Redemption, RedemptionError>;

    /// Consume one use of a resolved coupon, after operator confirmation.
    async fn commit(&self, coupon: CouponId) -> Result<(), RedemptionError>;
}
