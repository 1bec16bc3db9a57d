//! Coupons Repository

use std::sync::Arc;

use tracing::debug;

use crate::{
    domain::coupons::records::{Coupon, CouponId},
    identity::BusinessId,
    store::{Collection, DocumentStore, Filter, Patch, StoreError},
};

#[derive(Clone)]
pub(crate) struct StoreCouponsRepository {
    store: Arc<dyn DocumentStore>,
}

impl StoreCouponsRepository {
    #[must_use]
    pub(crate) fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// The coupon with `code` in `business`, if any.
    pub(crate) async fn find_by_code(
        &self,
        business: &BusinessId,
        code: &str,
    ) -> Result<Option<Coupon>, StoreError> {
        let documents = self
            .store
            .query(
                Collection::Coupons,
                vec![
                    Filter::eq("businessId", business.as_str()),
                    Filter::eq("code", code),
                ],
            )
            .await?;

        if documents.len() > 1 {
            debug!(count = documents.len(), code, "duplicate coupon codes, using the first");
        }

        documents.first().map(|document| document.decode()).transpose()
    }

    /// Consume one use of the coupon.
    pub(crate) async fn increment_usage(&self, coupon: &CouponId) -> Result<Coupon, StoreError> {
        self.store
            .update(
                Collection::Coupons,
                coupon.as_str(),
                Patch::new()
                    .increment("usageCount", 1)
                    .server_timestamp("updatedAt"),
            )
            .await?
            .decode()
    }
}
