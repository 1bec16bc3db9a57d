//! Distribution Events Repository

use std::sync::Arc;

use crate::{
    domain::coupons::records::DistributionEvent,
    store::{Collection, Document, DocumentStore, Patch, StoreError},
};

#[derive(Clone)]
pub(crate) struct StoreDistributionsRepository {
    store: Arc<dyn DocumentStore>,
}

impl StoreDistributionsRepository {
    #[must_use]
    pub(crate) fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Append an event; `createdAt` and `redeemedAt` are stamped by the store.
    pub(crate) async fn record(&self, event: &DistributionEvent) -> Result<String, StoreError> {
        let patch = Patch::from_fields(Document::encode(event)?)
            .server_timestamp("createdAt")
            .server_timestamp("redeemedAt");

        self.store.add(Collection::CouponDistributions, patch).await
    }
}
