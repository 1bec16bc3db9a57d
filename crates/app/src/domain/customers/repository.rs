//! Customers Repository

use std::sync::Arc;

use tracing::debug;

use crate::{
    domain::customers::records::{Customer, CustomerId},
    identity::BusinessId,
    store::{Collection, DocumentStore, Filter, Patch, StoreError},
};

/// Document-store-backed customers repository. Counter changes are atomic increments.
#[derive(Clone)]
pub struct StoreCustomersRepository {
    store: Arc<dyn DocumentStore>,
}

impl StoreCustomersRepository {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Fetch a customer, scoped to `business`.
    pub async fn get(
        &self,
        business: &BusinessId,
        customer: &str,
    ) -> Result<Option<Customer>, StoreError> {
        let Some(document) = self.store.get(Collection::Customers, customer).await? else {
            return Ok(None);
        };

        let customer: Customer = document.decode()?;

        Ok((customer.business_id == *business).then_some(customer))
    }

    /// Find a customer by phone number, comparing digits only.
    pub async fn find_by_phone(
        &self,
        business: &BusinessId,
        phone: &str,
    ) -> Result<Option<Customer>, StoreError> {
        let wanted = phone_digits(phone);

        if wanted.is_empty() {
            return Ok(None);
        }

        let documents = self
            .store
            .query(
                Collection::Customers,
                vec![Filter::eq("businessId", business.as_str())],
            )
            .await?;

        for document in documents {
            let customer: Customer = document.decode()?;

            if customer.phone.as_deref().map(phone_digits).as_deref() == Some(wanted.as_str()) {
                return Ok(Some(customer));
            }
        }

        Ok(None)
    }

    /// Count one visit, optionally awarding points in the same atomic update.
    pub async fn record_visit(
        &self,
        customer: &CustomerId,
        points: i64,
    ) -> Result<Customer, StoreError> {
        let mut patch = Patch::new()
            .increment("totalVisits", 1)
            .server_timestamp("lastVisit")
            .server_timestamp("updatedAt");

        if points != 0 {
            patch = patch.increment("loyaltyPoints", points);
        }

        debug!(customer_id = %customer, points, "recording visit");

        self.update(customer, patch).await
    }

    pub async fn adjust_points(
        &self,
        customer: &CustomerId,
        delta: i64,
    ) -> Result<Customer, StoreError> {
        self.update(
            customer,
            Patch::new()
                .increment("loyaltyPoints", delta)
                .server_timestamp("updatedAt"),
        )
        .await
    }

    pub async fn adjust_visits(
        &self,
        customer: &CustomerId,
        delta: i64,
    ) -> Result<Customer, StoreError> {
        self.update(
            customer,
            Patch::new()
                .increment("totalVisits", delta)
                .server_timestamp("updatedAt"),
        )
        .await
    }

    pub async fn set_tier(&self, customer: &CustomerId, tier: &str) -> Result<Customer, StoreError> {
        self.update(
            customer,
            Patch::new()
                .set("loyaltyTier", tier)
                .server_timestamp("updatedAt"),
        )
        .await
    }

    async fn update(&self, customer: &CustomerId, patch: Patch) -> Result<Customer, StoreError> {
        self.store
            .update(Collection::Customers, customer.as_str(), patch)
            .await?
            .decode()
    }
}

fn phone_digits(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}
