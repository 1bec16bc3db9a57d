//! Loyalty Repository

use std::sync::Arc;

use crate::{
    domain::loyalty::records::{LoyaltyProgram, LoyaltyReward, RewardRedemption},
    identity::BusinessId,
    store::{Collection, Document, DocumentStore, Filter, Patch, StoreError},
};

#[derive(Clone)]
pub(crate) struct StoreLoyaltyRepository {
    store: Arc<dyn DocumentStore>,
}

impl StoreLoyaltyRepository {
    #[must_use]
    pub(crate) fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// The business's active program; the first by id when several are active.
    pub(crate) async fn active_program(
        &self,
        business: &BusinessId,
    ) -> Result<Option<LoyaltyProgram>, StoreError> {
        let documents = self
            .store
            .query(
                Collection::LoyaltyPrograms,
                vec![
                    Filter::eq("businessId", business.as_str()),
                    Filter::eq("active", true),
                ],
            )
            .await?;

        documents.first().map(Document::decode).transpose()
    }

    pub(crate) async fn rewards(
        &self,
        business: &BusinessId,
        program: &LoyaltyProgram,
    ) -> Result<Vec<LoyaltyReward>, StoreError> {
        self.store
            .query(
                Collection::LoyaltyRewards,
                vec![
                    Filter::eq("businessId", business.as_str()),
                    Filter::eq("programId", program.id.as_str()),
                ],
            )
            .await?
            .iter()
            .map(Document::decode)
            .collect()
    }

    /// A reward by id, scoped to `business`.
    pub(crate) async fn reward(
        &self,
        business: &BusinessId,
        reward: &str,
    ) -> Result<Option<LoyaltyReward>, StoreError> {
        let Some(document) = self.store.get(Collection::LoyaltyRewards, reward).await? else {
            return Ok(None);
        };

        let reward: LoyaltyReward = document.decode()?;

        Ok((reward.business_id == *business).then_some(reward))
    }

    /// Append a claim record; `redeemedAt` is stamped by the store.
    pub(crate) async fn record_redemption(
        &self,
        redemption: &RewardRedemption,
    ) -> Result<String, StoreError> {
        let patch = Patch::from_fields(Document::encode(redemption)?)
            .server_timestamp("redeemedAt")
            .server_timestamp("createdAt");

        self.store.add(Collection::RewardRedemptions, patch).await
    }
}
