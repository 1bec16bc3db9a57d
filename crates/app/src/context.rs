//! App Context

use std::sync::Arc;

use crate::{
    audit::AuditTrail,
    domain::{
        coupons::{RedemptionService, StoreRedemptionService},
        loyalty::{LoyaltyService, StoreLoyaltyService},
    },
    identity::{BusinessId, IdentityError, IdentityProvider},
    store::DocumentStore,
};

/// Services wired to one document store and one identity collaborator.
#[derive(Clone)]
pub struct AppContext {
    pub store: Arc<dyn DocumentStore>,
    pub redemptions: Arc<dyn RedemptionService>,
    pub loyalty: Arc<dyn LoyaltyService>,
    pub identity: Arc<dyn IdentityProvider>,

    /// Audit writes queued by both services.
    pub audits: AuditTrail,
}

impl AppContext {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        let audits = AuditTrail::new();

        Self {
            redemptions: Arc::new(StoreRedemptionService::new(
                Arc::clone(&store),
                audits.clone(),
            )),
            loyalty: Arc::new(StoreLoyaltyService::new(Arc::clone(&store), audits.clone())),
            store,
            identity,
            audits,
        }
    }

    /// Business the signed-in operator may act for.
    ///
    /// # Errors
    ///
    /// Returns an [`IdentityError`] while signed out, for customers, and for staff
    /// without a business.
    pub fn business(&self) -> Result<BusinessId, IdentityError> {
        self.identity.current().business_scope()
    }
}
