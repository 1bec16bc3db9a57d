//! Test Helpers

use serde_json::{Value, json};

use crate::{
    store::{Collection, DocumentStore, StoreError},
    test::TestContext,
};

/// Seed one document.
pub(crate) async fn insert(
    ctx: &TestContext,
    collection: Collection,
    id: &str,
    body: Value,
) -> Result<(), StoreError> {
    let Value::Object(data) = body else {
        return Err(StoreError::Unavailable("test documents must be objects".to_string()));
    };

    ctx.memory.set(collection, id, data).await
}

/// Seed the active `SAVE10` coupon (`c-save10`), valid throughout 2026.
pub(crate) async fn save10(ctx: &TestContext) -> Result<(), StoreError> {
    insert(
        ctx,
        Collection::Coupons,
        "c-save10",
        json!({
            "businessId": ctx.business.as_str(),
            "code": "SAVE10",
            "title": "10% off your order",
            "discountType": "percentage",
            "discountValue": 10,
            "startDate": "2026-01-01T00:00:00Z",
            "endDate": "2026-12-31T23:59:59Z",
            "active": true,
            "usageCount": 0,
            "usageLimit": 100
        }),
    )
    .await
}

/// Current `usageCount` of a coupon.
pub(crate) async fn coupon_usage(ctx: &TestContext, coupon: &str) -> Result<i64, StoreError> {
    Ok(ctx
        .memory
        .get(Collection::Coupons, coupon)
        .await?
        .and_then(|document| document.data.get("usageCount").and_then(Value::as_i64))
        .unwrap_or(0))
}

/// Seed a visits program (`prog-visits`, 10 visits per reward) and its reward.
pub(crate) async fn visits_program(ctx: &TestContext) -> Result<(), StoreError> {
    insert(
        ctx,
        Collection::LoyaltyPrograms,
        "prog-visits",
        json!({
            "businessId": ctx.business.as_str(),
            "name": "Coffee card",
            "type": "visits",
            "visitsRequired": 10,
            "active": true
        }),
    )
    .await?;

    insert(
        ctx,
        Collection::LoyaltyRewards,
        "rw-free-coffee",
        json!({
            "businessId": ctx.business.as_str(),
            "programId": "prog-visits",
            "name": "Free coffee",
            "visitsCost": 10,
            "active": true
        }),
    )
    .await
}

/// Seed a tiered points program (`prog-tiers`) with a points reward and a tier reward.
pub(crate) async fn tiered_program(ctx: &TestContext) -> Result<(), StoreError> {
    insert(
        ctx,
        Collection::LoyaltyPrograms,
        "prog-tiers",
        json!({
            "businessId": ctx.business.as_str(),
            "name": "Regulars",
            "type": "tiered",
            "tiers": [
                { "name": "Bronze", "minPoints": 0 },
                { "name": "Silver", "minPoints": 50 },
                { "name": "Gold", "minPoints": 100 }
            ],
            "active": true
        }),
    )
    .await?;

    insert(
        ctx,
        Collection::LoyaltyRewards,
        "rw-pastry",
        json!({
            "businessId": ctx.business.as_str(),
            "programId": "prog-tiers",
            "name": "Pastry",
            "pointsCost": 30,
            "active": true
        }),
    )
    .await?;

    insert(
        ctx,
        Collection::LoyaltyRewards,
        "rw-gold-mug",
        json!({
            "businessId": ctx.business.as_str(),
            "programId": "prog-tiers",
            "name": "Gold mug",
            "tierRequired": "Gold",
            "active": true
        }),
    )
    .await
}

/// Seed a registered customer.
pub(crate) async fn customer(
    ctx: &TestContext,
    id: &str,
    visits: i64,
    points: i64,
) -> Result<(), StoreError> {
    insert(
        ctx,
        Collection::Customers,
        id,
        json!({
            "businessId": ctx.business.as_str(),
            "name": "Ada Lovelace",
            "phone": "+44 20 7946 0018",
            "totalVisits": visits,
            "loyaltyPoints": points
        }),
    )
    .await
}
