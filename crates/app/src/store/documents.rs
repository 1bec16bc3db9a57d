//! Collections, documents, filters and patches.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize, de::DeserializeOwned, de::Error as _};
use serde_json::{Map, Value};
use smallvec::SmallVec;

use super::StoreError;

/// Document field holding the id when a document is decoded into a record.
pub const ID_FIELD: &str = "id";

/// Named document collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Collection {
    Coupons,
    Customers,
    CouponDistributions,
    LoyaltyPrograms,
    LoyaltyRewards,
    RewardRedemptions,
}

impl Collection {
    pub const ALL: [Self; 6] = [
        Self::Coupons,
        Self::Customers,
        Self::CouponDistributions,
        Self::LoyaltyPrograms,
        Self::LoyaltyRewards,
        Self::RewardRedemptions,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Coupons => "coupons",
            Self::Customers => "customers",
            Self::CouponDistributions => "couponDistributions",
            Self::LoyaltyPrograms => "loyaltyPrograms",
            Self::LoyaltyRewards => "loyaltyRewards",
            Self::RewardRedemptions => "rewardRedemptions",
        }
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// A stored document: its id plus a JSON object body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,

    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl Document {
    #[must_use]
    pub fn new(id: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    /// Decode the document into a record, exposing the document id as `id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Decode`] when the body does not match `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        let mut data = self.data.clone();

        data.insert(ID_FIELD.to_string(), Value::String(self.id.clone()));

        Ok(serde_json::from_value(Value::Object(data))?)
    }

    /// Encode a record into a document body. Any `id` field is dropped; ids live outside the body.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Decode`] when `value` does not serialize to a JSON object.
    pub fn encode<T: Serialize>(value: &T) -> Result<Map<String, Value>, StoreError> {
        match serde_json::to_value(value)? {
            Value::Object(mut data) => {
                data.remove(ID_FIELD);

                Ok(data)
            }
            _ => Err(StoreError::Decode(serde_json::Error::custom(
                "documents must be JSON objects",
            ))),
        }
    }
}

/// Equality filter over one top-level field.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub value: Value,
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    #[must_use]
    pub fn matches(&self, data: &Map<String, Value>) -> bool {
        data.get(&self.field) == Some(&self.value)
    }
}

/// One field change inside a [`Patch`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate {
    /// Overwrite the field.
    Set(Value),

    /// Atomically add to an integer field; a missing field counts as zero.
    Increment(i64),

    /// Store the server's current time.
    ServerTimestamp,
}

/// Ordered set of field changes applied atomically to one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    fields: SmallVec<[(String, FieldUpdate); 4]>,
}

impl Patch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Patch that sets every field of `data`.
    #[must_use]
    pub fn from_fields(data: Map<String, Value>) -> Self {
        Self {
            fields: data
                .into_iter()
                .map(|(field, value)| (field, FieldUpdate::Set(value)))
                .collect(),
        }
    }

    #[must_use]
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields
            .push((field.into(), FieldUpdate::Set(value.into())));

        self
    }

    #[must_use]
    pub fn increment(mut self, field: impl Into<String>, by: i64) -> Self {
        self.fields.push((field.into(), FieldUpdate::Increment(by)));

        self
    }

    #[must_use]
    pub fn server_timestamp(mut self, field: impl Into<String>) -> Self {
        self.fields
            .push((field.into(), FieldUpdate::ServerTimestamp));

        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldUpdate)> {
        self.fields
            .iter()
            .map(|(field, update)| (field.as_str(), update))
    }
}
