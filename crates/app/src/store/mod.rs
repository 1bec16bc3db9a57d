//! Document store collaborator.
//!
//! Everything the domain persists goes through the five primitives of [`DocumentStore`]:
//! equality query, get by id, overwrite by id, atomic partial update and append with a
//! generated id.

use async_trait::async_trait;
use mockall::automock;
use serde_json::{Map, Value};

mod documents;
mod errors;
mod memory;

pub use documents::{Collection, Document, FieldUpdate, Filter, ID_FIELD, Patch};
pub use errors::StoreError;
pub use memory::{MemoryStore, Snapshot};

#[automock]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Documents in `collection` matching every filter.
    async fn query(
        &self,
        collection: Collection,
        filters: Vec<Filter>,
    ) -> Result<Vec<Document>, StoreError>;

    /// Fetch one document by id.
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError>;

    /// Create or overwrite a document.
    async fn set(
        &self,
        collection: Collection,
        id: &str,
        data: Map<String, Value>,
    ) -> Result<(), StoreError>;

    /// Apply `patch` atomically to an existing document and return its post-image.
    async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: Patch,
    ) -> Result<Document, StoreError>;

    /// Append a new document with a generated id.
    async fn add(&self, collection: Collection, patch: Patch) -> Result<String, StoreError>;
}
