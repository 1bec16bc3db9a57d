//! In-memory document store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use jiff::Timestamp;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use super::{
    Collection, Document, DocumentStore, FieldUpdate, Filter, ID_FIELD, Patch, StoreError,
};

/// Every collection's documents, ordered by id.
pub type Snapshot = BTreeMap<Collection, Vec<Document>>;

type Documents = BTreeMap<String, Map<String, Value>>;

/// Process-local [`DocumentStore`]; each update holds the write lock for its whole patch.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<FxHashMap<Collection, Documents>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let collections = snapshot
            .into_iter()
            .map(|(collection, documents)| {
                let documents = documents
                    .into_iter()
                    .map(|mut document| {
                        document.data.remove(ID_FIELD);

                        (document.id, document.data)
                    })
                    .collect();

                (collection, documents)
            })
            .collect();

        Self {
            collections: RwLock::new(collections),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.collections
            .read()
            .iter()
            .filter(|(_, documents)| !documents.is_empty())
            .map(|(collection, documents)| {
                let documents = documents
                    .iter()
                    .map(|(id, data)| Document::new(id.clone(), data.clone()))
                    .collect();

                (*collection, documents)
            })
            .collect()
    }

    /// Number of documents in `collection`.
    #[must_use]
    pub fn len(&self, collection: Collection) -> usize {
        self.collections
            .read()
            .get(&collection)
            .map_or(0, BTreeMap::len)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn query(
        &self,
        collection: Collection,
        filters: Vec<Filter>,
    ) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read();

        let Some(documents) = collections.get(&collection) else {
            return Ok(Vec::new());
        };

        Ok(documents
            .iter()
            .filter(|(_, data)| filters.iter().all(|filter| filter.matches(data)))
            .map(|(id, data)| Document::new(id.clone(), data.clone()))
            .collect())
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError> {
        Ok(self
            .collections
            .read()
            .get(&collection)
            .and_then(|documents| documents.get(id))
            .map(|data| Document::new(id, data.clone())))
    }

    async fn set(
        &self,
        collection: Collection,
        id: &str,
        mut data: Map<String, Value>,
    ) -> Result<(), StoreError> {
        data.remove(ID_FIELD);

        self.collections
            .write()
            .entry(collection)
            .or_default()
            .insert(id.to_string(), data);

        Ok(())
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: Patch,
    ) -> Result<Document, StoreError> {
        let mut collections = self.collections.write();

        let data = collections
            .get_mut(&collection)
            .and_then(|documents| documents.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection,
                id: id.to_string(),
            })?;

        let mut next = data.clone();

        apply(&mut next, &patch, Timestamp::now())?;

        *data = next.clone();

        debug!(%collection, id, "document updated");

        Ok(Document::new(id, next))
    }

    async fn add(&self, collection: Collection, patch: Patch) -> Result<String, StoreError> {
        let mut data = Map::new();

        apply(&mut data, &patch, Timestamp::now())?;

        let id = Uuid::now_v7().simple().to_string();

        self.collections
            .write()
            .entry(collection)
            .or_default()
            .insert(id.clone(), data);

        debug!(%collection, %id, "document added");

        Ok(id)
    }
}

fn apply(data: &mut Map<String, Value>, patch: &Patch, now: Timestamp) -> Result<(), StoreError> {
    for (field, update) in patch.iter() {
        if field == ID_FIELD {
            continue;
        }

        let value = match update {
            FieldUpdate::Set(value) => value.clone(),
            FieldUpdate::ServerTimestamp => Value::String(now.to_string()),
            FieldUpdate::Increment(by) => {
                let current = match data.get(field) {
                    None | Some(Value::Null) => Some(0),
                    Some(value) => value.as_i64(),
                };

                current
                    .and_then(|current| current.checked_add(*by))
                    .map(Value::from)
                    .ok_or_else(|| StoreError::InvalidIncrement {
                        field: field.to_string(),
                    })?
            }
        };

        data.insert(field.to_string(), value);
    }

    Ok(())
}
