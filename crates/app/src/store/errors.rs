//! Document store errors.

use thiserror::Error;

use super::Collection;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document {collection}/{id} not found")]
    NotFound { collection: Collection, id: String },

    #[error("field `{field}` cannot be incremented")]
    InvalidIncrement { field: String },

    #[error("failed to decode document")]
    Decode(#[from] serde_json::Error),

    #[error("document store unavailable: {0}")]
    Unavailable(String),
}
