//! Fixtures
//!
//! A fixture file is a YAML map from collection name to a list of documents:
//!
//! ```yaml
//! coupons:
//!   - id: c-save10
//!     businessId: biz-demo
//!     code: SAVE10
//! ```

use std::{fs, path::Path};

use thiserror::Error;
use tracing::debug;

use crate::store::{MemoryStore, Snapshot};

/// Fixture Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading or writing fixture files
    #[error("Failed to access fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),
}

/// Parse fixture YAML into a store snapshot.
///
/// # Errors
///
/// Returns a [`FixtureError::Yaml`] when the document is not a valid fixture.
pub fn parse(yaml: &str) -> Result<Snapshot, FixtureError> {
    Ok(serde_norway::from_str(yaml)?)
}

/// Render a snapshot as fixture YAML.
///
/// # Errors
///
/// Returns a [`FixtureError::Yaml`] when a document cannot be serialised.
pub fn to_yaml(snapshot: &Snapshot) -> Result<String, FixtureError> {
    Ok(serde_norway::to_string(snapshot)?)
}

/// Load a fixture file into a fresh in-memory store.
///
/// # Errors
///
/// Returns a [`FixtureError`] when the file cannot be read or parsed.
pub fn load(path: &Path) -> Result<MemoryStore, FixtureError> {
    let snapshot = parse(&fs::read_to_string(path)?)?;

    debug!(path = %path.display(), collections = snapshot.len(), "loaded fixtures");

    Ok(MemoryStore::from_snapshot(snapshot))
}

/// Write the store's contents back to a fixture file.
///
/// # Errors
///
/// Returns a [`FixtureError`] when the snapshot cannot be rendered or written.
pub fn save(path: &Path, store: &MemoryStore) -> Result<(), FixtureError> {
    fs::write(path, to_yaml(&store.snapshot())?)?;

    debug!(path = %path.display(), "saved fixtures");

    Ok(())
}
