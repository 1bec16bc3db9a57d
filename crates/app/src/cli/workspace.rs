//! Store and services for one CLI invocation.

use std::{path::PathBuf, sync::Arc};

use tally_app::{
    context::AppContext,
    fixtures,
    identity::{BusinessId, StaticIdentity},
    store::{DocumentStore, MemoryStore},
};
use tracing::info;

use crate::cli::config::StoreConfig;

pub(crate) struct Workspace {
    pub(crate) app: AppContext,
    memory: Arc<MemoryStore>,
    persist: Option<PathBuf>,
}

impl Workspace {
    pub(crate) fn open(config: &StoreConfig) -> Result<Self, String> {
        let memory = Arc::new(fixtures::load(&config.fixtures).map_err(|error| {
            format!(
                "failed to load fixtures from {}: {error}",
                config.fixtures.display()
            )
        })?);

        let identity = StaticIdentity::signed_in(
            config.user_id.clone(),
            config.role,
            config.business_id.as_deref().map(BusinessId::from),
        );

        let app = AppContext::new(
            Arc::clone(&memory) as Arc<dyn DocumentStore>,
            Arc::new(identity),
        );

        Ok(Self {
            app,
            memory,
            persist: config.persist.then(|| config.fixtures.clone()),
        })
    }

    pub(crate) fn business(&self) -> Result<BusinessId, String> {
        self.app
            .business()
            .map_err(|error| format!("cannot operate the desk: {error}"))
    }

    /// Wait for queued audit writes, then write the store back when `--persist` was given.
    pub(crate) async fn close(self) -> Result<(), String> {
        self.app.audits.flush().await;

        let Some(path) = self.persist else {
            return Ok(());
        };

        fixtures::save(&path, &self.memory)
            .map_err(|error| format!("failed to save fixtures to {}: {error}", path.display()))?;

        info!(path = %path.display(), "store persisted");

        Ok(())
    }
}
