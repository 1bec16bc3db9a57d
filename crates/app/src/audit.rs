//! Background audit writes.
//!
//! Audit events are written off the request path: a slow or failing store never
//! holds up a scan. Writes run on spawned tasks bounded by [`AUDIT_WRITE_TIMEOUT`];
//! [`AuditTrail::flush`] waits for the ones still in flight.

use std::{fmt::Display, future::Future, mem, sync::Arc, time::Duration};

use parking_lot::Mutex;
use tokio::{task::JoinSet, time::timeout};
use tracing::{debug, warn};

/// Upper bound on how long one audit write may take.
pub const AUDIT_WRITE_TIMEOUT: Duration = Duration::from_secs(3);

/// Tracks audit writes spawned by the services that share it.
#[derive(Debug, Clone, Default)]
pub struct AuditTrail {
    tasks: Arc<Mutex<JoinSet<()>>>,
}

impl AuditTrail {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `write` and return immediately. Failures and timeouts are logged.
    pub fn record<F, E>(&self, kind: &'static str, write: F)
    where
        F: Future<Output = Result<String, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        self.tasks.lock().spawn(async move {
            match timeout(AUDIT_WRITE_TIMEOUT, write).await {
                Ok(Ok(id)) => debug!(kind, %id, "audit event recorded"),
                Ok(Err(error)) => warn!(kind, %error, "audit event not recorded"),
                Err(_elapsed) => warn!(
                    kind,
                    timeout = ?AUDIT_WRITE_TIMEOUT,
                    "audit event write timed out"
                ),
            }
        });
    }

    /// Number of writes spawned and not yet collected by [`AuditTrail::flush`].
    #[must_use]
    pub fn pending(&self) -> usize {
        self.tasks.lock().len()
    }

    /// Wait for every write spawned so far.
    pub async fn flush(&self) {
        let mut tasks = mem::take(&mut *self.tasks.lock());

        while let Some(joined) = tasks.join_next().await {
            if let Err(error) = joined {
                warn!(%error, "audit task aborted");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::future;

    use tokio::time::Instant;

    use crate::store::StoreError;

    use super::*;

    #[tokio::test]
    async fn flush_waits_for_spawned_writes() {
        let trail = AuditTrail::new();

        trail.record("test", async { Ok::<_, StoreError>("e-1".to_string()) });
        trail.record("test", async {
            Err(StoreError::Unavailable("offline".to_string()))
        });

        assert_eq!(trail.pending(), 2);

        trail.flush().await;

        assert_eq!(trail.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn hung_writes_are_dropped_after_the_timeout() {
        let trail = AuditTrail::new();
        let started = Instant::now();

        trail.record("test", future::pending::<Result<String, StoreError>>());
        trail.flush().await;

        assert!(started.elapsed() >= AUDIT_WRITE_TIMEOUT);
        assert_eq!(trail.pending(), 0);
    }
}
