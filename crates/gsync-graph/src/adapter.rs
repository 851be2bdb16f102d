//! `GraphStoreAdapter` over Neo4j.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use gsync_core::{ExternalRecordId, GraphStoreAdapter, GsyncError, GsyncResult, UpsertInstruction};
use tracing::{debug, warn};

use crate::client::{GraphClient, GraphConfig};
use crate::cypher::{delete_query, upsert_queries};

/// How failed writes are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff: Duration) -> Self {
        Self { max_retries, backoff }
    }

    pub fn from_config(config: &GraphConfig) -> Self {
        Self::new(config.max_retries, Duration::from_millis(config.retry_backoff_ms))
    }

    /// Delay before retry number `attempt` (0-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Run `op` until it succeeds or the retries are spent.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut op: F) -> anyhow::Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.max_retries => {
                    let delay = self.delay(attempt);
                    warn!(
                        operation,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Graph write failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&GraphConfig::default())
    }
}

/// Neo4j-backed graph store. Each upsert runs in its own transaction.
#[derive(Clone)]
pub struct Neo4jGraphStore {
    client: GraphClient,
    retry: RetryPolicy,
}

impl Neo4jGraphStore {
    pub fn new(client: GraphClient, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }

    /// Connect using `config`, taking the retry policy from it as well.
    pub async fn connect(config: &GraphConfig) -> anyhow::Result<Self> {
        let client = GraphClient::connect(config).await?;
        Ok(Self::new(client, RetryPolicy::from_config(config)))
    }

    pub fn client(&self) -> &GraphClient {
        &self.client
    }
}

#[async_trait]
impl GraphStoreAdapter for Neo4jGraphStore {
    async fn upsert(&self, instruction: &UpsertInstruction) -> GsyncResult<ExternalRecordId> {
        let synced_at = Utc::now().to_rfc3339();
        let (id, queries) = upsert_queries(instruction, &synced_at)?;

        self.retry
            .run("upsert", || self.client.execute_in_transaction(queries.clone()))
            .await
            .map_err(|e| GsyncError::store_write(format!("{}: {:#}", id, e)))?;

        debug!(record_id = %id, related = instruction.related.len(), "Record upserted");
        Ok(id)
    }

    async fn delete(&self, external_id: &ExternalRecordId) -> GsyncResult<()> {
        self.retry
            .run("delete", || self.client.execute(delete_query(external_id)))
            .await
            .map_err(|e| GsyncError::store_write(format!("{}: {:#}", external_id, e)))?;

        debug!(record_id = %external_id, "Record deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_delay_doubles() {
        let policy = RetryPolicy::new(3, Duration::from_millis(100));
        assert_eq!(policy.delay(0), Duration::from_millis(100));
        assert_eq!(policy.delay(1), Duration::from_millis(200));
        assert_eq!(policy.delay(2), Duration::from_millis(400));
    }

    #[test]
    fn test_default_policy_matches_config_defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 2);
        assert_eq!(policy.backoff, Duration::from_millis(200));
    }

    #[tokio::test]
    async fn test_run_recovers_after_transient_failures() {
        let policy = RetryPolicy::new(2, Duration::from_millis(1));
        let calls = AtomicU32::new(0);

        let result = policy
            .run("upsert", || async {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(anyhow::anyhow!("connection reset"))
                } else {
                    Ok(n)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_run_gives_up_after_max_retries() {
        let policy = RetryPolicy::new(1, Duration::from_millis(1));
        let calls = AtomicU32::new(0);

        let result: anyhow::Result<()> = policy
            .run("delete", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(anyhow::anyhow!("unavailable"))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_no_retries_means_one_attempt() {
        let policy = RetryPolicy::new(0, Duration::from_millis(1));
        let calls = AtomicU32::new(0);

        let result: anyhow::Result<()> = policy
            .run("delete", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(anyhow::anyhow!("unavailable"))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
