//! Sync error log queries.

use crate::client::{Keys, RedisPool, RedisResult};
use gsync_core::SyncError;
use redis::AsyncCommands;
use tracing::warn;

/// Append error records to an entity's list.
pub async fn append_errors(
    pool: &RedisPool,
    keys: &Keys,
    entity_id: &str,
    errors: &[SyncError],
) -> RedisResult<()> {
    if errors.is_empty() {
        return Ok(());
    }
    let rows = errors
        .iter()
        .map(serde_json::to_string)
        .collect::<Result<Vec<_>, _>>()?;

    let mut conn = pool.clone();
    conn.rpush::<_, _, ()>(keys.errors(entity_id), rows).await?;
    Ok(())
}

/// All error records of an entity, oldest first. Unreadable rows are skipped.
pub async fn list_errors(pool: &RedisPool, keys: &Keys, entity_id: &str) -> RedisResult<Vec<SyncError>> {
    let mut conn = pool.clone();
    let rows: Vec<String> = conn.lrange(keys.errors(entity_id), 0, -1).await?;

    let mut errors = Vec::with_capacity(rows.len());
    for row in rows {
        match serde_json::from_str::<SyncError>(&row) {
            Ok(e) => errors.push(e),
            Err(e) => warn!(entity_id, error = %e, "Skipping unreadable sync error row"),
        }
    }
    Ok(errors)
}
