//! Entity document queries.

use crate::client::{Keys, RedisPool, RedisResult};
use gsync_core::Entity;
use redis::AsyncCommands;

/// Store an entity document and index its id.
pub async fn put_entity(pool: &RedisPool, keys: &Keys, entity: &Entity) -> RedisResult<()> {
    let json = serde_json::to_string(entity)?;
    let mut conn = pool.clone();
    conn.set::<_, _, ()>(keys.entity(&entity.id), json).await?;
    conn.sadd::<_, _, ()>(keys.entity_index(), &entity.id).await?;
    Ok(())
}

/// Load an entity document.
pub async fn get_entity(pool: &RedisPool, keys: &Keys, entity_id: &str) -> RedisResult<Option<Entity>> {
    let mut conn = pool.clone();
    let json: Option<String> = conn.get(keys.entity(entity_id)).await?;
    match json {
        Some(j) => Ok(Some(serde_json::from_str(&j)?)),
        None => Ok(None),
    }
}

/// Remove an entity document. Metadata and errors are left in place so a
/// following delete event can still find the cached external id.
pub async fn remove_entity(pool: &RedisPool, keys: &Keys, entity_id: &str) -> RedisResult<bool> {
    let mut conn = pool.clone();
    let removed: i64 = conn.del(keys.entity(entity_id)).await?;
    conn.srem::<_, _, ()>(keys.entity_index(), entity_id).await?;
    Ok(removed > 0)
}

/// All indexed entity ids, sorted.
pub async fn list_entity_ids(pool: &RedisPool, keys: &Keys) -> RedisResult<Vec<String>> {
    let mut conn = pool.clone();
    let mut ids: Vec<String> = conn.smembers(keys.entity_index()).await?;
    ids.sort();
    Ok(ids)
}
