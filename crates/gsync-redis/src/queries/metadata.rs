//! Entity metadata queries.

use crate::client::{Keys, RedisPool, RedisResult};
use redis::AsyncCommands;
use std::collections::BTreeMap;

pub async fn get_metadata(
    pool: &RedisPool,
    keys: &Keys,
    entity_id: &str,
    key: &str,
) -> RedisResult<Option<String>> {
    let mut conn = pool.clone();
    let value: Option<String> = conn.hget(keys.metadata(entity_id), key).await?;
    Ok(value)
}

pub async fn set_metadata(
    pool: &RedisPool,
    keys: &Keys,
    entity_id: &str,
    key: &str,
    value: &str,
) -> RedisResult<()> {
    let mut conn = pool.clone();
    conn.hset::<_, _, _, ()>(keys.metadata(entity_id), key, value).await?;
    Ok(())
}

pub async fn delete_metadata(pool: &RedisPool, keys: &Keys, entity_id: &str, key: &str) -> RedisResult<()> {
    let mut conn = pool.clone();
    conn.hdel::<_, _, ()>(keys.metadata(entity_id), key).await?;
    Ok(())
}

/// Every metadata entry of an entity.
pub async fn get_all_metadata(
    pool: &RedisPool,
    keys: &Keys,
    entity_id: &str,
) -> RedisResult<BTreeMap<String, String>> {
    let mut conn = pool.clone();
    let values: BTreeMap<String, String> = conn.hgetall(keys.metadata(entity_id)).await?;
    Ok(values)
}
