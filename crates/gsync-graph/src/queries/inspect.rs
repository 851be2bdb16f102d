//! Record inspection queries.

use anyhow::Result;
use neo4rs::Query;
use serde::Serialize;

use crate::cypher::{MANAGED_FLAG, RECORD_LABEL};
use crate::GraphClient;

/// A stored record with its outgoing sync-managed relations.
#[derive(Debug, Clone, Serialize)]
pub struct RecordView {
    pub record_id: String,
    pub record_type: String,
    pub entity_id: String,
    pub synced_at: String,
    pub labels: Vec<String>,
    pub properties: Vec<String>,
    pub relations: Vec<RelationView>,
}

/// One outgoing relation of a record.
#[derive(Debug, Clone, Serialize)]
pub struct RelationView {
    pub relation: String,
    pub target_id: String,
}

/// Record count for one record type.
#[derive(Debug, Clone, Serialize)]
pub struct TypeCount {
    pub record_type: String,
    pub count: i64,
}

/// Fetch a record by id.
pub async fn get_record(client: &GraphClient, record_id: &str) -> Result<Option<RecordView>> {
    let query = Query::new(format!(
        "MATCH (n:{} {{record_id: $record_id}})
         RETURN n.record_id as record_id,
                COALESCE(n.record_type, '') as record_type,
                COALESCE(n.entity_id, '') as entity_id,
                COALESCE(n.synced_at, '') as synced_at,
                labels(n) as labels,
                keys(n) as properties",
        RECORD_LABEL
    ))
    .param("record_id", record_id);

    let rows = client.query(query).await?;
    let Some(row) = rows.into_iter().next() else {
        return Ok(None);
    };

    let mut labels: Vec<String> = row.get("labels").unwrap_or_default();
    labels.sort();
    let mut properties: Vec<String> = row.get("properties").unwrap_or_default();
    properties.sort();

    Ok(Some(RecordView {
        record_id: row.get("record_id").unwrap_or_default(),
        record_type: row.get("record_type").unwrap_or_default(),
        entity_id: row.get("entity_id").unwrap_or_default(),
        synced_at: row.get("synced_at").unwrap_or_default(),
        labels,
        properties,
        relations: get_relations(client, record_id).await?,
    }))
}

async fn get_relations(client: &GraphClient, record_id: &str) -> Result<Vec<RelationView>> {
    let query = Query::new(format!(
        "MATCH (n:{record} {{record_id: $record_id}})-[r]->(t:{record})
         WHERE r.{flag} = true
         RETURN type(r) as relation, t.record_id as target_id
         ORDER BY relation, target_id",
        record = RECORD_LABEL,
        flag = MANAGED_FLAG,
    ))
    .param("record_id", record_id);

    let rows = client.query(query).await?;
    Ok(rows
        .into_iter()
        .map(|row| RelationView {
            relation: row.get("relation").unwrap_or_default(),
            target_id: row.get("target_id").unwrap_or_default(),
        })
        .collect())
}

/// Record ids synced from one entity.
pub async fn records_for_entity(client: &GraphClient, entity_id: &str) -> Result<Vec<String>> {
    let query = Query::new(format!(
        "MATCH (n:{} {{entity_id: $entity_id}})
         RETURN n.record_id as record_id
         ORDER BY record_id",
        RECORD_LABEL
    ))
    .param("entity_id", entity_id);

    let rows = client.query(query).await?;
    Ok(rows
        .into_iter()
        .filter_map(|row| row.get::<String>("record_id").ok())
        .collect())
}

/// Record counts grouped by record type. Related targets that were never
/// synced themselves count under their target type.
pub async fn count_by_type(client: &GraphClient) -> Result<Vec<TypeCount>> {
    let query = Query::new(format!(
        "MATCH (n:{})
         RETURN COALESCE(n.record_type, '(untyped)') as record_type, count(n) as count
         ORDER BY record_type",
        RECORD_LABEL
    ));

    let rows = client.query(query).await?;
    Ok(rows
        .into_iter()
        .map(|row| TypeCount {
            record_type: row.get("record_type").unwrap_or_default(),
            count: row.get("count").unwrap_or_default(),
        })
        .collect())
}
