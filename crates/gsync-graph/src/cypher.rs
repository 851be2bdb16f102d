//! Cypher statements for record upserts and deletes.
//!
//! Labels and relation types cannot be query parameters, so they are checked
//! as identifiers and interpolated backticked. Everything else is a parameter.

use gsync_core::graph::record_id;
use gsync_core::mapping::validate::require_identifier;
use gsync_core::{ExternalRecordId, GsyncError, GsyncResult, UpsertInstruction};
use neo4rs::{BoltType, Query};

use crate::value::properties;

/// Label shared by every synced record.
pub const RECORD_LABEL: &str = "Record";

/// Relationship property marking relations owned by the sync.
pub const MANAGED_FLAG: &str = "gsync_managed";

fn quoted(name: &str) -> GsyncResult<String> {
    require_identifier(name)?;
    Ok(format!("`{}`", name))
}

/// Merge the record node, add its type label and write its properties.
pub fn upsert_node_cypher(record_type: &str) -> GsyncResult<String> {
    Ok(format!(
        "MERGE (n:{record} {{record_id: $record_id}})
         SET n:{label}
         SET n += $props
         SET n.entity_id = $entity_id, n.record_type = $record_type, n.synced_at = $synced_at",
        record = RECORD_LABEL,
        label = quoted(record_type)?,
    ))
}

/// Drop the relations a previous sync of the record created.
pub fn prune_relations_cypher() -> String {
    format!(
        "MATCH (n:{record} {{record_id: $record_id}})-[r]->()
         WHERE r.{flag} = true
         DELETE r",
        record = RECORD_LABEL,
        flag = MANAGED_FLAG,
    )
}

/// Merge a related target record and the relation pointing at it.
pub fn relate_cypher(target_type: &str, relation: &str) -> GsyncResult<String> {
    Ok(format!(
        "MATCH (n:{record} {{record_id: $record_id}})
         MERGE (t:{record} {{record_id: $target_id}})
         ON CREATE SET t.record_type = $target_type
         SET t:{label}
         MERGE (n)-[r:{relation}]->(t)
         SET r.{flag} = true",
        record = RECORD_LABEL,
        label = quoted(target_type)?,
        relation = quoted(relation)?,
        flag = MANAGED_FLAG,
    ))
}

/// Remove a record and all of its relationships.
pub fn delete_cypher() -> String {
    format!("MATCH (n:{} {{record_id: $record_id}}) DETACH DELETE n", RECORD_LABEL)
}

/// Statements of one upsert, in execution order, and the record id they write.
pub fn upsert_queries(
    instruction: &UpsertInstruction,
    synced_at: &str,
) -> GsyncResult<(ExternalRecordId, Vec<Query>)> {
    if instruction.entity_id.trim().is_empty() {
        return Err(GsyncError::mapping(&instruction.record_type, "entity id is empty"));
    }
    let id = record_id(&instruction.record_type, &instruction.entity_id);

    let mut queries = Vec::with_capacity(instruction.related.len() + 2);
    queries.push(
        Query::new(upsert_node_cypher(&instruction.record_type)?)
            .param("record_id", id.as_str())
            .param("props", BoltType::Map(properties(&instruction.fields)))
            .param("entity_id", instruction.entity_id.as_str())
            .param("record_type", instruction.record_type.as_str())
            .param("synced_at", synced_at),
    );
    queries.push(Query::new(prune_relations_cypher()).param("record_id", id.as_str()));

    for related in &instruction.related {
        let target_id = record_id(&related.target_type, &related.target_key);
        queries.push(
            Query::new(relate_cypher(&related.target_type, &related.relation)?)
                .param("record_id", id.as_str())
                .param("target_id", target_id.as_str())
                .param("target_type", related.target_type.as_str()),
        );
    }

    Ok((id, queries))
}

/// Statement deleting one record.
pub fn delete_query(external_id: &ExternalRecordId) -> Query {
    Query::new(delete_cypher()).param("record_id", external_id.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gsync_core::{MappedData, RelatedRecord};
    use serde_json::json;

    fn instruction() -> UpsertInstruction {
        let mut fields = MappedData::new();
        fields.insert("name".to_string(), json!("Ana"));
        UpsertInstruction {
            entity_id: "42".to_string(),
            record_type: "Customer".to_string(),
            fields,
            related: vec![
                RelatedRecord::new("Store", "7", "SHOPS_AT"),
                RelatedRecord::new("Store", "9", "SHOPS_AT"),
            ],
        }
    }

    #[test]
    fn test_node_cypher_labels_record() {
        let cypher = upsert_node_cypher("Customer").unwrap();
        assert!(cypher.contains("MERGE (n:Record {record_id: $record_id})"));
        assert!(cypher.contains("SET n:`Customer`"));
        assert!(cypher.contains("SET n += $props"));
    }

    #[test]
    fn test_relate_cypher_marks_relation() {
        let cypher = relate_cypher("Store", "SHOPS_AT").unwrap();
        assert!(cypher.contains("MERGE (n)-[r:`SHOPS_AT`]->(t)"));
        assert!(cypher.contains("SET r.gsync_managed = true"));
        assert!(cypher.contains("SET t:`Store`"));
    }

    #[test]
    fn test_prune_only_touches_managed_relations() {
        let cypher = prune_relations_cypher();
        assert!(cypher.contains("WHERE r.gsync_managed = true"));
    }

    #[test]
    fn test_injection_in_labels_is_rejected() {
        assert!(upsert_node_cypher("Customer`) DETACH DELETE (x").is_err());
        assert!(relate_cypher("Store", "SHOPS AT").is_err());
    }

    #[test]
    fn test_upsert_queries_order_and_id() {
        let (id, queries) = upsert_queries(&instruction(), "2026-01-01T00:00:00Z").unwrap();
        assert_eq!(id.as_str(), "Customer:42");
        // node, prune, one per related record
        assert_eq!(queries.len(), 4);
    }

    #[test]
    fn test_upsert_queries_rejects_empty_entity_id() {
        let mut instr = instruction();
        instr.entity_id = " ".to_string();
        match upsert_queries(&instr, "now") {
            Err(GsyncError::Mapping { record_type, .. }) => assert_eq!(record_type, "Customer"),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("empty entity id must fail"),
        }
    }

    #[test]
    fn test_delete_cypher() {
        assert_eq!(delete_cypher(), "MATCH (n:Record {record_id: $record_id}) DETACH DELETE n");
    }
}
