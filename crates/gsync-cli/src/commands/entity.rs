//! Entity store commands.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use gsync_core::{Entity, EXTERNAL_ID_META_KEY};
use gsync_redis::{entities, metadata};
use std::path::{Path, PathBuf};

use crate::context::AppContext;
use crate::output;

#[derive(Subcommand)]
pub enum EntityCommands {
    /// Import entities from a JSON file (one object or an array)
    Import {
        /// Path to the JSON file
        file: PathBuf,
    },

    /// Show an entity and its cached graph record ids
    Show {
        /// Entity ID
        entity_id: String,
    },

    /// List stored entity ids
    List,

    /// Remove an entity document (metadata is kept for a later delete sync)
    Remove {
        /// Entity ID
        entity_id: String,
    },
}

pub async fn execute(cmd: EntityCommands, config_path: &Path) -> Result<()> {
    let ctx = AppContext::open(config_path).await?;
    let pool = ctx.store.pool();
    let keys = ctx.store.keys();

    match cmd {
        EntityCommands::Import { file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let parsed = parse_entities(&raw)
                .with_context(|| format!("Invalid entity file {}", file.display()))?;

            for entity in &parsed {
                entities::put_entity(pool, keys, entity).await?;
            }
            println!("{} Imported {} entit{}", "✓".green(), parsed.len(), if parsed.len() == 1 { "y" } else { "ies" });
        }
        EntityCommands::Show { entity_id } => {
            let entity = entities::get_entity(pool, keys, &entity_id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("Entity not found: {}", entity_id))?;
            let all = metadata::get_all_metadata(pool, keys, &entity_id).await?;
            let external_ids: Vec<(String, String)> = all
                .into_iter()
                .filter(|(key, value)| is_external_id_key(key) && !value.trim().is_empty())
                .collect();
            output::print_entity(&entity, &external_ids);
        }
        EntityCommands::List => {
            let ids = entities::list_entity_ids(pool, keys).await?;
            if ids.is_empty() {
                println!("{}", "No entities stored.".dimmed());
            }
            for id in &ids {
                println!("  {}", id);
            }
        }
        EntityCommands::Remove { entity_id } => {
            if entities::remove_entity(pool, keys, &entity_id).await? {
                println!("{} Removed {}", "✓".green(), entity_id.yellow());
            } else {
                println!("{} {}", "Entity not found:".dimmed(), entity_id);
            }
        }
    }
    Ok(())
}

/// Parse a single entity object or an array of them.
pub fn parse_entities(raw: &str) -> Result<Vec<Entity>> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    let parsed: Vec<Entity> = match value {
        serde_json::Value::Array(_) => serde_json::from_value(value)?,
        other => vec![serde_json::from_value(other)?],
    };

    if let Some(blank) = parsed.iter().position(|e| e.id.trim().is_empty()) {
        anyhow::bail!("entity #{} has an empty id", blank);
    }
    Ok(parsed)
}

fn is_external_id_key(key: &str) -> bool {
    key == EXTERNAL_ID_META_KEY
        || key
            .strip_prefix(EXTERNAL_ID_META_KEY)
            .is_some_and(|rest| rest.starts_with(':'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_entity() {
        let parsed = parse_entities(r#"{"id": "42", "roles": ["customer"], "attributes": {"email": "a@b.c"}}"#).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].id, "42");
        assert!(parsed[0].roles.contains("customer"));
    }

    #[test]
    fn test_parse_entity_array() {
        let parsed = parse_entities(r#"[{"id": "1"}, {"id": "2", "roles": ["staff"]}]"#).unwrap();
        assert_eq!(parsed.len(), 2);
        assert!(parsed[0].roles.is_empty());
    }

    #[test]
    fn test_parse_rejects_blank_id() {
        assert!(parse_entities(r#"[{"id": "1"}, {"id": " "}]"#).is_err());
        assert!(parse_entities(r#"{"roles": []}"#).is_err());
    }

    #[test]
    fn test_external_id_keys() {
        assert!(is_external_id_key("external_id"));
        assert!(is_external_id_key("external_id:Customer"));
        assert!(!is_external_id_key("external_ids"));
        assert!(!is_external_id_key("locale"));
    }
}
