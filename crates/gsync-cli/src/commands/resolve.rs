//! Role resolution preview.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::collections::BTreeSet;
use std::path::Path;

use crate::config::FileConfig;

#[derive(Args)]
pub struct ResolveArgs {
    /// Role held by the entity (repeatable)
    #[arg(long = "role")]
    pub roles: Vec<String>,
}

pub fn execute(args: ResolveArgs, config_path: &Path) -> Result<()> {
    let config = FileConfig::load(config_path)?.sync_configuration()?;
    let roles: BTreeSet<String> = args.roles.into_iter().collect();
    let types = config.role_map().resolve_types(&roles);

    if types.is_empty() {
        println!("{}", "No record types match these roles.".dimmed());
        return Ok(());
    }

    for record_type in types {
        let transforms = match (
            config.mappers().has_field_mapper(record_type),
            config.mappers().has_related_mapper(record_type),
        ) {
            (true, true) => "fields, related",
            (true, false) => "fields",
            (false, true) => "related",
            (false, false) => "no transforms",
        };
        println!(
            "  {} {} {}",
            "→".dimmed(),
            record_type.cyan(),
            format!("({}; {})", transforms, config.external_id_key(record_type)).dimmed()
        );
    }
    Ok(())
}
