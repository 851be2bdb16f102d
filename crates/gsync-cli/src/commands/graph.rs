//! Graph store CLI commands.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use gsync_graph::GraphClient;
use std::path::Path;

use crate::config::FileConfig;
use crate::output;

#[derive(Subcommand)]
pub enum GraphCommands {
    /// Create the record constraint and indexes
    Init,

    /// Show graph status
    Status,

    /// Show one record and its synced relations
    Inspect {
        /// Record ID (<type>:<entity id>)
        record_id: String,
    },

    /// List the records synced from an entity
    Records {
        /// Entity ID
        entity_id: String,
    },
}

pub async fn execute(cmd: GraphCommands, config_path: &Path) -> Result<()> {
    let config = FileConfig::load(config_path)?;
    let client = GraphClient::connect(&config.graph)
        .await
        .with_context(|| format!("Failed to connect to Neo4j at {}", config.graph.uri))?;

    match cmd {
        GraphCommands::Init => cmd_init(&client).await,
        GraphCommands::Status => cmd_status(&client, &config).await,
        GraphCommands::Inspect { record_id } => cmd_inspect(&client, &record_id).await,
        GraphCommands::Records { entity_id } => cmd_records(&client, &entity_id).await,
    }
}

async fn cmd_init(client: &GraphClient) -> Result<()> {
    gsync_graph::initialize_schema(client).await?;
    println!(
        "{} Schema initialized ({} statements)",
        "✓".green(),
        gsync_graph::schema::statement_count()
    );
    Ok(())
}

async fn cmd_status(client: &GraphClient, config: &FileConfig) -> Result<()> {
    println!("{}", "Graph Status".bold());
    println!("{}", "─".repeat(40));
    println!("  {:<16} {}", "Neo4j".dimmed(), config.graph.uri);
    println!("  {:<16} {}", "Database".dimmed(), config.graph.database);

    let counts = client.get_counts().await?;
    println!("  {:<16} {}", "Records".dimmed(), counts.nodes.to_string().cyan());
    println!("  {:<16} {}", "Relations".dimmed(), counts.relationships.to_string().cyan());

    println!();
    println!("{}", "By type".bold());
    let by_type = gsync_graph::count_by_type(client).await?;
    output::print_type_counts(&by_type);
    Ok(())
}

async fn cmd_inspect(client: &GraphClient, record_id: &str) -> Result<()> {
    match gsync_graph::get_record(client, record_id).await? {
        Some(record) => output::print_record(&record),
        None => println!("{} {}", "No record found:".dimmed(), record_id),
    }
    Ok(())
}

async fn cmd_records(client: &GraphClient, entity_id: &str) -> Result<()> {
    let ids = gsync_graph::records_for_entity(client, entity_id).await?;
    if ids.is_empty() {
        println!("{} {}", "No records synced from".dimmed(), entity_id.dimmed());
        return Ok(());
    }
    for id in &ids {
        println!("  {} {}", "→".dimmed(), id);
    }
    Ok(())
}
