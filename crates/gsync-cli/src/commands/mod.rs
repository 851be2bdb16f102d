//! CLI command definitions and handlers.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::DEFAULT_CONFIG_FILE;

pub mod entity;
pub mod errors;
pub mod graph;
pub mod listen;
pub mod notify;
pub mod resolve;
pub mod sync;

/// gsync - keep graph records in step with identity-store users
#[derive(Parser)]
#[command(name = "gsync")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the configuration file
    #[arg(short, long, global = true, env = "GSYNC_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one lifecycle event synchronously
    #[command(subcommand)]
    Sync(sync::SyncCommands),

    /// Consume change events from the Redis stream
    Listen(listen::ListenArgs),

    /// Publish a change event to the Redis stream
    Notify(notify::NotifyArgs),

    /// Manage stored entities
    #[command(subcommand)]
    Entity(entity::EntityCommands),

    /// Show recorded sync errors of an entity
    Errors(errors::ErrorsArgs),

    /// Show which record types a set of roles maps to
    Resolve(resolve::ResolveArgs),

    /// Graph store commands
    #[command(subcommand)]
    Graph(graph::GraphCommands),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let config_path = self.config;

        match self.command {
            Commands::Sync(cmd) => sync::execute(cmd, &config_path).await,
            Commands::Listen(args) => listen::execute(args, &config_path).await,
            Commands::Notify(args) => notify::execute(args, &config_path).await,
            Commands::Entity(cmd) => entity::execute(cmd, &config_path).await,
            Commands::Errors(args) => errors::execute(args, &config_path).await,
            Commands::Resolve(args) => resolve::execute(args, &config_path),
            Commands::Graph(cmd) => graph::execute(cmd, &config_path).await,
        }
    }
}
