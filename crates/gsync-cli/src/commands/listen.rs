//! Stream listener command.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use gsync_redis::{EventListener, ListenerOptions, DEFAULT_GROUP};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::context::AppContext;

#[derive(Args)]
pub struct ListenArgs {
    /// Consumer group name
    #[arg(long, default_value = DEFAULT_GROUP)]
    pub group: String,

    /// Consumer name within the group
    #[arg(long, default_value = "gsync-1")]
    pub consumer: String,

    /// Maximum events read per batch
    #[arg(long, default_value = "32")]
    pub batch_size: usize,

    /// How long one read blocks waiting for events (ms)
    #[arg(long, default_value = "5000")]
    pub block_ms: usize,

    /// Also write logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl ListenArgs {
    fn options(&self) -> ListenerOptions {
        ListenerOptions {
            group: self.group.clone(),
            consumer: self.consumer.clone(),
            batch_size: self.batch_size.max(1),
            block_ms: self.block_ms,
        }
    }
}

pub async fn execute(args: ListenArgs, config_path: &Path) -> Result<()> {
    let ctx = AppContext::open(config_path).await?;
    let dispatcher = ctx.dispatcher().await?;

    // Blocking reads get their own connection.
    let conn = gsync_redis::init_pool(&ctx.config.redis.url)
        .await
        .context("Failed to open listener connection")?;
    let mut listener = EventListener::new(conn, ctx.store.keys().clone(), args.options());

    println!();
    println!("  {} {}", "gsync".cyan().bold(), "listener".bold());
    println!("  {}  {}", "Stream".green(), ctx.store.keys().events());
    println!("  {}   {} / {}", "Group".green(), args.group, args.consumer);
    println!();
    println!("  {}", "Ctrl+C to stop".dimmed());
    println!();

    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown requested");
        }
    };
    let stats = listener.run(&dispatcher, shutdown).await?;

    println!(
        "\n{} {} handled, {} failed, {} malformed",
        "Stopped:".bold(),
        stats.handled.to_string().green(),
        stats.failed.to_string().red(),
        stats.malformed
    );
    Ok(())
}
