//! gsync CLI - role-mapped user to graph record sync.
//!
//! Keeps graph records in step with identity-store users.

use anyhow::{Context, Result};
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod context;
mod output;

use commands::{Cli, Commands};

/// Initialize tracing, optionally mirroring output to a log file.
///
/// The returned guard flushes the file writer and must live until exit.
fn init_tracing(verbose: bool, log_file: Option<&std::path::Path>) -> Result<Option<WorkerGuard>> {
    let default_filter = if verbose {
        "gsync=debug,gsync_core=debug,gsync_graph=debug,gsync_redis=debug"
    } else {
        "gsync=info,gsync_core=info,gsync_graph=info,gsync_redis=info"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    if let Some(path) = log_file {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| std::path::Path::new("."));
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
        let file_name = path
            .file_name()
            .ok_or_else(|| anyhow::anyhow!("Log file path has no file name: {}", path.display()))?;

        let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));

        // Log to both stderr and the file
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false),
            )
            .init();
        Ok(Some(guard))
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
        Ok(None)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_file = match &cli.command {
        Commands::Listen(args) => args.log_file.clone(),
        _ => None,
    };
    let _guard = init_tracing(cli.verbose, log_file.as_deref())?;

    cli.execute().await
}
