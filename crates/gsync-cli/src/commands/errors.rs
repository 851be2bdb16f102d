//! Error log command.

use anyhow::Result;
use clap::Args;
use gsync_core::ErrorLog;
use std::path::Path;

use crate::context::AppContext;
use crate::output;

#[derive(Args)]
pub struct ErrorsArgs {
    /// Entity ID
    pub entity_id: String,

    /// Only show the most recent N errors
    #[arg(long)]
    pub last: Option<usize>,
}

pub async fn execute(args: ErrorsArgs, config_path: &Path) -> Result<()> {
    let ctx = AppContext::open(config_path).await?;
    let mut errors = ctx.store.get(&args.entity_id).await?;

    if let Some(n) = args.last {
        let skip = errors.len().saturating_sub(n);
        errors.drain(..skip);
    }

    output::print_errors(&args.entity_id, &errors);
    Ok(())
}
