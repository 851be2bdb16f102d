//! Publish a change event to the stream.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use gsync_core::{ChangeEvent, EventKind, EventOrigin};
use std::path::Path;

use crate::context::AppContext;

#[derive(Args)]
pub struct NotifyArgs {
    /// Event kind (create, update, delete)
    pub kind: String,

    /// Entity ID
    pub entity_id: String,

    /// Mark the event as coming from a background process
    #[arg(long)]
    pub background: bool,
}

impl NotifyArgs {
    fn event(&self) -> Result<ChangeEvent> {
        let kind = EventKind::parse(&self.kind).ok_or_else(|| {
            anyhow::anyhow!("Unknown event kind '{}'. Use create, update or delete.", self.kind)
        })?;
        if self.entity_id.trim().is_empty() {
            anyhow::bail!("Entity ID must not be empty");
        }
        let origin = if self.background {
            EventOrigin::Background
        } else {
            EventOrigin::Primary
        };
        Ok(ChangeEvent::new(kind, self.entity_id.clone()).with_origin(origin))
    }
}

pub async fn execute(args: NotifyArgs, config_path: &Path) -> Result<()> {
    let event = args.event()?;
    let ctx = AppContext::open(config_path).await?;

    let entry_id = gsync_redis::publish_event(ctx.store.pool(), ctx.store.keys(), &event).await?;

    println!(
        "{} {} {} {}",
        "✓".green(),
        event.kind.as_str().cyan(),
        event.entity_id.yellow(),
        format!("({})", entry_id).dimmed()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(kind: &str, entity_id: &str) -> NotifyArgs {
        NotifyArgs {
            kind: kind.to_string(),
            entity_id: entity_id.to_string(),
            background: false,
        }
    }

    #[test]
    fn test_event_kind_is_parsed() {
        let event = args("deleted", "42").event().unwrap();
        assert_eq!(event.kind, EventKind::Delete);
        assert_eq!(event.origin, EventOrigin::Primary);
    }

    #[test]
    fn test_bad_input_is_rejected() {
        assert!(args("save", "42").event().is_err());
        assert!(args("update", "  ").event().is_err());
    }
}
