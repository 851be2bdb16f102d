//! One-shot lifecycle event commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use gsync_core::{ChangeEvent, EventKind, EventOrigin};
use std::path::Path;

use crate::context::AppContext;
use crate::output;

#[derive(Subcommand)]
pub enum SyncCommands {
    /// Sync a newly created entity
    Create(EventArgs),

    /// Sync an updated entity
    Update(EventArgs),

    /// Remove the graph records of a deleted entity
    Delete(EventArgs),
}

#[derive(Args)]
pub struct EventArgs {
    /// Entity ID
    pub entity_id: String,

    /// Mark the event as coming from a background process
    #[arg(long)]
    pub background: bool,
}

impl EventArgs {
    fn event(&self, kind: EventKind) -> ChangeEvent {
        let origin = if self.background {
            EventOrigin::Background
        } else {
            EventOrigin::Primary
        };
        ChangeEvent::new(kind, self.entity_id.clone()).with_origin(origin)
    }
}

pub async fn execute(cmd: SyncCommands, config_path: &Path) -> Result<()> {
    let event = match &cmd {
        SyncCommands::Create(args) => args.event(EventKind::Create),
        SyncCommands::Update(args) => args.event(EventKind::Update),
        SyncCommands::Delete(args) => args.event(EventKind::Delete),
    };

    let ctx = AppContext::open(config_path).await?;
    let dispatcher = ctx.dispatcher().await?;

    let report = dispatcher.handle(&event).await;
    output::print_report(&report);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_origin_follows_flag() {
        let args = EventArgs {
            entity_id: "42".to_string(),
            background: true,
        };
        let event = args.event(EventKind::Update);
        assert_eq!(event.kind, EventKind::Update);
        assert_eq!(event.entity_id, "42");
        assert_eq!(event.origin, EventOrigin::Background);

        let args = EventArgs {
            entity_id: "42".to_string(),
            background: false,
        };
        assert_eq!(args.event(EventKind::Delete).origin, EventOrigin::Primary);
    }
}
