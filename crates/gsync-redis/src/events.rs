//! Change-event stream.
//!
//! Lifecycle triggers append events to the `<prefix>:events` stream with
//! [`publish_event`]. [`EventListener`] consumes them through a consumer
//! group, so every event is delivered at least once: entries are acknowledged
//! only after they were handled, and a restarted consumer first replays its
//! own pending entries.

use futures::future::join_all;
use gsync_core::{ChangeEvent, EventKind, EventOrigin, SyncDispatcher};
use redis::streams::{StreamId, StreamReadOptions, StreamReadReply};
use redis::AsyncCommands;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::client::{Keys, RedisError, RedisPool, RedisResult};

/// Pause after a failed stream read.
const READ_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Consumer group name used by default.
pub const DEFAULT_GROUP: &str = "gsync";

/// Append an event to the stream; returns the stream entry id.
pub async fn publish_event(pool: &RedisPool, keys: &Keys, event: &ChangeEvent) -> RedisResult<String> {
    let mut conn = pool.clone();
    let fields = [
        ("kind", event.kind.as_str()),
        ("entity_id", event.entity_id.as_str()),
        ("origin", event.origin.as_str()),
    ];
    let id: String = conn.xadd(keys.events(), "*", &fields).await?;
    Ok(id)
}

/// Decode a stream entry into an event.
pub fn parse_entry(entry: &StreamId) -> RedisResult<ChangeEvent> {
    let field = |name: &str| -> Option<String> { entry.get(name) };

    let kind = field("kind")
        .as_deref()
        .and_then(EventKind::parse)
        .ok_or_else(|| RedisError::OperationFailed(format!("entry {}: missing or unknown kind", entry.id)))?;
    let entity_id = field("entity_id")
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| RedisError::OperationFailed(format!("entry {}: missing entity_id", entry.id)))?;
    let origin = match field("origin") {
        None => EventOrigin::Primary,
        Some(o) => EventOrigin::parse(&o)
            .ok_or_else(|| RedisError::OperationFailed(format!("entry {}: unknown origin '{}'", entry.id, o)))?,
    };

    Ok(ChangeEvent {
        kind,
        entity_id,
        origin,
    })
}

/// Group events by entity id, keeping first-seen entity order and the order
/// of events within each entity.
pub fn group_by_entity(events: Vec<(String, ChangeEvent)>) -> Vec<Vec<(String, ChangeEvent)>> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Vec<(String, ChangeEvent)>> = Vec::new();

    for (entry_id, event) in events {
        match index.get(&event.entity_id) {
            Some(&i) => groups[i].push((entry_id, event)),
            None => {
                index.insert(event.entity_id.clone(), groups.len());
                groups.push(vec![(entry_id, event)]);
            }
        }
    }
    groups
}

/// Listener settings.
#[derive(Debug, Clone)]
pub struct ListenerOptions {
    pub group: String,
    pub consumer: String,
    /// Maximum entries per read.
    pub batch_size: usize,
    /// How long one read blocks waiting for new entries.
    pub block_ms: usize,
}

impl Default for ListenerOptions {
    fn default() -> Self {
        Self {
            group: DEFAULT_GROUP.to_string(),
            consumer: "gsync-1".to_string(),
            batch_size: 32,
            block_ms: 5_000,
        }
    }
}

/// Totals of one listener run.
#[derive(Debug, Clone, Default)]
pub struct ListenerStats {
    pub handled: usize,
    pub failed: usize,
    pub malformed: usize,
}

/// Consumer-group reader feeding a [`SyncDispatcher`].
pub struct EventListener {
    conn: RedisPool,
    keys: Keys,
    options: ListenerOptions,
}

impl EventListener {
    /// Create a listener. `conn` should be a dedicated connection since reads block.
    pub fn new(conn: RedisPool, keys: Keys, options: ListenerOptions) -> Self {
        Self { conn, keys, options }
    }

    /// Create the consumer group (and the stream) if missing.
    pub async fn ensure_group(&mut self) -> RedisResult<()> {
        let result: redis::RedisResult<()> = self
            .conn
            .xgroup_create_mkstream(self.keys.events(), &self.options.group, "$")
            .await;
        match result {
            Ok(()) => {
                info!(group = %self.options.group, stream = %self.keys.events(), "Created consumer group");
                Ok(())
            }
            Err(e) if e.code() == Some("BUSYGROUP") => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Consume events until `shutdown` resolves.
    pub async fn run<F>(&mut self, dispatcher: &SyncDispatcher, shutdown: F) -> RedisResult<ListenerStats>
    where
        F: std::future::Future<Output = ()>,
    {
        self.ensure_group().await?;
        tokio::pin!(shutdown);

        let mut stats = ListenerStats::default();
        // Replay this consumer's pending entries before reading new ones.
        let mut cursor = "0";

        info!(
            stream = %self.keys.events(),
            group = %self.options.group,
            consumer = %self.options.consumer,
            "Listening for change events"
        );

        loop {
            let batch = tokio::select! {
                _ = &mut shutdown => break,
                batch = self.read_batch(cursor) => match batch {
                    Ok(batch) => batch,
                    Err(e) => {
                        warn!(error = %e, "Stream read failed, retrying");
                        tokio::time::sleep(READ_RETRY_DELAY).await;
                        continue;
                    }
                },
            };

            if batch.is_empty() {
                if cursor == "0" {
                    debug!("Pending entries replayed");
                    cursor = ">";
                }
                continue;
            }

            self.process_batch(dispatcher, batch, &mut stats).await;
        }

        info!(
            handled = stats.handled,
            failed = stats.failed,
            malformed = stats.malformed,
            "Listener stopped"
        );
        Ok(stats)
    }

    async fn read_batch(&mut self, cursor: &str) -> RedisResult<Vec<StreamId>> {
        let mut options = StreamReadOptions::default()
            .group(&self.options.group, &self.options.consumer)
            .count(self.options.batch_size);
        if cursor == ">" {
            options = options.block(self.options.block_ms);
        }

        let reply: Option<StreamReadReply> = self
            .conn
            .xread_options(&[self.keys.events()], &[cursor], &options)
            .await?;

        Ok(reply
            .map(|r| r.keys.into_iter().flat_map(|k| k.ids).collect())
            .unwrap_or_default())
    }

    async fn process_batch(
        &mut self,
        dispatcher: &SyncDispatcher,
        batch: Vec<StreamId>,
        stats: &mut ListenerStats,
    ) {
        let mut events = Vec::with_capacity(batch.len());
        let mut done = Vec::with_capacity(batch.len());

        for entry in &batch {
            match parse_entry(entry) {
                Ok(event) => events.push((entry.id.clone(), event)),
                Err(e) => {
                    warn!(entry_id = %entry.id, error = %e, "Dropping malformed event");
                    stats.malformed += 1;
                    done.push(entry.id.clone());
                }
            }
        }

        let groups = group_by_entity(events);
        let outcomes = join_all(groups.into_iter().map(|group| async move {
            let mut outcomes = Vec::with_capacity(group.len());
            for (entry_id, event) in group {
                let report = dispatcher.handle(&event).await;
                outcomes.push((entry_id, report.is_success()));
            }
            outcomes
        }))
        .await;

        for (entry_id, success) in outcomes.into_iter().flatten() {
            stats.handled += 1;
            if !success {
                stats.failed += 1;
            }
            done.push(entry_id);
        }

        if !done.is_empty() {
            let acked: redis::RedisResult<()> = self
                .conn
                .xack(self.keys.events(), &self.options.group, done.as_slice())
                .await;
            if let Err(e) = acked {
                warn!(entries = done.len(), error = %e, "Ack failed, entries stay pending");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redis::Value;

    fn entry(id: &str, fields: &[(&str, &str)]) -> StreamId {
        StreamId {
            id: id.to_string(),
            map: fields
                .iter()
                .map(|(k, v)| (k.to_string(), Value::BulkString(v.as_bytes().to_vec())))
                .collect(),
        }
    }

    #[test]
    fn test_parse_entry() {
        let e = entry("1-0", &[("kind", "update"), ("entity_id", "42"), ("origin", "background")]);
        let event = parse_entry(&e).unwrap();
        assert_eq!(event.kind, EventKind::Update);
        assert_eq!(event.entity_id, "42");
        assert_eq!(event.origin, EventOrigin::Background);

        let e = entry("2-0", &[("kind", "delete"), ("entity_id", "42")]);
        assert_eq!(parse_entry(&e).unwrap().origin, EventOrigin::Primary);
    }

    #[test]
    fn test_parse_entry_rejects_malformed() {
        assert!(parse_entry(&entry("1-0", &[("entity_id", "42")])).is_err());
        assert!(parse_entry(&entry("1-0", &[("kind", "save"), ("entity_id", "42")])).is_err());
        assert!(parse_entry(&entry("1-0", &[("kind", "update"), ("entity_id", " ")])).is_err());
        assert!(parse_entry(&entry("1-0", &[("kind", "update"), ("entity_id", "1"), ("origin", "cron")])).is_err());
    }

    #[test]
    fn test_group_by_entity_preserves_order() {
        let events = vec![
            ("1-0".to_string(), ChangeEvent::new(EventKind::Create, "a")),
            ("2-0".to_string(), ChangeEvent::new(EventKind::Update, "b")),
            ("3-0".to_string(), ChangeEvent::new(EventKind::Update, "a")),
            ("4-0".to_string(), ChangeEvent::new(EventKind::Delete, "a")),
        ];

        let groups = group_by_entity(events);
        assert_eq!(groups.len(), 2);
        let a: Vec<_> = groups[0].iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(a, vec!["1-0", "3-0", "4-0"]);
        assert_eq!(groups[1][0].1.entity_id, "b");
    }
}
