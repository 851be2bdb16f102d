//! Terminal output formatting.

use colored::Colorize;
use gsync_core::{Entity, SyncError, SyncReport};
use gsync_graph::{RecordView, TypeCount};

/// Print the outcome of one dispatched event.
pub fn print_report(report: &SyncReport) {
    println!(
        "{} {} {}",
        report.kind.as_str().cyan().bold(),
        report.entity_id.yellow(),
        format!("({})", report.event_id).dimmed()
    );

    if report.skipped {
        println!("  {}", "Skipped: background-origin event".dimmed());
        return;
    }

    if !report.resolved_types.is_empty() {
        println!("  {}: {}", "Types".bold(), report.resolved_types.join(", "));
    }
    for record in &report.synced {
        println!("  {} {} {}", "✓".green(), record.record_type, record.external_id.as_str().dimmed());
    }
    for id in &report.deleted {
        println!("  {} deleted {}", "✓".green(), id.as_str().dimmed());
    }
    for error in &report.errors {
        println!("  {} {}", "✗".red(), error);
    }

    if report.is_success() {
        if report.synced.is_empty() && report.deleted.is_empty() {
            println!("  {}", "Nothing to do.".dimmed());
        }
    } else {
        println!("  {} error(s) recorded", report.errors.len().to_string().red().bold());
    }
}

/// Print an entity and its cached graph record ids.
pub fn print_entity(entity: &Entity, external_ids: &[(String, String)]) {
    println!("{} {}", "Entity".cyan().bold(), entity.id.yellow());
    println!("{}", "─".repeat(50));

    let roles: Vec<&str> = entity.roles.iter().map(String::as_str).collect();
    println!("{}: {}", "Roles".bold(), if roles.is_empty() { "(none)".to_string() } else { roles.join(", ") });

    if !entity.attributes.is_empty() {
        println!();
        println!("{}", "Attributes".bold());
        for (name, value) in &entity.attributes {
            println!("  {:<24} {}", name, value);
        }
    }

    println!();
    println!("{}", "External ID".bold());
    if external_ids.is_empty() {
        println!("  {}", "No external ID found".dimmed());
    }
    for (key, id) in external_ids {
        println!("  {:<24} {}", key.dimmed(), id.green());
    }
}

/// Print the error log of an entity, oldest first.
pub fn print_errors(entity_id: &str, errors: &[SyncError]) {
    if errors.is_empty() {
        println!("{} {}", "No sync errors recorded for".dimmed(), entity_id.dimmed());
        return;
    }

    println!("{} {}", "Sync errors for".bold(), entity_id.yellow());
    println!("{}", "─".repeat(50));
    for error in errors {
        println!(
            "  {} {}",
            error.timestamp.format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
            error.message
        );
    }
    println!();
    println!("{} error(s) total", errors.len());
}

/// Print a stored graph record.
pub fn print_record(record: &RecordView) {
    println!("{} {}", "Record".cyan().bold(), record.record_id.yellow());
    println!("{}", "─".repeat(50));
    println!("  {:<12} {}", "Type".bold(), or_dash(&record.record_type));
    println!("  {:<12} {}", "Entity".bold(), or_dash(&record.entity_id));
    println!("  {:<12} {}", "Synced at".bold(), or_dash(&record.synced_at));
    println!("  {:<12} {}", "Labels".bold(), record.labels.join(", "));
    println!("  {:<12} {}", "Properties".bold(), record.properties.join(", "));

    if record.relations.is_empty() {
        println!("  {}", "No synced relations.".dimmed());
        return;
    }
    println!();
    for relation in &record.relations {
        println!("  {} [{}] {}", "→".dimmed(), relation.relation.magenta(), relation.target_id);
    }
}

/// Print record counts per type.
pub fn print_type_counts(counts: &[TypeCount]) {
    if counts.is_empty() {
        println!("  {}", "No records.".dimmed());
        return;
    }
    for count in counts {
        println!("  {:<24} {}", count.record_type, count.count);
    }
}

fn or_dash(s: &str) -> &str {
    if s.is_empty() {
        "-"
    } else {
        s
    }
}
