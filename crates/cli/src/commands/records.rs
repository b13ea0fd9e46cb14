// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use medsync_core::Record;

use crate::cli::{OutputFormat, RecordsCommand};
use crate::error::Result;
use crate::service::SyncServices;

use super::{parse_object, print_json, require_profile};

pub async fn run(services: &SyncServices, cmd: RecordsCommand, output: OutputFormat) -> Result<()> {
    let reconciler = services.reconciler();
    match cmd {
        RecordsCommand::List { entity } => {
            let profile = require_profile(services.session())?;
            let records = reconciler.get_records(entity, profile).await?;
            match output {
                OutputFormat::Json => print_json(&records),
                OutputFormat::Text => {
                    if records.is_empty() {
                        println!("No {} records.", entity);
                    }
                    for record in &records {
                        println!("{}", record_line(record));
                    }
                    Ok(())
                }
            }
        }
        RecordsCommand::Create { entity, payload } => {
            let profile = require_profile(services.session())?;
            let payload = parse_object(&payload, "payload")?;
            let record = reconciler.create_record(entity, profile, payload).await?;
            print_saved("Created", &record, output)
        }
        RecordsCommand::Update { entity, id, patch } => {
            let patch = parse_object(&patch, "patch")?;
            let record = reconciler.update_record(entity, &id, patch).await?;
            print_saved("Updated", &record, output)
        }
        RecordsCommand::Delete { entity, id } => {
            reconciler.delete_record(entity, &id).await?;
            match output {
                OutputFormat::Json => print_json(&serde_json::json!({ "deleted": id })),
                OutputFormat::Text => {
                    println!("Deleted {} {}", entity, id);
                    Ok(())
                }
            }
        }
    }
}

fn print_saved(verb: &str, record: &Record, output: OutputFormat) -> Result<()> {
    match output {
        OutputFormat::Json => print_json(record),
        OutputFormat::Text => {
            println!("{} {}", verb, record_line(record));
            Ok(())
        }
    }
}

/// `id  status  label`, with a marker for device-only records.
pub(crate) fn record_line(record: &Record) -> String {
    let label = record
        .field_str("name")
        .or_else(|| record.field_str("title"))
        .unwrap_or("-");
    let offline = if record.is_offline { " (offline)" } else { "" };
    format!(
        "{}  {}{}  {}",
        record.id,
        record.sync_status.as_str(),
        offline,
        label
    )
}
