// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use medsync_core::{NewIntakeEvent, Record};

use crate::cli::{EventsCommand, OutputFormat};
use crate::error::Result;
use crate::service::SyncServices;

use super::{parse_object, print_json, require_profile};

pub async fn run(services: &SyncServices, cmd: EventsCommand, output: OutputFormat) -> Result<()> {
    let profile = require_profile(services.session())?.to_string();
    match cmd {
        EventsCommand::List => {
            let events = services.reconciler().get_events(&profile).await?;
            print_events(&events, output)
        }
        EventsCommand::Register {
            kind,
            ref_id,
            action,
            schedule,
            meta,
        } => {
            let meta = meta.map(|raw| parse_object(&raw, "--meta")).transpose()?;
            let input = NewIntakeEvent {
                kind,
                ref_id,
                action,
                patient_profile_id: profile,
                scheduled_for: schedule.scheduled_for,
                meta,
            };
            let registered = services.reconciler().register_event(&input).await?;
            match output {
                OutputFormat::Json => print_json(&registered),
                OutputFormat::Text => {
                    println!("Registered {}", event_line(&registered.event));
                    Ok(())
                }
            }
        }
    }
}

fn print_events(events: &[Record], output: OutputFormat) -> Result<()> {
    match output {
        OutputFormat::Json => print_json(&events),
        OutputFormat::Text => {
            if events.is_empty() {
                println!("No intake events.");
            }
            for event in events {
                println!("{}", event_line(event));
            }
            Ok(())
        }
    }
}

pub(crate) fn event_line(event: &Record) -> String {
    let field = |name: &str| event.field_str(name).unwrap_or("-");
    format!(
        "{}  {}  {} {} {}",
        event.id,
        field("scheduledFor"),
        field("action"),
        field("kind"),
        field("refId"),
    )
}
