// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use medsync_core::{NewNotification, Notification, NotificationFilter};

use crate::cli::{NotificationFilterArgs, NotifyCommand, OutputFormat};
use crate::error::{Error, Result};
use crate::service::SyncServices;

use super::{print_json, require_user};

pub async fn run(services: &SyncServices, cmd: NotifyCommand, output: OutputFormat) -> Result<()> {
    let reconciler = services.reconciler();
    let user = require_user(services.session())?.to_string();
    match cmd {
        NotifyCommand::Create {
            kind,
            title,
            message,
            priority,
            schedule,
        } => {
            let priority = priority
                .map(|p| p.parse().map_err(Error::validation))
                .transpose()?;
            let input = NewNotification {
                user_id: user,
                kind,
                title,
                message,
                priority,
                metadata: None,
                scheduled_for: schedule.scheduled_for,
            };
            let created = reconciler.create_notification(input).await?;
            match output {
                OutputFormat::Json => print_json(&created),
                OutputFormat::Text => {
                    println!("Created {}", notification_line(&created));
                    Ok(())
                }
            }
        }
        NotifyCommand::List { filter } => {
            let filter = build_filter(filter)?;
            let list = reconciler.list_notifications(&user, &filter).await?;
            match output {
                OutputFormat::Json => print_json(&list),
                OutputFormat::Text => {
                    if list.is_empty() {
                        println!("No notifications.");
                    }
                    for n in &list {
                        println!("{}", notification_line(n));
                    }
                    Ok(())
                }
            }
        }
        NotifyCommand::Read { ids } => {
            let updated = reconciler.mark_many_read(&ids).await?;
            done(output, "read", updated)
        }
        NotifyCommand::Archive { id } => {
            reconciler.archive(&id).await?;
            done(output, "archived", 1)
        }
        NotifyCommand::Delete { id } => {
            reconciler.delete_notification(&id).await?;
            done(output, "deleted", 1)
        }
        NotifyCommand::Stats => {
            let stats = reconciler.stats(&user).await?;
            match output {
                OutputFormat::Json => print_json(&stats),
                OutputFormat::Text => {
                    println!(
                        "total {}  unread {}  read {}  archived {}",
                        stats.total, stats.unread, stats.read, stats.archived
                    );
                    Ok(())
                }
            }
        }
        NotifyCommand::Purge => {
            let remaining = reconciler.cleanup_old(&user).await?;
            match output {
                OutputFormat::Json => print_json(&remaining),
                OutputFormat::Text => {
                    println!("Old notifications purged, {} left.", remaining.len());
                    Ok(())
                }
            }
        }
    }
}

fn done(output: OutputFormat, verb: &str, count: usize) -> Result<()> {
    match output {
        OutputFormat::Json => print_json(&serde_json::json!({ "action": verb, "count": count })),
        OutputFormat::Text => {
            println!("{count} notification(s) {verb}");
            Ok(())
        }
    }
}

pub(crate) fn build_filter(args: NotificationFilterArgs) -> Result<NotificationFilter> {
    Ok(NotificationFilter {
        status: args
            .status
            .map(|s| s.parse().map_err(Error::validation))
            .transpose()?,
        priority: args
            .priority
            .map(|s| s.parse().map_err(Error::validation))
            .transpose()?,
        kind: args
            .kind
            .map(|s| s.parse().map_err(Error::validation))
            .transpose()?,
        search: args.search.filter(|s| !s.trim().is_empty()),
        page: args.page.max(1),
        page_size: args.limit.max(1),
    })
}

pub(crate) fn notification_line(n: &Notification) -> String {
    format!(
        "{}  {}  {}  {}  {}",
        n.id,
        n.status.as_str(),
        n.priority.as_str(),
        n.kind,
        n.title
    )
}
