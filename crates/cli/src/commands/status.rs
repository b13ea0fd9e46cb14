// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::cli::OutputFormat;
use crate::error::Result;
use crate::service::{StatusReport, SyncServices};

use super::print_json;

pub async fn run(services: &SyncServices, output: OutputFormat) -> Result<()> {
    let report = services.status().await?;
    match output {
        OutputFormat::Json => print_json(&report),
        OutputFormat::Text => {
            for line in format_status(&report) {
                println!("{line}");
            }
            Ok(())
        }
    }
}

pub(crate) fn format_status(report: &StatusReport) -> Vec<String> {
    let yes_no = |b: bool| if b { "yes" } else { "no" };
    let mut lines = vec![
        format!("online:        {}", yes_no(report.online)),
        format!("api:           {}", yes_no(report.api_available)),
        format!("signed in:     {}", yes_no(report.signed_in)),
        format!("records:       {}", report.records),
        format!("notifications: {}", report.notifications),
        format!("pending:       {}", report.pending),
    ];
    for (entity, count) in &report.pending_by_entity {
        lines.push(format!("  {entity}: {count}"));
    }
    if report.degraded {
        lines.push("warning: record store is not persisting to disk".to_string());
    }
    lines
}
