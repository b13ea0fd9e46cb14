// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::cli::OutputFormat;
use crate::error::Result;
use crate::service::SyncServices;
use crate::sync::{DrainOutcome, DrainReport};

use super::print_json;

pub async fn run(services: &SyncServices, output: OutputFormat) -> Result<()> {
    let report = services.drainer().drain().await?;
    match output {
        OutputFormat::Json => print_json(&report),
        OutputFormat::Text => {
            println!("{}", format_report(&report));
            Ok(())
        }
    }
}

pub(crate) fn format_report(report: &DrainReport) -> String {
    match report.outcome {
        DrainOutcome::Empty => "Nothing to sync.".to_string(),
        DrainOutcome::Skipped => "Another sync is already running.".to_string(),
        DrainOutcome::Offline => format!(
            "Offline: {} change(s) waiting for a connection.",
            report.remaining
        ),
        DrainOutcome::Completed => {
            let mut line = format!(
                "Synced {}, failed {}, {} remaining",
                report.synced, report.failed, report.remaining
            );
            if report.blocked > 0 {
                line.push_str(&format!(" ({} waiting for a valid token)", report.blocked));
            }
            line
        }
    }
}
