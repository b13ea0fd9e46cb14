// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::cli::OutputFormat;
use crate::error::Result;
use crate::service::SyncServices;

use super::print_json;

pub async fn run(services: &SyncServices, days: u32, output: OutputFormat) -> Result<()> {
    let report = services.cleanup(days).await?;
    match output {
        OutputFormat::Json => print_json(&report),
        OutputFormat::Text => {
            println!(
                "Removed {} record(s) and {} notification(s) older than {} days.",
                report.records, report.notifications, days
            );
            Ok(())
        }
    }
}
