// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::cli::{ConfigCommand, OutputFormat};
use crate::config::{Config, DataPaths};
use crate::error::{Error, Result};

use super::print_json;

/// Execute a config subcommand.
pub fn run(paths: &DataPaths, cmd: ConfigCommand, output: OutputFormat) -> Result<()> {
    match cmd {
        ConfigCommand::Show => {
            let config = Config::load(&paths.root)?;
            match output {
                OutputFormat::Json => print_json(&config),
                OutputFormat::Text => {
                    let text = toml::to_string_pretty(&config)
                        .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
                    println!("# {}", paths.config().display());
                    print!("{text}");
                    Ok(())
                }
            }
        }
        ConfigCommand::Init { force } => {
            let path = paths.config();
            if path.exists() && !force {
                return Err(Error::Config(format!(
                    "{} already exists\n  hint: pass --force to overwrite",
                    path.display()
                )));
            }
            Config::default().save(&paths.root)?;
            println!("Wrote {}", path.display());
            Ok(())
        }
    }
}
