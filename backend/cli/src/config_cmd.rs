//! Configuration inspection and editing.
//!
//! `set` patches the raw document, so `${VAR}` references survive the
//! round-trip unexpanded.

use anyhow::{Context, Result};
use clap::Subcommand;

use plantdoc_config::{
    apply_merge_patch, config_dir, config_file_path, load_config, redact, write_config,
};

use crate::terminal;

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the configuration with secrets masked
    Show,
    /// Merge a JSON patch into the config file (RFC 7396)
    Set {
        /// e.g. '{"gemini":{"model":"gemini-1.5-flash"}}'
        patch: String,
    },
    /// Print the config file location
    Path,
}

pub async fn run(cmd: ConfigCommands) -> Result<()> {
    let path = config_file_path(&config_dir());
    match cmd {
        ConfigCommands::Show => {
            let raw = load_config(&path).await?;
            let value = serde_json::to_value(&raw).context("Failed to serialize config")?;
            print!("{}", serde_yaml::to_string(&redact(&value))?);
        }
        ConfigCommands::Set { patch } => {
            let patch: serde_json::Value =
                serde_json::from_str(&patch).context("Patch must be valid JSON")?;
            let raw = load_config(&path).await?;
            let merged = apply_merge_patch(&raw, &patch)?;
            write_config(&merged, &path).await?;
            terminal::note_success(&format!("Configuration written to {}", path.display()));
        }
        ConfigCommands::Path => println!("{}", path.display()),
    }
    Ok(())
}
