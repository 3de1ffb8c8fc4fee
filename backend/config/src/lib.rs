//! PlantDoc configuration management.
//!
//! Provides:
//! - Typed config schema (providers, Supabase project, limits, logging)
//! - YAML read/write with atomic backup rotation
//! - `${ENV_VAR}` substitution (credentials never live in the file)
//! - Config redaction for safe logging/display
//! - Default value application
//! - Schema validation

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

// Re-export most-used types at crate root.
pub use defaults::apply_all_defaults;
pub use env::{contains_env_var_reference, resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{apply_merge_patch, config_dir, config_file_path, load_config, write_config};
pub use redact::redact;
pub use schema::{
    GeminiConfig, LimitsConfig, LoggingConfig, PlantDocConfig, PlantIdConfig, SupabaseConfig,
};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;

/// Load, apply env substitution, and apply defaults to a config file.
///
/// This is the main entry point for loading a config at runtime.
pub async fn load_and_prepare(path: &Path) -> Result<PlantDocConfig> {
    let raw_config = load_config(path).await?;

    // Serialize to Value for the env substitution pass.
    let value: Value = serde_json::to_value(&raw_config)
        .context("Failed to serialize config for processing")?;

    // Substitute ${VAR} env vars.
    let value = resolve_env_vars(&value).context("Failed to resolve env vars in config")?;

    // Deserialize back to typed config.
    let config: PlantDocConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;

    // Apply defaults.
    let config = apply_all_defaults(config);

    // Validate.
    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }

    Ok(config)
}
