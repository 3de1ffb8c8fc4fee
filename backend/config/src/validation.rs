//! Config validation: schema checks with user-friendly error messages.

use crate::schema::PlantDocConfig;
use thiserror::Error;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &PlantDocConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_provider(config, &mut report);
    validate_supabase(config, &mut report);
    validate_limits(config, &mut report);
    report
}

fn validate_provider(config: &PlantDocConfig, report: &mut ValidationReport) {
    let provider = config.provider.as_deref().unwrap_or("gemini");
    match provider {
        "gemini" => {
            let has_key = config
                .gemini
                .as_ref()
                .and_then(|g| g.api_key.as_deref())
                .map(|k| !k.is_empty())
                .unwrap_or(false);
            if !has_key {
                report.warn(
                    "gemini.apiKey",
                    "No Gemini API key configured; analysis commands will fail (set GEMINI_API_KEY)",
                );
            }
        }
        "plantid" => {
            let has_key = config
                .plant_id
                .as_ref()
                .and_then(|p| p.api_key.as_deref())
                .map(|k| !k.is_empty())
                .unwrap_or(false);
            if !has_key {
                report.warn(
                    "plantId.apiKey",
                    "No Plant.id API key configured; analysis commands will fail (set PLANT_ID_API_KEY)",
                );
            }
        }
        other => {
            report.error(
                "provider",
                format!("Unknown provider '{other}' (expected 'gemini' or 'plantid')"),
            );
        }
    }
}

fn validate_supabase(config: &PlantDocConfig, report: &mut ValidationReport) {
    let Some(supabase) = &config.supabase else { return };
    match (&supabase.url, &supabase.anon_key) {
        (Some(url), _) if url.trim().is_empty() => {
            report.error("supabase.url", "Supabase URL cannot be empty");
        }
        (Some(_), None) => {
            report.warn(
                "supabase.anonKey",
                "Supabase URL set without an anon key; sign-in and persistence will fail",
            );
        }
        (None, Some(_)) => {
            report.warn(
                "supabase.url",
                "Supabase anon key set without a project URL",
            );
        }
        _ => {}
    }
}

fn validate_limits(config: &PlantDocConfig, report: &mut ValidationReport) {
    if let Some(limits) = &config.limits {
        if limits.max_image_bytes == Some(0) {
            report.error("limits.maxImageBytes", "Image size limit must be positive");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::apply_all_defaults;
    use crate::schema::{LimitsConfig, SupabaseConfig};

    #[test]
    fn unknown_provider_is_an_error() {
        let mut config = PlantDocConfig::default();
        config.provider = Some("agribot".to_string());
        let report = validate(&config);
        assert!(!report.is_valid());
        assert!(report.errors[0].path.contains("provider"));
    }

    #[test]
    fn zero_image_limit_is_an_error() {
        let mut config = PlantDocConfig::default();
        config.limits = Some(LimitsConfig {
            max_image_bytes: Some(0),
        });
        let report = validate(&config);
        assert!(!report.is_valid());
    }

    #[test]
    fn url_without_key_warns() {
        let mut config = PlantDocConfig::default();
        config.supabase = Some(SupabaseConfig {
            url: Some("https://myproject.supabase.co".to_string()),
            anon_key: None,
        });
        let report = validate(&config);
        assert!(report.is_valid());
        assert!(!report.warnings.is_empty());
    }

    #[test]
    fn defaulted_config_is_valid() {
        let config = apply_all_defaults(PlantDocConfig::default());
        let report = validate(&config);
        assert!(report.is_valid());
    }
}
