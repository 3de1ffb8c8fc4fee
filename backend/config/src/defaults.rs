//! Config defaults: applies sensible default values to parsed config.
//!
//! Credentials are never defaulted from literals; when a key is absent from
//! the file, the matching environment variable is consulted directly so a
//! bare environment (no config file at all) still works.

use crate::schema::{
    GeminiConfig, LimitsConfig, LoggingConfig, PlantDocConfig, PlantIdConfig, SupabaseConfig,
};

/// Default Gemini REST endpoint.
pub const DEFAULT_GEMINI_BASE_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models";

/// Default Gemini model identifier.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-pro";

/// Default Plant.id REST endpoint.
pub const DEFAULT_PLANT_ID_BASE_URL: &str = "https://api.plant.id/v2";

/// Default maximum accepted image size (10 MB).
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: PlantDocConfig) -> PlantDocConfig {
    let config = apply_provider_defaults(config);
    let config = apply_gemini_defaults(config);
    let config = apply_plant_id_defaults(config);
    let config = apply_supabase_defaults(config);
    let config = apply_limit_defaults(config);
    apply_logging_defaults(config)
}

fn apply_provider_defaults(mut config: PlantDocConfig) -> PlantDocConfig {
    if config.provider.is_none() {
        config.provider = Some("gemini".to_string());
    }
    config
}

/// Ensure the Gemini endpoint and model are set; fall back to the
/// `GEMINI_API_KEY` env var when the file carries no key.
fn apply_gemini_defaults(mut config: PlantDocConfig) -> PlantDocConfig {
    let gemini = config.gemini.get_or_insert_with(GeminiConfig::default);
    if gemini.base_url.is_none() {
        gemini.base_url = Some(DEFAULT_GEMINI_BASE_URL.to_string());
    }
    if gemini.model.is_none() {
        gemini.model = Some(DEFAULT_GEMINI_MODEL.to_string());
    }
    if gemini.api_key.is_none() {
        gemini.api_key = non_empty_env("GEMINI_API_KEY");
    }
    config
}

fn apply_plant_id_defaults(mut config: PlantDocConfig) -> PlantDocConfig {
    let plant_id = config.plant_id.get_or_insert_with(PlantIdConfig::default);
    if plant_id.base_url.is_none() {
        plant_id.base_url = Some(DEFAULT_PLANT_ID_BASE_URL.to_string());
    }
    if plant_id.api_key.is_none() {
        plant_id.api_key = non_empty_env("PLANT_ID_API_KEY");
    }
    config
}

fn apply_supabase_defaults(mut config: PlantDocConfig) -> PlantDocConfig {
    let supabase = config.supabase.get_or_insert_with(SupabaseConfig::default);
    if supabase.url.is_none() {
        supabase.url = non_empty_env("SUPABASE_URL");
    }
    if supabase.anon_key.is_none() {
        supabase.anon_key = non_empty_env("SUPABASE_ANON_KEY");
    }
    config
}

fn apply_limit_defaults(mut config: PlantDocConfig) -> PlantDocConfig {
    let limits = config.limits.get_or_insert_with(LimitsConfig::default);
    if limits.max_image_bytes.is_none() {
        limits.max_image_bytes = Some(DEFAULT_MAX_IMAGE_BYTES);
    }
    config
}

fn apply_logging_defaults(mut config: PlantDocConfig) -> PlantDocConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    if logging.level.is_none() {
        logging.level = Some("info".to_string());
    }
    config
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_empty_config() {
        let config = apply_all_defaults(PlantDocConfig::default());
        assert_eq!(config.provider.as_deref(), Some("gemini"));
        let gemini = config.gemini.unwrap();
        assert_eq!(gemini.base_url.as_deref(), Some(DEFAULT_GEMINI_BASE_URL));
        assert_eq!(gemini.model.as_deref(), Some(DEFAULT_GEMINI_MODEL));
        assert_eq!(
            config.limits.unwrap().max_image_bytes,
            Some(DEFAULT_MAX_IMAGE_BYTES)
        );
        assert_eq!(config.logging.unwrap().level.as_deref(), Some("info"));
    }

    #[test]
    fn explicit_values_survive_defaulting() {
        let mut config = PlantDocConfig::default();
        config.gemini = Some(GeminiConfig {
            base_url: None,
            api_key: Some("file-key".to_string()),
            model: Some("gemini-1.5-flash".to_string()),
        });
        let config = apply_all_defaults(config);
        let gemini = config.gemini.unwrap();
        assert_eq!(gemini.api_key.as_deref(), Some("file-key"));
        assert_eq!(gemini.model.as_deref(), Some("gemini-1.5-flash"));
    }
}
