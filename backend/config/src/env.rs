//! Environment variable substitution for config values.
//!
//! Supports `${VAR_NAME}` syntax in string values, resolved at load time.
//! Only uppercase `[A-Z_][A-Z0-9_]*` variable names are matched.
//! `$${VAR}` escapes to a literal `${VAR}`.

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;

/// Matches either an escaped reference (`$${VAR}`, group 1) or a real
/// reference (`${VAR}`, variable name in group 2).
static REFERENCE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\$\$\{[A-Z_][A-Z0-9_]*\})|\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

/// Error returned for missing env vars.
#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Substitute `${VAR}` references in a config value tree.
///
/// Walks the entire value tree recursively; only string leaves are
/// processed. Returns an error if any referenced env var is unset or empty.
pub fn resolve_env_vars(value: &Value) -> Result<Value> {
    substitute_value(value, &std::env::vars().collect(), "")
}

/// Substitute env vars using a provided map (useful for testing).
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    substitute_value(value, env, "")
}

/// Check whether a string contains any real (non-escaped) `${VAR}` reference.
pub fn contains_env_var_reference(s: &str) -> bool {
    REFERENCE_PATTERN
        .captures_iter(s)
        .any(|caps| caps.get(2).is_some())
}

fn substitute_value(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(arr) => {
            let result: Result<Vec<_>> = arr
                .iter()
                .enumerate()
                .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
                .collect();
            Ok(Value::Array(result?))
        }
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                let child_path = if path.is_empty() {
                    k.clone()
                } else {
                    format!("{path}.{k}")
                };
                result.insert(k.clone(), substitute_value(v, env, &child_path)?);
            }
            Ok(Value::Object(result))
        }
        // Primitives pass through unchanged.
        other => Ok(other.clone()),
    }
}

fn substitute_string(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    if !s.contains('$') {
        return Ok(s.to_string());
    }

    let mut error: Option<MissingEnvVarError> = None;
    let substituted = REFERENCE_PATTERN.replace_all(s, |caps: &regex::Captures| {
        if error.is_some() {
            return String::new();
        }
        if let Some(escaped) = caps.get(1) {
            // `$${VAR}` → literal `${VAR}`
            return escaped.as_str()[1..].to_string();
        }
        let var_name = &caps[2];
        match env.get(var_name) {
            Some(val) if !val.is_empty() => val.clone(),
            _ => {
                error = Some(MissingEnvVarError {
                    var_name: var_name.to_string(),
                    config_path: path.to_string(),
                });
                String::new()
            }
        }
    });

    if let Some(err) = error {
        bail!(err);
    }
    Ok(substituted.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn substitutes_api_key() {
        let v = json!({"gemini": {"apiKey": "${GEMINI_API_KEY}"}});
        let env = env(&[("GEMINI_API_KEY", "AIza-test")]);
        let result = resolve_env_vars_with(&v, &env).unwrap();
        assert_eq!(result["gemini"]["apiKey"], "AIza-test");
    }

    #[test]
    fn error_names_var_and_path() {
        let v = json!({"supabase": {"anonKey": "${SUPABASE_ANON_KEY}"}});
        let result = resolve_env_vars_with(&v, &HashMap::new());
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("SUPABASE_ANON_KEY"));
        assert!(msg.contains("supabase.anonKey"));
    }

    #[test]
    fn empty_value_counts_as_missing() {
        let v = json!({"key": "${EMPTY_VAR}"});
        let env = env(&[("EMPTY_VAR", "")]);
        assert!(resolve_env_vars_with(&v, &env).is_err());
    }

    #[test]
    fn passthrough_non_var_strings() {
        let v = json!({"model": "gemini-1.5-pro"});
        let result = resolve_env_vars_with(&v, &HashMap::new()).unwrap();
        assert_eq!(result["model"], "gemini-1.5-pro");
    }

    #[test]
    fn escaped_reference_becomes_literal() {
        let v = json!({"note": "$${NOT_A_SECRET}"});
        let result = resolve_env_vars_with(&v, &HashMap::new()).unwrap();
        assert_eq!(result["note"], "${NOT_A_SECRET}");
    }

    #[test]
    fn substitutes_inside_larger_string() {
        let v = json!({"url": "https://${PROJECT_REF}.supabase.co"});
        let env = env(&[("PROJECT_REF", "abcd1234")]);
        let result = resolve_env_vars_with(&v, &env).unwrap();
        assert_eq!(result["url"], "https://abcd1234.supabase.co");
    }

    #[test]
    fn detects_references() {
        assert!(contains_env_var_reference("${GEMINI_API_KEY}"));
        assert!(!contains_env_var_reference("$${GEMINI_API_KEY}"));
        assert!(!contains_env_var_reference("plain"));
    }
}
