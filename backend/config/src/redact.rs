//! Config redaction: produce safe-to-share config snapshots by masking
//! sensitive fields.
//!
//! `${VAR}` references are left intact; they are placeholders, not
//! secrets. Only literal values under sensitive keys are masked.

use crate::env::contains_env_var_reference;
use serde_json::Value;

/// Keys whose string values are masked.
static SENSITIVE_KEYS: &[&str] = &[
    "apiKey",
    "api_key",
    "apikey",
    "anonKey",
    "anon_key",
    "accessToken",
    "access_token",
    "refreshToken",
    "refresh_token",
    "token",
    "secret",
    "password",
];

/// Redact a config JSON value, masking all sensitive literal fields.
///
/// The resulting value is safe to log or print from `config show`.
pub fn redact(value: &Value) -> Value {
    redact_recursive(value, "")
}

fn is_sensitive_key(key: &str) -> bool {
    SENSITIVE_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key))
}

fn redact_string(s: &str, key: &str) -> Value {
    if is_sensitive_key(key) && !s.is_empty() && !contains_env_var_reference(s) {
        // Preserve a short prefix as a recognition hint.
        let hint = if s.len() > 4 {
            format!("{}***", &s[..4])
        } else {
            "***".to_string()
        };
        return Value::String(hint);
    }
    Value::String(s.to_string())
}

fn redact_recursive(value: &Value, key: &str) -> Value {
    match value {
        Value::String(s) => redact_string(s, key),
        Value::Array(arr) => Value::Array(arr.iter().map(|v| redact_recursive(v, key)).collect()),
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                result.insert(k.clone(), redact_recursive(v, k));
            }
            Value::Object(result)
        }
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn masks_literal_api_key() {
        let v = json!({"gemini": {"apiKey": "AIzaSyD-1234567890"}});
        let redacted = redact(&v);
        assert_eq!(redacted["gemini"]["apiKey"], "AIza***");
    }

    #[test]
    fn leaves_env_references_visible() {
        let v = json!({"gemini": {"apiKey": "${GEMINI_API_KEY}"}});
        let redacted = redact(&v);
        assert_eq!(redacted["gemini"]["apiKey"], "${GEMINI_API_KEY}");
    }

    #[test]
    fn leaves_non_sensitive_fields_alone() {
        let v = json!({"gemini": {"model": "gemini-1.5-pro"}});
        let redacted = redact(&v);
        assert_eq!(redacted["gemini"]["model"], "gemini-1.5-pro");
    }
}
