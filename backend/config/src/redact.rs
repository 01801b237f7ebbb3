//! Safe-to-print config snapshots: secret fields are masked.

use serde_json::Value;

static SENSITIVE_KEYS: &[&str] = &["apiKey", "api_key", "token", "secret", "password"];

/// Replace every sensitive string field with a 4-character hint and `***`.
pub fn redact(value: &Value) -> Value {
    redact_recursive(value, "")
}

fn is_sensitive_key(key: &str) -> bool {
    SENSITIVE_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key))
}

fn redact_recursive(value: &Value, key: &str) -> Value {
    match value {
        Value::String(s) if is_sensitive_key(key) && !s.is_empty() => {
            let hint: String = s.chars().take(4).collect();
            if s.chars().count() > 4 {
                Value::String(format!("{hint}***"))
            } else {
                Value::String("***".to_string())
            }
        }
        Value::Array(items) => Value::Array(items.iter().map(|v| redact_recursive(v, key)).collect()),
        Value::Object(map) => Value::Object(
            map.iter().map(|(k, v)| (k.clone(), redact_recursive(v, k))).collect(),
        ),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn masks_api_key() {
        let redacted = redact(&json!({"ocr": {"apiKey": "sk-abcdef123456", "model": "gpt-4o"}}));
        assert_eq!(redacted["ocr"]["apiKey"], "sk-a***");
        assert_eq!(redacted["ocr"]["model"], "gpt-4o");
    }

    #[test]
    fn short_secrets_are_fully_masked() {
        let redacted = redact(&json!({"apiKey": "abc"}));
        assert_eq!(redacted["apiKey"], "***");
    }
}
