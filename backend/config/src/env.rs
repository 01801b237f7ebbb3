//! Environment handling for config values.
//!
//! Two passes run at load time:
//! - `${VAR_NAME}` references inside string values are substituted. Only
//!   uppercase `[A-Z_][A-Z0-9_]*` names are matched and `$${VAR}` escapes to a
//!   literal `${VAR}`.
//! - `METRICSCAN_*` variables override individual settings.

use std::collections::HashMap;

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;

use crate::schema::{LoggingConfig, MetricScanConfig, OcrBackendKind, OcrConfig, PipelineConfig};

/// `${VAR}` with an optional leading `$` marking an escape.
static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$(\$)?\{([A-Z_][A-Z0-9_]*)\}").expect("valid env var pattern"));

pub const ENV_BATCH_SIZE: &str = "METRICSCAN_BATCH_SIZE";
pub const ENV_CONCURRENCY: &str = "METRICSCAN_CONCURRENCY";
pub const ENV_OCR_BACKEND: &str = "METRICSCAN_OCR_BACKEND";
pub const ENV_LOG_LEVEL: &str = "METRICSCAN_LOG_LEVEL";

#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Substitute `${VAR}` references using `env`. Unset or empty variables are
/// an error naming the config path that referenced them.
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    substitute_value(value, env, "")
}

fn substitute_value(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (k, v) in map {
                let child = if path.is_empty() { k.clone() } else { format!("{path}.{k}") };
                out.insert(k.clone(), substitute_value(v, env, &child)?);
            }
            Ok(Value::Object(out))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    if !s.contains('$') {
        return Ok(s.to_string());
    }

    let mut missing: Option<String> = None;
    let substituted = ENV_VAR_PATTERN.replace_all(s, |caps: &Captures| {
        let name = &caps[2];
        if caps.get(1).is_some() {
            return format!("${{{name}}}");
        }
        match env.get(name) {
            Some(val) if !val.is_empty() => val.clone(),
            _ => {
                missing.get_or_insert_with(|| name.to_string());
                String::new()
            }
        }
    });

    if let Some(var_name) = missing {
        bail!(MissingEnvVarError { var_name, config_path: path.to_string() });
    }
    Ok(substituted.into_owned())
}

/// Apply `METRICSCAN_*` overrides found in `env`.
pub fn apply_env_overrides_with(
    mut config: MetricScanConfig,
    env: &HashMap<String, String>,
) -> Result<MetricScanConfig> {
    let get = |name: &str| env.get(name).map(|v| v.trim()).filter(|v| !v.is_empty());

    if let Some(raw) = get(ENV_BATCH_SIZE) {
        let n = raw.parse().with_context(|| format!("{ENV_BATCH_SIZE}='{raw}' is not a number"))?;
        config.pipeline.get_or_insert_with(PipelineConfig::default).batch_size = Some(n);
    }
    if let Some(raw) = get(ENV_CONCURRENCY) {
        let n = raw.parse().with_context(|| format!("{ENV_CONCURRENCY}='{raw}' is not a number"))?;
        config.pipeline.get_or_insert_with(PipelineConfig::default).concurrency = Some(n);
    }
    if let Some(raw) = get(ENV_OCR_BACKEND) {
        let backend: OcrBackendKind =
            raw.parse().map_err(|e: String| anyhow::anyhow!("{ENV_OCR_BACKEND}: {e}"))?;
        config.ocr.get_or_insert_with(OcrConfig::default).backend = Some(backend);
    }
    if let Some(raw) = get(ENV_LOG_LEVEL) {
        config.logging.get_or_insert_with(LoggingConfig::default).level = Some(raw.to_string());
    }
    Ok(config)
}

/// All env var names referenced in a config value tree, for diagnostics.
pub fn collect_referenced_vars(value: &Value) -> Vec<String> {
    let mut vars = Vec::new();
    collect_vars_recursive(value, &mut vars);
    vars.sort();
    vars.dedup();
    vars
}

fn collect_vars_recursive(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => out.extend(
            ENV_VAR_PATTERN
                .captures_iter(s)
                .filter(|caps| caps.get(1).is_none())
                .map(|caps| caps[2].to_string()),
        ),
        Value::Array(items) => items.iter().for_each(|v| collect_vars_recursive(v, out)),
        Value::Object(map) => map.values().for_each(|v| collect_vars_recursive(v, out)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn substitutes_nested_var() {
        let v = json!({"ocr": {"apiKey": "${OPENAI_API_KEY}"}});
        let result = resolve_env_vars_with(&v, &env(&[("OPENAI_API_KEY", "sk-abc123")])).unwrap();
        assert_eq!(result["ocr"]["apiKey"], "sk-abc123");
    }

    #[test]
    fn error_names_var_and_path() {
        let v = json!({"ocr": {"apiKey": "${MISSING_VAR}"}});
        let err = resolve_env_vars_with(&v, &HashMap::new()).unwrap_err().to_string();
        assert!(err.contains("MISSING_VAR"));
        assert!(err.contains("ocr.apiKey"));
    }

    #[test]
    fn escaped_reference_is_literal() {
        let v = json!({"note": "cost $${PRICE} for ${ITEM}"});
        let result = resolve_env_vars_with(&v, &env(&[("ITEM", "bolts")])).unwrap();
        assert_eq!(result["note"], "cost ${PRICE} for bolts");
    }

    #[test]
    fn lowercase_names_are_not_references() {
        let v = json!({"key": "${lower} and $HOME"});
        let result = resolve_env_vars_with(&v, &HashMap::new()).unwrap();
        assert_eq!(result["key"], "${lower} and $HOME");
    }

    #[test]
    fn collects_unescaped_vars_only() {
        let v = json!({"a": "${FOO}", "b": ["${BAR}", "$${SKIP}"]});
        assert_eq!(collect_referenced_vars(&v), vec!["BAR".to_string(), "FOO".to_string()]);
    }

    #[test]
    fn overrides_apply() {
        let cfg = apply_env_overrides_with(
            MetricScanConfig::default(),
            &env(&[
                (ENV_BATCH_SIZE, "12"),
                (ENV_CONCURRENCY, " 4 "),
                (ENV_OCR_BACKEND, "gemini"),
                (ENV_LOG_LEVEL, "debug"),
            ]),
        )
        .unwrap();
        assert_eq!(cfg.batch_size(), 12);
        assert_eq!(cfg.concurrency(), 4);
        assert_eq!(cfg.ocr_backend(), OcrBackendKind::Gemini);
        assert_eq!(cfg.log_level(), "debug");
    }

    #[test]
    fn bad_override_is_an_error() {
        let result =
            apply_env_overrides_with(MetricScanConfig::default(), &env(&[(ENV_BATCH_SIZE, "many")]));
        assert!(result.unwrap_err().to_string().contains(ENV_BATCH_SIZE));
    }
}
