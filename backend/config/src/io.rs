//! Config file location and loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;
use tokio::fs;

const CONFIG_FILE_NAME: &str = "metricscan.yaml";

/// Resolve the config directory.
/// Priority: `METRICSCAN_CONFIG_DIR` env > `~/.metricscan/`
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("METRICSCAN_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    match dirs::home_dir() {
        Some(home) => home.join(".metricscan"),
        None => PathBuf::from(".metricscan"),
    }
}

pub fn config_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

/// Read the YAML file as an untyped tree, before env substitution.
///
/// A missing or empty file yields an empty object.
pub async fn load_config(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Ok(Value::Object(Default::default()));
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let value: Value = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    Ok(match value {
        Value::Null => Value::Object(Default::default()),
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_is_empty_object() {
        let dir = tempfile::tempdir().unwrap();
        let value = load_config(&dir.path().join("absent.yaml")).await.unwrap();
        assert_eq!(value, serde_json::json!({}));
    }

    #[tokio::test]
    async fn reads_yaml_tree() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file_path(dir.path());
        std::fs::write(&path, "pipeline:\n  batchSize: 5\n").unwrap();
        let value = load_config(&path).await.unwrap();
        assert_eq!(value["pipeline"]["batchSize"], 5);
    }

    #[tokio::test]
    async fn invalid_yaml_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        std::fs::write(&path, "pipeline: [unclosed\n").unwrap();
        let err = load_config(&path).await.unwrap_err();
        assert!(format!("{err:#}").contains("broken.yaml"));
    }
}
