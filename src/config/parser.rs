use std::path::Path;

use chrono::format::{Item, StrftimeItems};
use tracing::{debug, warn};

use super::schema::CONFIG_SCHEMA;
use super::types::{DashboardConfig, Settings};
use crate::errors::DashboardError;

const MAX_CONFIG_BYTES: u64 = 1_048_576;

pub async fn parse_config(path: &Path) -> Result<DashboardConfig, DashboardError> {
    if !path.exists() {
        return Err(DashboardError::Config(format!("Config file not found: {}", path.display())));
    }

    let metadata = tokio::fs::metadata(path).await?;
    if metadata.len() > MAX_CONFIG_BYTES {
        return Err(DashboardError::Config("Config file exceeds 1MB limit".into()));
    }

    let content = tokio::fs::read_to_string(path).await?;
    parse_config_str(&content)
}

/// Parse and validate config text. Empty documents yield the defaults.
pub fn parse_config_str(content: &str) -> Result<DashboardConfig, DashboardError> {
    if content.trim().is_empty() {
        return Ok(DashboardConfig::default());
    }
    let yaml: serde_yaml::Value = serde_yaml::from_str(content)?;

    for msg in schema_warnings(&yaml)? {
        warn!(validation_error = %msg, "Config schema warning");
    }

    let config: DashboardConfig = serde_yaml::from_value(yaml)?;
    validate_semantics(&Settings::from_config(&config))?;
    Ok(config)
}

/// Resolve settings with precedence CLI/env > file > defaults.
pub async fn load_settings(
    config_path: Option<&Path>,
    api_url_override: Option<&str>,
    no_color: bool,
) -> Result<Settings, DashboardError> {
    let mut settings = match config_path {
        Some(path) => Settings::from_config(&parse_config(path).await?),
        None => Settings::default(),
    };
    if let Some(url) = api_url_override {
        settings.base_url = url.to_string();
    }
    if no_color {
        settings.color = false;
    }
    validate_semantics(&settings)?;
    debug!(base_url = %settings.base_url, recent_scans = settings.recent_scans, "Settings resolved");
    Ok(settings)
}

/// Check the config against the JSON schema. Mismatches are advisory and
/// returned as messages; only a broken schema is an error.
pub fn schema_warnings(yaml: &serde_yaml::Value) -> Result<Vec<String>, DashboardError> {
    let json_str = serde_json::to_string(yaml)
        .map_err(|e| DashboardError::Config(format!("Config conversion error: {}", e)))?;
    let json_value: serde_json::Value = serde_json::from_str(&json_str)
        .map_err(|e| DashboardError::Config(format!("Config conversion error: {}", e)))?;

    let compiled = jsonschema::JSONSchema::compile(&CONFIG_SCHEMA)
        .map_err(|e| DashboardError::Config(format!("Schema compilation error: {}", e)))?;

    let messages = match compiled.validate(&json_value) {
        Ok(()) => Vec::new(),
        Err(errors) => errors
            .map(|e| format!("{} at {}", e, e.instance_path))
            .collect(),
    };
    Ok(messages)
}

/// Rules the schema cannot express, checked on the resolved settings.
fn validate_semantics(settings: &Settings) -> Result<(), DashboardError> {
    let url = reqwest::Url::parse(&settings.base_url).map_err(|e| {
        DashboardError::Config(format!("Invalid api.base_url '{}': {}", settings.base_url, e))
    })?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(DashboardError::Config(format!(
            "api.base_url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if settings.recent_scans == 0 {
        return Err(DashboardError::Config("dashboard.recent_scans must be at least 1".into()));
    }

    if settings.date_format.is_empty()
        || StrftimeItems::new(&settings.date_format).any(|item| matches!(item, Item::Error))
    {
        return Err(DashboardError::Config(format!(
            "Invalid display.date_format '{}'",
            settings.date_format
        )));
    }

    Ok(())
}
