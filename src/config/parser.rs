use std::path::Path;
use crate::errors::ScanGateError;
use super::types::ScanGateConfig;
use super::schema::CONFIG_SCHEMA;
use tracing::warn;

pub async fn parse_config(path: &Path) -> Result<ScanGateConfig, ScanGateError> {
    if !path.exists() {
        return Err(ScanGateError::Config(format!("Config file not found: {}", path.display())));
    }

    let metadata = tokio::fs::metadata(path).await?;
    if metadata.len() > 1_048_576 {
        return Err(ScanGateError::Config("Config file exceeds 1MB limit".into()));
    }

    let content = tokio::fs::read_to_string(path).await?;
    parse_config_str(&content)
}

pub fn parse_config_str(content: &str) -> Result<ScanGateConfig, ScanGateError> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(content)?;

    // JSON Schema validation
    validate_schema(&yaml)?;

    // Parse into typed config
    let config: ScanGateConfig = serde_yaml::from_value(yaml)?;

    validate_semantics(&config)?;

    Ok(config)
}

/// Validate config against the JSON schema for structural correctness.
fn validate_schema(yaml: &serde_yaml::Value) -> Result<(), ScanGateError> {
    // Convert YAML value to JSON for schema validation
    let json_value: serde_json::Value = serde_json::to_value(yaml)
        .map_err(|e| ScanGateError::Config(format!("Config conversion error: {}", e)))?;

    let compiled = jsonschema::JSONSchema::compile(&CONFIG_SCHEMA)
        .map_err(|e| ScanGateError::Config(format!("Schema compilation error: {}", e)))?;

    let result = compiled.validate(&json_value);
    if let Err(errors) = result {
        // Advisory only; the typed parse below is authoritative
        for e in errors {
            warn!(validation_error = %format!("{} at {}", e, e.instance_path), "Config schema warning");
        }
    }

    Ok(())
}

fn validate_semantics(config: &ScanGateConfig) -> Result<(), ScanGateError> {
    if let Some(scan) = &config.scan {
        if scan.application_name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(ScanGateError::Config("scan.application_name must not be empty".into()));
        }
        if scan.includes.as_deref().is_some_and(|i| i.trim().is_empty()) {
            return Err(ScanGateError::Config("scan.includes must not be empty".into()));
        }
        if let Some(triggers) = &scan.triggers {
            if triggers.policy().is_none() {
                warn!("All scan triggers are disabled; scans will run for every build cause");
            }
        }
    }

    if let Some(service) = &config.service {
        let has_username = service.username.as_ref().is_some_and(|u| !u.is_empty());
        let has_password = service.password.as_ref().is_some_and(|p| !p.is_empty());
        if has_password && !has_username {
            warn!("Service password configured without a username");
        }
    }

    Ok(())
}
