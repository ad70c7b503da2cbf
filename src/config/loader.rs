//! Load config from `ROUTE_CONTEXT_*` env vars or from a JSON file.

use crate::config::{validate, SyncConfig};
use crate::error::ConfigError;
use std::path::Path;

impl SyncConfig {
    /// Defaults overlaid with any `ROUTE_CONTEXT_*` env vars that are set, then validated.
    pub fn from_env() -> Result<SyncConfig, ConfigError> {
        let mut config = SyncConfig::default();
        overlay("ROUTE_CONTEXT_ORGANIZATION_SEGMENT", &mut config.organization_segment)?;
        overlay("ROUTE_CONTEXT_CHILD_SEGMENT", &mut config.child_segment)?;
        overlay("ROUTE_CONTEXT_CLASS_SEGMENT", &mut config.class_segment)?;
        overlay("ROUTE_CONTEXT_SUBJECT_SEGMENT", &mut config.subject_segment)?;
        overlay("ROUTE_CONTEXT_PARENTS_SEGMENT", &mut config.parents_segment)?;
        overlay("ROUTE_CONTEXT_ORGANIZATION_FALLBACK", &mut config.organization_fallback)?;
        overlay("ROUTE_CONTEXT_CHILDREN_PATH", &mut config.children_path)?;
        overlay("ROUTE_CONTEXT_PLACEHOLDER_LABEL", &mut config.placeholder_label)?;
        validate(&config)?;
        Ok(config)
    }
}

fn overlay(var: &'static str, field: &mut String) -> Result<(), ConfigError> {
    match std::env::var(var) {
        Ok(value) => {
            *field = value.trim().to_string();
            Ok(())
        }
        Err(std::env::VarError::NotPresent) => Ok(()),
        Err(e) => Err(ConfigError::Env {
            var,
            message: e.to_string(),
        }),
    }
}

/// Read a JSON config file. Missing keys take their defaults.
pub async fn load_from_path(path: impl AsRef<Path>) -> Result<SyncConfig, ConfigError> {
    let path = path.as_ref();
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    let config: SyncConfig = serde_json::from_str(&raw).map_err(|e| ConfigError::Load(e.to_string()))?;
    tracing::debug!(path = %path.display(), "loaded sync config");
    validate(&config)?;
    Ok(config)
}
