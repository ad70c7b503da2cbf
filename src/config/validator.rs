//! Config validation: segment shape and absolute fallback paths.

use crate::config::SyncConfig;
use crate::error::ConfigError;
use regex::Regex;

const SEGMENT_PATTERN: &str = r"^[A-Za-z0-9_-]+$";

pub fn validate(config: &SyncConfig) -> Result<(), ConfigError> {
    let segment = Regex::new(SEGMENT_PATTERN).map_err(|e| ConfigError::Validation(e.to_string()))?;
    let segments = [
        ("organization_segment", &config.organization_segment),
        ("child_segment", &config.child_segment),
        ("class_segment", &config.class_segment),
        ("subject_segment", &config.subject_segment),
        ("parents_segment", &config.parents_segment),
        ("select_organization_segment", &config.select_organization_segment),
        ("select_class_segment", &config.select_class_segment),
        ("select_subject_segment", &config.select_subject_segment),
    ];
    for (name, value) in segments {
        if !segment.is_match(value) {
            return Err(ConfigError::Validation(format!(
                "{} must be a single path segment, got '{}'",
                name, value
            )));
        }
    }
    if config.organization_segment == config.child_segment {
        return Err(ConfigError::Validation(
            "organization_segment and child_segment must differ".into(),
        ));
    }

    for (name, value) in [
        ("organization_fallback", &config.organization_fallback),
        ("children_path", &config.children_path),
    ] {
        if !value.starts_with('/') {
            return Err(ConfigError::Validation(format!("{} must start with '/'", name)));
        }
    }
    if config.placeholder_label.trim().is_empty() {
        return Err(ConfigError::Validation("placeholder_label must not be empty".into()));
    }
    Ok(())
}
