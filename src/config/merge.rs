//! Per-section shallow merge for `POST /configure` (spec §9: "Implementers
//! should model this as a per-section merge rather than whole-config
//! replace").
//!
//! An operator's `configure` payload is a partial JSON object; only the
//! sections and fields present are applied, each independently, over the
//! run's current configuration. Absent fields retain their prior values.

use crate::config::types::RunConfig;
use crate::ConfigError;
use serde_json::Value;

/// Merges a partial configuration update (arbitrary JSON, as received from
/// `POST /configure`) onto `base`, one of the five top-level sections at a
/// time, and returns the resulting typed configuration.
pub fn merge_run_config(base: &RunConfig, patch: &Value) -> Result<RunConfig, ConfigError> {
    let Value::Object(patch_obj) = patch else {
        return Err(ConfigError::Validation(
            "configure payload must be a JSON object".to_string(),
        ));
    };

    let mut merged = serde_json::to_value(base)
        .map_err(|e| ConfigError::Validation(format!("failed to serialize base config: {e}")))?;

    let Value::Object(ref mut merged_obj) = merged else {
        unreachable!("RunConfig always serializes to an object");
    };

    const SECTIONS: &[&str] = &[
        "rateLimiting",
        "contentFiltering",
        "crawlBehavior",
        "domainScope",
        "rendering",
    ];

    for (key, value) in patch_obj {
        if !SECTIONS.contains(&key.as_str()) {
            return Err(ConfigError::Validation(format!(
                "unknown configuration section: {key}"
            )));
        }
        shallow_merge_section(merged_obj, key, value)?;
    }

    serde_json::from_value(merged)
        .map_err(|e| ConfigError::Validation(format!("invalid configuration after merge: {e}")))
}

fn shallow_merge_section(
    merged: &mut serde_json::Map<String, Value>,
    section: &str,
    patch: &Value,
) -> Result<(), ConfigError> {
    let Value::Object(patch_fields) = patch else {
        return Err(ConfigError::Validation(format!(
            "section {section} must be an object"
        )));
    };

    let existing = merged
        .entry(section.to_string())
        .or_insert_with(|| Value::Object(serde_json::Map::new()));

    let Value::Object(existing_fields) = existing else {
        return Err(ConfigError::Validation(format!(
            "section {section} is malformed"
        )));
    };

    for (field, value) in patch_fields {
        existing_fields.insert(field.clone(), value.clone());
    }

    Ok(())
}
